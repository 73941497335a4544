// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show a container's attributes and datasets.

use std::path::PathBuf;

use clap::Args;

use crate::common::{format_duration, format_timestamp, Result};
use odomcodec::series::TIMESTAMPS;
use odomcodec::ContainerReader;

/// Show attributes and datasets of a native container.
#[derive(Args, Clone, Debug)]
pub struct InspectCmd {
    /// Container file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Verify every dataset checksum
    #[arg(long)]
    verify: bool,
}

impl InspectCmd {
    pub fn run(self) -> Result<()> {
        let reader = ContainerReader::open(&self.input)?;

        println!("=== {} ===", self.input.display());
        println!();
        println!("Attributes:");
        for (name, value) in reader.attributes() {
            println!("  {name}: {value}");
        }

        println!();
        println!("Datasets:");
        for (path, entry) in reader.all_datasets() {
            println!("  {path} | {} | {} values", entry.dtype, entry.len());
        }

        let timestamps = reader.read_i64(TIMESTAMPS)?;
        if let (Some(&start), Some(&end)) = (timestamps.first(), timestamps.last()) {
            println!();
            println!("Samples: {}", timestamps.len());
            println!("Start: {}", format_timestamp(start));
            println!("End: {}", format_timestamp(end));
            println!(
                "Duration: {}",
                format_duration(end.saturating_sub(start).max(0) as u64)
            );
        } else {
            println!();
            println!("Samples: 0");
        }

        if self.verify {
            reader.verify()?;
            println!();
            println!("All checksums OK");
        }

        Ok(())
    }
}
