// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Topics command - list the channels recorded in a log.

use std::path::PathBuf;

use clap::Args;

use crate::common::Result;
use odomcodec::LogSource;

/// List the topics recorded in a log.
#[derive(Args, Clone, Debug)]
pub struct TopicsCmd {
    /// Input log
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Only show odometry topics
    #[arg(long)]
    odometry: bool,
}

impl TopicsCmd {
    pub fn run(self) -> Result<()> {
        let source = LogSource::open(&self.input)?;

        println!("=== Topics in {} ===", self.input.display());
        println!("Format: {}", source.format());
        println!();

        for channel in source.channels()? {
            if self.odometry && !channel.is_odometry() {
                continue;
            }
            println!("Topic: {}", channel.topic);
            println!("  Type: {}", channel.message_type);
            println!("  Encoding: {}", channel.encoding);
            println!("  Messages: {}", channel.message_count);
            println!();
        }

        Ok(())
    }
}
