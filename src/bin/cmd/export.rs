// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Export command - write an odometry topic into a container.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::common::{ProgressBar, Result};
use odomcodec::{ConfigError, ContainerFormat, ExportConfig, ExportError, Pipeline};

/// Export an odometry topic into a container.
#[derive(Args, Clone, Debug)]
pub struct ExportCmd {
    /// Input log (MCAP, BAG, rosbag2 .db3, or a rosbag2 directory)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output container (.h5 for HDF5, .otc for native)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Topic to export
    #[arg(short, long)]
    topic: Option<String>,

    /// Description attribute stored in the container
    #[arg(short, long)]
    description: Option<String>,

    /// Container format (native or hdf5); defaults from the output extension
    #[arg(short, long, value_parser = parse_format)]
    format: Option<ContainerFormat>,

    /// TOML configuration file; command-line arguments override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show a progress spinner
    #[arg(long)]
    progress: bool,
}

fn parse_format(s: &str) -> std::result::Result<ContainerFormat, String> {
    s.parse().map_err(|e: ExportError| e.to_string())
}

impl ExportCmd {
    pub fn run(self) -> Result<()> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::load(path)?,
            None => ExportConfig::default(),
        };
        if let Some(input) = self.input {
            config.input = Some(input);
        }
        if let Some(output) = self.output {
            config.output = Some(output);
        }
        if let Some(topic) = self.topic {
            config.topic = topic;
        }
        if let Some(description) = self.description {
            config.description = Some(description);
        }
        if let Some(format) = self.format {
            config.format = Some(format);
        }
        let options = match config.into_options() {
            Ok(options) => options,
            Err(e @ ConfigError::Missing(_)) => {
                return Err(e).context("INPUT and OUTPUT are required unless set in --config")
            }
            Err(e) => return Err(e.into()),
        };

        let progress = ProgressBar::spinner("reading", self.progress);
        let mut pipeline = Pipeline::new(options).with_progress(progress.callback());
        let result = pipeline.run();
        progress.finish_and_clear();

        match result {
            Ok(report) => {
                println!(
                    "Odometry data successfully saved to {}",
                    report.output.display()
                );
                Ok(())
            }
            Err(e @ ExportError::InputNotFound { .. }) => {
                println!("Bag file not found");
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
