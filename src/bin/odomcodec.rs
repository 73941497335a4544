// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Odomcodec CLI
//!
//! Export odometry from recorded logs and inspect the resulting containers.
//!
//! ## Usage
//!
//! ```sh
//! # Export /Odometry from a rosbag2 recording to HDF5
//! odomcodec export recordings/run9 run9.h5
//!
//! # Export another topic to the native container
//! odomcodec export run9.mcap run9.otc --topic /odom
//!
//! # List topics in a log
//! odomcodec topics run9.bag
//!
//! # Show a container's attributes and datasets
//! odomcodec inspect run9.otc
//! ```
//!
//! Diagnostics go to stderr and are controlled with `RUST_LOG`
//! (default `warn`); stdout only carries command output.

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{ExportCmd, InspectCmd, TopicsCmd};
use common::Result;
use tracing_subscriber::EnvFilter;

/// Odomcodec - odometry export toolkit
///
/// Reads MCAP, ROS1 bag and rosbag2 SQLite logs and writes the odometry
/// topic as per-axis time series.
#[derive(Parser, Clone)]
#[command(name = "odomcodec")]
#[command(about = "Export odometry time series from robot logs", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Export an odometry topic into a container
    Export(ExportCmd),

    /// List the topics recorded in a log
    Topics(TopicsCmd),

    /// Show attributes and datasets of a native container
    Inspect(InspectCmd),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export(cmd) => cmd.run(),
        Commands::Topics(cmd) => cmd.run(),
        Commands::Inspect(cmd) => cmd.run(),
    }
}

fn main() {
    init_tracing();

    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
