//! Argument definitions for the `tvcom` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Control TVs and similar RS-232C devices over serial or TCP.
#[derive(Debug, Parser)]
#[command(name = "tvcom", version, about)]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send one command to a device.
    Send {
        /// Device long name, e.g. `volume`.
        device: String,
        /// A named code, `status`, a level `0`-`100`, or a `+N`/`-N`
        /// adjustment.
        #[arg(allow_hyphen_values = true)]
        code: String,
    },
    /// List the known devices.
    Devices,
    /// List the codes a device accepts.
    Codes {
        /// Device long name.
        device: String,
    },
}
