//! `tvcom`: send commands to TV-class devices over a serial or TCP link.
//!
//! ```text
//! tvcom send volume +5
//! tvcom send power status
//! tvcom -c lounge.yaml send input hdmi2 --json
//! tvcom devices
//! tvcom codes volume
//! ```

mod cli;
mod config;
mod output;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use tvcom_link::LinkManager;
use tvcom_protocol::ConfigError;
use tvcom_session::{CommandError, CommandSession};

use crate::cli::{Cli, Command};
use crate::config::Config;

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown device {0:?}; `tvcom devices` lists the known ones")]
    UnknownDevice(String),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("cannot render output: {0}")]
    Render(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise the `-v` count picks the level.
fn init_tracing(verbosity: u8) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let inventory = config.inventory()?;

    match &cli.command {
        Command::Send { device, code } => {
            let instance = inventory
                .get(device)
                .ok_or_else(|| CliError::UnknownDevice(device.clone()))?;
            let link = LinkManager::standard(config.link.to_link_config());
            let session = CommandSession::new(Arc::new(link));
            let result = session.execute(instance, &config.peer, code)?;
            println!("{}", output::render_result(&result, cli.json)?);
        }
        Command::Devices => {
            println!("{}", output::render_devices(&inventory, cli.json)?);
        }
        Command::Codes { device } => {
            let instance = inventory
                .get(device)
                .ok_or_else(|| CliError::UnknownDevice(device.clone()))?;
            println!("{}", output::render_codes(instance, cli.json)?);
        }
    }
    Ok(())
}
