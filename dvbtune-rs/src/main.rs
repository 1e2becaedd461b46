//! dvbtune: tune Linux DVB v5 adapters and record their transport stream.

use std::path::PathBuf;

use clap::Parser;
use log::error;

mod commands;
mod config;
mod context;
mod logging;

use crate::config::{config_path, load_config, ConfigFile};
use crate::context::{Cli, Commands};
use crate::logging::LogOptions;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Cli::parse();

    // Load config file: explicit path > auto-detect > default
    let file_config = match config_path(args.config.clone()) {
        Some(path) => match load_config(&path) {
            Ok(c) => {
                eprintln!("Loaded config from: {}", path.display());
                c
            }
            Err(e) => {
                eprintln!("Failed to load config file: {}", e);
                return Err(e);
            }
        },
        None => ConfigFile::default(),
    };

    // Command line takes precedence over the [logging] section
    let log_dir = args
        .log_dir
        .clone()
        .or_else(|| file_config.logging.log_dir.as_deref().map(PathBuf::from));
    logging::init_logging(&LogOptions {
        log_dir: log_dir.as_deref(),
        retention_days: file_config.logging.retention_days.unwrap_or(7),
        verbose: args.verbose,
        level: file_config.logging.level.as_deref(),
    })?;

    let file_channel = file_config.channel.as_ref();
    let result = match &args.command {
        Commands::Info { device } => {
            let config = commands::device_config(device, None, &file_config);
            commands::info(&config)
        }
        Commands::Checksignal { device, channel } => {
            let config = commands::device_config(device, None, &file_config);
            commands::checksignal(&config, channel, file_channel)
        }
        Commands::Tune {
            device,
            channel,
            pids,
            capture,
            time,
            output,
        } => {
            let config = commands::device_config(device, *capture, &file_config);
            commands::tune(&config, channel, file_channel, pids, *time, output)
        }
    };

    if let Err(ref e) = result {
        error!("{}", e);
    }
    result
}
