//! Logger initialization for the monitor binary.
//!
//! Appends to the configured log file (`./logfile.log` by default).

use std::fs::{File, OpenOptions};
use std::path::Path;

use clap::ValueEnum;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogDestination {
    /// Append to the log file only.
    File,
    /// Write to terminal only.
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the logger with the specified destination.
///
/// A log file that cannot be opened leaves terminal logging in place.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_file: &Path) {
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        match create_file_logger(level, config.clone(), log_file) {
            Some(file_logger) => loggers.push(file_logger),
            None if destination == LogDestination::File => {
                loggers.push(TermLogger::new(
                    level,
                    config,
                    TerminalMode::Mixed,
                    ColorChoice::Auto,
                ));
            }
            None => {}
        }
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not open log file at {:?}: {}", log_path, err);
            None
        }
    }
}
