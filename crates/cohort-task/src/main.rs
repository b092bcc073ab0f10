mod cli;
mod commands;
mod config;
mod exit;
mod report;

use std::process::ExitCode;

use clap::Parser;
use cohort_core::CoreError;
use cohort_observe::init_logger;
use tracing::{debug, error};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    config::load_dotenv();
    let cli = Cli::parse();

    let logger = match config::logger_config(&cli.global) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("cohort: {e}");
            return ExitCode::from(exit::USAGE);
        }
    };
    if let Err(e) = init_logger(&logger) {
        eprintln!("cohort: {e}");
        return ExitCode::from(exit::SOFTWARE);
    }
    debug!(host = %report::host(), "logger initialized");

    match commands::dispatch(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let code = match err.downcast_ref::<CoreError>() {
                Some(core) => {
                    error!(kind = core.kind(), "{core}");
                    exit::for_error(core)
                }
                None => {
                    error!("{err:#}");
                    exit::SOFTWARE
                }
            };
            ExitCode::from(code)
        }
    }
}
