pub mod api;
mod commands;
pub mod config;
pub mod error;
pub mod report;
pub mod session;

use std::process::ExitCode;

use clap::Parser;

pub use api::{ApiClient, TransactionRecord};
pub use config::AppConfig;
pub use error::{ApiError, SessionError, StorageError};
pub use session::{Session, SessionManager, User};

pub fn run() -> ExitCode {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = commands::Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(commands::dispatch(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
