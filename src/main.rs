use clap::Parser;
use sheet_ledger::args::{Args, Command};
use sheet_ledger::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error ({}): {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");

    // When SHEET_LEDGER_IN_TEST_MODE is set and non-empty, rows are kept in memory instead of
    // being sent to Google.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Serve(serve_args) => {
            let config = Config::load(args.common(), Some(serve_args)).await?;
            commands::serve(config, mode).await?.print()
        }
        Command::Check => {
            let config = Config::load(args.common(), None).await?;
            commands::check(&config, mode).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => {
            // RUST_LOG does not exist; use the log level for this crate and the request traces.
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                level,
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
