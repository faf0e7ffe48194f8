//! These structs provide the CLI interface for the sheet-ledger program.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// sheet-ledger: an HTTP API for recording personal finance transactions in a Google sheet.
///
/// Transactions are appended as rows to the first worksheet of the configured spreadsheet. The
/// API lists them and derives the distinct values used for form dropdowns.
///
/// Access to the sheet uses a Google service account. Share the spreadsheet with the service
/// account's email address and provide its JSON key with --credentials, or inline through
/// GOOGLE_CREDENTIALS_JSON.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(ServeArgs),
    /// Check that the spreadsheet can be opened with the configured credentials.
    Check,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// A JSON configuration file. Command line arguments and environment variables take
    /// precedence over its settings.
    #[arg(long, env = "SHEET_LEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// The spreadsheet id, or the full URL of the Google sheet, e.g.
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long, env = "SHEET_LEDGER_SPREADSHEET")]
    spreadsheet: Option<String>,

    /// The path to the service account key file. Defaults to credentials.json.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// The service account key as inline JSON. When set, it is used instead of --credentials.
    #[arg(long, env = "GOOGLE_CREDENTIALS_JSON", hide_env_values = true)]
    credentials_json: Option<String>,

    /// The timeout, in seconds, of each request made to Google. Defaults to 30.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Common {
    pub fn new(log_level: LevelFilter, spreadsheet: Option<String>) -> Self {
        Self {
            log_level,
            config: None,
            spreadsheet,
            credentials: None,
            credentials_json: None,
            timeout_secs: None,
        }
    }

    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn with_credentials(mut self, credentials: impl Into<PathBuf>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    pub fn with_credentials_json(mut self, credentials_json: impl Into<String>) -> Self {
        self.credentials_json = Some(credentials_json.into());
        self
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    pub fn spreadsheet(&self) -> Option<&str> {
        self.spreadsheet.as_deref()
    }

    pub fn credentials(&self) -> Option<&Path> {
        self.credentials.as_deref()
    }

    pub fn credentials_json(&self) -> Option<&str> {
        self.credentials_json.as_deref()
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }
}

/// Args for the `serve` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ServeArgs {
    /// The address to listen on. Defaults to 0.0.0.0.
    #[arg(long, env = "SHEET_LEDGER_HOST")]
    host: Option<String>,

    /// The port to listen on. Defaults to 8000.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// An origin allowed to call the API from a browser, e.g. http://localhost:5173. May be given
    /// more than once. When none is given, any origin is allowed.
    #[arg(
        long = "cors-origin",
        env = "SHEET_LEDGER_CORS_ORIGINS",
        value_delimiter = ','
    )]
    cors_origins: Vec<String>,
}

impl ServeArgs {
    pub fn new(host: Option<String>, port: Option<u16>, cors_origins: Vec<String>) -> Self {
        Self {
            host,
            port,
            cors_origins,
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let args = Args::try_parse_from([
            "sheet-ledger",
            "--spreadsheet",
            "abc123",
            "--log-level",
            "debug",
            "serve",
            "--port",
            "9000",
            "--cors-origin",
            "http://localhost:5173",
            "--cors-origin",
            "https://example.com",
        ])
        .unwrap();
        assert_eq!(args.common().spreadsheet(), Some("abc123"));
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        match args.command() {
            Command::Serve(serve) => {
                assert_eq!(serve.port(), Some(9000));
                assert_eq!(serve.host(), None);
                assert_eq!(
                    serve.cors_origins(),
                    &["http://localhost:5173", "https://example.com"]
                );
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_check() {
        let args = Args::try_parse_from([
            "sheet-ledger",
            "--credentials",
            "/tmp/key.json",
            "check",
        ])
        .unwrap();
        assert_eq!(
            args.common().credentials(),
            Some(Path::new("/tmp/key.json"))
        );
        assert!(matches!(args.command(), Command::Check));
    }

    #[test]
    fn test_parse_inline_credentials() {
        let args = Args::try_parse_from([
            "sheet-ledger",
            "--credentials-json",
            r#"{"type": "service_account"}"#,
            "check",
        ])
        .unwrap();
        assert_eq!(
            args.common().credentials_json(),
            Some(r#"{"type": "service_account"}"#)
        );
    }

    #[test]
    fn test_parse_requires_command() {
        assert!(Args::try_parse_from(["sheet-ledger"]).is_err());
    }
}
