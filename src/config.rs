//! Configuration handling for sheet-ledger.
//!
//! Settings are resolved in this order of precedence: command line arguments, environment
//! variables (both handled by clap), an optional JSON configuration file, and finally defaults.

use crate::args::{Common, ServeArgs};
use crate::error::{ErrorType, IntoResult, Res};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "sheet-ledger";
const DEFAULT_CREDENTIALS: &str = "credentials.json";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ANY_ORIGIN: &str = "*";

/// Where the service account key comes from.
#[derive(Clone, Eq, PartialEq)]
pub enum CredentialSource {
    /// A JSON key file.
    File(PathBuf),
    /// The JSON key itself, usually passed through the environment.
    Inline(String),
}

impl Debug for CredentialSource {
    /// Never prints the inline key.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::File(path) => f.debug_tuple("File").field(path).finish(),
            CredentialSource::Inline(_) => f.debug_tuple("Inline").field(&"<redacted>").finish(),
        }
    }
}

/// Which browser origins may call the API.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CorsPolicy {
    /// Any origin, method and header.
    Any,
    /// Only these origins. Credentials are allowed.
    Origins(Vec<String>),
}

impl CorsPolicy {
    fn from_origins(origins: &[String]) -> Self {
        let origins: Vec<String> = origins
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == ANY_ORIGIN) {
            CorsPolicy::Any
        } else {
            CorsPolicy::Origins(origins)
        }
    }
}

/// The resolved configuration of the app.
#[derive(Debug, Clone)]
pub struct Config {
    spreadsheet_id: String,
    credentials: CredentialSource,
    host: String,
    port: u16,
    cors: CorsPolicy,
    timeout: Duration,
}

impl Config {
    /// Resolves the configuration from the command line, the environment and, if one is given,
    /// the configuration file. `serve` carries the server settings and is `None` for commands that
    /// do not listen.
    ///
    /// # Errors
    /// - Returns a `Config` error if the file cannot be loaded or no spreadsheet is configured.
    pub async fn load(common: &Common, serve: Option<&ServeArgs>) -> Result<Self> {
        let (file, file_dir) = match common.config() {
            Some(path) => (
                ConfigFile::load(path).await.pub_result(ErrorType::Config)?,
                path.parent().map(Path::to_path_buf),
            ),
            None => (ConfigFile::default(), None),
        };

        let spreadsheet = common
            .spreadsheet()
            .map(str::to_string)
            .or(file.spreadsheet)
            .context(
                "No spreadsheet is configured, pass --spreadsheet or set SHEET_LEDGER_SPREADSHEET",
            )
            .pub_result(ErrorType::Config)?;
        let spreadsheet_id = extract_spreadsheet_id(&spreadsheet)
            .pub_result(ErrorType::Config)?
            .to_string();

        let credentials = match common.credentials_json() {
            Some(json) => CredentialSource::Inline(json.to_string()),
            None => CredentialSource::File(match common.credentials() {
                Some(path) => path.to_path_buf(),
                None => match (file.credentials_path, file_dir) {
                    // Relative paths in the config file are relative to the config file.
                    (Some(path), Some(dir)) if path.is_relative() => dir.join(path),
                    (Some(path), _) => path,
                    (None, _) => PathBuf::from(DEFAULT_CREDENTIALS),
                },
            }),
        };

        let host = serve
            .and_then(ServeArgs::host)
            .map(str::to_string)
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = serve
            .and_then(ServeArgs::port)
            .or(file.port)
            .unwrap_or(DEFAULT_PORT);
        let cors = match serve.map(ServeArgs::cors_origins) {
            Some(origins) if !origins.is_empty() => CorsPolicy::from_origins(origins),
            _ => CorsPolicy::from_origins(&file.cors_origins),
        };
        let timeout = Duration::from_secs(
            common
                .timeout_secs()
                .or(file.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        Ok(Self {
            spreadsheet_id,
            credentials,
            host,
            port,
            cors,
            timeout,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn credentials(&self) -> &CredentialSource {
        &self.credentials
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Represents the deserialization format of the configuration file. Every setting is optional.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "sheet-ledger",
///   "spreadsheet": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
///   "credentials_path": "secrets/credentials.json",
///   "host": "127.0.0.1",
///   "port": 8000,
///   "cors_origins": ["http://localhost:5173"],
///   "timeout_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "sheet-ledger"
    app_name: String,

    /// The spreadsheet id or URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spreadsheet: Option<String>,

    /// Path to the service account key, relative to the config file or absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<u16>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    cors_origins: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            spreadsheet: None,
            credentials_path: None,
            host: None,
            port: None,
            cors_origins: Vec::new(),
            timeout_secs: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if its `app_name` is wrong.
    async fn load(path: &Path) -> Res<Self> {
        let config: ConfigFile = utils::deserialize(path).await?;
        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }
}

/// Extracts the spreadsheet id from a Google Sheets URL, or returns the input when it already is
/// an id.
///
/// # Arguments
/// * `spreadsheet` - e.g. "https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/edit#gid=0" or
///   "SPREADSHEET_ID"
fn extract_spreadsheet_id(spreadsheet: &str) -> Res<&str> {
    let spreadsheet = spreadsheet.trim();
    if spreadsheet.is_empty() {
        bail!("The spreadsheet id is empty");
    }

    let id = if spreadsheet.contains('/') {
        let url = Url::parse(spreadsheet)
            .with_context(|| format!("Invalid Google Sheets URL '{spreadsheet}'"))?;
        let mut segments = url.path_segments().into_iter().flatten();
        if segments.find(|segment| *segment == "d").is_none() {
            bail!(
                "Invalid Google Sheets URL format. Expected: \
                https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
            );
        }
        let id = segments.next().unwrap_or_default();
        // Point back into the input so that the id borrows from it.
        let start = spreadsheet
            .find(&format!("/d/{id}"))
            .map(|ix| ix + 3)
            .context("Unable to locate the spreadsheet id in the URL")?;
        &spreadsheet[start..start + id.len()]
    } else {
        spreadsheet
    };

    ensure!(
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
        "Invalid spreadsheet id '{id}'"
    );
    Ok(id)
}
