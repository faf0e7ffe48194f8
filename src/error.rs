//! Error types for sheet-ledger.
//!
//! Internally, code uses `anyhow` through the `Res<T>` alias and attaches context as errors bubble
//! up. At module boundaries an `anyhow::Error` is tagged with an `ErrorType` using
//! `IntoResult::pub_result`, which produces the public `Error`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The internal result type. Errors are untyped `anyhow` errors with context.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The kinds of failure that can reach a caller.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Credentials are missing, malformed or were rejected by Google.
    Auth,
    /// The spreadsheet id is invalid or the service account cannot access it.
    NotFound,
    /// The sheet contents cannot be interpreted, e.g. a non-numeric id cell.
    DataIntegrity,
    /// A network or datastore failure.
    Service,
    /// The program was started with a bad configuration.
    Config,
    /// The request sent by the client could not be understood.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type. It carries an `ErrorType` and the underlying error chain.
#[derive(Debug)]
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Create an error from a plain message.
    pub(crate) fn msg(error_type: ErrorType, message: impl Display) -> Self {
        Self::new(error_type, anyhow::anyhow!("{message}"))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Display for Error {
    /// Writes the full context chain, e.g. `Failed to read the sheet: connection refused`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.inner)
    }
}

/// Converts a result with any error into the public `Result` with the given `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
