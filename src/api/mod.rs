//! Access to the ledger spreadsheet.
//!
//! The `Sheet` trait is the seam between the service and the datastore. `GoogleSheet` talks to
//! Google Sheets through `sheets::Client` with a service account token, `TestSheet` keeps rows in
//! memory so that the whole app can run top-to-bottom without Google.

mod auth;
mod sheet;
mod test_sheet;

use crate::{Config, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub(crate) use auth::TokenProvider;
pub(crate) use sheet::GoogleSheet;
pub(crate) use test_sheet::TestSheet;
#[cfg(test)]
pub(crate) use test_sheet::TestSheetState;

/// OAuth scopes requested for the service account: read/write access to spreadsheets and to
/// drive, which is needed to open sheets shared with the service account.
pub(crate) const OAUTH_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// When this environment variable is set and non-empty, the app uses `TestSheet` instead of a
/// Google sheet.
pub const TEST_MODE_ENV: &str = "SHEET_LEDGER_IN_TEST_MODE";

/// Whether we are talking to a live Google sheet or to in-memory test data.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Google,
    Testing,
}

impl Mode {
    /// Returns `Mode::Testing` when `SHEET_LEDGER_IN_TEST_MODE` is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(s) if !s.is_empty() => Mode::Testing,
            _ => Mode::Google,
        }
    }
}

/// The first worksheet of the target spreadsheet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Worksheet {
    /// The title of the whole spreadsheet document.
    pub(crate) spreadsheet_title: String,
    /// The title of the worksheet (tab), used to address its cells.
    pub(crate) title: String,
}

impl Worksheet {
    /// An A1 range covering every cell of the worksheet, e.g. `'Sheet 1'!A:ZZ`.
    pub(crate) fn all_cells(&self) -> String {
        format!("{}!A:ZZ", quote_title(&self.title))
    }

    /// An A1 range anchoring appends to the table that starts at `A1`.
    pub(crate) fn table_start(&self) -> String {
        format!("{}!A1", quote_title(&self.title))
    }
}

fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Operations on the first worksheet of the ledger spreadsheet.
#[async_trait::async_trait]
pub(crate) trait Sheet: Send + Sync {
    /// Resolves the spreadsheet to its first worksheet.
    async fn worksheet(&self) -> Result<Worksheet>;

    /// Returns every row of the first worksheet, header included, as formatted strings. Trailing
    /// empty cells and rows are not returned.
    async fn get_values(&self) -> Result<Vec<Vec<String>>>;

    /// Appends one row after the last row of the first worksheet.
    async fn append_row(&self, row: Vec<Value>) -> Result<()>;
}

/// Creates the `Sheet` for `config`. In `Mode::Google` this loads the service account credentials,
/// which fails with an `Auth` error when they are missing or malformed.
pub(crate) async fn sheet(config: &Config, mode: Mode) -> Result<Arc<dyn Sheet>> {
    match mode {
        Mode::Google => {
            let token_provider = TokenProvider::load(config.credentials()).await?;
            debug!("Using the Google sheet {}", config.spreadsheet_id());
            Ok(Arc::new(GoogleSheet::new(config, token_provider)))
        }
        Mode::Testing => {
            debug!("Using the in-memory test sheet {}", config.spreadsheet_id());
            Ok(Arc::new(TestSheet::new(config.spreadsheet_id())))
        }
    }
}

/// Renders a cell value as the text Google shows for it. Whole numbers have no decimal part.
pub(crate) fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
