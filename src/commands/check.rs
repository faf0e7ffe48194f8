use crate::api::Mode;
use crate::commands::Out;
use crate::{Config, Ledger, Result};
use serde::Serialize;
use tracing::debug;

/// What `check` found when opening the spreadsheet.
#[derive(Debug, Clone, Serialize)]
pub struct SheetCheck {
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub entries: usize,
}

/// Handles the `check` command: opens the spreadsheet with the configured credentials and counts
/// its entries. Nothing is written.
pub async fn check(config: &Config, mode: Mode) -> Result<Out<SheetCheck>> {
    debug!("Checking spreadsheet {}", config.spreadsheet_id());
    let ledger = Ledger::connect(config, mode).await?;
    let worksheet = ledger.sheet_title().await?;
    let entries = ledger.entries().await?.len();
    Ok(Out::new(
        format!("Connected to worksheet '{worksheet}' with {entries} entries"),
        SheetCheck {
            spreadsheet_id: config.spreadsheet_id().to_string(),
            worksheet,
            entries,
        },
    ))
}
