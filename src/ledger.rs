//! The `Ledger` service implements the operations of the API over a `Sheet`.

use crate::api::{self, Mode, Sheet};
use crate::model::{next_id, Column, DropdownOptions, NewEntry, Records};
use crate::{Config, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A process-wide handle to the ledger sheet. It is created once at startup and shared by every
/// request; cloning it is cheap.
///
/// Appends are serialized by a writer lock: the id of a new entry is computed from the ids in the
/// sheet and the row is appended while the lock is held, so two requests in this process can never be
/// assigned the same id. Reads do not take the lock. Writers in other processes are not
/// coordinated with.
#[derive(Clone)]
pub struct Ledger {
    sheet: Arc<dyn Sheet>,
    writer: Arc<Mutex<()>>,
}

impl Ledger {
    /// Connects to the sheet described by `config`. In `Mode::Google` the service account
    /// credentials are loaded here; access tokens are requested on first use.
    pub async fn connect(config: &Config, mode: Mode) -> Result<Self> {
        let sheet = api::sheet(config, mode).await?;
        Ok(Self::new(sheet))
    }

    pub(crate) fn new(sheet: Arc<dyn Sheet>) -> Self {
        Self {
            sheet,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Opens the sheet and returns the title of its first worksheet.
    pub async fn sheet_title(&self) -> Result<String> {
        let worksheet = self.sheet.worksheet().await?;
        debug!(
            "Opened worksheet '{}' of '{}'",
            worksheet.title, worksheet.spreadsheet_title
        );
        Ok(worksheet.title)
    }

    /// Appends `entry` with the next id and returns that id.
    ///
    /// When the sheet is completely empty, the header row is written first.
    pub async fn add_entry(&self, entry: &NewEntry) -> Result<u64> {
        let _guard = self.writer.lock().await;
        let rows = self.sheet.get_values().await?;
        let id = next_id(&rows)?;
        if rows.is_empty() {
            info!("The sheet is empty, writing the header row");
            let header = Column::header_row().into_iter().map(Value::String).collect();
            self.sheet.append_row(header).await?;
        }
        self.sheet.append_row(entry.to_row(id)).await?;
        info!(
            "Added entry {id}: {} {} {}",
            entry.sheet_date(),
            entry.categorie,
            entry.amount
        );
        Ok(id)
    }

    /// Returns every record of the sheet, in sheet order.
    pub async fn entries(&self) -> Result<Records> {
        let rows = self.sheet.get_values().await?;
        let records = Records::new(rows)?;
        debug!("Read {} records", records.len());
        Ok(records)
    }

    /// Returns the distinct non-empty values of each free-text field.
    pub async fn dropdown_options(&self) -> Result<DropdownOptions> {
        let records = self.entries().await?;
        Ok(DropdownOptions::from_records(&records))
    }
}
