//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.

use crate::api::{render_cell, Sheet, Worksheet};
use crate::error::{Error, ErrorType, Res};
use crate::model::Column;
use crate::Result;
use anyhow::Context;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{LazyLock, Mutex};

/// The state of every test sheet, keyed by spreadsheet id. Sheets created for the same id share
/// their state, the same way two clients of one Google sheet would.
static SHEETS: LazyLock<Mutex<HashMap<String, TestSheetState>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

const WORKSHEET_TITLE: &str = "Sheet1";
const SPREADSHEET_TITLE: &str = "Finances";

/// The contents of a test sheet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct TestSheetState {
    pub(crate) spreadsheet_title: String,
    pub(crate) worksheet_title: String,
    pub(crate) rows: Vec<Vec<String>>,
    /// When set, every operation fails with this error, e.g. to simulate rejected credentials.
    pub(crate) failure: Option<(ErrorType, String)>,
}

impl TestSheetState {
    pub(crate) fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            spreadsheet_title: SPREADSHEET_TITLE.to_string(),
            worksheet_title: WORKSHEET_TITLE.to_string(),
            rows,
            failure: None,
        }
    }

    /// A sheet holding only the header row.
    pub(crate) fn header_only() -> Self {
        Self::new(vec![Column::header_row()])
    }

    /// A sheet on which every operation fails with `error_type` and `message`.
    #[cfg(test)]
    pub(crate) fn failing(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            failure: Some((error_type, message.into())),
            ..Self::header_only()
        }
    }
}

impl Default for TestSheetState {
    /// Loads the seed data from this module.
    fn default() -> Self {
        match load_csv(SEED_DATA) {
            Ok(rows) => Self::new(rows),
            Err(_) => Self::header_only(),
        }
    }
}

/// An implementation of the `Sheet` trait that does not use Google sheets. Its rows live in
/// memory and, unless a state has been set for its spreadsheet id, it is seeded with some data.
pub(crate) struct TestSheet {
    spreadsheet_id: String,
}

impl TestSheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// Returns a copy of the current state.
    #[cfg(test)]
    pub(crate) fn get_state(&self) -> TestSheetState {
        self.with_state(|state| state.clone())
    }

    /// Replaces the current state.
    #[cfg(test)]
    pub(crate) fn set_state(&self, new_state: TestSheetState) {
        self.with_state(|state| *state = new_state)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut TestSheetState) -> T) -> T {
        let mut sheets = SHEETS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let state = sheets.entry(self.spreadsheet_id.clone()).or_default();
        f(state)
    }

    /// Runs `f` against the state unless a failure has been configured.
    fn try_with_state<T>(&self, f: impl FnOnce(&mut TestSheetState) -> T) -> Result<T> {
        self.with_state(|state| match &state.failure {
            Some((error_type, message)) => Err(Error::msg(*error_type, message)),
            None => Ok(f(state)),
        })
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn worksheet(&self) -> Result<Worksheet> {
        tokio::task::yield_now().await;
        self.try_with_state(|state| Worksheet {
            spreadsheet_title: state.spreadsheet_title.clone(),
            title: state.worksheet_title.clone(),
        })
    }

    async fn get_values(&self) -> Result<Vec<Vec<String>>> {
        // Suspend between calls like a network round trip would, so that interleavings of
        // concurrent requests can be observed in tests.
        tokio::task::yield_now().await;
        self.try_with_state(|state| state.rows.clone())
    }

    async fn append_row(&self, row: Vec<Value>) -> Result<()> {
        tokio::task::yield_now().await;
        let mut row: Vec<String> = row.iter().map(render_cell).collect();
        // The Sheets API does not return trailing empty cells.
        while row.last().is_some_and(String::is_empty) {
            row.pop();
        }
        self.try_with_state(|state| state.rows.push(row))
    }
}

/// Loads data from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Res<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false) // Ensure headers are treated as part of the data
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.context("Unable to parse the seed data")?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Parses CSV rows into a `TestSheetState`, for fixtures.
#[cfg(test)]
pub(crate) fn state_from_csv(csv_data: &str) -> Result<TestSheetState> {
    use crate::error::IntoResult;
    load_csv(csv_data)
        .map(TestSheetState::new)
        .pub_result(ErrorType::DataIntegrity)
}

/// Seed ledger data.
const SEED_DATA: &str = r##"id,date,categorie,type_transaction,amount,compte,beneficiaire,frequence,details,fuel_cost
1,02-Jan-25,Logement,Dépense fixe,850,Compte courant,Agence Dupont,Mensuel,Loyer janvier
2,04-Jan-25,Alimentation,Dépense variable,62.35,Carte bancaire,Carrefour,Ponctuel,
3,06-Jan-25,Transport,Dépense variable,58.2,Carte bancaire,TotalEnergies,Ponctuel,Plein,1.839
4,10-Jan-25,Salaire,Revenu,2450,Compte courant,Employeur,Mensuel
5,12-Jan-25,Loisirs,Dépense variable,15.99,Carte bancaire,Netflix,Mensuel,Abonnement
"##;
