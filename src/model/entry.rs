//! The `NewEntry` submitted by a client and the assignment of its id.

use crate::error::{Error, ErrorType};
use crate::Result;
use chrono::NaiveDate;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// The date format written to the sheet, e.g. `01-Jan-24`.
pub const SHEET_DATE_FORMAT: &str = "%d-%b-%y";

/// A transaction as submitted by a client. The `id` is not part of it, the server assigns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub categorie: String,
    pub type_transaction: String,
    /// Accepts a JSON number or a numeric string.
    #[serde(deserialize_with = "number")]
    pub amount: f64,
    pub compte: String,
    pub beneficiaire: String,
    pub frequence: String,
    #[serde(default)]
    pub details: String,
    /// Accepts a JSON number, a numeric string, `null` or `""`. The last two mean absent.
    #[serde(default, deserialize_with = "optional_number")]
    pub fuel_cost: Option<f64>,
}

impl NewEntry {
    /// The date as it is written to the sheet.
    pub fn sheet_date(&self) -> String {
        self.date.format(SHEET_DATE_FORMAT).to_string()
    }

    /// Renders the cells of the row that will be appended, in `HEADER` order.
    pub fn to_row(&self, id: u64) -> Vec<Value> {
        vec![
            json!(id),
            Value::String(self.sheet_date()),
            Value::String(self.categorie.clone()),
            Value::String(self.type_transaction.clone()),
            json!(self.amount),
            Value::String(self.compte.clone()),
            Value::String(self.beneficiaire.clone()),
            Value::String(self.frequence.clone()),
            Value::String(self.details.clone()),
            match self.fuel_cost {
                Some(fuel_cost) => json!(fuel_cost),
                None => Value::String(String::new()),
            },
        ]
    }
}

/// Computes the id of the next row from all rows of the sheet, header included.
///
/// The id is one more than the largest integer id in the first column, or `1` when the sheet holds
/// no data rows. Rows whose id cell is not an integer are skipped, except the last row: a last row
/// without an integer id is a `DataIntegrity` error.
pub fn next_id<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<u64> {
    let data = match rows.split_first() {
        Some((_header, data)) if !data.is_empty() => data,
        _ => return Ok(1),
    };
    let row_number = rows.len();
    let cell = id_cell(&data[data.len() - 1]);
    let last_id: u64 = cell.parse().map_err(|_| {
        Error::msg(
            ErrorType::DataIntegrity,
            format!("The id in the last row (row {row_number}) is not an integer: '{cell}'"),
        )
    })?;
    let max_id = data
        .iter()
        .filter_map(|row| id_cell(row).parse::<u64>().ok())
        .fold(last_id, u64::max);
    max_id.checked_add(1).ok_or_else(|| {
        Error::msg(
            ErrorType::DataIntegrity,
            format!("The largest id in the sheet is too large: {max_id}"),
        )
    })
}

fn id_cell<S: AsRef<str>>(row: &[S]) -> &str {
    row.first().map(|s| s.as_ref().trim()).unwrap_or("")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => parse_number(&s).map_err(D::Error::custom),
    }
}

fn optional_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => parse_number(&s).map(Some).map_err(D::Error::custom),
    }
}

fn parse_number(s: &str) -> std::result::Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(format!("'{s}' is not a valid number")),
    }
}
