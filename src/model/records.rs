//! Header-keyed records read back from the ledger sheet.

use crate::error::{Error, ErrorType};
use crate::Result;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

/// One data row of the sheet keyed by the header of each column.
pub type Record = Map<String, Value>;

/// All data rows of the sheet, in sheet order. Serializes as a JSON array of objects.
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Records {
    data: Vec<Record>,
}

impl Records {
    /// Builds records from raw sheet rows where the first row is the header.
    ///
    /// - Rows shorter than the header are padded with `""`.
    /// - Cells beyond the last header, or under an empty header, are dropped.
    /// - Cells are numericised, see `numericise`.
    /// - A header that appears twice is a `DataIntegrity` error.
    pub fn new<S, R>(rows: impl IntoIterator<Item = R>) -> Result<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let mut rows = rows.into_iter();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.into_iter().map(Into::into).collect(),
            None => return Ok(Self::default()),
        };

        let mut seen = HashSet::new();
        for header in headers.iter().filter(|h| !h.is_empty()) {
            if !seen.insert(header.as_str()) {
                return Err(Error::msg(
                    ErrorType::DataIntegrity,
                    format!("Encountered a duplicate header '{header}'"),
                ));
            }
        }

        let data = rows
            .map(|row| {
                let values: Vec<String> = row.into_iter().map(Into::into).collect();
                headers
                    .iter()
                    .enumerate()
                    .filter(|(_, header)| !header.is_empty())
                    .map(|(ix, header)| {
                        let cell = values.get(ix).map(String::as_str).unwrap_or("");
                        (header.clone(), numericise(cell))
                    })
                    .collect::<Record>()
            })
            .collect();

        Ok(Self { data })
    }

    pub fn data(&self) -> &[Record] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The values found under `header`, skipping records that lack the column.
    pub fn values<'a>(&'a self, header: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.data.iter().filter_map(move |record| record.get(header))
    }
}

impl IntoIterator for Records {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

/// Converts a formatted cell into a JSON value: integers become integers, finite floats become
/// floats and anything else, including the empty string, stays a string. Cells containing `_`
/// are never treated as numbers.
pub(crate) fn numericise(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() || cell.contains('_') {
        return Value::String(cell.to_string());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numericise() {
        assert_eq!(numericise("1"), json!(1));
        assert_eq!(numericise("-3"), json!(-3));
        assert_eq!(numericise("12.5"), json!(12.5));
        assert_eq!(numericise("1e3"), json!(1000.0));
        assert_eq!(numericise(""), json!(""));
        assert_eq!(numericise("01-Jan-24"), json!("01-Jan-24"));
        assert_eq!(numericise("1_000"), json!("1_000"));
        assert_eq!(numericise("NaN"), json!("NaN"));
        assert_eq!(numericise("inf"), json!("inf"));
        assert_eq!(numericise("Food"), json!("Food"));
    }

    #[test]
    fn test_records_empty_sheet() {
        let rows: Vec<Vec<String>> = Vec::new();
        let records = Records::new(rows).unwrap();
        assert!(records.is_empty());
        assert_eq!(serde_json::to_value(&records).unwrap(), json!([]));
    }

    #[test]
    fn test_records_header_only() {
        let records = Records::new(vec![vec!["id", "date"]]).unwrap();
        assert_eq!(records.len(), 0);
    }

    #[test]
    fn test_records_padding_and_truncation() {
        let rows = vec![
            vec!["id", "date", "categorie", "fuel_cost"],
            vec!["1", "01-Jan-24", "Food"],
            vec!["2", "02-Jan-24", "Fuel", "1.85", "stray"],
        ];
        let records = Records::new(rows).unwrap();
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([
                {"id": 1, "date": "01-Jan-24", "categorie": "Food", "fuel_cost": ""},
                {"id": 2, "date": "02-Jan-24", "categorie": "Fuel", "fuel_cost": 1.85},
            ])
        );
    }

    #[test]
    fn test_records_keep_header_order() {
        let rows = vec![vec!["id", "date", "amount"], vec!["1", "01-Jan-24", "3"]];
        let records = Records::new(rows).unwrap();
        let keys: Vec<&str> = records.data()[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "date", "amount"]);
    }

    #[test]
    fn test_records_duplicate_header() {
        let rows = vec![vec!["id", "date", "id"], vec!["1", "01-Jan-24", "1"]];
        let err = Records::new(rows).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DataIntegrity);
        assert!(err.to_string().contains("'id'"));
    }

    #[test]
    fn test_records_empty_header_is_skipped() {
        let rows = vec![vec!["id", "", "date"], vec!["1", "x", "01-Jan-24"]];
        let records = Records::new(rows).unwrap();
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([{"id": 1, "date": "01-Jan-24"}])
        );
    }

    #[test]
    fn test_values() {
        let rows = vec![
            vec!["id", "compte"],
            vec!["1", "Checking"],
            vec!["2", ""],
            vec!["3", "Savings"],
        ];
        let records = Records::new(rows).unwrap();
        let values: Vec<&Value> = records.values("compte").collect();
        assert_eq!(values, vec![&json!("Checking"), &json!(""), &json!("Savings")]);
        assert_eq!(records.values("missing").count(), 0);
    }
}
