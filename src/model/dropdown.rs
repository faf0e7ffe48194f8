use crate::model::{Column, Records};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// The distinct, non-empty values previously used for each free-text field. These populate the
/// selection inputs of the front-end form.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DropdownOptions {
    pub categories: BTreeSet<String>,
    pub types_frais: BTreeSet<String>,
    pub comptes: BTreeSet<String>,
    pub beneficiaires: BTreeSet<String>,
    pub frequences: BTreeSet<String>,
}

impl DropdownOptions {
    pub fn from_records(records: &Records) -> Self {
        Self {
            categories: distinct(records, Column::Categorie),
            types_frais: distinct(records, Column::TypeTransaction),
            comptes: distinct(records, Column::Compte),
            beneficiaires: distinct(records, Column::Beneficiaire),
            frequences: distinct(records, Column::Frequence),
        }
    }
}

fn distinct(records: &Records, column: Column) -> BTreeSet<String> {
    let header = column.header();
    records.values(&header).filter_map(label).collect()
}

/// A numericised cell can come back as a number, e.g. an account named `2024`. Empty cells and
/// zero are not offered as options.
fn label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Records {
        Records::new(vec![
            Column::header_row(),
            vec![
                "1", "01-Jan-24", "Food", "Expense", "12.5", "Checking", "Store", "One-time", "",
                "",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            vec![
                "2", "02-Jan-24", "Fuel", "Expense", "60", "Checking", "Shell", "", "", "1.85",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            vec![
                "3", "03-Jan-24", "Food", "Expense", "8", "2024", "Store", "Monthly",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        ])
        .unwrap()
    }

    #[test]
    fn test_distinct_non_empty_values() {
        let options = DropdownOptions::from_records(&records());
        assert_eq!(
            options.categories,
            BTreeSet::from(["Food".to_string(), "Fuel".to_string()])
        );
        assert_eq!(options.types_frais, BTreeSet::from(["Expense".to_string()]));
        assert_eq!(
            options.comptes,
            BTreeSet::from(["2024".to_string(), "Checking".to_string()])
        );
        assert_eq!(
            options.beneficiaires,
            BTreeSet::from(["Shell".to_string(), "Store".to_string()])
        );
        assert_eq!(
            options.frequences,
            BTreeSet::from(["Monthly".to_string(), "One-time".to_string()])
        );
    }

    #[test]
    fn test_serialized_keys() {
        let options = DropdownOptions::from_records(&Records::default());
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "categories": [],
                "types_frais": [],
                "comptes": [],
                "beneficiaires": [],
                "frequences": []
            })
        );
    }

    #[test]
    fn test_zero_is_skipped() {
        let records = Records::new(vec![
            vec!["id", "compte", "beneficiaire"],
            vec!["1", "0", "Store"],
            vec!["2", "0.0", "0"],
            vec!["3", "Checking", "7"],
        ])
        .unwrap();
        let options = DropdownOptions::from_records(&records);
        assert_eq!(options.comptes, BTreeSet::from(["Checking".to_string()]));
        assert_eq!(
            options.beneficiaires,
            BTreeSet::from(["7".to_string(), "Store".to_string()])
        );
    }

    #[test]
    fn test_missing_column_contributes_nothing() {
        let records = Records::new(vec![vec!["id", "categorie"], vec!["1", "Food"]]).unwrap();
        let options = DropdownOptions::from_records(&records);
        assert_eq!(options.categories.len(), 1);
        assert!(options.comptes.is_empty());
    }
}
