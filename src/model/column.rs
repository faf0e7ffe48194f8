use serde::{Deserialize, Serialize};

/// The columns of the ledger sheet. The serialized name of each variant is the exact header
/// string found in row 1 of the sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Date,
    Categorie,
    TypeTransaction,
    Amount,
    Compte,
    Beneficiaire,
    Frequence,
    Details,
    FuelCost,
}

serde_plain::derive_display_from_serialize!(Column);
serde_plain::derive_fromstr_from_deserialize!(Column);

/// The header row, in the order that cells are written.
pub const HEADER: [Column; 10] = [
    Column::Id,
    Column::Date,
    Column::Categorie,
    Column::TypeTransaction,
    Column::Amount,
    Column::Compte,
    Column::Beneficiaire,
    Column::Frequence,
    Column::Details,
    Column::FuelCost,
];

impl Column {
    /// The header string for this column, e.g. `type_transaction`.
    pub fn header(&self) -> String {
        self.to_string()
    }

    /// The header row as strings.
    pub fn header_row() -> Vec<String> {
        HEADER.iter().map(Column::header).collect()
    }
}
