//! Types that represent the data model: the fixed column layout of the ledger sheet, the
//! `NewEntry` a client submits, the header-keyed `Records` read back, and the `DropdownOptions`
//! derived from them.
mod column;
mod dropdown;
mod entry;
mod records;

pub use column::{Column, HEADER};
pub use dropdown::DropdownOptions;
pub use entry::{next_id, NewEntry};
pub use records::{Record, Records};
