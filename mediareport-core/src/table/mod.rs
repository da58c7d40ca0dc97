//! The typed tabular model: cells, tables and flat tabular documents.

mod cell;
mod document;
mod tabular;

pub use cell::{Cell, CellType, IntoCell, TypedCell};
pub use document::{RowWriter, Table, TableDocument};
pub use tabular::{TabularDialect, TabularDocument};
