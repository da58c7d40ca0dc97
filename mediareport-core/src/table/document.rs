//! Named tables of typed rows.

use indexmap::IndexMap;
use log::debug;

use super::cell::{Cell, CellType, IntoCell, TypedCell};
use crate::error::{CoreError, CoreResult};

/// One table: a header, rows of typed cells and the per-column types
/// recorded from the first non-null cell written to each column.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    header: Vec<String>,
    rows: Vec<Vec<TypedCell>>,
    types: Vec<Option<CellType>>,
    hints: Vec<Option<CellType>>,
}

impl Table {
    fn new(name: String, header: Vec<String>) -> CoreResult<Self> {
        if header.is_empty() {
            return Err(CoreError::Schema(format!(
                "Table '{name}' needs at least one column"
            )));
        }
        let width = header.len();
        Ok(Self {
            name,
            header,
            rows: Vec::new(),
            types: vec![None; width],
            hints: vec![None; width],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<TypedCell>] {
        &self.rows
    }

    /// Opens a new, empty row.
    pub fn add_row(&mut self) -> RowWriter<'_> {
        self.rows.push(Vec::with_capacity(self.header.len()));
        let row = self.rows.len() - 1;
        RowWriter { table: self, row }
    }

    /// Appends a complete row. Nothing is written when it is wider than the header.
    pub fn push_row(&mut self, cells: Vec<TypedCell>) -> CoreResult<()> {
        if cells.len() > self.header.len() {
            return Err(self.overflow_error());
        }
        for (col, cell) in cells.iter().enumerate() {
            self.record_type(col, cell);
        }
        self.rows.push(cells);
        Ok(())
    }

    /// True when there is no row, or only empty rows.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Resolved column types. A column holding only nulls takes the type of
    /// its first null; a column never written to falls back to `String`.
    pub fn row_types(&self) -> Vec<CellType> {
        self.types
            .iter()
            .zip(&self.hints)
            .enumerate()
            .map(|(col, (kind, hint))| {
                kind.or(*hint).unwrap_or_else(|| {
                    debug!(
                        "No type found for column '{}' in table '{}', using string",
                        self.header[col], self.name
                    );
                    CellType::String
                })
            })
            .collect()
    }

    /// Cell at a position, `Null` for the missing tail of a short row.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or(&Cell::Null, |c| &c.value)
    }

    fn record_type(&mut self, col: usize, cell: &TypedCell) {
        if cell.is_null() {
            if self.hints[col].is_none() {
                self.hints[col] = Some(cell.kind);
            }
        } else if self.types[col].is_none() {
            self.types[col] = Some(cell.kind);
        }
    }

    fn overflow_error(&self) -> CoreError {
        CoreError::Schema(format!(
            "Row is full: table '{}' has only {} columns",
            self.name,
            self.header.len()
        ))
    }
}

/// An open row of a [`Table`], filled cell by cell.
pub struct RowWriter<'a> {
    table: &'a mut Table,
    row: usize,
}

impl RowWriter<'_> {
    /// Adds the next cell. Fails, leaving the row untouched, once every
    /// column holds a value.
    pub fn add_cell(&mut self, value: impl IntoCell) -> CoreResult<&mut Self> {
        let col = self.table.rows[self.row].len();
        if col >= self.table.header.len() {
            return Err(self.table.overflow_error());
        }
        let cell = value.into_cell();
        self.table.record_type(col, &cell);
        self.table.rows[self.row].push(cell);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.table.rows[self.row].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All the tables produced by one export operation.
#[derive(Debug, Clone, Default)]
pub struct TableDocument {
    tables: IndexMap<String, Table>,
}

impl TableDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a named table with its header.
    pub fn create_table<I, S>(&mut self, name: &str, header: I) -> CoreResult<&mut Table>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.tables.contains_key(name) {
            return Err(CoreError::Schema(format!("Table '{name}' already exists")));
        }
        let table = Table::new(name.to_string(), header.into_iter().map(Into::into).collect())?;
        Ok(self.tables.entry(name.to_string()).or_insert(table))
    }

    /// The non-empty tables, in creation order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values().filter(|t| !t.is_empty())
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name).filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.tables().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells;

    #[test]
    fn empty_header_is_rejected() {
        let mut doc = TableDocument::new();
        let err = doc.create_table("t", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, CoreError::Schema(_)));
    }

    #[test]
    fn overflow_keeps_existing_cells() {
        let mut doc = TableDocument::new();
        let table = doc.create_table("t", ["a", "b"]).unwrap();
        {
            let mut row = table.add_row();
            row.add_cell("x").unwrap().add_cell(1_i32).unwrap();
            assert!(row.add_cell(2_i32).is_err());
            assert_eq!(row.len(), 2);
        }
        assert_eq!(table.cell(0, 0), &Cell::String("x".into()));
        assert_eq!(table.cell(0, 1), &Cell::Integer(1));

        assert!(table.push_row(cells!["y", 2_i32, 3_i32]).is_err());
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn empty_tables_are_hidden() {
        let mut doc = TableDocument::new();
        doc.create_table("empty", ["a"]).unwrap();
        doc.create_table("blank rows", ["a"]).unwrap().add_row();
        doc.create_table("filled", ["a"])
            .unwrap()
            .push_row(cells!["v"])
            .unwrap();

        let names: Vec<_> = doc.tables().map(Table::name).collect();
        assert_eq!(names, vec!["filled"]);
        assert!(doc.table("blank rows").is_none());
    }

    #[test]
    fn first_non_null_type_wins() {
        let mut doc = TableDocument::new();
        let table = doc.create_table("t", ["a", "b", "c"]).unwrap();
        table.push_row(cells![None::<String>, 1_i32, None::<f64>]).unwrap();
        table.push_row(cells![3.5, 2_i64]).unwrap();
        table.push_row(cells!["z", 2.5_f64]).unwrap();

        assert_eq!(
            table.row_types(),
            vec![CellType::Float, CellType::Integer, CellType::Float]
        );
        assert_eq!(table.cell(1, 2), &Cell::Null);
    }

    #[test]
    fn untouched_column_defaults_to_string() {
        let mut doc = TableDocument::new();
        let table = doc.create_table("t", ["a", "b"]).unwrap();
        table.push_row(cells![1_i32]).unwrap();
        assert_eq!(table.row_types(), vec![CellType::Integer, CellType::String]);
    }

    #[test]
    fn duplicate_table_name_is_rejected() {
        let mut doc = TableDocument::new();
        doc.create_table("t", ["a"]).unwrap();
        assert!(doc.create_table("t", ["b"]).is_err());
    }
}
