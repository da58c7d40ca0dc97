//! SQLite database, one table per document table.
//!
//! Each export drops and recreates its tables, so exporting twice to the
//! same file leaves one copy of every row.

use std::fs;
use std::path::Path;

use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use super::table::{TableSerializer, field_name};
use crate::error::{CoreResult, ExportContext};
use crate::numbers::storable_float;
use crate::table::{Cell, Table, TableDocument};

/// Rows inserted per transaction.
const INSERT_BATCH_SIZE: usize = 10_000;

fn sql_value(cell: &Cell) -> Value {
    match cell {
        Cell::String(value) => Value::Text(value.clone()),
        Cell::Float(value) => storable_float(*value).map_or(Value::Null, Value::Real),
        Cell::Integer(value) => Value::Integer(i64::from(*value)),
        Cell::Long(value) => Value::Integer(*value),
        Cell::Null => Value::Null,
    }
}

fn create_table_sql(name: &str, table: &Table) -> String {
    let mut fields = vec!["\"id\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    fields.extend(
        table
            .header()
            .iter()
            .zip(table.row_types())
            .map(|(header, kind)| format!("\"{}\" {}", field_name(header), kind.sql_type())),
    );
    format!("CREATE TABLE \"{name}\" ({})", fields.join(", "))
}

fn insert_sql(name: &str, table: &Table) -> String {
    let columns: Vec<String> = table
        .header()
        .iter()
        .map(|header| format!("\"{}\"", field_name(header)))
        .collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!("INSERT INTO \"{name}\" ({}) VALUES ({placeholders})", columns.join(", "))
}

fn push_table(connection: &mut Connection, table: &Table) -> rusqlite::Result<()> {
    let name = field_name(table.name());
    connection.execute(&format!("DROP TABLE IF EXISTS \"{name}\""), [])?;
    let create = create_table_sql(&name, table);
    debug!("Execute SQL: {create}");
    connection.execute(&create, [])?;

    debug!("Add {} rows to \"{}\" table in SQLite", table.rows().len(), table.name());
    let insert = insert_sql(&name, table);
    let width = table.header().len();
    for batch in table.rows().chunks(INSERT_BATCH_SIZE) {
        let transaction = connection.transaction()?;
        {
            let mut statement = transaction.prepare_cached(&insert)?;
            for row in batch {
                let values = (0..width).map(|col| row.get(col).map_or(Value::Null, |cell| sql_value(&cell.value)));
                statement.execute(params_from_iter(values))?;
            }
        }
        debug!("SQL commit {} rows", batch.len());
        transaction.commit()?;
    }
    Ok(())
}

fn write_database(document: &TableDocument, path: &Path) -> rusqlite::Result<()> {
    let mut connection = Connection::open(path)?;
    connection.pragma_update_and_check(None, "journal_mode", "OFF", |row| row.get::<_, String>(0))?;
    connection.pragma_update(None, "synchronous", "OFF")?;
    connection.pragma_update(None, "temp_store", "MEMORY")?;
    for table in document.tables() {
        push_table(&mut connection, table)?;
    }
    connection.close().map_err(|(_, e)| e)
}

pub struct SqliteSerializer;

impl TableSerializer for SqliteSerializer {
    fn format_name(&self) -> &'static str {
        "sqlite"
    }

    fn format_long_name(&self) -> &'static str {
        "SQLite database"
    }

    fn format_description(&self) -> &'static str {
        "one table per document table, typed columns"
    }

    fn write_file(&self, document: &TableDocument, path: &Path) -> CoreResult<()> {
        write_database(document, path).export_context(path)
    }

    /// The database is built in a scratch file, then read back.
    fn to_bytes(&self, document: &TableDocument, file_name: &str) -> CoreResult<Vec<u8>> {
        let target = Path::new(file_name);
        let scratch = tempfile::Builder::new()
            .suffix(".sqlite")
            .tempfile()
            .export_context(target)?;
        write_database(document, scratch.path()).export_context(target)?;
        fs::read(scratch.path()).export_context(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells;
    use crate::table::{CellType, TypedCell};

    fn document() -> TableDocument {
        let mut document = TableDocument::new();
        let table = document
            .create_table("Audio phase", ["Frame", "Pts time", "Value", "Scope/Channel"])
            .unwrap();
        table.push_row(cells![1_i64, 0.04, 0.5_f64, "L"]).unwrap();
        table.push_row(cells![2_i64, 0.08, f64::NAN]).unwrap();
        document
    }

    #[test]
    fn typed_columns_and_nulls() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("media-datas.sqlite");
        SqliteSerializer.write_file(&document(), &path).unwrap();

        let connection = Connection::open(&path).unwrap();
        let sql: String = connection
            .query_row(
                "SELECT sql FROM sqlite_master WHERE name = 'audio_phase'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("\"pts_time\" REAL"));
        assert!(sql.contains("\"scope_channel\" TEXT"));

        let (value, scope): (Option<f64>, Option<String>) = connection
            .query_row(
                "SELECT value, scope_channel FROM audio_phase WHERE frame = 2",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(value, None);
        assert_eq!(scope, None);
    }

    #[test]
    fn export_twice_recreates_tables() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("media-datas.sqlite");
        SqliteSerializer.write_file(&document(), &path).unwrap();

        let mut second = TableDocument::new();
        second
            .create_table("Audio phase", ["Frame", "Pts time", "Value", "Scope/Channel"])
            .unwrap()
            .push_row(cells![7_i64, 0.28, 0.25_f64, "R"])
            .unwrap();
        SqliteSerializer.write_file(&second, &path).unwrap();

        let connection = Connection::open(&path).unwrap();
        let rows: Vec<(i64, i64, String)> = connection
            .prepare("SELECT id, frame, scope_channel FROM audio_phase ORDER BY id")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows, vec![(1, 7, "R".to_string())]);
    }

    #[test]
    fn non_finite_floats_are_stored_as_sentinels() {
        let mut document = TableDocument::new();
        let table = document.create_table("Peaks", ["Low", "High", "Unknown"]).unwrap();
        let float = |value: f64| TypedCell {
            value: Cell::Float(value),
            kind: CellType::Float,
        };
        table
            .push_row(vec![float(f64::NEG_INFINITY), float(f64::INFINITY), float(f64::NAN)])
            .unwrap();

        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("media-datas.sqlite");
        SqliteSerializer.write_file(&document, &path).unwrap();

        let connection = Connection::open(&path).unwrap();
        let (low, high, unknown): (f64, f64, Option<f64>) = connection
            .query_row("SELECT low, high, unknown FROM peaks", [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .unwrap();
        assert_eq!(low, -144.0);
        assert_eq!(high, 144.0);
        assert_eq!(unknown, None);
    }

    #[test]
    fn bytes_are_a_database() {
        let bytes = SqliteSerializer.to_bytes(&document(), "media-datas.sqlite").unwrap();
        assert!(bytes.starts_with(b"SQLite format 3\0"));
    }
}
