use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use parquet::arrow::ArrowWriter;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::model::{CellValue, Column};
use super::table::{TableRow, TableView, KEY_COLUMN};
use crate::error::{Result, StoreError};

/// Write a table to a file, [`KEY_COLUMN`] first.  Dispatch by extension.
///
/// * `.csv` – comma separated, header row
/// * `.tsv` – tab separated, header row
/// * `.json` – array of row objects
/// * `.parquet` – the table's Arrow schema
///
/// Missing values are written as empty cells, `null` or Parquet nulls.
pub fn export_table(path: &Path, table: &TableView) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_delimited(path, table, b',')?,
        "tsv" => write_delimited(path, table, b'\t')?,
        "json" => write_json(path, table)?,
        "parquet" | "pq" => write_parquet(path, table)?,
        other => return Err(StoreError::UnsupportedFormat(other.to_string())),
    }
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

// -- Delimited text --

/// Plain text for a cell: full float precision, empty for missing.
fn field_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.clone(),
        CellValue::Integer(i) => i.to_string(),
        CellValue::Float(v) if v.is_nan() => String::new(),
        CellValue::Float(v) => v.to_string(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Null => String::new(),
    }
}

fn write_delimited(path: &Path, table: &TableView, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    let header = std::iter::once(KEY_COLUMN).chain(table.columns().iter().map(|c| c.name()));
    writer.write_record(header)?;

    for row in table.rows() {
        let fields = std::iter::once(row.id.clone()).chain(row.cells.iter().map(field_text));
        writer.write_record(fields)?;
    }
    writer.flush()?;
    Ok(())
}

// -- JSON --

/// Serializes one row as `{ "emp_id": ..., <column>: <cell>, ... }`
/// keeping the table's column order.
struct JsonRow<'a> {
    columns: &'a [Column],
    row: &'a TableRow,
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 1))?;
        map.serialize_entry(KEY_COLUMN, &self.row.id)?;
        for (col, cell) in self.columns.iter().zip(&self.row.cells) {
            map.serialize_entry(col.name(), cell)?;
        }
        map.end()
    }
}

fn write_json(path: &Path, table: &TableView) -> Result<()> {
    let rows: Vec<JsonRow<'_>> = table
        .rows()
        .iter()
        .map(|row| JsonRow {
            columns: table.columns(),
            row,
        })
        .collect();
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}

// -- Parquet --

fn write_parquet(path: &Path, table: &TableView) -> Result<()> {
    let batch = table.to_record_batch()?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::EmployeeRecord;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn table() -> TableView {
        let mut map = BTreeMap::new();
        map.insert("101".to_string(), EmployeeRecord::new("Hisham", "HR", 50000.0, true));
        map.insert("103".to_string(), EmployeeRecord::blank().with_name("Bassam"));
        TableView::from_records(&map, &Column::ALL)
    }

    #[test]
    fn csv_has_key_column_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        export_table(&path, &table()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("emp_id,name,department,salary,active,annual_bonus,employment_duration")
        );
        assert_eq!(lines.next(), Some("101,Hisham,HR,50000,true,5000,0"));
        assert_eq!(lines.next(), Some("103,Bassam,,,,,0"));
    }

    #[test]
    fn json_rows_keep_column_order_and_nulls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        export_table(&path, &table()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["emp_id"], "101");
        assert_eq!(rows[0]["active"], true);
        assert!(rows[1]["salary"].is_null());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = export_table(&dir.path().join("out.xlsx"), &table()).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFormat(_)));
    }
}
