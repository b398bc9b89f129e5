use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, DType, EmployeeRecord};
use super::table::KEY_COLUMN;
use crate::error::{Result, StoreError};

/// Records keyed by employee id, as produced by every loader.
pub type Records = BTreeMap<String, EmployeeRecord>;

// ---------------------------------------------------------------------------
// Read options
// ---------------------------------------------------------------------------

/// Text encoding of a delimited source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value.
    Latin1,
}

impl Encoding {
    fn decode(self, bytes: Vec<u8>) -> Result<String> {
        match self {
            Encoding::Utf8 => {
                let text = String::from_utf8(bytes)
                    .map_err(|e| StoreError::malformed(0, format!("invalid UTF-8: {e}")))?;
                Ok(text
                    .strip_prefix('\u{feff}')
                    .map(str::to_string)
                    .unwrap_or(text))
            }
            Encoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

impl FromStr for Encoding {
    type Err = StoreError;

    fn from_str(label: &str) -> Result<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Encoding::Latin1),
            other => Err(StoreError::UnsupportedEncoding(other.to_string())),
        }
    }
}

/// How a source file is interpreted by [`load_file`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    /// Column whose values become the record ids.
    pub key_column: String,
    /// Field delimiter of delimited text files. `None` picks tab for
    /// `.tsv` and comma otherwise.
    pub delimiter: Option<u8>,
    pub encoding: Encoding,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            key_column: KEY_COLUMN.to_string(),
            delimiter: None,
            encoding: Encoding::Utf8,
        }
    }
}

impl ReadOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load employee records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma separated text with a header row
/// * `.tsv` – tab separated text with a header row
/// * `.json`    – `[{ "emp_id": "101", "name": ..., ... }, ...]` or
///   `{ "101": { "name": ..., ... }, ... }`
/// * `.parquet` – one column per field plus the key column
///
/// Columns `annual_bonus` and `employment_duration` are derived and are
/// skipped; other unknown columns are ignored with a warning.
pub fn load_file(path: &Path, options: &ReadOptions) -> Result<Records> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "tsv" => load_delimited(path, options, options.delimiter.unwrap_or(b'\t'))?,
        "csv" | "txt" => load_delimited(path, options, options.delimiter.unwrap_or(b','))?,
        "json" => load_json(path, options)?,
        "parquet" | "pq" => load_parquet(path, options)?,
        other => return Err(StoreError::UnsupportedFormat(other.to_string())),
    };
    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

// -- Shared helpers --

/// Map source column names to record fields, skipping the key column.
fn field_columns<'a, I>(names: I, key_column: &str) -> Vec<(usize, Column)>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .enumerate()
        .filter(|(_, name)| *name != key_column)
        .filter_map(|(idx, name)| match Column::from_name(name) {
            Some(col) if !col.is_derived() => Some((idx, col)),
            Some(_) => None,
            None => {
                log::warn!("Ignoring unknown column '{name}'");
                None
            }
        })
        .collect()
}

/// Parse one text cell for `column`. Empty cells are missing values.
/// Text keeps its surrounding whitespace; numbers and flags are trimmed.
fn parse_cell(raw: &str, column: Column) -> std::result::Result<CellValue, String> {
    let text = raw.trim();
    match column.dtype() {
        DType::Text if raw.is_empty() => Ok(CellValue::Null),
        DType::Text => Ok(CellValue::Text(raw.to_string())),
        _ if text.is_empty() => Ok(CellValue::Null),
        DType::Float => {
            let v: f64 = text
                .parse()
                .map_err(|_| format!("{column}: '{text}' is not a number"))?;
            Ok(if v.is_nan() { CellValue::Null } else { CellValue::Float(v) })
        }
        DType::Integer => text
            .parse()
            .map(CellValue::Integer)
            .map_err(|_| format!("{column}: '{text}' is not an integer")),
        DType::Bool => match text.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(CellValue::Bool(true)),
            "false" | "0" => Ok(CellValue::Bool(false)),
            _ => Err(format!("{column}: '{text}' is not a boolean")),
        },
    }
}

/// Store a parsed cell into the matching record field.
fn set_field(record: &mut EmployeeRecord, column: Column, value: CellValue) {
    match column {
        Column::Name => record.name = value.as_str().map(str::to_string),
        Column::Department => record.department = value.as_str().map(str::to_string),
        Column::Salary => record.salary = value.as_f64(),
        Column::Active => record.active = value.as_bool(),
        Column::AnnualBonus | Column::EmploymentDuration => {}
    }
}

fn insert_record(records: &mut Records, id: String, record: EmployeeRecord, row: usize) -> Result<()> {
    if id.is_empty() {
        return Err(StoreError::malformed(row, "empty employee id"));
    }
    if records.contains_key(&id) {
        log::warn!("Row {row}: duplicate id '{id}', keeping the later record");
    }
    records.insert(id, record);
    Ok(())
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one employee per line.
/// Row numbers in errors count data rows from 1. An empty text cell
/// cannot be told apart from a missing one and loads as missing.
fn load_delimited(path: &Path, options: &ReadOptions, delimiter: u8) -> Result<Records> {
    let text = options.encoding.decode(std::fs::read(path)?)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let key_idx = headers
        .iter()
        .position(|h| *h == options.key_column)
        .ok_or_else(|| StoreError::MissingKeyColumn {
            column: options.key_column.clone(),
        })?;
    let fields = field_columns(headers.iter().map(String::as_str), &options.key_column);

    let mut records = Records::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = row_no + 1;
        let line = result.map_err(|e| {
            if let csv::ErrorKind::UnequalLengths { expected_len, len, .. } = *e.kind() {
                StoreError::malformed(row, format!("expected {expected_len} fields, found {len}"))
            } else {
                e.into()
            }
        })?;
        let id = line.get(key_idx).unwrap_or("").trim().to_string();

        let mut record = EmployeeRecord::blank();
        for &(col_idx, column) in &fields {
            let value = parse_cell(line.get(col_idx).unwrap_or(""), column)
                .map_err(|reason| StoreError::malformed(row, reason))?;
            set_field(&mut record, column, value);
        }
        insert_record(&mut records, id, record, row)?;
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepts a records array (each object carries the key column) or an
/// object keyed by employee id.
fn load_json(path: &Path, options: &ReadOptions) -> Result<Records> {
    let text = options.encoding.decode(std::fs::read(path)?)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let mut records = Records::new();
    match root {
        JsonValue::Array(rows) => {
            for (row_no, value) in rows.iter().enumerate() {
                let row = row_no + 1;
                let obj = value
                    .as_object()
                    .ok_or_else(|| StoreError::malformed(row, "not a JSON object"))?;
                let id = obj
                    .get(&options.key_column)
                    .and_then(json_key)
                    .ok_or_else(|| StoreError::MissingKeyColumn {
                        column: options.key_column.clone(),
                    })?;
                let record = json_record(obj, &options.key_column, row)?;
                insert_record(&mut records, id, record, row)?;
            }
        }
        JsonValue::Object(by_id) => {
            for (row_no, (id, value)) in by_id.iter().enumerate() {
                let row = row_no + 1;
                let obj = value
                    .as_object()
                    .ok_or_else(|| StoreError::malformed(row, "not a JSON object"))?;
                let record = json_record(obj, &options.key_column, row)?;
                insert_record(&mut records, id.trim().to_string(), record, row)?;
            }
        }
        _ => return Err(StoreError::malformed(0, "expected a JSON array or object")),
    }
    Ok(records)
}

fn json_key(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_record(
    obj: &serde_json::Map<String, JsonValue>,
    key_column: &str,
    row: usize,
) -> Result<EmployeeRecord> {
    let fields = field_columns(obj.keys().map(String::as_str), key_column);
    let values: Vec<&JsonValue> = obj.values().collect();

    let mut record = EmployeeRecord::blank();
    for (idx, column) in fields {
        let value = json_to_cell(values[idx], column)
            .map_err(|reason| StoreError::malformed(row, reason))?;
        set_field(&mut record, column, value);
    }
    Ok(record)
}

fn json_to_cell(value: &JsonValue, column: Column) -> std::result::Result<CellValue, String> {
    match (value, column.dtype()) {
        (JsonValue::Null, _) => Ok(CellValue::Null),
        (JsonValue::String(s), DType::Text) => Ok(CellValue::Text(s.clone())),
        (JsonValue::String(s), _) => parse_cell(s, column),
        (JsonValue::Number(n), DType::Float) => n
            .as_f64()
            .map(CellValue::Float)
            .ok_or_else(|| format!("{column}: '{n}' is not a number")),
        (JsonValue::Number(n), DType::Text) => Ok(CellValue::Text(n.to_string())),
        (JsonValue::Bool(b), DType::Bool) => Ok(CellValue::Bool(*b)),
        (other, _) => Err(format!("{column}: unexpected value {other}")),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by `export_table` or by any tool that stores
/// the key and field columns as scalar columns. Each column is cast to the
/// field's Arrow type; values that cannot be cast become missing.
fn load_parquet(path: &Path, options: &ReadOptions) -> Result<Records> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Records::new();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let key_idx = schema
            .index_of(&options.key_column)
            .map_err(|_| StoreError::MissingKeyColumn {
                column: options.key_column.clone(),
            })?;
        let keys = cast(batch.column(key_idx), &DataType::Utf8)?;
        let keys = keys.as_string::<i32>();

        let fields = field_columns(
            schema.fields().iter().map(|f| f.name().as_str()),
            &options.key_column,
        );
        let columns: Vec<(Column, Vec<CellValue>)> = fields
            .into_iter()
            .map(|(idx, col)| arrow_cells(batch.column(idx), col).map(|cells| (col, cells)))
            .collect::<Result<_>>()?;

        for i in 0..batch.num_rows() {
            let row = row_offset + i + 1;
            let id = if keys.is_null(i) {
                String::new()
            } else {
                keys.value(i).trim().to_string()
            };
            let mut record = EmployeeRecord::blank();
            for (column, cells) in &columns {
                set_field(&mut record, *column, cells[i].clone());
            }
            insert_record(&mut records, id, record, row)?;
        }
        row_offset += batch.num_rows();
    }
    Ok(records)
}

/// Extract the cells of one Arrow column as the given field's type.
fn arrow_cells(array: &ArrayRef, column: Column) -> Result<Vec<CellValue>> {
    let cast_array = cast(array, &column.dtype().arrow_type())?;
    let cells: Vec<CellValue> = match column.dtype() {
        DType::Text => cast_array
            .as_string::<i32>()
            .iter()
            .map(|v| CellValue::from(v.map(str::to_string)))
            .collect(),
        DType::Float => cast_array
            .as_primitive::<Float64Type>()
            .iter()
            .map(CellValue::from)
            .collect(),
        DType::Integer => cast_array
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Integer))
            .collect(),
        DType::Bool => cast_array
            .as_boolean()
            .iter()
            .map(CellValue::from)
            .collect(),
    };
    Ok(cells)
}
