use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use super::model::{CellValue, Column, DType, EmployeeRecord};
use crate::error::Result;

/// Name of the row-key column in every exported or loaded table.
pub const KEY_COLUMN: &str = "emp_id";

// ---------------------------------------------------------------------------
// TableRow / TableView – the derived tabular projection of the store
// ---------------------------------------------------------------------------

/// One row of a [`TableView`]: the employee id plus one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<CellValue>,
}

/// A read-only row/column projection of the store.
///
/// Built fresh from the authoritative records every time it is asked for.
/// `cells[i]` of every row belongs to `columns[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    columns: Vec<Column>,
    rows: Vec<TableRow>,
}

impl TableView {
    /// Project `records` onto `columns`, one row per record in iteration order.
    pub fn from_records<'a, I>(records: I, columns: &[Column]) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a EmployeeRecord)>,
    {
        let rows = records
            .into_iter()
            .map(|(id, rec)| TableRow {
                id: id.clone(),
                cells: columns.iter().map(|c| c.value_of(rec)).collect(),
            })
            .collect();
        TableView {
            columns: columns.to_vec(),
            rows,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<TableRow> {
        &mut self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(rows, columns)`, not counting the id column.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.id.as_str())
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// All cells of one column, or `None` when it was not projected.
    pub fn column(&self, column: Column) -> Option<Vec<&CellValue>> {
        let idx = self.position(column)?;
        Some(self.rows.iter().map(|r| &r.cells[idx]).collect())
    }

    /// Look up a single cell by row id.
    pub fn get(&self, id: &str, column: Column) -> Option<&CellValue> {
        let idx = self.position(column)?;
        self.rows
            .iter()
            .find(|r| r.id == id)
            .map(|r| &r.cells[idx])
    }

    /// Non-null numeric values of a column, in row order.
    pub fn numeric_values(&self, column: Column) -> Vec<f64> {
        self.column(column)
            .map(|cells| cells.into_iter().filter_map(CellValue::as_f64).collect())
            .unwrap_or_default()
    }

    /// Per-column count of null cells, in column order.
    pub fn null_counts(&self) -> Vec<(Column, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let nulls = self.rows.iter().filter(|r| r.cells[idx].is_null()).count();
                (*col, nulls)
            })
            .collect()
    }

    /// Convert to an Arrow batch with [`KEY_COLUMN`] as the leading column.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![Field::new(KEY_COLUMN, DataType::Utf8, false)];
        let ids: Vec<&str> = self.ids().collect();
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from(ids))];

        for (idx, col) in self.columns.iter().enumerate() {
            let cells = self.rows.iter().map(|r| &r.cells[idx]);
            let array: ArrayRef = match col.dtype() {
                DType::Text => {
                    let values: Vec<Option<&str>> = cells.map(CellValue::as_str).collect();
                    Arc::new(StringArray::from(values))
                }
                DType::Float => {
                    let values: Vec<Option<f64>> = cells.map(CellValue::as_f64).collect();
                    Arc::new(Float64Array::from(values))
                }
                DType::Integer => {
                    let values: Vec<Option<i64>> = cells
                        .map(|c| match c {
                            CellValue::Integer(i) => Some(*i),
                            _ => None,
                        })
                        .collect();
                    Arc::new(Int64Array::from(values))
                }
                DType::Bool => {
                    let values: Vec<Option<bool>> = cells.map(CellValue::as_bool).collect();
                    Arc::new(BooleanArray::from(values))
                }
            };
            fields.push(Field::new(col.name(), col.dtype().arrow_type(), true));
            arrays.push(array);
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(batch)
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let batch = self.to_record_batch().map_err(|_| fmt::Error)?;
        let pretty = pretty_format_batches(&[batch]).map_err(|_| fmt::Error)?;
        write!(f, "{pretty}")
    }
}
