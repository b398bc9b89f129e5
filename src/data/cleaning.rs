use std::collections::HashSet;
use std::fmt;

use super::model::{CellValue, Column};
use super::table::TableView;

/// Fill value for a missing department.
pub const FILL_DEPARTMENT: &str = "Unknown";

// ---------------------------------------------------------------------------
// Missing values
// ---------------------------------------------------------------------------

/// Null counts observed before filling, and how many cells were filled.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingValuesReport {
    pub missing: Vec<(Column, usize)>,
    pub filled: usize,
}

impl MissingValuesReport {
    pub fn missing_in(&self, column: Column) -> usize {
        self.missing
            .iter()
            .find(|(c, _)| *c == column)
            .map_or(0, |(_, n)| *n)
    }

    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|(_, n)| n).sum()
    }
}

impl fmt::Display for MissingValuesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Missing Values Per Column:")?;
        for (col, n) in &self.missing {
            writeln!(f, "  {:<20} {n}", col.name())?;
        }
        write!(f, "Filled {} missing values.", self.filled)
    }
}

/// Replace nulls in `table`: department → "Unknown", salary → 0,
/// active → false. A filled salary also zeroes its bonus.
/// Names are counted but left missing.
pub fn fill_missing(mut table: TableView) -> (MissingValuesReport, TableView) {
    let missing = table.null_counts();
    let department = table.position(Column::Department);
    let salary = table.position(Column::Salary);
    let active = table.position(Column::Active);
    let bonus = table.position(Column::AnnualBonus);

    let mut filled = 0;
    for row in table.rows_mut() {
        if let Some(idx) = department {
            if row.cells[idx].is_null() {
                row.cells[idx] = CellValue::Text(FILL_DEPARTMENT.to_string());
                filled += 1;
            }
        }
        if let Some(idx) = salary {
            if row.cells[idx].is_null() {
                row.cells[idx] = CellValue::Float(0.0);
                filled += 1;
                if let Some(b) = bonus {
                    row.cells[b] = CellValue::Float(0.0);
                }
            }
        }
        if let Some(idx) = active {
            if row.cells[idx].is_null() {
                row.cells[idx] = CellValue::Bool(false);
                filled += 1;
            }
        }
    }

    (MissingValuesReport { missing, filled }, table)
}

// ---------------------------------------------------------------------------
// Duplicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupeReport {
    pub before: usize,
    pub after: usize,
}

impl DedupeReport {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

impl fmt::Display for DedupeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Removed {} duplicate rows.", self.removed())
    }
}

/// Drop rows whose cells equal an earlier row's cells. The row id is not
/// compared, so two ids with identical attributes count as duplicates.
pub fn dedupe(mut table: TableView) -> (DedupeReport, TableView) {
    let before = table.len();
    let mut seen: HashSet<Vec<CellValue>> = HashSet::new();
    table.rows_mut().retain(|row| seen.insert(row.cells.clone()));
    let report = DedupeReport {
        before,
        after: table.len(),
    };
    (report, table)
}
