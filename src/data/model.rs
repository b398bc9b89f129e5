use std::fmt;

use arrow::datatypes::DataType;
use serde::ser::{Serialize, Serializer};

/// Fraction of the salary paid out as the yearly bonus.
pub const BONUS_RATE: f64 = 0.10;

/// Value of the `employment_duration` column. No tenure is tracked yet.
pub const EMPLOYMENT_DURATION_PLACEHOLDER: i64 = 0;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the derived table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell.
/// Rows are grouped and deduplicated through `BTreeMap` / `HashSet`, so
/// `CellValue` must be `Ord` and `Hash`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so floats can take part in sets and maps --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let ra = rank(self);
        let rb = rank(other);
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Float(_) | CellValue::Null => serializer.serialize_none(),
        }
    }
}

impl From<Option<String>> for CellValue {
    fn from(v: Option<String>) -> Self {
        v.map_or(CellValue::Null, CellValue::Text)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(CellValue::Null, CellValue::Float)
    }
}

impl From<Option<bool>> for CellValue {
    fn from(v: Option<bool>) -> Self {
        v.map_or(CellValue::Null, CellValue::Bool)
    }
}

// ---------------------------------------------------------------------------
// DType / Column – the fixed schema of the derived table
// ---------------------------------------------------------------------------

/// Storage type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Text,
    Float,
    Integer,
    Bool,
}

impl DType {
    /// Arrow type used for this column in record batches.
    pub fn arrow_type(self) -> DataType {
        match self {
            DType::Text => DataType::Utf8,
            DType::Float => DataType::Float64,
            DType::Integer => DataType::Int64,
            DType::Bool => DataType::Boolean,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Text => "text",
            DType::Float => "f64",
            DType::Integer => "i64",
            DType::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Columns of the derived table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Name,
    Department,
    Salary,
    Active,
    AnnualBonus,
    EmploymentDuration,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Name,
        Column::Department,
        Column::Salary,
        Column::Active,
        Column::AnnualBonus,
        Column::EmploymentDuration,
    ];

    /// Columns that take part in summary statistics and correlation.
    pub const NUMERIC: [Column; 3] = [
        Column::Salary,
        Column::AnnualBonus,
        Column::EmploymentDuration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Department => "department",
            Column::Salary => "salary",
            Column::Active => "active",
            Column::AnnualBonus => "annual_bonus",
            Column::EmploymentDuration => "employment_duration",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn dtype(self) -> DType {
        match self {
            Column::Name | Column::Department => DType::Text,
            Column::Salary | Column::AnnualBonus => DType::Float,
            Column::Active => DType::Bool,
            Column::EmploymentDuration => DType::Integer,
        }
    }

    /// Computed columns are never read back from a source file.
    pub fn is_derived(self) -> bool {
        matches!(self, Column::AnnualBonus | Column::EmploymentDuration)
    }

    /// Compute this column's cell for one record.
    pub fn value_of(self, record: &EmployeeRecord) -> CellValue {
        match self {
            Column::Name => record.name.clone().into(),
            Column::Department => record.department.clone().into(),
            Column::Salary => record.salary.into(),
            Column::Active => record.active.into(),
            Column::AnnualBonus => record.annual_bonus().into(),
            Column::EmploymentDuration => CellValue::Integer(EMPLOYMENT_DURATION_PLACEHOLDER),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// EmployeeRecord – one employee, keyed by id in the store
// ---------------------------------------------------------------------------

/// Attributes of one employee. The id is the store key and is not kept here.
///
/// Fields are optional because bulk loads may leave cells empty. Records
/// built through [`Default`] or [`EmployeeRecord::new`] have every field set.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
    pub name: Option<String>,
    pub department: Option<String>,
    pub salary: Option<f64>,
    pub active: Option<bool>,
}

impl Default for EmployeeRecord {
    fn default() -> Self {
        Self {
            name: Some(Self::DEFAULT_NAME.to_string()),
            department: Some(Self::DEFAULT_DEPARTMENT.to_string()),
            salary: Some(0.0),
            active: Some(false),
        }
    }
}

impl EmployeeRecord {
    pub const DEFAULT_NAME: &'static str = "Unknown";
    pub const DEFAULT_DEPARTMENT: &'static str = "N/A";

    pub fn new(name: impl Into<String>, department: impl Into<String>, salary: f64, active: bool) -> Self {
        Self {
            name: Some(name.into()),
            department: Some(department.into()),
            salary: Some(salary),
            active: Some(active),
        }
    }

    /// A record with every field missing, the starting point for loaders.
    pub fn blank() -> Self {
        Self {
            name: None,
            department: None,
            salary: None,
            active: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_salary(mut self, salary: f64) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// `salary * BONUS_RATE`, missing when the salary is missing.
    pub fn annual_bonus(&self) -> Option<f64> {
        self.salary.map(|s| s * BONUS_RATE)
    }

    /// A missing flag counts as inactive.
    pub fn is_active(&self) -> bool {
        self.active == Some(true)
    }
}

impl fmt::Display for EmployeeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = [
            Column::Name,
            Column::Department,
            Column::Salary,
            Column::Active,
        ]
        .into_iter()
        .map(|c| format!("{}: {}", c.name(), c.value_of(self)))
        .collect();
        write!(f, "{{{}}}", cells.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn default_record_uses_placeholders() {
        let rec = EmployeeRecord::default();
        assert_eq!(rec.name.as_deref(), Some("Unknown"));
        assert_eq!(rec.department.as_deref(), Some("N/A"));
        assert_eq!(rec.salary, Some(0.0));
        assert_eq!(rec.active, Some(false));
    }

    #[test]
    fn builders_override_defaults() {
        let rec = EmployeeRecord::default().with_name("Dana").with_salary(75000.0);
        assert_eq!(rec.name.as_deref(), Some("Dana"));
        assert_eq!(rec.department.as_deref(), Some("N/A"));
        assert_eq!(rec.annual_bonus(), Some(7500.0));
    }

    #[test]
    fn blank_record_has_no_bonus_and_is_inactive() {
        let rec = EmployeeRecord::blank();
        assert_eq!(rec.annual_bonus(), None);
        assert!(!rec.is_active());
        assert!(Column::AnnualBonus.value_of(&rec).is_null());
        assert_eq!(
            Column::EmploymentDuration.value_of(&rec),
            CellValue::Integer(0)
        );
    }

    #[test]
    fn cell_values_order_null_first() {
        let set: BTreeSet<CellValue> = [
            CellValue::Text("b".into()),
            CellValue::Float(2.5),
            CellValue::Null,
            CellValue::Float(-1.0),
        ]
        .into_iter()
        .collect();
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(ordered[0], CellValue::Null);
        assert_eq!(ordered[1], CellValue::Float(-1.0));
        assert_eq!(ordered[3], CellValue::Text("b".into()));
    }

    #[test]
    fn column_names_round_trip() {
        for col in Column::ALL {
            assert_eq!(Column::from_name(col.name()), Some(col));
        }
        assert_eq!(Column::from_name("emp_id"), None);
    }
}
