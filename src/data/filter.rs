use super::model::EmployeeRecord;

// ---------------------------------------------------------------------------
// Filter predicate: salary threshold and department
// ---------------------------------------------------------------------------

/// Row filter used by `filter`, `export_filtered` and the viewer.
///
/// A `salary_threshold` of exactly `0.0` is a sentinel meaning "no salary
/// filter": every row passes the salary test, including rows whose salary is
/// `0` or missing. Any other threshold keeps rows with `salary > threshold`
/// (missing salaries fail). Both predicates must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFilter {
    pub salary_threshold: f64,
    /// Exact department match, `None` for all departments.
    pub department: Option<String>,
}

impl EmployeeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn salary_above(mut self, threshold: f64) -> Self {
        self.salary_threshold = threshold;
        self
    }

    pub fn in_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Whether the threshold is an actual bound rather than the sentinel.
    pub fn filters_salary(&self) -> bool {
        self.salary_threshold != 0.0
    }

    /// Whether a record passes every active predicate.
    pub fn matches(&self, record: &EmployeeRecord) -> bool {
        if self.filters_salary() {
            match record.salary {
                Some(s) if s > self.salary_threshold => {}
                _ => return false,
            }
        }
        match &self.department {
            Some(dep) => record.department.as_deref() == Some(dep.as_str()),
            None => true,
        }
    }
}
