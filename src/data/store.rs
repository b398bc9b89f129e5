use std::collections::BTreeMap;
use std::path::Path;

use super::cleaning::{self, DedupeReport, MissingValuesReport};
use super::export::export_table;
use super::filter::EmployeeFilter;
use super::loader::{self, ReadOptions, Records};
use super::model::{CellValue, Column, EmployeeRecord};
use super::stats::{self, Description};
use super::table::TableView;
use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// EmployeeStore – the authoritative id → record mapping
// ---------------------------------------------------------------------------

/// In-memory employee records keyed by id.
///
/// Every analytic builds a fresh [`TableView`] from the records, so results
/// always reflect the latest mutation. Iteration follows id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeStore {
    employees: Records,
}

impl EmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already loaded set of records.
    pub fn from_records(employees: Records) -> Self {
        Self { employees }
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&EmployeeRecord> {
        self.employees.get(id)
    }

    // -- Mutation --

    /// Insert a record, silently replacing any record with the same id.
    pub fn add(&mut self, id: impl Into<String>, record: EmployeeRecord) {
        let id = id.into();
        if self.employees.insert(id.clone(), record).is_some() {
            log::debug!("Replaced employee '{id}'");
        }
    }

    /// Clear the active flag of every listed id. Unknown ids are ignored.
    pub fn mark_inactive<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            match self.employees.get_mut(id.as_ref()) {
                Some(rec) => rec.active = Some(false),
                None => log::debug!("mark_inactive: no employee '{}'", id.as_ref()),
            }
        }
    }

    /// Overwrite the salary of `id`. Unknown ids and salaries that are
    /// negative or not finite are ignored.
    pub fn update_salary(&mut self, id: &str, salary: f64) {
        if !salary.is_finite() || salary < 0.0 {
            log::debug!("update_salary: rejecting salary {salary} for '{id}'");
            return;
        }
        match self.employees.get_mut(id) {
            Some(rec) => rec.salary = Some(salary),
            None => log::debug!("update_salary: no employee '{id}'"),
        }
    }

    /// Replace every record with the contents of `path`.
    ///
    /// On error the store is left untouched.
    pub fn reload(&mut self, path: &Path, options: &ReadOptions) -> Result<()> {
        let records = loader::load_file(path, options)?;
        log::info!(
            "Reloaded store from {}: {} -> {} records",
            path.display(),
            self.employees.len(),
            records.len()
        );
        self.employees = records;
        Ok(())
    }

    // -- Record queries --

    /// Iterate `(id, record)` pairs in id order.
    pub fn list(&self) -> impl Iterator<Item = (&str, &EmployeeRecord)> + '_ {
        self.employees.iter().map(|(id, rec)| (id.as_str(), rec))
    }

    /// All names joined by `-`. A missing name contributes an empty segment.
    pub fn names_joined(&self) -> String {
        self.employees
            .values()
            .map(|rec| rec.name.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join("-")
    }

    pub fn active_records(&self) -> Vec<&EmployeeRecord> {
        self.employees.values().filter(|rec| rec.is_active()).collect()
    }

    /// Records whose department equals `department` exactly.
    pub fn records_by_department(&self, department: &str) -> BTreeMap<&str, &EmployeeRecord> {
        self.employees
            .iter()
            .filter(|(_, rec)| rec.department.as_deref() == Some(department))
            .map(|(id, rec)| (id.as_str(), rec))
            .collect()
    }

    // -- Derived table --

    /// The full derived table, one row per record.
    pub fn to_table(&self) -> TableView {
        self.project(&Column::ALL)
    }

    /// A derived table restricted to `columns`.
    pub fn project(&self, columns: &[Column]) -> TableView {
        TableView::from_records(&self.employees, columns)
    }

    // -- Analytics --

    /// Mean salary per department. Empty store gives an empty map.
    pub fn average_salary_by_department(&self) -> BTreeMap<String, f64> {
        let table = self.project(&[Column::Department, Column::Salary]);
        stats::group_by(&table, Column::Department, Column::Salary)
            .into_iter()
            .filter_map(|(dep, acc)| acc.mean().map(|m| (dep, m)))
            .collect()
    }

    /// Department with the largest salary total. Equal totals resolve to
    /// the alphabetically first department. A department whose total is NaN
    /// never wins.
    pub fn department_with_highest_total_salary(&self) -> Result<String> {
        let table = self.project(&[Column::Department, Column::Salary]);
        let mut best: Option<(String, f64)> = None;
        for (dep, acc) in stats::group_by(&table, Column::Department, Column::Salary) {
            if acc.sum().is_nan() {
                continue;
            }
            match &best {
                Some((_, top)) if acc.sum() <= *top => {}
                _ => best = Some((dep, acc.sum())),
            }
        }
        best.map(|(dep, _)| dep).ok_or(StoreError::EmptyStore)
    }

    /// `(active, inactive)`. A missing flag counts as inactive.
    pub fn count_by_status(&self) -> (usize, usize) {
        let table = self.project(&[Column::Active]);
        let active = table
            .column(Column::Active)
            .unwrap_or_default()
            .into_iter()
            .filter(|cell| **cell == CellValue::Bool(true))
            .count();
        (active, table.len() - active)
    }

    /// Rows passing `filter`, with every column.
    pub fn filter(&self, filter: &EmployeeFilter) -> TableView {
        TableView::from_records(
            self.employees.iter().filter(|(_, rec)| filter.matches(rec)),
            &Column::ALL,
        )
    }

    /// Write the rows passing `filter` to `path`, id column first.
    pub fn export_filtered(&self, path: &Path, filter: &EmployeeFilter) -> Result<()> {
        export_table(path, &self.filter(filter))
    }

    // -- Cleaning and reporting --

    /// Count and fill missing values on a fresh table. The store itself is
    /// not modified; the filled table is returned.
    pub fn fill_missing(&self) -> (MissingValuesReport, TableView) {
        let (report, table) = cleaning::fill_missing(self.to_table());
        log::info!(
            "Filled {} of {} missing values",
            report.filled,
            report.total_missing()
        );
        (report, table)
    }

    /// Drop duplicate rows from a fresh table. The store itself is not
    /// modified; the deduplicated table is returned.
    pub fn dedupe(&self) -> (DedupeReport, TableView) {
        let (report, table) = cleaning::dedupe(self.to_table());
        log::info!("{report}");
        (report, table)
    }

    /// Shape, column types, summary statistics and correlations.
    pub fn describe(&self) -> Description {
        stats::describe(&self.to_table())
    }

    /// Employees per department, most common first.
    pub fn department_counts(&self) -> Vec<(String, usize)> {
        let table = self.project(&[Column::Department]);
        stats::value_counts(&table, Column::Department)
            .into_iter()
            .filter_map(|(cell, n)| cell.as_str().map(|dep| (dep.to_string(), n)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// The five-employee example dataset.
    fn sample_store() -> EmployeeStore {
        let mut store = EmployeeStore::new();
        store.add("101", EmployeeRecord::new("Hisham", "HR", 50000.0, true));
        store.add("102", EmployeeRecord::new("Dana", "ML", 75000.0, true));
        store.add("103", EmployeeRecord::new("Bassam", "Intern", 30000.0, false));
        store.add("104", EmployeeRecord::new("Sarah", "HR", 55000.0, true));
        store.add("105", EmployeeRecord::new("Dupl", "HR", 55000.0, true));
        store
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn add_uses_defaults_and_overwrites() {
        let mut store = EmployeeStore::new();
        store.add("1", EmployeeRecord::default());
        assert_eq!(store.get("1"), Some(&EmployeeRecord::default()));
        store.add("1", EmployeeRecord::default().with_name("Ana"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").unwrap().name.as_deref(), Some("Ana"));
    }

    #[test]
    fn list_is_restartable() {
        let store = sample_store();
        let first: Vec<&str> = store.list().map(|(id, _)| id).collect();
        let second: Vec<&str> = store.list().map(|(id, _)| id).collect();
        assert_eq!(first, vec!["101", "102", "103", "104", "105"]);
        assert_eq!(first, second);
    }

    #[test]
    fn names_joined_with_dash() {
        assert_eq!(sample_store().names_joined(), "Hisham-Dana-Bassam-Sarah-Dupl");
        assert_eq!(EmployeeStore::new().names_joined(), "");
    }

    #[test]
    fn active_records_in_id_order() {
        let store = sample_store();
        let active = store.active_records();
        let names: Vec<_> = active
            .iter()
            .map(|r| r.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["Hisham", "Dana", "Sarah", "Dupl"]);
    }

    #[test]
    fn records_by_department_is_exact() {
        let store = sample_store();
        let hr = store.records_by_department("HR");
        assert_eq!(hr.keys().copied().collect::<Vec<_>>(), vec!["101", "104", "105"]);
        assert!(hr.values().all(|r| r.department.as_deref() == Some("HR")));
        assert!(store.records_by_department("hr").is_empty());
        assert!(store.records_by_department("Finance").is_empty());
    }

    #[test]
    fn mark_inactive_ignores_unknown_ids() {
        let mut store = sample_store();
        store.mark_inactive(["101", "102", "999"]);
        assert_eq!(store.len(), 5);
        let active: Vec<_> = store.active_records();
        assert_eq!(active.len(), 2);
        assert!(!store.get("101").unwrap().is_active());
        assert!(!store.get("102").unwrap().is_active());
    }

    #[test]
    fn update_salary_only_touches_known_ids() {
        let mut store = sample_store();
        store.update_salary("103", 32000.0);
        store.update_salary("404", 1.0);
        assert_eq!(store.get("103").unwrap().salary, Some(32000.0));
        assert!(store.get("404").is_none());
    }

    #[test]
    fn table_is_recomputed_after_mutation() {
        let mut store = sample_store();
        let before = store.to_table();
        store.update_salary("101", 60000.0);
        let after = store.to_table();
        assert_eq!(before.get("101", Column::Salary), Some(&CellValue::Float(50000.0)));
        assert_eq!(after.get("101", Column::AnnualBonus), Some(&CellValue::Float(6000.0)));
    }

    #[test]
    fn bonus_is_ten_percent_of_salary() {
        let table = sample_store().to_table();
        let salary = table.position(Column::Salary).unwrap();
        let bonus = table.position(Column::AnnualBonus).unwrap();
        let duration = table.position(Column::EmploymentDuration).unwrap();
        for row in table.rows() {
            let s = row.cells[salary].as_f64().unwrap();
            assert_eq!(row.cells[bonus], CellValue::Float(s * 0.10));
            assert_eq!(row.cells[duration], CellValue::Integer(0));
        }
    }

    #[test]
    fn average_salary_by_department_example() {
        let avg = sample_store().average_salary_by_department();
        assert_eq!(avg.len(), 3);
        assert!(approx(avg["HR"], 53333.33));
        assert!(approx(avg["ML"], 75000.0));
        assert!(approx(avg["Intern"], 30000.0));
    }

    #[test]
    fn average_salary_of_empty_store_is_empty() {
        assert!(EmployeeStore::new().average_salary_by_department().is_empty());
    }

    #[test]
    fn highest_total_salary_department() {
        assert_eq!(
            sample_store().department_with_highest_total_salary().unwrap(),
            "HR"
        );
    }

    #[test]
    fn highest_total_salary_ties_pick_first_name() {
        let mut store = EmployeeStore::new();
        store.add("1", EmployeeRecord::new("A", "Sales", 100.0, true));
        store.add("2", EmployeeRecord::new("B", "Ops", 100.0, true));
        store.add("3", EmployeeRecord::new("C", "Eng", 50.0, true));
        assert_eq!(store.department_with_highest_total_salary().unwrap(), "Ops");
    }

    #[test]
    fn highest_total_salary_of_empty_store_fails() {
        let err = EmployeeStore::new()
            .department_with_highest_total_salary()
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyStore));
    }

    #[test]
    fn count_by_status_sums_to_total() {
        let mut store = sample_store();
        assert_eq!(store.count_by_status(), (4, 1));
        store.add("106", EmployeeRecord::blank());
        let (active, inactive) = store.count_by_status();
        assert_eq!((active, inactive), (4, 2));
        assert_eq!(active + inactive, store.len());
        assert_eq!(EmployeeStore::new().count_by_status(), (0, 0));
    }

    #[test]
    fn zero_threshold_keeps_every_record() {
        let mut store = sample_store();
        store.add("106", EmployeeRecord::default());
        assert_eq!(store.filter(&EmployeeFilter::new()).len(), 6);
    }

    #[test]
    fn threshold_excludes_lower_or_equal_salaries() {
        let mut store = sample_store();
        store.add("106", EmployeeRecord::new("Edge", "ML", 40000.0, true));
        let table = store.filter(&EmployeeFilter::new().salary_above(40000.0));
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["101", "102", "104", "105"]);
        assert!(table.numeric_values(Column::Salary).iter().all(|s| *s > 40000.0));
    }

    #[test]
    fn filter_by_department_and_salary() {
        let store = sample_store();
        let table = store.filter(&EmployeeFilter::new().salary_above(52000.0).in_department("HR"));
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["104", "105"]);
        assert_eq!(table.columns(), &Column::ALL);
    }

    #[test]
    fn export_then_reload_reproduces_filtered_rows() {
        let dir = TempDir::new().unwrap();
        let store = sample_store();
        let filter = EmployeeFilter::new().salary_above(40000.0);

        for name in ["filtered.csv", "filtered.tsv", "filtered.json", "filtered.parquet"] {
            let path = dir.path().join(name);
            store.export_filtered(&path, &filter).unwrap();

            let mut reloaded = EmployeeStore::new();
            reloaded.add("stale", EmployeeRecord::default());
            reloaded.reload(&path, &ReadOptions::default()).unwrap();

            assert_eq!(reloaded.to_table(), store.filter(&filter), "format {name}");
            assert!(reloaded.get("stale").is_none());
        }
    }

    #[test]
    fn padded_text_survives_export_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut store = EmployeeStore::new();
        store.add("101", EmployeeRecord::new(" Ana ", "HR ", 50000.0, true));
        store.add("102", EmployeeRecord::new("Bo", "\tML", 60000.0, false));

        for name in ["padded.csv", "padded.tsv", "padded.json", "padded.parquet"] {
            let path = dir.path().join(name);
            store.export_filtered(&path, &EmployeeFilter::default()).unwrap();
            let mut reloaded = EmployeeStore::new();
            reloaded.reload(&path, &ReadOptions::default()).unwrap();

            assert_eq!(reloaded, store, "format {name}");
            assert_eq!(reloaded.records_by_department("HR ").len(), 1, "format {name}");
        }
    }

    #[test]
    fn empty_text_reloads_as_missing_only_from_delimited_files() {
        let dir = TempDir::new().unwrap();
        let mut store = EmployeeStore::new();
        store.add("101", EmployeeRecord::new("", "HR", 50000.0, true));

        let csv = dir.path().join("empty.csv");
        store.export_filtered(&csv, &EmployeeFilter::default()).unwrap();
        let mut reloaded = EmployeeStore::new();
        reloaded.reload(&csv, &ReadOptions::default()).unwrap();
        assert_eq!(reloaded.get("101").unwrap().name, None);

        for name in ["empty.json", "empty.parquet"] {
            let path = dir.path().join(name);
            store.export_filtered(&path, &EmployeeFilter::default()).unwrap();
            let mut reloaded = EmployeeStore::new();
            reloaded.reload(&path, &ReadOptions::default()).unwrap();
            assert_eq!(reloaded, store, "format {name}");
        }
    }

    #[test]
    fn update_salary_rejects_invalid_amounts() {
        let mut store = sample_store();
        store.update_salary("101", f64::NAN);
        store.update_salary("101", -1.0);
        store.update_salary("101", f64::INFINITY);
        assert_eq!(store.get("101").unwrap().salary, Some(50000.0));
    }

    #[test]
    fn nan_total_never_wins_highest_department() {
        let mut store = sample_store();
        store.add("106", EmployeeRecord::new("Zed", "Zoology", f64::NAN, true));
        assert_eq!(store.department_with_highest_total_salary().unwrap(), "HR");
    }

    #[test]
    fn failed_reload_keeps_existing_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.csv");
        std::fs::write(&path, "id,name\n1,Ana\n").unwrap();
        let mut store = sample_store();
        assert!(store.reload(&path, &ReadOptions::default()).is_err());
        assert_eq!(store, sample_store());
    }

    #[test]
    fn fill_missing_reports_without_mutating_store() {
        let mut store = sample_store();
        store.add("106", EmployeeRecord::blank().with_name("Gap"));
        let (report, filled) = store.fill_missing();
        assert_eq!(report.missing_in(Column::Department), 1);
        assert_eq!(report.missing_in(Column::Salary), 1);
        assert_eq!(
            filled.get("106", Column::Department),
            Some(&CellValue::Text("Unknown".into()))
        );
        assert_eq!(store.get("106").unwrap().department, None);
    }

    #[test]
    fn dedupe_counts_exact_duplicates_only() {
        let mut store = sample_store();
        let (report, _) = store.dedupe();
        assert_eq!(report.removed(), 0);

        store.add("106", EmployeeRecord::new("Dupl", "HR", 55000.0, true));
        let (report, table) = store.dedupe();
        assert_eq!(report.removed(), 1);
        assert_eq!(table.len(), 5);
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn describe_covers_all_columns() {
        let desc = sample_store().describe();
        assert_eq!(desc.shape, (5, 6));
        let salary = desc.summary(Column::Salary).unwrap();
        assert_eq!(salary.count, 5);
        assert!(approx(salary.mean.unwrap(), 53000.0));
        assert_eq!(salary.median, Some(55000.0));
        assert_eq!(salary.min, Some(30000.0));
        assert_eq!(salary.max, Some(75000.0));
    }

    #[test]
    fn department_counts_most_common_first() {
        assert_eq!(
            sample_store().department_counts(),
            vec![
                ("HR".to_string(), 3),
                ("Intern".to_string(), 1),
                ("ML".to_string(), 1)
            ]
        );
    }
}
