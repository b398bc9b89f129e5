use std::path::Path;

use anyhow::{Context, Result};

use crate::color::DepartmentColors;
use crate::data::filter::EmployeeFilter;
use crate::data::loader::ReadOptions;
use crate::data::model::{CellValue, Column};
use crate::data::stats::{self, HistogramBin};
use crate::data::store::EmployeeStore;
use crate::data::table::TableView;

/// Bins of the salary histogram.
pub const HISTOGRAM_BINS: usize = 5;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
///
/// The viewer works on its own copy of the store; the caller's store is
/// never touched.
pub struct ViewerState {
    pub store: EmployeeStore,

    /// Salary threshold and department selection.
    pub filter: EmployeeFilter,

    /// Rows passing the current filter (cached).
    pub visible: TableView,

    /// Every department present in the store, sorted.
    pub departments: Vec<String>,

    pub colors: DepartmentColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewerState {
    pub fn new(store: EmployeeStore) -> Self {
        let mut state = Self {
            store: EmployeeStore::new(),
            filter: EmployeeFilter::default(),
            visible: TableView::default(),
            departments: Vec::new(),
            colors: DepartmentColors::default(),
            status_message: None,
        };
        state.set_store(store);
        state
    }

    /// Swap in a new store, reset filters and colours.
    pub fn set_store(&mut self, store: EmployeeStore) {
        let table = store.project(&[Column::Department]);
        let mut departments: Vec<String> = stats::value_counts(&table, Column::Department)
            .into_iter()
            .filter_map(|(cell, _)| cell.as_str().map(str::to_string))
            .collect();
        departments.sort();
        self.departments = departments;
        self.colors = DepartmentColors::new(self.departments.iter().cloned());
        self.store = store;
        self.filter = EmployeeFilter::default();
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible` after a filter change.
    pub fn refilter(&mut self) {
        self.visible = self.store.filter(&self.filter);
    }

    pub fn set_department(&mut self, department: Option<String>) {
        self.filter.department = department;
        self.refilter();
    }

    pub fn set_salary_threshold(&mut self, threshold: f64) {
        self.filter.salary_threshold = threshold.max(0.0);
        self.refilter();
    }

    pub fn reset_filter(&mut self) {
        self.filter = EmployeeFilter::default();
        self.refilter();
    }

    /// Employees per department among the visible rows.
    pub fn department_counts(&self) -> Vec<(String, usize)> {
        stats::value_counts(&self.visible, Column::Department)
            .into_iter()
            .filter_map(|(cell, n)| cell.as_str().map(|d| (d.to_string(), n)))
            .collect()
    }

    /// `(active, inactive)` among the visible rows.
    pub fn status_counts(&self) -> (usize, usize) {
        let active = self
            .visible
            .column(Column::Active)
            .unwrap_or_default()
            .into_iter()
            .filter(|c| **c == CellValue::Bool(true))
            .count();
        (active, self.visible.len() - active)
    }

    pub fn salary_histogram(&self) -> Vec<HistogramBin> {
        stats::histogram(&self.visible.numeric_values(Column::Salary), HISTOGRAM_BINS)
    }

    /// Replace the viewer's records with a file.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let mut store = EmployeeStore::new();
        store
            .reload(path, &ReadOptions::default())
            .with_context(|| format!("loading {}", path.display()))?;
        self.set_store(store);
        Ok(())
    }

    /// Write the visible rows to a file.
    pub fn export(&self, path: &Path) -> Result<()> {
        self.store
            .export_filtered(path, &self.filter)
            .with_context(|| format!("exporting to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::EmployeeRecord;
    use tempfile::TempDir;

    fn state() -> ViewerState {
        let mut store = EmployeeStore::new();
        store.add("101", EmployeeRecord::new("Hisham", "HR", 50000.0, true));
        store.add("102", EmployeeRecord::new("Dana", "ML", 75000.0, true));
        store.add("103", EmployeeRecord::new("Bassam", "Intern", 30000.0, false));
        ViewerState::new(store)
    }

    #[test]
    fn starts_unfiltered() {
        let state = state();
        assert_eq!(state.visible.len(), 3);
        assert_eq!(state.departments, vec!["HR", "Intern", "ML"]);
        assert_eq!(state.status_counts(), (2, 1));
    }

    #[test]
    fn filters_drive_chart_data() {
        let mut state = state();
        state.set_salary_threshold(40000.0);
        assert_eq!(state.visible.len(), 2);
        assert_eq!(
            state.department_counts(),
            vec![("HR".to_string(), 1), ("ML".to_string(), 1)]
        );
        state.set_department(Some("ML".into()));
        assert_eq!(state.visible.ids().collect::<Vec<_>>(), vec!["102"]);
        state.reset_filter();
        assert_eq!(state.visible.len(), 3);
    }

    #[test]
    fn histogram_covers_visible_rows() {
        let bins = state().salary_histogram();
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn export_and_open_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("view.csv");
        let mut state = state();
        state.set_department(Some("HR".into()));
        state.export(&path).unwrap();

        state.open(&path).unwrap();
        assert_eq!(state.store.len(), 1);
        assert_eq!(state.departments, vec!["HR"]);
        assert_eq!(state.filter, EmployeeFilter::default());
    }

    #[test]
    fn open_failure_keeps_current_store() {
        let dir = TempDir::new().unwrap();
        let mut state = state();
        assert!(state.open(&dir.path().join("missing.csv")).is_err());
        assert_eq!(state.store.len(), 3);
    }
}
