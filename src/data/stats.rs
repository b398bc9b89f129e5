use std::collections::BTreeMap;
use std::fmt;

use super::model::{CellValue, Column, DType};
use super::table::TableView;

// ---------------------------------------------------------------------------
// Accumulator – running count/sum/mean/variance (Welford)
// ---------------------------------------------------------------------------

/// Running aggregate over a stream of numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    count: usize,
    sum: f64,
    mean: f64,
    m2: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Arithmetic mean, computed as `sum / count`.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Sample standard deviation (n - 1 denominator).
    pub fn std_dev(&self) -> Option<f64> {
        (self.count > 1).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

impl FromIterator<f64> for Accumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Accumulator::default();
        for v in iter {
            acc.add(v);
        }
        acc
    }
}

// ---------------------------------------------------------------------------
// Grouping and counting
// ---------------------------------------------------------------------------

/// Aggregate the numeric `value` column per distinct text `key`.
///
/// Rows with a null key or a null value are skipped, so a group only
/// appears once it has at least one number.
pub fn group_by(table: &TableView, key: Column, value: Column) -> BTreeMap<String, Accumulator> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    let (Some(k), Some(v)) = (table.position(key), table.position(value)) else {
        return groups;
    };
    for row in table.rows() {
        if let (Some(name), Some(x)) = (row.cells[k].as_str(), row.cells[v].as_f64()) {
            groups.entry(name.to_string()).or_default().add(x);
        }
    }
    groups
}

/// Count occurrences of each non-null value of a column.
/// Sorted by descending count, ties by ascending value.
pub fn value_counts(table: &TableView, column: Column) -> Vec<(CellValue, usize)> {
    let mut counts: BTreeMap<CellValue, usize> = BTreeMap::new();
    for cell in table.column(column).unwrap_or_default() {
        if !cell.is_null() {
            *counts.entry(cell.clone()).or_default() += 1;
        }
    }
    let mut out: Vec<(CellValue, usize)> = counts.into_iter().collect();
    // Stable sort keeps BTreeMap order for equal counts.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Split `values` into `bins` equal-width bins spanning min..=max.
/// The last bin is closed on the right. A degenerate range is widened by
/// 0.5 on each side.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Quantiles and correlation
// ---------------------------------------------------------------------------

/// Quantile of already sorted data with linear interpolation.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Pearson correlation of paired samples. `NaN` when either side has zero
/// variance or fewer than two pairs exist.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for &(x, y) in pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx.sqrt() * syy.sqrt())
}

// ---------------------------------------------------------------------------
// Description – shape, dtypes, summary statistics, correlation
// ---------------------------------------------------------------------------

/// Summary statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: Column,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    fn from_values(column: Column, mut values: Vec<f64>) -> Self {
        let acc: Accumulator = values.iter().copied().collect();
        values.sort_by(f64::total_cmp);
        ColumnSummary {
            column,
            count: acc.count(),
            mean: acc.mean(),
            std: acc.std_dev(),
            min: acc.min(),
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: acc.max(),
        }
    }
}

/// Everything `describe` reports about a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub shape: (usize, usize),
    pub dtypes: Vec<(Column, DType)>,
    pub summaries: Vec<ColumnSummary>,
    /// Labels of the rows/columns of `correlation`.
    pub numeric_columns: Vec<Column>,
    pub correlation: Vec<Vec<f64>>,
}

impl Description {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.dtypes.iter().map(|(c, _)| c.name()).collect()
    }

    pub fn summary(&self, column: Column) -> Option<&ColumnSummary> {
        self.summaries.iter().find(|s| s.column == column)
    }

    pub fn correlation_between(&self, a: Column, b: Column) -> Option<f64> {
        let i = self.numeric_columns.iter().position(|c| *c == a)?;
        let j = self.numeric_columns.iter().position(|c| *c == b)?;
        Some(self.correlation[i][j])
    }
}

pub fn describe(table: &TableView) -> Description {
    let numeric_columns: Vec<Column> = table
        .columns()
        .iter()
        .copied()
        .filter(|c| Column::NUMERIC.contains(c))
        .collect();

    let summaries = numeric_columns
        .iter()
        .map(|c| ColumnSummary::from_values(*c, table.numeric_values(*c)))
        .collect();

    // Pairwise-complete rows for each column pair.
    let per_row: Vec<Vec<Option<f64>>> = table
        .rows()
        .iter()
        .map(|row| {
            numeric_columns
                .iter()
                .map(|c| table.position(*c).and_then(|idx| row.cells[idx].as_f64()))
                .collect()
        })
        .collect();

    let n = numeric_columns.len();
    let mut correlation = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in 0..n {
            let pairs: Vec<(f64, f64)> = per_row
                .iter()
                .filter_map(|vals| Some((vals[i]?, vals[j]?)))
                .collect();
            correlation[i][j] = pearson(&pairs);
        }
    }

    Description {
        shape: table.shape(),
        dtypes: table.columns().iter().map(|c| (*c, c.dtype())).collect(),
        summaries,
        numeric_columns,
        correlation,
    }
}

fn fmt_stat(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), |x| format!("{x:.2}"))
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset Dimensions: {:?}", self.shape)?;
        writeln!(f, "Columns: {:?}", self.column_names())?;
        writeln!(f, "Column Types:")?;
        for (col, dtype) in &self.dtypes {
            writeln!(f, "  {:<20} {dtype}", col.name())?;
        }

        writeln!(f, "Summary Statistics:")?;
        write!(f, "  {:<8}", "")?;
        for s in &self.summaries {
            write!(f, " {:>20}", s.column.name())?;
        }
        writeln!(f)?;
        let rows: [(&str, fn(&ColumnSummary) -> String); 8] = [
            ("count", |s| s.count.to_string()),
            ("mean", |s| fmt_stat(s.mean)),
            ("std", |s| fmt_stat(s.std)),
            ("min", |s| fmt_stat(s.min)),
            ("25%", |s| fmt_stat(s.q25)),
            ("50%", |s| fmt_stat(s.median)),
            ("75%", |s| fmt_stat(s.q75)),
            ("max", |s| fmt_stat(s.max)),
        ];
        for (label, get) in rows {
            write!(f, "  {label:<8}")?;
            for s in &self.summaries {
                write!(f, " {:>20}", get(s))?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Correlation Matrix:")?;
        write!(f, "  {:<20}", "")?;
        for c in &self.numeric_columns {
            write!(f, " {:>20}", c.name())?;
        }
        writeln!(f)?;
        for (i, c) in self.numeric_columns.iter().enumerate() {
            write!(f, "  {:<20}", c.name())?;
            for v in &self.correlation[i] {
                write!(f, " {:>20.4}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::EmployeeRecord;

    fn table() -> TableView {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), EmployeeRecord::new("A", "HR", 10.0, true));
        map.insert("b".to_string(), EmployeeRecord::new("B", "HR", 20.0, false));
        map.insert("c".to_string(), EmployeeRecord::new("C", "ML", 40.0, true));
        map.insert("d".to_string(), EmployeeRecord::blank().with_salary(99.0));
        TableView::from_records(&map, &Column::ALL)
    }

    #[test]
    fn accumulator_matches_direct_formulas() {
        let acc: Accumulator = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
        assert_eq!(acc.count(), 8);
        assert_eq!(acc.mean(), Some(5.0));
        let std = acc.std_dev().unwrap();
        assert!((std - 2.138089935299395).abs() < 1e-9);
        assert_eq!(acc.min(), Some(2.0));
        assert_eq!(acc.max(), Some(9.0));
    }

    #[test]
    fn empty_accumulator_has_no_mean() {
        let acc = Accumulator::default();
        assert_eq!(acc.mean(), None);
        assert_eq!(acc.std_dev(), None);
    }

    #[test]
    fn group_by_skips_null_keys() {
        let groups = group_by(&table(), Column::Department, Column::Salary);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["HR"].sum(), 30.0);
        assert_eq!(groups["ML"].count(), 1);
    }

    #[test]
    fn value_counts_sorted_by_count_then_value() {
        let counts = value_counts(&table(), Column::Department);
        assert_eq!(
            counts,
            vec![
                (CellValue::Text("HR".into()), 2),
                (CellValue::Text("ML".into()), 1)
            ]
        );
    }

    #[test]
    fn histogram_closes_last_bin() {
        let bins = histogram(&[0.0, 1.0, 2.0, 10.0], 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[4].count, 1);
        assert_eq!(bins[4].end, 10.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
    }

    #[test]
    fn histogram_of_constant_values_widens_range() {
        let bins = histogram(&[5.0, 5.0], 5);
        assert_eq!(bins[0].start, 4.5);
        assert_eq!(bins[4].end, 5.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(histogram(&[], 5).is_empty());
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&data, 0.25), Some(1.75));
        assert_eq!(quantile(&data, 0.5), Some(2.5));
        assert_eq!(quantile(&data, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn describe_reports_shape_summary_and_correlation() {
        let desc = describe(&table());
        assert_eq!(desc.shape, (4, 6));
        assert_eq!(desc.column_names()[0], "name");
        let salary = desc.summary(Column::Salary).unwrap();
        assert_eq!(salary.count, 4);
        assert_eq!(salary.min, Some(10.0));
        assert_eq!(salary.max, Some(99.0));

        let r = desc
            .correlation_between(Column::Salary, Column::AnnualBonus)
            .unwrap();
        assert!((r - 1.0).abs() < 1e-9);
        assert!(desc
            .correlation_between(Column::Salary, Column::EmploymentDuration)
            .unwrap()
            .is_nan());
        assert!(desc.to_string().contains("Correlation Matrix:"));
    }
}
