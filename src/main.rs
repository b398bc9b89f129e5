use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use rusty_roster::{EmployeeFilter, EmployeeRecord, EmployeeStore, ReadOptions};

const DEFAULT_DATA_FILE: &str = "employee_data.csv";
const EXPORT_FILE: &str = "filtered_employees.csv";
const EXPORT_THRESHOLD: f64 = 40000.0;

fn main() -> Result<()> {
    env_logger::init();

    let data_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

    let mut store = EmployeeStore::new();
    store.add("101", EmployeeRecord::new("Hisham", "HR", 50000.0, true));
    store.add("102", EmployeeRecord::new("Dana", "ML", 75000.0, true));
    store.add("103", EmployeeRecord::new("Bassam", "Intern", 30000.0, false));
    store.add("104", EmployeeRecord::new("Sarah", "HR", 55000.0, true));
    store.add("105", EmployeeRecord::new("Dupl", "HR", 55000.0, true));

    println!("== Employees ==");
    for (id, record) in store.list() {
        println!("{id}: {record}");
    }
    println!("Names: {}", store.names_joined());

    println!("\n== Active employees ==");
    for record in store.active_records() {
        println!("{record}");
    }

    println!("\n== HR department ==");
    for (id, record) in store.records_by_department("HR") {
        println!("{id}: {record}");
    }

    println!("\n== Derived table ==\n{}", store.to_table());

    println!("\n== Average salary by department ==");
    for (department, mean) in store.average_salary_by_department() {
        println!("{department}: {mean:.2}");
    }
    println!(
        "Highest total salary: {}",
        store.department_with_highest_total_salary()?
    );
    let (active, inactive) = store.count_by_status();
    println!("Active: {active}, inactive: {inactive}");

    store.mark_inactive(["105"]);
    store.update_salary("101", 52000.0);
    let (active, inactive) = store.count_by_status();
    println!("After updates: active {active}, inactive {inactive}");

    if data_path.exists() {
        store
            .reload(&data_path, &ReadOptions::default())
            .with_context(|| format!("reloading {}", data_path.display()))?;

        println!("\n== Loaded {} ==\n{}", data_path.display(), store.to_table());
        println!("\n{}", store.describe());

        let (report, filled) = store.fill_missing();
        println!("\n{report}\n{filled}");

        let (report, deduped) = store.dedupe();
        println!("\n{report}\n{deduped}");
    } else {
        log::warn!(
            "{} not found, run `cargo run --bin generate_sample` to create it",
            data_path.display()
        );
    }

    store
        .export_filtered(
            Path::new(EXPORT_FILE),
            &EmployeeFilter::new().salary_above(EXPORT_THRESHOLD),
        )
        .with_context(|| format!("exporting {EXPORT_FILE}"))?;
    println!("\nWrote employees earning more than {EXPORT_THRESHOLD} to {EXPORT_FILE}");

    store
        .visualize()
        .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
