use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use rusty_roster::data::export::export_table;
use rusty_roster::data::loader::Records;
use rusty_roster::{EmployeeRecord, EmployeeStore};

const CSV_OUTPUT: &str = "employee_data.csv";
const PARQUET_OUTPUT: &str = "employee_data.parquet";
const EMPLOYEES: usize = 24;

const FIRST_NAMES: &[&str] = &[
    "Hisham", "Dana", "Bassam", "Sara", "Omar", "Lina", "Karim", "Maya", "Yusuf", "Nour",
    "Tariq", "Rana",
];

/// Department with its mean salary.
const DEPARTMENTS: &[(&str, f64)] = &[
    ("HR", 48000.0),
    ("ML", 78000.0),
    ("Finance", 61000.0),
    ("Engineering", 70000.0),
    ("Intern", 28000.0),
];

/// One CSV row. `None` fields are written as empty cells.
#[derive(Debug, Clone, Serialize)]
struct EmployeeRow {
    emp_id: String,
    name: Option<String>,
    department: Option<String>,
    salary: Option<f64>,
    active: Option<bool>,
}

impl EmployeeRow {
    fn to_record(&self) -> EmployeeRecord {
        EmployeeRecord {
            name: self.name.clone(),
            department: self.department.clone(),
            salary: self.salary,
            active: self.active,
        }
    }
}

/// Small deterministic PRNG (SplitMix64).
struct SplitMix {
    state: u64,
}

impl SplitMix {
    fn new(seed: u64) -> Self {
        SplitMix { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

fn generate_rows(rng: &mut SplitMix) -> Vec<EmployeeRow> {
    let mut rows: Vec<EmployeeRow> = (0..EMPLOYEES)
        .map(|i| {
            let (department, base) = *rng.pick(DEPARTMENTS);
            // +/- 20% around the department mean, rounded to hundreds.
            let salary = (base * (0.8 + 0.4 * rng.next_f64()) / 100.0).round() * 100.0;
            EmployeeRow {
                emp_id: (201 + i).to_string(),
                name: Some(rng.pick(FIRST_NAMES).to_string()),
                department: (!rng.chance(0.1)).then(|| department.to_string()),
                salary: (!rng.chance(0.1)).then_some(salary),
                active: (!rng.chance(0.08)).then(|| rng.chance(0.8)),
            }
        })
        .collect();

    // Same cells as the first row under a fresh id, for dedupe.
    if let Some(first) = rows.first().cloned() {
        rows.push(EmployeeRow {
            emp_id: (201 + EMPLOYEES).to_string(),
            ..first
        });
    }
    rows
}

fn write_csv(path: &Path, rows: &[EmployeeRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SplitMix::new(42);
    let rows = generate_rows(&mut rng);

    write_csv(Path::new(CSV_OUTPUT), &rows)?;
    log::info!("Wrote {} rows to {CSV_OUTPUT}", rows.len());

    let records: Records = rows
        .iter()
        .map(|row| (row.emp_id.clone(), row.to_record()))
        .collect();
    let store = EmployeeStore::from_records(records);
    export_table(Path::new(PARQUET_OUTPUT), &store.to_table())
        .with_context(|| format!("writing {PARQUET_OUTPUT}"))?;

    println!(
        "Wrote {} employees to {CSV_OUTPUT} and {PARQUET_OUTPUT}",
        store.len()
    );
    Ok(())
}
