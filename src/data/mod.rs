//! Data layer: records, the derived table, analytics, loading and export.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → id → EmployeeRecord
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────────┐
//!   │ EmployeeStore  │  authoritative BTreeMap, mutations
//!   └───────────────┘
//!        │  recomputed on every query
//!        ▼
//!   ┌──────────┐     ┌──────────────────┐
//!   │  table    │ ──▶ │ filter / stats /  │ ──▶ export
//!   └──────────┘     │ cleaning          │
//!                    └──────────────────┘
//! ```

pub mod cleaning;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
pub mod store;
pub mod table;
