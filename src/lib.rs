//! In-memory employee records with derived-table analytics, file export
//! and an egui viewer.

pub mod app;
pub mod color;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;

pub use data::filter::EmployeeFilter;
pub use data::loader::{Encoding, ReadOptions};
pub use data::model::{CellValue, Column, EmployeeRecord};
pub use data::store::EmployeeStore;
pub use data::table::TableView;
pub use error::{Result, StoreError};
