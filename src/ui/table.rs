use eframe::egui::Ui;
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::table::{TableView, KEY_COLUMN};

const ROW_HEIGHT: f32 = 18.0;

/// Render the visible rows, id column first.
pub fn employee_table(ui: &mut Ui, view: &TableView) {
    if view.is_empty() {
        ui.label("No employees match the current filter.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(TableColumn::auto().at_least(50.0))
        .columns(TableColumn::auto().at_least(70.0), view.columns().len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong(KEY_COLUMN);
            });
            for col in view.columns() {
                header.col(|ui| {
                    ui.strong(col.name());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, view.len(), |mut row| {
                let record = &view.rows()[row.index()];
                row.col(|ui| {
                    ui.label(&record.id);
                });
                for cell in &record.cells {
                    row.col(|ui| {
                        ui.label(cell.to_string());
                    });
                }
            });
        });
}
