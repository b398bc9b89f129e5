use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Filters");
    ui.separator();

    if state.store.is_empty() {
        ui.label("No employees loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Department selector ----
            ui.strong("Department");
            let current = state.filter.department.clone();
            let selected_text = current.clone().unwrap_or_else(|| "All".to_string());
            let mut choice: Option<Option<String>> = None;
            egui::ComboBox::from_id_salt("department_filter")
                .selected_text(selected_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui.selectable_label(current.is_none(), "All").clicked() {
                        choice = Some(None);
                    }
                    for dep in &state.departments {
                        let is_current = current.as_deref() == Some(dep.as_str());
                        let text = RichText::new(dep).color(state.colors.color_for(dep));
                        if ui.selectable_label(is_current, text).clicked() {
                            choice = Some(Some(dep.clone()));
                        }
                    }
                });
            if let Some(department) = choice {
                state.set_department(department);
            }
            ui.separator();

            // ---- Salary threshold (0 disables the filter) ----
            ui.strong("Salary above");
            let mut threshold = state.filter.salary_threshold;
            let response = ui.add(
                DragValue::new(&mut threshold)
                    .speed(500.0)
                    .range(0.0..=f64::MAX)
                    .prefix("> "),
            );
            if response.changed() {
                state.set_salary_threshold(threshold);
            }
            if !state.filter.filters_salary() {
                ui.small("0 shows every salary");
            }
            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.reset_filter();
            }
            ui.separator();

            // ---- Legend ----
            ui.strong("Departments");
            for (dep, color) in state.colors.legend_entries() {
                ui.label(RichText::new(dep).color(color));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export filtered…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} employees loaded, {} visible",
            state.store.len(),
            state.visible.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

const SUPPORTED: &[&str] = &["csv", "tsv", "txt", "json", "parquet", "pq"];

pub fn open_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Open employee data")
        .add_filter("Supported files", SUPPORTED)
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match state.open(&path) {
            Ok(()) => {
                log::info!(
                    "Loaded {} employees across {:?}",
                    state.store.len(),
                    state.departments
                );
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered employees")
        .set_file_name("filtered_employees.csv")
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet"])
        .save_file();

    if let Some(path) = file {
        match state.export(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
