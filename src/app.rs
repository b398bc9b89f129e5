use eframe::egui;

use crate::data::store::EmployeeStore;
use crate::state::ViewerState;
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RosterApp {
    pub state: ViewerState,
}

impl RosterApp {
    pub fn new(store: EmployeeStore) -> Self {
        Self {
            state: ViewerState::new(store),
        }
    }
}

impl eframe::App for RosterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts above the table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(3, |cols| {
                charts::department_chart(&mut cols[0], &self.state);
                charts::salary_histogram(&mut cols[1], &self.state);
                charts::status_chart(&mut cols[2], &self.state);
            });
            ui.separator();
            table::employee_table(ui, &self.state.visible);
        });
    }
}

/// Open the viewer window on a copy of `store` and block until it closes.
pub fn run_viewer(store: EmployeeStore) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Roster – Employee Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(RosterApp::new(store)))),
    )
}

impl EmployeeStore {
    /// Show department counts, the salary histogram and the filterable
    /// table in a window. The store is not modified.
    pub fn visualize(&self) -> eframe::Result {
        run_viewer(self.clone())
    }
}
