use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::state::ViewerState;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Charts (central panel)
// ---------------------------------------------------------------------------

/// Bar chart of employee count per department, one coloured bar each.
pub fn department_chart(ui: &mut Ui, state: &ViewerState) {
    ui.strong("Number of Employees per Department");

    let bars: Vec<Bar> = state
        .department_counts()
        .into_iter()
        .enumerate()
        .map(|(i, (department, count))| {
            Bar::new(i as f64, count as f64)
                .width(0.6)
                .name(&department)
                .fill(state.colors.color_for(&department))
        })
        .collect();

    Plot::new("department_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Department")
        .y_axis_label("Number of Employees")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Employees"));
        });
}

/// Histogram of the visible salaries.
pub fn salary_histogram(ui: &mut Ui, state: &ViewerState) {
    ui.strong("Salary Distribution");

    let bars: Vec<Bar> = state
        .salary_histogram()
        .iter()
        .map(|bin| {
            Bar::new(bin.center(), bin.count as f64)
                .width(bin.width())
                .name(format!("{:.0} – {:.0}", bin.start, bin.end))
        })
        .collect();

    Plot::new("salary_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Salary")
        .y_axis_label("Frequency")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("Salary")
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

/// Active vs inactive employees.
pub fn status_chart(ui: &mut Ui, state: &ViewerState) {
    ui.strong("Active vs Inactive Employees");

    let (active, inactive) = state.status_counts();
    let bars = vec![
        Bar::new(0.0, active as f64)
            .width(0.6)
            .name("Active")
            .fill(Color32::from_rgb(90, 170, 90)),
        Bar::new(1.0, inactive as f64)
            .width(0.6)
            .name("Inactive")
            .fill(Color32::from_rgb(200, 90, 90)),
    ];

    Plot::new("status_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Employees")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Status"));
        });
}
