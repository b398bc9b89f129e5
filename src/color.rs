use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// `n` visually distinct colours with evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n).map(|i| hue_color(i as f32 / n as f32 * 360.0)).collect()
}

fn hue_color(hue: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, 0.65, 0.55).into_color();
    let (r, g, b) = rgb.into_format::<u8>().into_components();
    Color32::from_rgb(r, g, b)
}

// ---------------------------------------------------------------------------
// Department colours
// ---------------------------------------------------------------------------

/// Stable colour per department, shared by the bar chart and the legend.
#[derive(Debug, Clone, Default)]
pub struct DepartmentColors {
    mapping: BTreeMap<String, Color32>,
}

impl DepartmentColors {
    /// Assign colours in the order departments are given.
    pub fn new<I, S>(departments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = departments.into_iter().map(Into::into).collect();
        let palette = generate_palette(names.len());
        let mapping = names.into_iter().zip(palette).collect();
        DepartmentColors { mapping }
    }

    pub fn color_for(&self, department: &str) -> Color32 {
        self.mapping
            .get(department)
            .copied()
            .unwrap_or(Color32::GRAY)
    }

    /// Legend entries (department → colour) sorted by department.
    pub fn legend_entries(&self) -> impl Iterator<Item = (&str, Color32)> {
        self.mapping.iter().map(|(d, c)| (d.as_str(), *c))
    }
}
