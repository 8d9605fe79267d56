use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use taxi_explorer::data::Value;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: group key → Color32
// ---------------------------------------------------------------------------

/// Maps the group keys of an aggregation to distinct bar colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Value, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a Value>) -> Self {
        let keys: Vec<&Value> = keys.into_iter().collect();
        let mapping = keys
            .iter()
            .zip(generate_palette(keys.len()))
            .map(|(&k, c)| (k.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, key: &Value) -> Color32 {
        self.mapping.get(key).copied().unwrap_or(self.default_color)
    }
}
