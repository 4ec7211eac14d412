use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::Value;

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Color mapping: outcome value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of the outcome column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Value, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its distinct values.
    pub fn new<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let distinct: Vec<&Value> = values
            .into_iter()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        let palette = generate_palette(distinct.len());
        let mapping = distinct
            .into_iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &Value) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging map for correlations
// ---------------------------------------------------------------------------

const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

fn linear(rgb: (u8, u8, u8)) -> LinSrgb {
    Srgb::<u8>::new(rgb.0, rgb.1, rgb.2)
        .into_format::<f32>()
        .into_linear()
}

/// Blue → light grey → red for values in `[-1, 1]`. NaN is grey.
pub fn coolwarm(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::DARK_GRAY;
    }
    let t = value.clamp(-1.0, 1.0) as f32;
    let mixed = if t < 0.0 {
        linear(NEUTRAL).mix(linear(COOL), -t)
    } else {
        linear(NEUTRAL).mix(linear(WARM), t)
    };
    to_color32(Srgb::<f32>::from_linear(mixed))
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_on(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(4).len(), 4);
    }

    #[test]
    fn numerically_equal_values_share_a_colour() {
        let values = [Value::Integer(1), Value::Integer(0), Value::Float(1.0)];
        let map = ColorMap::new(&values);

        assert_eq!(map.color_for(&Value::Integer(1)), map.color_for(&Value::Float(1.0)));
        assert_ne!(map.color_for(&Value::Integer(0)), map.color_for(&Value::Integer(1)));
        assert_eq!(map.color_for(&Value::Text("?".into())), Color32::GRAY);
    }

    #[test]
    fn coolwarm_endpoints() {
        assert_eq!(coolwarm(1.0), Color32::from_rgb(WARM.0, WARM.1, WARM.2));
        assert_eq!(coolwarm(-1.0), Color32::from_rgb(COOL.0, COOL.1, COOL.2));
        assert_eq!(coolwarm(f64::NAN), Color32::DARK_GRAY);
        assert_eq!(text_color_on(Color32::WHITE), Color32::BLACK);
    }
}
