use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
            hsl_to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps category labels (regions or products) to distinct colours.
///
/// Built over the dataset's full category universe, so a category keeps its
/// colour regardless of the current filter selection.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over the given categories.
    pub fn new<'a, I>(categories: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let categories: Vec<&String> = categories.into_iter().collect();
        let palette = generate_palette(categories.len());
        let mapping: BTreeMap<String, Color32> = categories
            .into_iter()
            .zip(palette)
            .map(|(label, color)| (label.clone(), color))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Margin ramp for the region × product matrix
// ---------------------------------------------------------------------------

/// Map a value within `[lo, hi]` onto a red → green hue ramp.
///
/// Used for profit-margin cells: the lowest observed margin renders red, the
/// highest green.  A collapsed range maps everything to the midpoint.
pub fn ramp_color(value: f64, lo: f64, hi: f64) -> Color32 {
    let t = if (hi - lo).abs() < f64::EPSILON {
        0.5
    } else {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    };
    hsl_to_color32(Hsl::new(t as f32 * 120.0, 0.65, 0.55))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_entries() {
        let palette = generate_palette(4);
        assert_eq!(palette.len(), 4);
        for (i, a) in palette.iter().enumerate() {
            for b in palette.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_labels_fall_back_to_the_default() {
        let regions = vec!["England".to_string(), "Wales".to_string()];
        let map = ColorMap::new(&regions);
        assert_ne!(map.color_for("England"), map.color_for("Wales"));
        assert_eq!(map.color_for("Atlantis"), Color32::GRAY);
    }

    #[test]
    fn ramp_endpoints_are_red_and_green() {
        let low = ramp_color(0.0, 0.0, 1.0);
        let high = ramp_color(1.0, 0.0, 1.0);
        assert!(low.r() > low.g());
        assert!(high.g() > high.r());
        // Collapsed range stays in the middle rather than dividing by zero.
        let mid = ramp_color(0.3, 0.3, 0.3);
        assert_eq!(mid, ramp_color(0.5, 0.0, 1.0));
    }
}
