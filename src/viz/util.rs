//! Utility functions for visualization: colors, scaling, label sizing.

use crate::report::format_number;
use plotters::prelude::*;

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    OFFICE10[idx % OFFICE10.len()].to_rgba()
}

/// Pick a single Y-axis scale and its human label based on the overall magnitude.
/// Returns (scale, label), e.g. (1e6, "millions").
pub fn choose_axis_scale(max_abs: f64) -> (f64, &'static str) {
    if max_abs >= 1.0e9 {
        (1.0e9, "billions")
    } else if max_abs >= 1.0e6 {
        (1.0e6, "millions")
    } else if max_abs >= 1.0e3 {
        (1.0e3, "thousands")
    } else {
        (1.0, "")
    }
}

/// Tick label for a (scaled) Y value: fewer decimals as magnitude grows, locale separators.
pub fn y_tick_label(v: f64, locale_tag: &str) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format_number(v, prec, locale_tag)
}

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Shorten a category label to `max_chars`, ending in an ellipsis when cut.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Compute a tight left label area width for the Y axis (in pixels),
/// based on the formatted tick labels that will appear.
pub fn compute_left_label_area_px(
    ymin_scaled: f64,
    ymax_scaled: f64,
    ticks: usize,
    font_px: u32,
    locale_tag: &str,
) -> u32 {
    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let v = ymin_scaled + (ymax_scaled - ymin_scaled) * t;
        max_px = max_px.max(estimate_text_width_px(&y_tick_label(v, locale_tag), font_px));
    }
    // Room for tick marks and the rotated axis title.
    max_px.saturating_add(36).clamp(60, 160)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_scale_thresholds() {
        assert_eq!(choose_axis_scale(999.0), (1.0, ""));
        assert_eq!(choose_axis_scale(741_999.8), (1.0e3, "thousands"));
        assert_eq!(choose_axis_scale(2_297_200.9), (1.0e6, "millions"));
    }

    #[test]
    fn labels_are_truncated_with_ellipsis() {
        assert_eq!(truncate_label("Chairs", 10), "Chairs");
        assert_eq!(truncate_label("Envelopes and Labels", 8), "Envelop…");
    }

    #[test]
    fn tick_labels_follow_locale() {
        assert_eq!(y_tick_label(1234.0, "en"), "1,234");
        assert_eq!(y_tick_label(1234.0, "de"), "1.234");
        assert_eq!(y_tick_label(2.5, "de"), "2,50");
        assert_eq!(y_tick_label(-12.34, "en"), "-12.3");
    }

    #[test]
    fn left_area_is_clamped() {
        let px = compute_left_label_area_px(0.0, 10.0, 10, 12, "en");
        assert!((60..=160).contains(&px));
    }
}
