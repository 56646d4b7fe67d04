//! Plain-text rendering of view results with locale-aware number formatting.

use crate::views::{View, ViewOutput};
use num_format::{Locale, ToFormattedString};

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Format `v` with thousands separators and exactly `decimals` fraction digits.
pub fn format_number(v: f64, decimals: u32, locale_tag: &str) -> String {
    if !v.is_finite() {
        return "NA".to_string();
    }
    let (locale, dec_sep) = map_locale(locale_tag);
    let scale = 10u128.pow(decimals);
    let scaled_f = (v.abs() * scale as f64).round();
    if scaled_f >= u128::MAX as f64 {
        return format_wide(v, decimals, locale.separator(), dec_sep);
    }
    let scaled = scaled_f as u128;
    let sign = if v < 0.0 && scaled != 0 { "-" } else { "" };
    let mut s = format!("{sign}{}", (scaled / scale).to_formatted_string(locale));
    if decimals > 0 {
        s.push(dec_sep);
        s.push_str(&format!("{:0width$}", scaled % scale, width = decimals as usize));
    }
    s
}

/// Magnitudes past `u128`: group the digits of the shortest exact decimal rendering.
fn format_wide(v: f64, decimals: u32, group_sep: &str, dec_sep: char) -> String {
    let plain = format!("{:.*}", decimals as usize, v.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), ""));
    let mut s = String::with_capacity(plain.len() * 2);
    if v < 0.0 {
        s.push('-');
    }
    let first = int_part.len() % 3;
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (i + 3 - first) % 3 == 0 {
            s.push_str(group_sep);
        }
        s.push(ch);
    }
    if !frac_part.is_empty() {
        s.push(dec_sep);
        s.push_str(frac_part);
    }
    s
}

fn decimals_for(currency: bool) -> u32 {
    if currency { 2 } else { 0 }
}

/// Render a view result as an aligned text table headed by the view title.
pub fn render(view: View, output: &ViewOutput, locale_tag: &str) -> String {
    let (header, rows, numeric_from) = match output {
        ViewOutput::Series(s) => {
            let mut header: Vec<String> = s.dimensions.iter().map(|d| d.column().to_string()).collect();
            let n = header.len();
            header.push(s.measure.column().to_string());
            let dec = decimals_for(s.measure.is_currency());
            let rows = s
                .rows
                .iter()
                .map(|r| {
                    let mut cells = r.key.parts().to_vec();
                    cells.push(format_number(r.value, dec, locale_tag));
                    cells
                })
                .collect::<Vec<_>>();
            (header, rows, n)
        }
        ViewOutput::Dual(d) => {
            let mut header: Vec<String> = d.dimensions.iter().map(|d| d.column().to_string()).collect();
            let n = header.len();
            header.extend(d.metrics.iter().map(|m| m.column().to_string()));
            let rows = d
                .rows
                .iter()
                .map(|r| {
                    let mut cells = r.key.parts().to_vec();
                    for (m, v) in d.metrics.iter().zip(r.values) {
                        cells.push(format_number(v, decimals_for(m.is_currency()), locale_tag));
                    }
                    cells
                })
                .collect::<Vec<_>>();
            (header, rows, n)
        }
        ViewOutput::Ratio(t) => {
            let mut header: Vec<String> = t.dimensions.iter().map(|d| d.column().to_string()).collect();
            let n = header.len();
            header.extend([
                t.numerator.column().to_string(),
                t.denominator.column().to_string(),
                format!("{}_to_{}_ratio", t.numerator, t.denominator),
            ]);
            let rows = t
                .rows
                .iter()
                .map(|r| {
                    let mut cells = r.key.parts().to_vec();
                    cells.push(format_number(r.numerator, decimals_for(t.numerator.is_currency()), locale_tag));
                    cells.push(format_number(r.denominator, decimals_for(t.denominator.is_currency()), locale_tag));
                    cells.push(match r.ratio.value() {
                        Some(v) => format_number(v, 2, locale_tag),
                        None => r.ratio.to_string(),
                    });
                    cells
                })
                .collect::<Vec<_>>();
            (header, rows, n)
        }
    };

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i >= numeric_from {
                    format!("{:>w$}", c, w = widths[i])
                } else {
                    format!("{:<w$}", c, w = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = format!("{}\n{}\n", view.title(), line(header.as_slice()));
    if rows.is_empty() {
        out.push_str("(no data)\n");
    }
    for row in &rows {
        out.push_str(&line(row.as_slice()));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_follow_locale() {
        assert_eq!(format_number(1234567.891, 2, "en"), "1,234,567.89");
        assert_eq!(format_number(1234567.891, 2, "de"), "1.234.567,89");
        assert_eq!(format_number(-0.004, 2, "en"), "0.00");
        assert_eq!(format_number(-1500.0, 0, "en"), "-1,500");
        assert_eq!(format_number(f64::NAN, 2, "en"), "NA");
    }

    #[test]
    fn large_totals_keep_every_digit() {
        assert_eq!(format_number(1e25, 0, "en"), "10,000,000,000,000,000,905,969,664");
        assert_eq!(format_number(-2.5e20, 0, "de"), "-250.000.000.000.000.000.000");
        assert_eq!(
            format_number(1e40, 0, "en"),
            "10,000,000,000,000,000,303,786,028,427,003,666,890,752"
        );
        assert_eq!(format_number(-1e40, 1, "de"), format!("-{},0", format_number(1e40, 0, "de")));
    }
}
