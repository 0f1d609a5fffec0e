// Utility helpers for forgiving cell coercion and number formatting.
//
// This module centralizes the "dirty" spreadsheet handling so the rest of the
// pipeline can assume clean, typed values.
use crate::types::Cell;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[?(\d+)\]?").unwrap());

/// Coerce a cell to an integer, never failing.
///
/// - Integers pass through.
/// - Floats are truncated toward zero when the result fits in an `i64`.
/// - Text is trimmed and parsed as an integer, then as a float.
/// - Anything else (empty, garbage, NaN, out of range, booleans as text)
///   becomes `0`.
pub fn coerce_i64(cell: &Cell) -> i64 {
    match cell {
        Cell::Int(v) => *v,
        Cell::Float(v) => truncate_f64(*v).unwrap_or(0),
        Cell::Empty => 0,
        Cell::Bool(b) => i64::from(*b),
        Cell::Text(s) => parse_i64_safe(Some(s)).unwrap_or(0),
    }
}

pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    // Whole-number floats such as "12.0" come out of some exporters.
    s.parse::<f64>().ok().and_then(truncate_f64)
}

// `as` saturates, so range-check first. `i64::MAX as f64` rounds up to 2^63,
// which is itself out of range.
fn truncate_f64(v: f64) -> Option<i64> {
    let t = v.trunc();
    (t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
}

/// Leading numeric code of an area name, e.g. `"[12] Foo"` -> `"12"`.
pub fn parse_code(area_name: &str) -> Option<String> {
    LEADING_CODE
        .captures(area_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts and sums in previews
    // (e.g., `9,855`). Negative values keep their sign.
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_zeroes_garbage() {
        assert_eq!(coerce_i64(&Cell::Int(7)), 7);
        assert_eq!(coerce_i64(&Cell::Float(10.9)), 10);
        assert_eq!(coerce_i64(&Cell::Float(f64::NAN)), 0);
        assert_eq!(coerce_i64(&Cell::Text(" -3 ".into())), -3);
        assert_eq!(coerce_i64(&Cell::Text("4.0".into())), 4);
        assert_eq!(coerce_i64(&Cell::Text("n/a".into())), 0);
        assert_eq!(coerce_i64(&Cell::Empty), 0);
    }

    #[test]
    fn out_of_range_floats_become_zero() {
        assert_eq!(coerce_i64(&Cell::Text("1e19".into())), 0);
        assert_eq!(coerce_i64(&Cell::Text("-1e19".into())), 0);
        assert_eq!(coerce_i64(&Cell::Float(1e19)), 0);
        assert_eq!(coerce_i64(&Cell::Float(i64::MAX as f64)), 0);
        assert_eq!(coerce_i64(&Cell::Float(f64::INFINITY)), 0);
        assert_eq!(coerce_i64(&Cell::Float(-9.0e18)), -9_000_000_000_000_000_000);
        assert_eq!(coerce_i64(&Cell::Text("1e18".into())), 1_000_000_000_000_000_000);
    }

    #[test]
    fn code_extraction() {
        assert_eq!(parse_code("[12] Foo").as_deref(), Some("12"));
        assert_eq!(parse_code("  007 RT 2").as_deref(), Some("007"));
        assert_eq!(parse_code("  [5 Bar").as_deref(), Some("5"));
        assert_eq!(parse_code("RT 12"), None);
        assert_eq!(parse_code("[] 12"), None);
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_int(1234567i64), "1,234,567");
        assert_eq!(format_int(-2500i64), "-2,500");
    }
}
