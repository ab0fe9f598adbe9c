//! Free-text input parsing and quick-adjust nudges.
//!
//! Parsing never fails loudly: unparseable integers fall back to a caller
//! supplied value and unparseable decimals become `None`.

use super::text::format_decimal;

/// Parses a positive integer, falling back when the text is not a finite
/// number above zero. Decimal input is truncated ("8.7" -> 8).
pub fn parse_positive_int(text: &str, fallback: u32) -> u32 {
    match parse_number(text) {
        Some(value) if value >= 1.0 => value.trunc().min(f64::from(u32::MAX)) as u32,
        _ => fallback,
    }
}

/// Parses a non-negative whole number of seconds, falling back otherwise.
pub fn parse_whole_seconds(text: &str, fallback: u32) -> u32 {
    match parse_number(text) {
        Some(value) if value >= 0.0 => value.trunc().min(f64::from(u32::MAX)) as u32,
        _ => fallback,
    }
}

/// Parses a decimal accepting either `.` or `,` as separator.
///
/// Blank or unparseable text yields `None`, never zero.
pub fn parse_decimal(text: &str) -> Option<f64> {
    parse_number(text)
}

/// Returns the trimmed text, or `None` when blank.
pub fn parse_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Nudges a weight field by `delta` kg.
///
/// Blank or unparseable input counts as 0. The result is clamped at 0 and
/// rounded to one decimal place.
pub fn nudge_weight(text: &str, delta: f64) -> String {
    let current = parse_decimal(text).unwrap_or(0.0);
    let next = ((current + delta).max(0.0) * 10.0).round() / 10.0;
    format_decimal(next)
}

/// Nudges a reps field by `delta`, clamped at 0.
pub fn nudge_reps(text: &str, delta: i32) -> String {
    let current = parse_decimal(text).map(|v| v.max(0.0).trunc() as i64).unwrap_or(0);
    (current + i64::from(delta)).max(0).to_string()
}

fn parse_number(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_int_falls_back() {
        assert_eq!(parse_positive_int("9", 10), 9);
        assert_eq!(parse_positive_int(" 12 ", 10), 12);
        assert_eq!(parse_positive_int("", 10), 10);
        assert_eq!(parse_positive_int("0", 10), 10);
        assert_eq!(parse_positive_int("-3", 10), 10);
        assert_eq!(parse_positive_int("abc", 10), 10);
        assert_eq!(parse_positive_int("8.7", 10), 8);
    }

    #[test]
    fn test_whole_seconds_accepts_zero() {
        assert_eq!(parse_whole_seconds("0", 90), 0);
        assert_eq!(parse_whole_seconds("120", 90), 120);
        assert_eq!(parse_whole_seconds("-1", 90), 90);
        assert_eq!(parse_whole_seconds("inf", 90), 90);
    }

    #[test]
    fn test_decimal_accepts_comma() {
        assert_eq!(parse_decimal("62,5"), Some(62.5));
        assert_eq!(parse_decimal("62.5"), Some(62.5));
        assert_eq!(parse_decimal("  "), None);
        assert_eq!(parse_decimal("heavy"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn test_parse_text_trims_blank() {
        assert_eq!(parse_text("  "), None);
        assert_eq!(parse_text(" 3-1-1 "), Some("3-1-1".to_string()));
    }

    #[test]
    fn test_nudge_weight_rounds_and_clamps() {
        assert_eq!(nudge_weight("60", 2.5), "62.5");
        assert_eq!(nudge_weight("0.3", 0.1), "0.4");
        assert_eq!(nudge_weight("1", -2.5), "0");
        assert_eq!(nudge_weight("", 1.0), "1");
        assert_eq!(nudge_weight("62,5", -1.0), "61.5");
    }

    #[test]
    fn test_nudge_reps_clamps_at_zero() {
        assert_eq!(nudge_reps("10", 1), "11");
        assert_eq!(nudge_reps("0", -1), "0");
        assert_eq!(nudge_reps("", 1), "1");
    }
}
