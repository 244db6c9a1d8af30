/// 1) Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// 2) Lenient numeric cell: empty or unparseable → `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// 3) Coerce a `TIME_PERIOD` cell to a year.
///
/// Integral text parses directly; a finite decimal such as `"2020.0"` is
/// truncated toward zero. Anything else (e.g. `"2020-Q1"`) yields `None`.
pub fn coerce_year(raw: &str) -> Option<i32> {
    let cleaned = clean_str(raw);
    if let Ok(year) = cleaned.parse::<i32>() {
        return Some(year);
    }
    let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let truncated = value.trunc();
    if truncated < i32::MIN as f64 || truncated > i32::MAX as f64 {
        return None;
    }
    Some(truncated as i32)
}

/// 4) Round for display: nearest two-decimal value of the exact binary
/// number, exact ties to even. Never overflows.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_strips_quotes_and_space() {
        assert_eq!(clean_str("  \"DEU\" "), "DEU");
        assert_eq!(clean_str("\""), "\"");
        assert_eq!(clean_str(" plain "), "plain");
    }

    #[test]
    fn numbers_are_lenient() {
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number(" \"7\" "), Some(7.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn years_coerce_like_numeric_columns() {
        assert_eq!(coerce_year("2021"), Some(2021));
        assert_eq!(coerce_year("2021.0"), Some(2021));
        assert_eq!(coerce_year(" 2019 "), Some(2019));
        assert_eq!(coerce_year("2020-Q1"), None);
        assert_eq!(coerce_year("NaN"), None);
        assert_eq!(coerce_year(""), None);
    }

    #[test]
    fn round2_is_display_rounding() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(-1.005_1), -1.01);
    }

    #[test]
    fn round2_ties_go_to_even_on_the_binary_value() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1e307), 1e307);
        assert!(round2(1e307).is_finite());
    }
}
