//! Lenient numeric coercion for values coming off the company data API.
//!
//! The upstream feed mixes JSON numbers, numeric strings ("1234.5"), blanks and
//! free text in the same column. These helpers turn a raw `serde_json::Value`
//! into a number when that is unambiguous and report "non-numeric" otherwise.

use serde_json::Value;

/// Convert a JSON value to `f64`.
///
/// Numbers are taken as-is, strings are trimmed and parsed, booleans map to
/// 1.0 / 0.0. Null, objects, arrays and unparseable strings yield `None`.
/// A string such as `"nan"` parses to NaN; callers decide what NaN means.
pub fn to_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Like [`to_numeric`] but also rejects NaN, so a series cell is either a real
/// number or missing.
pub fn to_series_value(value: Option<&Value>) -> Option<f64> {
    value.and_then(to_numeric).filter(|v| !v.is_nan())
}

/// Render a scalar JSON value as text (used for identifiers that arrive as
/// either `"123"` or `123`).
pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Replace NaN and infinities with 0.0.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_and_numeric_strings() {
        assert_eq!(to_numeric(&json!(42)), Some(42.0));
        assert_eq!(to_numeric(&json!(-3.5)), Some(-3.5));
        assert_eq!(to_numeric(&json!("1234.5")), Some(1234.5));
        assert_eq!(to_numeric(&json!("  7 ")), Some(7.0));
    }

    #[test]
    fn test_non_numeric_values() {
        assert_eq!(to_numeric(&json!(null)), None);
        assert_eq!(to_numeric(&json!("")), None);
        assert_eq!(to_numeric(&json!("n/a")), None);
        assert_eq!(to_numeric(&json!("1,234")), None);
        assert_eq!(to_numeric(&json!([1, 2])), None);
        assert_eq!(to_numeric(&json!({"value": 1})), None);
    }

    #[test]
    fn test_series_value_drops_nan() {
        assert!(to_numeric(&json!("nan")).unwrap().is_nan());
        assert_eq!(to_series_value(Some(&json!("nan"))), None);
        assert_eq!(to_series_value(None), None);
        assert_eq!(to_series_value(Some(&json!("12"))), Some(12.0));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&json!("TCS")), Some("TCS".to_string()));
        assert_eq!(to_text(&json!(532540)), Some("532540".to_string()));
        assert_eq!(to_text(&json!(null)), None);
    }

    #[test]
    fn test_finite_or_zero() {
        assert_eq!(finite_or_zero(12.5), 12.5);
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(f64::NEG_INFINITY), 0.0);
    }
}
