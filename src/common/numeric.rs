use serde_json::Value;

/// Placeholder shown for missing or unusable attribute values.
pub const NOT_AVAILABLE: &str = "Não Disponível";

/// Coerce a JSON attribute into a finite number.
///
/// Numbers and numeric strings (surrounding whitespace ignored) convert; null,
/// NaN, infinities, booleans and free text such as `"N/A"` yield `None`.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    let x = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    x.is_finite().then_some(x)
}

/// Coerce an optional attribute (absent keys are `None`).
#[inline]
pub fn coerce_opt(value: Option<&Value>) -> Option<f64> {
    value.and_then(coerce_numeric)
}

/// Round to `places` decimal places.
#[inline]
pub fn round_to(x: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (x * factor).round() / factor
}

/// Render an attribute for display, mapping unusable values to [`NOT_AVAILABLE`].
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || matches!(trimmed.to_ascii_lowercase().as_str(), "nan" | "none" | "null") {
                NOT_AVAILABLE.to_string()
            } else {
                s.clone()
            }
        }
        Some(Value::Number(n)) => match n.as_f64() {
            Some(x) if x.is_nan() => NOT_AVAILABLE.to_string(),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// Format hectares the Brazilian way: `.` groups thousands, `,` marks decimals.
pub fn format_hectares(x: f64) -> String {
    let fixed = format!("{:.2}", x.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 { grouped.push('.') }
        grouped.push(ch);
    }

    let sign = if x < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_numeric(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_numeric(&json!(7)), Some(7.0));
        assert_eq!(coerce_numeric(&json!(" 3.25 ")), Some(3.25));
    }

    #[test]
    fn coerce_rejects_unusable_values() {
        assert_eq!(coerce_numeric(&Value::Null), None);
        assert_eq!(coerce_numeric(&json!("N/A")), None);
        assert_eq!(coerce_numeric(&json!("NaN")), None);
        assert_eq!(coerce_numeric(&json!("")), None);
        assert_eq!(coerce_numeric(&json!(true)), None);
        assert_eq!(coerce_opt(None), None);
    }

    #[test]
    fn display_value_replaces_blank_and_null_like_text() {
        assert_eq!(display_value(None), NOT_AVAILABLE);
        assert_eq!(display_value(Some(&Value::Null)), NOT_AVAILABLE);
        assert_eq!(display_value(Some(&json!("  "))), NOT_AVAILABLE);
        assert_eq!(display_value(Some(&json!("None"))), NOT_AVAILABLE);
        assert_eq!(display_value(Some(&json!("Federal"))), "Federal");
        assert_eq!(display_value(Some(&json!(42))), "42");
    }

    #[test]
    fn hectares_use_brazilian_separators() {
        assert_eq!(format_hectares(1234567.891), "1.234.567,89");
        assert_eq!(format_hectares(999.5), "999,50");
        assert_eq!(format_hectares(0.0), "0,00");
        assert_eq!(format_hectares(-1500.0), "-1.500,00");
    }

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(33.33333, 2), 33.33);
        assert_eq!(round_to(66.666, 2), 66.67);
    }
}
