//! Loose scalar conversions used for type coercion.
//!
//! Request input arrives as text, so conversions follow "leading numeric"
//! rules rather than strict parsing: `"42abc"` is 42, `"abc"` is 0, and
//! only `""` and `"0"` are falsy strings.

use serde_json::Value;

use crate::TypeCode;

/// Coerces `value` to the type selected by `code`.
///
/// # Examples
///
/// ```
/// use request_input::{cast::type_cast, TypeCode};
/// use serde_json::json;
///
/// assert_eq!(type_cast(json!("42abc"), TypeCode::Int), json!(42));
/// assert_eq!(type_cast(json!("0"), TypeCode::Bool), json!(false));
/// assert_eq!(type_cast(json!(7), TypeCode::String), json!("7"));
/// assert_eq!(type_cast(json!("x"), TypeCode::Array), json!(["x"]));
/// ```
pub fn type_cast(value: Value, code: TypeCode) -> Value {
    match code {
        TypeCode::Array => match value {
            Value::Array(_) | Value::Object(_) => value,
            Value::Null => Value::Array(Vec::new()),
            scalar => Value::Array(vec![scalar]),
        },
        TypeCode::Int => Value::from(int_of(&value)),
        TypeCode::Float => Value::from(float_of(&value)),
        TypeCode::Bool => Value::Bool(truthy(&value)),
        TypeCode::String => Value::String(string_of(&value)),
    }
}

/// Converts a value to its text form.
///
/// `true` is `"1"`, `false` and null are `""`, integral floats print
/// without a fraction and lists or maps print as `"Array"`.
pub fn string_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format_float(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => "Array".to_string(),
    }
}

/// Converts a value to an integer, truncating toward zero.
///
/// Strings use their leading numeric prefix and saturate at the `i64` range.
pub fn int_of(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if n.as_u64().is_some() {
                i64::MAX
            } else {
                n.as_f64().unwrap_or(0.0) as i64
            }
        }
        Value::String(s) => int_of_str(s),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(map) => i64::from(!map.is_empty()),
    }
}

/// Converts a value to a float using the same prefix rule as [`int_of`].
///
/// Text that overflows saturates at `f64::MAX` or `f64::MIN`.
pub fn float_of(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => numeric_prefix(s)
            .and_then(|(prefix, _)| prefix.parse::<f64>().ok())
            .map(|f| f.clamp(f64::MIN, f64::MAX))
            .unwrap_or(0.0),
        Value::Array(items) => f64::from(u8::from(!items.is_empty())),
        Value::Object(map) => f64::from(u8::from(!map.is_empty())),
    }
}

/// Truthiness of a value.
///
/// False for null, `false`, zero, `""`, `"0"` and empty lists or maps.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i != 0
            } else if let Some(u) = n.as_u64() {
                u != 0
            } else {
                n.as_f64().is_some_and(|f| f != 0.0)
            }
        }
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn int_of_str(s: &str) -> i64 {
    match numeric_prefix(s) {
        Some((prefix, true)) => prefix.parse::<i64>().unwrap_or_else(|_| {
            if prefix.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }
        }),
        Some((prefix, false)) => prefix.parse::<f64>().map_or(0, |f| f as i64),
        None => 0,
    }
}

/// Finds the leading numeric part of `s` after optional whitespace.
///
/// Returns the prefix and whether it is a plain integer (no fraction or
/// exponent). `None` when `s` does not start with a number.
pub(crate) fn numeric_prefix(s: &str) -> Option<(&str, bool)> {
    let s = s.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    let mut integral = true;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
            integral = false;
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
            integral = false;
        }
    }

    Some((&s[..end], integral))
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }

    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e15).contains(&magnitude) {
        // 1.5e-7 -> 1.5E-7, 1e20 -> 1.0E+20
        let formatted = format!("{:e}", f);
        let (mantissa, exponent) = formatted
            .split_once('e')
            .unwrap_or((formatted.as_str(), "0"));
        let mantissa = if mantissa.contains('.') {
            mantissa.to_string()
        } else {
            format!("{}.0", mantissa)
        };
        return match exponent.strip_prefix('-') {
            Some(digits) => format!("{}E-{}", mantissa, digits),
            None => format!("{}E+{}", mantissa, exponent),
        };
    }

    if f.fract() == 0.0 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_truncates_trailing_garbage() {
        assert_eq!(int_of(&json!("42abc")), 42);
        assert_eq!(int_of(&json!("  -7 apples")), -7);
        assert_eq!(int_of(&json!("abc")), 0);
        assert_eq!(int_of(&json!("")), 0);
    }

    #[test]
    fn int_follows_fraction_and_exponent() {
        assert_eq!(int_of(&json!("3.99")), 3);
        assert_eq!(int_of(&json!("1e3")), 1000);
        assert_eq!(int_of(&json!("-2.5")), -2);
        assert_eq!(int_of(&json!(".5")), 0);
    }

    #[test]
    fn int_saturates_on_overflow() {
        assert_eq!(int_of(&json!("99999999999999999999")), i64::MAX);
        assert_eq!(int_of(&json!("-99999999999999999999")), i64::MIN);
    }

    #[test]
    fn int_of_non_strings() {
        assert_eq!(int_of(&json!(true)), 1);
        assert_eq!(int_of(&json!(null)), 0);
        assert_eq!(int_of(&json!(9.9)), 9);
        assert_eq!(int_of(&json!([1, 2])), 1);
        assert_eq!(int_of(&json!([])), 0);
    }

    #[test]
    fn float_uses_numeric_prefix() {
        assert_eq!(float_of(&json!("3.14xyz")), 3.14);
        assert_eq!(float_of(&json!("2e2")), 200.0);
        assert_eq!(float_of(&json!("1e")), 1.0);
        assert_eq!(float_of(&json!("nope")), 0.0);
    }

    #[test]
    fn float_overflow_saturates() {
        assert_eq!(float_of(&json!("1e999")), f64::MAX);
        assert_eq!(float_of(&json!("-1e999abc")), f64::MIN);
        assert_eq!(type_cast(json!("1e999"), TypeCode::Float), json!(f64::MAX));
    }

    #[test]
    fn truthiness_rules() {
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!("0")));
        assert!(truthy(&json!("1")));
        assert!(truthy(&json!("0.0")));
        assert!(truthy(&json!("false")));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!(0.0)));
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!({})));
        assert!(truthy(&json!(["x"])));
    }

    #[test]
    fn string_conversions() {
        assert_eq!(string_of(&json!(true)), "1");
        assert_eq!(string_of(&json!(false)), "");
        assert_eq!(string_of(&json!(null)), "");
        assert_eq!(string_of(&json!(12)), "12");
        assert_eq!(string_of(&json!(1.0)), "1");
        assert_eq!(string_of(&json!(0.25)), "0.25");
        assert_eq!(string_of(&json!([1])), "Array");
    }

    #[test]
    fn large_and_tiny_floats_use_exponent_form() {
        assert_eq!(format_float(1e20), "1.0E+20");
        assert_eq!(format_float(1.5e-7), "1.5E-7");
        assert_eq!(format_float(f64::INFINITY), "INF");
    }

    #[test]
    fn type_cast_array_wraps_scalars() {
        assert_eq!(type_cast(json!("a"), TypeCode::Array), json!(["a"]));
        assert_eq!(type_cast(json!(null), TypeCode::Array), json!([]));
        assert_eq!(type_cast(json!({"k": 1}), TypeCode::Array), json!({"k": 1}));
    }

    #[test]
    fn type_cast_int_then_string_matches_integer_text() {
        let int = type_cast(json!("0042"), TypeCode::Int);
        assert_eq!(int, json!(42));
        assert_eq!(type_cast(int, TypeCode::String), json!("42"));
    }

    #[test]
    fn numeric_prefix_requires_a_digit() {
        assert_eq!(numeric_prefix("-"), None);
        assert_eq!(numeric_prefix("."), None);
        assert_eq!(numeric_prefix("+3x"), Some(("+3", true)));
        assert_eq!(numeric_prefix("4.e"), Some(("4.", false)));
    }
}
