//! Defusing of query-builder operator keywords in array input.
//!
//! A list value such as `["OR", "1"]` submitted as `id[]=OR&id[]=1` could be
//! read by a query builder as an operator override. Any string leaf that is
//! exactly one of the reserved keywords gets a trailing space so it can no
//! longer match an operator.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Reserved keywords, matched case-insensitively against the whole leaf.
/// One trailing newline is tolerated.
pub const RESERVED_OPERATORS: &[&str] = &[
    "EXP",
    "NEQ",
    "GT",
    "EGT",
    "LT",
    "ELT",
    "OR",
    "XOR",
    "LIKE",
    "NOTLIKE",
    "NOT BETWEEN",
    "NOTBETWEEN",
    "BETWEEN",
    "NOTIN",
    "NOT IN",
    "IN",
];

static OPERATOR: Lazy<Regex> = Lazy::new(|| {
    let alternatives = RESERVED_OPERATORS.join("|");
    Regex::new(&format!(r"(?i)^(?:{})\n?\z", alternatives)).expect("operator pattern is valid")
});

/// Returns true if `text` is a reserved operator keyword.
///
/// ```
/// use request_input::keyword::is_reserved_operator;
///
/// assert!(is_reserved_operator("not in"));
/// assert!(!is_reserved_operator("ORDER"));
/// ```
pub fn is_reserved_operator(text: &str) -> bool {
    OPERATOR.is_match(text)
}

/// Appends a space to every reserved keyword leaf, recursing into lists and maps.
///
/// Shape and key order are left untouched.
pub fn defuse_operators(value: &mut Value) {
    match value {
        Value::String(text) if is_reserved_operator(text.as_str()) => text.push(' '),
        Value::Array(items) => items.iter_mut().for_each(defuse_operators),
        Value::Object(map) => map.values_mut().for_each(defuse_operators),
        _ => {}
    }
}
