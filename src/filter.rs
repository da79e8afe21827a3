//! Filter specifications and the parsed filter chain.
//!
//! Callers describe filters loosely (`""`, `"trim,int"`, `vec!["trim"]`,
//! `274`, `"/^[a-z]+$/"`). [`FilterSpec`] captures that description and
//! [`parse_filters`] resolves it once into a chain of [`Filter`]s.

use std::fmt;

use regex::Regex;
use serde_json::Value;

use crate::builtin::BuiltinFilter;
use crate::cast::string_of;
use crate::registry::{FilterFn, FilterRegistry};

/// One filter identifier as the caller wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterId {
    /// A callable name, built-in name or delimited pattern.
    Name(String),
    /// A built-in filter id.
    Id(i64),
}

impl From<&str> for FilterId {
    fn from(name: &str) -> Self {
        FilterId::Name(name.to_string())
    }
}

impl From<String> for FilterId {
    fn from(name: String) -> Self {
        FilterId::Name(name)
    }
}

impl From<i64> for FilterId {
    fn from(id: i64) -> Self {
        FilterId::Id(id)
    }
}

impl From<i32> for FilterId {
    fn from(id: i32) -> Self {
        FilterId::Id(i64::from(id))
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterId::Name(name) => write!(f, "{}", name),
            FilterId::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// The filter argument of an accessor call.
///
/// An empty string (or [`FilterSpec::Default`]) selects the configured
/// default filter. A comma-separated string is split into several names,
/// except when the whole string is a delimited pattern.
///
/// # Examples
///
/// ```
/// use request_input::{FilterId, FilterSpec};
///
/// assert_eq!(FilterSpec::from(""), FilterSpec::Default);
/// assert_eq!(
///     FilterSpec::from("trim,int"),
///     FilterSpec::List(vec![FilterId::from("trim"), FilterId::from("int")])
/// );
/// assert_eq!(
///     FilterSpec::from("/^[a-z]{1,3}$/"),
///     FilterSpec::List(vec![FilterId::from("/^[a-z]{1,3}$/")])
/// );
/// assert_eq!(FilterSpec::from(274), FilterSpec::List(vec![FilterId::Id(274)]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterSpec {
    /// Use the configured default.
    #[default]
    Default,
    /// Explicit identifiers, applied in order.
    List(Vec<FilterId>),
}

impl FilterSpec {
    /// True when this spec defers to the configured default.
    pub fn is_default(&self) -> bool {
        matches!(self, FilterSpec::Default)
    }
}

impl From<&str> for FilterSpec {
    fn from(spec: &str) -> Self {
        if spec.is_empty() {
            return FilterSpec::Default;
        }
        let trimmed = spec.trim();
        if pattern_source(trimmed).is_some() && !is_pattern_list(trimmed) {
            return FilterSpec::List(vec![FilterId::from(trimmed)]);
        }
        FilterSpec::List(spec.split(',').map(FilterId::from).collect())
    }
}

impl From<String> for FilterSpec {
    fn from(spec: String) -> Self {
        FilterSpec::from(spec.as_str())
    }
}

impl From<&String> for FilterSpec {
    fn from(spec: &String) -> Self {
        FilterSpec::from(spec.as_str())
    }
}

impl From<i64> for FilterSpec {
    fn from(id: i64) -> Self {
        FilterSpec::List(vec![FilterId::Id(id)])
    }
}

impl From<i32> for FilterSpec {
    fn from(id: i32) -> Self {
        FilterSpec::from(i64::from(id))
    }
}

impl From<BuiltinFilter> for FilterSpec {
    fn from(filter: BuiltinFilter) -> Self {
        FilterSpec::List(vec![FilterId::Id(filter.id())])
    }
}

impl<T: Into<FilterId>> From<Vec<T>> for FilterSpec {
    fn from(ids: Vec<T>) -> Self {
        FilterSpec::List(ids.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterId> + Clone> From<&[T]> for FilterSpec {
    fn from(ids: &[T]) -> Self {
        FilterSpec::List(ids.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<FilterId>, const N: usize> From<[T; N]> for FilterSpec {
    fn from(ids: [T; N]) -> Self {
        FilterSpec::List(ids.into_iter().map(Into::into).collect())
    }
}

/// A resolved filter.
#[derive(Clone)]
pub enum Filter {
    /// A registered callable.
    Callable {
        /// Name it was registered under.
        name: String,
        /// The function itself.
        func: FilterFn,
    },
    /// A built-in validator or sanitizer.
    Builtin(BuiltinFilter),
    /// A delimited pattern. `None` when the pattern failed to compile,
    /// in which case it matches nothing.
    Pattern {
        /// The pattern as written, delimiters included.
        source: String,
        /// Compiled form.
        regex: Option<Regex>,
    },
}

impl Filter {
    /// Resolves a single identifier.
    ///
    /// Delimited patterns win over registered names, which win over built-in
    /// names. Unknown names resolve to [`BuiltinFilter::UnsafeRaw`]; blank
    /// names resolve to `None`.
    pub fn resolve(id: &FilterId, registry: &FilterRegistry) -> Option<Self> {
        match id {
            FilterId::Id(number) => Some(match BuiltinFilter::from_id(*number) {
                Some(builtin) => Filter::Builtin(builtin),
                None => {
                    tracing::warn!(
                        target: "request_input",
                        filter_id = number,
                        "unknown filter id, passing value through"
                    );
                    Filter::Builtin(BuiltinFilter::UnsafeRaw)
                }
            }),
            FilterId::Name(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                if let Some((body, flags)) = pattern_source(name) {
                    return Some(Filter::Pattern {
                        source: name.to_string(),
                        regex: compile_pattern(name, body, flags),
                    });
                }
                if let Some(func) = registry.get(name) {
                    return Some(Filter::Callable {
                        name: name.to_string(),
                        func,
                    });
                }
                Some(match BuiltinFilter::from_name(name) {
                    Some(builtin) => Filter::Builtin(builtin),
                    None => {
                        tracing::warn!(
                            target: "request_input",
                            filter = name,
                            "unknown filter, passing value through"
                        );
                        Filter::Builtin(BuiltinFilter::UnsafeRaw)
                    }
                })
            }
        }
    }

    /// True if this is a delimited pattern.
    pub fn is_pattern(&self) -> bool {
        matches!(self, Filter::Pattern { .. })
    }

    /// Name used in logs and error messages.
    pub fn label(&self) -> String {
        match self {
            Filter::Callable { name, .. } => name.clone(),
            Filter::Builtin(builtin) => builtin.name().to_string(),
            Filter::Pattern { source, .. } => source.clone(),
        }
    }

    /// True if the text form of `value` matches. Always false for
    /// non-pattern filters.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Filter::Pattern {
                regex: Some(regex), ..
            } => regex.is_match(&string_of(value)),
            _ => false,
        }
    }

    /// Applies the filter to a scalar. `None` means the value was rejected.
    pub fn apply(&self, value: Value) -> Option<Value> {
        match self {
            Filter::Callable { func, .. } => Some(func(value)),
            Filter::Builtin(builtin) => builtin.apply(&value),
            Filter::Pattern { .. } => self.matches(&value).then_some(value),
        }
    }

    /// Applies the filter to every leaf of a list or map, keeping its shape.
    ///
    /// Rejected leaves become null.
    pub fn apply_recursive(&self, value: Value) -> Value {
        match value {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.apply_recursive(v)).collect())
            }
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, self.apply_recursive(v)))
                    .collect(),
            ),
            leaf => self.apply(leaf).unwrap_or(Value::Null),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Callable { name, .. } => f.debug_tuple("Callable").field(name).finish(),
            Filter::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
            Filter::Pattern { source, regex } => f
                .debug_struct("Pattern")
                .field("source", source)
                .field("valid", &regex.is_some())
                .finish(),
        }
    }
}

/// Resolves `spec` into a filter chain, falling back to `default` when
/// `spec` is [`FilterSpec::Default`]. Blank identifiers are dropped.
///
/// # Examples
///
/// ```
/// use request_input::{parse_filters, FilterRegistry, FilterSpec};
///
/// let registry = FilterRegistry::with_defaults();
/// let chain = parse_filters(&FilterSpec::from("trim,int"), &FilterSpec::Default, &registry);
///
/// assert_eq!(chain.len(), 2);
/// assert_eq!(chain[0].label(), "trim");
/// assert_eq!(chain[1].label(), "int");
/// ```
pub fn parse_filters(
    spec: &FilterSpec,
    default: &FilterSpec,
    registry: &FilterRegistry,
) -> Vec<Filter> {
    let effective = if spec.is_default() { default } else { spec };
    match effective {
        FilterSpec::Default => Vec::new(),
        FilterSpec::List(ids) => ids
            .iter()
            .filter_map(|id| Filter::resolve(id, registry))
            .collect(),
    }
}

/// Splits a delimited pattern such as `/^a+$/i` into body and flags.
///
/// Accepted delimiters are `/`, `#` and `~`, the same at both ends.
fn pattern_source(text: &str) -> Option<(&str, &str)> {
    let delimiter = text.chars().next()?;
    if !matches!(delimiter, '/' | '#' | '~') {
        return None;
    }
    let rest = &text[1..];
    let end = rest.rfind(delimiter)?;
    let flags = &rest[end + 1..];
    if !flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'u' | 'U')) {
        return None;
    }
    Some((&rest[..end], flags))
}

/// True for `/a/,/b/`: a comma list whose every item is a delimited pattern.
fn is_pattern_list(text: &str) -> bool {
    let mut items = text.split(',');
    let first = items.next();
    let rest: Vec<_> = items.collect();
    !rest.is_empty()
        && first
            .into_iter()
            .chain(rest)
            .all(|item| pattern_source(item.trim()).is_some())
}

fn compile_pattern(source: &str, body: &str, flags: &str) -> Option<Regex> {
    let inline: String = flags
        .chars()
        .filter_map(|c| match c {
            'i' | 'm' | 's' | 'x' | 'U' => Some(c),
            _ => None,
        })
        .collect();
    let pattern = if inline.is_empty() {
        body.to_string()
    } else {
        format!("(?{}){}", inline, body)
    };
    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::warn!(
                target: "request_input",
                pattern = source,
                error = %err,
                "invalid filter pattern, every value will be rejected"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> FilterRegistry {
        FilterRegistry::with_defaults()
    }

    #[test]
    fn empty_string_is_default() {
        assert!(FilterSpec::from("").is_default());
        assert!(FilterSpec::from(String::new()).is_default());
    }

    #[test]
    fn comma_string_splits_in_order() {
        let spec = FilterSpec::from("trim,strtolower,email");
        assert_eq!(
            spec,
            FilterSpec::List(vec!["trim".into(), "strtolower".into(), "email".into()])
        );
    }

    #[test]
    fn pattern_with_comma_is_not_split() {
        let spec = FilterSpec::from("/^[a-z]{2,4}$/");
        assert_eq!(spec, FilterSpec::List(vec!["/^[a-z]{2,4}$/".into()]));
    }

    #[test]
    fn comma_list_of_patterns_splits() {
        let spec = FilterSpec::from("/^a/,/b$/i");
        assert_eq!(spec, FilterSpec::List(vec!["/^a/".into(), "/b$/i".into()]));

        let chain = parse_filters(&spec, &FilterSpec::Default, &registry());
        assert_eq!(chain.len(), 2);
        assert!(chain[0].matches(&json!("ab")));
        assert!(chain[1].matches(&json!("xB")));
    }

    #[test]
    fn comma_inside_pattern_stays_whole() {
        let spec = FilterSpec::from("/^[a,b]+$/");
        assert_eq!(spec, FilterSpec::List(vec!["/^[a,b]+$/".into()]));
    }

    #[test]
    fn list_and_array_forms() {
        assert_eq!(
            FilterSpec::from(vec!["trim", "int"]),
            FilterSpec::from(["trim", "int"])
        );
        let ids: &[&str] = &["trim"];
        assert_eq!(FilterSpec::from(ids), FilterSpec::List(vec!["trim".into()]));
    }

    #[test]
    fn resolution_order() {
        let registry = registry();
        let chain = parse_filters(
            &FilterSpec::from(vec![
                FilterId::from("#^x#"),
                FilterId::from("trim"),
                FilterId::from("int"),
                FilterId::Id(274),
            ]),
            &FilterSpec::Default,
            &registry,
        );

        assert!(chain[0].is_pattern());
        assert!(matches!(chain[1], Filter::Callable { .. }));
        assert!(matches!(chain[2], Filter::Builtin(BuiltinFilter::Int)));
        assert!(matches!(chain[3], Filter::Builtin(BuiltinFilter::ValidateEmail)));
    }

    #[test]
    fn registered_name_shadows_builtin() {
        let mut registry = registry();
        registry.register("int", |v: Value| v);

        let chain = parse_filters(&FilterSpec::from("int"), &FilterSpec::Default, &registry);
        assert!(matches!(chain[0], Filter::Callable { .. }));
    }

    #[test]
    fn unknown_names_pass_through() {
        let chain = parse_filters(
            &FilterSpec::from("no_such_filter"),
            &FilterSpec::Default,
            &registry(),
        );
        assert!(matches!(chain[0], Filter::Builtin(BuiltinFilter::UnsafeRaw)));
        assert_eq!(chain[0].apply(json!("x")), Some(json!("x")));
    }

    #[test]
    fn blank_identifiers_are_dropped() {
        let chain = parse_filters(&FilterSpec::from("trim,,"), &FilterSpec::Default, &registry());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn default_spec_falls_back_to_configured() {
        let configured = FilterSpec::from("htmlspecialchars");
        let chain = parse_filters(&FilterSpec::Default, &configured, &registry());
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].label(), "htmlspecialchars");

        let none = parse_filters(&FilterSpec::Default, &FilterSpec::Default, &registry());
        assert!(none.is_empty());
    }

    #[test]
    fn pattern_flags_are_honoured() {
        let chain = parse_filters(&FilterSpec::from("/^abc$/i"), &FilterSpec::Default, &registry());
        assert!(chain[0].matches(&json!("ABC")));
        assert!(!chain[0].matches(&json!("ABCD")));
    }

    #[test]
    fn tilde_and_hash_delimiters() {
        assert_eq!(pattern_source("~\\d+~"), Some(("\\d+", "")));
        assert_eq!(pattern_source("#a/b#"), Some(("a/b", "")));
        assert_eq!(pattern_source("/abc"), None);
        assert_eq!(pattern_source("/"), None);
        assert_eq!(pattern_source("trim"), None);
    }

    #[test]
    fn invalid_pattern_matches_nothing() {
        let chain = parse_filters(&FilterSpec::from("/([a-z/"), &FilterSpec::Default, &registry());
        assert!(chain[0].is_pattern());
        assert!(!chain[0].matches(&json!("a")));
        assert_eq!(chain[0].apply(json!("a")), None);
    }

    #[test]
    fn apply_recursive_keeps_shape_and_nulls_rejections() {
        let int = Filter::Builtin(BuiltinFilter::Int);
        let out = int.apply_recursive(json!({"a": "1", "b": ["2", "x"], "c": {"d": "03"}}));

        assert_eq!(out, json!({"a": 1, "b": [2, null], "c": {"d": null}}));
    }

    #[test]
    fn debug_hides_function() {
        let chain = parse_filters(&FilterSpec::from("trim"), &FilterSpec::Default, &registry());
        assert_eq!(format!("{:?}", chain[0]), "Callable(\"trim\")");
    }
}
