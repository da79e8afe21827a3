use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::builtin::{add_slashes, html_special_chars, strip_tags};
use crate::cast::{float_of, int_of, string_of};

/// A named filter function. Callables transform a value and never reject it.
pub type FilterFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

const TRIM_CHARS: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0b'];

/// Registry of named callable filters.
///
/// A filter name in a filter chain is resolved against this registry first;
/// names that are not registered fall through to the
/// [`BuiltinFilter`](crate::BuiltinFilter) set.
///
/// The registry is immutable once shared, so one instance can serve every
/// request through an `Arc`.
///
/// # Examples
///
/// ```
/// use request_input::FilterRegistry;
/// use serde_json::{json, Value};
///
/// let mut registry = FilterRegistry::with_defaults();
/// registry.register("slug", |v: Value| {
///     json!(v.as_str().unwrap_or_default().replace(' ', "-"))
/// });
///
/// let slug = registry.get("slug").unwrap();
/// assert_eq!(slug(json!("a b c")), json!("a-b-c"));
/// assert!(registry.contains("trim"));
/// ```
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl FilterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the stock string and number helpers:
    /// `trim`, `ltrim`, `rtrim`, `strtolower`, `strtoupper`,
    /// `htmlspecialchars`, `strip_tags`, `addslashes`, `stripslashes`,
    /// `intval`, `floatval`, `urlencode` and `urldecode`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_text("trim", |s| s.trim_matches(TRIM_CHARS).to_string());
        registry.register_text("ltrim", |s| s.trim_start_matches(TRIM_CHARS).to_string());
        registry.register_text("rtrim", |s| s.trim_end_matches(TRIM_CHARS).to_string());
        registry.register_text("strtolower", |s| s.to_lowercase());
        registry.register_text("strtoupper", |s| s.to_uppercase());
        registry.register_text("htmlspecialchars", html_special_chars);
        registry.register_text("strip_tags", strip_tags);
        registry.register_text("addslashes", add_slashes);
        registry.register_text("stripslashes", strip_slashes);
        registry.register_text("urlencode", |s| {
            url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
        });
        registry.register_text("urldecode", url_decode);
        registry.register("intval", |v: Value| Value::from(int_of(&v)));
        registry.register("floatval", |v: Value| Value::from(float_of(&v)));
        registry
    }

    /// Registers `filter` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    /// Registers a filter that works on the text form of the value.
    pub fn register_text<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.register(name, move |v: Value| Value::String(filter(&string_of(&v))));
    }

    /// Returns the filter registered under `name`.
    pub fn get(&self, name: &str) -> Option<FilterFn> {
        self.filters.get(name).cloned()
    }

    /// True if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// True if no filters are registered.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.filters.keys().collect();
        names.sort();
        f.debug_struct("FilterRegistry")
            .field("filters", &names)
            .finish()
    }
}

fn strip_slashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some(escaped) => out.push(escaped),
            None => {}
        }
    }
    out
}

fn url_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|pair| std::str::from_utf8(pair).ok())
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok());
                match hex {
                    Some(byte) => {
                        out.push(byte);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            byte => out.push(byte),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(registry: &FilterRegistry, name: &str, value: Value) -> Value {
        let filter = registry.get(name).expect("filter registered");
        filter(value)
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = FilterRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("trim").is_none());
    }

    #[test]
    fn defaults_cover_stock_helpers() {
        let registry = FilterRegistry::with_defaults();
        assert_eq!(registry.len(), 13);
        for name in ["trim", "strtolower", "htmlspecialchars", "intval", "urldecode"] {
            assert!(registry.contains(name), "{}", name);
        }
    }

    #[test]
    fn text_helpers() {
        let registry = FilterRegistry::with_defaults();
        assert_eq!(call(&registry, "trim", json!("  hi\n")), json!("hi"));
        assert_eq!(call(&registry, "ltrim", json!("  hi ")), json!("hi "));
        assert_eq!(call(&registry, "strtoupper", json!("abc")), json!("ABC"));
        assert_eq!(call(&registry, "strip_tags", json!("<i>x</i>")), json!("x"));
        assert_eq!(
            call(&registry, "htmlspecialchars", json!("<a href='x'>")),
            json!("&lt;a href=&#039;x&#039;&gt;")
        );
    }

    #[test]
    fn slashes_round_trip() {
        let registry = FilterRegistry::with_defaults();
        let escaped = call(&registry, "addslashes", json!("it's \\ \"ok\""));
        assert_eq!(escaped, json!("it\\'s \\\\ \\\"ok\\\""));
        assert_eq!(
            call(&registry, "stripslashes", escaped),
            json!("it's \\ \"ok\"")
        );
    }

    #[test]
    fn url_helpers() {
        let registry = FilterRegistry::with_defaults();
        assert_eq!(call(&registry, "urlencode", json!("a b&c")), json!("a+b%26c"));
        assert_eq!(call(&registry, "urldecode", json!("a+b%26c%zz")), json!("a b&c%zz"));
    }

    #[test]
    fn number_helpers_keep_numbers() {
        let registry = FilterRegistry::with_defaults();
        assert_eq!(call(&registry, "intval", json!("12px")), json!(12));
        assert_eq!(call(&registry, "floatval", json!("1.5em")), json!(1.5));
    }

    #[test]
    fn register_replaces_existing() {
        let mut registry = FilterRegistry::with_defaults();
        registry.register("trim", |_v: Value| json!("replaced"));

        assert_eq!(call(&registry, "trim", json!(" x ")), json!("replaced"));
        assert_eq!(registry.len(), 13);
    }

    #[test]
    fn debug_lists_names_only() {
        let mut registry = FilterRegistry::new();
        registry.register_text("b", |s| s.to_string());
        registry.register_text("a", |s| s.to_string());

        assert_eq!(format!("{:?}", registry), "FilterRegistry { filters: [\"a\", \"b\"] }");
    }
}
