//! URL-encoded form parsing with bracket nesting.
//!
//! `user[name]=ann&tags[]=a&tags[]=b` becomes
//! `{"user": {"name": "ann"}, "tags": ["a", "b"]}`. Maps whose keys are
//! exactly `0..n` in order are returned as lists.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Deepest bracket nesting accepted. Deeper keys are dropped.
pub const MAX_DEPTH: usize = 64;

/// Parses `application/x-www-form-urlencoded` bytes into a nested map.
///
/// # Examples
///
/// ```
/// use request_input::form::parse_form;
/// use serde_json::json;
///
/// let map = parse_form(b"q=rust+lang&page=2&ids[]=4&ids[]=7&f[a][b]=x");
///
/// assert_eq!(map["q"], json!("rust lang"));
/// assert_eq!(map["page"], json!("2"));
/// assert_eq!(map["ids"], json!(["4", "7"]));
/// assert_eq!(map["f"], json!({"a": {"b": "x"}}));
/// ```
pub fn parse_form(input: &[u8]) -> Map<String, Value> {
    let mut builder = FormBuilder::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        builder.insert(&key, value.into_owned());
    }
    builder.finish()
}

/// Accumulates `key=value` pairs with bracket keys into a nested map.
#[derive(Debug, Default)]
pub struct FormBuilder {
    root: Branch,
}

impl FormBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one pair. Later pairs overwrite earlier ones at the same path.
    pub fn insert(&mut self, key: &str, value: String) {
        let Some(path) = split_key(key) else {
            return;
        };
        if path.len() > MAX_DEPTH + 1 {
            tracing::debug!(
                target: "request_input",
                depth = path.len() - 1,
                "form key nested too deeply, dropping"
            );
            return;
        }
        self.root.insert(&path, value);
    }

    /// Returns the collected map.
    pub fn finish(self) -> Map<String, Value> {
        self.root.into_map()
    }
}

#[derive(Debug)]
enum Node {
    Leaf(String),
    Branch(Branch),
}

#[derive(Debug, Default)]
struct Branch {
    entries: Vec<(String, Node)>,
    positions: HashMap<String, usize>,
    next_index: i64,
}

impl Branch {
    fn insert(&mut self, path: &[String], value: String) {
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        let key = if head.is_empty() {
            self.next_index.to_string()
        } else {
            head.clone()
        };
        if let Some(index) = canonical_index(&key) {
            self.next_index = self.next_index.max(index.saturating_add(1));
        }

        let position = match self.positions.get(&key).copied() {
            Some(position) => position,
            None => {
                let position = self.entries.len();
                self.positions.insert(key.clone(), position);
                self.entries.push((key, Node::Branch(Branch::default())));
                position
            }
        };
        let slot = &mut self.entries[position].1;

        if rest.is_empty() {
            *slot = Node::Leaf(value);
            return;
        }
        if let Node::Leaf(_) = slot {
            *slot = Node::Branch(Branch::default());
        }
        if let Node::Branch(branch) = slot {
            branch.insert(rest, value);
        }
    }

    fn into_map(self) -> Map<String, Value> {
        self.entries
            .into_iter()
            .map(|(key, node)| (key, node.into_value()))
            .collect()
    }

    fn into_value(self) -> Value {
        let sequential = self
            .entries
            .iter()
            .enumerate()
            .all(|(i, (key, _))| *key == i.to_string());
        if sequential {
            Value::Array(self.entries.into_iter().map(|(_, n)| n.into_value()).collect())
        } else {
            Value::Object(self.into_map())
        }
    }
}

impl Node {
    fn into_value(self) -> Value {
        match self {
            Node::Leaf(text) => Value::String(text),
            Node::Branch(branch) => branch.into_value(),
        }
    }
}

/// Parses a decimal index without sign noise or leading zeros.
fn canonical_index(key: &str) -> Option<i64> {
    let digits = key.strip_prefix('-').unwrap_or(key);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    key.parse().ok()
}

/// Splits `a[b][]` into `["a", "b", ""]`.
///
/// Spaces and dots in the base name become `_`. A `[` without a closing `]`
/// is taken literally as `_` and ends bracket parsing; text after a closing
/// `]` that does not open another bracket is ignored.
fn split_key(key: &str) -> Option<Vec<String>> {
    let key = key.trim_start_matches(' ');
    let (base, mut rest) = match key.find('[') {
        Some(open) => (&key[..open], &key[open..]),
        None => (key, ""),
    };
    if base.is_empty() {
        return None;
    }

    let mut name = normalize_base(base);
    let mut path = Vec::new();

    while let Some(inner) = rest.strip_prefix('[') {
        match inner.find(']') {
            Some(close) => {
                path.push(inner[..close].to_string());
                rest = &inner[close + 1..];
            }
            None => {
                if path.is_empty() {
                    name.push('_');
                    name.push_str(&normalize_base(inner));
                }
                break;
            }
        }
    }

    path.insert(0, name);
    Some(path)
}

fn normalize_base(base: &str) -> String {
    base.chars()
        .map(|c| if c == ' ' || c == '.' { '_' } else { c })
        .collect()
}
