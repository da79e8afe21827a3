use serde_json::{Map, Value};

use crate::cast::type_cast;
use crate::config::InputConfig;
use crate::error::InputError;
use crate::filter::{parse_filters, Filter, FilterSpec};
use crate::key::{KeyDescriptor, TypeCode};
use crate::keyword::defuse_operators;
use crate::registry::FilterRegistry;
use crate::request::RequestInput;
use crate::source::Source;

/// Filter configuration and callables shared across requests.
///
/// A `Resolver` is immutable and `Send + Sync`; build one at startup and
/// hand out an [`Input`] per request with [`Resolver::input`].
///
/// # Examples
///
/// ```
/// use request_input::Resolver;
/// use serde_json::{json, Map};
///
/// let resolver = Resolver::default();
/// let mut map = Map::new();
/// map.insert("age".to_string(), json!("42abc"));
///
/// assert_eq!(resolver.resolve("age/d", &map, "", 0), json!(42));
/// assert_eq!(resolver.resolve("name", &map, "", "guest"), json!("guest"));
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    config: InputConfig,
    registry: FilterRegistry,
}

impl Default for Resolver {
    /// No default filter, stock callables registered.
    fn default() -> Self {
        Self::new(InputConfig::default(), FilterRegistry::with_defaults())
    }
}

impl Resolver {
    /// Creates a resolver from a configuration and a callable registry.
    pub fn new(config: InputConfig, registry: FilterRegistry) -> Self {
        Self { config, registry }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Returns the callable registry.
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Binds this resolver to one request's input.
    pub fn input<'a>(&'a self, request: &'a RequestInput) -> Input<'a> {
        Input {
            resolver: self,
            request,
        }
    }

    /// Reads `key` from `map`, filters and coerces it, or returns `default`.
    ///
    /// Never fails: a missing key, a rejecting filter and a non-matching
    /// pattern all yield `default`. Use [`Resolver::try_resolve`] to see why.
    pub fn resolve(
        &self,
        key: &str,
        map: &Map<String, Value>,
        filter: impl Into<FilterSpec>,
        default: impl Into<Value>,
    ) -> Value {
        let key = KeyDescriptor::parse(key);
        self.resolve_or_default(None, &key, map, &filter.into(), default.into())
    }

    /// Like [`Resolver::resolve`], but reports why no value was produced.
    ///
    /// # Examples
    ///
    /// ```
    /// use request_input::{InputErrorKind, Resolver};
    /// use serde_json::{json, Map};
    ///
    /// let resolver = Resolver::default();
    /// let mut map = Map::new();
    /// map.insert("code".to_string(), json!("abc"));
    ///
    /// let err = resolver.try_resolve("code", &map, "/^[A-Z]+$/").unwrap_err();
    /// assert_eq!(err.kind(), InputErrorKind::RegexMismatch);
    ///
    /// let err = resolver.try_resolve("other", &map, "").unwrap_err();
    /// assert_eq!(err.kind(), InputErrorKind::MissingKey);
    /// ```
    pub fn try_resolve(
        &self,
        key: &str,
        map: &Map<String, Value>,
        filter: impl Into<FilterSpec>,
    ) -> Result<Value, InputError> {
        self.lookup(&KeyDescriptor::parse(key), map, &filter.into())
    }

    fn resolve_or_default(
        &self,
        source: Option<Source>,
        key: &KeyDescriptor,
        map: &Map<String, Value>,
        filter: &FilterSpec,
        default: Value,
    ) -> Value {
        match self.lookup(key, map, filter) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(
                    target: "request_input",
                    source = source.map_or("map", Source::as_str),
                    key = key.name(),
                    reason = %err.kind(),
                    "input falls back to default"
                );
                default
            }
        }
    }

    fn lookup(
        &self,
        key: &KeyDescriptor,
        map: &Map<String, Value>,
        filter: &FilterSpec,
    ) -> Result<Value, InputError> {
        let filters = parse_filters(filter, self.config.default_filter(), &self.registry);

        let data = if key.is_whole_source() {
            Value::Object(map.clone())
        } else {
            match map.get(key.name()) {
                Some(value) if !value.is_null() => value.clone(),
                _ => return Err(InputError::missing(key.name())),
            }
        };

        apply_filters(data, &filters, key.type_code())
    }
}

/// Runs the filter chain on a looked-up value.
///
/// Lists and maps are filtered leaf by leaf, defused and returned without
/// type coercion. Scalars stop at the first rejecting filter; a leading
/// pattern decides on its own and skips the rest of the chain.
fn apply_filters(data: Value, filters: &[Filter], code: TypeCode) -> Result<Value, InputError> {
    if data.is_array() || data.is_object() {
        let mut data = filters
            .iter()
            .fold(data, |acc, filter| filter.apply_recursive(acc));
        defuse_operators(&mut data);
        return Ok(data);
    }

    if let Some(pattern) = filters.first().filter(|f| f.is_pattern()) {
        if !pattern.matches(&data) {
            return Err(rejection(pattern));
        }
        return Ok(type_cast(data, code));
    }

    let mut data = data;
    for filter in filters {
        data = filter.apply(data).ok_or_else(|| rejection(filter))?;
    }
    Ok(type_cast(data, code))
}

fn rejection(filter: &Filter) -> InputError {
    if filter.is_pattern() {
        InputError::mismatch(&filter.label())
    } else {
        InputError::rejected(&filter.label())
    }
}

/// Typed, filtered access to one request's input.
///
/// Every accessor takes a key (`"name"` or `"name/type"`), a default and a
/// filter, and returns either the filtered, coerced value or the default.
///
/// # Examples
///
/// ```
/// use request_input::{HttpMethod, RequestInput, Resolver};
/// use serde_json::json;
///
/// let mut request = RequestInput::new(HttpMethod::Post);
/// request.set_query_param("page", "3");
/// request.set_body_param("email", " ann@example.com ");
///
/// let resolver = Resolver::default();
/// let input = resolver.input(&request);
///
/// assert_eq!(input.get("page/d", 1, ""), json!(3));
/// assert_eq!(input.post("email", "", "trim,validate_email"), json!("ann@example.com"));
/// assert_eq!(input.param("email", "", "validate_email"), json!(""));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    resolver: &'a Resolver,
    request: &'a RequestInput,
}

impl<'a> Input<'a> {
    /// Returns the request this accessor reads from.
    pub fn request_input(&self) -> &'a RequestInput {
        self.request
    }

    /// Reads from any source.
    pub fn from_source(
        &self,
        source: Source,
        key: &str,
        default: impl Into<Value>,
        filter: impl Into<FilterSpec>,
    ) -> Value {
        let key = self.key_for(source, key);
        let map = self.request.source(source);
        self.resolver
            .resolve_or_default(Some(source), &key, &map, &filter.into(), default.into())
    }

    /// Reads from any source, reporting why no value was produced.
    pub fn try_from_source(
        &self,
        source: Source,
        key: &str,
        filter: impl Into<FilterSpec>,
    ) -> Result<Value, InputError> {
        let key = self.key_for(source, key);
        let map = self.request.source(source);
        self.resolver.lookup(&key, &map, &filter.into())
    }

    /// Reads a query-string parameter.
    pub fn get(&self, key: &str, default: impl Into<Value>, filter: impl Into<FilterSpec>) -> Value {
        self.from_source(Source::Query, key, default, filter)
    }

    /// Reads a form body parameter.
    pub fn post(&self, key: &str, default: impl Into<Value>, filter: impl Into<FilterSpec>) -> Value {
        self.from_source(Source::Body, key, default, filter)
    }

    /// Reads from the raw body parsed as a form. The body is parsed once per request.
    pub fn put(&self, key: &str, default: impl Into<Value>, filter: impl Into<FilterSpec>) -> Value {
        self.from_source(Source::Put, key, default, filter)
    }

    /// Reads a parameter from the source matching the request method:
    /// POST reads the body, PUT the raw body, anything else the query.
    pub fn param(&self, key: &str, default: impl Into<Value>, filter: impl Into<FilterSpec>) -> Value {
        let source = self.request.method().param_source();
        self.from_source(source, key, default, filter)
    }

    /// Reads from the merged query and body.
    pub fn request(&self, key: &str, default: impl Into<Value>, filter: impl Into<FilterSpec>) -> Value {
        self.from_source(Source::Request, key, default, filter)
    }

    /// Reads a cookie.
    pub fn cookie(&self, key: &str, default: impl Into<Value>, filter: impl Into<FilterSpec>) -> Value {
        self.from_source(Source::Cookie, key, default, filter)
    }

    /// Reads a session value.
    pub fn session(&self, key: &str, default: impl Into<Value>, filter: impl Into<FilterSpec>) -> Value {
        self.from_source(Source::Session, key, default, filter)
    }

    /// Reads a server variable. The name is upper-cased first.
    pub fn server(&self, key: &str, default: impl Into<Value>, filter: impl Into<FilterSpec>) -> Value {
        self.from_source(Source::Server, key, default, filter)
    }

    /// Reads an environment variable. The name is upper-cased first.
    pub fn env(&self, key: &str, default: impl Into<Value>, filter: impl Into<FilterSpec>) -> Value {
        self.from_source(Source::Env, key, default, filter)
    }

    fn key_for(&self, source: Source, key: &str) -> KeyDescriptor {
        let key = KeyDescriptor::parse(key);
        if source.uppercases_keys() {
            key.into_uppercase()
        } else {
            key
        }
    }
}
