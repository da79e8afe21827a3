use once_cell::unsync::OnceCell;
use serde_json::{Map, Value};

use crate::form::parse_form;
use crate::source::{HttpMethod, Source};

/// The input containers of one request.
///
/// Holds every source map an [`Input`](crate::Input) reads from, plus the
/// raw body for PUT requests. The raw body is parsed as a form on the first
/// PUT lookup and the result is kept for the rest of the request.
///
/// `RequestInput` is request-scoped: the PUT memo is not `Sync`, so one
/// value cannot be shared between concurrently handled requests.
///
/// # Examples
///
/// ```
/// use request_input::{HttpMethod, RequestInput, Source};
/// use serde_json::json;
///
/// let mut request = RequestInput::new(HttpMethod::Put);
/// request.set_query_param("page", "2");
/// request.set_raw_body("title=Hello&tags[]=a");
///
/// assert_eq!(request.source(Source::Query)["page"], json!("2"));
/// assert_eq!(request.source(Source::Put)["tags"], json!(["a"]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestInput {
    method: HttpMethod,
    query: Map<String, Value>,
    body: Map<String, Value>,
    cookies: Map<String, Value>,
    session: Map<String, Value>,
    server: Map<String, Value>,
    env: Map<String, Value>,
    merged: Option<Map<String, Value>>,
    raw_body: Vec<u8>,
    put: OnceCell<Map<String, Value>>,
}

impl RequestInput {
    /// Creates empty input for a request with the given method.
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Returns the request method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Replaces the query parameters.
    pub fn set_query(&mut self, query: Map<String, Value>) {
        self.query = query;
    }

    /// Adds a query parameter.
    pub fn set_query_param(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.query.insert(key.into(), value.into());
    }

    /// Replaces the body parameters.
    pub fn set_body(&mut self, body: Map<String, Value>) {
        self.body = body;
    }

    /// Adds a body parameter.
    pub fn set_body_param(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.body.insert(key.into(), value.into());
    }

    /// Replaces the cookies.
    pub fn set_cookies(&mut self, cookies: Map<String, Value>) {
        self.cookies = cookies;
    }

    /// Adds a cookie.
    pub fn set_cookie(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.cookies.insert(key.into(), value.into());
    }

    /// Replaces the session values.
    pub fn set_session(&mut self, session: Map<String, Value>) {
        self.session = session;
    }

    /// Adds a session value.
    pub fn set_session_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.session.insert(key.into(), value.into());
    }

    /// Adds a server variable. Names are stored upper-cased.
    pub fn set_server_var(&mut self, key: &str, value: impl Into<Value>) {
        self.server.insert(key.to_uppercase(), value.into());
    }

    /// Adds an environment variable. Names are stored upper-cased.
    pub fn set_env_var(&mut self, key: &str, value: impl Into<Value>) {
        self.env.insert(key.to_uppercase(), value.into());
    }

    /// Fills the environment map from the process environment.
    pub fn capture_process_env(&mut self) {
        for (key, value) in std::env::vars_os() {
            self.set_env_var(&key.to_string_lossy(), value.to_string_lossy().into_owned());
        }
    }

    /// Sets an explicit merged-request map.
    ///
    /// Without one, the merged map is the query overlaid by the body.
    pub fn set_merged(&mut self, merged: Map<String, Value>) {
        self.merged = Some(merged);
    }

    /// Sets the raw body read by PUT lookups and drops any earlier parse.
    pub fn set_raw_body(&mut self, raw: impl Into<Vec<u8>>) {
        self.raw_body = raw.into();
        self.put = OnceCell::new();
    }

    /// Returns the raw body.
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// True once the raw body has been parsed for PUT lookups.
    pub fn put_parsed(&self) -> bool {
        self.put.get().is_some()
    }

    /// Returns the map backing `source`.
    ///
    /// The merged request map is built on demand when none was set, so it is
    /// returned by value like every other source.
    pub fn source(&self, source: Source) -> std::borrow::Cow<'_, Map<String, Value>> {
        use std::borrow::Cow;

        match source {
            Source::Query => Cow::Borrowed(&self.query),
            Source::Body => Cow::Borrowed(&self.body),
            Source::Put => Cow::Borrowed(self.put_map()),
            Source::Cookie => Cow::Borrowed(&self.cookies),
            Source::Session => Cow::Borrowed(&self.session),
            Source::Server => Cow::Borrowed(&self.server),
            Source::Env => Cow::Borrowed(&self.env),
            Source::Request => match &self.merged {
                Some(merged) => Cow::Borrowed(merged),
                None => Cow::Owned(self.merge_query_and_body()),
            },
        }
    }

    fn put_map(&self) -> &Map<String, Value> {
        self.put.get_or_init(|| {
            tracing::debug!(
                target: "request_input",
                body_len = self.raw_body.len(),
                "parsing raw body for put input"
            );
            parse_form(&self.raw_body)
        })
    }

    fn merge_query_and_body(&self) -> Map<String, Value> {
        let mut merged = self.query.clone();
        for (key, value) in &self.body {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}
