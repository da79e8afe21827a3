//! Request adapter for mapping `http` requests to [`RequestInput`].

use std::collections::HashSet;

use http::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, COOKIE};
use http::{Method, Uri, Version};
use serde_json::{Map, Value};

use crate::form::{parse_form, FormBuilder};
use crate::request::RequestInput;
use crate::source::HttpMethod;

use super::ExtractRequestInput;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Collects the parts of an HTTP request that input lookups read.
///
/// The adapter owns plain data (method, URI, headers, body) so that it can
/// be filled from any framework. Session values and the process environment
/// are not part of an HTTP request and are attached separately.
///
/// # Examples
///
/// ```
/// use request_input::web::{ExtractRequestInput, RequestAdapter};
/// use request_input::Source;
/// use serde_json::json;
///
/// let mut adapter = RequestAdapter::new(http::Method::PUT, "/items/7?v=1".parse().unwrap());
/// adapter.set_body("title=New+title");
///
/// let input = adapter.extract_request_input();
/// assert_eq!(input.source(Source::Query)["v"], json!("1"));
/// assert_eq!(input.source(Source::Put)["title"], json!("New title"));
/// assert_eq!(input.source(Source::Server)["REQUEST_URI"], json!("/items/7?v=1"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Vec<u8>,
    session: Map<String, Value>,
    capture_env: bool,
}

impl RequestAdapter {
    /// Creates an adapter with no headers and an empty body.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Vec::new(),
            session: Map::new(),
            capture_env: false,
        }
    }

    /// Copies method, URI, version, headers and body from a request.
    pub fn from_http_request<B: AsRef<[u8]>>(request: &http::Request<B>) -> Self {
        let mut adapter = Self::new(request.method().clone(), request.uri().clone());
        adapter.version = request.version();
        adapter.headers = request.headers().clone();
        adapter.body = request.body().as_ref().to_vec();
        adapter
    }

    /// Builds an adapter from request parts and an already collected body.
    pub fn from_parts(parts: &http::request::Parts, body: impl Into<Vec<u8>>) -> Self {
        let mut adapter = Self::new(parts.method.clone(), parts.uri.clone());
        adapter.version = parts.version;
        adapter.headers = parts.headers.clone();
        adapter.body = body.into();
        adapter
    }

    /// Mutable access to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Attaches session values loaded by the application.
    pub fn set_session(&mut self, session: Map<String, Value>) {
        self.session = session;
    }

    /// Also copy the process environment into the extracted input.
    pub fn with_process_env(mut self) -> Self {
        self.capture_env = true;
        self
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    fn is_form_body(&self) -> bool {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
    }

    fn cookies(&self) -> Map<String, Value> {
        let mut builder = FormBuilder::new();
        let mut seen = HashSet::new();

        for header in self.headers.get_all(COOKIE) {
            let header = String::from_utf8_lossy(header.as_bytes());
            for pair in header.split(';') {
                let pair = pair.trim();
                if pair.is_empty() {
                    continue;
                }
                // `&` is a plain cookie character, not a pair separator
                let escaped = pair.replace('&', "%26");
                let Some((name, value)) = url::form_urlencoded::parse(escaped.as_bytes()).next()
                else {
                    continue;
                };
                // The first cookie with a given name wins
                if name.is_empty() || !seen.insert(name.to_string()) {
                    continue;
                }
                builder.insert(&name, value.into_owned());
            }
        }
        builder.finish()
    }

    fn fill_server_vars(&self, input: &mut RequestInput) {
        let query = self.uri.query().unwrap_or("");
        let request_uri = self
            .uri
            .path_and_query()
            .map_or_else(|| self.uri.path().to_string(), |pq| pq.as_str().to_string());

        input.set_server_var("REQUEST_METHOD", self.method.as_str());
        input.set_server_var("REQUEST_URI", request_uri);
        input.set_server_var("QUERY_STRING", query);
        input.set_server_var("SERVER_PROTOCOL", format!("{:?}", self.version));

        for name in self.headers.keys() {
            let joined = self
                .headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");

            let var = if *name == CONTENT_TYPE {
                "CONTENT_TYPE".to_string()
            } else if *name == CONTENT_LENGTH {
                "CONTENT_LENGTH".to_string()
            } else {
                format!("HTTP_{}", name.as_str().replace('-', "_"))
            };
            input.set_server_var(&var, joined);
        }
    }
}

impl ExtractRequestInput for RequestAdapter {
    fn extract_request_input(&self) -> RequestInput {
        let mut input = RequestInput::new(HttpMethod::from(&self.method));

        if let Some(query) = self.uri.query() {
            input.set_query(parse_form(query.as_bytes()));
        }
        if self.is_form_body() {
            input.set_body(parse_form(&self.body));
        }
        input.set_cookies(self.cookies());
        input.set_session(self.session.clone());
        input.set_raw_body(self.body.clone());
        self.fill_server_vars(&mut input);
        if self.capture_env {
            input.capture_process_env();
        }

        tracing::debug!(
            target: "request_input",
            method = %self.method,
            uri = %self.uri,
            body_len = self.body.len(),
            "extracted request input"
        );
        input
    }
}

impl<B: AsRef<[u8]>> ExtractRequestInput for http::Request<B> {
    fn extract_request_input(&self) -> RequestInput {
        RequestAdapter::from_http_request(self).extract_request_input()
    }
}
