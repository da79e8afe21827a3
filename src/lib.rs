//! Typed, filtered access to HTTP request input.
//!
//! Reads values from a request's query string, form body, raw PUT body,
//! cookies, session, server variables and environment, then runs them
//! through a filter chain and coerces them to a requested type. Any value
//! that is missing or fails a filter is replaced by a caller-supplied default.
//!
//! # Core Types
//!
//! - [`Resolver`]: Shared configuration and filter callables
//! - [`Input`]: Per-request accessor (`get`, `post`, `put`, `param`, ...)
//! - [`RequestInput`]: The source maps of one request
//! - [`FilterSpec`]: What a caller passes as a filter (names, ids, patterns)
//! - [`BuiltinFilter`]: Fixed validation and sanitization filters
//! - [`FilterRegistry`]: Named callable filters
//!
//! # Key syntax
//!
//! A key is `name` or `name/type`, where type is one of `a` (list),
//! `d` (integer), `f` (float), `b` (boolean) or `s` (string, the default).
//! An empty name returns the whole source.
//!
//! # Examples
//!
//! ```
//! use request_input::{HttpMethod, RequestInput, Resolver};
//! use serde_json::json;
//!
//! let mut request = RequestInput::new(HttpMethod::Get);
//! request.set_query_param("age", "42abc");
//! request.set_query_param("code", "abc");
//! request.set_query_param("where", json!(["id", "OR", "1"]));
//!
//! let resolver = Resolver::default();
//! let input = resolver.input(&request);
//!
//! // Type suffixes coerce
//! assert_eq!(input.get("age/d", 0, ""), json!(42));
//!
//! // Missing keys and rejected values give the default
//! assert_eq!(input.get("name", "guest", ""), json!("guest"));
//! assert_eq!(input.get("code", "bad", "/^[A-Z]+$/"), json!("bad"));
//!
//! // Operator keywords inside list values are defused
//! assert_eq!(input.get("where", "", ""), json!(["id", "OR ", "1"]));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod accessor;
mod builtin;
pub mod cast;
mod config;
mod error;
mod filter;
pub mod form;
mod key;
pub mod keyword;
mod registry;
mod request;
mod source;
pub mod web;

pub use accessor::{Input, Resolver};
pub use builtin::BuiltinFilter;
pub use config::{InputConfig, DEFAULT_FILTER_ENV};
pub use error::{InputError, InputErrorKind};
pub use filter::{parse_filters, Filter, FilterId, FilterSpec};
pub use key::{KeyDescriptor, TypeCode};
pub use registry::{FilterFn, FilterRegistry};
pub use request::RequestInput;
pub use source::{HttpMethod, Source};
