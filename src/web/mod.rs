//! Boundary between HTTP requests and [`RequestInput`](crate::RequestInput).
//!
//! Nothing here depends on a web framework. [`RequestAdapter`] works on the
//! `http` crate's request types, which most Rust frameworks expose or convert
//! to; integrations with their own request types implement
//! [`ExtractRequestInput`] instead.
//!
//! # Integration flow
//!
//! ```text
//! http::Request
//!   ↓
//! RequestAdapter::from_http_request (or a custom ExtractRequestInput)
//!   ↓
//! RequestInput (query, body, raw body, cookies, server vars)
//!   ↓
//! Resolver::input(&request).get("page/d", 1, "")
//! ```
//!
//! # Example
//!
//! ```
//! use request_input::web::{ExtractRequestInput, RequestAdapter};
//! use request_input::Resolver;
//! use serde_json::json;
//!
//! let request = http::Request::post("/users?page=2")
//!     .header("content-type", "application/x-www-form-urlencoded")
//!     .header("cookie", "theme=dark")
//!     .body(b"name=Ann&tags[]=a".to_vec())
//!     .unwrap();
//!
//! let input = RequestAdapter::from_http_request(&request).extract_request_input();
//! let resolver = Resolver::default();
//! let access = resolver.input(&input);
//!
//! assert_eq!(access.get("page/d", 1, ""), json!(2));
//! assert_eq!(access.param("name", "", "strtolower"), json!("ann"));
//! assert_eq!(access.cookie("theme", "light", ""), json!("dark"));
//! assert_eq!(access.server("request_method", "", ""), json!("POST"));
//! ```

mod adapter;
mod extract;

pub use adapter::RequestAdapter;
pub use extract::ExtractRequestInput;
