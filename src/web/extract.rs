//! Extraction boundary trait for web integration.

use crate::request::RequestInput;

/// Builds a [`RequestInput`] from a framework-specific request.
///
/// [`RequestAdapter`](super::RequestAdapter) implements this for requests
/// from the `http` crate. Frameworks with their own request types implement
/// it directly and fill only the sources they have.
///
/// Implementations only map data. They do not filter or validate it; that
/// happens when the input is read through an [`Input`](crate::Input).
///
/// # Examples
///
/// ```
/// use request_input::web::ExtractRequestInput;
/// use request_input::{HttpMethod, RequestInput, Source};
/// use serde_json::json;
///
/// struct CliRequest {
///     args: Vec<(String, String)>,
/// }
///
/// impl ExtractRequestInput for CliRequest {
///     fn extract_request_input(&self) -> RequestInput {
///         let mut input = RequestInput::new(HttpMethod::Get);
///         for (key, value) in &self.args {
///             input.set_query_param(key.clone(), value.clone());
///         }
///         input
///     }
/// }
///
/// let request = CliRequest {
///     args: vec![("verbose".to_string(), "1".to_string())],
/// };
/// let input = request.extract_request_input();
/// assert_eq!(input.source(Source::Query)["verbose"], json!("1"));
/// ```
pub trait ExtractRequestInput {
    /// Collects the request's input sources.
    fn extract_request_input(&self) -> RequestInput;
}
