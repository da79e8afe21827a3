use crate::filter::FilterSpec;

/// Environment variable read by [`InputConfig::from_env`].
pub const DEFAULT_FILTER_ENV: &str = "REQUEST_INPUT_DEFAULT_FILTER";

/// Settings shared by every accessor call.
///
/// Holds the filter chain applied when a call passes no filter of its own.
/// It is handed to a [`Resolver`](crate::Resolver) explicitly rather than kept in
/// global state, so two configurations can coexist in one process.
///
/// # Examples
///
/// ```
/// use request_input::{FilterSpec, InputConfig};
///
/// let config = InputConfig::default().with_default_filter("trim,htmlspecialchars");
/// assert_eq!(config.default_filter(), &FilterSpec::from("trim,htmlspecialchars"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputConfig {
    default_filter: FilterSpec,
}

impl InputConfig {
    /// Creates a configuration with no default filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the default filter from `REQUEST_INPUT_DEFAULT_FILTER`.
    ///
    /// An unset or empty variable leaves the default filter empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(DEFAULT_FILTER_ENV) {
            Some(spec) => {
                tracing::debug!(
                    target: "request_input",
                    default_filter = %spec,
                    "loaded default filter"
                );
                Self::new().with_default_filter(spec)
            }
            None => Self::new(),
        }
    }

    /// Sets the filter used when a call passes an empty filter.
    pub fn with_default_filter(mut self, spec: impl Into<FilterSpec>) -> Self {
        self.default_filter = spec.into();
        self
    }

    /// Returns the default filter.
    pub fn default_filter(&self) -> &FilterSpec {
        &self.default_filter
    }
}
