use std::fmt;

/// Error produced when an input lookup cannot yield a value.
///
/// The accessor methods on [`Input`](crate::Input) never surface this type:
/// every error collapses to the caller's default. It is only returned by
/// [`Resolver::try_resolve`](crate::Resolver::try_resolve) and
/// [`Input::try_from_source`](crate::Input::try_from_source) for callers that
/// need to tell "absent" apart from "present but rejected".
///
/// Messages never contain the rejected input itself.
///
/// # Examples
///
/// ```
/// use request_input::{InputError, InputErrorKind};
///
/// let error = InputError::new(InputErrorKind::FilterRejected, "rejected by 'int'");
/// assert_eq!(error.kind(), InputErrorKind::FilterRejected);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputError {
    kind: InputErrorKind,
    message: String,
}

impl InputError {
    /// Creates a new input error.
    pub fn new(kind: InputErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn missing(name: &str) -> Self {
        Self::new(InputErrorKind::MissingKey, format!("no value for '{}'", name))
    }

    pub(crate) fn rejected(filter: &str) -> Self {
        Self::new(
            InputErrorKind::FilterRejected,
            format!("rejected by '{}'", filter),
        )
    }

    pub(crate) fn mismatch(pattern: &str) -> Self {
        Self::new(
            InputErrorKind::RegexMismatch,
            format!("does not match {}", pattern),
        )
    }

    /// Returns the error kind.
    pub fn kind(&self) -> InputErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input unavailable ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for InputError {}

/// Why a lookup fell back to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputErrorKind {
    /// The name is absent from the source map (or holds null).
    MissingKey,
    /// A built-in validation filter rejected the value.
    FilterRejected,
    /// A pattern filter did not match the value.
    RegexMismatch,
}

impl fmt::Display for InputErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey => write!(f, "missing key"),
            Self::FilterRejected => write!(f, "filter rejected"),
            Self::RegexMismatch => write!(f, "regex mismatch"),
        }
    }
}
