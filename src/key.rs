use std::fmt;

/// Output coercion selected by the suffix of a key (`"age/d"`).
///
/// Unrecognised letters behave as [`TypeCode::String`]. Letters are
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeCode {
    /// `a`: list or mapping
    Array,
    /// `d`: integer
    Int,
    /// `f`: float
    Float,
    /// `b`: boolean
    Bool,
    /// `s`: string
    #[default]
    String,
}

impl TypeCode {
    /// Parses a type suffix. Anything other than `a`, `d`, `f`, `b` is a string.
    ///
    /// ```
    /// use request_input::TypeCode;
    ///
    /// assert_eq!(TypeCode::parse("d"), TypeCode::Int);
    /// assert_eq!(TypeCode::parse("B"), TypeCode::Bool);
    /// assert_eq!(TypeCode::parse("x"), TypeCode::String);
    /// ```
    pub fn parse(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "a" => Self::Array,
            "d" => Self::Int,
            "f" => Self::Float,
            "b" => Self::Bool,
            _ => Self::String,
        }
    }

    /// Returns the single-letter form of this code.
    pub fn letter(self) -> char {
        match self {
            Self::Array => 'a',
            Self::Int => 'd',
            Self::Float => 'f',
            Self::Bool => 'b',
            Self::String => 's',
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A key split into the name to look up and the requested output type.
///
/// The key is split on the *first* `/`. With no `/` the type is a string.
/// An empty name selects the whole source map.
///
/// # Examples
///
/// ```
/// use request_input::{KeyDescriptor, TypeCode};
///
/// let key = KeyDescriptor::parse("page/d");
/// assert_eq!(key.name(), "page");
/// assert_eq!(key.type_code(), TypeCode::Int);
///
/// let whole = KeyDescriptor::parse("/a");
/// assert!(whole.is_whole_source());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDescriptor {
    name: String,
    type_code: TypeCode,
}

impl KeyDescriptor {
    /// Splits `key` into name and type code.
    pub fn parse(key: &str) -> Self {
        match key.split_once('/') {
            Some((name, code)) => Self {
                name: name.to_string(),
                type_code: TypeCode::parse(code),
            },
            None => Self {
                name: key.to_string(),
                type_code: TypeCode::String,
            },
        }
    }

    /// Returns the name part.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the requested output type.
    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    /// True when the name is empty and the whole source map is requested.
    pub fn is_whole_source(&self) -> bool {
        self.name.is_empty()
    }

    /// Upper-cases the name, keeping the type code.
    ///
    /// Server and environment variables are looked up this way.
    pub(crate) fn into_uppercase(self) -> Self {
        Self {
            name: self.name.to_uppercase(),
            type_code: self.type_code,
        }
    }
}
