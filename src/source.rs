use std::fmt;

/// A named request-data container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Query-string parameters.
    Query,
    /// Form body parameters.
    Body,
    /// Raw body parsed as a form, used for PUT requests.
    Put,
    /// Cookies.
    Cookie,
    /// Session values.
    Session,
    /// Server variables (`REQUEST_METHOD`, `HTTP_HOST`, ...).
    Server,
    /// Environment variables.
    Env,
    /// Query and body merged.
    Request,
}

impl Source {
    /// True for sources looked up by upper-cased name.
    pub fn uppercases_keys(self) -> bool {
        matches!(self, Source::Server | Source::Env)
    }

    /// Lower-case name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Query => "get",
            Source::Body => "post",
            Source::Put => "put",
            Source::Cookie => "cookie",
            Source::Session => "session",
            Source::Server => "server",
            Source::Env => "env",
            Source::Request => "request",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP method of the request, as far as input dispatch cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// HTTP GET method
    #[default]
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// Any other method (HEAD, OPTIONS, ...)
    Other,
}

impl HttpMethod {
    /// Parses a method name, case-insensitively.
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "PATCH" => HttpMethod::Patch,
            _ => HttpMethod::Other,
        }
    }

    /// The source `param` reads for this method.
    ///
    /// POST reads the body, PUT the parsed raw body, everything else the query.
    pub fn param_source(self) -> Source {
        match self {
            HttpMethod::Post => Source::Body,
            HttpMethod::Put => Source::Put,
            _ => Source::Query,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Other => write!(f, "OTHER"),
        }
    }
}

impl From<&http::Method> for HttpMethod {
    fn from(method: &http::Method) -> Self {
        HttpMethod::parse(method.as_str())
    }
}
