//! The fixed set of built-in validation and sanitization filters.
//!
//! Each filter is addressable by name (`"int"`, `"validate_email"`) or by its
//! numeric id (`257`, `274`). Validators either return a typed value or
//! reject; sanitizers always succeed and return a cleaned string.

use std::fmt;
use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::cast::string_of;

static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("float pattern is valid")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

static MAC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}|(?:[0-9A-Fa-f]{2}-){5}[0-9A-Fa-f]{2}|(?:[0-9A-Fa-f]{4}\.){2}[0-9A-Fa-f]{4})$",
    )
    .expect("mac pattern is valid")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*(?:>|$)").expect("tag pattern is valid"));

/// A built-in validation or sanitization filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFilter {
    /// Validates a decimal integer.
    Int,
    /// Accepts a truthy word (`yes`, `on`, `true`, `1`) as `true`.
    /// Falsy words reject like any other failed validation.
    Boolean,
    /// Validates a decimal float.
    Float,
    /// Validates an absolute URL.
    ValidateUrl,
    /// Validates an e-mail address.
    ValidateEmail,
    /// Validates an IPv4 or IPv6 address.
    ValidateIp,
    /// Validates a MAC address.
    ValidateMac,
    /// Strips tags and encodes quotes.
    String,
    /// Percent-encodes everything except unreserved characters.
    Encoded,
    /// Entity-encodes `'"<>&` and ASCII control characters.
    SpecialChars,
    /// Passes the value through unchanged.
    UnsafeRaw,
    /// Removes characters not allowed in an e-mail address.
    Email,
    /// Removes characters not allowed in a URL.
    Url,
    /// Keeps digits and signs.
    NumberInt,
    /// Keeps digits and signs.
    NumberFloat,
    /// Backslash-escapes quotes, backslashes and NUL.
    MagicQuotes,
    /// Entity-encodes `&"'<>` with named entities.
    FullSpecialChars,
}

impl BuiltinFilter {
    /// Every built-in filter, in id order.
    pub const ALL: [BuiltinFilter; 17] = [
        Self::Int,
        Self::Boolean,
        Self::Float,
        Self::ValidateUrl,
        Self::ValidateEmail,
        Self::ValidateIp,
        Self::ValidateMac,
        Self::String,
        Self::Encoded,
        Self::SpecialChars,
        Self::UnsafeRaw,
        Self::Email,
        Self::Url,
        Self::NumberInt,
        Self::NumberFloat,
        Self::MagicQuotes,
        Self::FullSpecialChars,
    ];

    /// Looks a filter up by name, case-insensitively.
    ///
    /// ```
    /// use request_input::BuiltinFilter;
    ///
    /// assert_eq!(BuiltinFilter::from_name("INT"), Some(BuiltinFilter::Int));
    /// assert_eq!(BuiltinFilter::from_name("stripped"), Some(BuiltinFilter::String));
    /// assert_eq!(BuiltinFilter::from_name("nope"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let filter = match name.trim().to_ascii_lowercase().as_str() {
            "int" => Self::Int,
            "boolean" | "bool" => Self::Boolean,
            "float" => Self::Float,
            "validate_url" => Self::ValidateUrl,
            "validate_email" => Self::ValidateEmail,
            "validate_ip" => Self::ValidateIp,
            "validate_mac" => Self::ValidateMac,
            "string" | "stripped" => Self::String,
            "encoded" => Self::Encoded,
            "special_chars" => Self::SpecialChars,
            "unsafe_raw" => Self::UnsafeRaw,
            "email" => Self::Email,
            "url" => Self::Url,
            "number_int" => Self::NumberInt,
            "number_float" => Self::NumberFloat,
            "magic_quotes" | "add_slashes" => Self::MagicQuotes,
            "full_special_chars" => Self::FullSpecialChars,
            _ => return None,
        };
        Some(filter)
    }

    /// Looks a filter up by numeric id.
    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|filter| filter.id() == id)
    }

    /// Canonical name of the filter.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::ValidateUrl => "validate_url",
            Self::ValidateEmail => "validate_email",
            Self::ValidateIp => "validate_ip",
            Self::ValidateMac => "validate_mac",
            Self::String => "string",
            Self::Encoded => "encoded",
            Self::SpecialChars => "special_chars",
            Self::UnsafeRaw => "unsafe_raw",
            Self::Email => "email",
            Self::Url => "url",
            Self::NumberInt => "number_int",
            Self::NumberFloat => "number_float",
            Self::MagicQuotes => "magic_quotes",
            Self::FullSpecialChars => "full_special_chars",
        }
    }

    /// Numeric id of the filter.
    pub fn id(self) -> i64 {
        match self {
            Self::Int => 257,
            Self::Boolean => 258,
            Self::Float => 259,
            Self::ValidateUrl => 273,
            Self::ValidateEmail => 274,
            Self::ValidateIp => 275,
            Self::ValidateMac => 276,
            Self::String => 513,
            Self::Encoded => 514,
            Self::SpecialChars => 515,
            Self::UnsafeRaw => 516,
            Self::Email => 517,
            Self::Url => 518,
            Self::NumberInt => 519,
            Self::NumberFloat => 520,
            Self::MagicQuotes => 521,
            Self::FullSpecialChars => 522,
        }
    }

    /// True for filters that can reject a value.
    pub fn is_validator(self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Boolean
                | Self::Float
                | Self::ValidateUrl
                | Self::ValidateEmail
                | Self::ValidateIp
                | Self::ValidateMac
        )
    }

    /// Runs the filter on the text form of `value`.
    ///
    /// Returns `None` when a validator rejects the value.
    ///
    /// ```
    /// use request_input::BuiltinFilter;
    /// use serde_json::json;
    ///
    /// assert_eq!(BuiltinFilter::Int.apply(&json!(" 42 ")), Some(json!(42)));
    /// assert_eq!(BuiltinFilter::Int.apply(&json!("42abc")), None);
    /// assert_eq!(
    ///     BuiltinFilter::NumberInt.apply(&json!("a1-2b")),
    ///     Some(json!("1-2"))
    /// );
    /// ```
    pub fn apply(self, value: &Value) -> Option<Value> {
        let text = string_of(value);
        match self {
            Self::Int => validate_int(&text).map(Value::from),
            Self::Boolean => validate_bool(&text)
                .filter(|accepted| *accepted)
                .map(Value::Bool),
            Self::Float => validate_float(&text).map(Value::from),
            Self::ValidateUrl => validate_url(&text).then(|| Value::String(text)),
            Self::ValidateEmail => EMAIL.is_match(&text).then(|| Value::String(text)),
            Self::ValidateIp => text.parse::<IpAddr>().is_ok().then(|| Value::String(text)),
            Self::ValidateMac => MAC.is_match(&text).then(|| Value::String(text)),
            Self::String => Some(Value::String(encode_quotes(&strip_tags(&text)))),
            Self::Encoded => Some(Value::String(percent_encode(&text))),
            Self::SpecialChars => Some(Value::String(special_chars(&text))),
            Self::UnsafeRaw => Some(Value::String(text)),
            Self::Email => Some(Value::String(retain(&text, |c| {
                c.is_ascii_alphanumeric() || "!#$%&'*+-=?^_`{|}~@.[]".contains(c)
            }))),
            Self::Url => Some(Value::String(retain(&text, |c| {
                c.is_ascii_alphanumeric() || "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=".contains(c)
            }))),
            Self::NumberInt | Self::NumberFloat => Some(Value::String(retain(&text, |c| {
                c.is_ascii_digit() || c == '+' || c == '-'
            }))),
            Self::MagicQuotes => Some(Value::String(add_slashes(&text))),
            Self::FullSpecialChars => Some(Value::String(html_special_chars(&text))),
        }
    }
}

impl fmt::Display for BuiltinFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn validate_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    trimmed.parse().ok()
}

fn validate_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

fn validate_float(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if !FLOAT.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn validate_url(text: &str) -> bool {
    if !text.is_ascii() {
        return false;
    }
    match url::Url::parse(text) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" | "ftp" | "ftps" => parsed.host_str().is_some_and(|h| !h.is_empty()),
            _ => true,
        },
        Err(_) => false,
    }
}

fn retain(text: &str, keep: impl Fn(char) -> bool) -> String {
    text.chars().filter(|c| keep(*c)).collect()
}

fn encode_quotes(text: &str) -> String {
    text.replace('\'', "&#39;").replace('"', "&#34;")
}

/// Removes anything that looks like a markup tag.
pub(crate) fn strip_tags(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

/// Percent-encodes all bytes except `A-Za-z0-9-._`.
pub(crate) fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn special_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\'' | '"' | '<' | '>' | '&' => out.push_str(&format!("&#{};", u32::from(c))),
            c if u32::from(c) < 32 => out.push_str(&format!("&#{};", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

/// Entity-encodes `&`, `"`, `'`, `<` and `>`.
pub(crate) fn html_special_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Escapes `'`, `"`, `\` and NUL with a backslash.
pub(crate) fn add_slashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\'' | '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_and_ids_round_trip() {
        for filter in BuiltinFilter::ALL {
            assert_eq!(BuiltinFilter::from_name(filter.name()), Some(filter));
            assert_eq!(BuiltinFilter::from_id(filter.id()), Some(filter));
        }
        assert_eq!(BuiltinFilter::from_id(1), None);
    }

    #[test]
    fn int_rejects_leading_zeros_and_garbage() {
        assert_eq!(BuiltinFilter::Int.apply(&json!("0")), Some(json!(0)));
        assert_eq!(BuiltinFilter::Int.apply(&json!("-15")), Some(json!(-15)));
        assert_eq!(BuiltinFilter::Int.apply(&json!("+3")), Some(json!(3)));
        assert_eq!(BuiltinFilter::Int.apply(&json!("012")), None);
        assert_eq!(BuiltinFilter::Int.apply(&json!("1.5")), None);
        assert_eq!(BuiltinFilter::Int.apply(&json!("")), None);
        assert_eq!(BuiltinFilter::Int.apply(&json!("99999999999999999999")), None);
    }

    #[test]
    fn int_accepts_numbers_through_text_form() {
        assert_eq!(BuiltinFilter::Int.apply(&json!(12)), Some(json!(12)));
        assert_eq!(BuiltinFilter::Int.apply(&json!(true)), Some(json!(1)));
    }

    #[test]
    fn boolean_words() {
        let check = |s: &str| BuiltinFilter::Boolean.apply(&json!(s));
        assert_eq!(check("Yes"), Some(json!(true)));
        assert_eq!(check("on"), Some(json!(true)));
        assert_eq!(check("maybe"), None);
    }

    #[test]
    fn boolean_rejects_falsy_words() {
        let check = |s: &str| BuiltinFilter::Boolean.apply(&json!(s));
        for word in ["0", "false", "OFF", "no", ""] {
            assert_eq!(check(word), None, "{:?}", word);
        }
        assert_eq!(BuiltinFilter::Boolean.apply(&json!(false)), None);
    }

    #[test]
    fn float_validation() {
        assert_eq!(BuiltinFilter::Float.apply(&json!("1.5")), Some(json!(1.5)));
        assert_eq!(BuiltinFilter::Float.apply(&json!("-2e3")), Some(json!(-2000.0)));
        assert_eq!(BuiltinFilter::Float.apply(&json!(".5")), Some(json!(0.5)));
        assert_eq!(BuiltinFilter::Float.apply(&json!("1.5kg")), None);
        assert_eq!(BuiltinFilter::Float.apply(&json!("inf")), None);
    }

    #[test]
    fn url_validation() {
        let check = |s: &str| BuiltinFilter::ValidateUrl.apply(&json!(s)).is_some();
        assert!(check("https://example.com/path?q=1"));
        assert!(check("mailto:someone@example.com"));
        assert!(!check("example.com"));
        assert!(!check("http://"));
        assert!(!check("https://exämple.com"));
    }

    #[test]
    fn email_validation() {
        let check = |s: &str| BuiltinFilter::ValidateEmail.apply(&json!(s)).is_some();
        assert!(check("alice@example.com"));
        assert!(check("first.last+tag@sub.example.org"));
        assert!(!check("alice@localhost"));
        assert!(!check("alice..b@example.com"));
        assert!(!check("@example.com"));
    }

    #[test]
    fn ip_and_mac_validation() {
        let ip = |s: &str| BuiltinFilter::ValidateIp.apply(&json!(s)).is_some();
        assert!(ip("192.168.0.1"));
        assert!(ip("::1"));
        assert!(!ip("256.0.0.1"));

        let mac = |s: &str| BuiltinFilter::ValidateMac.apply(&json!(s)).is_some();
        assert!(mac("01:23:45:67:89:ab"));
        assert!(mac("01-23-45-67-89-AB"));
        assert!(mac("0123.4567.89ab"));
        assert!(!mac("01:23-45:67:89:ab"));
    }

    #[test]
    fn string_sanitizer_strips_tags_and_encodes_quotes() {
        let out = BuiltinFilter::String.apply(&json!("<b>it's \"bold\"</b>"));
        assert_eq!(out, Some(json!("it&#39;s &#34;bold&#34;")));

        let unclosed = BuiltinFilter::String.apply(&json!("safe<script"));
        assert_eq!(unclosed, Some(json!("safe")));
    }

    #[test]
    fn encoded_and_special_chars() {
        assert_eq!(
            BuiltinFilter::Encoded.apply(&json!("a b/c")),
            Some(json!("a%20b%2Fc"))
        );
        assert_eq!(
            BuiltinFilter::SpecialChars.apply(&json!("<a>\n")),
            Some(json!("&#60;a&#62;&#10;"))
        );
        assert_eq!(
            BuiltinFilter::FullSpecialChars.apply(&json!("'x' & \"y\"")),
            Some(json!("&#039;x&#039; &amp; &quot;y&quot;"))
        );
    }

    #[test]
    fn character_class_sanitizers() {
        assert_eq!(
            BuiltinFilter::Email.apply(&json!("al(i)ce@exa mple.com")),
            Some(json!("alice@example.com"))
        );
        assert_eq!(
            BuiltinFilter::Url.apply(&json!("http://a.b/ü?x=1")),
            Some(json!("http://a.b/?x=1"))
        );
        assert_eq!(
            BuiltinFilter::NumberFloat.apply(&json!("-1.5e3")),
            Some(json!("-153"))
        );
    }

    #[test]
    fn magic_quotes_escapes() {
        assert_eq!(
            BuiltinFilter::MagicQuotes.apply(&json!("O'Re\"il\\ly")),
            Some(json!("O\\'Re\\\"il\\\\ly"))
        );
    }

    #[test]
    fn sanitizers_never_reject() {
        for filter in BuiltinFilter::ALL.into_iter().filter(|f| !f.is_validator()) {
            assert!(filter.apply(&json!("\0<odd> input")).is_some(), "{}", filter);
        }
    }
}
