//! Built-in input formats.
//!
//! An [`InputFormat`] parses a raw request body into the dynamic value the
//! pipeline works with. Formats are resolved by content type through the
//! global registry, with per-API overrides shadowing the global entries
//! ([`crate::api::Api::input_format`]).

use crate::api::Api;
use crate::error::InputFormatError;
use serde_json::{Map, Value};
use std::sync::Arc;

type ParseFn = Arc<dyn Fn(&[u8]) -> Result<Value, InputFormatError> + Send + Sync>;

/// A content-type-tagged body parser.
#[derive(Clone)]
pub struct InputFormat {
    content_type: String,
    parse: ParseFn,
}

impl InputFormat {
    /// Create a format from a content type and parse function.
    pub fn new(
        content_type: impl Into<String>,
        parse: impl Fn(&[u8]) -> Result<Value, InputFormatError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            parse: Arc::new(parse),
        }
    }

    /// The content type this format accepts.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Parse a body.
    ///
    /// # Errors
    ///
    /// Returns [`InputFormatError`] when the body cannot be parsed.
    pub fn parse(&self, body: &[u8]) -> Result<Value, InputFormatError> {
        (self.parse)(body)
    }
}

impl std::fmt::Debug for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputFormat")
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Takes JSON formatted data.
#[must_use]
pub fn json() -> InputFormat {
    InputFormat::new("application/json", |body| {
        Ok(serde_json::from_slice(body)?)
    })
}

/// Takes plain text data.
#[must_use]
pub fn text() -> InputFormat {
    InputFormat::new("text/plain", |body| {
        let text = std::str::from_utf8(body).map_err(|_| InputFormatError::InvalidEncoding)?;
        Ok(Value::String(text.to_string()))
    })
}

/// Takes urlencoded form data. Repeated keys collect into an array.
#[must_use]
pub fn urlencoded() -> InputFormat {
    InputFormat::new("application/x-www-form-urlencoded", |body| {
        let text = std::str::from_utf8(body).map_err(|_| InputFormatError::InvalidEncoding)?;
        let mut parsed = Map::new();
        for pair in text.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, value),
                None => (pair, ""),
            };
            let key = url_decode(key).ok_or(InputFormatError::InvalidEncoding)?;
            let value = Value::String(url_decode(value).ok_or(InputFormatError::InvalidEncoding)?);
            match parsed.entry(key) {
                serde_json::map::Entry::Occupied(mut occupied) => match occupied.get_mut() {
                    Value::Array(items) => items.push(value),
                    existing => {
                        let first = existing.take();
                        *existing = Value::Array(vec![first, value]);
                    }
                },
                serde_json::map::Entry::Vacant(vacant) => {
                    vacant.insert(value);
                }
            }
        }
        Ok(Value::Object(parsed))
    })
}

/// Parse a body through the input format an API resolves for `content_type`.
///
/// # Errors
///
/// Returns [`InputFormatError::UnsupportedContentType`] when neither the API
/// nor the global registry knows the content type, or the format's own error
/// when parsing fails.
pub fn parse_body(api: &Api, content_type: &str, body: &[u8]) -> Result<Value, InputFormatError> {
    let format = api
        .input_format(content_type)
        .ok_or_else(|| InputFormatError::UnsupportedContentType(content_type.to_string()))?;
    format.parse(body)
}

/// Decode a percent-encoded string, treating `+` as a space.
///
/// Returns `None` on invalid percent escapes.
#[must_use]
pub fn url_decode(s: &str) -> Option<String> {
    let mut result = Vec::with_capacity(s.len());
    let mut bytes = s.bytes();

    while let Some(byte) = bytes.next() {
        if byte == b'%' {
            let hi = bytes.next()?;
            let lo = bytes.next()?;
            let hi = char::from(hi).to_digit(16)?;
            let lo = char::from(lo).to_digit(16)?;
            result.push((hi * 16 + lo) as u8);
        } else if byte == b'+' {
            result.push(b' ');
        } else {
            result.push(byte);
        }
    }

    String::from_utf8(result).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_parses_objects() {
        let parsed = json().parse(br#"{"a": 1}"#).expect("parse failed");
        assert_eq!(parsed, json!({"a": 1}));
        assert!(json().parse(b"not json").is_err());
    }

    #[test]
    fn text_parses_utf8() {
        let parsed = text().parse("héllo".as_bytes()).expect("parse failed");
        assert_eq!(parsed, json!("héllo"));
        assert!(text().parse(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn urlencoded_parses_pairs() {
        let parsed = urlencoded()
            .parse(b"name=ada+lovelace&age=36")
            .expect("parse failed");
        assert_eq!(parsed, json!({"name": "ada lovelace", "age": "36"}));
    }

    #[test]
    fn urlencoded_collects_repeated_keys() {
        let parsed = urlencoded()
            .parse(b"tag=a&tag=b&tag=c&single=x")
            .expect("parse failed");
        assert_eq!(parsed, json!({"tag": ["a", "b", "c"], "single": "x"}));
    }

    #[test]
    fn urlencoded_decodes_percent_escapes() {
        let parsed = urlencoded().parse(b"q=a%26b%3Dc").expect("parse failed");
        assert_eq!(parsed, json!({"q": "a&b=c"}));
        assert!(urlencoded().parse(b"q=%GG").is_err());
    }

    #[test]
    fn url_decode_basics() {
        assert_eq!(url_decode("hello%20world"), Some("hello world".to_string()));
        assert_eq!(url_decode("a+b"), Some("a b".to_string()));
        assert_eq!(url_decode("trailing%2"), None);
    }

    #[test]
    fn parse_body_resolves_through_api() {
        let api = Api::new("input-test");
        let parsed =
            parse_body(&api, "application/json", br#"{"x": 2}"#).expect("parse failed");
        assert_eq!(parsed, json!({"x": 2}));

        let err = parse_body(&api, "application/msgpack", b"").unwrap_err();
        assert!(matches!(err, InputFormatError::UnsupportedContentType(_)));
    }

    #[test]
    fn api_override_shadows_global_format() {
        let api = Api::new("override-test");
        api.set_input_format(
            "text/plain",
            InputFormat::new("text/plain", |_| Ok(json!("overridden"))),
        );

        let parsed = parse_body(&api, "text/plain", b"anything").expect("parse failed");
        assert_eq!(parsed, json!("overridden"));
    }
}
