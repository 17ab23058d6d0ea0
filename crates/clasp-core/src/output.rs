//! Built-in output formats.
//!
//! An [`OutputFormat`] is a content-type-tagged renderer: the final step that
//! turns a pipeline result into transmittable bytes. Formats compose — see
//! [`on_valid`], which renders error mappings through a fallback format.

use crate::error::OutputError;
use serde_json::{Map, Value};
use std::sync::Arc;

type RenderFn = Arc<dyn Fn(&Value) -> Result<Vec<u8>, OutputError> + Send + Sync>;

/// A content-type-tagged output renderer.
#[derive(Clone)]
pub struct OutputFormat {
    content_type: String,
    render: RenderFn,
}

impl OutputFormat {
    /// Create a format from a content type and render function.
    pub fn new(
        content_type: impl Into<String>,
        render: impl Fn(&Value) -> Result<Vec<u8>, OutputError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            render: Arc::new(render),
        }
    }

    /// The content type this format produces.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Render a value to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] when the value cannot be rendered.
    pub fn render(&self, content: &Value) -> Result<Vec<u8>, OutputError> {
        (self.render)(content)
    }
}

impl std::fmt::Debug for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputFormat")
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// JSON (JavaScript Serialized Object Notation).
#[must_use]
pub fn json() -> OutputFormat {
    OutputFormat::new("application/json; charset=utf-8", |content| {
        Ok(serde_json::to_vec(content)?)
    })
}

/// JSON, pretty printed and indented.
#[must_use]
pub fn pretty_json() -> OutputFormat {
    OutputFormat::new("application/json; charset=utf-8", |content| {
        Ok(serde_json::to_vec_pretty(content)?)
    })
}

/// JSON with all object keys camelCased.
#[must_use]
pub fn json_camelcase() -> OutputFormat {
    OutputFormat::new("application/json; charset=utf-8", |content| {
        Ok(serde_json::to_vec(&camelcase_value(content))?)
    })
}

/// Free-form UTF-8 text. Strings render bare; other values render as JSON.
#[must_use]
pub fn text() -> OutputFormat {
    OutputFormat::new("text/plain; charset=utf-8", |content| {
        Ok(display_bytes(content))
    })
}

/// HTML. Strings render bare; other values render as JSON.
#[must_use]
pub fn html() -> OutputFormat {
    OutputFormat::new("text/html; charset=utf-8", |content| {
        Ok(display_bytes(content))
    })
}

/// Render through `valid` only when the content is not an error mapping;
/// error mappings fall back to JSON.
#[must_use]
pub fn on_valid(valid: OutputFormat) -> OutputFormat {
    on_valid_or(valid, json())
}

/// Render through `valid`, routing error mappings (objects carrying an
/// `errors` key) through `invalid` instead. The advertised content type is
/// the valid format's.
#[must_use]
pub fn on_valid_or(valid: OutputFormat, invalid: OutputFormat) -> OutputFormat {
    let content_type = valid.content_type().to_string();
    OutputFormat::new(content_type, move |content| {
        if is_error_mapping(content) {
            invalid.render(content)
        } else {
            valid.render(content)
        }
    })
}

fn is_error_mapping(content: &Value) -> bool {
    matches!(content, Value::Object(map) if map.contains_key("errors"))
}

fn display_bytes(content: &Value) -> Vec<u8> {
    match content {
        Value::String(s) => s.clone().into_bytes(),
        other => other.to_string().into_bytes(),
    }
}

fn camelcase_value(content: &Value) -> Value {
    match content {
        Value::Object(map) => {
            let mut converted = Map::with_capacity(map.len());
            for (key, value) in map {
                converted.insert(camelcase(key), camelcase_value(value));
            }
            Value::Object(converted)
        }
        Value::Array(items) => Value::Array(items.iter().map(camelcase_value).collect()),
        other => other.clone(),
    }
}

// under_score -> underScore; leading and trailing underscores are preserved.
fn camelcase(key: &str) -> String {
    let mut result = String::with_capacity(key.len());
    let mut upper_next = false;
    for (index, ch) in key.chars().enumerate() {
        if ch == '_' && index > 0 && !result.ends_with('_') {
            upper_next = true;
        } else if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }
    if upper_next {
        result.push('_');
    }
    result
}
