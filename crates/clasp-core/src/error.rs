//! Error types for the binding and invocation pipeline.
//!
//! Three kinds of failure flow through the engine and they are deliberately
//! kept apart:
//!
//! - [`InvalidCallableError`] — a malformed declaration, raised eagerly when a
//!   signature is built or a handler is bound.
//! - [`ValidationError`] — a per-parameter coercion failure. Recovered locally
//!   into an error mapping and routed through the normal output path unless
//!   the route sets `raise_on_invalid`.
//! - Handler errors — whatever the underlying function returned. Never
//!   recovered: they propagate unchanged (as [`CallError::Handler`]) after
//!   cleanup and context teardown have run.

use serde_json::Value;

/// Opaque error returned by handlers and transforms.
///
/// The original error is preserved so callers can downcast it back to the
/// concrete type they raised.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A malformed callable declaration.
///
/// Signature construction and handler binding never fail for well-formed
/// declarations; these variants cover the ways a declaration can be wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCallableError {
    /// The same parameter name was declared twice.
    #[error("duplicate parameter '{0}' in signature")]
    DuplicateParameter(String),
    /// A required parameter was declared after one with a default.
    #[error("required parameter '{0}' follows a parameter with a default")]
    RequiredAfterDefault(String),
    /// A receiver was declared after other parameters.
    #[error("receiver must be declared before any parameter")]
    MisplacedReceiver,
    /// An annotation names a parameter the signature does not declare.
    #[error("annotation for undeclared parameter '{0}'")]
    UnknownAnnotation(String),
}

/// A single parameter failed coercion or validation.
///
/// Carries structured `reasons` when the coercer produced them (the analogue
/// of a schema's field-level errors); otherwise the message alone is used.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    reasons: Option<Value>,
}

impl ValidationError {
    /// Create a validation error from a plain message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reasons: None,
        }
    }

    /// Attach structured reasons (reported instead of the message).
    #[must_use]
    pub fn with_reasons(mut self, reasons: Value) -> Self {
        self.reasons = Some(reasons);
        self
    }

    /// The plain message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured reasons, if any were attached.
    #[must_use]
    pub fn reasons(&self) -> Option<&Value> {
        self.reasons.as_ref()
    }

    /// The value recorded in an error mapping for this failure:
    /// the structured reasons when present, else the message.
    #[must_use]
    pub fn reason_value(&self) -> Value {
        match &self.reasons {
            Some(reasons) => reasons.clone(),
            None => Value::String(self.message.clone()),
        }
    }
}

/// An invocation failed in a way the engine does not recover from.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// Validation failed and the route is configured to raise instead of
    /// collecting errors (`raise_on_invalid`).
    #[error("invalid arguments for '{interface}': {errors}")]
    Invalid {
        /// Name of the interface that rejected the call.
        interface: String,
        /// The error mapping that would otherwise have been returned.
        errors: Value,
    },
    /// The underlying function (or its transform) failed. The original error
    /// is carried unchanged.
    #[error("{0}")]
    Handler(BoxError),
    /// The output formatter failed to render the result.
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl CallError {
    /// Borrow the propagated handler error, if this is the handler path.
    #[must_use]
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Downcast the propagated handler error to a concrete type.
    #[must_use]
    pub fn handler_error_as<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.handler_error().and_then(|err| err.downcast_ref::<E>())
    }
}

/// Too many positional arguments for the declared parameters.
#[derive(Debug, Clone, thiserror::Error)]
#[error("'{interface}' takes {expected} positional arguments but {supplied} were given")]
pub struct ExtraArgumentsError {
    /// Name of the interface that was called.
    pub interface: String,
    /// Number of declared positional parameters.
    pub expected: usize,
    /// Number of positional arguments supplied.
    pub supplied: usize,
}

/// A keyword argument the signature does not accept.
#[derive(Debug, Clone, thiserror::Error)]
#[error("'{interface}' got an unexpected argument '{argument}'")]
pub struct UnexpectedArgumentError {
    /// Name of the interface that was called.
    pub interface: String,
    /// The offending argument name.
    pub argument: String,
}

/// Output formatting failed.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// The value could not be serialized.
    #[error("output serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The formatter rejected the content.
    #[error("output formatting failed: {0}")]
    Unrenderable(String),
}

/// An input body could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum InputFormatError {
    /// The body was not valid JSON.
    #[error("invalid json body: {0}")]
    Json(#[from] serde_json::Error),
    /// The body was not valid UTF-8 / percent-encoding.
    #[error("invalid encoding in request body")]
    InvalidEncoding,
    /// No parser is registered for the content type.
    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_error_reason_value_prefers_reasons() {
        let plain = ValidationError::new("not a number");
        assert_eq!(plain.reason_value(), json!("not a number"));

        let structured = ValidationError::new("bad choice")
            .with_reasons(json!({"options": ["red", "green"]}));
        assert_eq!(
            structured.reason_value(),
            json!({"options": ["red", "green"]})
        );
    }

    #[test]
    fn call_error_downcasts_handler_error() {
        #[derive(Debug, thiserror::Error)]
        #[error("boom")]
        struct Boom;

        let err = CallError::Handler(Box::new(Boom));
        assert!(err.handler_error_as::<Boom>().is_some());
        assert!(err.handler_error_as::<std::io::Error>().is_none());
    }

    #[test]
    fn invalid_callable_error_display() {
        let err = InvalidCallableError::DuplicateParameter("x".to_string());
        assert_eq!(err.to_string(), "duplicate parameter 'x' in signature");
    }

    #[test]
    fn extra_arguments_error_display() {
        let err = ExtraArgumentsError {
            interface: "echo".to_string(),
            expected: 1,
            supplied: 3,
        };
        assert_eq!(
            err.to_string(),
            "'echo' takes 1 positional arguments but 3 were given"
        );
    }
}
