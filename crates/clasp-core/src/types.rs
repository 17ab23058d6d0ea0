//! Parameter annotations, coercers, and the built-in type handlers.
//!
//! An [`Annotation`] is a capability record: a declared annotation may expose
//! a directive marker, a parse-from-string capability, a schema, a generic
//! deserializer, a raw callable coercer, or nothing but documentation. At
//! descriptor build time the capabilities are probed once, in a fixed
//! priority, and collapse into a tagged [`Coercer`] — never re-probed per
//! call.

use crate::context::Context;
use crate::directives::DirectiveFactory;
use crate::error::{BoxError, ValidationError};
use serde_json::{Number, Value};
use std::sync::Arc;

/// A parameter coercer: takes the supplied value (and optionally the call
/// context) and produces the coerced value or a validation failure.
pub type CoerceFn = Arc<dyn Fn(Value, Option<&Context>) -> Result<Value, ValidationError> + Send + Sync>;

/// A return transform: applied to the handler's result before output
/// formatting. Failures propagate to the caller like handler errors.
pub type TransformFn = Arc<dyn Fn(Value, Option<&Context>) -> Result<Value, BoxError> + Send + Sync>;

/// A load/dump schema pair — the adapter seam for external schema libraries.
///
/// `load` coerces inbound values; `dump` (when present) renders a handler's
/// result and doubles as a return transform.
#[derive(Clone)]
pub struct Schema {
    name: String,
    load: CoerceFn,
    dump: Option<TransformFn>,
}

impl Schema {
    /// Create a schema from its load function.
    pub fn new(
        name: impl Into<String>,
        load: impl Fn(Value, Option<&Context>) -> Result<Value, ValidationError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            load: Arc::new(load),
            dump: None,
        }
    }

    /// Attach a dump function.
    #[must_use]
    pub fn with_dump(
        mut self,
        dump: impl Fn(Value, Option<&Context>) -> Result<Value, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.dump = Some(Arc::new(dump));
        self
    }

    /// The schema's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the schema can dump results.
    #[must_use]
    pub fn dumps(&self) -> bool {
        self.dump.is_some()
    }

    pub(crate) fn load_fn(&self) -> CoerceFn {
        Arc::clone(&self.load)
    }

    pub(crate) fn dump_fn(&self) -> Option<TransformFn> {
        self.dump.clone()
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("dumps", &self.dumps())
            .finish()
    }
}

/// The tagged coercion contract chosen for a parameter at descriptor build
/// time.
#[derive(Clone)]
pub enum Coercer {
    /// The annotation exposed a parse-from-string capability.
    ParseFromString(CoerceFn),
    /// The annotation exposed a schema; inbound values go through its load.
    SchemaLoad(Schema),
    /// The annotation exposed a generic deserialize capability.
    Deserialize(CoerceFn),
    /// The annotation itself is the coercer.
    RawCallable(CoerceFn),
}

impl Coercer {
    /// Apply the coercion to a supplied value.
    ///
    /// # Errors
    ///
    /// Returns the coercer's [`ValidationError`] on invalid input.
    pub fn apply(&self, value: Value, context: Option<&Context>) -> Result<Value, ValidationError> {
        match self {
            Self::ParseFromString(f) | Self::Deserialize(f) | Self::RawCallable(f) => {
                f(value, context)
            }
            Self::SchemaLoad(schema) => (schema.load_fn())(value, context),
        }
    }
}

impl std::fmt::Debug for Coercer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFromString(_) => f.write_str("Coercer::ParseFromString"),
            Self::SchemaLoad(schema) => write!(f, "Coercer::SchemaLoad({})", schema.name()),
            Self::Deserialize(_) => f.write_str("Coercer::Deserialize"),
            Self::RawCallable(_) => f.write_str("Coercer::RawCallable"),
        }
    }
}

/// A declared annotation: up to five capabilities, probed in fixed priority.
#[derive(Clone, Default)]
pub struct Annotation {
    directive: Option<DirectiveFactory>,
    from_string: Option<CoerceFn>,
    schema: Option<Schema>,
    deserialize: Option<CoerceFn>,
    callable: Option<CoerceFn>,
    doc: Option<String>,
}

/// Result of probing an annotation's capabilities.
pub(crate) enum Probe {
    Directive(DirectiveFactory),
    Transform(Coercer),
    Ignored,
}

impl Annotation {
    /// An annotation marking the parameter as directive-injected.
    #[must_use]
    pub fn directive(factory: DirectiveFactory) -> Self {
        Self {
            directive: Some(factory),
            ..Self::default()
        }
    }

    /// An annotation exposing a parse-from-string capability.
    pub fn from_string(
        f: impl Fn(Value, Option<&Context>) -> Result<Value, ValidationError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            from_string: Some(Arc::new(f)),
            ..Self::default()
        }
    }

    /// An annotation exposing a schema.
    #[must_use]
    pub fn schema(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            ..Self::default()
        }
    }

    /// An annotation exposing a generic deserialize capability.
    pub fn deserialize(
        f: impl Fn(Value, Option<&Context>) -> Result<Value, ValidationError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            deserialize: Some(Arc::new(f)),
            ..Self::default()
        }
    }

    /// An annotation used directly as a callable coercer.
    pub fn coercer(
        f: impl Fn(Value, Option<&Context>) -> Result<Value, ValidationError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            callable: Some(Arc::new(f)),
            ..Self::default()
        }
    }

    /// A documentation-only annotation; ignored by the pipeline.
    pub fn doc(text: impl Into<String>) -> Self {
        Self {
            doc: Some(text.into()),
            ..Self::default()
        }
    }

    /// Add a parse-from-string capability to this annotation.
    #[must_use]
    pub fn with_from_string(
        mut self,
        f: impl Fn(Value, Option<&Context>) -> Result<Value, ValidationError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.from_string = Some(Arc::new(f));
        self
    }

    /// Add a schema capability to this annotation.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Add documentation text to this annotation.
    #[must_use]
    pub fn with_doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    /// The documentation text, if any.
    #[must_use]
    pub fn doc_text(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Probe capabilities in fixed priority: directive, parse-from-string,
    /// schema load, deserialize, raw callable. A doc-only annotation is
    /// ignored.
    pub(crate) fn probe(&self) -> Probe {
        if let Some(factory) = &self.directive {
            return Probe::Directive(Arc::clone(factory));
        }
        if let Some(f) = &self.from_string {
            return Probe::Transform(Coercer::ParseFromString(Arc::clone(f)));
        }
        if let Some(schema) = &self.schema {
            return Probe::Transform(Coercer::SchemaLoad(schema.clone()));
        }
        if let Some(f) = &self.deserialize {
            return Probe::Transform(Coercer::Deserialize(Arc::clone(f)));
        }
        if let Some(f) = &self.callable {
            return Probe::Transform(Coercer::RawCallable(Arc::clone(f)));
        }
        Probe::Ignored
    }

    /// Resolve this annotation as a return transform: a schema's dump wins,
    /// then any callable capability; a doc-only annotation yields none.
    pub(crate) fn probe_return(&self) -> Option<TransformFn> {
        if let Some(schema) = &self.schema {
            if let Some(dump) = schema.dump_fn() {
                return Some(dump);
            }
        }
        let coerce = self
            .callable
            .clone()
            .or_else(|| self.from_string.clone())
            .or_else(|| self.deserialize.clone())?;
        Some(Arc::new(move |value, context| {
            coerce(value, context).map_err(|err| Box::new(err) as BoxError)
        }))
    }
}

impl std::fmt::Debug for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotation")
            .field("directive", &self.directive.is_some())
            .field("from_string", &self.from_string.is_some())
            .field("schema", &self.schema.as_ref().map(Schema::name))
            .field("deserialize", &self.deserialize.is_some())
            .field("callable", &self.callable.is_some())
            .field("doc", &self.doc)
            .finish()
    }
}

// ============================================================================
// Built-in type handlers
// ============================================================================

/// A whole number. Accepts integers and integer-shaped strings.
#[must_use]
pub fn number() -> Annotation {
    Annotation::from_string(|value, _context| match &value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| ValidationError::new("not a valid number")),
        _ => Err(ValidationError::new("not a valid number")),
    })
    .with_doc("A whole number")
}

/// A floating point number. Accepts numbers and number-shaped strings.
#[must_use]
pub fn float() -> Annotation {
    Annotation::from_string(|value, _context| match &value {
        Value::Number(_) => Ok(value),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| ValidationError::new("not a valid float")),
        _ => Err(ValidationError::new("not a valid float")),
    })
    .with_doc("A floating point number")
}

/// Free-form text. Scalars are stringified; structured values are rejected.
#[must_use]
pub fn text() -> Annotation {
    Annotation::from_string(|value, _context| match value {
        Value::String(_) => Ok(value),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        _ => Err(ValidationError::new("not text")),
    })
    .with_doc("Free-form text")
}

/// A lenient boolean: accepts booleans, 0/1, and the usual spellings
/// ("true"/"t"/"1"/"yes"/"y"/"on" and their negatives; empty means false).
#[must_use]
pub fn smart_boolean() -> Annotation {
    Annotation::from_string(|value, _context| {
        let truthy = ["true", "t", "1", "yes", "y", "on"];
        let falsy = ["false", "f", "0", "no", "n", "off", ""];
        match &value {
            Value::Bool(_) => Ok(value),
            Value::Number(n) if n.as_i64() == Some(0) => Ok(Value::Bool(false)),
            Value::Number(n) if n.as_i64() == Some(1) => Ok(Value::Bool(true)),
            Value::String(s) => {
                let lowered = s.trim().to_ascii_lowercase();
                if truthy.contains(&lowered.as_str()) {
                    Ok(Value::Bool(true))
                } else if falsy.contains(&lowered.as_str()) {
                    Ok(Value::Bool(false))
                } else {
                    Err(ValidationError::new("not a valid boolean"))
                }
            }
            _ => Err(ValidationError::new("not a valid boolean")),
        }
    })
    .with_doc("A lenient boolean")
}

/// One of a fixed set of values. Failures carry the allowed set as
/// structured reasons.
#[must_use]
pub fn one_of(options: Vec<Value>) -> Annotation {
    Annotation::from_string(move |value, _context| {
        if options.contains(&value) {
            Ok(value)
        } else {
            let rendered: Vec<String> = options.iter().map(ToString::to_string).collect();
            Err(
                ValidationError::new(format!("must be one of: {}", rendered.join(", ")))
                    .with_reasons(Value::Array(options.clone())),
            )
        }
    })
    .with_doc("One of a fixed set of values")
}

/// A number within `[low, high)`.
#[must_use]
pub fn in_range(low: f64, high: f64) -> Annotation {
    Annotation::from_string(move |value, context| {
        let coerced = float().probe_coerce(value, context)?;
        let n = coerced.as_f64().unwrap_or(f64::NAN);
        if n >= low && n < high {
            Ok(coerced)
        } else {
            Err(ValidationError::new(format!(
                "must be at least {low} and below {high}"
            )))
        }
    })
    .with_doc("A number within a half-open range")
}

/// Always a list: wraps a single value into a one-element array.
#[must_use]
pub fn multiple() -> Annotation {
    Annotation::from_string(|value, _context| match value {
        Value::Array(_) => Ok(value),
        other => Ok(Value::Array(vec![other])),
    })
    .with_doc("A list of values")
}

impl Annotation {
    // Apply this annotation's own coercion capability directly; used by
    // built-ins that compose (e.g. in_range over float).
    fn probe_coerce(
        &self,
        value: Value,
        context: Option<&Context>,
    ) -> Result<Value, ValidationError> {
        match self.probe() {
            Probe::Transform(coercer) => coercer.apply(value, context),
            _ => Ok(value),
        }
    }
}
