//! Call-scoped context lifecycle.
//!
//! A [`Context`] is created fresh for every invocation by the owning API's
//! context factory, passed by reference through the whole call, and destroyed
//! exactly once via the API's teardown function — on the success path and on
//! every early exit (requirement failure, validation failure, handler error).
//! The teardown receives a [`Disposition`] describing how the call ended.

use crate::api::{Api, ApiVersion};
use crate::error::BoxError;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Request/call-scoped state: a string-keyed slot map.
///
/// The default factory produces an empty context; custom factories typically
/// pre-populate slots (a session, a database handle id, a trace id) that
/// directives and coercers read during the call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    slots: Map<String, Value>,
}

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from pre-populated slots.
    #[must_use]
    pub fn from_slots(slots: Map<String, Value>) -> Self {
        Self { slots }
    }

    /// Store a value under `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.slots.insert(key.into(), value);
    }

    /// Look up a slot.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.slots.get(key)
    }

    /// Look up a slot as a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.slots.get(key).and_then(Value::as_str)
    }

    /// Whether a slot is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the context has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Borrow the underlying slot map.
    #[must_use]
    pub fn slots(&self) -> &Map<String, Value> {
        &self.slots
    }
}

/// How an invocation ended, as reported to the context teardown.
///
/// Exactly one disposition is reported per call.
#[derive(Debug)]
pub enum Disposition<'a> {
    /// The handler ran and its result was produced normally.
    Success,
    /// Validation failed; the borrowed value is the error mapping that will
    /// be returned to the caller.
    Invalid(&'a Value),
    /// A requirement predicate failed; the borrowed value is what it
    /// returned.
    LacksRequirement(&'a Value),
    /// The handler (or its transform) failed; the error propagates to the
    /// caller after teardown.
    Exception(&'a BoxError),
}

impl Disposition<'_> {
    /// Whether this is the success disposition.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The validation error mapping, when validation failed.
    #[must_use]
    pub fn errors(&self) -> Option<&Value> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    /// The requirement failure value, when a requirement failed.
    #[must_use]
    pub fn lacks_requirement(&self) -> Option<&Value> {
        match self {
            Self::LacksRequirement(value) => Some(value),
            _ => None,
        }
    }

    /// The propagating error, when the handler failed.
    #[must_use]
    pub fn exception(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Exception(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Inputs handed to a context factory when a call begins.
#[derive(Debug)]
pub struct ContextSeed<'a> {
    /// The API the interface is bound to.
    pub api: &'a Api,
    /// The route's version tag, if any.
    pub api_version: Option<ApiVersion>,
    /// Name of the interface being invoked.
    pub interface: &'a str,
}

/// Produces a fresh [`Context`] for each invocation.
pub type ContextFactory = Arc<dyn Fn(&ContextSeed<'_>) -> Context + Send + Sync>;

/// Destroys a [`Context`], observing how the call ended.
pub type ContextTeardown = Arc<dyn Fn(Context, Disposition<'_>) + Send + Sync>;

/// The default factory: an empty context.
#[must_use]
pub fn default_context_factory() -> ContextFactory {
    Arc::new(|_seed| Context::new())
}

/// The default teardown: drop the context.
#[must_use]
pub fn default_context_teardown() -> ContextTeardown {
    Arc::new(|_context, _disposition| {})
}
