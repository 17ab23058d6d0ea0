//! Directives: call-time value providers resolved by parameter name.
//!
//! A directive factory runs during argument binding for every parameter whose
//! name matches a registered directive and that the caller did not supply.
//! The factory sees the parameter's default, the owning API, the route
//! version, the bound interface, and the live call context, and returns an
//! [`Injected`] value — optionally with a one-shot cleanup hook that runs
//! after the handler, receiving the propagating error when there is one.

use crate::api::{Api, ApiVersion};
use crate::context::Context;
use crate::error::BoxError;
use crate::interface::Interface;
use serde_json::{Number, Value};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Everything a directive factory sees when it runs.
pub struct DirectiveCall<'a> {
    /// The parameter's declared default, if any.
    pub default: Option<&'a Value>,
    /// The API the interface is bound to.
    pub api: &'a Api,
    /// The route's version tag.
    pub api_version: Option<ApiVersion>,
    /// The interface being invoked.
    pub interface: &'a Interface,
    /// The live call context.
    pub context: &'a Context,
}

/// One-shot cleanup hook attached to an injected value.
///
/// Invoked exactly once per call with the propagating error on failure
/// paths, `None` on success.
pub type CleanupFn = Box<dyn FnOnce(Option<&BoxError>) + Send>;

/// A directive's product: the injected value plus an optional cleanup hook.
pub struct Injected {
    value: Value,
    cleanup: Option<CleanupFn>,
}

impl Injected {
    /// An injected value with no cleanup.
    #[must_use]
    pub fn value(value: Value) -> Self {
        Self {
            value,
            cleanup: None,
        }
    }

    /// Attach a cleanup hook.
    #[must_use]
    pub fn with_cleanup(mut self, cleanup: impl FnOnce(Option<&BoxError>) + Send + 'static) -> Self {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    pub(crate) fn into_parts(self) -> (Value, Option<CleanupFn>) {
        (self.value, self.cleanup)
    }
}

impl std::fmt::Debug for Injected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injected")
            .field("value", &self.value)
            .field("cleanup", &self.cleanup.is_some())
            .finish()
    }
}

/// Produces an injected value for a directive-bound parameter.
pub type DirectiveFactory = Arc<dyn Fn(&DirectiveCall<'_>) -> Injected + Send + Sync>;

/// Wrap a plain closure into a [`DirectiveFactory`].
pub fn factory(
    f: impl Fn(&DirectiveCall<'_>) -> Injected + Send + Sync + 'static,
) -> DirectiveFactory {
    Arc::new(f)
}

// ============================================================================
// Built-in directives
// ============================================================================

/// Injects the wall-clock start of the call (seconds since the epoch) and
/// logs the elapsed time from its cleanup hook, including on error paths.
#[must_use]
pub fn timer() -> DirectiveFactory {
    factory(|call| {
        let started = Instant::now();
        let interface = call.interface.name().to_string();
        Injected::value(epoch_seconds()).with_cleanup(move |error| {
            tracing::debug!(
                %interface,
                elapsed_ms = started.elapsed().as_millis() as u64,
                failed = error.is_some(),
                "handler timing"
            );
        })
    })
}

/// Injects the name of the API the interface is bound to.
#[must_use]
pub fn current_api() -> DirectiveFactory {
    factory(|call| Injected::value(Value::String(call.api.name().to_string())))
}

/// Injects the route's version number, or null when unversioned.
#[must_use]
pub fn api_version() -> DirectiveFactory {
    factory(|call| {
        let value = match call.api_version {
            Some(version) => Value::Number(version.0.into()),
            None => Value::Null,
        };
        Injected::value(value)
    })
}

/// Injects the `session` slot of the call context, falling back to the
/// parameter's default, then to null.
#[must_use]
pub fn session() -> DirectiveFactory {
    factory(|call| {
        let value = call
            .context
            .get("session")
            .cloned()
            .or_else(|| call.default.cloned())
            .unwrap_or(Value::Null);
        Injected::value(value)
    })
}

/// Injects the interface's own documentation mapping.
#[must_use]
pub fn documentation() -> DirectiveFactory {
    factory(|call| Injected::value(call.interface.documentation()))
}

fn epoch_seconds() -> Value {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Number::from_f64(seconds).map_or(Value::Null, Value::Number)
}
