//! Registered handlers and their call-time argument view.
//!
//! A [`Handler`] is an ordinary function registered together with its
//! declared [`Signature`] and [`Annotations`]. Registration assigns a
//! process-unique [`HandlerId`]; the interface descriptor cache is keyed off
//! that id, so re-binding the same handler (or a clone of it) reuses the
//! cached descriptor instead of rebuilding it.

use crate::error::BoxError;
use crate::signature::Signature;
use crate::types::Annotation;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    fn next() -> Self {
        Self(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The bound arguments a handler receives: parameter name to value, after
/// binding, directive injection, validation, and renaming have run.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Map<String, Value>,
}

impl Args {
    /// Wrap a bound argument map.
    #[must_use]
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Borrow an argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Remove and return an argument.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Deserialize an argument into a concrete type.
    ///
    /// # Errors
    ///
    /// Fails when the argument is absent or does not deserialize into `T`.
    pub fn typed<T: DeserializeOwned>(&self, name: &str) -> Result<T, BoxError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| format!("missing argument '{name}'"))?;
        serde_json::from_value(value.clone()).map_err(|err| Box::new(err) as BoxError)
    }

    /// Whether an argument is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of bound arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no arguments are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the underlying map.
    #[must_use]
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// A synchronous handler function.
pub type SyncHandlerFn = Arc<dyn Fn(Args) -> Result<Value, BoxError> + Send + Sync>;

/// The boxed future an asynchronous handler returns.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, BoxError>> + Send>>;

/// An asynchronous handler function.
pub type AsyncHandlerFn = Arc<dyn Fn(Args) -> HandlerFuture + Send + Sync>;

/// The two invocation shapes a handler can have, fixed at registration.
#[derive(Clone)]
pub enum HandlerKind {
    /// Runs inline on the calling thread.
    Sync(SyncHandlerFn),
    /// Suspends; invoked through the async strategy chosen at bind time.
    Async(AsyncHandlerFn),
}

impl std::fmt::Debug for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("HandlerKind::Sync"),
            Self::Async(_) => f.write_str("HandlerKind::Async"),
        }
    }
}

/// Declared parameter and return annotations for a handler.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    params: Vec<(String, Annotation)>,
    ret: Option<Annotation>,
}

impl Annotations {
    /// An empty annotation set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the annotation for a parameter.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, annotation: Annotation) -> Self {
        let name = name.into();
        self.params.retain(|(existing, _)| *existing != name);
        self.params.push((name, annotation));
        self
    }

    /// Set the return annotation.
    #[must_use]
    pub fn set_return(mut self, annotation: Annotation) -> Self {
        self.ret = Some(annotation);
        self
    }

    /// The annotation declared for a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Annotation> {
        self.params
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, annotation)| annotation)
    }

    /// The return annotation.
    #[must_use]
    pub fn ret(&self) -> Option<&Annotation> {
        self.ret.as_ref()
    }

    /// Iterate parameter annotations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Annotation)> {
        self.params
            .iter()
            .map(|(name, annotation)| (name.as_str(), annotation))
    }

    /// Whether no annotations are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.ret.is_none()
    }
}

/// A registered function: identity, signature, annotations, and the callable
/// itself.
///
/// Cloning is cheap and preserves the [`HandlerId`]; annotations added after
/// an interface has already been bound do not take effect, because the
/// descriptor built from the first bind is cached for the handler's lifetime.
#[derive(Debug, Clone)]
pub struct Handler {
    id: HandlerId,
    name: String,
    doc: Option<String>,
    signature: Signature,
    annotations: Annotations,
    kind: HandlerKind,
}

impl Handler {
    /// Register a synchronous function.
    pub fn sync(
        name: impl Into<String>,
        signature: Signature,
        f: impl Fn(Args) -> Result<Value, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: HandlerId::next(),
            name: name.into(),
            doc: None,
            signature,
            annotations: Annotations::new(),
            kind: HandlerKind::Sync(Arc::new(f)),
        }
    }

    /// Register an asynchronous function.
    pub fn async_fn<F, Fut>(name: impl Into<String>, signature: Signature, f: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        Self {
            id: HandlerId::next(),
            name: name.into(),
            doc: None,
            signature,
            annotations: Annotations::new(),
            kind: HandlerKind::Async(Arc::new(move |args| Box::pin(f(args)))),
        }
    }

    /// Annotate a parameter.
    #[must_use]
    pub fn annotate(mut self, name: impl Into<String>, annotation: Annotation) -> Self {
        self.annotations = self.annotations.set(name, annotation);
        self
    }

    /// Declare the return annotation.
    #[must_use]
    pub fn returning(mut self, annotation: Annotation) -> Self {
        self.annotations = self.annotations.set_return(annotation);
        self
    }

    /// Attach usage documentation.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// The handler's stable identity.
    #[must_use]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// The handler's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Usage documentation, if any.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// The declared signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The declared annotations.
    #[must_use]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Whether the handler is asynchronous.
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self.kind, HandlerKind::Async(_))
    }

    pub(crate) fn kind(&self) -> &HandlerKind {
        &self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_signature() -> Signature {
        Signature::builder()
            .param("value")
            .build()
            .expect("signature should build")
    }

    #[test]
    fn handler_ids_are_unique_and_clone_stable() {
        let a = Handler::sync("a", echo_signature(), |args| {
            Ok(args.get("value").cloned().unwrap_or(Value::Null))
        });
        let b = Handler::sync("b", echo_signature(), |_| Ok(Value::Null));

        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.clone().id());
    }

    #[test]
    fn sync_handler_is_not_async() {
        let handler = Handler::sync("noop", Signature::empty(), |_| Ok(Value::Null));
        assert!(!handler.is_async());
    }

    #[test]
    fn async_handler_is_async() {
        let handler =
            Handler::async_fn("noop", Signature::empty(), |_| async { Ok(Value::Null) });
        assert!(handler.is_async());
        assert_eq!(handler.name(), "noop");
    }

    #[test]
    fn async_handler_future_resolves() {
        let handler =
            Handler::async_fn("answer", Signature::empty(), |_| async { Ok(json!(42)) });
        let HandlerKind::Async(f) = handler.kind() else {
            panic!("expected an async handler");
        };
        let result = futures_executor::block_on(f(Args::default()));
        assert_eq!(result.expect("future should resolve"), json!(42));
    }

    #[test]
    fn args_typed_deserializes() {
        let mut values = Map::new();
        values.insert("count".to_string(), json!(3));
        let args = Args::new(values);

        let count: u32 = args.typed("count").expect("count should deserialize");
        assert_eq!(count, 3);
        assert!(args.typed::<String>("count").is_err());
        assert!(args.typed::<u32>("missing").is_err());
    }

    #[test]
    fn args_take_removes() {
        let mut values = Map::new();
        values.insert("x".to_string(), json!(1));
        let mut args = Args::new(values);

        assert_eq!(args.take("x"), Some(json!(1)));
        assert!(args.is_empty());
        assert_eq!(args.take("x"), None);
    }

    #[test]
    fn annotations_replace_by_name() {
        let annotations = Annotations::new()
            .set("x", Annotation::doc("first"))
            .set("x", Annotation::doc("second"));

        assert_eq!(
            annotations.get("x").and_then(Annotation::doc_text),
            Some("second")
        );
        assert_eq!(annotations.iter().count(), 1);
    }
}
