//! Interface descriptors: the build-once, cached description of a handler.
//!
//! A descriptor combines a handler's declared signature with its annotations,
//! partitioned into directives and input transformations by a single
//! capability probe per annotation. Descriptors are cached in a process-wide
//! side map keyed by [`HandlerId`], so a handler bound by several routes is
//! introspected exactly once; only the annotations seen by the first
//! (cache-filling) build take effect.

use crate::directives::DirectiveFactory;
use crate::handler::{Annotations, Handler, HandlerId};
use crate::signature::Signature;
use crate::types::{Coercer, Probe, TransformFn};
use crate::error::InvalidCallableError;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

/// The cached, per-handler interface description.
pub struct InterfaceDescriptor {
    signature: Signature,
    all_parameters: HashSet<String>,
    transform: Option<TransformFn>,
    directives: HashMap<String, DirectiveFactory>,
    input_transformations: HashMap<String, Coercer>,
}

impl InterfaceDescriptor {
    fn build(
        handler: &Handler,
        annotation_override: Option<&Annotations>,
    ) -> Result<Self, InvalidCallableError> {
        let signature = handler.signature().clone();
        let annotations = annotation_override.unwrap_or_else(|| handler.annotations());

        let mut directives = HashMap::new();
        let mut input_transformations = HashMap::new();
        for (name, annotation) in annotations.iter() {
            if !signature.declares(name) {
                return Err(InvalidCallableError::UnknownAnnotation(name.to_string()));
            }
            match annotation.probe() {
                Probe::Directive(factory) => {
                    directives.insert(name.to_string(), factory);
                }
                Probe::Transform(coercer) => {
                    input_transformations.insert(name.to_string(), coercer);
                }
                Probe::Ignored => {}
            }
        }

        let transform = annotations.ret().and_then(|ret| ret.probe_return());

        let mut all_parameters: HashSet<String> =
            signature.parameters().iter().cloned().collect();
        if let Some(name) = signature.var_positional() {
            all_parameters.insert(name.to_string());
        }
        if let Some(name) = signature.var_keyword() {
            all_parameters.insert(name.to_string());
        }

        tracing::debug!(
            handler = handler.name(),
            directives = directives.len(),
            transformations = input_transformations.len(),
            "built interface descriptor"
        );

        Ok(Self {
            signature,
            all_parameters,
            transform,
            directives,
            input_transformations,
        })
    }

    /// The handler's declared signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Every name the handler can accept (parameters plus variadic slots).
    #[must_use]
    pub fn all_parameters(&self) -> &HashSet<String> {
        &self.all_parameters
    }

    /// The return transform declared on the handler, if any.
    #[must_use]
    pub fn transform(&self) -> Option<&TransformFn> {
        self.transform.as_ref()
    }

    /// Directives declared directly in the handler's annotations.
    #[must_use]
    pub fn directives(&self) -> &HashMap<String, DirectiveFactory> {
        &self.directives
    }

    /// Input transformations keyed by the handler's own parameter names.
    #[must_use]
    pub fn input_transformations(&self) -> &HashMap<String, Coercer> {
        &self.input_transformations
    }
}

impl std::fmt::Debug for InterfaceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceDescriptor")
            .field("parameters", &self.signature.parameters())
            .field("directives", &self.directives.keys().collect::<Vec<_>>())
            .field(
                "transformations",
                &self.input_transformations.keys().collect::<Vec<_>>(),
            )
            .field("has_transform", &self.transform.is_some())
            .finish()
    }
}

/// Process-wide, write-once-per-handler descriptor cache.
///
/// Concurrent first-time builds of the same handler may race; the first
/// write wins and the loser's descriptor is discarded, so the observable
/// write-once behavior holds (the duplicate build only shows up in
/// [`DescriptorRegistry::builds`]).
pub struct DescriptorRegistry {
    cache: RwLock<HashMap<HandlerId, Arc<InterfaceDescriptor>>>,
    builds: AtomicUsize,
}

/// Access the process-wide descriptor registry.
pub fn descriptors() -> &'static DescriptorRegistry {
    static REGISTRY: OnceLock<DescriptorRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| DescriptorRegistry {
        cache: RwLock::new(HashMap::new()),
        builds: AtomicUsize::new(0),
    })
}

impl DescriptorRegistry {
    /// The cached descriptor for a handler, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCallableError`] when the (first) build finds an
    /// annotation for an undeclared parameter.
    pub fn descriptor_for(
        &self,
        handler: &Handler,
        annotation_override: Option<&Annotations>,
    ) -> Result<Arc<InterfaceDescriptor>, InvalidCallableError> {
        {
            let guard = self.cache.read().expect("descriptor cache poisoned");
            if let Some(descriptor) = guard.get(&handler.id()) {
                return Ok(Arc::clone(descriptor));
            }
        }

        self.builds.fetch_add(1, Ordering::Relaxed);
        let built = Arc::new(InterfaceDescriptor::build(handler, annotation_override)?);

        let mut guard = self.cache.write().expect("descriptor cache poisoned");
        Ok(Arc::clone(guard.entry(handler.id()).or_insert(built)))
    }

    /// Number of descriptors built since process start (cache misses).
    #[must_use]
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of cached descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        let guard = self.cache.read().expect("descriptor cache poisoned");
        guard.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::{self, Injected};
    use crate::types::{self, Annotation};
    use serde_json::{Value, json};

    fn handler_with(annotations: bool) -> Handler {
        let signature = Signature::builder()
            .param("count")
            .defaulted("label", json!("none"))
            .build()
            .expect("signature should build");
        let mut handler = Handler::sync("annotated", signature, |args| {
            Ok(args.get("count").cloned().unwrap_or(Value::Null))
        });
        if annotations {
            handler = handler
                .annotate("count", types::number())
                .annotate("label", Annotation::doc("a label"));
        }
        handler
    }

    #[test]
    fn partitions_annotations() {
        let handler = handler_with(true)
            .annotate(
                "label",
                Annotation::directive(directives::factory(|_| Injected::value(json!("x")))),
            );
        let descriptor = descriptors()
            .descriptor_for(&handler, None)
            .expect("descriptor should build");

        assert!(descriptor.input_transformations().contains_key("count"));
        assert!(descriptor.directives().contains_key("label"));
        assert!(descriptor.transform().is_none());
        assert!(descriptor.all_parameters().contains("count"));
    }

    #[test]
    fn doc_annotations_are_ignored() {
        let handler = handler_with(true);
        let descriptor = descriptors()
            .descriptor_for(&handler, None)
            .expect("descriptor should build");

        assert!(descriptor.input_transformations().contains_key("count"));
        assert!(!descriptor.input_transformations().contains_key("label"));
        assert!(!descriptor.directives().contains_key("label"));
    }

    #[test]
    fn unknown_annotation_fails() {
        let handler = handler_with(false).annotate("missing", types::number());
        let result = descriptors().descriptor_for(&handler, None);
        assert_eq!(
            result.err(),
            Some(InvalidCallableError::UnknownAnnotation(
                "missing".to_string()
            ))
        );
    }

    #[test]
    fn second_lookup_hits_cache() {
        let handler = handler_with(true);
        let before = descriptors().builds();

        let first = descriptors()
            .descriptor_for(&handler, None)
            .expect("first build");
        let second = descriptors()
            .descriptor_for(&handler.clone(), None)
            .expect("cache hit");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(descriptors().builds(), before + 1);
    }

    #[test]
    fn override_annotations_take_effect_on_first_build_only() {
        let handler = handler_with(false);
        let override_set = Annotations::new().set("count", types::number());

        let first = descriptors()
            .descriptor_for(&handler, Some(&override_set))
            .expect("override build");
        assert!(first.input_transformations().contains_key("count"));

        // a later bind without the override still sees the cached descriptor
        let second = descriptors()
            .descriptor_for(&handler, None)
            .expect("cache hit");
        assert!(second.input_transformations().contains_key("count"));
    }

    #[test]
    fn return_annotation_becomes_transform() {
        let signature = Signature::builder().param("x").build().expect("signature");
        let handler = Handler::sync("doubling", signature, |args| {
            Ok(args.get("x").cloned().unwrap_or(Value::Null))
        })
        .returning(Annotation::coercer(|value, _| {
            Ok(json!({ "wrapped": value }))
        }));

        let descriptor = descriptors()
            .descriptor_for(&handler, None)
            .expect("descriptor should build");
        let transform = descriptor.transform().expect("transform should be set");
        assert_eq!(transform(json!(1), None).unwrap(), json!({"wrapped": 1}));
    }
}
