//! API handles.
//!
//! An [`Api`] groups interfaces that share a context lifecycle, directives,
//! and format defaults. Every per-API setting shadows the process-wide
//! default from [`crate::registry`] for the same name; anything not set
//! locally falls through to the global registry.
//!
//! Mutation happens at registration time only; call-time access is
//! read-only.

use crate::context::{Context, ContextFactory, ContextSeed, ContextTeardown, Disposition};
use crate::directives::DirectiveFactory;
use crate::input::InputFormat;
use crate::output::OutputFormat;
use crate::registry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

/// A route's version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApiVersion(pub u32);

impl ApiVersion {
    /// Parse a version from `"2"` or `"v2"`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        digits.parse::<u32>().ok().map(ApiVersion)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

struct ApiInner {
    name: String,
    directives: RwLock<HashMap<String, DirectiveFactory>>,
    context_factory: RwLock<Option<ContextFactory>>,
    context_teardown: RwLock<Option<ContextTeardown>>,
    output_format: RwLock<Option<OutputFormat>>,
    input_formats: RwLock<HashMap<String, InputFormat>>,
}

/// A named API instance. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Api {
    inner: Arc<ApiInner>,
}

impl Api {
    /// Create a new API.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                name: name.into(),
                directives: RwLock::new(HashMap::new()),
                context_factory: RwLock::new(None),
                context_teardown: RwLock::new(None),
                output_format: RwLock::new(None),
                input_formats: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The process-wide default API, used by routes that set none.
    #[must_use]
    pub fn shared() -> Api {
        static SHARED: OnceLock<Api> = OnceLock::new();
        SHARED.get_or_init(|| Api::new("default")).clone()
    }

    /// The API's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Register a directive visible only to routes bound to this API.
    pub fn add_directive(
        &self,
        name: impl Into<String>,
        factory: DirectiveFactory,
    ) {
        let mut guard = self
            .inner
            .directives
            .write()
            .expect("api directives poisoned");
        guard.insert(name.into(), factory);
    }

    /// Resolve a directive by name: this API's entry shadows the global one.
    #[must_use]
    pub fn directive(&self, name: &str) -> Option<DirectiveFactory> {
        let guard = self
            .inner
            .directives
            .read()
            .expect("api directives poisoned");
        guard
            .get(name)
            .cloned()
            .or_else(|| registry::defaults().directive(name))
    }

    /// All directives visible to this API: globals overlaid with the API's
    /// own entries.
    #[must_use]
    pub fn directives(&self) -> HashMap<String, DirectiveFactory> {
        let mut merged = registry::defaults().directives();
        let guard = self
            .inner
            .directives
            .read()
            .expect("api directives poisoned");
        for (name, factory) in guard.iter() {
            merged.insert(name.clone(), factory.clone());
        }
        merged
    }

    /// Install this API's context factory.
    pub fn set_context_factory(
        &self,
        f: impl Fn(&ContextSeed<'_>) -> Context + Send + Sync + 'static,
    ) {
        let mut guard = self
            .inner
            .context_factory
            .write()
            .expect("api context factory poisoned");
        *guard = Some(Arc::new(f));
    }

    /// Install this API's context teardown.
    pub fn set_context_teardown(
        &self,
        f: impl Fn(Context, Disposition<'_>) + Send + Sync + 'static,
    ) {
        let mut guard = self
            .inner
            .context_teardown
            .write()
            .expect("api context teardown poisoned");
        *guard = Some(Arc::new(f));
    }

    /// Create a fresh call context via this API's factory (or the global
    /// default).
    #[must_use]
    pub fn create_context(&self, seed: &ContextSeed<'_>) -> Context {
        let factory = {
            let guard = self
                .inner
                .context_factory
                .read()
                .expect("api context factory poisoned");
            guard.clone()
        };
        match factory {
            Some(factory) => factory(seed),
            None => (registry::defaults().context_factory())(seed),
        }
    }

    /// Destroy a call context via this API's teardown (or the global
    /// default).
    pub fn destroy_context(&self, context: Context, disposition: Disposition<'_>) {
        let teardown = {
            let guard = self
                .inner
                .context_teardown
                .read()
                .expect("api context teardown poisoned");
            guard.clone()
        };
        match teardown {
            Some(teardown) => teardown(context, disposition),
            None => (registry::defaults().context_teardown())(context, disposition),
        }
    }

    /// Set this API's default output format.
    pub fn set_output_format(&self, format: OutputFormat) {
        let mut guard = self
            .inner
            .output_format
            .write()
            .expect("api output format poisoned");
        *guard = Some(format);
    }

    /// This API's default output format, falling back to the global default.
    #[must_use]
    pub fn output_format(&self) -> Option<OutputFormat> {
        let guard = self
            .inner
            .output_format
            .read()
            .expect("api output format poisoned");
        guard
            .clone()
            .or_else(|| registry::defaults().output_format())
    }

    /// Register an input format for a content type on this API.
    pub fn set_input_format(&self, content_type: impl Into<String>, format: InputFormat) {
        let mut guard = self
            .inner
            .input_formats
            .write()
            .expect("api input formats poisoned");
        guard.insert(content_type.into(), format);
    }

    /// Resolve the input format for a content type: this API's entry shadows
    /// the global one.
    #[must_use]
    pub fn input_format(&self, content_type: &str) -> Option<InputFormat> {
        let guard = self
            .inner
            .input_formats
            .read()
            .expect("api input formats poisoned");
        guard
            .get(content_type)
            .cloned()
            .or_else(|| registry::defaults().input_format(content_type))
    }
}

impl PartialEq for Api {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let directives = self
            .inner
            .directives
            .read()
            .expect("api directives poisoned");
        f.debug_struct("Api")
            .field("name", &self.inner.name)
            .field("local_directives", &directives.len())
            .finish()
    }
}
