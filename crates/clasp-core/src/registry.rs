//! Process-wide defaults.
//!
//! The [`Defaults`] registry replaces implicit module-level mutable state
//! with one explicit object. Initialization order is documented and fixed:
//! the registry is created on first access with the built-in directives
//! (`timer`, `current_api`, `api_version`, `session`, `documentation`), the
//! built-in input formats (JSON, plain text, urlencoded), the default
//! context factory/teardown, and no default output format. Registrations
//! made afterwards override those entries; per-API registrations
//! ([`crate::api::Api`]) shadow the global entries at resolution time and
//! never modify them.
//!
//! Globals are mutated at registration time only and read at call time.

use crate::context::{
    Context, ContextFactory, ContextSeed, ContextTeardown, Disposition, default_context_factory,
    default_context_teardown,
};
use crate::directives::{self, DirectiveFactory};
use crate::input::{self, InputFormat};
use crate::output::OutputFormat;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// The process-wide default registry.
pub struct Defaults {
    directives: RwLock<HashMap<String, DirectiveFactory>>,
    context_factory: RwLock<ContextFactory>,
    context_teardown: RwLock<ContextTeardown>,
    output_format: RwLock<Option<OutputFormat>>,
    input_formats: RwLock<HashMap<String, InputFormat>>,
}

/// Access the process-wide defaults, creating them on first use.
pub fn defaults() -> &'static Defaults {
    static DEFAULTS: OnceLock<Defaults> = OnceLock::new();
    DEFAULTS.get_or_init(Defaults::with_builtins)
}

impl Defaults {
    fn with_builtins() -> Self {
        Self {
            directives: RwLock::new(builtin_directives()),
            context_factory: RwLock::new(default_context_factory()),
            context_teardown: RwLock::new(default_context_teardown()),
            output_format: RwLock::new(None),
            input_formats: RwLock::new(builtin_input_formats()),
        }
    }

    /// Register (or replace) a global directive.
    pub fn register_directive(&self, name: impl Into<String>, factory: DirectiveFactory) {
        let name = name.into();
        tracing::debug!(directive = %name, "registering global directive");
        let mut guard = self.directives.write().expect("global directives poisoned");
        guard.insert(name, factory);
    }

    /// Resolve a global directive by name.
    #[must_use]
    pub fn directive(&self, name: &str) -> Option<DirectiveFactory> {
        let guard = self.directives.read().expect("global directives poisoned");
        guard.get(name).cloned()
    }

    /// Snapshot of the global directive map.
    #[must_use]
    pub fn directives(&self) -> HashMap<String, DirectiveFactory> {
        let guard = self.directives.read().expect("global directives poisoned");
        guard.clone()
    }

    /// Install the global context factory.
    pub fn set_context_factory(
        &self,
        f: impl Fn(&ContextSeed<'_>) -> Context + Send + Sync + 'static,
    ) {
        let mut guard = self
            .context_factory
            .write()
            .expect("global context factory poisoned");
        *guard = std::sync::Arc::new(f);
    }

    /// The global context factory.
    #[must_use]
    pub fn context_factory(&self) -> ContextFactory {
        let guard = self
            .context_factory
            .read()
            .expect("global context factory poisoned");
        guard.clone()
    }

    /// Install the global context teardown.
    pub fn set_context_teardown(
        &self,
        f: impl Fn(Context, Disposition<'_>) + Send + Sync + 'static,
    ) {
        let mut guard = self
            .context_teardown
            .write()
            .expect("global context teardown poisoned");
        *guard = std::sync::Arc::new(f);
    }

    /// The global context teardown.
    #[must_use]
    pub fn context_teardown(&self) -> ContextTeardown {
        let guard = self
            .context_teardown
            .read()
            .expect("global context teardown poisoned");
        guard.clone()
    }

    /// Set the global default output format.
    pub fn set_output_format(&self, format: OutputFormat) {
        let mut guard = self
            .output_format
            .write()
            .expect("global output format poisoned");
        *guard = Some(format);
    }

    /// The global default output format, if one was registered.
    #[must_use]
    pub fn output_format(&self) -> Option<OutputFormat> {
        let guard = self
            .output_format
            .read()
            .expect("global output format poisoned");
        guard.clone()
    }

    /// Register a global input format for a content type.
    pub fn set_input_format(&self, content_type: impl Into<String>, format: InputFormat) {
        let mut guard = self
            .input_formats
            .write()
            .expect("global input formats poisoned");
        guard.insert(content_type.into(), format);
    }

    /// Resolve the global input format for a content type.
    #[must_use]
    pub fn input_format(&self, content_type: &str) -> Option<InputFormat> {
        let guard = self
            .input_formats
            .read()
            .expect("global input formats poisoned");
        guard.get(content_type).cloned()
    }

    /// Restore the registry to its built-in state.
    ///
    /// Intended for tests that install process-wide factories or directives
    /// and must not leak them into other tests.
    pub fn reset(&self) {
        *self.directives.write().expect("global directives poisoned") = builtin_directives();
        *self
            .context_factory
            .write()
            .expect("global context factory poisoned") = default_context_factory();
        *self
            .context_teardown
            .write()
            .expect("global context teardown poisoned") = default_context_teardown();
        *self
            .output_format
            .write()
            .expect("global output format poisoned") = None;
        *self
            .input_formats
            .write()
            .expect("global input formats poisoned") = builtin_input_formats();
    }
}

fn builtin_directives() -> HashMap<String, DirectiveFactory> {
    let mut map: HashMap<String, DirectiveFactory> = HashMap::new();
    map.insert("timer".to_string(), directives::timer());
    map.insert("current_api".to_string(), directives::current_api());
    map.insert("api_version".to_string(), directives::api_version());
    map.insert("session".to_string(), directives::session());
    map.insert("documentation".to_string(), directives::documentation());
    map
}

fn builtin_input_formats() -> HashMap<String, InputFormat> {
    let mut map: HashMap<String, InputFormat> = HashMap::new();
    map.insert("application/json".to_string(), input::json());
    map.insert("text/plain".to_string(), input::text());
    map.insert(
        "application/x-www-form-urlencoded".to_string(),
        input::urlencoded(),
    );
    map
}
