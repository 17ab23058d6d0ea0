//! The bound interface and its invocation engine.
//!
//! An [`Interface`] merges one cached descriptor with one route
//! configuration. It is immutable, `Send + Sync`, and re-entrant: every call
//! builds its own context and bound-argument map, so concurrent calls to the
//! same interface never share mutable state.
//!
//! Per call, the engine runs a fixed sequence: context creation, requirement
//! checks, positional binding, directive injection, validation and coercion,
//! default materialization, parameter rename reversal, invocation, return
//! transform, per-parameter cleanup, context teardown, output formatting.
//! Context teardown runs exactly once on every exit path — success,
//! requirement failure, validation failure, or a propagating handler error —
//! always after cleanup and before the call returns.

use crate::api::{Api, ApiVersion};
use crate::context::{Context, ContextSeed, Disposition};
use crate::descriptor::{InterfaceDescriptor, descriptors};
use crate::directives::{CleanupFn, DirectiveCall, DirectiveFactory};
use crate::error::{
    BoxError, CallError, ExtraArgumentsError, InvalidCallableError, UnexpectedArgumentError,
};
use crate::handler::{Args, Handler, HandlerFuture, HandlerKind};
use crate::output::OutputFormat;
use crate::routing::{LocalRoute, Requirement, RequirementCheck, RequirementOutcome, ValidatorFn};
use crate::types::{Coercer, TransformFn};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

/// Positional and named arguments for one invocation.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<Value>,
    named: Map<String, Value>,
}

impl CallArgs {
    /// No arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: Value) -> Self {
        self.positional.push(value);
        self
    }

    /// Set a named argument.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>, value: Value) -> Self {
        self.named.insert(name.into(), value);
        self
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: Map::new(),
        }
    }
}

/// The result of an invocation: a plain value, or bytes once an output
/// formatter has run.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutput {
    /// No output formatter configured; the raw (post-transform) value.
    Value(Value),
    /// The formatter's rendering.
    Bytes(Vec<u8>),
}

impl CallOutput {
    /// The raw value, when no formatter ran.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Bytes(_) => None,
        }
    }

    /// The rendered bytes, when a formatter ran.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Value(_) => None,
        }
    }

    /// Consume into the raw value, when no formatter ran.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Bytes(_) => None,
        }
    }
}

enum Prepared {
    Early(CallOutput),
    Ready {
        context: Context,
        bound: Map<String, Value>,
        cleanups: Vec<CleanupFn>,
    },
}

/// A handler bound to one route: the callable endpoint.
pub struct Interface {
    handler: Handler,
    descriptor: Arc<InterfaceDescriptor>,
    api: Api,
    parameters: Vec<String>,
    required: Vec<String>,
    defaults: Map<String, Value>,
    all_parameters: HashSet<String>,
    directives: HashMap<String, DirectiveFactory>,
    input_transformations: HashMap<String, Coercer>,
    map_params: HashMap<String, String>,
    transform: Option<TransformFn>,
    outputs: Option<OutputFormat>,
    invalid_outputs: Option<OutputFormat>,
    on_invalid: Option<TransformFn>,
    validator: Option<ValidatorFn>,
    requires: Vec<Requirement>,
    raise_on_invalid: bool,
    skip_directives: bool,
    skip_validation: bool,
    version: Option<ApiVersion>,
}

impl Interface {
    pub(crate) fn bind(route: LocalRoute, handler: Handler) -> Result<Self, InvalidCallableError> {
        let descriptor = descriptors().descriptor_for(&handler, route.annotations.as_ref())?;
        let api = route.api.clone().unwrap_or_else(Api::shared);

        let signature = descriptor.signature();
        let mut parameters: Vec<String> = signature.parameters().to_vec();
        let mut required: Vec<String> = signature.required().to_vec();
        let mut defaults: Map<String, Value> = signature.defaults().clone();
        let mut all_parameters: HashSet<String> = descriptor.all_parameters().clone();

        // rewrite internal names to their interface-facing ones
        for (interface_name, internal_name) in &route.map_params {
            if let Some(default) = defaults.remove(internal_name) {
                defaults.insert(interface_name.clone(), default);
            }
            for param in &mut parameters {
                if param == internal_name {
                    interface_name.clone_into(param);
                }
            }
            for param in &mut required {
                if param == internal_name {
                    interface_name.clone_into(param);
                }
            }
            if all_parameters.remove(internal_name) {
                all_parameters.insert(interface_name.clone());
            }
        }

        // input transformations are keyed by internal names; rekey them
        let reverse: HashMap<&String, &String> = route
            .map_params
            .iter()
            .map(|(interface_name, internal_name)| (internal_name, interface_name))
            .collect();
        let mut input_transformations = HashMap::new();
        for (name, coercer) in descriptor.input_transformations() {
            let key = reverse
                .get(name)
                .map_or_else(|| name.clone(), |mapped| (*mapped).clone());
            input_transformations.insert(key, coercer.clone());
        }

        let transform = route
            .transform
            .clone()
            .or_else(|| descriptor.transform().cloned());
        let on_invalid = route.on_invalid.clone().or_else(|| transform.clone());

        // API-level directives matched by parameter name, then the handler's
        // own annotations on top
        let defined = api.directives();
        let mut directives: HashMap<String, DirectiveFactory> = HashMap::new();
        for name in &parameters {
            if let Some(factory) = defined.get(name) {
                directives.insert(name.clone(), factory.clone());
            }
        }
        for (name, factory) in descriptor.directives() {
            directives.insert(name.clone(), factory.clone());
        }

        tracing::debug!(
            interface = handler.name(),
            api = api.name(),
            directives = directives.len(),
            "bound interface"
        );

        Ok(Self {
            handler,
            descriptor,
            api,
            parameters,
            required,
            defaults,
            all_parameters,
            directives,
            input_transformations,
            map_params: route.map_params,
            transform,
            outputs: route.output,
            invalid_outputs: route.output_invalid,
            on_invalid,
            validator: route.validator,
            requires: route.requires,
            raise_on_invalid: route.raise_on_invalid,
            skip_directives: route.skip_directives,
            skip_validation: route.skip_validation,
            version: route.version,
        })
    }

    /// The interface's name (the handler's name).
    #[must_use]
    pub fn name(&self) -> &str {
        self.handler.name()
    }

    /// The API this interface is bound to.
    #[must_use]
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// The route's version tag.
    #[must_use]
    pub fn version(&self) -> Option<ApiVersion> {
        self.version
    }

    /// Public parameter names, in call order (post rename).
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Required parameter names (post rename).
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Declared defaults (post rename).
    #[must_use]
    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Names of the parameters filled by directives.
    #[must_use]
    pub fn directive_names(&self) -> Vec<&str> {
        self.directives.keys().map(String::as_str).collect()
    }

    /// Whether a return transform is configured.
    #[must_use]
    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    /// The configured output format.
    #[must_use]
    pub fn outputs(&self) -> Option<&OutputFormat> {
        self.outputs.as_ref()
    }

    /// Whether the underlying handler is asynchronous.
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.handler.is_async()
    }

    /// A JSON description of the interface for documentation collaborators.
    #[must_use]
    pub fn documentation(&self) -> Value {
        let mut doc = Map::new();
        if let Some(usage) = self.handler.doc() {
            doc.insert("usage".to_string(), json!(usage));
        }
        if !self.requires.is_empty() {
            doc.insert("requirements".to_string(), json!(self.requires.len()));
        }
        if let Some(outputs) = &self.outputs {
            doc.insert(
                "outputs".to_string(),
                json!({ "content_type": outputs.content_type() }),
            );
        }

        let mut inputs = Map::new();
        for param in &self.parameters {
            if self.directives.contains_key(param) {
                continue;
            }
            let internal = self.map_params.get(param).unwrap_or(param);
            let mut entry = Map::new();
            if let Some(text) = self
                .handler
                .annotations()
                .get(internal)
                .and_then(crate::types::Annotation::doc_text)
            {
                entry.insert("type".to_string(), json!(text));
            }
            if let Some(default) = self.defaults.get(param) {
                entry.insert("default".to_string(), default.clone());
            }
            inputs.insert(param.clone(), Value::Object(entry));
        }
        if !inputs.is_empty() {
            doc.insert("inputs".to_string(), Value::Object(inputs));
        }
        Value::Object(doc)
    }

    /// Invoke the interface, blocking until the result is available.
    ///
    /// Synchronous handlers run inline. Asynchronous handlers run to
    /// completion on a lazily built current-thread runtime when no Tokio
    /// runtime is active, and via [`tokio::task::block_in_place`] on the
    /// ambient runtime's handle when one is — which requires a multi-thread
    /// runtime. From a current-thread runtime, use [`Interface::call_async`].
    ///
    /// # Errors
    ///
    /// - [`CallError::Invalid`] when validation fails and the route set
    ///   `raise_on_invalid` (otherwise validation failures are returned as
    ///   an `{"errors": ...}` value, not an error).
    /// - [`CallError::Handler`] carrying the handler's (or transform's) own
    ///   error, unchanged.
    /// - [`CallError::Output`] when the output formatter fails.
    pub fn call(&self, args: CallArgs) -> Result<CallOutput, CallError> {
        match self.prepare(args)? {
            Prepared::Early(output) => Ok(output),
            Prepared::Ready {
                context,
                bound,
                cleanups,
            } => {
                let result = match self.handler.kind() {
                    HandlerKind::Sync(f) => f(Args::new(bound)),
                    HandlerKind::Async(f) => invoke_blocking(f(Args::new(bound))),
                };
                self.finish(result, context, cleanups)
            }
        }
    }

    /// Invoke the interface from an asynchronous call site.
    ///
    /// Identical pipeline to [`Interface::call`]; the handler's future is
    /// awaited in place instead of blocking.
    ///
    /// # Errors
    ///
    /// As [`Interface::call`].
    pub async fn call_async(&self, args: CallArgs) -> Result<CallOutput, CallError> {
        match self.prepare(args)? {
            Prepared::Early(output) => Ok(output),
            Prepared::Ready {
                context,
                bound,
                cleanups,
            } => {
                let result = match self.handler.kind() {
                    HandlerKind::Sync(f) => f(Args::new(bound)),
                    HandlerKind::Async(f) => f(Args::new(bound)).await,
                };
                self.finish(result, context, cleanups)
            }
        }
    }

    // Runs every stage up to (but not including) the handler invocation.
    fn prepare(&self, args: CallArgs) -> Result<Prepared, CallError> {
        let seed = ContextSeed {
            api: &self.api,
            api_version: self.version,
            interface: self.handler.name(),
        };
        let context = self.api.create_context(&seed);

        // requirement checks: first failure short-circuits
        for requirement in &self.requires {
            let check = RequirementCheck {
                context: &context,
                api: &self.api,
                interface: self.handler.name(),
            };
            if let RequirementOutcome::Failed(value) = requirement(&check) {
                tracing::debug!(interface = self.handler.name(), "requirement failed");
                self.api
                    .destroy_context(context, Disposition::LacksRequirement(&value));
                return Ok(Prepared::Early(self.render(value, self.outputs.as_ref())?));
            }
        }

        // positional-to-named binding
        let signature = self.descriptor.signature();
        let supplied = args.positional.len();
        if supplied > self.parameters.len() && !signature.accepts_extra_positional() {
            let error: BoxError = Box::new(ExtraArgumentsError {
                interface: self.handler.name().to_string(),
                expected: self.parameters.len(),
                supplied,
            });
            return Err(self.fail(context, Vec::new(), error));
        }
        let mut bound = args.named;
        let mut overflow = Vec::new();
        for (index, value) in args.positional.into_iter().enumerate() {
            match self.parameters.get(index) {
                Some(name) => {
                    bound.insert(name.clone(), value);
                }
                None => overflow.push(value),
            }
        }
        if !overflow.is_empty() {
            if let Some(name) = signature.var_positional() {
                bound.insert(name.to_string(), Value::Array(overflow));
            }
        }

        // directive injection for parameters the caller did not supply
        let mut cleanups: Vec<CleanupFn> = Vec::new();
        if !self.skip_directives {
            for (name, factory) in &self.directives {
                if bound.contains_key(name) {
                    continue;
                }
                let call = DirectiveCall {
                    default: self.defaults.get(name),
                    api: &self.api,
                    api_version: self.version,
                    interface: self,
                    context: &context,
                };
                let (value, cleanup) = factory(&call).into_parts();
                bound.insert(name.clone(), value);
                if let Some(cleanup) = cleanup {
                    cleanups.push(cleanup);
                }
            }
        }

        // validation and coercion
        if !self.skip_validation {
            let mut errors = Map::new();
            for (key, coercer) in &self.input_transformations {
                let Some(current) = bound.get(key) else {
                    continue;
                };
                match coercer.apply(current.clone(), Some(&context)) {
                    Ok(value) => {
                        bound.insert(key.clone(), value);
                    }
                    Err(error) if self.raise_on_invalid => {
                        tracing::warn!(
                            interface = self.handler.name(),
                            parameter = %key,
                            "coercion failed, raising"
                        );
                        let mut mapping = Map::new();
                        mapping.insert(key.clone(), error.reason_value());
                        let boxed: BoxError = Box::new(error);
                        for cleanup in cleanups {
                            cleanup(Some(&boxed));
                        }
                        self.api
                            .destroy_context(context, Disposition::Exception(&boxed));
                        return Err(CallError::Invalid {
                            interface: self.handler.name().to_string(),
                            errors: Value::Object(mapping),
                        });
                    }
                    Err(error) => {
                        errors.insert(key.clone(), error.reason_value());
                    }
                }
            }
            for name in &self.required {
                if !bound.contains_key(name) {
                    errors.insert(
                        name.clone(),
                        Value::String(format!("Required parameter '{name}' not supplied")),
                    );
                }
            }
            if errors.is_empty() {
                if let Some(validator) = &self.validator {
                    errors = validator(&bound);
                }
            }
            if !errors.is_empty() {
                tracing::warn!(
                    interface = self.handler.name(),
                    error_count = errors.len(),
                    "validation failed"
                );
                let mut wrapped = json!({ "errors": errors });
                if let Some(on_invalid) = &self.on_invalid {
                    wrapped = match on_invalid(wrapped, Some(&context)) {
                        Ok(value) => value,
                        Err(error) => return Err(self.fail(context, cleanups, error)),
                    };
                }
                let format = self.invalid_outputs.as_ref().or(self.outputs.as_ref());
                self.api
                    .destroy_context(context, Disposition::Invalid(&wrapped));
                return Ok(Prepared::Early(self.render(wrapped, format)?));
            }
        }

        // materialize declared defaults for parameters still absent
        for (name, value) in &self.defaults {
            if !bound.contains_key(name) {
                bound.insert(name.clone(), value.clone());
            }
        }

        // unknown keyword arguments fail unless the signature collects them
        if !signature.accepts_extra_keyword() {
            if let Some(unknown) = bound
                .keys()
                .find(|key| !self.all_parameters.contains(*key))
            {
                let error: BoxError = Box::new(UnexpectedArgumentError {
                    interface: self.handler.name().to_string(),
                    argument: unknown.clone(),
                });
                return Err(self.fail(context, cleanups, error));
            }
        }

        // rewrite interface-facing names back to the handler's internal ones
        for (interface_name, internal_name) in &self.map_params {
            if let Some(value) = bound.remove(interface_name) {
                bound.insert(internal_name.clone(), value);
            }
        }

        Ok(Prepared::Ready {
            context,
            bound,
            cleanups,
        })
    }

    // Transform, cleanup, teardown, and output formatting for an invocation
    // result.
    fn finish(
        &self,
        result: Result<Value, BoxError>,
        context: Context,
        cleanups: Vec<CleanupFn>,
    ) -> Result<CallOutput, CallError> {
        let result = result.and_then(|value| match &self.transform {
            Some(transform) => transform(value, Some(&context)),
            None => Ok(value),
        });
        match result {
            Ok(value) => {
                for cleanup in cleanups {
                    cleanup(None);
                }
                self.api.destroy_context(context, Disposition::Success);
                self.render(value, self.outputs.as_ref())
            }
            Err(error) => Err(self.fail(context, cleanups, error)),
        }
    }

    // The exception exit: cleanup with the error, teardown with the error,
    // then hand the error back unchanged.
    fn fail(&self, context: Context, cleanups: Vec<CleanupFn>, error: BoxError) -> CallError {
        for cleanup in cleanups {
            cleanup(Some(&error));
        }
        self.api
            .destroy_context(context, Disposition::Exception(&error));
        CallError::Handler(error)
    }

    fn render(
        &self,
        value: Value,
        format: Option<&OutputFormat>,
    ) -> Result<CallOutput, CallError> {
        match format {
            Some(format) => Ok(CallOutput::Bytes(format.render(&value)?)),
            None => Ok(CallOutput::Value(value)),
        }
    }
}

impl std::fmt::Debug for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interface")
            .field("name", &self.handler.name())
            .field("api", &self.api.name())
            .field("parameters", &self.parameters)
            .field("required", &self.required)
            .field("version", &self.version)
            .finish()
    }
}

fn invoke_blocking(future: HandlerFuture) -> Result<Value, BoxError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => tokio::task::block_in_place(|| handle.block_on(future)),
        Err(_) => blocking_runtime().block_on(future),
    }
}

// The fallback loop for synchronous call sites with no ambient runtime.
fn blocking_runtime() -> &'static tokio::runtime::Runtime {
    static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build the invocation runtime")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::local;
    use crate::signature::Signature;
    use crate::types;

    fn greeter() -> Handler {
        let signature = Signature::builder()
            .param("name")
            .defaulted("greeting", json!("hello"))
            .build()
            .expect("signature should build");
        Handler::sync("greeter", signature, |args| {
            let name = args.get("name").and_then(Value::as_str).unwrap_or("?");
            let greeting = args.get("greeting").and_then(Value::as_str).unwrap_or("?");
            Ok(json!(format!("{greeting} {name}")))
        })
    }

    #[test]
    fn positional_binding_follows_declaration_order() {
        let interface = local().bind(greeter()).expect("bind failed");
        let output = interface
            .call(CallArgs::new().arg(json!("ada")).arg(json!("hey")))
            .expect("call failed");
        assert_eq!(output.into_value(), Some(json!("hey ada")));
    }

    #[test]
    fn named_arguments_and_defaults() {
        let interface = local().bind(greeter()).expect("bind failed");
        let output = interface
            .call(CallArgs::new().named("name", json!("grace")))
            .expect("call failed");
        assert_eq!(output.into_value(), Some(json!("hello grace")));
    }

    #[test]
    fn surplus_positional_arguments_fail() {
        let interface = local().bind(greeter()).expect("bind failed");
        let error = interface
            .call(
                CallArgs::new()
                    .arg(json!("a"))
                    .arg(json!("b"))
                    .arg(json!("c")),
            )
            .expect_err("expected extra-arguments failure");
        assert!(error.handler_error_as::<ExtraArgumentsError>().is_some());
    }

    #[test]
    fn surplus_positionals_collect_into_variadic_slot() {
        let signature = Signature::builder()
            .param("first")
            .var_positional("rest")
            .build()
            .expect("signature should build");
        let handler = Handler::sync("collector", signature, |args| {
            let rest = args.get("rest").cloned().unwrap_or_else(|| json!([]));
            Ok(json!({ "first": args.get("first"), "rest": rest }))
        });

        let interface = local().bind(handler).expect("bind failed");
        let output = interface
            .call(CallArgs::new().arg(json!(1)).arg(json!(2)).arg(json!(3)))
            .expect("call failed");
        assert_eq!(
            output.into_value(),
            Some(json!({"first": 1, "rest": [2, 3]}))
        );
    }

    #[test]
    fn unknown_keyword_argument_fails() {
        let interface = local().bind(greeter()).expect("bind failed");
        let error = interface
            .call(
                CallArgs::new()
                    .named("name", json!("ada"))
                    .named("shout", json!(true)),
            )
            .expect_err("expected unexpected-argument failure");
        let unexpected = error
            .handler_error_as::<UnexpectedArgumentError>()
            .expect("should be an unexpected-argument error");
        assert_eq!(unexpected.argument, "shout");
    }

    #[test]
    fn variadic_keyword_signature_accepts_unknown_names() {
        let signature = Signature::builder()
            .param("name")
            .var_keyword("extra")
            .build()
            .expect("signature should build");
        let handler = Handler::sync("loose", signature, |args| {
            Ok(json!(args.values().len()))
        });

        let interface = local().bind(handler).expect("bind failed");
        let output = interface
            .call(
                CallArgs::new()
                    .named("name", json!("x"))
                    .named("anything", json!(1)),
            )
            .expect("call failed");
        assert_eq!(output.into_value(), Some(json!(2)));
    }

    #[test]
    fn map_params_renames_both_directions() {
        let signature = Signature::builder()
            .param("internal_name")
            .build()
            .expect("signature should build");
        let handler = Handler::sync("renamed", signature, |args| {
            Ok(args.get("internal_name").cloned().unwrap_or(Value::Null))
        })
        .annotate("internal_name", types::number());

        let interface = local()
            .map_params([("public_name", "internal_name")])
            .bind(handler)
            .expect("bind failed");

        assert_eq!(interface.parameters(), ["public_name"]);
        assert_eq!(interface.required(), ["public_name"]);

        // the coercer follows the rename: a string arrives, a number lands
        let output = interface
            .call(CallArgs::new().named("public_name", json!("41")))
            .expect("call failed");
        assert_eq!(output.into_value(), Some(json!(41)));
    }

    #[test]
    fn transform_applies_before_output() {
        let interface = local()
            .transform(|value, _context| Ok(json!({ "wrapped": value })))
            .bind(greeter())
            .expect("bind failed");

        let output = interface
            .call(CallArgs::new().named("name", json!("ada")))
            .expect("call failed");
        assert_eq!(
            output.into_value(),
            Some(json!({"wrapped": "hello ada"}))
        );
    }

    #[test]
    fn output_formatter_renders_bytes() {
        let interface = local()
            .output(crate::output::json())
            .bind(greeter())
            .expect("bind failed");

        let output = interface
            .call(CallArgs::new().named("name", json!("ada")))
            .expect("call failed");
        assert_eq!(output.bytes(), Some(br#""hello ada""#.as_slice()));
    }

    #[test]
    fn skip_validation_bypasses_coercers() {
        let signature = Signature::builder()
            .param("x")
            .build()
            .expect("signature should build");
        let handler = Handler::sync("raw", signature, |args| {
            Ok(args.get("x").cloned().unwrap_or(Value::Null))
        })
        .annotate("x", types::number());

        let interface = local()
            .skip_validation(true)
            .bind(handler)
            .expect("bind failed");

        // "abc" would fail the number coercer; with validation skipped it
        // reaches the handler untouched
        let output = interface
            .call(CallArgs::new().named("x", json!("abc")))
            .expect("call failed");
        assert_eq!(output.into_value(), Some(json!("abc")));
    }

    #[test]
    fn documentation_lists_inputs_and_defaults() {
        let interface = local()
            .output(crate::output::json())
            .bind(greeter().with_doc("Greets people."))
            .expect("bind failed");

        let doc = interface.documentation();
        assert_eq!(doc["usage"], json!("Greets people."));
        assert_eq!(doc["outputs"]["content_type"], json!("application/json; charset=utf-8"));
        assert_eq!(doc["inputs"]["greeting"]["default"], json!("hello"));
        assert!(doc["inputs"]["name"].is_object());
    }
}
