//! Chainable route configuration.
//!
//! A [`LocalRoute`] accumulates everything a bound interface needs besides
//! the handler itself. Every chain method returns a **new** route with one
//! field overridden — the receiver is never mutated, so a partially
//! configured route can be reused as a template:
//!
//! ```ignore
//! let base = local().api(api).requires(authenticated);
//! let admin = base.requires(is_admin);     // base is unchanged
//! let public = base.doesnt_require(&authenticated);
//! ```
//!
//! Binding a route to a handler ([`LocalRoute::bind`]) produces the
//! [`Interface`] that actually executes calls.

use crate::api::{Api, ApiVersion};
use crate::context::Context;
use crate::error::{BoxError, InvalidCallableError};
use crate::handler::{Annotations, Handler};
use crate::interface::Interface;
use crate::output::OutputFormat;
use crate::types::TransformFn;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// What a requirement predicate sees.
pub struct RequirementCheck<'a> {
    /// The live call context.
    pub context: &'a Context,
    /// The API the interface is bound to.
    pub api: &'a Api,
    /// Name of the interface being invoked.
    pub interface: &'a str,
}

/// A requirement predicate's verdict.
///
/// A failure is a value, not an error: it short-circuits the call and is
/// returned through the normal output path.
#[derive(Debug, Clone, PartialEq)]
pub enum RequirementOutcome {
    /// The call may proceed.
    Satisfied,
    /// The call is refused; the carried value is returned to the caller.
    Failed(Value),
}

/// A predicate gating execution, evaluated before argument binding.
pub type Requirement = Arc<dyn Fn(&RequirementCheck<'_>) -> RequirementOutcome + Send + Sync>;

/// Wrap a plain closure into a [`Requirement`].
pub fn requirement(
    f: impl Fn(&RequirementCheck<'_>) -> RequirementOutcome + Send + Sync + 'static,
) -> Requirement {
    Arc::new(f)
}

/// A secondary validator run over the full bound-argument mapping after
/// per-parameter checks pass. A non-empty return value is the error set.
pub type ValidatorFn = Arc<dyn Fn(&Map<String, Value>) -> Map<String, Value> + Send + Sync>;

/// Immutable route configuration with copy-on-write chain methods.
#[derive(Clone, Default)]
pub struct LocalRoute {
    pub(crate) transform: Option<TransformFn>,
    pub(crate) output: Option<OutputFormat>,
    pub(crate) validator: Option<ValidatorFn>,
    pub(crate) api: Option<Api>,
    pub(crate) requires: Vec<Requirement>,
    pub(crate) map_params: HashMap<String, String>,
    pub(crate) annotations: Option<Annotations>,
    pub(crate) raise_on_invalid: bool,
    pub(crate) on_invalid: Option<TransformFn>,
    pub(crate) output_invalid: Option<OutputFormat>,
    pub(crate) skip_directives: bool,
    pub(crate) skip_validation: bool,
    pub(crate) version: Option<ApiVersion>,
}

/// Start an empty local route.
#[must_use]
pub fn local() -> LocalRoute {
    LocalRoute::default()
}

impl LocalRoute {
    /// Set the output formatter used to render this route's results.
    #[must_use]
    pub fn output(&self, formatter: OutputFormat) -> Self {
        let mut route = self.clone();
        route.output = Some(formatter);
        route
    }

    /// Set the function applied to the handler's return value before output
    /// formatting.
    #[must_use]
    pub fn transform(
        &self,
        f: impl Fn(Value, Option<&Context>) -> Result<Value, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let mut route = self.clone();
        route.transform = Some(Arc::new(f));
        route
    }

    /// Set the secondary validation function for this route.
    #[must_use]
    pub fn validate(
        &self,
        f: impl Fn(&Map<String, Value>) -> Map<String, Value> + Send + Sync + 'static,
    ) -> Self {
        let mut route = self.clone();
        route.validator = Some(Arc::new(f));
        route
    }

    /// Set the API that contains this route.
    #[must_use]
    pub fn api(&self, api: Api) -> Self {
        let mut route = self.clone();
        route.api = Some(api);
        route
    }

    /// Append a requirement. Order and duplicates are preserved.
    #[must_use]
    pub fn requires(&self, requirement: Requirement) -> Self {
        let mut route = self.clone();
        route.requires.push(requirement);
        route
    }

    /// Remove a previously added requirement (matched by identity), keeping
    /// all others.
    #[must_use]
    pub fn doesnt_require(&self, requirement: &Requirement) -> Self {
        let mut route = self.clone();
        route
            .requires
            .retain(|existing| !Arc::ptr_eq(existing, requirement));
        route
    }

    /// Map interface-facing parameter names to the handler's internal names.
    #[must_use]
    pub fn map_params<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut route = self.clone();
        route.map_params = pairs
            .into_iter()
            .map(|(interface, internal)| (interface.into(), internal.into()))
            .collect();
        route
    }

    /// Override the handler's own annotations for this route.
    ///
    /// Only effective when this bind is the one that fills the descriptor
    /// cache for the handler.
    #[must_use]
    pub fn annotations(&self, annotations: Annotations) -> Self {
        let mut route = self.clone();
        route.annotations = Some(annotations);
        route
    }

    /// Raise coercion failures as errors instead of collecting them into an
    /// error mapping.
    #[must_use]
    pub fn raise_on_invalid(&self, setting: bool) -> Self {
        let mut route = self.clone();
        route.raise_on_invalid = setting;
        route
    }

    /// Set a function applied to the error mapping when validation fails.
    #[must_use]
    pub fn on_invalid(
        &self,
        f: impl Fn(Value, Option<&Context>) -> Result<Value, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let mut route = self.clone();
        route.on_invalid = Some(Arc::new(f));
        route
    }

    /// Set the output formatter used when validation fails.
    #[must_use]
    pub fn output_invalid(&self, formatter: OutputFormat) -> Self {
        let mut route = self.clone();
        route.output_invalid = Some(formatter);
        route
    }

    /// Skip directive injection for this route.
    #[must_use]
    pub fn skip_directives(&self, setting: bool) -> Self {
        let mut route = self.clone();
        route.skip_directives = setting;
        route
    }

    /// Skip validation and coercion for this route.
    #[must_use]
    pub fn skip_validation(&self, setting: bool) -> Self {
        let mut route = self.clone();
        route.skip_validation = setting;
        route
    }

    /// Tag the route with an API version.
    #[must_use]
    pub fn version(&self, version: u32) -> Self {
        let mut route = self.clone();
        route.version = Some(ApiVersion(version));
        route
    }

    /// The configured output formatter.
    #[must_use]
    pub fn output_format(&self) -> Option<&OutputFormat> {
        self.output.as_ref()
    }

    /// The configured requirements, in order.
    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requires
    }

    /// The configured version tag.
    #[must_use]
    pub fn version_tag(&self) -> Option<ApiVersion> {
        self.version
    }

    /// Bind this route to a handler, producing the callable [`Interface`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCallableError`] when the handler's annotations (or
    /// this route's override) name undeclared parameters.
    pub fn bind(&self, handler: Handler) -> Result<Interface, InvalidCallableError> {
        Interface::bind(self.clone(), handler)
    }
}

impl std::fmt::Debug for LocalRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalRoute")
            .field("output", &self.output.as_ref().map(OutputFormat::content_type))
            .field("requires", &self.requires.len())
            .field("map_params", &self.map_params)
            .field("raise_on_invalid", &self.raise_on_invalid)
            .field("skip_directives", &self.skip_directives)
            .field("skip_validation", &self.skip_validation)
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output;
    use serde_json::json;

    #[test]
    fn chain_methods_never_mutate_the_receiver() {
        let original = local();
        let configured = original.output(output::json());

        assert!(original.output_format().is_none());
        assert_eq!(
            configured.output_format().map(OutputFormat::content_type),
            Some("application/json; charset=utf-8")
        );
    }

    #[test]
    fn requires_appends_preserving_order_and_duplicates() {
        let first = requirement(|_| RequirementOutcome::Satisfied);
        let second = requirement(|_| RequirementOutcome::Failed(json!("no")));

        let route = local()
            .requires(first.clone())
            .requires(second.clone())
            .requires(first.clone());

        assert_eq!(route.requirements().len(), 3);
        assert!(Arc::ptr_eq(&route.requirements()[0], &first));
        assert!(Arc::ptr_eq(&route.requirements()[1], &second));
        assert!(Arc::ptr_eq(&route.requirements()[2], &first));
    }

    #[test]
    fn doesnt_require_removes_by_identity() {
        let keep = requirement(|_| RequirementOutcome::Satisfied);
        let drop = requirement(|_| RequirementOutcome::Satisfied);

        let route = local().requires(keep.clone()).requires(drop.clone());
        let trimmed = route.doesnt_require(&drop);

        assert_eq!(trimmed.requirements().len(), 1);
        assert!(Arc::ptr_eq(&trimmed.requirements()[0], &keep));
        // the original still has both
        assert_eq!(route.requirements().len(), 2);
    }

    #[test]
    fn version_tag_roundtrip() {
        let route = local().version(2);
        assert_eq!(route.version_tag(), Some(ApiVersion(2)));
        assert_eq!(local().version_tag(), None);
    }

    #[test]
    fn template_reuse_keeps_branches_independent() {
        let base = local().version(1);
        let with_output = base.output(output::text());
        let with_raise = base.raise_on_invalid(true);

        assert!(base.output_format().is_none());
        assert!(!base.raise_on_invalid);
        assert!(with_output.output_format().is_some());
        assert!(!with_output.raise_on_invalid);
        assert!(with_raise.raise_on_invalid);
        assert!(with_raise.output_format().is_none());
    }
}
