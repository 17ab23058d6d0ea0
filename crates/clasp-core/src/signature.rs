//! Declared function signatures.
//!
//! Rust has no runtime reflection over closures, so a handler's calling
//! contract is declared once at registration time through
//! [`SignatureBuilder`] and validated eagerly: building never fails for a
//! well-formed declaration, and a malformed one fails fast with
//! [`InvalidCallableError`].

use crate::error::InvalidCallableError;
use serde_json::{Map, Value};

/// The immutable calling contract of a handler.
///
/// Holds the ordered public parameter list, the required/optional split, the
/// per-parameter defaults, the trailing variadic markers, and whether the
/// callable is a method (leading receiver excluded from the public list).
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    parameters: Vec<String>,
    required: Vec<String>,
    defaults: Map<String, Value>,
    var_positional: Option<String>,
    var_keyword: Option<String>,
    is_method: bool,
}

impl Signature {
    /// Start declaring a signature.
    #[must_use]
    pub fn builder() -> SignatureBuilder {
        SignatureBuilder::default()
    }

    /// A signature with no parameters.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            parameters: Vec::new(),
            required: Vec::new(),
            defaults: Map::new(),
            var_positional: None,
            var_keyword: None,
            is_method: false,
        }
    }

    /// Ordered public parameter names (receiver excluded).
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Parameters without a default, in declaration order.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Per-parameter default values.
    #[must_use]
    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Name of the trailing variadic-positional parameter, if declared.
    #[must_use]
    pub fn var_positional(&self) -> Option<&str> {
        self.var_positional.as_deref()
    }

    /// Name of the trailing variadic-keyword parameter, if declared.
    #[must_use]
    pub fn var_keyword(&self) -> Option<&str> {
        self.var_keyword.as_deref()
    }

    /// Whether surplus positional arguments are accepted.
    #[must_use]
    pub fn accepts_extra_positional(&self) -> bool {
        self.var_positional.is_some()
    }

    /// Whether unknown keyword arguments are accepted.
    #[must_use]
    pub fn accepts_extra_keyword(&self) -> bool {
        self.var_keyword.is_some()
    }

    /// Whether the callable is a bound method.
    #[must_use]
    pub fn is_method(&self) -> bool {
        self.is_method
    }

    /// Whether `name` is a declared parameter or variadic slot.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p == name)
            || self.var_positional.as_deref() == Some(name)
            || self.var_keyword.as_deref() == Some(name)
    }
}

/// Builder for [`Signature`].
///
/// Declaration order matters: required parameters first, then defaulted ones,
/// then the variadic slots — the same shape a function definition has.
#[derive(Debug, Clone, Default)]
pub struct SignatureBuilder {
    parameters: Vec<String>,
    defaults: Map<String, Value>,
    var_positional: Option<String>,
    var_keyword: Option<String>,
    is_method: bool,
    error: Option<InvalidCallableError>,
}

impl SignatureBuilder {
    /// Mark the callable as a method with a leading receiver.
    ///
    /// Must be called before any parameter is declared. The receiver is not
    /// part of the public parameter list.
    #[must_use]
    pub fn receiver(mut self) -> Self {
        if !self.parameters.is_empty() {
            self.fail(InvalidCallableError::MisplacedReceiver);
        }
        self.is_method = true;
        self
    }

    /// Declare a required parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.defaults.is_empty() {
            self.fail(InvalidCallableError::RequiredAfterDefault(name.clone()));
        }
        self.push(name);
        self
    }

    /// Declare a parameter with a default value.
    #[must_use]
    pub fn defaulted(mut self, name: impl Into<String>, default: Value) -> Self {
        let name = name.into();
        self.push(name.clone());
        self.defaults.insert(name, default);
        self
    }

    /// Declare a trailing variadic-positional slot (collects surplus
    /// positional arguments as an array).
    #[must_use]
    pub fn var_positional(mut self, name: impl Into<String>) -> Self {
        self.var_positional = Some(name.into());
        self
    }

    /// Declare a trailing variadic-keyword slot (permits unknown keyword
    /// arguments).
    #[must_use]
    pub fn var_keyword(mut self, name: impl Into<String>) -> Self {
        self.var_keyword = Some(name.into());
        self
    }

    /// Finish the declaration.
    ///
    /// # Errors
    ///
    /// Returns the first declaration error: a duplicate parameter, a required
    /// parameter after a defaulted one, or a misplaced receiver.
    pub fn build(self) -> Result<Signature, InvalidCallableError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let required = self
            .parameters
            .iter()
            .filter(|name| !self.defaults.contains_key(*name))
            .cloned()
            .collect();
        Ok(Signature {
            parameters: self.parameters,
            required,
            defaults: self.defaults,
            var_positional: self.var_positional,
            var_keyword: self.var_keyword,
            is_method: self.is_method,
        })
    }

    fn push(&mut self, name: String) {
        if self.parameters.contains(&name) {
            self.fail(InvalidCallableError::DuplicateParameter(name));
            return;
        }
        self.parameters.push(name);
    }

    // First error wins; later declarations still record so build() stays
    // chainable.
    fn fail(&mut self, error: InvalidCallableError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
