//! clasp — expose ordinary functions as callable endpoints.
//!
//! A registered function, its declared signature, and a chainable route
//! configuration combine into an [`Interface`]: a callable contract that
//! validates and coerces arguments, injects directive-provided values,
//! manages a per-call context, applies return transforms, and renders
//! output — the same pipeline regardless of how the call arrives.
//!
//! # Quick start
//!
//! ```
//! use clasp::prelude::*;
//! use serde_json::{Value, json};
//!
//! let signature = Signature::builder()
//!     .param("number")
//!     .build()
//!     .expect("valid signature");
//!
//! let handler = Handler::sync("double", signature, |args| {
//!     let n = args.typed::<i64>("number")?;
//!     Ok(json!(n * 2))
//! })
//! .annotate("number", clasp::types::number());
//!
//! let interface = local().bind(handler).expect("bind");
//!
//! let ok = interface.call(CallArgs::new().named("number", json!("21"))).unwrap();
//! assert_eq!(ok.into_value(), Some(json!(42)));
//!
//! let invalid = interface.call(CallArgs::new().named("number", json!("abc"))).unwrap();
//! assert_eq!(
//!     invalid.into_value(),
//!     Some(json!({"errors": {"number": "not a valid number"}}))
//! );
//! ```
//!
//! # Crate structure
//!
//! - [`clasp_core`] — descriptors, routing, the invocation engine, the
//!   directive registry, and the built-in coercers/formats

#![forbid(unsafe_code)]

pub use clasp_core as core;

pub use clasp_core::{
    Annotation, Annotations, Api, ApiVersion, Args, BoxError, CallArgs, CallError, CallOutput,
    Coercer, Context, ContextFactory, ContextSeed, ContextTeardown, Disposition, Handler,
    HandlerId, Injected, InputFormat, Interface, InvalidCallableError, LocalRoute, OutputFormat,
    Requirement, RequirementCheck, RequirementOutcome, Schema, Signature, SignatureBuilder,
    ValidationError, local, requirement,
};

pub use clasp_core::{directives, input, output, registry, types};

/// The common imports for building and calling interfaces.
pub mod prelude {
    pub use clasp_core::{
        Annotation, Api, CallArgs, CallOutput, Context, Handler, Interface, RequirementOutcome,
        Signature, local, requirement,
    };
}
