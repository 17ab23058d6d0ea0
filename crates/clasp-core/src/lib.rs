//! Core types for clasp: a binding layer that exposes ordinary functions as
//! callable endpoints sharing one validation, transformation, and
//! output-rendering pipeline.
//!
//! The pieces, leaf first:
//!
//! - [`Signature`] — a function's declared calling contract
//! - [`Handler`] — a registered function with identity and annotations
//! - [`descriptors`] — the build-once, cached interface descriptions
//! - [`LocalRoute`] — immutable, chainable route configuration
//! - [`Interface`] — the bound callable and its invocation engine
//! - [`registry`] / [`Api`] — process-wide defaults with per-API shadowing
//! - [`output`] / [`input`] — content-type-tagged formatters and parsers
//!
//! # Design principles
//!
//! - Descriptors are built once per handler and cached by identity
//! - Route configuration is copy-on-write; nothing observable ever mutates
//! - Context teardown runs exactly once per call, on every exit path
//! - Handler errors propagate unchanged; validation failures are values

#![forbid(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::type_complexity)]
#![allow(clippy::missing_errors_doc)]

mod api;
mod context;
mod descriptor;
pub mod directives;
mod error;
mod handler;
pub mod input;
mod interface;
pub mod output;
pub mod registry;
mod routing;
mod signature;
pub mod types;

pub use api::{Api, ApiVersion};
pub use context::{
    Context, ContextFactory, ContextSeed, ContextTeardown, Disposition, default_context_factory,
    default_context_teardown,
};
pub use descriptor::{DescriptorRegistry, InterfaceDescriptor, descriptors};
pub use directives::{CleanupFn, DirectiveCall, DirectiveFactory, Injected};
pub use error::{
    BoxError, CallError, ExtraArgumentsError, InputFormatError, InvalidCallableError, OutputError,
    UnexpectedArgumentError, ValidationError,
};
pub use handler::{
    Annotations, Args, AsyncHandlerFn, Handler, HandlerFuture, HandlerId, HandlerKind,
    SyncHandlerFn,
};
pub use input::InputFormat;
pub use interface::{CallArgs, CallOutput, Interface};
pub use output::OutputFormat;
pub use routing::{
    LocalRoute, Requirement, RequirementCheck, RequirementOutcome, ValidatorFn, local, requirement,
};
pub use signature::{Signature, SignatureBuilder};
pub use types::{Annotation, CoerceFn, Coercer, Schema, TransformFn};
