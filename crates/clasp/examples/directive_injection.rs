//! Directives and context lifecycle: per-call state created by the API,
//! injected values, and teardown observation.
//!
//! Run with: cargo run --example directive_injection

use clasp::prelude::*;
use clasp::{Disposition, Injected, directives};
use serde_json::json;

fn main() {
    let api = Api::new("demo");

    // each call gets a context pre-populated with a session
    api.set_context_factory(|seed| {
        let mut context = Context::new();
        context.insert("session", json!({"user": "ada", "via": seed.interface}));
        context
    });
    api.set_context_teardown(|_context, disposition| {
        if let Disposition::Success = disposition {
            println!("teardown -> success");
        }
    });

    // an API-scoped directive resolved by parameter name
    api.add_directive(
        "request_id",
        directives::factory(|_| Injected::value(json!("req-0001"))),
    );

    let signature = Signature::builder()
        .param("request_id")
        .param("session")
        .param("who")
        .build()
        .expect("valid signature");

    let handler = Handler::sync("whoami", signature, |args| {
        Ok(json!({
            "request": args.get("request_id"),
            "session": args.get("session"),
            "caller_said": args.get("who"),
        }))
    });

    let interface = local().api(api).bind(handler).expect("bind");

    // `request_id` and `session` are injected; only `who` comes from the call
    let output = interface
        .call(CallArgs::new().named("who", json!("it's me")))
        .expect("call");
    println!("result   -> {}", output.into_value().expect("raw value"));
}
