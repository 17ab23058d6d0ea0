//! A first interface: declared signature, coercion, validation, and output
//! formatting over one plain function.
//!
//! Run with: cargo run --example getting_started

use clasp::prelude::*;
use clasp::{output, types};
use serde_json::json;

fn main() {
    let signature = Signature::builder()
        .param("name")
        .defaulted("shout", json!(false))
        .build()
        .expect("valid signature");

    let handler = Handler::sync("greet", signature, |args| {
        let name: String = args.typed("name")?;
        let shout: bool = args.typed("shout")?;
        let greeting = format!("Hello, {name}!");
        Ok(json!(if shout {
            greeting.to_uppercase()
        } else {
            greeting
        }))
    })
    .annotate("name", types::text())
    .annotate("shout", types::smart_boolean())
    .with_doc("Greets someone, optionally loudly.");

    let interface = local()
        .output(output::json())
        .bind(handler)
        .expect("bind");

    // a valid call: "y" coerces to true through smart_boolean
    let ok = interface
        .call(CallArgs::new().named("name", json!("Ada")).named("shout", json!("y")))
        .expect("call");
    println!(
        "ok      -> {}",
        String::from_utf8_lossy(ok.bytes().expect("formatted output"))
    );

    // an invalid call: the error mapping flows through the same output path
    let invalid = interface
        .call(CallArgs::new().named("shout", json!("maybe")))
        .expect("call");
    println!(
        "invalid -> {}",
        String::from_utf8_lossy(invalid.bytes().expect("formatted output"))
    );

    // the interface describes itself
    println!("doc     -> {}", interface.documentation());
}
