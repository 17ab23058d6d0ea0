//! Asynchronous handlers through both invocation strategies.

use clasp_core::{
    Api, CallArgs, Context, Disposition, Handler, Signature, local,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
#[error("custom failure")]
struct CustomException;

fn hello_world() -> Handler {
    Handler::async_fn("hello_world", Signature::empty(), |_| async {
        Ok(json!("Hello World!"))
    })
}

#[test]
fn basic_async_call_from_a_synchronous_call_site() {
    let interface = local().bind(hello_world()).expect("bind failed");
    let output = interface.call(CallArgs::new()).expect("call failed");
    assert_eq!(output.into_value(), Some(json!("Hello World!")));
}

#[test]
fn async_handler_receives_bound_arguments() {
    let signature = Signature::builder()
        .param("name")
        .defaulted("punctuation", json!("!"))
        .build()
        .expect("signature should build");
    let handler = Handler::async_fn("greet", signature, |args| async move {
        let name = args.get("name").and_then(Value::as_str).unwrap_or("?").to_string();
        let punctuation = args
            .get("punctuation")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        Ok(json!(format!("hi {name}{punctuation}")))
    });

    let interface = local().bind(handler).expect("bind failed");
    let output = interface
        .call(CallArgs::new().named("name", json!("ada")))
        .expect("call failed");
    assert_eq!(output.into_value(), Some(json!("hi ada!")));
}

#[test]
fn async_handler_error_propagates_and_is_recorded_in_teardown() {
    let observed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);

    let api = Api::new("async-errors");
    api.set_context_factory(|_| Context::new());
    api.set_context_teardown(move |_context, disposition| {
        if let Disposition::Exception(error) = &disposition {
            sink.lock()
                .expect("observed poisoned")
                .push(error.to_string());
        }
    });

    let handler = Handler::async_fn("failing", Signature::empty(), |_| async {
        Err(Box::new(CustomException) as clasp_core::BoxError)
    });
    let interface = local().api(api).bind(handler).expect("bind failed");

    let error = interface
        .call(CallArgs::new())
        .expect_err("the failure must reach the caller");

    // the propagated error is the handler's own, unchanged
    assert!(error.handler_error_as::<CustomException>().is_some());
    assert_eq!(error.to_string(), "custom failure");
    // and the teardown saw the same failure
    assert_eq!(
        *observed.lock().expect("observed poisoned"),
        ["custom failure"]
    );
}

#[tokio::test]
async fn call_async_awaits_the_handler_in_place() {
    let interface = local().bind(hello_world()).expect("bind failed");
    let output = interface
        .call_async(CallArgs::new())
        .await
        .expect("call failed");
    assert_eq!(output.into_value(), Some(json!("Hello World!")));
}

#[tokio::test]
async fn call_async_works_for_synchronous_handlers_too() {
    let handler = Handler::sync("sync_inside_async", Signature::empty(), |_| Ok(json!(41)));
    let interface = local().bind(handler).expect("bind failed");
    let output = interface
        .call_async(CallArgs::new())
        .await
        .expect("call failed");
    assert_eq!(output.into_value(), Some(json!(41)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_call_inside_a_multi_thread_runtime() {
    // the engine detects the ambient runtime and hands the future to it via
    // block_in_place instead of building its own loop
    let interface = local().bind(hello_world()).expect("bind failed");
    let output = interface.call(CallArgs::new()).expect("call failed");
    assert_eq!(output.into_value(), Some(json!("Hello World!")));
}

#[test]
fn sync_and_async_interfaces_report_their_kind() {
    let sync_interface = local()
        .bind(Handler::sync("s", Signature::empty(), |_| Ok(Value::Null)))
        .expect("bind failed");
    let async_interface = local().bind(hello_world()).expect("bind failed");

    assert!(!sync_interface.is_async());
    assert!(async_interface.is_async());
}
