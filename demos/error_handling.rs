//! Example demonstrating the runtime failure taxonomy.
//!
//! This example shows how to:
//! - Tell timeouts, header-generation failures, and validation failures apart
//! - Inspect a third-party validator error preserved inside the result
//! - Handle non-2xx responses through the exception parser, without a
//!   try/catch-style wrapper at the call site
//!
//! Run with: `cargo run --example error_handling`

use basecall::{Error, Outcome};
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("basecall=debug,error_handling=info")
        .init();

    basecall::register("httpbin", "https://httpbin.org");

    println!("=== Timeout ===");
    // httpbin delays this response by 3 seconds; the 100ms timeout fires
    // first and cancels the in-flight request.
    let result = basecall::get()
        .use_base("httpbin")
        .path("/delay/3")
        .none()
        .error_none()
        .timeout(Duration::from_millis(100))
        .send()
        .await;
    match result {
        Err(Error::Timeout { duration }) => println!("timed out after {duration:?}"),
        other => println!("unexpected outcome: {other:?}"),
    }
    println!();

    println!("=== Header generation failure ===");
    let result = basecall::get()
        .use_base("httpbin")
        .path("/get")
        .none()
        .error_none()
        .header_fn(|| Err("credential store unavailable".into()))
        .send()
        .await;
    match result {
        Err(Error::HeaderGeneration { source }) => {
            println!("header generator failed: {source}");
        }
        other => println!("unexpected outcome: {other:?}"),
    }
    println!();

    println!("=== Validation failure ===");
    // httpbin's /get returns an object; the validator insists on an array.
    let result = basecall::get()
        .use_base("httpbin")
        .path("/get")
        .json::<serde_json::Value>()
        .validate(|v| v.is_array())
        .error_text()
        .send()
        .await;
    match result {
        Err(Error::Validation { status }) => {
            println!("validator rejected the response (status {status})");
        }
        other => println!("unexpected outcome: {other:?}"),
    }
    println!();

    println!("=== Non-2xx handled as a value ===");
    let result = basecall::get()
        .use_base("httpbin")
        .path("/status/404")
        .text()
        .error_text()
        .send()
        .await;
    match result {
        Ok(response) => match response.outcome {
            Outcome::Success(_) => println!("unexpectedly succeeded"),
            Outcome::Failure(body) => {
                println!("server answered {} with body {body:?}", response.status);
            }
        },
        Err(e) => println!("transport-level failure: {e}"),
    }
}
