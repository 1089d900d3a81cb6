//! # Basecall - a staged HTTP request builder
//!
//! Basecall is a chainable, type-threaded HTTP request builder on top of
//! `reqwest`. A call is configured through a fixed sequence of narrow stages
//! — verb, base URL, path, query, body, success parser, exception parser,
//! final options — and ends in a single terminal `send()` that performs the
//! network request and returns a discriminated result instead of forcing a
//! try/catch around every call site.
//!
//! ## Quick Start
//!
//! ```no_run
//! use basecall::Outcome;
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     name: String,
//!     email: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct ApiError {
//!     message: String,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // Register base URLs once, at startup.
//!     basecall::register("api", "https://api.example.com");
//!     basecall::set_default("api");
//!
//!     // GET with a typed response.
//!     let result = basecall::get()
//!         .use_default()
//!         .path("/users/123")
//!         .json::<User>()
//!         .error_json::<ApiError>()
//!         .timeout(Duration::from_secs(30))
//!         .send()
//!         .await;
//!
//!     match result {
//!         Ok(response) => match response.outcome {
//!             Outcome::Success(user) => println!("User: {}", user.name),
//!             Outcome::Failure(err) => eprintln!("{}: {}", response.status, err.message),
//!         },
//!         Err(e) => eprintln!("Request failed: {e}"),
//!     }
//!
//!     // POST with a JSON body.
//!     let new_user = CreateUser {
//!         name: "Alice".to_string(),
//!         email: "alice@example.com".to_string(),
//!     };
//!     let created = basecall::post()
//!         .use_default()
//!         .path("/users")
//!         .body_json(&new_user)
//!         .json::<User>()
//!         .error_json::<ApiError>()
//!         .send()
//!         .await;
//!     if let Ok(response) = created {
//!         if let Some(user) = response.data() {
//!             println!("Created user with ID: {}", user.id);
//!         }
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - **Strictly ordered stages** - each stage exposes only the methods valid
//!   at that point, so an out-of-order chain is a compile error
//! - **Body capability at the type level** - setting a body on a GET/HEAD/
//!   OPTIONS chain does not compile
//! - **Named base-URL registry** - register base URLs with default options
//!   and headers once, start chains from them everywhere
//! - **Independent success and error parsing** - non-2xx bodies can have a
//!   completely different shape than success bodies
//! - **Lazy header sources** - static maps, sync generators, and async
//!   generators, resolved once immediately before the call
//! - **Non-throwing call results** - every runtime failure comes back as a
//!   value; only configuration misuse panics
//! - **Timeout with cancellation** - an elapsed timeout cancels the in-flight
//!   request and reports the configured duration
//! - **Structured logging** - request/response logging with `tracing`
//!
//! ## Error Handling
//!
//! Runtime failures are distinguishable variants of [`Error`]:
//!
//! ```no_run
//! use basecall::Error;
//!
//! # async fn example() {
//! match basecall::get()
//!     .use_once("https://api.example.com")
//!     .path("/health")
//!     .text()
//!     .error_text()
//!     .send()
//!     .await
//! {
//!     Ok(response) => println!("ok={} status={}", response.ok, response.status),
//!     Err(Error::Timeout { duration }) => eprintln!("timed out after {duration:?}"),
//!     Err(Error::HeaderGeneration { source }) => eprintln!("header generator failed: {source}"),
//!     Err(Error::Validation { status }) => eprintln!("validator rejected response ({status})"),
//!     Err(e) => eprintln!("other failure: {e}"),
//! }
//! # }
//! ```
//!
//! Configuration misuse — registering a duplicate identifier, referencing an
//! unknown one, or applying `use_default_options()` twice on one chain —
//! panics instead. Those mistakes belong to development time, not to the
//! production request path.

mod config;
mod error;
mod execute;
mod header;
mod options;
mod registry;
mod response;
mod stage;

pub use error::{BoxError, Error};
pub use header::HeaderSource;
pub use options::RequestOptions;
pub use registry::{register, register_with, set_default};
pub use response::{ApiResponse, ApiResult, Outcome};
pub use stage::{
    delete, get, head, options, patch, post, put, BodyAllowed, BodyForbidden, ExceptionStage,
    ParseStage, PathStage, QueryStage, SendStage, UrlStage,
};
