//! Error types for staged HTTP calls.
//!
//! Every failure that can occur once a request is in flight is *returned* as
//! an [`Error`] value from the terminal `send()` call, never panicked. The
//! variants are designed to be distinguishable so callers can tell a failing
//! header generator apart from a network outage or a validator rejection.
//!
//! Configuration misuse is deliberately **not** part of this enum. Registering
//! a duplicate base-URL identifier, referencing an unknown identifier, or
//! re-applying a once-only defaults method panics instead: those are wiring
//! mistakes that should surface immediately during development, not runtime
//! conditions a call site is expected to handle.

use http::StatusCode;
use std::time::Duration;

/// A boxed error used wherever caller-supplied code (header generators,
/// fallible validators) can fail with its own error type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The runtime error type for staged HTTP calls.
///
/// # Examples
///
/// ```no_run
/// use basecall::Error;
///
/// # async fn example() {
/// let result = basecall::get()
///     .use_once("https://api.example.com")
///     .path("/status")
///     .text()
///     .error_text()
///     .send()
///     .await;
///
/// match result {
///     Ok(response) => println!("status {}", response.status),
///     Err(Error::Timeout { duration }) => eprintln!("gave up after {duration:?}"),
///     Err(Error::HeaderGeneration { source }) => eprintln!("header logic failed: {source}"),
///     Err(e) => eprintln!("request failed: {e}"),
/// }
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed,
    /// TLS handshake failed, etc.).
    ///
    /// This wraps the underlying `reqwest::Error` unmodified.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The configured timeout elapsed before the transport call settled.
    ///
    /// The in-flight request is cancelled when the timer fires. A timer that
    /// would fire after the call has settled never surfaces here.
    #[error("Request timed out after {duration:?}")]
    Timeout {
        /// The timeout that was configured for the call.
        duration: Duration,
    },

    /// A header generator function failed.
    ///
    /// The generator's own error is preserved as the source so callers can
    /// downcast and inspect it. Distinguishable from [`Error::Network`] so
    /// header-logic failures are never mistaken for transport failures.
    #[error("Header generation failed: {source}")]
    HeaderGeneration {
        /// The error returned by the header generator.
        source: BoxError,
    },

    /// The chosen body parser could not decode the response body.
    ///
    /// Preserves the parser kind, the HTTP status of the response, and the
    /// underlying parse error.
    #[error("Failed to decode {kind} response body (status {status}): {source}")]
    Decode {
        /// Which parser was selected (`"text"`, `"JSON"`, ...).
        kind: &'static str,
        /// The HTTP status code of the response whose body failed to decode.
        status: StatusCode,
        /// The underlying parse error.
        source: BoxError,
    },

    /// A supplied validator returned `false` for the parsed value.
    #[error("Response validation failed (status {status})")]
    Validation {
        /// The HTTP status code of the response that failed validation.
        status: StatusCode,
    },

    /// A fallible validator returned its own error.
    ///
    /// Third-party schema adapters surface here; their error type is kept
    /// un-translated as the boxed source.
    #[error("Response validator failed: {source}")]
    Validator {
        /// The error returned by the validator.
        source: BoxError,
    },

    /// The JSON body supplied to the body stage could not be serialized.
    #[error("Failed to serialize request body: {0}")]
    BodySerialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns the HTTP status code if this error carries one.
    ///
    /// Only [`Error::Decode`] and [`Error::Validation`] are tied to a
    /// specific response; other variants return `None`.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Decode { status, .. } => Some(*status),
            Error::Validation { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns `true` if this error originated in a header generator.
    pub fn is_header_generation(&self) -> bool {
        matches!(self, Error::HeaderGeneration { .. })
    }
}
