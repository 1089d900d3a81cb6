//! Response envelope and body decoding.
//!
//! After the executor returns a raw response, the body is read exactly once
//! and decoded by the parser chosen during the builder chain: the
//! success-path parser when the terminal status denotes success, the
//! exception-path parser otherwise. The decoded value, together with the
//! status, headers, and ok flag, forms the uniform [`ApiResponse`] envelope.

use crate::error::{BoxError, Error};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// The decoded payload of a call: success-parsed data for 2xx responses,
/// exception-parsed data otherwise. Mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, E> {
    /// The status denoted success; the body was decoded by the success-path
    /// parser.
    Success(T),
    /// The status denoted failure; the body was decoded by the
    /// exception-path parser.
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    /// Returns `true` for the success arm.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// The uniform envelope returned from a terminal `send()` call.
///
/// `ok` mirrors the transport's success flag: it is `true` exactly when the
/// final status (after any redirects the transport followed) is 2xx, and it
/// tells you which arm of [`outcome`](Self::outcome) is populated.
///
/// # Examples
///
/// ```no_run
/// use basecall::Outcome;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User { name: String }
///
/// # async fn example() {
/// let result = basecall::get()
///     .use_once("https://api.example.com")
///     .path("/users/1")
///     .json::<User>()
///     .error_text()
///     .send()
///     .await;
///
/// if let Ok(response) = result {
///     match response.outcome {
///         Outcome::Success(user) => println!("{}", user.name),
///         Outcome::Failure(body) => eprintln!("{}: {}", response.status, body),
///     }
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiResponse<T, E = ()> {
    /// `true` exactly when `status` is a success status.
    pub ok: bool,

    /// The final HTTP status code.
    pub status: StatusCode,

    /// The final response headers.
    pub headers: HeaderMap,

    /// Time from dispatch until the body was fully read.
    pub latency: Duration,

    /// The decoded payload.
    pub outcome: Outcome<T, E>,
}

/// The discriminated result of a terminal call: an [`ApiResponse`] envelope,
/// or a runtime [`Error`]. No ordinary network failure is ever panicked.
pub type ApiResult<T, E = ()> = Result<ApiResponse<T, E>, Error>;

impl<T, E> ApiResponse<T, E> {
    /// Returns the success data, if this response carries any.
    pub fn data(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    /// Returns the exception-parsed data, if this response carries any.
    pub fn error_data(&self) -> Option<&E> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(data) => Some(data),
        }
    }

    /// Consumes the response, returning the success data if present.
    pub fn into_success(self) -> Option<T> {
        match self.outcome {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    /// Returns a response header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Maps the success data to a different type, preserving the envelope.
    pub fn map<U, F>(self, f: F) -> ApiResponse<U, E>
    where
        F: FnOnce(T) -> U,
    {
        ApiResponse {
            ok: self.ok,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            outcome: match self.outcome {
                Outcome::Success(data) => Outcome::Success(f(data)),
                Outcome::Failure(data) => Outcome::Failure(data),
            },
        }
    }
}

/// A one-shot body decoder chosen by the parser stage.
pub(crate) type Decoder<T> = Box<dyn FnOnce(Bytes, StatusCode) -> Result<T, Error> + Send>;

pub(crate) fn text_decoder() -> Decoder<String> {
    Box::new(|bytes, status| {
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::Decode {
            kind: "text",
            status,
            source: Box::new(e),
        })
    })
}

pub(crate) fn bytes_decoder() -> Decoder<Bytes> {
    Box::new(|bytes, _status| Ok(bytes))
}

pub(crate) fn form_decoder() -> Decoder<Vec<(String, String)>> {
    Box::new(|bytes, _status| Ok(url::form_urlencoded::parse(&bytes).into_owned().collect()))
}

pub(crate) fn json_decoder<T>() -> Decoder<T>
where
    T: DeserializeOwned + 'static,
{
    Box::new(|bytes, status| {
        serde_json::from_slice(&bytes).map_err(|e| Error::Decode {
            kind: "JSON",
            status,
            source: Box::new(e),
        })
    })
}

/// Discards the body. For fire-and-forget calls where only the status
/// matters.
pub(crate) fn unit_decoder() -> Decoder<()> {
    Box::new(|_bytes, _status| Ok(()))
}

/// A user-supplied check run against the decoded value.
pub(crate) enum Validator<T> {
    /// A type predicate: `false` fails the call with [`Error::Validation`].
    Predicate(Box<dyn FnOnce(&T) -> bool + Send>),
    /// A fallible check: its error is preserved as [`Error::Validator`],
    /// downcastable to the original type.
    Fallible(Box<dyn FnOnce(&T) -> Result<(), BoxError> + Send>),
}

impl<T> Validator<T> {
    pub(crate) fn check(self, value: &T, status: StatusCode) -> Result<(), Error> {
        match self {
            Validator::Predicate(f) => {
                if f(value) {
                    Ok(())
                } else {
                    Err(Error::Validation { status })
                }
            }
            Validator::Fallible(f) => f(value).map_err(|source| Error::Validator { source }),
        }
    }
}
