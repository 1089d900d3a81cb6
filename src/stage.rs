//! The staged builder chain.
//!
//! A call starts at one of the verb functions ([`get`], [`post`], ...),
//! which fixes the HTTP method for the life of the chain and decides at the
//! type level whether the chain may carry an entity body. Each stage exposes
//! only the operations valid at that point and hands the per-call
//! configuration forward by value, so the ordering of stages is enforced at
//! compile time and a chain cannot be reused after it has advanced.
//!
//! Stage order: verb entry → URL selection → path → query → (body, only for
//! body-capable verbs) → success parser → exception parser → final options →
//! `send()`.
//!
//! # Examples
//!
//! ```no_run
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Repo { full_name: String }
//!
//! # async fn example() {
//! basecall::register("github", "https://api.github.com");
//!
//! let result = basecall::get()
//!     .use_base("github")
//!     .path("/repos/rust-lang/rust")
//!     .json::<Repo>()
//!     .error_text()
//!     .header("user-agent", "basecall-demo")
//!     .timeout(Duration::from_secs(10))
//!     .send()
//!     .await;
//! # let _ = result;
//! # }
//! ```

use crate::config::{BodySlot, RequestConfig};
use crate::error::BoxError;
use crate::header::HeaderSource;
use crate::options::RequestOptions;
use crate::registry::{self, BaseUrl};
use crate::response::{
    self, ApiResponse, ApiResult, Decoder, Outcome, Validator,
};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use url::Url;

/// Marker for verbs that may carry an entity body (POST, PUT, PATCH,
/// DELETE). Such chains must pass through the body stage.
pub enum BodyAllowed {}

/// Marker for verbs that never carry an entity body (GET, HEAD, OPTIONS).
/// The body stage does not exist for these chains; attempting to set a body
/// is a compile error rather than a runtime check.
pub enum BodyForbidden {}

/// Starts a GET chain.
pub fn get() -> UrlStage<BodyForbidden> {
    UrlStage::new(Method::GET)
}

/// Starts a HEAD chain.
pub fn head() -> UrlStage<BodyForbidden> {
    UrlStage::new(Method::HEAD)
}

/// Starts an OPTIONS chain.
pub fn options() -> UrlStage<BodyForbidden> {
    UrlStage::new(Method::OPTIONS)
}

/// Starts a POST chain.
pub fn post() -> UrlStage<BodyAllowed> {
    UrlStage::new(Method::POST)
}

/// Starts a PUT chain.
pub fn put() -> UrlStage<BodyAllowed> {
    UrlStage::new(Method::PUT)
}

/// Starts a PATCH chain.
pub fn patch() -> UrlStage<BodyAllowed> {
    UrlStage::new(Method::PATCH)
}

/// Starts a DELETE chain.
pub fn delete() -> UrlStage<BodyAllowed> {
    UrlStage::new(Method::DELETE)
}

/// URL-selection stage: pick a registered base URL, the process default, or
/// a one-off absolute URL.
pub struct UrlStage<B> {
    method: Method,
    _body: PhantomData<B>,
}

impl<B> UrlStage<B> {
    fn new(method: Method) -> Self {
        Self {
            method,
            _body: PhantomData,
        }
    }

    fn with_entry(self, entry: BaseUrl) -> PathStage<B> {
        PathStage {
            method: self.method,
            base: entry.url,
            default_options: entry.options,
            default_headers: entry.headers,
            _body: PhantomData,
        }
    }

    /// Uses the process-default base URL, inheriting its registered default
    /// options and header sources.
    ///
    /// # Panics
    ///
    /// Panics if no default has been set via [`crate::set_default`].
    pub fn use_default(self) -> PathStage<B> {
        self.with_entry(registry::default_entry())
    }

    /// Uses the base URL registered under `id`, inheriting its registered
    /// default options and header sources.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    pub fn use_base(self, id: &str) -> PathStage<B> {
        self.with_entry(registry::lookup(id))
    }

    /// Bypasses the registry with a one-off absolute URL. No defaults are
    /// inherited.
    ///
    /// # Panics
    ///
    /// Panics if `url` is not a valid URL.
    pub fn use_once(self, url: impl Into<String>) -> PathStage<B> {
        let url = url.into();
        if let Err(e) = Url::parse(&url) {
            panic!("one-off URL `{url}` is not a valid URL: {e}");
        }
        self.with_entry(BaseUrl {
            url,
            options: RequestOptions::default(),
            headers: Vec::new(),
        })
    }
}

/// Path stage: append a relative path (which may embed an inline query
/// string) to the selected base URL.
pub struct PathStage<B> {
    method: Method,
    base: String,
    default_options: RequestOptions,
    default_headers: Vec<HeaderSource>,
    _body: PhantomData<B>,
}

impl<B> PathStage<B> {
    /// Appends `path` to the base URL textually and parses the result.
    ///
    /// An inline query string (`"/search?q=rust"`) is preserved; dedicated
    /// query parameters added at the next stage are appended after it.
    ///
    /// # Panics
    ///
    /// Panics if the concatenation of base URL and path is not a valid URL.
    pub fn path(self, path: impl AsRef<str>) -> QueryStage<B> {
        let full = format!("{}{}", self.base, path.as_ref());
        let url = Url::parse(&full)
            .unwrap_or_else(|e| panic!("`{full}` is not a valid request URL: {e}"));
        QueryStage {
            cfg: RequestConfig::new(self.method, url, self.default_options, self.default_headers),
            _body: PhantomData,
        }
    }
}

/// Query stage: attach typed query parameters, then (for body-capable verbs)
/// set the request body, or choose a success-path parser directly.
pub struct QueryStage<B> {
    cfg: RequestConfig,
    _body: PhantomData<B>,
}

impl<B> QueryStage<B> {
    /// Appends a single query parameter.
    ///
    /// Dedicated parameters land after any query string embedded in the
    /// path, and duplicate keys are never deduplicated.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.cfg.query.push((key.into(), value.into()));
        self
    }

    /// Appends multiple query parameters, in iteration order.
    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.cfg
            .query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

impl QueryStage<BodyAllowed> {
    /// Sets a JSON body. The value is stringified and the request is
    /// declared `content-type: application/json`.
    ///
    /// A value that fails to serialize is reported from `send()` as
    /// [`crate::Error::BodySerialization`]; the chain itself stays
    /// infallible.
    pub fn body_json<T: Serialize + ?Sized>(mut self, body: &T) -> ParseStage {
        self.cfg.body = match serde_json::to_value(body) {
            Ok(value) => BodySlot::Json(value),
            Err(e) => BodySlot::Invalid(e),
        };
        ParseStage { cfg: self.cfg }
    }

    /// Sets a raw body with no declared content type.
    pub fn body_raw(mut self, body: impl Into<Bytes>) -> ParseStage {
        self.cfg.body = BodySlot::Raw {
            bytes: body.into(),
            content_type: None,
        };
        ParseStage { cfg: self.cfg }
    }

    /// Sets a raw body with an explicit content type.
    ///
    /// # Panics
    ///
    /// Panics if `content_type` is not a valid header value.
    pub fn body_raw_typed(mut self, body: impl Into<Bytes>, content_type: &str) -> ParseStage {
        let content_type = HeaderValue::try_from(content_type).unwrap_or_else(|e| {
            panic!("`{content_type}` is not a valid content-type value: {e}")
        });
        self.cfg.body = BodySlot::Raw {
            bytes: body.into(),
            content_type: Some(content_type),
        };
        ParseStage { cfg: self.cfg }
    }

    /// Explicitly declares that this call sends no body.
    pub fn no_body(self) -> ParseStage {
        ParseStage { cfg: self.cfg }
    }
}

impl QueryStage<BodyForbidden> {
    /// Parses the success-path response body as UTF-8 text.
    pub fn text(self) -> ExceptionStage<String> {
        ParseStage { cfg: self.cfg }.text()
    }

    /// Hands the success-path response body over as raw bytes.
    pub fn bytes(self) -> ExceptionStage<Bytes> {
        ParseStage { cfg: self.cfg }.bytes()
    }

    /// Parses the success-path response body as form-urlencoded pairs.
    pub fn form(self) -> ExceptionStage<Vec<(String, String)>> {
        ParseStage { cfg: self.cfg }.form()
    }

    /// Parses the success-path response body as JSON into `T`.
    pub fn json<T>(self) -> ExceptionStage<T>
    where
        T: DeserializeOwned + 'static,
    {
        ParseStage { cfg: self.cfg }.json::<T>()
    }

    /// Discards the success-path response body.
    pub fn none(self) -> ExceptionStage<()> {
        ParseStage { cfg: self.cfg }.none()
    }
}

/// Success-parser stage: choose exactly one parser for 2xx response bodies.
/// The chosen type is threaded through the remaining stages.
pub struct ParseStage {
    cfg: RequestConfig,
}

impl ParseStage {
    fn choose<T>(self, decoder: Decoder<T>) -> ExceptionStage<T> {
        ExceptionStage {
            cfg: self.cfg,
            decoder,
            validator: None,
        }
    }

    /// Parses the success-path response body as UTF-8 text.
    pub fn text(self) -> ExceptionStage<String> {
        self.choose(response::text_decoder())
    }

    /// Hands the success-path response body over as raw bytes.
    pub fn bytes(self) -> ExceptionStage<Bytes> {
        self.choose(response::bytes_decoder())
    }

    /// Parses the success-path response body as form-urlencoded pairs.
    pub fn form(self) -> ExceptionStage<Vec<(String, String)>> {
        self.choose(response::form_decoder())
    }

    /// Parses the success-path response body as JSON into `T`.
    pub fn json<T>(self) -> ExceptionStage<T>
    where
        T: DeserializeOwned + 'static,
    {
        self.choose(response::json_decoder::<T>())
    }

    /// Discards the success-path response body. For fire-and-forget calls.
    pub fn none(self) -> ExceptionStage<()> {
        self.choose(response::unit_decoder())
    }
}

/// Exception-parser stage: optionally validate the success-parsed value,
/// then choose a parser for non-2xx response bodies. The failure-path shape
/// is independent of the success-path choice.
pub struct ExceptionStage<T> {
    cfg: RequestConfig,
    decoder: Decoder<T>,
    validator: Option<Validator<T>>,
}

impl<T> ExceptionStage<T> {
    /// Attaches a predicate validator for the success-parsed value.
    ///
    /// A `false` return fails the call with [`crate::Error::Validation`].
    pub fn validate<F>(mut self, predicate: F) -> Self
    where
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        self.validator = Some(Validator::Predicate(Box::new(predicate)));
        self
    }

    /// Attaches a fallible validator for the success-parsed value.
    ///
    /// The validator's own error is preserved as
    /// [`crate::Error::Validator`], so third-party schema errors stay
    /// inspectable.
    pub fn try_validate<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&T) -> Result<(), BoxError> + Send + 'static,
    {
        self.validator = Some(Validator::Fallible(Box::new(check)));
        self
    }

    fn choose_error<E>(self, error_decoder: Decoder<E>) -> SendStage<T, E> {
        SendStage {
            cfg: self.cfg,
            decoder: self.decoder,
            validator: self.validator,
            error_decoder,
            error_validator: None,
        }
    }

    /// Parses non-2xx response bodies as UTF-8 text.
    pub fn error_text(self) -> SendStage<T, String> {
        self.choose_error(response::text_decoder())
    }

    /// Hands non-2xx response bodies over as raw bytes.
    pub fn error_bytes(self) -> SendStage<T, Bytes> {
        self.choose_error(response::bytes_decoder())
    }

    /// Parses non-2xx response bodies as form-urlencoded pairs.
    pub fn error_form(self) -> SendStage<T, Vec<(String, String)>> {
        self.choose_error(response::form_decoder())
    }

    /// Parses non-2xx response bodies as JSON into `E`.
    ///
    /// Error bodies often have a different shape than success bodies; this
    /// choice is entirely independent of the success-path parser.
    pub fn error_json<E>(self) -> SendStage<T, E>
    where
        E: DeserializeOwned + 'static,
    {
        self.choose_error(response::json_decoder::<E>())
    }

    /// Discards non-2xx response bodies.
    pub fn error_none(self) -> SendStage<T, ()> {
        self.choose_error(response::unit_decoder())
    }
}

/// Final stage: defaults application, one-off headers, generic options, and
/// the timeout, ending with the terminal [`send`](SendStage::send).
///
/// Nothing touches the network until `send()` is awaited.
pub struct SendStage<T, E> {
    cfg: RequestConfig,
    decoder: Decoder<T>,
    validator: Option<Validator<T>>,
    error_decoder: Decoder<E>,
    error_validator: Option<Validator<E>>,
}

impl<T, E> SendStage<T, E> {
    /// Attaches a predicate validator for the exception-parsed value.
    pub fn validate_error<F>(mut self, predicate: F) -> Self
    where
        F: FnOnce(&E) -> bool + Send + 'static,
    {
        self.error_validator = Some(Validator::Predicate(Box::new(predicate)));
        self
    }

    /// Attaches a fallible validator for the exception-parsed value.
    pub fn try_validate_error<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&E) -> Result<(), BoxError> + Send + 'static,
    {
        self.error_validator = Some(Validator::Fallible(Box::new(check)));
        self
    }

    /// Merges the base URL's default options under this call's options.
    ///
    /// Call-specific values win on collision, regardless of whether the
    /// options were set before or after this method. Applying defaults when
    /// none were registered is a no-op.
    ///
    /// # Panics
    ///
    /// Panics when invoked a second time on the same chain. A silent
    /// duplicate merge and a silent no-op both hide a misuse, so this fails
    /// loudly instead.
    pub fn use_default_options(mut self) -> Self {
        if self.cfg.defaults_applied {
            panic!("use_default_options may only be applied once per call");
        }
        self.cfg.defaults_applied = true;
        self
    }

    /// Prepends the base URL's default header sources to this call's header
    /// sources, so call-specific headers override defaults on key collision.
    ///
    /// # Panics
    ///
    /// Panics when invoked a second time on the same chain, for the same
    /// reason as [`use_default_options`](Self::use_default_options).
    pub fn use_default_headers(mut self) -> Self {
        if self.cfg.default_headers_applied {
            panic!("use_default_headers may only be applied once per call");
        }
        self.cfg.default_headers_applied = true;
        self
    }

    /// Appends a static one-off header.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.cfg.headers.push(HeaderSource::pair(name, value));
        self
    }

    /// Appends an arbitrary header source (static map or generator).
    pub fn header_source(mut self, source: HeaderSource) -> Self {
        self.cfg.headers.push(source);
        self
    }

    /// Appends a synchronous header generator, evaluated once immediately
    /// before the request is dispatched.
    pub fn header_fn<F>(self, f: F) -> Self
    where
        F: Fn() -> Result<Option<HeaderMap>, BoxError> + Send + Sync + 'static,
    {
        self.header_source(HeaderSource::from_fn(f))
    }

    /// Appends an asynchronous header generator, awaited once immediately
    /// before the request is dispatched.
    pub fn header_async_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<HeaderMap>, BoxError>> + Send + 'static,
    {
        self.header_source(HeaderSource::from_async_fn(f))
    }

    /// Sets the generic options record for this call.
    ///
    /// Headers and timeout set through dedicated stage methods always win
    /// over the corresponding option fields.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.cfg.options = options;
        self
    }

    /// Sets the call timeout. If the transport has not settled when it
    /// elapses, the in-flight request is cancelled and the call resolves to
    /// [`crate::Error::Timeout`]. A timer outlived by the call is a no-op.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.cfg.timeout = Some(timeout);
        self
    }

    /// Performs the network call.
    ///
    /// The entire runtime failure surface — transport, timeout, header
    /// generation, decoding, validation — comes back as the `Err` arm of the
    /// returned [`ApiResult`]; nothing on this path panics. Exactly one body
    /// parse happens per call: the success parser for 2xx responses, the
    /// exception parser otherwise.
    pub async fn send(self) -> ApiResult<T, E> {
        let started = Instant::now();
        let method = self.cfg.method.clone();

        let response = crate::execute::dispatch(self.cfg).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let ok = status.is_success();

        // Single read; the decoders below work from this buffer.
        let bytes = response.bytes().await?;
        let latency = started.elapsed();

        tracing::info!(
            method = %method,
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            "Received HTTP response"
        );

        let outcome = if ok {
            let data = (self.decoder)(bytes, status)?;
            if let Some(validator) = self.validator {
                validator.check(&data, status)?;
            }
            Outcome::Success(data)
        } else {
            let data = (self.error_decoder)(bytes, status)?;
            if let Some(validator) = self.error_validator {
                validator.check(&data, status)?;
            }
            Outcome::Failure(data)
        };

        Ok(ApiResponse {
            ok,
            status,
            headers,
            latency,
            outcome,
        })
    }
}
