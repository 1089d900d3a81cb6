//! Header sources: static maps and lazy (possibly async) generators.
//!
//! A [`HeaderSource`] describes where a batch of headers comes from without
//! producing them eagerly. Sources are resolved in declaration order
//! immediately before the network call; a later source overrides an earlier
//! one on key collision. A generator that fails aborts the whole resolution
//! step with [`Error::HeaderGeneration`], keeping header-logic failures
//! distinguishable from transport failures.

use crate::error::{BoxError, Error};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type HeaderFuture = Pin<Box<dyn Future<Output = Result<Option<HeaderMap>, BoxError>> + Send>>;

/// A source of request headers, resolved lazily before the call.
///
/// Three shapes are supported: a static header map, a synchronous generator,
/// and an asynchronous generator. Generators may return `Ok(None)` to
/// contribute nothing for this call (useful for conditionally attached
/// credentials).
///
/// # Examples
///
/// ```
/// use basecall::HeaderSource;
///
/// // Static key/value pair.
/// let api_key = HeaderSource::pair("x-api-key", "secret");
///
/// // Computed at call time, once per call.
/// let trace = HeaderSource::from_fn(|| {
///     let mut headers = http::HeaderMap::new();
///     headers.insert("x-trace-id", "abc123".parse().unwrap());
///     Ok(Some(headers))
/// });
/// ```
#[derive(Clone)]
pub struct HeaderSource(pub(crate) Source);

#[derive(Clone)]
pub(crate) enum Source {
    Static(HeaderMap),
    Sync(Arc<dyn Fn() -> Result<Option<HeaderMap>, BoxError> + Send + Sync>),
    Async(Arc<dyn Fn() -> HeaderFuture + Send + Sync>),
}

impl HeaderSource {
    /// Creates a static source from a single name/value pair.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid. Attaching a malformed
    /// header is a wiring mistake, caught at configuration time.
    pub fn pair(name: &str, value: &str) -> Self {
        let name = HeaderName::try_from(name)
            .unwrap_or_else(|e| panic!("`{name}` is not a valid header name: {e}"));
        let value = HeaderValue::try_from(value)
            .unwrap_or_else(|e| panic!("header `{name}` has an invalid value: {e}"));
        let mut map = HeaderMap::new();
        map.insert(name, value);
        Self(Source::Static(map))
    }

    /// Creates a static source from a full header map.
    pub fn from_map(map: HeaderMap) -> Self {
        Self(Source::Static(map))
    }

    /// Creates a source backed by a synchronous generator.
    ///
    /// The generator runs once per call, immediately before the request is
    /// dispatched. Returning `Ok(None)` contributes no headers; returning
    /// `Err` fails the call with [`Error::HeaderGeneration`].
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Result<Option<HeaderMap>, BoxError> + Send + Sync + 'static,
    {
        Self(Source::Sync(Arc::new(f)))
    }

    /// Creates a source backed by an asynchronous generator.
    ///
    /// Useful for headers that require I/O to produce, such as tokens fetched
    /// from a credential store.
    ///
    /// # Examples
    ///
    /// ```
    /// use basecall::HeaderSource;
    ///
    /// let auth = HeaderSource::from_async_fn(|| async {
    ///     let token = "token-from-somewhere";
    ///     let mut headers = http::HeaderMap::new();
    ///     headers.insert("authorization", format!("Bearer {token}").parse()?);
    ///     Ok(Some(headers))
    /// });
    /// ```
    pub fn from_async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<HeaderMap>, BoxError>> + Send + 'static,
    {
        Self(Source::Async(Arc::new(move || Box::pin(f()))))
    }
}

impl From<HeaderMap> for HeaderSource {
    fn from(map: HeaderMap) -> Self {
        Self::from_map(map)
    }
}

impl fmt::Debug for HeaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Source::Static(map) => f.debug_tuple("HeaderSource::Static").field(map).finish(),
            Source::Sync(_) => f.write_str("HeaderSource::Sync(..)"),
            Source::Async(_) => f.write_str("HeaderSource::Async(..)"),
        }
    }
}

/// Resolves a list of header sources into `headers`, in declaration order.
///
/// Each produced map is layered over the accumulator with `insert`, so a
/// later source wins on key collision.
pub(crate) async fn resolve_into(
    sources: &[HeaderSource],
    headers: &mut HeaderMap,
) -> Result<(), Error> {
    for source in sources {
        let produced = match &source.0 {
            Source::Static(map) => Some(map.clone()),
            Source::Sync(f) => f().map_err(|source| Error::HeaderGeneration { source })?,
            Source::Async(f) => f().await.map_err(|source| Error::HeaderGeneration { source })?,
        };
        if let Some(map) = produced {
            for (name, value) in &map {
                headers.insert(name, value.clone());
            }
        }
    }
    Ok(())
}
