//! The per-call configuration record threaded through builder stages.
//!
//! Each stage owns the [`RequestConfig`] by value and moves it into the next
//! stage. That ownership transfer is the whole consistency story: there is no
//! shared mutable record behind the stages, so state configured for one call
//! can never leak into another, and a chain is single-use by construction.

use crate::header::HeaderSource;
use crate::options::RequestOptions;
use bytes::Bytes;
use http::{HeaderValue, Method};
use std::time::Duration;
use url::Url;

/// The request body slot.
///
/// `Invalid` holds a serialization failure from the body stage; it is
/// surfaced as an error from `send()` rather than panicking mid-chain, so
/// the builder methods stay infallible.
pub(crate) enum BodySlot {
    None,
    Json(serde_json::Value),
    Raw {
        bytes: Bytes,
        content_type: Option<HeaderValue>,
    },
    Invalid(serde_json::Error),
}

/// Everything a single call needs, accumulated by the stages.
pub(crate) struct RequestConfig {
    /// Fixed at chain entry, never overridable afterwards.
    pub(crate) method: Method,
    /// Base URL and path, already concatenated and parsed. May carry an
    /// inline query string from the path stage.
    pub(crate) url: Url,
    /// Dedicated query pairs, appended after any inline query. Order is
    /// preserved and duplicate keys are kept.
    pub(crate) query: Vec<(String, String)>,
    /// Defaults inherited from the base-URL registry entry. Inert until the
    /// call applies them explicitly.
    pub(crate) default_options: RequestOptions,
    pub(crate) default_headers: Vec<HeaderSource>,
    /// Call-specific configuration.
    pub(crate) options: RequestOptions,
    pub(crate) headers: Vec<HeaderSource>,
    pub(crate) body: BodySlot,
    pub(crate) timeout: Option<Duration>,
    /// Once-only latches for the defaults-application methods.
    pub(crate) defaults_applied: bool,
    pub(crate) default_headers_applied: bool,
}

impl RequestConfig {
    pub(crate) fn new(
        method: Method,
        url: Url,
        default_options: RequestOptions,
        default_headers: Vec<HeaderSource>,
    ) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            default_options,
            default_headers,
            options: RequestOptions::default(),
            headers: Vec::new(),
            body: BodySlot::None,
            timeout: None,
            defaults_applied: false,
            default_headers_applied: false,
        }
    }
}
