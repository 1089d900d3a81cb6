//! The request executor: turns a staged [`RequestConfig`] into one network
//! call.
//!
//! Responsibilities, in order: assemble the final URL (inline path query
//! first, dedicated query pairs appended, no dedup), resolve the effective
//! options (call over defaults, only when the call opted in), resolve header
//! sources (generic options map first, then default sources if applied, then
//! call-specific sources — later wins), attach the body, and dispatch with
//! an optional timeout race. Method, resolved headers, and body are assigned
//! last and can never be overridden by the options merge.

use crate::config::{BodySlot, RequestConfig};
use crate::error::Error;
use crate::header;
use http::header::CONTENT_TYPE;
use http::HeaderValue;
use std::sync::OnceLock;
use url::Url;

/// The shared transport client. Connection pooling and TLS live here and are
/// reqwest's concern, not ours.
fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

/// Appends the dedicated query pairs after any query string already embedded
/// in the path. Duplicate keys are kept; the transport's semantics govern
/// how the server interprets them.
pub(crate) fn final_url(cfg: &RequestConfig) -> Url {
    let mut url = cfg.url.clone();
    if !cfg.query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(cfg.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    url
}

/// Performs the network call described by `cfg` and returns the raw
/// response. Transport-level failures propagate for the caller's result
/// handling; a configured timeout cancels the in-flight call by dropping it.
pub(crate) async fn dispatch(mut cfg: RequestConfig) -> Result<reqwest::Response, Error> {
    let url = final_url(&cfg);

    let options = if cfg.defaults_applied {
        cfg.options.clone().merge_over(&cfg.default_options)
    } else {
        cfg.options.clone()
    };

    // The dedicated timeout stage wins over the generic options field.
    let timeout = cfg.timeout.or(options.timeout);

    // Layer 1: the wholesale header map from the generic options path.
    let mut headers = options.headers.unwrap_or_default();

    // Layer 2: the content type declared by the body stage.
    let body = std::mem::replace(&mut cfg.body, BodySlot::None);
    let (payload, content_type): (Option<reqwest::Body>, Option<HeaderValue>) = match body {
        BodySlot::None => (None, None),
        BodySlot::Json(value) => (
            Some(value.to_string().into()),
            Some(HeaderValue::from_static("application/json")),
        ),
        BodySlot::Raw { bytes, content_type } => (Some(bytes.into()), content_type),
        BodySlot::Invalid(e) => return Err(Error::BodySerialization(e)),
    };
    if let Some(content_type) = content_type {
        headers.insert(CONTENT_TYPE, content_type);
    }

    // Layer 3: header sources, defaults first when applied, then
    // call-specific. Resolved lazily here, exactly once per call; a failing
    // generator aborts before anything touches the network.
    if cfg.default_headers_applied {
        header::resolve_into(&cfg.default_headers, &mut headers).await?;
    }
    header::resolve_into(&cfg.headers, &mut headers).await?;

    tracing::debug!(
        method = %cfg.method,
        url = %url,
        timeout_ms = timeout.map(|t| t.as_millis() as u64),
        "Dispatching HTTP request"
    );

    let mut request = http_client().request(cfg.method.clone(), url).headers(headers);
    if let Some(version) = options.version {
        request = request.version(version);
    }
    if let Some(payload) = payload {
        request = request.body(payload);
    }

    let response = match timeout {
        Some(duration) => match tokio::time::timeout(duration, request.send()).await {
            Ok(settled) => settled?,
            Err(_elapsed) => {
                // The future is dropped, cancelling the in-flight request.
                tracing::warn!(
                    method = %cfg.method,
                    timeout_ms = duration.as_millis() as u64,
                    "Request timed out"
                );
                return Err(Error::Timeout { duration });
            }
        },
        None => request.send().await?,
    };

    Ok(response)
}
