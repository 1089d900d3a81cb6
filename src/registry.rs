//! Process-wide named base-URL registry.
//!
//! Base URLs are registered once during application startup under a string
//! identifier, optionally with default options and default header sources
//! that chains starting from that identifier can opt into. At most one
//! identifier can be marked as the process default.
//!
//! All misuse here — duplicate registration, unknown identifiers, using the
//! default before one is set — panics. The registry is wired up once at
//! startup; a mistake in that wiring is a programming error, not a per-call
//! condition.
//!
//! # Examples
//!
//! ```
//! use basecall::{HeaderSource, RequestOptions};
//!
//! basecall::register("httpbin", "https://httpbin.org");
//!
//! basecall::register_with(
//!     "internal",
//!     "https://internal.example.com",
//!     RequestOptions::new().timeout(std::time::Duration::from_secs(10)),
//!     vec![HeaderSource::pair("x-api-key", "secret")],
//! );
//!
//! basecall::set_default("httpbin");
//! ```

use crate::header::HeaderSource;
use crate::options::RequestOptions;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};
use url::Url;

/// A registered base URL with its call defaults.
#[derive(Clone)]
pub(crate) struct BaseUrl {
    /// The base URL exactly as registered. Paths are appended to it
    /// textually, so a trailing slash here is meaningful.
    pub(crate) url: String,
    pub(crate) options: RequestOptions,
    pub(crate) headers: Vec<HeaderSource>,
}

#[derive(Default)]
struct Registry {
    entries: HashMap<String, BaseUrl>,
    default_id: Option<String>,
}

fn registry() -> &'static RwLock<Registry> {
    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(Default::default)
}

/// Registers a base URL under `id` with no call defaults.
///
/// # Panics
///
/// Panics if `id` is already registered or `url` is not a valid URL.
pub fn register(id: impl Into<String>, url: impl Into<String>) {
    register_with(id, url, RequestOptions::default(), Vec::new());
}

/// Registers a base URL under `id` together with default options and default
/// header sources.
///
/// The defaults are inherited by every chain that starts from this
/// identifier, but only take effect when the call explicitly applies them
/// via `use_default_options()` / `use_default_headers()`.
///
/// # Panics
///
/// Panics if `id` is already registered or `url` is not a valid URL.
/// Duplicate registration fails before any network activity can occur.
pub fn register_with(
    id: impl Into<String>,
    url: impl Into<String>,
    options: RequestOptions,
    headers: Vec<HeaderSource>,
) {
    let id = id.into();
    let url = url.into();
    if let Err(e) = Url::parse(&url) {
        panic!("base URL `{url}` for identifier `{id}` is not a valid URL: {e}");
    }

    let mut registry = registry().write().expect("base URL registry lock poisoned");
    if registry.entries.contains_key(&id) {
        panic!("base URL identifier `{id}` is already registered");
    }
    registry.entries.insert(id, BaseUrl { url, options, headers });
}

/// Marks `id` as the process-default base URL, used by `use_default()`.
///
/// # Panics
///
/// Panics if `id` is not registered.
pub fn set_default(id: impl AsRef<str>) {
    let id = id.as_ref();
    let mut registry = registry().write().expect("base URL registry lock poisoned");
    if !registry.entries.contains_key(id) {
        panic!("cannot set default: base URL identifier `{id}` is not registered");
    }
    registry.default_id = Some(id.to_string());
}

/// Looks up a registered entry. Panics if `id` is unknown.
pub(crate) fn lookup(id: &str) -> BaseUrl {
    let registry = registry().read().expect("base URL registry lock poisoned");
    registry
        .entries
        .get(id)
        .cloned()
        .unwrap_or_else(|| panic!("base URL identifier `{id}` is not registered"))
}

/// Returns the default entry. Panics if no default has been set.
pub(crate) fn default_entry() -> BaseUrl {
    let registry = registry().read().expect("base URL registry lock poisoned");
    let id = registry
        .default_id
        .as_deref()
        .unwrap_or_else(|| panic!("no default base URL has been set; call set_default() first"));
    registry
        .entries
        .get(id)
        .cloned()
        .expect("default identifier refers to a registered entry")
}
