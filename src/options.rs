//! Per-request options with shallow merge semantics.

use http::{HeaderMap, Version};
use std::time::Duration;

/// A per-request options record, covering everything a call can configure
/// outside the dedicated method/header/body stages.
///
/// Options merge is shallow: when call-specific options are merged over
/// defaults, a field that is `Some` on the call side wins wholesale. In
/// particular, a `headers` map passed through this generic path replaces the
/// default header map entirely — it is never deep-merged. Headers that should
/// layer key-by-key belong in the dedicated header stage instead.
///
/// # Examples
///
/// ```
/// use basecall::RequestOptions;
/// use std::time::Duration;
///
/// let options = RequestOptions::new()
///     .timeout(Duration::from_secs(5))
///     .version(http::Version::HTTP_11);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// A wholesale header map. Overridden entry-by-entry by the dedicated
    /// header stage, which always wins.
    pub headers: Option<HeaderMap>,

    /// Request timeout. The dedicated `timeout()` stage method wins over
    /// this field when both are set.
    pub timeout: Option<Duration>,

    /// Preferred HTTP version for the request.
    pub version: Option<Version>,
}

impl RequestOptions {
    /// Creates an empty options record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wholesale header map.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the preferred HTTP version.
    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Merges these (call-specific) options over `defaults`.
    ///
    /// Field-wise and shallow: a `Some` on the call side stands, defaults
    /// fill only the `None` fields. Merging over empty defaults is a no-op.
    pub(crate) fn merge_over(self, defaults: &RequestOptions) -> Self {
        Self {
            headers: self.headers.or_else(|| defaults.headers.clone()),
            timeout: self.timeout.or(defaults.timeout),
            version: self.version.or(defaults.version),
        }
    }
}
