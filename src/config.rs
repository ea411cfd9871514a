//! Configuration for talking to the handwriting-OCR API.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via
//! its [`ClientConfigBuilder`]. The bearer token lives here and is passed
//! explicitly down every call chain; nothing in the library reads the
//! environment.

use crate::error::OcrError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::time::Duration;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://www.handwritingocr.com/api/v3";

/// Configuration for an OCR client.
///
/// Built via [`ClientConfig::builder()`].
///
/// # Example
/// ```rust
/// use notes_ocr::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder("my-token")
///     .poll_interval(Duration::from_secs(2))
///     .max_wait(Duration::from_secs(900))
///     .build()
///     .unwrap();
/// assert_eq!(config.max_attempts, 8);
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// API root, without trailing slash. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Bearer token sent on every request.
    pub token: String,

    /// Per-request timeout in seconds. Default: 60.
    pub request_timeout_secs: u64,

    /// Total attempts per request while the API answers 429. Default: 8.
    ///
    /// When the last attempt is still rate limited the 429 response is
    /// handed back to the caller, which treats it as an HTTP error.
    pub max_attempts: u32,

    /// Back-off used when a 429 carries no usable `Retry-After`. Default: 1 s.
    pub default_retry_after: Duration,

    /// Sleep between job status polls. Default: 1 s.
    pub poll_interval: Duration,

    /// Upper bound on total polling time. Default: `None` (poll forever).
    ///
    /// A job that never reaches `processed` and never errors keeps the
    /// poller spinning indefinitely unless this is set.
    pub max_wait: Option<Duration>,

    /// Value of the `action` form field sent with the upload. Default: `transcribe`.
    pub action: String,

    /// Optional sink for per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .field("default_retry_after", &self.default_retry_after)
            .field("poll_interval", &self.poll_interval)
            .field("max_wait", &self.max_wait)
            .field("action", &self.action)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn JobProgressCallback>"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig` with the given bearer token.
    pub fn builder(token: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: ClientConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                token: token.into(),
                request_timeout_secs: 60,
                max_attempts: 8,
                default_retry_after: Duration::from_secs(1),
                poll_interval: Duration::from_secs(1),
                max_wait: None,
                action: "transcribe".to_string(),
                progress_callback: None,
            },
        }
    }

    /// `POST` target for new documents.
    pub fn documents_url(&self) -> String {
        format!("{}/documents", self.base_url)
    }

    /// `GET` target for one document's status and results.
    pub fn document_url(&self, doc_id: &str) -> String {
        format!("{}/documents/{}", self.base_url, doc_id)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn default_retry_after(mut self, delay: Duration) -> Self {
        self.config.default_retry_after = delay;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn max_wait(mut self, limit: Duration) -> Self {
        self.config.max_wait = Some(limit);
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.config.action = action.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ClientConfig, OcrError> {
        self.config.token = self.config.token.trim().to_string();
        let c = &self.config;
        if c.token.is_empty() {
            return Err(OcrError::InvalidConfig("bearer token is empty".into()));
        }
        if c.base_url.is_empty() {
            return Err(OcrError::InvalidConfig("base URL is empty".into()));
        }
        if c.max_attempts == 0 {
            return Err(OcrError::InvalidConfig("max attempts must be ≥ 1".into()));
        }
        if c.request_timeout_secs == 0 {
            return Err(OcrError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ClientConfig::builder("tok").build().unwrap();
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.request_timeout_secs, 60);
        assert_eq!(c.max_attempts, 8);
        assert_eq!(c.default_retry_after, Duration::from_secs(1));
        assert_eq!(c.poll_interval, Duration::from_secs(1));
        assert!(c.max_wait.is_none());
        assert_eq!(c.action, "transcribe");
    }

    #[test]
    fn token_is_trimmed_and_required() {
        let c = ClientConfig::builder("  abc \n").build().unwrap();
        assert_eq!(c.token, "abc");

        let err = ClientConfig::builder("   ").build().unwrap_err();
        assert!(matches!(err, OcrError::InvalidConfig(_)));
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = ClientConfig::builder("t").max_attempts(0).build().unwrap_err();
        assert!(err.to_string().contains("max attempts"));
    }

    #[test]
    fn urls_are_built_from_base() {
        let c = ClientConfig::builder("t")
            .base_url("http://localhost:9000/api/v3/")
            .build()
            .unwrap();
        assert_eq!(c.documents_url(), "http://localhost:9000/api/v3/documents");
        assert_eq!(
            c.document_url("abc123"),
            "http://localhost:9000/api/v3/documents/abc123"
        );
    }

    #[test]
    fn debug_redacts_token() {
        let c = ClientConfig::builder("super-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
