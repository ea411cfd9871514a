//! HTTP request layer: one call, retried while the API rate-limits us.
//!
//! ## Retry Strategy
//!
//! Only HTTP 429 is treated as transient. The loop makes at most
//! `max_attempts` calls; between them it sleeps for the `Retry-After`
//! header (seconds, fractional allowed) or `default_retry_after` when the
//! header is missing or not a number. Any other status, success or not, is
//! returned on the spot. If the final attempt is still 429 that response is
//! returned as-is and the caller's status check turns it into an error.
//!
//! Network failures are not retried.

use crate::config::ClientConfig;
use crate::error::OcrError;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// A file plus text fields sent as `multipart/form-data`.
#[derive(Clone)]
pub struct MultipartUpload {
    pub file_field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub fields: Vec<(String, String)>,
}

#[derive(Clone)]
pub enum RequestBody {
    Empty,
    Multipart(MultipartUpload),
}

/// A request the transport can replay verbatim on every attempt.
#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub token: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            token: token.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn multipart(
        url: impl Into<String>,
        token: impl Into<String>,
        upload: MultipartUpload,
    ) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            token: token.into(),
            body: RequestBody::Multipart(upload),
        }
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.body {
            RequestBody::Empty => "empty".to_string(),
            RequestBody::Multipart(m) => {
                format!("multipart({}: {} bytes)", m.file_name, m.bytes.len())
            }
        };
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("body", &body)
            .finish()
    }
}

/// What the request layer needs from a response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub retry_after: Option<String>,
    pub body: String,
}

impl ApiResponse {
    /// Build a response by hand; invalid codes become 500.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self, url: &str) -> Result<T, OcrError> {
        serde_json::from_str(&self.body).map_err(|e| OcrError::InvalidResponse {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }
}

/// Anything that can perform one HTTP exchange.
///
/// [`HttpTransport`] is the real implementation; tests script responses.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, OcrError>> + Send;
}

/// `reqwest`-backed transport with bearer auth and a fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| OcrError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }

    fn map_send_error(&self, url: &str, e: reqwest::Error) -> OcrError {
        if e.is_timeout() {
            OcrError::RequestTimeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            OcrError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, OcrError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .bearer_auth(&request.token)
            .header(ACCEPT, "application/json");

        if let RequestBody::Multipart(upload) = &request.body {
            // Form is consumed by send(), so it is rebuilt for every attempt.
            let part = Part::bytes(upload.bytes.clone())
                .file_name(upload.file_name.clone())
                .mime_str(&upload.mime)
                .map_err(|e| OcrError::Internal(format!("Invalid MIME type: {e}")))?;
            let mut form = Form::new().part(upload.file_field.clone(), part);
            for (name, value) in &upload.fields {
                form = form.text(name.clone(), value.clone());
            }
            builder = builder.multipart(form);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(&request.url, e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(&request.url, e))?;

        Ok(ApiResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Interpret a `Retry-After` value as a delay in seconds.
pub fn parse_retry_after(value: Option<&str>, default: Duration) -> Duration {
    let Some(raw) = value else {
        return default;
    };
    match raw.trim().parse::<f64>() {
        Ok(secs) if secs >= 0.0 => match Duration::try_from_secs_f64(secs) {
            Ok(delay) => delay,
            Err(_) => {
                warn!("Ignoring out-of-range Retry-After {:?}, waiting {:?}", raw, default);
                default
            }
        },
        _ => {
            warn!("Ignoring unusable Retry-After {:?}, waiting {:?}", raw, default);
            default
        }
    }
}

/// Send `request`, sleeping and retrying while the API answers 429.
pub async fn send_with_retry<T: Transport>(
    transport: &T,
    request: &ApiRequest,
    config: &ClientConfig,
) -> Result<ApiResponse, OcrError> {
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        debug!("{} {} (attempt {})", request.method, request.url, attempt);
        let response = transport.send(request).await?;
        if response.status != StatusCode::TOO_MANY_REQUESTS || attempt >= max_attempts {
            return Ok(response);
        }

        let delay = parse_retry_after(response.retry_after.as_deref(), config.default_retry_after);
        warn!(
            "Rate limited on {} (attempt {}/{}), retrying in {:?}",
            request.url, attempt, max_attempts, delay
        );
        sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport that replays canned responses and records every request.
    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<ApiResponse, OcrError>>>,
        pub requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub fn new(responses: Vec<ApiResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(Ok).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn push_err(&self, err: OcrError) {
            self.responses.lock().unwrap().push_back(Err(err));
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, OcrError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(OcrError::Internal("script exhausted".into())))
        }
    }
}
