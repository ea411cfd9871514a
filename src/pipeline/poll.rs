//! Poll a job until the API reports it as `processed`.
//!
//! Each round is one `GET /documents/{id}` through the 429-aware request
//! layer. HTTP 202 and any job status other than `processed` mean "not yet":
//! sleep `poll_interval` and go again. Any other unsuccessful status ends
//! polling with an error.
//!
//! There is no iteration cap. Without `max_wait` a job that never finishes
//! and never fails keeps this loop running until the process is killed.

use crate::config::ClientConfig;
use crate::error::OcrError;
use crate::pipeline::request::{send_with_retry, ApiRequest, Transport};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Job status that ends polling.
pub const PROCESSED: &str = "processed";

/// The `status` field of a decoded job body, if it is a string.
pub fn job_status(body: &Value) -> Option<&str> {
    body.get("status").and_then(Value::as_str)
}

/// Poll `doc_id` until processed and return the full decoded body.
pub async fn wait_processed<T: Transport>(
    transport: &T,
    config: &ClientConfig,
    doc_id: &str,
) -> Result<Value, OcrError> {
    let url = config.document_url(doc_id);
    let request = ApiRequest::get(url.clone(), config.token.clone());
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let response = send_with_retry(transport, &request, config).await?;

        let status = if response.status == StatusCode::ACCEPTED {
            debug!("Document {} not ready (202), poll {}", doc_id, attempt);
            None
        } else {
            if !response.is_success() {
                return Err(OcrError::Http {
                    status: response.status,
                    url,
                    body: response.body,
                });
            }
            let body: Value = response.json(&url)?;
            let status = job_status(&body).map(str::to_string);
            if status.as_deref() == Some(PROCESSED) {
                info!("Document {} processed after {} poll(s)", doc_id, attempt);
                return Ok(body);
            }
            debug!("Document {} status {:?}, poll {}", doc_id, status, attempt);
            status
        };

        if let Some(ref cb) = config.progress_callback {
            cb.on_poll(doc_id, attempt, status.as_deref());
        }

        if let Some(limit) = config.max_wait {
            let waited = started.elapsed();
            if waited >= limit {
                return Err(OcrError::PollTimeout {
                    doc_id: doc_id.to_string(),
                    waited_secs: waited.as_secs(),
                });
            }
        }

        sleep(config.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::request::testing::ScriptedTransport;
    use crate::pipeline::request::ApiResponse;
    use crate::progress::JobProgressCallback;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn config() -> ClientConfig {
        ClientConfig::builder("tok")
            .base_url("http://api.test")
            .build()
            .unwrap()
    }

    #[derive(Default)]
    struct PollLog(Mutex<Vec<(u32, Option<String>)>>);

    impl JobProgressCallback for PollLog {
        fn on_poll(&self, _doc_id: &str, attempt: u32, status: Option<&str>) {
            self.0
                .lock()
                .unwrap()
                .push((attempt, status.map(str::to_string)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waits_through_202_and_pending_statuses() {
        let log = Arc::new(PollLog::default());
        let config = ClientConfig::builder("tok")
            .base_url("http://api.test")
            .progress_callback(log.clone())
            .build()
            .unwrap();
        let transport = ScriptedTransport::new(vec![
            ApiResponse::new(202, ""),
            ApiResponse::new(200, r#"{"status":"processing"}"#),
            ApiResponse::new(202, ""),
            ApiResponse::new(
                200,
                r#"{"status":"processed","page_count":1,"results":[{"page_number":1,"transcript":"hi"}]}"#,
            ),
        ]);

        let start = Instant::now();
        let body = wait_processed(&transport, &config, "doc-1").await.unwrap();

        assert_eq!(body["page_count"], json!(1));
        assert_eq!(transport.calls(), 4);
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(
            *log.0.lock().unwrap(),
            vec![
                (1, None),
                (2, Some("processing".to_string())),
                (3, None),
            ]
        );

        let requests = transport.requests.lock().unwrap();
        assert!(requests
            .iter()
            .all(|r| r.url == "http://api.test/documents/doc-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_status_field_keeps_polling() {
        let transport = ScriptedTransport::new(vec![
            ApiResponse::new(200, r#"{"results":[]}"#),
            ApiResponse::new(200, r#"{"status":"processed","results":[]}"#),
        ]);
        let body = wait_processed(&transport, &config(), "d").await.unwrap();
        assert_eq!(job_status(&body), Some(PROCESSED));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn error_status_aborts() {
        let transport = ScriptedTransport::new(vec![
            ApiResponse::new(202, ""),
            ApiResponse::new(404, "not found"),
        ]);
        let err = wait_processed(&transport, &config(), "gone").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_inside_poll_is_retried() {
        let transport = ScriptedTransport::new(vec![
            ApiResponse::new(429, "").with_retry_after("2"),
            ApiResponse::new(200, r#"{"status":"processed"}"#),
        ]);
        let body = wait_processed(&transport, &config(), "d").await.unwrap();
        assert_eq!(job_status(&body), Some("processed"));
    }

    #[tokio::test(start_paused = true)]
    async fn max_wait_bounds_polling() {
        let config = ClientConfig::builder("tok")
            .base_url("http://api.test")
            .poll_interval(Duration::from_secs(5))
            .max_wait(Duration::from_secs(12))
            .build()
            .unwrap();
        let transport =
            ScriptedTransport::new((0..10).map(|_| ApiResponse::new(202, "")).collect());

        let err = wait_processed(&transport, &config, "slow").await.unwrap_err();
        match err {
            OcrError::PollTimeout { doc_id, waited_secs } => {
                assert_eq!(doc_id, "slow");
                assert!(waited_secs >= 12);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Polls at t = 0, 5, 10, 15; the fourth sees 15 s ≥ 12 s.
        assert_eq!(transport.calls(), 4);
    }
}
