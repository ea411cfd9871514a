//! Upload: submit a PDF as a new transcription job.

use crate::config::ClientConfig;
use crate::error::OcrError;
use crate::pipeline::request::{send_with_retry, ApiRequest, MultipartUpload, Transport};
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct CreatedDocument {
    id: String,
}

/// Read the PDF, distinguishing "missing" from "unreadable".
async fn read_pdf(pdf: &Path) -> Result<Vec<u8>, OcrError> {
    tokio::fs::read(pdf).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => OcrError::FileNotFound {
            path: pdf.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => OcrError::PermissionDenied {
            path: pdf.to_path_buf(),
        },
        _ => OcrError::InvalidInput {
            path: pdf.to_path_buf(),
            reason: e.to_string(),
        },
    })
}

/// Upload `pdf` to `POST /documents` and return the job id.
///
/// # Errors
/// - [`OcrError::AuthFailed`] on 401/403
/// - [`OcrError::Http`] on any other unsuccessful status (including a 429
///   that outlived the retry budget)
/// - [`OcrError::InvalidResponse`] when a successful body has no string `id`
pub async fn upload<T: Transport>(
    transport: &T,
    config: &ClientConfig,
    pdf: &Path,
) -> Result<String, OcrError> {
    let file_name = pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| OcrError::InvalidInput {
            path: pdf.to_path_buf(),
            reason: "path has no file name".into(),
        })?;
    let bytes = read_pdf(pdf).await?;
    debug!("Uploading {} ({} bytes)", file_name, bytes.len());

    let url = config.documents_url();
    let request = ApiRequest::multipart(
        url.clone(),
        config.token.clone(),
        MultipartUpload {
            file_field: "file".into(),
            file_name,
            mime: "application/pdf".into(),
            bytes,
            fields: vec![("action".into(), config.action.clone())],
        },
    );

    let response = send_with_retry(transport, &request, config).await?;

    if response.status == StatusCode::UNAUTHORIZED || response.status == StatusCode::FORBIDDEN {
        return Err(OcrError::AuthFailed {
            status: response.status,
            body: response.body,
        });
    }
    if !response.is_success() {
        return Err(OcrError::Http {
            status: response.status,
            url,
            body: response.body,
        });
    }

    let created: CreatedDocument = response.json(&url)?;
    info!("Created document {} for {}", created.id, pdf.display());
    Ok(created.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::request::testing::ScriptedTransport;
    use crate::pipeline::request::{ApiResponse, RequestBody};
    use reqwest::Method;

    fn config() -> ClientConfig {
        ClientConfig::builder("tok")
            .base_url("http://api.test/v3")
            .build()
            .unwrap()
    }

    fn sample_pdf(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("week1.pdf");
        std::fs::write(&path, b"%PDF-1.4 fake").unwrap();
        path
    }

    #[tokio::test]
    async fn returns_id_and_sends_multipart() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = sample_pdf(&dir);
        let transport =
            ScriptedTransport::new(vec![ApiResponse::new(201, r#"{"id":"doc-42","status":"new"}"#)]);

        let id = upload(&transport, &config(), &pdf).await.unwrap();
        assert_eq!(id, "doc-42");

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url, "http://api.test/v3/documents");
        assert_eq!(req.token, "tok");
        match &req.body {
            RequestBody::Multipart(m) => {
                assert_eq!(m.file_field, "file");
                assert_eq!(m.file_name, "week1.pdf");
                assert_eq!(m.bytes, b"%PDF-1.4 fake");
                assert_eq!(m.fields, vec![("action".to_string(), "transcribe".to_string())]);
            }
            RequestBody::Empty => panic!("expected multipart body"),
        }
    }

    #[tokio::test]
    async fn forbidden_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = sample_pdf(&dir);
        let transport = ScriptedTransport::new(vec![ApiResponse::new(403, "no credits")]);

        let err = upload(&transport, &config(), &pdf).await.unwrap_err();
        match err {
            OcrError::AuthFailed { status, body } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(body, "no credits");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = sample_pdf(&dir);
        let transport = ScriptedTransport::new(vec![ApiResponse::new(401, "bad token")]);

        let err = upload(&transport, &config(), &pdf).await.unwrap_err();
        assert!(matches!(err, OcrError::AuthFailed { .. }));
    }

    #[tokio::test]
    async fn server_error_is_http_error() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = sample_pdf(&dir);
        let transport = ScriptedTransport::new(vec![ApiResponse::new(422, "unsupported file")]);

        let err = upload(&transport, &config(), &pdf).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(matches!(err, OcrError::Http { .. }));
    }

    #[tokio::test]
    async fn missing_id_is_invalid_response() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = sample_pdf(&dir);
        let transport = ScriptedTransport::new(vec![ApiResponse::new(200, r#"{"status":"new"}"#)]);

        let err = upload(&transport, &config(), &pdf).await.unwrap_err();
        assert!(matches!(err, OcrError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn missing_file_never_hits_the_api() {
        let transport = ScriptedTransport::default();
        let err = upload(&transport, &config(), Path::new("/nope/absent.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::FileNotFound { .. }));
        assert_eq!(transport.calls(), 0);
    }
}
