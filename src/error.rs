//! Error type for the notes-ocr library.
//!
//! Every failure in this crate is fatal for the run that hit it: an upload
//! that is refused, a status poll that errors, or an artifact that cannot be
//! written aborts the current document and, in batch mode, the remaining
//! documents too. Rate limiting (HTTP 429) and "still processing" (HTTP 202
//! or a non-final job status) are handled inside the pipeline and never
//! surface here unless the retry budget runs out.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the notes-ocr library.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file or directory was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The path cannot be used as an input document (e.g. no file name).
    #[error("Invalid input '{path}': {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    /// Batch directory could not be listed.
    #[error("Failed to read directory '{path}': {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Batch directory contains no `*.pdf` files.
    #[error("No PDFs found in: {}", .dir.display())]
    NoPdfsFound { dir: PathBuf },

    // ── API errors ────────────────────────────────────────────────────────
    /// Upload was rejected with 401/403; retrying will not help.
    #[error("Upload failed ({status}): {body}")]
    AuthFailed { status: StatusCode, body: String },

    /// Any other unsuccessful status from the API.
    #[error("HTTP {status} from '{url}': {body}")]
    Http {
        status: StatusCode,
        url: String,
        body: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset…).
    #[error("Request to '{url}' failed: {reason}")]
    RequestFailed { url: String, reason: String },

    /// The request exceeded the configured timeout.
    #[error("Request to '{url}' timed out after {secs}s")]
    RequestTimeout { url: String, secs: u64 },

    /// A successful response carried a body we could not interpret.
    #[error("Unexpected response from '{url}': {detail}")]
    InvalidResponse { url: String, detail: String },

    /// Polling gave up because the configured maximum wait elapsed.
    #[error("Document {doc_id} was not processed within {waited_secs}s\nIncrease --max-wait or omit it to wait indefinitely.")]
    PollTimeout { doc_id: String, waited_secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// HTTP status carried by the error, if it came from an API response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            OcrError::AuthFailed { status, .. } | OcrError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
