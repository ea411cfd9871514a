//! # notes-ocr
//!
//! Send scanned, handwritten PDF notes to the handwritingocr.com API and
//! save the transcripts locally.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Upload   multipart POST /documents (action=transcribe) → job id
//!  ├─ 2. Poll     GET /documents/{id} until status == "processed"
//!  ├─ 3. Extract  results[] → page number → transcript
//!  └─ 4. Write    <out>/<stem>/<stem>.raw.json, .pages.json, .txt
//! ```
//!
//! Every request goes through one helper that retries HTTP 429 (honouring
//! `Retry-After`) up to eight attempts. Documents are processed strictly one
//! at a time, and the first error stops the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notes_ocr::{ClientConfig, OcrClient};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder("your-api-token").build()?;
//!     let client = OcrClient::new(config)?;
//!     for doc in client.process_dir(Path::new("./data"), Path::new("./out")).await? {
//!         println!("{} → {} pages", doc.pdf.display(), doc.results);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `notes2text` binary (clap + anyhow + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use error::OcrError;
pub use output::{ArtifactPaths, DocumentOutput, PageMap};
pub use pipeline::extract::{extract_pages, merge_pages};
pub use pipeline::request::{ApiRequest, ApiResponse, HttpTransport, RequestBody, Transport};
pub use pipeline::write::save_outputs;
pub use process::{discover_pdfs, OcrClient};
pub use progress::{JobProgressCallback, NoopProgressCallback, ProgressCallback};
