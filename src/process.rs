//! Document processing entry points.
//!
//! [`OcrClient::process_one`] runs upload → poll → extract → write for a
//! single PDF; [`OcrClient::process_dir`] does the same for every `*.pdf`
//! in a directory, one after another. Nothing is retried at this level: the
//! first error aborts the document and, in batch mode, every document after
//! it.

use crate::config::ClientConfig;
use crate::error::OcrError;
use crate::output::DocumentOutput;
use crate::pipeline::poll::wait_processed;
use crate::pipeline::request::{HttpTransport, Transport};
use crate::pipeline::upload::upload;
use crate::pipeline::write::save_outputs;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Client for the handwriting-OCR API.
///
/// Generic over [`Transport`] so the HTTP layer can be swapped out; the
/// default is the `reqwest`-backed [`HttpTransport`].
///
/// # Example
/// ```rust,no_run
/// use notes_ocr::{ClientConfig, OcrClient};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::builder(std::env::var("HANDWRITING_OCR_TOKEN")?).build()?;
/// let client = OcrClient::new(config)?;
/// let out = client.process_one(Path::new("notes.pdf"), Path::new("out")).await?;
/// println!("{} pages → {}", out.results, out.out_dir.display());
/// # Ok(())
/// # }
/// ```
pub struct OcrClient<T: Transport = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl OcrClient<HttpTransport> {
    /// Build a client over HTTP using `config.request_timeout_secs`.
    pub fn new(config: ClientConfig) -> Result<Self, OcrError> {
        let transport = HttpTransport::new(config.request_timeout_secs)?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> OcrClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Upload one PDF and return the job id.
    pub async fn upload(&self, pdf: &Path) -> Result<String, OcrError> {
        upload(&self.transport, &self.config, pdf).await
    }

    /// Poll a job until it is processed and return the decoded body.
    pub async fn wait_processed(&self, doc_id: &str) -> Result<Value, OcrError> {
        wait_processed(&self.transport, &self.config, doc_id).await
    }

    /// Upload, wait for, and save one PDF under `out_base/<stem>/`.
    ///
    /// Nothing is written unless the job reaches `processed`.
    pub async fn process_one(&self, pdf: &Path, out_base: &Path) -> Result<DocumentOutput, OcrError> {
        let cb = self.config.progress_callback.as_ref();

        info!("Uploading: {}", pdf.display());
        if let Some(cb) = cb {
            cb.on_upload_start(pdf);
        }
        let doc_id = self.upload(pdf).await?;
        if let Some(cb) = cb {
            cb.on_uploaded(pdf, &doc_id);
        }

        let body = self.wait_processed(&doc_id).await?;
        let (paths, pages) = save_outputs(pdf, out_base, &body).await?;

        let output = DocumentOutput {
            pdf: pdf.to_path_buf(),
            doc_id,
            out_dir: paths.dir,
            page_count: body.get("page_count").and_then(Value::as_u64),
            results: pages.len(),
        };
        info!(
            "Saved to {} (page_count={:?} results={})",
            output.out_dir.display(),
            output.page_count,
            output.results
        );
        if let Some(cb) = cb {
            cb.on_saved(pdf, &output);
        }
        Ok(output)
    }

    /// Process every `*.pdf` directly inside `dir`, in file-name order.
    ///
    /// # Errors
    /// [`OcrError::NoPdfsFound`] when the directory has no PDFs; otherwise
    /// the first error from [`Self::process_one`], which stops the batch.
    pub async fn process_dir(&self, dir: &Path, out_base: &Path) -> Result<Vec<DocumentOutput>, OcrError> {
        let pdfs = discover_pdfs(dir)?;
        info!("Found {} PDF(s) in {}", pdfs.len(), dir.display());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_start(dir, pdfs.len());
        }

        let mut outputs = Vec::with_capacity(pdfs.len());
        for pdf in &pdfs {
            outputs.push(self.process_one(pdf, out_base).await?);
        }
        Ok(outputs)
    }
}

/// List `*.pdf` files directly inside `dir`, sorted by file name.
///
/// The match is case-sensitive and non-recursive. Dot-files such as
/// `.draft.pdf` are included, like any other name ending in `.pdf`.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => OcrError::FileNotFound {
            path: dir.to_path_buf(),
        },
        _ => OcrError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source: e,
        },
    })?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| OcrError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(".pdf") || !path.is_file() {
            continue;
        }
        pdfs.push(path);
    }

    if pdfs.is_empty() {
        return Err(OcrError::NoPdfsFound {
            dir: dir.to_path_buf(),
        });
    }
    pdfs.sort();
    debug!("Discovered {:?}", pdfs);
    Ok(pdfs)
}
