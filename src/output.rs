//! Output types produced by document processing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Page number → transcript text, iterated in ascending page order.
pub type PageMap = BTreeMap<u32, String>;

/// Summary of one processed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutput {
    /// The input PDF.
    pub pdf: PathBuf,
    /// Job identifier assigned by the API at upload time.
    pub doc_id: String,
    /// Directory holding the three artifacts, `<out>/<stem>/`.
    pub out_dir: PathBuf,
    /// `page_count` reported by the API, if any.
    pub page_count: Option<u64>,
    /// Number of pages in the extracted page mapping.
    pub results: usize,
}

/// Artifact paths written for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub raw_json: PathBuf,
    pub pages_json: PathBuf,
    pub text: PathBuf,
}

impl ArtifactPaths {
    /// Lay out `<out_base>/<stem>/<stem>.{raw.json,pages.json,txt}`.
    pub fn new(out_base: &std::path::Path, stem: &str) -> Self {
        let dir = out_base.join(stem);
        Self {
            raw_json: dir.join(format!("{stem}.raw.json")),
            pages_json: dir.join(format!("{stem}.pages.json")),
            text: dir.join(format!("{stem}.txt")),
            dir,
        }
    }
}
