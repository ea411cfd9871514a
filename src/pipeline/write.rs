//! Persist the three per-document artifacts.
//!
//! Every file goes to a sibling `.tmp` path first and is renamed into
//! place, so an interrupted run leaves the previous artifact (or nothing)
//! rather than a truncated one. Reruns overwrite.

use crate::error::OcrError;
use crate::output::{ArtifactPaths, PageMap};
use crate::pipeline::extract::{extract_pages, merge_pages};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The PDF's file name without extension.
pub fn pdf_stem(pdf: &Path) -> Result<String, OcrError> {
    pdf.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| OcrError::InvalidInput {
            path: pdf.to_path_buf(),
            reason: "path has no file stem".into(),
        })
}

/// Write `contents` to `path` via a temp file + rename.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), OcrError> {
    let fail = |source: std::io::Error| OcrError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents).await.map_err(fail)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(fail)?;
    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

fn to_pretty_json<T: Serialize>(value: &T, path: &Path) -> Result<String, OcrError> {
    // serde_json writes UTF-8 literally and indents with two spaces.
    serde_json::to_string_pretty(value).map_err(|e| OcrError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}

/// Write raw JSON, page JSON and merged text for `pdf` under `out_base`.
///
/// Returns the page mapping that was written alongside the paths, so the
/// caller doesn't have to extract it a second time.
pub async fn save_outputs(
    pdf: &Path,
    out_base: &Path,
    body: &Value,
) -> Result<(ArtifactPaths, PageMap), OcrError> {
    let stem = pdf_stem(pdf)?;
    let paths = ArtifactPaths::new(out_base, &stem);

    tokio::fs::create_dir_all(&paths.dir)
        .await
        .map_err(|e| OcrError::OutputWriteFailed {
            path: paths.dir.clone(),
            source: e,
        })?;

    write_atomic(&paths.raw_json, &to_pretty_json(body, &paths.raw_json)?).await?;

    let pages = extract_pages(body);
    write_atomic(&paths.pages_json, &to_pretty_json(&pages, &paths.pages_json)?).await?;

    write_atomic(&paths.text, &merge_pages(&pages)).await?;

    Ok((paths, pages))
}
