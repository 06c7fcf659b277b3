//! Persistence: serialize the aggregated record to a JSON document.
//!
//! The output is the hand-off artifact to the downstream generation agents,
//! so the format is part of the contract: two-space indentation, key order
//! following struct declaration order, non-ASCII characters written verbatim
//! rather than `\u`-escaped (serde_json's default, matching what consumers
//! already parse).
//!
//! Writes go through a temp file in the destination directory followed by a
//! rename, so a crash mid-write never leaves a truncated document where the
//! real one should be. Rename also overwrites any previous run's output.

use crate::error::ExtractError;
use crate::output::AggregatedRecord;
use std::path::Path;
use tracing::info;

/// Serialize `record` to pretty-printed JSON at `path`, overwriting any
/// existing file. Failure to write is fatal.
pub async fn write_record(record: &AggregatedRecord, path: &Path) -> Result<(), ExtractError> {
    let json = serde_json::to_vec_pretty(record)
        .map_err(|e| ExtractError::Internal(format!("serialize record: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ExtractError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{GraphDescription, LinkedPage, WebExtractionResult};
    use tempfile::tempdir;

    fn record() -> AggregatedRecord {
        AggregatedRecord {
            pdf_text: "naïve résumé".to_string(),
            pdf_graphs: vec![GraphDescription {
                page: 0,
                desc: "CAC vs LTV".to_string(),
            }],
            pdf_images: vec![],
            web_data: vec![LinkedPage {
                url: "https://example.org".to_string(),
                content: WebExtractionResult::failure("timed out"),
            }],
        }
    }

    #[tokio::test]
    async fn writes_parseable_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("all_extracted_data.json");

        write_record(&record(), &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let back: AggregatedRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, record());
        assert!(raw.contains("naïve"), "non-ASCII must be verbatim");
        assert!(raw.contains("\n  "), "output must be indented");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "stale garbage").unwrap();

        write_record(&record(), &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("stale garbage"));
        serde_json::from_str::<AggregatedRecord>(&raw).unwrap();
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runs/deck-1/out.json");

        write_record(&record(), &path).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_record(&record(), &path).await.unwrap();
        assert!(!path.with_extension("json.tmp").exists());
    }
}
