//! Top-level extraction entry points.
//!
//! [`extract`] is the primary API: PDF pass, then one fetch per unique
//! discovered link, then a single [`AggregatedRecord`]. Error results from
//! individual links are kept in the record — the aggregator reports failures
//! faithfully rather than silently dropping them. The only fatal outcomes are
//! a missing/unreadable source file and (for [`extract_to_file`]) an
//! unwritable destination; there is no partial-PDF success mode.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{
    AggregatedRecord, DeckSummary, ExtractionOutput, ExtractionStats, LinkedPage, PdfImageMeta,
};
use crate::pipeline::ocr::{TesseractRecognizer, TextRecognizer};
use crate::pipeline::{input, pdf, persist, web};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extract a pitch deck and everything it links to.
///
/// # Arguments
/// * `pdf_path` — local path to the deck
/// * `config`   — extraction configuration
///
/// # Returns
/// `Ok(ExtractionOutput)` even when some links failed — check
/// `output.stats.failed_links` and the per-link `error` fields.
///
/// # Errors
/// Returns `Err(ExtractError)` only for fatal conditions: file missing,
/// unreadable, not a PDF, or corrupt.
pub async fn extract(
    pdf_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let total_start = Instant::now();
    let pdf_path = pdf_path.as_ref();
    info!("Starting extraction: {}", pdf_path.display());

    // ── Step 1: Resolve and validate input ───────────────────────────────
    let pdf_path = input::resolve_input(pdf_path)?;

    // ── Step 2: Resolve the OCR backend ──────────────────────────────────
    let recognizer = resolve_recognizer(config);

    // ── Step 3: PDF pass (text, links, images, OCR) ──────────────────────
    let pdf_start = Instant::now();
    let pdf::PdfExtraction {
        content,
        total_pages,
    } = pdf::extract_pdf_content(&pdf_path, config, recognizer).await?;
    let pdf_duration_ms = pdf_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_pdf_extracted(total_pages, content.links.len());
    }
    debug!(
        "PDF pass done in {}ms: {} links to fetch",
        pdf_duration_ms,
        content.links.len()
    );

    // ── Step 4: Fetch each unique link once ──────────────────────────────
    let web_start = Instant::now();
    let client = web::build_client(config)?;
    let web_data = fetch_all_links(&client, &content.links, config).await;
    let web_duration_ms = web_start.elapsed().as_millis() as u64;

    // ── Step 5: Assemble the record ──────────────────────────────────────
    let failed_links = web_data.iter().filter(|p| p.content.is_error()).count();
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(web_data.len(), failed_links);
    }
    let record = AggregatedRecord {
        pdf_text: content.text,
        pdf_graphs: content.graphs,
        pdf_images: content.images.iter().map(PdfImageMeta::from).collect(),
        web_data,
    };

    // ── Step 6: Stats ────────────────────────────────────────────────────
    let stats = ExtractionStats {
        total_pages,
        embedded_images: record.pdf_images.len(),
        links_discovered: record.web_data.len(),
        ocr_descriptions: record.pdf_graphs.len(),
        failed_links,
        pdf_duration_ms,
        web_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} pages, {} links ({} failed), {}ms total",
        stats.total_pages, stats.links_discovered, stats.failed_links, stats.total_duration_ms
    );

    Ok(ExtractionOutput { record, stats })
}

/// Extract and persist the record in one call.
///
/// The write is atomic (temp file + rename) and overwrites any existing
/// document at `output_path`.
pub async fn extract_to_file(
    pdf_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    let output = extract(pdf_path, config).await?;
    persist::write_record(&output.record, output_path.as_ref()).await?;
    Ok(output.stats)
}

/// Extract a deck held in memory.
///
/// The bytes are written to a managed [`tempfile`] (the PDF libraries want a
/// file-system path) which is cleaned up automatically on return or panic.
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ExtractError::Internal(format!("tempfile write: {e}")))?;
    // `tmp` is dropped (and the file deleted) when `extract` returns
    extract(tmp.path(), config).await
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    pdf_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(extract(pdf_path, config))
}

/// Count pages, links, and embedded images without running OCR or touching
/// the network.
pub async fn inspect(pdf_path: impl AsRef<Path>) -> Result<DeckSummary, ExtractError> {
    let pdf_path = input::resolve_input(pdf_path.as_ref())?;
    let config = ExtractionConfig::builder().ocr(false).build()?;
    let recognizer = resolve_recognizer(&config);
    let pdf = pdf::extract_pdf_content(&pdf_path, &config, recognizer).await?;
    Ok(DeckSummary {
        page_count: pdf.total_pages,
        link_count: pdf.content.links.len(),
        image_count: pdf.content.images.len(),
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Use the injected recogniser when one was provided, else the tesseract CLI.
fn resolve_recognizer(config: &ExtractionConfig) -> Arc<dyn TextRecognizer> {
    match &config.recognizer {
        Some(recognizer) => Arc::clone(recognizer),
        None => Arc::new(TesseractRecognizer::default()),
    }
}

/// Fetch every link with bounded concurrency.
///
/// `buffered` (not `buffer_unordered`) keeps results in link-discovery order
/// no matter how fetches interleave; `concurrency = 1` reproduces a strictly
/// sequential run.
async fn fetch_all_links(
    client: &reqwest::Client,
    links: &[String],
    config: &ExtractionConfig,
) -> Vec<LinkedPage> {
    let total = links.len();
    stream::iter(links.iter().enumerate())
        .map(|(index, url)| {
            let callback = config.progress_callback.as_deref();
            async move {
                if let Some(cb) = callback {
                    cb.on_link_start(index, total, url);
                }
                let content = web::extract_website(client, url).await;
                if let Some(cb) = callback {
                    match &content.error {
                        None => cb.on_link_complete(index, total, url),
                        Some(e) => cb.on_link_error(index, total, url, e),
                    }
                }
                LinkedPage {
                    url: url.clone(),
                    content,
                }
            }
        })
        .buffered(config.concurrency)
        .collect()
        .await
}
