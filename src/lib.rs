//! # deckharvest
//!
//! Extract text, embedded images, and linked web content from pitch-deck
//! PDFs into a single JSON artifact.
//!
//! ## Why this crate?
//!
//! Deal screening starts with a deck PDF and the handful of links founders
//! bury in it — the product page, the press mention, the metrics dashboard
//! screenshot. This crate pulls all of that into one machine-readable record:
//! page text, OCR'd chart descriptions, image metadata, and the text/images/
//! SVGs of every linked page, ready for downstream note- and
//! metric-generation agents to consume.
//!
//! ## Pipeline Overview
//!
//! ```text
//! deck.pdf
//!  │
//!  ├─ 1. Input    validate path + %PDF magic
//!  ├─ 2. PDF      page text (pdfium) + links/images (lopdf), spawn_blocking
//!  ├─ 3. OCR      tesseract per embedded image → graph descriptions
//!  ├─ 4. Web      one GET per unique link, bounded concurrency, never fails
//!  ├─ 5. Assemble AggregatedRecord (bytes dropped, failures kept)
//!  └─ 6. Persist  pretty JSON, atomic overwrite
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deckharvest::{extract_to_file, ExtractionConfig, DEFAULT_OUTPUT_FILENAME};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let stats = extract_to_file("deck.pdf", DEFAULT_OUTPUT_FILENAME, &config).await?;
//!     eprintln!(
//!         "{} pages, {} links ({} failed), {} graph descriptions",
//!         stats.total_pages, stats.links_discovered, stats.failed_links,
//!         stats.ocr_descriptions,
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `deckharvest` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! deckharvest = { version = "0.3", default-features = false }
//! ```
//!
//! ## Runtime requirements
//!
//! Page text comes from pdfium: install `libpdfium` or point `PDFIUM_LIB_PATH`
//! at a directory containing it. OCR descriptions come from the `tesseract`
//! CLI when it is installed; without it, extraction still runs and
//! `pdf_graphs` is simply empty.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, DEFAULT_OUTPUT_FILENAME};
pub use error::{ExtractError, OcrError};
pub use extract::{extract, extract_from_bytes, extract_sync, extract_to_file, inspect};
pub use output::{
    AggregatedRecord, DeckSummary, ExtractedImage, ExtractionOutput, ExtractionStats,
    GraphDescription, LinkedPage, PageExtractionResult, PdfImageMeta, WebExtractionResult,
    WebGraphRef, WebImageRef,
};
pub use pipeline::clean::clean_text;
pub use pipeline::ocr::{TesseractRecognizer, TextRecognizer};
pub use progress::ExtractionProgressCallback;
