//! Error types for the deckharvest library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the extraction run cannot proceed at all
//!   (missing or corrupt source PDF, unwritable output, invalid config).
//!   Returned as `Err(ExtractError)` from the top-level `extract*` functions.
//!
//! * [`OcrError`] — **Recovered**: a single embedded image could not be
//!   decoded or recognised. Never crosses the library boundary; the OCR
//!   reader maps it to an empty string so the image simply contributes no
//!   graph description.
//!
//! Per-URL web failures are a third category with no error type at all: they
//! are captured as a plain `error` string inside that page's
//! [`crate::output::WebExtractionResult`] so the aggregated record reports
//! them faithfully instead of dropping or aborting.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the deckharvest library.
///
/// Web-page failures are recorded inside
/// [`crate::output::WebExtractionResult::error`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// Text extraction failed for a specific page.
    #[error("Text extraction failed for page {page}: {detail}")]
    PageTextFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
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

    /// The outbound HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuildFailed(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium for your platform, or point PDFIUM_LIB_PATH at an\n\
existing copy of the shared library.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A recovered error for a single embedded image.
///
/// [`crate::pipeline::ocr::read_image_text`] converts every variant to an
/// empty string; the type exists so recognizer implementations can report
/// *why* recognition failed to the debug log.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The raw payload could not be decoded into a raster image.
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    /// The recognizer process could not be launched.
    #[error("recognizer unavailable: {0}")]
    Unavailable(String),

    /// The recognizer ran but reported a failure.
    #[error("recognition failed: {0}")]
    Recognition(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_pdf_display_includes_path() {
        let e = ExtractError::NotAPdf {
            path: PathBuf::from("deck.pdf"),
            magic: *b"PK\x03\x04",
        };
        let msg = e.to_string();
        assert!(msg.contains("deck.pdf"), "got: {msg}");
        assert!(msg.contains("not a valid PDF"), "got: {msg}");
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = ExtractError::OutputWriteFailed {
            path: PathBuf::from("/root/out.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/root/out.json"));
        assert!(e.source().is_some(), "io::Error should be chained");
    }

    #[test]
    fn invalid_config_display() {
        let e = ExtractError::InvalidConfig("concurrency must be ≥ 1".into());
        assert!(e.to_string().contains("concurrency"));
    }

    #[test]
    fn ocr_unavailable_display() {
        let e = OcrError::Unavailable("tesseract not found in PATH".into());
        assert!(e.to_string().contains("tesseract"));
    }
}
