//! Image OCR: recover text from raster images embedded in the deck.
//!
//! ## The recogniser seam
//!
//! OCR engines are environment-heavy (native binaries, model files), so the
//! actual engine sits behind [`TextRecognizer`] and is injected through
//! [`crate::config::ExtractionConfig::recognizer`]. The default
//! implementation, [`TesseractRecognizer`], shells out to the `tesseract`
//! CLI via a scratch PNG — the one OCR backend that is installable from every
//! package manager and needs no bundled model weights.
//!
//! ## Failure policy
//!
//! [`read_image_text`] never fails: undecodable payloads, a missing
//! `tesseract` binary, and empty recognition all yield `""`, which the PDF
//! extractor treats as "no graph description". There is no caching — each
//! call redoes full inference, an accepted cost since invocation count equals
//! the deck's embedded-image count.

use crate::error::OcrError;
use image::DynamicImage;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Recognises text lines in a decoded raster image.
///
/// Implementations must be `Send + Sync`: the PDF pass runs on the blocking
/// pool and the recogniser handle is shared through an `Arc`.
pub trait TextRecognizer: Send + Sync {
    /// Return the recognised text lines, top to bottom. An empty vector means
    /// "no text found" and is not an error.
    fn recognize(&self, image: &DynamicImage, lang: &str) -> Result<Vec<String>, OcrError>;
}

/// Default recogniser: the `tesseract` CLI.
///
/// The image is written to a scratch PNG (tesseract reads files, not pipes)
/// and `tesseract <png> stdout -l <lang>` is captured. A binary missing from
/// `PATH` surfaces as [`OcrError::Unavailable`], which callers recover to
/// empty.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    command: PathBuf,
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self {
            command: PathBuf::from("tesseract"),
        }
    }
}

impl TesseractRecognizer {
    /// Use a specific tesseract binary instead of resolving from `PATH`.
    pub fn with_command(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage, lang: &str) -> Result<Vec<String>, OcrError> {
        let scratch = tempfile::Builder::new()
            .prefix("deckharvest-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Recognition(format!("scratch file: {e}")))?;

        image.save_with_format(scratch.path(), image::ImageFormat::Png)?;

        let output = Command::new(&self.command)
            .arg(scratch.path())
            .arg("stdout")
            .arg("-l")
            .arg(tesseract_lang(lang))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    OcrError::Unavailable(format!("'{}' not found in PATH", self.command.display()))
                } else {
                    OcrError::Recognition(e.to_string())
                }
            })?;

        if !output.status.success() {
            return Err(OcrError::Recognition(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let lines = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Ok(lines)
    }
}

/// Map two-letter language hints to tesseract's ISO 639-2 traineddata names.
///
/// Unknown or already-three-letter codes pass through unchanged so callers
/// can name any installed traineddata directly.
fn tesseract_lang(lang: &str) -> &str {
    match lang {
        "en" => "eng",
        "de" => "deu",
        "fr" => "fra",
        "es" => "spa",
        "it" => "ita",
        "pt" => "por",
        other => other,
    }
}

/// Decode an image payload and recognise its text.
///
/// Lines are joined with single spaces. Returns `""` when the payload does
/// not decode, the recogniser fails, or nothing was recognised — the caller
/// cannot distinguish these cases and is not meant to.
pub fn read_image_text(recognizer: &dyn TextRecognizer, bytes: &[u8], lang: &str) -> String {
    let image = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            debug!("image payload not decodable, skipping OCR: {e}");
            return String::new();
        }
    };

    match recognizer.recognize(&image, lang) {
        Ok(lines) => lines.join(" "),
        Err(e) => {
            debug!("OCR recovered to empty: {e}");
            String::new()
        }
    }
}
