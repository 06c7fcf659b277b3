//! Configuration types for an extraction run.
//!
//! All behaviour is controlled through [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A constructor with this many fields breaks on every new field. The builder
//! lets callers set only what they care about and rely on documented defaults
//! for the rest.

use crate::error::ExtractError;
use crate::pipeline::ocr::TextRecognizer;
use crate::progress::ExtractionProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Default name of the persisted JSON document.
pub const DEFAULT_OUTPUT_FILENAME: &str = "all_extracted_data.json";

/// Configuration for a pitch-deck extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use deckharvest::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .fetch_timeout_secs(10)
///     .concurrency(4)
///     .ocr_lang("en")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Timeout for each outbound page fetch, in seconds. Default: 10.
    ///
    /// Linked pages are third-party content and can hang indefinitely. The
    /// bound applies per request; the PDF/OCR path deliberately carries no
    /// timeout since it works on a local file.
    pub fetch_timeout_secs: u64,

    /// Number of concurrent link fetches. Default: 4.
    ///
    /// Fetches are independent, so overlapping them only trades politeness
    /// against wall-clock time. Results keep link-discovery order regardless
    /// of this value; `1` reproduces a strictly sequential run.
    pub concurrency: usize,

    /// Accept invalid TLS certificates on link fetches. Default: false.
    ///
    /// Deck links occasionally point at staging hosts with self-signed
    /// certificates. This flag is scoped to the extractor's own HTTP client —
    /// it never weakens any other connection in the process. Leave it off
    /// unless a specific run needs it.
    pub danger_accept_invalid_certs: bool,

    /// `User-Agent` header sent with link fetches.
    ///
    /// Some sites reject requests without one. Defaults to
    /// `deckharvest/<version>`.
    pub user_agent: String,

    /// Run OCR over embedded images. Default: true.
    ///
    /// Turning this off skips recogniser invocation entirely, so
    /// `pdf_graphs` comes back empty. Image metadata is still collected.
    pub ocr: bool,

    /// Language hint passed to the recogniser. Default: `"en"`.
    pub ocr_lang: String,

    /// Pre-constructed text recogniser. If `None`, the tesseract CLI backend
    /// is used. Inject a stub here in tests.
    pub recognizer: Option<Arc<dyn TextRecognizer>>,

    /// Per-link progress events. If `None`, no events are emitted.
    pub progress_callback: Option<Arc<dyn ExtractionProgressCallback>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            concurrency: 4,
            danger_accept_invalid_certs: false,
            user_agent: format!("deckharvest/{}", env!("CARGO_PKG_VERSION")),
            ocr: true,
            ocr_lang: "en".to_string(),
            recognizer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("concurrency", &self.concurrency)
            .field(
                "danger_accept_invalid_certs",
                &self.danger_accept_invalid_certs,
            )
            .field("user_agent", &self.user_agent)
            .field("ocr", &self.ocr)
            .field("ocr_lang", &self.ocr_lang)
            .field(
                "recognizer",
                &self.recognizer.as_ref().map(|_| "<dyn TextRecognizer>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs.max(1);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn danger_accept_invalid_certs(mut self, v: bool) -> Self {
        self.config.danger_accept_invalid_certs = v;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn ocr(mut self, v: bool) -> Self {
        self.config.ocr = v;
        self
    }

    pub fn ocr_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_lang = lang.into();
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn ExtractionProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(ExtractError::InvalidConfig(
                "concurrency must be ≥ 1".into(),
            ));
        }
        if c.fetch_timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "fetch timeout must be ≥ 1 second".into(),
            ));
        }
        if c.ocr_lang.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "ocr_lang must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ExtractionConfig::default();
        assert_eq!(c.fetch_timeout_secs, 10);
        assert_eq!(c.concurrency, 4);
        assert!(!c.danger_accept_invalid_certs);
        assert!(c.ocr);
        assert_eq!(c.ocr_lang, "en");
        assert!(c.recognizer.is_none());
    }

    #[test]
    fn builder_clamps_degenerate_values() {
        let c = ExtractionConfig::builder()
            .concurrency(0)
            .fetch_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.fetch_timeout_secs, 1);
    }

    #[test]
    fn empty_ocr_lang_rejected() {
        let err = ExtractionConfig::builder().ocr_lang("").build();
        assert!(matches!(err, Err(ExtractError::InvalidConfig(_))));
    }

    #[test]
    fn debug_does_not_require_recognizer_debug() {
        let c = ExtractionConfig::default();
        let s = format!("{c:?}");
        assert!(s.contains("fetch_timeout_secs"));
    }
}
