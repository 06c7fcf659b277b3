//! Result types produced by the extraction pipeline.
//!
//! The JSON wire shape of [`AggregatedRecord`] is a contract with the
//! downstream note- and metric-generation agents: top-level keys `pdf_text`,
//! `pdf_graphs`, `pdf_images`, and `web_data`, with raw image bytes
//! intentionally absent. Field order in the structs below is the key order in
//! the serialized document, so reordering fields here is a breaking change.

use serde::{Deserialize, Serialize};

/// A raster image embedded in a PDF page, with its raw payload.
///
/// In-memory only: the aggregator projects this down to [`PdfImageMeta`]
/// before anything is persisted. `bytes` is whatever the PDF stream carried —
/// a complete JPEG file for `DCTDecode` images, raw pixel data for
/// `FlateDecode` ones.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// 0-indexed page the image was embedded in.
    pub page: usize,
    /// Sequential index of the image within its page.
    pub img_idx: usize,
    /// Raw stream payload.
    pub bytes: Vec<u8>,
    /// File extension implied by the stream filter (`jpg`, `png`, …).
    pub ext: String,
}

/// Text recognised inside an embedded image, attributed to its page.
///
/// Created only when OCR yields non-empty text after cleaning; images with no
/// recognisable text produce no entry at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDescription {
    pub page: usize,
    pub desc: String,
}

/// The persisted projection of an [`ExtractedImage`]: position and format,
/// bytes dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfImageMeta {
    pub page: usize,
    pub img_idx: usize,
    pub ext: String,
}

impl From<&ExtractedImage> for PdfImageMeta {
    fn from(img: &ExtractedImage) -> Self {
        Self {
            page: img.page,
            img_idx: img.img_idx,
            ext: img.ext.clone(),
        }
    }
}

/// Everything harvested from the PDF itself in one pass.
///
/// Immutable once returned; the aggregator consumes it without further
/// mutation. `links` is deduplicated in first-seen order, so iterating it
/// drives the web fetches deterministically.
#[derive(Debug, Clone)]
pub struct PageExtractionResult {
    /// Cleaned concatenation of all page texts.
    pub text: String,
    /// Embedded images in (page, img_idx) order.
    pub images: Vec<ExtractedImage>,
    /// Unique outbound annotation URIs, first-seen order.
    pub links: Vec<String>,
    /// OCR descriptions for images that contained recognisable text.
    pub graphs: Vec<GraphDescription>,
}

/// An image reference found on a linked web page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebImageRef {
    /// Absolute URL, resolved against the page's own URL.
    pub img_url: String,
    /// Figure caption when the image sits inside a `<figure>`, else alt text.
    pub caption: String,
}

/// An inline vector graphic found on a linked web page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebGraphRef {
    /// Serialized `<svg>` markup.
    pub svg: String,
    /// Accessible label, else title attribute, else the element's own text.
    pub desc: String,
}

/// Extraction result for a single linked page.
///
/// This type is the reason the web extractor never fails: a fetch or parse
/// problem becomes a populated `error` with everything else empty, and the
/// record still takes its place in the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebExtractionResult {
    /// Cleaned text of all paragraph elements.
    pub website_text: String,
    pub images: Vec<WebImageRef>,
    pub graphs: Vec<WebGraphRef>,
    /// Present only when the fetch or parse failed; the key is omitted from
    /// JSON on success, matching the wire format consumers already parse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebExtractionResult {
    /// The degraded-but-present shape for a failed fetch.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            website_text: String::new(),
            images: Vec::new(),
            graphs: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// True when the fetch or parse failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// One fetched link paired with whatever came back for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedPage {
    pub url: String,
    pub content: WebExtractionResult,
}

/// The terminal artifact of a run: PDF-derived and web-derived content for
/// one deck, ready for [`crate::pipeline::persist::write_record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AggregatedRecord {
    pub pdf_text: String,
    pub pdf_graphs: Vec<GraphDescription>,
    pub pdf_images: Vec<PdfImageMeta>,
    /// One entry per unique link, in discovery order. Error results are kept,
    /// not filtered: the record reports failures faithfully.
    pub web_data: Vec<LinkedPage>,
}

/// Wall-clock and volume accounting for a run.
///
/// Never serialized into the record itself; surfaced so callers and the CLI
/// can report what a run actually did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Embedded raster images found.
    pub embedded_images: usize,
    /// Unique outbound links discovered.
    pub links_discovered: usize,
    /// Images whose OCR produced a non-empty description.
    pub ocr_descriptions: usize,
    /// Links whose fetch or parse failed (still present in `web_data`).
    pub failed_links: usize,
    pub pdf_duration_ms: u64,
    pub web_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Record plus accounting, returned by [`crate::extract::extract`].
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub record: AggregatedRecord,
    pub stats: ExtractionStats,
}

/// Cheap structural overview of a deck, returned by
/// [`crate::extract::inspect`] without running OCR or touching the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSummary {
    pub page_count: usize,
    pub link_count: usize,
    pub image_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> AggregatedRecord {
        AggregatedRecord {
            pdf_text: "Série A deck — growth 40% MoM".to_string(),
            pdf_graphs: vec![GraphDescription {
                page: 2,
                desc: "ARR $1.2M".to_string(),
            }],
            pdf_images: vec![PdfImageMeta {
                page: 2,
                img_idx: 0,
                ext: "jpg".to_string(),
            }],
            web_data: vec![
                LinkedPage {
                    url: "https://example.org/about".to_string(),
                    content: WebExtractionResult {
                        website_text: "We build things".to_string(),
                        images: vec![WebImageRef {
                            img_url: "https://example.org/team.jpg".to_string(),
                            caption: "The team".to_string(),
                        }],
                        graphs: vec![],
                        error: None,
                    },
                },
                LinkedPage {
                    url: "https://unreachable.example".to_string(),
                    content: WebExtractionResult::failure("connection refused"),
                },
            ],
        }
    }

    #[test]
    fn round_trip_preserves_structure() {
        let record = sample_record();
        let json = serde_json::to_string_pretty(&record).unwrap();
        let back: AggregatedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn error_key_omitted_on_success() {
        let record = sample_record();
        let json = serde_json::to_value(&record).unwrap();
        let ok_page = &json["web_data"][0]["content"];
        let failed_page = &json["web_data"][1]["content"];
        assert!(ok_page.get("error").is_none(), "success must omit the key");
        assert_eq!(failed_page["error"], "connection refused");
    }

    #[test]
    fn top_level_keys_match_wire_contract() {
        // serde_json::Value sorts keys, so assert order on the written text,
        // which serializes fields in declaration order.
        let json = serde_json::to_string_pretty(&sample_record()).unwrap();
        let pos = |key: &str| json.find(key).unwrap_or_else(|| panic!("missing key {key}"));
        assert!(pos("\"pdf_text\"") < pos("\"pdf_graphs\""));
        assert!(pos("\"pdf_graphs\"") < pos("\"pdf_images\""));
        assert!(pos("\"pdf_images\"") < pos("\"web_data\""));
    }

    #[test]
    fn non_ascii_survives_serialization() {
        let json = serde_json::to_string_pretty(&sample_record()).unwrap();
        assert!(json.contains("Série"), "non-ASCII must not be escaped");
    }

    #[test]
    fn image_meta_projection_drops_bytes() {
        let img = ExtractedImage {
            page: 3,
            img_idx: 1,
            bytes: vec![0xFF, 0xD8, 0xFF],
            ext: "jpg".to_string(),
        };
        let meta = PdfImageMeta::from(&img);
        assert_eq!(meta.page, 3);
        assert_eq!(meta.img_idx, 1);
        assert_eq!(meta.ext, "jpg");
    }
}
