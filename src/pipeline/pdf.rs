//! PDF extraction: page text, annotation links, and embedded images.
//!
//! ## Why two handles on one file?
//!
//! No single crate in the ecosystem cleanly exposes everything this stage
//! needs. pdfium's text API reconstructs reading order far better than
//! interpreting content streams by hand, but it hides raw image payloads and
//! annotation dictionaries behind its rendering model. lopdf gives direct
//! access to `Annots` entries and image XObject streams, but its text
//! decoding is the weaker of the two. So the same file is opened once through
//! each library: pdfium for text, lopdf for links and images.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with thread-local state, not safe to drive from
//! async contexts, and OCR inference is CPU-bound on top. The whole pass runs
//! on the blocking pool, mirroring how rendering is kept off the async
//! workers elsewhere in this codebase's lineage.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{ExtractedImage, GraphDescription, PageExtractionResult};
use crate::pipeline::clean::clean_text;
use crate::pipeline::ocr::{read_image_text, TextRecognizer};
use lopdf::{Dictionary, Document, Object};
use pdfium_render::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything the PDF pass produces, plus the page count for reporting.
#[derive(Debug)]
pub struct PdfExtraction {
    pub content: PageExtractionResult,
    pub total_pages: usize,
}

/// Extract text, links, and embedded images from a PDF file.
///
/// Runs inside `spawn_blocking` since both PDF parsing and OCR are CPU-bound.
/// A file that cannot be opened is a fatal error; there is no partial success
/// for a corrupt source document.
pub async fn extract_pdf_content(
    pdf_path: &Path,
    config: &ExtractionConfig,
    recognizer: Arc<dyn TextRecognizer>,
) -> Result<PdfExtraction, ExtractError> {
    let path = pdf_path.to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || extract_pdf_blocking(&path, &config, recognizer.as_ref()))
        .await
        .map_err(|e| ExtractError::Internal(format!("PDF task panicked: {e}")))?
}

/// Blocking implementation of the PDF pass.
fn extract_pdf_blocking(
    pdf_path: &Path,
    config: &ExtractionConfig,
    recognizer: &dyn TextRecognizer,
) -> Result<PdfExtraction, ExtractError> {
    // ── Handle one: pdfium, page text ────────────────────────────────────
    let pdfium = bind_pdfium()?;
    let document = pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            ExtractError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        } else {
            ExtractError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let total_pages = document.pages().len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let mut all_text = String::new();
    for page in document.pages().iter() {
        // A page with no text layer contributes an empty string, not an error.
        let page_text = page.text().map(|t| t.all()).unwrap_or_default();
        all_text.push_str(&page_text);
        all_text.push('\n');
    }
    let text = clean_text(&all_text);

    // ── Handle two: lopdf, annotation links + image streams ──────────────
    let doc = Document::load(pdf_path).map_err(|e| ExtractError::CorruptPdf {
        path: pdf_path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let links = collect_annotation_links(&doc);
    let (images, graphs) = collect_embedded_images(&doc, config, recognizer);

    info!(
        "PDF pass: {} chars of text, {} links, {} images, {} graph descriptions",
        text.len(),
        links.len(),
        images.len(),
        graphs.len()
    );

    Ok(PdfExtraction {
        content: PageExtractionResult {
            text,
            images,
            links,
            graphs,
        },
        total_pages,
    })
}

/// Bind to a pdfium shared library.
///
/// `PDFIUM_LIB_PATH` points at a directory holding the library; otherwise the
/// system library path is searched.
fn bind_pdfium() -> Result<Pdfium, ExtractError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)),
        Err(_) => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

/// Follow reference chains to the underlying object.
///
/// Broken references resolve to the reference itself so callers fall through
/// their match arms instead of erroring; a hop cap guards against reference
/// cycles in malformed files.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    let mut hops = 0;
    while let Object::Reference(id) = current {
        match doc.get_object(*id) {
            Ok(next) => current = next,
            Err(_) => break,
        }
        hops += 1;
        if hops > 16 {
            break;
        }
    }
    current
}

/// Collect URI actions from link annotations across all pages.
///
/// Duplicates are rejected while first-seen order is kept, so each distinct
/// URL drives exactly one downstream fetch and the output ordering is
/// deterministic.
fn collect_annotation_links(doc: &Document) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();

    for (_page_no, page_id) in doc.get_pages() {
        let Ok(page_dict) = doc.get_dictionary(page_id) else {
            continue;
        };
        let Ok(annots_obj) = page_dict.get(b"Annots") else {
            continue;
        };
        let Object::Array(annots) = resolve(doc, annots_obj) else {
            continue;
        };

        for annot in annots {
            let Object::Dictionary(annot_dict) = resolve(doc, annot) else {
                continue;
            };
            let Ok(action_obj) = annot_dict.get(b"A") else {
                continue;
            };
            let Object::Dictionary(action) = resolve(doc, action_obj) else {
                continue;
            };
            let Ok(uri_obj) = action.get(b"URI") else {
                continue;
            };
            let uri = match resolve(doc, uri_obj) {
                Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
                Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                _ => continue,
            };
            if !uri.is_empty() && seen.insert(uri.clone()) {
                links.push(uri);
            }
        }
    }

    links
}

/// Enumerate image XObjects per page, capturing raw payloads and running OCR.
///
/// A `GraphDescription` is appended only when the cleaned OCR text is
/// non-empty; undecodable payloads (raw `FlateDecode` pixel buffers, exotic
/// codecs) silently contribute none.
fn collect_embedded_images(
    doc: &Document,
    config: &ExtractionConfig,
    recognizer: &dyn TextRecognizer,
) -> (Vec<ExtractedImage>, Vec<GraphDescription>) {
    let mut images = Vec::new();
    let mut graphs = Vec::new();

    for (page_no, page_id) in doc.get_pages() {
        let page_idx = page_no as usize - 1;
        let Ok(page_dict) = doc.get_dictionary(page_id) else {
            continue;
        };
        let Ok(resources_obj) = page_dict.get(b"Resources") else {
            continue;
        };
        let Object::Dictionary(resources) = resolve(doc, resources_obj) else {
            continue;
        };
        let Ok(xobjects_obj) = resources.get(b"XObject") else {
            continue;
        };
        let Object::Dictionary(xobjects) = resolve(doc, xobjects_obj) else {
            continue;
        };

        let mut img_idx = 0;
        for (_name, xobj) in xobjects.iter() {
            let Object::Stream(stream) = resolve(doc, xobj) else {
                continue;
            };
            let is_image = matches!(
                stream.dict.get(b"Subtype").map(|o| resolve(doc, o)),
                Ok(Object::Name(name)) if name == b"Image"
            );
            if !is_image {
                continue;
            }

            let ext = image_extension(doc, &stream.dict);
            let bytes = stream.content.clone();
            debug!(
                "page {}: image {} ({}, {} bytes)",
                page_idx,
                img_idx,
                ext,
                bytes.len()
            );

            if config.ocr {
                let ocr_text = read_image_text(recognizer, &bytes, &config.ocr_lang);
                let desc = clean_text(&ocr_text);
                if !desc.is_empty() {
                    graphs.push(GraphDescription {
                        page: page_idx,
                        desc,
                    });
                }
            }

            images.push(ExtractedImage {
                page: page_idx,
                img_idx,
                bytes,
                ext,
            });
            img_idx += 1;
        }
    }

    (images, graphs)
}

/// Derive a file extension from the stream's filter chain.
///
/// The image codec is the last filter in a chain. `DCTDecode` content is a
/// complete JPEG file; everything else is recorded by codec with `png` as the
/// catch-all for uncompressed/deflated pixel data.
fn image_extension(doc: &Document, dict: &Dictionary) -> String {
    let filter_name: Option<Vec<u8>> = match dict.get(b"Filter").map(|o| resolve(doc, o)) {
        Ok(Object::Name(name)) => Some(name.clone()),
        Ok(Object::Array(filters)) => filters.iter().rev().find_map(|f| match resolve(doc, f) {
            Object::Name(name) => Some(name.clone()),
            _ => None,
        }),
        _ => None,
    };

    match filter_name.as_deref() {
        Some(b"DCTDecode") => "jpg",
        Some(b"JPXDecode") => "jpx",
        Some(b"CCITTFaxDecode") => "tiff",
        Some(b"JBIG2Decode") => "jbig2",
        _ => "png",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use image::DynamicImage;
    use lopdf::{Stream, StringFormat};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ── Document builders ────────────────────────────────────────────────
    //
    // Annotation and image objects are added to the document first; the page
    // tree referencing them is assembled last by `finish_doc`. Everything
    // lives in one `Document` so object ids never collide.

    fn finish_doc(mut doc: Document, page_dicts: Vec<Dictionary>) -> Document {
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for mut page in page_dicts {
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            let page_id = doc.add_object(Object::Dictionary(page));
            kids.push(Object::Reference(page_id));
        }
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(kids.len() as i64));
        pages.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc
    }

    fn link_annotation(doc: &mut Document, uri: &str) -> Object {
        let mut action = Dictionary::new();
        action.set("S", Object::Name(b"URI".to_vec()));
        action.set(
            "URI",
            Object::String(uri.as_bytes().to_vec(), StringFormat::Literal),
        );
        let mut annot = Dictionary::new();
        annot.set("Subtype", Object::Name(b"Link".to_vec()));
        annot.set("A", Object::Dictionary(action));
        Object::Reference(doc.add_object(Object::Dictionary(annot)))
    }

    fn image_stream(doc: &mut Document, bytes: &[u8], filter: Option<&[u8]>) -> Object {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(4));
        dict.set("Height", Object::Integer(4));
        if let Some(f) = filter {
            dict.set("Filter", Object::Name(f.to_vec()));
        }
        Object::Reference(doc.add_object(Object::Stream(Stream::new(dict, bytes.to_vec()))))
    }

    fn page_with_annots(annots: Vec<Object>) -> Dictionary {
        let mut page = Dictionary::new();
        page.set("Annots", Object::Array(annots));
        page
    }

    fn page_with_images(image_refs: Vec<(&str, Object)>) -> Dictionary {
        let mut xobjects = Dictionary::new();
        for (name, obj) in image_refs {
            xobjects.set(name, obj);
        }
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));
        let mut page = Dictionary::new();
        page.set("Resources", Object::Dictionary(resources));
        page
    }

    fn tiny_png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            4,
            4,
            image::Rgba([255, 255, 255, 255]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode should succeed");
        buf
    }

    // ── Recognizer stubs ─────────────────────────────────────────────────

    struct FixedText(&'static str);

    impl TextRecognizer for FixedText {
        fn recognize(&self, _img: &DynamicImage, _lang: &str) -> Result<Vec<String>, OcrError> {
            Ok(vec![self.0.to_string()])
        }
    }

    struct Counting(AtomicUsize);

    impl TextRecognizer for Counting {
        fn recognize(&self, _img: &DynamicImage, _lang: &str) -> Result<Vec<String>, OcrError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    // ── Link collection ──────────────────────────────────────────────────

    #[test]
    fn duplicate_uri_across_pages_collected_once() {
        let mut doc = Document::with_version("1.5");
        let a1 = link_annotation(&mut doc, "https://example.org/about");
        let a2 = link_annotation(&mut doc, "https://example.org/about");
        let doc = finish_doc(doc, vec![page_with_annots(vec![a1]), page_with_annots(vec![a2])]);

        let links = collect_annotation_links(&doc);
        assert_eq!(links, vec!["https://example.org/about"]);
    }

    #[test]
    fn links_keep_first_seen_order() {
        let mut doc = Document::with_version("1.5");
        let a = link_annotation(&mut doc, "https://a.example");
        let b1 = link_annotation(&mut doc, "https://b.example");
        let b2 = link_annotation(&mut doc, "https://b.example");
        let c = link_annotation(&mut doc, "https://c.example");
        let doc = finish_doc(
            doc,
            vec![
                page_with_annots(vec![a, b1]),
                page_with_annots(vec![b2, c]),
            ],
        );

        let links = collect_annotation_links(&doc);
        assert_eq!(
            links,
            vec!["https://a.example", "https://b.example", "https://c.example"]
        );
    }

    #[test]
    fn pages_without_annotations_yield_no_links() {
        let doc = finish_doc(
            Document::with_version("1.5"),
            vec![Dictionary::new(), Dictionary::new()],
        );
        assert!(collect_annotation_links(&doc).is_empty());
    }

    // ── Image collection ─────────────────────────────────────────────────

    #[test]
    fn no_images_means_no_ocr_calls() {
        let doc = finish_doc(
            Document::with_version("1.5"),
            vec![Dictionary::new(), Dictionary::new()],
        );
        let counting = Counting(AtomicUsize::new(0));
        let config = ExtractionConfig::default();

        let (images, graphs) = collect_embedded_images(&doc, &config, &counting);
        assert!(images.is_empty());
        assert!(graphs.is_empty());
        assert_eq!(counting.0.load(Ordering::SeqCst), 0, "OCR must not run");
    }

    #[test]
    fn collects_payload_extension_and_position() {
        let mut doc = Document::with_version("1.5");
        let jpeg = image_stream(&mut doc, &[0xFF, 0xD8, 0xFF, 0xE0], Some(b"DCTDecode"));
        let doc = finish_doc(
            doc,
            vec![Dictionary::new(), page_with_images(vec![("Im0", jpeg)])],
        );

        let config = ExtractionConfig::default();
        let (images, graphs) = collect_embedded_images(&doc, &config, &FixedText("ignored"));
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].page, 1, "image sits on the second page (index 1)");
        assert_eq!(images[0].img_idx, 0);
        assert_eq!(images[0].ext, "jpg");
        assert_eq!(images[0].bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
        // Truncated JPEG payload cannot decode, so OCR recovers to empty.
        assert!(graphs.is_empty());
    }

    #[test]
    fn recognizable_image_produces_cleaned_graph() {
        let mut doc = Document::with_version("1.5");
        let png = tiny_png_bytes();
        let img = image_stream(&mut doc, &png, None);
        let doc = finish_doc(doc, vec![page_with_images(vec![("Im0", img)])]);

        let config = ExtractionConfig::default();
        let (images, graphs) =
            collect_embedded_images(&doc, &config, &FixedText("Burn   rate  $40k"));
        assert_eq!(images[0].ext, "png");
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].page, 0);
        assert_eq!(graphs[0].desc, "Burn rate $40k", "OCR text must be cleaned");
    }

    #[test]
    fn ocr_flag_off_skips_recognizer_entirely() {
        let mut doc = Document::with_version("1.5");
        let png = tiny_png_bytes();
        let img = image_stream(&mut doc, &png, None);
        let doc = finish_doc(doc, vec![page_with_images(vec![("Im0", img)])]);

        let config = ExtractionConfig::builder().ocr(false).build().unwrap();
        let counting = Counting(AtomicUsize::new(0));
        let (images, graphs) = collect_embedded_images(&doc, &config, &counting);
        assert_eq!(images.len(), 1, "metadata is still collected");
        assert!(graphs.is_empty());
        assert_eq!(counting.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn filter_array_uses_last_codec() {
        let mut dict = Dictionary::new();
        dict.set(
            "Filter",
            Object::Array(vec![
                Object::Name(b"ASCII85Decode".to_vec()),
                Object::Name(b"DCTDecode".to_vec()),
            ]),
        );
        let doc = Document::with_version("1.5");
        assert_eq!(image_extension(&doc, &dict), "jpg");
    }

    #[test]
    fn missing_filter_defaults_to_png() {
        let doc = Document::with_version("1.5");
        assert_eq!(image_extension(&doc, &Dictionary::new()), "png");
    }
}
