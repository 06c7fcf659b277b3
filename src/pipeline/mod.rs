//! Pipeline stages for pitch-deck extraction.
//!
//! Each submodule implements exactly one stage. Keeping stages separate makes
//! each independently testable and lets us swap implementations (a different
//! OCR backend, a different HTML parser) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pdf ───────────────▶ web (× links) ──▶ persist
//! (path)    (text/links/images)  (fetch + parse)   (JSON)
//!              │
//!              └─ ocr (× images) ──▶ graph descriptions
//! ```
//!
//! 1. [`input`]   — validate the local deck path and `%PDF` magic
//! 2. [`pdf`]     — page text, annotation links, embedded image streams;
//!    runs in `spawn_blocking` because PDF parsing and OCR are CPU-bound
//! 3. [`ocr`]     — per-image text recognition behind the
//!    [`ocr::TextRecognizer`] seam
//! 4. [`web`]     — one fetch per unique link; never fails, degrades to an
//!    error-bearing result instead
//! 5. [`clean`]   — whitespace normalisation applied wherever text is
//!    assembled
//! 6. [`persist`] — atomic pretty-JSON write of the aggregated record

pub mod clean;
pub mod input;
pub mod ocr;
pub mod pdf;
pub mod persist;
pub mod web;
