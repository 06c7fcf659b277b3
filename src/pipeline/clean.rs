//! Text cleaning: whitespace normalisation for extracted text.
//!
//! Every text field in the aggregated record — page text, OCR output,
//! paragraph text from linked pages — passes through [`clean_text`] exactly
//! once, at the point where the text is assembled. PDF text layers and HTML
//! bodies are full of layout whitespace (column padding, soft wraps, CRLF)
//! that downstream prompt assembly must not pay tokens for.
//!
//! Two rules, applied in order:
//!
//! 1. collapse every run of non-newline whitespace to a single space;
//! 2. collapse every run of newlines, together with any horizontal
//!    whitespace around them, to a single `\n`.
//!
//! Rule 1 must run first so rule 2 only ever sees single spaces next to
//! newline runs. Both rules are pure string rewrites; the composition is
//! total and idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static RE_NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" ?\n[\n ]*").unwrap());

/// Normalise whitespace in extracted text.
///
/// Runs of spaces/tabs/CR collapse to one space, runs of newlines collapse to
/// one `\n` (swallowing spaces that hug them), and the ends are trimmed.
/// Already-clean text comes back unchanged.
pub fn clean_text(text: &str) -> String {
    let s = RE_HORIZONTAL_WS.replace_all(text, " ");
    let s = RE_NEWLINE_RUNS.replace_all(&s, "\n");
    s.trim().to_string()
}
