//! Web page extraction: fetch a linked page and pull out text, image
//! references, and inline vector graphics.
//!
//! ## The never-fails contract
//!
//! Linked pages are third-party content the caller does not control: hosts
//! vanish, certificates expire, HTML is malformed. Rather than make every
//! call site handle that, [`extract_website`] always returns a
//! [`WebExtractionResult`] — failures become a populated `error` field with
//! everything else empty, and the aggregator records them as-is.
//!
//! ## Fetch vs parse
//!
//! Fetching and parsing are split so the selector logic in
//! [`parse_website_html`] is a pure function of `(final URL, body)` —
//! testable without a network, and reusable against cached bodies.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{WebExtractionResult, WebGraphRef, WebImageRef};
use crate::pipeline::clean::clean_text;
use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

static SEL_P: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static SEL_IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static SEL_FIGCAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("figcaption").unwrap());
static SEL_SVG: Lazy<Selector> = Lazy::new(|| Selector::parse("svg").unwrap());

/// Build the shared HTTP client for link fetches.
///
/// One client per run: connection pooling across links on the same host, and
/// the TLS relaxation (when opted into) stays scoped to exactly this client.
pub fn build_client(config: &ExtractionConfig) -> Result<reqwest::Client, ExtractError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .user_agent(config.user_agent.clone())
        .danger_accept_invalid_certs(config.danger_accept_invalid_certs)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| ExtractError::ClientBuildFailed(e.to_string()))
}

/// Fetch one URL and extract its content. Never fails.
pub async fn extract_website(client: &reqwest::Client, url: &str) -> WebExtractionResult {
    match fetch_page(client, url).await {
        Ok((final_url, body)) => parse_website_html(&final_url, &body),
        Err(reason) => {
            debug!("fetch failed for {url}: {reason}");
            WebExtractionResult::failure(reason)
        }
    }
}

/// GET the page, returning the post-redirect URL and the decoded body.
async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<(Url, String), String> {
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    // Error pages are still pages; their bodies are parsed like any other.
    let final_url = response.url().clone();
    let body = response.text().await.map_err(|e| e.to_string())?;
    Ok((final_url, body))
}

/// Pure extraction over an already-fetched body.
///
/// `base` is the page's own URL (after redirects) and anchors relative image
/// sources.
pub fn parse_website_html(base: &Url, body: &str) -> WebExtractionResult {
    let document = Html::parse_document(body);

    // Paragraph text, joined then cleaned once.
    let paragraphs: Vec<String> = document
        .select(&SEL_P)
        .map(|p| p.text().collect::<Vec<_>>().join(" "))
        .collect();
    let website_text = clean_text(&paragraphs.join(" "));

    // Image references with captions.
    let mut images = Vec::new();
    for img in document.select(&SEL_IMG) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        if src.trim().is_empty() {
            continue;
        }
        let Ok(img_url) = base.join(src) else {
            continue;
        };

        let alt = img.value().attr("alt").unwrap_or("").trim();
        // A figcaption on the enclosing figure beats alt text; an empty
        // figcaption falls back to alt.
        let mut caption = enclosing_figure_caption(&img).unwrap_or_default();
        if caption.is_empty() && !alt.is_empty() {
            caption = alt.to_string();
        }

        images.push(WebImageRef {
            img_url: img_url.to_string(),
            caption,
        });
    }

    // Inline vector graphics with a best-effort description.
    let mut graphs = Vec::new();
    for svg in document.select(&SEL_SVG) {
        let desc_raw = non_empty_attr(&svg, "aria-label")
            .or_else(|| non_empty_attr(&svg, "title"))
            .unwrap_or_else(|| svg.text().collect::<Vec<_>>().join(" "));
        graphs.push(WebGraphRef {
            svg: svg.html(),
            desc: clean_text(&desc_raw),
        });
    }

    WebExtractionResult {
        website_text,
        images,
        graphs,
        error: None,
    }
}

/// The text of the `<figcaption>` inside the nearest enclosing `<figure>`,
/// if the element sits inside one. `Some("")` means the figure exists but its
/// caption is empty, which callers treat as "fall back to alt".
fn enclosing_figure_caption(img: &ElementRef<'_>) -> Option<String> {
    for ancestor in img.ancestors() {
        let Some(element) = ElementRef::wrap(ancestor) else {
            continue;
        };
        if element.value().name() == "figure" {
            return Some(
                element
                    .select(&SEL_FIGCAPTION)
                    .next()
                    .map(|cap| clean_text(&cap.text().collect::<Vec<_>>().join(" ")))
                    .unwrap_or_default(),
            );
        }
    }
    None
}

fn non_empty_attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
