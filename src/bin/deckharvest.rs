//! CLI binary for deckharvest.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use deckharvest::{
    extract, extract_to_file, inspect, ExtractionConfig, ExtractionProgressCallback,
    ExtractionStats, DEFAULT_OUTPUT_FILENAME,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the PDF pass runs, then a
/// per-link progress bar. Link fetches complete out of order when
/// `--concurrency > 1`, so all state updates go through the bar's own
/// synchronisation.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose bar length is set by `on_pdf_extracted`, once
    /// the number of links is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Reading deck");
        bar.set_message("text, links, images, OCR…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} links  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Fetching");
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_pdf_extracted(&self, total_pages: usize, total_links: usize) {
        self.activate_bar(total_links);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Deck read: {total_pages} pages, {total_links} links to fetch"
            ))
        ));
    }

    fn on_link_start(&self, _index: usize, _total: usize, url: &str) {
        self.bar.set_message(truncate(url, 48));
    }

    fn on_link_complete(&self, _index: usize, total: usize, url: &str) {
        self.bar.println(format!(
            "  {} {:<3} {}",
            green("✓"),
            format!("{}/{}", self.bar.position() + 1, total),
            dim(&truncate(url, 64)),
        ));
        self.bar.inc(1);
    }

    fn on_link_error(&self, _index: usize, total: usize, url: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:<3} {}  {}",
            red("✗"),
            format!("{}/{}", self.bar.position() + 1, total),
            dim(&truncate(url, 48)),
            red(&truncate(error, 60)),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_links: usize, failed_links: usize) {
        self.bar.finish_and_clear();
        if failed_links > 0 {
            eprintln!(
                "{} {}/{} links fetched  ({} failed)",
                if failed_links == total_links {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&(total_links - failed_links).to_string()),
                total_links,
                red(&failed_links.to_string()),
            );
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a deck into ./all_extracted_data.json
  deckharvest NaarioDeck2025.pdf

  # Explicit output path
  deckharvest deck.pdf -o runs/naario/extracted.json

  # Print the record to stdout instead of writing a file
  deckharvest deck.pdf --stdout

  # Sequential fetches, longer timeout, staging host with bad certs
  deckharvest deck.pdf --concurrency 1 --timeout 30 --insecure

  # Skip OCR (no tesseract installed, or speed matters)
  deckharvest deck.pdf --no-ocr

  # Count pages/links/images without fetching or OCR
  deckharvest --inspect-only deck.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH     Directory containing libpdfium (else system paths)
  RUST_LOG            Overrides the log filter (e.g. deckharvest=debug)

RUNTIME DEPENDENCIES:
  libpdfium           Required — page text extraction.
  tesseract           Optional — OCR descriptions of embedded charts.
                      Without it, pdf_graphs is empty and everything else
                      still works.
"#;

/// Extract text, images, and linked web content from a pitch-deck PDF.
#[derive(Parser, Debug)]
#[command(
    name = "deckharvest",
    version,
    about = "Extract text, images, and linked web content from pitch-deck PDFs",
    long_about = "Extract a pitch deck into a single JSON artifact: page text, OCR'd chart \
descriptions, embedded-image metadata, and the text/images/SVGs of every page the deck links \
to. The output feeds downstream note- and metric-generation agents.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write the JSON record to this file.
    #[arg(short, long, env = "DECKHARVEST_OUTPUT", default_value = DEFAULT_OUTPUT_FILENAME)]
    output: PathBuf,

    /// Print the JSON record to stdout instead of writing a file.
    #[arg(long)]
    stdout: bool,

    /// Per-link fetch timeout in seconds.
    #[arg(long, env = "DECKHARVEST_TIMEOUT", default_value_t = 10)]
    timeout: u64,

    /// Number of concurrent link fetches (1 = sequential).
    #[arg(short, long, env = "DECKHARVEST_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Accept invalid TLS certificates on link fetches (scoped to this run).
    #[arg(long, env = "DECKHARVEST_INSECURE")]
    insecure: bool,

    /// Skip OCR on embedded images.
    #[arg(long, env = "DECKHARVEST_NO_OCR")]
    no_ocr: bool,

    /// OCR language hint (two-letter code or tesseract traineddata name).
    #[arg(long, env = "DECKHARVEST_OCR_LANG", default_value = "en")]
    lang: String,

    /// Disable progress bar.
    #[arg(long, env = "DECKHARVEST_NO_PROGRESS")]
    no_progress: bool,

    /// Count pages/links/images only; no OCR, no network.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DECKHARVEST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DECKHARVEST_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active; the
    // bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.stdout;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let summary = inspect(&cli.input).await.context("Failed to inspect deck")?;
        println!("File:    {}", cli.input.display());
        println!("Pages:   {}", summary.page_count);
        println!("Links:   {}", summary.link_count);
        println!("Images:  {}", summary.image_count);
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ExtractionConfig::builder()
        .fetch_timeout_secs(cli.timeout)
        .concurrency(cli.concurrency)
        .danger_accept_invalid_certs(cli.insecure)
        .ocr(!cli.no_ocr)
        .ocr_lang(cli.lang.clone());

    if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        builder = builder.progress_callback(cb as Arc<dyn ExtractionProgressCallback>);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run extraction ───────────────────────────────────────────────────
    if cli.stdout {
        let output = extract(&cli.input, &config)
            .await
            .context("Extraction failed")?;
        let json = serde_json::to_string_pretty(&output.record)
            .context("Failed to serialise record")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .and_then(|_| handle.write_all(b"\n"))
            .context("Failed to write to stdout")?;
        print_summary(&cli, &output.stats, None);
    } else {
        let stats = extract_to_file(&cli.input, &cli.output, &config)
            .await
            .context("Extraction failed")?;
        print_summary(&cli, &stats, Some(&cli.output));
    }

    Ok(())
}

/// Final summary line on stderr (the callback already printed per-link logs).
fn print_summary(cli: &Cli, stats: &ExtractionStats, written_to: Option<&PathBuf>) {
    if cli.quiet {
        return;
    }

    let tick = if stats.failed_links == 0 {
        green("✔")
    } else {
        cyan("⚠")
    };
    let destination = written_to
        .map(|p| format!("  →  {}", bold(&p.display().to_string())))
        .unwrap_or_default();

    eprintln!(
        "{}  {} pages, {} images, {}/{} links ok{}",
        tick,
        stats.total_pages,
        stats.embedded_images,
        stats.links_discovered - stats.failed_links,
        stats.links_discovered,
        destination,
    );
    eprintln!(
        "   {} graph descriptions  {}",
        dim(&stats.ocr_descriptions.to_string()),
        dim(&format!(
            "pdf {}ms / web {}ms / total {}ms",
            stats.pdf_duration_ms, stats.web_duration_ms, stats.total_duration_ms
        )),
    );
    if stats.failed_links > 0 {
        eprintln!(
            "   {} — failed links are recorded in web_data with an error field",
            red(&format!("{} fetches failed", stats.failed_links)),
        );
    }
}
