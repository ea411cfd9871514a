//! CLI binary for notes-ocr.
//!
//! A thin shim over the library crate that maps CLI flags and the
//! environment to `ClientConfig` and prints progress.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use notes_ocr::{
    ClientConfig, DocumentOutput, JobProgressCallback, OcrClient, ProgressCallback,
    DEFAULT_BASE_URL,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

/// Prints one block per document and spins while the job is being polled.
struct CliProgressCallback {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
        })
    }

    fn start_spinner(&self, doc_id: &str) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Transcribing");
        bar.set_message(doc_id.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(bar);
        }
    }

    /// Remove the spinner, if any, without leaving a line behind.
    fn clear(&self) {
        if let Some(bar) = self.spinner.lock().ok().and_then(|mut s| s.take()) {
            bar.finish_and_clear();
        }
    }
}

impl JobProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, dir: &Path, total: usize) {
        println!("Found {} PDF(s) in {}", bold(&total.to_string()), dir.display());
    }

    fn on_upload_start(&self, pdf: &Path) {
        let name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| pdf.display().to_string());
        println!("\n{} Uploading: {}", cyan("◆"), bold(&name));
    }

    fn on_uploaded(&self, _pdf: &Path, doc_id: &str) {
        println!("Document id: {doc_id}");
        self.start_spinner(doc_id);
    }

    fn on_poll(&self, doc_id: &str, attempt: u32, status: Option<&str>) {
        let status = status.unwrap_or("queued");
        if let Ok(slot) = self.spinner.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_message(format!("{doc_id}  {}", dim(&format!("{status} · poll {attempt}"))));
            }
        }
    }

    fn on_saved(&self, _pdf: &Path, output: &DocumentOutput) {
        self.clear();
        println!("{} Saved to {}", green("✔"), output.out_dir.display());
        println!(
            "page_count={} results={}",
            output
                .page_count
                .map_or_else(|| "unknown".to_string(), |n| n.to_string()),
            output.results
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Single PDF
  notes2text --pdf ./data/lecture-01.pdf --out ./out

  # Batch (all PDFs in a folder, sorted by name)
  notes2text --dir ./data --out ./out

  # Give up on a job after 15 minutes instead of waiting forever
  notes2text --dir ./data --out ./out --max-wait 900

OUTPUT:
  <out>/<stem>/<stem>.raw.json    full API response
  <out>/<stem>/<stem>.pages.json  page number → transcript
  <out>/<stem>/<stem>.txt         merged transcript, pages in order

ENVIRONMENT VARIABLES (a local .env file is loaded first):
  HANDWRITING_OCR_TOKEN     API token (required)
  HANDWRITING_OCR_BASE_URL  Override the API root
  RUST_LOG                  tracing filter, e.g. notes_ocr=debug
"#;

/// Transcribe handwritten PDF notes with the handwritingocr.com API.
#[derive(Parser, Debug)]
#[command(
    name = "notes2text",
    version,
    about = "Transcribe handwritten PDF notes with the handwritingocr.com API",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP,
    group(ArgGroup::new("source").required(true).args(["pdf", "dir"]))
)]
struct Cli {
    /// Process a single PDF file.
    #[arg(long, value_name = "PATH")]
    pdf: Option<PathBuf>,

    /// Process every *.pdf directly inside this directory.
    #[arg(long, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Output base directory (created if missing).
    #[arg(long, value_name = "DIR")]
    out: PathBuf,

    /// API bearer token.
    #[arg(long, env = "HANDWRITING_OCR_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API root URL.
    #[arg(long, env = "HANDWRITING_OCR_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Seconds between status polls.
    #[arg(long, default_value_t = 1.0)]
    poll_interval: f64,

    /// Stop polling a job after this many seconds (default: wait forever).
    #[arg(long, value_name = "SECS")]
    max_wait: Option<u64>,

    /// Attempts per request while rate limited (HTTP 429).
    #[arg(long, default_value_t = 8,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: u32,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 60,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress progress output; only errors are printed.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so `env = ...` args see its values.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let token = cli
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .context("Missing HANDWRITING_OCR_TOKEN (put it in .env)")?
        .to_string();

    // ── Build config ─────────────────────────────────────────────────────
    let progress = (!cli.quiet).then(CliProgressCallback::new);
    let config = build_config(&cli, token, progress.clone().map(|p| p as ProgressCallback))?;
    let client = OcrClient::new(config).context("Failed to initialise HTTP client")?;

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("Failed to create output directory {:?}", cli.out))?;
    let out_base = cli
        .out
        .canonicalize()
        .with_context(|| format!("Failed to resolve output directory {:?}", cli.out))?;

    // ── Run ──────────────────────────────────────────────────────────────
    let result = match (&cli.pdf, &cli.dir) {
        (Some(pdf), _) => {
            let pdf = std::path::absolute(pdf).with_context(|| format!("Invalid path {pdf:?}"))?;
            client
                .process_one(&pdf, &out_base)
                .await
                .map(|doc| vec![doc])
                .with_context(|| format!("Failed to process {}", pdf.display()))
        }
        (None, Some(dir)) => {
            let dir = std::path::absolute(dir).with_context(|| format!("Invalid path {dir:?}"))?;
            client
                .process_dir(&dir, &out_base)
                .await
                .with_context(|| format!("Batch in {} aborted", dir.display()))
        }
        (None, None) => anyhow::bail!("either --pdf or --dir is required"),
    };

    if let Some(ref cb) = progress {
        cb.clear();
    }
    let docs = result?;

    if !cli.quiet && docs.len() > 1 {
        println!(
            "\n{} {} documents transcribed",
            green("✔"),
            bold(&docs.len().to_string())
        );
    }
    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(
    cli: &Cli,
    token: String,
    progress: Option<ProgressCallback>,
) -> Result<ClientConfig> {
    let poll_interval = Duration::try_from_secs_f64(cli.poll_interval)
        .with_context(|| format!("Invalid --poll-interval {}", cli.poll_interval))?;

    let mut builder = ClientConfig::builder(token)
        .base_url(cli.base_url.as_str())
        .poll_interval(poll_interval)
        .max_attempts(cli.max_attempts)
        .request_timeout_secs(cli.timeout);

    if let Some(secs) = cli.max_wait {
        builder = builder.max_wait(Duration::from_secs(secs));
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
