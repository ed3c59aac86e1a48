//! CLI binary for edgequake-ocr.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `RecognitionConfig`, drives one `OcrSession`, and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_ocr::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use edgequake_ocr::pipeline::intake::format_file_size;
use edgequake_ocr::{
    NotificationKind, Notifier, OcrSession, ProgressCallback, ProgressState, RecognitionConfig,
    RecognitionProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
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

/// Terminal progress bar driven by the pipeline's coarse checkpoints.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new(file_label: String) -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix(file_label);
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl RecognitionProgressCallback for CliProgressCallback {
    fn on_progress(&self, percent: u8) {
        self.bar.set_position(percent as u64);
        self.bar
            .set_message(ProgressState::new(percent).phase_label().to_string());
    }

    fn on_attempt(&self, attempt: u32, max_attempts: u32) {
        if attempt > 1 {
            self.bar.set_message(format!(
                "Extracting text with AI model... (attempt {attempt}/{max_attempts})"
            ));
        }
    }

    fn on_retry(&self, attempt: u32, delay: Duration) {
        self.bar.println(format!(
            "  {} Attempt {} rate limited, waiting {}",
            cyan("↻"),
            attempt,
            dim(&format!("{:.1}s", delay.as_secs_f64())),
        ));
    }

    fn on_finish(&self, _success: bool) {
        self.bar.finish_and_clear();
    }
}

// ── CLI notifier ─────────────────────────────────────────────────────────────

/// Prints notifications to stderr, above the progress bar when one is shown.
struct CliNotifier {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl Notifier for CliNotifier {
    fn show(&self, message: &str, kind: NotificationKind) {
        let line = match kind {
            NotificationKind::Success if self.quiet => return,
            NotificationKind::Success => format!("{} {}", green("✔"), message),
            NotificationKind::Error => format!("{} {}", red("✘"), red(message)),
        };
        match self.bar {
            Some(ref bar) if !bar.is_finished() => bar.println(line),
            _ => eprintln!("{line}"),
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print extracted text to stdout
  ocr2txt receipt.jpg

  # Save as receipt.txt next to the input
  ocr2txt receipt.jpg --save

  # Save into a directory
  ocr2txt scan.pdf -o out/

  # Copy to the clipboard (terminals with OSC 52 support)
  ocr2txt whiteboard.png --copy

  # JSON output with timing stats
  ocr2txt invoice.tiff --json

SUPPORTED FILES:
  PNG, JPG, WEBP, TIFF, PDF — up to 20 MB

RETRIES:
  HTTP 429 responses are retried up to --max-attempts times in total, waiting
  1s, 2s, 4s, 8s … (--retry-backoff-ms × 2^n) between attempts. Any other
  error stops immediately.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key
  OCR2TXT_MODEL           Override model ID
  OCR2TXT_ENDPOINT        Override REST base URL
  RUST_LOG                Override log filter
"#;

/// Extract text from images and documents using a Vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "ocr2txt",
    version,
    about = "Extract text from images and documents using a Vision LLM",
    long_about = "Send one image or PDF to Google Gemini for optical character recognition \
and print, save, or copy the extracted plain text.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image or PDF to read (PNG, JPG, WEBP, TIFF, PDF).
    input: PathBuf,

    /// Save `<name>.txt` into this directory instead of printing to stdout.
    #[arg(short, long, env = "OCR2TXT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Save `<name>.txt` next to the input file.
    #[arg(long, conflicts_with = "output_dir")]
    save: bool,

    /// Copy the text to the system clipboard via the terminal (OSC 52).
    #[arg(long)]
    copy: bool,

    /// Gemini model ID.
    #[arg(long, env = "OCR2TXT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// REST base URL of the generateContent API.
    #[arg(long, env = "OCR2TXT_ENDPOINT", default_value = DEFAULT_BASE_URL)]
    endpoint: String,

    /// API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Total attempts when the API answers 429.
    #[arg(long, env = "OCR2TXT_MAX_ATTEMPTS", default_value_t = 5,
          value_parser = clap::value_parser!(u32).range(1..=10))]
    max_attempts: u32,

    /// Base backoff delay in milliseconds (doubles per attempt).
    #[arg(long, env = "OCR2TXT_RETRY_BACKOFF_MS", default_value_t = 1000)]
    retry_backoff_ms: u64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "OCR2TXT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Path to a text file containing a custom extraction instruction.
    #[arg(long, env = "OCR2TXT_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Strip code fences, CRLF and invisible characters from the output.
    #[arg(long, env = "OCR2TXT_CLEAN")]
    clean: bool,

    /// Output the result as JSON (text, file name, stats).
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "OCR2TXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCR2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result itself.
    #[arg(short, long, env = "OCR2TXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar and notifier cover what a user needs; library INFO
    // logs would only interleave with the bar.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && io::stderr().is_terminal();
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

    // ── Build session ────────────────────────────────────────────────────
    let progress = if show_progress {
        Some(CliProgressCallback::new(file_label(&cli.input)))
    } else {
        None
    };
    let notifier = Arc::new(CliNotifier {
        bar: progress.as_ref().map(|p| p.bar.clone()),
        quiet: cli.quiet,
    });

    let config = build_config(&cli, progress.map(|p| p as ProgressCallback), notifier).await?;
    let mut session = OcrSession::new(config).context("Failed to set up the Gemini client")?;

    // ── Intake ───────────────────────────────────────────────────────────
    session
        .stage_path(&cli.input)
        .with_context(|| format!("Cannot use {}", cli.input.display()))?;
    if !cli.quiet && !show_progress {
        if let Some(file) = session.pending() {
            eprintln!(
                "{} {}  {}",
                cyan("◆"),
                bold(file.name()),
                dim(&format!("{}, {}", file.media_type(), format_file_size(file.size()))),
            );
        }
    }

    // ── Recognize ────────────────────────────────────────────────────────
    let result = session
        .recognize()
        .await
        .context("Recognition failed")?
        .clone();

    // ── Present ──────────────────────────────────────────────────────────
    let save_dir = match (&cli.output_dir, cli.save) {
        (Some(dir), _) => Some(dir.clone()),
        (None, true) => Some(parent_dir(&cli.input)),
        (None, false) => None,
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        println!("{json}");
    } else if save_dir.is_none() {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(result.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !result.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if let Some(dir) = save_dir {
        let path = session
            .save_result(&dir)
            .context("Failed to save result")?;
        if !cli.quiet {
            eprintln!("   → {}", bold(&path.display().to_string()));
        }
    }

    if cli.copy {
        let mut stderr = io::stderr();
        if stderr.is_terminal() {
            let seq = session.copy_result().context("Failed to copy result")?;
            stderr
                .write_all(seq.as_bytes())
                .and_then(|_| stderr.flush())
                .context("Failed to write clipboard sequence")?;
        } else {
            eprintln!("{} --copy needs a terminal on stderr; skipped", cyan("⚠"));
        }
    }

    if !cli.quiet {
        eprintln!(
            "   {} chars  /  {} attempt(s)  —  {}ms total",
            dim(&result.text.chars().count().to_string()),
            dim(&result.stats.attempts.to_string()),
            result.stats.total_duration_ms,
        );
    }

    Ok(())
}

/// Map CLI args to `RecognitionConfig`.
async fn build_config(
    cli: &Cli,
    progress: Option<ProgressCallback>,
    notifier: Arc<CliNotifier>,
) -> Result<RecognitionConfig> {
    let mut builder = RecognitionConfig::builder()
        .base_url(&cli.endpoint)
        .model(&cli.model)
        .max_attempts(cli.max_attempts)
        .retry_backoff_ms(cli.retry_backoff_ms)
        .api_timeout_secs(cli.api_timeout)
        .clean_output(cli.clean)
        .notifier(notifier);

    if let Some(ref path) = cli.prompt_file {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.instruction(prompt.trim());
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
