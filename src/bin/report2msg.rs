//! CLI binary for edgequake-report2msg.
//!
//! A thin shim over the library crate that maps CLI flags to `ReportConfig`,
//! runs one report (or an interactive session) and prints the results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_report2msg::{
    ProgressCallback, ReportAssistant, ReportConfig, ReportOutcome, ReportProgressCallback,
    Resolution, DEFAULT_CONTACTS_FILE, DEFAULT_LINK_HOST,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while the model reads the report. A fresh bar is created
/// per report so interactive sessions can reuse the callback.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn clear(&self) {
        let bar = match self.bar.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    }
}

impl ReportProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, source: &str) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Reading report");
        bar.set_message(source.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        match self.bar.lock() {
            Ok(mut slot) => *slot = Some(bar),
            Err(poisoned) => *poisoned.into_inner() = Some(bar),
        }
    }

    fn on_extraction_complete(&self, _chars: usize) {
        self.clear();
    }

    fn on_extraction_error(&self, _error: &str) {
        self.clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One report, contacts from ./parents_data.csv
  report2msg report.jpg

  # Interactive session: type one image path or URL per line, 'quit' to stop
  report2msg --contacts class-3a.csv

  # Use a specific provider and model
  report2msg --provider openai --model gpt-4.1-mini report.png

  # JSON output for scripting
  report2msg --json report.jpg > outcome.json

CONTACT SHEET:
  A CSV file with at least these columns (extra columns are ignored):

    Student_Name,Parent_Phone
    Sara Ali Mohamed,201234567890
    Omar Khaled Hassan,201112223334

  The name read from the report matches the first row whose Student_Name
  contains it (case-sensitive). Phone numbers are used exactly as written,
  in international format without '+' for wa.me links.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (preferred)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Provider for --provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
"#;

/// Turn a photo of a student report into a parent WhatsApp message.
#[derive(Parser, Debug)]
#[command(
    name = "report2msg",
    version,
    about = "Turn a photo of a student report into a parent WhatsApp message",
    long_about = "Reads a student report image (JPEG or PNG, local file or URL) with a Vision \
Language Model, drafts a short message for the parent, looks up the parent's phone number in a \
CSV contact sheet and prints a pre-filled WhatsApp link. Without INPUT, starts an interactive \
session that reads one image per line from stdin.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Report image path or HTTP/HTTPS URL. Omit for an interactive session.
    input: Option<String>,

    /// CSV contact sheet with Student_Name and Parent_Phone columns.
    #[arg(long, env = "REPORT2MSG_CONTACTS", default_value = DEFAULT_CONTACTS_FILE)]
    contacts: PathBuf,

    /// LLM model ID (e.g. gemini-2.0-flash, gpt-4.1-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_LLM_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set \
          (GEMINI_API_KEY is preferred)."
    )]
    provider: Option<String>,

    /// Path to a text file with a custom instruction prompt.
    #[arg(long, env = "REPORT2MSG_PROMPT")]
    prompt: Option<PathBuf>,

    /// Host used in the generated link.
    #[arg(long, env = "REPORT2MSG_LINK_HOST", default_value = DEFAULT_LINK_HOST)]
    link_host: String,

    /// Max LLM output tokens.
    #[arg(long, env = "REPORT2MSG_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "REPORT2MSG_TEMPERATURE", default_value_t = 0.4)]
    temperature: f32,

    /// Longest image edge sent to the model, in pixels.
    #[arg(long, env = "REPORT2MSG_MAX_IMAGE_PIXELS", default_value_t = 2000)]
    max_image_pixels: u32,

    /// Model call timeout in seconds (default: no timeout).
    #[arg(long, env = "REPORT2MSG_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "REPORT2MSG_DOWNLOAD_TIMEOUT", default_value_t = 60)]
    download_timeout: u64,

    /// Output the full outcome as JSON.
    #[arg(long, env = "REPORT2MSG_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "REPORT2MSG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "REPORT2MSG_VERBOSE")]
    verbose: bool,

    /// Suppress everything except results and errors.
    #[arg(short, long, env = "REPORT2MSG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and the rendered result carry all user feedback; library
    // INFO logs would only interleave with them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Build config and assistant ───────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ReportProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;
    let assistant = ReportAssistant::new(config, &cli.contacts);

    // Startup problems are warnings, not failures: the session still runs.
    for warning in assistant.warnings() {
        eprintln!("{} {}", yellow("⚠"), yellow(&warning.to_string()));
    }
    if !cli.quiet && !assistant.contacts().is_empty() {
        eprintln!(
            "{} {} parent contacts loaded from {}",
            green("✔"),
            bold(&assistant.contacts().len().to_string()),
            cli.contacts.display()
        );
    }

    // ── Single report ────────────────────────────────────────────────────
    if let Some(ref input) = cli.input {
        let outcome = assistant
            .process(input)
            .await
            .context("Could not process the report")?;
        render(&cli, &outcome)?;
        return Ok(());
    }

    // ── Interactive session ──────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !cli.quiet {
            eprint!("{} ", bold("report image (path or URL, 'quit' to stop) ›"));
            io::stderr().flush().ok();
        }

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "quit" | "exit" | "q") {
            break;
        }

        match assistant.process(input).await {
            Ok(outcome) => render(&cli, &outcome)?,
            // Failures end this report only; the session keeps going.
            Err(e) => eprintln!("{} {}", red("✘"), red(&e.to_string())),
        }
    }

    Ok(())
}

/// Map CLI args to `ReportConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReportConfig> {
    let mut builder = ReportConfig::builder()
        .link_host(cli.link_host.clone())
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_image_pixels(cli.max_image_pixels)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref path) = cli.prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instruction prompt from {:?}", path))?;
        builder = builder.instruction_prompt(prompt);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Print one outcome: raw reply, then the link or the message to copy.
fn render(cli: &Cli, outcome: &ReportOutcome) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(outcome).context("Failed to serialise outcome")?;
        println!("{json}");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !cli.quiet {
        writeln!(out, "{}", bold("Model reply:"))?;
        writeln!(out, "{}", dim(outcome.extraction.raw_text.trim_end()))?;
        writeln!(out)?;
    }

    match &outcome.resolution {
        Resolution::Matched {
            student_name, link, ..
        } => {
            writeln!(
                out,
                "{} Parent number found for {}",
                green("✔"),
                bold(student_name)
            )?;
            writeln!(out, "{}", link)?;
        }
        Resolution::Unmatched {
            student_name,
            message,
        } => {
            writeln!(
                out,
                "{} No parent number found for ({}). Check the name matches the contact sheet.",
                yellow("⚠"),
                student_name
            )?;
            writeln!(out, "{}", bold("Suggested message (copy it manually):"))?;
            writeln!(out, "{}", message)?;
        }
    }

    if !cli.quiet && outcome.extraction.input_tokens + outcome.extraction.output_tokens > 0 {
        eprintln!(
            "   {} tokens in  /  {} tokens out  —  {}ms",
            dim(&outcome.extraction.input_tokens.to_string()),
            dim(&outcome.extraction.output_tokens.to_string()),
            outcome.extraction.duration_ms,
        );
    }

    Ok(())
}
