//! CLI binary for design2code.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `GenerationConfig`, drives one session, and prints the generated code.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Parser;
use design2code::{
    GenerationConfig, GenerationSession, OutputFormat, ProgressCallback, SessionStatus,
    SliceProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
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

// ── Terminal progress callback using indicatif ───────────────────────────────

/// Renders a live page-by-page bar while the PDF is being sliced.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_document_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl SliceProgressCallback for CliProgressCallback {
    fn on_document_start(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Slicing");
    }

    fn on_page_start(&self, current: usize, _total: usize) {
        self.bar.set_message(format!("page {current}"));
        self.bar.set_position(current.saturating_sub(1) as u64);
    }

    fn on_document_complete(&self, total_pages: usize, slice_count: usize) {
        self.bar.set_position(total_pages as u64);
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} page(s) → {} high-res slice(s)",
            green("✔"),
            bold(&total_pages.to_string()),
            bold(&slice_count.to_string()),
        );
    }
}

/// Cosmetic "vision analysis" phrases cycled while the model call is in
/// flight. Purely presentational — there is no correlation with the actual
/// progress of the remote call.
const ANALYSIS_STAGES: &[&str] = &[
    "Stage 1: Segmenting vertical slices…",
    "Stage 2: Detecting UI elements…",
    "Stage 3: Measuring spatial distances…",
    "Stage 4: Transcribing text and colors…",
    "Writing code…",
];

fn generation_spinner(format: OutputFormat) -> (ProgressBar, tokio::task::JoinHandle<()>) {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix(format!("Generating {}", format.label()));
    bar.enable_steady_tick(Duration::from_millis(80));

    let cycling = bar.clone();
    let handle = tokio::spawn(async move {
        let mut i = 0usize;
        loop {
            cycling.set_message(ANALYSIS_STAGES[i % ANALYSIS_STAGES.len()]);
            i += 1;
            tokio::time::sleep(Duration::from_millis(1200)).await;
        }
    });

    (bar, handle)
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (React + Tailwind, stdout)
  design2code landing-page.pdf

  # Bootstrap output to a file
  design2code --format bootstrap design.pdf -o index.html

  # Copy the generated component straight to the clipboard
  design2code design.pdf --copy

  # Dump the intermediate JPEG slices for inspection
  design2code design.pdf --slices-dir ./slices

  # Use a specific model
  design2code --provider gemini --model gemini-2.0-flash design.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium shared library

SETUP:
  1. Set an API key:  export OPENAI_API_KEY=sk-...
  2. Convert:         design2code design.pdf -o App.tsx
"#;

/// Convert UI design PDFs into React or Bootstrap code using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "design2code",
    version,
    about = "Convert UI design PDFs into React or Bootstrap code using Vision LLMs",
    long_about = "Convert a PDF export of a UI design into production-ready source code. \
Each page is rendered at high resolution, over-tall pages are sliced into contiguous \
vertical bands, and the slices are sent to a vision model in a single request.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Target format: react (single .tsx component) or bootstrap (single .html file).
    #[arg(short, long, env = "DESIGN2CODE_FORMAT", value_enum, default_value = "react")]
    format: FormatArg,

    /// Write the generated code to this file instead of stdout.
    #[arg(short, long, env = "DESIGN2CODE_OUTPUT")]
    output: Option<PathBuf>,

    /// Copy the generated code to the system clipboard.
    #[arg(long)]
    copy: bool,

    /// Dump the intermediate JPEG slices into this directory.
    #[arg(long, env = "DESIGN2CODE_SLICES_DIR")]
    slices_dir: Option<PathBuf>,

    /// Rendering scale factor (> 0).
    #[arg(long, env = "DESIGN2CODE_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Maximum vertical pixels per slice.
    #[arg(long, env = "DESIGN2CODE_MAX_CHUNK_HEIGHT", default_value_t = 2500)]
    max_chunk_height: u32,

    /// Vision model ID (e.g. gpt-4.1-nano, gemini-2.0-flash).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_LLM_PROVIDER")]
    provider: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "DESIGN2CODE_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max model output tokens.
    #[arg(long, env = "DESIGN2CODE_MAX_TOKENS", default_value_t = 65_536)]
    max_tokens: usize,

    /// Path to a text file containing a custom system instruction.
    #[arg(long, env = "DESIGN2CODE_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Output structured JSON instead of bare code.
    #[arg(long, env = "DESIGN2CODE_JSON")]
    json: bool,

    /// Disable progress output.
    #[arg(long, env = "DESIGN2CODE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DESIGN2CODE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DESIGN2CODE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    React,
    Bootstrap,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::React => OutputFormat::React,
            FormatArg::Bootstrap => OutputFormat::Bootstrap,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active; the
    // bar provides all the feedback that matters to the user.
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

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli, show_progress).await?;
    let format: OutputFormat = cli.format.into();
    let mut session = GenerationSession::new(config);

    // ── Slice the design ─────────────────────────────────────────────────
    let slice_count = session
        .begin_upload(&cli.input)
        .await
        .with_context(|| format!("Failed to process '{}'", cli.input.display()))?;

    if let Some(ref dir) = cli.slices_dir {
        dump_slices(&session, dir)?;
        if !cli.quiet {
            eprintln!(
                "{} {} slice(s) written to {}",
                green("✔"),
                slice_count,
                bold(&dir.display().to_string())
            );
        }
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let spinner = show_progress.then(|| generation_spinner(format));

    let outcome = session.generate().await;

    if let Some((bar, cycler)) = spinner {
        cycler.abort();
        bar.finish_and_clear();
    }

    if outcome.is_err() {
        // Full detail went to the tracing log; the user gets the fixed
        // retry guidance regardless of cause.
        let message = session
            .error_message()
            .unwrap_or("Failed to generate code.");
        eprintln!("{} {}", red("✘"), message);
        std::process::exit(1);
    }

    debug_assert_eq!(session.status(), SessionStatus::Completed);
    let code = session.result().unwrap_or_default().to_string();

    // ── Emit result ──────────────────────────────────────────────────────
    if cli.copy {
        let mut clipboard = arboard::Clipboard::new().context("Failed to open clipboard")?;
        clipboard
            .set_text(code.clone())
            .context("Failed to copy to clipboard")?;
        if !cli.quiet {
            eprintln!("{} Code copied to clipboard", green("✔"));
        }
    }

    if cli.json {
        let payload = serde_json::json!({
            "format": format.to_string(),
            "suggested_file_name": format.suggested_file_name(),
            "slice_count": slice_count,
            "code": code,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if let Some(ref output_path) = cli.output {
        std::fs::write(output_path, &code)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{} {}  →  {}",
                green("✔"),
                format.label(),
                bold(&output_path.display().to_string()),
            );
        }
    } else if !cli.copy {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(code.as_bytes())?;
        if !code.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        if !cli.quiet {
            eprintln!(
                "{}",
                dim(&format!(
                    "— save as {} ({})",
                    format.suggested_file_name(),
                    cyan(format.label())
                ))
            );
        }
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`.
async fn build_config(cli: &Cli, show_progress: bool) -> Result<GenerationConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {path:?}"))?,
        )
    } else {
        None
    };

    let mut builder = GenerationConfig::builder()
        .scale(cli.scale)
        .max_chunk_height(cli.max_chunk_height)
        .format(cli.format.into())
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens);

    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new_dynamic();
        builder = builder.progress_callback(cb);
    }

    let mut config = builder.build().context("Invalid configuration")?;
    config.model = cli.model.clone();
    config.provider_name = cli.provider.clone();
    config.system_prompt = system_prompt;

    Ok(config)
}

/// Write each slice as `page-NN-slice-NN.jpg` under `dir`.
fn dump_slices(session: &GenerationSession, dir: &PathBuf) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create '{}'", dir.display()))?;

    for s in session.slices() {
        let bytes = STANDARD
            .decode(&s.image)
            .context("Slice payload is not valid base64")?;
        let name = format!("page-{:02}-slice-{:03}.jpg", s.page_number, s.ordinal);
        std::fs::write(dir.join(&name), bytes)
            .with_context(|| format!("Failed to write slice '{name}'"))?;
    }
    Ok(())
}
