//! CLI binary for dietplan-md2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConsultConfig` / `ExportConfig` and prints results.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dietplan_md2pdf::config::DEFAULT_PDF_FILENAME;
use dietplan_md2pdf::error::UPSTREAM_FAILURE_MESSAGE;
use dietplan_md2pdf::{
    consult, dry_run, export_to_file, parse_day_plan, read_markdown, render_reply, ChatEntry,
    ChatSession, ConsultConfig, ConsultReply, ExportConfig, ExportStats, PlanError, QuickReply,
    Speaker,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
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
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Describe symptoms, get possible causes
  dietplan ask "sore throat and mild fever for two days"

  # Ask for a 7-day diet plan and save it as PDF
  dietplan ask "diet plan for acid reflux" --export diet-plan.pdf

  # Interactive session (answer the diet-plan offer with yes/no)
  dietplan chat

  # Show the day tables of a saved reply
  dietplan days reply.md

  # Export a saved reply; preview the layout without writing
  dietplan export reply.md -o plan.pdf
  dietplan export reply.md --dry-run

CHAT COMMANDS:
  yes / no          Answer the diet-plan offer
  /export [PATH]    Save the latest diet plan as PDF (default diet-plan.pdf)
  /quit             Leave the session

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  DIETPLAN_LLM_PROVIDER   Override provider (openai, anthropic, gemini, ollama)
  DIETPLAN_MODEL          Override model ID
  RUST_LOG                Log filter (overrides -v / -q)

The replies are generated by a language model and are not medical advice.
"#;

/// Symptom checker and diet-plan exporter backed by a hosted LLM.
#[derive(Parser, Debug)]
#[command(
    name = "dietplan",
    version,
    about = "Symptom checker and diet-plan exporter backed by a hosted LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DIETPLAN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DIETPLAN_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one message and print the reply.
    Ask {
        /// Symptoms, or a request mentioning diet / meal plan / nutrition.
        message: String,

        /// Save the reply's table as PDF when it contains a meal plan.
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,

        /// Output the reply as JSON (ConsultReply) instead of text.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        consult: ConsultArgs,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Interactive symptom-checker session on stdin.
    Chat {
        #[command(flatten)]
        consult: ConsultArgs,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Parse day blocks from a saved reply and print their tables.
    Days {
        /// Markdown file, or `-` for stdin.
        input: String,

        /// Output the parsed day tables as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export the first table of a saved reply as PDF.
    Export {
        /// Markdown file, or `-` for stdin.
        input: String,

        /// Output PDF path.
        #[arg(short, long, default_value = DEFAULT_PDF_FILENAME)]
        output: PathBuf,

        /// Paginate only and print layout statistics as JSON.
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

#[derive(Args, Debug)]
struct ConsultArgs {
    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "DIETPLAN_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "DIETPLAN_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "DIETPLAN_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max LLM output tokens per reply.
    #[arg(long, env = "DIETPLAN_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// Retries on LLM failure.
    #[arg(long, env = "DIETPLAN_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Per-call LLM timeout in seconds.
    #[arg(long, env = "DIETPLAN_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "DIETPLAN_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Title drawn at the top of the first page.
    #[arg(long, env = "DIETPLAN_TITLE")]
    title: Option<String>,

    /// Page margin in millimetres.
    #[arg(long, default_value_t = 10.0)]
    margin: f32,

    /// Do not repeat the header band on continuation pages.
    #[arg(long)]
    no_repeat_header: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
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

    match cli.command {
        Command::Ask {
            ref message,
            ref export,
            json,
            ref consult,
            ref layout,
        } => run_ask(&cli, message, export.as_deref(), json, consult, layout).await,
        Command::Chat {
            ref consult,
            ref layout,
        } => run_chat(&cli, consult, layout).await,
        Command::Days { ref input, json } => run_days(input, json),
        Command::Export {
            ref input,
            ref output,
            dry_run: dry,
            ref layout,
        } => run_export(&cli, input, output, dry, layout),
    }
}

// ── Subcommands ──────────────────────────────────────────────────────────────

async fn run_ask(
    cli: &Cli,
    message: &str,
    export: Option<&Path>,
    json: bool,
    args: &ConsultArgs,
    layout: &LayoutArgs,
) -> Result<()> {
    if message.trim().is_empty() {
        bail!("Message is empty");
    }
    let config = build_consult_config(args).await?;
    let show_spinner = !cli.quiet && !json;

    let reply: ConsultReply = match with_spinner(show_spinner, consult(message, &config)).await {
        Ok(reply) => reply,
        Err(e) if e.is_upstream() => {
            eprintln!("{} {}", red("✘"), UPSTREAM_FAILURE_MESSAGE);
            return Err(e).context("Consultation failed");
        }
        Err(e) => return Err(e).context("Consultation failed"),
    };

    if json {
        let out = serde_json::to_string_pretty(&reply).context("Failed to serialise reply")?;
        println!("{out}");
    } else {
        write_stdout(&render_reply(&reply.markdown))?;
    }

    if let Some(path) = export {
        if reply.is_exportable() {
            let config = build_export_config(layout)?;
            match export_to_file(&reply.markdown, path, &config) {
                Ok(stats) => report_export(cli, path, &stats),
                Err(PlanError::NoTableFound) => report_no_table(),
                Err(e) => return Err(e).context("Export failed"),
            }
        } else if !cli.quiet {
            eprintln!("{} reply has no meal plan; nothing exported", cyan("⚠"));
        }
    }

    if !cli.quiet && !json {
        eprintln!(
            "   {} tokens in  /  {} tokens out  ·  {}ms",
            dim(&reply.input_tokens.to_string()),
            dim(&reply.output_tokens.to_string()),
            reply.duration_ms,
        );
    }
    Ok(())
}

async fn run_chat(cli: &Cli, args: &ConsultArgs, layout: &LayoutArgs) -> Result<()> {
    let config = build_consult_config(args).await?;
    let export_config = build_export_config(layout)?;
    let mut session = ChatSession::new(config);

    for entry in session.entries() {
        print_entry(entry)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt_marker()?;
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let input = line.trim();

        if input == "/quit" || input == "/exit" {
            break;
        }
        if let Some(rest) = input.strip_prefix("/export") {
            let target = rest.trim();
            let path = if target.is_empty() {
                PathBuf::from(DEFAULT_PDF_FILENAME)
            } else {
                PathBuf::from(target)
            };
            match session.latest_plan() {
                Some(plan) => match export_to_file(plan, &path, &export_config) {
                    Ok(stats) => report_export(cli, &path, &stats),
                    Err(PlanError::NoTableFound) => report_no_table(),
                    Err(e) => eprintln!("{} {e}", red("✘")),
                },
                None => report_no_table(),
            }
            continue;
        }

        let added = if session.offer_pending() {
            match QuickReply::parse(input) {
                Some(answer) => {
                    with_spinner(!cli.quiet, session.quick_reply(answer))
                        .await
                        .to_vec()
                }
                None => with_spinner(!cli.quiet, session.send(input)).await.to_vec(),
            }
        } else {
            with_spinner(!cli.quiet, session.send(input)).await.to_vec()
        };

        for entry in added.iter().filter(|e| e.speaker == Speaker::Bot) {
            print_entry(entry)?;
            if entry.is_exportable() {
                println!("{}", dim("(type /export [PATH] to save this plan as PDF)"));
            }
        }
    }
    Ok(())
}

fn run_days(input: &str, json: bool) -> Result<()> {
    let markdown = read_markdown(input).context("Failed to read input")?;
    let days = parse_day_plan(&markdown);
    if json {
        let out = serde_json::to_string_pretty(&days).context("Failed to serialise days")?;
        println!("{out}");
    } else if days.is_empty() {
        bail!("No \"Day N\" labels found in input");
    } else {
        write_stdout(&dietplan_md2pdf::render_day_tables(&days))?;
    }
    Ok(())
}

fn run_export(
    cli: &Cli,
    input: &str,
    output: &Path,
    dry: bool,
    layout: &LayoutArgs,
) -> Result<()> {
    let markdown = read_markdown(input).context("Failed to read input")?;
    let config = build_export_config(layout)?;

    if dry {
        let stats = dry_run(&markdown, &config).map_err(export_error)?;
        let out = serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?;
        println!("{out}");
    } else {
        let stats = export_to_file(&markdown, output, &config).map_err(export_error)?;
        report_export(cli, output, &stats);
    }
    Ok(())
}

/// The missing-table alert is shown verbatim; everything else gets context.
fn export_error(e: PlanError) -> anyhow::Error {
    match e {
        PlanError::NoTableFound => anyhow::Error::new(e),
        other => anyhow::Error::new(other).context("Export failed"),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Await `fut` behind a spinner on stderr.
async fn with_spinner<F: Future>(show: bool, fut: F) -> F::Output {
    if !show {
        return fut.await;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message("Asking the model…");
    bar.enable_steady_tick(Duration::from_millis(80));
    let out = fut.await;
    bar.finish_and_clear();
    out
}

fn print_entry(entry: &ChatEntry) -> Result<()> {
    match entry.speaker {
        Speaker::User => println!("{} {}", bold("you:"), entry.text),
        Speaker::Bot => {
            println!("{}", cyan("bot:"));
            write_stdout(&render_reply(&entry.text))?;
        }
    }
    Ok(())
}

fn prompt_marker() -> Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "{} ", bold(">")).context("Failed to write to stdout")?;
    out.flush().context("Failed to flush stdout")
}

fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

fn report_export(cli: &Cli, path: &Path, stats: &ExportStats) {
    if cli.quiet {
        return;
    }
    eprintln!(
        "{}  {} rows × {} columns  {} page(s)  {:?}  →  {}",
        green("✔"),
        stats.row_count,
        stats.column_count,
        stats.page_count,
        stats.orientation,
        bold(&path.display().to_string()),
    );
}

fn report_no_table() {
    eprintln!("{} {}", red("✘"), PlanError::NoTableFound);
}

/// Map CLI args to `ConsultConfig`.
async fn build_consult_config(args: &ConsultArgs) -> Result<ConsultConfig> {
    let system_prompt = if let Some(ref path) = args.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut config = ConsultConfig::builder()
        .temperature(args.temperature)
        .max_tokens(args.max_tokens)
        .max_retries(args.max_retries)
        .api_timeout_secs(args.api_timeout)
        .build()
        .context("Invalid configuration")?;

    config.model = args.model.clone();
    config.provider_name = args.provider.clone();
    config.system_prompt = system_prompt;

    Ok(config)
}

/// Map CLI args to `ExportConfig`.
fn build_export_config(args: &LayoutArgs) -> Result<ExportConfig> {
    let mut builder = ExportConfig::builder()
        .margin(args.margin)
        .repeat_header(!args.no_repeat_header);
    if let Some(ref title) = args.title {
        builder = builder.title(title.clone());
    }
    builder.build().context("Invalid layout configuration")
}
