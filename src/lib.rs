//! # dietplan-md2pdf
//!
//! Symptom-checker plumbing around a hosted chat model: ask about symptoms
//! or a diet plan, render the markdown reply as day-by-day tables, and
//! export the plan's table as a paginated PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! message
//!  │
//!  ├─ 1. Classify  diagnosis or diet-plan template
//!  ├─ 2. Consult   chat completion via edgequake-llm (retry, timeout)
//!  ├─ 3. Polish    markdown cleanup (fences, delimiter rows, spacing)
//!  ├─ 4. Parse     "Day N" blocks → one Grid each (terminal view)
//!  └─ 5. Export    first table → paginated layout → PDF
//! ```
//!
//! Steps 3–5 are pure and need no provider or API key.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dietplan_md2pdf::{consult, export_to_file, ConsultConfig, ExportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let reply = consult("diet plan for acid reflux", &ConsultConfig::default()).await?;
//!     println!("{}", dietplan_md2pdf::render_reply(&reply.markdown));
//!     if reply.is_exportable() {
//!         export_to_file(&reply.markdown, "diet-plan.pdf", &ExportConfig::default())?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `dietplan` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod classify;
pub mod config;
pub mod consult;
pub mod error;
pub mod export;
pub mod grid;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod screen;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use classify::{is_exportable_plan, looks_like_day_plan, RequestKind};
pub use config::{
    ConsultConfig, ConsultConfigBuilder, ExportConfig, ExportConfigBuilder, Orientation, PageSize,
};
pub use consult::{consult, resolve_provider};
pub use error::PlanError;
pub use export::{dry_run, export_layout, export_pdf, export_to_file, read_markdown};
pub use grid::{DayTable, Grid};
pub use output::{ConsultReply, ExportOutput, ExportStats};
pub use pipeline::blocks::{extract_grid, parse_day_plan, split_day_blocks, Block};
pub use pipeline::layout::{paginate, Layout};
pub use pipeline::lines::{classify_line, LineKind};
pub use pipeline::metrics::{Helvetica, TextMeasure};
pub use screen::{render_day_tables, render_reply};
pub use session::{ChatEntry, ChatSession, QuickReply, Speaker};
