//! Pipeline stages for turning model replies into tables and PDFs.
//!
//! Each submodule implements one transformation step and is testable on
//! its own. Only [`llm`] does network I/O.
//!
//! ## Data Flow
//!
//! ```text
//!                      ┌─▶ lines ─▶ blocks ─────────────▶ Grid per day (screen)
//! llm ─▶ postprocess ──┤
//!                      └─▶ table ─▶ layout ─▶ pdf ──────▶ PDF bytes (export)
//!                                     ▲
//!                                  metrics
//! ```
//!
//! 1. [`llm`]: chat-completion call with retry, backoff and timeout
//! 2. [`postprocess`]: deterministic cleanup of model markdown
//! 3. [`lines`]: per-line classifier (label, separator, data, prose)
//! 4. [`blocks`]: split into day blocks and extract one grid each
//! 5. [`table`]: first GFM table via `pulldown-cmark`
//! 6. [`metrics`]: Helvetica widths and word wrapping
//! 7. [`layout`]: paginate a grid into positioned rects and text
//! 8. [`pdf`]: serialise a layout with `pdf-writer`

pub mod blocks;
pub mod layout;
pub mod lines;
pub mod llm;
pub mod metrics;
pub mod pdf;
pub mod postprocess;
pub mod table;
