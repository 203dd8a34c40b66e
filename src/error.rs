//! Error types for the dietplan-md2pdf library.
//!
//! Every failure here is terminal for the current operation but local to
//! it: the caller reports the message to the user and carries on. Nothing is
//! retried at this level (the LLM stage retries internally before giving up).
//!
//! Malformed table rows have no variant: ragged rows and
//! stray pipes are absorbed by the parser, never surfaced as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Chat message shown when the model cannot be reached.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Error connecting to the AI service.";

/// All errors returned by the dietplan-md2pdf library.
#[derive(Debug, Error)]
pub enum PlanError {
    // ── Export errors ─────────────────────────────────────────────────────
    /// The markdown handed to the PDF exporter contains no table.
    ///
    /// The exporter writes nothing when this is returned.
    #[error("No table found in the plan to export.")]
    NoTableFound,

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input markdown file does not exist.
    #[error("Input file not found: '{path}'")]
    InputNotFound { path: PathBuf },

    /// Input markdown file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No provider could be constructed (missing API key, unknown name).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Every attempt to reach the model failed.
    #[error("Error connecting to the AI service. ({detail})")]
    Upstream { detail: String },

    /// The model did not answer within the configured timeout.
    #[error("Error connecting to the AI service. (no answer after {secs}s)")]
    UpstreamTimeout { secs: u64 },
}

impl PlanError {
    /// True for failures talking to the model, which a chat surface reports
    /// as a bot message instead of aborting.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            PlanError::Upstream { .. }
                | PlanError::UpstreamTimeout { .. }
                | PlanError::ProviderNotConfigured { .. }
        )
    }
}
