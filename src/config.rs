//! Configuration types for plan export and model consultation.
//!
//! Two independent configs, each built through a consuming builder that
//! validates on [`build`](ExportConfigBuilder::build):
//!
//! * [`ExportConfig`]: page geometry and every layout constant used by the
//!   PDF paginator. Nothing in the layout code is a bare literal.
//! * [`ConsultConfig`]: which model to ask and how patiently.

use crate::error::PlanError;
use crate::prompts::DEFAULT_SYSTEM_PROMPT;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default output filename for exported plans.
pub const DEFAULT_PDF_FILENAME: &str = "diet-plan.pdf";

/// Default title drawn at the top of the first page.
pub const DEFAULT_TITLE: &str = "Personalized Diet Plan";

/// Default model when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

// ── Export ───────────────────────────────────────────────────────────────

/// Page geometry and table layout for PDF export.
///
/// All lengths are millimetres, font sizes are points.
///
/// # Example
/// ```rust
/// use dietplan_md2pdf::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .title("Week 1")
///     .margin(12.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.title, "Week 1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Paper size in portrait orientation. Default: A4.
    pub page_size: PageSize,
    /// Margin on all four sides. Default: 10.
    pub margin: f32,
    /// Tables with more columns than this are laid out landscape. Default: 4.
    pub landscape_threshold: usize,
    /// Title on the first page. Default: "Personalized Diet Plan".
    pub title: String,
    /// Default: 14.
    pub title_font_size: f32,
    /// Cursor advance after the title. Default: 10.
    pub title_advance: f32,
    /// Header and body text size. Default: 10.
    pub font_size: f32,
    /// Fixed height of the header band. Default: 8.
    pub header_height: f32,
    /// Vertical advance per wrapped line. Default: 5.
    pub line_height: f32,
    /// Added to every data row's wrapped height. Default: 2.
    pub row_padding: f32,
    /// Horizontal inset of text inside a cell, each side. Default: 2.
    pub cell_inset: f32,
    /// Distance from a cell's top edge to its first baseline. Default: 5.
    pub baseline_offset: f32,
    /// Cell border stroke width. Default: 0.2.
    pub border_width: f32,
    /// Re-draw the header band at the top of every continuation page. Default: true.
    pub repeat_header: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margin: 10.0,
            landscape_threshold: 4,
            title: DEFAULT_TITLE.to_string(),
            title_font_size: 14.0,
            title_advance: 10.0,
            font_size: 10.0,
            header_height: 8.0,
            line_height: 5.0,
            row_padding: 2.0,
            cell_inset: 2.0,
            baseline_offset: 5.0,
            border_width: 0.2,
            repeat_header: true,
        }
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Orientation for a table with `columns` columns.
    pub fn orientation_for(&self, columns: usize) -> Orientation {
        if columns > self.landscape_threshold {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Page (width, height) for the given orientation.
    pub fn page_dimensions(&self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.page_size.portrait();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn margin(mut self, mm: f32) -> Self {
        self.config.margin = mm;
        self
    }

    pub fn landscape_threshold(mut self, columns: usize) -> Self {
        self.config.landscape_threshold = columns;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn title_font_size(mut self, pt: f32) -> Self {
        self.config.title_font_size = pt;
        self
    }

    pub fn font_size(mut self, pt: f32) -> Self {
        self.config.font_size = pt;
        self
    }

    pub fn header_height(mut self, mm: f32) -> Self {
        self.config.header_height = mm;
        self
    }

    pub fn line_height(mut self, mm: f32) -> Self {
        self.config.line_height = mm;
        self
    }

    pub fn row_padding(mut self, mm: f32) -> Self {
        self.config.row_padding = mm;
        self
    }

    pub fn cell_inset(mut self, mm: f32) -> Self {
        self.config.cell_inset = mm;
        self
    }

    pub fn repeat_header(mut self, v: bool) -> Self {
        self.config.repeat_header = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, PlanError> {
        let c = &self.config;
        let (w, h) = c.page_size.portrait();
        if c.margin < 0.0 || c.margin * 2.0 >= w.min(h) {
            return Err(PlanError::InvalidConfig(format!(
                "margin {}mm leaves no usable area on a {}x{}mm page",
                c.margin, w, h
            )));
        }
        if c.font_size <= 0.0 || c.title_font_size <= 0.0 {
            return Err(PlanError::InvalidConfig("font sizes must be > 0".into()));
        }
        if c.line_height <= 0.0 || c.header_height <= 0.0 {
            return Err(PlanError::InvalidConfig(
                "line and header heights must be > 0".into(),
            ));
        }
        if c.row_padding < 0.0 || c.cell_inset < 0.0 {
            return Err(PlanError::InvalidConfig(
                "padding and inset must be ≥ 0".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Paper size, stored in portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// ISO A4, 210 × 297 mm. (default)
    #[default]
    A4,
    /// US Letter, 215.9 × 279.4 mm.
    Letter,
    /// Arbitrary (width, height) in millimetres.
    Custom(f32, f32),
}

impl PageSize {
    /// (width, height) in portrait orientation.
    pub fn portrait(&self) -> (f32, f32) {
        match *self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Custom(w, h) => (w.min(h), w.max(h)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

// ── Consult ──────────────────────────────────────────────────────────────

/// How to reach the model.
///
/// # Example
/// ```rust
/// use dietplan_md2pdf::ConsultConfig;
///
/// let config = ConsultConfig::builder()
///     .model("gpt-4.1-mini")
///     .temperature(0.3)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConsultConfig {
    /// Model identifier. If None, [`DEFAULT_MODEL`] or the provider default.
    pub model: Option<String>,

    /// Provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Maximum completion tokens. A 7-day table runs ~1 500 tokens. Default: 2048.
    pub max_tokens: usize,

    /// Retries after the first failed attempt. Default: 2.
    pub max_retries: u32,

    /// Initial retry delay, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Replaces the built-in system instruction when set.
    pub system_prompt: Option<String>,

    /// Per-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for ConsultConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.7,
            max_tokens: 2048,
            max_retries: 2,
            retry_backoff_ms: 500,
            system_prompt: None,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for ConsultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsultConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ConsultConfig {
    /// Create a new builder for `ConsultConfig`.
    pub fn builder() -> ConsultConfigBuilder {
        ConsultConfigBuilder {
            config: Self::default(),
        }
    }

    /// The system instruction actually sent.
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}

/// Builder for [`ConsultConfig`].
#[derive(Debug)]
pub struct ConsultConfigBuilder {
    config: ConsultConfig,
}

impl ConsultConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConsultConfig, PlanError> {
        if self.config.max_tokens == 0 {
            return Err(PlanError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if self.config.api_timeout_secs == 0 {
            return Err(PlanError::InvalidConfig(
                "api timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
