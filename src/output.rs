//! Result types returned by export and consult.

use crate::classify::RequestKind;
use crate::config::Orientation;
use crate::grid::Grid;
use crate::pipeline::layout::Layout;
use serde::{Deserialize, Serialize};

/// A rendered PDF plus what went into it.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// The complete PDF file.
    pub pdf: Vec<u8>,
    /// The table that was rendered (the first one in the markdown).
    pub grid: Grid,
    /// Page-by-page layout the PDF was written from.
    pub layout: Layout,
    pub stats: ExportStats,
}

/// Summary of one export, suitable for `--json` / `--dry-run` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportStats {
    pub page_count: usize,
    pub column_count: usize,
    pub row_count: usize,
    pub orientation: Orientation,
    /// Uniform column width in millimetres.
    pub column_width_mm: f32,
    /// Size of the PDF in bytes; 0 for a dry run.
    pub bytes: usize,
    pub duration_ms: u64,
}

/// One answer from the model, cleaned and classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultReply {
    /// Which template the request used.
    pub kind: RequestKind,
    /// Cleaned markdown reply.
    pub markdown: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub retries: u32,
}

impl ConsultReply {
    /// Render as day tables rather than prose.
    pub fn is_day_plan(&self) -> bool {
        crate::classify::looks_like_day_plan(&self.markdown)
    }

    /// Offer PDF export for this reply.
    pub fn is_exportable(&self) -> bool {
        crate::classify::is_exportable_plan(&self.markdown)
    }
}
