//! PDF export entry points.
//!
//! ```text
//! markdown ──▶ postprocess ──▶ first table ──▶ paginate ──▶ write_pdf
//!               (cleanup)      (pulldown-cmark)  (layout)    (pdf-writer)
//! ```
//!
//! A reply without a table is the one failure of this path: every entry
//! point returns [`PlanError::NoTableFound`] and nothing is written.

use crate::config::ExportConfig;
use crate::error::PlanError;
use crate::grid::Grid;
use crate::output::{ExportOutput, ExportStats};
use crate::pipeline::layout::{paginate, Layout};
use crate::pipeline::metrics::Helvetica;
use crate::pipeline::{pdf, postprocess, table};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Render the first table in `markdown` to PDF bytes.
///
/// # Errors
/// [`PlanError::NoTableFound`] when the markdown holds no table.
pub fn export_pdf(markdown: &str, config: &ExportConfig) -> Result<ExportOutput, PlanError> {
    let start = Instant::now();
    let (grid, layout) = export_layout(markdown, config)?;
    let pdf = pdf::write_pdf(&layout, config);
    let stats = stats_for(&grid, &layout, pdf.len(), start);

    info!(
        "Exported {} rows × {} columns on {} page(s), {:?}",
        stats.row_count, stats.column_count, stats.page_count, stats.orientation
    );

    Ok(ExportOutput {
        pdf,
        grid,
        layout,
        stats,
    })
}

/// Locate the table and paginate it without producing PDF bytes.
///
/// Used for dry runs and by [`export_pdf`].
pub fn export_layout(markdown: &str, config: &ExportConfig) -> Result<(Grid, Layout), PlanError> {
    let cleaned = postprocess::clean_markdown(markdown);
    let grid = table::first_table(&cleaned)
        .filter(Grid::has_table)
        .ok_or(PlanError::NoTableFound)?;
    debug!(
        "Table found: {} headers, {} rows",
        grid.column_count(),
        grid.row_count()
    );
    let layout = paginate(&grid, config, &Helvetica);
    Ok((grid, layout))
}

/// Layout statistics for a dry run (`bytes` is 0).
pub fn dry_run(markdown: &str, config: &ExportConfig) -> Result<ExportStats, PlanError> {
    let start = Instant::now();
    let (grid, layout) = export_layout(markdown, config)?;
    Ok(stats_for(&grid, &layout, 0, start))
}

/// Export and write the PDF to `output_path`.
///
/// Uses atomic write (temp file in the target directory + rename) so a
/// failed export never leaves a partial file behind.
pub fn export_to_file(
    markdown: &str,
    output_path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportStats, PlanError> {
    let output = export_pdf(markdown, config)?;
    let path = output_path.as_ref();
    write_atomic(path, &output.pdf)?;
    info!("Saved {}", path.display());
    Ok(output.stats)
}

/// Read a markdown reply from a file, or from stdin when `input` is `-`.
pub fn read_markdown(input: &str) -> Result<String, PlanError> {
    if input == "-" {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).map_err(|e| {
            PlanError::InputReadFailed {
                path: PathBuf::from("<stdin>"),
                source: e,
            }
        })?;
        return Ok(buf);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        return Err(PlanError::InputNotFound { path });
    }
    std::fs::read_to_string(&path).map_err(|e| PlanError::InputReadFailed { path, source: e })
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn stats_for(grid: &Grid, layout: &Layout, bytes: usize, start: Instant) -> ExportStats {
    ExportStats {
        page_count: layout.page_count(),
        column_count: grid.column_count(),
        row_count: grid.row_count(),
        orientation: layout.orientation,
        column_width_mm: layout.column_width,
        bytes,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PlanError> {
    let write_err = |e: std::io::Error| PlanError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
