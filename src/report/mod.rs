// src/report/mod.rs

//! Extraction of one error-distribution report.
//!
//! A report is a line-oriented text file: a title, four `<label>: <value>`
//! metadata lines, then `Error Distribution: <Kind> (<param>)` marker lines
//! each followed by a column header and a fixed number of bucket rows.

pub mod block;
pub mod metadata;
pub mod table;

use serde::Serialize;
use std::{borrow::Cow, fs, path::Path};
use tracing::{debug, instrument, warn};

use crate::error::{ReportError, Result};

pub use block::{locate_marker, read_block};
pub use metadata::{extract_metadata, parse_error_type, ErrorType, Metadata, MARKER};
pub use table::{extract_table, parse_percentage, Bucket, ErrorTable, DEFAULT_ROW_COUNT};

pub const DIRECTION_MARKER: &str = "Error Distribution: Direction";
pub const NEVA_MARKER: &str = "Error Distribution: NEVA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Data rows read after each table header.
    pub row_count: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            row_count: DEFAULT_ROW_COUNT,
        }
    }
}

/// Everything pulled out of one report file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub metadata: Metadata,
    pub direction: ErrorTable,
    pub neva: ErrorTable,
}

/// Read a report file into lines. Line endings (`\n` or `\r\n`) are dropped.
///
/// Spreadsheet exports are not always UTF-8 (`Période` in Latin-1), so bytes
/// are decoded lossily; labels are never matched, only separators and markers.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|source| ReportError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        warn!(path = %path.display(), "report is not valid UTF-8, decoded lossily");
    }
    Ok(text.lines().map(str::to_string).collect())
}

/// Extract metadata and both required tables with the default window size.
pub fn extract<P: AsRef<Path>>(path: P) -> Result<Report> {
    extract_with(path, &ExtractOptions::default())
}

#[instrument(level = "debug", skip(path, opts), fields(path = %path.as_ref().display()))]
pub fn extract_with<P: AsRef<Path>>(path: P, opts: &ExtractOptions) -> Result<Report> {
    let lines = read_lines(path.as_ref())?;
    extract_lines(&lines, opts)
}

/// Same as [`extract_with`] on an already loaded document.
pub fn extract_lines<S: AsRef<str>>(lines: &[S], opts: &ExtractOptions) -> Result<Report> {
    let metadata = extract_metadata(lines)?;

    let dir_start = locate_marker(lines, DIRECTION_MARKER)?;
    let neva_start = locate_marker(lines, NEVA_MARKER)?;
    debug!(dir_start, neva_start, "located markers");

    let direction = extract_table(lines, dir_start, opts.row_count)?;
    let neva = extract_table(lines, neva_start, opts.row_count)?;

    Ok(Report {
        metadata,
        direction,
        neva,
    })
}

/// Metadata only; succeeds even when the tables are broken.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn extract_metadata_from<P: AsRef<Path>>(path: P) -> Result<Metadata> {
    let lines = read_lines(path.as_ref())?;
    extract_metadata(&lines)
}
