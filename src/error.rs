// src/error.rs

use std::{io, path::PathBuf};
use thiserror::Error;

/// Everything that can make a report file unusable.
///
/// None of these are retryable: the file on disk is the only input, so the
/// same file fails the same way until someone edits it.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A required `Error Distribution: <Kind>` line is absent.
    #[error("marker `{marker}` not found")]
    MarkerNotFound { marker: String },

    /// One of the fixed metadata lines (2–5) is missing or has no `": "`.
    /// `line` is 1-indexed.
    #[error("malformed header at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    /// The block after a marker is short, ragged, or holds a non-numeric cell.
    /// `marker_line` is 1-indexed.
    #[error("malformed table after marker on line {marker_line}: {reason}")]
    MalformedTable { marker_line: usize, reason: String },

    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReportError {
    pub(crate) fn table(marker_index: usize, reason: impl Into<String>) -> Self {
        ReportError::MalformedTable {
            marker_line: marker_index + 1,
            reason: reason.into(),
        }
    }

    pub(crate) fn header(line_index: usize, reason: impl Into<String>) -> Self {
        ReportError::MalformedHeader {
            line: line_index + 1,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
