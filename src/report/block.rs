// src/report/block.rs

use crate::error::{ReportError, Result};

/// Index of the first line containing `substring`.
pub fn locate_marker<S: AsRef<str>>(lines: &[S], substring: &str) -> Result<usize> {
    lines
        .iter()
        .position(|line| line.as_ref().contains(substring))
        .ok_or_else(|| ReportError::MarkerNotFound {
            marker: substring.to_string(),
        })
}

/// The `len` lines right after `marker_index`.
///
/// A block that would run past the end of the document is a malformed table,
/// never a short slice.
pub fn read_block<S: AsRef<str>>(lines: &[S], marker_index: usize, len: usize) -> Result<&[S]> {
    let start = marker_index + 1;
    let available = lines.len().saturating_sub(start);
    if available < len {
        return Err(ReportError::table(
            marker_index,
            format!("expected {} lines after marker, found {}", len, available),
        ));
    }
    Ok(&lines[start..start + len])
}
