// src/report/table.rs

use csv::ReaderBuilder;
use serde::Serialize;
use tracing::{debug, warn};

use super::block::read_block;
use crate::error::{ReportError, Result};

/// Buckets per table in every report seen so far.
pub const DEFAULT_ROW_COUNT: usize = 4;

/// One row of an error table: a bucket label and one percentage per series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub values: Vec<f64>,
}

/// A percentage distribution across a fixed number of buckets, one column
/// per compared model run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorTable {
    /// Header of the label column; often empty.
    pub label_header: String,
    /// Names of the numeric columns, e.g. `HIRESv1_MED_d0`.
    pub series: Vec<String>,
    pub rows: Vec<Bucket>,
}

impl ErrorTable {
    pub fn series_index(&self, name: &str) -> Option<usize> {
        self.series.iter().position(|s| s == name)
    }

    /// All bucket values of one series, top to bottom. `None` if the series
    /// is unknown or a bucket lacks a value for it.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.series_index(name)?;
        self.rows.iter().map(|b| b.values.get(idx).copied()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|b| b.label.as_str()).collect()
    }
}

/// Parse the header line plus `row_count` data rows following `marker_index`.
pub fn extract_table<S: AsRef<str>>(
    lines: &[S],
    marker_index: usize,
    row_count: usize,
) -> Result<ErrorTable> {
    let block = read_block(lines, marker_index, row_count + 1)?;

    // rebuild just the window so quoting is handled by the csv reader
    let mut text = String::with_capacity(block.iter().map(|l| l.as_ref().len() + 1).sum());
    for line in block {
        text.push_str(line.as_ref());
        text.push('\n');
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| ReportError::table(marker_index, format!("bad header line: {}", e)))?
        .clone();
    if headers.len() < 2 {
        return Err(ReportError::table(
            marker_index,
            format!("header `{}` names no numeric series", block[0].as_ref()),
        ));
    }
    let label_header = headers.get(0).unwrap_or_default().to_string();
    let series: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows = Vec::with_capacity(row_count);
    for (idx, result) in rdr.records().enumerate() {
        // 1-indexed file line of this record: marker, header, then rows
        let line_no = marker_index + 3 + idx;
        let record = result.map_err(|e| {
            ReportError::table(marker_index, format!("line {}: {}", line_no, e))
        })?;
        let label = record.get(0).unwrap_or_default().to_string();
        let values = record
            .iter()
            .skip(1)
            .zip(&series)
            .map(|(cell, name)| {
                parse_percentage(cell).ok_or_else(|| {
                    warn!(line = line_no, series = %name, cell, "non-numeric cell");
                    ReportError::table(
                        marker_index,
                        format!(
                            "line {}: `{}` in column `{}` is not a percentage",
                            line_no, cell, name
                        ),
                    )
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(Bucket { label, values });
    }

    // blank lines inside the window are swallowed by the reader
    if rows.len() != row_count {
        return Err(ReportError::table(
            marker_index,
            format!("expected {} data rows, found {}", row_count, rows.len()),
        ));
    }

    debug!(
        marker_line = marker_index + 1,
        series = series.len(),
        rows = rows.len(),
        "parsed table"
    );
    Ok(ErrorTable {
        label_header,
        series,
        rows,
    })
}

/// A decimal percentage, optionally suffixed with `%`. Non-finite values are
/// rejected.
pub fn parse_percentage(cell: &str) -> Option<f64> {
    let cleaned = cell.trim().trim_end_matches('%').trim_end();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &str) -> Vec<String> {
        raw.lines().map(str::to_string).collect()
    }

    const DIRECTION: &str = "Error Distribution: Direction (d0)\n\
        ,HIRESv1_MED_d0,HIRESv3_MED_d1\n\
        0-15°,12.3,8.7\n\
        15-45°,40.1,45.2\n\
        45-90°,30.0,31.5\n\
        >90°,17.6,14.6";

    #[test]
    fn parses_window_after_marker() {
        let doc = lines(DIRECTION);
        let t = extract_table(&doc, 0, DEFAULT_ROW_COUNT).unwrap();
        assert_eq!(t.label_header, "");
        assert_eq!(t.series, vec!["HIRESv1_MED_d0", "HIRESv3_MED_d1"]);
        assert_eq!(t.labels(), vec!["0-15°", "15-45°", "45-90°", ">90°"]);
        assert_eq!(t.rows[0].values, vec![12.3, 8.7]);
        assert_eq!(t.column("HIRESv3_MED_d1").unwrap(), vec![8.7, 45.2, 31.5, 14.6]);
        assert!(t.column("missing").is_none());
    }

    #[test]
    fn ragged_hand_built_table_has_no_column() {
        let t = ErrorTable {
            label_header: String::new(),
            series: vec!["a".into(), "b".into()],
            rows: vec![
                Bucket {
                    label: "x".into(),
                    values: vec![1.0, 2.0],
                },
                Bucket {
                    label: "y".into(),
                    values: vec![3.0],
                },
            ],
        };
        assert_eq!(t.column("a"), Some(vec![1.0, 3.0]));
        assert_eq!(t.column("b"), None);
    }

    #[test]
    fn rows_past_the_window_are_ignored() {
        let doc = lines(&format!("{}\nextra,not,numbers", DIRECTION));
        let t = extract_table(&doc, 0, DEFAULT_ROW_COUNT).unwrap();
        assert_eq!(t.rows.len(), 4);
    }

    #[test]
    fn quoted_labels_and_percent_signs() {
        let doc = lines("m\nbucket,a\n\"0,15\",1.5%\nb,2\nc,3\nd,4");
        let t = extract_table(&doc, 0, 4).unwrap();
        assert_eq!(t.label_header, "bucket");
        assert_eq!(t.rows[0].label, "0,15");
        assert_eq!(t.rows[0].values, vec![1.5]);
    }

    #[test]
    fn non_numeric_cell_fails() {
        let doc = lines("m\n,a,b\nx,1,2\ny,3,n/a\nz,5,6\nw,7,8");
        match extract_table(&doc, 0, 4) {
            Err(ReportError::MalformedTable { marker_line, reason }) => {
                assert_eq!(marker_line, 1);
                assert!(reason.contains("n/a"), "{}", reason);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn too_few_rows_fails() {
        let doc = lines("m\n,a\nx,1\ny,2");
        assert!(matches!(
            extract_table(&doc, 0, 4),
            Err(ReportError::MalformedTable { .. })
        ));
    }

    #[test]
    fn ragged_row_fails() {
        let doc = lines("m\n,a,b\nx,1,2\ny,3\nz,5,6\nw,7,8");
        assert!(matches!(
            extract_table(&doc, 0, 4),
            Err(ReportError::MalformedTable { .. })
        ));
    }

    #[test]
    fn blank_line_in_window_fails() {
        let doc = lines("m\n,a\nx,1\n\ny,2\nz,3\nw,4");
        assert!(matches!(
            extract_table(&doc, 0, 4),
            Err(ReportError::MalformedTable { .. })
        ));
    }

    #[test]
    fn header_without_series_fails() {
        let doc = lines("m\nlabel\nx\ny\nz\nw");
        assert!(matches!(
            extract_table(&doc, 0, 4),
            Err(ReportError::MalformedTable { .. })
        ));
    }

    #[test]
    fn percentage_parsing() {
        assert_eq!(parse_percentage(" 12.5 "), Some(12.5));
        assert_eq!(parse_percentage("7%"), Some(7.0));
        assert_eq!(parse_percentage("NaN"), None);
        assert_eq!(parse_percentage("inf"), None);
        assert_eq!(parse_percentage(""), None);
    }
}
