// src/report/metadata.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ReportError, Result};

/// Substring that introduces every error-distribution block.
pub const MARKER: &str = "Error Distribution:";

/// Separator between label and value on the fixed header lines.
const HEADER_SEPARATOR: &str = ": ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Instruments,
    Period,
    Model,
    Region,
}

/// Which fixed header line feeds which metadata field (0-indexed lines).
pub const HEADER_FIELDS: [(usize, HeaderField); 4] = [
    (1, HeaderField::Instruments),
    (2, HeaderField::Period),
    (3, HeaderField::Model),
    (4, HeaderField::Region),
];

/// `Kind (param)` after the marker, where an unclosed parenthesis runs to the
/// end of the line. Without a parenthesis the kind is the first word.
static ERROR_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:(?P<kind>[^(]*)\((?P<param>[^)]*)|"?(?P<word>[^\s,;"(]+))"#)
        .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorType {
    pub kind: String,
    pub parameter: String,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.kind, self.parameter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub instruments: String,
    pub period: String,
    pub model: String,
    pub region: String,
    pub error_types: Vec<ErrorType>,
}

impl Metadata {
    /// Error types joined the way the listing shows them:
    /// `"Direction (d0), NEVA (d1)"`.
    pub fn error_type_summary(&self) -> String {
        self.error_types
            .iter()
            .map(ErrorType::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Read the fixed header lines and every marker line.
pub fn extract_metadata<S: AsRef<str>>(lines: &[S]) -> Result<Metadata> {
    let last_header_line = HEADER_FIELDS[HEADER_FIELDS.len() - 1].0;
    if lines.len() <= last_header_line {
        return Err(ReportError::header(
            lines.len(),
            format!(
                "document has {} lines, the header needs {}",
                lines.len(),
                last_header_line + 1
            ),
        ));
    }

    let mut instruments = String::new();
    let mut period = String::new();
    let mut model = String::new();
    let mut region = String::new();

    for (idx, field) in HEADER_FIELDS {
        let value = header_value(lines[idx].as_ref()).ok_or_else(|| {
            ReportError::header(idx, format!("expected `<label>: <value>` for {:?}", field))
        })?;
        if value.is_empty() {
            return Err(ReportError::header(idx, format!("empty value for {:?}", field)));
        }
        trace!(line = idx + 1, ?field, value, "header field");
        let slot = match field {
            HeaderField::Instruments => &mut instruments,
            HeaderField::Period => &mut period,
            HeaderField::Model => &mut model,
            HeaderField::Region => &mut region,
        };
        *slot = value.to_string();
    }

    let error_types: Vec<ErrorType> = lines
        .iter()
        .filter_map(|line| parse_error_type(line.as_ref()))
        .collect();
    debug!(error_types = error_types.len(), "extracted metadata");

    Ok(Metadata {
        instruments,
        period,
        model,
        region,
        error_types,
    })
}

fn header_value(line: &str) -> Option<&str> {
    line.split_once(HEADER_SEPARATOR).map(|(_, value)| value.trim())
}

/// Parse the `(kind, parameter)` pair out of a marker line; `None` if the
/// line carries no marker.
pub fn parse_error_type(line: &str) -> Option<ErrorType> {
    let (_, info) = line.split_once(MARKER)?;
    let info = info.trim();
    let Some(caps) = ERROR_TYPE_RE.captures(info) else {
        // bare marker
        return Some(ErrorType {
            kind: String::new(),
            parameter: String::new(),
        });
    };
    let kind = caps
        .name("kind")
        .or_else(|| caps.name("word"))
        .map(|m| clean_cell(m.as_str()))
        .unwrap_or_default();
    let parameter = caps
        .name("param")
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some(ErrorType { kind, parameter })
}

/// Marker lines come out of spreadsheet exports, so they may carry quotes
/// and trailing empty cells.
fn clean_cell(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| c == ',' || c == ';' || c == '"' || c.is_whitespace())
        .trim_start_matches('"')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &str) -> Vec<String> {
        raw.lines().map(str::to_string).collect()
    }

    #[test]
    fn parses_kind_and_parameter() {
        let et = parse_error_type("x Error Distribution: Direction (HIRES) y").unwrap();
        assert_eq!(et.kind, "Direction");
        assert_eq!(et.parameter, "HIRES");
    }

    #[test]
    fn parameter_is_empty_without_parentheses() {
        let et = parse_error_type("Error Distribution: NEVA").unwrap();
        assert_eq!(et.kind, "NEVA");
        assert_eq!(et.parameter, "");
        assert_eq!(et.to_string(), "NEVA ()");
    }

    #[test]
    fn kind_without_parameter_stops_at_first_word() {
        let et = parse_error_type("... Error Distribution: NEVA ...").unwrap();
        assert_eq!(et.kind, "NEVA");
        assert_eq!(et.parameter, "");

        let et = parse_error_type("Error Distribution: NEVA, 4 buckets").unwrap();
        assert_eq!(et.kind, "NEVA");
    }

    #[test]
    fn multi_word_kind_before_parenthesis_is_kept() {
        let et = parse_error_type("Error Distribution: Wind Speed (d2)").unwrap();
        assert_eq!(et.kind, "Wind Speed");
        assert_eq!(et.parameter, "d2");
    }

    #[test]
    fn bare_marker_gives_empty_pair() {
        let et = parse_error_type("Error Distribution:").unwrap();
        assert_eq!(et.kind, "");
        assert_eq!(et.parameter, "");
    }

    #[test]
    fn trailing_csv_cells_are_dropped_from_kind() {
        let et = parse_error_type("\"Error Distribution: NEVA\",,,").unwrap();
        assert_eq!(et.kind, "NEVA");
        assert_eq!(et.parameter, "");
    }

    #[test]
    fn unclosed_parenthesis_runs_to_end_of_line() {
        let et = parse_error_type("Error Distribution: Direction (d0").unwrap();
        assert_eq!(et.kind, "Direction");
        assert_eq!(et.parameter, "d0");
    }

    #[test]
    fn non_marker_lines_are_ignored() {
        assert!(parse_error_type("bucket,1.0,2.0").is_none());
    }

    #[test]
    fn reads_fixed_header_lines() {
        let doc = lines(
            "Title\nInstruments: HIRESv1,HIRESv3\nPériode: 2020-2023\nModèle: MED\nRégion: Global\n\
             Error Distribution: Direction (d0)\nError Distribution: NEVA (d1)",
        );
        let md = extract_metadata(&doc).unwrap();
        assert_eq!(md.instruments, "HIRESv1,HIRESv3");
        assert_eq!(md.period, "2020-2023");
        assert_eq!(md.model, "MED");
        assert_eq!(md.region, "Global");
        assert_eq!(md.error_type_summary(), "Direction (d0), NEVA (d1)");
    }

    #[test]
    fn value_keeps_later_separators() {
        let doc = lines("T\nInstruments: a: b\nP: p\nM: m\nR: r");
        let md = extract_metadata(&doc).unwrap();
        assert_eq!(md.instruments, "a: b");
        assert!(md.error_types.is_empty());
    }

    #[test]
    fn short_document_is_malformed_header() {
        let doc = lines("T\nInstruments: a\nP: p");
        assert!(matches!(
            extract_metadata(&doc),
            Err(ReportError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn blank_value_is_malformed_header() {
        let doc = lines("T\nInstruments: \nP: p\nM: m\nR: r");
        match extract_metadata(&doc) {
            Err(ReportError::MalformedHeader { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("empty"), "{}", reason);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_separator_names_the_line() {
        let doc = lines("T\nInstruments: a\nPeriod 2020\nM: m\nR: r");
        match extract_metadata(&doc) {
            Err(ReportError::MalformedHeader { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
