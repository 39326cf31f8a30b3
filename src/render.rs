// src/render.rs

//! Text and JSON views of the catalog and of one analysed report.

use prettytable::{format, Cell, Row, Table};
use serde::Serialize;

use crate::analysis::{Analysis, TableSummary};
use crate::catalog::{Catalog, CatalogEntry};
use crate::report::{ErrorTable, Report};

fn new_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(
        titles.iter().map(|t| Cell::new(t).style_spec("bFg")).collect(),
    ));
    table
}

/// One listing row, the shape both the text table and JSON output share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRow {
    pub file: String,
    pub region: String,
    pub instruments: String,
    pub period: String,
    pub model: String,
    pub error_types: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&CatalogEntry> for ListingRow {
    fn from(entry: &CatalogEntry) -> Self {
        match &entry.metadata {
            Ok(md) => ListingRow {
                file: entry.file_name.clone(),
                region: md.region.clone(),
                instruments: md.instruments.clone(),
                period: md.period.clone(),
                model: md.model.clone(),
                error_types: md.error_type_summary(),
                error: None,
            },
            Err(e) => ListingRow {
                file: entry.file_name.clone(),
                region: String::new(),
                instruments: String::new(),
                period: String::new(),
                model: String::new(),
                error_types: String::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

pub fn listing(catalog: &Catalog) -> Vec<ListingRow> {
    catalog.entries().iter().map(ListingRow::from).collect()
}

pub fn render_catalog(catalog: &Catalog) -> String {
    if catalog.is_empty() {
        return format!("No report files in {}\n", catalog.dir().display());
    }
    let mut table = new_table(&["File", "Region", "Instruments", "Period", "Model", "Error types"]);
    for row in listing(catalog) {
        let last = match &row.error {
            Some(err) => Cell::new(&format!("unusable: {}", err)).style_spec("Fr"),
            None => Cell::new(&row.error_types),
        };
        table.add_row(Row::new(vec![
            Cell::new(&row.file),
            Cell::new(&row.region),
            Cell::new(&row.instruments),
            Cell::new(&row.period),
            Cell::new(&row.model),
            last,
        ]));
    }
    format!("Available report files\n{}", table)
}

fn render_error_table(table: &ErrorTable) -> Table {
    let mut titles: Vec<&str> = vec![table.label_header.as_str()];
    titles.extend(table.series.iter().map(String::as_str));
    let mut out = new_table(&titles);
    for bucket in &table.rows {
        let mut cells = vec![Cell::new(&bucket.label)];
        cells.extend(
            bucket
                .values
                .iter()
                .map(|v| Cell::new(&format!("{:.1}%", v)).style_spec("r")),
        );
        out.add_row(Row::new(cells));
    }
    out
}

fn render_metrics(summary: &TableSummary) -> Table {
    let headline = format!(
        "{} within {}",
        summary.kind,
        summary.lead_labels.join(" + ")
    );
    let mut out = new_table(&["Series", &headline]);
    for metric in &summary.metrics {
        out.add_row(Row::new(vec![
            Cell::new(&metric.series),
            Cell::new(&format!("{:.1}%", metric.lead_share)).style_spec("r"),
        ]));
    }
    out
}

/// Detail view: error-type descriptions, then bucket table and headline
/// metrics per kind.
pub fn render_report(file_name: &str, report: &Report, analysis: &Analysis) -> String {
    let mut out = format!("Report: {}\n", file_name);

    let mut details = new_table(&["Error type", "Description"]);
    for summary in analysis.tables() {
        details.add_row(Row::new(vec![
            Cell::new(&summary.kind),
            Cell::new(&summary.description),
        ]));
    }
    out.push_str(&format!("Error details\n{}", details));

    for (summary, table) in analysis
        .tables()
        .into_iter()
        .zip([&report.direction, &report.neva])
    {
        out.push_str(&format!("\n{} distribution\n", summary.kind));
        out.push_str(&render_error_table(table).to_string());
        out.push_str(&render_metrics(summary).to_string());
    }
    out
}

#[derive(Debug, Serialize)]
pub struct ReportView<'a> {
    pub file: &'a str,
    pub report: &'a Report,
    pub analysis: &'a Analysis,
}

pub fn catalog_json(catalog: &Catalog) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&listing(catalog))
}

pub fn report_json(
    file_name: &str,
    report: &Report,
    analysis: &Analysis,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportView {
        file: file_name,
        report,
        analysis,
    })
}
