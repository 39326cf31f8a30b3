// src/analysis.rs

use serde::Serialize;

use crate::report::{ErrorTable, Report};

/// Default number of leading buckets summed into the headline metric
/// (direction errors under 45°, NEVA under 66%).
pub const DEFAULT_LEAD_BUCKETS: usize = 2;

impl ErrorTable {
    /// Sum of the first `n` bucket percentages of series `series_index`;
    /// `None` when any of those buckets has no value for the series.
    pub fn lead_share(&self, series_index: usize, n: usize) -> Option<f64> {
        if n > self.rows.len() || series_index >= self.series.len() {
            return None;
        }
        self.rows[..n]
            .iter()
            .map(|b| b.values.get(series_index).copied())
            .sum()
    }

    /// `"0-15°: 12.3%, 15-45°: 40.1%, ..."` over the first series.
    pub fn describe(&self) -> String {
        self.rows
            .iter()
            .filter_map(|b| b.values.first().map(|v| format!("{}: {:.1}%", b.label, v)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesMetric {
    pub series: String,
    pub lead_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub kind: String,
    pub description: String,
    /// Labels of the buckets that went into `lead_share`.
    pub lead_labels: Vec<String>,
    pub metrics: Vec<SeriesMetric>,
}

impl TableSummary {
    fn of(kind: &str, table: &ErrorTable, lead_buckets: usize) -> Self {
        let n = lead_buckets.min(table.rows.len());
        let metrics = table
            .series
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                table.lead_share(idx, n).map(|lead_share| SeriesMetric {
                    series: name.clone(),
                    lead_share,
                })
            })
            .collect();
        Self {
            kind: kind.to_string(),
            description: table.describe(),
            lead_labels: table.rows[..n].iter().map(|b| b.label.clone()).collect(),
            metrics,
        }
    }
}

/// Summary scalars for one report, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub direction: TableSummary,
    pub neva: TableSummary,
}

impl Analysis {
    /// `lead_buckets` larger than a table's bucket count is clamped.
    pub fn of(report: &Report, lead_buckets: usize) -> Self {
        Self {
            direction: TableSummary::of("Direction", &report.direction, lead_buckets),
            neva: TableSummary::of("NEVA", &report.neva, lead_buckets),
        }
    }

    pub fn tables(&self) -> [&TableSummary; 2] {
        [&self.direction, &self.neva]
    }
}
