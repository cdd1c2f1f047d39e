use crate::models::InventoryLog;
use crate::seed::baseline_logs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CSV_HEADER: &str = "Date,Category,Source,Count,RecordedBy";

/// The ordered log collection, newest submission first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogBook {
    logs: Vec<InventoryLog>,
}

impl Default for LogBook {
    fn default() -> Self {
        Self::baseline()
    }
}

impl LogBook {
    pub fn new(logs: Vec<InventoryLog>) -> Self {
        Self { logs }
    }

    pub fn baseline() -> Self {
        Self::new(baseline_logs())
    }

    pub fn logs(&self) -> &[InventoryLog] {
        &self.logs
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Puts a batch in front of the existing entries, keeping the batch's
    /// own order. Returns how many entries were added; an empty batch leaves
    /// the collection untouched.
    pub fn submit(&mut self, batch: Vec<InventoryLog>) -> usize {
        let added = batch.len();
        if added == 0 {
            return 0;
        }
        self.logs.splice(0..0, batch);
        added
    }

    pub fn reset_to_baseline(&mut self) {
        self.logs = baseline_logs();
    }

    /// Header plus one line per entry in collection order, joined by `\n`.
    pub fn to_csv(&self) -> String {
        let mut lines = Vec::with_capacity(self.logs.len() + 1);
        lines.push(CSV_HEADER.to_string());
        for log in &self.logs {
            let count = log.count.to_string();
            let fields = [
                log.date.as_str(),
                log.category.label(),
                log.source.label(),
                count.as_str(),
                log.recorded_by.as_str(),
            ];
            let row: Vec<String> = fields.iter().map(|field| csv_field(field)).collect();
            lines.push(row.join(","));
        }
        lines.join("\n")
    }
}

// Plain values are written as-is; only values that would break the row are quoted.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Stamped with the UTC calendar date of `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("EstatePulse_Report_{}.csv", now.date_naive().format("%Y-%m-%d"))
}
