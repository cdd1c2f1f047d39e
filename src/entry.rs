use crate::models::{Category, CategoryMap, InventoryLog, ParseError, Source};
use chrono::NaiveDate;
use uuid::Uuid;

/// Attribution used when nobody is logged in.
pub const UNKNOWN_RECORDER: &str = "Unknown";

/// Pending per-category counts for the next bulk submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    counts: CategoryMap<u64>,
}

impl EntryDraft {
    pub fn counts(&self) -> &CategoryMap<u64> {
        &self.counts
    }

    /// Moves one category's pending count by `delta`, never below zero.
    pub fn adjust(&mut self, category: Category, delta: i64) -> u64 {
        let current = self.counts[category];
        let next = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        self.counts[category] = next;
        next
    }

    pub fn set(&mut self, category: Category, count: i64) -> u64 {
        let clamped = clamp_count(count);
        self.counts[category] = clamped;
        clamped
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|(_, count)| *count == 0)
    }

    pub fn clear(&mut self) {
        self.counts = CategoryMap::default();
    }
}

/// Negative input counts are treated as zero.
pub fn clamp_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Accepts `YYYY-MM-DD` and returns it in canonical form.
pub fn normalize_date(date: &str) -> Result<String, ParseError> {
    let trimmed = date.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|parsed| parsed.format("%Y-%m-%d").to_string())
        .map_err(|_| ParseError::Date(trimmed.to_string()))
}

pub fn recorder_name(user: Option<&str>) -> String {
    user.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_RECORDER)
        .to_string()
}

/// Random v4 UUIDs; 122 random bits make collisions negligible.
pub fn new_log_id() -> String {
    Uuid::new_v4().to_string()
}

/// One entry per category with a positive count, in canonical category order.
/// Returns an empty vector when nothing is positive.
pub fn build_entries(
    counts: &CategoryMap<u64>,
    date: &str,
    source: Source,
    recorded_by: &str,
) -> Vec<InventoryLog> {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(category, count)| InventoryLog {
            id: new_log_id(),
            date: date.to_string(),
            category,
            source,
            count: *count,
            recorded_by: recorded_by.to_string(),
        })
        .collect()
}
