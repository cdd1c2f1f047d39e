use crate::models::{
    Category, CategoryMap, CategoryTotal, DailyAggregation, DashboardResponse, InventoryLog,
    Source, SourceDashboard,
};
use crate::seed::category_color;
use std::collections::BTreeMap;

/// Sum of `count` per category over every entry.
pub fn totals_by_category(logs: &[InventoryLog]) -> CategoryMap<u64> {
    sum_by_category(logs.iter())
}

/// Per-category totals for one source, in canonical category order.
pub fn source_totals(logs: &[InventoryLog], source: Source) -> Vec<CategoryTotal> {
    let sums = sum_by_category(logs.iter().filter(|log| log.source == source));
    sums.iter()
        .map(|(category, count)| CategoryTotal {
            category,
            count: *count,
            color: category_color(category),
        })
        .collect()
}

/// One row per date that has entries for `source`, oldest first.
///
/// `YYYY-MM-DD` strings order the same as the dates they name, so the
/// `BTreeMap` key order is the chronological order.
pub fn daily_aggregation(logs: &[InventoryLog], source: Source) -> Vec<DailyAggregation> {
    let mut grouped: BTreeMap<&str, CategoryMap<u64>> = BTreeMap::new();
    for log in logs.iter().filter(|log| log.source == source) {
        let slot = &mut grouped.entry(log.date.as_str()).or_default()[log.category];
        *slot = slot.saturating_add(log.count);
    }

    grouped
        .into_iter()
        .map(|(date, totals)| DailyAggregation {
            date: date.to_string(),
            totals,
        })
        .collect()
}

pub fn build_dashboard(logs: &[InventoryLog]) -> DashboardResponse {
    DashboardResponse {
        entry_count: logs.len(),
        totals_by_category: totals_by_category(logs),
        owner: source_dashboard(logs, Source::Owner),
        broker: source_dashboard(logs, Source::Broker),
    }
}

fn source_dashboard(logs: &[InventoryLog], source: Source) -> SourceDashboard {
    let totals = source_totals(logs, source);
    let grand_total = totals
        .iter()
        .fold(0u64, |acc, total| acc.saturating_add(total.count));
    SourceDashboard {
        source,
        grand_total,
        totals,
        daily: daily_aggregation(logs, source),
    }
}

fn sum_by_category<'a>(logs: impl Iterator<Item = &'a InventoryLog>) -> CategoryMap<u64> {
    let mut sums = CategoryMap::default();
    for log in logs {
        let slot: &mut u64 = &mut sums[log.category];
        *slot = slot.saturating_add(log.count);
    }
    sums
}

/// Categories that have at least one entry, with their totals.
pub(crate) fn logged_category_totals(logs: &[InventoryLog]) -> Vec<(Category, u64)> {
    let mut seen = CategoryMap::<bool>::default();
    for log in logs {
        seen[log.category] = true;
    }
    let totals = totals_by_category(logs);
    Category::ALL
        .into_iter()
        .filter(|category| seen[*category])
        .map(|category| (category, totals[category]))
        .collect()
}
