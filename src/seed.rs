use crate::models::{Category, CategoryMap, InventoryLog, Source};

pub const BASELINE_DATE: &str = "2024-05-20";
pub const BASELINE_RECORDER: &str = "System Baseline";

// Listed in the order the counts were first reported; ids are derived from it.
const OWNER_BASELINE: [(Category, u64); Category::COUNT] = [
    (Category::ShowroomSale, 305),
    (Category::ShowroomLease, 1274),
    (Category::OfficeSale, 290),
    (Category::OfficeLease, 487),
    (Category::BunglowSale, 247),
    (Category::BunglowRent, 31),
    (Category::ApartmentSale, 296),
    (Category::ApartmentRent, 81),
    (Category::PenthouseRent, 2),
    (Category::DuplexRent, 3),
];

const BROKER_BASELINE: [(Category, u64); Category::COUNT] = [
    (Category::ShowroomSale, 42),
    (Category::ShowroomLease, 54),
    (Category::OfficeSale, 76),
    (Category::OfficeLease, 147),
    (Category::BunglowSale, 168),
    (Category::BunglowRent, 27),
    (Category::ApartmentSale, 137),
    (Category::ApartmentRent, 147),
    (Category::PenthouseRent, 5),
    (Category::DuplexRent, 0),
];

/// The collection a fresh install starts from, and what a reset restores.
pub fn baseline_logs() -> Vec<InventoryLog> {
    let mut logs = Vec::with_capacity(OWNER_BASELINE.len() + BROKER_BASELINE.len());
    for (source, prefix, counts) in [
        (Source::Owner, "baseline-owner", &OWNER_BASELINE),
        (Source::Broker, "baseline-broker", &BROKER_BASELINE),
    ] {
        for (index, (category, count)) in counts.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            logs.push(InventoryLog {
                id: format!("{prefix}-{index}"),
                date: BASELINE_DATE.to_string(),
                category: *category,
                source,
                count: *count,
                recorded_by: BASELINE_RECORDER.to_string(),
            });
        }
    }
    logs
}

pub fn category_color(category: Category) -> &'static str {
    CATEGORY_COLORS[category]
}

const CATEGORY_COLORS: CategoryMap<&str> = CategoryMap::from_array([
    "#3b82f6", "#60a5fa", "#10b981", "#34d399", "#f59e0b", "#fbbf24", "#8b5cf6", "#a78bfa",
    "#ec4899", "#f43f5e",
]);
