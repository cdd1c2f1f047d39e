use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("source must be 'Owner' or 'Broker', got '{0}'")]
    Source(String),
    #[error("date must be YYYY-MM-DD, got '{0}'")]
    Date(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Office Sale")]
    OfficeSale,
    #[serde(rename = "Office Lease")]
    OfficeLease,
    #[serde(rename = "Showroom Sale")]
    ShowroomSale,
    #[serde(rename = "Showroom Lease")]
    ShowroomLease,
    #[serde(rename = "Apartment Sale")]
    ApartmentSale,
    #[serde(rename = "Apartment Rent")]
    ApartmentRent,
    #[serde(rename = "Bunglow Sale")]
    BunglowSale,
    #[serde(rename = "Bunglow Rent")]
    BunglowRent,
    #[serde(rename = "Penthouse Rent")]
    PenthouseRent,
    #[serde(rename = "Duplex Rent")]
    DuplexRent,
}

impl Category {
    pub const COUNT: usize = 10;

    /// Canonical order; every per-category view follows it.
    pub const ALL: [Category; Category::COUNT] = [
        Category::OfficeSale,
        Category::OfficeLease,
        Category::ShowroomSale,
        Category::ShowroomLease,
        Category::ApartmentSale,
        Category::ApartmentRent,
        Category::BunglowSale,
        Category::BunglowRent,
        Category::PenthouseRent,
        Category::DuplexRent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::OfficeSale => "Office Sale",
            Category::OfficeLease => "Office Lease",
            Category::ShowroomSale => "Showroom Sale",
            Category::ShowroomLease => "Showroom Lease",
            Category::ApartmentSale => "Apartment Sale",
            Category::ApartmentRent => "Apartment Rent",
            Category::BunglowSale => "Bunglow Sale",
            Category::BunglowRent => "Bunglow Rent",
            Category::PenthouseRent => "Penthouse Rent",
            Category::DuplexRent => "Duplex Rent",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Source {
    #[default]
    Owner,
    Broker,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Owner, Source::Broker];

    pub fn label(self) -> &'static str {
        match self {
            Source::Owner => "Owner",
            Source::Broker => "Broker",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Source {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Source::Owner),
            "broker" => Ok(Source::Broker),
            _ => Err(ParseError::Source(value.to_string())),
        }
    }
}

/// One reported count. Entries are never edited once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLog {
    pub id: String,
    pub date: String,
    pub category: Category,
    pub source: Source,
    pub count: u64,
    #[serde(rename = "recordedBy")]
    pub recorded_by: String,
}

/// Fixed-size mapping with exactly one slot per [`Category`].
///
/// Serializes as a JSON object keyed by category label in canonical order.
/// Deserializing accepts a partial object; absent categories take `T::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryMap<T> {
    values: [T; Category::COUNT],
}

impl<T: Default> Default for CategoryMap<T> {
    fn default() -> Self {
        Self {
            values: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T> CategoryMap<T> {
    /// Values must be given in [`Category::ALL`] order.
    pub const fn from_array(values: [T; Category::COUNT]) -> Self {
        Self { values }
    }

    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            values: std::array::from_fn(|idx| f(Category::ALL[idx])),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().zip(self.values.iter())
    }
}

impl<T> Index<Category> for CategoryMap<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        &self.values[category.index()]
    }
}

impl<T> IndexMut<Category> for CategoryMap<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        &mut self.values[category.index()]
    }
}

impl<T: Serialize> Serialize for CategoryMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::COUNT))?;
        for (category, value) in self.iter() {
            map.serialize_entry(category.label(), value)?;
        }
        map.end()
    }
}

impl<'de, T> Deserialize<'de> for CategoryMap<T>
where
    T: Default + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for MapVisitor<T>
        where
            T: Default + Deserialize<'de>,
        {
            type Value = CategoryMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by category label")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut out = CategoryMap::default();
                while let Some((category, value)) = access.next_entry::<Category, T>()? {
                    out[category] = value;
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(MapVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub count: u64,
    pub color: &'static str,
}

/// One chart row: a date plus a numeric field per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAggregation {
    pub date: String,
    #[serde(flatten)]
    pub totals: CategoryMap<u64>,
}

#[derive(Debug, Serialize)]
pub struct SourceDashboard {
    pub source: Source,
    pub grand_total: u64,
    pub totals: Vec<CategoryTotal>,
    pub daily: Vec<DailyAggregation>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub entry_count: usize,
    pub totals_by_category: CategoryMap<u64>,
    pub owner: SourceDashboard,
    pub broker: SourceDashboard,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkEntryRequest {
    pub date: String,
    pub source: Source,
    #[serde(default)]
    pub counts: CategoryMap<i64>,
}

#[derive(Debug, Serialize)]
pub struct BulkEntryResponse {
    pub added: usize,
    pub entries: Vec<InventoryLog>,
}

#[derive(Debug, Deserialize)]
pub struct DraftAdjustRequest {
    pub category: Category,
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct DraftSetRequest {
    pub category: Category,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct DraftSubmitRequest {
    pub date: Option<String>,
    pub source: Source,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftAdjustForm {
    pub category: Category,
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct DraftSubmitForm {
    #[serde(default)]
    pub date: String,
    pub source: Source,
}

#[derive(Debug, Deserialize)]
pub struct DraftSetForm {
    pub category: Category,
    #[serde(default)]
    pub count: String,
}

impl DraftSetForm {
    /// Blank or non-numeric input counts as zero.
    pub fn count_value(&self) -> i64 {
        self.count.trim().parse().unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetForm {
    pub confirm: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_match_wire_names() {
        for category in Category::ALL {
            let wire = serde_json::to_value(category).unwrap();
            assert_eq!(wire, category.label());
            assert_eq!(serde_json::from_value::<Category>(wire).unwrap(), category);
        }
        assert!(serde_json::from_str::<Category>(r#""Castle Sale""#).is_err());
    }

    #[test]
    fn source_parsing_is_case_insensitive() {
        assert_eq!("broker".parse::<Source>(), Ok(Source::Broker));
        assert_eq!(" Owner ".parse::<Source>(), Ok(Source::Owner));
        assert!("Agent".parse::<Source>().is_err());
    }

    #[test]
    fn draft_set_form_treats_garbage_as_zero() {
        let form = |count: &str| DraftSetForm {
            category: Category::OfficeSale,
            count: count.to_string(),
        };
        assert_eq!(form(" 12 ").count_value(), 12);
        assert_eq!(form("abc").count_value(), 0);
        assert_eq!(form("").count_value(), 0);
        assert_eq!(form("-4").count_value(), -4);
    }

    #[test]
    fn log_entry_uses_camel_case_recorder_field() {
        let entry = InventoryLog {
            id: "abc".into(),
            date: "2024-06-01".into(),
            category: Category::OfficeSale,
            source: Source::Owner,
            count: 5,
            recorded_by: "Jane".into(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "abc",
                "date": "2024-06-01",
                "category": "Office Sale",
                "source": "Owner",
                "count": 5,
                "recordedBy": "Jane"
            })
        );
    }

    #[test]
    fn category_map_fills_missing_keys_and_serializes_every_category() {
        let map: CategoryMap<i64> =
            serde_json::from_str(r#"{"Duplex Rent": 2, "Office Sale": 7}"#).unwrap();
        assert_eq!(map[Category::OfficeSale], 7);
        assert_eq!(map[Category::DuplexRent], 2);
        assert_eq!(map[Category::ShowroomLease], 0);

        let value = serde_json::to_value(map).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), Category::COUNT);
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert!(keys.contains(&"Bunglow Rent"));
    }

    #[test]
    fn daily_row_flattens_categories_next_to_date() {
        let mut totals = CategoryMap::default();
        totals[Category::ApartmentRent] = 4;
        let row = DailyAggregation {
            date: "2024-06-02".into(),
            totals,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["date"], "2024-06-02");
        assert_eq!(value["Apartment Rent"], 4);
        assert_eq!(value["Office Sale"], 0);
    }
}
