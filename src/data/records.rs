use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// One order line from the sales table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    /// `None` when the source date could not be parsed
    pub date: Option<NaiveDate>,
    pub order_id: String,
    pub sku: String,
    pub category: String,
    pub unit_price: f64,
    /// Units sold; fractional for goods sold by weight or volume
    pub quantity: f64,
    /// `unit_price * quantity`, computed at load time
    pub revenue: f64,
}

impl SalesRecord {
    pub fn new(
        date: &str,
        order_id: impl Into<String>,
        sku: impl Into<String>,
        category: impl Into<String>,
        unit_price: f64,
        quantity: f64,
    ) -> Self {
        Self {
            date: parse_date(date),
            order_id: order_id.into(),
            sku: sku.into(),
            category: category.into(),
            unit_price,
            quantity,
            revenue: unit_price * quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub sku: String,
    pub category: String,
    pub unit_price: f64,
    pub on_hand: i64,
    pub reorder_point: i64,
}

impl InventoryRecord {
    pub fn new(
        sku: impl Into<String>,
        category: impl Into<String>,
        unit_price: f64,
        on_hand: i64,
        reorder_point: i64,
    ) -> Self {
        Self {
            sku: sku.into(),
            category: category.into(),
            unit_price,
            on_hand,
            reorder_point,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.on_hand <= self.reorder_point
    }
}

/// A curated question/answer pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub a: String,
}

impl FaqEntry {
    pub fn new(q: impl Into<String>, a: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            a: a.into(),
        }
    }
}

/// Parse a calendar date, accepting `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            value
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// Lenient numeric parse; anything unparseable or non-finite is zero.
pub(crate) fn to_number(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Lenient integer parse; fractional input is rounded.
pub(crate) fn to_count(value: &str) -> i64 {
    let value = value.trim();
    value
        .parse::<i64>()
        .unwrap_or_else(|_| to_number(value).round() as i64)
}
