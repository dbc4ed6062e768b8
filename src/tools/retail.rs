//! Retail analytics tools
//!
//! Sales summary, low-stock report and price optimization over the sales and
//! inventory tables. Each tool reloads its tables from the provider on every
//! call. The computations are plain functions so they can be used and tested
//! without a registry.

use crate::data::{load_blocking, parse_date, DataProvider, InventoryRecord, SalesRecord};
use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use crate::utils::config::ToolSettings;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// SKUs priced when the caller does not name any.
const DEFAULT_PRICED_SKUS: usize = 5;
/// Baseline demand for a SKU with no sales history.
const DEFAULT_BASELINE_QUANTITY: f64 = 5.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

// ============= Sales Summary =============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTotals {
    pub orders: usize,
    pub units: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuTotal {
    pub sku: String,
    pub revenue: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub revenue: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummaryReport {
    pub totals: SalesTotals,
    pub top_skus: Vec<SkuTotal>,
    pub top_categories: Vec<CategoryTotal>,
}

/// Sum revenue and units per key, ranked by revenue. Groups keep their
/// first-seen order on ties.
fn rank_groups<'a, F>(rows: &[&'a SalesRecord], key: F, top_n: usize) -> Vec<(String, f64, f64)>
where
    F: Fn(&'a SalesRecord) -> &'a str,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, f64, f64)> = Vec::new();

    for &row in rows {
        let k = key(row);
        let slot = *slots.entry(k).or_insert_with(|| {
            groups.push((k.to_string(), 0.0, 0.0));
            groups.len() - 1
        });
        groups[slot].1 += row.revenue;
        groups[slot].2 += row.quantity;
    }

    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups.truncate(top_n);
    groups
        .into_iter()
        .map(|(k, revenue, quantity)| (k, round2(revenue), quantity))
        .collect()
}

pub fn summarize_sales(
    records: &[SalesRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    top_n: usize,
) -> SalesSummaryReport {
    let rows: Vec<&SalesRecord> = records
        .iter()
        .filter(|r| match (start, end) {
            (None, None) => true,
            _ => r.date.is_some_and(|d| {
                start.map_or(true, |s| d >= s) && end.map_or(true, |e| d <= e)
            }),
        })
        .collect();

    let orders: HashSet<&str> = rows.iter().map(|r| r.order_id.as_str()).collect();
    let totals = SalesTotals {
        orders: orders.len(),
        units: rows.iter().map(|r| r.quantity).sum(),
        revenue: round2(rows.iter().map(|r| r.revenue).sum()),
    };

    let top_skus = rank_groups(&rows, |r| r.sku.as_str(), top_n)
        .into_iter()
        .map(|(sku, revenue, quantity)| SkuTotal {
            sku,
            revenue,
            quantity,
        })
        .collect();

    let top_categories = rank_groups(&rows, |r| r.category.as_str(), top_n)
        .into_iter()
        .map(|(category, revenue, quantity)| CategoryTotal {
            category,
            revenue,
            quantity,
        })
        .collect();

    SalesSummaryReport {
        totals,
        top_skus,
        top_categories,
    }
}

fn date_arg(args: &Value, field: &str) -> Result<Option<NaiveDate>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_date(s).map(Some).ok_or_else(|| {
            AppError::InvalidInput(format!("'{}' must be a YYYY-MM-DD date, got '{}'", field, s))
        }),
        Some(other) => Err(AppError::InvalidInput(format!(
            "'{}' must be a YYYY-MM-DD date, got {}",
            field, other
        ))),
    }
}

pub struct SalesSummary {
    sales: Arc<dyn DataProvider<SalesRecord>>,
    default_top_n: usize,
}

impl SalesSummary {
    pub fn new(sales: Arc<dyn DataProvider<SalesRecord>>, default_top_n: usize) -> Self {
        Self {
            sales,
            default_top_n,
        }
    }
}

#[async_trait]
impl Tool for SalesSummary {
    fn name(&self) -> &str {
        "retail_sales_summary"
    }

    fn description(&self) -> &str {
        "Summarize sales in a date range with revenue, units, top SKUs/categories."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "start": { "type": "string", "description": "YYYY-MM-DD" },
                "end": { "type": "string", "description": "YYYY-MM-DD" },
                "top_n": { "type": "number", "default": self.default_top_n }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let start = date_arg(&args, "start")?;
        let end = date_arg(&args, "end")?;
        let top_n = args
            .get("top_n")
            .and_then(Value::as_f64)
            .filter(|n| *n >= 1.0)
            .map(|n| n as usize)
            .unwrap_or(self.default_top_n);

        let records = load_blocking(&self.sales).await?;
        to_json(&summarize_sales(&records, start, end, top_n))
    }
}

// ============= Inventory Status =============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryReport {
    pub low_stock: Vec<InventoryRecord>,
    pub total_skus: usize,
    pub low_count: usize,
}

pub fn inventory_status(records: &[InventoryRecord]) -> InventoryReport {
    let low_stock: Vec<InventoryRecord> = records
        .iter()
        .filter(|r| r.is_low_stock())
        .cloned()
        .collect();

    InventoryReport {
        low_count: low_stock.len(),
        total_skus: records.len(),
        low_stock,
    }
}

pub struct InventoryStatus {
    inventory: Arc<dyn DataProvider<InventoryRecord>>,
}

impl InventoryStatus {
    pub fn new(inventory: Arc<dyn DataProvider<InventoryRecord>>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Tool for InventoryStatus {
    fn name(&self) -> &str {
        "retail_inventory_status"
    }

    fn description(&self) -> &str {
        "Return low-stock items (on_hand <= reorder_point)."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        let records = load_blocking(&self.inventory).await?;
        to_json(&inventory_status(&records))
    }
}

// ============= Price Optimization =============

/// Candidate grid: `steps` evenly spaced prices across `p0 * (1 ± band)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSearch {
    pub band: f64,
    pub steps: usize,
}

impl Default for PriceSearch {
    fn default() -> Self {
        Self {
            band: 0.10,
            steps: 21,
        }
    }
}

impl PriceSearch {
    fn candidates(&self, p0: f64) -> impl Iterator<Item = f64> + '_ {
        let low = (1.0 - self.band) * p0;
        let span = 2.0 * self.band * p0;
        let last = (self.steps.max(2) - 1) as f64;
        (0..self.steps.max(2)).map(move |i| low + (i as f64 / last) * span)
    }

    fn band_label(&self) -> String {
        format!("+/-{}%", round2(self.band * 100.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSuggestion {
    pub sku: String,
    pub current_price: f64,
    pub suggested_price: f64,
    pub revenue_baseline: f64,
    pub revenue_suggested: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingAssumptions {
    pub elasticity: f64,
    pub band: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingReport {
    pub pricing: Vec<PriceSuggestion>,
    pub assumptions: PricingAssumptions,
}

fn baseline_quantity(sku: &str, sales: &[SalesRecord]) -> f64 {
    let (count, total) = sales
        .iter()
        .filter(|r| r.sku == sku)
        .fold((0usize, 0.0), |(n, q), r| (n + 1, q + r.quantity));

    let mean = if count == 0 {
        DEFAULT_BASELINE_QUANTITY
    } else {
        total / count as f64
    };
    mean.max(1.0)
}

/// Best price for one SKU under constant-elasticity demand `q = q0 (p/p0)^e`.
/// The baseline is kept unless a candidate strictly beats its revenue.
pub fn suggest_price(
    sku: &str,
    p0: f64,
    q0: f64,
    elasticity: f64,
    search: &PriceSearch,
) -> PriceSuggestion {
    let baseline = p0 * q0;
    let mut best_price = p0;
    let mut best_revenue = baseline;

    if p0 > 0.0 {
        for price in search.candidates(p0) {
            let quantity = q0 * (price / p0).powf(elasticity);
            let revenue = price * quantity;
            if revenue > best_revenue {
                best_price = price;
                best_revenue = revenue;
            }
        }
    }

    PriceSuggestion {
        sku: sku.to_string(),
        current_price: p0,
        suggested_price: round2(best_price),
        revenue_baseline: round2(baseline),
        revenue_suggested: round2(best_revenue),
        delta: round2(best_revenue - baseline),
    }
}

/// Suggest prices for `skus`, or for the highest-priced SKUs when none are named.
pub fn optimize_prices(
    inventory: &[InventoryRecord],
    sales: &[SalesRecord],
    skus: Option<&HashSet<String>>,
    elasticity: f64,
    search: &PriceSearch,
) -> PricingReport {
    let selected: Vec<&InventoryRecord> = match skus {
        Some(wanted) => inventory.iter().filter(|r| wanted.contains(&r.sku)).collect(),
        None => {
            let mut by_price: Vec<&InventoryRecord> = inventory.iter().collect();
            by_price.sort_by(|a, b| b.unit_price.total_cmp(&a.unit_price));
            by_price.truncate(DEFAULT_PRICED_SKUS);
            by_price
        }
    };

    let pricing = selected
        .into_iter()
        .map(|row| {
            let q0 = baseline_quantity(&row.sku, sales);
            suggest_price(&row.sku, row.unit_price, q0, elasticity, search)
        })
        .collect();

    PricingReport {
        pricing,
        assumptions: PricingAssumptions {
            elasticity,
            band: search.band_label(),
        },
    }
}

pub struct PriceOptimize {
    inventory: Arc<dyn DataProvider<InventoryRecord>>,
    sales: Arc<dyn DataProvider<SalesRecord>>,
    search: PriceSearch,
    default_elasticity: f64,
    description: String,
}

impl PriceOptimize {
    pub fn new(
        inventory: Arc<dyn DataProvider<InventoryRecord>>,
        sales: Arc<dyn DataProvider<SalesRecord>>,
        settings: &ToolSettings,
    ) -> Self {
        let search = PriceSearch {
            band: settings.price_band,
            steps: settings.price_steps,
        };
        Self {
            inventory,
            sales,
            description: format!(
                "Suggest price within {} that maximizes revenue using simple elasticity.",
                search.band_label()
            ),
            search,
            default_elasticity: settings.default_elasticity,
        }
    }
}

#[async_trait]
impl Tool for PriceOptimize {
    fn name(&self) -> &str {
        "retail_price_optimize"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "skus": { "type": "array", "items": { "type": "string" } },
                "elasticity": { "type": "number", "default": self.default_elasticity }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let skus: Option<HashSet<String>> = args
            .get("skus")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<HashSet<String>>()
            })
            .filter(|set| !set.is_empty());
        let elasticity = args
            .get("elasticity")
            .and_then(Value::as_f64)
            .unwrap_or(self.default_elasticity);

        let inventory = load_blocking(&self.inventory).await?;
        let sales = load_blocking(&self.sales).await?;
        to_json(&optimize_prices(
            &inventory,
            &sales,
            skus.as_ref(),
            elasticity,
            &self.search,
        ))
    }
}
