//! Markdown rendering of retail findings
//!
//! Accepts whatever combination of sales summary, inventory status and pricing
//! output the model has collected and lays it out as a short report. Missing
//! sections are skipped; unknown keys are ignored.

use crate::tools::registry::Tool;
use crate::types::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

const TITLE: &str = "# Retail Summary Report";
const NO_FINDINGS: &str = "(No findings)";

const MAX_RANKED_ROWS: usize = 10;
const MAX_LOW_STOCK_ROWS: usize = 15;

/// Integral numbers print without a fractional part; absent values as `n/a`.
fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "n/a".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

fn money(value: Option<&Value>) -> String {
    format!("${:.2}", value.and_then(Value::as_f64).unwrap_or(0.0))
}

fn rows<'a>(findings: &'a Map<String, Value>, key: &str, limit: usize) -> Option<&'a [Value]> {
    findings
        .get(key)
        .and_then(Value::as_array)
        .map(|items| &items[..items.len().min(limit)])
}

/// Render findings as markdown. `findings` may be the findings object itself
/// or a wrapper of the form `{"findings": {...}}`.
pub fn render_report(args: &Value) -> String {
    let empty = Map::new();
    let findings = args
        .get("findings")
        .and_then(Value::as_object)
        .or_else(|| args.as_object())
        .unwrap_or(&empty);

    let mut sections: Vec<Vec<String>> = Vec::new();

    if let Some(totals) = findings.get("totals").and_then(Value::as_object) {
        sections.push(vec![
            "## Overview".to_string(),
            format!("- Orders: {}", display_value(totals.get("orders"))),
            format!("- Units: {}", display_value(totals.get("units"))),
            format!("- Revenue: {}", money(totals.get("revenue"))),
        ]);
    }

    if let Some(items) = rows(findings, "top_skus", MAX_RANKED_ROWS) {
        let mut lines = vec!["## Top SKUs".to_string()];
        lines.extend(items.iter().map(|item| {
            format!(
                "- {}: {} | units={}",
                display_value(item.get("sku")),
                money(item.get("revenue")),
                display_value(item.get("quantity"))
            )
        }));
        sections.push(lines);
    }

    if let Some(items) = rows(findings, "top_categories", MAX_RANKED_ROWS) {
        let mut lines = vec!["## Top Categories".to_string()];
        lines.extend(items.iter().map(|item| {
            format!(
                "- {}: {} | units={}",
                display_value(item.get("category")),
                money(item.get("revenue")),
                display_value(item.get("quantity"))
            )
        }));
        sections.push(lines);
    }

    if let Some(items) = rows(findings, "low_stock", MAX_LOW_STOCK_ROWS) {
        let mut lines = vec!["## Low Stock Alerts".to_string()];
        lines.extend(items.iter().map(|item| {
            format!(
                "- {} (on_hand={}, ROP={})",
                display_value(item.get("sku")),
                display_value(item.get("on_hand")),
                display_value(item.get("reorder_point"))
            )
        }));
        sections.push(lines);
    }

    if let Some(items) = rows(findings, "pricing", MAX_RANKED_ROWS) {
        let mut lines = vec!["## Pricing Suggestions".to_string()];
        lines.extend(items.iter().map(|item| {
            format!(
                "- {}: {} -> {} | ΔRev={}",
                display_value(item.get("sku")),
                display_value(item.get("current_price")),
                display_value(item.get("suggested_price")),
                money(item.get("delta"))
            )
        }));
        if let Some(assumptions) = findings.get("assumptions").and_then(Value::as_object) {
            lines.push(format!(
                "Assumptions: elasticity={} within {}",
                display_value(assumptions.get("elasticity")),
                display_value(assumptions.get("band"))
            ));
        }
        sections.push(lines);
    }

    let mut out = vec![TITLE.to_string()];
    if sections.is_empty() {
        out.push(NO_FINDINGS.to_string());
    } else {
        for section in sections {
            out.extend(section);
            out.push(String::new());
        }
    }
    out.join("\n")
}

pub struct MarkdownReport;

#[async_trait]
impl Tool for MarkdownReport {
    fn name(&self) -> &str {
        "retail_markdown_report"
    }

    fn description(&self) -> &str {
        "Build a concise markdown report from findings."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "totals": { "type": "object" },
                "top_skus": { "type": "array" },
                "top_categories": { "type": "array" },
                "low_stock": { "type": "array" },
                "pricing": { "type": "array" },
                "assumptions": { "type": "object" }
            },
            "additionalProperties": true
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        Ok(Value::String(render_report(&args)))
    }
}
