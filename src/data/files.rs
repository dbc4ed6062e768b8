//! File-backed providers
//!
//! Sales and inventory come from comma-separated files with a header row; the
//! FAQ is a JSON array of `{ "q": ..., "a": ... }` objects. Each `load()` call
//! re-reads the file.

use super::records::{to_count, to_number, FaqEntry, InventoryRecord, SalesRecord};
use super::{parse_date, DataProvider};
use crate::types::{AppError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SalesRow {
    date: String,
    order_id: String,
    sku: String,
    category: String,
    unit_price: String,
    quantity: String,
}

impl From<SalesRow> for SalesRecord {
    fn from(row: SalesRow) -> Self {
        let unit_price = to_number(&row.unit_price);
        let quantity = to_number(&row.quantity);
        SalesRecord {
            date: parse_date(&row.date),
            order_id: row.order_id,
            sku: row.sku,
            category: row.category,
            unit_price,
            quantity,
            revenue: unit_price * quantity,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InventoryRow {
    sku: String,
    category: String,
    unit_price: String,
    on_hand: String,
    reorder_point: String,
}

impl From<InventoryRow> for InventoryRecord {
    fn from(row: InventoryRow) -> Self {
        InventoryRecord {
            sku: row.sku,
            category: row.category,
            unit_price: to_number(&row.unit_price),
            on_hand: to_count(&row.on_hand),
            reorder_point: to_count(&row.reorder_point),
        }
    }
}

/// Read every row of a CSV file into `R`, or nothing if the file is absent.
fn read_csv_rows<R>(path: &Path) -> Result<Vec<R>>
where
    R: for<'de> Deserialize<'de>,
{
    if !path.exists() {
        debug!(path = %path.display(), "source table missing, treating as empty");
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::Data(format!("Failed to open {}: {}", path.display(), e)))?;

    reader
        .deserialize()
        .collect::<std::result::Result<Vec<R>, _>>()
        .map_err(|e| AppError::Data(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Sales table (`date,order_id,sku,category,unit_price,quantity`).
#[derive(Debug, Clone)]
pub struct CsvSalesProvider {
    path: PathBuf,
}

impl CsvSalesProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DataProvider<SalesRecord> for CsvSalesProvider {
    fn load(&self) -> Result<Vec<SalesRecord>> {
        let rows: Vec<SalesRow> = read_csv_rows(&self.path)?;
        Ok(rows.into_iter().map(SalesRecord::from).collect())
    }
}

/// Inventory table (`sku,category,unit_price,on_hand,reorder_point`).
#[derive(Debug, Clone)]
pub struct CsvInventoryProvider {
    path: PathBuf,
}

impl CsvInventoryProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DataProvider<InventoryRecord> for CsvInventoryProvider {
    fn load(&self) -> Result<Vec<InventoryRecord>> {
        let rows: Vec<InventoryRow> = read_csv_rows(&self.path)?;
        Ok(rows.into_iter().map(InventoryRecord::from).collect())
    }
}

/// FAQ list stored as JSON. Unlike the CSV tables, a missing file is reported
/// as [`AppError::NotFound`] so the lookup tool can say the FAQ is unavailable.
#[derive(Debug, Clone)]
pub struct JsonFaqProvider {
    path: PathBuf,
}

impl JsonFaqProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DataProvider<FaqEntry> for JsonFaqProvider {
    fn load(&self) -> Result<Vec<FaqEntry>> {
        if !self.path.exists() {
            return Err(AppError::NotFound(format!(
                "FAQ file {}",
                self.path.display()
            )));
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| AppError::Data(format!("Failed to read {}: {}", self.path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::Data(format!("Failed to parse {}: {}", self.path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_sales_csv_computes_revenue() {
        let file = write_temp(
            "date,order_id,sku,category,unit_price,quantity\n\
             2024-01-02,o1,SKU-1,toys,12.50,2\n\
             2024-01-03,o2,SKU-2,games,bad,3\n",
        );

        let records = CsvSalesProvider::new(file.path()).load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].revenue, 25.0);
        assert_eq!(records[0].date, parse_date("2024-01-02"));
        assert_eq!(records[1].unit_price, 0.0);
        assert_eq!(records[1].revenue, 0.0);
    }

    #[test]
    fn test_sales_csv_keeps_fractional_quantity() {
        let file = write_temp(
            "date,order_id,sku,category,unit_price,quantity\n\
             2024-01-02,o1,SKU-1,produce,4.00,2.5\n",
        );

        let records = CsvSalesProvider::new(file.path()).load().unwrap();
        assert_eq!(records[0].quantity, 2.5);
        assert_eq!(records[0].revenue, 10.0);
    }

    #[test]
    fn test_sales_csv_rereads_on_every_load() {
        let mut file = write_temp("date,order_id,sku,category,unit_price,quantity\n");
        let provider = CsvSalesProvider::new(file.path());
        assert!(provider.load().unwrap().is_empty());

        file.write_all(b"2024-01-02,o1,SKU-1,toys,1,1\n").unwrap();
        file.flush().unwrap();
        assert_eq!(provider.load().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_csv_is_empty() {
        let sales = CsvSalesProvider::new("/nonexistent/sales.csv").load().unwrap();
        assert!(sales.is_empty());
        let inventory = CsvInventoryProvider::new("/nonexistent/inventory.csv")
            .load()
            .unwrap();
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_inventory_csv() {
        let file = write_temp(
            "sku,category,unit_price,on_hand,reorder_point\n\
             SKU-1, toys ,9.99,3,5\n",
        );
        let records = CsvInventoryProvider::new(file.path()).load().unwrap();
        assert_eq!(records, vec![InventoryRecord::new("SKU-1", "toys", 9.99, 3, 5)]);
    }

    #[test]
    fn test_faq_json() {
        let file = write_temp(r#"[{"q": "How do I reset my password?", "a": "Go to settings."}, {"q": "Only question"}]"#);
        let entries = JsonFaqProvider::new(file.path()).load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].a, "");
    }

    #[test]
    fn test_missing_faq_is_not_found() {
        let err = JsonFaqProvider::new("/nonexistent/faq.json").load().unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_malformed_faq_is_data_error() {
        let file = write_temp("{not json");
        let err = JsonFaqProvider::new(file.path()).load().unwrap_err();
        assert!(matches!(err, AppError::Data(_)));
    }
}
