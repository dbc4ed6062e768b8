//! Read-only source tables consumed by the tools
//!
//! Tools never touch the filesystem directly: they go through a
//! [`DataProvider`], whose `load()` returns the full record set. The file-backed
//! providers re-read their source on every call, so a tool invocation always
//! sees what is on disk at that moment. Callers that want caching can wrap a
//! provider or use [`StaticProvider`].
//!
//! Loading is synchronous file I/O; async callers go through [`load_blocking`]
//! so the read runs on the blocking pool and stays cancellable by a timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopkeep::data::{DataProvider, DataSources};
//!
//! let sources = DataSources::from_config(&config.data);
//! let sales = sources.sales.load()?;
//! ```

mod files;
mod records;

pub use files::{CsvInventoryProvider, CsvSalesProvider, JsonFaqProvider};
pub use records::{parse_date, FaqEntry, InventoryRecord, SalesRecord};

use crate::types::{AppError, Result};
use crate::utils::config::DataConfig;
use std::sync::Arc;

/// A source of records that can be (re)loaded on demand.
pub trait DataProvider<T>: Send + Sync {
    fn load(&self) -> Result<Vec<T>>;
}

/// Run `provider.load()` on tokio's blocking pool.
pub async fn load_blocking<T>(provider: &Arc<dyn DataProvider<T>>) -> Result<Vec<T>>
where
    T: Send + 'static,
{
    let provider = Arc::clone(provider);
    tokio::task::spawn_blocking(move || provider.load())
        .await
        .map_err(|e| AppError::Internal(format!("Data load task failed: {}", e)))?
}

/// In-memory provider returning a fixed record set.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider<T> {
    records: Vec<T>,
}

impl<T> StaticProvider<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }
}

impl<T: Clone + Send + Sync> DataProvider<T> for StaticProvider<T> {
    fn load(&self) -> Result<Vec<T>> {
        Ok(self.records.clone())
    }
}

/// The three source tables the tools read from.
#[derive(Clone)]
pub struct DataSources {
    pub faq: Arc<dyn DataProvider<FaqEntry>>,
    pub sales: Arc<dyn DataProvider<SalesRecord>>,
    pub inventory: Arc<dyn DataProvider<InventoryRecord>>,
}

impl DataSources {
    /// File-backed sources at the configured paths.
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            faq: Arc::new(JsonFaqProvider::new(&config.faq_path)),
            sales: Arc::new(CsvSalesProvider::new(&config.sales_path)),
            inventory: Arc::new(CsvInventoryProvider::new(&config.inventory_path)),
        }
    }

    /// In-memory sources, mainly for tests.
    pub fn in_memory(
        faq: Vec<FaqEntry>,
        sales: Vec<SalesRecord>,
        inventory: Vec<InventoryRecord>,
    ) -> Self {
        Self {
            faq: Arc::new(StaticProvider::new(faq)),
            sales: Arc::new(StaticProvider::new(sales)),
            inventory: Arc::new(StaticProvider::new(inventory)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider_returns_records_every_time() {
        let provider = StaticProvider::new(vec![FaqEntry::new("q", "a")]);
        assert_eq!(provider.load().unwrap().len(), 1);
        assert_eq!(provider.load().unwrap().len(), 1);
    }

    #[test]
    fn test_in_memory_sources() {
        let sources = DataSources::in_memory(
            vec![],
            vec![SalesRecord::new("2024-01-01", "o1", "SKU-1", "toys", 2.5, 4.0)],
            vec![],
        );
        let sales = sources.sales.load().unwrap();
        assert_eq!(sales[0].revenue, 10.0);
        assert!(sources.inventory.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_blocking_returns_provider_records() {
        let sources = DataSources::in_memory(vec![FaqEntry::new("q", "a")], vec![], vec![]);
        let faq = load_blocking(&sources.faq).await.unwrap();
        assert_eq!(faq, vec![FaqEntry::new("q", "a")]);
    }
}
