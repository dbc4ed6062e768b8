use crate::data::DataSources;
use crate::tools::{
    calculator::Calculator,
    faq::FaqLookup,
    report::MarkdownReport,
    retail::{InventoryStatus, PriceOptimize, SalesSummary},
};
use crate::types::{AppError, Result, ToolDefinition};
use crate::utils::config::ToolSettings;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, args: Value) -> Result<Value>;
}

/// Name-keyed set of tools. Definitions are reported in registration order.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// General-purpose tools: calculator and FAQ lookup.
    pub fn general(sources: &DataSources, settings: &ToolSettings) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Calculator));
        registry.register(Arc::new(FaqLookup::new(
            sources.faq.clone(),
            settings.faq_match_threshold,
        )));
        registry
    }

    /// Retail analytics tools on top of the general ones.
    pub fn retail(sources: &DataSources, settings: &ToolSettings) -> Self {
        let mut registry = Self::general(sources, settings);
        registry.register(Arc::new(SalesSummary::new(
            sources.sales.clone(),
            settings.default_top_n,
        )));
        registry.register(Arc::new(InventoryStatus::new(sources.inventory.clone())));
        registry.register(Arc::new(PriceOptimize::new(
            sources.inventory.clone(),
            sources.sales.clone(),
            settings,
        )));
        registry.register(Arc::new(MarkdownReport));
        registry
    }

    /// Register a tool; a tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        match self.index.get(&name) {
            Some(&slot) => self.tools[slot] = tool,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        match self.index.get(name) {
            Some(&slot) => self.tools[slot].execute(args).await,
            None => Err(AppError::NotFound(format!("Unknown tool: {}", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FaqEntry, InventoryRecord, SalesRecord};
    use serde_json::json;

    fn names(registry: &ToolRegistry) -> Vec<String> {
        registry
            .get_tool_definitions()
            .into_iter()
            .map(|def| def.name)
            .collect()
    }

    fn sources() -> DataSources {
        DataSources::in_memory(
            vec![FaqEntry::new("reset password", "go to settings")],
            vec![SalesRecord::new("2024-01-01", "o1", "SKU-1", "toys", 10.0, 2.0)],
            vec![InventoryRecord::new("SKU-1", "toys", 10.0, 1, 5)],
        )
    }

    #[test]
    fn test_registry_creation() {
        let registry = ToolRegistry::new();
        assert!(names(&registry).is_empty());
    }

    #[test]
    fn test_general_registry() {
        let registry = ToolRegistry::general(&sources(), &ToolSettings::default());
        assert_eq!(names(&registry), vec!["calculator", "faq_lookup"]);
    }

    #[test]
    fn test_retail_registry_is_superset_of_general() {
        let settings = ToolSettings::default();
        let general = ToolRegistry::general(&sources(), &settings);
        let retail = ToolRegistry::retail(&sources(), &settings);

        let retail_names = names(&retail);
        for name in names(&general) {
            assert!(retail_names.contains(&name));
        }
        assert_eq!(
            retail_names,
            vec![
                "calculator",
                "faq_lookup",
                "retail_sales_summary",
                "retail_inventory_status",
                "retail_price_optimize",
                "retail_markdown_report",
            ]
        );
    }

    #[test]
    fn test_get_tool_definitions() {
        let registry = ToolRegistry::retail(&sources(), &ToolSettings::default());
        let definitions = registry.get_tool_definitions();

        assert_eq!(definitions.len(), 6);
        for def in &definitions {
            assert!(!def.name.is_empty());
            assert!(!def.description.is_empty());
            assert_eq!(def.parameters["type"], "object");
        }
    }

    #[test]
    fn test_register_same_name_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Calculator));
        registry.register(Arc::new(Calculator));
        assert_eq!(names(&registry), vec!["calculator"]);
    }

    #[tokio::test]
    async fn test_calculator_execution() {
        let registry = ToolRegistry::general(&sources(), &ToolSettings::default());
        let value = registry
            .execute("calculator", json!({ "expression": "5 + 3" }))
            .await
            .unwrap();
        assert_eq!(value, json!("8"));
    }

    #[tokio::test]
    async fn test_nonexistent_tool() {
        let registry = ToolRegistry::general(&sources(), &ToolSettings::default());
        let err = registry
            .execute("nonexistent_tool", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(err.to_string().contains("Unknown tool: nonexistent_tool"));
    }
}
