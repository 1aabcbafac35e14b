//! The adapter contract and the registry that builds adapters from config.
//!
//! Every product source implements [`CatalogAdapter`]. Adapters are
//! constructed by [`create_adapter`] from a validated [`SourceConfig`] and
//! own that config for their whole lifetime.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   AdapterRegistry                    │
//! │  ┌─────────┐ ┌──────┐ ┌──────────┐ ┌───────────────┐ │
//! │  │ Shopify │ │ REST │ │ FlatFile │ │ SQL / MongoDB │ │
//! │  └─────────┘ └──────┘ └──────────┘ └───────────────┘ │
//! └──────────────────────────┬───────────────────────────┘
//!                            ▼
//!        CatalogService::load_products() → Product[]
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use catalog_harness::traits::{AdapterRegistry, PageRequest};
//! # async fn example(config: &catalog_harness::config::Config) -> anyhow::Result<()> {
//! let registry = AdapterRegistry::from_config(config)?;
//! for source in registry.by_priority() {
//!     let page = source
//!         .adapter
//!         .fetch_products(source.mapping.as_ref(), &PageRequest::new(50, 0))
//!         .await?;
//!     println!("{}: {} products", source.adapter.source_label(), page.products.len());
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use catalog_harness_core::mapping::{map_product, SchemaMapping};
use catalog_harness_core::models::Product;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::config::{Config, SourceConfig};
use crate::error::AdapterError;

// ═══════════════════════════════════════════════════════════════════════
// Request / response types
// ═══════════════════════════════════════════════════════════════════════

/// One page of a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
    /// Opaque cursor from a previous [`FetchResult::next_cursor`]. Only
    /// cursor-paginated sources read it.
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit,
            offset,
            cursor: None,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Result of [`CatalogAdapter::test_connection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionTest {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionTest {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

impl From<Result<(), AdapterError>> for ConnectionTest {
    fn from(result: Result<(), AdapterError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::failed(e),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Adapter trait
// ═══════════════════════════════════════════════════════════════════════

/// A product source.
///
/// Implementations hold their own config and no other state; every call
/// is independent and may run concurrently with others.
#[async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Instance name from `[sources.<name>]`.
    fn name(&self) -> &str;

    /// One-line description shown by `catalog sources`.
    fn description(&self) -> &str;

    /// Source type tag (`"shopify"`, `"rest"`, ...).
    fn adapter_type(&self) -> &str;

    /// `"{type}:{name}"`, used in logs, errors, and cache keys.
    fn source_label(&self) -> String {
        format!("{}:{}", self.adapter_type(), self.name())
    }

    /// Fetch one page of canonical products.
    ///
    /// `mapping` overrides the adapter's default field mapping. Rows that
    /// cannot be mapped are skipped with a warning.
    async fn fetch_products(
        &self,
        mapping: Option<&SchemaMapping>,
        page: &PageRequest,
    ) -> Result<FetchResult, AdapterError>;

    /// Probe the source. Never fails; errors are reported in the result.
    async fn test_connection(&self) -> ConnectionTest;

    /// Total products at the source, if it can be counted cheaply.
    async fn get_product_count(&self) -> Option<u64>;
}

/// Build the adapter for one configured source.
pub fn create_adapter(
    name: &str,
    config: &SourceConfig,
) -> Result<Box<dyn CatalogAdapter>, AdapterError> {
    use crate::adapter_flatfile::FlatFileAdapter;
    use crate::adapter_mongo::MongoAdapter;
    use crate::adapter_rest::RestAdapter;
    use crate::adapter_shopify::ShopifyAdapter;
    use crate::adapter_sql::{Dialect, SqlAdapter};

    config.validate(name)?;
    let name = name.to_string();
    let adapter: Box<dyn CatalogAdapter> = match config {
        SourceConfig::Shopify(cfg) => Box::new(ShopifyAdapter::new(name, cfg.clone())),
        SourceConfig::Rest(cfg) => Box::new(RestAdapter::new(name, cfg.clone())),
        SourceConfig::FlatFile(cfg) => Box::new(FlatFileAdapter::new(name, cfg.clone())),
        SourceConfig::Postgres(cfg) => {
            Box::new(SqlAdapter::new(name, cfg.clone(), Dialect::Postgres))
        }
        SourceConfig::Mysql(cfg) => Box::new(SqlAdapter::new(name, cfg.clone(), Dialect::Mysql)),
        SourceConfig::Mongo(cfg) => Box::new(MongoAdapter::new(name, cfg.clone())),
    };
    Ok(adapter)
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// An adapter together with the per-source settings callers need.
pub struct RegisteredSource {
    pub adapter: Box<dyn CatalogAdapter>,
    pub mapping: Option<SchemaMapping>,
    pub priority: i32,
}

/// All configured adapters.
#[derive(Default)]
pub struct AdapterRegistry {
    sources: Vec<RegisteredSource>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one adapter per `[sources.<name>]` entry.
    pub fn from_config(config: &Config) -> Result<Self, AdapterError> {
        let mut registry = Self::new();
        for (name, entry) in &config.sources {
            let adapter = create_adapter(name, &entry.config)?;
            registry.register(adapter, entry.mapping.clone(), entry.priority);
        }
        Ok(registry)
    }

    pub fn register(
        &mut self,
        adapter: Box<dyn CatalogAdapter>,
        mapping: Option<SchemaMapping>,
        priority: i32,
    ) {
        self.sources.push(RegisteredSource {
            adapter,
            mapping,
            priority,
        });
    }

    pub fn sources(&self) -> &[RegisteredSource] {
        &self.sources
    }

    /// Sources ordered for fallback: ascending priority, then name.
    pub fn by_priority(&self) -> Vec<&RegisteredSource> {
        let mut ordered: Vec<&RegisteredSource> = self.sources.iter().collect();
        ordered.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.adapter.name().cmp(b.adapter.name()))
        });
        ordered
    }

    /// Find a source by instance name.
    pub fn find(&self, name: &str) -> Option<&RegisteredSource> {
        self.sources.iter().find(|s| s.adapter.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Helpers shared by adapters
// ═══════════════════════════════════════════════════════════════════════

/// Map source rows, skipping (and logging) rows without a resolvable id.
pub(crate) fn map_rows(adapter: &str, rows: &[Value], mapping: &SchemaMapping) -> Vec<Product> {
    let mut products = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match map_product(row, mapping) {
            Ok(product) => products.push(product),
            Err(source) => {
                let err = AdapterError::Mapping {
                    adapter: adapter.to_string(),
                    source,
                };
                warn!(row = index, error = %err, "skipping unmappable row");
            }
        }
    }
    products
}

/// Whether another page exists after this one. A known total wins;
/// otherwise a full page implies more.
pub(crate) fn has_more(page: &PageRequest, returned: usize, total: Option<u64>) -> bool {
    match total {
        Some(total) => ((page.offset + returned) as u64) < total,
        None => page.limit > 0 && returned >= page.limit,
    }
}
