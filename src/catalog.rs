//! Catalog service: adapters + cache + matching.
//!
//! [`CatalogService`] is what request handlers call. It loads catalogs
//! through the cache, falls back across sources, and runs the
//! classify → limit → rank pipeline from `catalog-harness-core`.
//!
//! # Loading
//!
//! ```text
//! load_products(adapter)
//!   ├─ cache hit "catalog:<type>:<name>" ─────────► cached products
//!   └─ miss ─► fetch pages (fetch_limit × max_pages)
//!               ├─ ok ─► cache (catalog TTL) ─────► products
//!               └─ err ─► warn, nothing cached ───► empty
//! ```
//!
//! Adapter failures never propagate out of the service; an unavailable
//! source looks like an empty catalog.

use std::sync::Arc;
use std::time::Duration;

use catalog_harness_core::intent::classify_intent;
use catalog_harness_core::limits::result_limit;
use catalog_harness_core::mapping::SchemaMapping;
use catalog_harness_core::models::{
    ConversationTurn, Intent, Product, ProductContext, ScoredProduct,
};
use catalog_harness_core::search::{search_with_params, SearchParams};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CatalogCache, TtlClass};
use crate::config::{Config, SearchConfig};
use crate::error::AdapterError;
use crate::traits::{AdapterRegistry, CatalogAdapter, PageRequest};

/// Values stored in the shared cache.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Catalog(Arc<Vec<Product>>),
    Policy(Arc<Value>),
}

/// Outcome of [`CatalogService::search`].
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub intent: Intent,
    pub limit: usize,
    pub results: Vec<ScoredProduct>,
}

/// A catalog loaded by [`CatalogService::load_with_fallback`].
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    /// `"{type}:{name}"` of the source that answered.
    pub source: String,
    pub products: Arc<Vec<Product>>,
}

pub struct CatalogService {
    cache: Arc<CatalogCache<CachedValue>>,
    search: SearchConfig,
    sweep_interval: Duration,
}

impl CatalogService {
    pub fn new(
        cache: Arc<CatalogCache<CachedValue>>,
        search: SearchConfig,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            cache,
            search,
            sweep_interval,
        }
    }

    /// Service with a fresh cache built from `[cache]`. The sweeper is not
    /// started; long-running hosts call [`start_sweeper`](Self::start_sweeper).
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(CatalogCache::from_config(&config.cache)),
            config.search.clone(),
            Duration::from_secs(config.cache.sweep_interval_secs),
        )
    }

    /// Start the cache sweeper at `[cache].sweep_interval_secs`. Must be
    /// called from within a tokio runtime.
    pub fn start_sweeper(&self) {
        self.cache.start_sweeper(self.sweep_interval);
    }

    pub fn stop_sweeper(&self) {
        self.cache.stop_sweeper();
    }

    pub fn cache(&self) -> &Arc<CatalogCache<CachedValue>> {
        &self.cache
    }

    /// Cache key for one source.
    pub fn catalog_key(adapter: &dyn CatalogAdapter) -> String {
        format!("catalog:{}", adapter.source_label())
    }

    /// Products for `adapter`, served from cache when fresh.
    pub async fn load_products(
        &self,
        adapter: &dyn CatalogAdapter,
        mapping: Option<&SchemaMapping>,
    ) -> Arc<Vec<Product>> {
        let key = Self::catalog_key(adapter);
        if let Some(CachedValue::Catalog(products)) = self.cache.get(&key) {
            debug!(%key, count = products.len(), "catalog cache hit");
            return products;
        }

        match self.fetch_all(adapter, mapping).await {
            Ok(products) => {
                let products = Arc::new(products);
                info!(%key, count = products.len(), "catalog loaded");
                self.cache
                    .set(key, CachedValue::Catalog(products.clone()), TtlClass::Catalog);
                products
            }
            Err(e) => {
                warn!(error = %e, "catalog load failed, using empty catalog");
                Arc::new(Vec::new())
            }
        }
    }

    /// Page through a source up to `max_pages × fetch_limit` products.
    async fn fetch_all(
        &self,
        adapter: &dyn CatalogAdapter,
        mapping: Option<&SchemaMapping>,
    ) -> Result<Vec<Product>, AdapterError> {
        let mut products = Vec::new();
        let mut page = PageRequest::new(self.search.fetch_limit, 0);

        for number in 1..=self.search.max_pages {
            let result = adapter.fetch_products(mapping, &page).await?;
            let returned = result.products.len();
            debug!(
                source = %adapter.source_label(),
                page = number,
                returned,
                has_more = result.has_more,
                "fetched page"
            );
            products.extend(result.products);

            if !result.has_more || (returned == 0 && result.next_cursor.is_none()) {
                break;
            }
            page = PageRequest::new(self.search.fetch_limit, page.offset + page.limit)
                .with_cursor(result.next_cursor);
        }
        Ok(products)
    }

    /// First non-empty catalog among `registry`'s sources, in priority order.
    pub async fn load_with_fallback(&self, registry: &AdapterRegistry) -> Option<LoadedCatalog> {
        for source in registry.by_priority() {
            let products = self
                .load_products(source.adapter.as_ref(), source.mapping.as_ref())
                .await;
            let label = source.adapter.source_label();
            if !products.is_empty() {
                return Some(LoadedCatalog {
                    source: label,
                    products,
                });
            }
            warn!(source = %label, "source returned no products, trying next");
        }
        None
    }

    /// Classify `message`, bound the result count by intent, and rank.
    pub fn search(
        &self,
        products: &[Product],
        message: &str,
        context: Option<&ProductContext>,
        history: &[ConversationTurn],
    ) -> SearchOutcome {
        let intent = classify_intent(message, context, history);
        let limit = result_limit(intent.intent_type, products.len());
        let params = SearchParams {
            small_catalog_threshold: self.search.small_catalog_threshold,
        };
        let results = search_with_params(products, message, Some(&intent), limit, &params);
        debug!(
            intent = intent.intent_type.as_str(),
            limit,
            returned = results.len(),
            "search complete"
        );
        SearchOutcome {
            intent,
            limit,
            results,
        }
    }

    /// Store a policy document under the long TTL.
    pub fn cache_policy(&self, key: &str, document: Value) {
        self.cache.set(
            format!("policy:{}", key),
            CachedValue::Policy(Arc::new(document)),
            TtlClass::Policy,
        );
    }

    pub fn policy(&self, key: &str) -> Option<Arc<Value>> {
        match self.cache.get(&format!("policy:{}", key)) {
            Some(CachedValue::Policy(document)) => Some(document),
            _ => None,
        }
    }
}
