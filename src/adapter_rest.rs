//! Generic REST adapter.
//!
//! Fetches products from any JSON HTTP endpoint.
//!
//! # Configuration
//!
//! ```toml
//! [sources.api]
//! type = "rest"
//! url = "https://api.example.com/v1/products"
//! method = "GET"
//! headers = { "Accept" = "application/json" }
//! auth = { kind = "header", name = "X-Api-Key", value = "..." }
//! products_path = "result.items"     # optional
//! total_path = "result.total"        # optional
//! pagination = { style = "page", limit_param = "per_page", page_param = "p" }
//! ```
//!
//! # Response shape
//!
//! The product array is read from `products_path` when set, otherwise from
//! `products`, then `data`, then the body itself if it is an array. The total
//! is read from `total_path`, otherwise a top-level `total`.
//!
//! # Authentication
//!
//! | `auth.kind` | Effect |
//! |-------------|--------|
//! | `none` | nothing added |
//! | `bearer` | `Authorization: Bearer <token>` |
//! | `header` | `<name>: <value>` |
//! | `query` | `?<param>=<value>` |

use async_trait::async_trait;
use catalog_harness_core::mapping::{resolve_path, SchemaMapping};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::config::{PaginationStyle, RestAuth, RestConfig};
use crate::error::AdapterError;
use crate::http;
use crate::traits::{has_more, map_rows, CatalogAdapter, ConnectionTest, FetchResult, PageRequest};

pub struct RestAdapter {
    name: String,
    config: RestConfig,
}

impl RestAdapter {
    pub fn new(name: String, config: RestConfig) -> Self {
        Self { name, config }
    }

    /// Query parameters for one page under the configured scheme.
    fn page_params(&self, page: &PageRequest) -> Vec<(String, String)> {
        let p = &self.config.pagination;
        let mut params = vec![(p.limit_param.clone(), page.limit.to_string())];
        match p.style {
            PaginationStyle::Offset => {
                params.push((p.offset_param.clone(), page.offset.to_string()));
            }
            PaginationStyle::Page => {
                let number = if page.limit == 0 {
                    1
                } else {
                    page.offset / page.limit + 1
                };
                params.push((p.page_param.clone(), number.to_string()));
            }
        }
        params
    }

    async fn request(&self, page: &PageRequest) -> Result<Value, AdapterError> {
        let label = self.source_label();
        let method = Method::from_bytes(self.config.method.to_uppercase().as_bytes())
            .map_err(|e| AdapterError::config(&label, e))?;
        let client = http::client(&label, self.config.timeout_secs)?;

        let mut request = client
            .request(method, &self.config.url)
            .query(&self.page_params(page));
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }
        request = match &self.config.auth {
            RestAuth::None => request,
            RestAuth::Bearer { token } => request.bearer_auth(token),
            RestAuth::Header { name, value } => request.header(name, value),
            RestAuth::Query { param, value } => request.query(&[(param, value)]),
        };

        let (_, body) = http::send_json(&label, request).await?;
        Ok(body)
    }

    fn total_from(&self, body: &Value) -> Option<u64> {
        let value = match &self.config.total_path {
            Some(path) => resolve_path(body, path),
            None => body.get("total"),
        }?;
        match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Locate the product array in a response body.
pub fn extract_products<'a>(body: &'a Value, products_path: Option<&str>) -> Option<&'a Vec<Value>> {
    if let Some(path) = products_path {
        return resolve_path(body, path).and_then(Value::as_array);
    }
    body.get("products")
        .and_then(Value::as_array)
        .or_else(|| body.get("data").and_then(Value::as_array))
        .or_else(|| body.as_array())
}

#[async_trait]
impl CatalogAdapter for RestAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Products from a generic JSON REST endpoint"
    }

    fn adapter_type(&self) -> &str {
        "rest"
    }

    async fn fetch_products(
        &self,
        mapping: Option<&SchemaMapping>,
        page: &PageRequest,
    ) -> Result<FetchResult, AdapterError> {
        let label = self.source_label();
        let body = self.request(page).await?;
        let rows = extract_products(&body, self.config.products_path.as_deref())
            .ok_or_else(|| AdapterError::parse(&label, "no product array in response"))?;

        let default_mapping = SchemaMapping::default();
        let products = map_rows(&label, rows, mapping.unwrap_or(&default_mapping));
        let total = self.total_from(&body);
        debug!(source = %label, returned = rows.len(), ?total, "fetched rest page");

        Ok(FetchResult {
            has_more: has_more(page, rows.len(), total),
            products,
            total,
            next_cursor: None,
        })
    }

    async fn test_connection(&self) -> ConnectionTest {
        self.request(&PageRequest::new(1, 0)).await.map(|_| ()).into()
    }

    async fn get_product_count(&self) -> Option<u64> {
        match self.request(&PageRequest::new(1, 0)).await {
            Ok(body) => self.total_from(&body),
            Err(e) => {
                tracing::warn!(error = %e, "product count unavailable");
                None
            }
        }
    }
}
