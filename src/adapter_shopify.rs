//! Shopify storefront adapter.
//!
//! Reads products through the Shopify REST Admin API using an Admin API
//! access token.
//!
//! # Configuration
//!
//! ```toml
//! [sources.main]
//! type = "shopify"
//! shop_domain = "acme.myshopify.com"
//! access_token = "shpat_..."
//! api_version = "2024-01"   # default
//! ```
//!
//! # Endpoints
//!
//! | Call | Request |
//! |------|---------|
//! | fetch | `GET /admin/api/{version}/products.json?limit=N[&page_info=cursor]` |
//! | count | `GET /admin/api/{version}/products/count.json` |
//! | test  | `GET /admin/api/{version}/shop.json` |
//!
//! All requests carry the `X-Shopify-Access-Token` header.
//!
//! # Pagination
//!
//! Shopify paginates by cursor. The cursor for the next page is the
//! `page_info` parameter of the `rel="next"` URL in the `Link` response
//! header; the request's `offset` is ignored.

use async_trait::async_trait;
use catalog_harness_core::mapping::SchemaMapping;
use catalog_harness_core::models::Product;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, LINK};
use serde_json::Value;
use tracing::debug;

use crate::config::ShopifyConfig;
use crate::error::AdapterError;
use crate::http;
use crate::traits::{map_rows, CatalogAdapter, ConnectionTest, FetchResult, PageRequest};

/// Shopify caps `limit` at 250.
const MAX_PAGE_SIZE: usize = 250;
const TOKEN_HEADER: &str = "X-Shopify-Access-Token";

static NEXT_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<([^>]+)>\s*;\s*rel="?next"?"#).expect("valid link pattern"));
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

pub struct ShopifyAdapter {
    name: String,
    config: ShopifyConfig,
}

impl ShopifyAdapter {
    pub fn new(name: String, config: ShopifyConfig) -> Self {
        Self { name, config }
    }

    fn base_url(&self) -> String {
        let domain = self.config.shop_domain.trim().trim_end_matches('/');
        let root = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        };
        format!("{}/admin/api/{}", root, self.config.api_version)
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(HeaderMap, Value), AdapterError> {
        let label = self.source_label();
        let client = http::client(&label, self.config.timeout_secs)?;
        let request = client
            .get(format!("{}/{}", self.base_url(), path))
            .header(TOKEN_HEADER, &self.config.access_token)
            .query(query);
        http::send_json(&label, request).await
    }

    async fn count(&self) -> Result<u64, AdapterError> {
        let (_, body) = self.get("products/count.json", &[]).await?;
        body.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| AdapterError::parse(&self.source_label(), "missing 'count' field"))
    }
}

/// Field mapping for Shopify's product JSON.
pub fn default_mapping() -> SchemaMapping {
    SchemaMapping {
        id: Some("id".into()),
        title: Some("title".into()),
        description: Some("body_html".into()),
        price: Some("variants.0.price".into()),
        category: Some("product_type".into()),
        product_type: Some("product_type".into()),
        vendor: Some("vendor".into()),
        tags: Some("tags".into()),
        images: Some("images".into()),
        variants: Some("variants".into()),
        ..Default::default()
    }
}

/// Extract the `page_info` cursor of the `rel="next"` link.
pub fn next_cursor(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let url = NEXT_LINK_RE.captures(part)?.get(1)?.as_str();
        let parsed = reqwest::Url::parse(url).ok()?;
        parsed
            .query_pairs()
            .find(|(key, _)| key == "page_info")
            .map(|(_, value)| value.into_owned())
    })
}

/// Stock state from the first variant's inventory.
fn first_variant_in_stock(row: &Value) -> bool {
    row.pointer("/variants/0/inventory_quantity")
        .and_then(Value::as_i64)
        .is_some_and(|qty| qty > 0)
}

fn strip_html(text: &str) -> String {
    HTML_TAG_RE.replace_all(text, " ").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl CatalogAdapter for ShopifyAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Products from a Shopify store via the REST Admin API"
    }

    fn adapter_type(&self) -> &str {
        "shopify"
    }

    async fn fetch_products(
        &self,
        mapping: Option<&SchemaMapping>,
        page: &PageRequest,
    ) -> Result<FetchResult, AdapterError> {
        let label = self.source_label();
        let limit = page.limit.clamp(1, MAX_PAGE_SIZE);
        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = &page.cursor {
            query.push(("page_info", cursor.clone()));
        }

        let (headers, body) = self.get("products.json", &query).await?;
        let rows = body
            .get("products")
            .and_then(Value::as_array)
            .ok_or_else(|| AdapterError::parse(&label, "missing 'products' array"))?;

        let products: Vec<Product> = match mapping {
            Some(explicit) => map_rows(&label, rows, explicit),
            None => {
                let defaults = default_mapping();
                let mut products = Vec::with_capacity(rows.len());
                for row in rows {
                    let mut mapped = map_rows(&label, std::slice::from_ref(row), &defaults);
                    if let Some(mut product) = mapped.pop() {
                        product.in_stock = first_variant_in_stock(row);
                        product.description = strip_html(&product.description);
                        products.push(product);
                    }
                }
                products
            }
        };

        let next_cursor = next_cursor(&headers);
        debug!(
            source = %label,
            returned = products.len(),
            next = next_cursor.is_some(),
            "fetched shopify page"
        );

        Ok(FetchResult {
            has_more: rows.len() == limit,
            products,
            total: None,
            next_cursor,
        })
    }

    async fn test_connection(&self) -> ConnectionTest {
        self.get("shop.json", &[]).await.map(|_| ()).into()
    }

    async fn get_product_count(&self) -> Option<u64> {
        match self.count().await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(error = %e, "product count unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_next_cursor_from_link_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://acme.myshopify.com/admin/api/2024-01/products.json?limit=50&page_info=prev123>; rel=\"previous\", \
                 <https://acme.myshopify.com/admin/api/2024-01/products.json?limit=50&page_info=next456>; rel=\"next\"",
            ),
        );
        assert_eq!(next_cursor(&headers).as_deref(), Some("next456"));
    }

    #[test]
    fn test_no_next_link() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://acme.myshopify.com/admin/api/2024-01/products.json?page_info=p>; rel=\"previous\"",
            ),
        );
        assert_eq!(next_cursor(&headers), None);
        assert_eq!(next_cursor(&HeaderMap::new()), None);
    }

    #[test]
    fn test_base_url_accepts_bare_domain_or_url() {
        let config = ShopifyConfig {
            shop_domain: "acme.myshopify.com/".into(),
            access_token: "t".into(),
            api_version: "2024-01".into(),
            timeout_secs: 5,
        };
        let adapter = ShopifyAdapter::new("main".into(), config.clone());
        assert_eq!(adapter.base_url(), "https://acme.myshopify.com/admin/api/2024-01");

        let adapter = ShopifyAdapter::new(
            "main".into(),
            ShopifyConfig {
                shop_domain: "http://127.0.0.1:8080".into(),
                ..config
            },
        );
        assert_eq!(adapter.base_url(), "http://127.0.0.1:8080/admin/api/2024-01");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Soft <b>wool</b></p>\n<br/>coat"), "Soft wool coat");
    }
}
