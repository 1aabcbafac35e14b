//! Flat-file adapter (CSV, TSV, or any single-character delimiter).
//!
//! The file comes from inline `content`, a local `path`, or a `url`, checked
//! in that order. It is parsed in full on every call and paginated in memory.
//!
//! # Configuration
//!
//! ```toml
//! [sources.feed]
//! type = "flat_file"
//! url = "https://cdn.example.com/catalog.tsv"
//! delimiter = "\t"
//! has_header = true
//! ```
//!
//! # Parsing rules
//!
//! - The first line is the header unless `has_header = false`.
//! - Blank or missing header cells become `column_<n>` (1-based).
//! - Quoted fields follow RFC 4180 quoting; quotes are stripped.
//! - Without a mapping, the first ten rows feed mapping auto-detection.
//! - Files without an id column get synthesized `row-<n>` ids.

use async_trait::async_trait;
use catalog_harness_core::mapping::{auto_detect_mapping, map_product, SchemaMapping};
use catalog_harness_core::models::Product;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::FlatFileConfig;
use crate::error::AdapterError;
use crate::http;
use crate::traits::{has_more, CatalogAdapter, ConnectionTest, FetchResult, PageRequest};

/// Rows sampled for mapping auto-detection.
pub const DETECTION_SAMPLE: usize = 10;

pub struct FlatFileAdapter {
    name: String,
    config: FlatFileConfig,
}

impl FlatFileAdapter {
    pub fn new(name: String, config: FlatFileConfig) -> Self {
        Self { name, config }
    }

    async fn load_text(&self) -> Result<String, AdapterError> {
        let label = self.source_label();
        if let Some(content) = self.config.content.as_deref().filter(|c| !c.is_empty()) {
            return Ok(content.to_string());
        }
        if let Some(path) = &self.config.path {
            return tokio::fs::read_to_string(path).await.map_err(|e| {
                AdapterError::connection(&label, format!("{}: {}", path.display(), e))
            });
        }
        let url = self
            .config
            .url
            .as_deref()
            .ok_or_else(|| AdapterError::config(&label, "no content, path, or url"))?;
        let client = http::client(&label, self.config.timeout_secs)?;
        let resp = client
            .get(url)
            .send()
            .await
            .map_err(|e| AdapterError::from_reqwest(&label, e))?;
        let resp = http::check_status(&label, resp).await?;
        resp.text()
            .await
            .map_err(|e| AdapterError::from_reqwest(&label, e))
    }

    async fn load_rows(&self) -> Result<Vec<Value>, AdapterError> {
        let text = self.load_text().await?;
        let delimiter = delimiter_byte(&self.config.delimiter)
            .ok_or_else(|| AdapterError::config(&self.source_label(), "invalid delimiter"))?;
        parse_delimited(&text, delimiter, self.config.has_header)
            .map_err(|e| AdapterError::parse(&self.source_label(), e))
    }

    fn to_products(&self, rows: &[Value], mapping: Option<&SchemaMapping>) -> Vec<Product> {
        let detected;
        let mapping = match mapping {
            Some(m) => m,
            None => {
                let sample = &rows[..rows.len().min(DETECTION_SAMPLE)];
                detected = auto_detect_mapping(sample);
                &detected
            }
        };

        let mut products = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let mapped = map_product(row, mapping).or_else(|_| {
                let mut with_id = row.clone();
                if let Value::Object(map) = &mut with_id {
                    map.insert("id".into(), Value::String(format!("row-{}", index + 1)));
                }
                map_product(&with_id, mapping)
            });
            match mapped {
                Ok(product) => products.push(product),
                Err(e) => warn!(source = %self.source_label(), row = index + 1, error = %e, "skipping row"),
            }
        }
        products
    }
}

/// The delimiter as a byte, if it is a single ASCII character.
pub fn delimiter_byte(delimiter: &str) -> Option<u8> {
    match delimiter.as_bytes() {
        [b] if b.is_ascii() => Some(*b),
        _ => None,
    }
}

/// Parse delimited text into one JSON object per data row, with string
/// values keyed by header name.
pub fn parse_delimited(text: &str, delimiter: u8, has_header: bool) -> Result<Vec<Value>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let mut headers: Vec<String> = Vec::new();
    if has_header {
        if let Some(first) = records.next() {
            headers = first?
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    if h.is_empty() {
                        format!("column_{}", i + 1)
                    } else {
                        h.to_string()
                    }
                })
                .collect();
        }
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let mut row = Map::new();
        for (i, field) in record.iter().enumerate() {
            let key = headers
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("column_{}", i + 1));
            row.insert(key, Value::String(field.to_string()));
        }
        rows.push(Value::Object(row));
    }
    Ok(rows)
}

#[async_trait]
impl CatalogAdapter for FlatFileAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Products from a delimited text file (inline, local, or by URL)"
    }

    fn adapter_type(&self) -> &str {
        "flat_file"
    }

    async fn fetch_products(
        &self,
        mapping: Option<&SchemaMapping>,
        page: &PageRequest,
    ) -> Result<FetchResult, AdapterError> {
        let rows = self.load_rows().await?;
        let all = self.to_products(&rows, mapping);
        let total = all.len() as u64;

        let products: Vec<Product> = all.into_iter().skip(page.offset).take(page.limit).collect();
        debug!(
            source = %self.source_label(),
            total,
            returned = products.len(),
            "paged flat file"
        );

        Ok(FetchResult {
            has_more: has_more(page, products.len(), Some(total)),
            products,
            total: Some(total),
            next_cursor: None,
        })
    }

    async fn test_connection(&self) -> ConnectionTest {
        self.load_rows().await.map(|_| ()).into()
    }

    async fn get_product_count(&self) -> Option<u64> {
        match self.load_rows().await {
            Ok(rows) => Some(self.to_products(&rows, None).len() as u64),
            Err(e) => {
                warn!(error = %e, "product count unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_with_header_and_quotes() {
        let rows = parse_delimited(
            "id,title,price\n1,\"Wool Coat, Grey\",120.00\n2,Scarf,15\n",
            b',',
            true,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["title"], json!("Wool Coat, Grey"));
        assert_eq!(rows[1]["price"], json!("15"));
    }

    #[test]
    fn test_missing_headers_are_synthesized() {
        let rows = parse_delimited("sku\tname\t\nA1\tHat\tred\textra\n", b'\t', true).unwrap();
        assert_eq!(rows[0]["sku"], json!("A1"));
        assert_eq!(rows[0]["column_3"], json!("red"));
        assert_eq!(rows[0]["column_4"], json!("extra"));

        let rows = parse_delimited("A1;Hat\n", b';', false).unwrap();
        assert_eq!(rows[0]["column_1"], json!("A1"));
        assert_eq!(rows[0]["column_2"], json!("Hat"));
    }

    #[test]
    fn test_delimiter_byte() {
        assert_eq!(delimiter_byte(","), Some(b','));
        assert_eq!(delimiter_byte("\t"), Some(b'\t'));
        assert_eq!(delimiter_byte("::"), None);
        assert_eq!(delimiter_byte("é"), None);
    }

    #[test]
    fn test_synthesized_row_ids() {
        let adapter = FlatFileAdapter::new("feed".into(), FlatFileConfig::default());
        let rows = parse_delimited("name,price\nHat,10\nCap,12\n", b',', true).unwrap();
        let products = adapter.to_products(&rows, None);
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["row-1", "row-2"]);
        assert_eq!(products[0].title, "Hat");
        assert_eq!(products[1].price, 1200);
    }
}
