//! Schema mapping from source rows to canonical [`Product`]s.
//!
//! A [`SchemaMapping`] is a sparse, declarative translation: each canonical
//! field may name a dot-separated path into the source row. Fields without a
//! mapped path fall back to a short ordered list of common aliases before
//! taking their default.
//!
//! # Coercion Rules
//!
//! | Field | Rule |
//! |-------|------|
//! | `price` | numbers × 100, rounded; strings stripped to digits and `.` first; unresolved → 0 |
//! | `inStock` | bools pass through; `"true"`/`"yes"`/`"1"` → true; unresolved → true |
//! | `tags`, `images` | lists used as-is; strings split on `,` and trimmed |
//!
//! [`auto_detect_mapping`] builds a mapping from sample rows when a source
//! (typically a flat file) comes with unknown headers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::Product;

/// Declarative source → canonical field translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<String>,
    /// Output key → source path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl SchemaMapping {
    pub fn is_empty(&self) -> bool {
        *self == SchemaMapping::default()
    }
}

/// A required canonical field could not be resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot resolve required field '{field}' from mapping or aliases")]
pub struct MappingError {
    pub field: &'static str,
}

// Fallback aliases consulted, in order, when a field has no mapped path.
const ID_FALLBACK: &[&str] = &["id", "productId", "product_id", "sku", "_id"];
const TITLE_FALLBACK: &[&str] = &["title", "name", "productName", "product_name"];
const DESCRIPTION_FALLBACK: &[&str] = &["description", "body_html", "desc", "details"];
const PRICE_FALLBACK: &[&str] = &["price", "amount", "cost", "unit_price"];
const CATEGORY_FALLBACK: &[&str] = &["category", "product_type", "productType"];
const TYPE_FALLBACK: &[&str] = &["type", "product_type", "productType"];
const VENDOR_FALLBACK: &[&str] = &["vendor", "brand", "manufacturer"];
const TAGS_FALLBACK: &[&str] = &["tags", "keywords", "labels"];
const IMAGES_FALLBACK: &[&str] = &["images", "image", "imageUrl", "image_url"];
const VARIANTS_FALLBACK: &[&str] = &["variants", "options"];
const IN_STOCK_FALLBACK: &[&str] = &["inStock", "in_stock", "available", "availability"];

// Broader candidate header names for auto-detection, matched case-insensitively.
const DETECT_ID: &[&str] = &["id", "product_id", "productId", "sku", "item_id", "handle"];
const DETECT_TITLE: &[&str] = &["title", "name", "productName", "product_name"];
const DETECT_DESCRIPTION: &[&str] = &[
    "description",
    "desc",
    "body_html",
    "product_description",
    "details",
    "summary",
];
const DETECT_PRICE: &[&str] = &["price", "amount", "cost", "unit_price", "sale_price", "mrp"];
const DETECT_CATEGORY: &[&str] = &["category", "product_type", "productType", "category_name", "department"];
const DETECT_TYPE: &[&str] = &["type", "product_type", "productType", "subcategory", "kind"];
const DETECT_VENDOR: &[&str] = &["vendor", "brand", "manufacturer", "maker"];
const DETECT_TAGS: &[&str] = &["tags", "keywords", "labels"];
const DETECT_IMAGES: &[&str] = &["images", "image", "image_url", "imageUrl", "image_src", "photo", "thumbnail"];
const DETECT_IN_STOCK: &[&str] = &["inStock", "in_stock", "available", "availability", "stock_status"];

/// Resolve a dot-separated path (`"variants.0.price"`) inside `row`.
///
/// Numeric segments index into arrays. Any missing intermediate yields
/// `None`, as does an explicit JSON `null`.
pub fn resolve_path<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = row;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn resolve_field<'a>(row: &'a Value, mapped: Option<&str>, fallback: &[&str]) -> Option<&'a Value> {
    match mapped {
        Some(path) => resolve_path(row, path),
        None => fallback.iter().find_map(|alias| resolve_path(row, alias)),
    }
}

/// Map a source row into a canonical [`Product`].
///
/// # Errors
///
/// Returns [`MappingError`] when no id can be resolved; every other field
/// has a default.
pub fn map_product(row: &Value, mapping: &SchemaMapping) -> Result<Product, MappingError> {
    let id = resolve_field(row, mapping.id.as_deref(), ID_FALLBACK)
        .and_then(coerce_string)
        .filter(|s| !s.is_empty())
        .ok_or(MappingError { field: "id" })?;

    let text = |mapped: &Option<String>, fallback: &[&str]| {
        resolve_field(row, mapped.as_deref(), fallback)
            .and_then(coerce_string)
            .unwrap_or_default()
    };

    let mut metadata = Map::new();
    for (key, path) in &mapping.metadata {
        if let Some(value) = resolve_path(row, path) {
            metadata.insert(key.clone(), value.clone());
        }
    }

    Ok(Product {
        id,
        title: text(&mapping.title, TITLE_FALLBACK),
        description: text(&mapping.description, DESCRIPTION_FALLBACK),
        price: resolve_field(row, mapping.price.as_deref(), PRICE_FALLBACK)
            .map(coerce_price)
            .unwrap_or(0),
        category: text(&mapping.category, CATEGORY_FALLBACK),
        product_type: text(&mapping.product_type, TYPE_FALLBACK),
        vendor: text(&mapping.vendor, VENDOR_FALLBACK),
        tags: resolve_field(row, mapping.tags.as_deref(), TAGS_FALLBACK)
            .map(coerce_array)
            .unwrap_or_default(),
        images: resolve_field(row, mapping.images.as_deref(), IMAGES_FALLBACK)
            .map(coerce_array)
            .unwrap_or_default(),
        variants: resolve_field(row, mapping.variants.as_deref(), VARIANTS_FALLBACK)
            .cloned()
            .unwrap_or(Value::Null),
        in_stock: resolve_field(row, mapping.in_stock.as_deref(), IN_STOCK_FALLBACK)
            .map(coerce_bool)
            .unwrap_or(true),
        metadata,
    })
}

/// Render scalars as strings. Objects and arrays have no string form.
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalize a price to non-negative minor units.
pub fn coerce_price(value: &Value) -> u64 {
    let major = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    match major {
        Some(v) if v.is_finite() && v > 0.0 => (v * 100.0).round() as u64,
        _ => 0,
    }
}

/// Coerce a stock flag. Non-zero numbers count as true so integer columns
/// from SQL sources behave.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

/// Coerce a list-ish value into strings.
///
/// Object elements (image records) are reduced to their `src` or `url`.
pub fn coerce_array(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => obj
                    .get("src")
                    .or_else(|| obj.get("url"))
                    .and_then(coerce_string),
                other => coerce_string(other),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Object(obj) => obj
            .get("src")
            .or_else(|| obj.get("url"))
            .and_then(coerce_string)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// Guess a [`SchemaMapping`] from sample rows.
///
/// Looks at the keys of the first non-empty row and picks, per canonical
/// field, the first candidate alias present (case-insensitive). The returned
/// paths use the row's own spelling of the key.
pub fn auto_detect_mapping(sample_rows: &[Value]) -> SchemaMapping {
    let keys: Vec<&str> = sample_rows
        .iter()
        .filter_map(Value::as_object)
        .find(|obj| !obj.is_empty())
        .map(|obj| obj.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let detect = |candidates: &[&str]| -> Option<String> {
        candidates.iter().find_map(|candidate| {
            keys.iter()
                .find(|key| key.eq_ignore_ascii_case(candidate))
                .map(|key| key.to_string())
        })
    };

    SchemaMapping {
        id: detect(DETECT_ID),
        title: detect(DETECT_TITLE),
        description: detect(DETECT_DESCRIPTION),
        price: detect(DETECT_PRICE),
        category: detect(DETECT_CATEGORY),
        product_type: detect(DETECT_TYPE),
        vendor: detect(DETECT_VENDOR),
        tags: detect(DETECT_TAGS),
        images: detect(DETECT_IMAGES),
        variants: None,
        in_stock: detect(DETECT_IN_STOCK),
        metadata: BTreeMap::new(),
    }
}
