//! Offline commands: `catalog classify` and `catalog detect-mapping`.
//!
//! Neither needs a config file; both print JSON to stdout.

use anyhow::{bail, Context, Result};
use catalog_harness_core::intent::classify_intent;
use catalog_harness_core::mapping::{auto_detect_mapping, SchemaMapping};
use catalog_harness_core::models::Intent;
use serde_json::Value;
use std::path::Path;

use crate::adapter_flatfile::{delimiter_byte, parse_delimited, DETECTION_SAMPLE};
use crate::adapter_rest::extract_products;

/// Classify a single message with no product context or history.
pub fn classify(message: &str) -> Intent {
    classify_intent(message, None, &[])
}

pub fn run_classify(message: &str) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&classify(message))?);
    Ok(())
}

/// Detect a mapping from the leading rows of a delimited or JSON file.
///
/// `.json` files are read as a product array, or an object holding one
/// under `products` or `data`. Anything else is parsed as delimited text.
pub fn detect_mapping(path: &Path, delimiter: &str, has_header: bool) -> Result<SchemaMapping> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rows = if is_json {
        let body: Value = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?;
        match extract_products(&body, None) {
            Some(rows) => rows.clone(),
            None => bail!("{}: no product array found", path.display()),
        }
    } else {
        let Some(byte) = delimiter_byte(delimiter) else {
            bail!("delimiter must be a single ASCII character, got {:?}", delimiter);
        };
        parse_delimited(&text, byte, has_header)
            .with_context(|| format!("failed to parse {}", path.display()))?
    };

    if rows.is_empty() {
        bail!("{}: no rows to sample", path.display());
    }
    Ok(auto_detect_mapping(&rows[..rows.len().min(DETECTION_SAMPLE)]))
}

pub fn run_detect_mapping(path: &Path, delimiter: &str, has_header: bool) -> Result<()> {
    let mapping = detect_mapping(path, delimiter, has_header)?;
    println!("{}", serde_json::to_string_pretty(&mapping)?);
    Ok(())
}
