//! `catalog fetch` and `catalog count`.

use anyhow::{anyhow, Context, Result};

use crate::config::Config;
use crate::traits::{AdapterRegistry, PageRequest, RegisteredSource};

/// Look up `name` among the configured sources.
pub fn find_source<'a>(registry: &'a AdapterRegistry, name: &str) -> Result<&'a RegisteredSource> {
    registry.find(name).ok_or_else(|| {
        let known: Vec<&str> = registry.sources().iter().map(|s| s.adapter.name()).collect();
        anyhow!(
            "unknown source '{}'. Configured sources: {}",
            name,
            if known.is_empty() {
                "(none)".to_string()
            } else {
                known.join(", ")
            }
        )
    })
}

/// Fetch one page from `source` and print it as JSON.
pub async fn run_fetch(
    config: &Config,
    source: &str,
    limit: Option<usize>,
    offset: usize,
    cursor: Option<String>,
) -> Result<()> {
    let registry = AdapterRegistry::from_config(config)?;
    let entry = find_source(&registry, source)?;
    let page = PageRequest::new(limit.unwrap_or(config.search.fetch_limit), offset)
        .with_cursor(cursor);

    let result = entry
        .adapter
        .fetch_products(entry.mapping.as_ref(), &page)
        .await
        .with_context(|| format!("fetch from '{}' failed", source))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub async fn run_count(config: &Config, source: &str) -> Result<()> {
    let registry = AdapterRegistry::from_config(config)?;
    let entry = find_source(&registry, source)?;
    match entry.adapter.get_product_count().await {
        Some(count) => println!("{}", count),
        None => println!("unknown"),
    }
    Ok(())
}
