//! Source health listing.
//!
//! Used by `catalog sources`. Every configured source is probed with
//! [`CatalogAdapter::test_connection`](crate::traits::CatalogAdapter::test_connection);
//! probes run concurrently and are reported in name order.

use anyhow::Result;
use futures_util::future::join_all;
use serde::Serialize;

use crate::config::Config;
use crate::traits::{create_adapter, AdapterRegistry};

/// Health of one configured source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub healthy: bool,
    pub notes: Option<String>,
}

/// Probe every source in `registry`.
pub async fn check_sources(registry: &AdapterRegistry) -> Vec<SourceStatus> {
    let probes = registry.sources().iter().map(|source| async move {
        let test = source.adapter.test_connection().await;
        SourceStatus {
            name: source.adapter.name().to_string(),
            source_type: source.adapter.adapter_type().to_string(),
            healthy: test.success,
            notes: test.error,
        }
    });
    let mut statuses = join_all(probes).await;
    statuses.sort_by(|a, b| a.name.cmp(&b.name));
    statuses
}

/// Status for every `[sources.<name>]` entry. A source whose config does not
/// validate is reported unhealthy with the validation message instead of
/// failing the whole listing.
pub async fn get_sources(config: &Config) -> Vec<SourceStatus> {
    let mut registry = AdapterRegistry::new();
    let mut invalid = Vec::new();
    for (name, entry) in &config.sources {
        match create_adapter(name, &entry.config) {
            Ok(adapter) => registry.register(adapter, entry.mapping.clone(), entry.priority),
            Err(e) => invalid.push(SourceStatus {
                name: name.clone(),
                source_type: entry.config.type_name().to_string(),
                healthy: false,
                notes: Some(e.to_string()),
            }),
        }
    }

    let mut statuses = check_sources(&registry).await;
    statuses.extend(invalid);
    statuses.sort_by(|a, b| a.name.cmp(&b.name));
    statuses
}

pub async fn list_sources(config: &Config) -> Result<()> {
    let statuses = get_sources(config).await;
    if statuses.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }

    println!("{:<16} {:<12} {:<8} NOTES", "SOURCE", "TYPE", "HEALTHY");
    for status in &statuses {
        println!(
            "{:<16} {:<12} {:<8} {}",
            status.name,
            status.source_type,
            status.healthy,
            status.notes.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
