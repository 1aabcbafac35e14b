//! `catalog search`: load a source through the catalog service and rank it.

use anyhow::Result;

use crate::catalog::CatalogService;
use crate::config::Config;
use crate::fetch::find_source;
use crate::traits::AdapterRegistry;

pub async fn run_search(config: &Config, source: &str, query: &str, json: bool) -> Result<()> {
    let registry = AdapterRegistry::from_config(config)?;
    let entry = find_source(&registry, source)?;
    let service = CatalogService::from_config(config);

    let products = service
        .load_products(entry.adapter.as_ref(), entry.mapping.as_ref())
        .await;
    let outcome = service.search(&products, query, None, &[]);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!(
        "intent: {} (confidence {:.2}), catalog: {} products, limit: {}",
        outcome.intent.intent_type.as_str(),
        outcome.intent.confidence,
        products.len(),
        outcome.limit
    );
    if outcome.results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!();
    for (i, result) in outcome.results.iter().enumerate() {
        let product = &result.product;
        println!(
            "{}. [{}] {} ({}.{:02})",
            i + 1,
            result.score,
            product.title,
            product.price / 100,
            product.price % 100
        );
        if !product.category.is_empty() {
            println!("    category: {}", product.category);
        }
        if !result.match_reasons.is_empty() {
            println!("    reasons: {}", result.match_reasons.join(", "));
        }
        println!("    id: {}", product.id);
        println!();
    }
    Ok(())
}
