//! Search orchestration: strict filtering with graceful fallback.
//!
//! [`semantic_product_search`] always returns a bounded result set and never
//! an empty one for a non-empty catalog (unless `max_results == 0`):
//!
//! ```text
//! catalog ≤ threshold ──────────────────────────► score all
//! strict filter ─┬─ > max_results ──────────────► score, truncate
//!                ├─ 1..=max_results ────────────► score
//!                └─ empty ─┬─ keyword hits ─────► score, truncate
//!                          └─ none ─────────────► score all, truncate
//! ```
//!
//! Query text only yields keywords when it carries no structured signal, and
//! such a query passes the strict filter unchanged. The keyword branch is
//! therefore reached when classifier filters from an earlier turn (passed as
//! `intent`) exclude everything while the current message is free text.
//!
//! Scores are sorted descending with a stable sort, so ties keep catalog
//! order.

use tracing::debug;

use crate::models::{Intent, Product, QueryIntent, ScoredProduct};
use crate::query::{extract_query_intent, filter_products, keyword_matches};
use crate::scoring::score_product;

/// Tunables for [`semantic_product_search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Catalogs at or below this size skip strict filtering.
    pub small_catalog_threshold: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            small_catalog_threshold: 50,
        }
    }
}

/// Rank `products` for `query` with the default [`SearchParams`].
pub fn semantic_product_search(
    products: &[Product],
    query: &str,
    intent: Option<&Intent>,
    max_results: usize,
) -> Vec<ScoredProduct> {
    search_with_params(products, query, intent, max_results, &SearchParams::default())
}

/// Rank `products` for `query`.
///
/// Classifier filters in `intent` only fill fields the query text left
/// unset.
pub fn search_with_params(
    products: &[Product],
    query: &str,
    intent: Option<&Intent>,
    max_results: usize,
    params: &SearchParams,
) -> Vec<ScoredProduct> {
    if max_results == 0 || products.is_empty() {
        return Vec::new();
    }

    let mut query_intent = extract_query_intent(query);
    if let Some(intent) = intent {
        merge_filters(&mut query_intent, intent);
    }

    if products.len() <= params.small_catalog_threshold {
        debug!(count = products.len(), "small catalog, scoring everything");
        return rank(products, &query_intent, query, max_results);
    }

    let narrowed = filter_products(products, &query_intent.to_criteria());
    if !narrowed.is_empty() {
        debug!(
            catalog = products.len(),
            narrowed = narrowed.len(),
            "strict filter matched"
        );
        return rank(&narrowed, &query_intent, query, max_results);
    }

    if !query_intent.keywords.is_empty() {
        let hits = keyword_matches(products, &query_intent.keywords);
        if !hits.is_empty() {
            debug!(hits = hits.len(), "strict filter empty, using keyword matches");
            return rank(&hits, &query_intent, query, max_results);
        }
    }

    debug!(
        catalog = products.len(),
        "no filter or keyword matches, scoring entire catalog"
    );
    rank(products, &query_intent, query, max_results)
}

fn merge_filters(query_intent: &mut QueryIntent, intent: &Intent) {
    let filters = &intent.filters;
    if query_intent.category.is_none() {
        query_intent.category = filters.category.clone();
        query_intent.is_category_query |= query_intent.category.is_some();
    }
    if query_intent.product_type.is_none() {
        query_intent.product_type = filters.product_type.clone();
    }
    if query_intent.price_range.min.is_none() {
        query_intent.price_range.min = filters.min_price;
    }
    if query_intent.price_range.max.is_none() {
        query_intent.price_range.max = filters.max_price;
    }
    query_intent.is_price_query = !query_intent.price_range.is_empty();
    if query_intent.colors.is_empty() {
        if let Some(color) = &filters.color {
            query_intent.colors.push(color.clone());
        }
    }
    if query_intent.sizes.is_empty() {
        query_intent.sizes = filters.sizes.clone();
        if query_intent.sizes.is_empty() {
            query_intent.sizes.extend(filters.size.iter().cloned());
        }
        query_intent.size = query_intent.sizes.first().cloned();
        query_intent.is_size_query = !query_intent.sizes.is_empty();
    }
}

fn rank(
    products: &[Product],
    intent: &QueryIntent,
    query: &str,
    max_results: usize,
) -> Vec<ScoredProduct> {
    let mut scored: Vec<ScoredProduct> = products
        .iter()
        .map(|product| {
            let result = score_product(product, intent, query);
            ScoredProduct {
                product: product.clone(),
                score: result.score,
                match_reasons: result.reasons,
            }
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(max_results);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::classify_intent;

    fn catalog(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| {
                let (title, category) = match i % 3 {
                    0 => (format!("Denim Jacket {}", i), "Jackets"),
                    1 => (format!("Linen Shirt {}", i), "Shirts"),
                    _ => (format!("Leather Boot {}", i), "Footwear"),
                };
                let mut p = Product::new(format!("p{}", i), title);
                p.category = category.to_string();
                p.price = 1000 * (i as u64 + 1);
                p
            })
            .collect()
    }

    #[test]
    fn test_never_empty_for_nonempty_catalog() {
        for size in [1, 10, 50, 51, 200] {
            let products = catalog(size);
            for query in ["", "xyzzy frobnicate", "purple gowns under $1", "jackets"] {
                let results = semantic_product_search(&products, query, None, 5);
                assert!(!results.is_empty(), "empty for {} items, {:?}", size, query);
                assert!(results.len() <= 5);
            }
        }
    }

    #[test]
    fn test_zero_max_results_is_empty() {
        assert!(semantic_product_search(&catalog(10), "jacket", None, 0).is_empty());
    }

    #[test]
    fn test_large_catalog_strict_filter() {
        let products = catalog(120);
        let results = semantic_product_search(&products, "jackets under $10", None, 10);
        assert!(!results.is_empty());
        for r in &results {
            assert!(r.product.title.starts_with("Denim Jacket"));
            assert!(r.product.price <= 1000);
        }
    }

    #[test]
    fn test_large_catalog_style_ranking() {
        let products = catalog(120);
        let results = semantic_product_search(&products, "leather", None, 3);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.product.title.contains("Leather")));
    }

    #[test]
    fn test_keyword_fallback_when_carried_filters_exclude_everything() {
        let mut products = catalog(120);
        let mut lamp = Product::new("lamp", "Aurora Lamp");
        lamp.category = "Lighting".into();
        products.push(lamp);

        let intent = classify_intent("any dresses?", None, &[]);
        let results = semantic_product_search(&products, "aurora", Some(&intent), 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product.id, "lamp");
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let products = catalog(6);
        let results = semantic_product_search(&products, "", None, 6);
        let ids: Vec<_> = results.iter().map(|r| r.product.id.as_str()).collect();
        assert_eq!(ids, vec!["p0", "p1", "p2", "p3", "p4", "p5"]);
    }

    #[test]
    fn test_intent_filters_fill_gaps() {
        let products = catalog(120);
        let intent = classify_intent("show me boots", None, &[]);
        let results = semantic_product_search(&products, "something nice", Some(&intent), 5);
        assert!(results
            .iter()
            .all(|r| r.product.category == "Footwear"));
    }

    #[test]
    fn test_custom_threshold() {
        let products = catalog(20);
        let params = SearchParams {
            small_catalog_threshold: 5,
        };
        let results = search_with_params(&products, "linen shirts", None, 50, &params);
        assert!(results.iter().all(|r| r.product.category == "Shirts"));
        assert_eq!(results.len(), 7);
    }
}
