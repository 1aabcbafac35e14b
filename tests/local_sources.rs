//! Flat-file and relational adapters against on-disk fixtures, plus the
//! catalog service on top of them.

use catalog_harness::adapter_flatfile::FlatFileAdapter;
use catalog_harness::adapter_sql::{Dialect, SqlAdapter};
use catalog_harness::catalog::CatalogService;
use catalog_harness::config::{Config, FlatFileConfig, SourceConfig, SourceEntry, SqlConfig};
use catalog_harness::traits::{AdapterRegistry, CatalogAdapter, PageRequest};
use catalog_harness_core::mapping::SchemaMapping;
use catalog_harness_core::models::IntentType;
use sqlx::sqlite::SqlitePoolOptions;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CATALOG_CSV: &str = "\
sku,name,price,category,colour,in_stock
JK-1,Navy Wool Coat,189.00,Jackets,navy,yes
JK-2,Yellow Rain Jacket,79.50,Jackets,yellow,yes
SH-1,White Oxford Shirt,45,Shirts,white,no
SH-2,\"Linen Shirt, Blue\",55.00,Shirts,blue,yes
BT-1,Leather Chelsea Boot,140,Shoes,brown,yes
";

fn write_csv(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("catalog.csv");
    fs::write(&path, CATALOG_CSV).unwrap();
    path
}

fn flat_file(path: &Path) -> FlatFileConfig {
    FlatFileConfig {
        path: Some(path.to_path_buf()),
        ..FlatFileConfig::default()
    }
}

// ─── Flat file ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_flat_file_rows_become_products() {
    let tmp = TempDir::new().unwrap();
    let adapter = FlatFileAdapter::new("feed".into(), flat_file(&write_csv(&tmp)));

    let result = adapter
        .fetch_products(None, &PageRequest::new(50, 0))
        .await
        .unwrap();
    assert_eq!(result.products.len(), 5);
    assert_eq!(result.total, Some(5));
    assert!(!result.has_more);

    for product in &result.products {
        assert!(!product.id.is_empty());
        assert!(!product.title.is_empty());
    }
    let linen = &result.products[3];
    assert_eq!(linen.id, "SH-2");
    assert_eq!(linen.title, "Linen Shirt, Blue");
    assert_eq!(linen.price, 5500);
    assert!(!result.products[2].in_stock);
}

#[tokio::test]
async fn test_flat_file_pages_in_memory() {
    let tmp = TempDir::new().unwrap();
    let adapter = FlatFileAdapter::new("feed".into(), flat_file(&write_csv(&tmp)));

    let first = adapter
        .fetch_products(None, &PageRequest::new(2, 0))
        .await
        .unwrap();
    let last = adapter
        .fetch_products(None, &PageRequest::new(2, 4))
        .await
        .unwrap();

    assert_eq!(first.products.len(), 2);
    assert!(first.has_more);
    assert_eq!(last.products.len(), 1);
    assert_eq!(last.products[0].id, "BT-1");
    assert!(!last.has_more);
    assert_eq!(adapter.get_product_count().await, Some(5));
}

#[tokio::test]
async fn test_flat_file_missing_path_fails_connection_test() {
    let tmp = TempDir::new().unwrap();
    let adapter = FlatFileAdapter::new("feed".into(), flat_file(&tmp.path().join("nope.csv")));
    let test = adapter.test_connection().await;
    assert!(!test.success);
    assert!(test.error.unwrap().contains("nope.csv"));
}

// ─── SQL (local SQLite file) ────────────────────────────────────────

async fn seed_sqlite(dir: &TempDir) -> String {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("catalog.db").display());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE products (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            price REAL,
            category TEXT,
            in_stock INTEGER
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    for i in 1..=7 {
        sqlx::query(&format!(
            "INSERT INTO products (id, title, price, category, in_stock) \
             VALUES ('p{i}', 'Product {i}', {i}9.99, 'Hats', {stock})",
            stock = i % 2
        ))
        .execute(&pool)
        .await
        .unwrap();
    }
    pool.close().await;
    url
}

fn sql_adapter(url: &str, table: Option<&str>, query: Option<&str>) -> SqlAdapter {
    SqlAdapter::new(
        "warehouse".into(),
        SqlConfig {
            url: url.to_string(),
            table: table.map(str::to_string),
            query: query.map(str::to_string),
            timeout_secs: 5,
        },
        Dialect::Postgres,
    )
}

#[tokio::test]
async fn test_sql_table_pages_with_total() {
    let tmp = TempDir::new().unwrap();
    let url = seed_sqlite(&tmp).await;
    let adapter = sql_adapter(&url, Some("products"), None);

    let page = adapter
        .fetch_products(None, &PageRequest::new(3, 0))
        .await
        .unwrap();
    assert_eq!(page.products.len(), 3);
    assert_eq!(page.total, Some(7));
    assert!(page.has_more);
    assert_eq!(page.products[0].id, "p1");
    assert_eq!(page.products[0].price, 1999);
    assert!(page.products[0].in_stock);
    assert!(!page.products[1].in_stock);

    let last = adapter
        .fetch_products(None, &PageRequest::new(3, 6))
        .await
        .unwrap();
    assert_eq!(last.products.len(), 1);
    assert!(!last.has_more);

    assert_eq!(adapter.get_product_count().await, Some(7));
    assert!(adapter.test_connection().await.success);
}

#[tokio::test]
async fn test_sql_raw_query_with_mapping() {
    let tmp = TempDir::new().unwrap();
    let url = seed_sqlite(&tmp).await;
    let adapter = sql_adapter(
        &url,
        None,
        Some("SELECT id AS code, title AS label, price FROM products WHERE in_stock = 1;"),
    );
    let mapping = SchemaMapping {
        id: Some("code".into()),
        title: Some("label".into()),
        price: Some("price".into()),
        ..Default::default()
    };

    let page = adapter
        .fetch_products(Some(&mapping), &PageRequest::new(10, 0))
        .await
        .unwrap();
    assert_eq!(page.total, Some(4));
    let ids: Vec<_> = page.products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p3", "p5", "p7"]);
    assert_eq!(page.products[1].title, "Product 3");
}

#[tokio::test]
async fn test_sql_bad_table_is_error_not_panic() {
    let tmp = TempDir::new().unwrap();
    let url = seed_sqlite(&tmp).await;
    let adapter = sql_adapter(&url, Some("missing_table"), None);
    assert!(adapter
        .fetch_products(None, &PageRequest::new(10, 0))
        .await
        .is_err());
    assert_eq!(adapter.get_product_count().await, None);
}

#[tokio::test]
async fn test_sql_table_with_mixed_column_types() {
    let tmp = TempDir::new().unwrap();
    let url = format!("sqlite://{}?mode=rwc", tmp.path().join("typed.db").display());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE items (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            price DECIMAL(10,2),
            created_at DATETIME,
            in_stock BOOLEAN,
            image BLOB,
            tags TEXT
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO items VALUES
            ('a1', 'Canvas Tote', 24.5, '2024-03-01 10:00:00', 1, x'00ff', 'bags,canvas'),
            ('a2', 'Silk Scarf', NULL, NULL, 0, NULL, NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;

    let adapter = sql_adapter(&url, Some("items"), None);
    let page = adapter
        .fetch_products(None, &PageRequest::new(10, 0))
        .await
        .unwrap();
    assert_eq!(page.total, Some(2));
    assert_eq!(page.products.len(), 2);

    let tote = &page.products[0];
    assert_eq!(tote.id, "a1");
    assert_eq!(tote.price, 2450);
    assert!(tote.in_stock);
    assert_eq!(tote.tags, vec!["bags", "canvas"]);

    let scarf = &page.products[1];
    assert_eq!(scarf.title, "Silk Scarf");
    assert_eq!(scarf.price, 0);
    assert!(!scarf.in_stock);
}

#[tokio::test]
async fn test_sql_unsupported_url_scheme() {
    let adapter = sql_adapter("oracle://reader@db/catalog", Some("items"), None);
    let test = adapter.test_connection().await;
    assert!(!test.success);
    assert!(test.error.unwrap().contains("oracle"));
}

// ─── Catalog service end to end ─────────────────────────────────────

#[tokio::test]
async fn test_service_falls_back_and_searches() {
    let tmp = TempDir::new().unwrap();
    let csv = write_csv(&tmp);

    let mut config = Config::default();
    config.sources.insert(
        "primary".into(),
        SourceEntry {
            config: SourceConfig::FlatFile(flat_file(&tmp.path().join("gone.csv"))),
            mapping: None,
            priority: 0,
        },
    );
    config.sources.insert(
        "backup".into(),
        SourceEntry {
            config: SourceConfig::FlatFile(flat_file(&csv)),
            mapping: None,
            priority: 10,
        },
    );

    let registry = AdapterRegistry::from_config(&config).unwrap();
    let service = CatalogService::from_config(&config);

    let loaded = service.load_with_fallback(&registry).await.unwrap();
    assert_eq!(loaded.source, "flat_file:backup");
    assert_eq!(loaded.products.len(), 5);
    assert!(service.cache().get("catalog:flat_file:backup").is_some());
    assert!(service.cache().get("catalog:flat_file:primary").is_none());

    // Served from cache once the file is gone.
    fs::remove_file(&csv).unwrap();
    let cached = service
        .load_products(registry.find("backup").unwrap().adapter.as_ref(), None)
        .await;
    assert_eq!(cached.len(), 5);

    let outcome = service.search(&cached, "show me jackets under $100", None, &[]);
    assert_eq!(outcome.intent.intent_type, IntentType::Search);
    assert_eq!(outcome.limit, 5);
    assert_eq!(outcome.results[0].product.id, "JK-2");
}
