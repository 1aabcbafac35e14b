use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn catalog_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("catalog");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("feed.tsv"),
        "id\ttitle\tprice\tcategory\n\
         c1\tNavy Wool Coat\t189.00\tCoats\n\
         c2\tGrey Parka\t240.00\tCoats\n\
         s1\tBlue Oxford Shirt\t49.99\tShirts\n",
    )
    .unwrap();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_content = format!(
        r#"[cache]
catalog_ttl_secs = 60

[search]
fetch_limit = 100

[logging]
level = "warn"

[sources.feed]
type = "flat_file"
path = "{}/data/feed.tsv"
delimiter = "\t"

[sources.broken]
type = "flat_file"
path = "{}/data/missing.csv"
priority = 5
"#,
        root.display(),
        root.display()
    );
    let config_path = config_dir.join("catalog.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_catalog(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = catalog_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run catalog binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_classify_needs_no_config() {
    let missing = PathBuf::from("/nonexistent/catalog.toml");
    let (stdout, stderr, success) = run_catalog(&missing, &["classify", "I want to create a ticket"]);
    assert!(success, "classify failed: stderr={}", stderr);

    let intent: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(intent["type"], "ticket_creation");
    assert_eq!(intent["wantsTicket"], true);
    assert_eq!(intent["ticketStage"], "offer");
}

#[test]
fn test_detect_mapping_needs_no_config() {
    let (tmp, _) = setup_test_env();
    let missing = PathBuf::from("/nonexistent/catalog.toml");
    let file = tmp.path().join("data/feed.tsv");
    let (stdout, stderr, success) = run_catalog(
        &missing,
        &["detect-mapping", file.to_str().unwrap(), "--delimiter", "\t"],
    );
    assert!(success, "detect-mapping failed: stderr={}", stderr);

    let mapping: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(mapping["id"], "id");
    assert_eq!(mapping["title"], "title");
    assert_eq!(mapping["price"], "price");
}

#[test]
fn test_missing_config_is_an_error() {
    let missing = PathBuf::from("/nonexistent/catalog.toml");
    let (_, stderr, success) = run_catalog(&missing, &["sources"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_sources_lists_health() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) = run_catalog(&config_path, &["sources"]);
    assert!(success, "sources failed: stderr={}", stderr);

    let feed = stdout.lines().find(|l| l.starts_with("feed")).unwrap();
    assert!(feed.contains("flat_file"));
    assert!(feed.contains("true"));
    let broken = stdout.lines().find(|l| l.starts_with("broken")).unwrap();
    assert!(broken.contains("false"));
}

#[test]
fn test_fetch_prints_page_json() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) =
        run_catalog(&config_path, &["fetch", "feed", "--limit", "2"]);
    assert!(success, "fetch failed: stderr={}", stderr);

    let page: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(page["products"].as_array().unwrap().len(), 2);
    assert_eq!(page["products"][0]["id"], "c1");
    assert_eq!(page["products"][0]["price"], 18900);
    assert_eq!(page["total"], 3);
    assert_eq!(page["hasMore"], true);
}

#[test]
fn test_fetch_unknown_source_fails() {
    let (_tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_catalog(&config_path, &["fetch", "nope"]);
    assert!(!success);
    assert!(stderr.contains("unknown source 'nope'"));
}

#[test]
fn test_count() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_catalog(&config_path, &["count", "feed"]);
    assert!(success);
    assert_eq!(stdout.trim(), "3");

    let (stdout, _, success) = run_catalog(&config_path, &["count", "broken"]);
    assert!(success);
    assert_eq!(stdout.trim(), "unknown");
}

#[test]
fn test_search_ranks_matching_product_first() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) =
        run_catalog(&config_path, &["search", "feed", "navy coat", "--json"]);
    assert!(success, "search failed: stderr={}", stderr);

    let outcome: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["results"][0]["product"]["id"], "c1");
    assert!(outcome["limit"].as_u64().unwrap() <= 3);
}
