//! # Catalog Harness Core
//!
//! Pure matching logic for Catalog Harness: the canonical product model,
//! schema mapping, query understanding, intent classification, scoring,
//! and search orchestration.
//!
//! This crate performs no I/O. Adapters, caching, and configuration live in
//! the `catalog-harness` crate, which feeds products into the functions
//! exported here.
//!
//! ## Pipeline
//!
//! ```text
//! source rows ─► mapping::map_product ─► Product[]
//!                                           │
//! message ─► intent::classify_intent ─► Intent ─► limits::result_limit
//!                                           │
//!                       search::semantic_product_search ─► ScoredProduct[]
//! ```

pub mod intent;
pub mod limits;
pub mod mapping;
pub mod models;
pub mod query;
pub mod scoring;
pub mod search;
pub mod vocab;
