//! # Catalog Harness
//!
//! Catalog ingestion and rule-based product matching for conversational
//! shopping assistants.
//!
//! Products are pulled from heterogeneous sources through one adapter
//! contract, normalized into the canonical
//! [`Product`](catalog_harness_core::models::Product), cached with a TTL, and
//! ranked against shopper messages by the pure pipeline in
//! `catalog-harness-core`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ Adapters         │──▶│ CatalogCache │──▶│ CatalogService   │
//! │ Shopify/REST/CSV │   │ TTL + sweep  │   │ classify → rank  │
//! │ SQL/MongoDB      │   └──────────────┘   └────────┬─────────┘
//! └──────────────────┘                               │
//!                                                    ▼
//!                                           ┌──────────────────┐
//!                                           │ CLI (`catalog`)  │
//!                                           └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`error`] | Adapter error taxonomy |
//! | [`traits`] | Adapter contract, factory, and registry |
//! | [`adapter_shopify`] | Shopify Admin REST adapter |
//! | [`adapter_rest`] | Generic JSON REST adapter |
//! | [`adapter_flatfile`] | CSV / TSV adapter |
//! | [`adapter_sql`] | PostgreSQL and MySQL adapter |
//! | [`adapter_mongo`] | MongoDB adapter |
//! | [`cache`] | TTL cache with background sweeper |
//! | [`catalog`] | Cached loading, source fallback, and search |
//! | [`sources`] | Source health listing |
//! | [`http`] | Shared HTTP client and status handling |
//! | [`fetch`], [`search`], [`inspect`] | CLI command bodies |

pub mod adapter_flatfile;
pub mod adapter_mongo;
pub mod adapter_rest;
pub mod adapter_shopify;
pub mod adapter_sql;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod inspect;
pub mod search;
pub mod sources;
pub mod traits;
