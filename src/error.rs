//! Adapter error taxonomy.
//!
//! Every adapter failure is reported as one [`AdapterError`] carrying the
//! adapter name, so callers can log it and move on to a fallback source.
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | `Connection` | Transport failure, timeout, non-auth HTTP error, database unreachable |
//! | `Authentication` | HTTP 401/403, rejected database credentials |
//! | `Parse` | Undecodable body, missing product array, malformed delimited text |
//! | `Mapping` | A row cannot be mapped to a product |
//! | `PartialCount` | Best-effort count query failed (logged, never returned to callers) |
//! | `Config` | Source configuration rejected at the boundary |

use catalog_harness_core::mapping::MappingError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{adapter}: connection failed: {message}")]
    Connection { adapter: String, message: String },

    #[error("{adapter}: authentication failed: {message}")]
    Authentication { adapter: String, message: String },

    #[error("{adapter}: could not parse source data: {message}")]
    Parse { adapter: String, message: String },

    #[error("{adapter}: {source}")]
    Mapping {
        adapter: String,
        #[source]
        source: MappingError,
    },

    #[error("{adapter}: count query failed: {message}")]
    PartialCount { adapter: String, message: String },

    #[error("{adapter}: invalid configuration: {message}")]
    Config { adapter: String, message: String },
}

impl AdapterError {
    pub fn connection(adapter: &str, message: impl ToString) -> Self {
        Self::Connection {
            adapter: adapter.to_string(),
            message: message.to_string(),
        }
    }

    pub fn authentication(adapter: &str, message: impl ToString) -> Self {
        Self::Authentication {
            adapter: adapter.to_string(),
            message: message.to_string(),
        }
    }

    pub fn parse(adapter: &str, message: impl ToString) -> Self {
        Self::Parse {
            adapter: adapter.to_string(),
            message: message.to_string(),
        }
    }

    pub fn partial_count(adapter: &str, message: impl ToString) -> Self {
        Self::PartialCount {
            adapter: adapter.to_string(),
            message: message.to_string(),
        }
    }

    pub fn config(adapter: &str, message: impl ToString) -> Self {
        Self::Config {
            adapter: adapter.to_string(),
            message: message.to_string(),
        }
    }

    /// Name of the adapter that raised the error.
    pub fn adapter(&self) -> &str {
        match self {
            Self::Connection { adapter, .. }
            | Self::Authentication { adapter, .. }
            | Self::Parse { adapter, .. }
            | Self::Mapping { adapter, .. }
            | Self::PartialCount { adapter, .. }
            | Self::Config { adapter, .. } => adapter,
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(adapter: &str, status: StatusCode, body: &str) -> Self {
        let snippet: String = body.chars().take(200).collect();
        let message = if snippet.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, snippet)
        };
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Self::authentication(adapter, message)
            }
            _ => Self::connection(adapter, message),
        }
    }

    /// Classify a transport-level `reqwest` failure.
    pub fn from_reqwest(adapter: &str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::parse(adapter, err)
        } else {
            Self::connection(adapter, err)
        }
    }

    /// Classify a database driver failure. Rejected credentials map to
    /// `Authentication`.
    pub fn from_sqlx(adapter: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if matches!(db.code().as_deref(), Some("28P01") | Some("28000")) {
                return Self::authentication(adapter, db.message());
            }
        }
        Self::connection(adapter, err)
    }
}
