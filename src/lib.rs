//! Load Suggest - type-ahead suggestion cache
//!
//! Bounded, TTL-limited caches in front of a slow customer/address store,
//! with incremental invalidation on writes and background maintenance.

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod models;
pub mod service;
pub mod source;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, SuggestError};
pub use metrics::MetricsSnapshot;
pub use models::Address;
pub use service::SuggestService;
pub use source::{DataSource, InMemoryDataSource};
