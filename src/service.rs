//! Suggestion Service
//!
//! Composition root: owns the shared cache state, the search gateway and
//! the maintenance scheduler, and tears them down together.

use std::sync::Arc;

use tracing::info;

use crate::cache::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::gateway::SearchGateway;
use crate::metrics::MetricsSnapshot;
use crate::models::Address;
use crate::source::DataSource;
use crate::state::CacheState;
use crate::tasks::MaintenanceScheduler;

/// The search API consumed by the UI layer.
///
/// Create one per application session and hand out references; there is
/// no global instance.
pub struct SuggestService {
    config: Config,
    state: Arc<CacheState>,
    gateway: SearchGateway,
    scheduler: MaintenanceScheduler,
}

impl SuggestService {
    // == Start ==
    /// Validates `config`, builds the caches and starts maintenance.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: Config, source: Arc<dyn DataSource>) -> Result<Self> {
        Self::start_with_clock(config, source, Arc::new(SystemClock))
    }

    pub fn start_with_clock(
        config: Config,
        source: Arc<dyn DataSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let state = Arc::new(CacheState::with_clock(&config, clock));
        let gateway = SearchGateway::new(Arc::clone(&state), source, &config);
        let scheduler = MaintenanceScheduler::start(Arc::clone(&state), &config);

        info!(
            customer_capacity = config.max_entries_customer_cache,
            address_capacity = config.max_entries_address_cache,
            ttl_ms = config.ttl_millis,
            "Suggestion service started"
        );

        Ok(Self {
            config,
            state,
            gateway,
            scheduler,
        })
    }

    pub async fn search_customers(&self, query: &str, limit: usize) -> Vec<String> {
        self.gateway.search_customers(query, limit).await
    }

    pub async fn search_addresses(&self, query: &str, customer: &str, limit: usize) -> Vec<Address> {
        self.gateway.search_addresses(query, customer, limit).await
    }

    pub async fn record_customer_added(&self, name: &str) -> Result<()> {
        self.gateway.record_customer_added(name).await
    }

    pub async fn record_address_added(&self, customer: &str, address: Address) -> Result<i64> {
        self.gateway.record_address_added(customer, address).await
    }

    pub async fn record_address_updated(
        &self,
        customer: &str,
        id: i64,
        address: Address,
    ) -> Result<()> {
        self.gateway.record_address_updated(customer, id, address).await
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.state.snapshot()
    }

    // == Invalidate All ==
    /// Clears both caches immediately; returns the number of entries dropped.
    pub fn invalidate_all(&self) -> usize {
        let removed = self.state.clear();
        self.state.metrics.record_background_refresh();
        info!(removed, "All cached suggestions invalidated");
        removed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared state, for callers that drive maintenance passes themselves.
    pub fn state(&self) -> &Arc<CacheState> {
        &self.state
    }

    // == Shutdown ==
    /// Stops maintenance and search workers, each bounded by the configured
    /// grace period, then discards all cached entries.
    pub async fn shutdown(self) {
        let grace = self.config.shutdown_grace();

        let maintenance_drained = self.scheduler.shutdown(grace).await;
        let workers_drained = self.gateway.shutdown(grace).await;
        let discarded = self.state.clear();

        info!(
            maintenance_drained,
            workers_drained, discarded, "Suggestion service stopped"
        );
    }
}
