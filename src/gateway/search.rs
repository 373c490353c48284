//! Search Gateway
//!
//! Public entry point for type-ahead searches: answers from cache when it
//! can, otherwise fetches from the data source on the worker group and
//! caches the result. Write-through helpers persist changes and mark the
//! customer dirty for the next incremental pass.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error};

use crate::cache::BoundedTtlCache;
use crate::config::Config;
use crate::error::{Result, SuggestError};
use crate::gateway::keys;
use crate::gateway::SearchPool;
use crate::models::{Address, CachedResults};
use crate::source::DataSource;
use crate::state::CacheState;

/// Cache-fronted search over a [`DataSource`].
///
/// Searches never fail: data-source errors, timeouts and shutdown all come
/// back as an empty list, with the cause logged. Concurrent misses on the
/// same key are not coalesced; each fetches and the last write wins.
pub struct SearchGateway {
    state: Arc<CacheState>,
    source: Arc<dyn DataSource>,
    pool: SearchPool,
    /// Address result lists longer than this are not cached
    address_cache_cap: usize,
}

impl SearchGateway {
    pub fn new(state: Arc<CacheState>, source: Arc<dyn DataSource>, config: &Config) -> Self {
        Self {
            state,
            source,
            pool: SearchPool::new(config.search_workers, config.data_source_timeout()),
            address_cache_cap: config.per_customer_address_cache_cap,
        }
    }

    // == Search Customers ==
    /// Customer names matching `query`, at most `limit` from the cache path.
    ///
    /// An empty query returns nothing without touching cache or data source.
    pub async fn search_customers(&self, query: &str, limit: usize) -> Vec<String> {
        let query = keys::normalize(query);
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let key = keys::customer_key(&query);
        if let Some(hit) = self.lookup(&self.state.customers, &key, limit) {
            return hit;
        }
        let epoch = self.state.invalidation_epoch();

        let source = Arc::clone(&self.source);
        let fetch_query = query.clone();
        let Some(names) = self
            .fetch("customer", &query, move || {
                source.find_customers(&fetch_query, limit)
            })
            .await
        else {
            return Vec::new();
        };

        self.store_fresh(
            &self.state.customers,
            key,
            CachedResults::new(names.clone(), limit),
            epoch,
        );
        names
    }

    // == Search Addresses ==
    /// Addresses of `customer` matching `query`; an empty customer searches all.
    ///
    /// Result lists longer than the per-customer cap are returned but not cached.
    pub async fn search_addresses(&self, query: &str, customer: &str, limit: usize) -> Vec<Address> {
        let query = keys::normalize(query);
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }
        let customer = keys::normalize(customer);

        let key = keys::address_key(&customer, &query);
        if let Some(hit) = self.lookup(&self.state.addresses, &key, limit) {
            return hit;
        }
        let epoch = self.state.invalidation_epoch();

        let source = Arc::clone(&self.source);
        let (fetch_query, fetch_customer) = (query.clone(), customer.clone());
        let Some(addresses) = self
            .fetch("address", &query, move || {
                source.find_addresses(&fetch_query, &fetch_customer, limit)
            })
            .await
        else {
            return Vec::new();
        };

        if addresses.len() > self.address_cache_cap {
            debug!(
                customer = %customer,
                query = %query,
                results = addresses.len(),
                cap = self.address_cache_cap,
                "Address result over cap, not caching"
            );
        } else {
            self.store_fresh(
                &self.state.addresses,
                key,
                CachedResults::new(addresses.clone(), limit),
                epoch,
            );
        }
        addresses
    }

    // == Record Customer Added ==
    /// Persists a new customer, then marks it dirty.
    ///
    /// Caches are left alone; the next incremental pass reconciles them.
    pub async fn record_customer_added(&self, name: &str) -> Result<()> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(SuggestError::InvalidRequest(
                "Customer name cannot be empty".to_string(),
            ));
        }

        let source = Arc::clone(&self.source);
        let persisted = name.clone();
        self.write("insert customer", &name, move || {
            source.insert_customer_if_absent(&persisted)
        })
        .await
    }

    // == Record Address Added ==
    /// Persists a new address for `customer`, then marks the customer dirty.
    ///
    /// Returns the id the data source assigned.
    pub async fn record_address_added(&self, customer: &str, address: Address) -> Result<i64> {
        let customer = customer.trim().to_string();
        if customer.is_empty() {
            return Err(SuggestError::InvalidRequest(
                "Address needs a customer".to_string(),
            ));
        }

        let source = Arc::clone(&self.source);
        let owner = customer.clone();
        self.write("insert address", &customer, move || {
            source.insert_address(&owner, &address)
        })
        .await
    }

    // == Record Address Updated ==
    /// Persists a change to an existing address, then marks the customer dirty.
    pub async fn record_address_updated(
        &self,
        customer: &str,
        id: i64,
        address: Address,
    ) -> Result<()> {
        let customer = customer.trim().to_string();
        if customer.is_empty() {
            return Err(SuggestError::InvalidRequest(
                "Address needs a customer".to_string(),
            ));
        }

        let source = Arc::clone(&self.source);
        let owner = customer.clone();
        self.write("update address", &customer, move || {
            source.update_address(&owner, id, &address)
        })
        .await
    }

    /// Stops taking new fetches and waits up to `grace` for running ones.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.pool.shutdown(grace).await
    }

    pub fn active_jobs(&self) -> usize {
        self.pool.active_jobs()
    }

    fn lookup<T: Clone>(
        &self,
        cache: &BoundedTtlCache<CachedResults<T>>,
        key: &str,
        limit: usize,
    ) -> Option<Vec<T>> {
        match cache.get(key).and_then(|cached| cached.serve(limit)) {
            Some(items) => {
                self.state.metrics.record_hit();
                Some(items)
            }
            None => {
                self.state.metrics.record_miss();
                None
            }
        }
    }

    /// Caches a miss-path result unless an incremental pass ran since `epoch`.
    fn store_fresh<T: Clone>(
        &self,
        cache: &BoundedTtlCache<CachedResults<T>>,
        key: String,
        value: CachedResults<T>,
        epoch: u64,
    ) {
        let stored = cache.put_if(key, value, || self.state.invalidation_epoch() == epoch);
        if !stored {
            debug!(
                cache = cache.name(),
                "Invalidation ran during fetch, result not cached"
            );
        }
    }

    async fn fetch<T, F>(&self, kind: &'static str, query: &str, job: F) -> Option<Vec<T>>
    where
        F: FnOnce() -> Result<Vec<T>> + Send + 'static,
        T: Send + 'static,
    {
        let _in_flight = self.state.metrics.begin_search();
        let started = Instant::now();
        let result = self.pool.run(job).await;
        self.state.metrics.record_fetch(started.elapsed());

        match result {
            Ok(items) => Some(items),
            Err(err) => {
                self.state.metrics.record_data_source_error();
                error!(
                    search = kind,
                    query = %query,
                    error = %err,
                    "Search failed, returning no suggestions"
                );
                None
            }
        }
    }

    async fn write<T, F>(&self, action: &'static str, customer: &str, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        match self.pool.run_to_completion(job).await {
            Ok(value) => {
                self.state.dirty.mark_dirty(keys::normalize(customer));
                debug!(action, customer = %customer, "Write persisted, customer marked dirty");
                Ok(value)
            }
            Err(err) => {
                error!(action, customer = %customer, error = %err, "Write-through failed");
                Err(err)
            }
        }
    }
}
