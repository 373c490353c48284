//! Data Source Module
//!
//! The durable store the caches sit in front of.
//!
//! Every method is synchronous and may be slow; the search gateway runs them
//! on its blocking worker group, never on an async task directly.

mod memory;

pub use memory::InMemoryDataSource;

use crate::error::Result;
use crate::models::Address;

// == Data Source Trait ==
/// Authoritative store for customers and their addresses.
pub trait DataSource: Send + Sync + 'static {
    /// Customer names matching `query` by prefix or substring, at most `limit` of them.
    fn find_customers(&self, query: &str, limit: usize) -> Result<Vec<String>>;

    /// Addresses of `customer` matching `query`; an empty `customer` searches all.
    fn find_addresses(&self, query: &str, customer: &str, limit: usize) -> Result<Vec<Address>>;

    /// Adds the customer unless one with the same name already exists.
    fn insert_customer_if_absent(&self, name: &str) -> Result<()>;

    /// Stores a new address for `customer`, returning its id.
    fn insert_address(&self, customer: &str, address: &Address) -> Result<i64>;

    /// Replaces the address with `id` belonging to `customer`.
    fn update_address(&self, customer: &str, id: i64, address: &Address) -> Result<()>;
}
