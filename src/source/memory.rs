//! In-memory data source
//!
//! Vector-backed store used by the demo binary and tests.

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Result, SuggestError};
use crate::models::Address;
use crate::source::DataSource;

#[derive(Debug, Clone)]
struct StoredAddress {
    customer: String,
    address: Address,
}

#[derive(Debug, Default)]
struct Tables {
    customers: Vec<String>,
    addresses: Vec<StoredAddress>,
    next_address_id: i64,
}

// == In-Memory Data Source ==
/// Case-insensitive customer/address store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    tables: RwLock<Tables>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-loaded with `customers`.
    pub fn with_customers<I, S>(customers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source = Self::new();
        {
            let mut tables = source.tables.write();
            for name in customers {
                let name = name.into();
                if !contains_ignore_case(&tables.customers, &name) {
                    tables.customers.push(name);
                }
            }
        }
        source
    }

    pub fn customer_count(&self) -> usize {
        self.tables.read().customers.len()
    }

    pub fn address_count(&self) -> usize {
        self.tables.read().addresses.len()
    }
}

fn contains_ignore_case(names: &[String], name: &str) -> bool {
    names.iter().any(|existing| existing.eq_ignore_ascii_case(name))
}

impl DataSource for InMemoryDataSource {
    fn find_customers(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let needle = query.trim().to_lowercase();
        let tables = self.tables.read();

        // Prefix matches rank ahead of substring matches
        let (mut prefix, substring): (Vec<&String>, Vec<&String>) = tables
            .customers
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .partition(|name| name.to_lowercase().starts_with(&needle));
        prefix.extend(substring);

        Ok(prefix.into_iter().take(limit).cloned().collect())
    }

    fn find_addresses(&self, query: &str, customer: &str, limit: usize) -> Result<Vec<Address>> {
        let needle = query.trim().to_lowercase();
        let customer = customer.trim();
        let tables = self.tables.read();

        Ok(tables
            .addresses
            .iter()
            .filter(|stored| customer.is_empty() || stored.customer.eq_ignore_ascii_case(customer))
            .filter(|stored| stored.address.matches(&needle))
            .take(limit)
            .map(|stored| stored.address.clone())
            .collect())
    }

    fn insert_customer_if_absent(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SuggestError::DataSource(
                "Customer name cannot be empty".to_string(),
            ));
        }

        let mut tables = self.tables.write();
        if !contains_ignore_case(&tables.customers, name) {
            tables.customers.push(name.to_string());
            debug!(customer = name, "Inserted customer");
        }
        Ok(())
    }

    fn insert_address(&self, customer: &str, address: &Address) -> Result<i64> {
        let customer = customer.trim();
        let mut tables = self.tables.write();
        if !contains_ignore_case(&tables.customers, customer) {
            return Err(SuggestError::DataSource(format!(
                "Unknown customer: {}",
                customer
            )));
        }

        tables.next_address_id += 1;
        let id = tables.next_address_id;
        tables.addresses.push(StoredAddress {
            customer: customer.to_string(),
            address: address.clone().with_id(id),
        });
        Ok(id)
    }

    fn update_address(&self, customer: &str, id: i64, address: &Address) -> Result<()> {
        let customer = customer.trim();
        let mut tables = self.tables.write();
        let stored = tables
            .addresses
            .iter_mut()
            .find(|stored| stored.address.id == Some(id) && stored.customer.eq_ignore_ascii_case(customer))
            .ok_or_else(|| {
                SuggestError::DataSource(format!("No address {} for customer {}", id, customer))
            })?;

        stored.address = address.clone().with_id(id);
        Ok(())
    }
}
