//! Cache keys and invalidation scoping
//!
//! Key layout:
//! - customer searches: `customer:<query>`
//! - address searches: `address:<len>:<customer>:<query>`, where `<len>` is
//!   the byte length of the customer name (`address:0::<query>` = unscoped)
//!
//! Queries and customer names are trimmed and lowercased before use. The
//! length prefix keeps a name containing `:` from reading as another
//! customer's segment.

use crate::models::CachedResults;

pub const CUSTOMER_PREFIX: &str = "customer:";
pub const ADDRESS_PREFIX: &str = "address:";

/// Trims and lowercases a query or customer name.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn customer_key(normalized_query: &str) -> String {
    format!("{}{}", CUSTOMER_PREFIX, normalized_query)
}

pub fn address_key(normalized_customer: &str, normalized_query: &str) -> String {
    format!(
        "{}{}{}",
        ADDRESS_PREFIX,
        customer_segment(normalized_customer),
        normalized_query
    )
}

/// `<len>:<customer>:`, the scope part of an address key.
fn customer_segment(normalized_customer: &str) -> String {
    format!("{}:{}:", normalized_customer.len(), normalized_customer)
}

// == Customer Scope ==
/// Whether a cached customer search involves `customer`.
///
/// True when the search's query would match the customer's name (so a newly
/// added customer shows up) or when the cached names already list it.
pub fn customer_entry_references(
    normalized_customer: &str,
    key: &str,
    value: &CachedResults<String>,
) -> bool {
    let query_matches = key
        .strip_prefix(CUSTOMER_PREFIX)
        .is_some_and(|query| normalized_customer.contains(query));

    query_matches
        || value
            .items
            .iter()
            .any(|name| normalize(name) == normalized_customer)
}

// == Address Scope ==
/// Whether a cached address search is scoped to `customer`.
///
/// Unscoped searches span every customer, so they count as well.
pub fn address_entry_references(normalized_customer: &str, key: &str) -> bool {
    match key.strip_prefix(ADDRESS_PREFIX) {
        Some(rest) => {
            rest.starts_with(&customer_segment(""))
                || rest.starts_with(&customer_segment(normalized_customer))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> CachedResults<String> {
        CachedResults::new(items.iter().map(|s| s.to_string()).collect(), 10)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  AcMe Freight "), "acme freight");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(customer_key("acme"), "customer:acme");
        assert_eq!(address_key("acme", "main"), "address:4:acme:main");
        assert_eq!(address_key("", "main"), "address:0::main");
    }

    #[test]
    fn test_customer_reference_by_query() {
        // "new" would now match "newco"
        assert!(customer_entry_references("newco", "customer:new", &names(&[])));
        assert!(!customer_entry_references("newco", "customer:zeta", &names(&["Zeta"])));
    }

    #[test]
    fn test_customer_reference_by_value() {
        assert!(customer_entry_references(
            "acme",
            "customer:big",
            &names(&["Big Co", "ACME"])
        ));
    }

    #[test]
    fn test_address_reference_is_segment_exact() {
        assert!(address_entry_references("acme", &address_key("acme", "main")));
        assert!(address_entry_references("acme", &address_key("acme", "")));
        assert!(!address_entry_references("acme", &address_key("acmex", "main")));
        assert!(!address_entry_references("acme", &address_key("zeta", "acme")));
        assert!(!address_entry_references("acme", "customer:acme"));
    }

    #[test]
    fn test_colon_in_customer_name_stays_in_its_own_scope() {
        let west = address_key("acme:west", "main");

        assert!(!address_entry_references("acme", &west));
        assert!(address_entry_references("acme:west", &west));
        assert!(!address_entry_references("acme:west", &address_key("acme", "west:main")));
    }

    #[test]
    fn test_unscoped_address_search_references_everyone() {
        assert!(address_entry_references("acme", &address_key("", "main")));
        assert!(address_entry_references("acme:west", &address_key("", "main")));
    }
}
