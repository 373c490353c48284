//! Data Models
//!
//! Records exchanged with the data source and the result lists the caches hold.

mod address;
mod results;

pub use address::Address;
pub use results::CachedResults;
