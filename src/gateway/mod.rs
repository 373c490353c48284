//! Gateway Module
//!
//! Search entry point, its worker group, cache-key layout and the
//! caller-side debouncer.

mod debounce;
pub mod keys;
mod pool;
mod search;

pub use debounce::Debouncer;
pub use pool::SearchPool;
pub use search::SearchGateway;
