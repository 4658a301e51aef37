//! GeneScope Search Engine
//!
//! This crate turns one gene query into one aggregated outcome:
//! - Concurrent fan-out to every configured source with error isolation
//! - Per-key result cache with at-most-one computation in flight
//! - Async and blocking memoized entry points

pub mod aggregator;
pub mod blocking;
pub mod cache;
pub mod memoized;

// Re-export commonly used types
pub use aggregator::Aggregator;
pub use blocking::BlockingSearch;
pub use cache::{EvictionPolicy, ResultCache};
pub use memoized::MemoizedSearch;
