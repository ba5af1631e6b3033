//! Cache Replacement Policies.
//!
//! Implements deterministic algorithms for selecting victim ways in set-associative caches.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used (a single toggle bit per set with two ways).
//! - `RoundRobin`: Per-set victim pointer advanced on every refill.

/// Least Recently Used replacement policy.
pub mod lru;

/// Round-robin replacement policy.
pub mod round_robin;

pub use lru::LruPolicy;
pub use round_robin::RoundRobinPolicy;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage state and selecting victim lines.
pub trait ReplacementPolicy: std::fmt::Debug {
    /// Updates the policy state when a line is accessed (hit or refill).
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was accessed.
    fn update(&mut self, set: usize, way: usize);

    /// Selects a victim line to evict from a specific set.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn get_victim(&mut self, set: usize) -> usize;
}
