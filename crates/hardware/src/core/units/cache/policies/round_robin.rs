//! Round-Robin Replacement Policy.
//!
//! This policy evicts ways in a fixed rotation, regardless of how recently they
//! were accessed. Each set keeps a pointer that advances every time a victim is chosen.

use super::ReplacementPolicy;

/// Round-robin policy state.
#[derive(Clone, Debug)]
pub struct RoundRobinPolicy {
    /// Next way to be evicted for each set.
    next_way: Vec<usize>,
    /// Number of ways in the cache.
    ways: usize,
}

impl RoundRobinPolicy {
    /// Creates a new round-robin policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_way: vec![0; sets],
            ways: ways.max(1),
        }
    }
}

impl ReplacementPolicy for RoundRobinPolicy {
    /// Accesses do not influence the rotation.
    fn update(&mut self, _set: usize, _way: usize) {}

    /// Returns the current pointer of the set and advances it.
    fn get_victim(&mut self, set: usize) -> usize {
        let way = self.next_way[set];
        self.next_way[set] = (way + 1) % self.ways;
        way
    }
}
