//! Set-Associative L1 Cache.
//!
//! This module implements the instruction and data caches of the core. It provides:
//! 1. **Geometry:** `nways` × `nlines` × `nwords` storage mapped onto a `[base, limit)` region.
//! 2. **Lookup:** Tag comparison across all ways of the indexed set.
//! 3. **Refill:** Whole-line fills through the blocking `refill::Refill` state machine.
//! 4. **Maintenance:** Single-line eviction (stores) and full invalidation (reset, `fence.i`).
//!
//! A word address is split into offset (within the line), set index and tag.
//! Lines are only ever written by a complete refill.

/// Cache replacement policy implementations (LRU, round-robin).
pub mod policies;

/// Line refill state machine.
pub mod refill;

use self::policies::{LruPolicy, ReplacementPolicy, RoundRobinPolicy};
use crate::config::{CacheConfig, ReplacementPolicy as PolicyType};

/// Set-associative cache holding instruction or data words.
#[derive(Debug)]
pub struct L1Cache {
    nways: usize,
    nlines: usize,
    nwords: usize,
    base: u64,
    limit: u64,
    /// Tag of each line, `None` when invalid; indexed by `way * nlines + set`.
    tags: Vec<Option<u32>>,
    /// Line data; line `i` occupies `data[i * nwords..(i + 1) * nwords]`.
    data: Vec<u32>,
    policy: Box<dyn ReplacementPolicy>,
}

impl L1Cache {
    /// Creates an empty (fully invalid) cache with the configured geometry.
    ///
    /// # Arguments
    ///
    /// * `config` - Cache configuration; assumed to have passed validation.
    pub fn new(config: &CacheConfig) -> Self {
        let nways = config.nways.max(1);
        let nlines = config.nlines.max(1);
        let nwords = config.nwords.max(1);
        let policy: Box<dyn ReplacementPolicy> = match config.replacement {
            PolicyType::Lru => Box::new(LruPolicy::new(nlines, nways)),
            PolicyType::RoundRobin => Box::new(RoundRobinPolicy::new(nlines, nways)),
        };
        Self {
            nways,
            nlines,
            nwords,
            base: config.base,
            limit: config.limit,
            tags: vec![None; nways * nlines],
            data: vec![0; nways * nlines * nwords],
            policy,
        }
    }

    /// Returns `true` if `addr` lies in the cached region.
    pub fn covers(&self, addr: u32) -> bool {
        let addr = u64::from(addr);
        self.base <= addr && addr < self.limit
    }

    /// Number of words per line.
    pub const fn nwords(&self) -> usize {
        self.nwords
    }

    /// Address of the first byte of the line containing `addr`.
    pub const fn line_address(&self, addr: u32) -> u32 {
        addr & !((self.nwords as u32 * 4) - 1)
    }

    /// Splits a byte address into (tag, set, word offset).
    const fn split(&self, addr: u32) -> (u32, usize, usize) {
        let word = (addr >> 2) as usize;
        let offset = word % self.nwords;
        let set = (word / self.nwords) % self.nlines;
        let tag = (word / (self.nwords * self.nlines)) as u32;
        (tag, set, offset)
    }

    fn lookup(&self, tag: u32, set: usize) -> Option<usize> {
        (0..self.nways).find(|&way| self.tags[way * self.nlines + set] == Some(tag))
    }

    /// Returns `true` if the line holding `addr` is present, without touching the policy.
    pub fn contains(&self, addr: u32) -> bool {
        let (tag, set, _) = self.split(addr);
        self.lookup(tag, set).is_some()
    }

    /// Reads the word at `addr` if its line is present.
    ///
    /// # Returns
    ///
    /// `Some(word)` on a hit (the way becomes most recently used), `None` on a miss.
    pub fn read(&mut self, addr: u32) -> Option<u32> {
        let (tag, set, offset) = self.split(addr);
        let way = self.lookup(tag, set)?;
        self.policy.update(set, way);
        Some(self.data[(way * self.nlines + set) * self.nwords + offset])
    }

    /// Installs a complete line.
    ///
    /// An invalid way of the set is used first; otherwise the replacement policy
    /// chooses the victim.
    ///
    /// # Arguments
    ///
    /// * `line_addr` - Address of the first byte of the line.
    /// * `words` - The `nwords` words of the line.
    pub fn fill(&mut self, line_addr: u32, words: &[u32]) {
        let (tag, set, _) = self.split(line_addr);
        let way = self
            .lookup(tag, set)
            .or_else(|| (0..self.nways).find(|&w| self.tags[w * self.nlines + set].is_none()))
            .unwrap_or_else(|| self.policy.get_victim(set));
        let line = way * self.nlines + set;
        self.tags[line] = Some(tag);
        let start = line * self.nwords;
        for (dst, src) in self.data[start..start + self.nwords].iter_mut().zip(words) {
            *dst = *src;
        }
        self.policy.update(set, way);
    }

    /// Invalidates the line holding `addr`, if present.
    pub fn evict(&mut self, addr: u32) {
        let (tag, set, _) = self.split(addr);
        if let Some(way) = self.lookup(tag, set) {
            self.tags[way * self.nlines + set] = None;
        }
    }

    /// Invalidates every line.
    pub fn invalidate_all(&mut self) {
        self.tags.fill(None);
    }

    /// Number of valid lines (for statistics and tests).
    pub fn valid_lines(&self) -> usize {
        self.tags.iter().filter(|t| t.is_some()).count()
    }
}
