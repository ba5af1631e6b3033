//! # L1 Cache Tests
//!
//! Direct tests of `L1Cache` lookup and replacement, and whole programs run under
//! different cache geometries, which must all produce the same architectural result.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rv32im_core::config::{CacheConfig, Config, ReplacementPolicy};
use rv32im_core::core::units::cache::L1Cache;

use crate::common::builder::*;
use crate::common::harness::TestContext;

/// Two ways, four sets, 16-byte lines: addresses 64 bytes apart share a set.
fn small(replacement: ReplacementPolicy) -> L1Cache {
    L1Cache::new(&CacheConfig {
        enabled: true,
        nways: 2,
        nlines: 4,
        nwords: 4,
        base: 0,
        limit: 0x1_0000,
        replacement,
    })
}

fn line(seed: u32) -> [u32; 4] {
    [seed, seed + 1, seed + 2, seed + 3]
}

// ══════════════════════════════════════════════════════════
// 1. Cache Array
// ══════════════════════════════════════════════════════════

#[test]
fn test_empty_cache_misses() {
    let mut cache = small(ReplacementPolicy::Lru);
    assert_eq!(cache.read(0x40), None);
    assert_eq!(cache.valid_lines(), 0);
}

#[test]
fn test_fill_then_hit_every_word() {
    let mut cache = small(ReplacementPolicy::Lru);
    cache.fill(0x20, &line(100));
    assert_eq!(cache.read(0x20), Some(100));
    assert_eq!(cache.read(0x2C), Some(103));
    assert_eq!(cache.read(0x30), None);
}

#[test]
fn test_region_and_line_address() {
    let cache = small(ReplacementPolicy::Lru);
    assert!(cache.covers(0));
    assert!(cache.covers(0xFFFC));
    assert!(!cache.covers(0x1_0000));
    assert_eq!(cache.line_address(0x1234), 0x1230);
    assert_eq!(cache.nwords(), 4);
}

#[test]
fn test_lru_evicts_least_recently_used() {
    let mut cache = small(ReplacementPolicy::Lru);
    cache.fill(0x00, &line(0));
    cache.fill(0x40, &line(10));
    assert_eq!(cache.read(0x00), Some(0));
    cache.fill(0x80, &line(20));
    assert!(cache.contains(0x00));
    assert!(!cache.contains(0x40));
    assert!(cache.contains(0x80));
}

#[test]
fn test_round_robin_ignores_hits() {
    let mut cache = small(ReplacementPolicy::RoundRobin);
    cache.fill(0x00, &line(0));
    cache.fill(0x40, &line(10));
    assert_eq!(cache.read(0x00), Some(0));
    cache.fill(0x80, &line(20));
    assert!(!cache.contains(0x00));
    assert!(cache.contains(0x40));
    cache.fill(0xC0, &line(30));
    assert!(!cache.contains(0x40));
    assert!(cache.contains(0x80));
}

#[test]
fn test_refill_prefers_invalid_way() {
    let mut cache = small(ReplacementPolicy::RoundRobin);
    cache.fill(0x00, &line(0));
    cache.fill(0x40, &line(10));
    cache.evict(0x40);
    cache.fill(0x80, &line(20));
    assert!(cache.contains(0x00));
    assert!(cache.contains(0x80));
}

#[test]
fn test_evict_and_invalidate() {
    let mut cache = small(ReplacementPolicy::Lru);
    cache.fill(0x00, &line(0));
    cache.fill(0x10, &line(4));
    cache.evict(0x08);
    assert!(!cache.contains(0x00));
    assert!(cache.contains(0x10));
    cache.evict(0x500);
    assert_eq!(cache.valid_lines(), 1);
    cache.invalidate_all();
    assert_eq!(cache.valid_lines(), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Programs Under Caches
// ══════════════════════════════════════════════════════════

/// Stores eight values, sums them back and stores the low byte of the sum.
fn store_and_sum() -> Vec<u32> {
    vec![
        addi(1, 0, 0x400),
        addi(2, 0, 8),
        addi(3, 0, 1),
        sw(1, 3, 0), // 12: fill
        addi(3, 3, 3),
        addi(1, 1, 4),
        addi(2, 2, -1),
        bne(2, 0, -16),
        addi(1, 0, 0x400),
        addi(2, 0, 8),
        addi(4, 0, 0),
        lw(5, 1, 0), // 44: sum
        add(4, 4, 5),
        addi(1, 1, 4),
        addi(2, 2, -1),
        bne(2, 0, -16),
        sb(0, 4, 0x500),
        lbu(6, 0, 0x500),
    ]
}

#[rstest]
#[case::uncached(false, false, 1, 4, ReplacementPolicy::Lru, 1)]
#[case::icache_only(true, false, 1, 4, ReplacementPolicy::Lru, 1)]
#[case::dcache_only(false, true, 1, 4, ReplacementPolicy::Lru, 1)]
#[case::both_direct_mapped(true, true, 1, 4, ReplacementPolicy::Lru, 0)]
#[case::two_way_lru(true, true, 2, 8, ReplacementPolicy::Lru, 2)]
#[case::two_way_round_robin(true, true, 2, 16, ReplacementPolicy::RoundRobin, 3)]
fn test_caches_are_transparent(
    #[case] icache: bool,
    #[case] dcache: bool,
    #[case] nways: usize,
    #[case] nwords: usize,
    #[case] replacement: ReplacementPolicy,
    #[case] latency: u32,
) {
    let mut config = Config::default();
    config.memory.latency = latency;
    for (cache, enabled) in [(&mut config.icache, icache), (&mut config.dcache, dcache)] {
        cache.enabled = enabled;
        cache.nways = nways;
        cache.nlines = 4;
        cache.nwords = nwords;
        cache.replacement = replacement;
    }

    let mut ctx = TestContext::with_config(&config);
    let halt = ctx.load_program(&store_and_sum());
    ctx.run_until(halt);
    ctx.drain();

    assert_eq!(ctx.reg(4), 92);
    assert_eq!(ctx.reg(6), 92);
    assert_eq!(ctx.read_word(0x41C), 22);
    assert_eq!(ctx.read_word(0x500), 92);
    assert_eq!(ctx.stats().instructions_retired, 89);
    if icache {
        assert!(ctx.stats().icache_hits > ctx.stats().icache_misses);
    } else {
        assert_eq!(ctx.stats().icache_hits + ctx.stats().icache_misses, 0);
    }
    if !dcache {
        assert_eq!(ctx.stats().wrbuf_enqueues, 0);
    }
}

#[rstest]
#[case::direct_mapped(1, 4, 0)]
#[case::two_way(2, 2, 2)]
fn test_conflicting_lines(#[case] nways: usize, #[case] misses: u64, #[case] hits: u64) {
    let mut config = Config::default();
    config.dcache.enabled = true;
    config.dcache.nways = nways;
    let mut ctx = TestContext::with_config(&config);
    // 512 bytes apart: same set with 32 lines of 16 bytes.
    let halt = ctx.load_program(&[
        lw(1, 0, 0x400),
        lw(2, 0, 0x600),
        lw(3, 0, 0x400),
        lw(4, 0, 0x600),
    ]);
    ctx.run_until(halt);
    assert_eq!(ctx.stats().dcache_misses, misses);
    assert_eq!(ctx.stats().dcache_hits, hits);
}

#[test]
fn test_uncached_region_bypasses_dcache() {
    let mut config = Config::default();
    config.dcache.enabled = true;
    config.dcache.limit = 0x400;
    let mut ctx = TestContext::with_config(&config);
    let halt = ctx.load_program(&[addi(1, 0, 5), sw(0, 1, 0x400), lw(2, 0, 0x400), lw(3, 0, 0x300)]);
    ctx.run_until(halt);
    assert_eq!(ctx.reg(2), 5);
    assert_eq!(ctx.stats().wrbuf_enqueues, 0);
    assert_eq!(ctx.stats().dcache_misses, 1);
    assert!(ctx.cpu().lsu.dcache().is_some_and(|c| c.valid_lines() == 1));
}

#[test]
fn test_store_evicts_cached_line() {
    let mut config = Config::default();
    config.dcache.enabled = true;
    let mut ctx = TestContext::with_config(&config);
    let halt = ctx.load_program(&[
        lw(1, 0, 0x400),
        addi(2, 0, 9),
        sw(0, 2, 0x404),
        nop(),
        nop(),
        nop(),
        nop(),
        lw(3, 0, 0x400),
    ]);
    ctx.run_until(halt);
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.stats().dcache_misses, 2);
}
