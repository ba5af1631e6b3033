//! # Configuration Tests
//!
//! Defaults, partial JSON deserialization and every validation error.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rv32im_core::config::*;

fn with_icache(f: impl FnOnce(&mut CacheConfig)) -> Config {
    let mut config = Config::default();
    config.icache.enabled = true;
    f(&mut config.icache);
    config
}

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.general.reset_address, 0);
    assert!(config.general.with_muldiv);
    assert!(!config.icache.enabled);
    assert!(!config.dcache.enabled);
    assert_eq!(config.write_buffer.depth, 8);
    assert!(!config.debug.enabled);
    assert!(!config.debug.with_trigger);
    assert_eq!(config.debug.nb_triggers, 8);
    assert_eq!(config.memory.ram_base, 0);
    assert_eq!(config.memory.ram_size, 1024 * 1024);
    assert_eq!(config.memory.latency, 1);
    assert_eq!(config.memory.finisher, None);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn test_cache_config_defaults() {
    let cache = CacheConfig::default();
    assert!(!cache.enabled);
    assert_eq!(cache.nways, 1);
    assert_eq!(cache.nlines, 32);
    assert_eq!(cache.nwords, 4);
    assert_eq!(cache.base, 0);
    assert_eq!(cache.limit, 0x8000_0000);
    assert_eq!(cache.replacement, ReplacementPolicy::Lru);
    assert_eq!(cache.line_bytes(), 16);
}

// ══════════════════════════════════════════════════════════
// 2. JSON
// ══════════════════════════════════════════════════════════

#[test]
fn test_partial_json_keeps_defaults() {
    let json = r#"{
        "dcache": { "enabled": true, "nways": 2, "replacement": "round_robin" },
        "memory": { "latency": 3, "finisher": 536870912 }
    }"#;
    let config: Config = serde_json::from_str(json).expect("valid json");
    assert!(config.dcache.enabled);
    assert_eq!(config.dcache.nways, 2);
    assert_eq!(config.dcache.nlines, 32);
    assert_eq!(config.dcache.replacement, ReplacementPolicy::RoundRobin);
    assert_eq!(config.memory.latency, 3);
    assert_eq!(config.memory.finisher, Some(0x2000_0000));
    assert_eq!(config.icache, CacheConfig::default());
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn test_empty_json_is_default() {
    let config: Config = serde_json::from_str("{}").expect("valid json");
    assert_eq!(config, Config::default());
}

#[test]
fn test_json_round_trip() {
    let mut config = Config::default();
    config.debug.enabled = true;
    config.write_buffer.depth = 2;
    let text = serde_json::to_string(&config).expect("serializable");
    let back: Config = serde_json::from_str(&text).expect("valid json");
    assert_eq!(back, config);
}

// ══════════════════════════════════════════════════════════
// 3. Validation
// ══════════════════════════════════════════════════════════

#[test]
fn test_misaligned_reset_address() {
    let mut config = Config::default();
    config.general.reset_address = 0x102;
    assert_eq!(
        config.validate(),
        Err(ConfigError::MisalignedResetAddress(0x102))
    );
}

#[rstest]
#[case(0)]
#[case(3)]
#[case(4)]
fn test_invalid_ways(#[case] nways: usize) {
    let config = with_icache(|c| c.nways = nways);
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidWays {
            cache: "icache",
            nways
        })
    );
}

#[rstest]
#[case(0)]
#[case(3)]
#[case(48)]
fn test_invalid_lines(#[case] nlines: usize) {
    let config = with_icache(|c| c.nlines = nlines);
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidLines {
            cache: "icache",
            nlines
        })
    );
}

#[rstest]
#[case(2)]
#[case(12)]
#[case(32)]
fn test_invalid_words(#[case] nwords: usize) {
    let config = with_icache(|c| c.nwords = nwords);
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidWords {
            cache: "icache",
            nwords
        })
    );
}

#[rstest]
#[case::empty(0x1000, 0x1000)]
#[case::not_power_of_two(0, 0x3000)]
#[case::misaligned(0x1000, 0x3000)]
#[case::beyond_4g(0, 0x2_0000_0000)]
#[case::smaller_than_line(0, 8)]
fn test_invalid_region(#[case] base: u64, #[case] limit: u64) {
    let mut config = Config::default();
    config.dcache.enabled = true;
    config.dcache.base = base;
    config.dcache.limit = limit;
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidRegion {
            cache: "dcache",
            base,
            limit
        })
    );
}

#[test]
fn test_disabled_cache_is_not_validated() {
    let mut config = Config::default();
    config.icache.nways = 7;
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn test_empty_write_buffer() {
    let mut config = Config::default();
    config.write_buffer.depth = 0;
    assert_eq!(config.validate(), Err(ConfigError::EmptyWriteBuffer));
}

#[rstest]
#[case(0)]
#[case(3)]
#[case(32)]
fn test_invalid_trigger_count(#[case] count: usize) {
    let mut config = Config::default();
    config.debug.with_trigger = true;
    config.debug.nb_triggers = count;
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidTriggerCount(count))
    );
}

#[rstest]
#[case::past_4g(0xFFFF_0000, 0x2_0000)]
#[case::empty(0, 0)]
#[case::partial_last_word(0, 0x1001)]
#[case::misaligned_base(0x2, 0x1000)]
fn test_invalid_ram(#[case] base: u32, #[case] size: usize) {
    let mut config = Config::default();
    config.memory.ram_base = base;
    config.memory.ram_size = size;
    assert_eq!(config.validate(), Err(ConfigError::InvalidRam { base, size }));
}

#[test]
fn test_ram_ending_at_4g() {
    let mut config = Config::default();
    config.memory.ram_base = 0xFFFF_0000;
    config.memory.ram_size = 0x1_0000;
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn test_error_messages_name_the_cache() {
    let err = with_icache(|c| c.nwords = 2).validate().unwrap_err();
    assert_eq!(err.to_string(), "icache: nwords must be 4, 8 or 16, got 2");
}
