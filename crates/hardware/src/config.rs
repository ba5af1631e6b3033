//! Configuration system for the RV32IM core.
//!
//! This module defines the construction-time parameters of the core. It provides:
//! 1. **Defaults:** Baseline constants for the reset vector, cache geometry and write buffer.
//! 2. **Structures:** Sections for general options, each L1 cache, the write buffer, the
//!    debug/trigger unit and the simulated memory.
//! 3. **Validation:** Geometry and range checks reported as [`ConfigError`].
//!
//! Configuration is supplied as JSON (every field optional) or built with `Config::default()`.
//! It is applied when the `Cpu` is constructed and never changes afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration constants for the core.
///
/// These values define the baseline configuration when a field is omitted
/// from the JSON input.
mod defaults {
    /// Address of the first instruction fetched after reset.
    pub const RESET_ADDRESS: u32 = 0x0000_0000;

    /// Multiply/divide unit present.
    pub const WITH_MULDIV: bool = true;

    /// Caches are optional and disabled unless requested.
    pub const CACHE_ENABLED: bool = false;

    /// Default cache associativity (direct-mapped).
    pub const CACHE_NWAYS: usize = 1;

    /// Default number of lines per way.
    pub const CACHE_NLINES: usize = 32;

    /// Default number of 32-bit words per line.
    pub const CACHE_NWORDS: usize = 4;

    /// Default start of the cacheable region.
    pub const CACHE_BASE: u64 = 0;

    /// Default end (exclusive) of the cacheable region (2 GiB).
    pub const CACHE_LIMIT: u64 = 0x8000_0000;

    /// Default write buffer depth in entries.
    pub const WRBUF_DEPTH: usize = 8;

    /// Default number of match triggers.
    pub const NB_TRIGGERS: usize = 8;

    /// Base address of simulated RAM.
    pub const RAM_BASE: u32 = 0x0000_0000;

    /// Size of simulated RAM (1 MiB).
    pub const RAM_SIZE: usize = 1024 * 1024;

    /// Wait states per bus beat.
    pub const BUS_LATENCY: u32 = 1;
}

/// Largest number of triggers the trigger unit can be built with.
pub const MAX_TRIGGERS: usize = 16;

/// Errors reported by [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The reset vector is not 4-byte aligned.
    #[error("reset address {0:#010x} is not 4-byte aligned")]
    MisalignedResetAddress(u32),

    /// A cache has an unsupported number of ways.
    #[error("{cache}: nways must be 1 or 2, got {nways}")]
    InvalidWays {
        /// Which cache (`icache` or `dcache`).
        cache: &'static str,
        /// Offending value.
        nways: usize,
    },

    /// A cache has a line count that is not a nonzero power of two.
    #[error("{cache}: nlines must be a nonzero power of 2, got {nlines}")]
    InvalidLines {
        /// Which cache (`icache` or `dcache`).
        cache: &'static str,
        /// Offending value.
        nlines: usize,
    },

    /// A cache has an unsupported line width.
    #[error("{cache}: nwords must be 4, 8 or 16, got {nwords}")]
    InvalidWords {
        /// Which cache (`icache` or `dcache`).
        cache: &'static str,
        /// Offending value.
        nwords: usize,
    },

    /// A cache region is empty, misaligned or not a power of two in size.
    #[error(
        "{cache}: region [{base:#x}, {limit:#x}) must be a power-of-2 sized, size-aligned range within 4 GiB holding at least one line"
    )]
    InvalidRegion {
        /// Which cache (`icache` or `dcache`).
        cache: &'static str,
        /// Region start.
        base: u64,
        /// Region end (exclusive).
        limit: u64,
    },

    /// The write buffer must hold at least one entry.
    #[error("write buffer depth must be at least 1")]
    EmptyWriteBuffer,

    /// Trigger count must be a power of two no larger than [`MAX_TRIGGERS`].
    #[error("nb_triggers must be a power of 2 between 1 and {MAX_TRIGGERS}, got {0}")]
    InvalidTriggerCount(usize),

    /// RAM is empty, not word-aligned or does not fit into the 32-bit address space.
    #[error("ram [{base:#x} + {size:#x}) must be a nonempty, word-aligned range in the 32-bit address space")]
    InvalidRam {
        /// RAM base address.
        base: u32,
        /// RAM size in bytes.
        size: usize,
    },
}

/// Replacement policy used by a set-associative cache on refill.
///
/// Both policies are deterministic; with two ways `Lru` behaves as a single
/// toggle bit per set.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
pub enum ReplacementPolicy {
    /// Least Recently Used.
    #[default]
    #[serde(alias = "lru", alias = "LRU")]
    Lru,
    /// Round-robin victim pointer per set.
    #[serde(alias = "round_robin", alias = "Fifo", alias = "fifo")]
    RoundRobin,
}

/// Root configuration structure.
///
/// # Example
///
/// ```
/// use rv32im_core::config::Config;
///
/// let json = r#"{
///     "general": { "reset_address": 4096 },
///     "icache": { "enabled": true, "nways": 2, "nlines": 64, "nwords": 8 },
///     "write_buffer": { "depth": 4 }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.general.reset_address, 0x1000);
/// assert_eq!(config.icache.nways, 2);
/// assert!(!config.dcache.enabled);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Reset vector and ISA options.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Instruction cache.
    #[serde(default)]
    pub icache: CacheConfig,
    /// Data cache.
    #[serde(default)]
    pub dcache: CacheConfig,
    /// Store write buffer in front of the data cache region.
    #[serde(default)]
    pub write_buffer: WriteBufferConfig,
    /// Debug and trigger units.
    #[serde(default)]
    pub debug: DebugConfig,
    /// Simulated RAM, bus timing and exit device.
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Checks every section for values the core cannot be built with.
    ///
    /// # Returns
    ///
    /// `Ok(())` when the configuration is usable, or the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.reset_address % 4 != 0 {
            return Err(ConfigError::MisalignedResetAddress(
                self.general.reset_address,
            ));
        }
        self.icache.validate("icache")?;
        self.dcache.validate("dcache")?;
        if self.write_buffer.depth == 0 {
            return Err(ConfigError::EmptyWriteBuffer);
        }
        if self.debug.with_trigger
            && (!self.debug.nb_triggers.is_power_of_two() || self.debug.nb_triggers > MAX_TRIGGERS)
        {
            return Err(ConfigError::InvalidTriggerCount(self.debug.nb_triggers));
        }
        let ram_end = u64::from(self.memory.ram_base) + self.memory.ram_size as u64;
        let aligned = self.memory.ram_base % 4 == 0 && self.memory.ram_size % 4 == 0;
        if self.memory.ram_size == 0 || !aligned || ram_end > 1 << 32 {
            return Err(ConfigError::InvalidRam {
                base: self.memory.ram_base,
                size: self.memory.ram_size,
            });
        }
        Ok(())
    }
}

/// General options: reset vector and optional ISA extensions.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Address of the first instruction fetched after reset.
    #[serde(default = "GeneralConfig::default_reset_address")]
    pub reset_address: u32,

    /// Whether the M extension is implemented; when false its encodings are illegal.
    #[serde(default = "GeneralConfig::default_with_muldiv")]
    pub with_muldiv: bool,
}

impl GeneralConfig {
    const fn default_reset_address() -> u32 {
        defaults::RESET_ADDRESS
    }

    const fn default_with_muldiv() -> bool {
        defaults::WITH_MULDIV
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            reset_address: defaults::RESET_ADDRESS,
            with_muldiv: defaults::WITH_MULDIV,
        }
    }
}

/// Geometry and mapped region of one L1 cache.
///
/// Capacity is `nways * nlines * nwords * 4` bytes. Only addresses in
/// `[base, limit)` are cached; everything else goes straight to the bus.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether this cache is instantiated.
    #[serde(default = "CacheConfig::default_enabled")]
    pub enabled: bool,
    /// Associativity (1 or 2).
    #[serde(default = "CacheConfig::default_nways")]
    pub nways: usize,
    /// Lines per way (power of 2).
    #[serde(default = "CacheConfig::default_nlines")]
    pub nlines: usize,
    /// Words per line (4, 8 or 16).
    #[serde(default = "CacheConfig::default_nwords")]
    pub nwords: usize,
    /// First cacheable address.
    #[serde(default = "CacheConfig::default_base")]
    pub base: u64,
    /// End of the cacheable region (exclusive); may be `0x1_0000_0000`.
    #[serde(default = "CacheConfig::default_limit")]
    pub limit: u64,
    /// Victim selection on refill.
    #[serde(default)]
    pub replacement: ReplacementPolicy,
}

impl CacheConfig {
    const fn default_enabled() -> bool {
        defaults::CACHE_ENABLED
    }

    const fn default_nways() -> usize {
        defaults::CACHE_NWAYS
    }

    const fn default_nlines() -> usize {
        defaults::CACHE_NLINES
    }

    const fn default_nwords() -> usize {
        defaults::CACHE_NWORDS
    }

    const fn default_base() -> u64 {
        defaults::CACHE_BASE
    }

    const fn default_limit() -> u64 {
        defaults::CACHE_LIMIT
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> u64 {
        self.nwords as u64 * 4
    }

    /// Validates the geometry of an enabled cache; disabled caches always pass.
    ///
    /// # Arguments
    ///
    /// * `cache` - Name used in the error (`"icache"` or `"dcache"`).
    pub fn validate(&self, cache: &'static str) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if !matches!(self.nways, 1 | 2) {
            return Err(ConfigError::InvalidWays {
                cache,
                nways: self.nways,
            });
        }
        if !self.nlines.is_power_of_two() {
            return Err(ConfigError::InvalidLines {
                cache,
                nlines: self.nlines,
            });
        }
        if !matches!(self.nwords, 4 | 8 | 16) {
            return Err(ConfigError::InvalidWords {
                cache,
                nwords: self.nwords,
            });
        }
        let region_ok = self.base < self.limit
            && self.limit <= 1 << 32
            && (self.limit - self.base).is_power_of_two()
            && self.base % (self.limit - self.base) == 0
            && self.limit - self.base >= self.line_bytes();
        if !region_ok {
            return Err(ConfigError::InvalidRegion {
                cache,
                base: self.base,
                limit: self.limit,
            });
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::CACHE_ENABLED,
            nways: defaults::CACHE_NWAYS,
            nlines: defaults::CACHE_NLINES,
            nwords: defaults::CACHE_NWORDS,
            base: defaults::CACHE_BASE,
            limit: defaults::CACHE_LIMIT,
            replacement: ReplacementPolicy::default(),
        }
    }
}

/// Write buffer parameters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct WriteBufferConfig {
    /// Number of pending stores the buffer can hold.
    #[serde(default = "WriteBufferConfig::default_depth")]
    pub depth: usize,
}

impl WriteBufferConfig {
    const fn default_depth() -> usize {
        defaults::WRBUF_DEPTH
    }
}

impl Default for WriteBufferConfig {
    fn default() -> Self {
        Self {
            depth: defaults::WRBUF_DEPTH,
        }
    }
}

/// Debug and trigger unit options.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DebugConfig {
    /// Instantiate the debug unit (halt/resume/step, `dcsr`, `dpc`).
    #[serde(default)]
    pub enabled: bool,
    /// Instantiate the trigger unit (`tselect`, `tdata1`, `tdata2`).
    #[serde(default)]
    pub with_trigger: bool,
    /// Number of triggers (power of 2).
    #[serde(default = "DebugConfig::default_nb_triggers")]
    pub nb_triggers: usize,
}

impl DebugConfig {
    const fn default_nb_triggers() -> usize {
        defaults::NB_TRIGGERS
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            with_trigger: false,
            nb_triggers: defaults::NB_TRIGGERS,
        }
    }
}

/// Simulated memory system.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MemoryConfig {
    /// RAM base address.
    #[serde(default = "MemoryConfig::default_ram_base")]
    pub ram_base: u32,
    /// RAM size in bytes.
    #[serde(default = "MemoryConfig::default_ram_size")]
    pub ram_size: usize,
    /// Wait states per bus beat on both ports.
    #[serde(default = "MemoryConfig::default_latency")]
    pub latency: u32,
    /// Address of an optional finisher device; a store to it ends the simulation.
    #[serde(default)]
    pub finisher: Option<u32>,
}

impl MemoryConfig {
    const fn default_ram_base() -> u32 {
        defaults::RAM_BASE
    }

    const fn default_ram_size() -> usize {
        defaults::RAM_SIZE
    }

    const fn default_latency() -> u32 {
        defaults::BUS_LATENCY
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ram_base: defaults::RAM_BASE,
            ram_size: defaults::RAM_SIZE,
            latency: defaults::BUS_LATENCY,
            finisher: None,
        }
    }
}
