//! Instruction fetch port.
//!
//! The fetch unit owns the instruction side of the memory system:
//! 1. **Cached fetch:** Addresses in the I-cache region hit in the Fetch cycle or start
//!    a blocking refill of the whole line.
//! 2. **Uncached fetch:** Other addresses perform a single bus beat.
//! 3. **Faults:** A bus error becomes an instruction access fault on the fetched pc.
//!
//! A request is repeated every cycle until it completes; [`FetchUnit::abort`]
//! drops an outstanding uncached beat when Fetch is flushed. A refill in progress
//! is allowed to finish so that a line is never installed partially.

use tracing::debug;

use crate::common::error::Trap;
use crate::config::CacheConfig;
use crate::core::units::Progress;
use crate::core::units::cache::L1Cache;
use crate::core::units::cache::refill::{Refill, RefillPoll};
use crate::soc::{Bus, Countdown};
use crate::stats::SimStats;

#[derive(Clone, Debug)]
enum FetchState {
    Idle,
    Uncached { addr: u32, timer: Countdown },
    Refill(Refill),
}

/// Instruction fetch unit with an optional L1 instruction cache.
#[derive(Debug)]
pub struct FetchUnit {
    icache: Option<L1Cache>,
    state: FetchState,
}

impl FetchUnit {
    /// Creates the fetch unit; the I-cache is instantiated only when enabled.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            icache: config.enabled.then(|| L1Cache::new(config)),
            state: FetchState::Idle,
        }
    }

    /// Returns the instruction cache, if present.
    pub const fn icache(&self) -> Option<&L1Cache> {
        self.icache.as_ref()
    }

    /// Returns `true` while a bus transfer is outstanding.
    pub const fn busy(&self) -> bool {
        !matches!(self.state, FetchState::Idle)
    }

    /// Advances the fetch of `pc` by one cycle.
    ///
    /// # Arguments
    ///
    /// * `bus` - System bus.
    /// * `pc` - Word-aligned fetch address; must be the same until the request completes.
    /// * `stats` - Statistics (cache hits and misses).
    ///
    /// # Returns
    ///
    /// The instruction word or an access fault once available, `Busy` otherwise.
    pub fn fetch(&mut self, bus: &mut Bus, pc: u32, stats: &mut SimStats) -> Progress<Result<u32, Trap>> {
        // A refill always runs to completion, even if Fetch moved on to another line.
        if let FetchState::Refill(refill) = &mut self.state {
            let line_addr = refill.line_address();
            let wanted = pc.wrapping_sub(line_addr) / 4;
            let same_line = (wanted as usize) < refill.words().len();
            match refill.step(bus) {
                RefillPoll::Busy => return Progress::Busy,
                RefillPoll::Fault(fault) => {
                    self.state = FetchState::Idle;
                    debug!(
                        line = %format_args!("{line_addr:#010x}"),
                        addr = %format_args!("{:#010x}", fault.addr),
                        "icache refill faulted"
                    );
                    if same_line {
                        return Progress::Done(Err(Trap::InstructionAccessFault(pc)));
                    }
                }
                RefillPoll::Done => {
                    let word = refill.words()[wanted as usize % refill.words().len()];
                    if let Some(cache) = self.icache.as_mut() {
                        cache.fill(line_addr, refill.words());
                    }
                    debug!(line = %format_args!("{line_addr:#010x}"), "icache refill done");
                    self.state = FetchState::Idle;
                    if same_line {
                        return Progress::Done(Ok(word));
                    }
                }
            }
        }

        if let FetchState::Uncached { addr, timer } = &mut self.state {
            if *addr != pc {
                self.state = FetchState::Idle;
            } else if !timer.tick() {
                return Progress::Busy;
            } else {
                self.state = FetchState::Idle;
                return Progress::Done(
                    bus.read_u32(pc)
                        .map_err(|_| Trap::InstructionAccessFault(pc)),
                );
            }
        }

        if let Some(cache) = self.icache.as_mut()
            && cache.covers(pc)
        {
            if let Some(word) = cache.read(pc) {
                stats.icache_hits += 1;
                return Progress::Done(Ok(word));
            }
            stats.icache_misses += 1;
            let line_addr = cache.line_address(pc);
            debug!(line = %format_args!("{line_addr:#010x}"), "icache miss");
            self.state = FetchState::Refill(Refill::new(line_addr, cache.nwords(), bus.latency()));
            return self.fetch(bus, pc, stats);
        }

        let mut timer = Countdown::new(bus.latency());
        if timer.tick() {
            return Progress::Done(bus.read_u32(pc).map_err(|_| Trap::InstructionAccessFault(pc)));
        }
        self.state = FetchState::Uncached { addr: pc, timer };
        Progress::Busy
    }

    /// Cancels an outstanding uncached fetch (Fetch was flushed).
    pub fn abort(&mut self) {
        if matches!(self.state, FetchState::Uncached { .. }) {
            self.state = FetchState::Idle;
        }
    }

    /// Invalidates the whole instruction cache (`fence.i`).
    pub fn invalidate(&mut self) {
        if let Some(cache) = self.icache.as_mut() {
            cache.invalidate_all();
        }
    }
}
