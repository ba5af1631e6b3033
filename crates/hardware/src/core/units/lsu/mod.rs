//! Load/Store Unit (LSU).
//!
//! This module provides the data side of the memory system. It includes:
//! 1. **Loads:** Write buffer forwarding first, then the D-cache (hit, or a blocking
//!    line refill), or a single uncached bus beat outside the cached region.
//! 2. **Stores:** Stores to the cached region retire into the [`write_buffer`] and evict
//!    the matching D-cache line; other stores are single uncached bus beats.
//! 3. **Ordering:** Uncached accesses and refills wait for the write buffer to empty, so
//!    the bus sees every store before any later access.
//! 4. **Drain:** The write buffer steps once per cycle, independently of the pipeline.

/// FIFO of retired stores waiting for the bus.
pub mod write_buffer;

use tracing::{debug, warn};

use self::write_buffer::{DrainEvent, ForwardResult, WriteBuffer};
use crate::common::error::Trap;
use crate::config::Config;
use crate::core::units::Progress;
use crate::core::units::cache::L1Cache;
use crate::core::units::cache::refill::{Refill, RefillPoll};
use crate::soc::{Bus, Countdown};
use crate::stats::SimStats;

#[derive(Clone, Debug)]
enum LsuState {
    Idle,
    Uncached(Countdown),
    Refill(Refill),
}

/// Load/Store Unit with an optional L1 data cache and the store write buffer.
#[derive(Debug)]
pub struct LoadStoreUnit {
    dcache: Option<L1Cache>,
    wrbuf: WriteBuffer,
    state: LsuState,
}

impl LoadStoreUnit {
    /// Creates the LSU from the data cache and write buffer configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            dcache: config.dcache.enabled.then(|| L1Cache::new(&config.dcache)),
            wrbuf: WriteBuffer::new(config.write_buffer.depth),
            state: LsuState::Idle,
        }
    }

    /// Returns the data cache, if present.
    pub const fn dcache(&self) -> Option<&L1Cache> {
        self.dcache.as_ref()
    }

    /// Returns the write buffer.
    pub const fn write_buffer(&self) -> &WriteBuffer {
        &self.wrbuf
    }

    /// Returns `true` while an access has been started and not yet completed.
    pub const fn busy(&self) -> bool {
        !matches!(self.state, LsuState::Idle)
    }

    /// Returns `true` if no store is waiting in the write buffer.
    pub const fn wrbuf_empty(&self) -> bool {
        self.wrbuf.is_empty()
    }

    fn buffered(&self, addr: u32) -> bool {
        self.dcache.as_ref().is_some_and(|c| c.covers(addr))
    }

    /// Steps the write buffer drain machine; called once per cycle before the stages run.
    pub fn drain(&mut self, bus: &mut Bus, stats: &mut SimStats) {
        match self.wrbuf.step(bus) {
            DrainEvent::Idle | DrainEvent::Waiting => {}
            DrainEvent::Done(_) => stats.wrbuf_drains += 1,
            DrainEvent::Faulted(entry, fault) => {
                stats.wrbuf_faults += 1;
                warn!(
                    addr = %format_args!("{:#010x}", entry.addr),
                    data = %format_args!("{:#010x}", entry.data),
                    mask = entry.mask,
                    %fault,
                    "buffered store dropped"
                );
            }
        }
    }

    /// Performs one bus beat after `latency` wait cycles.
    fn uncached<T>(&mut self, latency: u32, beat: impl FnOnce() -> T) -> Progress<T> {
        let mut timer = match &self.state {
            LsuState::Uncached(timer) => *timer,
            _ => Countdown::new(latency),
        };
        if timer.tick() {
            self.state = LsuState::Idle;
            Progress::Done(beat())
        } else {
            self.state = LsuState::Uncached(timer);
            Progress::Busy
        }
    }

    /// Advances a load by one cycle.
    ///
    /// # Arguments
    ///
    /// * `bus` - System bus.
    /// * `addr` - Effective address (naturally aligned).
    /// * `mask` - Byte-enable mask of the load within its word.
    /// * `stats` - Statistics (forwards, cache hits and misses).
    ///
    /// # Returns
    ///
    /// The aligned word containing the loaded bytes, or a load access fault.
    pub fn load(&mut self, bus: &mut Bus, addr: u32, mask: u8, stats: &mut SimStats) -> Progress<Result<u32, Trap>> {
        if !self.busy() {
            match self.wrbuf.forward_load(addr, mask) {
                ForwardResult::Hit(data) => {
                    stats.wrbuf_forwards += 1;
                    return Progress::Done(Ok(data));
                }
                ForwardResult::Stall => return Progress::Busy,
                ForwardResult::Miss => {}
            }
        }

        if let LsuState::Refill(refill) = &mut self.state {
            let line_addr = refill.line_address();
            return match refill.step(bus) {
                RefillPoll::Busy => Progress::Busy,
                RefillPoll::Fault(_) => {
                    self.state = LsuState::Idle;
                    Progress::Done(Err(Trap::LoadAccessFault(addr)))
                }
                RefillPoll::Done => {
                    let words = refill.words();
                    let word = words[(addr.wrapping_sub(line_addr) / 4) as usize % words.len()];
                    if let Some(cache) = self.dcache.as_mut() {
                        cache.fill(line_addr, words);
                    }
                    debug!(line = %format_args!("{line_addr:#010x}"), "dcache refill done");
                    self.state = LsuState::Idle;
                    Progress::Done(Ok(word))
                }
            };
        }

        if let Some(cache) = self.dcache.as_mut()
            && cache.covers(addr)
        {
            if let Some(word) = cache.read(addr) {
                stats.dcache_hits += 1;
                return Progress::Done(Ok(word));
            }
            if !self.wrbuf.is_empty() {
                return Progress::Busy;
            }
            stats.dcache_misses += 1;
            let line_addr = cache.line_address(addr);
            debug!(line = %format_args!("{line_addr:#010x}"), "dcache miss");
            self.state = LsuState::Refill(Refill::new(line_addr, cache.nwords(), bus.latency()));
            return self.load(bus, addr, mask, stats);
        }

        if !self.busy() && !self.wrbuf.is_empty() {
            return Progress::Busy;
        }
        self.uncached(bus.latency(), || {
            bus.read_u32(addr).map_err(|_| Trap::LoadAccessFault(addr))
        })
    }

    /// Advances a store by one cycle.
    ///
    /// Stores to the cached region are enqueued in the write buffer and complete
    /// immediately unless the buffer is full; any other store is written to the bus
    /// once the write buffer is empty.
    ///
    /// # Arguments
    ///
    /// * `bus` - System bus.
    /// * `addr` - Effective address (naturally aligned).
    /// * `data` - Store data placed in its byte lanes.
    /// * `mask` - Byte-enable mask.
    /// * `stats` - Statistics (enqueues, full-buffer stalls).
    pub fn store(
        &mut self,
        bus: &mut Bus,
        addr: u32,
        data: u32,
        mask: u8,
        stats: &mut SimStats,
    ) -> Progress<Result<(), Trap>> {
        if self.buffered(addr) {
            if !self.wrbuf.push(addr, data, mask) {
                stats.stalls_wrbuf_full += 1;
                return Progress::Busy;
            }
            stats.wrbuf_enqueues += 1;
            if let Some(cache) = self.dcache.as_mut() {
                cache.evict(addr);
            }
            return Progress::Done(Ok(()));
        }

        if !self.busy() && !self.wrbuf.is_empty() {
            return Progress::Busy;
        }
        self.uncached(bus.latency(), || {
            bus.write_u32(addr, data, mask)
                .map_err(|_| Trap::StoreAccessFault(addr))
        })
    }

    /// Invalidates the whole data cache (`fence.i`).
    pub fn invalidate(&mut self) {
        if let Some(cache) = self.dcache.as_mut() {
            cache.invalidate_all();
        }
    }
}
