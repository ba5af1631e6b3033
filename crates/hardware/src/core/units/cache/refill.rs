//! Cache line refill.
//!
//! A refill reads the `nwords` words of one line from the bus, one beat at a time,
//! each beat waiting the bus latency. The line is handed to the cache only once every
//! beat has arrived; a bus error abandons the refill without validating anything.

use crate::common::constants::MAX_LINE_WORDS;
use crate::soc::{Bus, BusFault, Countdown};

/// Progress of a refill after one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefillPoll {
    /// More beats outstanding.
    Busy,
    /// All beats arrived; the words are available through [`Refill::words`].
    Done,
    /// A beat faulted on the bus.
    Fault(BusFault),
}

/// In-progress line refill.
#[derive(Clone, Debug)]
pub struct Refill {
    line_addr: u32,
    nwords: usize,
    beat: usize,
    latency: u32,
    timer: Countdown,
    buf: [u32; MAX_LINE_WORDS],
}

impl Refill {
    /// Starts a refill of the line at `line_addr`.
    ///
    /// # Arguments
    ///
    /// * `line_addr` - Line-aligned address of the first word.
    /// * `nwords` - Words per line (at most [`MAX_LINE_WORDS`]).
    /// * `latency` - Bus wait cycles per beat.
    pub const fn new(line_addr: u32, nwords: usize, latency: u32) -> Self {
        Self {
            line_addr,
            nwords,
            beat: 0,
            latency,
            timer: Countdown::new(latency),
            buf: [0; MAX_LINE_WORDS],
        }
    }

    /// Address of the line being refilled.
    pub const fn line_address(&self) -> u32 {
        self.line_addr
    }

    /// Advances the refill by one cycle.
    ///
    /// With zero latency every beat completes in the calling cycle.
    pub fn step(&mut self, bus: &mut Bus) -> RefillPoll {
        loop {
            if !self.timer.tick() {
                return RefillPoll::Busy;
            }
            let addr = self.line_addr.wrapping_add(self.beat as u32 * 4);
            match bus.read_u32(addr) {
                Ok(word) => self.buf[self.beat] = word,
                Err(fault) => return RefillPoll::Fault(fault),
            }
            self.beat += 1;
            if self.beat >= self.nwords.min(MAX_LINE_WORDS) {
                return RefillPoll::Done;
            }
            self.timer = Countdown::new(self.latency);
            if self.latency > 0 {
                return RefillPoll::Busy;
            }
        }
    }

    /// The refilled words; meaningful once [`Refill::step`] returned `Done`.
    pub fn words(&self) -> &[u32] {
        &self.buf[..self.nwords.min(MAX_LINE_WORDS)]
    }
}
