//! Write Buffer for deferred stores.
//!
//! Stores to the data cache's region are retired into this FIFO and written to the
//! bus later, independently of the pipeline. The buffer provides:
//! 1. **Enqueue:** A committing store takes the tail slot; a full buffer back-pressures Memory.
//! 2. **Forwarding:** Loads search the buffer from newest to oldest before touching memory.
//! 3. **Drain:** The head entry is written to the bus, one entry per bus transfer, in
//!    strict FIFO order.

use crate::soc::{Bus, BusFault, Countdown};

/// Result of store-to-load forwarding check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardResult {
    /// A pending store covers every byte of the load; the word carries those bytes.
    Hit(u32),
    /// No overlap with any pending store; safe to read from memory.
    Miss,
    /// Partial overlap; the load must wait until the store drains.
    Stall,
}

/// Completion state of a write buffer entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WriteState {
    /// Waiting for the bus.
    #[default]
    Pending,
    /// Bus transfer started; completes when the countdown expires.
    InFlight(Countdown),
}

/// A single entry in the write buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteBufferEntry {
    /// Word-aligned target address.
    pub addr: u32,
    /// Store data, already placed in its byte lanes.
    pub data: u32,
    /// Byte-enable mask (bit `i` = byte `i` of the word).
    pub mask: u8,
    /// Current lifecycle state.
    pub state: WriteState,
}

/// Outcome of one drain cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainEvent {
    /// Buffer empty.
    Idle,
    /// Head entry waiting on the bus.
    Waiting,
    /// Head entry written and removed.
    Done(WriteBufferEntry),
    /// Head entry faulted on the bus and was removed.
    Faulted(WriteBufferEntry, BusFault),
}

/// Write buffer; a FIFO ring of pending stores.
#[derive(Clone, Debug)]
pub struct WriteBuffer {
    entries: Vec<WriteBufferEntry>,
    /// Index of the oldest entry.
    head: usize,
    /// Index where the next entry will be written.
    tail: usize,
    /// Number of valid entries.
    count: usize,
}

impl WriteBuffer {
    /// Creates an empty write buffer with the given capacity (at least one entry).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![WriteBufferEntry::default(); capacity.max(1)],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Returns the capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the write buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the write buffer is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Appends a store. Returns false if the buffer is full.
    ///
    /// # Arguments
    ///
    /// * `addr` - Target address (the low two bits are ignored).
    /// * `data` - Word with the store bytes in their lanes.
    /// * `mask` - Byte-enable mask.
    pub fn push(&mut self, addr: u32, data: u32, mask: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries[self.tail] = WriteBufferEntry {
            addr: addr & !0b11,
            data,
            mask,
            state: WriteState::Pending,
        };
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        true
    }

    /// Iterates over the entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &WriteBufferEntry> {
        let cap = self.entries.len();
        (0..self.count).map(move |i| &self.entries[(self.head + i) % cap])
    }

    /// Attempts store-to-load forwarding.
    ///
    /// The newest entry touching any byte of the load decides: it forwards if it
    /// covers every loaded byte, otherwise the load stalls.
    ///
    /// # Arguments
    ///
    /// * `addr` - Load address (the low two bits are ignored).
    /// * `mask` - Byte-enable mask of the load.
    pub fn forward_load(&self, addr: u32, mask: u8) -> ForwardResult {
        let addr = addr & !0b11;
        for entry in self.iter().rev() {
            if entry.addr == addr && entry.mask & mask != 0 {
                return if entry.mask & mask == mask {
                    ForwardResult::Hit(entry.data)
                } else {
                    ForwardResult::Stall
                };
            }
        }
        ForwardResult::Miss
    }

    /// Advances the drain machine by one cycle.
    ///
    /// The head entry is started on the bus with the bus latency and written when
    /// its countdown expires; it is removed whether or not the write faulted.
    pub fn step(&mut self, bus: &mut Bus) -> DrainEvent {
        if self.is_empty() {
            return DrainEvent::Idle;
        }
        let head = &mut self.entries[self.head];
        if head.state == WriteState::Pending {
            head.state = WriteState::InFlight(Countdown::new(bus.latency()));
        }
        if let WriteState::InFlight(timer) = &mut head.state
            && !timer.tick()
        {
            return DrainEvent::Waiting;
        }
        let entry = *head;
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        match bus.write_u32(entry.addr, entry.data, entry.mask) {
            Ok(()) => DrainEvent::Done(entry),
            Err(fault) => DrainEvent::Faulted(entry, fault),
        }
    }
}
