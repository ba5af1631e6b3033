//! Simulated RAM.
//!
//! A flat, zero-initialized byte array mapped at a base address. Accesses are
//! little-endian; the write mask selects which bytes of a word are updated.

use std::fmt;

use super::traits::Device;

/// RAM device.
pub struct Memory {
    data: Vec<u8>,
    base_addr: u32,
}

impl Memory {
    /// Creates a zero-filled RAM.
    ///
    /// # Arguments
    ///
    /// * `base_addr` - Starting address.
    /// * `size` - Size in bytes, rounded up to whole words.
    pub fn new(base_addr: u32, size: usize) -> Self {
        Self {
            data: vec![0; size.next_multiple_of(4)],
            base_addr,
        }
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("base_addr", &format_args!("{:#010x}", self.base_addr))
            .field("size", &self.data.len())
            .finish()
    }
}

impl Device for Memory {
    fn name(&self) -> &str {
        "RAM"
    }

    fn address_range(&self) -> (u32, u64) {
        (self.base_addr, self.data.len() as u64)
    }

    fn read_u32(&mut self, offset: u32) -> u32 {
        let o = offset as usize;
        let mut bytes = [0u8; 4];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = self.data.get(o + i).copied().unwrap_or(0);
        }
        u32::from_le_bytes(bytes)
    }

    fn write_u32(&mut self, offset: u32, val: u32, mask: u8) {
        let o = offset as usize;
        for (i, byte) in val.to_le_bytes().iter().enumerate() {
            if mask & (1 << i) != 0
                && let Some(slot) = self.data.get_mut(o + i)
            {
                *slot = *byte;
            }
        }
    }
}
