//! RISC-V General-Purpose Register File.
//!
//! This module implements the integer register file of the RV32 core. It performs the following:
//! 1. **Storage:** Maintains 32 registers (`x0`-`x31`) of 32 bits each.
//! 2. **Invariant Enforcement:** Register `x0` reads as zero regardless of writes.
//! 3. **Debugging:** Snapshot and formatted dump of the complete register state.
//!
//! Writes happen in Writeback, which runs before Decode within a cycle, so a read
//! that follows a write to the same index in the same cycle observes the new value.

use std::fmt::Write as _;

use crate::common::constants::NUM_GPRS;
use crate::isa::abi;

/// General-Purpose Register file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Gpr {
    regs: [u32; NUM_GPRS],
}

impl Gpr {
    /// Creates a register file with all registers cleared.
    pub const fn new() -> Self {
        Self {
            regs: [0; NUM_GPRS],
        }
    }

    /// Reads a general-purpose register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    ///
    /// # Returns
    ///
    /// The value stored in the register. Register `x0` always returns 0.
    pub const fn read(&self, idx: usize) -> u32 {
        if idx == 0 { 0 } else { self.regs[idx] }
    }

    /// Writes a value to a general-purpose register; writes to `x0` are discarded.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The value to write.
    pub const fn write(&mut self, idx: usize, val: u32) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Returns a copy of all 32 registers, `x0` included.
    pub const fn snapshot(&self) -> [u32; NUM_GPRS] {
        self.regs
    }

    /// Formats the register file as 16 lines of register pairs using ABI names.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for i in (0..NUM_GPRS).step_by(2) {
            let _ = writeln!(
                out,
                "{:>4} (x{:<2}) = {:#010x}   {:>4} (x{:<2}) = {:#010x}",
                abi::name(i),
                i,
                self.read(i),
                abi::name(i + 1),
                i + 1,
                self.read(i + 1)
            );
        }
        out
    }
}
