//! Finisher device.
//!
//! A single write-only register: storing a word to it ends the simulation and
//! reports the stored value as the exit code (0 conventionally means success).
//!
//! # Registers
//!
//! * `0x00`: Exit code (write only, reads as 0)

use crate::soc::traits::Device;

/// Size of the finisher's address window.
const FINISHER_SIZE: u64 = 0x10;

/// Finisher device structure.
#[derive(Debug)]
pub struct Finisher {
    base_addr: u32,
    exit_code: Option<u32>,
}

impl Finisher {
    /// Creates a finisher mapped at `base_addr`.
    pub const fn new(base_addr: u32) -> Self {
        Self {
            base_addr,
            exit_code: None,
        }
    }
}

impl Device for Finisher {
    fn name(&self) -> &str {
        "FINISHER"
    }

    fn address_range(&self) -> (u32, u64) {
        (self.base_addr, FINISHER_SIZE)
    }

    fn read_u32(&mut self, _offset: u32) -> u32 {
        0
    }

    fn write_u32(&mut self, offset: u32, val: u32, mask: u8) {
        if offset == 0 && mask != 0 && self.exit_code.is_none() {
            self.exit_code = Some(val);
        }
    }

    fn exit_code(&self) -> Option<u32> {
        self.exit_code
    }
}
