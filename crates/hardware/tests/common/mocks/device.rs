//! Mock MMIO device.
//!
//! `mockall` cannot mock `Device::name` (it returns a borrowed `str`), so the
//! expectations live on the narrower `Mmio` trait and `MockedDevice` adapts it
//! to the bus.

use mockall::automock;
use rv32im_core::soc::Device;

/// Register-level behaviour of a device, as seen by the bus.
#[automock]
pub trait Mmio {
    fn read(&mut self, offset: u32) -> u32;
    fn write(&mut self, offset: u32, val: u32, mask: u8);
}

/// A bus device whose register accesses are checked by a `MockMmio`.
pub struct MockedDevice {
    base: u32,
    size: u64,
    pub mmio: MockMmio,
}

impl MockedDevice {
    pub fn new(base: u32, size: u64, mmio: MockMmio) -> Self {
        Self { base, size, mmio }
    }
}

impl Device for MockedDevice {
    fn name(&self) -> &str {
        "MOCK"
    }

    fn address_range(&self) -> (u32, u64) {
        (self.base, self.size)
    }

    fn read_u32(&mut self, offset: u32) -> u32 {
        self.mmio.read(offset)
    }

    fn write_u32(&mut self, offset: u32, val: u32, mask: u8) {
        self.mmio.write(offset, val, mask);
    }
}
