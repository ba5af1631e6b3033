//! System interconnect (bus) for memory and MMIO access.
//!
//! This module implements the bus that routes addresses to devices. It provides:
//! 1. **Device registration:** Devices are added by address range and sorted for lookup.
//! 2. **Access routing:** Word reads and masked word writes; unclaimed addresses fault.
//! 3. **Timing:** The per-beat wait latency and the `Countdown` used by every bus master.
//! 4. **Loading:** Byte-granular program loading and inspection for the simulator.

use std::fmt;

use thiserror::Error;

use super::traits::Device;
use crate::common::constants::WORD_ALIGN_MASK;

/// A transfer to an address no device claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("bus fault at {addr:#010x}")]
pub struct BusFault {
    /// Address of the failed transfer.
    pub addr: u32,
}

/// Wait-state counter for one bus beat.
///
/// A beat started with latency `n` completes on the `n + 1`-th call to [`Countdown::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Countdown(u32);

impl Countdown {
    /// Starts a beat with `latency` wait cycles.
    pub const fn new(latency: u32) -> Self {
        Self(latency)
    }

    /// Consumes one cycle; returns `true` when the transfer happens in this cycle.
    pub const fn tick(&mut self) -> bool {
        if self.0 == 0 {
            true
        } else {
            self.0 -= 1;
            false
        }
    }
}

/// System bus connecting both memory ports of the core to the devices.
pub struct Bus {
    devices: Vec<Box<dyn Device>>,
    latency: u32,
    last_device_idx: usize,
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("devices", &self.device_names())
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl Bus {
    /// Creates a new bus with the given latency.
    ///
    /// # Arguments
    ///
    /// * `latency` - Wait cycles per beat.
    ///
    /// # Returns
    ///
    /// An empty bus with no devices; add devices with `add_device`.
    pub fn new(latency: u32) -> Self {
        Self {
            devices: Vec::new(),
            latency,
            last_device_idx: 0,
        }
    }

    /// Wait cycles per beat.
    pub const fn latency(&self) -> u32 {
        self.latency
    }

    /// Registers a device on the bus; devices are sorted by base address for lookup.
    ///
    /// # Arguments
    ///
    /// * `dev` - The device to add.
    pub fn add_device(&mut self, dev: Box<dyn Device>) {
        self.devices.push(dev);
        self.devices.sort_by_key(|d| d.address_range().0);
        self.last_device_idx = 0;
    }

    /// Names of the registered devices, in address order.
    pub fn device_names(&self) -> Vec<&str> {
        self.devices.iter().map(|d| d.name()).collect()
    }

    fn find_device(&mut self, addr: u32) -> Option<(&mut Box<dyn Device>, u32)> {
        let claims = |dev: &dyn Device| {
            let (start, size) = dev.address_range();
            let addr = u64::from(addr);
            addr >= u64::from(start) && addr < u64::from(start) + size
        };
        let idx = if self
            .devices
            .get(self.last_device_idx)
            .is_some_and(|d| claims(d.as_ref()))
        {
            self.last_device_idx
        } else {
            let idx = self.devices.iter().position(|d| claims(d.as_ref()))?;
            self.last_device_idx = idx;
            idx
        };
        let dev = &mut self.devices[idx];
        let offset = addr - dev.address_range().0;
        Some((dev, offset))
    }

    /// Returns whether the given address is backed by any device.
    pub fn is_valid_address(&mut self, addr: u32) -> bool {
        self.find_device(addr).is_some()
    }

    /// Reads the aligned word containing `addr`.
    ///
    /// # Returns
    ///
    /// The word, or a `BusFault` if no device claims the address.
    pub fn read_u32(&mut self, addr: u32) -> Result<u32, BusFault> {
        let addr = addr & WORD_ALIGN_MASK;
        self.find_device(addr)
            .map(|(dev, offset)| dev.read_u32(offset))
            .ok_or(BusFault { addr })
    }

    /// Writes the bytes of `val` selected by `mask` into the aligned word containing `addr`.
    ///
    /// # Returns
    ///
    /// `Ok(())`, or a `BusFault` if no device claims the address.
    pub fn write_u32(&mut self, addr: u32, val: u32, mask: u8) -> Result<(), BusFault> {
        let addr = addr & WORD_ALIGN_MASK;
        let (dev, offset) = self.find_device(addr).ok_or(BusFault { addr })?;
        dev.write_u32(offset, val, mask);
        Ok(())
    }

    /// Writes a byte slice starting at `addr`, bypassing timing.
    ///
    /// # Returns
    ///
    /// `Ok(())`, or the first address no device claims.
    pub fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), BusFault> {
        for (i, byte) in data.iter().enumerate() {
            let a = addr.wrapping_add(i as u32);
            let lane = a & 0b11;
            self.write_u32(a, u32::from(*byte) << (lane * 8), 1 << lane)?;
        }
        Ok(())
    }

    /// Reads `len` bytes starting at `addr`, bypassing timing.
    pub fn read_bytes(&mut self, addr: u32, len: usize) -> Result<Vec<u8>, BusFault> {
        (0..len)
            .map(|i| {
                let a = addr.wrapping_add(i as u32);
                self.read_u32(a).map(|w| (w >> ((a & 0b11) * 8)) as u8)
            })
            .collect()
    }

    /// Returns the exit code reported by any device, if one has requested termination.
    pub fn exit_code(&self) -> Option<u32> {
        self.devices.iter().find_map(|d| d.exit_code())
    }
}
