//! Device trait for memory-mapped I/O.
//!
//! This module defines the `Device` trait implemented by all bus-attached components. It provides:
//! 1. **Identification:** `name` and `address_range` for bus routing.
//! 2. **Access:** Word reads and byte-masked word writes at device-relative offsets.
//! 3. **Termination:** Optional exit code reporting for devices that end a simulation.

/// Trait for memory-mapped I/O devices attached to the system bus.
///
/// Both memory ports of the core issue 32-bit, word-aligned transfers; sub-word
/// stores select their bytes through the write mask.
pub trait Device {
    /// Returns a short name for this device (e.g., `"RAM"`, `"FINISHER"`).
    fn name(&self) -> &str;

    /// Returns (base_address, size_in_bytes) of this device's region.
    fn address_range(&self) -> (u32, u64);

    /// Reads the word at the given word-aligned, device-relative offset.
    fn read_u32(&mut self, offset: u32) -> u32;

    /// Writes the bytes of `val` selected by `mask` (bit `i` = byte `i`) at the given offset.
    fn write_u32(&mut self, offset: u32, val: u32, mask: u8);

    /// Returns the exit code once this device has requested the end of the simulation.
    fn exit_code(&self) -> Option<u32> {
        None
    }
}
