//! System-on-Chip (SoC) Components.
//!
//! This module organizes the components around the core: the bus both memory
//! ports are attached to, RAM, the memory-mapped devices, and the interrupt lines.

/// Memory-mapped I/O device implementations.
pub mod devices;

/// System bus interconnect, bus faults and transfer timing.
pub mod interconnect;

/// Interrupt input lines of the core.
pub mod irq;

/// Simulated RAM.
pub mod memory;

/// Device trait definitions for MMIO access.
pub mod traits;

pub use interconnect::{Bus, BusFault, Countdown};
pub use irq::{Interrupt, IrqLines};
pub use memory::Memory;
pub use traits::Device;
