//! Memory-mapped devices.
//!
//! The only device besides RAM is the finisher, which lets a program end the
//! simulation with an exit code.

/// Simulation exit device.
pub mod finisher;

pub use finisher::Finisher;
