//! Simulation driver and program loading.
//!
//! 1. **Simulator:** Builds the system from a configuration and runs the core.
//! 2. **Loader:** Reads raw and ELF program images.
//! 3. **Errors:** `SimError` for everything that can fail outside the core.

/// Simulator error type.
pub mod error;

/// Raw binary and ELF program loading.
pub mod loader;

/// Top-level simulator driver.
pub mod simulator;

pub use error::SimError;
pub use simulator::{RunOutcome, Simulator};
