//! Common types shared across the core.
//!
//! This module collects the small vocabulary used by every other module:
//! 1. **Traps:** The exception and interrupt taxonomy carried through the pipeline.
//! 2. **Constants:** Instruction-size, alignment and reset constants.

/// Architectural constants (instruction size, NOP encoding, address masks).
pub mod constants;

/// Trap definitions (exceptions and interrupts).
pub mod error;

pub use error::Trap;
