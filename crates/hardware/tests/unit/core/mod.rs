//! # Core Tests
//!
//! Whole-program tests of the core's architectural behaviour.



/// Interrupt sampling, masking and precise entry.
pub mod interrupts;

/// Pipeline timing: hazards, bypasses and branch handling.
pub mod pipeline;
