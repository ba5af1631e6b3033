//! Execution units and functional components.
//!
//! This module contains the units the pipeline stages delegate to:
//! 1. **Compute:** The ALU (including multiply/divide) and the branch resolution unit.
//! 2. **Memory ports:** The fetch unit (instruction port + I-cache) and the load/store
//!    unit (data port + D-cache + write buffer).
//! 3. **Control:** The exception unit (trap entry/exit, interrupt arbitration), the
//!    debug unit and its match triggers.

/// Arithmetic Logic Unit for integer and multiply/divide operations.
pub mod alu;

/// Branch Resolution Unit including the static branch predictor.
pub mod bru;

/// L1 cache implementation with replacement policies and line refill.
pub mod cache;

/// Debug unit (halt/resume/step) and match triggers.
pub mod debug;

/// Trap entry/exit and interrupt arbitration.
pub mod exception;

/// Instruction fetch port.
pub mod fetch;

/// Load/Store Unit for memory access operations.
pub mod lsu;

/// Outcome of one cycle of a multi-cycle memory operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress<T> {
    /// The operation completed in this cycle.
    Done(T),
    /// The operation needs more cycles; call again next cycle with the same request.
    Busy,
}
