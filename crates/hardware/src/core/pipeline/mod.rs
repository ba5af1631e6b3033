//! Instruction pipeline implementation.
//!
//! This module contains the implementation of the six-stage instruction pipeline.
//! It includes the following components:
//! 1. **Hazards:** Operand bypass selection and load-use style interlocks.
//! 2. **Latches:** Inter-stage slots between consecutive stages.
//! 3. **Signals:** Control signals generated during instruction decoding.
//! 4. **Stages:** Address, Fetch, Decode, Execute, Memory and Writeback.

/// Pipeline hazard detection and forwarding logic.
pub mod hazards;

/// Inter-stage pipeline latches (AF, FD, DX, XM, MW).
pub mod latches;

/// Control signals generated during instruction decode.
pub mod signals;

/// Pipeline stage implementations.
pub mod stages;
