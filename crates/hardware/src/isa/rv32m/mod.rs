//! RISC-V Integer Multiply/Divide Extension (RV32M).
//!
//! M-extension instructions share the `OP` major opcode and are selected by
//! `funct7 = 0b0000001`; `funct3` picks the operation.

/// Function code 3 definitions for multiply/divide operations.
pub mod funct3;
