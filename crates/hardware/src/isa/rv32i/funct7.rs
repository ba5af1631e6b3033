//! RISC-V Base Integer (I) Function Codes (funct7).
//!
//! The `funct7` field (bits 31-25) selects the alternate encodings of R-type
//! operations and of the immediate shifts.

/// Standard encoding (ADD, SRL, SRLI, ...).
pub const DEFAULT: u32 = 0b0000000;
/// Alternate encoding (SUB, SRA, SRAI).
pub const SUB_SRA: u32 = 0b0100000;
/// Multiply/divide extension encoding.
pub const MULDIV: u32 = 0b0000001;
