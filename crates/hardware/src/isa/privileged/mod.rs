//! Privileged Architecture Definitions.
//!
//! Defines constants for the machine-mode subset of the RISC-V Privileged
//! Specification implemented by this core.
//!
//! # Modules
//!
//! - `cause`: Exception and Interrupt cause codes.
//! - `opcodes`: System instruction encodings (ECALL, EBREAK, MRET, WFI) and CSR funct3.

/// Exception and interrupt cause code definitions.
pub mod cause;

/// System instruction encodings and CSR access function codes.
pub mod opcodes;
