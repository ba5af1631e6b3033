//! RISC-V architecture-specific components.
//!
//! This module contains the architectural state of the core:
//! 1. **CSRs:** Control and Status Register addresses, field masks and storage.
//! 2. **GPRs:** General-Purpose Register file implementation.

/// Control and Status Register (CSR) definitions and storage.
pub mod csr;

/// General-Purpose Register file implementation.
pub mod gpr;
