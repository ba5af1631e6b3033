//! Core processor implementation.
//!
//! This module contains the CPU and everything inside it:
//! 1. **Architecture:** The register file and the machine-mode CSR file.
//! 2. **CPU:** The central state structure, tick orchestration, traps and the debug interface.
//! 3. **Pipeline:** Latches, hazards, control signals and the six stages.
//! 4. **Units:** ALU, branch unit, caches, fetch unit, load/store unit, exceptions and debug.

/// Architectural state (CSR file, general-purpose registers).
pub mod arch;

/// CPU core implementation and execution orchestration.
pub mod cpu;

/// Instruction pipeline implementation (stages, latches, hazards, signals).
pub mod pipeline;

/// Functional units (ALU, branch unit, caches, memory ports, exceptions, debug).
pub mod units;

pub use self::cpu::Cpu;
