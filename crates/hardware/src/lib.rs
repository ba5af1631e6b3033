//! Cycle-level model of a configurable RV32IM processor core.
//!
//! This crate implements a six-stage in-order RISC-V pipeline with the following:
//! 1. **Core:** Address, Fetch, Decode, Execute, Memory and Writeback stages with operand
//!    bypass, load-use interlocks and a static branch predictor.
//! 2. **Memory:** Optional set-associative instruction and data caches and a FIFO write
//!    buffer that drains stores to the bus independently of the pipeline.
//! 3. **Privileged:** Machine-mode CSRs, precise exceptions and three interrupt lines.
//! 4. **Debug:** Optional halt/resume/step control and match triggers.
//! 5. **Simulation:** Configuration, bus and RAM, program loading and statistics.

/// Common types and constants (traps, instruction constants).
pub mod common;
/// Core configuration (defaults, cache geometry, validation).
pub mod config;
/// CPU core (architectural state, pipeline, functional units).
pub mod core;
/// Instruction set (field extraction, opcode tables, privileged encodings).
pub mod isa;
/// Simulation driver, program loader and error type.
pub mod sim;
/// System-on-chip (bus, RAM, devices).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main CPU type; holds the pipeline latches, caches, CSRs and stats.
pub use crate::core::Cpu;
/// Top-level simulator wrapping a `Cpu`.
pub use crate::sim::Simulator;
