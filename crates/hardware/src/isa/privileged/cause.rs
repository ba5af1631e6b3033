//! RISC-V Trap Cause Codes.
//!
//! This module defines the cause codes used in the `mcause` Control and Status
//! Register. Bit 31 indicates whether the trap is an interrupt (1) or an
//! exception (0); the constants below hold the code without that bit.

/// Interrupt definitions.
pub mod interrupt {
    /// Interrupt flag in `mcause` (bit 31 on RV32).
    pub const INTERRUPT_BIT: u32 = 0x8000_0000;

    /// Machine software interrupt (3).
    pub const MACHINE_SOFTWARE: u32 = 3;

    /// Machine timer interrupt (7).
    pub const MACHINE_TIMER: u32 = 7;

    /// Machine external interrupt (11).
    pub const MACHINE_EXTERNAL: u32 = 11;
}

/// Exception definitions.
pub mod exception {
    /// Instruction address misaligned (0).
    pub const INSTRUCTION_ADDRESS_MISALIGNED: u32 = 0;
    /// Instruction access fault (1).
    pub const INSTRUCTION_ACCESS_FAULT: u32 = 1;
    /// Illegal instruction (2).
    pub const ILLEGAL_INSTRUCTION: u32 = 2;
    /// Breakpoint (3).
    pub const BREAKPOINT: u32 = 3;
    /// Load address misaligned (4).
    pub const LOAD_ADDRESS_MISALIGNED: u32 = 4;
    /// Load access fault (5).
    pub const LOAD_ACCESS_FAULT: u32 = 5;
    /// Store address misaligned (6).
    pub const STORE_ADDRESS_MISALIGNED: u32 = 6;
    /// Store access fault (7).
    pub const STORE_ACCESS_FAULT: u32 = 7;
    /// Environment call from M-mode (11).
    pub const ENVIRONMENT_CALL_FROM_M_MODE: u32 = 11;
}
