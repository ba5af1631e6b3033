//! Architectural constants.
//!
//! Values that are fixed by the RV32 base ISA or by this core's design and are
//! referenced from several pipeline stages.

/// Size of every instruction in bytes (no compressed extension).
pub const INSTRUCTION_SIZE: u32 = 4;

/// Canonical NOP encoding (`addi x0, x0, 0`).
///
/// Substituted for the instruction word when a fetch faults, so the faulting
/// slot decodes to nothing harmful while it carries its trap to Memory.
pub const NOP: u32 = 0x0000_0013;

/// Mask clearing the two low bits of an address (word alignment).
pub const WORD_ALIGN_MASK: u32 = !0b11;

/// Number of general-purpose registers.
pub const NUM_GPRS: usize = 32;

/// Cycles the iterative divider occupies the Execute stage.
pub const DIVIDER_CYCLES: u32 = 32;

/// Largest supported cache line, in words.
pub const MAX_LINE_WORDS: usize = 16;
