//! RISC-V Base Integer (I) Major Opcodes.
//!
//! The 7-bit opcode field (bits 6-0) selects the instruction format and the
//! functional unit that executes it.

/// Load Upper Immediate (U-type).
pub const OP_LUI: u32 = 0b0110111;
/// Add Upper Immediate to PC (U-type).
pub const OP_AUIPC: u32 = 0b0010111;
/// Jump and Link (J-type).
pub const OP_JAL: u32 = 0b1101111;
/// Jump and Link Register (I-type).
pub const OP_JALR: u32 = 0b1100111;
/// Conditional branches (B-type).
pub const OP_BRANCH: u32 = 0b1100011;
/// Loads (I-type).
pub const OP_LOAD: u32 = 0b0000011;
/// Stores (S-type).
pub const OP_STORE: u32 = 0b0100011;
/// Register-immediate ALU operations (I-type).
pub const OP_IMM: u32 = 0b0010011;
/// Register-register ALU operations (R-type), including the M extension.
pub const OP_REG: u32 = 0b0110011;
/// FENCE and FENCE.I.
pub const OP_MISC_MEM: u32 = 0b0001111;
/// CSR access, ECALL, EBREAK, MRET, WFI.
pub const OP_SYSTEM: u32 = 0b1110011;
