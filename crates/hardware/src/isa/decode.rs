//! Instruction Field Decoder.
//!
//! Splits an encoding into a [`Decoded`] record. The immediate is gathered
//! according to the format implied by the major opcode:
//! 1. **I:** `inst[31:20]`.
//! 2. **S:** `inst[31:25] | inst[11:7]`.
//! 3. **B:** `inst[31] | inst[7] | inst[30:25] | inst[11:8]`, in units of two bytes.
//! 4. **U:** `inst[31:12]`, already in the upper 20 bits.
//! 5. **J:** `inst[31] | inst[19:12] | inst[20] | inst[30:21]`, in units of two bytes.
//!
//! Opcode legality is not checked here; the Decode stage rejects unknown encodings.

use crate::isa::instruction::{Decoded, InstructionBits, field};
use crate::isa::rv32i::opcodes;

/// Immediate layout of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// No immediate (register-register and SYSTEM).
    R,
    /// Loads, JALR and register-immediate ALU operations.
    I,
    /// Stores.
    S,
    /// Conditional branches.
    B,
    /// LUI and AUIPC.
    U,
    /// JAL.
    J,
}

impl Format {
    /// Format implied by a major opcode.
    pub const fn of(opcode: u32) -> Self {
        match opcode {
            opcodes::OP_IMM | opcodes::OP_LOAD | opcodes::OP_JALR => Self::I,
            opcodes::OP_STORE => Self::S,
            opcodes::OP_BRANCH => Self::B,
            opcodes::OP_LUI | opcodes::OP_AUIPC => Self::U,
            opcodes::OP_JAL => Self::J,
            _ => Self::R,
        }
    }

    /// Gathers and sign-extends the immediate of `inst` in this format.
    pub const fn immediate(self, inst: u32) -> i32 {
        match self {
            Self::R => 0,
            Self::I => (inst as i32) >> 20,
            Self::S => sign_extend((field(inst, 25, 7) << 5) | field(inst, 7, 5), 12),
            Self::B => sign_extend(
                (field(inst, 31, 1) << 12)
                    | (field(inst, 7, 1) << 11)
                    | (field(inst, 25, 6) << 5)
                    | (field(inst, 8, 4) << 1),
                13,
            ),
            Self::U => (inst & 0xFFFF_F000) as i32,
            Self::J => sign_extend(
                (field(inst, 31, 1) << 20)
                    | (field(inst, 12, 8) << 12)
                    | (field(inst, 20, 1) << 11)
                    | (field(inst, 21, 10) << 1),
                21,
            ),
        }
    }
}

/// Sign-extends the low `width` bits of `val`.
const fn sign_extend(val: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((val << shift) as i32) >> shift
}

/// Decodes a RISC-V instruction into its component fields.
///
/// # Arguments
///
/// * `inst` - The 32-bit instruction encoding.
///
/// # Returns
///
/// The register indices, function codes and sign-extended immediate of `inst`.
pub fn decode(inst: u32) -> Decoded {
    let opcode = inst.opcode();
    Decoded {
        raw: inst,
        opcode,
        rd: inst.rd(),
        rs1: inst.rs1(),
        rs2: inst.rs2(),
        funct3: inst.funct3(),
        funct7: inst.funct7(),
        imm: Format::of(opcode).immediate(inst),
    }
}
