//! Instruction fields.
//!
//! Field accessors over a raw 32-bit encoding, and the `Decoded` record that
//! [`crate::isa::decode::decode`] builds from them.

/// Extracts `width` bits of `inst` starting at bit `lo`.
#[inline(always)]
pub(crate) const fn field(inst: u32, lo: u32, width: u32) -> u32 {
    (inst >> lo) & ((1 << width) - 1)
}

/// Field accessors for a raw RV32 instruction word.
pub trait InstructionBits {
    /// Major opcode, bits 6:0.
    fn opcode(&self) -> u32;

    /// Destination register, bits 11:7.
    fn rd(&self) -> usize;

    /// First source register, bits 19:15. Also the 5-bit `zimm` of immediate CSR forms.
    fn rs1(&self) -> usize;

    /// Second source register, bits 24:20.
    fn rs2(&self) -> usize;

    /// Minor opcode, bits 14:12.
    fn funct3(&self) -> u32;

    /// Bits 31:25; separates ADD/SUB, SRL/SRA and the M extension within `OP`.
    fn funct7(&self) -> u32;

    /// CSR address of a SYSTEM instruction, bits 31:20.
    fn csr(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        field(*self, 0, 7)
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        field(*self, 7, 5) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        field(*self, 15, 5) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        field(*self, 20, 5) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        field(*self, 12, 3)
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        field(*self, 25, 7)
    }

    #[inline(always)]
    fn csr(&self) -> u32 {
        field(*self, 20, 12)
    }
}

/// An instruction split into its fields.
///
/// `imm` is the sign-extended immediate of the instruction's format, or 0 for
/// formats without one (R-type, SYSTEM).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Raw 32-bit instruction encoding.
    pub raw: u32,
    /// Major opcode.
    pub opcode: u32,
    /// Destination register index.
    pub rd: usize,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// Minor opcode.
    pub funct3: u32,
    /// R-type function field.
    pub funct7: u32,
    /// Sign-extended immediate.
    pub imm: i32,
}
