//! Pipeline control signals and operation types.
//!
//! This module defines the signals Decode generates for every instruction. It performs:
//! 1. **Operation Classification:** Categorizes ALU, CSR and system operations.
//! 2. **Operand Selection:** Defines sources for ALU inputs (registers, PC, or immediates).
//! 3. **Memory Control:** Specifies access widths and sign-extension requirements.
//! 4. **Result Timing:** Records the stage at which the result becomes forwardable.

/// ALU operation types for RV32IM instructions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AluOp {
    /// Default value; also used for address generation and link values.
    #[default]
    Add,

    /// Integer subtraction.
    Sub,

    /// Shift left logical.
    Sll,

    /// Set less than (signed).
    Slt,

    /// Set less than unsigned.
    Sltu,

    /// Bitwise XOR.
    Xor,

    /// Shift right logical.
    Srl,

    /// Shift right arithmetic.
    Sra,

    /// Bitwise OR.
    Or,

    /// Bitwise AND.
    And,

    /// Integer multiply (low bits).
    Mul,

    /// Integer multiply (high bits, signed × signed).
    Mulh,

    /// Integer multiply (high bits, signed × unsigned).
    Mulhsu,

    /// Integer multiply (high bits, unsigned × unsigned).
    Mulhu,

    /// Integer divide (signed).
    Div,

    /// Integer divide (unsigned).
    Divu,

    /// Integer remainder (signed).
    Rem,

    /// Integer remainder (unsigned).
    Remu,
}

impl AluOp {
    /// Returns `true` for the operations executed by the iterative divider.
    pub const fn is_divide(self) -> bool {
        matches!(self, Self::Div | Self::Divu | Self::Rem | Self::Remu)
    }
}

/// Memory access width for load and store operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemWidth {
    /// No memory operation.
    #[default]
    Nop,

    /// 8-bit byte access.
    Byte,

    /// 16-bit half-word access.
    Half,

    /// 32-bit word access.
    Word,
}

impl MemWidth {
    /// Access size in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Nop => 0,
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }

    /// Byte-enable mask of an access at `addr` within its 32-bit word.
    pub const fn byte_mask(self, addr: u32) -> u8 {
        let lanes: u8 = match self {
            Self::Nop => 0,
            Self::Byte => 0b0001,
            Self::Half => 0b0011,
            Self::Word => 0b1111,
        };
        lanes << (addr & 0b11)
    }

    /// Returns `true` if `addr` is naturally aligned for this width.
    pub const fn is_aligned(self, addr: u32) -> bool {
        match self {
            Self::Nop | Self::Byte => true,
            Self::Half => addr & 0b1 == 0,
            Self::Word => addr & 0b11 == 0,
        }
    }
}

/// Source for ALU operand A.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpASrc {
    /// Use `rs1` register value.
    #[default]
    Reg1,

    /// Use program counter value.
    Pc,

    /// Use zero.
    Zero,
}

/// Source for ALU operand B.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpBSrc {
    /// Use sign-extended immediate value.
    #[default]
    Imm,

    /// Use `rs2` register value.
    Reg2,

    /// Use the instruction size (link value of `JAL`/`JALR`).
    Four,
}

/// CSR (Control and Status Register) operation type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CsrOp {
    /// No CSR operation.
    #[default]
    None,

    /// CSR read-write (`CSRRW`).
    Rw,

    /// CSR read-set (`CSRRS`).
    Rs,

    /// CSR read-clear (`CSRRC`).
    Rc,

    /// CSR read-write immediate (`CSRRWI`).
    Rwi,

    /// CSR read-set immediate (`CSRRSI`).
    Rsi,

    /// CSR read-clear immediate (`CSRRCI`).
    Rci,
}

impl CsrOp {
    /// Returns `true` for the immediate forms, whose source operand is the `rs1` field itself.
    pub const fn uses_immediate(self) -> bool {
        matches!(self, Self::Rwi | Self::Rsi | Self::Rci)
    }
}

/// System operations completed by the Memory stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SystemOp {
    /// Not a system operation.
    #[default]
    None,

    /// `EBREAK`: breakpoint exception or debug halt.
    Ebreak,

    /// `MRET`: return from a machine-mode trap.
    Mret,

    /// `WFI`: implemented as a no-op.
    Wfi,

    /// `FENCE`: memory ordering is already program order; a no-op.
    Fence,

    /// `FENCE.I`: drain stores, invalidate caches and refetch.
    FenceI,
}

/// Stage at the end of which an instruction's result can be forwarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ResultStage {
    /// Available from Execute (adds, logic, upper immediates, link values).
    #[default]
    Execute,

    /// Available from Memory (compares, shifts, divides).
    Memory,

    /// Available only from Writeback (loads, multiplies, CSR reads).
    Writeback,
}

/// Control signals for pipeline stage execution.
///
/// Contains all signals generated during instruction decode that control execution
/// and memory access throughout the pipeline stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlSignals {
    /// Enable write to the destination register.
    pub reg_write: bool,
    /// Instruction reads `rs1`.
    pub reads_rs1: bool,
    /// Instruction reads `rs2`.
    pub reads_rs2: bool,
    /// Enable memory read operation (load).
    pub mem_read: bool,
    /// Enable memory write operation (store).
    pub mem_write: bool,
    /// Instruction is a conditional branch.
    pub branch: bool,
    /// Instruction is an unconditional jump (`JAL`/`JALR`).
    pub jump: bool,
    /// Jump target is register-relative (`JALR`).
    pub indirect: bool,
    /// Width of memory access.
    pub width: MemWidth,
    /// Load should be sign-extended.
    pub signed_load: bool,
    /// ALU operation to perform.
    pub alu: AluOp,
    /// Source selection for ALU operand A.
    pub a_src: OpASrc,
    /// Source selection for ALU operand B.
    pub b_src: OpBSrc,
    /// CSR operation type.
    pub csr_op: CsrOp,
    /// CSR address for CSR operations.
    pub csr_addr: u32,
    /// System operation completed in Memory.
    pub system: SystemOp,
    /// Stage from which the result can be forwarded.
    pub result_stage: ResultStage,
}
