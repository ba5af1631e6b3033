//! Random RV32IM program fragments.
//!
//! Register operands come from `x0..x7` so that dependent instructions are
//! frequent. Memory operands address the data window at [`DATA_BASE`] with
//! naturally aligned offsets, so [`program`] never traps. [`trapping_program`]
//! adds faulting instructions, loops and jumps behind a resuming handler.

use proptest::prelude::*;
use rv32im_core::core::arch::csr;

use crate::common::builder::*;
use crate::common::harness::li;

/// Start of the data window used by loads and stores.
pub const DATA_BASE: u32 = 0x400;

/// Size of the data window in bytes.
pub const DATA_SIZE: u32 = 0x40;

fn reg() -> impl Strategy<Value = u32> {
    0u32..8
}

fn dest() -> impl Strategy<Value = u32> {
    1u32..8
}

fn imm12() -> impl Strategy<Value = i32> {
    -2048i32..2048
}

fn offset(align: u32) -> impl Strategy<Value = i32> {
    (0..DATA_SIZE / align).prop_map(move |slot| (DATA_BASE + slot * align) as i32)
}

/// Register-register ALU and M-extension operations.
pub fn alu_reg() -> impl Strategy<Value = u32> {
    let ops: [fn(u32, u32, u32) -> u32; 18] = [
        add, sub, sll, slt, sltu, xor, srl, sra, or, and, mul, mulh, mulhsu, mulhu, div, divu,
        rem, remu,
    ];
    (0..ops.len(), dest(), reg(), reg()).prop_map(move |(op, rd, rs1, rs2)| ops[op](rd, rs1, rs2))
}

/// Register-immediate ALU operations, `lui` and `auipc`.
pub fn alu_imm() -> impl Strategy<Value = u32> {
    prop_oneof![
        (dest(), reg(), imm12()).prop_map(|(rd, rs1, imm)| addi(rd, rs1, imm)),
        (dest(), reg(), imm12()).prop_map(|(rd, rs1, imm)| slti(rd, rs1, imm)),
        (dest(), reg(), imm12()).prop_map(|(rd, rs1, imm)| sltiu(rd, rs1, imm)),
        (dest(), reg(), imm12()).prop_map(|(rd, rs1, imm)| xori(rd, rs1, imm)),
        (dest(), reg(), imm12()).prop_map(|(rd, rs1, imm)| ori(rd, rs1, imm)),
        (dest(), reg(), imm12()).prop_map(|(rd, rs1, imm)| andi(rd, rs1, imm)),
        (dest(), reg(), 0u32..32).prop_map(|(rd, rs1, sh)| slli(rd, rs1, sh)),
        (dest(), reg(), 0u32..32).prop_map(|(rd, rs1, sh)| srli(rd, rs1, sh)),
        (dest(), reg(), 0u32..32).prop_map(|(rd, rs1, sh)| srai(rd, rs1, sh)),
        (dest(), 0u32..0x10_0000).prop_map(|(rd, imm)| lui(rd, imm)),
        (dest(), 0u32..0x10_0000).prop_map(|(rd, imm)| auipc(rd, imm)),
    ]
}

/// Loads and stores inside the data window, based on `x0`.
pub fn memory() -> impl Strategy<Value = u32> {
    prop_oneof![
        (dest(), offset(4)).prop_map(|(rd, off)| lw(rd, 0, off)),
        (dest(), offset(2)).prop_map(|(rd, off)| lh(rd, 0, off)),
        (dest(), offset(2)).prop_map(|(rd, off)| lhu(rd, 0, off)),
        (dest(), offset(1)).prop_map(|(rd, off)| lb(rd, 0, off)),
        (dest(), offset(1)).prop_map(|(rd, off)| lbu(rd, 0, off)),
        (reg(), offset(4)).prop_map(|(rs2, off)| sw(0, rs2, off)),
        (reg(), offset(2)).prop_map(|(rs2, off)| sh(0, rs2, off)),
        (reg(), offset(1)).prop_map(|(rs2, off)| sb(0, rs2, off)),
    ]
}

/// A conditional branch skipping `skip` instructions forward (patched later).
#[derive(Clone, Copy, Debug)]
pub struct ForwardBranch {
    pub funct: usize,
    pub rs1: u32,
    pub rs2: u32,
    pub skip: usize,
}

impl ForwardBranch {
    /// Encodes the branch at index `at` of a body of `len` instructions; the
    /// target never passes the instruction following the body.
    pub fn encode(self, at: usize, len: usize) -> u32 {
        let ops: [fn(u32, u32, i32) -> u32; 6] = [beq, bne, blt, bge, bltu, bgeu];
        let skip = self.skip.min(len - at);
        ops[self.funct](self.rs1, self.rs2, 4 * skip as i32)
    }
}

/// Instruction slot: a fixed encoding or a forward branch.
#[derive(Clone, Copy, Debug)]
pub enum Slot {
    Plain(u32),
    Branch(ForwardBranch),
}

fn slot() -> impl Strategy<Value = Slot> {
    prop_oneof![
        4 => alu_reg().prop_map(Slot::Plain),
        4 => alu_imm().prop_map(Slot::Plain),
        3 => memory().prop_map(Slot::Plain),
        1 => (0usize..6, reg(), reg(), 1usize..5)
            .prop_map(|(funct, rs1, rs2, skip)| Slot::Branch(ForwardBranch { funct, rs1, rs2, skip })),
    ]
}

/// A program body: registers `x1..x7` seeded with random values, then random slots.
pub fn program(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    (
        prop::array::uniform7(any::<u32>()),
        prop::collection::vec(slot(), 1..max_len),
    )
        .prop_map(|(seeds, slots)| {
            let mut body: Vec<u32> = (1u32..8)
                .zip(seeds)
                .flat_map(|(rd, value)| li(rd, value))
                .collect();
            let len = slots.len();
            body.extend(slots.iter().enumerate().map(|(at, slot)| match *slot {
                Slot::Plain(inst) => inst,
                Slot::Branch(branch) => branch.encode(at, len),
            }));
            body
        })
}

/// Trap handler address used by [`trapping_program`].
pub const HANDLER: u32 = 0x700;

/// Handler that resumes after the trapping instruction.
///
/// It accumulates `mcause` into `x10` and folds `mtval` into `x11`, so every
/// trap leaves its cause and value in the compared register state.
pub fn handler() -> Vec<u32> {
    vec![
        csrrs(8, csr::MEPC, 0),
        addi(8, 8, 4),
        csrrw(0, csr::MEPC, 8),
        csrrs(9, csr::MCAUSE, 0),
        add(10, 10, 9),
        csrrs(9, csr::MTVAL, 0),
        xor(11, 11, 9),
        mret(),
    ]
}

/// Instructions that raise a synchronous exception.
pub fn faulting() -> impl Strategy<Value = u32> {
    let branches: [fn(u32, u32, i32) -> u32; 6] = [beq, bne, blt, bge, bltu, bgeu];
    prop_oneof![
        Just(ecall()),
        Just(ebreak()),
        Just(0u32),
        Just(0xFFFF_FFFF_u32),
        (dest(), 0u32..DATA_SIZE / 4, 1u32..4)
            .prop_map(|(rd, slot, skew)| lw(rd, 0, (DATA_BASE + 4 * slot + skew) as i32)),
        (dest(), 0u32..DATA_SIZE / 2).prop_map(|(rd, slot)| lh(rd, 0, (DATA_BASE + 2 * slot + 1) as i32)),
        (reg(), 0u32..DATA_SIZE / 4, 1u32..4)
            .prop_map(|(rs2, slot, skew)| sw(0, rs2, (DATA_BASE + 4 * slot + skew) as i32)),
        (reg(), 0u32..DATA_SIZE / 2).prop_map(|(rs2, slot)| sh(0, rs2, (DATA_BASE + 2 * slot + 1) as i32)),
        (dest(), 0i32..0x100).prop_map(|(rd, word)| jalr(rd, 0, 4 * word + 2)),
        // Misaligned only when taken.
        (0..branches.len(), reg(), reg()).prop_map(move |(f, rs1, rs2)| branches[f](rs1, rs2, 6)),
    ]
}

fn straight_line() -> impl Strategy<Value = u32> {
    prop_oneof![
        3 => alu_reg(),
        3 => alu_imm(),
        2 => memory(),
        2 => faulting(),
    ]
}

/// A unit of a trapping program; transfers target chunk boundaries.
#[derive(Clone, Debug)]
pub enum Chunk {
    Plain(u32),
    /// Conditional branch over `skip` chunks.
    Branch(ForwardBranch),
    /// `jal rd` over `skip` chunks.
    Jump { rd: u32, skip: usize },
    /// `auipc x15, 0` + `jalr rd, x15` over `skip` chunks.
    IndirectJump { rd: u32, skip: usize },
    /// Counted loop on `x14` closed by a backward `bne`.
    Loop { count: i32, body: Vec<u32> },
}

impl Chunk {
    fn len(&self) -> usize {
        match self {
            Self::Plain(_) | Self::Branch(_) | Self::Jump { .. } => 1,
            Self::IndirectJump { .. } => 2,
            Self::Loop { body, .. } => body.len() + 3,
        }
    }

    const fn skip(&self) -> usize {
        match self {
            Self::Branch(branch) => branch.skip,
            Self::Jump { skip, .. } | Self::IndirectJump { skip, .. } => *skip,
            Self::Plain(_) | Self::Loop { .. } => 0,
        }
    }

    /// Appends the encoding of a chunk starting at word `at` whose transfer
    /// lands on word `target`.
    fn encode(&self, at: usize, target: usize, out: &mut Vec<u32>) {
        let offset = |from: usize| 4 * (target - from) as i32;
        let ops: [fn(u32, u32, i32) -> u32; 6] = [beq, bne, blt, bge, bltu, bgeu];
        match self {
            Self::Plain(inst) => out.push(*inst),
            Self::Branch(b) => out.push(ops[b.funct](b.rs1, b.rs2, offset(at))),
            Self::Jump { rd, .. } => out.push(jal(*rd, offset(at))),
            Self::IndirectJump { rd, .. } => {
                out.push(auipc(15, 0));
                out.push(jalr(*rd, 15, offset(at)));
            }
            Self::Loop { count, body } => {
                out.push(addi(14, 0, *count));
                out.extend_from_slice(body);
                out.push(addi(14, 14, -1));
                out.push(bne(14, 0, -4 * (body.len() as i32 + 1)));
            }
        }
    }
}

fn chunk() -> impl Strategy<Value = Chunk> {
    prop_oneof![
        6 => straight_line().prop_map(Chunk::Plain),
        1 => (0usize..6, reg(), reg(), 0usize..4)
            .prop_map(|(funct, rs1, rs2, skip)| Chunk::Branch(ForwardBranch { funct, rs1, rs2, skip })),
        1 => (dest(), 0usize..4).prop_map(|(rd, skip)| Chunk::Jump { rd, skip }),
        1 => (dest(), 0usize..4).prop_map(|(rd, skip)| Chunk::IndirectJump { rd, skip }),
        1 => (1i32..5, prop::collection::vec(straight_line(), 1..5))
            .prop_map(|(count, body)| Chunk::Loop { count, body }),
    ]
}

/// A program that installs [`HANDLER`] in `mtvec`, seeds `x1..x7` and then
/// mixes faulting instructions, counted backward loops, forward branches and
/// direct and indirect jumps.
pub fn trapping_program(max_chunks: usize) -> impl Strategy<Value = Vec<u32>> {
    (
        prop::array::uniform7(any::<u32>()),
        prop::collection::vec(chunk(), 1..max_chunks),
    )
        .prop_map(|(seeds, chunks)| {
            let mut body = vec![addi(13, 0, HANDLER as i32), csrrw(0, csr::MTVEC, 13)];
            body.extend((1u32..8).zip(seeds).flat_map(|(rd, value)| li(rd, value)));
            let mut starts = Vec::with_capacity(chunks.len() + 1);
            let mut at = body.len();
            for chunk in &chunks {
                starts.push(at);
                at += chunk.len();
            }
            starts.push(at);
            for (i, chunk) in chunks.iter().enumerate() {
                let target = starts[(i + 1 + chunk.skip()).min(chunks.len())];
                chunk.encode(starts[i], target, &mut body);
            }
            body
        })
}
