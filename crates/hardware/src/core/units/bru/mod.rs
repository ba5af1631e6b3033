//! Branch resolution unit (BRU).
//!
//! This module contains the control-flow logic of the core:
//! 1. **Prediction:** The `BranchPredictor` trait and the static predictor used by Decode.
//! 2. **Resolution:** Condition evaluation and target computation used by Execute.

pub use self::branch_predictor::{BranchKind, BranchPredictor};
pub use self::static_bp::StaticPredictor;

/// Branch predictor trait and common functionality.
pub mod branch_predictor;

/// Static branch predictor (backward taken, forward not taken).
pub mod static_bp;

use crate::common::constants::INSTRUCTION_SIZE;
use crate::isa::rv32i::funct3;

/// Evaluates the condition of a conditional branch.
///
/// # Arguments
///
/// * `funct3` - Branch condition field of the instruction.
/// * `a` - Value of `rs1`.
/// * `b` - Value of `rs2`.
///
/// # Returns
///
/// `true` if the branch is taken. Reserved encodings are never taken.
pub const fn condition(funct3: u32, a: u32, b: u32) -> bool {
    match funct3 {
        funct3::BEQ => a == b,
        funct3::BNE => a != b,
        funct3::BLT => (a as i32) < (b as i32),
        funct3::BGE => (a as i32) >= (b as i32),
        funct3::BLTU => a < b,
        funct3::BGEU => a >= b,
        _ => false,
    }
}

/// Outcome of a resolved branch or jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Whether control transfers to `target`.
    pub taken: bool,
    /// Destination when taken.
    pub target: u32,
}

impl Resolution {
    /// Address of the next instruction in program order.
    pub const fn next_pc(&self, pc: u32) -> u32 {
        if self.taken {
            self.target
        } else {
            pc.wrapping_add(INSTRUCTION_SIZE)
        }
    }
}

/// Resolves a branch or jump once its operands are known.
///
/// # Arguments
///
/// * `kind` - Branch class.
/// * `funct3` - Condition field (conditional branches only).
/// * `pc` - Address of the branch.
/// * `imm` - Sign-extended immediate.
/// * `a` - Value of `rs1` (base of `JALR`).
/// * `b` - Value of `rs2`.
pub const fn resolve(kind: BranchKind, funct3: u32, pc: u32, imm: i32, a: u32, b: u32) -> Resolution {
    match kind {
        BranchKind::Jal => Resolution {
            taken: true,
            target: pc.wrapping_add_signed(imm),
        },
        BranchKind::Jalr => Resolution {
            taken: true,
            target: a.wrapping_add_signed(imm) & !1,
        },
        BranchKind::Conditional => Resolution {
            taken: condition(funct3, a, b),
            target: pc.wrapping_add_signed(imm),
        },
    }
}
