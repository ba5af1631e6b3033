//! Static Branch Predictor.
//!
//! Implements a fixed "backward taken, forward not taken" policy:
//! 1. **Jumps:** `JAL` is always taken; `JALR` is never predicted (its target needs a register).
//! 2. **Branches:** Taken if and only if the offset is negative (loops).
//! 3. **Alignment:** A target that is not 4-byte aligned is predicted not taken, so the
//!    misaligned exception is raised by Execute on the branch itself.

use super::{BranchKind, BranchPredictor};

/// Static Branch Predictor structure.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPredictor;

impl BranchPredictor for StaticPredictor {
    fn predict(&self, pc: u32, kind: BranchKind, imm: i32) -> Option<u32> {
        let taken = match kind {
            BranchKind::Jal => true,
            BranchKind::Jalr => false,
            BranchKind::Conditional => imm < 0,
        };
        let target = pc.wrapping_add_signed(imm);
        (taken && target & 0b11 == 0).then_some(target)
    }
}
