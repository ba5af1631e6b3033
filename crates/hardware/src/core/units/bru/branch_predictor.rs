//! Branch Predictor Trait.
//!
//! Defines the interface between Decode and a direction/target predictor. The
//! predictor sees only the static encoding of the instruction; it receives no
//! feedback from Execute.

/// Class of control-flow instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchKind {
    /// `JAL`: PC-relative unconditional jump.
    Jal,
    /// `JALR`: register-indirect jump.
    Jalr,
    /// `BEQ`..`BGEU`: PC-relative conditional branch.
    Conditional,
}

/// Interface for branch prediction used by the Decode stage.
pub trait BranchPredictor {
    /// Predicts whether a control-flow instruction redirects fetch.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address of the instruction.
    /// * `kind` - Branch class.
    /// * `imm` - Sign-extended immediate of the instruction.
    ///
    /// # Returns
    ///
    /// `Some(target)` if fetch should continue at `target`, `None` to fall through.
    fn predict(&self, pc: u32, kind: BranchKind, imm: i32) -> Option<u32>;
}
