//! Data Hazard Detection and Forwarding.
//!
//! This module implements the logic for maintaining pipeline consistency when data
//! dependencies exist between instructions. It provides:
//! 1. **Producer Extraction:** Describes what the instructions in Execute, Memory and
//!    Writeback will write, and whether the value already exists.
//! 2. **Operand Forwarding:** Resolves Read-After-Write (RAW) hazards by selecting the
//!    youngest in-flight producer of each source register.
//! 3. **Hazard Detection:** Requests a Decode stall when that producer has not computed
//!    its value yet (loads, multiplies, CSR reads, shifts and compares in Execute).
//!
//! The hazard record is a pure function of the latch contents at the start of a cycle.

use crate::core::pipeline::latches::{DxEntry, MwEntry, XmEntry};
use crate::core::pipeline::signals::{ControlSignals, ResultStage};

/// Where Decode takes a source operand from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperandSource {
    /// Register file (no in-flight producer).
    #[default]
    RegFile,
    /// Bypass from the instruction in Execute.
    Execute,
    /// Bypass from the instruction in Memory.
    Memory,
    /// Bypass from the instruction in Writeback.
    Writeback,
}

/// A pending register write by an in-flight instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Producer {
    /// Destination register (never `x0`).
    pub rd: usize,
    /// Whether the value is available for forwarding from the producer's current stage.
    pub ready: bool,
}

impl Producer {
    fn new(ctrl: &ControlSignals, rd: usize, trapped: bool, stage: ResultStage) -> Option<Self> {
        (ctrl.reg_write && rd != 0 && !trapped).then_some(Self {
            rd,
            ready: ctrl.result_stage <= stage,
        })
    }

    /// Producer held in the Decode→Execute latch.
    pub fn in_execute(dx: &DxEntry) -> Option<Self> {
        Self::new(&dx.ctrl, dx.rd, dx.trap.is_some(), ResultStage::Execute)
    }

    /// Producer held in the Execute→Memory latch.
    pub fn in_memory(xm: &XmEntry) -> Option<Self> {
        Self::new(&xm.ctrl, xm.rd, xm.trap.is_some(), ResultStage::Memory)
    }

    /// Producer held in the Memory→Writeback latch.
    pub fn in_writeback(mw: &MwEntry) -> Option<Self> {
        (mw.reg_write && mw.rd != 0).then_some(Self {
            rd: mw.rd,
            ready: true,
        })
    }
}

/// Per-cycle hazard decision for the instruction in Decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HazardRecord {
    /// Source of the `rs1` operand.
    pub rs1: OperandSource,
    /// Source of the `rs2` operand.
    pub rs2: OperandSource,
    /// Decode must hold its instruction this cycle.
    pub stall: bool,
}

/// Computes operand sources and the stall decision for one Decode instruction.
///
/// Producers are checked youngest first (Execute, Memory, Writeback); the first one
/// writing the source register decides. If its value is not available yet the
/// instruction stalls instead of looking further back.
///
/// # Arguments
///
/// * `rs1` - First source register, or `None` if the instruction does not read it.
/// * `rs2` - Second source register, or `None` if the instruction does not read it.
/// * `x` - Producer in Execute.
/// * `m` - Producer in Memory.
/// * `w` - Producer in Writeback.
///
/// # Returns
///
/// The hazard record for this cycle.
pub fn detect(
    rs1: Option<usize>,
    rs2: Option<usize>,
    x: Option<Producer>,
    m: Option<Producer>,
    w: Option<Producer>,
) -> HazardRecord {
    let stages = [
        (OperandSource::Execute, x),
        (OperandSource::Memory, m),
        (OperandSource::Writeback, w),
    ];
    let (src1, stall1) = resolve(rs1, &stages);
    let (src2, stall2) = resolve(rs2, &stages);
    HazardRecord {
        rs1: src1,
        rs2: src2,
        stall: stall1 || stall2,
    }
}

fn resolve(rs: Option<usize>, stages: &[(OperandSource, Option<Producer>); 3]) -> (OperandSource, bool) {
    let Some(rs) = rs.filter(|&r| r != 0) else {
        return (OperandSource::RegFile, false);
    };
    for (source, producer) in stages {
        if let Some(p) = producer
            && p.rd == rs
        {
            return if p.ready {
                (*source, false)
            } else {
                (OperandSource::RegFile, true)
            };
        }
    }
    (OperandSource::RegFile, false)
}

/// Selects the operand value named by `source`.
///
/// # Arguments
///
/// * `source` - Operand source from the hazard record.
/// * `regfile` - Value read from the register file.
/// * `bypass` - Values offered by Execute, Memory and Writeback, in that order.
pub const fn select(source: OperandSource, regfile: u32, bypass: [u32; 3]) -> u32 {
    match source {
        OperandSource::RegFile => regfile,
        OperandSource::Execute => bypass[0],
        OperandSource::Memory => bypass[1],
        OperandSource::Writeback => bypass[2],
    }
}
