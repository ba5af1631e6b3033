//! Instruction Execute (EX) Stage.
//!
//! This module implements the fourth stage of the pipeline. It performs the following:
//! 1. **ALU Execution:** Computes arithmetic, logical and multiply/divide results; divides
//!    hold the stage for the divider latency.
//! 2. **Branch Resolution:** Compares the actual outcome with the Decode prediction and
//!    redirects fetch on a misprediction.
//! 3. **Address Checks:** Raises misaligned exceptions and evaluates match triggers for
//!    the pc and for load/store addresses.
//! 4. **Store Preparation:** Places store data in its byte lanes and builds the byte mask.

use tracing::debug;

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::Trap;
use crate::core::Cpu;
use crate::core::pipeline::latches::{DxEntry, Operands, XmEntry};
use crate::core::pipeline::signals::{CsrOp, OpASrc, OpBSrc};
use crate::core::pipeline::stages::decode::branch_kind;
use crate::core::units::alu::Alu;
use crate::core::units::bru;
use crate::core::units::debug::trigger::TriggerAction;
use crate::isa::instruction::InstructionBits;

/// Computes the ALU result of an instruction from its resolved operands.
///
/// Also used by Decode to read the Execute bypass value at the start of a cycle.
pub fn result(dx: &DxEntry) -> u32 {
    let a = match dx.ctrl.a_src {
        OpASrc::Reg1 => dx.rv1,
        OpASrc::Pc => dx.pc,
        OpASrc::Zero => 0,
    };
    let b = match dx.ctrl.b_src {
        OpBSrc::Imm => dx.imm as u32,
        OpBSrc::Reg2 => dx.rv2,
        OpBSrc::Four => INSTRUCTION_SIZE,
    };
    Alu::execute(dx.ctrl.alu, a, b)
}

/// Executes the instruction execute stage.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
pub fn execute_stage(cpu: &mut Cpu) {
    let Some(dx) = cpu.latches.dx.as_mut() else {
        return;
    };
    if dx.busy_cycles > 1 {
        dx.busy_cycles -= 1;
        cpu.stats.stalls_divider += 1;
        return;
    }
    if cpu.latches.xm.is_some() {
        return;
    }
    let dx = *dx;
    cpu.latches.dx = None;

    let result = result(&dx);
    let mut trap = dx.trap;
    let mut trigger = None;
    let mut next_pc = dx.pc.wrapping_add(INSTRUCTION_SIZE);

    if trap.is_none() {
        if (dx.ctrl.mem_read || dx.ctrl.mem_write) && !dx.ctrl.width.is_aligned(result) {
            trap = Some(if dx.ctrl.mem_read {
                Trap::LoadAddressMisaligned(result)
            } else {
                Trap::StoreAddressMisaligned(result)
            });
        }

        if let Some(triggers) = cpu.triggers.as_ref() {
            let hit = if let Some(h) = triggers.check_execute(dx.pc) {
                Some((h, dx.pc))
            } else if dx.ctrl.mem_read {
                triggers.check_load(result).map(|h| (h, result))
            } else if dx.ctrl.mem_write {
                triggers.check_store(result, dx.rv2).map(|h| (h, result))
            } else {
                None
            };
            if let Some((hit, tval)) = hit {
                trigger = Some(hit);
                if hit.action == TriggerAction::Breakpoint {
                    trap = Some(Trap::prioritize(trap, Trap::Breakpoint(tval)));
                }
            }
        }

        if trap.is_none()
            && let Some(kind) = branch_kind(&dx.ctrl)
        {
            match resolve_branch(cpu, &dx, kind) {
                Ok(target) => next_pc = target,
                Err(t) => trap = Some(t),
            }
        }
    }

    let lane = (result & 0b11) * 8;
    cpu.latches.xm = Some(XmEntry {
        pc: dx.pc,
        next_pc,
        inst: dx.inst,
        rd: dx.rd,
        operands: operands(&dx),
        result,
        store_data: dx.rv2 << lane,
        mask: dx.ctrl.width.byte_mask(result),
        csr_src: if dx.ctrl.csr_op.uses_immediate() {
            dx.rs1 as u32
        } else {
            dx.rv1
        },
        csr_write: match dx.ctrl.csr_op {
            CsrOp::None => false,
            CsrOp::Rw | CsrOp::Rwi => true,
            CsrOp::Rs | CsrOp::Rc | CsrOp::Rsi | CsrOp::Rci => dx.rs1 != 0,
        },
        ctrl: dx.ctrl,
        trap,
        trigger,
        irq: dx.irq,
    });
}

fn operands(dx: &DxEntry) -> Operands {
    let (rs1, rs1_value) = if dx.ctrl.reads_rs1 {
        (dx.inst.rs1(), dx.rv1)
    } else {
        (0, 0)
    };
    let (rs2, rs2_value) = if dx.ctrl.reads_rs2 {
        (dx.inst.rs2(), dx.rv2)
    } else {
        (0, 0)
    };
    Operands {
        rs1,
        rs1_value,
        rs2,
        rs2_value,
    }
}

/// Resolves a branch or jump and repairs a misprediction.
///
/// # Returns
///
/// The address of the next instruction in program order, or an
/// instruction-address-misaligned exception for a taken transfer to a
/// misaligned target, in which case nothing is redirected.
fn resolve_branch(cpu: &mut Cpu, dx: &DxEntry, kind: bru::BranchKind) -> Result<u32, Trap> {
    let res = bru::resolve(kind, dx.inst.funct3(), dx.pc, dx.imm, dx.rv1, dx.rv2);
    if res.taken && res.target & 0b11 != 0 {
        return Err(Trap::InstructionAddressMisaligned(res.target));
    }
    let actual = res.next_pc(dx.pc);
    let predicted = if dx.pred_taken {
        dx.pred_target
    } else {
        dx.pc.wrapping_add(INSTRUCTION_SIZE)
    };
    if actual == predicted {
        cpu.stats.branch_predictions += 1;
        return Ok(actual);
    }
    cpu.stats.branch_mispredictions += 1;
    cpu.stats.flushes += 1;
    cpu.latches.flush_after_execute();
    cpu.fetch.abort();
    cpu.redirect = Some(actual);
    debug!(
        pc = %format_args!("{:#010x}", dx.pc),
        predicted = %format_args!("{predicted:#010x}"),
        actual = %format_args!("{actual:#010x}"),
        "branch mispredicted"
    );
    Ok(actual)
}
