//! Memory Access (MEM) Stage.
//!
//! This module implements the fifth stage of the pipeline and the commit point of the
//! core. It performs the following:
//! 1. **Debug Halts:** Stops before the instruction executes when a debug-mode trigger,
//!    `ebreak` with `dcsr.ebreakm`, a halt request or a completed step calls for it.
//! 2. **Trap Handling:** Takes the instruction's exception, or a pending interrupt if
//!    the instruction was tagged in Decode, and redirects to the trap vector.
//! 3. **Memory Operations:** Performs loads and stores through the load/store unit.
//! 4. **System Operations:** Executes CSR read-modify-writes, `mret` and `fence.i`.
//!
//! No decision is taken while the load/store unit is in the middle of a transfer, so
//! an instruction is either completely executed here or not at all.

use tracing::debug;

use crate::common::constants::{INSTRUCTION_SIZE, WORD_ALIGN_MASK};
use crate::common::error::Trap;
use crate::core::Cpu;
use crate::core::cpu::csr::{CsrError, CsrOrigin};
use crate::core::pipeline::latches::{MemAccess, MwEntry, XmEntry};
use crate::core::pipeline::signals::{CsrOp, MemWidth, SystemOp};
use crate::core::units::Progress;
use crate::core::units::debug::trigger::TriggerAction;
use crate::core::units::exception;

/// Executes the memory access stage.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
pub fn mem_stage(cpu: &mut Cpu) {
    let Some(xm) = cpu.latches.xm else {
        return;
    };
    if cpu.latches.mw.is_some() {
        return;
    }

    if !cpu.lsu.busy() && boundary_event(cpu, &xm) {
        return;
    }

    let retired = match execute(cpu, &xm) {
        Progress::Busy => {
            cpu.stats.stalls_memory += 1;
            return;
        }
        Progress::Done(Err(trap)) => {
            finish(cpu);
            cpu.take_trap(xm.pc, trap);
            return;
        }
        Progress::Done(Ok(retired)) => retired,
    };

    finish(cpu);
    cpu.latches.mw = Some(retired);
}

/// Writeback entry for an instruction completing Memory with `value`.
const fn completed(xm: &XmEntry, value: u32, mem: Option<MemAccess>) -> MwEntry {
    MwEntry {
        pc: xm.pc,
        next_pc: xm.next_pc,
        inst: xm.inst,
        rd: xm.rd,
        value,
        reg_write: xm.ctrl.reg_write,
        operands: xm.operands,
        mem,
    }
}

/// Removes the instruction from Memory and notes its completion for single stepping.
fn finish(cpu: &mut Cpu) {
    cpu.latches.xm = None;
    if let Some(unit) = cpu.debug.as_mut() {
        unit.instruction_done();
    }
}

/// Takes a debug halt, an exception or an interrupt at the boundary before `xm`.
///
/// # Returns
///
/// `true` if the instruction was removed from the pipeline.
fn boundary_event(cpu: &mut Cpu, xm: &XmEntry) -> bool {
    let ebreak = xm.ctrl.system == SystemOp::Ebreak && xm.trap.is_none();
    if let Some(unit) = cpu.debug {
        let trigger = xm
            .trigger
            .is_some_and(|hit| hit.action == TriggerAction::DebugMode);
        let ebreakm = ebreak && cpu.csrs.ebreak_enters_debug();
        if let Some(cause) = unit.halt_cause(trigger, ebreakm) {
            if trigger {
                set_hit(cpu, xm);
            }
            cpu.enter_debug_mode(xm.pc, cause);
            return true;
        }
    }

    let trap = if ebreak {
        Some(Trap::Breakpoint(xm.pc))
    } else {
        xm.trap
    };
    if let Some(trap) = trap {
        set_hit(cpu, xm);
        finish(cpu);
        cpu.take_trap(xm.pc, trap);
        return true;
    }

    let stepping = cpu.debug.is_some_and(|d| d.is_stepping());
    if xm.irq
        && !stepping
        && let Some(irq) = exception::pending_interrupt(&cpu.csrs)
    {
        cpu.latches.xm = None;
        cpu.take_trap(xm.pc, irq);
        return true;
    }
    false
}

fn set_hit(cpu: &mut Cpu, xm: &XmEntry) {
    if let (Some(hit), Some(triggers)) = (xm.trigger, cpu.triggers.as_mut()) {
        triggers.set_hit(hit.index);
    }
}

/// Performs the operation of the instruction in Memory for one cycle.
///
/// # Returns
///
/// The Writeback entry, an exception, or `Busy` while waiting on the data port.
fn execute(cpu: &mut Cpu, xm: &XmEntry) -> Progress<Result<MwEntry, Trap>> {
    let ctrl = &xm.ctrl;
    let word_addr = xm.result & WORD_ALIGN_MASK;
    if ctrl.mem_read {
        return match cpu.lsu.load(&mut cpu.bus, xm.result, xm.mask, &mut cpu.stats) {
            Progress::Busy => Progress::Busy,
            Progress::Done(word) => Progress::Done(word.map(|w| {
                let access = MemAccess {
                    addr: word_addr,
                    rmask: xm.mask,
                    rdata: w,
                    ..MemAccess::default()
                };
                let value = extract_load(w, xm.result, ctrl.width, ctrl.signed_load);
                completed(xm, value, Some(access))
            })),
        };
    }
    if ctrl.mem_write {
        return match cpu.lsu.store(&mut cpu.bus, xm.result, xm.store_data, xm.mask, &mut cpu.stats) {
            Progress::Busy => Progress::Busy,
            Progress::Done(done) => Progress::Done(done.map(|()| {
                let access = MemAccess {
                    addr: word_addr,
                    wmask: xm.mask,
                    wdata: xm.store_data,
                    ..MemAccess::default()
                };
                completed(xm, 0, Some(access))
            })),
        };
    }
    if ctrl.csr_op != CsrOp::None {
        return Progress::Done(
            csr_access(cpu, xm)
                .map(|old| completed(xm, old, None))
                .map_err(|_| Trap::IllegalInstruction(xm.inst)),
        );
    }
    match ctrl.system {
        SystemOp::Mret => {
            let target = exception::leave(&mut cpu.csrs);
            debug!(pc = %format_args!("{:#010x}", xm.pc), target = %format_args!("{target:#010x}"), "mret");
            cpu.redirect_from_memory(target);
            return Progress::Done(Ok(MwEntry {
                next_pc: target,
                ..completed(xm, xm.result, None)
            }));
        }
        SystemOp::FenceI => {
            if !cpu.lsu.wrbuf_empty() {
                return Progress::Busy;
            }
            cpu.fetch.invalidate();
            cpu.lsu.invalidate();
            let target = xm.pc.wrapping_add(INSTRUCTION_SIZE);
            debug!(pc = %format_args!("{:#010x}", xm.pc), "fence.i");
            cpu.redirect_from_memory(target);
        }
        SystemOp::None | SystemOp::Ebreak | SystemOp::Wfi | SystemOp::Fence => {}
    }
    Progress::Done(Ok(completed(xm, xm.result, None)))
}

/// CSR read-modify-write.
///
/// # Returns
///
/// The old value of the CSR.
fn csr_access(cpu: &mut Cpu, xm: &XmEntry) -> Result<u32, CsrError> {
    let addr = xm.ctrl.csr_addr;
    let old = cpu.csr_read(addr, CsrOrigin::Instruction)?;
    if xm.csr_write {
        let new = match xm.ctrl.csr_op {
            CsrOp::Rs | CsrOp::Rsi => old | xm.csr_src,
            CsrOp::Rc | CsrOp::Rci => old & !xm.csr_src,
            CsrOp::Rw | CsrOp::Rwi | CsrOp::None => xm.csr_src,
        };
        cpu.csr_write(addr, new, CsrOrigin::Instruction)?;
    }
    Ok(old)
}

/// Extracts the loaded bytes from the aligned word and extends them to 32 bits.
pub const fn extract_load(word: u32, addr: u32, width: MemWidth, signed: bool) -> u32 {
    let shifted = word >> ((addr & 0b11) * 8);
    match (width, signed) {
        (MemWidth::Byte, true) => shifted as u8 as i8 as i32 as u32,
        (MemWidth::Byte, false) => shifted & 0xFF,
        (MemWidth::Half, true) => shifted as u16 as i16 as i32 as u32,
        (MemWidth::Half, false) => shifted & 0xFFFF,
        (MemWidth::Word | MemWidth::Nop, _) => word,
    }
}
