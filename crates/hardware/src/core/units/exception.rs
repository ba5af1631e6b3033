//! Exception unit.
//!
//! This module implements the trap side of the CSR controller:
//! 1. **Sampling:** Registers the interrupt lines into `mip` and `irq_pending`.
//! 2. **Arbitration:** Picks the highest-priority enabled interrupt.
//! 3. **Entry and exit:** Updates `mepc`, `mcause`, `mtval` and the `mstatus` interrupt
//!    stack on trap entry and on `mret`.

use crate::common::constants::WORD_ALIGN_MASK;
use crate::common::error::Trap;
use crate::core::arch::csr::{Csrs, MIP_MEIP, MIP_MSIP, MIP_MTIP, MSTATUS_MIE, MSTATUS_MPIE};
use crate::soc::IrqLines;

/// Registers the interrupt lines into `mip` and `irq_pending`.
///
/// `MEIP` is set when any external line is both asserted and enabled in `irq_mask`.
pub const fn sample(csrs: &mut Csrs, lines: &IrqLines) {
    csrs.irq_pending = lines.external & csrs.irq_mask;
    let mut mip = 0;
    if lines.software {
        mip |= MIP_MSIP;
    }
    if lines.timer {
        mip |= MIP_MTIP;
    }
    if csrs.irq_pending != 0 {
        mip |= MIP_MEIP;
    }
    csrs.mip = mip;
}

/// Returns `true` if an interrupt would be taken at the next instruction boundary.
pub const fn interrupt_ready(csrs: &Csrs) -> bool {
    csrs.interrupts_enabled() && csrs.enabled_pending() != 0
}

/// Selects the interrupt to take, if any.
///
/// Priority is software, then timer, then external.
///
/// # Returns
///
/// `None` if interrupts are globally disabled or nothing enabled is pending.
pub const fn pending_interrupt(csrs: &Csrs) -> Option<Trap> {
    if !csrs.interrupts_enabled() {
        return None;
    }
    let pending = csrs.enabled_pending();
    if pending & MIP_MSIP != 0 {
        Some(Trap::MachineSoftwareInterrupt)
    } else if pending & MIP_MTIP != 0 {
        Some(Trap::MachineTimerInterrupt)
    } else if pending & MIP_MEIP != 0 {
        Some(Trap::MachineExternalInterrupt)
    } else {
        None
    }
}

/// Enters the trap handler.
///
/// # Arguments
///
/// * `csrs` - CSR file.
/// * `pc` - Address of the trapping (or interrupted) instruction.
/// * `trap` - The trap being taken.
///
/// # Returns
///
/// The handler address (`mtvec`, direct mode).
pub const fn enter(csrs: &mut Csrs, pc: u32, trap: Trap) -> u32 {
    csrs.mepc = pc & WORD_ALIGN_MASK;
    csrs.mcause = trap.cause();
    csrs.mtval = trap.tval();
    let mie = csrs.mstatus & MSTATUS_MIE != 0;
    csrs.mstatus &= !(MSTATUS_MIE | MSTATUS_MPIE);
    if mie {
        csrs.mstatus |= MSTATUS_MPIE;
    }
    csrs.mtvec & WORD_ALIGN_MASK
}

/// Returns from the trap handler (`mret`).
///
/// # Returns
///
/// The address to resume at (`mepc`).
pub const fn leave(csrs: &mut Csrs) -> u32 {
    let mpie = csrs.mstatus & MSTATUS_MPIE != 0;
    csrs.mstatus &= !MSTATUS_MIE;
    if mpie {
        csrs.mstatus |= MSTATUS_MIE;
    }
    csrs.mstatus |= MSTATUS_MPIE;
    csrs.mepc
}
