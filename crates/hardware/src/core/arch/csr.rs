//! Control and Status Register (CSR) definitions and storage.
//!
//! This module implements the machine-mode CSR subsystem. It provides:
//! 1. **Address Definitions:** Constants for every CSR the core implements.
//! 2. **Field Masks:** Bitmasks and shifts for `mstatus`, `mie`/`mip`, `misa` and `dcsr`.
//! 3. **Register Storage:** The `Csrs` struct holding the architectural state.
//!
//! Access rules (legality, read-only registers, debug-only registers) live with the
//! CPU in `core::cpu::csr`, which also knows about the optional debug and trigger units.

/// Machine vendor ID CSR address.
pub const MVENDORID: u32 = 0xF11;

/// Machine architecture ID CSR address.
pub const MARCHID: u32 = 0xF12;

/// Machine implementation ID CSR address.
pub const MIMPID: u32 = 0xF13;

/// Machine hardware thread ID CSR address.
pub const MHARTID: u32 = 0xF14;

/// Machine status register CSR address.
pub const MSTATUS: u32 = 0x300;

/// Machine ISA register CSR address.
pub const MISA: u32 = 0x301;

/// Machine interrupt enable register CSR address.
pub const MIE: u32 = 0x304;

/// Machine trap vector base address register CSR address.
pub const MTVEC: u32 = 0x305;

/// External interrupt line mask CSR address.
pub const IRQ_MASK: u32 = 0x330;

/// Machine scratch register CSR address.
pub const MSCRATCH: u32 = 0x340;

/// Machine exception program counter CSR address.
pub const MEPC: u32 = 0x341;

/// Machine cause register CSR address.
pub const MCAUSE: u32 = 0x342;

/// Machine trap value register CSR address.
pub const MTVAL: u32 = 0x343;

/// Machine interrupt pending register CSR address.
pub const MIP: u32 = 0x344;

/// Pending (masked) external interrupt lines CSR address.
pub const IRQ_PENDING: u32 = 0x360;

/// Trigger select CSR address.
pub const TSELECT: u32 = 0x7A0;

/// Trigger data 1 (match control) CSR address.
pub const TDATA1: u32 = 0x7A1;

/// Trigger data 2 (compare value) CSR address.
pub const TDATA2: u32 = 0x7A2;

/// Debug control and status CSR address.
pub const DCSR: u32 = 0x7B0;

/// Debug program counter CSR address.
pub const DPC: u32 = 0x7B1;

/// Machine cycle counter CSR address (low half).
pub const MCYCLE: u32 = 0xB00;

/// Machine instructions retired counter CSR address (low half).
pub const MINSTRET: u32 = 0xB02;

/// Machine cycle counter CSR address (high half).
pub const MCYCLEH: u32 = 0xB80;

/// Machine instructions retired counter CSR address (high half).
pub const MINSTRETH: u32 = 0xB82;

/// Cycle counter shadow CSR address (read-only).
pub const CYCLE: u32 = 0xC00;

/// Instructions retired shadow CSR address (read-only).
pub const INSTRET: u32 = 0xC02;

/// Cycle counter shadow CSR address, high half (read-only).
pub const CYCLEH: u32 = 0xC80;

/// Instructions retired shadow CSR address, high half (read-only).
pub const INSTRETH: u32 = 0xC82;

/// Machine interrupt enable bit in `mstatus`.
pub const MSTATUS_MIE: u32 = 1 << 3;

/// Machine previous interrupt enable bit in `mstatus`.
pub const MSTATUS_MPIE: u32 = 1 << 7;

/// Machine previous privilege field in `mstatus` (hardwired to M = 3).
pub const MSTATUS_MPP: u32 = 3 << 11;

/// Writable bits of `mstatus`.
pub const MSTATUS_WRITE_MASK: u32 = MSTATUS_MIE | MSTATUS_MPIE;

/// Machine software interrupt bit in `mie`/`mip`.
pub const MIP_MSIP: u32 = 1 << 3;

/// Machine timer interrupt bit in `mie`/`mip`.
pub const MIP_MTIP: u32 = 1 << 7;

/// Machine external interrupt bit in `mie`/`mip`.
pub const MIP_MEIP: u32 = 1 << 11;

/// Implemented interrupt bits of `mie`.
pub const MIE_WRITE_MASK: u32 = MIP_MSIP | MIP_MTIP | MIP_MEIP;

/// MISA extension bit for the base integer ISA.
pub const MISA_EXT_I: u32 = 1 << 8;

/// MISA extension bit for integer multiply/divide.
pub const MISA_EXT_M: u32 = 1 << 12;

/// MISA MXL field value for a 32-bit machine.
pub const MISA_MXL_32: u32 = 1 << 30;

/// Debug specification version reported in `dcsr.xdebugver` (external debug support).
pub const DCSR_XDEBUGVER: u32 = 4 << 28;

/// `dcsr.ebreakm`: `ebreak` in M-mode enters debug mode.
pub const DCSR_EBREAKM: u32 = 1 << 15;

/// Shift of the `dcsr.cause` field.
pub const DCSR_CAUSE_SHIFT: u32 = 6;

/// Mask of the `dcsr.cause` field (after shifting).
pub const DCSR_CAUSE_MASK: u32 = 0b111;

/// `dcsr.step`: single-step mode.
pub const DCSR_STEP: u32 = 1 << 2;

/// `dcsr.prv`: privilege level before entering debug mode (always M).
pub const DCSR_PRV_M: u32 = 0b11;

/// Writable bits of `dcsr`.
pub const DCSR_WRITE_MASK: u32 = DCSR_EBREAKM | DCSR_STEP;

/// Returns `true` if the CSR address lies in the read-only space (bits 11:10 = `0b11`).
pub const fn is_read_only(addr: u32) -> bool {
    (addr >> 10) & 0b11 == 0b11
}

/// Machine-mode Control and Status Register file.
///
/// Trigger registers are kept by the trigger unit; everything else that software
/// or the debugger can address lives here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Csrs {
    /// Machine status register.
    pub mstatus: u32,
    /// Machine ISA register.
    pub misa: u32,
    /// Machine interrupt enable.
    pub mie: u32,
    /// Machine trap vector base address (direct mode).
    pub mtvec: u32,
    /// Machine scratch register.
    pub mscratch: u32,
    /// Machine exception program counter.
    pub mepc: u32,
    /// Machine trap cause.
    pub mcause: u32,
    /// Machine trap value.
    pub mtval: u32,
    /// Machine interrupt pending, registered from the interrupt lines once per cycle.
    pub mip: u32,
    /// External interrupt line mask.
    pub irq_mask: u32,
    /// External interrupt lines that are both asserted and unmasked.
    pub irq_pending: u32,
    /// Machine cycle counter.
    pub mcycle: u64,
    /// Machine instructions retired counter.
    pub minstret: u64,
    /// Debug control and status.
    pub dcsr: u32,
    /// Debug program counter.
    pub dpc: u32,
}

impl Csrs {
    /// Creates the reset state of the CSR file.
    ///
    /// # Arguments
    ///
    /// * `with_muldiv` - Whether `misa` advertises the M extension.
    pub const fn new(with_muldiv: bool) -> Self {
        let misa = if with_muldiv {
            MISA_MXL_32 | MISA_EXT_I | MISA_EXT_M
        } else {
            MISA_MXL_32 | MISA_EXT_I
        };
        Self {
            mstatus: MSTATUS_MPP,
            misa,
            mie: 0,
            mtvec: 0,
            mscratch: 0,
            mepc: 0,
            mcause: 0,
            mtval: 0,
            mip: 0,
            irq_mask: 0,
            irq_pending: 0,
            mcycle: 0,
            minstret: 0,
            dcsr: DCSR_XDEBUGVER | DCSR_PRV_M,
            dpc: 0,
        }
    }

    /// Returns `true` if `mstatus.MIE` is set.
    pub const fn interrupts_enabled(&self) -> bool {
        self.mstatus & MSTATUS_MIE != 0
    }

    /// Returns the interrupts that are both pending and enabled.
    pub const fn enabled_pending(&self) -> u32 {
        self.mip & self.mie
    }

    /// Records the debug halt cause in `dcsr.cause`.
    pub const fn set_debug_cause(&mut self, cause: u32) {
        self.dcsr = (self.dcsr & !(DCSR_CAUSE_MASK << DCSR_CAUSE_SHIFT))
            | ((cause & DCSR_CAUSE_MASK) << DCSR_CAUSE_SHIFT);
    }

    /// Returns the `dcsr.cause` field.
    pub const fn debug_cause(&self) -> u32 {
        (self.dcsr >> DCSR_CAUSE_SHIFT) & DCSR_CAUSE_MASK
    }

    /// Returns `true` if `dcsr.step` is set.
    pub const fn single_step(&self) -> bool {
        self.dcsr & DCSR_STEP != 0
    }

    /// Returns `true` if `dcsr.ebreakm` is set.
    pub const fn ebreak_enters_debug(&self) -> bool {
        self.dcsr & DCSR_EBREAKM != 0
    }
}

impl Default for Csrs {
    fn default() -> Self {
        Self::new(true)
    }
}
