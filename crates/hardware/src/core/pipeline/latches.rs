//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the entries carried between the six pipeline stages:
//! Address → Fetch → Decode → Execute → Memory → Writeback.
//!
//! 1. **Instruction Flow:** One fixed slot per stage boundary; `None` is a bubble.
//! 2. **Trap Propagation:** Exceptions ride with their instruction until Memory takes them.
//! 3. **Flush Support:** Helpers that invalidate every slot younger than a given stage.

use crate::common::error::Trap;
use crate::core::pipeline::signals::ControlSignals;
use crate::core::units::debug::trigger::TriggerHit;

/// Entry in the Address→Fetch latch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AfEntry {
    /// Address to fetch.
    pub pc: u32,
}

/// Entry in the Fetch→Decode latch.
///
/// Contains the raw instruction word, or the fetch fault in its place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FdEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// 32-bit instruction encoding (`NOP` when the fetch faulted).
    pub inst: u32,
    /// Trap that occurred during fetch, if any.
    pub trap: Option<Trap>,
}

/// Entry in the Decode→Execute latch.
///
/// Operands are resolved in Decode, from the register file or a bypass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DxEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// 32-bit instruction encoding.
    pub inst: u32,
    /// Destination register index.
    pub rd: usize,
    /// First source register index (the CSR immediate for `CSRR*I`).
    pub rs1: usize,
    /// Sign-extended immediate value.
    pub imm: i32,
    /// Resolved value of `rs1`.
    pub rv1: u32,
    /// Resolved value of `rs2`.
    pub rv2: u32,
    /// Control signals for downstream pipeline stages.
    pub ctrl: ControlSignals,
    /// Trap collected so far, if any.
    pub trap: Option<Trap>,
    /// Whether the static predictor redirected fetch to `pred_target`.
    pub pred_taken: bool,
    /// Predicted target address for branch/jump instructions.
    pub pred_target: u32,
    /// Interrupts were pending and enabled when the instruction left Decode.
    pub irq: bool,
    /// Remaining cycles the instruction occupies Execute (divider).
    pub busy_cycles: u32,
}

/// Source registers an instruction reads and the values it used.
///
/// Unused sources are reported as `x0` with value zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Operands {
    /// First source register index.
    pub rs1: usize,
    /// Value read for `rs1`.
    pub rs1_value: u32,
    /// Second source register index.
    pub rs2: usize,
    /// Value read for `rs2`.
    pub rs2_value: u32,
}

/// Data-port access performed by a retired load or store.
///
/// `addr` is word-aligned; the masks select the byte lanes that were read or written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemAccess {
    /// Word address.
    pub addr: u32,
    /// Bytes read.
    pub rmask: u8,
    /// Bytes written.
    pub wmask: u8,
    /// Word returned by the data port.
    pub rdata: u32,
    /// Store data in its byte lanes.
    pub wdata: u32,
}

/// Entry in the Execute→Memory latch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XmEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// Resolved address of the next instruction in program order.
    pub next_pc: u32,
    /// 32-bit instruction encoding.
    pub inst: u32,
    /// Destination register index.
    pub rd: usize,
    /// Source registers and their values.
    pub operands: Operands,
    /// ALU result (effective address for loads and stores).
    pub result: u32,
    /// Store data shifted into its byte lanes.
    pub store_data: u32,
    /// Byte-enable mask of the memory access.
    pub mask: u8,
    /// Source operand of a CSR instruction (register value or zero-extended immediate).
    pub csr_src: u32,
    /// CSR instruction writes the register (false for `CSRRS`/`CSRRC` with `x0` or zimm 0).
    pub csr_write: bool,
    /// Control signals for the Memory and Writeback stages.
    pub ctrl: ControlSignals,
    /// Trap collected so far, if any.
    pub trap: Option<Trap>,
    /// Trigger that matched this instruction, if any.
    pub trigger: Option<TriggerHit>,
    /// Interrupt tag from Decode.
    pub irq: bool,
}

/// Entry in the Memory→Writeback latch.
///
/// Every instruction that completes Memory without trapping passes through here
/// so that Writeback can retire it, whether or not it writes a register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MwEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// Address of the next instruction in program order (`mepc` after `mret`).
    pub next_pc: u32,
    /// 32-bit instruction encoding.
    pub inst: u32,
    /// Destination register index.
    pub rd: usize,
    /// Value to write.
    pub value: u32,
    /// Enable write to the destination register.
    pub reg_write: bool,
    /// Source registers and their values.
    pub operands: Operands,
    /// Load or store performed in Memory.
    pub mem: Option<MemAccess>,
}

/// The five inter-stage latches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Latches {
    /// Address→Fetch.
    pub af: Option<AfEntry>,
    /// Fetch→Decode.
    pub fd: Option<FdEntry>,
    /// Decode→Execute.
    pub dx: Option<DxEntry>,
    /// Execute→Memory.
    pub xm: Option<XmEntry>,
    /// Memory→Writeback.
    pub mw: Option<MwEntry>,
}

impl Latches {
    /// Invalidates the instructions younger than Execute (kills Fetch and Decode).
    pub const fn flush_after_execute(&mut self) {
        self.fd = None;
        self.af = None;
    }

    /// Invalidates the instructions younger than Memory (kills Execute, Decode and Fetch).
    pub const fn flush_after_memory(&mut self) {
        self.dx = None;
        self.fd = None;
        self.af = None;
    }

    /// Returns `true` if no instruction is in flight.
    pub const fn is_empty(&self) -> bool {
        self.af.is_none()
            && self.fd.is_none()
            && self.dx.is_none()
            && self.xm.is_none()
            && self.mw.is_none()
    }
}
