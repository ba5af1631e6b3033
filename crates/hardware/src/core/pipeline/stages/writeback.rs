//! Writeback (WB) Stage.
//!
//! This module implements the final stage of the pipeline. It performs the following:
//! 1. **Register Commit:** Writes the result to the register file.
//! 2. **Retirement:** Advances `minstret`, the instruction-mix statistics and the retire trace.
//! 3. **Tracing:** Emits one `trace` event per retired instruction carrying its
//!    retirement order, pc and next pc, source and destination registers with
//!    their values, and the data-port access with its byte masks.

use tracing::trace;

use crate::core::Cpu;
use crate::isa::disasm::disassemble;
use crate::isa::instruction::InstructionBits;
use crate::isa::rv32i::{funct7, opcodes};
use crate::stats::SimStats;

/// Executes the writeback stage.
///
/// Writeback never stalls: the instruction in the Memory→Writeback latch always retires.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
pub fn wb_stage(cpu: &mut Cpu) {
    let Some(mw) = cpu.latches.mw.take() else {
        return;
    };
    if mw.reg_write {
        cpu.regs.write(mw.rd, mw.value);
    }
    let order = cpu.csrs.minstret;
    cpu.csrs.minstret = cpu.csrs.minstret.wrapping_add(1);
    cpu.stats.instructions_retired += 1;
    classify(&mut cpu.stats, mw.inst);
    cpu.last_retired = Some(mw.pc);
    if let Some(trace) = cpu.retire_trace.as_mut() {
        trace.push(mw.pc);
    }
    let write = mw.reg_write && mw.rd != 0;
    let mem = mw.mem.unwrap_or_default();
    trace!(
        target: "rv32im::retire",
        order,
        pc = %format_args!("{:#010x}", mw.pc),
        next_pc = %format_args!("{:#010x}", mw.next_pc),
        inst = %format_args!("{:#010x}", mw.inst),
        asm = %disassemble(mw.inst),
        rs1 = mw.operands.rs1,
        rs1_value = %format_args!("{:#010x}", mw.operands.rs1_value),
        rs2 = mw.operands.rs2,
        rs2_value = %format_args!("{:#010x}", mw.operands.rs2_value),
        rd = if write { mw.rd } else { 0 },
        rd_value = %format_args!("{:#010x}", if write { mw.value } else { 0 }),
        mem_addr = %format_args!("{:#010x}", mem.addr),
        mem_rmask = mem.rmask,
        mem_wmask = mem.wmask,
        mem_rdata = %format_args!("{:#010x}", mem.rdata),
        mem_wdata = %format_args!("{:#010x}", mem.wdata),
    );
}

fn classify(stats: &mut SimStats, inst: u32) {
    let counter = match inst.opcode() {
        opcodes::OP_LOAD => &mut stats.inst_load,
        opcodes::OP_STORE => &mut stats.inst_store,
        opcodes::OP_BRANCH | opcodes::OP_JAL | opcodes::OP_JALR => &mut stats.inst_branch,
        opcodes::OP_REG if inst.funct7() == funct7::MULDIV => &mut stats.inst_muldiv,
        opcodes::OP_SYSTEM | opcodes::OP_MISC_MEM => &mut stats.inst_system,
        _ => &mut stats.inst_alu,
    };
    *counter += 1;
}
