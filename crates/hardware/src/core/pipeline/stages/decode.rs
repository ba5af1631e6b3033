//! Instruction Decode (ID) Stage.
//!
//! This module implements the third stage of the pipeline. It performs the following:
//! 1. **Decoding:** Converts raw 32-bit instruction bits into control signals.
//! 2. **Hazard Resolution:** Applies the start-of-cycle hazard record: operands come from
//!    the register file or a bypass, or Decode holds its instruction.
//! 3. **Prediction:** Redirects fetch to the target of a predicted-taken branch or jump.
//! 4. **Interrupt Tagging:** Marks the instruction if an enabled interrupt is pending.

use tracing::trace;

use crate::common::constants::DIVIDER_CYCLES;
use crate::common::error::Trap;
use crate::core::Cpu;
use crate::core::pipeline::hazards::{self, HazardRecord, Producer};
use crate::core::pipeline::latches::DxEntry;
use crate::core::pipeline::signals::{
    AluOp, ControlSignals, CsrOp, MemWidth, OpASrc, OpBSrc, ResultStage, SystemOp,
};
use crate::core::pipeline::stages::execute;
use crate::core::units::bru::{BranchKind, BranchPredictor};
use crate::core::units::exception;
use crate::isa::decode::decode as instruction_decode;
use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::privileged::opcodes as sys_ops;
use crate::isa::rv32i::{funct3 as i_funct3, funct7 as i_funct7, opcodes as i_opcodes};
use crate::isa::rv32m::funct3 as m_funct3;

/// Operand state captured before any stage runs in a cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OperandSnapshot {
    /// Hazard decision for the instruction in the Fetch→Decode latch.
    pub record: HazardRecord,
    /// Values offered by Execute, Memory and Writeback.
    pub bypass: [u32; 3],
}

/// Computes the hazard record and bypass values from the current latch contents.
///
/// # Arguments
///
/// * `cpu` - CPU state at the start of the cycle.
pub fn snapshot(cpu: &Cpu) -> OperandSnapshot {
    let Some(fd) = cpu.latches.fd.filter(|fd| fd.trap.is_none()) else {
        return OperandSnapshot::default();
    };
    let Ok(ctrl) = control_signals(fd.inst, cpu.with_muldiv) else {
        return OperandSnapshot::default();
    };
    let rs1 = ctrl.reads_rs1.then(|| fd.inst.rs1());
    let rs2 = ctrl.reads_rs2.then(|| fd.inst.rs2());
    let record = hazards::detect(
        rs1,
        rs2,
        cpu.latches.dx.as_ref().and_then(Producer::in_execute),
        cpu.latches.xm.as_ref().and_then(Producer::in_memory),
        cpu.latches.mw.as_ref().and_then(Producer::in_writeback),
    );
    let bypass = [
        cpu.latches.dx.as_ref().map_or(0, execute::result),
        cpu.latches.xm.map_or(0, |xm| xm.result),
        cpu.latches.mw.map_or(0, |mw| mw.value),
    ];
    OperandSnapshot { record, bypass }
}

/// Executes the instruction decode stage.
///
/// The instruction in the Fetch→Decode latch moves to Decode→Execute when that
/// latch is free and the hazard record does not request a stall.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
/// * `snap` - Operand state captured at the start of the cycle.
pub fn decode_stage(cpu: &mut Cpu, snap: &OperandSnapshot) {
    let Some(fd) = cpu.latches.fd else {
        return;
    };
    if cpu.latches.dx.is_some() {
        return;
    }
    if snap.record.stall {
        cpu.stats.stalls_data += 1;
        return;
    }
    cpu.latches.fd = None;

    let d = instruction_decode(fd.inst);
    let mut entry = DxEntry {
        pc: fd.pc,
        inst: fd.inst,
        rd: d.rd,
        rs1: d.rs1,
        imm: d.imm,
        trap: fd.trap,
        irq: irq_tag(cpu),
        ..DxEntry::default()
    };
    if entry.trap.is_none() {
        match control_signals(fd.inst, cpu.with_muldiv) {
            Ok(ctrl) => {
                entry.ctrl = ctrl;
                entry.rv1 = hazards::select(snap.record.rs1, cpu.regs.read(d.rs1), snap.bypass);
                entry.rv2 = hazards::select(snap.record.rs2, cpu.regs.read(d.rs2), snap.bypass);
                if ctrl.alu.is_divide() {
                    entry.busy_cycles = DIVIDER_CYCLES;
                }
                if fd.inst == sys_ops::ECALL {
                    entry.trap = Some(Trap::EnvironmentCallFromMMode);
                }
            }
            Err(trap) => entry.trap = Some(trap),
        }
    }

    if entry.trap.is_none()
        && let Some(kind) = branch_kind(&entry.ctrl)
        && let Some(target) = cpu.predictor.predict(entry.pc, kind, entry.imm)
    {
        entry.pred_taken = true;
        entry.pred_target = target;
        cpu.latches.af = None;
        cpu.fetch.abort();
        cpu.redirect = Some(target);
        trace!(pc = %format_args!("{:#010x}", entry.pc), target = %format_args!("{target:#010x}"), "predicted taken");
    }

    cpu.latches.dx = Some(entry);
}

/// Interrupts are tagged only when they would be taken now and no single step is running.
fn irq_tag(cpu: &Cpu) -> bool {
    exception::interrupt_ready(&cpu.csrs) && !cpu.debug.is_some_and(|d| d.is_stepping())
}

/// Classifies a control-flow instruction for the predictor and the branch unit.
pub const fn branch_kind(ctrl: &ControlSignals) -> Option<BranchKind> {
    if ctrl.branch {
        Some(BranchKind::Conditional)
    } else if ctrl.jump && ctrl.indirect {
        Some(BranchKind::Jalr)
    } else if ctrl.jump {
        Some(BranchKind::Jal)
    } else {
        None
    }
}

/// Generates the control signals of an instruction.
///
/// # Arguments
///
/// * `inst` - Raw instruction word.
/// * `with_muldiv` - Whether M-extension encodings are legal.
///
/// # Returns
///
/// The control signals, or an illegal instruction exception carrying the word.
pub fn control_signals(inst: u32, with_muldiv: bool) -> Result<ControlSignals, Trap> {
    let d = instruction_decode(inst);
    let illegal = Trap::IllegalInstruction(inst);
    let mut c = ControlSignals {
        a_src: OpASrc::Reg1,
        b_src: OpBSrc::Imm,
        alu: AluOp::Add,
        ..ControlSignals::default()
    };

    match d.opcode {
        i_opcodes::OP_LUI => {
            c.reg_write = true;
            c.a_src = OpASrc::Zero;
        }
        i_opcodes::OP_AUIPC => {
            c.reg_write = true;
            c.a_src = OpASrc::Pc;
        }
        i_opcodes::OP_JAL => {
            c.reg_write = true;
            c.jump = true;
            c.a_src = OpASrc::Pc;
            c.b_src = OpBSrc::Four;
        }
        i_opcodes::OP_JALR => {
            if d.funct3 != i_funct3::JALR {
                return Err(illegal);
            }
            c.reg_write = true;
            c.reads_rs1 = true;
            c.jump = true;
            c.indirect = true;
            c.a_src = OpASrc::Pc;
            c.b_src = OpBSrc::Four;
        }
        i_opcodes::OP_BRANCH => {
            if !matches!(
                d.funct3,
                i_funct3::BEQ
                    | i_funct3::BNE
                    | i_funct3::BLT
                    | i_funct3::BGE
                    | i_funct3::BLTU
                    | i_funct3::BGEU
            ) {
                return Err(illegal);
            }
            c.branch = true;
            c.reads_rs1 = true;
            c.reads_rs2 = true;
            c.b_src = OpBSrc::Reg2;
        }
        i_opcodes::OP_LOAD => {
            c.reg_write = true;
            c.reads_rs1 = true;
            c.mem_read = true;
            (c.width, c.signed_load) = match d.funct3 {
                i_funct3::LB => (MemWidth::Byte, true),
                i_funct3::LH => (MemWidth::Half, true),
                i_funct3::LW => (MemWidth::Word, true),
                i_funct3::LBU => (MemWidth::Byte, false),
                i_funct3::LHU => (MemWidth::Half, false),
                _ => return Err(illegal),
            };
        }
        i_opcodes::OP_STORE => {
            c.reads_rs1 = true;
            c.reads_rs2 = true;
            c.mem_write = true;
            c.width = match d.funct3 {
                i_funct3::SB => MemWidth::Byte,
                i_funct3::SH => MemWidth::Half,
                i_funct3::SW => MemWidth::Word,
                _ => return Err(illegal),
            };
        }
        i_opcodes::OP_IMM => {
            c.reg_write = true;
            c.reads_rs1 = true;
            c.alu = match (d.funct3, d.funct7) {
                (i_funct3::ADD_SUB, _) => AluOp::Add,
                (i_funct3::SLT, _) => AluOp::Slt,
                (i_funct3::SLTU, _) => AluOp::Sltu,
                (i_funct3::XOR, _) => AluOp::Xor,
                (i_funct3::OR, _) => AluOp::Or,
                (i_funct3::AND, _) => AluOp::And,
                (i_funct3::SLL, i_funct7::DEFAULT) => AluOp::Sll,
                (i_funct3::SRL_SRA, i_funct7::DEFAULT) => AluOp::Srl,
                (i_funct3::SRL_SRA, i_funct7::SUB_SRA) => AluOp::Sra,
                _ => return Err(illegal),
            };
        }
        i_opcodes::OP_REG => {
            c.reg_write = true;
            c.reads_rs1 = true;
            c.reads_rs2 = true;
            c.b_src = OpBSrc::Reg2;
            c.alu = if d.funct7 == i_funct7::MULDIV {
                if !with_muldiv {
                    return Err(illegal);
                }
                match d.funct3 {
                    m_funct3::MUL => AluOp::Mul,
                    m_funct3::MULH => AluOp::Mulh,
                    m_funct3::MULHSU => AluOp::Mulhsu,
                    m_funct3::MULHU => AluOp::Mulhu,
                    m_funct3::DIV => AluOp::Div,
                    m_funct3::DIVU => AluOp::Divu,
                    m_funct3::REM => AluOp::Rem,
                    _ => AluOp::Remu,
                }
            } else {
                match (d.funct3, d.funct7) {
                    (i_funct3::ADD_SUB, i_funct7::DEFAULT) => AluOp::Add,
                    (i_funct3::ADD_SUB, i_funct7::SUB_SRA) => AluOp::Sub,
                    (i_funct3::SLL, i_funct7::DEFAULT) => AluOp::Sll,
                    (i_funct3::SLT, i_funct7::DEFAULT) => AluOp::Slt,
                    (i_funct3::SLTU, i_funct7::DEFAULT) => AluOp::Sltu,
                    (i_funct3::XOR, i_funct7::DEFAULT) => AluOp::Xor,
                    (i_funct3::SRL_SRA, i_funct7::DEFAULT) => AluOp::Srl,
                    (i_funct3::SRL_SRA, i_funct7::SUB_SRA) => AluOp::Sra,
                    (i_funct3::OR, i_funct7::DEFAULT) => AluOp::Or,
                    (i_funct3::AND, i_funct7::DEFAULT) => AluOp::And,
                    _ => return Err(illegal),
                }
            };
        }
        i_opcodes::OP_MISC_MEM => {
            c.system = match d.funct3 {
                i_funct3::FENCE => SystemOp::Fence,
                i_funct3::FENCE_I => SystemOp::FenceI,
                _ => return Err(illegal),
            };
        }
        i_opcodes::OP_SYSTEM => decode_system(&d, &mut c)?,
        _ => return Err(illegal),
    }

    c.result_stage = result_stage(&c);
    Ok(c)
}

fn decode_system(d: &Decoded, c: &mut ControlSignals) -> Result<(), Trap> {
    let inst = d.raw;
    if d.funct3 == i_funct3::PRIV {
        c.system = match inst {
            sys_ops::ECALL => SystemOp::None,
            sys_ops::WFI => SystemOp::Wfi,
            sys_ops::EBREAK => SystemOp::Ebreak,
            sys_ops::MRET => SystemOp::Mret,
            _ => return Err(Trap::IllegalInstruction(inst)),
        };
        return Ok(());
    }
    c.csr_op = match d.funct3 {
        sys_ops::CSRRW => CsrOp::Rw,
        sys_ops::CSRRS => CsrOp::Rs,
        sys_ops::CSRRC => CsrOp::Rc,
        sys_ops::CSRRWI => CsrOp::Rwi,
        sys_ops::CSRRSI => CsrOp::Rsi,
        sys_ops::CSRRCI => CsrOp::Rci,
        _ => return Err(Trap::IllegalInstruction(inst)),
    };
    c.csr_addr = inst.csr();
    c.reg_write = true;
    c.reads_rs1 = !c.csr_op.uses_immediate();
    Ok(())
}

/// Stage at the end of which the result of an instruction can be forwarded.
const fn result_stage(c: &ControlSignals) -> ResultStage {
    if c.mem_read || !matches!(c.csr_op, CsrOp::None) {
        return ResultStage::Writeback;
    }
    match c.alu {
        AluOp::Mul | AluOp::Mulh | AluOp::Mulhsu | AluOp::Mulhu => ResultStage::Writeback,
        AluOp::Slt
        | AluOp::Sltu
        | AluOp::Sll
        | AluOp::Srl
        | AluOp::Sra
        | AluOp::Div
        | AluOp::Divu
        | AluOp::Rem
        | AluOp::Remu => ResultStage::Memory,
        AluOp::Add | AluOp::Sub | AluOp::Xor | AluOp::Or | AluOp::And => ResultStage::Execute,
    }
}
