//! Instruction Disassembler for RV32IM.
//!
//! Converts a 32-bit instruction encoding into a human-readable mnemonic
//! string for retire traces, logging, and test diagnostics.
//!
//! # Usage
//!
//! ```
//! use rv32im_core::isa::disasm::disassemble;
//! assert_eq!(disassemble(0x00A00513), "addi a0, zero, 10");
//! ```

use crate::isa::abi::name as xreg;
use crate::isa::decode::decode;
use crate::isa::instruction::InstructionBits;
use crate::isa::privileged::opcodes as sys_op;
use crate::isa::rv32i::{funct3 as i_f3, funct7 as i_f7, opcodes as i_op};
use crate::isa::rv32m::funct3 as m_f3;

/// Disassembles a 32-bit RISC-V instruction into a human-readable string.
///
/// Returns a mnemonic like `"add a0, a1, a2"` or `"unknown"` for
/// unrecognised encodings.
pub fn disassemble(inst: u32) -> String {
    let d = decode(inst);
    let (rd, rs1, rs2) = (xreg(d.rd), xreg(d.rs1), xreg(d.rs2));

    match d.opcode {
        i_op::OP_LUI => format!("lui {rd}, {:#x}", (d.imm as u32) >> 12),
        i_op::OP_AUIPC => format!("auipc {rd}, {:#x}", (d.imm as u32) >> 12),
        i_op::OP_JAL => format!("jal {rd}, {}", d.imm),
        i_op::OP_JALR => format!("jalr {rd}, {}({rs1})", d.imm),
        i_op::OP_BRANCH => {
            let m = match d.funct3 {
                i_f3::BEQ => "beq",
                i_f3::BNE => "bne",
                i_f3::BLT => "blt",
                i_f3::BGE => "bge",
                i_f3::BLTU => "bltu",
                i_f3::BGEU => "bgeu",
                _ => return "unknown".into(),
            };
            format!("{m} {rs1}, {rs2}, {}", d.imm)
        }
        i_op::OP_LOAD => {
            let m = match d.funct3 {
                i_f3::LB => "lb",
                i_f3::LH => "lh",
                i_f3::LW => "lw",
                i_f3::LBU => "lbu",
                i_f3::LHU => "lhu",
                _ => return "unknown".into(),
            };
            format!("{m} {rd}, {}({rs1})", d.imm)
        }
        i_op::OP_STORE => {
            let m = match d.funct3 {
                i_f3::SB => "sb",
                i_f3::SH => "sh",
                i_f3::SW => "sw",
                _ => return "unknown".into(),
            };
            format!("{m} {rs2}, {}({rs1})", d.imm)
        }
        i_op::OP_IMM => {
            let shamt = d.rs2;
            match (d.funct3, d.funct7) {
                (i_f3::ADD_SUB, _) => format!("addi {rd}, {rs1}, {}", d.imm),
                (i_f3::SLT, _) => format!("slti {rd}, {rs1}, {}", d.imm),
                (i_f3::SLTU, _) => format!("sltiu {rd}, {rs1}, {}", d.imm),
                (i_f3::XOR, _) => format!("xori {rd}, {rs1}, {}", d.imm),
                (i_f3::OR, _) => format!("ori {rd}, {rs1}, {}", d.imm),
                (i_f3::AND, _) => format!("andi {rd}, {rs1}, {}", d.imm),
                (i_f3::SLL, i_f7::DEFAULT) => format!("slli {rd}, {rs1}, {shamt}"),
                (i_f3::SRL_SRA, i_f7::DEFAULT) => format!("srli {rd}, {rs1}, {shamt}"),
                (i_f3::SRL_SRA, i_f7::SUB_SRA) => format!("srai {rd}, {rs1}, {shamt}"),
                _ => "unknown".into(),
            }
        }
        i_op::OP_REG => {
            let m = match (d.funct7, d.funct3) {
                (i_f7::DEFAULT, i_f3::ADD_SUB) => "add",
                (i_f7::SUB_SRA, i_f3::ADD_SUB) => "sub",
                (i_f7::DEFAULT, i_f3::SLL) => "sll",
                (i_f7::DEFAULT, i_f3::SLT) => "slt",
                (i_f7::DEFAULT, i_f3::SLTU) => "sltu",
                (i_f7::DEFAULT, i_f3::XOR) => "xor",
                (i_f7::DEFAULT, i_f3::SRL_SRA) => "srl",
                (i_f7::SUB_SRA, i_f3::SRL_SRA) => "sra",
                (i_f7::DEFAULT, i_f3::OR) => "or",
                (i_f7::DEFAULT, i_f3::AND) => "and",
                (i_f7::MULDIV, m_f3::MUL) => "mul",
                (i_f7::MULDIV, m_f3::MULH) => "mulh",
                (i_f7::MULDIV, m_f3::MULHSU) => "mulhsu",
                (i_f7::MULDIV, m_f3::MULHU) => "mulhu",
                (i_f7::MULDIV, m_f3::DIV) => "div",
                (i_f7::MULDIV, m_f3::DIVU) => "divu",
                (i_f7::MULDIV, m_f3::REM) => "rem",
                (i_f7::MULDIV, m_f3::REMU) => "remu",
                _ => return "unknown".into(),
            };
            format!("{m} {rd}, {rs1}, {rs2}")
        }
        i_op::OP_MISC_MEM => match d.funct3 {
            i_f3::FENCE => "fence".into(),
            i_f3::FENCE_I => "fence.i".into(),
            _ => "unknown".into(),
        },
        i_op::OP_SYSTEM => match inst {
            sys_op::ECALL => "ecall".into(),
            sys_op::EBREAK => "ebreak".into(),
            sys_op::MRET => "mret".into(),
            sys_op::WFI => "wfi".into(),
            _ => {
                let csr = inst.csr();
                let m = match d.funct3 {
                    sys_op::CSRRW => "csrrw",
                    sys_op::CSRRS => "csrrs",
                    sys_op::CSRRC => "csrrc",
                    sys_op::CSRRWI => "csrrwi",
                    sys_op::CSRRSI => "csrrsi",
                    sys_op::CSRRCI => "csrrci",
                    _ => return "unknown".into(),
                };
                if d.funct3 >= sys_op::CSRRWI {
                    format!("{m} {rd}, {csr:#05x}, {}", d.rs1)
                } else {
                    format!("{m} {rd}, {csr:#05x}, {rs1}")
                }
            }
        },
        _ => "unknown".into(),
    }
}
