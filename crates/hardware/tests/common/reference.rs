//! Sequential reference model.
//!
//! A one-instruction-per-step RV32IM interpreter with the machine-mode trap
//! subset the property tests exercise. It has no pipeline, caches or bus timing,
//! so any difference from the core in architectural state is a core bug.

use std::collections::HashMap;

const MTVEC: u32 = 0x305;
const MSCRATCH: u32 = 0x340;
const MEPC: u32 = 0x341;
const MCAUSE: u32 = 0x342;
const MTVAL: u32 = 0x343;

#[derive(Debug, Default)]
pub struct Reference {
    pub regs: [u32; 32],
    pub pc: u32,
    pub mtvec: u32,
    pub mscratch: u32,
    pub mepc: u32,
    pub mcause: u32,
    pub mtval: u32,
    /// Byte-addressed memory; unwritten bytes read as zero.
    pub mem: HashMap<u32, u8>,
    /// Pc of every retired instruction in order.
    pub retired: Vec<u32>,
}

fn sext(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

impl Reference {
    pub fn new(pc: u32) -> Self {
        Self {
            pc,
            ..Self::default()
        }
    }

    pub fn load_words(&mut self, addr: u32, words: &[u32]) {
        for (i, w) in words.iter().enumerate() {
            self.write(addr + 4 * i as u32, *w, 4);
        }
    }

    pub fn read(&self, addr: u32, len: u32) -> u32 {
        (0..len).fold(0, |acc, i| {
            acc | u32::from(*self.mem.get(&addr.wrapping_add(i)).unwrap_or(&0)) << (8 * i)
        })
    }

    pub fn write(&mut self, addr: u32, val: u32, len: u32) {
        for i in 0..len {
            self.mem.insert(addr.wrapping_add(i), (val >> (8 * i)) as u8);
        }
    }

    fn set(&mut self, rd: u32, val: u32) {
        if rd != 0 {
            self.regs[rd as usize] = val;
        }
    }

    fn trap(&mut self, cause: u32, tval: u32) {
        self.mepc = self.pc;
        self.mcause = cause;
        self.mtval = tval;
        self.pc = self.mtvec;
    }

    fn csr(&mut self, addr: u32) -> Option<&mut u32> {
        match addr {
            MTVEC => Some(&mut self.mtvec),
            MSCRATCH => Some(&mut self.mscratch),
            MEPC => Some(&mut self.mepc),
            MCAUSE => Some(&mut self.mcause),
            MTVAL => Some(&mut self.mtval),
            _ => None,
        }
    }

    /// Runs until `stop` is about to execute or `limit` instructions retired.
    pub fn run_until(&mut self, stop: u32, limit: usize) {
        for _ in 0..limit {
            if self.pc == stop {
                return;
            }
            self.step();
        }
    }

    /// Executes one instruction.
    ///
    /// Instructions that trap are not recorded as retired.
    pub fn step(&mut self) {
        let pc = self.pc;
        let inst = self.read(pc, 4);
        let opcode = inst & 0x7F;
        let rd = (inst >> 7) & 0x1F;
        let f3 = (inst >> 12) & 0x7;
        let rs1 = (inst >> 15) & 0x1F;
        let rs2 = (inst >> 20) & 0x1F;
        let f7 = inst >> 25;
        let a = self.regs[rs1 as usize];
        let b = self.regs[rs2 as usize];
        let imm_i = sext(inst >> 20, 12);
        let imm_s = sext(((inst >> 25) << 5) | ((inst >> 7) & 0x1F), 12);
        let imm_b = sext(
            ((inst >> 31) << 12)
                | (((inst >> 7) & 1) << 11)
                | (((inst >> 25) & 0x3F) << 5)
                | (((inst >> 8) & 0xF) << 1),
            13,
        );
        let imm_j = sext(
            ((inst >> 31) << 20)
                | (((inst >> 12) & 0xFF) << 12)
                | (((inst >> 20) & 1) << 11)
                | (((inst >> 21) & 0x3FF) << 1),
            21,
        );
        let mut next = pc.wrapping_add(4);

        match opcode {
            0x37 => self.set(rd, inst & 0xFFFF_F000),
            0x17 => self.set(rd, pc.wrapping_add(inst & 0xFFFF_F000)),
            0x6F | 0x67 => {
                let target = if opcode == 0x6F {
                    pc.wrapping_add(imm_j as u32)
                } else {
                    a.wrapping_add(imm_i as u32) & !1
                };
                if target & 3 != 0 {
                    return self.trap(0, target);
                }
                self.set(rd, next);
                next = target;
            }
            0x63 => {
                let taken = match f3 {
                    0 => a == b,
                    1 => a != b,
                    4 => (a as i32) < (b as i32),
                    5 => (a as i32) >= (b as i32),
                    6 => a < b,
                    7 => a >= b,
                    _ => return self.trap(2, inst),
                };
                if taken {
                    let target = pc.wrapping_add(imm_b as u32);
                    if target & 3 != 0 {
                        return self.trap(0, target);
                    }
                    next = target;
                }
            }
            0x03 => {
                let addr = a.wrapping_add(imm_i as u32);
                let len = 1 << (f3 & 3);
                if addr % len != 0 {
                    return self.trap(4, addr);
                }
                let raw = self.read(addr, len);
                let val = match f3 {
                    0 => sext(raw, 8) as u32,
                    1 => sext(raw, 16) as u32,
                    2 | 4 | 5 => raw,
                    _ => return self.trap(2, inst),
                };
                self.set(rd, val);
            }
            0x23 => {
                let addr = a.wrapping_add(imm_s as u32);
                let len = 1 << f3;
                if f3 > 2 {
                    return self.trap(2, inst);
                }
                if addr % len != 0 {
                    return self.trap(6, addr);
                }
                self.write(addr, b, len);
            }
            0x13 => {
                let shamt = (imm_i as u32) & 0x1F;
                let val = match (f3, f7) {
                    (0, _) => a.wrapping_add(imm_i as u32),
                    (2, _) => u32::from((a as i32) < imm_i),
                    (3, _) => u32::from(a < imm_i as u32),
                    (4, _) => a ^ imm_i as u32,
                    (6, _) => a | imm_i as u32,
                    (7, _) => a & imm_i as u32,
                    (1, 0) => a << shamt,
                    (5, 0) => a >> shamt,
                    (5, 0x20) => ((a as i32) >> shamt) as u32,
                    _ => return self.trap(2, inst),
                };
                self.set(rd, val);
            }
            0x33 if f7 == 1 => {
                let (sa, sb) = (a as i32, b as i32);
                let val = match f3 {
                    0 => a.wrapping_mul(b),
                    1 => ((i64::from(sa) * i64::from(sb)) >> 32) as u32,
                    2 => ((i64::from(sa) * i64::from(b)) >> 32) as u32,
                    3 => ((u64::from(a) * u64::from(b)) >> 32) as u32,
                    4 if b == 0 => u32::MAX,
                    4 => sa.wrapping_div(sb) as u32,
                    5 => a.checked_div(b).unwrap_or(u32::MAX),
                    6 if b == 0 => a,
                    6 => sa.wrapping_rem(sb) as u32,
                    _ => a.checked_rem(b).unwrap_or(a),
                };
                self.set(rd, val);
            }
            0x33 => {
                let val = match (f3, f7) {
                    (0, 0) => a.wrapping_add(b),
                    (0, 0x20) => a.wrapping_sub(b),
                    (1, 0) => a << (b & 0x1F),
                    (2, 0) => u32::from((a as i32) < (b as i32)),
                    (3, 0) => u32::from(a < b),
                    (4, 0) => a ^ b,
                    (5, 0) => a >> (b & 0x1F),
                    (5, 0x20) => ((a as i32) >> (b & 0x1F)) as u32,
                    (6, 0) => a | b,
                    (7, 0) => a & b,
                    _ => return self.trap(2, inst),
                };
                self.set(rd, val);
            }
            0x0F => {}
            0x73 => match (f3, inst) {
                (0, 0x0000_0073) => return self.trap(11, 0),
                (0, 0x0010_0073) => return self.trap(3, pc),
                (0, 0x3020_0073) => next = self.mepc,
                (1..=3 | 5..=7, _) => {
                    let src = if f3 >= 5 { rs1 } else { a };
                    let write = f3 & 3 == 1 || rs1 != 0;
                    let addr = inst >> 20;
                    let Some(old) = self.csr(addr).map(|reg| *reg) else {
                        return self.trap(2, inst);
                    };
                    if write {
                        let mut new = match f3 & 3 {
                            1 => src,
                            2 => old | src,
                            _ => old & !src,
                        };
                        if matches!(addr, MTVEC | MEPC) {
                            new &= !3;
                        }
                        if let Some(reg) = self.csr(addr) {
                            *reg = new;
                        }
                    }
                    self.set(rd, old);
                }
                _ => return self.trap(2, inst),
            },
            _ => return self.trap(2, inst),
        }
        self.retired.push(pc);
        self.pc = next;
    }
}
