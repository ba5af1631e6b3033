//! CSR Access Logic.
//!
//! This module implements the Control and Status Register access rules of the CPU.
//! It performs the following:
//! 1. **Read Operations:** Maps CSR addresses to the CSR file, the counters and the
//!    optional trigger bank.
//! 2. **Write Operations:** Applies WARL masks and alignment of the writable registers.
//! 3. **Access Control:** Rejects missing registers, writes to the read-only space and
//!    instruction access to the debug registers.

use thiserror::Error;

use super::Cpu;
use crate::core::arch::csr;

/// Who performs a CSR access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsrOrigin {
    /// A CSR instruction executing on the core.
    Instruction,
    /// An abstract command from the debug interface.
    Debugger,
}

/// Reasons a CSR access is refused.
///
/// An instruction receiving any of these raises an illegal instruction exception.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CsrError {
    /// No such register in this configuration.
    #[error("CSR {0:#05x} is not implemented")]
    Unimplemented(u32),
    /// Write to the read-only CSR space.
    #[error("CSR {0:#05x} is read-only")]
    ReadOnly(u32),
    /// Debug register accessed from outside the debug interface.
    #[error("CSR {0:#05x} is only accessible from the debugger")]
    DebugOnly(u32),
}

const LOW: u64 = 0xFFFF_FFFF;

impl Cpu {
    fn debug_csr(&self, addr: u32, origin: CsrOrigin) -> Result<(), CsrError> {
        if self.debug.is_none() {
            Err(CsrError::Unimplemented(addr))
        } else if origin == CsrOrigin::Instruction {
            Err(CsrError::DebugOnly(addr))
        } else {
            Ok(())
        }
    }

    /// Reads a CSR.
    ///
    /// # Arguments
    ///
    /// * `addr` - The 12-bit CSR address.
    /// * `origin` - Who performs the access.
    ///
    /// # Returns
    ///
    /// The register value, or the reason the access is refused.
    pub fn csr_read(&self, addr: u32, origin: CsrOrigin) -> Result<u32, CsrError> {
        let value = match addr {
            csr::MVENDORID | csr::MARCHID | csr::MIMPID | csr::MHARTID => 0,
            csr::MSTATUS => self.csrs.mstatus,
            csr::MISA => self.csrs.misa,
            csr::MIE => self.csrs.mie,
            csr::MTVEC => self.csrs.mtvec,
            csr::IRQ_MASK => self.csrs.irq_mask,
            csr::MSCRATCH => self.csrs.mscratch,
            csr::MEPC => self.csrs.mepc,
            csr::MCAUSE => self.csrs.mcause,
            csr::MTVAL => self.csrs.mtval,
            csr::MIP => self.csrs.mip,
            csr::IRQ_PENDING => self.csrs.irq_pending,
            csr::MCYCLE | csr::CYCLE => self.csrs.mcycle as u32,
            csr::MCYCLEH | csr::CYCLEH => (self.csrs.mcycle >> 32) as u32,
            csr::MINSTRET | csr::INSTRET => self.csrs.minstret as u32,
            csr::MINSTRETH | csr::INSTRETH => (self.csrs.minstret >> 32) as u32,
            csr::TSELECT | csr::TDATA1 | csr::TDATA2 => {
                let triggers = self.triggers.as_ref().ok_or(CsrError::Unimplemented(addr))?;
                match addr {
                    csr::TSELECT => triggers.tselect(),
                    csr::TDATA1 => triggers.tdata1(),
                    _ => triggers.tdata2(),
                }
            }
            csr::DCSR => {
                self.debug_csr(addr, origin)?;
                self.csrs.dcsr
            }
            csr::DPC => {
                self.debug_csr(addr, origin)?;
                self.csrs.dpc
            }
            _ => return Err(CsrError::Unimplemented(addr)),
        };
        Ok(value)
    }

    /// Writes a CSR.
    ///
    /// Read-only bits and registers with no writable state (`misa`, `mip`,
    /// `irq_pending`) silently keep their value.
    ///
    /// # Arguments
    ///
    /// * `addr` - The 12-bit CSR address.
    /// * `val` - Value to write.
    /// * `origin` - Who performs the access.
    pub fn csr_write(&mut self, addr: u32, val: u32, origin: CsrOrigin) -> Result<(), CsrError> {
        let _ = self.csr_read(addr, origin)?;
        if csr::is_read_only(addr) {
            return Err(CsrError::ReadOnly(addr));
        }
        let debugger = origin == CsrOrigin::Debugger;
        match addr {
            csr::MSTATUS => {
                self.csrs.mstatus = csr::MSTATUS_MPP | (val & csr::MSTATUS_WRITE_MASK);
            }
            csr::MIE => self.csrs.mie = val & csr::MIE_WRITE_MASK,
            csr::MTVEC => self.csrs.mtvec = val & !0b11,
            csr::IRQ_MASK => self.csrs.irq_mask = val,
            csr::MSCRATCH => self.csrs.mscratch = val,
            csr::MEPC => self.csrs.mepc = val & !0b11,
            csr::MCAUSE => self.csrs.mcause = val,
            csr::MTVAL => self.csrs.mtval = val,
            csr::MCYCLE => self.csrs.mcycle = (self.csrs.mcycle & !LOW) | u64::from(val),
            csr::MCYCLEH => self.csrs.mcycle = (self.csrs.mcycle & LOW) | (u64::from(val) << 32),
            csr::MINSTRET => self.csrs.minstret = (self.csrs.minstret & !LOW) | u64::from(val),
            csr::MINSTRETH => {
                self.csrs.minstret = (self.csrs.minstret & LOW) | (u64::from(val) << 32);
            }
            csr::TSELECT | csr::TDATA1 | csr::TDATA2 => {
                if let Some(triggers) = self.triggers.as_mut() {
                    match addr {
                        csr::TSELECT => triggers.set_tselect(val),
                        csr::TDATA1 => triggers.write_tdata1(val, debugger),
                        _ => triggers.write_tdata2(val, debugger),
                    }
                }
            }
            csr::DCSR => {
                self.csrs.dcsr = (self.csrs.dcsr & !csr::DCSR_WRITE_MASK) | (val & csr::DCSR_WRITE_MASK);
            }
            csr::DPC => self.csrs.dpc = val & !0b11,
            _ => {}
        }
        Ok(())
    }
}
