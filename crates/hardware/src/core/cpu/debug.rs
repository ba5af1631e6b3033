//! Debug Interface.
//!
//! Run control and abstract commands issued by an external debugger:
//! 1. **Run Control:** Halt request, resume and single step.
//! 2. **Abstract Commands:** GPR and CSR access, only while halted.

use thiserror::Error;
use tracing::info;

use super::Cpu;
use super::csr::{CsrError, CsrOrigin};
use crate::common::constants::NUM_GPRS;
use crate::core::arch::csr::DCSR_STEP;

/// Errors returned by debug interface requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DebugError {
    /// The core was built without a debug unit.
    #[error("debug unit not present")]
    NotPresent,
    /// The request is only valid while the core is halted.
    #[error("core is not halted")]
    NotHalted,
    /// Register index out of range.
    #[error("no such register x{0}")]
    InvalidRegister(usize),
    /// CSR access refused.
    #[error(transparent)]
    Csr(#[from] CsrError),
}

impl Cpu {
    /// Returns `true` while the core is halted in debug mode.
    pub fn is_halted(&self) -> bool {
        self.debug.is_some_and(|d| d.is_halted())
    }

    fn require_halted(&self) -> Result<(), DebugError> {
        match self.debug {
            None => Err(DebugError::NotPresent),
            Some(d) if !d.is_halted() => Err(DebugError::NotHalted),
            Some(_) => Ok(()),
        }
    }

    /// Requests a halt at the next instruction boundary.
    ///
    /// The core is halted once [`Cpu::is_halted`] returns `true`.
    pub fn debug_halt(&mut self) -> Result<(), DebugError> {
        let unit = self.debug.as_mut().ok_or(DebugError::NotPresent)?;
        unit.request_halt();
        Ok(())
    }

    /// Leaves debug mode and restarts fetch at `dpc`.
    ///
    /// If `dcsr.step` is set the core halts again after one instruction.
    pub fn debug_resume(&mut self) -> Result<(), DebugError> {
        self.require_halted()?;
        let step = self.csrs.single_step();
        if let Some(unit) = self.debug.as_mut() {
            unit.resume(step);
        }
        // Address ran after the halt and latched the sequential pc.
        self.latches.af = None;
        self.fetch.abort();
        self.redirect = Some(self.csrs.dpc);
        info!(dpc = %format_args!("{:#010x}", self.csrs.dpc), step, "debug resume");
        Ok(())
    }

    /// Executes exactly one instruction: sets `dcsr.step` and resumes.
    pub fn debug_step(&mut self) -> Result<(), DebugError> {
        self.require_halted()?;
        self.csrs.dcsr |= DCSR_STEP;
        self.debug_resume()
    }

    /// Reads a general-purpose register while halted.
    pub fn debug_read_gpr(&self, idx: usize) -> Result<u32, DebugError> {
        self.require_halted()?;
        if idx >= NUM_GPRS {
            return Err(DebugError::InvalidRegister(idx));
        }
        Ok(self.regs.read(idx))
    }

    /// Writes a general-purpose register while halted.
    pub fn debug_write_gpr(&mut self, idx: usize, val: u32) -> Result<(), DebugError> {
        self.require_halted()?;
        if idx >= NUM_GPRS {
            return Err(DebugError::InvalidRegister(idx));
        }
        self.regs.write(idx, val);
        Ok(())
    }

    /// Reads any CSR, including `dcsr` and `dpc`, while halted.
    pub fn debug_read_csr(&self, addr: u32) -> Result<u32, DebugError> {
        self.require_halted()?;
        Ok(self.csr_read(addr, CsrOrigin::Debugger)?)
    }

    /// Writes any writable CSR, including `dcsr` and `dpc`, while halted.
    pub fn debug_write_csr(&mut self, addr: u32, val: u32) -> Result<(), DebugError> {
        self.require_halted()?;
        Ok(self.csr_write(addr, val, CsrOrigin::Debugger)?)
    }
}
