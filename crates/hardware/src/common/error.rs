//! Trap definitions.
//!
//! This module defines the single error channel of the core. It provides:
//! 1. **Trap Representation:** Every synchronous exception and asynchronous interrupt the
//!    machine-mode core can take, together with the value recorded in `mtval`.
//! 2. **Cause Encoding:** Conversion to the `mcause` encoding (interrupt bit plus code).
//! 3. **Prioritization:** The fixed tie-break used when one instruction collects more
//!    than one exception on its way through the pipeline.
//! 4. **Error Handling:** Integration with the standard Rust error traits.

use std::fmt;

use crate::isa::privileged::cause::{exception, interrupt};

/// RISC-V trap types representing exceptions and interrupts.
///
/// Traps cause the processor to transfer control to the handler at `mtvec`.
/// Only the causes reachable in a machine-mode-only RV32IM core are listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Instruction address misaligned exception.
    ///
    /// Raised by a taken branch or jump whose target is not 4-byte aligned.
    /// The associated value is the misaligned target.
    InstructionAddressMisaligned(u32),

    /// Instruction access fault exception.
    ///
    /// Raised when the instruction fetch port reports a bus error.
    /// The associated value is the faulting fetch address.
    InstructionAccessFault(u32),

    /// Illegal instruction exception.
    ///
    /// Raised when an instruction encoding is invalid, not implemented, or
    /// accesses a CSR it may not access. The associated value is the encoding.
    IllegalInstruction(u32),

    /// Breakpoint exception.
    ///
    /// Raised by `EBREAK` or by a trigger whose action is a breakpoint.
    /// The associated value is the program counter or the matched data address.
    Breakpoint(u32),

    /// Load address misaligned exception.
    ///
    /// The associated value is the misaligned effective address.
    LoadAddressMisaligned(u32),

    /// Load access fault exception.
    ///
    /// Raised when the data port reports a bus error for a load.
    /// The associated value is the effective address.
    LoadAccessFault(u32),

    /// Store address misaligned exception.
    ///
    /// The associated value is the misaligned effective address.
    StoreAddressMisaligned(u32),

    /// Store access fault exception.
    ///
    /// Raised when the data port reports a bus error for an unbuffered store.
    /// The associated value is the effective address.
    StoreAccessFault(u32),

    /// Environment call from machine mode.
    EnvironmentCallFromMMode,

    /// Machine software interrupt.
    MachineSoftwareInterrupt,

    /// Machine timer interrupt.
    MachineTimerInterrupt,

    /// Machine external interrupt.
    ///
    /// Raised when any unmasked line of the 32-bit external interrupt vector is set.
    MachineExternalInterrupt,
}

impl Trap {
    /// Returns `true` for asynchronous interrupts.
    #[inline]
    pub const fn is_interrupt(self) -> bool {
        matches!(
            self,
            Self::MachineSoftwareInterrupt
                | Self::MachineTimerInterrupt
                | Self::MachineExternalInterrupt
        )
    }

    /// Returns the exception or interrupt code without the interrupt bit.
    pub const fn code(self) -> u32 {
        match self {
            Self::InstructionAddressMisaligned(_) => exception::INSTRUCTION_ADDRESS_MISALIGNED,
            Self::InstructionAccessFault(_) => exception::INSTRUCTION_ACCESS_FAULT,
            Self::IllegalInstruction(_) => exception::ILLEGAL_INSTRUCTION,
            Self::Breakpoint(_) => exception::BREAKPOINT,
            Self::LoadAddressMisaligned(_) => exception::LOAD_ADDRESS_MISALIGNED,
            Self::LoadAccessFault(_) => exception::LOAD_ACCESS_FAULT,
            Self::StoreAddressMisaligned(_) => exception::STORE_ADDRESS_MISALIGNED,
            Self::StoreAccessFault(_) => exception::STORE_ACCESS_FAULT,
            Self::EnvironmentCallFromMMode => exception::ENVIRONMENT_CALL_FROM_M_MODE,
            Self::MachineSoftwareInterrupt => interrupt::MACHINE_SOFTWARE,
            Self::MachineTimerInterrupt => interrupt::MACHINE_TIMER,
            Self::MachineExternalInterrupt => interrupt::MACHINE_EXTERNAL,
        }
    }

    /// Returns the value written to `mcause` when this trap is taken.
    ///
    /// # Returns
    ///
    /// The exception code, with bit 31 set for interrupts.
    #[inline]
    pub const fn cause(self) -> u32 {
        if self.is_interrupt() {
            interrupt::INTERRUPT_BIT | self.code()
        } else {
            self.code()
        }
    }

    /// Returns the value written to `mtval` when this trap is taken.
    pub const fn tval(self) -> u32 {
        match self {
            Self::InstructionAddressMisaligned(v)
            | Self::InstructionAccessFault(v)
            | Self::IllegalInstruction(v)
            | Self::Breakpoint(v)
            | Self::LoadAddressMisaligned(v)
            | Self::LoadAccessFault(v)
            | Self::StoreAddressMisaligned(v)
            | Self::StoreAccessFault(v) => v,
            Self::EnvironmentCallFromMMode
            | Self::MachineSoftwareInterrupt
            | Self::MachineTimerInterrupt
            | Self::MachineExternalInterrupt => 0,
        }
    }

    /// Combines two exceptions raised by the same instruction.
    ///
    /// The exception with the lower cause code wins; on equal codes the one
    /// already recorded is kept.
    ///
    /// # Arguments
    ///
    /// * `current` - Exception already carried by the instruction, if any.
    /// * `new` - Exception detected by the current stage.
    ///
    /// # Returns
    ///
    /// The exception the instruction carries from now on.
    #[inline]
    pub const fn prioritize(current: Option<Self>, new: Self) -> Self {
        match current {
            Some(old) if old.code() <= new.code() => old,
            _ => new,
        }
    }
}

impl fmt::Display for Trap {
    /// Formats the trap for display.
    ///
    /// # Arguments
    ///
    /// * `f` - The formatter to write to.
    ///
    /// # Returns
    ///
    /// A formatting result indicating success or failure.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructionAddressMisaligned(addr) => {
                write!(f, "InstructionAddressMisaligned({addr:#x})")
            }
            Self::InstructionAccessFault(addr) => write!(f, "InstructionAccessFault({addr:#x})"),
            Self::IllegalInstruction(inst) => write!(f, "IllegalInstruction({inst:#010x})"),
            Self::Breakpoint(pc) => write!(f, "Breakpoint({pc:#x})"),
            Self::LoadAddressMisaligned(addr) => write!(f, "LoadAddressMisaligned({addr:#x})"),
            Self::LoadAccessFault(addr) => write!(f, "LoadAccessFault({addr:#x})"),
            Self::StoreAddressMisaligned(addr) => write!(f, "StoreAddressMisaligned({addr:#x})"),
            Self::StoreAccessFault(addr) => write!(f, "StoreAccessFault({addr:#x})"),
            Self::EnvironmentCallFromMMode => write!(f, "EnvironmentCallFromMMode"),
            Self::MachineSoftwareInterrupt => write!(f, "MachineSoftwareInterrupt"),
            Self::MachineTimerInterrupt => write!(f, "MachineTimerInterrupt"),
            Self::MachineExternalInterrupt => write!(f, "MachineExternalInterrupt"),
        }
    }
}

impl std::error::Error for Trap {}
