//! Debug unit.
//!
//! Implements external run control of the core:
//! 1. **Halt:** A halt request, an `ebreak` with `dcsr.ebreakm`, a debug-mode trigger or
//!    a completed single step stops the core at the instruction in Memory.
//! 2. **Resume:** Restarts fetch at `dpc`, optionally for a single instruction.
//! 3. **Causes:** The halt reason recorded in `dcsr.cause`.

/// Match triggers (`tselect`, `tdata1`, `tdata2`).
pub mod trigger;

/// `dcsr.cause` values.
pub mod cause {
    /// `ebreak` executed with `dcsr.ebreakm` set.
    pub const EBREAK: u32 = 1;
    /// A trigger with action 1 fired.
    pub const TRIGGER: u32 = 2;
    /// The debugger requested a halt.
    pub const HALTREQ: u32 = 3;
    /// A single step completed.
    pub const STEP: u32 = 4;
}

/// Halt/resume/step state of the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugUnit {
    halted: bool,
    halt_request: bool,
    stepping: bool,
    stepped: bool,
}

impl DebugUnit {
    /// Creates a running debug unit with no pending request.
    pub const fn new() -> Self {
        Self {
            halted: false,
            halt_request: false,
            stepping: false,
            stepped: false,
        }
    }

    /// Returns `true` while the core is halted in debug mode.
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Returns `true` while a single step is in progress (interrupts are masked).
    pub const fn is_stepping(&self) -> bool {
        self.stepping
    }

    /// Latches a halt request; it takes effect at the next instruction boundary.
    pub const fn request_halt(&mut self) {
        if !self.halted {
            self.halt_request = true;
        }
    }

    /// Decides whether the instruction about to complete in Memory must halt first.
    ///
    /// # Arguments
    ///
    /// * `trigger` - A debug-mode trigger matched the instruction.
    /// * `ebreak` - The instruction is `ebreak` and `dcsr.ebreakm` is set.
    ///
    /// # Returns
    ///
    /// The `dcsr.cause` of the halt, by priority trigger, ebreak, halt request, step.
    pub const fn halt_cause(&self, trigger: bool, ebreak: bool) -> Option<u32> {
        if self.halted {
            None
        } else if trigger {
            Some(cause::TRIGGER)
        } else if ebreak {
            Some(cause::EBREAK)
        } else if self.halt_request {
            Some(cause::HALTREQ)
        } else if self.stepped {
            Some(cause::STEP)
        } else {
            None
        }
    }

    /// Enters debug mode.
    pub const fn halt(&mut self) {
        self.halted = true;
        self.halt_request = false;
        self.stepping = false;
        self.stepped = false;
    }

    /// Leaves debug mode.
    ///
    /// # Arguments
    ///
    /// * `step` - Value of `dcsr.step`: halt again after one instruction.
    pub const fn resume(&mut self, step: bool) {
        self.halted = false;
        self.stepping = step;
        self.stepped = false;
    }

    /// Records that an instruction completed (or trapped) in Memory.
    pub const fn instruction_done(&mut self) {
        if self.stepping {
            self.stepped = true;
        }
    }
}
