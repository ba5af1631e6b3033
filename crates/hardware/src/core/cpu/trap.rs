//! Trap Handling.
//!
//! Memory-stage events that change the flow of control:
//! 1. **Redirect:** Kill Execute, Decode and Fetch and restart fetch at a new address.
//! 2. **Trap Entry:** Record the trap in the CSRs and jump to `mtvec`.
//! 3. **Debug Entry:** Record `dpc` and the cause and stop the pipeline.

use tracing::{debug, info};

use super::Cpu;
use crate::common::error::Trap;
use crate::core::units::exception;

impl Cpu {
    /// Flushes everything younger than Memory and restarts fetch at `target`.
    pub(crate) fn redirect_from_memory(&mut self, target: u32) {
        self.latches.flush_after_memory();
        self.fetch.abort();
        self.redirect = Some(target);
        self.stats.flushes += 1;
    }

    /// Takes a trap on the instruction at `pc`, which has not executed.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address of the trapping or interrupted instruction (becomes `mepc`).
    /// * `trap` - The trap being taken.
    pub(crate) fn take_trap(&mut self, pc: u32, trap: Trap) {
        let handler = exception::enter(&mut self.csrs, pc, trap);
        if trap.is_interrupt() {
            self.stats.interrupts_taken += 1;
        } else {
            self.stats.traps_taken += 1;
        }
        debug!(
            pc = %format_args!("{pc:#010x}"),
            %trap,
            handler = %format_args!("{handler:#010x}"),
            "trap taken"
        );
        self.redirect_from_memory(handler);
    }

    /// Halts the core in debug mode before the instruction at `pc` executes.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address of the instruction in Memory (becomes `dpc`).
    /// * `cause` - Value for `dcsr.cause`.
    pub(crate) fn enter_debug_mode(&mut self, pc: u32, cause: u32) {
        self.csrs.dpc = pc;
        self.csrs.set_debug_cause(cause);
        self.latches.flush_after_memory();
        self.latches.xm = None;
        self.fetch.abort();
        self.redirect = None;
        self.stats.flushes += 1;
        self.stats.debug_halts += 1;
        if let Some(unit) = self.debug.as_mut() {
            unit.halt();
        }
        info!(dpc = %format_args!("{pc:#010x}"), cause, "debug halt");
    }
}
