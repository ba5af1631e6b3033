//! Clock Tick Orchestration.
//!
//! This module advances the whole core by one clock cycle. It performs the following:
//! 1. **Counters:** Advances `mcycle` and the cycle statistic.
//! 2. **Background Work:** Lets the write buffer drain toward memory.
//! 3. **Stages:** Evaluates the stages from Writeback back to Address so that every
//!    stage sees the latch contents of the previous cycle.
//! 4. **Interrupts:** Samples the interrupt lines into `mip` at the end of the cycle.

use crate::core::Cpu;
use crate::core::pipeline::stages::{
    address_stage, decode::snapshot, decode_stage, execute_stage, fetch_stage, mem_stage,
    wb_stage,
};
use crate::core::units::exception;

impl Cpu {
    /// Advances the core by one clock cycle.
    ///
    /// Operand forwarding values are captured before any stage runs, so a
    /// result produced this cycle is visible to Decode only on the next one.
    /// While the debug unit holds the core halted, only the counters, the
    /// write buffer and the interrupt sampling advance.
    pub fn tick(&mut self) {
        self.csrs.mcycle = self.csrs.mcycle.wrapping_add(1);
        self.stats.cycles += 1;
        self.lsu.drain(&mut self.bus, &mut self.stats);

        if !self.is_halted() {
            let snap = snapshot(self);
            wb_stage(self);
            mem_stage(self);
            execute_stage(self);
            decode_stage(self, &snap);
            fetch_stage(self);
            address_stage(self);
        }

        exception::sample(&mut self.csrs, &self.irq_lines);
    }
}
