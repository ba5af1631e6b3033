//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the core. It provides:
//! 1. **Cycle and CPI:** Total cycles, retired instructions, and derived metrics.
//! 2. **Instruction mix:** Counts by category (ALU, mul/div, load, store, branch, system).
//! 3. **Branch prediction:** Correct and mispredicted control transfers.
//! 4. **Stalls and flushes:** Data, fetch, memory, write-buffer and divider stall cycles.
//! 5. **Memory system:** Cache hit/miss counts and write buffer activity.
//! 6. **Traps and debug:** Exceptions, interrupts and debug halts taken.

use std::fmt::{self, Write as _};

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions retired.
    pub instructions_retired: u64,

    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of branch/jump instructions retired.
    pub inst_branch: u64,
    /// Count of integer ALU instructions retired.
    pub inst_alu: u64,
    /// Count of multiply/divide instructions retired.
    pub inst_muldiv: u64,
    /// Count of system (CSR, fence, mret, etc.) instructions retired.
    pub inst_system: u64,

    /// Number of branch/jump predictions that were correct.
    pub branch_predictions: u64,
    /// Number of branch/jump predictions that were wrong (mispredictions).
    pub branch_mispredictions: u64,

    /// Cycles Decode held its instruction waiting for an operand.
    pub stalls_data: u64,
    /// Cycles Fetch waited on the instruction port.
    pub stalls_fetch: u64,
    /// Cycles Memory waited on the data port or for the write buffer to drain.
    pub stalls_memory: u64,
    /// Cycles a store waited for a free write buffer slot.
    pub stalls_wrbuf_full: u64,
    /// Cycles Execute was occupied by the divider.
    pub stalls_divider: u64,
    /// Pipeline flushes (mispredictions, traps, `mret`, `fence.i`, debug halts).
    pub flushes: u64,

    /// L1 instruction cache hit count.
    pub icache_hits: u64,
    /// L1 instruction cache miss count.
    pub icache_misses: u64,
    /// L1 data cache hit count.
    pub dcache_hits: u64,
    /// L1 data cache miss count.
    pub dcache_misses: u64,

    /// Stores entered into the write buffer.
    pub wrbuf_enqueues: u64,
    /// Loads satisfied from the write buffer.
    pub wrbuf_forwards: u64,
    /// Write buffer entries written to the bus.
    pub wrbuf_drains: u64,
    /// Write buffer entries dropped because the bus write faulted.
    pub wrbuf_faults: u64,

    /// Number of synchronous exceptions taken.
    pub traps_taken: u64,
    /// Number of interrupts taken.
    pub interrupts_taken: u64,
    /// Number of debug-mode halts.
    pub debug_halts: u64,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"core"`, `"instruction_mix"`, `"branch"`, `"memory"`.
pub const STATS_SECTIONS: &[&str] = &["summary", "core", "instruction_mix", "branch", "memory"];

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

impl SimStats {
    /// Cycles per retired instruction (0 before the first retirement).
    pub fn cpi(&self) -> f64 {
        if self.instructions_retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions_retired as f64
        }
    }

    /// Renders only the requested statistics sections.
    ///
    /// # Arguments
    ///
    /// * `sections` - Section names from [`STATS_SECTIONS`], or empty for all.
    pub fn report(&self, sections: &[&str]) -> String {
        let want = |s: &str| sections.is_empty() || sections.contains(&s);
        let mut out = String::new();
        let _ = self.write_sections(&mut out, &want);
        out
    }

    fn write_sections(&self, out: &mut String, want: &dyn Fn(&str) -> bool) -> fmt::Result {
        let cyc = self.cycles;
        let instr = self.instructions_retired;
        if want("summary") {
            writeln!(out, "==========================================================")?;
            writeln!(out, "RV32IM CORE SIMULATION STATISTICS")?;
            writeln!(out, "==========================================================")?;
            writeln!(out, "sim_cycles               {cyc}")?;
            writeln!(out, "sim_insts                {instr}")?;
            writeln!(out, "sim_cpi                  {:.4}", self.cpi())?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("core") {
            writeln!(out, "CORE BREAKDOWN")?;
            for (name, value) in [
                ("stalls.data", self.stalls_data),
                ("stalls.fetch", self.stalls_fetch),
                ("stalls.memory", self.stalls_memory),
                ("stalls.wrbuf_full", self.stalls_wrbuf_full),
                ("stalls.divider", self.stalls_divider),
            ] {
                writeln!(out, "  {name:<22} {value} ({:.2}%)", percent(value, cyc))?;
            }
            writeln!(out, "  {:<22} {}", "flushes", self.flushes)?;
            writeln!(out, "  {:<22} {}", "traps", self.traps_taken)?;
            writeln!(out, "  {:<22} {}", "interrupts", self.interrupts_taken)?;
            writeln!(out, "  {:<22} {}", "debug_halts", self.debug_halts)?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("instruction_mix") {
            writeln!(out, "INSTRUCTION MIX")?;
            for (name, value) in [
                ("op.alu", self.inst_alu),
                ("op.muldiv", self.inst_muldiv),
                ("op.load", self.inst_load),
                ("op.store", self.inst_store),
                ("op.branch", self.inst_branch),
                ("op.system", self.inst_system),
            ] {
                writeln!(out, "  {name:<22} {value} ({:.2}%)", percent(value, instr))?;
            }
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("branch") {
            let total = self.branch_predictions + self.branch_mispredictions;
            writeln!(out, "BRANCH PREDICTION")?;
            writeln!(out, "  bp.lookups             {total}")?;
            writeln!(out, "  bp.mispredicts         {}", self.branch_mispredictions)?;
            writeln!(
                out,
                "  bp.accuracy            {:.2}%",
                percent(self.branch_predictions, total)
            )?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("memory") {
            writeln!(out, "MEMORY HIERARCHY")?;
            for (name, hits, misses) in [
                ("L1-I", self.icache_hits, self.icache_misses),
                ("L1-D", self.dcache_hits, self.dcache_misses),
            ] {
                writeln!(
                    out,
                    "  {name:<6} accesses: {:<10} | hits: {hits:<10} | miss_rate: {:.2}%",
                    hits + misses,
                    percent(misses, hits + misses)
                )?;
            }
            writeln!(
                out,
                "  wrbuf  enqueues: {} | forwards: {} | drains: {} | faults: {}",
                self.wrbuf_enqueues, self.wrbuf_forwards, self.wrbuf_drains, self.wrbuf_faults
            )?;
            writeln!(out, "==========================================================")?;
        }
        Ok(())
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report(&[]))
    }
}
