//! Instruction Fetch (IF) Stage.
//!
//! This module implements the second stage of the pipeline. It performs the following:
//! 1. **Port Access:** Reads the word at the address in the Address→Fetch latch through
//!    the fetch unit (I-cache or direct bus access).
//! 2. **Fault Capture:** A fetch fault travels to Decode in place of the instruction.

use crate::common::constants::NOP;
use crate::core::Cpu;
use crate::core::pipeline::latches::FdEntry;
use crate::core::units::Progress;

/// Executes the instruction fetch stage.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
pub fn fetch_stage(cpu: &mut Cpu) {
    let Some(af) = cpu.latches.af else {
        return;
    };
    if cpu.latches.fd.is_some() {
        return;
    }
    let entry = match cpu.fetch.fetch(&mut cpu.bus, af.pc, &mut cpu.stats) {
        Progress::Busy => {
            cpu.stats.stalls_fetch += 1;
            return;
        }
        Progress::Done(Ok(inst)) => FdEntry {
            pc: af.pc,
            inst,
            trap: None,
        },
        Progress::Done(Err(trap)) => FdEntry {
            pc: af.pc,
            inst: NOP,
            trap: Some(trap),
        },
    };
    cpu.latches.af = None;
    cpu.latches.fd = Some(entry);
}
