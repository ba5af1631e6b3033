//! Address (AD) Stage.
//!
//! The first stage of the pipeline selects the next fetch address: a pending
//! redirect from Decode, Execute or Memory wins over the sequential pc.

use crate::common::constants::INSTRUCTION_SIZE;
use crate::core::Cpu;
use crate::core::pipeline::latches::AfEntry;

/// Executes the address stage.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
pub fn address_stage(cpu: &mut Cpu) {
    if cpu.latches.af.is_some() {
        return;
    }
    let pc = cpu.redirect.take().unwrap_or(cpu.pc);
    cpu.latches.af = Some(AfEntry { pc });
    cpu.pc = pc.wrapping_add(INSTRUCTION_SIZE);
}
