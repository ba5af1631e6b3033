//! # Interrupt Tests
//!
//! Sampling into `mip`, enable masks, priority and precise interrupt entry.

use pretty_assertions::assert_eq;
use rv32im_core::core::arch::csr;
use rv32im_core::soc::Interrupt;

use crate::common::builder::*;
use crate::common::harness::{MAX_CYCLES, TestContext, fast_config, li};

const HANDLER: u32 = 0x200;

/// Enables the interrupts in `mie_bits` and spins in a two-instruction loop.
///
/// Returns the context and the address of the loop.
fn spin_with_interrupts(mie_bits: u32, global: bool) -> (TestContext, u32) {
    let mut ctx = TestContext::new();
    ctx.cpu_mut().enable_retire_trace();
    ctx.load_words(HANDLER, &[jal(0, 0)]);
    let mut words = vec![addi(31, 0, HANDLER as i32), csrrw(0, csr::MTVEC, 31)];
    words.extend(li(1, mie_bits));
    words.push(csrrs(0, csr::MIE, 1));
    words.push(addi(2, 0, -1));
    words.push(csrrw(0, csr::IRQ_MASK, 2));
    if global {
        words.push(csrrsi(0, csr::MSTATUS, 8));
    }
    let spin = 4 * words.len() as u32;
    words.extend([addi(5, 5, 1), jal(0, -4)]);
    ctx.load_words(0, &words);
    (ctx, spin)
}

// ══════════════════════════════════════════════════════════
// 1. Sampling
// ══════════════════════════════════════════════════════════

#[test]
fn test_lines_are_visible_in_mip() {
    let mut ctx = TestContext::new();
    ctx.sim.set_irq(Interrupt::Timer, true);
    ctx.sim.set_irq(Interrupt::Software, true);
    ctx.run(1);
    assert_eq!(ctx.csr(csr::MIP), csr::MIP_MTIP | csr::MIP_MSIP);

    ctx.sim.set_irq(Interrupt::Timer, false);
    ctx.run(1);
    assert_eq!(ctx.csr(csr::MIP), csr::MIP_MSIP);
}

#[test]
fn test_external_lines_are_masked_by_irq_mask() {
    let mut ctx = TestContext::new();
    ctx.cpu_mut().csrs.irq_mask = 0b0100;
    ctx.sim.set_irq(Interrupt::External(3), true);
    ctx.run(1);
    assert_eq!(ctx.csr(csr::IRQ_PENDING), 0);
    assert_eq!(ctx.csr(csr::MIP), 0);

    ctx.sim.set_irq(Interrupt::External(2), true);
    ctx.run(1);
    assert_eq!(ctx.csr(csr::IRQ_PENDING), 0b0100);
    assert_eq!(ctx.csr(csr::MIP), csr::MIP_MEIP);
}

// ══════════════════════════════════════════════════════════
// 2. Masking
// ══════════════════════════════════════════════════════════

#[test]
fn test_interrupt_ignored_while_mstatus_mie_clear() {
    let (mut ctx, _) = spin_with_interrupts(csr::MIP_MTIP, false);
    ctx.sim.set_irq(Interrupt::Timer, true);
    ctx.run(500);
    assert_eq!(ctx.stats().interrupts_taken, 0);
    assert_ne!(ctx.reg(5), 0);
}

#[test]
fn test_interrupt_ignored_while_disabled_in_mie() {
    let (mut ctx, _) = spin_with_interrupts(csr::MIP_MSIP, true);
    ctx.sim.set_irq(Interrupt::Timer, true);
    ctx.run(500);
    assert_eq!(ctx.stats().interrupts_taken, 0);
    assert_eq!(ctx.csr(csr::MIP), csr::MIP_MTIP);
}

// ══════════════════════════════════════════════════════════
// 3. Entry
// ══════════════════════════════════════════════════════════

#[test]
fn test_timer_interrupt_is_precise() {
    let (mut ctx, spin) = spin_with_interrupts(csr::MIP_MTIP, true);
    ctx.run(200);
    ctx.sim.set_irq(Interrupt::Timer, true);
    ctx.run_until(HANDLER);

    assert_eq!(ctx.csr(csr::MCAUSE), 0x8000_0007);
    assert_eq!(ctx.csr(csr::MTVAL), 0);
    let mepc = ctx.csr(csr::MEPC);
    assert!(mepc == spin || mepc == spin + 4, "mepc {mepc:#x}");

    let mstatus = ctx.csr(csr::MSTATUS);
    assert_eq!(mstatus & csr::MSTATUS_MIE, 0);
    assert_ne!(mstatus & csr::MSTATUS_MPIE, 0);

    // Everything before mepc retired, nothing at or after it.
    let trace = ctx.cpu().retire_trace.clone().unwrap_or_default();
    let before = trace[trace.len() - 2];
    let expected = if mepc == spin { spin + 4 } else { spin };
    assert_eq!(before, expected);
    let increments = trace.iter().filter(|&&pc| pc == spin).count() as u32;
    assert_eq!(ctx.reg(5), increments);
    assert_eq!(ctx.stats().interrupts_taken, 1);
    assert_eq!(ctx.stats().traps_taken, 0);
}

#[test]
fn test_interrupt_tagged_in_decode_targets_next_instruction() {
    let mut ctx = TestContext::with_config(&fast_config());
    ctx.cpu_mut().enable_retire_trace();
    ctx.load_words(HANDLER, &[jal(0, 0)]);
    let mut words = vec![
        addi(31, 0, HANDLER as i32),
        csrrw(0, csr::MTVEC, 31),
        addi(1, 0, csr::MIP_MTIP as i32),
        csrrs(0, csr::MIE, 1),
        csrrsi(0, csr::MSTATUS, 8),
    ];
    words.extend([nop(); 12]);
    let _ = ctx.load_program(&words);

    // I sits in the Fetch->Decode latch and I+1 in the Address->Fetch latch.
    let inst = 4 * 12;
    for _ in 0..MAX_CYCLES {
        if ctx.cpu().latches.fd.map(|fd| fd.pc) == Some(inst) {
            break;
        }
        ctx.run(1);
    }
    assert_eq!(ctx.cpu().latches.af.map(|af| af.pc), Some(inst + 4));

    ctx.sim.set_irq(Interrupt::Timer, true);
    ctx.run_until(HANDLER);

    assert_eq!(ctx.csr(csr::MEPC), inst + 4);
    let trace = ctx.cpu().retire_trace.clone().unwrap_or_default();
    assert!(trace.contains(&inst));
    assert!(!trace.contains(&(inst + 4)));
}

#[test]
fn test_external_interrupt_cause() {
    let (mut ctx, _) = spin_with_interrupts(csr::MIP_MEIP, true);
    ctx.run(100);
    ctx.sim.set_irq(Interrupt::External(5), true);
    ctx.run_until(HANDLER);
    assert_eq!(ctx.csr(csr::MCAUSE), 0x8000_000B);
    assert_eq!(ctx.csr(csr::IRQ_PENDING), 1 << 5);
}

#[test]
fn test_software_interrupt_has_priority() {
    let (mut ctx, _) =
        spin_with_interrupts(csr::MIP_MSIP | csr::MIP_MTIP | csr::MIP_MEIP, true);
    ctx.run(100);
    ctx.sim.set_irq(Interrupt::External(0), true);
    ctx.sim.set_irq(Interrupt::Timer, true);
    ctx.sim.set_irq(Interrupt::Software, true);
    ctx.run_until(HANDLER);
    assert_eq!(ctx.csr(csr::MCAUSE), 0x8000_0003);
}

#[test]
fn test_handler_mret_resumes_interrupted_instruction() {
    let mut ctx = TestContext::new();
    // Handler: count, mask the timer and return.
    ctx.load_words(
        HANDLER,
        &[
            addi(7, 7, 1),
            addi(3, 0, csr::MIP_MTIP as i32),
            csrrc(0, csr::MIE, 3),
            mret(),
        ],
    );
    let mut words = vec![
        addi(31, 0, HANDLER as i32),
        csrrw(0, csr::MTVEC, 31),
        addi(1, 0, csr::MIP_MTIP as i32),
        csrrs(0, csr::MIE, 1),
        csrrsi(0, csr::MSTATUS, 8),
    ];
    words.extend([addi(5, 5, 1); 40]);
    let halt = ctx.load_program(&words);

    ctx.run(30);
    ctx.sim.set_irq(Interrupt::Timer, true);
    ctx.run_until(halt);

    assert_eq!(ctx.reg(7), 1);
    assert_eq!(ctx.reg(5), 40, "no increment lost or repeated");
    assert_ne!(ctx.csr(csr::MSTATUS) & csr::MSTATUS_MIE, 0);
}
