//! # Control Flow Tests
//!
//! Static prediction in Decode, repair in Execute, and the `fence.i` refetch.

use pretty_assertions::assert_eq;
use rv32im_core::config::Config;

use crate::common::builder::*;
use crate::common::harness::{TestContext, fast_config, li};

fn run(config: &Config, body: &[u32]) -> TestContext {
    let mut ctx = TestContext::with_config(config);
    let halt = ctx.load_program(body);
    ctx.run_until(halt);
    ctx
}

#[test]
fn test_backward_loop_mispredicts_only_on_exit() {
    let ctx = run(
        &fast_config(),
        &[
            addi(1, 0, 3),
            addi(2, 2, 5),  // loop
            addi(1, 1, -1),
            bne(1, 0, -8),
        ],
    );
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.reg(2), 15);
    assert_eq!(ctx.stats().branch_mispredictions, 1);
    assert_eq!(ctx.stats().flushes, 1);
}

#[test]
fn test_forward_taken_branch_mispredicts() {
    let ctx = run(
        &fast_config(),
        &[
            addi(1, 0, 1),
            beq(1, 1, 8),
            addi(2, 0, 99), // skipped
            addi(3, 0, 7),
        ],
    );
    assert_eq!(ctx.reg(2), 0);
    assert_eq!(ctx.reg(3), 7);
    assert_eq!(ctx.stats().branch_mispredictions, 1);
}

#[test]
fn test_forward_not_taken_branch_is_free() {
    let ctx = run(&fast_config(), &[addi(1, 0, 1), bne(1, 1, 8), addi(2, 0, 5), addi(3, 0, 7)]);
    assert_eq!(ctx.reg(2), 5);
    assert_eq!(ctx.reg(3), 7);
    assert_eq!(ctx.stats().branch_mispredictions, 0);
    assert_eq!(ctx.stats().flushes, 0);
}

#[test]
fn test_wrong_path_instructions_leave_no_trace() {
    // Both instructions after the taken branch were fetched before Execute resolved it.
    let mut ctx = run(
        &fast_config(),
        &[beq(0, 0, 12), sw(0, 0, 0x400), addi(4, 0, 1), addi(5, 0, 2)],
    );
    assert_eq!(ctx.reg(4), 0);
    assert_eq!(ctx.reg(5), 2);
    assert_eq!(ctx.read_word(0x400), 0);
    assert_eq!(ctx.stats().instructions_retired, 3);
}

#[test]
fn test_jal_links_and_is_predicted() {
    let ctx = run(&fast_config(), &[jal(1, 8), addi(2, 0, 99), addi(3, 0, 7)]);
    assert_eq!(ctx.reg(1), 4);
    assert_eq!(ctx.reg(2), 0);
    assert_eq!(ctx.reg(3), 7);
    assert_eq!(ctx.stats().branch_mispredictions, 0);
}

#[test]
fn test_call_and_return() {
    let ctx = run(
        &fast_config(),
        &[
            jal(1, 12),     // 0: call 12
            addi(6, 0, 7),  // 4: return address
            jal(0, 12),     // 8: to halt
            addi(5, 0, 40), // 12: callee
            jalr(0, 1, 0),  // 16: return
        ],
    );
    assert_eq!(ctx.reg(1), 4);
    assert_eq!(ctx.reg(5), 40);
    assert_eq!(ctx.reg(6), 7);
    // Only the return is unpredicted.
    assert_eq!(ctx.stats().branch_mispredictions, 1);
}

#[test]
fn test_jalr_uses_forwarded_base() {
    let ctx = run(&fast_config(), &[addi(1, 0, 12), jalr(2, 1, 0), addi(3, 0, 99), addi(4, 0, 1)]);
    assert_eq!(ctx.reg(2), 8);
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.reg(4), 1);
}

#[test]
fn test_branch_compares_signed_and_unsigned() {
    let ctx = run(
        &fast_config(),
        &[
            addi(1, 0, -1),
            addi(2, 0, 1),
            blt(1, 2, 8),   // taken: -1 < 1
            addi(3, 0, 99),
            bltu(1, 2, 8),  // not taken: 0xFFFF_FFFF > 1
            addi(4, 0, 5),
        ],
    );
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.reg(4), 5);
}

#[test]
fn test_fence_i_refetches_modified_code() {
    let mut config = fast_config();
    config.icache.enabled = true;
    let [hi, lo] = li(7, addi(5, 0, 42));
    let mut ctx = run(
        &config,
        &[
            addi(10, 0, 0), // 0
            hi,             // 4
            lo,             // 8
            addi(5, 0, 1),  // 12: patched below
            bne(10, 0, 20), // 16: second pass done
            addi(10, 0, 1), // 20
            sw(0, 7, 12),   // 24
            fence_i(),      // 28
            jal(0, -20),    // 32: back to 12
        ],
    );
    assert_eq!(ctx.reg(5), 42);
    assert_eq!(ctx.read_word(12), addi(5, 0, 42));
}

#[test]
fn test_stale_icache_without_fence_i() {
    let mut config = fast_config();
    config.icache.enabled = true;
    let [hi, lo] = li(7, addi(5, 0, 42));
    let ctx = run(
        &config,
        &[
            addi(10, 0, 0),
            hi,
            lo,
            addi(5, 0, 1),
            bne(10, 0, 20),
            addi(10, 0, 1),
            sw(0, 7, 12),
            nop(),
            jal(0, -20),
        ],
    );
    // The line holding address 12 was never invalidated.
    assert_eq!(ctx.reg(5), 1);
}
