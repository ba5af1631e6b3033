//! # Write Buffer Tests
//!
//! Store buffering as seen by programs: forwarding to younger loads, stalls on
//! partial overlap, back-pressure when full, and FIFO drain order on the bus.

use pretty_assertions::assert_eq;
use rv32im_core::config::Config;

use crate::common::builder::*;
use crate::common::harness::TestContext;
use crate::common::mocks::recording::{BusWrite, RecordingDevice};

const RECORDER_BASE: u32 = 0x2000_0000;

/// Data cache on with slow bus beats, so buffered stores stay pending for a while.
fn buffered_config(latency: u32) -> Config {
    let mut config = Config::default();
    config.memory.latency = latency;
    config.icache.enabled = true;
    config.icache.nwords = 16;
    config.dcache.enabled = true;
    config
}

#[test]
fn test_load_forwarded_from_pending_store() {
    let mut ctx = TestContext::with_config(&buffered_config(8));
    let halt = ctx.load_program(&[addi(1, 0, 0x77), sw(0, 1, 0x400), lw(2, 0, 0x400)]);
    ctx.run_until(halt);
    assert_eq!(ctx.reg(2), 0x77);
    assert_eq!(ctx.stats().wrbuf_enqueues, 1);
    assert_eq!(ctx.stats().wrbuf_forwards, 1);
    assert_eq!(ctx.stats().dcache_misses, 0);
}

#[test]
fn test_sub_word_load_forwarded_from_word_store() {
    let mut ctx = TestContext::with_config(&buffered_config(8));
    let [hi, lo] = crate::common::harness::li(1, 0x1234_5678);
    let halt = ctx.load_program(&[hi, lo, sw(0, 1, 0x400), lbu(2, 0, 0x402), lh(3, 0, 0x400)]);
    ctx.run_until(halt);
    assert_eq!(ctx.reg(2), 0x34);
    assert_eq!(ctx.reg(3), 0x5678);
    assert_eq!(ctx.stats().wrbuf_forwards, 2);
}

#[test]
fn test_partial_overlap_waits_for_drain() {
    let mut ctx = TestContext::with_config(&buffered_config(8));
    let halt = ctx.load_program(&[
        addi(1, 0, 0x77),
        sw(0, 1, 0x400),
        lw(2, 0, 0x400),
        addi(4, 0, 0x11),
        sb(0, 4, 0x401),
        lw(3, 0, 0x400),
    ]);
    ctx.run_until(halt);
    assert_eq!(ctx.reg(2), 0x77);
    assert_eq!(ctx.reg(3), 0x1177);
    assert_eq!(ctx.stats().wrbuf_forwards, 1);
    assert_eq!(ctx.stats().dcache_misses, 1);
}

#[test]
fn test_full_buffer_stalls_memory() {
    let mut config = buffered_config(4);
    config.write_buffer.depth = 1;
    let mut ctx = TestContext::with_config(&config);
    let halt = ctx.load_program(&[sw(0, 0, 0x400), sw(0, 0, 0x404), sw(0, 0, 0x408)]);
    ctx.run_until(halt);
    assert!(ctx.stats().stalls_wrbuf_full > 0);
    assert_eq!(ctx.stats().wrbuf_enqueues, 3);
}

#[test]
fn test_stores_reach_the_bus_in_program_order() {
    let mut config = buffered_config(2);
    config.dcache.base = u64::from(RECORDER_BASE);
    config.dcache.limit = u64::from(RECORDER_BASE) + 0x1000;
    let mut ctx = TestContext::with_config(&config);
    let (recorder, log) = RecordingDevice::new(RECORDER_BASE, 0x1000);
    ctx.sim.add_device(Box::new(recorder));

    let halt = ctx.load_program(&[
        lui(1, RECORDER_BASE >> 12),
        addi(2, 0, 0x11),
        addi(3, 0, 0x22),
        addi(4, 0, 0x33),
        sw(1, 2, 8),
        sw(1, 3, 0),
        sb(1, 4, 9),
        sh(1, 3, 6),
        lw(5, 1, 8),
    ]);
    ctx.run_until(halt);
    ctx.drain();

    assert_eq!(
        *log.borrow(),
        vec![
            BusWrite { addr: RECORDER_BASE + 8, data: 0x11, mask: 0b1111 },
            BusWrite { addr: RECORDER_BASE, data: 0x22, mask: 0b1111 },
            BusWrite { addr: RECORDER_BASE + 8, data: 0x3300, mask: 0b0010 },
            BusWrite { addr: RECORDER_BASE + 4, data: 0x0022_0000, mask: 0b1100 },
        ]
    );
    assert_eq!(ctx.reg(5), 0x3311);
    assert_eq!(ctx.stats().wrbuf_drains, 4);
}

#[test]
fn test_buffered_store_to_unmapped_address_is_dropped() {
    let mut config = buffered_config(0);
    config.memory.ram_size = 0x1000;
    let mut ctx = TestContext::with_config(&config);
    let halt = ctx.load_program(&[lui(1, 0x10), sw(1, 0, 0), addi(2, 0, 1)]);
    ctx.run_until(halt);
    ctx.drain();
    // The store retired before the bus rejected it: no precise trap.
    assert_eq!(ctx.reg(2), 1);
    assert_eq!(ctx.stats().wrbuf_faults, 1);
    assert_eq!(ctx.stats().instructions_retired, 4);
}
