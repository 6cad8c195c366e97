//! Translation Tests.
//!
//! Verifies the translated access path:
//! - REAL mode passthrough
//! - TLB hits, the read-only bit, and dirty tracking
//! - Small faults on missing sub-blocks
//! - Data seeded in global memory reaching the processor

use pretty_assertions::assert_eq;
use rstest::rstest;
use tilesim_core::common::SimError;

use crate::common::harness::{TestContext, small_config};

// ══════════════════════════════════════════════════════════
// 1. REAL Mode
// ══════════════════════════════════════════════════════════

#[test]
fn real_mode_translation_is_identity_and_free() {
    let mut ctx = TestContext::unstarted(small_config());
    assert_eq!(ctx.processor.translate_for_read(0x1234).unwrap(), 0x1234);
    assert_eq!(ctx.processor.translate_for_write(0x88).unwrap(), 0x88);
    assert_eq!(ctx.processor.total_ticks(), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Loads and Stores
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x0, 0x1122_3344_5566_7788)]
#[case(0xC, 0xDEAD_BEEF)]
#[case(0x3F8, u64::MAX)]
fn store_then_load_returns_value(#[case] offset: u64, #[case] value: u64) {
    let mut ctx = TestContext::new();
    ctx.map_pages(1);
    ctx.processor.store_u64(offset, value).unwrap();
    assert_eq!(ctx.processor.load_u64(offset).unwrap(), value);
}

#[test]
fn byte_access_round_trips() {
    let mut ctx = TestContext::new();
    ctx.map_pages(1);
    ctx.processor.store_u8(0x21, 0x5A).unwrap();
    assert_eq!(ctx.processor.load_u8(0x21).unwrap(), 0x5A);
    assert_eq!(ctx.processor.load_u8(0x20).unwrap(), 0);
}

#[test]
fn access_straddling_pages_touches_both() {
    let mut ctx = TestContext::new();
    ctx.map_pages(2);
    let addr = ctx.page(1) - 4;
    ctx.processor.store_u64(addr, 0x0102_0304_0506_0708).unwrap();
    assert_eq!(ctx.processor.load_u64(addr).unwrap(), 0x0102_0304_0506_0708);
    assert!(ctx.frame_of(0).is_some());
    assert!(ctx.frame_of(ctx.page(1)).is_some());
}

#[test]
fn seeded_global_data_is_visible() {
    let mut ctx = TestContext::new();
    let addr = ctx.page(5) + 8;
    ctx.system.write_virtual(addr, &0x1234_5678u64.to_le_bytes()).unwrap();
    assert_eq!(ctx.processor.load_u64(addr).unwrap(), 0x1234_5678);
}

// ══════════════════════════════════════════════════════════
// 3. Faults and Flags
// ══════════════════════════════════════════════════════════

#[test]
fn missing_sub_block_takes_small_fault() {
    let mut ctx = TestContext::new();
    ctx.map_pages(1);
    ctx.processor.store_u64(0, 1).unwrap();
    assert_eq!(ctx.processor.hard_fault_count(), 1);
    assert_eq!(ctx.processor.small_fault_count(), 0);

    let _ = ctx.processor.load_u64(32).unwrap();
    assert_eq!(ctx.processor.hard_fault_count(), 1);
    assert_eq!(ctx.processor.small_fault_count(), 1);

    let _ = ctx.processor.load_u64(40).unwrap();
    assert_eq!(ctx.processor.small_fault_count(), 1);
}

#[test]
fn write_clears_read_only() {
    let mut ctx = TestContext::new();
    ctx.map_pages(1);
    let _ = ctx.processor.load_u64(0).unwrap();
    let frame = ctx.frame_of(0).unwrap();
    assert!(ctx.processor.page_table_entry(frame).unwrap().is_read_only());

    ctx.processor.store_u64(0, 9).unwrap();
    assert!(!ctx.processor.page_table_entry(frame).unwrap().is_read_only());
}

#[test]
fn write_marks_block_dirty_and_read_does_not() {
    let mut ctx = TestContext::new();
    ctx.map_pages(1);
    let _ = ctx.processor.load_u64(0x40).unwrap();
    ctx.processor.store_u64(0, 3).unwrap();
    let frame = ctx.frame_of(0).unwrap();
    ctx.processor.write_back_memory(frame).unwrap();
    assert_eq!(ctx.processor.stats().blocks_written_back, 1);
}

#[test]
fn tlb_hit_skips_page_table_scan() {
    let mut ctx = TestContext::new();
    ctx.map_pages(1);
    ctx.processor.store_u64(0, 1).unwrap();
    let before = ctx.processor.total_ticks();
    let _ = ctx.processor.load_u64(0).unwrap();
    let ticks = ctx.system.config().timing.tlb_lookup_ticks + ctx.system.config().timing.bitmap_ticks;
    assert_eq!(ctx.processor.total_ticks() - before, ticks);
}

#[test]
fn access_past_the_top_of_the_address_space_is_rejected() {
    let mut ctx = TestContext::new();
    let address = u64::MAX - 3;
    let err = ctx.processor.load_u64(address).unwrap_err();
    assert!(matches!(err, SimError::AddressOverflow { address: a, len: 8 } if a == address));
    let err = ctx.processor.store_u64(address, 1).unwrap_err();
    assert!(matches!(err, SimError::AddressOverflow { .. }));
    assert_eq!(ctx.processor.hard_fault_count(), 0);
}
