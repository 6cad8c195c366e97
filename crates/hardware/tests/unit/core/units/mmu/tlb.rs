//! TLB Unit Tests.
//!
//! Verifies the per-processor translation cache:
//! - Lookup and installation
//! - No duplicate entries for one page
//! - Round-robin replacement when full
//! - Page and frame invalidation

use tilesim_core::core::units::mmu::tlb::Tlb;

// ══════════════════════════════════════════════════════════
// 1. Basic Operations
// ══════════════════════════════════════════════════════════

#[test]
fn lookup_miss_on_empty() {
    let tlb = Tlb::new(4);
    assert_eq!(tlb.lookup(0x400), None);
}

#[test]
fn install_and_lookup_hit() {
    let mut tlb = Tlb::new(4);
    tlb.install(0x400, 7, 0x9000);
    let entry = tlb.lookup(0x400).unwrap();
    assert_eq!((entry.frame, entry.frame_base), (7, 0x9000));
}

#[test]
fn zero_capacity_is_rounded_up() {
    assert_eq!(Tlb::new(0).capacity(), 1);
}

// ══════════════════════════════════════════════════════════
// 2. Uniqueness and Replacement
// ══════════════════════════════════════════════════════════

#[test]
fn reinstall_replaces_existing_entry() {
    let mut tlb = Tlb::new(4);
    tlb.install(0x400, 1, 0x1000);
    tlb.install(0x800, 2, 0x2000);
    tlb.install(0x400, 3, 0x3000);
    assert_eq!(tlb.valid_pages(), vec![0x400, 0x800]);
    assert_eq!(tlb.lookup(0x400).unwrap().frame, 3);
}

#[test]
fn full_tlb_replaces_round_robin() {
    let mut tlb = Tlb::new(2);
    tlb.install(0x000, 0, 0);
    tlb.install(0x400, 1, 0);
    tlb.install(0x800, 2, 0);
    assert_eq!(tlb.lookup(0x000), None);
    tlb.install(0xC00, 3, 0);
    assert_eq!(tlb.lookup(0x400), None);
    assert_eq!(tlb.valid_pages(), vec![0x800, 0xC00]);
}

// ══════════════════════════════════════════════════════════
// 3. Invalidation
// ══════════════════════════════════════════════════════════

#[test]
fn invalidate_page_reports_presence() {
    let mut tlb = Tlb::new(4);
    tlb.install(0x400, 1, 0);
    assert!(tlb.invalidate_page(0x400));
    assert!(!tlb.invalidate_page(0x400));
}

#[test]
fn invalidate_frame_and_flush() {
    let mut tlb = Tlb::new(4);
    tlb.install(0x400, 1, 0);
    tlb.install(0x800, 2, 0);
    tlb.invalidate_frame(1);
    assert_eq!(tlb.valid_pages(), vec![0x800]);
    tlb.flush();
    assert!(tlb.valid_pages().is_empty());
}
