//! Translation Consistency Tests.
//!
//! Drives random load/store streams over more pages than there are frames,
//! with a short CLOCK period so sweeps, refreshes, combo packing, and
//! evictions interleave, and checks after every access that:
//! - The TLB holds each page at most once, and only for the frame that holds it
//! - No two valid page-table entries map the same page
//! - A pinned page keeps its frame and its FIXED bit
//! - Every load returns the last value stored at that address

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;

use crate::common::harness::{TestContext, small_config};

const PAGES: u64 = 24;
const PINNED_PAGE: u64 = 30;
const SLOTS_PER_PAGE: u64 = 128;

fn context() -> TestContext {
    let mut config = small_config();
    config.paging.frames = 8;
    config.paging.tlb_entries = 4;
    config.paging.clock_period = 40;
    config.paging.clock_sweep_width = 3;
    let ctx = TestContext::with_config(config);
    ctx.map_pages(PINNED_PAGE + 1);
    ctx
}

fn assert_consistent(ctx: &TestContext, pinned_frame: usize) {
    let processor = &ctx.processor;
    let frames = processor.mmu().frames();

    let tlb_pages = processor.mmu().tlb.valid_pages();
    let unique: BTreeSet<u64> = tlb_pages.iter().copied().collect();
    assert_eq!(unique.len(), tlb_pages.len(), "page cached twice: {tlb_pages:?}");
    for page in tlb_pages {
        let entry = processor.mmu().tlb.lookup(page).unwrap();
        assert!(entry.frame < frames);
        let pte = processor.page_table_entry(entry.frame).unwrap();
        assert!(pte.is_valid(), "TLB maps {page:#x} to empty frame {}", entry.frame);
        assert_eq!(pte.vaddr, page);
    }

    let mut resident = BTreeSet::new();
    for frame in 0..frames {
        let pte = processor.page_table_entry(frame).unwrap();
        if pte.is_valid() {
            assert!(resident.insert(pte.vaddr), "page {:#x} resident twice", pte.vaddr);
        }
    }

    let pinned = processor.page_table_entry(pinned_frame).unwrap();
    assert!(pinned.is_valid() && pinned.is_fixed());
    assert_eq!(pinned.vaddr, ctx.page(PINNED_PAGE));
}

fn access() -> impl Strategy<Value = (bool, u64, u64, u64)> {
    (any::<bool>(), 0..PAGES, 0..SLOTS_PER_PAGE, any::<u64>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn translation_state_stays_consistent(accesses in prop::collection::vec(access(), 1..80)) {
        let mut ctx = context();
        let pinned_frame = ctx.processor.pin_page(ctx.page(PINNED_PAGE)).unwrap().unwrap();
        let mut shadow: HashMap<u64, u64> = HashMap::new();

        for (write, page, slot, value) in accesses {
            let address = ctx.page(page) + slot * 8;
            if write {
                ctx.processor.store_u64(address, value).unwrap();
                let _ = shadow.insert(address, value);
            } else {
                let loaded = ctx.processor.load_u64(address).unwrap();
                prop_assert_eq!(loaded, shadow.get(&address).copied().unwrap_or(0));
            }
            assert_consistent(&ctx, pinned_frame);
        }
    }
}
