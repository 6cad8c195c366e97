//! Global Page Table Tests.
//!
//! Verifies the bump allocator behind the four-level global table:
//! - Mapping is idempotent and lookups agree with it
//! - Table and data regions report exhaustion

use rstest::rstest;
use tilesim_core::common::SimError;
use tilesim_core::config::Config;
use tilesim_core::sim::GlobalPageTables;
use tilesim_core::soc::memory::Memory;

fn setup(config: &Config) -> (GlobalPageTables, Memory) {
    let memory = Memory::new("GLOBAL", config.system.global_memory_size).unwrap();
    (GlobalPageTables::new(config), memory)
}

// ══════════════════════════════════════════════════════════
// 1. Mapping
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0)]
#[case(0x3FF)]
#[case(0x12_3456)]
#[case(1 << 40)]
fn mapped_address_resolves_inside_its_page(#[case] vaddr: u64) {
    let config = Config::default();
    let (mut tables, mut memory) = setup(&config);
    let page = tables.map_page(&mut memory, vaddr).unwrap();
    let offset = vaddr & (config.paging.page_size() - 1);
    assert_eq!(tables.lookup(&memory, vaddr).unwrap(), Some(page + offset));
    assert!(page >= config.system.global_data_base);
}

#[test]
fn map_range_maps_every_overlapping_page() {
    let config = Config::default();
    let (mut tables, mut memory) = setup(&config);
    let page_size = config.paging.page_size();
    tables.map_range(&mut memory, page_size - 1, page_size + 2).unwrap();
    for page in 0..3 {
        assert!(tables.lookup(&memory, page * page_size).unwrap().is_some());
    }
    assert_eq!(tables.lookup(&memory, 3 * page_size).unwrap(), None);
}

#[test]
fn range_wrapping_the_address_space_is_rejected() {
    let config = Config::default();
    let (mut tables, mut memory) = setup(&config);
    let err = tables.map_range(&mut memory, u64::MAX - 3, 8).unwrap_err();
    assert!(matches!(err, SimError::AddressOverflow { len: 8, .. }));
}

#[test]
fn empty_range_maps_nothing() {
    let config = Config::default();
    let (mut tables, mut memory) = setup(&config);
    let free = tables.free_data();
    tables.map_range(&mut memory, 0x1000, 0).unwrap();
    assert_eq!(tables.free_data(), free);
}

#[test]
fn each_new_page_consumes_data_region() {
    let config = Config::default();
    let (mut tables, mut memory) = setup(&config);
    let free = tables.free_data();
    let _ = tables.map_page(&mut memory, 0).unwrap();
    let _ = tables.map_page(&mut memory, 0x10).unwrap();
    assert_eq!(tables.free_data(), free - config.paging.page_size());
    assert_eq!(tables.tables_base(), config.system.global_tables_base);
}

// ══════════════════════════════════════════════════════════
// 2. Exhaustion
// ══════════════════════════════════════════════════════════

#[test]
fn table_region_exhaustion_is_reported() {
    let mut config = Config::default();
    config.system.global_data_base = 0x5000;
    let (mut tables, mut memory) = setup(&config);
    let err = tables.map_page(&mut memory, 0).unwrap_err();
    assert!(matches!(err, SimError::PageTableExhausted { .. }));
}

#[test]
fn data_region_exhaustion_is_reported() {
    let mut config = Config::default();
    config.system.global_memory_size = config.system.global_data_base + 2 * config.paging.page_size();
    let (mut tables, mut memory) = setup(&config);
    let page_size = config.paging.page_size();
    let _ = tables.map_page(&mut memory, 0).unwrap();
    let _ = tables.map_page(&mut memory, page_size).unwrap();
    let err = tables.map_page(&mut memory, 2 * page_size).unwrap_err();
    assert!(matches!(err, SimError::PageTableExhausted { needed } if needed == page_size));
}
