//! Walk Geometry Tests.

use pretty_assertions::assert_eq;
use tilesim_core::common::error::WalkLevel;
use tilesim_core::core::units::mmu::ptw::{WalkIndices, entry_address, level_bytes, level_entries};

#[test]
fn decompose_slices_each_level() {
    let address = (3u64 << 37) | (5 << 28) | (7 << 19) | (9 << 10) | 0x2A;
    let indices = WalkIndices::decompose(address, 10);
    assert_eq!(
        indices,
        WalkIndices { super_directory: 3, directory: 5, super_table: 7, table: 9 }
    );
    assert_eq!(indices.at(WalkLevel::Table), 9);
}

#[test]
fn final_table_size_follows_page_size() {
    assert_eq!(level_entries(WalkLevel::Table, 10), 512);
    assert_eq!(level_entries(WalkLevel::Table, 12), 128);
    assert_eq!(level_entries(WalkLevel::SuperDirectory, 10), 2048);
    assert_eq!(level_bytes(WalkLevel::Directory, 10), 512 * 9);
}

#[test]
fn entries_are_nine_bytes_apart() {
    assert_eq!(entry_address(0x800, 0), 0x800);
    assert_eq!(entry_address(0x800, 3), 0x800 + 27);
}
