//! Byte Store Tests.
//!
//! Verifies the mmap-backed buffer and the `ByteStore` view over it:
//! - Zero-initialized contents
//! - Little-endian multi-byte access
//! - Bounds checking at the end of the store

use tilesim_core::common::SimError;
use tilesim_core::soc::ByteStore;
use tilesim_core::soc::memory::Memory;
use tilesim_core::soc::memory::buffer::DramBuffer;

#[test]
fn buffer_starts_zeroed() {
    let buffer = DramBuffer::new(4096).unwrap();
    assert_eq!(buffer.len(), 4096);
    assert!(buffer.read_slice(0, 4096).unwrap().iter().all(|&b| b == 0));
}

#[test]
fn buffer_rejects_zero_size() {
    assert!(matches!(DramBuffer::new(0), Err(SimError::InvalidConfig(_))));
}

#[test]
fn buffer_slices_are_bounded() {
    let mut buffer = DramBuffer::new(64).unwrap();
    assert!(buffer.read_slice(60, 4).is_some());
    assert!(buffer.read_slice(61, 4).is_none());
    assert!(buffer.slice_mut(64, 1).is_none());
}

#[test]
fn memory_round_trips_little_endian() {
    let mut memory = Memory::new("LOCAL", 256).unwrap();
    memory.write_u64(8, 0x0102_0304_0506_0708).unwrap();
    assert_eq!(memory.read_u8(8).unwrap(), 0x08);
    assert_eq!(memory.read_u32(12).unwrap(), 0x0102_0304);
    assert_eq!(memory.read_u64(8).unwrap(), 0x0102_0304_0506_0708);
}

#[test]
fn memory_access_past_end_is_out_of_bounds() {
    let memory = Memory::new("GLOBAL", 16).unwrap();
    let err = memory.read_u64(12).unwrap_err();
    match err {
        SimError::OutOfBounds { store, address, len, size } => {
            assert_eq!((store, address, len, size), ("GLOBAL", 12, 8, 16));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn memory_reports_name_and_size() {
    let memory = Memory::new("LOCAL", 1024).unwrap();
    assert_eq!(memory.name(), "LOCAL");
    assert_eq!(memory.size(), 1024);
}
