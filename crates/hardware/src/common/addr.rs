//! Virtual address type and bit-slicing helpers.
//!
//! This module defines a strong type for addresses issued by workloads before
//! translation. It provides the following:
//! 1. **Type Safety:** Keeps untranslated addresses apart from local frame addresses.
//! 2. **Address Slicing:** Page base, page offset, and sub-block index extraction.
//! 3. **Mask Derivation:** `bit_mask`, which builds masks by shifting so the
//!    top of the 64-bit address space never wraps.

use crate::common::error::{SimError, SimResult};

/// Returns a mask with the low `bits` bits set.
///
/// Masks are derived by shifting an all-ones word rather than subtracting one
/// from a power of two, so `bit_mask(64)` is `u64::MAX` instead of an overflow.
///
/// # Arguments
///
/// * `bits` - Number of low bits to set (values above 64 saturate).
///
/// # Returns
///
/// The mask as a `u64`.
#[inline(always)]
pub const fn bit_mask(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { !(u64::MAX << bits) }
}

/// A virtual address issued by a workload.
///
/// Virtual addresses are translated by the per-processor translator into local
/// frame addresses; in REAL mode they are used as local addresses directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Address of the last byte of a `len`-byte access starting here.
    ///
    /// Fails with `AddressOverflow` if the access wraps past `u64::MAX`.
    pub const fn last_byte(self, len: u64) -> SimResult<u64> {
        match self.0.checked_add(len.saturating_sub(1)) {
            Some(last) => Ok(last),
            None => Err(SimError::AddressOverflow { address: self.0, len }),
        }
    }

    /// Returns the page-aligned base of this address.
    ///
    /// # Arguments
    ///
    /// * `page_shift` - log2 of the page size.
    #[inline(always)]
    pub const fn page_base(self, page_shift: u32) -> u64 {
        self.0 & !bit_mask(page_shift)
    }

    /// Returns the page number (address shifted right by the page shift).
    #[inline(always)]
    pub const fn page_number(self, page_shift: u32) -> u64 {
        self.0 >> page_shift
    }

    /// Returns the byte offset of this address within its page.
    #[inline(always)]
    pub const fn page_offset(self, page_shift: u32) -> u64 {
        self.0 & bit_mask(page_shift)
    }

    /// Returns the index of the sub-block holding this address within its page.
    ///
    /// # Arguments
    ///
    /// * `page_shift` - log2 of the page size.
    /// * `block_shift` - log2 of the sub-block size.
    #[inline(always)]
    pub const fn block_index(self, page_shift: u32, block_shift: u32) -> usize {
        (self.page_offset(page_shift) >> block_shift) as usize
    }
}

impl std::fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
