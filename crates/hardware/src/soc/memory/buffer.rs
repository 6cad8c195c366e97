//! Store Buffer Implementation.
//!
//! This module provides a safe wrapper around raw memory allocation for local and
//! global stores. It supports lazy allocation via `mmap` on Unix systems so that a
//! large global store or many tile-local stores only consume host memory for the
//! pages actually touched.

use std::slice;

use crate::common::{SimError, SimResult};

/// Owned, zero-initialised byte buffer.
///
/// On Unix systems, this uses `mmap` to allocate anonymous memory, which allows
/// for lazy allocation (pages are only allocated by the OS when accessed).
pub struct DramBuffer {
    ptr: *mut u8,
    size: usize,
}

// SAFETY: the buffer exclusively owns its allocation; shared access is read-only
// and mutation requires `&mut self`.
unsafe impl Send for DramBuffer {}
// SAFETY: see above.
unsafe impl Sync for DramBuffer {}

impl DramBuffer {
    /// Creates a new zeroed buffer of the specified size.
    ///
    /// On Unix, uses `mmap` for lazy allocation; on other platforms, allocates a `Vec`.
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the buffer in bytes.
    ///
    /// # Returns
    ///
    /// The buffer, or `Io` if the host mapping fails.
    pub fn new(size: usize) -> SimResult<Self> {
        if size == 0 {
            return Err(SimError::InvalidConfig("store size must be non-zero".to_string()));
        }

        #[cfg(unix)]
        {
            // SAFETY: anonymous private mapping with no address hint; the result is
            // checked against MAP_FAILED before use.
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    size,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(SimError::Io(std::io::Error::last_os_error()));
            }
            Ok(Self { ptr: ptr as *mut u8, size })
        }

        #[cfg(not(unix))]
        {
            let mut bytes = vec![0u8; size].into_boxed_slice();
            let ptr = bytes.as_mut_ptr();
            std::mem::forget(bytes);
            Ok(Self { ptr, size })
        }
    }

    /// Returns the size of the buffer in bytes.
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the buffer holds no bytes (never, for a constructed buffer).
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Borrows `len` bytes at `offset`, or `None` past the end.
    pub fn read_slice(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        if end > self.size {
            return None;
        }
        // SAFETY: offset..end lies inside the allocation checked above.
        Some(unsafe { slice::from_raw_parts(self.ptr.add(offset), len) })
    }

    /// Mutably borrows `len` bytes at `offset`, or `None` past the end.
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        let end = offset.checked_add(len)?;
        if end > self.size {
            return None;
        }
        // SAFETY: offset..end lies inside the allocation, and `&mut self` makes the
        // borrow exclusive.
        Some(unsafe { slice::from_raw_parts_mut(self.ptr.add(offset), len) })
    }
}

impl std::fmt::Debug for DramBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DramBuffer").field("size", &self.size).finish()
    }
}

impl Drop for DramBuffer {
    /// Releases the allocation.
    fn drop(&mut self) {
        #[cfg(unix)]
        // SAFETY: ptr/size came from a successful mmap and are unmapped exactly once.
        unsafe {
            let _ = libc::munmap(self.ptr.cast(), self.size);
        }

        #[cfg(not(unix))]
        // SAFETY: ptr/size came from a leaked boxed slice of exactly this length.
        unsafe {
            drop(Box::from_raw(slice::from_raw_parts_mut(self.ptr, self.size)));
        }
    }
}
