use std::{ptr::NonNull, slice};

use libc::{c_void, calloc, free};

use crate::error::PoolError;

/// Zero-initialised bytes backing a pool, obtained from the C heap.
pub(crate) struct PoolBuffer {
  ptr: NonNull<u8>,
  len: usize,
}

impl PoolBuffer {
  pub fn zeroed(len: usize) -> Result<Self, PoolError> {
    if len == 0 {
      return Err(PoolError::ZeroSize);
    }

    // SAFETY: `calloc` has no preconditions; a null return is handled below.
    let raw = unsafe { calloc(len, 1) } as *mut u8;
    let ptr = NonNull::new(raw).ok_or(PoolError::BufferAllocation { size: len })?;

    Ok(Self { ptr, len })
  }

  pub fn as_ptr(&self) -> *const u8 {
    self.ptr.as_ptr()
  }

  pub fn len(&self) -> usize {
    self.len
  }

  /// The `size` bytes starting at `offset`.
  pub fn region(
    &self,
    offset: usize,
    size: usize,
  ) -> &[u8] {
    &self.as_slice()[offset..offset + size]
  }

  pub fn region_mut(
    &mut self,
    offset: usize,
    size: usize,
  ) -> &mut [u8] {
    &mut self.as_mut_slice()[offset..offset + size]
  }

  fn as_slice(&self) -> &[u8] {
    // SAFETY: `ptr` came from a successful `calloc(len, 1)` and stays valid
    // until `drop`.
    unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
  }

  fn as_mut_slice(&mut self) -> &mut [u8] {
    // SAFETY: see `as_slice`; `&mut self` guarantees exclusive access.
    unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
  }
}

// SAFETY: the buffer is uniquely owned and only reachable through `&self` /
// `&mut self`, so moving it to another thread cannot alias the allocation.
unsafe impl Send for PoolBuffer {}

impl Drop for PoolBuffer {
  fn drop(&mut self) {
    // SAFETY: `ptr` came from `calloc` and is freed exactly once, here.
    unsafe { free(self.ptr.as_ptr() as *mut c_void) };
  }
}

impl std::fmt::Debug for PoolBuffer {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    f.debug_struct("PoolBuffer")
      .field("ptr", &self.ptr)
      .field("len", &self.len)
      .finish()
  }
}
