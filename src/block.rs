use std::fmt;

/// Stable handle of a [`Block`] inside the block arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub(crate) usize);

/// Location of a region inside the pool, as a byte offset from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(usize);

impl Address {
  /// First byte of the pool.
  pub const BASE: Address = Address(0);

  pub const fn new(offset: usize) -> Self {
    Self(offset)
  }

  pub const fn offset(self) -> usize {
    self.0
  }
}

impl fmt::Display for Address {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{:#06x}", self.0)
  }
}

/// One contiguous region of the pool, linked to its neighbours in address
/// order. Blocks describe the pool memory, they never own it.
#[derive(Debug, Clone)]
pub struct Block {
  pub size: usize,
  pub is_free: bool,
  pub offset: usize,
  pub prev: BlockId,
  pub next: BlockId,
}

impl Block {
  /// Creates an unlinked block; the list fixes up `prev`/`next` on insert.
  pub fn new(
    size: usize,
    is_free: bool,
    offset: usize,
  ) -> Self {
    Self {
      size,
      is_free,
      offset,
      prev: BlockId(0),
      next: BlockId(0),
    }
  }

  pub fn fits(
    &self,
    size: usize,
  ) -> bool {
    self.is_free && self.size >= size
  }

  pub fn address(&self) -> Address {
    Address(self.offset)
  }

  /// Offset one past the last byte of the region.
  pub fn end(&self) -> usize {
    self.offset + self.size
  }
}
