//! Read-only queries over the block list.
//!
//! Each query is one linear walk over the current blocks; none of them
//! touches allocator state. On an allocator without a pool they all report
//! an empty pool.

use std::fmt;

use crate::{
  allocator::PoolAllocator,
  block::{Address, Block},
  strategy::Strategy,
};

/// Public view of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  pub address: Address,
  pub size: usize,
  pub is_free: bool,
}

impl From<&Block> for BlockInfo {
  fn from(block: &Block) -> Self {
    Self {
      address: block.address(),
      size: block.size,
      is_free: block.is_free,
    }
  }
}

impl PoolAllocator {
  /// Blocks in address order, starting at the pool base.
  pub fn blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
    self
      .pool
      .iter()
      .flat_map(|pool| pool.blocks.iter().map(|(_, block)| BlockInfo::from(block)))
  }

  fn free_blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
    self.blocks().filter(|info| info.is_free)
  }

  /// Number of free regions.
  pub fn hole_count(&self) -> usize {
    self.free_blocks().count()
  }

  pub fn bytes_allocated(&self) -> usize {
    self.blocks().filter(|info| !info.is_free).map(|info| info.size).sum()
  }

  pub fn bytes_free(&self) -> usize {
    self.free_blocks().map(|info| info.size).sum()
  }

  /// Size of the biggest request that can currently succeed.
  pub fn largest_free_block(&self) -> usize {
    self.free_blocks().map(|info| info.size).max().unwrap_or(0)
  }

  /// Free regions of at most `threshold` bytes.
  pub fn small_free_count(
    &self,
    threshold: usize,
  ) -> usize {
    self.free_blocks().filter(|info| info.size <= threshold).count()
  }

  /// Whether the block starting at `address` is allocated; `None` when no
  /// block starts there.
  pub fn is_allocated(
    &self,
    address: Address,
  ) -> Option<bool> {
    let pool = self.pool.as_ref()?;
    let id = pool.locate(address)?;

    Some(!pool.blocks[id].is_free)
  }

  /// Address where the next next-fit scan starts.
  pub fn cursor(&self) -> Option<Address> {
    let pool = self.pool.as_ref()?;
    pool.blocks.get(pool.cursor).map(Block::address)
  }

  pub fn status(&self) -> PoolStatus {
    PoolStatus {
      strategy: self.strategy(),
      total_size: self.pool_total_size(),
      block_count: self.blocks().count(),
      hole_count: self.hole_count(),
      bytes_allocated: self.bytes_allocated(),
      bytes_free: self.bytes_free(),
      largest_free_block: self.largest_free_block(),
    }
  }

  /// Block-by-block listing for display.
  pub fn dump(&self) -> PoolDump<'_> {
    PoolDump { allocator: self }
  }
}

/// Aggregate fragmentation figures at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
  pub strategy: Option<Strategy>,
  pub total_size: usize,
  pub block_count: usize,
  pub hole_count: usize,
  pub bytes_allocated: usize,
  pub bytes_free: usize,
  pub largest_free_block: usize,
}

impl PoolStatus {
  pub fn average_hole_size(&self) -> Option<f64> {
    (self.hole_count > 0).then(|| self.bytes_free as f64 / self.hole_count as f64)
  }
}

impl fmt::Display for PoolStatus {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(
      f,
      "{} out of {} bytes allocated.",
      self.bytes_allocated, self.total_size
    )?;
    writeln!(
      f,
      "{} bytes are free in {} holes; maximum allocatable block is {} bytes.",
      self.bytes_free, self.hole_count, self.largest_free_block
    )?;
    match self.average_hole_size() {
      Some(average) => write!(f, "Average hole size is {average:.2}."),
      None => write!(f, "No holes."),
    }
  }
}

pub struct PoolDump<'a> {
  allocator: &'a PoolAllocator,
}

impl fmt::Display for PoolDump<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let strategy = self.allocator.strategy().map_or("unset", Strategy::name);
    writeln!(
      f,
      "pool: {} bytes, strategy {}",
      self.allocator.pool_total_size(),
      strategy
    )?;

    for (index, info) in self.allocator.blocks().enumerate() {
      let state = if info.is_free { "free" } else { "used" };
      writeln!(f, "{index:>4}  {}  {:>8}  {state}", info.address, info.size)?;
    }

    Ok(())
  }
}
