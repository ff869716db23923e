use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use crate::{
  align::round_request,
  block::{Address, Block, BlockId},
  buffer::PoolBuffer,
  config::PoolConfig,
  error::{AllocError, InvariantViolation, PoolError, ReleaseError},
  list::BlockList,
  strategy::Strategy,
};

/// Bytes of one pool together with the blocks describing them.
#[derive(Debug)]
pub(crate) struct Pool {
  pub buffer: PoolBuffer,
  pub blocks: BlockList,
  /// Block after the most recent allocation; where next-fit resumes.
  pub cursor: BlockId,
  /// Offsets handed back by `release` that still lie in free memory.
  pub released: BTreeSet<usize>,
}

impl Pool {
  fn new(size: usize) -> Result<Self, PoolError> {
    let buffer = PoolBuffer::zeroed(size)?;
    let blocks = BlockList::new(size);
    let cursor = blocks.head();

    Ok(Self {
      buffer,
      blocks,
      cursor,
      released: BTreeSet::new(),
    })
  }

  pub fn total_size(&self) -> usize {
    self.buffer.len()
  }

  /// Block starting exactly at `address`, if any.
  pub fn locate(
    &self,
    address: Address,
  ) -> Option<BlockId> {
    if address.offset() >= self.total_size() {
      return None;
    }
    self.blocks.find_by_offset(address.offset())
  }

  pub fn largest_free(&self) -> usize {
    self
      .blocks
      .iter()
      .filter(|(_, block)| block.is_free)
      .map(|(_, block)| block.size)
      .max()
      .unwrap_or(0)
  }

  /// Allocates the first `size` bytes of the free block `id`, leaving any
  /// remainder as a new free block right after it.
  fn split(
    &mut self,
    id: BlockId,
    size: usize,
  ) -> Address {
    let block = &mut self.blocks[id];
    debug_assert!(block.fits(size));

    block.is_free = false;
    let (offset, old_size) = (block.offset, block.size);

    if old_size > size {
      self.blocks[id].size = size;
      self
        .blocks
        .insert_after(id, Block::new(old_size - size, true, offset + size));
    }

    self.cursor = self.blocks[id].next;
    self
      .released
      .retain(|&released| released < offset || released >= offset + size);

    Address::new(offset)
  }

  /// Merges the freshly freed block `id` with every free neighbour and
  /// returns the surviving block. Never merges across the wrap-around from
  /// the last block back to the head.
  fn coalesce(
    &mut self,
    id: BlockId,
  ) -> BlockId {
    let head = self.blocks.head();
    let mut survivor = id;

    while survivor != head {
      let prev = self.blocks[survivor].prev;
      if !self.blocks[prev].is_free {
        break;
      }
      self.absorb(prev, survivor);
      survivor = prev;
    }

    loop {
      let next = self.blocks[survivor].next;
      if next == head || !self.blocks[next].is_free {
        break;
      }
      self.absorb(survivor, next);
    }

    survivor
  }

  /// Folds `victim` into its predecessor `into`.
  fn absorb(
    &mut self,
    into: BlockId,
    victim: BlockId,
  ) {
    let removed = self.blocks.remove(victim);
    self.blocks[into].size += removed.size;

    if self.cursor == victim {
      self.cursor = removed.next;
    }
  }

  fn check(&self) -> Result<(), InvariantViolation> {
    let mut expected = 0;
    let mut accounted = 0;
    let mut previous: Option<&Block> = None;

    for (id, block) in self.blocks.iter() {
      if block.size == 0 {
        return Err(InvariantViolation::EmptyBlock { address: block.address() });
      }
      if block.offset != expected {
        return Err(InvariantViolation::Gap {
          expected,
          found: block.offset,
        });
      }

      let linked = self.blocks.get(block.next).map(|next| next.prev) == Some(id)
        && self.blocks.get(block.prev).map(|prev| prev.next) == Some(id);
      if !linked {
        return Err(InvariantViolation::BrokenLink { address: block.address() });
      }

      if let Some(prev) = previous.filter(|prev| prev.is_free && block.is_free) {
        return Err(InvariantViolation::AdjacentFree {
          first: prev.address(),
          second: block.address(),
        });
      }

      expected = block.end();
      accounted += block.size;
      previous = Some(block);
    }

    if accounted != self.total_size() {
      return Err(InvariantViolation::SizeMismatch {
        accounted,
        total: self.total_size(),
      });
    }
    if !self.blocks.contains(self.cursor) {
      return Err(InvariantViolation::StaleCursor);
    }

    Ok(())
  }
}

/// A simulated allocator over one fixed-size pool.
///
/// All state (bytes, block list, next-fit cursor and the active strategy)
/// lives in this value, so independent pools never interfere. Operations
/// are synchronous and unsynchronised; wrap the allocator in a mutex to
/// share it.
#[derive(Debug, Default)]
pub struct PoolAllocator {
  pub(crate) config: PoolConfig,
  pub(crate) pool: Option<Pool>,
}

impl PoolAllocator {
  /// An allocator with no pool and no strategy. Queries report an empty
  /// pool and allocations fail until [`initialize`](Self::initialize).
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
    let mut allocator = Self::new();
    allocator.reconfigure(config)?;
    Ok(allocator)
  }

  /// Discards the current pool, if any, and starts over with a single free
  /// block of `size` bytes. Alignment and fill settings carry over.
  pub fn initialize(
    &mut self,
    strategy: Strategy,
    size: usize,
  ) -> Result<(), PoolError> {
    let config = PoolConfig {
      strategy: Some(strategy),
      total_size: size,
      ..self.config.clone()
    };
    self.reconfigure(config)
  }

  /// Like [`initialize`](Self::initialize) with every setting taken from
  /// `config`. An invalid config leaves the current pool untouched.
  pub fn reconfigure(
    &mut self,
    config: PoolConfig,
  ) -> Result<(), PoolError> {
    config.validate()?;

    // Retire every old block and the old buffer before the new pool exists.
    if let Some(old) = self.pool.take() {
      debug!(
        blocks = old.blocks.len(),
        size = old.total_size(),
        "discarding pool"
      );
    }

    self.pool = Some(Pool::new(config.total_size)?);
    debug!(
      strategy = ?config.strategy,
      size = config.total_size,
      alignment = config.alignment,
      "pool initialized"
    );
    self.config = config;

    Ok(())
  }

  pub fn config(&self) -> &PoolConfig {
    &self.config
  }

  pub fn strategy(&self) -> Option<Strategy> {
    self.config.strategy
  }

  /// Reserves `size` bytes and returns the address of the region.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<Address, AllocError> {
    let strategy = self.config.strategy.ok_or(AllocError::StrategyNotSet)?;
    let pool = self.pool.as_mut().ok_or(AllocError::Uninitialized)?;

    if size == 0 {
      return Err(AllocError::ZeroSize);
    }

    let total = pool.total_size();
    let requested = round_request(size, self.config.alignment).unwrap_or(usize::MAX);
    if requested > total {
      return Err(AllocError::ExceedsPool { requested, total });
    }

    let Some(chosen) = strategy.select(&pool.blocks, pool.cursor, requested) else {
      let largest_free = pool.largest_free();
      trace!(%strategy, requested, largest_free, "no fit");
      return Err(AllocError::NoFit { requested, largest_free });
    };

    let address = pool.split(chosen, requested);
    if let Some(pattern) = self.config.alloc_pattern {
      pool.buffer.region_mut(address.offset(), requested).fill(pattern);
    }
    trace!(%strategy, requested, %address, blocks = pool.blocks.len(), "allocated");

    self.debug_check();
    Ok(address)
  }

  /// Returns the region at `address` to the pool, merging it with free
  /// neighbours.
  pub fn release(
    &mut self,
    address: Address,
  ) -> Result<(), ReleaseError> {
    let Some(pool) = self.pool.as_mut() else {
      warn!(%address, "release without a pool");
      return Err(ReleaseError::InvalidAddress { address });
    };
    let Some(id) = pool.locate(address) else {
      // A block freed earlier may have been merged into a free predecessor.
      if pool.released.contains(&address.offset()) {
        warn!(%address, "release inside a free region");
        return Err(ReleaseError::AlreadyFree { address });
      }
      warn!(%address, "release of an address no block starts at");
      return Err(ReleaseError::InvalidAddress { address });
    };

    let block = &mut pool.blocks[id];
    if block.is_free {
      warn!(%address, "release of an already free block");
      return Err(ReleaseError::AlreadyFree { address });
    }
    block.is_free = true;
    let size = block.size;

    if let Some(pattern) = self.config.dealloc_pattern {
      pool.buffer.region_mut(address.offset(), size).fill(pattern);
    }

    pool.released.insert(address.offset());
    let survivor = pool.coalesce(id);
    trace!(
      %address,
      size,
      merged_into = %pool.blocks[survivor].address(),
      merged_size = pool.blocks[survivor].size,
      "released"
    );

    self.debug_check();
    Ok(())
  }

  /// Address of the first byte of the pool.
  pub fn pool_base(&self) -> Address {
    Address::BASE
  }

  pub fn pool_total_size(&self) -> usize {
    self.pool.as_ref().map_or(0, Pool::total_size)
  }

  /// Real location of the pool bytes in process memory.
  pub fn pool_ptr(&self) -> Option<*const u8> {
    self.pool.as_ref().map(|pool| pool.buffer.as_ptr())
  }

  /// Contents of the allocated region starting at `address`.
  pub fn bytes(
    &self,
    address: Address,
  ) -> Option<&[u8]> {
    let pool = self.pool.as_ref()?;
    let block = &pool.blocks[pool.locate(address)?];

    (!block.is_free).then(|| pool.buffer.region(block.offset, block.size))
  }

  pub fn bytes_mut(
    &mut self,
    address: Address,
  ) -> Option<&mut [u8]> {
    let pool = self.pool.as_mut()?;
    let id = pool.locate(address)?;
    let Block { offset, size, is_free, .. } = pool.blocks[id];

    if is_free {
      return None;
    }
    Some(pool.buffer.region_mut(offset, size))
  }

  /// Verifies the structural invariants of the block list: sizes add up
  /// to the pool size, blocks tile the pool without gaps, no two neighbours
  /// are both free and the next-fit cursor is live.
  pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
    self.pool.as_ref().map_or(Ok(()), Pool::check)
  }

  fn debug_check(&self) {
    if cfg!(debug_assertions) {
      if let Err(violation) = self.check_invariants() {
        panic!("pool invariant violated: {violation}");
      }
    }
  }
}
