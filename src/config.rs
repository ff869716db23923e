//! Pool configuration

use crate::{error::PoolError, strategy::Strategy};

/// Settings a [`PoolAllocator`](crate::PoolAllocator) is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
  /// Placement policy. `None` leaves the pool usable for queries but every
  /// allocation fails with [`AllocError::StrategyNotSet`](crate::AllocError).
  pub strategy: Option<Strategy>,

  /// Bytes managed by the pool.
  pub total_size: usize,

  /// Request sizes are rounded up to this power of two.
  pub alignment: usize,

  /// Fill byte written over newly allocated regions
  pub alloc_pattern: Option<u8>,
  /// Fill byte written over released regions
  pub dealloc_pattern: Option<u8>,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      strategy: None,
      total_size: 0,
      alignment: 1,
      alloc_pattern: if cfg!(debug_assertions) { Some(0xBB) } else { None },
      dealloc_pattern: if cfg!(debug_assertions) { Some(0xDD) } else { None },
    }
  }
}

impl PoolConfig {
  pub fn new(
    strategy: Strategy,
    total_size: usize,
  ) -> Self {
    Self {
      strategy: Some(strategy),
      total_size,
      ..Default::default()
    }
  }

  /// Fill patterns on, so stale reads show up as `0xDD`.
  #[must_use]
  pub fn debug(
    strategy: Strategy,
    total_size: usize,
  ) -> Self {
    Self {
      alloc_pattern: Some(0xBB),
      dealloc_pattern: Some(0xDD),
      ..Self::new(strategy, total_size)
    }
  }

  /// No fill patterns, word-aligned requests.
  #[must_use]
  pub fn performance(
    strategy: Strategy,
    total_size: usize,
  ) -> Self {
    Self {
      alignment: std::mem::size_of::<usize>(),
      alloc_pattern: None,
      dealloc_pattern: None,
      ..Self::new(strategy, total_size)
    }
  }

  #[must_use]
  pub fn with_alignment(
    mut self,
    alignment: usize,
  ) -> Self {
    self.alignment = alignment;
    self
  }

  pub fn validate(&self) -> Result<(), PoolError> {
    if self.total_size == 0 {
      return Err(PoolError::ZeroSize);
    }
    if !self.alignment.is_power_of_two() {
      return Err(PoolError::InvalidAlignment { alignment: self.alignment });
    }
    Ok(())
  }
}
