//! Error types for pool operations.
//!
//! Every failure is reported through the return value of the call that
//! detected it; nothing is retried internally.

use thiserror::Error;

use crate::block::Address;

/// Why an allocation request produced no address.
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
  #[error("no allocation strategy configured")]
  StrategyNotSet,

  #[error("pool has not been initialized")]
  Uninitialized,

  #[error("zero-sized allocation request")]
  ZeroSize,

  #[error("request of {requested} bytes (after alignment rounding) exceeds pool size of {total} bytes")]
  ExceedsPool { requested: usize, total: usize },

  #[error("no free block fits {requested} bytes (largest free block: {largest_free})")]
  NoFit { requested: usize, largest_free: usize },
}

impl AllocError {
  /// Whether the same request may succeed after some releases.
  #[must_use]
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::NoFit { .. })
  }

  #[must_use]
  pub fn code(&self) -> &'static str {
    match self {
      Self::StrategyNotSet => "POOL:CONFIG:STRATEGY",
      Self::Uninitialized => "POOL:CONFIG:UNINIT",
      Self::ZeroSize => "POOL:ALLOC:ZERO",
      Self::ExceedsPool { .. } => "POOL:ALLOC:TOO_LARGE",
      Self::NoFit { .. } => "POOL:ALLOC:NO_FIT",
    }
  }
}

/// Misuse detected while releasing a region. State is left untouched.
#[must_use = "errors should be handled"]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseError {
  #[error("block at {address} is already free")]
  AlreadyFree { address: Address },

  #[error("no block starts at {address}")]
  InvalidAddress { address: Address },
}

/// Failure to set up a pool.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
  #[error("pool size must be greater than zero")]
  ZeroSize,

  #[error("alignment {alignment} is not a power of two")]
  InvalidAlignment { alignment: usize },

  #[error("failed to allocate a {size} byte pool buffer")]
  BufferAllocation { size: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown allocation strategy '{name}' (expected first, best, worst or next)")]
pub struct ParseStrategyError {
  pub name: String,
}

/// A broken structural invariant of the block list. Always an
/// implementation bug, never a runtime condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
  #[error("block sizes add up to {accounted} bytes, pool holds {total}")]
  SizeMismatch { accounted: usize, total: usize },

  #[error("expected a block at offset {expected}, found one at {found}")]
  Gap { expected: usize, found: usize },

  #[error("free blocks at {first} and {second} were not coalesced")]
  AdjacentFree { first: Address, second: Address },

  #[error("block at {address} has zero size")]
  EmptyBlock { address: Address },

  #[error("links around block at {address} are inconsistent")]
  BrokenLink { address: Address },

  #[error("next-fit cursor does not refer to a live block")]
  StaleCursor,
}
