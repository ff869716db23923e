//! # fitpool - A Placement Strategy Simulator
//!
//! This crate simulates a user-space allocator working inside **one fixed-size
//! pool**, with pluggable placement strategies (first-fit, best-fit,
//! worst-fit and next-fit) so their fragmentation behaviour can be compared
//! on the same request trace.
//!
//! ## Overview
//!
//! The pool is described by a circular, doubly-linked list of blocks that
//! tile it with no gaps and no overlaps:
//!
//! ```text
//!   Pool of 500 bytes after a few requests:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │   ┌─────────┬────────┬─────────┬───────────┬──────────────────────┐  │
//!   │   │ A  100  │ F  100 │ A  100  │  A  50    │        F  150        │  │
//!   │   └─────────┴────────┴─────────┴───────────┴──────────────────────┘  │
//!   │   ▲                                         ▲                        │
//!   │   │                                         │                        │
//!   │  head                                     cursor                     │
//!   │  (offset 0)                         (next-fit resumes here)          │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   A = allocated, F = free. No two neighbouring blocks are ever both free.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   fitpool
//!   ├── align      - Rounding macros (align!, align_to!)
//!   ├── block      - Block, BlockId and Address
//!   ├── list       - Arena-backed circular block list (internal)
//!   ├── buffer     - Pool bytes from the C heap (internal)
//!   ├── strategy   - Strategy enum and block selection
//!   ├── config     - PoolConfig
//!   ├── error      - Error types
//!   ├── allocator  - PoolAllocator: initialize, allocate, release
//!   └── stats      - Fragmentation queries, status and dump
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fitpool::{PoolAllocator, ReleaseError, Strategy};
//!
//! let mut pool = PoolAllocator::new();
//! pool.initialize(Strategy::Best, 500).unwrap();
//!
//! let a = pool.allocate(100).unwrap();
//! let b = pool.allocate(100).unwrap();
//! pool.release(a).unwrap();
//!
//! assert_eq!(pool.hole_count(), 2);
//! assert_eq!(pool.bytes_allocated(), 100);
//! assert_eq!(pool.is_allocated(b), Some(true));
//! assert_eq!(pool.release(a), Err(ReleaseError::AlreadyFree { address: a }));
//! ```
//!
//! ## How It Works
//!
//! Allocation asks the active [`Strategy`] for a free block that is large
//! enough and **splits** it:
//!
//! ```text
//!   allocate(30) on a free block of 100:
//!
//!   ┌────────────────────────────────┐      ┌────────┬───────────────────────┐
//!   │             F 100              │  ──▶ │  A 30  │         F 70          │
//!   └────────────────────────────────┘      └────────┴───────────────────────┘
//! ```
//!
//! Release marks the block free and **coalesces** it with free neighbours on
//! both sides, so the list never holds two adjacent free blocks:
//!
//! ```text
//!   release(B):
//!
//!   ┌──────┬──────┬──────┬──────┐          ┌────────────────────┬──────┐
//!   │ F 20 │ A 20 │ F 20 │ A 40 │   ──▶    │        F 60        │ A 40 │
//!   └──────┴──────┴──────┴──────┘          └────────────────────┴──────┘
//!            B
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded**: no internal locking; serialize access externally.
//! - **One pool per allocator**: each [`PoolAllocator`] owns its own pool.
//! - **Linear scans**: every lookup walks the block list.

pub mod align;
mod allocator;
mod block;
mod buffer;
mod config;
mod error;
mod list;
mod stats;
mod strategy;

pub use allocator::PoolAllocator;
pub use block::Address;
pub use config::PoolConfig;
pub use error::{AllocError, InvariantViolation, ParseStrategyError, PoolError, ReleaseError};
pub use stats::{BlockInfo, PoolDump, PoolStatus};
pub use strategy::Strategy;
