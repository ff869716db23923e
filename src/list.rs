//! Circular doubly-linked list of [`Block`]s kept in an index arena.
//!
//! ```text
//!        head
//!         │
//!         ▼
//!   ┌──▶ [0] ◀──▶ [1] ◀──▶ [2] ◀──┐
//!   └─────────────────────────────┘
//! ```
//!
//! Links are [`BlockId`]s into `slots`, so removing a block never leaves a
//! dangling reference behind; vacated slots are recycled by later inserts.

use std::ops::{Index, IndexMut};

use crate::block::{Block, BlockId};

#[derive(Debug)]
pub(crate) struct BlockList {
  slots: Vec<Option<Block>>,
  vacant: Vec<BlockId>,
  head: BlockId,
  len: usize,
}

impl BlockList {
  /// A list holding a single free block that spans `size` bytes.
  pub fn new(size: usize) -> Self {
    let head = BlockId(0);
    let mut block = Block::new(size, true, 0);
    block.prev = head;
    block.next = head;

    Self {
      slots: vec![Some(block)],
      vacant: Vec::new(),
      head,
      len: 1,
    }
  }

  pub fn head(&self) -> BlockId {
    self.head
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn contains(
    &self,
    id: BlockId,
  ) -> bool {
    matches!(self.slots.get(id.0), Some(Some(_)))
  }

  pub fn get(
    &self,
    id: BlockId,
  ) -> Option<&Block> {
    self.slots.get(id.0).and_then(Option::as_ref)
  }

  /// Links `block` in right after `at` and returns its handle.
  pub fn insert_after(
    &mut self,
    at: BlockId,
    mut block: Block,
  ) -> BlockId {
    let next = self[at].next;
    block.prev = at;
    block.next = next;

    let id = match self.vacant.pop() {
      Some(id) => {
        self.slots[id.0] = Some(block);
        id
      }
      None => {
        self.slots.push(Some(block));
        BlockId(self.slots.len() - 1)
      }
    };

    self[at].next = id;
    self[next].prev = id;
    self.len += 1;

    id
  }

  /// Unlinks `id` and hands back the block it held. The head is never
  /// removed: every merge keeps the lower-addressed block alive.
  pub fn remove(
    &mut self,
    id: BlockId,
  ) -> Block {
    debug_assert_ne!(id, self.head, "the list anchor cannot be removed");

    let (prev, next) = (self[id].prev, self[id].next);
    self[prev].next = next;
    self[next].prev = prev;

    let block = match self.slots[id.0].take() {
      Some(block) => block,
      None => unreachable!("block {id:?} is linked but vacant"),
    };
    self.vacant.push(id);
    self.len -= 1;

    block
  }

  /// Walks the list once, starting at the head.
  pub fn iter(&self) -> Iter<'_> {
    self.iter_from(self.head)
  }

  /// Walks the list once, starting at `start` and wrapping around.
  pub fn iter_from(
    &self,
    start: BlockId,
  ) -> Iter<'_> {
    Iter {
      list: self,
      start,
      current: Some(start),
    }
  }

  pub fn find_by_offset(
    &self,
    offset: usize,
  ) -> Option<BlockId> {
    self
      .iter()
      .take_while(|(_, block)| block.offset <= offset)
      .find(|(_, block)| block.offset == offset)
      .map(|(id, _)| id)
  }
}

impl Index<BlockId> for BlockList {
  type Output = Block;

  fn index(
    &self,
    id: BlockId,
  ) -> &Block {
    match self.slots.get(id.0) {
      Some(Some(block)) => block,
      _ => panic!("stale block handle {id:?}"),
    }
  }
}

impl IndexMut<BlockId> for BlockList {
  fn index_mut(
    &mut self,
    id: BlockId,
  ) -> &mut Block {
    match self.slots.get_mut(id.0) {
      Some(Some(block)) => block,
      _ => panic!("stale block handle {id:?}"),
    }
  }
}

pub(crate) struct Iter<'a> {
  list: &'a BlockList,
  start: BlockId,
  current: Option<BlockId>,
}

impl<'a> Iterator for Iter<'a> {
  type Item = (BlockId, &'a Block);

  fn next(&mut self) -> Option<Self::Item> {
    let id = self.current?;
    let block = &self.list[id];

    self.current = (block.next != self.start).then_some(block.next);

    Some((id, block))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn offsets(list: &BlockList) -> Vec<usize> {
    list.iter().map(|(_, block)| block.offset).collect()
  }

  #[test]
  fn test_single_block_is_circular() {
    let list = BlockList::new(100);
    let head = list.head();

    assert_eq!(list.len(), 1);
    assert_eq!(list[head].next, head);
    assert_eq!(list[head].prev, head);
    assert_eq!(list.iter().count(), 1);
  }

  #[test]
  fn test_insert_and_remove() {
    let mut list = BlockList::new(100);
    let head = list.head();

    let second = list.insert_after(head, Block::new(60, true, 40));
    let third = list.insert_after(second, Block::new(30, true, 70));
    list[head].size = 40;
    list[second].size = 30;

    assert_eq!(offsets(&list), vec![0, 40, 70]);
    assert_eq!(list[third].next, head);
    assert_eq!(list[head].prev, third);

    let removed = list.remove(second);
    assert_eq!(removed.offset, 40);
    assert!(!list.contains(second));
    assert_eq!(list.len(), 2);
    assert_eq!(offsets(&list), vec![0, 70]);
    assert_eq!(list[head].next, third);
    assert_eq!(list[third].prev, head);
  }

  #[test]
  fn test_vacant_slot_is_reused() {
    let mut list = BlockList::new(100);
    let head = list.head();

    let second = list.insert_after(head, Block::new(50, true, 50));
    list.remove(second);
    let reused = list.insert_after(head, Block::new(50, true, 50));

    assert_eq!(second, reused);
    assert_eq!(list.len(), 2);
  }

  #[test]
  fn test_iter_from_wraps_once() {
    let mut list = BlockList::new(30);
    let head = list.head();
    let b = list.insert_after(head, Block::new(10, true, 10));
    list.insert_after(b, Block::new(10, true, 20));

    let order: Vec<usize> = list.iter_from(b).map(|(_, block)| block.offset).collect();
    assert_eq!(order, vec![10, 20, 0]);
  }

  #[test]
  fn test_find_by_offset() {
    let mut list = BlockList::new(30);
    let head = list.head();
    let b = list.insert_after(head, Block::new(10, true, 10));

    assert_eq!(list.find_by_offset(0), Some(head));
    assert_eq!(list.find_by_offset(10), Some(b));
    assert_eq!(list.find_by_offset(5), None);
    assert_eq!(list.find_by_offset(99), None);
  }
}
