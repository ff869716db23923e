use std::{fmt, str::FromStr};

use crate::{
  block::{Block, BlockId},
  error::ParseStrategyError,
  list::BlockList,
};

/// Placement policy used to pick the free block that serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
  /// First free block large enough, scanning from the lowest address.
  First,
  /// Smallest free block large enough.
  Best,
  /// Largest free block large enough.
  Worst,
  /// First-fit, but the scan resumes where the previous allocation ended.
  Next,
}

impl Strategy {
  pub const ALL: [Strategy; 4] = [Strategy::First, Strategy::Best, Strategy::Worst, Strategy::Next];

  pub fn name(self) -> &'static str {
    match self {
      Strategy::First => "first",
      Strategy::Best => "best",
      Strategy::Worst => "worst",
      Strategy::Next => "next",
    }
  }

  /// Picks a free block of at least `size` bytes. Scans in address order;
  /// ties go to the block met first.
  pub(crate) fn select(
    self,
    blocks: &BlockList,
    cursor: BlockId,
    size: usize,
  ) -> Option<BlockId> {
    let fitting = |(_, block): &(BlockId, &Block)| block.fits(size);

    let chosen = match self {
      Strategy::First => blocks.iter().find(fitting),
      Strategy::Best => blocks
        .iter()
        .filter(fitting)
        .reduce(|best, candidate| if candidate.1.size < best.1.size { candidate } else { best }),
      Strategy::Worst => blocks
        .iter()
        .filter(fitting)
        .reduce(|worst, candidate| if candidate.1.size > worst.1.size { candidate } else { worst }),
      Strategy::Next => {
        let start = if blocks.contains(cursor) { cursor } else { blocks.head() };
        blocks.iter_from(start).find(fitting)
      }
    };

    chosen.map(|(id, _)| id)
  }
}

impl fmt::Display for Strategy {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Strategy {
  type Err = ParseStrategyError;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    Strategy::ALL
      .into_iter()
      .find(|strategy| strategy.name().eq_ignore_ascii_case(name.trim()))
      .ok_or_else(|| ParseStrategyError { name: name.to_owned() })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Free blocks of 40, 10, 40 and 20 bytes, separated by 10-byte
  /// allocations.
  fn fragmented() -> (BlockList, Vec<BlockId>) {
    let layout = [(40, true), (10, false), (10, true), (10, false), (40, true), (10, false), (20, true)];
    let total = layout.iter().map(|(size, _)| size).sum();

    let mut list = BlockList::new(total);
    let mut ids = vec![list.head()];
    list[ids[0]].size = layout[0].0;

    let mut offset = layout[0].0;
    for &(size, is_free) in &layout[1..] {
      let last = *ids.last().unwrap();
      ids.push(list.insert_after(last, Block::new(size, is_free, offset)));
      offset += size;
    }

    (list, ids)
  }

  #[test]
  fn test_first_fit() {
    let (list, ids) = fragmented();

    assert_eq!(Strategy::First.select(&list, ids[4], 5), Some(ids[0]));
    assert_eq!(Strategy::First.select(&list, ids[4], 41), None);
  }

  #[test]
  fn test_best_fit_prefers_smallest() {
    let (list, ids) = fragmented();

    assert_eq!(Strategy::Best.select(&list, ids[0], 5), Some(ids[2]));
    assert_eq!(Strategy::Best.select(&list, ids[0], 15), Some(ids[6]));
    // Two 40-byte holes: the lower one wins.
    assert_eq!(Strategy::Best.select(&list, ids[0], 30), Some(ids[0]));
  }

  #[test]
  fn test_worst_fit_prefers_largest() {
    let (list, ids) = fragmented();

    assert_eq!(Strategy::Worst.select(&list, ids[6], 5), Some(ids[0]));
    assert_eq!(Strategy::Worst.select(&list, ids[6], 41), None);
  }

  #[test]
  fn test_next_fit_resumes_at_cursor() {
    let (list, ids) = fragmented();

    assert_eq!(Strategy::Next.select(&list, ids[3], 5), Some(ids[4]));
    assert_eq!(Strategy::Next.select(&list, ids[5], 25), Some(ids[0]));
    assert_eq!(Strategy::Next.select(&list, ids[5], 15), Some(ids[6]));
  }

  #[test]
  fn test_next_fit_with_stale_cursor_starts_at_head() {
    let (mut list, ids) = fragmented();
    list.remove(ids[5]);

    assert_eq!(Strategy::Next.select(&list, ids[5], 5), Some(ids[0]));
  }

  #[test]
  fn test_parse_and_display() {
    for strategy in Strategy::ALL {
      assert_eq!(strategy.to_string().parse::<Strategy>(), Ok(strategy));
    }

    assert_eq!("WORST".parse::<Strategy>(), Ok(Strategy::Worst));
    assert_eq!(" next ".parse::<Strategy>(), Ok(Strategy::Next));
    assert!("quick".parse::<Strategy>().is_err());
  }
}
