//! Block-grouped index of the rows a delta touches.
//!
//! Entries are sorted by row id, so all entries of one block form a
//! contiguous run. For each block we keep the end position of its run and
//! for each entry only the 16-bit offset within its block.

use alloc::format;
use alloc::vec::Vec;
use core::mem::size_of;
use core::ops::Range;
use memcol_core::row_id::{block_of, offset_of};
use memcol_core::{Error, Result, RowId};

/// Maps row ids to positions in a delta's parallel data arrays.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeltaIndex {
    /// `block_ends[b]` is the end position of block `b`'s run.
    block_ends: Vec<u32>,
    /// In-block offset of each entry.
    offsets: Vec<u16>,
}

impl DeltaIndex {
    /// Builds an index over strictly ascending row ids.
    pub fn from_row_ids(rids: &[RowId]) -> Result<Self> {
        if let Some(w) = rids.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::invalid_argument(format!(
                "delta row ids must be strictly ascending: {} then {}",
                w[0], w[1]
            )));
        }
        let nblocks = rids.last().map_or(0, |&rid| block_of(rid) as usize + 1);
        let mut block_ends = Vec::with_capacity(nblocks);
        let mut offsets = Vec::with_capacity(rids.len());
        for (pos, &rid) in rids.iter().enumerate() {
            let bid = block_of(rid) as usize;
            while block_ends.len() < bid {
                block_ends.push(pos as u32);
            }
            offsets.push(offset_of(rid) as u16);
        }
        block_ends.resize(nblocks, rids.len() as u32);
        Ok(Self {
            block_ends,
            offsets,
        })
    }

    /// Returns the number of entries.
    #[inline]
    pub fn size(&self) -> usize {
        self.offsets.len()
    }

    /// Returns true if the index has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns one past the highest block id with entries.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.block_ends.len()
    }

    /// Returns the in-block offset of every entry.
    #[inline]
    pub fn offsets(&self) -> &[u16] {
        &self.offsets
    }

    /// Returns the half-open range of positions whose rows fall in block `bid`.
    #[inline]
    pub fn block_range(&self, bid: u32) -> Range<usize> {
        let bid = bid as usize;
        if bid >= self.block_ends.len() {
            return 0..0;
        }
        let start = if bid == 0 { 0 } else { self.block_ends[bid - 1] };
        start as usize..self.block_ends[bid] as usize
    }

    /// Returns true if any entry falls in block `bid`.
    #[inline]
    pub fn contains_block(&self, bid: u32) -> bool {
        !self.block_range(bid).is_empty()
    }

    /// Returns the position of `rid`, or `None` if the delta does not touch it.
    #[inline]
    pub fn find_idx(&self, rid: RowId) -> Option<usize> {
        let range = self.block_range(block_of(rid));
        let start = range.start;
        let target = offset_of(rid) as u16;
        self.offsets[range]
            .binary_search(&target)
            .ok()
            .map(|i| start + i)
    }

    /// Returns the bytes used by this index.
    pub fn memory(&self) -> usize {
        self.block_ends.capacity() * size_of::<u32>() + self.offsets.capacity() * size_of::<u16>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memcol_core::row_id::make_row_id;

    #[test]
    fn test_empty_index() {
        let index = DeltaIndex::from_row_ids(&[]).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.block_count(), 0);
        assert_eq!(index.block_range(0), 0..0);
        assert_eq!(index.find_idx(0), None);
    }

    #[test]
    fn test_block_ranges() {
        let rids = [
            make_row_id(0, 1),
            make_row_id(0, 7),
            make_row_id(2, 0),
            make_row_id(2, 3),
            make_row_id(2, 65535),
            make_row_id(3, 9),
        ];
        let index = DeltaIndex::from_row_ids(&rids).unwrap();
        assert_eq!(index.size(), 6);
        assert_eq!(index.block_count(), 4);
        assert_eq!(index.block_range(0), 0..2);
        assert_eq!(index.block_range(1), 2..2);
        assert_eq!(index.block_range(2), 2..5);
        assert_eq!(index.block_range(3), 5..6);
        assert_eq!(index.block_range(4), 0..0);
        assert!(index.contains_block(0));
        assert!(!index.contains_block(1));
        assert!(!index.contains_block(17));
        assert_eq!(&index.offsets()[2..5], &[0, 3, 65535]);
    }

    #[test]
    fn test_find_idx() {
        let rids = [make_row_id(0, 5), make_row_id(1, 5), make_row_id(1, 6)];
        let index = DeltaIndex::from_row_ids(&rids).unwrap();
        assert_eq!(index.find_idx(make_row_id(0, 5)), Some(0));
        assert_eq!(index.find_idx(make_row_id(1, 5)), Some(1));
        assert_eq!(index.find_idx(make_row_id(1, 6)), Some(2));
        assert_eq!(index.find_idx(make_row_id(0, 6)), None);
        assert_eq!(index.find_idx(make_row_id(9, 5)), None);
    }

    #[test]
    fn test_rejects_unsorted() {
        assert!(DeltaIndex::from_row_ids(&[3, 1]).is_err());
        assert!(DeltaIndex::from_row_ids(&[3, 3]).is_err());
    }
}
