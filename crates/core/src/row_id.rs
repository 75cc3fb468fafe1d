//! Row id encoding.
//!
//! A row id packs a block index and an in-block offset:
//! `rid = block_index * 65536 + offset`, with `offset` in `[0, 65536)`.
//! Every collaborator that constructs row ids must follow this layout.

/// Global row identifier within one column.
pub type RowId = u32;

/// Number of low bits holding the in-block offset.
pub const BLOCK_BITS: u32 = 16;

/// Maximum number of rows in one base block.
pub const BLOCK_CAPACITY: usize = 1 << BLOCK_BITS;

/// Mask selecting the in-block offset.
pub const OFFSET_MASK: u32 = (1 << BLOCK_BITS) - 1;

/// Returns the block index of a row id.
#[inline]
pub fn block_of(rid: RowId) -> u32 {
    rid >> BLOCK_BITS
}

/// Returns the in-block offset of a row id.
#[inline]
pub fn offset_of(rid: RowId) -> u32 {
    rid & OFFSET_MASK
}

/// Builds a row id from a block index and an in-block offset.
#[inline]
pub fn make_row_id(block: u32, offset: u32) -> RowId {
    debug_assert!(offset <= OFFSET_MASK, "offset {} out of block range", offset);
    (block << BLOCK_BITS) | offset
}
