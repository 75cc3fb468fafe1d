//! Base-layer column blocks.
//!
//! A `ColumnBlock` holds up to 65536 rows of one column: a data buffer and an
//! optional null-flag buffer (one byte per row, non-zero means null). Blocks
//! are immutable once shared; null flags may only be toggled while the block
//! is still exclusively owned by the write path.

use crate::buffer::TypedBuffer;
use alloc::format;
use memcol_core::row_id::BLOCK_CAPACITY;
use memcol_core::{Error, Pod, Result};

/// One fixed-capacity chunk of a column.
#[derive(Clone, Debug)]
pub struct ColumnBlock {
    size: usize,
    data: TypedBuffer,
    nulls: Option<TypedBuffer>,
}

impl ColumnBlock {
    /// Allocates a block of `size` rows of `esize` bytes with null tracking.
    pub fn alloc(size: usize, esize: usize) -> Result<Self> {
        let mut block = Self::alloc_without_nulls(size, esize)?;
        block.nulls = Some(TypedBuffer::alloc(size, 1)?);
        Ok(block)
    }

    /// Allocates a block of `size` rows of `esize` bytes without null tracking.
    pub fn alloc_without_nulls(size: usize, esize: usize) -> Result<Self> {
        if size > BLOCK_CAPACITY {
            return Err(Error::invalid_argument(format!(
                "block size {} exceeds capacity {}",
                size, BLOCK_CAPACITY
            )));
        }
        Ok(Self {
            size,
            data: TypedBuffer::alloc(size, esize)?,
            nulls: None,
        })
    }

    /// Builds a block holding `values`, with null tracking and no nulls set.
    pub fn from_values<T: Pod>(values: &[T]) -> Result<Self> {
        let mut block = Self::alloc(values.len(), core::mem::size_of::<T>())?;
        block.data.as_mut_slice::<T>().copy_from_slice(values);
        Ok(block)
    }

    /// Returns the row capacity.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the data buffer.
    #[inline]
    pub fn data(&self) -> &TypedBuffer {
        &self.data
    }

    /// Returns the null-flag buffer, if this block tracks nulls.
    #[inline]
    pub fn nulls(&self) -> Option<&TypedBuffer> {
        self.nulls.as_ref()
    }

    /// Splits the block into its data and null buffers for in-place patching.
    #[inline]
    pub fn buffers_mut(&mut self) -> (&mut TypedBuffer, Option<&mut TypedBuffer>) {
        (&mut self.data, self.nulls.as_mut())
    }

    /// Discards null tracking. Every row reads as not null afterwards.
    pub(crate) fn drop_nulls(&mut self) {
        self.nulls = None;
    }

    /// Returns total bytes owned by this block.
    pub fn memory(&self) -> usize {
        self.data.memory() + self.nulls.as_ref().map_or(0, |n| n.memory())
    }

    /// Returns whether row `idx` is null. Always false without null tracking.
    #[inline]
    pub fn is_null(&self, idx: u32) -> bool {
        debug_assert!((idx as usize) < self.size, "row {} out of block range", idx);
        match &self.nulls {
            Some(nulls) => nulls.as_slice::<u8>()[idx as usize] != 0,
            None => false,
        }
    }

    /// Marks row `idx` as null.
    pub fn set_null(&mut self, idx: u32) -> Result<()> {
        self.set_null_flag(idx, 1)
    }

    /// Marks row `idx` as not null.
    pub fn set_not_null(&mut self, idx: u32) -> Result<()> {
        self.set_null_flag(idx, 0)
    }

    fn set_null_flag(&mut self, idx: u32, flag: u8) -> Result<()> {
        let nulls = self
            .nulls
            .as_mut()
            .ok_or_else(|| Error::invalid_argument("column block has no null buffer"))?;
        debug_assert!((idx as usize) < self.size, "row {} out of block range", idx);
        nulls.as_mut_slice::<u8>()[idx as usize] = flag;
        Ok(())
    }

    /// Returns the value at `idx`, or `None` if the row is null.
    pub fn value<T: Pod>(&self, idx: u32) -> Option<T> {
        if self.is_null(idx) {
            None
        } else {
            Some(self.data.as_slice::<T>()[idx as usize])
        }
    }

    /// Copies the first `nrows` rows into `dest`.
    ///
    /// Null flags are copied when both blocks track nulls. When only `dest`
    /// tracks nulls, its first `nrows` flags are cleared.
    pub fn copy_to(&self, dest: &mut ColumnBlock, nrows: usize, esize: usize) -> Result<()> {
        if nrows > self.size || nrows > dest.size {
            return Err(Error::invalid_argument(format!(
                "copy of {} rows exceeds block sizes {} -> {}",
                nrows, self.size, dest.size
            )));
        }
        if self.data.esize() != esize || dest.data.esize() != esize {
            return Err(Error::invalid_argument(format!(
                "copy with element size {} between blocks of {} and {}",
                esize,
                self.data.esize(),
                dest.data.esize()
            )));
        }
        let bytes = nrows * esize;
        dest.data.as_bytes_mut()[..bytes].copy_from_slice(&self.data.as_bytes()[..bytes]);
        match (&self.nulls, &mut dest.nulls) {
            (Some(src), Some(dst)) => {
                dst.as_mut_slice::<u8>()[..nrows].copy_from_slice(&src.as_slice::<u8>()[..nrows]);
            }
            (None, Some(dst)) => {
                dst.as_mut_slice::<u8>()[..nrows].fill(0);
            }
            (Some(_), None) => {
                return Err(Error::invalid_argument(
                    "destination block cannot track nulls",
                ));
            }
            (None, None) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc() {
        let block = ColumnBlock::alloc(16, 4).unwrap();
        assert_eq!(block.size(), 16);
        assert_eq!(block.data().bsize(), 64);
        assert_eq!(block.nulls().unwrap().bsize(), 16);
        assert!(block.memory() >= 80);
    }

    #[test]
    fn test_alloc_over_capacity() {
        assert!(ColumnBlock::alloc(BLOCK_CAPACITY + 1, 4).is_err());
        assert!(ColumnBlock::alloc(BLOCK_CAPACITY, 1).is_ok());
    }

    #[test]
    fn test_null_flags() {
        let mut block = ColumnBlock::from_values(&[1i32, 2, 3]).unwrap();
        assert!(!block.is_null(1));
        block.set_null(1).unwrap();
        assert!(block.is_null(1));
        assert_eq!(block.value::<i32>(1), None);
        block.set_not_null(1).unwrap();
        assert_eq!(block.value::<i32>(1), Some(2));
    }

    #[test]
    fn test_no_null_buffer() {
        let mut block = ColumnBlock::alloc_without_nulls(4, 8).unwrap();
        assert!(block.nulls().is_none());
        assert!(!block.is_null(0));
        assert!(block.set_null(0).is_err());
        assert!(block.set_not_null(0).is_err());
    }

    #[test]
    fn test_copy_to() {
        let mut src = ColumnBlock::from_values(&[10i64, 20, 30, 40]).unwrap();
        src.set_null(2).unwrap();
        let mut dest = ColumnBlock::alloc(8, 8).unwrap();
        src.copy_to(&mut dest, 3, 8).unwrap();
        assert_eq!(&dest.data().as_slice::<i64>()[..3], &[10, 20, 30]);
        assert!(dest.is_null(2));
        assert!(!dest.is_null(3));
        assert_eq!(dest.data().as_slice::<i64>()[3], 0);
    }

    #[test]
    fn test_copy_to_clears_nulls_from_untracked_source() {
        let mut src = ColumnBlock::alloc_without_nulls(2, 4).unwrap();
        src.buffers_mut().0.as_mut_slice::<i32>().copy_from_slice(&[5, 6]);
        let mut dest = ColumnBlock::alloc(2, 4).unwrap();
        dest.set_null(0).unwrap();
        src.copy_to(&mut dest, 2, 4).unwrap();
        assert!(!dest.is_null(0));
        assert_eq!(dest.value::<i32>(1), Some(6));
    }

    #[test]
    fn test_copy_to_rejects_bad_sizes() {
        let src = ColumnBlock::alloc(4, 4).unwrap();
        let mut small = ColumnBlock::alloc(2, 4).unwrap();
        assert!(src.copy_to(&mut small, 4, 4).is_err());
        let mut wide = ColumnBlock::alloc(4, 8).unwrap();
        assert!(src.copy_to(&mut wide, 4, 4).is_err());
        let mut untracked = ColumnBlock::alloc_without_nulls(4, 4).unwrap();
        assert!(src.copy_to(&mut untracked, 4, 4).is_err());
    }

    #[test]
    fn test_drop_nulls() {
        let mut block = ColumnBlock::from_values(&[1i32, 2]).unwrap();
        block.set_null(1).unwrap();
        block.drop_nulls();
        assert!(block.nulls().is_none());
        assert!(!block.is_null(1));
        assert_eq!(block.value::<i32>(1), Some(2));
    }
}
