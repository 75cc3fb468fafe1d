//! Snapshot readers over a column's base layer and delta chain.
//!
//! Point lookups scan deltas newest-first and stop at the first hit; block
//! materialization copies the base block and replays deltas oldest-first.
//! Both orders make the most recent delta for a row authoritative, so `get`
//! and `get_block` always agree.

use crate::block::ColumnBlock;
use crate::column::{fmt_column, BlockList};
use crate::delta::ColumnDelta;
use crate::holder::ColumnBlockHolder;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;
use memcol_core::hash::hash_value;
use memcol_core::row_id::{block_of, offset_of};
use memcol_core::schema::ColumnSchema;
use memcol_core::{ColumnType, FixedType, Result, RowId};

/// Resolves row `rid` through a delta chain and its base blocks.
///
/// Returns `None` for null rows. With `NULLABLE = false` null flags are
/// ignored entirely. Shared by readers and by any writer that needs to see
/// its own pending state.
#[inline]
pub fn typed_column_get<'a, ST: FixedType, const NULLABLE: bool>(
    base: &'a [Arc<ColumnBlock>],
    deltas: &'a [Arc<ColumnDelta>],
    rid: RowId,
) -> Option<&'a ST> {
    for delta in deltas.iter().rev() {
        if let Some(pos) = delta.find_idx(rid) {
            if NULLABLE && delta.is_null(pos) {
                return None;
            }
            return Some(&delta.data().as_slice::<ST>()[pos]);
        }
    }
    let bid = block_of(rid) as usize;
    debug_assert!(bid < base.len(), "block {} out of range", bid);
    let block = &base[bid];
    let idx = offset_of(rid);
    debug_assert!((idx as usize) < block.size(), "row {} out of block range", idx);
    if NULLABLE && block.is_null(idx) {
        return None;
    }
    Some(&block.data().as_slice::<ST>()[idx as usize])
}

/// Read-only snapshot of one column at a fixed version.
///
/// `T` is the logical type callers compare against, `ST` the storage type of
/// the column's buffers. Cloning the reader is cheap: blocks and deltas are
/// shared.
#[derive(Clone)]
pub struct TypedColumnReader<T, const NULLABLE: bool = false, ST = T> {
    schema: ColumnSchema,
    storage_type: ColumnType,
    base: BlockList,
    version: u64,
    real_version: u64,
    deltas: Vec<Arc<ColumnDelta>>,
    _types: PhantomData<fn() -> (T, ST)>,
}

impl<T: FixedType, const NULLABLE: bool, ST: FixedType> TypedColumnReader<T, NULLABLE, ST> {
    pub(crate) fn new(
        schema: ColumnSchema,
        storage_type: ColumnType,
        base: BlockList,
        version: u64,
        real_version: u64,
        deltas: Vec<Arc<ColumnDelta>>,
    ) -> Self {
        debug_assert!(deltas.windows(2).all(|w| w[0].version() < w[1].version()));
        Self {
            schema,
            storage_type,
            base,
            version,
            real_version,
            deltas,
            _types: PhantomData,
        }
    }

    /// Returns the requested snapshot version.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the version of the newest visible delta, or the base version.
    #[inline]
    pub fn real_version(&self) -> u64 {
        self.real_version
    }

    /// Returns the number of visible deltas.
    #[inline]
    pub fn num_deltas(&self) -> usize {
        self.deltas.len()
    }

    /// Returns the number of base blocks in this snapshot.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.base.len()
    }

    /// Returns the row count of base block `bid`.
    #[inline]
    pub fn block_rows(&self, bid: u32) -> usize {
        self.base[bid as usize].size()
    }

    /// Returns the value of row `rid`, or `None` if it is null.
    #[inline]
    pub fn get(&self, rid: RowId) -> Option<&ST> {
        typed_column_get::<ST, NULLABLE>(&self.base, &self.deltas, rid)
    }

    /// Materializes the first `nrows` rows of block `bid` into `holder`.
    ///
    /// If no visible delta touches the block, the holder shares the base block
    /// without copying. Otherwise the holder ends up owning a patched copy; an
    /// owned block already in the holder is reused when large enough. On error
    /// the holder is left empty.
    pub fn get_block(&self, nrows: usize, bid: u32, holder: &mut ColumnBlockHolder) -> Result<()> {
        let page = &self.base[bid as usize];
        if !self.deltas.iter().any(|d| d.contains_block(bid)) {
            tracing::trace!(block = bid, "block has no deltas, sharing base");
            holder.init_shared(Arc::clone(page));
            return Ok(());
        }

        let mut cb = match holder.take_owned() {
            Some(cb)
                if cb.size() >= nrows
                    && cb.data().esize() == ST::SIZE
                    && (cb.nulls().is_some() || page.nulls().is_none()) =>
            {
                cb
            }
            _ => {
                tracing::debug!(block = bid, rows = nrows, "allocating block for materialization");
                if NULLABLE {
                    ColumnBlock::alloc(nrows, ST::SIZE)?
                } else {
                    ColumnBlock::alloc_without_nulls(nrows, ST::SIZE)?
                }
            }
        };
        page.copy_to(&mut cb, nrows, ST::SIZE)?;

        tracing::debug!(
            block = bid,
            rows = nrows,
            deltas = self.deltas.len(),
            "materializing column block"
        );
        let (data, nulls) = cb.buffers_mut();
        let dst_data = data.as_mut_slice::<ST>();
        let mut dst_flags = nulls.map(|n| n.as_mut_slice::<u8>());
        for delta in &self.deltas {
            let range = delta.index().block_range(bid);
            if range.is_empty() {
                continue;
            }
            let offsets = &delta.index().offsets()[range.clone()];
            // Rows past `nrows` are outside the requested window.
            let n = offsets.partition_point(|&pos| (pos as usize) < nrows);
            let rows = range.start..range.start + n;
            let offsets = &offsets[..n];
            let values = &delta.data().as_slice::<ST>()[rows.clone()];

            match (dst_flags.as_deref_mut(), delta.nulls()) {
                (Some(flags), Some(src_nulls)) if NULLABLE => {
                    let src_flags = &src_nulls.as_slice::<u8>()[rows];
                    for ((&pos, &value), &null) in offsets.iter().zip(values).zip(src_flags) {
                        if null != 0 {
                            flags[pos as usize] = 1;
                        } else {
                            flags[pos as usize] = 0;
                            dst_data[pos as usize] = value;
                        }
                    }
                }
                (Some(flags), None) if NULLABLE => {
                    for (&pos, &value) in offsets.iter().zip(values) {
                        flags[pos as usize] = 0;
                        dst_data[pos as usize] = value;
                    }
                }
                _ => {
                    for (&pos, &value) in offsets.iter().zip(values) {
                        dst_data[pos as usize] = value;
                    }
                }
            }
        }
        holder.init_owned(cb);
        Ok(())
    }

    /// Hashes `rhs[rhs_idx]` for key matching.
    ///
    /// Only defined when the logical and storage types coincide. Other type
    /// pairs are not supported yet and always hash to 0.
    pub fn hashcode(&self, rhs: &[T], rhs_idx: usize) -> u64 {
        if T::TYPE == ST::TYPE {
            hash_value(rhs[rhs_idx])
        } else {
            0
        }
    }

    /// Compares the value of row `rid` with `rhs[rhs_idx]`.
    ///
    /// # Panics
    ///
    /// Panics on nullable columns: only key columns may be compared, and key
    /// columns are never nullable.
    pub fn equals(&self, rid: RowId, rhs: &[T], rhs_idx: usize) -> bool
    where
        ST: Into<T>,
    {
        assert!(!NULLABLE, "equals is only used for key columns");
        let rhs_value = rhs[rhs_idx];
        match typed_column_get::<ST, false>(&self.base, &self.deltas, rid) {
            Some(&stored) => {
                let stored: T = stored.into();
                stored == rhs_value
            }
            None => false,
        }
    }
}

impl<T, const NULLABLE: bool, ST> fmt::Display for TypedColumnReader<T, NULLABLE, ST> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_column(f, &self.schema, self.storage_type)?;
        write!(
            f,
            " version={}(real={}) ndelta={}",
            self.version,
            self.real_version,
            self.deltas.len()
        )
    }
}

impl<T, const NULLABLE: bool, ST> fmt::Debug for TypedColumnReader<T, NULLABLE, ST> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
