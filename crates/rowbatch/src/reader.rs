//! Decoder for partial rows.

use crate::batch::PartialRowBatch;
use crate::{bitmap, BITVEC_LEN_SIZE};
use alloc::format;
use alloc::vec::Vec;
use core::ops::Range;
use memcol_core::schema::{ColumnSchema, DELETE_CID};
use memcol_core::{Error, FixedType, Result};

struct Cell {
    cid: u32,
    /// Byte range of the value within the row, `None` for null.
    data: Option<Range<usize>>,
}

/// Decodes the rows of a batch, one row at a time.
///
/// After a successful [`read`](Self::read) the set cells of that row are
/// available in cid order.
pub struct PartialRowReader<'a> {
    batch: &'a PartialRowBatch,
    row: &'a [u8],
    cells: Vec<Cell>,
    delete: bool,
}

impl<'a> PartialRowReader<'a> {
    pub fn new(batch: &'a PartialRowBatch) -> Self {
        Self {
            batch,
            row: &[],
            cells: Vec::with_capacity(batch.schema().num_columns()),
            delete: false,
        }
    }

    /// Returns the number of rows in the batch.
    #[inline]
    pub fn size(&self) -> usize {
        self.batch.row_size()
    }

    /// Decodes row `idx`.
    pub fn read(&mut self, idx: usize) -> Result<()> {
        self.delete = false;
        self.cells.clear();
        self.row = &[];
        let batch = self.batch;
        let row = batch.get_row(idx).ok_or_else(|| {
            Error::invalid_argument(format!(
                "row {} out of range, batch has {}",
                idx,
                batch.row_size()
            ))
        })?;

        let bitvec_size = match row.get(..BITVEC_LEN_SIZE) {
            Some(b) => u16::from_le_bytes([b[0], b[1]]) as usize,
            None => return Err(corrupted(idx)),
        };
        let bitvec = row
            .get(BITVEC_LEN_SIZE..BITVEC_LEN_SIZE + bitvec_size)
            .ok_or_else(|| corrupted(idx))?;
        let schema = batch.schema();
        let bit_set_size = schema.cid_size();
        if bitvec_size * 8 < bit_set_size {
            return Err(corrupted(idx));
        }

        self.delete = bitmap::test(bitvec, DELETE_CID as usize);
        let mut pos = BITVEC_LEN_SIZE + bitvec_size;
        let mut null_idx = bit_set_size;
        for cid in 1..bit_set_size {
            if !bitmap::test(bitvec, cid) {
                continue;
            }
            let cs = schema.get_by_cid(cid as u32).ok_or_else(|| corrupted(idx))?;
            let is_null = if cs.is_nullable() {
                if null_idx >= bitvec_size * 8 {
                    return Err(corrupted(idx));
                }
                let is_null = bitmap::test(bitvec, null_idx);
                null_idx += 1;
                is_null
            } else {
                false
            };
            let data = if is_null {
                None
            } else {
                let end = pos + cs.byte_size();
                if end > row.len() {
                    return Err(corrupted(idx));
                }
                let range = pos..end;
                pos = end;
                Some(range)
            };
            self.cells.push(Cell {
                cid: cid as u32,
                data,
            });
        }
        self.row = row;
        Ok(())
    }

    /// Returns the number of set cells in the current row.
    #[inline]
    pub fn cell_size(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the current row is a delete.
    #[inline]
    pub fn is_delete(&self) -> bool {
        self.delete
    }

    /// Returns the column and raw little-endian bytes of cell `idx`.
    /// The bytes are `None` for a null cell.
    pub fn get_cell(&self, idx: usize) -> Result<(&'a ColumnSchema, Option<&'a [u8]>)> {
        let cell = self.cells.get(idx).ok_or_else(|| {
            Error::invalid_argument(format!(
                "get_cell: idx {} exceeds cell size {}",
                idx,
                self.cells.len()
            ))
        })?;
        let batch: &'a PartialRowBatch = self.batch;
        let cs = batch
            .schema()
            .get_by_cid(cell.cid)
            .ok_or_else(|| Error::not_found(format!("cid {}", cell.cid)))?;
        let row: &'a [u8] = self.row;
        Ok((cs, cell.data.clone().map(|r| &row[r])))
    }

    /// Returns the typed value of cell `idx`.
    pub fn cell_value<T: FixedType>(&self, idx: usize) -> Result<Option<T>> {
        let (cs, data) = self.get_cell(idx)?;
        if T::TYPE != cs.column_type() {
            return Err(Error::type_mismatch(cs.column_type(), T::TYPE));
        }
        Ok(data.map(T::read_le))
    }
}

fn corrupted(idx: usize) -> Error {
    tracing::warn!(row = idx, "corrupted partial row");
    Error::invalid_argument(format!("row {} is corrupted", idx))
}
