//! Encoder for partial rows.

use crate::batch::PartialRowBatch;
use crate::{bitmap, BITVEC_LEN_SIZE};
use alloc::format;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use memcol_core::schema::{ColumnSchema, Schema, DELETE_CID};
use memcol_core::{Error, FixedType, Result};

/// Widest fixed-width value a cell can hold.
const MAX_CELL_SIZE: usize = 16;

#[derive(Clone, Copy, Default)]
struct TempCell {
    isset: bool,
    /// Little-endian value bytes, `None` for a null cell.
    data: Option<[u8; MAX_CELL_SIZE]>,
}

/// Builds partial rows one at a time and appends them to a batch.
///
/// Call [`start_row`](Self::start_row), set the key columns and any value
/// columns, then [`write_row_to_batch`](Self::write_row_to_batch).
pub struct PartialRowWriter {
    schema: Arc<Schema>,
    cells: Vec<TempCell>,
    row: Vec<u8>,
}

impl PartialRowWriter {
    pub fn new(schema: Arc<Schema>) -> Self {
        let cells = vec![TempCell::default(); schema.cid_size()];
        Self {
            schema,
            cells,
            row: Vec::new(),
        }
    }

    /// Clears all cells for a new row.
    pub fn start_row(&mut self) {
        self.cells.fill(TempCell::default());
    }

    /// Sets the named column. `None` writes a null.
    pub fn set<T: FixedType>(&mut self, name: &str, value: Option<T>) -> Result<()> {
        let cid = self
            .schema
            .get_by_name(name)
            .map(|cs| cs.cid())
            .ok_or_else(|| Error::not_found(format!("column {}", name)))?;
        self.set_by_cid(cid, value)
    }

    /// Sets the column with id `cid`. `None` writes a null.
    pub fn set_by_cid<T: FixedType>(&mut self, cid: u32, value: Option<T>) -> Result<()> {
        let cs = self
            .schema
            .get_by_cid(cid)
            .ok_or_else(|| Error::not_found(format!("cid {}", cid)))?;
        check_cell::<T>(cs, value.is_none())?;
        let data = value.map(|v| {
            let mut bytes = [0u8; MAX_CELL_SIZE];
            v.write_le(&mut bytes);
            bytes
        });
        self.cells[cid as usize] = TempCell { isset: true, data };
        Ok(())
    }

    /// Marks the row as a delete. Deletes are not supported yet.
    pub fn set_delete(&mut self) -> Result<()> {
        Err(Error::not_supported("delete not supported"))
    }

    /// Returns the encoded size of the current row, without its length prefix.
    pub fn byte_size(&self) -> usize {
        let mut size = BITVEC_LEN_SIZE + bitmap::num_bytes(self.num_bits());
        for (cid, cell) in self.cells.iter().enumerate().skip(1) {
            if cell.isset && cell.data.is_some() {
                size += self.schema.get_column_byte_size(cid as u32);
            }
        }
        size
    }

    /// Encodes the current row and appends it to `batch`.
    ///
    /// The writer keeps its cells, so the same row can be written again.
    pub fn write_row_to_batch(&mut self, batch: &mut PartialRowBatch) -> Result<()> {
        self.encode()?;
        batch.append_row(&self.row).map_err(|e| {
            tracing::warn!(rows = batch.row_size(), bytes = batch.byte_size(), "{}", e);
            e
        })?;
        tracing::trace!(row = batch.row_size() - 1, bytes = self.row.len(), "wrote partial row");
        Ok(())
    }

    fn num_bits(&self) -> usize {
        let nullable_set = self
            .cells
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(cid, cell)| cell.isset && self.is_nullable(*cid))
            .count();
        self.schema.cid_size() + nullable_set
    }

    fn is_nullable(&self, cid: usize) -> bool {
        self.schema
            .get_by_cid(cid as u32)
            .map_or(false, |cs| cs.is_nullable())
    }

    fn encode(&mut self) -> Result<()> {
        let bitvec_size = bitmap::num_bytes(self.num_bits());
        if bitvec_size > u16::MAX as usize {
            return Err(Error::not_supported(format!(
                "too many columns: bitvec of {} bytes",
                bitvec_size
            )));
        }
        let num_keys = self.schema.num_key_columns();
        if let Some(cid) = (1..=num_keys).find(|&cid| !self.cells[cid].isset) {
            return Err(Error::invalid_argument(format!(
                "key column {} is not set",
                cid
            )));
        }

        let bit_set_size = self.schema.cid_size();
        let mut row = core::mem::take(&mut self.row);
        row.clear();
        row.extend_from_slice(&(bitvec_size as u16).to_le_bytes());
        row.resize(BITVEC_LEN_SIZE + bitvec_size, 0);
        let mut null_idx = bit_set_size;
        for (cid, cell) in self.cells.iter().enumerate() {
            if !cell.isset {
                continue;
            }
            let bitvec = &mut row[BITVEC_LEN_SIZE..];
            bitmap::set(bitvec, cid);
            if cid == DELETE_CID as usize {
                continue;
            }
            if self.is_nullable(cid) {
                if cell.data.is_none() {
                    bitmap::set(bitvec, null_idx);
                }
                null_idx += 1;
            }
            if let Some(bytes) = &cell.data {
                let size = self.schema.get_column_byte_size(cid as u32);
                row.extend_from_slice(&bytes[..size]);
            }
        }
        self.row = row;
        Ok(())
    }
}

fn check_cell<T: FixedType>(cs: &ColumnSchema, is_null: bool) -> Result<()> {
    if T::TYPE != cs.column_type() {
        return Err(Error::type_mismatch(cs.column_type(), T::TYPE));
    }
    if is_null && !cs.is_nullable() {
        return Err(Error::invalid_argument(format!(
            "not nullable column {} set to null",
            cs.name()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> PartialRowWriter {
        PartialRowWriter::new(Arc::new(
            Schema::parse("id int,uv int,pv int,city tinyint null").unwrap(),
        ))
    }

    #[test]
    fn test_set_errors() {
        let mut w = writer();
        w.start_row();
        assert!(matches!(
            w.set("nope", Some(1i32)),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            w.set_by_cid(9, Some(1i32)),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            w.set_by_cid(0, Some(1i32)),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            w.set("id", Some(1i64)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            w.set::<i32>("uv", None),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(w.set_delete(), Err(Error::NotSupported { .. })));
        w.set::<i8>("city", None).unwrap();
    }

    #[test]
    fn test_encoding() {
        let mut w = writer();
        let mut batch = PartialRowBatch::new(Arc::clone(&w.schema)).unwrap();
        w.start_row();
        w.set("id", Some(0x0102_0304i32)).unwrap();
        w.set::<i8>("city", None).unwrap();
        // 5 set bits + 1 null bit fit in one byte; only id carries a value.
        assert_eq!(w.byte_size(), 2 + 1 + 4);
        w.write_row_to_batch(&mut batch).unwrap();

        let row = batch.get_row(0).unwrap();
        assert_eq!(row, &[1, 0, 0b0011_0010, 4, 3, 2, 1]);
        assert_eq!(batch.byte_size(), 4 + 7);
    }

    #[test]
    fn test_missing_key() {
        let mut w = writer();
        let mut batch = PartialRowBatch::new(Arc::clone(&w.schema)).unwrap();
        w.start_row();
        w.set("uv", Some(3i32)).unwrap();
        assert!(matches!(
            w.write_row_to_batch(&mut batch),
            Err(Error::InvalidArgument { .. })
        ));
        assert_eq!(batch.row_size(), 0);
    }

    #[test]
    fn test_start_row_resets() {
        let mut w = writer();
        w.start_row();
        w.set("id", Some(1i32)).unwrap();
        w.set("pv", Some(2i32)).unwrap();
        assert_eq!(w.byte_size(), 2 + 1 + 8);
        w.start_row();
        assert_eq!(w.byte_size(), 2 + 1);
    }
}
