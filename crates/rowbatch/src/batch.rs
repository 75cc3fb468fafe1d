//! Byte buffer of serialized partial rows.

use crate::ROW_LEN_SIZE;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use memcol_core::schema::Schema;
use memcol_core::{Error, Result};

/// Byte capacity of a batch created with [`PartialRowBatch::new`].
pub const DEFAULT_BYTE_CAPACITY: usize = 1 << 20;

/// Row capacity of a batch created with [`PartialRowBatch::new`].
pub const DEFAULT_ROW_CAPACITY: usize = 1 << 16;

/// A bounded sequence of partial rows sharing one schema.
///
/// Rows are appended by [`crate::PartialRowWriter`] and decoded by
/// [`crate::PartialRowReader`].
#[derive(Debug)]
pub struct PartialRowBatch {
    schema: Arc<Schema>,
    data: Vec<u8>,
    row_offsets: Vec<usize>,
    byte_capacity: usize,
    row_capacity: usize,
}

impl PartialRowBatch {
    /// Creates a batch with the default capacities.
    pub fn new(schema: Arc<Schema>) -> Result<Self> {
        Self::with_capacity(schema, DEFAULT_BYTE_CAPACITY, DEFAULT_ROW_CAPACITY)
    }

    /// Creates a batch holding at most `byte_capacity` bytes and
    /// `row_capacity` rows. The byte buffer is reserved up front.
    pub fn with_capacity(
        schema: Arc<Schema>,
        byte_capacity: usize,
        row_capacity: usize,
    ) -> Result<Self> {
        let mut data = Vec::new();
        if data.try_reserve_exact(byte_capacity).is_err() {
            tracing::warn!(byte_capacity, "failed to reserve partial row batch");
            return Err(Error::alloc_failed(byte_capacity));
        }
        Ok(Self {
            schema,
            data,
            row_offsets: Vec::new(),
            byte_capacity,
            row_capacity,
        })
    }

    /// Returns the schema rows are encoded against.
    #[inline]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_size(&self) -> usize {
        self.row_offsets.len()
    }

    #[inline]
    pub fn row_capacity(&self) -> usize {
        self.row_capacity
    }

    /// Returns the number of bytes used, length prefixes included.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn byte_capacity(&self) -> usize {
        self.byte_capacity
    }

    /// Returns the encoded bytes of row `idx`, without its length prefix.
    pub fn get_row(&self, idx: usize) -> Option<&[u8]> {
        let start = *self.row_offsets.get(idx)?;
        let len_bytes = self.data.get(start..start + ROW_LEN_SIZE)?;
        let mut prefix = [0u8; ROW_LEN_SIZE];
        prefix.copy_from_slice(len_bytes);
        let len = u32::from_le_bytes(prefix) as usize;
        let begin = start + ROW_LEN_SIZE;
        self.data.get(begin..begin + len)
    }

    /// Appends one encoded row, enforcing both capacities.
    pub(crate) fn append_row(&mut self, row: &[u8]) -> Result<()> {
        if self.row_offsets.len() >= self.row_capacity {
            return Err(Error::over_capacity(format!(
                "partial row batch is full: {} rows",
                self.row_capacity
            )));
        }
        if self.data.len() + ROW_LEN_SIZE + row.len() > self.byte_capacity {
            return Err(Error::over_capacity(format!(
                "partial row batch is full: {} + {} bytes exceeds {}",
                self.data.len(),
                ROW_LEN_SIZE + row.len(),
                self.byte_capacity
            )));
        }
        self.row_offsets.push(self.data.len());
        self.data.extend_from_slice(&(row.len() as u32).to_le_bytes());
        self.data.extend_from_slice(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::parse("id int,v int").unwrap())
    }

    #[test]
    fn test_defaults() {
        let batch = PartialRowBatch::new(schema()).unwrap();
        assert_eq!(batch.byte_capacity(), 1 << 20);
        assert_eq!(batch.row_capacity(), 65536);
        assert_eq!(batch.row_size(), 0);
        assert_eq!(batch.byte_size(), 0);
        assert!(batch.get_row(0).is_none());
    }

    #[test]
    fn test_append_and_get_row() {
        let mut batch = PartialRowBatch::with_capacity(schema(), 64, 4).unwrap();
        batch.append_row(&[1, 2, 3]).unwrap();
        batch.append_row(&[]).unwrap();
        assert_eq!(batch.row_size(), 2);
        assert_eq!(batch.byte_size(), 4 + 3 + 4);
        assert_eq!(batch.get_row(0), Some(&[1u8, 2, 3][..]));
        assert_eq!(batch.get_row(1), Some(&[][..]));
        assert!(batch.get_row(2).is_none());
    }

    #[test]
    fn test_capacity_limits() {
        let mut batch = PartialRowBatch::with_capacity(schema(), 10, 8).unwrap();
        batch.append_row(&[0; 6]).unwrap();
        assert!(matches!(
            batch.append_row(&[0]),
            Err(Error::OverCapacity { .. })
        ));
        assert_eq!(batch.row_size(), 1);

        let mut batch = PartialRowBatch::with_capacity(schema(), 64, 1).unwrap();
        batch.append_row(&[0]).unwrap();
        assert!(matches!(
            batch.append_row(&[0]),
            Err(Error::OverCapacity { .. })
        ));
    }
}
