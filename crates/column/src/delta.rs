//! Versioned sparse column deltas.
//!
//! A `ColumnDelta` is one committed write batch for a column: a `DeltaIndex`
//! plus data and null buffers parallel to it. Deltas are immutable once built.

use crate::buffer::TypedBuffer;
use crate::delta_index::DeltaIndex;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use memcol_core::schema::ColumnSchema;
use memcol_core::{ColumnType, Error, FixedType, Result, RowId};

/// One versioned, sparse write batch of a column.
#[derive(Clone, Debug)]
pub struct ColumnDelta {
    version: u64,
    storage_type: ColumnType,
    index: DeltaIndex,
    data: TypedBuffer,
    nulls: Option<TypedBuffer>,
}

impl ColumnDelta {
    /// Returns the write version of this delta.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the storage type of the data buffer.
    #[inline]
    pub fn storage_type(&self) -> ColumnType {
        self.storage_type
    }

    /// Returns the row index.
    #[inline]
    pub fn index(&self) -> &DeltaIndex {
        &self.index
    }

    /// Returns the data buffer, parallel to the index.
    #[inline]
    pub fn data(&self) -> &TypedBuffer {
        &self.data
    }

    /// Returns the null-flag buffer, parallel to the index, if any.
    #[inline]
    pub fn nulls(&self) -> Option<&TypedBuffer> {
        self.nulls.as_ref()
    }

    /// Returns the number of rows this delta updates.
    #[inline]
    pub fn size(&self) -> usize {
        self.index.size()
    }

    /// Returns true if this delta updates any row of block `bid`.
    #[inline]
    pub fn contains_block(&self, bid: u32) -> bool {
        self.index.contains_block(bid)
    }

    /// Returns the position of `rid` in this delta.
    #[inline]
    pub fn find_idx(&self, rid: RowId) -> Option<usize> {
        self.index.find_idx(rid)
    }

    /// Returns whether the entry at `pos` is null. False without a null buffer.
    #[inline]
    pub fn is_null(&self, pos: usize) -> bool {
        self.nulls
            .as_ref()
            .is_some_and(|nulls| nulls.as_slice::<u8>()[pos] != 0)
    }

    /// Returns total bytes owned by this delta.
    pub fn memory(&self) -> usize {
        self.index.memory()
            + self.data.memory()
            + self.nulls.as_ref().map_or(0, |n| n.memory())
    }
}

/// Collects row updates for one column and builds a `ColumnDelta`.
///
/// Later updates of the same row within one builder replace earlier ones.
pub struct ColumnDeltaBuilder<ST: FixedType> {
    column: String,
    nullable: bool,
    updates: BTreeMap<RowId, Option<ST>>,
}

impl<ST: FixedType> ColumnDeltaBuilder<ST> {
    /// Creates a builder for the given column.
    pub fn new(column: &ColumnSchema) -> Self {
        Self {
            column: column.name().to_string(),
            nullable: column.is_nullable(),
            updates: BTreeMap::new(),
        }
    }

    /// Sets row `rid` to `value`.
    pub fn set(&mut self, rid: RowId, value: ST) -> &mut Self {
        self.updates.insert(rid, Some(value));
        self
    }

    /// Sets row `rid` to null.
    pub fn set_null(&mut self, rid: RowId) -> Result<&mut Self> {
        if !self.nullable {
            return Err(Error::null_constraint(self.column.clone()));
        }
        self.updates.insert(rid, None);
        Ok(self)
    }

    /// Sets row `rid` to `value`, where `None` means null.
    pub fn update(&mut self, rid: RowId, value: Option<ST>) -> Result<&mut Self> {
        match value {
            Some(v) => Ok(self.set(rid, v)),
            None => self.set_null(rid),
        }
    }

    /// Returns the number of distinct rows updated so far.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Returns true if no row has been updated.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Builds the delta, stamped with `version`.
    ///
    /// A null buffer is only allocated for nullable columns.
    pub fn build(self, version: u64) -> Result<ColumnDelta> {
        let rids: Vec<RowId> = self.updates.keys().copied().collect();
        let index = DeltaIndex::from_row_ids(&rids)?;
        let mut data = TypedBuffer::alloc(rids.len(), ST::SIZE)?;
        let mut nulls = if self.nullable {
            Some(TypedBuffer::alloc(rids.len(), 1)?)
        } else {
            None
        };

        let values = data.as_mut_slice::<ST>();
        for (pos, value) in self.updates.into_values().enumerate() {
            match value {
                Some(v) => values[pos] = v,
                None => {
                    if let Some(nulls) = nulls.as_mut() {
                        nulls.as_mut_slice::<u8>()[pos] = 1;
                    }
                }
            }
        }

        Ok(ColumnDelta {
            version,
            storage_type: ST::TYPE,
            index,
            data,
            nulls,
        })
    }
}
