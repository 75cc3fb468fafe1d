//! Versioned columns.
//!
//! A `Column` owns the base blocks and the chronological delta history of one
//! column. It only grows: blocks and deltas are appended, never removed, so
//! readers created earlier stay valid.

use crate::block::ColumnBlock;
use crate::delta::ColumnDelta;
use crate::reader::TypedColumnReader;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use memcol_core::schema::ColumnSchema;
use memcol_core::{ColumnType, Error, FixedType, Result};

/// Base blocks shared between a column and its readers.
pub type BlockList = Arc<Vec<Arc<ColumnBlock>>>;

/// One column: base layer plus delta history.
#[derive(Debug)]
pub struct Column {
    schema: ColumnSchema,
    storage_type: ColumnType,
    base_version: u64,
    base: BlockList,
    deltas: Vec<Arc<ColumnDelta>>,
}

impl Column {
    /// Creates an empty column stored as its logical type.
    pub fn new(schema: ColumnSchema, base_version: u64) -> Self {
        let storage_type = schema.column_type();
        Self::with_storage_type(schema, storage_type, base_version)
    }

    /// Creates an empty column stored as `storage_type`.
    pub fn with_storage_type(
        schema: ColumnSchema,
        storage_type: ColumnType,
        base_version: u64,
    ) -> Self {
        Self {
            schema,
            storage_type,
            base_version,
            base: Arc::new(Vec::new()),
            deltas: Vec::new(),
        }
    }

    /// Returns the column schema.
    #[inline]
    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Returns the physical storage type.
    #[inline]
    pub fn storage_type(&self) -> ColumnType {
        self.storage_type
    }

    /// Returns the version of the base layer.
    #[inline]
    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    /// Returns the newest version: that of the last delta, or the base version.
    pub fn version(&self) -> u64 {
        self.deltas
            .last()
            .map_or(self.base_version, |d| d.version())
    }

    /// Returns the base blocks.
    #[inline]
    pub fn blocks(&self) -> &[Arc<ColumnBlock>] {
        &self.base
    }

    /// Returns the delta history, oldest first.
    #[inline]
    pub fn deltas(&self) -> &[Arc<ColumnDelta>] {
        &self.deltas
    }

    /// Appends a base block and returns its block id.
    ///
    /// Readers created before this call keep their own block list. Blocks of
    /// a non-nullable column are stored without null flags.
    pub fn add_block(&mut self, mut block: ColumnBlock) -> Result<u32> {
        let esize = self.storage_type.byte_size();
        if block.data().esize() != esize {
            return Err(Error::invalid_argument(format!(
                "block element size {} does not match {} storage",
                block.data().esize(),
                self.storage_type
            )));
        }
        if !self.schema.is_nullable() {
            block.drop_nulls();
        } else if block.nulls().is_none() {
            return Err(Error::invalid_argument(format!(
                "block for nullable column {} has no null buffer",
                self.schema.name()
            )));
        }
        let bid = self.base.len() as u32;
        Arc::make_mut(&mut self.base).push(Arc::new(block));
        tracing::debug!(column = self.schema.name(), block = bid, "published base block");
        Ok(bid)
    }

    /// Appends a delta. Versions must strictly increase.
    pub fn add_delta(&mut self, delta: ColumnDelta) -> Result<()> {
        let last = self.version();
        if delta.version() <= last {
            tracing::warn!(
                column = self.schema.name(),
                version = delta.version(),
                last,
                "rejected out-of-order delta"
            );
            return Err(Error::invalid_version(delta.version(), last));
        }
        if delta.storage_type() != self.storage_type {
            return Err(Error::type_mismatch(self.storage_type, delta.storage_type()));
        }
        if !self.schema.is_nullable() && delta.nulls().is_some() {
            return Err(Error::invalid_argument(format!(
                "delta for non-nullable column {} carries null flags",
                self.schema.name()
            )));
        }
        self.check_delta_rows(&delta)?;
        tracing::debug!(
            column = self.schema.name(),
            version = delta.version(),
            rows = delta.size(),
            "published delta"
        );
        self.deltas.push(Arc::new(delta));
        Ok(())
    }

    fn check_delta_rows(&self, delta: &ColumnDelta) -> Result<()> {
        let index = delta.index();
        if index.block_count() > self.base.len() {
            return Err(Error::invalid_argument(format!(
                "delta touches block {} but column has {} blocks",
                index.block_count() - 1,
                self.base.len()
            )));
        }
        for (bid, block) in self.base.iter().enumerate().take(index.block_count()) {
            let range = index.block_range(bid as u32);
            if let Some(&last) = index.offsets()[range].last() {
                if last as usize >= block.size() {
                    return Err(Error::invalid_argument(format!(
                        "delta row {} beyond block {} size {}",
                        last,
                        bid,
                        block.size()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Creates a snapshot reader bound to `version`.
    ///
    /// `T` is the logical type, `ST` the storage type and `NULLABLE` must
    /// match the column's nullability.
    pub fn create_reader<T, const NULLABLE: bool, ST>(
        &self,
        version: u64,
    ) -> Result<TypedColumnReader<T, NULLABLE, ST>>
    where
        T: FixedType,
        ST: FixedType,
    {
        if T::TYPE != self.schema.column_type() {
            return Err(Error::type_mismatch(self.schema.column_type(), T::TYPE));
        }
        if ST::TYPE != self.storage_type {
            return Err(Error::type_mismatch(self.storage_type, ST::TYPE));
        }
        if NULLABLE != self.schema.is_nullable() {
            return Err(Error::invalid_argument(format!(
                "reader nullability {} does not match column {}",
                NULLABLE,
                self.schema.name()
            )));
        }
        if version < self.base_version {
            return Err(Error::invalid_version(version, self.base_version));
        }
        let visible = self.deltas.partition_point(|d| d.version() <= version);
        let deltas: Vec<Arc<ColumnDelta>> = self.deltas[..visible].to_vec();
        let real_version = deltas.last().map_or(self.base_version, |d| d.version());
        tracing::debug!(
            column = self.schema.name(),
            version,
            real_version,
            deltas = deltas.len(),
            "created column reader"
        );
        Ok(TypedColumnReader::new(
            self.schema.clone(),
            self.storage_type,
            Arc::clone(&self.base),
            version,
            real_version,
            deltas,
        ))
    }

    /// Returns total bytes owned by blocks and deltas.
    pub fn memory(&self) -> usize {
        self.base.iter().map(|b| b.memory()).sum::<usize>()
            + self.deltas.iter().map(|d| d.memory()).sum::<usize>()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_column(f, &self.schema, self.storage_type)
    }
}

pub(crate) fn fmt_column(
    f: &mut fmt::Formatter<'_>,
    schema: &ColumnSchema,
    storage_type: ColumnType,
) -> fmt::Result {
    write!(f, "Column(cid={} {} {}", schema.cid(), schema.name(), schema.column_type())?;
    if storage_type != schema.column_type() {
        write!(f, " as {}", storage_type)?;
    }
    if schema.is_nullable() {
        f.write_str(" null")?;
    }
    f.write_str(")")
}
