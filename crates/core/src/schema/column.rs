//! Column definition for memcol schemas.

use crate::types::ColumnType;
use alloc::string::String;

/// Column id reserved for the row-level delete marker.
pub const DELETE_CID: u32 = 0;

/// A column definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Column id, starting at 1.
    cid: u32,
    /// Column name.
    name: String,
    /// Logical column type.
    column_type: ColumnType,
    /// Whether this column allows null values.
    nullable: bool,
    /// Whether this column is part of the key.
    is_key: bool,
}

impl ColumnSchema {
    /// Creates a new non-nullable, non-key column.
    pub fn new(cid: u32, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            cid,
            name: name.into(),
            column_type,
            nullable: false,
            is_key: false,
        }
    }

    /// Sets whether this column is nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets whether this column is a key column.
    pub fn key(mut self, is_key: bool) -> Self {
        self.is_key = is_key;
        self
    }

    /// Returns the column id.
    #[inline]
    pub fn cid(&self) -> u32 {
        self.cid
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the logical type.
    #[inline]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Returns whether this column is nullable.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns whether this column is a key column.
    #[inline]
    pub fn is_key(&self) -> bool {
        self.is_key
    }

    /// Returns the byte width of one value.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.column_type.byte_size()
    }
}
