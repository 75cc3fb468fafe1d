//! memcol Core - Core types and schema definitions for the memcol columnar engine.
//!
//! This crate provides the foundational pieces shared by the read and write paths:
//!
//! - `ColumnType`: Supported fixed-width column types
//! - `FixedType`: The Rust primitive backing each column type
//! - `row_id`: Row id encoding (block index in the high bits, offset in the low 16)
//! - `schema`: Column and table schema definitions
//! - `hash`: FNV-1a fingerprints for key column values
//! - `Error`: Error types for engine operations
//!
//! # Example
//!
//! ```rust
//! use memcol_core::schema::Schema;
//! use memcol_core::row_id::{block_of, offset_of};
//! use memcol_core::ColumnType;
//!
//! let schema = Schema::parse("id bigint,score int null").unwrap();
//! assert_eq!(schema.get_by_name("score").unwrap().column_type(), ColumnType::Int);
//!
//! let rid = 65536 * 3 + 42;
//! assert_eq!(block_of(rid), 3);
//! assert_eq!(offset_of(rid), 42);
//! ```

#![no_std]

extern crate alloc;

mod error;
pub mod hash;
pub mod row_id;
pub mod schema;
mod types;

pub use error::{Error, Result};
pub use row_id::RowId;
pub use types::{ColumnType, FixedType, Pod};
