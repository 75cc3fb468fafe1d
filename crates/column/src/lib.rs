//! memcol Column - Multi-versioned column storage for the memcol engine.
//!
//! This crate provides the read path of an in-memory columnar store:
//!
//! - `TypedBuffer`: Zeroed byte region with element-size checked typed views
//! - `ColumnBlock`: One base-layer block of up to 65536 rows with optional null flags
//! - `DeltaIndex`: Block-grouped index from row ids to delta positions
//! - `ColumnDelta`: One versioned sparse write batch
//! - `Column`: Base blocks plus chronological delta history
//! - `TypedColumnReader`: Snapshot view with point lookup, block materialization,
//!   hashing and key equality
//! - `ColumnBlockHolder`: Receives either a shared base block or an owned patched copy
//!
//! # Example
//!
//! ```rust
//! use memcol_column::{Column, ColumnBlock, ColumnBlockHolder, ColumnDeltaBuilder};
//! use memcol_core::schema::ColumnSchema;
//! use memcol_core::ColumnType;
//!
//! let schema = ColumnSchema::new(2, "pv", ColumnType::Int).nullable(true);
//! let mut column = Column::new(schema, 0);
//! column.add_block(ColumnBlock::from_values(&[10i32, 20, 30, 40]).unwrap()).unwrap();
//!
//! let mut builder = ColumnDeltaBuilder::<i32>::new(column.schema());
//! builder.set(1, 25);
//! column.add_delta(builder.build(1).unwrap()).unwrap();
//!
//! let reader = column.create_reader::<i32, true, i32>(1).unwrap();
//! assert_eq!(reader.get(1), Some(&25));
//!
//! let mut holder = ColumnBlockHolder::new();
//! reader.get_block(4, 0, &mut holder).unwrap();
//! assert_eq!(holder.get().unwrap().value::<i32>(1), Some(25));
//! ```

#![no_std]

extern crate alloc;

pub mod block;
pub mod buffer;
pub mod column;
pub mod delta;
pub mod delta_index;
pub mod holder;
pub mod reader;

pub use block::ColumnBlock;
pub use buffer::TypedBuffer;
pub use column::{BlockList, Column};
pub use delta::{ColumnDelta, ColumnDeltaBuilder};
pub use delta_index::DeltaIndex;
pub use holder::ColumnBlockHolder;
pub use reader::{typed_column_get, TypedColumnReader};
