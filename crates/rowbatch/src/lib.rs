//! Partial row batches for memcol.
//!
//! A partial row carries the key columns plus any subset of the value
//! columns. Batches of them are the unit in which updates reach the engine.
//!
//! ## Format
//!
//! ```text
//! Batch: [row_len: u32 LE][row] [row_len: u32 LE][row] ...
//!
//! Row:
//! +----------------+---------------------------------+-----------------+
//! | bitvec_size    | bitvec                          | values          |
//! | u16 LE         | set bits [0, cid_size)          | set, non-null   |
//! |                | null bits, one per set nullable | cells, cid order|
//! +----------------+---------------------------------+-----------------+
//! ```
//!
//! Bit 0 of the bitvec is the delete marker. Values are fixed width and
//! little-endian.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use memcol_core::schema::Schema;
//! use memcol_rowbatch::{PartialRowBatch, PartialRowReader, PartialRowWriter};
//!
//! let schema = Arc::new(Schema::parse("id int,uv int,city tinyint null").unwrap());
//! let mut batch = PartialRowBatch::new(Arc::clone(&schema)).unwrap();
//! let mut writer = PartialRowWriter::new(schema);
//!
//! writer.start_row();
//! writer.set("id", Some(7i32)).unwrap();
//! writer.set::<i8>("city", None).unwrap();
//! writer.write_row_to_batch(&mut batch).unwrap();
//!
//! let mut reader = PartialRowReader::new(&batch);
//! reader.read(0).unwrap();
//! assert_eq!(reader.cell_size(), 2);
//! assert_eq!(reader.cell_value::<i32>(0).unwrap(), Some(7));
//! assert_eq!(reader.cell_value::<i8>(1).unwrap(), None);
//! ```

#![no_std]

extern crate alloc;

mod batch;
mod bitmap;
mod reader;
mod writer;

pub use batch::{PartialRowBatch, DEFAULT_BYTE_CAPACITY, DEFAULT_ROW_CAPACITY};
pub use reader::PartialRowReader;
pub use writer::PartialRowWriter;

/// Bytes taken by the length prefix in front of every row.
pub const ROW_LEN_SIZE: usize = 4;

/// Bytes taken by the bitvec size at the start of every row.
pub const BITVEC_LEN_SIZE: usize = 2;
