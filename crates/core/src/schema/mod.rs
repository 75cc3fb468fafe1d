//! Schema module for memcol.
//!
//! Column definitions and the table-level schema used by the write path to
//! address cells by column id or name.

mod column;
mod table;

pub use column::{ColumnSchema, DELETE_CID};
pub use table::Schema;
