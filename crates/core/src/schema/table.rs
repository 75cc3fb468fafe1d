//! Table schema for memcol.

use super::column::ColumnSchema;
use crate::error::{Error, Result};
use crate::types::ColumnType;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;

/// An ordered set of columns addressed by cid or by name.
///
/// Column ids are dense and start at 1; cid 0 is the delete marker.
#[derive(Clone, Debug)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
    name_to_cid: HashMap<String, u32>,
    num_key_columns: usize,
}

impl Schema {
    /// Creates a schema from columns in cid order.
    ///
    /// Key columns must lead the column list and must not be nullable.
    pub fn new(columns: Vec<ColumnSchema>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::invalid_schema("schema has no columns"));
        }
        let mut name_to_cid = HashMap::with_capacity(columns.len());
        let mut num_key_columns = 0;
        for (i, col) in columns.iter().enumerate() {
            if col.cid() as usize != i + 1 {
                return Err(Error::invalid_schema(format!(
                    "column {} has cid {}, expected {}",
                    col.name(),
                    col.cid(),
                    i + 1
                )));
            }
            if col.is_key() {
                if num_key_columns != i {
                    return Err(Error::invalid_schema(format!(
                        "key column {} must precede value columns",
                        col.name()
                    )));
                }
                if col.is_nullable() {
                    return Err(Error::invalid_schema(format!(
                        "key column {} cannot be nullable",
                        col.name()
                    )));
                }
                num_key_columns += 1;
            }
            if name_to_cid.insert(col.name().to_string(), col.cid()).is_some() {
                return Err(Error::invalid_schema(format!(
                    "duplicate column name: {}",
                    col.name()
                )));
            }
        }
        if num_key_columns == 0 {
            return Err(Error::invalid_schema("schema has no key column"));
        }
        Ok(Self {
            columns,
            name_to_cid,
            num_key_columns,
        })
    }

    /// Parses a comma separated description such as
    /// `"id int,uv int,pv int,city tinyint null"`.
    ///
    /// The first column becomes the key column.
    pub fn parse(desc: &str) -> Result<Self> {
        let mut columns = Vec::new();
        for (i, item) in desc.split(',').enumerate() {
            let parts: Vec<&str> = item.split_whitespace().collect();
            let (name, ty, nullable) = match parts.as_slice() {
                [name, ty] => (*name, *ty, false),
                [name, ty, null] if null.eq_ignore_ascii_case("null") => (*name, *ty, true),
                _ => {
                    return Err(Error::invalid_schema(format!(
                        "bad column description: '{}'",
                        item.trim()
                    )))
                }
            };
            check_naming_rules(name)?;
            let column_type = ColumnType::parse(ty)?;
            columns.push(
                ColumnSchema::new(i as u32 + 1, name, column_type)
                    .nullable(nullable)
                    .key(i == 0),
            );
        }
        Self::new(columns)
    }

    /// Returns all columns in cid order.
    #[inline]
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Returns the number of columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of leading key columns.
    #[inline]
    pub fn num_key_columns(&self) -> usize {
        self.num_key_columns
    }

    /// Returns the size of the cid space including the delete marker.
    #[inline]
    pub fn cid_size(&self) -> usize {
        self.columns.len() + 1
    }

    /// Gets a column by cid.
    pub fn get_by_cid(&self, cid: u32) -> Option<&ColumnSchema> {
        if cid == 0 {
            return None;
        }
        self.columns.get(cid as usize - 1)
    }

    /// Gets a column by name.
    pub fn get_by_name(&self, name: &str) -> Option<&ColumnSchema> {
        self.name_to_cid
            .get(name)
            .and_then(|&cid| self.get_by_cid(cid))
    }

    /// Returns the byte width of a column, or 0 for unknown cids.
    pub fn get_column_byte_size(&self, cid: u32) -> usize {
        self.get_by_cid(cid).map_or(0, |c| c.byte_size())
    }
}

fn check_naming_rules(name: &str) -> Result<()> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(Error::invalid_schema("Name cannot be empty")),
        Some(first) if !first.is_ascii_alphabetic() && first != '_' => {
            return Err(Error::invalid_schema(format!(
                "Name must start with letter or underscore: {}",
                name
            )))
        }
        _ => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::invalid_schema(format!(
            "Name contains invalid characters: {}",
            name
        )));
    }
    Ok(())
}
