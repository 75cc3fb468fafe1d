//! Column type definitions for memcol.
//!
//! Only fixed-width scalar types are supported. Each `ColumnType` maps to
//! exactly one Rust primitive through the sealed `FixedType` trait.

use crate::error::{Error, Result};
use alloc::format;
use core::fmt;

/// Supported fixed-width column types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// 8-bit signed integer
    TinyInt,
    /// 16-bit signed integer
    SmallInt,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    BigInt,
    /// 128-bit signed integer
    LargeInt,
    /// 32-bit floating point number
    Float,
    /// 64-bit floating point number
    Double,
}

impl ColumnType {
    /// Returns the storage width of one value in bytes.
    pub fn byte_size(&self) -> usize {
        match self {
            ColumnType::TinyInt => 1,
            ColumnType::SmallInt => 2,
            ColumnType::Int => 4,
            ColumnType::BigInt => 8,
            ColumnType::LargeInt => 16,
            ColumnType::Float => 4,
            ColumnType::Double => 8,
        }
    }

    /// Returns the schema name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::TinyInt => "tinyint",
            ColumnType::SmallInt => "smallint",
            ColumnType::Int => "int",
            ColumnType::BigInt => "bigint",
            ColumnType::LargeInt => "largeint",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
        }
    }

    /// Parses a schema type name (case-insensitive).
    pub fn parse(name: &str) -> Result<Self> {
        if let Some(ty) = Self::ALL.iter().find(|t| t.name().eq_ignore_ascii_case(name)) {
            return Ok(*ty);
        }
        if ["char", "varchar", "string"]
            .iter()
            .any(|v| v.eq_ignore_ascii_case(name))
        {
            return Err(Error::not_supported(format!(
                "var length type not supported: {}",
                name
            )));
        }
        Err(Error::invalid_schema(format!("unknown column type: {}", name)))
    }

    const ALL: [ColumnType; 7] = [
        ColumnType::TinyInt,
        ColumnType::SmallInt,
        ColumnType::Int,
        ColumnType::BigInt,
        ColumnType::LargeInt,
        ColumnType::Float,
        ColumnType::Double,
    ];
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Plain-old-data element that can be viewed over raw storage words.
///
/// # Safety
///
/// Implementors must be `Copy`, contain no padding and accept every bit
/// pattern as a valid value.
pub unsafe trait Pod: Copy + Send + Sync + 'static {}

macro_rules! impl_pod {
    ($($ty:ty),* $(,)?) => {
        $(unsafe impl Pod for $ty {})*
    };
}

impl_pod!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

/// A Rust primitive that stores one value of a fixed-width column type.
pub trait FixedType: sealed::Sealed + Pod + PartialEq + Default + fmt::Debug {
    /// The column type this primitive represents.
    const TYPE: ColumnType;
    /// Width in bytes.
    const SIZE: usize = core::mem::size_of::<Self>();

    /// Writes the value little-endian into `out[..SIZE]`.
    fn write_le(self, out: &mut [u8]);

    /// Reads a little-endian value from `bytes[..SIZE]`.
    fn read_le(bytes: &[u8]) -> Self;

    /// Writes the value in native byte order into `out[..SIZE]`.
    fn write_ne(self, out: &mut [u8]);
}

macro_rules! impl_fixed_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl FixedType for $ty {
                const TYPE: ColumnType = ColumnType::$variant;

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; core::mem::size_of::<$ty>()];
                    buf.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(buf)
                }

                #[inline]
                fn write_ne(self, out: &mut [u8]) {
                    out[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

impl_fixed_type!(
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    i128 => LargeInt,
    f32 => Float,
    f64 => Double,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_size_matches_primitive() {
        assert_eq!(ColumnType::TinyInt.byte_size(), i8::SIZE);
        assert_eq!(ColumnType::SmallInt.byte_size(), i16::SIZE);
        assert_eq!(ColumnType::Int.byte_size(), i32::SIZE);
        assert_eq!(ColumnType::BigInt.byte_size(), i64::SIZE);
        assert_eq!(ColumnType::LargeInt.byte_size(), i128::SIZE);
        assert_eq!(ColumnType::Float.byte_size(), f32::SIZE);
        assert_eq!(ColumnType::Double.byte_size(), f64::SIZE);
    }

    #[test]
    fn test_parse() {
        assert_eq!(ColumnType::parse("int").unwrap(), ColumnType::Int);
        assert_eq!(ColumnType::parse("TINYINT").unwrap(), ColumnType::TinyInt);
        assert_eq!(ColumnType::parse("double").unwrap(), ColumnType::Double);
        assert!(matches!(
            ColumnType::parse("varchar"),
            Err(Error::NotSupported { .. })
        ));
        assert!(matches!(
            ColumnType::parse("decimal"),
            Err(Error::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_le_encoding() {
        let mut buf = [0u8; 8];
        0x0102_0304i32.write_le(&mut buf);
        assert_eq!(&buf[..4], &[4, 3, 2, 1]);
        assert_eq!(i32::read_le(&buf), 0x0102_0304);

        (-1.5f64).write_le(&mut buf);
        assert_eq!(f64::read_le(&buf), -1.5);
    }

    #[test]
    fn test_type_constants() {
        assert_eq!(<i64 as FixedType>::TYPE, ColumnType::BigInt);
        assert_eq!(<f32 as FixedType>::TYPE, ColumnType::Float);
    }
}
