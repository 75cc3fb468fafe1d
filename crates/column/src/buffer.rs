//! Typed byte buffers.
//!
//! A `TypedBuffer` owns a contiguous, zero-initialized byte region and records
//! the element width it was allocated for. Typed views must use an element of
//! exactly that width; anything else is a caller bug and panics.

use alloc::vec::Vec;
use core::fmt;
use core::mem::{align_of, size_of};
use memcol_core::{Error, Pod, Result};

/// Backing word. Its alignment covers every `Pod` element type.
type Word = u128;

const WORD_SIZE: usize = size_of::<Word>();

const _: () = assert!(align_of::<Word>() >= align_of::<f64>());
const _: () = assert!(align_of::<Word>() >= align_of::<u64>());

/// A growable-once byte region viewed as an array of fixed-width elements.
#[derive(Clone)]
pub struct TypedBuffer {
    words: Vec<Word>,
    bsize: usize,
    esize: usize,
}

impl TypedBuffer {
    /// Allocates a zeroed buffer holding `len` elements of `esize` bytes.
    pub fn alloc(len: usize, esize: usize) -> Result<Self> {
        if esize == 0 {
            return Err(Error::invalid_argument("element size must be positive"));
        }
        let bsize = len
            .checked_mul(esize)
            .ok_or_else(|| Error::alloc_failed(usize::MAX))?;
        let nwords = bsize.div_ceil(WORD_SIZE);
        let mut words = Vec::new();
        if words.try_reserve_exact(nwords).is_err() {
            tracing::warn!(bytes = bsize, "typed buffer allocation failed");
            return Err(Error::alloc_failed(bsize));
        }
        words.resize(nwords, 0);
        Ok(Self {
            words,
            bsize,
            esize,
        })
    }

    /// Allocates a buffer and fills it with `values`.
    pub fn from_slice<T: Pod>(values: &[T]) -> Result<Self> {
        let mut buf = Self::alloc(values.len(), size_of::<T>())?;
        buf.as_mut_slice::<T>().copy_from_slice(values);
        Ok(buf)
    }

    /// Returns the size of the region in bytes.
    #[inline]
    pub fn bsize(&self) -> usize {
        self.bsize
    }

    /// Returns the element width this buffer was allocated for.
    #[inline]
    pub fn esize(&self) -> usize {
        self.esize
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.bsize / self.esize
    }

    /// Returns true if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bsize == 0
    }

    /// Returns the number of bytes reserved by this buffer.
    pub fn memory(&self) -> usize {
        self.words.capacity() * WORD_SIZE
    }

    /// Views the buffer as a slice of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not exactly `esize` bytes wide.
    #[inline]
    pub fn as_slice<T: Pod>(&self) -> &[T] {
        self.check_view::<T>();
        // SAFETY: the words are zero-initialized and at least `bsize` bytes
        // long, `Word` alignment satisfies every `Pod` type, and `Pod`
        // accepts any bit pattern.
        unsafe { core::slice::from_raw_parts(self.words.as_ptr() as *const T, self.len()) }
    }

    /// Views the buffer as a mutable slice of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not exactly `esize` bytes wide.
    #[inline]
    pub fn as_mut_slice<T: Pod>(&mut self) -> &mut [T] {
        self.check_view::<T>();
        let len = self.len();
        // SAFETY: see `as_slice`; the borrow of `self` is exclusive.
        unsafe { core::slice::from_raw_parts_mut(self.words.as_mut_ptr() as *mut T, len) }
    }

    /// Views the raw bytes of the buffer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `u8` has alignment 1 and the region spans `bsize` bytes.
        unsafe { core::slice::from_raw_parts(self.words.as_ptr() as *const u8, self.bsize) }
    }

    /// Views the raw bytes of the buffer mutably.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as `as_bytes`, with an exclusive borrow.
        unsafe { core::slice::from_raw_parts_mut(self.words.as_mut_ptr() as *mut u8, self.bsize) }
    }

    #[inline]
    fn check_view<T>(&self) {
        assert_eq!(
            size_of::<T>(),
            self.esize,
            "buffer of {}-byte elements viewed with a {}-byte type",
            self.esize,
            size_of::<T>()
        );
    }
}

impl fmt::Debug for TypedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedBuffer")
            .field("bsize", &self.bsize)
            .field("esize", &self.esize)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_zeroed() {
        let buf = TypedBuffer::alloc(10, 4).unwrap();
        assert_eq!(buf.bsize(), 40);
        assert_eq!(buf.esize(), 4);
        assert_eq!(buf.len(), 10);
        assert!(buf.as_slice::<i32>().iter().all(|&v| v == 0));
        assert!(buf.memory() >= 40);
    }

    #[test]
    fn test_empty_buffer() {
        let buf = TypedBuffer::alloc(0, 8).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.as_slice::<i64>().len(), 0);
        assert_eq!(buf.as_bytes().len(), 0);
    }

    #[test]
    fn test_typed_write_read() {
        let mut buf = TypedBuffer::alloc(3, 8).unwrap();
        buf.as_mut_slice::<f64>().copy_from_slice(&[1.5, -2.0, 3.25]);
        assert_eq!(buf.as_slice::<f64>(), &[1.5, -2.0, 3.25]);
        assert_eq!(buf.as_bytes().len(), 24);
    }

    #[test]
    fn test_from_slice() {
        let buf = TypedBuffer::from_slice(&[1i128, 2, 3]).unwrap();
        assert_eq!(buf.esize(), 16);
        assert_eq!(buf.as_slice::<i128>(), &[1, 2, 3]);
    }

    #[test]
    fn test_zero_esize_rejected() {
        assert!(TypedBuffer::alloc(4, 0).is_err());
    }

    #[test]
    #[should_panic(expected = "viewed with")]
    fn test_mismatched_view_panics() {
        let buf = TypedBuffer::alloc(4, 4).unwrap();
        let _ = buf.as_slice::<i64>();
    }
}
