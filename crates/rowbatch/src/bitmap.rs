//! Bit helpers over byte slices, least significant bit first.

#[inline]
pub(crate) fn num_bytes(bits: usize) -> usize {
    (bits + 7) / 8
}

#[inline]
pub(crate) fn set(bits: &mut [u8], i: usize) {
    bits[i >> 3] |= 1 << (i & 7);
}

#[inline]
pub(crate) fn test(bits: &[u8], i: usize) -> bool {
    bits[i >> 3] & (1 << (i & 7)) != 0
}
