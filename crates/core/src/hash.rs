//! 64-bit FNV-1a fingerprinting for key column values.

use crate::types::FixedType;
use core::hash::Hasher;

/// FNV-1a hasher starting from a caller-chosen seed.
///
/// Key column hashing seeds with 0 rather than the usual offset basis, so
/// values hash identically to rows fingerprinted by the ingestion path.
#[derive(Default)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    /// Conventional FNV-64 offset basis.
    pub const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    /// Creates a hasher seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= *byte as u64;
            self.state = self.state.wrapping_mul(Self::FNV_PRIME);
        }
    }
}

/// Hashes `bytes` with FNV-1a starting from `seed`.
pub fn fnv_hash64(bytes: &[u8], seed: u64) -> u64 {
    let mut hasher = FnvHasher::with_seed(seed);
    hasher.write(bytes);
    hasher.finish()
}

/// Hashes the native-order bytes of a fixed-width value with seed 0.
pub fn hash_value<T: FixedType>(value: T) -> u64 {
    let mut buf = [0u8; 16];
    value.write_ne(&mut buf);
    fnv_hash64(&buf[..T::SIZE], 0)
}
