//! 32-bit FNV-1a hashing for bucket selection.
//!
//! `FnvBuildHasher` is stateless, so the same key always hashes to the same
//! value across calls, instances and processes (for a fixed `Hash` impl).

use core::hash::{BuildHasher, Hasher};

const OFFSET_BASIS: u32 = 0x811c_9dc5;
const PRIME: u32 = 0x0100_0193;

#[derive(Copy, Clone, Debug)]
pub struct Fnv1aHasher {
    state: u32,
}

impl Fnv1aHasher {
    pub const fn new() -> Self {
        Self {
            state: OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut h = self.state;
        for &b in bytes {
            h ^= u32::from(b);
            h = h.wrapping_mul(PRIME);
        }
        self.state = h;
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.state)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct FnvBuildHasher;

impl BuildHasher for FnvBuildHasher {
    type Hasher = Fnv1aHasher;

    fn build_hasher(&self) -> Self::Hasher {
        Fnv1aHasher::new()
    }
}
