use core::hash::BuildHasher;
use core::hash::Hasher;

/// FNV-1a 64-bit offset basis.
pub const OFFSET_BASIS: u64 = 14695981039346656037;

/// FNV-1a 64-bit prime.
pub const PRIME: u64 = 1099511628211;

/// Hashes `key` with 64-bit FNV-1a.
///
/// This is the hash [`ProbingTable`](crate::ProbingTable) uses for its
/// default hasher builder. It is unseeded, so an adversary who controls the
/// key set can force collisions. Use a seeded builder such as
/// [`RandomState`](crate::RandomState) when keys come from untrusted input.
///
/// # Examples
///
/// ```rust
/// use probe_table::fnv::hash_key;
///
/// assert_eq!(hash_key(""), 0xcbf2_9ce4_8422_2325);
/// assert_eq!(hash_key("a"), 0xaf63_dc4c_8601_ec8c);
/// ```
#[inline]
pub fn hash_key(key: &str) -> u64 {
    fold(OFFSET_BASIS, key.as_bytes())
}

#[inline(always)]
fn fold(mut hash: u64, bytes: &[u8]) -> u64 {
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// A streaming FNV-1a [`Hasher`].
///
/// Feeding a key's bytes through [`Hasher::write`] produces the same value as
/// [`hash_key`]. Note that `str::hash` appends a terminator byte, so hashing a
/// `&str` through [`core::hash::Hash`] does not.
#[derive(Debug, Clone, Copy)]
pub struct FnvHasher {
    state: u64,
}

impl Default for FnvHasher {
    #[inline]
    fn default() -> Self {
        Self {
            state: OFFSET_BASIS,
        }
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.state = fold(self.state, bytes);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Builds [`FnvHasher`]s. Stateless, so every hasher starts from the offset
/// basis.
#[derive(Debug, Clone, Copy, Default)]
pub struct FnvBuildHasher;

impl BuildHasher for FnvBuildHasher {
    type Hasher = FnvHasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        FnvHasher::default()
    }
}
