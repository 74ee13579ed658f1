#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Errors reported by fallible table operations.
pub mod error;

/// FNV-1a hashing, the default hash function of [`ProbingTable`].
pub mod fnv;

pub mod probing_table;

#[cfg(any(test, feature = "stats"))]
pub mod stats;

pub use error::TableError;
pub use fnv::FnvBuildHasher;
pub use probing_table::ProbingTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// A randomly seeded hasher builder for tables whose keys come from
        /// untrusted input. The default FNV-1a hasher is unseeded.
        pub type RandomState = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// A randomly seeded hasher builder for tables whose keys come from
        /// untrusted input. The default FNV-1a hasher is unseeded.
        pub type RandomState = std::hash::RandomState;
    }
}
