//! Two classic in-memory key-value containers.
//!
//! - [`BstMap`] - an ordered map over an unbalanced binary search tree, with
//!   point lookup, insert-or-update, deletion by successor splicing, and
//!   in-order iteration.
//! - [`ChainedHashMap`] - a hash map resolving collisions by separate chaining
//!   over a fixed number of buckets, with reverse lookup by value and
//!   per-bucket occupancy for inspecting how keys spread.
//!
//! # Example
//!
//! ```
//! use chainbst::{BstMap, ChainedHashMap};
//!
//! let mut tree = BstMap::new();
//! for key in [5, 3, 8, 1, 4] {
//!     tree.put(key, ());
//! }
//! assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 8]);
//!
//! let mut table = ChainedHashMap::with_buckets(1);
//! table.put("A", 1);
//! table.put("B", 2);
//! table.put("C", 3);
//! assert_eq!(table.bucket_sizes(), [3]);
//!
//! table.remove("B");
//! assert_eq!(table.bucket_sizes(), [2]);
//! assert_eq!(table.get("B"), None);
//! ```
//!
//! # Design
//!
//! Neither container rebalances or resizes. The tree's shape follows insertion
//! order, and the hash map keeps the bucket count it was built with, so chain
//! lengths grow with the number of entries. Both keep their nodes in a slot
//! arena and link them by compact handles rather than pointers.
//!
//! "Not found" is always `None`. Both containers are plain single-threaded
//! values: share one across threads behind a lock that is held for the whole
//! of each call.

// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

mod raw;

pub mod bst_map;
pub mod chain_map;
pub mod hasher;

pub use bst_map::BstMap;
pub use chain_map::{ChainedHashMap, DEFAULT_BUCKETS};
