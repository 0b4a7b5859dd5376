//! This crate provides an algebra over IP addresses and address ranges, and
//! a containment tree that organizes arbitrary, possibly non-CIDR-aligned
//! ranges for longest-prefix matching. It supports both IPv4 and IPv6 in one
//! value space: every address is a family-tagged 128-bit value, and every
//! IPv4 address sorts before every IPv6 address.
//!
//! # Ranges instead of prefixes
//!
//! The unit of storage is [`AddrRange`], an inclusive `[base, last]` pair of
//! one family. A range that happens to align to a prefix boundary prints and
//! converts as a CIDR (`10.0.0.248/29`); anything else stays an explicit
//! range (`10.0.0.250-10.0.0.255`). The algebra in [`algebra`] merges,
//! subtracts, and aggregates such ranges; [`AddrRange::to_cidrs`] decomposes
//! any range into the minimal sequence of CIDR blocks.
//!
//! Because ranges need not align to power-of-two blocks, the containment
//! structure cannot be a bitwise trie. [`RangeTree`] instead keeps an ordered
//! forest: the children of every node are sorted, and an edge means the
//! parent strictly covers the child.
//!
//! # The ordering invariant
//!
//! Ranges order by `base` ascending and, on equal bases, by `last`
//! descending, so a covering range sorts before everything it covers. This
//! single fact is what allows [`RangeTree::from_sorted`] to build the whole
//! tree in one linear pass, and lets every descent step binary-search a
//! sorted children list. The [`Interval`] trait captures exactly the three
//! relations the tree needs (`covers`, `before`, `same`), so other
//! interval-like domains can reuse it.
//!
//! # Operations on the tree
//!
//! The following are the computational complexities of the functions, where
//! `n` is the number of elements in the tree and `d` its depth.
//!
//! | Operation                           | Complexity     |
//! |-------------------------------------|----------------|
//! | `insert`, `try_insert`              | `O(d log n)`   |
//! | `remove`                            | `O(d log n)` per re-linked child |
//! | `lookup`, `contains`                | `O(d log n)`   |
//! | `superset`                          | `O(log n)`, worst case `O(n)` |
//! | `from_sorted`                       | `O(n)`         |
//! | `walk`, `iter`, rendering           | `O(n)`         |
//! | `len` and `is_empty`                | `O(1)`         |
//!
//! # Example
//!
//! ```
//! use range_tree::{algebra, AddrRange, RangeTree};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ranges: Vec<AddrRange> = ["10.0.0.0/9", "10.128.0.0/9", "10.32.5.1-10.32.5.9"]
//!     .iter()
//!     .map(|s| s.parse())
//!     .collect::<Result<_, _>>()?;
//!
//! // the two /9 blocks aggregate into one /8
//! let cidrs = algebra::aggregate(&ranges);
//! assert_eq!(cidrs[0].to_string(), "10.0.0.0/8");
//!
//! let tree: RangeTree<AddrRange> = ranges.into_iter().collect();
//! let hit = tree.lookup(&"10.32.5.3".parse()?);
//! assert_eq!(hit.map(|r| r.to_string()), Some("10.32.5.1-10.32.5.9".into()));
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Addresses and ranges are plain `Copy` values. The tree owns its node
//! arena outright and exposes mutation only through `&mut self`; share it
//! across threads behind the usual `&`/`&mut` rules (or a lock) and nothing
//! more is needed.
//!
//! # Duplicate policy
//!
//! Duplicates never destroy data and are always observable: [`RangeTree::insert`]
//! returns `false` on a duplicate, [`RangeTree::try_insert`] reports it as
//! [`Error::DuplicateItem`], and the bulk [`RangeTree::from_sorted`] returns
//! every duplicate it dropped so the caller can decide policy.

#![allow(clippy::collapsible_else_if)]
#![deny(missing_docs)]

mod addr;
mod errors;
mod fmt;
mod interval;
mod range;
#[cfg(feature = "serde")]
mod serde;
#[cfg(test)]
mod fuzzing;

pub mod algebra;
pub mod tree;

pub use addr::{Addr, Family};
pub use errors::Error;
pub use interval::Interval;
pub use range::{AddrRange, MAX_SPLIT_BITS};
pub use tree::{Iter, RangeTree};
