//! The capability contract connecting stored items to the containment tree.

use std::cmp::Ordering;
use std::fmt::Display;

use crate::AddrRange;

/// Capability contract for items stored in a [`crate::RangeTree`].
///
/// The tree needs exactly three relations and a textual form. The relations
/// must agree with each other:
///
/// - `before` is a strict total order over any duplicate-free set: for
///   distinct `a` and `b`, exactly one of `a.before(b)` and `b.before(a)`
///   holds, and the relation is transitive.
/// - `covers` is a strict partial order (equal items never cover each
///   other).
/// - **`a.covers(b)` implies `a.before(b)`.** Everything the tree does (the
///   single sorted bulk-build pass, the binary-searched descent, the
///   contiguous re-parenting on insert) leans on covering items sorting
///   before the items they cover.
///
/// [`AddrRange`] is the principal implementation; any interval-like domain
/// satisfying the contract can reuse the tree unchanged.
pub trait Interval: Display {
    /// Strict superset test: whether `self` contains all of `other` without
    /// being equal to it.
    fn covers(&self, other: &Self) -> bool;

    /// Strict ordering test, consistent with `covers` as described on the
    /// trait.
    fn before(&self, other: &Self) -> bool;

    /// Equality as the tree sees it: items for which `same` holds are
    /// duplicates of each other.
    fn same(&self, other: &Self) -> bool;
}

/// The total order induced by [`Interval::before`], for sorting.
pub(crate) fn order<I: Interval>(a: &I, b: &I) -> Ordering {
    if a.before(b) {
        Ordering::Less
    } else if b.before(a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

impl Interval for AddrRange {
    fn covers(&self, other: &Self) -> bool {
        AddrRange::covers(self, other)
    }

    fn before(&self, other: &Self) -> bool {
        self < other
    }

    fn same(&self, other: &Self) -> bool {
        self == other
    }
}
