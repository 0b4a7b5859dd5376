//! Pre-order iteration over the containment tree.

use super::{RangeTree, ROOT};
use crate::Interval;

/// An iterator over all items of a [`RangeTree`] and their depths, in
/// pre-order: an item is always yielded before everything it covers, and
/// siblings appear in their sorted order.
#[derive(Clone)]
pub struct Iter<'a, I> {
    tree: &'a RangeTree<I>,
    stack: Vec<(usize, usize)>,
}

impl<'a, I: Interval> Iterator for Iter<'a, I> {
    type Item = (&'a I, usize);

    fn next(&mut self) -> Option<(&'a I, usize)> {
        let (idx, depth) = self.stack.pop()?;
        self.stack.extend(
            self.tree.table[idx]
                .children
                .iter()
                .rev()
                .map(|&c| (c, depth + 1)),
        );
        Some((self.tree.item(idx), depth))
    }
}

impl<I: Interval> RangeTree<I> {
    /// Iterate over all items together with their depth (0 for top-level
    /// items), in pre-order.
    ///
    /// ```
    /// # use range_tree::{AddrRange, RangeTree};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let tree: RangeTree<AddrRange> = ["10.0.0.0/10", "192.0.2.0/24", "10.0.0.0/8"]
    ///     .iter()
    ///     .map(|s| s.parse())
    ///     .collect::<Result<Vec<_>, _>>()?
    ///     .into_iter()
    ///     .collect();
    /// let depths: Vec<usize> = tree.iter().map(|(_, depth)| depth).collect();
    /// assert_eq!(depths, [0, 1, 0]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, I> {
        Iter {
            tree: self,
            stack: self.table[ROOT]
                .children
                .iter()
                .rev()
                .map(|&c| (c, 0))
                .collect(),
        }
    }
}

impl<'a, I: Interval> IntoIterator for &'a RangeTree<I> {
    type Item = (&'a I, usize);
    type IntoIter = Iter<'a, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
