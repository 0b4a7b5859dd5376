//! Formatting implementation for the containment tree.

use std::fmt::{Debug, Display, Formatter, Result};

use crate::tree::ROOT;
use crate::{Interval, RangeTree};

impl<I: Interval> Display for RangeTree<I> {
    /// Deterministic ASCII-tree rendering: the root marker `.`, then one
    /// line per item with box-drawing connectors. The empty tree renders as
    /// the bare root marker.
    ///
    /// ```
    /// # use range_tree::{AddrRange, RangeTree};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let tree: RangeTree<AddrRange> = ["10.0.0.0/8", "10.0.0.0/10", "192.0.2.0/24"]
    ///     .iter()
    ///     .map(|s| s.parse())
    ///     .collect::<Result<Vec<_>, _>>()?
    ///     .into_iter()
    ///     .collect();
    /// assert_eq!(
    ///     tree.to_string(),
    ///     ".\n\
    ///      ├─ 10.0.0.0/8\n\
    ///      │  └─ 10.0.0.0/10\n\
    ///      └─ 192.0.2.0/24",
    /// );
    /// # Ok(())
    /// # }
    /// ```
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(".")?;
        let mut indent = String::new();
        self.fmt_children(f, ROOT, &mut indent)
    }
}

impl<I: Interval> RangeTree<I> {
    fn fmt_children(&self, f: &mut Formatter<'_>, idx: usize, indent: &mut String) -> Result {
        let children = &self.table[idx].children;
        for (k, &child) in children.iter().enumerate() {
            let last = k + 1 == children.len();
            let connector = if last { "└─ " } else { "├─ " };
            write!(f, "\n{indent}{connector}{}", self.item(child))?;
            let continuation = if last { "   " } else { "│  " };
            indent.push_str(continuation);
            self.fmt_children(f, child, indent)?;
            indent.truncate(indent.len() - continuation.len());
        }
        Ok(())
    }
}

impl<I: Interval> Debug for RangeTree<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        Display::fmt(self, f)
    }
}
