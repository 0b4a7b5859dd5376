//! The containment tree: an ordered forest whose edges encode the `covers`
//! relation among the stored items.

use log::{debug, trace};

use crate::{interval, Error, Interval};

mod iter;

pub use iter::*;

/// Index of the itemless root node. It stands for the whole address
/// universe: every top-level item is one of its children.
pub(crate) const ROOT: usize = 0;

/// A containment tree over items implementing [`Interval`].
///
/// Nodes live in an arena indexed by position; the parent link is an index,
/// never a reference. The children of every node are kept sorted by
/// [`Interval::before`] at all times, no two siblings are equal, and no
/// sibling covers another sibling: containment always demotes the covered
/// item to a descendant.
///
/// All mutation goes through `&mut self` and all reads through `&self`, so
/// the exclusive-writer / shared-reader discipline is enforced by the borrow
/// checker. There is no interior mutability.
///
/// ```
/// # use range_tree::{AddrRange, RangeTree};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree: RangeTree<AddrRange> = RangeTree::new();
/// tree.insert("10.0.0.0/8".parse()?);
/// tree.insert("10.64.0.0-10.80.1.255".parse()?);
/// tree.insert("192.0.2.0/24".parse()?);
/// let hit = tree.lookup(&"10.64.0.1".parse()?);
/// assert_eq!(hit.map(|r| r.to_string()), Some("10.64.0.0-10.80.1.255".into()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RangeTree<I> {
    pub(crate) table: Vec<Node<I>>,
    free: Vec<usize>,
    count: usize,
}

#[derive(Clone)]
pub(crate) struct Node<I> {
    pub(crate) item: Option<I>,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
}

/// Where the descent stands at one level of the tree.
enum Descent {
    /// An equal item sits at this child position.
    Found { pos: usize },
    /// The child immediately before the insertion point covers the item:
    /// enter it and search again.
    Enter { next: usize },
    /// The item belongs at this child position of the current node.
    At { pos: usize },
}

impl<I> Default for RangeTree<I> {
    fn default() -> Self {
        Self {
            table: vec![Node {
                item: None,
                parent: None,
                children: Vec::new(),
            }],
            free: Vec::new(),
            count: 0,
        }
    }
}

impl<I: Interval> RangeTree<I> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of items stored in the tree.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the tree stores no items.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Build a tree from items already sorted by [`Interval::before`], in a
    /// single left-to-right pass.
    ///
    /// Duplicates do not enter the tree; **all** of them are handed back in
    /// the second return value so the caller can decide policy. Single-item
    /// [`Self::insert`] drops duplicates silently instead; see the crate
    /// documentation for the duplicate policy.
    ///
    /// ```
    /// # use range_tree::{AddrRange, RangeTree};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut items: Vec<AddrRange> = ["10.0.0.0/8", "10.0.0.0/10", "10.0.0.0/8"]
    ///     .iter()
    ///     .map(|s| s.parse())
    ///     .collect::<Result<_, _>>()?;
    /// items.sort();
    /// let (tree, duplicates) = RangeTree::from_sorted(items);
    /// assert_eq!(tree.len(), 2);
    /// assert_eq!(duplicates, ["10.0.0.0/8".parse()?]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_sorted(items: Vec<I>) -> (Self, Vec<I>) {
        let mut tree = Self::new();
        let mut duplicates = Vec::new();
        let mut last: Option<usize> = None;
        for item in items {
            if let Some(prev) = last {
                let prev_item = tree.item(prev);
                debug_assert!(!item.before(prev_item), "input must be sorted");
                if prev_item.same(&item) {
                    debug!("bulk build: dropping duplicate {item}");
                    duplicates.push(item);
                    continue;
                }
            }
            // climb from the previously inserted node to the deepest
            // ancestor whose item covers the new one; the root covers all
            let mut parent = last.unwrap_or(ROOT);
            loop {
                match &tree.table[parent].item {
                    None => break,
                    Some(it) if it.covers(&item) => break,
                    Some(_) => parent = tree.table[parent].parent.unwrap(),
                }
            }
            let node = tree.new_node(item);
            let pos = tree.table[parent].children.len();
            tree.attach(parent, pos, node);
            tree.count += 1;
            last = Some(node);
        }
        (tree, duplicates)
    }

    /// Sort the items by [`Interval::before`], then build with
    /// [`Self::from_sorted`].
    pub fn from_unsorted(mut items: Vec<I>) -> (Self, Vec<I>) {
        items.sort_by(interval::order);
        Self::from_sorted(items)
    }

    /// Insert one item into the tree. A duplicate of a stored item is a
    /// silent no-op; the return value tells whether the item was newly
    /// inserted.
    ///
    /// Any already-stored top-level run of items the new item covers is
    /// re-parented beneath it; sorted order guarantees that run is
    /// contiguous and immediately follows the insertion point.
    ///
    /// ```
    /// # use range_tree::{AddrRange, RangeTree};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree: RangeTree<AddrRange> = RangeTree::new();
    /// assert!(tree.insert("10.0.0.0/8".parse()?));
    /// assert!(tree.insert("10.0.0.0/10".parse()?));
    /// assert!(!tree.insert("10.0.0.0/8".parse()?));
    /// assert_eq!(tree.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, item: I) -> bool {
        match self.try_insert(item) {
            Ok(()) => true,
            Err(_) => {
                trace!("insert: duplicate item dropped");
                false
            }
        }
    }

    /// Insert one item, reporting a duplicate as [`Error::DuplicateItem`]
    /// instead of dropping it.
    pub fn try_insert(&mut self, item: I) -> Result<(), Error> {
        let mut idx = ROOT;
        loop {
            match self.direction(idx, &item) {
                Descent::Found { .. } => {
                    return Err(Error::DuplicateItem(item.to_string()));
                }
                Descent::Enter { next } => idx = next,
                Descent::At { pos } => {
                    let node = self.new_node(item);
                    self.attach(idx, pos, node);
                    self.count += 1;
                    return Ok(());
                }
            }
        }
    }

    /// Remove the item equal to `item`, returning whether one was found.
    ///
    /// The children of the removed node are re-inserted into its former
    /// parent one by one through the standard descent. They cannot simply
    /// be re-linked in place: with overlapping siblings, an orphan may
    /// belong inside a sibling of the removed node. Whole subtrees are
    /// re-linked, never copied.
    ///
    /// ```
    /// # use range_tree::{AddrRange, RangeTree};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree: RangeTree<AddrRange> = RangeTree::new();
    /// tree.insert("10.0.0.0/8".parse()?);
    /// tree.insert("10.0.0.0/10".parse()?);
    /// assert!(tree.remove(&"10.0.0.0/8".parse()?));
    /// assert!(!tree.remove(&"10.0.0.0/8".parse()?));
    /// assert_eq!(tree.len(), 1);
    /// assert!(tree.contains(&"10.0.0.0/10".parse()?));
    /// # Ok(())
    /// # }
    /// ```
    pub fn remove(&mut self, item: &I) -> bool {
        let mut idx = ROOT;
        let (parent, pos) = loop {
            match self.direction(idx, item) {
                Descent::Found { pos } => break (idx, pos),
                Descent::Enter { next } => idx = next,
                Descent::At { .. } => return false,
            }
        };
        let node = self.table[parent].children.remove(pos);
        let orphans = std::mem::take(&mut self.table[node].children);
        self.table[node].item = None;
        self.table[node].parent = None;
        self.free.push(node);
        self.count -= 1;
        trace!("remove: re-linking {} orphaned subtrees", orphans.len());
        for orphan in orphans {
            self.relink(parent, orphan);
        }
        true
    }

    /// Whether an item equal to `item` is stored, without any
    /// longest-prefix matching.
    pub fn contains(&self, item: &I) -> bool {
        let mut idx = ROOT;
        loop {
            match self.direction(idx, item) {
                Descent::Found { .. } => return true,
                Descent::Enter { next } => idx = next,
                Descent::At { .. } => return false,
            }
        }
    }

    /// Longest-prefix match: the smallest stored item covering `query`, or
    /// the exact match when one is stored. `None` when nothing covers the
    /// query.
    ///
    /// ```
    /// # use range_tree::{AddrRange, RangeTree};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree: RangeTree<AddrRange> = RangeTree::new();
    /// for s in ["0.0.0.0/8", "1.0.0.0/8", "5.0.0.0/8", "0.0.0.0/0", "0.0.0.0/10"] {
    ///     tree.insert(s.parse()?);
    /// }
    /// let lpm = |q: &str| {
    ///     tree.lookup(&q.parse().unwrap()).map(|r| r.to_string())
    /// };
    /// assert_eq!(lpm("5.0.122.12/32"), Some("5.0.0.0/8".into()));
    /// assert_eq!(lpm("0.0.0.0/32"), Some("0.0.0.0/10".into()));
    /// assert_eq!(lpm("2001:db8::/32"), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup(&self, query: &I) -> Option<&I> {
        let mut idx = ROOT;
        loop {
            match self.direction(idx, query) {
                Descent::Found { pos } => {
                    let child = self.table[idx].children[pos];
                    return self.table[child].item.as_ref();
                }
                Descent::Enter { next } => idx = next,
                // the deepest entered node is the best match; at the root
                // this is None
                Descent::At { .. } => return self.table[idx].item.as_ref(),
            }
        }
    }

    /// The *largest* stored top-level item that equals or covers `query`.
    ///
    /// Top-level siblings never cover each other but may overlap, so
    /// several of them can cover the query; the leftmost one is found by
    /// scanning from the start of the level, worst case O(n) on
    /// overlap-heavy forests.
    ///
    /// ```
    /// # use range_tree::{AddrRange, RangeTree};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree: RangeTree<AddrRange> = RangeTree::new();
    /// tree.insert("10.0.0.0/8".parse()?);
    /// tree.insert("10.0.0.0/10".parse()?);
    /// let top = tree.superset(&"10.0.0.1".parse()?);
    /// assert_eq!(top.map(|r| r.to_string()), Some("10.0.0.0/8".into()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn superset(&self, query: &I) -> Option<&I> {
        let children = &self.table[ROOT].children;
        let pos = self.position(ROOT, query);
        let end = children.len().min(pos + 1);
        children[..end]
            .iter()
            .map(|&child| self.item(child))
            .find(|item| item.same(query) || item.covers(query))
    }

    /// Visit every item in pre-order together with its depth (0 for
    /// top-level items). The visitor aborts the walk by returning an error,
    /// which is propagated unchanged.
    ///
    /// ```
    /// # use range_tree::{AddrRange, RangeTree};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree: RangeTree<AddrRange> = RangeTree::new();
    /// tree.insert("10.0.0.0/8".parse()?);
    /// tree.insert("10.0.0.0/10".parse()?);
    /// let mut lines = Vec::new();
    /// tree.walk(|item, depth| {
    ///     if depth > 4 {
    ///         return Err("too deep");
    ///     }
    ///     lines.push(format!("{depth} {item}"));
    ///     Ok(())
    /// })?;
    /// assert_eq!(lines, ["0 10.0.0.0/8", "1 10.0.0.0/10"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn walk<F, E>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&I, usize) -> Result<(), E>,
    {
        let mut stack: Vec<(usize, usize)> = Vec::new();
        stack.extend(self.table[ROOT].children.iter().rev().map(|&c| (c, 0)));
        while let Some((idx, depth)) = stack.pop() {
            visitor(self.item(idx), depth)?;
            stack.extend(
                self.table[idx]
                    .children
                    .iter()
                    .rev()
                    .map(|&c| (c, depth + 1)),
            );
        }
        Ok(())
    }
}

/// Private function implementations
impl<I: Interval> RangeTree<I> {
    /// The item of a non-root node.
    #[inline(always)]
    pub(crate) fn item(&self, idx: usize) -> &I {
        self.table[idx].item.as_ref().unwrap()
    }

    /// Where `item` sits among the children of `idx`: the index of the
    /// first child not before `item`.
    #[inline(always)]
    fn position(&self, idx: usize, item: &I) -> usize {
        self.table[idx]
            .children
            .partition_point(|&c| self.item(c).before(item))
    }

    /// One step of the descent towards `item` below the node `idx`.
    ///
    /// A sibling covering `item` must be the one immediately before the
    /// insertion point: anything further left that covered `item` would
    /// also cover that closer sibling, which the sibling invariant rules
    /// out.
    fn direction(&self, idx: usize, item: &I) -> Descent {
        let pos = self.position(idx, item);
        let children = &self.table[idx].children;
        if pos < children.len() && self.item(children[pos]).same(item) {
            return Descent::Found { pos };
        }
        if pos > 0 && self.item(children[pos - 1]).covers(item) {
            return Descent::Enter {
                next: children[pos - 1],
            };
        }
        Descent::At { pos }
    }

    /// Take a node from the free list or extend the arena.
    fn new_node(&mut self, item: I) -> usize {
        if let Some(idx) = self.free.pop() {
            let node = &mut self.table[idx];
            node.item = Some(item);
            node.parent = None;
            node.children.clear();
            idx
        } else {
            self.table.push(Node {
                item: Some(item),
                parent: None,
                children: Vec::new(),
            });
            self.table.len() - 1
        }
    }

    /// Place `node` as child number `pos` of `parent`, then pull every
    /// following sibling that the node's item covers down into its subtree.
    fn attach(&mut self, parent: usize, pos: usize, node: usize) {
        self.table[parent].children.insert(pos, node);
        self.table[node].parent = Some(parent);
        loop {
            let next = match self.table[parent].children.get(pos + 1) {
                Some(&next) => next,
                None => break,
            };
            let covered = self.item(node).covers(self.item(next));
            if !covered {
                break;
            }
            self.table[parent].children.remove(pos + 1);
            self.relink(node, next);
        }
    }

    /// Hang the subtree rooted at `node` somewhere below `at`, following
    /// the standard descent.
    fn relink(&mut self, mut at: usize, node: usize) {
        loop {
            let step = {
                let item = self.table[node].item.as_ref().unwrap();
                self.direction(at, item)
            };
            match step {
                Descent::Found { .. } => unreachable!("items in the tree are unique"),
                Descent::Enter { next } => at = next,
                Descent::At { pos } => {
                    self.attach(at, pos, node);
                    return;
                }
            }
        }
    }

    /// Exhaustive structural check, for tests.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut seen = 0;
        let mut stack = vec![ROOT];
        while let Some(idx) = stack.pop() {
            let node = &self.table[idx];
            for pair in node.children.windows(2) {
                let (a, b) = (self.item(pair[0]), self.item(pair[1]));
                assert!(a.before(b), "children must stay sorted");
                assert!(!a.same(b), "siblings must not be equal");
            }
            for &a in &node.children {
                for &b in &node.children {
                    if a != b {
                        assert!(
                            !self.item(a).covers(self.item(b)),
                            "siblings must not cover each other",
                        );
                    }
                }
            }
            for &child in &node.children {
                assert_eq!(self.table[child].parent, Some(idx));
                if let Some(item) = &node.item {
                    assert!(item.covers(self.item(child)));
                }
                seen += 1;
                stack.push(child);
            }
        }
        assert_eq!(seen, self.count, "every stored item must be reachable");
    }
}

impl<I: Interval> FromIterator<I> for RangeTree<I> {
    /// Build via [`Self::from_unsorted`], silently dropping duplicates.
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self::from_unsorted(iter.into_iter().collect()).0
    }
}
