//! Properties of the containment tree, checked against linear reference
//! models.

use quickcheck_macros::quickcheck;

use super::{ranges, Cidr};
use crate::{interval, AddrRange, RangeTree};

/// The smallest stored range covering the query, or the exact match: a
/// linear scan standing in for the tree descent.
fn reference_lookup<'a>(items: &'a [AddrRange], query: &AddrRange) -> Option<&'a AddrRange> {
    items
        .iter()
        .filter(|r| *r == query || r.covers(query))
        .max_by(|a, b| interval::order(*a, *b))
}

#[quickcheck]
fn lookup_matches_the_linear_reference(items: Vec<Cidr>, queries: Vec<Cidr>) -> bool {
    let items = ranges(&items);
    let (tree, _) = RangeTree::from_unsorted(items.clone());
    tree.check_invariants();
    let mut unique = items;
    unique.sort();
    unique.dedup();
    queries
        .iter()
        .map(|q| &q.0)
        .chain(unique.iter())
        .all(|q| tree.lookup(q) == reference_lookup(&unique, q))
}

#[quickcheck]
fn bulk_and_incremental_builds_agree(items: Vec<Cidr>) -> bool {
    let items = ranges(&items);
    let (bulk, _) = RangeTree::from_unsorted(items.clone());
    bulk.check_invariants();
    let mut incremental = RangeTree::new();
    for item in items {
        incremental.insert(item);
    }
    incremental.check_invariants();
    bulk.len() == incremental.len() && bulk.to_string() == incremental.to_string()
}

#[quickcheck]
fn insert_remove_agree_with_a_vec_model(ops: Vec<(bool, Cidr)>) -> bool {
    let mut tree: RangeTree<AddrRange> = RangeTree::new();
    let mut model: Vec<AddrRange> = Vec::new();
    for (insert, Cidr(item)) in ops {
        if insert {
            let fresh = !model.contains(&item);
            if tree.insert(item) != fresh {
                return false;
            }
            if fresh {
                model.push(item);
            }
        } else {
            let present = model.contains(&item);
            if tree.remove(&item) != present {
                return false;
            }
            model.retain(|r| r != &item);
        }
    }
    tree.check_invariants();
    let mut stored: Vec<AddrRange> = tree.iter().map(|(r, _)| *r).collect();
    stored.sort();
    model.sort();
    if stored != model || tree.len() != model.len() {
        return false;
    }
    // drain the survivors one by one; every removal re-links subtrees
    for item in model {
        if !tree.remove(&item) {
            return false;
        }
        tree.check_invariants();
    }
    tree.is_empty() && tree.to_string() == "."
}

#[quickcheck]
fn walk_and_iter_agree(items: Vec<Cidr>) -> bool {
    let (tree, _) = RangeTree::from_unsorted(ranges(&items));
    let mut walked = Vec::new();
    tree.walk(|item, depth| -> Result<(), ()> {
        walked.push((*item, depth));
        Ok(())
    })
    .unwrap();
    let iterated: Vec<(AddrRange, usize)> = tree.iter().map(|(r, d)| (*r, d)).collect();
    walked == iterated
}

#[quickcheck]
fn superset_returns_the_leftmost_top_level_cover(items: Vec<Cidr>, query: Cidr) -> bool {
    let (tree, _) = RangeTree::from_unsorted(ranges(&items));
    let query = query.0;
    let expected = tree
        .iter()
        .filter(|(_, depth)| *depth == 0)
        .map(|(r, _)| r)
        .find(|r| **r == query || r.covers(&query));
    tree.superset(&query) == expected
}
