//! Properties of the range algebra.

use itertools::Itertools;
use quickcheck_macros::quickcheck;

use super::clip;
use crate::algebra::{aggregate, diff, merge};
use crate::{AddrRange, Interval};

#[quickcheck]
fn covers_implies_before(a: AddrRange, b: AddrRange) -> bool {
    !a.covers(&b) || Interval::before(&a, &b)
}

#[quickcheck]
fn before_is_a_strict_total_order(a: AddrRange, b: AddrRange, c: AddrRange) -> bool {
    let irreflexive = !Interval::before(&a, &a);
    let antisymmetric = !(Interval::before(&a, &b) && Interval::before(&b, &a));
    let total = a == b || Interval::before(&a, &b) || Interval::before(&b, &a);
    let transitive =
        !(Interval::before(&a, &b) && Interval::before(&b, &c)) || Interval::before(&a, &c);
    irreflexive && antisymmetric && total && transitive
}

#[quickcheck]
fn decompose_round_trip(r: AddrRange) -> bool {
    let pieces = r.to_cidrs();
    // every piece aligned, and the pieces chain seamlessly from base to last
    let aligned = pieces.iter().all(AddrRange::is_cidr);
    let starts = pieces.first().map_or(false, |p| p.base() == r.base());
    let ends = pieces.last().map_or(false, |p| p.last() == r.last());
    let chained = pieces
        .iter()
        .tuple_windows()
        .all(|(a, b)| a.last().succ() == Ok(b.base()));
    aligned && starts && ends && chained
}

#[quickcheck]
fn merge_yields_sorted_separated_cover(input: Vec<AddrRange>) -> bool {
    let merged = merge(&input);
    let sorted = merged
        .iter()
        .tuple_windows()
        .all(|(a, b)| Interval::before(a, b));
    let separated = merged.iter().tuple_windows().all(|(a, b)| {
        a.family() != b.family() || (a.is_disjoint(b) && a.last().succ() != Ok(b.base()))
    });
    // every input range survives inside exactly one merged piece
    let covered = input
        .iter()
        .all(|r| merged.iter().any(|m| m == r || m.covers(r)));
    sorted && separated && covered
}

#[quickcheck]
fn merge_is_idempotent(input: Vec<AddrRange>) -> bool {
    let once = merge(&input);
    merge(&once) == once
}

#[quickcheck]
fn diff_complements_the_subtractors(outer: AddrRange, inners: Vec<AddrRange>) -> bool {
    let gaps = diff(outer, &inners);
    // the gaps avoid every subtractor
    let avoid = gaps
        .iter()
        .all(|g| inners.iter().all(|i| i.family() != g.family() || g.is_disjoint(i)));
    // the gaps stay within the outer range
    let inside = gaps.iter().all(|g| *g == outer || outer.covers(g));
    // gaps plus the clipped subtractors reassemble the outer range exactly
    let mut parts = gaps.clone();
    parts.extend(inners.iter().filter_map(|i| clip(i, &outer)));
    let reunited = merge(&parts) == vec![outer];
    avoid && inside && reunited
}

#[quickcheck]
fn aggregate_is_minimal_and_exact(input: Vec<AddrRange>) -> bool {
    let cidrs = aggregate(&input);
    let aligned = cidrs.iter().all(AddrRange::is_cidr);
    // same address space as the merged input
    let exact = merge(&cidrs) == merge(&input);
    // no two neighbouring pieces could fuse into one larger CIDR
    let minimal = cidrs.iter().tuple_windows().all(|(a, b)| {
        a.family() != b.family()
            || a.last().succ() != Ok(b.base())
            || !AddrRange::new(a.base(), b.last()).unwrap().is_cidr()
    });
    aligned && exact && minimal
}
