//! Set algebra over address ranges: merging, differencing, and aggregation.

use crate::AddrRange;

/// Coalesce a collection of ranges into the minimal ordered set of disjoint
/// ranges covering exactly the same addresses.
///
/// Overlapping and exactly adjacent ranges fuse, subsets and duplicates
/// disappear. Ranges of different families never coalesce.
///
/// ```
/// # use range_tree::{algebra, AddrRange};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let ranges: Vec<AddrRange> = ["10.0.0.0/25", "10.0.0.128/25", "10.0.0.64/26"]
///     .iter()
///     .map(|s| s.parse())
///     .collect::<Result<_, _>>()?;
/// let merged = algebra::merge(&ranges);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].to_string(), "10.0.0.0/24");
/// # Ok(())
/// # }
/// ```
pub fn merge(ranges: &[AddrRange]) -> Vec<AddrRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort_unstable();
    let mut out: Vec<AddrRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        let fused = match out.last() {
            // sorted order puts range.base at or after acc.base, so sharing
            // an address means overlap or subset; subsets are dropped by
            // keeping the longer last
            Some(acc) if acc.family() == range.family() && range.base() <= acc.last() => {
                Some(AddrRange::new_unchecked(acc.base(), acc.last().max(range.last())))
            }
            // exactly adjacent
            Some(acc) if acc.family() == range.family() && acc.last().succ() == Ok(range.base()) => {
                Some(AddrRange::new_unchecked(acc.base(), range.last()))
            }
            _ => None,
        };
        match fused {
            Some(fused) => *out.last_mut().unwrap() = fused,
            None => out.push(range),
        }
    }
    out
}

/// The portion of `outer` not covered by any of `inners`, as an ordered
/// sequence of disjoint CIDR-aligned ranges.
///
/// The walk keeps a cursor at the first address of `outer` not yet
/// accounted for; every gap between the cursor and the next subtractor is
/// emitted as its CIDR decomposition. Inners of the other family are
/// disjoint from `outer` by definition and are skipped.
///
/// ```
/// # use range_tree::{algebra, AddrRange};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let outer: AddrRange = "192.168.2.0/24".parse()?;
/// let inners: Vec<AddrRange> = ["192.168.2.0/26", "192.168.2.240-192.168.2.249"]
///     .iter()
///     .map(|s| s.parse())
///     .collect::<Result<_, _>>()?;
/// let gaps: Vec<String> = algebra::diff(outer, &inners)
///     .iter()
///     .map(|r| r.to_string())
///     .collect();
/// assert_eq!(
///     gaps,
///     [
///         "192.168.2.64/26",
///         "192.168.2.128/26",
///         "192.168.2.192/27",
///         "192.168.2.224/28",
///         "192.168.2.250/31",
///         "192.168.2.252/30",
///     ],
/// );
/// # Ok(())
/// # }
/// ```
pub fn diff(outer: AddrRange, inners: &[AddrRange]) -> Vec<AddrRange> {
    let mut subtractors: Vec<AddrRange> = inners
        .iter()
        .filter(|r| r.family() == outer.family())
        .copied()
        .collect();
    subtractors.sort_unstable();

    let mut out = Vec::new();
    let mut cursor = outer.base();
    for sub in subtractors {
        if sub.last() < cursor || sub.base() > outer.last() {
            continue;
        }
        if sub.base() > cursor {
            // gap between the cursor and this subtractor
            if let Ok(gap_last) = sub.base().pred() {
                AddrRange::new_unchecked(cursor, gap_last).push_cidrs(&mut out);
            }
        }
        if sub.last() >= outer.last() {
            // the rest of the outer range is swallowed
            return out;
        }
        cursor = match sub.last().succ() {
            Ok(next) => next,
            Err(_) => return out,
        };
    }
    AddrRange::new_unchecked(cursor, outer.last()).push_cidrs(&mut out);
    out
}

/// The minimal set of CIDR blocks covering exactly the same addresses as
/// the input: [`merge`] followed by CIDR decomposition of every merged
/// piece.
///
/// ```
/// # use range_tree::{algebra, AddrRange};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let ranges: Vec<AddrRange> = ["10.0.0.250-10.0.0.255", "10.0.1.0/24"]
///     .iter()
///     .map(|s| s.parse())
///     .collect::<Result<_, _>>()?;
/// let cidrs: Vec<String> = algebra::aggregate(&ranges)
///     .iter()
///     .map(|r| r.to_string())
///     .collect();
/// assert_eq!(cidrs, ["10.0.0.250/31", "10.0.0.252/30", "10.0.1.0/24"]);
/// # Ok(())
/// # }
/// ```
pub fn aggregate(ranges: &[AddrRange]) -> Vec<AddrRange> {
    merge(ranges)
        .iter()
        .flat_map(AddrRange::to_cidrs)
        .collect()
}
