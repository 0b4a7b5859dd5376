//! Contiguous, inclusive address ranges and the CIDR operations on them.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use num_traits::{PrimInt, Zero};

use crate::{Addr, Error, Family};

/// Upper bound on the `extra_bits` argument of [`AddrRange::split`].
///
/// Splitting by `n` extra bits enumerates `2^n` subnets; the ceiling keeps a
/// single call from materializing more than 65536 of them.
pub const MAX_SPLIT_BITS: u8 = 16;

/// Network mask of the given prefix length: the top `len` bits set.
pub(crate) fn netmask_from_len<R>(len: u8) -> R
where
    R: PrimInt + Zero,
{
    if len as u32 == R::zero().count_zeros() {
        !R::zero()
    } else if len == 0 {
        R::zero()
    } else {
        !((!R::zero()) >> len as usize)
    }
}

/// The prefix length under which `[base, last]` is one aligned block, if any.
fn cidr_prefix_len<R>(base: R, last: R) -> Option<u8>
where
    R: PrimInt + Zero,
{
    let len = (base ^ last).leading_zeros() as u8;
    let host = !netmask_from_len::<R>(len);
    if base & host == R::zero() && last & host == host {
        Some(len)
    } else {
        None
    }
}

/// An inclusive, contiguous range of addresses `[base, last]` of one family.
///
/// A range is a plain immutable value; every set operation produces new
/// ranges. A single address is the degenerate range with `base == last`.
///
/// # Ordering
///
/// Ranges order by `base` ascending and, on equal bases, by `last`
/// *descending*, so a covering range always sorts before everything it
/// covers. This is the invariant the containment tree is built on:
/// `a.covers(b)` implies `a < b`.
///
/// ```
/// # use range_tree::AddrRange;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut ranges: Vec<AddrRange> = ["2001:db8::/32", "10.0.0.0/9", "::/0", "0.0.0.0/0"]
///     .iter()
///     .map(|s| s.parse())
///     .collect::<Result<_, _>>()?;
/// ranges.sort();
/// let sorted: Vec<String> = ranges.iter().map(|r| r.to_string()).collect();
/// assert_eq!(sorted, ["0.0.0.0/0", "10.0.0.0/9", "::/0", "2001:db8::/32"]);
/// # Ok(())
/// # }
/// ```
///
/// # Textual forms
///
/// Parsing accepts `<addr>/<len>` (CIDR), `<base>-<last>` (explicit
/// inclusive range), and a bare address. Display prints the CIDR form
/// whenever the range is CIDR-aligned and `<base>-<last>` otherwise:
///
/// ```
/// # use range_tree::AddrRange;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let aligned: AddrRange = "10.0.0.248-10.0.0.255".parse()?;
/// assert_eq!(aligned.to_string(), "10.0.0.248/29");
/// let ragged: AddrRange = "10.0.0.250-10.0.0.255".parse()?;
/// assert_eq!(ragged.to_string(), "10.0.0.250-10.0.0.255");
/// let host: AddrRange = "192.0.2.7".parse()?;
/// assert_eq!(host.to_string(), "192.0.2.7/32");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddrRange {
    base: Addr,
    last: Addr,
}

impl AddrRange {
    /// Create a range from its endpoints. Fails with [`Error::InvalidRange`]
    /// when the endpoints mix families or `base > last`.
    pub fn new(base: Addr, last: Addr) -> Result<Self, Error> {
        if base.family() != last.family() {
            return Err(Error::InvalidRange(format!(
                "family mismatch between {base} and {last}"
            )));
        }
        if base > last {
            return Err(Error::InvalidRange(format!("inverted range {base}-{last}")));
        }
        Ok(Self { base, last })
    }

    /// The degenerate range holding exactly one address.
    pub fn host(addr: Addr) -> Self {
        Self {
            base: addr,
            last: addr,
        }
    }

    /// The whole address space of one family.
    pub fn whole(family: Family) -> Self {
        Self {
            base: Addr::min_of(family),
            last: Addr::max_of(family),
        }
    }

    /// Construct from endpoints that are known to be ordered and of one
    /// family.
    pub(crate) fn new_unchecked(base: Addr, last: Addr) -> Self {
        debug_assert_eq!(base.family(), last.family());
        debug_assert!(base <= last);
        Self { base, last }
    }

    /// The address family of both endpoints.
    pub fn family(&self) -> Family {
        self.base.family()
    }

    /// The first address of the range.
    pub fn base(&self) -> Addr {
        self.base
    }

    /// The last address of the range.
    pub fn last(&self) -> Addr {
        self.last
    }

    /// The prefix length under which this range is a single CIDR block, or
    /// `None` when the range is not CIDR-aligned. A degenerate range is the
    /// host block (`/32` or `/128`).
    pub fn prefix_len(&self) -> Option<u8> {
        match self.family() {
            Family::V4 => cidr_prefix_len(self.base.value() as u32, self.last.value() as u32),
            Family::V6 => cidr_prefix_len(self.base.value(), self.last.value()),
        }
    }

    /// Whether the range is CIDR-aligned.
    pub fn is_cidr(&self) -> bool {
        self.prefix_len().is_some()
    }

    /// Strict superset test: `self` covers `other` iff they are of the same
    /// family, not equal, and `self`'s endpoints enclose `other`'s.
    ///
    /// ```
    /// # use range_tree::AddrRange;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let outer: AddrRange = "10.0.0.0/8".parse()?;
    /// let inner: AddrRange = "10.1.0.0/16".parse()?;
    /// assert!(outer.covers(&inner));
    /// assert!(!inner.covers(&outer));
    /// assert!(!outer.covers(&outer)); // equal ranges do not cover each other
    /// # Ok(())
    /// # }
    /// ```
    pub fn covers(&self, other: &Self) -> bool {
        self.family() == other.family()
            && self != other
            && self.base <= other.base
            && self.last >= other.last
    }

    /// Whether the two ranges share no address. Ranges of different
    /// families are always disjoint.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.last < other.base || other.last < self.base
    }

    /// Whether the two ranges partially overlap: they share addresses but
    /// neither covers the other and they are not equal.
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.is_disjoint(other) && !self.covers(other) && !other.covers(self) && self != other
    }

    /// Point membership.
    pub fn contains(&self, addr: &Addr) -> bool {
        self.family() == addr.family() && self.base <= *addr && *addr <= self.last
    }

    /// Decompose the range into the minimal ordered sequence of CIDR-aligned
    /// pieces covering exactly the same addresses.
    ///
    /// A CIDR range decomposes into itself. Anything else is bisected at the
    /// boundary one bit past the endpoints' common prefix and both halves
    /// recurse; each level strictly lengthens the common prefix, so the
    /// worst case is `2 * width - 2` pieces.
    ///
    /// ```
    /// # use range_tree::AddrRange;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let r: AddrRange = "10.0.0.250-10.0.0.255".parse()?;
    /// let cidrs: Vec<String> = r.to_cidrs().iter().map(|c| c.to_string()).collect();
    /// assert_eq!(cidrs, ["10.0.0.250/31", "10.0.0.252/30"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_cidrs(&self) -> Vec<AddrRange> {
        let mut out = Vec::new();
        self.push_cidrs(&mut out);
        out
    }

    pub(crate) fn push_cidrs(&self, out: &mut Vec<AddrRange>) {
        if self.is_cidr() {
            out.push(*self);
            return;
        }
        let split_len = self.base.common_prefix_len(&self.last) + 1;
        let family = self.family();
        // not a CIDR, so base != last and split_len <= width
        let host = (1u128 << (family.bits() - split_len)) - 1;
        let mid = Addr::raw(family, self.base.value() | host);
        Self::new_unchecked(self.base, mid).push_cidrs(out);
        let next = Addr::raw(family, mid.value() + 1);
        Self::new_unchecked(next, self.last).push_cidrs(out);
    }

    /// Enumerate the `2^extra_bits` equal-sized subnets of a CIDR range, in
    /// address order.
    ///
    /// Fails with [`Error::InvalidArgument`] when the range is not
    /// CIDR-aligned, when `extra_bits` is zero or exceeds
    /// [`MAX_SPLIT_BITS`], or when the resulting prefix would not fit the
    /// family width.
    ///
    /// ```
    /// # use range_tree::AddrRange;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let r: AddrRange = "10.0.0.0/24".parse()?;
    /// let subnets: Vec<String> = r.split(2)?.iter().map(|s| s.to_string()).collect();
    /// assert_eq!(
    ///     subnets,
    ///     ["10.0.0.0/26", "10.0.0.64/26", "10.0.0.128/26", "10.0.0.192/26"],
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn split(&self, extra_bits: u8) -> Result<Vec<AddrRange>, Error> {
        let len = self
            .prefix_len()
            .ok_or(Error::InvalidArgument("split requires a CIDR-aligned range"))?;
        if extra_bits == 0 {
            return Err(Error::InvalidArgument("split requires at least one extra bit"));
        }
        if extra_bits > MAX_SPLIT_BITS {
            return Err(Error::InvalidArgument("split fan-out exceeds the ceiling"));
        }
        let family = self.family();
        let new_len = len.checked_add(extra_bits).filter(|l| *l <= family.bits());
        let new_len = new_len.ok_or(Error::InvalidArgument(
            "split prefix would exceed the family width",
        ))?;
        // new_len >= 1, so the shift stays below 128
        let step = 1u128 << (family.bits() - new_len);
        let count = 1usize << extra_bits;
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let base = self.base.value() + i as u128 * step;
            out.push(Self::new_unchecked(
                Addr::raw(family, base),
                Addr::raw(family, base + (step - 1)),
            ));
        }
        Ok(out)
    }
}

impl Ord for AddrRange {
    /// `base` ascending, then `last` descending: the covering range first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.base
            .cmp(&other.base)
            .then_with(|| other.last.cmp(&self.last))
    }
}

impl PartialOrd for AddrRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AddrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix_len() {
            Some(len) => write!(f, "{}/{}", self.base, len),
            None => write!(f, "{}-{}", self.base, self.last),
        }
    }
}

impl fmt::Debug for AddrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<Addr> for AddrRange {
    fn from(addr: Addr) -> Self {
        Self::host(addr)
    }
}

impl From<Ipv4Net> for AddrRange {
    fn from(net: Ipv4Net) -> Self {
        Self::new_unchecked(
            Addr::v4(net.network().into()),
            Addr::v4(net.broadcast().into()),
        )
    }
}

impl From<Ipv6Net> for AddrRange {
    /// An IPv4-mapped network of at least 96 bits canonicalizes to the plain
    /// V4 block with `len - 96`, matching the address-level normalization.
    fn from(net: Ipv6Net) -> Self {
        let base = Addr::from(net.network());
        if net.prefix_len() >= 96 && base.family() == Family::V4 {
            Self::new_unchecked(base, Addr::from(net.broadcast()))
        } else {
            Self::new_unchecked(
                Addr::v6(net.network().into()),
                Addr::v6(net.broadcast().into()),
            )
        }
    }
}

impl From<IpNet> for AddrRange {
    fn from(net: IpNet) -> Self {
        match net {
            IpNet::V4(net) => net.into(),
            IpNet::V6(net) => net.into(),
        }
    }
}

impl TryFrom<AddrRange> for Ipv4Net {
    type Error = Error;

    fn try_from(range: AddrRange) -> Result<Self, Error> {
        match (range.family(), range.prefix_len()) {
            (Family::V4, Some(len)) => {
                Ok(Ipv4Net::new((range.base.value() as u32).into(), len).unwrap())
            }
            _ => Err(Error::InvalidRange(range.to_string())),
        }
    }
}

impl TryFrom<AddrRange> for Ipv6Net {
    type Error = Error;

    fn try_from(range: AddrRange) -> Result<Self, Error> {
        match (range.family(), range.prefix_len()) {
            (Family::V6, Some(len)) => Ok(Ipv6Net::new(range.base.value().into(), len).unwrap()),
            _ => Err(Error::InvalidRange(range.to_string())),
        }
    }
}

impl TryFrom<AddrRange> for IpNet {
    type Error = Error;

    fn try_from(range: AddrRange) -> Result<Self, Error> {
        match range.family() {
            Family::V4 => Ipv4Net::try_from(range).map(IpNet::V4),
            Family::V6 => Ipv6Net::try_from(range).map(IpNet::V6),
        }
    }
}

impl FromStr for AddrRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s.contains('/') {
            let net: IpNet = s
                .parse()
                .map_err(|_| Error::InvalidRange(s.to_string()))?;
            Ok(net.into())
        } else if let Some((base, last)) = s.split_once('-') {
            Self::new(base.trim().parse()?, last.trim().parse()?)
        } else {
            Ok(Self::host(s.parse()?))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn range(s: &str) -> AddrRange {
        s.parse().unwrap()
    }

    fn addr(s: &str) -> Addr {
        s.parse().unwrap()
    }

    #[test]
    fn construction() {
        assert!(AddrRange::new(addr("10.0.0.1"), addr("10.0.0.9")).is_ok());
        assert!(matches!(
            AddrRange::new(addr("10.0.0.9"), addr("10.0.0.1")),
            Err(Error::InvalidRange(_)),
        ));
        assert!(matches!(
            AddrRange::new(addr("10.0.0.1"), addr("::1")),
            Err(Error::InvalidRange(_)),
        ));
    }

    #[test]
    fn parse_forms() {
        assert_eq!(range("10.0.0.0/24").last(), addr("10.0.0.255"));
        assert_eq!(range("10.0.0.3-10.0.0.7").base(), addr("10.0.0.3"));
        assert_eq!(range("192.0.2.9"), AddrRange::host(addr("192.0.2.9")));
        // host bits past the mask are dropped by the CIDR grammar
        assert_eq!(range("10.0.0.9/24"), range("10.0.0.0/24"));
        assert!(matches!(
            "10.0.0.0/33".parse::<AddrRange>(),
            Err(Error::InvalidRange(_)),
        ));
        assert!(matches!(
            "10.0.0.5-::1".parse::<AddrRange>(),
            Err(Error::InvalidRange(_)),
        ));
        assert!(matches!(
            "10.0.0.5-10.0.0.1".parse::<AddrRange>(),
            Err(Error::InvalidRange(_)),
        ));
        assert!(matches!(
            "bogus".parse::<AddrRange>(),
            Err(Error::InvalidAddress(_)),
        ));
    }

    #[test]
    fn mapped_cidr_canonicalizes() {
        assert_eq!(range("::ffff:192.0.2.0/120"), range("192.0.2.0/24"));
        assert_eq!(range("::ffff:10.0.0.1-::ffff:10.0.0.9"), range("10.0.0.1-10.0.0.9"));
        // too wide to stay inside the mapped block: remains V6
        assert_eq!(range("::ffff:0:0/95").family(), Family::V6);
    }

    #[test]
    fn cidr_detection() {
        assert_eq!(range("10.0.0.248-10.0.0.255").prefix_len(), Some(29));
        assert_eq!(range("10.0.0.250-10.0.0.255").prefix_len(), None);
        assert_eq!(range("0.0.0.0-255.255.255.255").prefix_len(), Some(0));
        assert_eq!(AddrRange::whole(Family::V4), range("0.0.0.0/0"));
        assert_eq!(AddrRange::whole(Family::V6), range("::/0"));
        assert_eq!(range("192.0.2.1").prefix_len(), Some(32));
        assert_eq!(range("2001:db8::/32").prefix_len(), Some(32));
        assert_eq!(range("::1").prefix_len(), Some(128));
    }

    #[test]
    fn display_grammar() {
        assert_eq!(range("10.0.0.248-10.0.0.255").to_string(), "10.0.0.248/29");
        assert_eq!(
            range("10.0.0.250-10.0.0.255").to_string(),
            "10.0.0.250-10.0.0.255",
        );
        assert_eq!(range("192.0.2.7").to_string(), "192.0.2.7/32");
        assert_eq!(range("2001:db8::1").to_string(), "2001:db8::1/128");
    }

    #[test]
    fn covers_overlaps_disjoint() {
        let outer = range("10.0.0.0/8");
        let inner = range("10.1.0.0/16");
        let left = range("10.0.0.0-10.0.0.9");
        let right = range("10.0.0.5-10.0.0.20");
        let apart = range("192.0.2.0/24");
        assert!(outer.covers(&inner));
        assert!(!inner.covers(&outer));
        assert!(!outer.covers(&outer));
        assert!(left.overlaps(&right));
        assert!(right.overlaps(&left));
        assert!(!outer.overlaps(&inner));
        assert!(left.is_disjoint(&apart));
        assert!(!left.is_disjoint(&right));
        // families never interact
        assert!(range("::/0").is_disjoint(&range("0.0.0.0/0")));
        assert!(!range("::/0").covers(&range("10.0.0.0/8")));
    }

    #[test]
    fn point_membership() {
        let r = range("10.0.0.8-10.0.0.15");
        assert!(r.contains(&addr("10.0.0.8")));
        assert!(r.contains(&addr("10.0.0.15")));
        assert!(!r.contains(&addr("10.0.0.16")));
        assert!(!r.contains(&addr("::1")));
    }

    #[test]
    fn ordering_covers_first() {
        // covers implies less
        let a = range("10.0.0.0/8");
        let b = range("10.0.0.0/10");
        assert!(a.covers(&b));
        assert!(a < b);
        // the documented cross-family sort
        let mut v = vec![
            range("2001:db8::/32"),
            range("10.0.0.0/9"),
            range("::/0"),
            range("0.0.0.0/0"),
        ];
        v.sort();
        assert_eq!(
            v,
            [
                range("0.0.0.0/0"),
                range("10.0.0.0/9"),
                range("::/0"),
                range("2001:db8::/32"),
            ],
        );
    }

    #[test]
    fn decompose_to_cidrs() {
        assert_eq!(range("10.0.0.248/29").to_cidrs(), [range("10.0.0.248/29")]);
        assert_eq!(
            range("10.0.0.250-10.0.0.255").to_cidrs(),
            [range("10.0.0.250/31"), range("10.0.0.252/30")],
        );
        assert_eq!(
            range("192.168.2.250-192.168.2.255").to_cidrs(),
            [range("192.168.2.250/31"), range("192.168.2.252/30")],
        );
        // worst case: 2 * 32 - 2 pieces
        let worst = AddrRange::new(addr("0.0.0.1"), addr("255.255.255.254")).unwrap();
        let pieces = worst.to_cidrs();
        assert_eq!(pieces.len(), 62);
        assert!(pieces.iter().all(AddrRange::is_cidr));
    }

    #[test]
    fn split_cidr() {
        let quarters = range("10.0.0.0/24").split(2).unwrap();
        assert_eq!(
            quarters,
            [
                range("10.0.0.0/26"),
                range("10.0.0.64/26"),
                range("10.0.0.128/26"),
                range("10.0.0.192/26"),
            ],
        );
        assert_eq!(range("2001:db8::/32").split(1).unwrap().len(), 2);
        assert!(matches!(
            range("10.0.0.250-10.0.0.255").split(1),
            Err(Error::InvalidArgument(_)),
        ));
        assert!(matches!(range("10.0.0.0/24").split(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            range("10.0.0.0/24").split(MAX_SPLIT_BITS + 1),
            Err(Error::InvalidArgument(_)),
        ));
        assert!(matches!(range("10.0.0.0/24").split(9), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn net_interop() {
        let net: Ipv4Net = "10.0.0.0/24".parse().unwrap();
        assert_eq!(AddrRange::from(net), range("10.0.0.0/24"));
        assert_eq!(Ipv4Net::try_from(range("10.0.0.0/24")).unwrap(), net);
        assert!(Ipv4Net::try_from(range("10.0.0.250-10.0.0.255")).is_err());
        assert!(Ipv4Net::try_from(range("2001:db8::/32")).is_err());
        let net6: Ipv6Net = "2001:db8::/32".parse().unwrap();
        assert_eq!(AddrRange::from(net6), range("2001:db8::/32"));
        assert_eq!(Ipv6Net::try_from(range("2001:db8::/32")).unwrap(), net6);
    }
}
