//! Module for testing using fuzzing (quickcheck)

use quickcheck::{Arbitrary, Gen};

use crate::range::netmask_from_len;
use crate::{Addr, AddrRange, Family};

mod algebra;
mod tree;

impl Arbitrary for Family {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&[Family::V4, Family::V6]).unwrap()
    }
}

impl Arbitrary for Addr {
    fn arbitrary(g: &mut Gen) -> Self {
        match Family::arbitrary(g) {
            Family::V4 => Addr::v4(u32::arbitrary(g)),
            Family::V6 => Addr::v6(wide(g)),
        }
    }
}

impl Arbitrary for AddrRange {
    fn arbitrary(g: &mut Gen) -> Self {
        let (a, b) = match Family::arbitrary(g) {
            Family::V4 => (Addr::v4(u32::arbitrary(g)), Addr::v4(u32::arbitrary(g))),
            Family::V6 => (Addr::v6(wide(g)), Addr::v6(wide(g))),
        };
        AddrRange::new(a.min(b), a.max(b)).unwrap()
    }
}

fn wide(g: &mut Gen) -> u128 {
    ((u64::arbitrary(g) as u128) << 64) | u64::arbitrary(g) as u128
}

/// A random CIDR-aligned range. CIDRs of one family either nest or are
/// disjoint, which makes reference results for tree lookups well-defined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Cidr(pub(crate) AddrRange);

impl Arbitrary for Cidr {
    fn arbitrary(g: &mut Gen) -> Self {
        let (base, last) = match Family::arbitrary(g) {
            Family::V4 => {
                let len = u8::arbitrary(g) % 33;
                let mask = netmask_from_len::<u32>(len);
                let net = u32::arbitrary(g) & mask;
                (Addr::v4(net), Addr::v4(net | !mask))
            }
            Family::V6 => {
                let len = u8::arbitrary(g) % 129;
                let mask = netmask_from_len::<u128>(len);
                let net = wide(g) & mask;
                (Addr::v6(net), Addr::v6(net | !mask))
            }
        };
        Cidr(AddrRange::new(base, last).unwrap())
    }
}

pub(crate) fn ranges(cidrs: &[Cidr]) -> Vec<AddrRange> {
    cidrs.iter().map(|c| c.0).collect()
}

/// The intersection of two ranges, if they share any address.
pub(crate) fn clip(a: &AddrRange, b: &AddrRange) -> Option<AddrRange> {
    if a.family() != b.family() || a.is_disjoint(b) {
        return None;
    }
    AddrRange::new(a.base().max(b.base()), a.last().min(b.last())).ok()
}
