//! Comparable, family-tagged IP addresses and the arithmetic on them.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::Error;

/// The address family of an [`Addr`].
///
/// The derived ordering is load-bearing: `V4 < V6`, so every IPv4 address
/// sorts before every IPv6 address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    /// IPv4, 32 bits wide.
    V4,
    /// IPv6, 128 bits wide.
    V6,
}

impl Family {
    /// The number of bits in an address of this family.
    pub const fn bits(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    /// The number of bytes in the binary form of an address of this family.
    pub const fn bytes(self) -> usize {
        match self {
            Family::V4 => 4,
            Family::V6 => 16,
        }
    }

    /// The numeric value of the all-ones address of this family.
    pub(crate) const fn max_value(self) -> u128 {
        match self {
            Family::V4 => u32::MAX as u128,
            Family::V6 => u128::MAX,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => f.write_str("IPv4"),
            Family::V6 => f.write_str("IPv6"),
        }
    }
}

/// A single IP address of either family, stored as a 128-bit value.
///
/// `Addr` is a plain value: it is `Copy`, immutable, and every arithmetic
/// operation returns a new address. The derived ordering compares the family
/// first (`V4 < V6`) and the numeric value second; the field order of the
/// struct encodes exactly that.
///
/// Invariant: for `V4` the upper 96 bits of `value` are zero. All
/// constructors uphold this.
///
/// ```
/// # use range_tree::{Addr, Family};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let a: Addr = "10.0.0.1".parse()?;
/// let b: Addr = "2001:db8::1".parse()?;
/// assert!(a < b); // V4 sorts before V6
/// assert_eq!(a.family(), Family::V4);
/// assert_eq!(a.succ()?.to_string(), "10.0.0.2");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr {
    family: Family,
    value: u128,
}

impl Addr {
    /// Create an IPv4 address from its numeric value.
    pub const fn v4(value: u32) -> Self {
        Self {
            family: Family::V4,
            value: value as u128,
        }
    }

    /// Create an IPv6 address from its numeric value.
    ///
    /// No IPv4-mapped canonicalization happens here; mapped values are only
    /// rewritten when they enter through text or through an [`Ipv6Addr`].
    pub const fn v6(value: u128) -> Self {
        Self {
            family: Family::V6,
            value,
        }
    }

    /// Construct from a raw value of the given family. The caller guarantees
    /// that the value fits the family width.
    pub(crate) fn raw(family: Family, value: u128) -> Self {
        debug_assert!(value <= family.max_value());
        Self { family, value }
    }

    /// The all-zeros address of the given family.
    pub const fn min_of(family: Family) -> Self {
        Self { family, value: 0 }
    }

    /// The all-ones address of the given family.
    pub const fn max_of(family: Family) -> Self {
        Self {
            family,
            value: family.max_value(),
        }
    }

    /// The address family.
    pub const fn family(&self) -> Family {
        self.family
    }

    /// The numeric value. For `V4` only the lower 32 bits are populated.
    pub const fn value(&self) -> u128 {
        self.value
    }

    /// The next address up, or [`Error::Overflow`] at the top of the
    /// family's space. Never wraps.
    ///
    /// ```
    /// # use range_tree::{Addr, Error};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let a: Addr = "10.0.0.255".parse()?;
    /// assert_eq!(a.succ()?.to_string(), "10.0.1.0");
    /// let top: Addr = "255.255.255.255".parse()?;
    /// assert_eq!(top.succ(), Err(Error::Overflow));
    /// # Ok(())
    /// # }
    /// ```
    pub fn succ(self) -> Result<Self, Error> {
        self.checked_add(1)
    }

    /// The next address down, or [`Error::Underflow`] at the all-zeros
    /// address. Never wraps.
    pub fn pred(self) -> Result<Self, Error> {
        self.checked_sub(1)
    }

    /// Add an arbitrary magnitude, failing with [`Error::Overflow`] when the
    /// result leaves the family's address space.
    pub fn checked_add(self, n: u128) -> Result<Self, Error> {
        let value = self.value.checked_add(n).ok_or(Error::Overflow)?;
        if value > self.family.max_value() {
            return Err(Error::Overflow);
        }
        Ok(Self {
            family: self.family,
            value,
        })
    }

    /// Subtract an arbitrary magnitude, failing with [`Error::Underflow`]
    /// when the result would go below zero.
    pub fn checked_sub(self, n: u128) -> Result<Self, Error> {
        let value = self.value.checked_sub(n).ok_or(Error::Underflow)?;
        Ok(Self {
            family: self.family,
            value,
        })
    }

    /// The number of leading bits on which `self` and `other` agree, counted
    /// within the family width. Both addresses must be of the same family.
    ///
    /// ```
    /// # use range_tree::Addr;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let a: Addr = "10.0.0.0".parse()?;
    /// let b: Addr = "10.128.0.0".parse()?;
    /// assert_eq!(a.common_prefix_len(&b), 8);
    /// assert_eq!(a.common_prefix_len(&a), 32);
    /// # Ok(())
    /// # }
    /// ```
    pub fn common_prefix_len(&self, other: &Self) -> u8 {
        debug_assert_eq!(self.family, other.family);
        let width = self.family.bits();
        let zeros = (self.value ^ other.value).leading_zeros() as u8;
        zeros.saturating_sub(128 - width).min(width)
    }

    /// The fixed-width, zero-padded textual form, suitable for lexical
    /// sorting: `010.000.000.001` for IPv4, the full eight-group nibble form
    /// for IPv6.
    ///
    /// ```
    /// # use range_tree::Addr;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// assert_eq!("10.0.0.1".parse::<Addr>()?.expanded(), "010.000.000.001");
    /// assert_eq!(
    ///     "2001:db8::1".parse::<Addr>()?.expanded(),
    ///     "2001:0db8:0000:0000:0000:0000:0000:0001",
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn expanded(&self) -> String {
        match self.family {
            Family::V4 => {
                let [a, b, c, d] = (self.value as u32).to_be_bytes();
                format!("{a:03}.{b:03}.{c:03}.{d:03}")
            }
            Family::V6 => {
                let groups = Ipv6Addr::from(self.value).segments();
                let mut out = String::with_capacity(39);
                for (i, g) in groups.iter().enumerate() {
                    if i > 0 {
                        out.push(':');
                    }
                    out.push_str(&format!("{g:04x}"));
                }
                out
            }
        }
    }

    /// The DNS PTR form: reversed labels under `in-addr.arpa` for IPv4, and
    /// reversed nibbles under `ip6.arpa` for IPv6.
    ///
    /// ```
    /// # use range_tree::Addr;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// assert_eq!("1.2.3.4".parse::<Addr>()?.ptr_form(), "4.3.2.1.in-addr.arpa");
    /// # Ok(())
    /// # }
    /// ```
    pub fn ptr_form(&self) -> String {
        match self.family {
            Family::V4 => {
                let [a, b, c, d] = (self.value as u32).to_be_bytes();
                format!("{d}.{c}.{b}.{a}.in-addr.arpa")
            }
            Family::V6 => {
                let mut out = String::with_capacity(72);
                for i in 0..32 {
                    let nibble = (self.value >> (4 * i)) & 0xf;
                    out.push_str(&format!("{nibble:x}."));
                }
                out.push_str("ip6.arpa");
                out
            }
        }
    }

    /// The network-byte-order binary form: 4 bytes for IPv4, 16 for IPv6.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self.family {
            Family::V4 => (self.value as u32).to_be_bytes().to_vec(),
            Family::V6 => self.value.to_be_bytes().to_vec(),
        }
    }

    /// Reconstruct an address from its network-byte-order binary form. Any
    /// length other than 4 or 16 fails with [`Error::InvalidAddress`].
    /// Sixteen bytes holding an IPv4-mapped value canonicalize to `V4`, like
    /// every other entry point.
    ///
    /// ```
    /// # use range_tree::Addr;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let a: Addr = "192.0.2.1".parse()?;
    /// assert_eq!(Addr::from_bytes(&a.to_bytes())?, a);
    /// assert!(Addr::from_bytes(&[1, 2, 3]).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
            Ok(Self::v4(u32::from_be_bytes(octets)))
        } else if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
            Ok(Ipv6Addr::from(u128::from_be_bytes(octets)).into())
        } else {
            Err(Error::InvalidAddress(format!(
                "expected 4 or 16 bytes, got {}",
                bytes.len()
            )))
        }
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.family {
            Family::V4 => Ipv4Addr::from(self.value as u32).fmt(f),
            Family::V6 => Ipv6Addr::from(self.value).fmt(f),
        }
    }
}

impl fmt::Debug for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<Ipv4Addr> for Addr {
    fn from(ip: Ipv4Addr) -> Self {
        Self::v4(ip.into())
    }
}

impl From<Ipv6Addr> for Addr {
    /// IPv4-mapped addresses (`::ffff:a.b.c.d`) canonicalize to plain `V4`.
    /// The mapping metadata is discarded; the normalization is irreversible.
    fn from(ip: Ipv6Addr) -> Self {
        match ip.segments() {
            [0, 0, 0, 0, 0, 0xffff, g, h] => Self::v4(((g as u32) << 16) | h as u32),
            _ => Self::v6(ip.into()),
        }
    }
}

impl From<IpAddr> for Addr {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(ip) => ip.into(),
            IpAddr::V6(ip) => ip.into(),
        }
    }
}

impl From<Addr> for IpAddr {
    fn from(addr: Addr) -> Self {
        match addr.family {
            Family::V4 => IpAddr::V4(Ipv4Addr::from(addr.value as u32)),
            Family::V6 => IpAddr::V6(Ipv6Addr::from(addr.value)),
        }
    }
}

impl FromStr for Addr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let ip: IpAddr = s
            .parse()
            .map_err(|_| Error::InvalidAddress(s.to_string()))?;
        Ok(ip.into())
    }
}
