//! Error types returned by address, range, and tree operations.

use std::fmt;

/// Errors returned by the fallible operations of this crate.
///
/// Every parse and arithmetic failure is reported through this type; nothing
/// is silently coerced. Removing an absent item from a tree is *not* an
/// error (it returns `false`), and neither is inserting a duplicate through
/// [`crate::RangeTree::insert`] (use [`crate::RangeTree::try_insert`] to
/// observe it as [`Error::DuplicateItem`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The textual or binary form of an address could not be understood,
    /// including byte slices that are neither 4 nor 16 bytes long.
    InvalidAddress(String),
    /// A range was malformed: unparsable text, endpoints of different
    /// address families, an inverted range (`base > last`), or a conversion
    /// into a CIDR type that the range cannot represent.
    InvalidRange(String),
    /// Address arithmetic went past the all-ones address of the family.
    Overflow,
    /// Address arithmetic went below the all-zeros address of the family.
    Underflow,
    /// An equal item is already stored in the tree.
    DuplicateItem(String),
    /// An operation was called with an argument outside its domain, such as
    /// splitting a non-CIDR range or splitting by too many bits.
    InvalidArgument(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidAddress(s) => {
                write!(f, "invalid address: {s}")
            }
            Error::InvalidRange(s) => {
                write!(f, "invalid range: {s}")
            }
            Error::Overflow => {
                write!(f, "address arithmetic overflowed the address family")
            }
            Error::Underflow => {
                write!(f, "address arithmetic underflowed the address family")
            }
            Error::DuplicateItem(s) => {
                write!(f, "duplicate item: {s}")
            }
            Error::InvalidArgument(s) => {
                write!(f, "invalid argument: {s}")
            }
        }
    }
}

impl std::error::Error for Error {}
