//! Component kind bitmasks

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// A 64-bit component bitmask.
///
/// Each component type is tagged with one bit; a `Kind` with several bits set
/// describes a signature ("has all of these"). Distinct component types are
/// expected to use disjoint bits so that unions and intersections stay
/// meaningful.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(pub u64);

impl Kind {
    /// The empty mask. Every entity matches it.
    pub const EMPTY: Kind = Kind(0);

    /// A mask with only bit `n` set.
    ///
    /// # Panics
    /// Panics if `n >= 64`.
    pub const fn bit(n: u32) -> Self {
        assert!(n < 64, "kind bit out of range");
        Self(1 << n)
    }

    /// Wrap a raw bit pattern.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw bit pattern.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether no bits are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every bit of `other` is also set in `self`.
    pub const fn contains(self, other: Kind) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` and `other` share at least one bit.
    pub const fn intersects(self, other: Kind) -> bool {
        self.0 & other.0 != 0
    }

    /// Bits set in either mask.
    pub const fn union(self, other: Kind) -> Self {
        Self(self.0 | other.0)
    }

    /// Bits of `self` that are not set in `other`.
    pub const fn difference(self, other: Kind) -> Self {
        Self(self.0 & !other.0)
    }

    /// Number of bits set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl From<u64> for Kind {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl From<Kind> for u64 {
    fn from(kind: Kind) -> Self {
        kind.0
    }
}

impl BitOr for Kind {
    type Output = Kind;

    fn bitor(self, rhs: Kind) -> Kind {
        self.union(rhs)
    }
}

impl BitOrAssign for Kind {
    fn bitor_assign(&mut self, rhs: Kind) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Kind {
    type Output = Kind;

    fn bitand(self, rhs: Kind) -> Kind {
        Kind(self.0 & rhs.0)
    }
}

impl BitAndAssign for Kind {
    fn bitand_assign(&mut self, rhs: Kind) {
        self.0 &= rhs.0;
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind({:#b})", self.0)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

impl fmt::Binary for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}
