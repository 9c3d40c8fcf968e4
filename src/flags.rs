// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Typed bit flags.

A flag enum (such as [crate::ResourceUsageFlagBits]) names single bits.  [Flags] is a set of
them.  Sets only combine with sets of the same enum, so a fence flag can never end up in a
resource usage field.

```
use llri::{ResourceUsageFlagBits, ResourceUsageFlags};
let usage = ResourceUsageFlagBits::Sampled | ResourceUsageFlagBits::TransferDst;
assert!(usage.contains(ResourceUsageFlagBits::Sampled));
assert!(!usage.contains(ResourceUsageFlagBits::ShaderWrite));
assert_eq!(usage.to_string(), "TransferDst | Sampled");
assert_eq!(ResourceUsageFlags::empty().to_string(), "None");
```
*/

use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, Not};

/// Integer storage for a flag set.
pub trait FlagRepr:
    Copy
    + Eq
    + Hash
    + Debug
    + Default
    + BitOr<Output = Self>
    + BitAnd<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
{
    const ZERO: Self;
}

impl FlagRepr for u8 {
    const ZERO: Self = 0;
}
impl FlagRepr for u16 {
    const ZERO: Self = 0;
}
impl FlagRepr for u32 {
    const ZERO: Self = 0;
}

/// An enum whose variants are single bits.
pub trait FlagBits: Copy + Eq + Hash + Debug + 'static {
    type Repr: FlagRepr;
    /// Every bit, lowest first.
    const BITS: &'static [Self];
    fn bit(self) -> Self::Repr;
    fn name(self) -> &'static str;
}

/// A set of `E` bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags<E: FlagBits>(E::Repr);

impl<E: FlagBits> Flags<E> {
    pub fn empty() -> Self {
        Flags(E::Repr::ZERO)
    }

    /// Every defined bit.
    pub fn all() -> Self {
        Flags(E::BITS.iter().fold(E::Repr::ZERO, |acc, b| acc | b.bit()))
    }

    /// `None` when `bits` contains an undefined bit.
    pub fn from_bits(bits: E::Repr) -> Option<Self> {
        let defined = Self::all().0;
        if bits & !defined == E::Repr::ZERO {
            Some(Flags(bits))
        } else {
            None
        }
    }

    /// Keeps undefined bits as given.
    pub fn from_bits_retain(bits: E::Repr) -> Self {
        Flags(bits)
    }

    pub fn bits(self) -> E::Repr {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == E::Repr::ZERO
    }

    /// True when every bit of `other` is set.
    pub fn contains(self, other: impl Into<Self>) -> bool {
        let other = other.into().0;
        self.0 & other == other
    }

    /// True when any bit of `other` is set.
    pub fn intersects(self, other: impl Into<Self>) -> bool {
        self.0 & other.into().0 != E::Repr::ZERO
    }

    pub fn insert(&mut self, other: impl Into<Self>) {
        self.0 = self.0 | other.into().0;
    }

    pub fn remove(&mut self, other: impl Into<Self>) {
        self.0 = self.0 & !other.into().0;
    }

    /// The set bits, lowest first.
    pub fn iter(self) -> impl Iterator<Item = E> {
        E::BITS
            .iter()
            .copied()
            .filter(move |b| self.0 & b.bit() != E::Repr::ZERO)
    }
}

impl<E: FlagBits> Default for Flags<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E: FlagBits> From<E> for Flags<E> {
    fn from(value: E) -> Self {
        Flags(value.bit())
    }
}

impl<E: FlagBits, R: Into<Flags<E>>> BitOr<R> for Flags<E> {
    type Output = Self;
    fn bitor(self, rhs: R) -> Self {
        Flags(self.0 | rhs.into().0)
    }
}

impl<E: FlagBits, R: Into<Flags<E>>> BitAnd<R> for Flags<E> {
    type Output = Self;
    fn bitand(self, rhs: R) -> Self {
        Flags(self.0 & rhs.into().0)
    }
}

impl<E: FlagBits, R: Into<Flags<E>>> BitOrAssign<R> for Flags<E> {
    fn bitor_assign(&mut self, rhs: R) {
        self.insert(rhs);
    }
}

impl<E: FlagBits, R: Into<Flags<E>>> BitAndAssign<R> for Flags<E> {
    fn bitand_assign(&mut self, rhs: R) {
        self.0 = self.0 & rhs.into().0;
    }
}

/// The complement within the defined bits.
impl<E: FlagBits> Not for Flags<E> {
    type Output = Self;
    fn not(self) -> Self {
        Flags(!self.0 & Self::all().0)
    }
}

impl<E: FlagBits> Debug for Flags<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Flags({self})")
    }
}

impl<E: FlagBits> Display for Flags<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        let mut first = true;
        for bit in self.iter() {
            if !first {
                f.write_str(" | ")?;
            }
            first = false;
            f.write_str(bit.name())?;
        }
        Ok(())
    }
}

/// Declares a flag enum, its [FlagBits] impl and a set alias.
macro_rules! flag_bits {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident as $set:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr($repr)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $crate::flags::FlagBits for $name {
            type Repr = $repr;
            const BITS: &'static [Self] = &[$($name::$variant),+];
            fn bit(self) -> $repr {
                self as $repr
            }
            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl ::std::ops::BitOr for $name {
            type Output = $crate::flags::Flags<$name>;
            fn bitor(self, rhs: Self) -> Self::Output {
                $crate::flags::Flags::from(self) | rhs
            }
        }

        $vis type $set = $crate::flags::Flags<$name>;
    };
}

#[cfg(test)]
mod tests {
    use super::Flags;

    flag_bits! {
        enum Sample: u8 as SampleFlags {
            A = 0x1,
            B = 0x2,
            C = 0x8,
        }
    }

    #[test]
    fn set_algebra() {
        let mut f = Sample::A | Sample::C;
        assert!(f.contains(Sample::A));
        assert!(!f.contains(Sample::A | Sample::B));
        assert!(f.intersects(Sample::A | Sample::B));
        f.remove(Sample::A);
        assert_eq!(f, SampleFlags::from(Sample::C));
        f |= Sample::B;
        assert_eq!(f.bits(), 0xA);
        assert_eq!((!f).bits(), 0x1);
        assert_eq!(f.iter().collect::<Vec<_>>(), vec![Sample::B, Sample::C]);
    }

    #[test]
    fn undefined_bits() {
        assert_eq!(Flags::<Sample>::from_bits(0x4), None);
        assert_eq!(Flags::<Sample>::from_bits(0x3).map(|f| f.bits()), Some(0x3));
        assert_eq!(Flags::<Sample>::from_bits_retain(0x4).bits(), 0x4);
        assert_eq!(SampleFlags::all().bits(), 0xB);
    }

    #[test]
    fn display() {
        assert_eq!((Sample::B | Sample::A).to_string(), "A | B");
        assert_eq!(SampleFlags::empty().to_string(), "None");
    }
}
