// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Closed enumerations.

Every enum in the public surface is closed.  Besides the variants themselves each one gets

* `COUNT` and `ALL`, the legal values in declaration order,
* `MAX_ENUM`, the last legal value,
* `as_str` / [std::fmt::Display], the variant name,
* a checked `TryFrom<u8>` for values arriving as raw integers, which rejects anything
  out of range with [crate::Error::InvalidUsage].
*/

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $name {
            /// Number of legal values.
            pub const COUNT: usize = [$(stringify!($variant)),+].len();
            /// Every legal value, in declaration order.
            pub const ALL: [$name; $name::COUNT] = [$($name::$variant),+];
            /// The last legal value.
            pub const MAX_ENUM: $name = $name::ALL[$name::COUNT - 1];

            /// The variant name.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::convert::TryFrom<u8> for $name {
            type Error = $crate::Error;

            fn try_from(value: u8) -> ::std::result::Result<Self, <Self as ::std::convert::TryFrom<u8>>::Error> {
                $(
                    if value == $value {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::Error::InvalidUsage)
            }
        }

        impl ::std::convert::From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }
    };
}
