// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A macro for declaring small typed flag sets.

/// Declares a copyable flag set over an unsigned integer.
#[macro_export]
macro_rules! versus_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// No flags set.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Builds a set from raw bits, keeping unknown bits.
            pub const fn from_bits(bits: $ty) -> Self {
                Self { bits }
            }

            /// Raw bits of the set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// `true` when no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// `true` when every flag of `other` is set.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Sets the flags of `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the flags of `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Clears every flag.
            pub fn clear(&mut self) {
                self.bits = 0;
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut rest = self.bits;
                let mut names = f.debug_set();
                $(
                    if $flag_value != 0 && (rest & $flag_value) == $flag_value {
                        names.entry(&format_args!("{}", stringify!($flag_name)));
                        rest &= !$flag_value;
                    }
                )*
                if rest != 0 {
                    names.entry(&format_args!("{:#x}", rest));
                }
                names.finish()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::versus_bitflags;

    versus_bitflags! {
        pub struct Sample: u16 {
            const LOW = 1 << 0;
            const HIGH = 1 << 8;
        }
    }

    #[test]
    fn test_insert_remove_and_contains() {
        let mut flags = Sample::EMPTY;
        assert!(flags.is_empty());
        flags.insert(Sample::LOW | Sample::HIGH);
        assert!(flags.contains(Sample::HIGH));
        flags.remove(Sample::LOW);
        assert!(!flags.contains(Sample::LOW));
        assert_eq!(flags.bits(), 1 << 8);
        flags.clear();
        assert!(flags.is_empty());
    }

    #[test]
    fn test_debug_lists_names_and_unknown_bits() {
        let flags = Sample::LOW | Sample::from_bits(1 << 3);
        assert_eq!(format!("{flags:?}"), "{LOW, 0x8}");
        assert_eq!(format!("{:?}", Sample::EMPTY), "{}");
    }
}
