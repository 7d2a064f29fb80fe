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

//! A small macro for declaring bitmask newtypes such as modifier-key sets.

/// Declares a `Copy` bitmask newtype with named flag constants.
///
/// The generated type compares and hashes by its raw bits, which is what makes
/// it usable as part of a map key. Bits without a named flag are preserved.
#[macro_export]
macro_rules! tactus_bitflags {
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
            /// The set with no flags.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Wraps raw bits as reported by a platform event source.
            pub const fn from_bits_retain(bits: $ty) -> Self {
                Self { bits }
            }

            /// Returns the raw bits.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no bit is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if every bit of `other` is set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Sets the bits of `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the bits of `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
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

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                if self.bits == 0 {
                    return write!(f, "{}(EMPTY)", stringify!($name));
                }

                let mut remaining = self.bits;
                write!(f, "{}(", stringify!($name))?;
                let mut separator = "";
                $(
                    if $flag_value != 0 && (remaining & $flag_value) == $flag_value {
                        write!(f, "{}{}", separator, stringify!($flag_name))?;
                        remaining &= !$flag_value;
                        separator = " | ";
                    }
                )*
                if remaining != 0 {
                    write!(f, "{}{:#x}", separator, remaining)?;
                }
                write!(f, ")")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::tactus_bitflags;

    tactus_bitflags! {
        /// Flags used only to exercise the macro.
        pub struct Sample: u32 {
            const RED = 1 << 0;
            const GREEN = 1 << 1;
            const BLUE = 1 << 2;
        }
    }

    #[test]
    fn empty_by_default() {
        let sample = Sample::default();
        assert!(sample.is_empty());
        assert_eq!(sample, Sample::EMPTY);
        assert_eq!(sample.bits(), 0);
    }

    #[test]
    fn combine_and_query() {
        let mut sample = Sample::RED | Sample::BLUE;
        assert!(sample.contains(Sample::RED));
        assert!(!sample.contains(Sample::GREEN));
        assert!(sample.contains(Sample::RED | Sample::BLUE));

        sample.insert(Sample::GREEN);
        sample.remove(Sample::RED);
        assert_eq!(sample, Sample::GREEN | Sample::BLUE);
        assert_eq!(sample & Sample::GREEN, Sample::GREEN);
    }

    #[test]
    fn unknown_bits_are_kept() {
        let sample = Sample::from_bits_retain(0b1001);
        assert_eq!(sample.bits(), 0b1001);
        assert!(sample.contains(Sample::RED));
    }

    #[test]
    fn equality_is_by_bits() {
        assert_eq!(Sample::from_bits_retain(2), Sample::GREEN);
        assert_ne!(Sample::RED, Sample::GREEN);
    }

    #[test]
    fn debug_lists_flag_names() {
        assert_eq!(format!("{:?}", Sample::EMPTY), "Sample(EMPTY)");
        assert_eq!(format!("{:?}", Sample::RED | Sample::BLUE), "Sample(RED | BLUE)");
        assert_eq!(
            format!("{:?}", Sample::from_bits_retain(0b1010)),
            "Sample(GREEN | 0x8)"
        );
    }
}
