//! Bit-layout machinery shared by the frame families.
//!
//! Every concrete message is described once, as data: a list of typed fields
//! with a bit width and bit offset into the packed 64-bit payload value.
//! [`frame_layout!`] generates the decode (`from_value`) and encode
//! (`to_value`) directions from the same description, so a layout can't
//! round-trip inconsistently and sibling messages don't duplicate
//! shift-and-mask logic.

/// A value that can live in a bit field of the payload value.
pub(crate) trait FieldBits: Copy {
    /// Build the value from the field's (already masked) bits.
    fn from_bits(bits: u64) -> Self;
    /// Reduce the value to raw bits for packing.
    fn to_bits(self) -> u64;
}

impl FieldBits for bool {
    fn from_bits(bits: u64) -> Self { bits == 1 }
    fn to_bits(self) -> u64 { self as u64 }
}

impl FieldBits for u8 {
    fn from_bits(bits: u64) -> Self { bits as u8 }
    fn to_bits(self) -> u64 { u64::from(self) }
}

impl FieldBits for u16 {
    fn from_bits(bits: u64) -> Self { bits as u16 }
    fn to_bits(self) -> u64 { u64::from(self) }
}

impl FieldBits for u32 {
    fn from_bits(bits: u64) -> Self { bits as u32 }
    fn to_bits(self) -> u64 { u64::from(self) }
}

/// Mask covering the given number of low-order bits.
pub(crate) const fn mask(width: u32) -> u64 {
    (1 << width) - 1
}

/// Define a message layout: a struct of typed fields, each occupying
/// `width @ offset` bits of the 64-bit payload value. Bits not covered by
/// any field are reserved: ignored on decode, zero on encode.
macro_rules! frame_layout {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident: $ty:ty = $width:literal @ $offset:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )+
        }

        impl $name {
            /// Extract the message fields from a packed payload value.
            pub fn from_value(value: u64) -> Self {
                $name {
                    $(
                        $field: <$ty as crate::layout::FieldBits>::from_bits(
                            value >> $offset & crate::layout::mask($width)),
                    )+
                }
            }

            /// Pack the message fields into a payload value.
            pub fn to_value(&self) -> u64 {
                let mut value = 0;

                $(
                    value |= (<$ty as crate::layout::FieldBits>::to_bits(self.$field)
                        & crate::layout::mask($width)) << $offset;
                )+

                value
            }
        }
    };
}

pub(crate) use frame_layout;

#[cfg(test)]
mod test {
    frame_layout! {
        /// Layout exercising every supported field type.
        pub struct TestLayout {
            pub flag: bool = 1 @ 63,
            pub small: u8 = 3 @ 56,
            pub medium: u16 = 12 @ 40,
            pub wide: u32 = 24 @ 0,
        }
    }

    #[test]
    fn test_round_trip() {
        let layout = TestLayout {
            flag: true,
            small: 0b101,
            medium: 0xABC,
            wide: 0xDEAD77,
        };

        let value = layout.to_value();

        assert_eq!(value, 0x8000_0000_0000_0000
            | 0b101 << 56
            | 0xABC << 40
            | 0xDEAD77);
        assert_eq!(TestLayout::from_value(value), layout);
    }

    #[test]
    fn test_reserved_bits_ignored() {
        // Bits outside every field must not disturb decoding.
        let noise = 0x0700_F000_FF00_0000;
        let layout = TestLayout::from_value(noise | 0xDEAD77);

        assert_eq!(layout.wide, 0xDEAD77);
        assert!(!layout.flag);
        assert_eq!(layout.small, 0);
        assert_eq!(layout.medium, 0);

        // And encoding zeroes them back out.
        assert_eq!(layout.to_value(), 0xDEAD77);
    }

    #[test]
    fn test_field_masking() {
        // Oversized field values are truncated to their width on encode.
        let layout = TestLayout { small: 0xFF, ..Default::default() };
        assert_eq!(layout.to_value(), 0b111 << 56);
    }
}
