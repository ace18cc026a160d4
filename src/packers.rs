/*
===============================================================================

  PROGRAMMERS:

    martin.isenburg@rapidlasso.com  -  http://rapidlasso.com
    uday.karan@gmail.com - Hobu, Inc.

  COPYRIGHT:

    (c) 2007-2014, martin isenburg, rapidlasso - tools to catch reality
    (c) 2014, Uday Verma, Hobu, Inc.

    This is free software; you can redistribute and/or modify it under the
    terms of the GNU Lesser General Licence as published by the Free Software
    Foundation. See the COPYING file for more information.

    This software is distributed WITHOUT ANY WARRANTY and without even the
    implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.

===============================================================================
*/

//! Packing and unpacking of the fixed-layout, little-endian record fields.

/// Types that can be read from / written to a raw record buffer.
///
/// Slices handed to these functions must be at least as long as the
/// packed representation of the type.
pub trait Packable {
    fn unpack_from(input: &[u8]) -> Self;
    fn pack_into(&self, output: &mut [u8]);
}

macro_rules! packable_impl {
    ($type:ty, $size:expr) => {
        impl Packable for $type {
            fn unpack_from(input: &[u8]) -> Self {
                let mut bytes = [0u8; $size];
                bytes.copy_from_slice(&input[..$size]);
                <$type>::from_le_bytes(bytes)
            }

            fn pack_into(&self, output: &mut [u8]) {
                output[..$size].copy_from_slice(&self.to_le_bytes());
            }
        }
    };
}

packable_impl!(u8, 1);
packable_impl!(i8, 1);
packable_impl!(u16, 2);
packable_impl!(i16, 2);
packable_impl!(u32, 4);
packable_impl!(i32, 4);
packable_impl!(u64, 8);
packable_impl!(i64, 8);
packable_impl!(f32, 4);
packable_impl!(f64, 8);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_packer() {
        let in_val: i32 = -25;
        let mut buf = [0u8; std::mem::size_of::<i32>()];
        in_val.pack_into(&mut buf);
        let v = i32::unpack_from(&buf);
        assert_eq!(v, in_val);
    }

    #[test]
    fn test_packer_is_little_endian() {
        let mut buf = [0u8; std::mem::size_of::<u32>()];
        0xAABBCCDDu32.pack_into(&mut buf);
        assert_eq!(buf, [0xDD, 0xCC, 0xBB, 0xAA]);
        assert_eq!(u32::unpack_from(&buf), 0xAABBCCDD);
    }

    #[test]
    fn test_packer_f64_bit_exact() {
        let in_val: f64 = 1e9 + 0.001;
        let mut buf = [0u8; std::mem::size_of::<f64>()];
        in_val.pack_into(&mut buf);
        let v = f64::unpack_from(&buf);
        assert_eq!(v.to_bits(), in_val.to_bits());
    }
}
