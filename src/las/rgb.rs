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

//! The RGB color item and its compressors / decompressors.

use crate::las::utils::{lower_byte_changed, upper_byte_changed};
use crate::packers::Packable;

/// Color of a point, three 16-bit components per the LAS spec.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Rgb {
    pub const SIZE: usize = 6;
}

impl Packable for Rgb {
    fn unpack_from(input: &[u8]) -> Self {
        Self {
            red: u16::unpack_from(&input[0..2]),
            green: u16::unpack_from(&input[2..4]),
            blue: u16::unpack_from(&input[4..6]),
        }
    }

    fn pack_into(&self, output: &mut [u8]) {
        self.red.pack_into(&mut output[0..2]);
        self.green.pack_into(&mut output[2..4]);
        self.blue.pack_into(&mut output[4..6]);
    }
}

/// Bit mask of which color bytes changed relative to the previous point.
///
/// Bit 6 (only used by version 2) flags that the current color is not a
/// plain gray value.
struct ColorDiff(u8);

impl ColorDiff {
    fn from_colors(current: &Rgb, last: &Rgb) -> Self {
        let not_gray = lower_byte_changed(current.red, current.green)
            || lower_byte_changed(current.red, current.blue)
            || upper_byte_changed(current.red, current.green)
            || upper_byte_changed(current.red, current.blue);

        let v = (lower_byte_changed(last.red, current.red) as u8)
            | (upper_byte_changed(last.red, current.red) as u8) << 1
            | (lower_byte_changed(last.green, current.green) as u8) << 2
            | (upper_byte_changed(last.green, current.green) as u8) << 3
            | (lower_byte_changed(last.blue, current.blue) as u8) << 4
            | (upper_byte_changed(last.blue, current.blue) as u8) << 5
            | (not_gray as u8) << 6;

        Self(v)
    }

    fn new(v: u8) -> Self {
        Self(v)
    }

    fn lower_red_byte_changed(&self) -> bool {
        self.0 & (1 << 0) != 0
    }

    fn upper_red_byte_changed(&self) -> bool {
        self.0 & (1 << 1) != 0
    }

    fn lower_green_byte_changed(&self) -> bool {
        self.0 & (1 << 2) != 0
    }

    fn upper_green_byte_changed(&self) -> bool {
        self.0 & (1 << 3) != 0
    }

    fn lower_blue_byte_changed(&self) -> bool {
        self.0 & (1 << 4) != 0
    }

    fn upper_blue_byte_changed(&self) -> bool {
        self.0 & (1 << 5) != 0
    }

    fn is_not_gray(&self) -> bool {
        self.0 & (1 << 6) != 0
    }
}

pub mod v1 {
    //! Version 1 of the RGB compression.
    //!
    //! The algorithm is pretty simple:
    //!
    //! - A 6-bit symbol says which of the six color bytes changed.
    //! - Each changed byte is compressed against the corresponding byte
    //!   of the previous color, one corrector context per byte position.
    use std::io::{Read, Write};

    use crate::compressors::{IntegerCompressor, IntegerCompressorBuilder};
    use crate::decoders::ArithmeticDecoder;
    use crate::decompressors::{IntegerDecompressor, IntegerDecompressorBuilder};
    use crate::encoders::ArithmeticEncoder;
    use crate::las::utils::{lower_byte, read_and_unpack, upper_byte};
    use crate::models::{DecodeSymbolModel, EncodeSymbolModel};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::{ColorDiff, Rgb};

    const LOWER_RED_BYTE_CONTEXT: u32 = 0;
    const UPPER_RED_BYTE_CONTEXT: u32 = 1;
    const LOWER_GREEN_BYTE_CONTEXT: u32 = 2;
    const UPPER_GREEN_BYTE_CONTEXT: u32 = 3;
    const LOWER_BLUE_BYTE_CONTEXT: u32 = 4;
    const UPPER_BLUE_BYTE_CONTEXT: u32 = 5;

    pub struct LasRgbCompressor {
        last: Rgb,
        byte_used_model: EncodeSymbolModel,
        ic_rgb: IntegerCompressor,
    }

    impl Default for LasRgbCompressor {
        fn default() -> Self {
            Self {
                last: Default::default(),
                byte_used_model: EncodeSymbolModel::new(64),
                ic_rgb: IntegerCompressorBuilder::new()
                    // byte by byte, one context per byte position
                    .bits(8)
                    .contexts(6)
                    .build_initialized(),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasRgbCompressor {
        fn size_of_field(&self) -> usize {
            Rgb::SIZE
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.last = Rgb::unpack_from(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let current = Rgb::unpack_from(buf);
            let sym = ColorDiff::from_colors(&current, &self.last).0 & 0x3F;
            encoder.encode_symbol(&mut self.byte_used_model, u32::from(sym))?;

            let color_diff = ColorDiff::new(sym);
            if color_diff.lower_red_byte_changed() {
                self.ic_rgb.compress(
                    encoder,
                    i32::from(lower_byte(self.last.red)),
                    i32::from(lower_byte(current.red)),
                    LOWER_RED_BYTE_CONTEXT,
                )?;
            }
            if color_diff.upper_red_byte_changed() {
                self.ic_rgb.compress(
                    encoder,
                    i32::from(upper_byte(self.last.red)),
                    i32::from(upper_byte(current.red)),
                    UPPER_RED_BYTE_CONTEXT,
                )?;
            }
            if color_diff.lower_green_byte_changed() {
                self.ic_rgb.compress(
                    encoder,
                    i32::from(lower_byte(self.last.green)),
                    i32::from(lower_byte(current.green)),
                    LOWER_GREEN_BYTE_CONTEXT,
                )?;
            }
            if color_diff.upper_green_byte_changed() {
                self.ic_rgb.compress(
                    encoder,
                    i32::from(upper_byte(self.last.green)),
                    i32::from(upper_byte(current.green)),
                    UPPER_GREEN_BYTE_CONTEXT,
                )?;
            }
            if color_diff.lower_blue_byte_changed() {
                self.ic_rgb.compress(
                    encoder,
                    i32::from(lower_byte(self.last.blue)),
                    i32::from(lower_byte(current.blue)),
                    LOWER_BLUE_BYTE_CONTEXT,
                )?;
            }
            if color_diff.upper_blue_byte_changed() {
                self.ic_rgb.compress(
                    encoder,
                    i32::from(upper_byte(self.last.blue)),
                    i32::from(upper_byte(current.blue)),
                    UPPER_BLUE_BYTE_CONTEXT,
                )?;
            }
            self.last = current;
            Ok(())
        }
    }

    pub struct LasRgbDecompressor {
        last: Rgb,
        byte_used_model: DecodeSymbolModel,
        ic_rgb: IntegerDecompressor,
    }

    impl Default for LasRgbDecompressor {
        fn default() -> Self {
            Self {
                last: Default::default(),
                byte_used_model: DecodeSymbolModel::new(64),
                ic_rgb: IntegerDecompressorBuilder::new()
                    .bits(8)
                    .contexts(6)
                    .build_initialized(),
            }
        }
    }

    impl LasRgbDecompressor {
        fn decompress_byte<R: Read>(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            context: u32,
            last_byte_value: u8,
        ) -> std::io::Result<i32> {
            self.ic_rgb
                .decompress(decoder, i32::from(last_byte_value), context)
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasRgbDecompressor {
        fn size_of_field(&self) -> usize {
            Rgb::SIZE
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            self.last = read_and_unpack::<_, Rgb>(src, first_point)?;
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            let color_diff =
                ColorDiff::new(decoder.decode_symbol(&mut self.byte_used_model)? as u8);

            if color_diff.lower_red_byte_changed() {
                let new_byte = self.decompress_byte(
                    decoder,
                    LOWER_RED_BYTE_CONTEXT,
                    lower_byte(self.last.red),
                )?;
                self.last.red = new_byte as u16 | (self.last.red & 0xFF00);
            }
            if color_diff.upper_red_byte_changed() {
                let new_byte = self.decompress_byte(
                    decoder,
                    UPPER_RED_BYTE_CONTEXT,
                    upper_byte(self.last.red),
                )?;
                self.last.red = (new_byte as u16) << 8 | (self.last.red & 0x00FF);
            }
            if color_diff.lower_green_byte_changed() {
                let new_byte = self.decompress_byte(
                    decoder,
                    LOWER_GREEN_BYTE_CONTEXT,
                    lower_byte(self.last.green),
                )?;
                self.last.green = new_byte as u16 | (self.last.green & 0xFF00);
            }
            if color_diff.upper_green_byte_changed() {
                let new_byte = self.decompress_byte(
                    decoder,
                    UPPER_GREEN_BYTE_CONTEXT,
                    upper_byte(self.last.green),
                )?;
                self.last.green = (new_byte as u16) << 8 | (self.last.green & 0x00FF);
            }
            if color_diff.lower_blue_byte_changed() {
                let new_byte = self.decompress_byte(
                    decoder,
                    LOWER_BLUE_BYTE_CONTEXT,
                    lower_byte(self.last.blue),
                )?;
                self.last.blue = new_byte as u16 | (self.last.blue & 0xFF00);
            }
            if color_diff.upper_blue_byte_changed() {
                let new_byte = self.decompress_byte(
                    decoder,
                    UPPER_BLUE_BYTE_CONTEXT,
                    upper_byte(self.last.blue),
                )?;
                self.last.blue = (new_byte as u16) << 8 | (self.last.blue & 0x00FF);
            }
            self.last.pack_into(buf);
            Ok(())
        }
    }
}

pub mod v2 {
    //! Version 2 of the RGB compression.
    //!
    //! Byte differences are coded through per-byte symbol models, and the
    //! green / blue channels are predicted from the red / green deltas so
    //! correlated channels cost little. A gray color (all channels equal)
    //! is recognized from the mask alone.
    use std::io::{Read, Write};

    use crate::decoders::ArithmeticDecoder;
    use crate::encoders::ArithmeticEncoder;
    use crate::las::utils::{lower_byte, read_and_unpack, u8_clamp, upper_byte};
    use crate::models::{DecodeSymbolModel, EncodeSymbolModel};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::{ColorDiff, Rgb};

    struct RgbModels<M> {
        byte_used: M,
        lower_red_byte: M,
        upper_red_byte: M,
        lower_green_byte: M,
        upper_green_byte: M,
        lower_blue_byte: M,
        upper_blue_byte: M,
    }

    impl<M> RgbModels<M> {
        fn build(new_model: impl Fn(u32) -> M) -> Self {
            Self {
                byte_used: new_model(128),
                lower_red_byte: new_model(256),
                upper_red_byte: new_model(256),
                lower_green_byte: new_model(256),
                upper_green_byte: new_model(256),
                lower_blue_byte: new_model(256),
                upper_blue_byte: new_model(256),
            }
        }
    }

    pub struct LasRgbCompressor {
        last: Rgb,
        models: RgbModels<EncodeSymbolModel>,
    }

    impl Default for LasRgbCompressor {
        fn default() -> Self {
            Self {
                last: Rgb::default(),
                models: RgbModels::build(EncodeSymbolModel::new),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasRgbCompressor {
        fn size_of_field(&self) -> usize {
            Rgb::SIZE
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.last = Rgb::unpack_from(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let current = Rgb::unpack_from(buf);
            let color_diff = ColorDiff::from_colors(&current, &self.last);
            encoder.encode_symbol(&mut self.models.byte_used, u32::from(color_diff.0))?;

            let mut diff_l = 0i32;
            let mut diff_h = 0i32;

            if color_diff.lower_red_byte_changed() {
                diff_l = i32::from(lower_byte(current.red)) - i32::from(lower_byte(self.last.red));
                encoder.encode_symbol(&mut self.models.lower_red_byte, diff_l as u8 as u32)?;
            }
            if color_diff.upper_red_byte_changed() {
                diff_h = i32::from(upper_byte(current.red)) - i32::from(upper_byte(self.last.red));
                encoder.encode_symbol(&mut self.models.upper_red_byte, diff_h as u8 as u32)?;
            }

            if color_diff.is_not_gray() {
                if color_diff.lower_green_byte_changed() {
                    let corr = i32::from(lower_byte(current.green))
                        - i32::from(u8_clamp(diff_l + i32::from(lower_byte(self.last.green))));
                    encoder.encode_symbol(&mut self.models.lower_green_byte, corr as u8 as u32)?;
                }
                if color_diff.lower_blue_byte_changed() {
                    diff_l = (diff_l + i32::from(lower_byte(current.green))
                        - i32::from(lower_byte(self.last.green)))
                        / 2;
                    let corr = i32::from(lower_byte(current.blue))
                        - i32::from(u8_clamp(diff_l + i32::from(lower_byte(self.last.blue))));
                    encoder.encode_symbol(&mut self.models.lower_blue_byte, corr as u8 as u32)?;
                }
                if color_diff.upper_green_byte_changed() {
                    let corr = i32::from(upper_byte(current.green))
                        - i32::from(u8_clamp(diff_h + i32::from(upper_byte(self.last.green))));
                    encoder.encode_symbol(&mut self.models.upper_green_byte, corr as u8 as u32)?;
                }
                if color_diff.upper_blue_byte_changed() {
                    diff_h = (diff_h + i32::from(upper_byte(current.green))
                        - i32::from(upper_byte(self.last.green)))
                        / 2;
                    let corr = i32::from(upper_byte(current.blue))
                        - i32::from(u8_clamp(diff_h + i32::from(upper_byte(self.last.blue))));
                    encoder.encode_symbol(&mut self.models.upper_blue_byte, corr as u8 as u32)?;
                }
            }
            self.last = current;
            Ok(())
        }
    }

    pub struct LasRgbDecompressor {
        last: Rgb,
        models: RgbModels<DecodeSymbolModel>,
    }

    impl Default for LasRgbDecompressor {
        fn default() -> Self {
            Self {
                last: Rgb::default(),
                models: RgbModels::build(DecodeSymbolModel::new),
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasRgbDecompressor {
        fn size_of_field(&self) -> usize {
            Rgb::SIZE
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            self.last = read_and_unpack::<_, Rgb>(src, first_point)?;
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            let color_diff =
                ColorDiff::new(decoder.decode_symbol(&mut self.models.byte_used)? as u8);

            let mut this_val = Rgb::default();

            if color_diff.lower_red_byte_changed() {
                let corr = decoder.decode_symbol(&mut self.models.lower_red_byte)? as u8;
                this_val.red = u16::from(corr.wrapping_add(lower_byte(self.last.red)));
            } else {
                this_val.red = self.last.red & 0x00FF;
            }
            if color_diff.upper_red_byte_changed() {
                let corr = decoder.decode_symbol(&mut self.models.upper_red_byte)? as u8;
                this_val.red |= u16::from(corr.wrapping_add(upper_byte(self.last.red))) << 8;
            } else {
                this_val.red |= self.last.red & 0xFF00;
            }

            if color_diff.is_not_gray() {
                let mut diff = i32::from(lower_byte(this_val.red)) - i32::from(lower_byte(self.last.red));

                if color_diff.lower_green_byte_changed() {
                    let corr = decoder.decode_symbol(&mut self.models.lower_green_byte)? as u8;
                    this_val.green = u16::from(
                        corr.wrapping_add(u8_clamp(diff + i32::from(lower_byte(self.last.green)))),
                    );
                } else {
                    this_val.green = self.last.green & 0x00FF;
                }
                if color_diff.lower_blue_byte_changed() {
                    let corr = decoder.decode_symbol(&mut self.models.lower_blue_byte)? as u8;
                    diff = (diff + i32::from(lower_byte(this_val.green))
                        - i32::from(lower_byte(self.last.green)))
                        / 2;
                    this_val.blue = u16::from(
                        corr.wrapping_add(u8_clamp(diff + i32::from(lower_byte(self.last.blue)))),
                    );
                } else {
                    this_val.blue = self.last.blue & 0x00FF;
                }

                diff = i32::from(upper_byte(this_val.red)) - i32::from(upper_byte(self.last.red));
                if color_diff.upper_green_byte_changed() {
                    let corr = decoder.decode_symbol(&mut self.models.upper_green_byte)? as u8;
                    this_val.green |= u16::from(
                        corr.wrapping_add(u8_clamp(diff + i32::from(upper_byte(self.last.green)))),
                    ) << 8;
                } else {
                    this_val.green |= self.last.green & 0xFF00;
                }
                if color_diff.upper_blue_byte_changed() {
                    let corr = decoder.decode_symbol(&mut self.models.upper_blue_byte)? as u8;
                    diff = (diff + i32::from(upper_byte(this_val.green))
                        - i32::from(upper_byte(self.last.green)))
                        / 2;
                    this_val.blue |= u16::from(
                        corr.wrapping_add(u8_clamp(diff + i32::from(upper_byte(self.last.blue)))),
                    ) << 8;
                } else {
                    this_val.blue |= self.last.blue & 0xFF00;
                }
            } else {
                this_val.green = this_val.red;
                this_val.blue = this_val.red;
            }

            self.last = this_val;
            this_val.pack_into(buf);
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lower_red_changed() {
        let a = Rgb {
            red: 0,
            green: 0,
            blue: 0,
        };
        let b = Rgb {
            red: 1,
            green: 0,
            blue: 0,
        };

        assert_eq!(ColorDiff::from_colors(&b, &a).0, 0b01000001);
        assert_eq!(ColorDiff::from_colors(&a, &b).0, 0b00000001);
    }

    #[test]
    fn upper_red_changed() {
        let a = Rgb {
            red: 0,
            green: 0,
            blue: 0,
        };
        let b = Rgb {
            red: 256,
            green: 0,
            blue: 0,
        };

        assert_eq!(ColorDiff::from_colors(&b, &a).0, 0b01000010);
        assert_eq!(ColorDiff::from_colors(&a, &b).0, 0b00000010);
    }

    #[test]
    fn lower_green_changed() {
        let a = Rgb {
            red: 0,
            green: 0,
            blue: 0,
        };
        let b = Rgb {
            red: 0,
            green: 1,
            blue: 0,
        };

        assert_eq!(ColorDiff::from_colors(&b, &a).0, 0b01000100);
        assert_eq!(ColorDiff::from_colors(&a, &b).0, 0b00000100);
    }

    #[test]
    fn upper_green_changed() {
        let a = Rgb {
            red: 0,
            green: 0,
            blue: 0,
        };
        let b = Rgb {
            red: 0,
            green: 256,
            blue: 0,
        };

        assert_eq!(ColorDiff::from_colors(&b, &a).0, 0b01001000);
        assert_eq!(ColorDiff::from_colors(&a, &b).0, 0b00001000);
    }

    #[test]
    fn lower_blue_changed() {
        let a = Rgb {
            red: 0,
            green: 0,
            blue: 0,
        };
        let b = Rgb {
            red: 0,
            green: 0,
            blue: 1,
        };

        assert_eq!(ColorDiff::from_colors(&b, &a).0, 0b01010000);
        assert_eq!(ColorDiff::from_colors(&a, &b).0, 0b00010000);
    }

    #[test]
    fn upper_blue_changed() {
        let a = Rgb {
            red: 0,
            green: 0,
            blue: 0,
        };
        let b = Rgb {
            red: 0,
            green: 0,
            blue: 256,
        };

        assert_eq!(ColorDiff::from_colors(&b, &a).0, 0b01100000);
        assert_eq!(ColorDiff::from_colors(&a, &b).0, 0b00100000);
    }

    #[test]
    fn nothing_changed() {
        let a = Rgb::default();
        let b = Rgb::default();

        assert_eq!(ColorDiff::from_colors(&a, &b).0, 0b00000000);
        assert_eq!(ColorDiff::from_colors(&b, &a).0, 0b00000000);
    }
}
