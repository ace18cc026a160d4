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

//! The GPS time item and its compressors / decompressors.
//!
//! The stamp is an IEEE-754 double but every comparison, difference and
//! prediction works on its bit pattern as a 64-bit integer, so the codec
//! is exact for all values including NaNs.

use crate::packers::Packable;

/// An 8-byte GPS time stamp, held bitwise.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct GpsTime {
    pub value: i64,
}

impl From<f64> for GpsTime {
    fn from(v: f64) -> Self {
        Self {
            value: v.to_bits() as i64,
        }
    }
}

impl From<GpsTime> for f64 {
    fn from(t: GpsTime) -> Self {
        f64::from_bits(t.value as u64)
    }
}

impl Packable for GpsTime {
    fn unpack_from(input: &[u8]) -> Self {
        Self {
            value: i64::unpack_from(input),
        }
    }

    fn pack_into(&self, output: &mut [u8]) {
        self.value.pack_into(output)
    }
}

pub mod v1 {
    //! Version 1 of the GPS time compression.
    //!
    //! The integer difference between consecutive stamps is predicted as
    //! a small multiple of the previous difference; the multiplier is
    //! coded through a 512-symbol model and the residual through a
    //! 6-context corrector. Differences too large for 32 bits are stored
    //! raw.
    use std::io::{Read, Write};

    use crate::compressors::{IntegerCompressor, IntegerCompressorBuilder};
    use crate::decoders::ArithmeticDecoder;
    use crate::decompressors::{IntegerDecompressor, IntegerDecompressorBuilder};
    use crate::encoders::ArithmeticEncoder;
    use crate::las::utils::read_and_unpack;
    use crate::models::{DecodeSymbolModel, EncodeSymbolModel};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::GpsTime;

    const MULTI_MAX: u32 = 512;
    /// The stamp did not change at all.
    const MULTI_UNCHANGED: u32 = MULTI_MAX - 1;
    /// The difference does not fit in 32 bits, the stamp is stored raw.
    const MULTI_FULL: u32 = MULTI_MAX - 2;
    /// Largest multiplier coded as such.
    const MULTI_CLAMP: i32 = (MULTI_MAX - 3) as i32;

    pub struct LasGpsTimeCompressor {
        last_gps_time: i64,
        last_gps_time_diff: i32,
        multi_extreme_counter: u32,

        gps_time_multi_model: EncodeSymbolModel,
        gps_time_0diff_model: EncodeSymbolModel,
        ic_gps_time: IntegerCompressor,
    }

    impl Default for LasGpsTimeCompressor {
        fn default() -> Self {
            Self {
                last_gps_time: 0,
                last_gps_time_diff: 0,
                multi_extreme_counter: 0,
                gps_time_multi_model: EncodeSymbolModel::new(MULTI_MAX),
                gps_time_0diff_model: EncodeSymbolModel::new(3),
                ic_gps_time: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(6)
                    .build_initialized(),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasGpsTimeCompressor {
        fn size_of_field(&self) -> usize {
            std::mem::size_of::<i64>()
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.last_gps_time = GpsTime::unpack_from(buf).value;
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let this_val = GpsTime::unpack_from(buf).value;

            if self.last_gps_time_diff == 0 {
                // the last integer difference was zero
                if this_val == self.last_gps_time {
                    encoder.encode_symbol(&mut self.gps_time_0diff_model, 0)?;
                } else {
                    let curr_diff_64 = this_val.wrapping_sub(self.last_gps_time);
                    let curr_diff_32 = curr_diff_64 as i32;
                    if i64::from(curr_diff_32) == curr_diff_64 {
                        // the difference can be represented with 32 bits
                        encoder.encode_symbol(&mut self.gps_time_0diff_model, 1)?;
                        self.ic_gps_time.compress(encoder, 0, curr_diff_32, 0)?;
                        self.last_gps_time_diff = curr_diff_32;
                    } else {
                        // the difference is huge
                        encoder.encode_symbol(&mut self.gps_time_0diff_model, 2)?;
                        encoder.write_int64(this_val as u64)?;
                    }
                    self.last_gps_time = this_val;
                }
            } else {
                // the last integer difference was *not* zero
                if this_val == self.last_gps_time {
                    encoder.encode_symbol(&mut self.gps_time_multi_model, MULTI_UNCHANGED)?;
                } else {
                    let curr_diff_64 = this_val.wrapping_sub(self.last_gps_time);
                    let curr_diff_32 = curr_diff_64 as i32;

                    if i64::from(curr_diff_32) == curr_diff_64 {
                        // the multiplier between the current and the last
                        // integer difference, in single precision
                        let mut multi = (curr_diff_32 as f32 / self.last_gps_time_diff as f32
                            + 0.5f32) as i32;
                        if multi >= MULTI_CLAMP {
                            multi = MULTI_CLAMP;
                        } else if multi <= 0 {
                            multi = 0;
                        }
                        encoder.encode_symbol(&mut self.gps_time_multi_model, multi as u32)?;

                        if multi == 1 {
                            // the case we expect most often
                            self.ic_gps_time.compress(
                                encoder,
                                self.last_gps_time_diff,
                                curr_diff_32,
                                1,
                            )?;
                            self.last_gps_time_diff = curr_diff_32;
                            self.multi_extreme_counter = 0;
                        } else if multi == 0 {
                            self.ic_gps_time.compress(
                                encoder,
                                self.last_gps_time_diff / 4,
                                curr_diff_32,
                                2,
                            )?;
                            self.multi_extreme_counter += 1;
                            if self.multi_extreme_counter > 3 {
                                self.last_gps_time_diff = curr_diff_32;
                                self.multi_extreme_counter = 0;
                            }
                        } else if multi < 10 {
                            self.ic_gps_time.compress(
                                encoder,
                                multi.wrapping_mul(self.last_gps_time_diff),
                                curr_diff_32,
                                3,
                            )?;
                        } else if multi < 50 {
                            self.ic_gps_time.compress(
                                encoder,
                                multi.wrapping_mul(self.last_gps_time_diff),
                                curr_diff_32,
                                4,
                            )?;
                        } else {
                            self.ic_gps_time.compress(
                                encoder,
                                multi.wrapping_mul(self.last_gps_time_diff),
                                curr_diff_32,
                                5,
                            )?;
                            if multi == MULTI_CLAMP {
                                self.multi_extreme_counter += 1;
                                if self.multi_extreme_counter > 3 {
                                    self.last_gps_time_diff = curr_diff_32;
                                    self.multi_extreme_counter = 0;
                                }
                            }
                        }
                    } else {
                        // the difference is huge
                        encoder.encode_symbol(&mut self.gps_time_multi_model, MULTI_FULL)?;
                        encoder.write_int64(this_val as u64)?;
                    }
                    self.last_gps_time = this_val;
                }
            }
            Ok(())
        }
    }

    pub struct LasGpsTimeDecompressor {
        last_gps_time: i64,
        last_gps_time_diff: i32,
        multi_extreme_counter: u32,

        gps_time_multi_model: DecodeSymbolModel,
        gps_time_0diff_model: DecodeSymbolModel,
        ic_gps_time: IntegerDecompressor,
    }

    impl Default for LasGpsTimeDecompressor {
        fn default() -> Self {
            Self {
                last_gps_time: 0,
                last_gps_time_diff: 0,
                multi_extreme_counter: 0,
                gps_time_multi_model: DecodeSymbolModel::new(MULTI_MAX),
                gps_time_0diff_model: DecodeSymbolModel::new(3),
                ic_gps_time: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(6)
                    .build_initialized(),
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasGpsTimeDecompressor {
        fn size_of_field(&self) -> usize {
            std::mem::size_of::<i64>()
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            self.last_gps_time = read_and_unpack::<_, GpsTime>(src, first_point)?.value;
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            if self.last_gps_time_diff == 0 {
                match decoder.decode_symbol(&mut self.gps_time_0diff_model)? {
                    0 => {}
                    1 => {
                        let diff = self.ic_gps_time.decompress(decoder, 0, 0)?;
                        self.last_gps_time_diff = diff;
                        self.last_gps_time = self.last_gps_time.wrapping_add(i64::from(diff));
                    }
                    _ => {
                        self.last_gps_time = decoder.read_int_64()? as i64;
                    }
                }
            } else {
                let multi = decoder.decode_symbol(&mut self.gps_time_multi_model)?;
                if multi == MULTI_UNCHANGED {
                    // stamp identical to the previous one
                } else if multi == MULTI_FULL {
                    self.last_gps_time = decoder.read_int_64()? as i64;
                } else {
                    let multi = multi as i32;
                    let diff;
                    if multi == 1 {
                        diff = self
                            .ic_gps_time
                            .decompress(decoder, self.last_gps_time_diff, 1)?;
                        self.last_gps_time_diff = diff;
                        self.multi_extreme_counter = 0;
                    } else if multi == 0 {
                        diff = self
                            .ic_gps_time
                            .decompress(decoder, self.last_gps_time_diff / 4, 2)?;
                        self.multi_extreme_counter += 1;
                        if self.multi_extreme_counter > 3 {
                            self.last_gps_time_diff = diff;
                            self.multi_extreme_counter = 0;
                        }
                    } else if multi < 10 {
                        diff = self.ic_gps_time.decompress(
                            decoder,
                            multi.wrapping_mul(self.last_gps_time_diff),
                            3,
                        )?;
                    } else if multi < 50 {
                        diff = self.ic_gps_time.decompress(
                            decoder,
                            multi.wrapping_mul(self.last_gps_time_diff),
                            4,
                        )?;
                    } else {
                        diff = self.ic_gps_time.decompress(
                            decoder,
                            multi.wrapping_mul(self.last_gps_time_diff),
                            5,
                        )?;
                        if multi == MULTI_CLAMP {
                            self.multi_extreme_counter += 1;
                            if self.multi_extreme_counter > 3 {
                                self.last_gps_time_diff = diff;
                                self.multi_extreme_counter = 0;
                            }
                        }
                    }
                    self.last_gps_time = self.last_gps_time.wrapping_add(i64::from(diff));
                }
            }

            GpsTime {
                value: self.last_gps_time,
            }
            .pack_into(buf);
            Ok(())
        }
    }
}

pub mod v2 {
    //! Version 2 of the GPS time compression.
    //!
    //! Keeps four interleaved time sequences so that alternating streams
    //! (multiple beams, sorted returns) each get their own difference
    //! predictor; negative multipliers down to -10 are coded directly.
    use std::io::{Read, Write};

    use crate::compressors::{IntegerCompressor, IntegerCompressorBuilder};
    use crate::decoders::ArithmeticDecoder;
    use crate::decompressors::{IntegerDecompressor, IntegerDecompressorBuilder};
    use crate::encoders::ArithmeticEncoder;
    use crate::las::utils::{i32_quantize, read_and_unpack};
    use crate::models::{DecodeSymbolModel, EncodeSymbolModel};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::GpsTime;

    const MULTI: i32 = 500;
    const MULTI_MINUS: i32 = -10;
    const MULTI_UNCHANGED: i32 = MULTI - MULTI_MINUS + 1;
    const MULTI_CODE_FULL: i32 = MULTI - MULTI_MINUS + 2;
    const MULTI_TOTAL: i32 = MULTI - MULTI_MINUS + 6;

    struct Sequences {
        last: usize,
        next: usize,
        last_gps_times: [i64; 4],
        last_gps_time_diffs: [i32; 4],
        multi_extreme_counters: [i32; 4],
    }

    impl Sequences {
        fn new() -> Self {
            Self {
                last: 0,
                next: 0,
                last_gps_times: [0i64; 4],
                last_gps_time_diffs: [0i32; 4],
                multi_extreme_counters: [0i32; 4],
            }
        }
    }

    pub struct LasGpsTimeCompressor {
        seqs: Sequences,
        gps_time_multi_model: EncodeSymbolModel,
        gps_time_0diff_model: EncodeSymbolModel,
        ic_gps_time: IntegerCompressor,
    }

    impl Default for LasGpsTimeCompressor {
        fn default() -> Self {
            Self {
                seqs: Sequences::new(),
                gps_time_multi_model: EncodeSymbolModel::new(MULTI_TOTAL as u32),
                gps_time_0diff_model: EncodeSymbolModel::new(6),
                ic_gps_time: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(9)
                    .build_initialized(),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasGpsTimeCompressor {
        fn size_of_field(&self) -> usize {
            std::mem::size_of::<i64>()
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.seqs.last_gps_times[0] = GpsTime::unpack_from(buf).value;
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let this_val = GpsTime::unpack_from(buf).value;
            let seqs = &mut self.seqs;

            if seqs.last_gps_time_diffs[seqs.last] == 0 {
                // the last integer difference was zero
                if this_val == seqs.last_gps_times[seqs.last] {
                    encoder.encode_symbol(&mut self.gps_time_0diff_model, 0)?;
                } else {
                    let curr_diff_64 = this_val.wrapping_sub(seqs.last_gps_times[seqs.last]);
                    let curr_diff_32 = curr_diff_64 as i32;

                    if i64::from(curr_diff_32) == curr_diff_64 {
                        // the difference can be represented with 32 bits
                        encoder.encode_symbol(&mut self.gps_time_0diff_model, 1)?;
                        self.ic_gps_time.compress(encoder, 0, curr_diff_32, 0)?;
                        seqs.last_gps_time_diffs[seqs.last] = curr_diff_32;
                        seqs.multi_extreme_counters[seqs.last] = 0;
                    } else {
                        // maybe the stamp belongs to another sequence
                        for i in 1..4usize {
                            let other_diff_64 = this_val
                                .wrapping_sub(seqs.last_gps_times[(seqs.last + i) & 3]);
                            if i64::from(other_diff_64 as i32) == other_diff_64 {
                                encoder.encode_symbol(
                                    &mut self.gps_time_0diff_model,
                                    (i + 2) as u32,
                                )?;
                                seqs.last = (seqs.last + i) & 3;
                                return self.compress_with(encoder, buf);
                            }
                        }
                        // no luck, start a new sequence
                        encoder.encode_symbol(&mut self.gps_time_0diff_model, 2)?;
                        self.ic_gps_time.compress(
                            encoder,
                            (seqs.last_gps_times[seqs.last] >> 32) as i32,
                            (this_val >> 32) as i32,
                            8,
                        )?;
                        encoder.write_int(this_val as u32)?;

                        seqs.next = (seqs.next + 1) & 3;
                        seqs.last = seqs.next;
                        seqs.last_gps_time_diffs[seqs.last] = 0;
                        seqs.multi_extreme_counters[seqs.last] = 0;
                    }
                    seqs.last_gps_times[seqs.last] = this_val;
                }
            } else {
                // the last integer difference was *not* zero
                if this_val == seqs.last_gps_times[seqs.last] {
                    encoder
                        .encode_symbol(&mut self.gps_time_multi_model, MULTI_UNCHANGED as u32)?;
                } else {
                    let curr_diff_64 = this_val.wrapping_sub(seqs.last_gps_times[seqs.last]);
                    let curr_diff_32 = curr_diff_64 as i32;

                    if i64::from(curr_diff_32) == curr_diff_64 {
                        // the multiplier between the current and the last
                        // integer difference, in single precision
                        let multi = i32_quantize(
                            curr_diff_32 as f32 / seqs.last_gps_time_diffs[seqs.last] as f32,
                        );

                        if multi == 1 {
                            // the case we expect most often for regularly
                            // spaced pulses
                            encoder.encode_symbol(&mut self.gps_time_multi_model, 1)?;
                            self.ic_gps_time.compress(
                                encoder,
                                seqs.last_gps_time_diffs[seqs.last],
                                curr_diff_32,
                                1,
                            )?;
                            seqs.last_gps_time_diffs[seqs.last] = curr_diff_32;
                            seqs.multi_extreme_counters[seqs.last] = 0;
                        } else if multi > 0 {
                            if multi < MULTI {
                                encoder.encode_symbol(
                                    &mut self.gps_time_multi_model,
                                    multi as u32,
                                )?;
                                let context = if multi < 10 { 2 } else { 3 };
                                self.ic_gps_time.compress(
                                    encoder,
                                    multi.wrapping_mul(seqs.last_gps_time_diffs[seqs.last]),
                                    curr_diff_32,
                                    context,
                                )?;
                            } else {
                                encoder
                                    .encode_symbol(&mut self.gps_time_multi_model, MULTI as u32)?;
                                self.ic_gps_time.compress(
                                    encoder,
                                    MULTI.wrapping_mul(seqs.last_gps_time_diffs[seqs.last]),
                                    curr_diff_32,
                                    4,
                                )?;
                                seqs.multi_extreme_counters[seqs.last] += 1;
                                if seqs.multi_extreme_counters[seqs.last] > 3 {
                                    seqs.last_gps_time_diffs[seqs.last] = curr_diff_32;
                                    seqs.multi_extreme_counters[seqs.last] = 0;
                                }
                            }
                        } else if multi < 0 {
                            if multi > MULTI_MINUS {
                                encoder.encode_symbol(
                                    &mut self.gps_time_multi_model,
                                    (MULTI - multi) as u32,
                                )?;
                                self.ic_gps_time.compress(
                                    encoder,
                                    multi.wrapping_mul(seqs.last_gps_time_diffs[seqs.last]),
                                    curr_diff_32,
                                    5,
                                )?;
                            } else {
                                encoder.encode_symbol(
                                    &mut self.gps_time_multi_model,
                                    (MULTI - MULTI_MINUS) as u32,
                                )?;
                                self.ic_gps_time.compress(
                                    encoder,
                                    MULTI_MINUS.wrapping_mul(seqs.last_gps_time_diffs[seqs.last]),
                                    curr_diff_32,
                                    6,
                                )?;
                                seqs.multi_extreme_counters[seqs.last] += 1;
                                if seqs.multi_extreme_counters[seqs.last] > 3 {
                                    seqs.last_gps_time_diffs[seqs.last] = curr_diff_32;
                                    seqs.multi_extreme_counters[seqs.last] = 0;
                                }
                            }
                        } else {
                            encoder.encode_symbol(&mut self.gps_time_multi_model, 0)?;
                            self.ic_gps_time.compress(encoder, 0, curr_diff_32, 7)?;
                            seqs.multi_extreme_counters[seqs.last] += 1;
                            if seqs.multi_extreme_counters[seqs.last] > 3 {
                                seqs.last_gps_time_diffs[seqs.last] = curr_diff_32;
                                seqs.multi_extreme_counters[seqs.last] = 0;
                            }
                        }
                    } else {
                        // maybe the stamp belongs to another sequence
                        for i in 1..4usize {
                            let other_diff_64 = this_val
                                .wrapping_sub(seqs.last_gps_times[(seqs.last + i) & 3]);
                            if i64::from(other_diff_64 as i32) == other_diff_64 {
                                encoder.encode_symbol(
                                    &mut self.gps_time_multi_model,
                                    (MULTI_CODE_FULL as usize + i) as u32,
                                )?;
                                seqs.last = (seqs.last + i) & 3;
                                return self.compress_with(encoder, buf);
                            }
                        }
                        // no luck, start a new sequence
                        encoder
                            .encode_symbol(&mut self.gps_time_multi_model, MULTI_CODE_FULL as u32)?;
                        self.ic_gps_time.compress(
                            encoder,
                            (seqs.last_gps_times[seqs.last] >> 32) as i32,
                            (this_val >> 32) as i32,
                            8,
                        )?;
                        encoder.write_int(this_val as u32)?;

                        seqs.next = (seqs.next + 1) & 3;
                        seqs.last = seqs.next;
                        seqs.last_gps_time_diffs[seqs.last] = 0;
                        seqs.multi_extreme_counters[seqs.last] = 0;
                    }
                    seqs.last_gps_times[seqs.last] = this_val;
                }
            }
            Ok(())
        }
    }

    pub struct LasGpsTimeDecompressor {
        seqs: Sequences,
        gps_time_multi_model: DecodeSymbolModel,
        gps_time_0diff_model: DecodeSymbolModel,
        ic_gps_time: IntegerDecompressor,
    }

    impl Default for LasGpsTimeDecompressor {
        fn default() -> Self {
            Self {
                seqs: Sequences::new(),
                gps_time_multi_model: DecodeSymbolModel::new(MULTI_TOTAL as u32),
                gps_time_0diff_model: DecodeSymbolModel::new(6),
                ic_gps_time: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(9)
                    .build_initialized(),
            }
        }
    }

    impl LasGpsTimeDecompressor {
        fn decompress_gps_time<R: Read>(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
        ) -> std::io::Result<()> {
            let seqs = &mut self.seqs;

            if seqs.last_gps_time_diffs[seqs.last] == 0 {
                // the last integer difference was zero
                let multi = decoder.decode_symbol(&mut self.gps_time_0diff_model)? as i32;
                if multi == 1 {
                    // the difference can be represented with 32 bits
                    let diff = self.ic_gps_time.decompress(decoder, 0, 0)?;
                    seqs.last_gps_time_diffs[seqs.last] = diff;
                    seqs.last_gps_times[seqs.last] =
                        seqs.last_gps_times[seqs.last].wrapping_add(i64::from(diff));
                    seqs.multi_extreme_counters[seqs.last] = 0;
                } else if multi == 2 {
                    // a new sequence starts with a raw stamp
                    let upper = self.ic_gps_time.decompress(
                        decoder,
                        (seqs.last_gps_times[seqs.last] >> 32) as i32,
                        8,
                    )?;
                    seqs.next = (seqs.next + 1) & 3;
                    seqs.last_gps_times[seqs.next] =
                        i64::from(upper) << 32 | i64::from(decoder.read_int()?);
                    seqs.last = seqs.next;
                    seqs.last_gps_time_diffs[seqs.last] = 0;
                    seqs.multi_extreme_counters[seqs.last] = 0;
                } else if multi > 2 {
                    // switch to another sequence
                    seqs.last = (seqs.last + multi as usize - 2) & 3;
                    return self.decompress_gps_time(decoder);
                }
            } else {
                let mut multi = decoder.decode_symbol(&mut self.gps_time_multi_model)? as i32;

                if multi == 1 {
                    let diff = self
                        .ic_gps_time
                        .decompress(decoder, seqs.last_gps_time_diffs[seqs.last], 1)?;
                    seqs.last_gps_times[seqs.last] =
                        seqs.last_gps_times[seqs.last].wrapping_add(i64::from(diff));
                    seqs.last_gps_time_diffs[seqs.last] = diff;
                    seqs.multi_extreme_counters[seqs.last] = 0;
                } else if multi < MULTI_UNCHANGED {
                    let diff;
                    if multi == 0 {
                        diff = self.ic_gps_time.decompress(decoder, 0, 7)?;
                        seqs.multi_extreme_counters[seqs.last] += 1;
                        if seqs.multi_extreme_counters[seqs.last] > 3 {
                            seqs.last_gps_time_diffs[seqs.last] = diff;
                            seqs.multi_extreme_counters[seqs.last] = 0;
                        }
                    } else if multi < MULTI {
                        let context = if multi < 10 { 2 } else { 3 };
                        diff = self.ic_gps_time.decompress(
                            decoder,
                            multi.wrapping_mul(seqs.last_gps_time_diffs[seqs.last]),
                            context,
                        )?;
                    } else if multi == MULTI {
                        diff = self.ic_gps_time.decompress(
                            decoder,
                            MULTI.wrapping_mul(seqs.last_gps_time_diffs[seqs.last]),
                            4,
                        )?;
                        seqs.multi_extreme_counters[seqs.last] += 1;
                        if seqs.multi_extreme_counters[seqs.last] > 3 {
                            seqs.last_gps_time_diffs[seqs.last] = diff;
                            seqs.multi_extreme_counters[seqs.last] = 0;
                        }
                    } else {
                        multi = MULTI - multi;
                        if multi > MULTI_MINUS {
                            diff = self.ic_gps_time.decompress(
                                decoder,
                                multi.wrapping_mul(seqs.last_gps_time_diffs[seqs.last]),
                                5,
                            )?;
                        } else {
                            diff = self.ic_gps_time.decompress(
                                decoder,
                                MULTI_MINUS.wrapping_mul(seqs.last_gps_time_diffs[seqs.last]),
                                6,
                            )?;
                            seqs.multi_extreme_counters[seqs.last] += 1;
                            if seqs.multi_extreme_counters[seqs.last] > 3 {
                                seqs.last_gps_time_diffs[seqs.last] = diff;
                                seqs.multi_extreme_counters[seqs.last] = 0;
                            }
                        }
                    }
                    seqs.last_gps_times[seqs.last] =
                        seqs.last_gps_times[seqs.last].wrapping_add(i64::from(diff));
                } else if multi == MULTI_CODE_FULL {
                    // a new sequence starts with a raw stamp
                    let upper = self.ic_gps_time.decompress(
                        decoder,
                        (seqs.last_gps_times[seqs.last] >> 32) as i32,
                        8,
                    )?;
                    seqs.next = (seqs.next + 1) & 3;
                    seqs.last_gps_times[seqs.next] =
                        i64::from(upper) << 32 | i64::from(decoder.read_int()?);
                    seqs.last = seqs.next;
                    seqs.last_gps_time_diffs[seqs.last] = 0;
                    seqs.multi_extreme_counters[seqs.last] = 0;
                } else if multi > MULTI_CODE_FULL {
                    // switch to another sequence
                    seqs.last = (seqs.last + (multi - MULTI_CODE_FULL) as usize) & 3;
                    return self.decompress_gps_time(decoder);
                }
                // multi == MULTI_UNCHANGED: stamp identical to the previous one
            }
            Ok(())
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasGpsTimeDecompressor {
        fn size_of_field(&self) -> usize {
            std::mem::size_of::<i64>()
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            self.seqs.last_gps_times[0] = read_and_unpack::<_, GpsTime>(src, first_point)?.value;
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            self.decompress_gps_time(decoder)?;
            GpsTime {
                value: self.seqs.last_gps_times[self.seqs.last],
            }
            .pack_into(buf);
            Ok(())
        }
    }
}
