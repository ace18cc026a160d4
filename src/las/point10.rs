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

//! The 20-byte core point record and its compressors / decompressors.

use crate::packers::Packable;

/// The core fields every LAS 1.0 - 1.3 point record starts with.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
pub struct Point10 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub intensity: u16,

    // 3 bits
    pub return_number: u8,
    // 3 bits
    pub number_of_returns_of_given_pulse: u8,
    // 1 bit
    pub scan_direction_flag: bool,
    // 1 bit
    pub edge_of_flight_line: bool,

    // 5 bits of classification, the rest are bit flags
    pub classification: u8,

    pub scan_angle_rank: i8,
    pub user_data: u8,
    pub point_source_id: u16,
}

impl Point10 {
    pub const SIZE: usize = 20;

    pub fn populate_bit_fields_from(&mut self, byte: u8) {
        self.return_number = byte & 0x7;
        self.number_of_returns_of_given_pulse = (byte >> 3) & 0x7;
        self.scan_direction_flag = ((byte >> 6) & 0x1) != 0;
        self.edge_of_flight_line = ((byte >> 7) & 0x1) != 0;
    }

    pub fn bit_fields_to_byte(&self) -> u8 {
        let a = self.return_number;
        let b = self.number_of_returns_of_given_pulse;
        let c = self.scan_direction_flag as u8;
        let d = self.edge_of_flight_line as u8;

        (d & 0x1) << 7 | (c & 0x1) << 6 | (b & 0x7) << 3 | (a & 0x7)
    }
}

impl Packable for Point10 {
    fn unpack_from(input: &[u8]) -> Self {
        assert!(
            input.len() >= Self::SIZE,
            "Point10::unpack_from expected a buffer of 20 bytes"
        );
        let mut point = Self {
            x: i32::unpack_from(&input[0..4]),
            y: i32::unpack_from(&input[4..8]),
            z: i32::unpack_from(&input[8..12]),
            intensity: u16::unpack_from(&input[12..14]),
            classification: input[15],
            scan_angle_rank: input[16] as i8,
            user_data: input[17],
            point_source_id: u16::unpack_from(&input[18..20]),
            ..Default::default()
        };
        point.populate_bit_fields_from(input[14]);
        point
    }

    fn pack_into(&self, output: &mut [u8]) {
        assert!(
            output.len() >= Self::SIZE,
            "Point10::pack_into expected a buffer of 20 bytes"
        );
        self.x.pack_into(&mut output[0..4]);
        self.y.pack_into(&mut output[4..8]);
        self.z.pack_into(&mut output[8..12]);
        self.intensity.pack_into(&mut output[12..14]);
        output[14] = self.bit_fields_to_byte();
        output[15] = self.classification;
        output[16] = self.scan_angle_rank as u8;
        output[17] = self.user_data;
        self.point_source_id.pack_into(&mut output[18..20]);
    }
}

/// find median difference from 3 preceding differences
fn median_diff(diffs: &[i32; 3]) -> i32 {
    if diffs[0] < diffs[1] {
        if diffs[1] < diffs[2] {
            diffs[1]
        } else if diffs[0] < diffs[2] {
            diffs[2]
        } else {
            diffs[0]
        }
    } else if diffs[0] < diffs[2] {
        diffs[0]
    } else if diffs[1] < diffs[2] {
        diffs[2]
    } else {
        diffs[1]
    }
}

pub mod v1 {
    //! Version 1 of the point record compression.
    //!
    //! x and y diffs are predicted by the median of the three most recent
    //! diffs recorded for the current scan direction; the diff rings are
    //! only fed while the scan direction holds steady.
    use std::io::{Read, Write};

    use crate::compressors::{IntegerCompressor, IntegerCompressorBuilder};
    use crate::decoders::ArithmeticDecoder;
    use crate::decompressors::{IntegerDecompressor, IntegerDecompressorBuilder};
    use crate::encoders::ArithmeticEncoder;
    use crate::models::{DecodeSymbolModel, EncodeSymbolModel};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::{median_diff, Point10};

    fn changed_values_of(current: &Point10, last: &Point10) -> u8 {
        ((last.intensity != current.intensity) as u8) << 5
            | ((last.bit_fields_to_byte() != current.bit_fields_to_byte()) as u8) << 4
            | ((last.classification != current.classification) as u8) << 3
            | ((last.scan_angle_rank != current.scan_angle_rank) as u8) << 2
            | ((last.user_data != current.user_data) as u8) << 1
            | (last.point_source_id != current.point_source_id) as u8
    }

    pub struct LasPoint10Compressor {
        last_point: Point10,
        last_dir: usize,
        last_x_diffs: [[i32; 3]; 2],
        last_y_diffs: [[i32; 3]; 2],
        last_incr: [usize; 2],

        ic_dx: IntegerCompressor,
        ic_dy: IntegerCompressor,
        ic_z: IntegerCompressor,
        ic_intensity: IntegerCompressor,
        ic_scan_angle_rank: IntegerCompressor,
        ic_point_source_id: IntegerCompressor,

        changed_values_model: EncodeSymbolModel,
        bit_byte_model: EncodeSymbolModel,
        classification_model: EncodeSymbolModel,
        user_data_model: EncodeSymbolModel,
    }

    impl Default for LasPoint10Compressor {
        fn default() -> Self {
            Self {
                last_point: Default::default(),
                last_dir: 0,
                last_x_diffs: [[0i32; 3]; 2],
                last_y_diffs: [[0i32; 3]; 2],
                last_incr: [0usize; 2],
                ic_dx: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(2)
                    .build_initialized(),
                ic_dy: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(33)
                    .build_initialized(),
                ic_z: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(33)
                    .build_initialized(),
                ic_intensity: IntegerCompressorBuilder::new().bits(16).build_initialized(),
                ic_scan_angle_rank: IntegerCompressorBuilder::new()
                    .bits(8)
                    .contexts(2)
                    .build_initialized(),
                ic_point_source_id: IntegerCompressorBuilder::new()
                    .bits(16)
                    .build_initialized(),
                changed_values_model: EncodeSymbolModel::new(64),
                bit_byte_model: EncodeSymbolModel::new(256),
                classification_model: EncodeSymbolModel::new(256),
                user_data_model: EncodeSymbolModel::new(256),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasPoint10Compressor {
        fn size_of_field(&self) -> usize {
            Point10::SIZE
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.last_point = Point10::unpack_from(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let current_point = Point10::unpack_from(buf);

            let median_x = median_diff(&self.last_x_diffs[self.last_dir]);
            let median_y = median_diff(&self.last_y_diffs[self.last_dir]);

            let x_diff = current_point.x.wrapping_sub(self.last_point.x);
            let y_diff = current_point.y.wrapping_sub(self.last_point.y);

            self.ic_dx
                .compress(encoder, median_x, x_diff, self.last_dir as u32)?;
            // the number of corrector bits k switches contexts downstream
            let k_x = self.ic_dx.k();
            self.ic_dy.compress(encoder, median_y, y_diff, k_x)?;

            let k_bits = (k_x + self.ic_dy.k()) / 2;
            self.ic_z
                .compress(encoder, self.last_point.z, current_point.z, k_bits)?;

            let changed_values = changed_values_of(&current_point, &self.last_point);
            encoder.encode_symbol(&mut self.changed_values_model, u32::from(changed_values))?;

            if (changed_values & 32) != 0 {
                self.ic_intensity.compress(
                    encoder,
                    i32::from(self.last_point.intensity),
                    i32::from(current_point.intensity),
                    0,
                )?;
            }
            if (changed_values & 16) != 0 {
                encoder.encode_symbol(
                    &mut self.bit_byte_model,
                    u32::from(current_point.bit_fields_to_byte()),
                )?;
            }
            if (changed_values & 8) != 0 {
                encoder.encode_symbol(
                    &mut self.classification_model,
                    u32::from(current_point.classification),
                )?;
            }
            if (changed_values & 4) != 0 {
                self.ic_scan_angle_rank.compress(
                    encoder,
                    i32::from(self.last_point.scan_angle_rank),
                    i32::from(current_point.scan_angle_rank),
                    (k_bits < 3) as u32,
                )?;
            }
            if (changed_values & 2) != 0 {
                encoder
                    .encode_symbol(&mut self.user_data_model, u32::from(current_point.user_data))?;
            }
            if (changed_values & 1) != 0 {
                self.ic_point_source_id.compress(
                    encoder,
                    i32::from(self.last_point.point_source_id),
                    i32::from(current_point.point_source_id),
                    0,
                )?;
            }

            // only record the difference if the scan direction has not changed
            if self.last_dir == current_point.scan_direction_flag as usize {
                let incr = self.last_incr[self.last_dir];
                self.last_x_diffs[self.last_dir][incr] = x_diff;
                self.last_y_diffs[self.last_dir][incr] = y_diff;
                self.last_incr[self.last_dir] += 1;
                if self.last_incr[self.last_dir] > 2 {
                    self.last_incr[self.last_dir] = 0;
                }
            } else {
                self.last_dir = current_point.scan_direction_flag as usize;
            }

            self.last_point = current_point;
            Ok(())
        }
    }

    pub struct LasPoint10Decompressor {
        last_point: Point10,
        last_dir: usize,
        last_x_diffs: [[i32; 3]; 2],
        last_y_diffs: [[i32; 3]; 2],
        last_incr: [usize; 2],

        ic_dx: IntegerDecompressor,
        ic_dy: IntegerDecompressor,
        ic_z: IntegerDecompressor,
        ic_intensity: IntegerDecompressor,
        ic_scan_angle_rank: IntegerDecompressor,
        ic_point_source_id: IntegerDecompressor,

        changed_values_model: DecodeSymbolModel,
        bit_byte_model: DecodeSymbolModel,
        classification_model: DecodeSymbolModel,
        user_data_model: DecodeSymbolModel,
    }

    impl Default for LasPoint10Decompressor {
        fn default() -> Self {
            Self {
                last_point: Default::default(),
                last_dir: 0,
                last_x_diffs: [[0i32; 3]; 2],
                last_y_diffs: [[0i32; 3]; 2],
                last_incr: [0usize; 2],
                ic_dx: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(2)
                    .build_initialized(),
                ic_dy: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(33)
                    .build_initialized(),
                ic_z: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(33)
                    .build_initialized(),
                ic_intensity: IntegerDecompressorBuilder::new()
                    .bits(16)
                    .build_initialized(),
                ic_scan_angle_rank: IntegerDecompressorBuilder::new()
                    .bits(8)
                    .contexts(2)
                    .build_initialized(),
                ic_point_source_id: IntegerDecompressorBuilder::new()
                    .bits(16)
                    .build_initialized(),
                changed_values_model: DecodeSymbolModel::new(64),
                bit_byte_model: DecodeSymbolModel::new(256),
                classification_model: DecodeSymbolModel::new(256),
                user_data_model: DecodeSymbolModel::new(256),
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasPoint10Decompressor {
        fn size_of_field(&self) -> usize {
            Point10::SIZE
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            src.read_exact(first_point)?;
            self.last_point = Point10::unpack_from(first_point);
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            let median_x = median_diff(&self.last_x_diffs[self.last_dir]);
            let median_y = median_diff(&self.last_y_diffs[self.last_dir]);

            let x_diff = self
                .ic_dx
                .decompress(decoder, median_x, self.last_dir as u32)?;
            self.last_point.x = self.last_point.x.wrapping_add(x_diff);
            let k_x = self.ic_dx.k();

            let y_diff = self.ic_dy.decompress(decoder, median_y, k_x)?;
            self.last_point.y = self.last_point.y.wrapping_add(y_diff);

            let k_bits = (k_x + self.ic_dy.k()) / 2;
            self.last_point.z = self.ic_z.decompress(decoder, self.last_point.z, k_bits)?;

            let changed_values = decoder.decode_symbol(&mut self.changed_values_model)? as u8;

            if (changed_values & 32) != 0 {
                self.last_point.intensity = self.ic_intensity.decompress(
                    decoder,
                    i32::from(self.last_point.intensity),
                    0,
                )? as u16;
            }
            if (changed_values & 16) != 0 {
                let byte = decoder.decode_symbol(&mut self.bit_byte_model)? as u8;
                self.last_point.populate_bit_fields_from(byte);
            }
            if (changed_values & 8) != 0 {
                self.last_point.classification =
                    decoder.decode_symbol(&mut self.classification_model)? as u8;
            }
            if (changed_values & 4) != 0 {
                self.last_point.scan_angle_rank = self.ic_scan_angle_rank.decompress(
                    decoder,
                    i32::from(self.last_point.scan_angle_rank),
                    (k_bits < 3) as u32,
                )? as i8;
            }
            if (changed_values & 2) != 0 {
                self.last_point.user_data = decoder.decode_symbol(&mut self.user_data_model)? as u8;
            }
            if (changed_values & 1) != 0 {
                self.last_point.point_source_id = self.ic_point_source_id.decompress(
                    decoder,
                    i32::from(self.last_point.point_source_id),
                    0,
                )? as u16;
            }

            // only record the difference if the scan direction has not changed
            if self.last_dir == self.last_point.scan_direction_flag as usize {
                let incr = self.last_incr[self.last_dir];
                self.last_x_diffs[self.last_dir][incr] = x_diff;
                self.last_y_diffs[self.last_dir][incr] = y_diff;
                self.last_incr[self.last_dir] += 1;
                if self.last_incr[self.last_dir] > 2 {
                    self.last_incr[self.last_dir] = 0;
                }
            } else {
                self.last_dir = self.last_point.scan_direction_flag as usize;
            }

            self.last_point.pack_into(buf);
            Ok(())
        }
    }

    #[cfg(test)]
    mod test {
        use super::median_diff;

        #[test]
        fn median_diff_test_1_elem() {
            let a = [1, 0, 0];
            assert_eq!(median_diff(&a), 0);

            let a = [-1, 0, 0];
            assert_eq!(median_diff(&a), 0);
        }

        #[test]
        fn median_diff_test_2_elem() {
            let a = [3, 1, 0];
            assert_eq!(median_diff(&a), 1);

            let a = [-3, 1, 0];
            assert_eq!(median_diff(&a), 0);
        }

        #[test]
        fn median_diff_test_3_elem() {
            let a = [3, 1, 4];
            assert_eq!(median_diff(&a), 3);

            let a = [-3, 1, -5];
            assert_eq!(median_diff(&a), -3);
        }
    }
}

pub mod v2 {
    //! Version 2 of the point record compression.
    //!
    //! Prediction is keyed by the return configuration: x/y diffs go
    //! through streaming medians per return-map context, z through the
    //! last height seen at the same penetration level, and the flag bit
    //! roles of the intensity and bit-fields are swapped relative to
    //! version 1.
    use std::io::{Read, Write};

    use crate::compressors::{IntegerCompressor, IntegerCompressorBuilder};
    use crate::decoders::ArithmeticDecoder;
    use crate::decompressors::{IntegerDecompressor, IntegerDecompressorBuilder};
    use crate::encoders::ArithmeticEncoder;
    use crate::las::utils::{
        u32_zero_bit, StreamingMedian, NUMBER_RETURN_LEVEL, NUMBER_RETURN_MAP,
    };
    use crate::models::{DecodeSymbolModel, EncodeSymbolModel};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::Point10;

    fn changed_values_of(current: &Point10, last: &Point10, last_intensity: u16) -> u8 {
        ((last.bit_fields_to_byte() != current.bit_fields_to_byte()) as u8) << 5
            | ((last_intensity != current.intensity) as u8) << 4
            | ((last.classification != current.classification) as u8) << 3
            | ((last.scan_angle_rank != current.scan_angle_rank) as u8) << 2
            | ((last.user_data != current.user_data) as u8) << 1
            | (last.point_source_id != current.point_source_id) as u8
    }

    /// Predictor state both sides carry.
    struct Predictors {
        last_intensity: [u16; 16],
        last_x_diff_median: [StreamingMedian<i32>; 16],
        last_y_diff_median: [StreamingMedian<i32>; 16],
        last_height: [i32; 8],
    }

    impl Predictors {
        fn new() -> Self {
            Self {
                last_intensity: [0u16; 16],
                last_x_diff_median: [StreamingMedian::<i32>::new(); 16],
                last_y_diff_median: [StreamingMedian::<i32>::new(); 16],
                last_height: [0i32; 8],
            }
        }
    }

    /// The symbol models both sides carry, in either flavour.
    struct Models<M> {
        changed_values: M,
        // 2 models
        scan_angle_rank: Vec<M>,
        // 256 models each, keyed by the previous byte value
        bit_byte: Vec<M>,
        classification: Vec<M>,
        user_data: Vec<M>,
    }

    impl<M> Models<M> {
        fn build(new_model: impl Fn(u32) -> M) -> Self {
            Self {
                changed_values: new_model(64),
                scan_angle_rank: (0..2).map(|_| new_model(256)).collect(),
                bit_byte: (0..256).map(|_| new_model(256)).collect(),
                classification: (0..256).map(|_| new_model(256)).collect(),
                user_data: (0..256).map(|_| new_model(256)).collect(),
            }
        }
    }

    pub struct LasPoint10Compressor {
        last_point: Point10,
        ic_intensity: IntegerCompressor,
        ic_point_source_id: IntegerCompressor,
        ic_dx: IntegerCompressor,
        ic_dy: IntegerCompressor,
        ic_z: IntegerCompressor,
        predictors: Predictors,
        models: Models<EncodeSymbolModel>,
    }

    impl Default for LasPoint10Compressor {
        fn default() -> Self {
            Self {
                last_point: Default::default(),
                ic_intensity: IntegerCompressorBuilder::new()
                    .bits(16)
                    .contexts(4)
                    .build_initialized(),
                ic_point_source_id: IntegerCompressorBuilder::new()
                    .bits(16)
                    .build_initialized(),
                ic_dx: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(2)
                    .build_initialized(),
                ic_dy: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(22)
                    .build_initialized(),
                ic_z: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(20)
                    .build_initialized(),
                predictors: Predictors::new(),
                models: Models::build(EncodeSymbolModel::new),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasPoint10Compressor {
        fn size_of_field(&self) -> usize {
            Point10::SIZE
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.last_point = Point10::unpack_from(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let current_point = Point10::unpack_from(buf);
            let r = current_point.return_number;
            let n = current_point.number_of_returns_of_given_pulse;
            let m = NUMBER_RETURN_MAP[n as usize][r as usize] as usize;
            let l = NUMBER_RETURN_LEVEL[n as usize][r as usize] as usize;

            let changed_values = changed_values_of(
                &current_point,
                &self.last_point,
                self.predictors.last_intensity[m],
            );
            encoder.encode_symbol(&mut self.models.changed_values, u32::from(changed_values))?;

            if (changed_values & 32) != 0 {
                let last_byte = self.last_point.bit_fields_to_byte();
                encoder.encode_symbol(
                    &mut self.models.bit_byte[last_byte as usize],
                    u32::from(current_point.bit_fields_to_byte()),
                )?;
            }
            if (changed_values & 16) != 0 {
                self.ic_intensity.compress(
                    encoder,
                    i32::from(self.predictors.last_intensity[m]),
                    i32::from(current_point.intensity),
                    if m < 3 { m as u32 } else { 3 },
                )?;
                self.predictors.last_intensity[m] = current_point.intensity;
            }
            if (changed_values & 8) != 0 {
                encoder.encode_symbol(
                    &mut self.models.classification[self.last_point.classification as usize],
                    u32::from(current_point.classification),
                )?;
            }
            if (changed_values & 4) != 0 {
                // the "as u8" before "as u32" is vital
                encoder.encode_symbol(
                    &mut self.models.scan_angle_rank[current_point.scan_direction_flag as usize],
                    current_point
                        .scan_angle_rank
                        .wrapping_sub(self.last_point.scan_angle_rank) as u8
                        as u32,
                )?;
            }
            if (changed_values & 2) != 0 {
                encoder.encode_symbol(
                    &mut self.models.user_data[self.last_point.user_data as usize],
                    u32::from(current_point.user_data),
                )?;
            }
            if (changed_values & 1) != 0 {
                self.ic_point_source_id.compress(
                    encoder,
                    i32::from(self.last_point.point_source_id),
                    i32::from(current_point.point_source_id),
                    0,
                )?;
            }

            // compress x coordinate
            let median = self.predictors.last_x_diff_median[m].get();
            let diff = current_point.x.wrapping_sub(self.last_point.x);
            self.ic_dx.compress(encoder, median, diff, (n == 1) as u32)?;
            self.predictors.last_x_diff_median[m].add(diff);

            // compress y coordinate
            let k_bits = self.ic_dx.k();
            let median = self.predictors.last_y_diff_median[m].get();
            let diff = current_point.y.wrapping_sub(self.last_point.y);
            let context = (n == 1) as u32
                + if k_bits < 20 {
                    u32_zero_bit(k_bits)
                } else {
                    20
                };
            self.ic_dy.compress(encoder, median, diff, context)?;
            self.predictors.last_y_diff_median[m].add(diff);

            // compress z coordinate
            let k_bits = (self.ic_dx.k() + self.ic_dy.k()) / 2;
            let context = (n == 1) as u32
                + if k_bits < 18 {
                    u32_zero_bit(k_bits)
                } else {
                    18
                };
            self.ic_z.compress(
                encoder,
                self.predictors.last_height[l],
                current_point.z,
                context,
            )?;
            self.predictors.last_height[l] = current_point.z;

            self.last_point = current_point;
            Ok(())
        }
    }

    pub struct LasPoint10Decompressor {
        last_point: Point10,
        ic_intensity: IntegerDecompressor,
        ic_point_source_id: IntegerDecompressor,
        ic_dx: IntegerDecompressor,
        ic_dy: IntegerDecompressor,
        ic_z: IntegerDecompressor,
        predictors: Predictors,
        models: Models<DecodeSymbolModel>,
    }

    impl Default for LasPoint10Decompressor {
        fn default() -> Self {
            Self {
                last_point: Default::default(),
                ic_intensity: IntegerDecompressorBuilder::new()
                    .bits(16)
                    .contexts(4)
                    .build_initialized(),
                ic_point_source_id: IntegerDecompressorBuilder::new()
                    .bits(16)
                    .build_initialized(),
                ic_dx: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(2)
                    .build_initialized(),
                ic_dy: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(22)
                    .build_initialized(),
                ic_z: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(20)
                    .build_initialized(),
                predictors: Predictors::new(),
                models: Models::build(DecodeSymbolModel::new),
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasPoint10Decompressor {
        fn size_of_field(&self) -> usize {
            Point10::SIZE
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            src.read_exact(first_point)?;
            self.last_point = Point10::unpack_from(first_point);
            self.last_point.intensity = 0;
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            let changed_values = decoder.decode_symbol(&mut self.models.changed_values)? as u8;

            if (changed_values & 32) != 0 {
                let last_byte = self.last_point.bit_fields_to_byte();
                let byte =
                    decoder.decode_symbol(&mut self.models.bit_byte[last_byte as usize])? as u8;
                self.last_point.populate_bit_fields_from(byte);
            }

            let r = self.last_point.return_number;
            let n = self.last_point.number_of_returns_of_given_pulse;
            let m = NUMBER_RETURN_MAP[n as usize][r as usize] as usize;
            let l = NUMBER_RETURN_LEVEL[n as usize][r as usize] as usize;

            if changed_values != 0 {
                if (changed_values & 16) != 0 {
                    self.last_point.intensity = self.ic_intensity.decompress(
                        decoder,
                        i32::from(self.predictors.last_intensity[m]),
                        if m < 3 { m as u32 } else { 3 },
                    )? as u16;
                    self.predictors.last_intensity[m] = self.last_point.intensity;
                } else {
                    self.last_point.intensity = self.predictors.last_intensity[m];
                }

                if (changed_values & 8) != 0 {
                    self.last_point.classification = decoder.decode_symbol(
                        &mut self.models.classification[self.last_point.classification as usize],
                    )? as u8;
                }
                if (changed_values & 4) != 0 {
                    let diff = decoder.decode_symbol(
                        &mut self.models.scan_angle_rank
                            [self.last_point.scan_direction_flag as usize],
                    )? as i8;
                    self.last_point.scan_angle_rank =
                        self.last_point.scan_angle_rank.wrapping_add(diff);
                }
                if (changed_values & 2) != 0 {
                    self.last_point.user_data = decoder.decode_symbol(
                        &mut self.models.user_data[self.last_point.user_data as usize],
                    )? as u8;
                }
                if (changed_values & 1) != 0 {
                    self.last_point.point_source_id = self.ic_point_source_id.decompress(
                        decoder,
                        i32::from(self.last_point.point_source_id),
                        0,
                    )? as u16;
                }
            }

            // decompress x coordinate
            let median = self.predictors.last_x_diff_median[m].get();
            let diff = self.ic_dx.decompress(decoder, median, (n == 1) as u32)?;
            self.last_point.x = self.last_point.x.wrapping_add(diff);
            self.predictors.last_x_diff_median[m].add(diff);

            // decompress y coordinate
            let median = self.predictors.last_y_diff_median[m].get();
            let k_bits = self.ic_dx.k();
            let context = (n == 1) as u32
                + if k_bits < 20 {
                    u32_zero_bit(k_bits)
                } else {
                    20
                };
            let diff = self.ic_dy.decompress(decoder, median, context)?;
            self.last_point.y = self.last_point.y.wrapping_add(diff);
            self.predictors.last_y_diff_median[m].add(diff);

            // decompress z coordinate
            let k_bits = (self.ic_dx.k() + self.ic_dy.k()) / 2;
            let context = (n == 1) as u32
                + if k_bits < 18 {
                    u32_zero_bit(k_bits)
                } else {
                    18
                };
            self.last_point.z =
                self.ic_z
                    .decompress(decoder, self.predictors.last_height[l], context)?;
            self.predictors.last_height[l] = self.last_point.z;

            self.last_point.pack_into(buf);
            Ok(())
        }
    }
}
