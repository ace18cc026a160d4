//! The waveform packet item and its compressors / decompressors.

use crate::packers::Packable;

/// ASPRS definition of the wave packet data.
///
/// The leading descriptor byte is coded as its own symbol; only the
/// remaining 28 bytes take part in the differential prediction.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Wavepacket {
    pub descriptor_index: u8,
    /// offset in bytes to the waveform data
    pub offset: u64,
    /// in bytes
    pub packet_size: u32,
    pub return_point: f32,
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,
}

impl Wavepacket {
    pub const SIZE: usize = 29;
}

impl Packable for Wavepacket {
    fn unpack_from(input: &[u8]) -> Self {
        assert!(
            input.len() >= Self::SIZE,
            "Wavepacket::unpack_from expected a buffer of 29 bytes"
        );
        Self {
            descriptor_index: input[0],
            offset: u64::unpack_from(&input[1..9]),
            packet_size: u32::unpack_from(&input[9..13]),
            return_point: f32::unpack_from(&input[13..17]),
            dx: f32::unpack_from(&input[17..21]),
            dy: f32::unpack_from(&input[21..25]),
            dz: f32::unpack_from(&input[25..29]),
        }
    }

    fn pack_into(&self, output: &mut [u8]) {
        assert!(
            output.len() >= Self::SIZE,
            "Wavepacket::pack_into expected a buffer of 29 bytes"
        );
        output[0] = self.descriptor_index;
        self.offset.pack_into(&mut output[1..9]);
        self.packet_size.pack_into(&mut output[9..13]);
        self.return_point.pack_into(&mut output[13..17]);
        self.dx.pack_into(&mut output[17..21]);
        self.dy.pack_into(&mut output[21..25]);
        self.dz.pack_into(&mut output[25..29]);
    }
}

pub mod v1 {
    //! Version 1 of the wave packet compression.
    //!
    //! The offset moves by large strides, so its 64-bit diff is only
    //! compressed when it fits in 32 bits (flagged by one adaptive bit,
    //! predicted by the previous diff); otherwise the offset is stored
    //! raw. The remaining fields go through plain last-value correctors,
    //! the f32 fields bitwise as i32.
    use std::io::{Read, Write};

    use crate::compressors::{IntegerCompressor, IntegerCompressorBuilder};
    use crate::decoders::ArithmeticDecoder;
    use crate::decompressors::{IntegerDecompressor, IntegerDecompressorBuilder};
    use crate::encoders::ArithmeticEncoder;
    use crate::las::utils::read_and_unpack;
    use crate::models::{BitModel, DecodeSymbolModel, EncodeSymbolModel};
    use crate::packers::Packable;
    use crate::record::{FieldCompressor, FieldDecompressor};

    use super::Wavepacket;

    const DX_CONTEXT: u32 = 0;
    const DY_CONTEXT: u32 = 1;
    const DZ_CONTEXT: u32 = 2;

    pub struct LasWavepacketCompressor {
        last_wavepacket: Wavepacket,
        last_offset_diff: i32,

        packet_index_model: EncodeSymbolModel,
        small_offset_diff_model: BitModel,

        ic_offset_diff: IntegerCompressor,
        ic_packet_size: IntegerCompressor,
        ic_return_point: IntegerCompressor,
        ic_xyz: IntegerCompressor,
    }

    impl Default for LasWavepacketCompressor {
        fn default() -> Self {
            Self {
                last_wavepacket: Wavepacket::default(),
                last_offset_diff: 0,
                packet_index_model: EncodeSymbolModel::new(256),
                small_offset_diff_model: BitModel::new(),
                ic_offset_diff: IntegerCompressorBuilder::new().bits(32).build_initialized(),
                ic_packet_size: IntegerCompressorBuilder::new().bits(32).build_initialized(),
                ic_return_point: IntegerCompressorBuilder::new().bits(32).build_initialized(),
                // 3 contexts, shared by dx, dy, dz
                ic_xyz: IntegerCompressorBuilder::new()
                    .bits(32)
                    .contexts(3)
                    .build_initialized(),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasWavepacketCompressor {
        fn size_of_field(&self) -> usize {
            Wavepacket::SIZE
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.last_wavepacket = Wavepacket::unpack_from(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            let current = Wavepacket::unpack_from(buf);
            encoder.encode_symbol(
                &mut self.packet_index_model,
                u32::from(current.descriptor_index),
            )?;

            let curr_diff_64 =
                (current.offset as i64).wrapping_sub(self.last_wavepacket.offset as i64);
            let curr_diff_32 = curr_diff_64 as i32;

            if i64::from(curr_diff_32) == curr_diff_64 {
                encoder.encode_bit(&mut self.small_offset_diff_model, 1)?;
                self.ic_offset_diff
                    .compress(encoder, self.last_offset_diff, curr_diff_32, 0)?;
                self.last_offset_diff = curr_diff_32;
            } else {
                encoder.encode_bit(&mut self.small_offset_diff_model, 0)?;
                encoder.write_int64(current.offset)?;
            }

            self.ic_packet_size.compress(
                encoder,
                self.last_wavepacket.packet_size as i32,
                current.packet_size as i32,
                0,
            )?;
            self.ic_return_point.compress(
                encoder,
                self.last_wavepacket.return_point.to_bits() as i32,
                current.return_point.to_bits() as i32,
                0,
            )?;
            self.ic_xyz.compress(
                encoder,
                self.last_wavepacket.dx.to_bits() as i32,
                current.dx.to_bits() as i32,
                DX_CONTEXT,
            )?;
            self.ic_xyz.compress(
                encoder,
                self.last_wavepacket.dy.to_bits() as i32,
                current.dy.to_bits() as i32,
                DY_CONTEXT,
            )?;
            self.ic_xyz.compress(
                encoder,
                self.last_wavepacket.dz.to_bits() as i32,
                current.dz.to_bits() as i32,
                DZ_CONTEXT,
            )?;

            self.last_wavepacket = current;
            Ok(())
        }
    }

    pub struct LasWavepacketDecompressor {
        last_wavepacket: Wavepacket,
        last_offset_diff: i32,

        packet_index_model: DecodeSymbolModel,
        small_offset_diff_model: BitModel,

        ic_offset_diff: IntegerDecompressor,
        ic_packet_size: IntegerDecompressor,
        ic_return_point: IntegerDecompressor,
        ic_xyz: IntegerDecompressor,
    }

    impl Default for LasWavepacketDecompressor {
        fn default() -> Self {
            Self {
                last_wavepacket: Wavepacket::default(),
                last_offset_diff: 0,
                packet_index_model: DecodeSymbolModel::new(256),
                small_offset_diff_model: BitModel::new(),
                ic_offset_diff: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .build_initialized(),
                ic_packet_size: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .build_initialized(),
                ic_return_point: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .build_initialized(),
                ic_xyz: IntegerDecompressorBuilder::new()
                    .bits(32)
                    .contexts(3)
                    .build_initialized(),
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasWavepacketDecompressor {
        fn size_of_field(&self) -> usize {
            Wavepacket::SIZE
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            self.last_wavepacket = read_and_unpack::<_, Wavepacket>(src, first_point)?;
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            let mut current = Wavepacket {
                descriptor_index: decoder.decode_symbol(&mut self.packet_index_model)? as u8,
                ..Default::default()
            };

            if decoder.decode_bit(&mut self.small_offset_diff_model)? != 0 {
                self.last_offset_diff =
                    self.ic_offset_diff
                        .decompress(decoder, self.last_offset_diff, 0)?;
                current.offset = self
                    .last_wavepacket
                    .offset
                    .wrapping_add(self.last_offset_diff as i64 as u64);
            } else {
                current.offset = decoder.read_int_64()?;
            }

            current.packet_size = self.ic_packet_size.decompress(
                decoder,
                self.last_wavepacket.packet_size as i32,
                0,
            )? as u32;
            current.return_point = f32::from_bits(self.ic_return_point.decompress(
                decoder,
                self.last_wavepacket.return_point.to_bits() as i32,
                0,
            )? as u32);
            current.dx = f32::from_bits(self.ic_xyz.decompress(
                decoder,
                self.last_wavepacket.dx.to_bits() as i32,
                DX_CONTEXT,
            )? as u32);
            current.dy = f32::from_bits(self.ic_xyz.decompress(
                decoder,
                self.last_wavepacket.dy.to_bits() as i32,
                DY_CONTEXT,
            )? as u32);
            current.dz = f32::from_bits(self.ic_xyz.decompress(
                decoder,
                self.last_wavepacket.dz.to_bits() as i32,
                DZ_CONTEXT,
            )? as u32);

            current.pack_into(buf);
            self.last_wavepacket = current;
            Ok(())
        }
    }
}

/// Just re-export v1 as v2, they are the same implementation.
pub use v1 as v2;
