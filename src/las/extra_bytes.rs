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

//! Compression of the opaque extra bytes a point record may carry.

pub mod v1 {
    //! Version 1: each byte goes through an 8-bit corrector, one context
    //! per byte position, predicted by the previous record's byte at the
    //! same position.
    use std::io::{Read, Write};

    use crate::compressors::{IntegerCompressor, IntegerCompressorBuilder};
    use crate::decoders::ArithmeticDecoder;
    use crate::decompressors::{IntegerDecompressor, IntegerDecompressorBuilder};
    use crate::encoders::ArithmeticEncoder;
    use crate::record::{FieldCompressor, FieldDecompressor};

    pub struct LasExtraByteCompressor {
        last_bytes: Vec<u8>,
        count: usize,
        ic_byte: IntegerCompressor,
    }

    impl LasExtraByteCompressor {
        pub fn new(count: usize) -> Self {
            assert!(count > 0, "extra bytes item with a size of 0");
            Self {
                last_bytes: vec![0u8; count],
                count,
                ic_byte: IntegerCompressorBuilder::new()
                    .bits(8)
                    .contexts(count as u32)
                    .build_initialized(),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasExtraByteCompressor {
        fn size_of_field(&self) -> usize {
            self.count
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.last_bytes.copy_from_slice(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            for i in 0..self.count {
                self.ic_byte.compress(
                    encoder,
                    i32::from(self.last_bytes[i]),
                    i32::from(buf[i]),
                    i as u32,
                )?;
            }
            self.last_bytes.copy_from_slice(buf);
            Ok(())
        }
    }

    pub struct LasExtraByteDecompressor {
        last_bytes: Vec<u8>,
        count: usize,
        ic_byte: IntegerDecompressor,
    }

    impl LasExtraByteDecompressor {
        pub fn new(count: usize) -> Self {
            assert!(count > 0, "extra bytes item with a size of 0");
            Self {
                last_bytes: vec![0u8; count],
                count,
                ic_byte: IntegerDecompressorBuilder::new()
                    .bits(8)
                    .contexts(count as u32)
                    .build_initialized(),
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasExtraByteDecompressor {
        fn size_of_field(&self) -> usize {
            self.count
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            src.read_exact(first_point)?;
            self.last_bytes.copy_from_slice(first_point);
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            for i in 0..self.count {
                let byte = self.ic_byte.decompress(
                    decoder,
                    i32::from(self.last_bytes[i]),
                    i as u32,
                )? as u8;
                self.last_bytes[i] = byte;
                buf[i] = byte;
            }
            Ok(())
        }
    }
}

pub mod v2 {
    //! Version 2: each byte position has its own 256-symbol model coding
    //! `current - last` deltas directly.
    use std::io::{Read, Write};

    use crate::decoders::ArithmeticDecoder;
    use crate::encoders::ArithmeticEncoder;
    use crate::models::{DecodeSymbolModel, EncodeSymbolModel};
    use crate::record::{FieldCompressor, FieldDecompressor};

    pub struct LasExtraByteCompressor {
        last_bytes: Vec<u8>,
        count: usize,
        models: Vec<EncodeSymbolModel>,
    }

    impl LasExtraByteCompressor {
        pub fn new(count: usize) -> Self {
            assert!(count > 0, "extra bytes item with a size of 0");
            Self {
                last_bytes: vec![0u8; count],
                count,
                models: (0..count).map(|_| EncodeSymbolModel::new(256)).collect(),
            }
        }
    }

    impl<W: Write> FieldCompressor<W> for LasExtraByteCompressor {
        fn size_of_field(&self) -> usize {
            self.count
        }

        fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()> {
            self.last_bytes.copy_from_slice(buf);
            dst.write_all(buf)
        }

        fn compress_with(
            &mut self,
            encoder: &mut ArithmeticEncoder<W>,
            buf: &[u8],
        ) -> std::io::Result<()> {
            for i in 0..self.count {
                let diff = buf[i].wrapping_sub(self.last_bytes[i]);
                encoder.encode_symbol(&mut self.models[i], u32::from(diff))?;
                self.last_bytes[i] = buf[i];
            }
            Ok(())
        }
    }

    pub struct LasExtraByteDecompressor {
        last_bytes: Vec<u8>,
        count: usize,
        models: Vec<DecodeSymbolModel>,
    }

    impl LasExtraByteDecompressor {
        pub fn new(count: usize) -> Self {
            assert!(count > 0, "extra bytes item with a size of 0");
            Self {
                last_bytes: vec![0u8; count],
                count,
                models: (0..count).map(|_| DecodeSymbolModel::new(256)).collect(),
            }
        }
    }

    impl<R: Read> FieldDecompressor<R> for LasExtraByteDecompressor {
        fn size_of_field(&self) -> usize {
            self.count
        }

        fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()> {
            src.read_exact(first_point)?;
            self.last_bytes.copy_from_slice(first_point);
            Ok(())
        }

        fn decompress_with(
            &mut self,
            decoder: &mut ArithmeticDecoder<R>,
            buf: &mut [u8],
        ) -> std::io::Result<()> {
            for i in 0..self.count {
                let diff = decoder.decode_symbol(&mut self.models[i])? as u8;
                let byte = self.last_bytes[i].wrapping_add(diff);
                self.last_bytes[i] = byte;
                buf[i] = byte;
            }
            Ok(())
        }
    }
}
