//! Everything about compressing & decompressing point records

use std::io::{Read, Write};

use crate::decoders::ArithmeticDecoder;
use crate::encoders::ArithmeticEncoder;
use crate::errors::PointzipError;
use crate::las;
use crate::schema::{ItemSpec, ItemType};

/***************************************************************************************************
                    Decompression related traits
***************************************************************************************************/

/// Trait to be implemented by field decompressors.
///
/// A 'field' here is one schema item: a single value (the GPS time) or a
/// group of values handled together (the RGB triple).
pub trait FieldDecompressor<R: Read> {
    /// Size in bytes of the decompressed field data.
    fn size_of_field(&self) -> usize;

    /// Reads the first point's field raw from `src` into `first_point`,
    /// seeding the predictor state.
    ///
    /// The `first_point` slice is exactly `size_of_field()` bytes.
    fn decompress_first(&mut self, src: &mut R, first_point: &mut [u8]) -> std::io::Result<()>;

    /// Decompresses the next point's field from the `decoder` into `buf`.
    ///
    /// The `buf` slice is exactly `size_of_field()` bytes.
    fn decompress_with(
        &mut self,
        decoder: &mut ArithmeticDecoder<R>,
        buf: &mut [u8],
    ) -> std::io::Result<()>;
}

/// Interface needed to decompress a whole point record.
pub trait RecordDecompressor<R> {
    /// Builds the field decompressors matching the `schema`.
    fn set_fields_from(&mut self, schema: &[ItemSpec]) -> Result<(), PointzipError>;
    /// Size of a decompressed point record (total size of all fields).
    fn record_size(&self) -> usize;

    /// Decompresses the next point into the `out` slice.
    fn decompress_next(&mut self, out: &mut [u8]) -> std::io::Result<()>;
    /// Resets to the initial state, dropping the field decompressors.
    fn reset(&mut self);

    fn borrow_stream_mut(&mut self) -> &mut R;
    fn into_stream(self) -> R;
    fn box_into_stream(self: Box<Self>) -> R;
}

/***************************************************************************************************
                    Record decompressor implementation
***************************************************************************************************/

/// Decompresses points stored sequentially:
///
/// 1) `1` raw point (as per the ASPRS LAS definition)
/// 2) `n` compressed points
pub struct SequentialPointRecordDecompressor<'a, R: Read> {
    field_decompressors: Vec<Box<dyn FieldDecompressor<R> + 'a>>,
    decoder: ArithmeticDecoder<R>,
    is_first_decompression: bool,
    record_size: usize,
}

impl<'a, R: Read> SequentialPointRecordDecompressor<'a, R> {
    /// `input` is the stream the compressed points will be read from.
    pub fn new(input: R) -> Self {
        Self {
            field_decompressors: vec![],
            decoder: ArithmeticDecoder::new(input),
            is_first_decompression: true,
            record_size: 0,
        }
    }

    pub fn add_field_decompressor<T: FieldDecompressor<R> + 'a>(&mut self, field: T) {
        self.record_size += field.size_of_field();
        self.field_decompressors.push(Box::new(field));
    }

    pub fn add_boxed_decompressor(&mut self, d: Box<dyn FieldDecompressor<R> + 'a>) {
        self.record_size += d.size_of_field();
        self.field_decompressors.push(d);
    }
}

impl<'a, R: Read> RecordDecompressor<R> for SequentialPointRecordDecompressor<'a, R> {
    fn set_fields_from(&mut self, schema: &[ItemSpec]) -> Result<(), PointzipError> {
        for spec in schema {
            match spec.version {
                1 => match spec.item_type {
                    ItemType::Point10 => {
                        self.add_field_decompressor(las::v1::LasPoint10Decompressor::default())
                    }
                    ItemType::GpsTime => {
                        self.add_field_decompressor(las::v1::LasGpsTimeDecompressor::default())
                    }
                    ItemType::Rgb12 => {
                        self.add_field_decompressor(las::v1::LasRgbDecompressor::default())
                    }
                    ItemType::Wavepacket13 => self
                        .add_field_decompressor(las::v1::LasWavepacketDecompressor::default()),
                    ItemType::Byte(n) => {
                        if n == 0 {
                            return Err(PointzipError::UnsupportedByteItemSize);
                        }
                        self.add_field_decompressor(las::v1::LasExtraByteDecompressor::new(
                            n as usize,
                        ))
                    }
                },
                2 => match spec.item_type {
                    ItemType::Point10 => {
                        self.add_field_decompressor(las::v2::LasPoint10Decompressor::default())
                    }
                    ItemType::GpsTime => {
                        self.add_field_decompressor(las::v2::LasGpsTimeDecompressor::default())
                    }
                    ItemType::Rgb12 => {
                        self.add_field_decompressor(las::v2::LasRgbDecompressor::default())
                    }
                    ItemType::Wavepacket13 => self
                        .add_field_decompressor(las::v2::LasWavepacketDecompressor::default()),
                    ItemType::Byte(n) => {
                        if n == 0 {
                            return Err(PointzipError::UnsupportedByteItemSize);
                        }
                        self.add_field_decompressor(las::v2::LasExtraByteDecompressor::new(
                            n as usize,
                        ))
                    }
                },
                _ => {
                    return Err(PointzipError::UnsupportedItemVersion(
                        spec.item_type,
                        spec.version,
                    ));
                }
            }
        }
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.record_size
    }

    fn decompress_next(&mut self, out: &mut [u8]) -> std::io::Result<()> {
        if self.is_first_decompression {
            let mut field_start = 0;
            for field in &mut self.field_decompressors {
                let field_end = field_start + field.size_of_field();
                field.decompress_first(self.decoder.in_stream(), &mut out[field_start..field_end])?;
                field_start = field_end;
            }

            self.is_first_decompression = false;

            // prime the decoder now that the raw first record is past
            self.decoder.read_init_bytes()?;
        } else {
            let mut field_start = 0;
            for field in &mut self.field_decompressors {
                let field_end = field_start + field.size_of_field();
                field.decompress_with(&mut self.decoder, &mut out[field_start..field_end])?;
                field_start = field_end;
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.decoder.reset();
        self.is_first_decompression = true;
        self.field_decompressors.clear();
        self.record_size = 0;
    }

    fn borrow_stream_mut(&mut self) -> &mut R {
        self.decoder.in_stream()
    }

    fn into_stream(self) -> R {
        self.decoder.into_stream()
    }

    fn box_into_stream(self: Box<Self>) -> R {
        self.decoder.into_stream()
    }
}

/***************************************************************************************************
                    Compression related traits
***************************************************************************************************/

/// Trait to be implemented by field compressors.
pub trait FieldCompressor<W: Write> {
    /// Size in bytes of the uncompressed field data.
    fn size_of_field(&self) -> usize;

    /// Writes the first point's field raw to `dst`, seeding the
    /// predictor state.
    ///
    /// The `buf` slice is exactly `size_of_field()` bytes.
    fn compress_first(&mut self, dst: &mut W, buf: &[u8]) -> std::io::Result<()>;

    /// Compresses the next point's field from `buf` into the `encoder`.
    ///
    /// The `buf` slice is exactly `size_of_field()` bytes.
    fn compress_with(
        &mut self,
        encoder: &mut ArithmeticEncoder<W>,
        buf: &[u8],
    ) -> std::io::Result<()>;
}

/// Interface needed to compress a whole point record.
pub trait RecordCompressor<W> {
    /// Builds the field compressors matching the `schema`.
    fn set_fields_from(&mut self, schema: &[ItemSpec]) -> Result<(), PointzipError>;
    /// Size of an uncompressed point record (total size of all fields).
    fn record_size(&self) -> usize;

    /// Compresses the next point.
    fn compress_next(&mut self, input: &[u8]) -> std::io::Result<()>;
    /// Flushes the encoder; no more points can be compressed afterwards.
    fn done(&mut self) -> std::io::Result<()>;
    /// Resets to the initial state, dropping the field compressors.
    fn reset(&mut self);

    fn borrow_stream_mut(&mut self) -> &mut W;
    fn into_stream(self) -> W;
    fn box_into_stream(self: Box<Self>) -> W;
}

/***************************************************************************************************
                    Record compressor implementation
***************************************************************************************************/

/// Compresses points and stores them sequentially.
pub struct SequentialPointRecordCompressor<'a, W: Write> {
    is_first_compression: bool,
    field_compressors: Vec<Box<dyn FieldCompressor<W> + 'a>>,
    encoder: ArithmeticEncoder<W>,
    record_size: usize,
}

impl<'a, W: Write> SequentialPointRecordCompressor<'a, W> {
    /// `output` is the stream the compressed points will be written to.
    pub fn new(output: W) -> Self {
        Self {
            is_first_compression: true,
            field_compressors: vec![],
            encoder: ArithmeticEncoder::new(output),
            record_size: 0,
        }
    }

    pub fn add_field_compressor<T: FieldCompressor<W> + 'a>(&mut self, field: T) {
        self.record_size += field.size_of_field();
        self.field_compressors.push(Box::new(field));
    }

    pub fn add_boxed_compressor(&mut self, c: Box<dyn FieldCompressor<W> + 'a>) {
        self.record_size += c.size_of_field();
        self.field_compressors.push(c);
    }
}

impl<'a, W: Write> RecordCompressor<W> for SequentialPointRecordCompressor<'a, W> {
    fn set_fields_from(&mut self, schema: &[ItemSpec]) -> Result<(), PointzipError> {
        for spec in schema {
            match spec.version {
                1 => match spec.item_type {
                    ItemType::Point10 => {
                        self.add_field_compressor(las::v1::LasPoint10Compressor::default())
                    }
                    ItemType::GpsTime => {
                        self.add_field_compressor(las::v1::LasGpsTimeCompressor::default())
                    }
                    ItemType::Rgb12 => {
                        self.add_field_compressor(las::v1::LasRgbCompressor::default())
                    }
                    ItemType::Wavepacket13 => {
                        self.add_field_compressor(las::v1::LasWavepacketCompressor::default())
                    }
                    ItemType::Byte(n) => {
                        if n == 0 {
                            return Err(PointzipError::UnsupportedByteItemSize);
                        }
                        self.add_field_compressor(las::v1::LasExtraByteCompressor::new(n as usize))
                    }
                },
                2 => match spec.item_type {
                    ItemType::Point10 => {
                        self.add_field_compressor(las::v2::LasPoint10Compressor::default())
                    }
                    ItemType::GpsTime => {
                        self.add_field_compressor(las::v2::LasGpsTimeCompressor::default())
                    }
                    ItemType::Rgb12 => {
                        self.add_field_compressor(las::v2::LasRgbCompressor::default())
                    }
                    ItemType::Wavepacket13 => {
                        self.add_field_compressor(las::v2::LasWavepacketCompressor::default())
                    }
                    ItemType::Byte(n) => {
                        if n == 0 {
                            return Err(PointzipError::UnsupportedByteItemSize);
                        }
                        self.add_field_compressor(las::v2::LasExtraByteCompressor::new(n as usize))
                    }
                },
                _ => {
                    return Err(PointzipError::UnsupportedItemVersion(
                        spec.item_type,
                        spec.version,
                    ));
                }
            }
        }
        Ok(())
    }

    fn record_size(&self) -> usize {
        self.record_size
    }

    fn compress_next(&mut self, input: &[u8]) -> std::io::Result<()> {
        if self.is_first_compression {
            let mut field_start = 0;
            for field in &mut self.field_compressors {
                let field_end = field_start + field.size_of_field();
                field.compress_first(self.encoder.out_stream(), &input[field_start..field_end])?;
                field_start = field_end;
            }
            self.is_first_compression = false;
        } else {
            let mut field_start = 0;
            for field in &mut self.field_compressors {
                let field_end = field_start + field.size_of_field();
                field.compress_with(&mut self.encoder, &input[field_start..field_end])?;
                field_start = field_end;
            }
        }
        Ok(())
    }

    fn done(&mut self) -> std::io::Result<()> {
        self.encoder.done()
    }

    fn reset(&mut self) {
        self.is_first_compression = true;
        self.encoder.reset();
        self.field_compressors.clear();
        self.record_size = 0;
    }

    fn borrow_stream_mut(&mut self) -> &mut W {
        self.encoder.out_stream()
    }

    fn into_stream(self) -> W {
        self.encoder.into_inner()
    }

    fn box_into_stream(self: Box<Self>) -> W {
        self.encoder.into_inner()
    }
}
