//! Description of the items that make up a point record.
//!
//! The schema fully determines the compression pipeline and must be
//! identical on the encoding and decoding sides; nothing in the
//! compressed stream describes it.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::errors::PointzipError;

/// Compression version the builder assigns when none is requested.
pub const DEFAULT_VERSION: u16 = 2;

/// The kinds of items a point record can be made of.
///
/// The numeric codes are the ones LAS-compressing software exchanges
/// (0, 6, 7, 8, 9).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ItemType {
    /// Opaque extra bytes; the payload is the byte count.
    Byte(u16),
    /// The 20-byte core point record.
    Point10,
    /// 8-byte GPS time stamp (an f64, handled bitwise).
    GpsTime,
    /// Three 16-bit color components.
    Rgb12,
    /// 29-byte waveform packet descriptor.
    Wavepacket13,
}

impl ItemType {
    /// Size in bytes of one item of this type in a raw record.
    pub fn size(&self) -> u16 {
        match self {
            ItemType::Byte(n) => *n,
            ItemType::Point10 => 20,
            ItemType::GpsTime => 8,
            ItemType::Rgb12 => 6,
            ItemType::Wavepacket13 => 29,
        }
    }
}

impl From<ItemType> for u16 {
    fn from(t: ItemType) -> Self {
        match t {
            ItemType::Byte(_) => 0,
            ItemType::Point10 => 6,
            ItemType::GpsTime => 7,
            ItemType::Rgb12 => 8,
            ItemType::Wavepacket13 => 9,
        }
    }
}

/// One entry of an item schema: a type, its byte size, and the
/// compression version used for it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub item_type: ItemType,
    pub size: u16,
    pub version: u16,
}

impl ItemSpec {
    pub fn new(item_type: ItemType, version: u16) -> Self {
        Self {
            item_type,
            size: item_type.size(),
            version,
        }
    }

    pub fn read_from<R: Read>(src: &mut R) -> Result<Self, PointzipError> {
        let type_code = src.read_u16::<LittleEndian>()?;
        let size = src.read_u16::<LittleEndian>()?;
        let item_type = match type_code {
            0 => ItemType::Byte(size),
            6 => ItemType::Point10,
            7 => ItemType::GpsTime,
            8 => ItemType::Rgb12,
            9 => ItemType::Wavepacket13,
            _ => return Err(PointzipError::UnknownItemType(type_code)),
        };
        Ok(Self {
            item_type,
            size,
            version: src.read_u16::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, dst: &mut W) -> std::io::Result<()> {
        dst.write_u16::<LittleEndian>(self.item_type.into())?;
        dst.write_u16::<LittleEndian>(self.size)?;
        dst.write_u16::<LittleEndian>(self.version)?;
        Ok(())
    }
}

/// Builds the ordered item list describing one point record.
///
/// ```
/// use pointzip::{ItemSchemaBuilder, ItemType};
///
/// let schema = ItemSchemaBuilder::new()
///     .item(ItemType::Point10)
///     .item(ItemType::GpsTime)
///     .build();
/// assert_eq!(schema.len(), 2);
/// ```
pub struct ItemSchemaBuilder {
    specs: Vec<ItemSpec>,
}

impl Default for ItemSchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemSchemaBuilder {
    pub fn new() -> Self {
        Self { specs: vec![] }
    }

    /// Appends an item compressed with the default version.
    pub fn item(self, item_type: ItemType) -> Self {
        self.versioned_item(item_type, DEFAULT_VERSION)
    }

    /// Appends an item compressed with an explicit version.
    pub fn versioned_item(mut self, item_type: ItemType, version: u16) -> Self {
        self.specs.push(ItemSpec::new(item_type, version));
        self
    }

    pub fn build(self) -> Vec<ItemSpec> {
        self.specs
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn item_spec_roundtrips_through_bytes() {
        let specs = ItemSchemaBuilder::new()
            .versioned_item(ItemType::Point10, 1)
            .versioned_item(ItemType::Byte(7), 2)
            .build();

        let mut data = Cursor::new(Vec::<u8>::new());
        for spec in &specs {
            spec.write_to(&mut data).unwrap();
        }
        data.set_position(0);

        for spec in &specs {
            assert_eq!(*spec, ItemSpec::read_from(&mut data).unwrap());
        }
    }

    #[test]
    fn unknown_type_code_is_an_error() {
        let mut data = Cursor::new(vec![3u8, 0, 4, 0, 1, 0]);
        assert!(matches!(
            ItemSpec::read_from(&mut data),
            Err(PointzipError::UnknownItemType(3))
        ));
    }
}
