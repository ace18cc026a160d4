//! The LAS item types and their per-version compressors / decompressors.

pub mod extra_bytes;
pub mod gps;
pub mod point10;
pub mod rgb;
pub(crate) mod utils;
pub mod wavepacket;

pub use gps::GpsTime;
pub use point10::Point10;
pub use rgb::Rgb;
pub use wavepacket::Wavepacket;

pub mod v1 {
    pub use crate::las::extra_bytes::v1::{LasExtraByteCompressor, LasExtraByteDecompressor};
    pub use crate::las::gps::v1::{LasGpsTimeCompressor, LasGpsTimeDecompressor};
    pub use crate::las::point10::v1::{LasPoint10Compressor, LasPoint10Decompressor};
    pub use crate::las::rgb::v1::{LasRgbCompressor, LasRgbDecompressor};
    pub use crate::las::wavepacket::v1::{LasWavepacketCompressor, LasWavepacketDecompressor};
}

pub mod v2 {
    pub use crate::las::extra_bytes::v2::{LasExtraByteCompressor, LasExtraByteDecompressor};
    pub use crate::las::gps::v2::{LasGpsTimeCompressor, LasGpsTimeDecompressor};
    pub use crate::las::point10::v2::{LasPoint10Compressor, LasPoint10Decompressor};
    pub use crate::las::rgb::v2::{LasRgbCompressor, LasRgbDecompressor};
    pub use crate::las::wavepacket::v2::{LasWavepacketCompressor, LasWavepacketDecompressor};
}
