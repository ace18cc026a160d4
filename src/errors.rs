use crate::schema::ItemType;
use std::fmt;

#[derive(Debug)]
pub enum PointzipError {
    UnknownItemType(u16),
    UnsupportedItemVersion(ItemType, u16),
    UnsupportedByteItemSize,
    IoError(std::io::Error),
}

impl From<std::io::Error> for PointzipError {
    fn from(e: std::io::Error) -> Self {
        PointzipError::IoError(e)
    }
}

impl fmt::Display for PointzipError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            PointzipError::UnknownItemType(t) => {
                write!(f, "Item with type code: {} is unknown", t)
            }
            PointzipError::UnsupportedItemVersion(item_type, version) => write!(
                f,
                "Item {:?} with compression version: {} is not supported",
                item_type, version
            ),
            PointzipError::UnsupportedByteItemSize => {
                write!(f, "Byte items must have a size of at least 1")
            }
            PointzipError::IoError(e) => write!(f, "IoError: {}", e),
        }
    }
}

impl std::error::Error for PointzipError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PointzipError::IoError(e) => Some(e),
            _ => None,
        }
    }
}
