//! Byte order handling for TIFF files
//!
//! This module implements the Strategy pattern for handling different
//! byte orders (little-endian vs big-endian) when reading and writing
//! TIFF structures.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Result, Write};

use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the first two bytes of a TIFF header
    pub fn detect<R: Read + ?Sized>(reader: &mut R) -> TiffResult<Self> {
        let mut marker = [0u8; 2];
        reader.read_exact(&mut marker)?;
        Self::from_marker(marker)
    }

    /// Maps a 2-byte marker to a byte order
    pub fn from_marker(marker: [u8; 2]) -> TiffResult<Self> {
        match marker {
            header::LITTLE_ENDIAN_MARKER => Ok(ByteOrder::LittleEndian),
            header::BIG_ENDIAN_MARKER => Ok(ByteOrder::BigEndian),
            _ => Err(TiffError::MalformedHeader(format!(
                "invalid byte order marker {:#04x}{:02x}",
                marker[0], marker[1]
            ))),
        }
    }

    /// The 2-byte marker written at the start of a file with this byte order
    pub fn marker(&self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => header::LITTLE_ENDIAN_MARKER,
            ByteOrder::BigEndian => header::BIG_ENDIAN_MARKER,
        }
    }

    /// Byte order of the machine running this code
    pub fn host() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        }
    }

    /// Whether values in this byte order can be used without swapping
    pub fn is_host(&self) -> bool {
        *self == Self::host()
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// The byte order this handler reads and writes
    fn byte_order(&self) -> ByteOrder;

    /// Read a u16 value
    fn read_u16(&self, reader: &mut dyn Read) -> Result<u16>;

    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn Read) -> Result<u32>;

    /// Write a u16 value
    fn write_u16(&self, writer: &mut dyn Write, value: u16) -> Result<()>;

    /// Write a u32 value
    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()>;
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::LittleEndian
    }

    fn read_u16(&self, reader: &mut dyn Read) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn Read) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn write_u16(&self, writer: &mut dyn Write, value: u16) -> Result<()> {
        writer.write_u16::<LittleEndian>(value)
    }

    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()> {
        writer.write_u32::<LittleEndian>(value)
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::BigEndian
    }

    fn read_u16(&self, reader: &mut dyn Read) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn Read) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn write_u16(&self, writer: &mut dyn Write, value: u16) -> Result<()> {
        writer.write_u16::<BigEndian>(value)
    }

    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()> {
        writer.write_u32::<BigEndian>(value)
    }
}
