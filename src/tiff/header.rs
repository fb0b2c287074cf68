//! TIFF file header
//!
//! A TIFF file begins with an 8-byte header: the byte order marker
//! ("II" or "MM"), the magic number 42 in that byte order, and the offset
//! of the first image file directory.

use log::debug;
use std::io::{Read, Write};

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};

/// Parsed TIFF header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    byte_order: ByteOrder,
    first_ifd_offset: u32,
}

impl Header {
    /// Creates a header, validating the first directory offset
    pub fn new(byte_order: ByteOrder, first_ifd_offset: u32) -> TiffResult<Self> {
        if first_ifd_offset < header::HEADER_SIZE {
            return Err(TiffError::MalformedHeader(format!(
                "first IFD offset {} points inside the header",
                first_ifd_offset
            )));
        }
        Ok(Header { byte_order, first_ifd_offset })
    }

    /// Byte order of every multi-byte value in the file
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Whether the file byte order matches the host's
    pub fn equals_host_byte_order(&self) -> bool {
        self.byte_order.is_host()
    }

    /// Offset of the first image file directory
    pub fn first_ifd_offset(&self) -> u32 {
        self.first_ifd_offset
    }

    /// Reads and validates the header from the current stream position
    pub fn read<R: Read>(reader: &mut R) -> TiffResult<Self> {
        let byte_order = ByteOrder::detect(reader)?;
        debug!("Detected byte order: {}", byte_order.name());

        let handler = byte_order.create_handler();
        let magic = handler.read_u16(reader)?;
        if magic != header::TIFF_VERSION {
            return Err(TiffError::MalformedHeader(format!("invalid magic number {}", magic)));
        }

        let first_ifd_offset = handler.read_u32(reader)?;
        debug!("First IFD offset: {}", first_ifd_offset);

        Header::new(byte_order, first_ifd_offset)
    }

    /// Writes the header at the current stream position
    pub fn write<W: Write>(&self, writer: &mut W) -> TiffResult<()> {
        let handler = self.byte_order.create_handler();
        writer.write_all(&self.byte_order.marker())?;
        handler.write_u16(writer, header::TIFF_VERSION)?;
        handler.write_u32(writer, self.first_ifd_offset)?;
        Ok(())
    }
}
