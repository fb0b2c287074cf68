//! Minimal TIFF writer
//!
//! Emits a header, raw data blocks and directories in either byte order.
//! Entries are written in the order given, unsorted input included, which
//! makes the writer suitable for building fixtures that exercise the
//! reader's validation. It does not attempt to reproduce an existing file.

use log::debug;
use std::io::SeekFrom;

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::{self, SeekableWriter};
use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::header::Header;
use crate::tiff::ifd::IFDEntry;

/// Sequential TIFF writer
pub struct TiffWriter<W: SeekableWriter> {
    writer: W,
    handler: Box<dyn ByteOrderHandler>,
    /// Position of the offset field that will point at the next directory
    link_position: u64,
}

impl<W: SeekableWriter> TiffWriter<W> {
    /// Starts a new file, writing a header whose first-IFD offset is patched
    /// when the first directory is written
    pub fn new(mut writer: W, byte_order: ByteOrder) -> TiffResult<Self> {
        writer.seek(SeekFrom::Start(0))?;
        Header::new(byte_order, header::HEADER_SIZE)?.write(&mut writer)?;
        Ok(TiffWriter {
            writer,
            handler: byte_order.create_handler(),
            link_position: 4,
        })
    }

    /// Appends a block of raw bytes at the next word boundary
    ///
    /// Returns the offset the block was written at.
    pub fn write_data(&mut self, data: &[u8]) -> TiffResult<u32> {
        let offset = self.aligned_end()?;
        seekable::write_at(&mut self.writer, offset as u64, data)?;
        Ok(offset)
    }

    /// Appends a directory and links it into the chain
    ///
    /// Values that do not fit inline are written right after the directory.
    pub fn write_ifd(&mut self, entries: &[IFDEntry]) -> TiffResult<u32> {
        let ifd_offset = self.aligned_end()?;
        let entry_count = u16::try_from(entries.len())
            .map_err(|_| TiffError::GenericError(format!("too many entries: {}", entries.len())))?;

        let ifd_size = 2 + header::ENTRY_SIZE * entry_count as u32 + 4;
        let mut value_offset = Self::align(ifd_offset + ifd_size);

        let mut block = Vec::with_capacity(ifd_size as usize);
        self.handler.write_u16(&mut block, entry_count)?;

        let mut out_of_line = Vec::new();
        for entry in entries {
            let mut values = entry.raw_values().to_vec();
            entry.field_type().normalize(&mut values, self.handler.byte_order());

            self.handler.write_u16(&mut block, entry.tag())?;
            self.handler.write_u16(&mut block, entry.field_type().code())?;
            self.handler.write_u32(&mut block, entry.count())?;

            if values.len() <= header::INLINE_VALUE_SIZE {
                values.resize(header::INLINE_VALUE_SIZE, 0);
                block.extend_from_slice(&values);
            } else {
                self.handler.write_u32(&mut block, value_offset)?;
                let len = values.len() as u32;
                out_of_line.push((value_offset, values));
                value_offset = Self::align(value_offset + len);
            }
        }
        self.handler.write_u32(&mut block, 0)?;

        seekable::write_at(&mut self.writer, ifd_offset as u64, &block)?;
        for (offset, values) in out_of_line {
            seekable::write_at(&mut self.writer, offset as u64, &values)?;
        }

        let mut link = Vec::with_capacity(4);
        self.handler.write_u32(&mut link, ifd_offset)?;
        seekable::write_at(&mut self.writer, self.link_position, &link)?;
        self.link_position = ifd_offset as u64 + 2 + (header::ENTRY_SIZE * entry_count as u32) as u64;

        debug!("Wrote IFD with {} entries at offset {}", entries.len(), ifd_offset);
        Ok(ifd_offset)
    }

    /// Flushes and returns the underlying writer
    pub fn finish(mut self) -> TiffResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn aligned_end(&mut self) -> TiffResult<u32> {
        let end = seekable::stream_len(&mut self.writer)?;
        let end = u32::try_from(end)
            .map_err(|_| TiffError::GenericError("file exceeds 4 GiB".to_string()))?;
        Ok(Self::align(end))
    }

    fn align(offset: u32) -> u32 {
        offset + (offset % 2)
    }
}
