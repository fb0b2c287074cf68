//! Strip-based image data extraction
//!
//! Stripped TIFFs organize image data in horizontal bands of `RowsPerStrip`
//! rows spanning the full image width, one chunk per band (and per plane
//! when samples are stored separately).

use log::debug;

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;

use super::{read_chunk_table, ImageData, Organization};

/// Reads the strips of a directory
pub struct StripReader<'a, R: SeekableReader> {
    /// Reader for accessing the TIFF file
    reader: &'a mut R,
    /// IFD containing the image metadata
    ifd: &'a IFD,
}

impl<'a, R: SeekableReader> StripReader<'a, R> {
    /// Create a new strip reader
    ///
    /// # Arguments
    /// * `reader` - Seekable reader for the TIFF file
    /// * `ifd` - IFD containing the image metadata
    pub fn new(reader: &'a mut R, ifd: &'a IFD) -> Self {
        StripReader { reader, ifd }
    }

    /// Read every strip listed by `StripOffsets`/`StripByteCounts`
    pub fn read_strips(&mut self) -> TiffResult<ImageData> {
        let chunks = read_chunk_table(&mut *self.reader, self.ifd, tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)?;
        debug!("IFD #{}: {} strips", self.ifd.number, chunks.len());
        Ok(ImageData { organization: Organization::Strips, chunks })
    }
}

/// Rows in each strip
///
/// Defaults to the image height when absent and is clamped to it when
/// larger; the last strip of an image may hold fewer rows.
pub fn rows_per_strip(ifd: &IFD) -> TiffResult<usize> {
    let (_, height) = ifd.get_dimensions()?;
    let rows = ifd.get_int_or(tags::ROWS_PER_STRIP, height as i64)?;
    let rows = IFD::to_usize(tags::ROWS_PER_STRIP, rows)?;
    if rows == 0 {
        return Err(TiffError::InvalidEntry(format!(
            "IFD #{}: RowsPerStrip must be positive",
            ifd.number
        )));
    }
    Ok(rows.min(height.max(1)))
}
