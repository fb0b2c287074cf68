//! Tile-based image data extraction
//!
//! Tiled TIFF files organize image data in rectangular tiles of equal size.
//! Tiles on the right and bottom edges may extend past the image and are
//! clipped when decoded, but are always stored at full size.

use log::debug;

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;

use super::{read_chunk_table, ImageData, Organization};

/// Reads the tiles of a directory
pub struct TileReader<'a, R: SeekableReader> {
    /// Reader for accessing the TIFF file
    reader: &'a mut R,
    /// IFD containing the image metadata
    ifd: &'a IFD,
}

impl<'a, R: SeekableReader> TileReader<'a, R> {
    /// Create a new tile reader
    ///
    /// # Arguments
    /// * `reader` - Seekable reader for the TIFF file
    /// * `ifd` - IFD containing the image metadata
    pub fn new(reader: &'a mut R, ifd: &'a IFD) -> Self {
        TileReader { reader, ifd }
    }

    /// Read every tile listed by `TileOffsets`/`TileByteCounts`
    pub fn read_tiles(&mut self) -> TiffResult<ImageData> {
        let chunks = read_chunk_table(&mut *self.reader, self.ifd, tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)?;
        debug!("IFD #{}: {} tiles", self.ifd.number, chunks.len());
        Ok(ImageData { organization: Organization::Tiles, chunks })
    }
}

/// Tile width and height in pixels
///
/// Both tags are required for a tiled image.
pub fn tile_dimensions(ifd: &IFD) -> TiffResult<(usize, usize)> {
    let width = IFD::to_usize(tags::TILE_WIDTH, ifd.get_int(tags::TILE_WIDTH)?)?;
    let height = IFD::to_usize(tags::TILE_LENGTH, ifd.get_int(tags::TILE_LENGTH)?)?;
    if width == 0 || height == 0 {
        return Err(TiffError::InvalidEntry(format!(
            "IFD #{}: tile size {}x{} is empty",
            ifd.number, width, height
        )));
    }
    Ok((width, height))
}
