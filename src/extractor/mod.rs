//! Pixel extraction from TIFF directories
//!
//! The locator half (`StripReader`, `TileReader`, [`read_image_data`])
//! fetches the raw chunks of a directory. The decode half models strips and
//! tiles as rectangles, unpacks their samples and maps them into an
//! [`Image`] through one of the exporters, optionally chosen by
//! [`AnyExporter`].

mod strip_reader;
mod tile_reader;
mod rect;
mod unpack;
mod image;
mod exporter;
mod gray_exporter;
mod palette_exporter;
mod rgb_exporter;
mod any_exporter;

use log::{debug, info};

use crate::io::seekable::{self, SeekableReader};
use crate::tiff::constants::{header, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::utils::tag_utils;

pub use strip_reader::StripReader;
pub use tile_reader::TileReader;
pub use rect::{Rect, RectInfo, RectLayout};
pub use unpack::{BitAccumulator, SampleWord, WordCursor};
pub use image::Image;
pub use exporter::Exporter;
pub use gray_exporter::GrayExporter;
pub use palette_exporter::PaletteExporter;
pub use rgb_exporter::RgbExporter;
pub use any_exporter::AnyExporter;

/// How a directory's pixel data is split into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Organization {
    Strips,
    Tiles,
}

impl Organization {
    /// Organization declared by a directory's tags
    ///
    /// Strips win when both tag sets are present.
    pub fn of(ifd: &IFD) -> TiffResult<Self> {
        if ifd.has_tag(tags::STRIP_OFFSETS) {
            Ok(Organization::Strips)
        } else if ifd.has_tag(tags::TILE_BYTE_COUNTS) {
            Ok(Organization::Tiles)
        } else {
            Err(TiffError::UnsupportedLayout(format!(
                "IFD #{} has neither strip nor tile offsets",
                ifd.number
            )))
        }
    }
}

/// Raw strip or tile chunks of one directory, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub organization: Organization,
    pub chunks: Vec<Vec<u8>>,
}

impl ImageData {
    /// Total number of bytes over all chunks
    pub fn total_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }
}

/// Reads every strip or tile of a directory
///
/// All chunks are read eagerly before any decoding happens.
pub fn read_image_data<R: SeekableReader>(reader: &mut R, ifd: &IFD) -> TiffResult<ImageData> {
    let data = match Organization::of(ifd)? {
        Organization::Strips => StripReader::new(reader, ifd).read_strips()?,
        Organization::Tiles => TileReader::new(reader, ifd).read_tiles()?,
    };
    info!(
        "Read {} {:?} chunks ({} bytes) for IFD #{}",
        data.chunks.len(),
        data.organization,
        data.total_bytes(),
        ifd.number
    );
    Ok(data)
}

/// Reads the chunks described by an offsets/byte-counts tag pair
pub(crate) fn read_chunk_table<R: SeekableReader>(
    reader: &mut R,
    ifd: &IFD,
    offsets_tag: u16,
    counts_tag: u16,
) -> TiffResult<Vec<Vec<u8>>> {
    let offsets = ifd.get_int_vec(offsets_tag)?;
    let counts = ifd.get_int_vec(counts_tag)?;

    if offsets.len() != counts.len() {
        return Err(TiffError::UnsupportedLayout(format!(
            "{} has {} values but {} has {}",
            tag_utils::get_tag_name(offsets_tag),
            offsets.len(),
            tag_utils::get_tag_name(counts_tag),
            counts.len()
        )));
    }

    let file_size = seekable::stream_len(reader)?;
    let mut chunks = Vec::with_capacity(offsets.len());

    for (index, (&offset, &count)) in offsets.iter().zip(&counts).enumerate() {
        if offset < header::HEADER_SIZE as i64 || count <= 0 {
            return Err(TiffError::UnsupportedLayout(format!(
                "chunk {} has offset {} and byte count {}",
                index, offset, count
            )));
        }
        let (offset, count) = (offset as u64, count as u64);
        let available = file_size.saturating_sub(offset);
        if count > available {
            return Err(TiffError::TruncatedData {
                expected: count as usize,
                actual: available as usize,
            });
        }

        debug!("Reading chunk {} at offset {} ({} bytes)", index, offset, count);
        chunks.push(seekable::read_vec_at(reader, offset, count as usize)?);
    }

    Ok(chunks)
}
