//! Rectangle model shared by strips and tiles
//!
//! A strip is a tile as wide as the image, so both organizations reduce to
//! a grid of `across × down` blocks in row-major order, repeated once per
//! plane when samples are stored separately. Blocks on the right and bottom
//! edges are clipped to the image.

use log::debug;

use crate::tiff::constants::{planar_config, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;

use super::{strip_reader, tile_reader, ImageData, Organization};

/// Geometry of one stored block as seen by the unpacker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectInfo {
    /// Pixels to decode per row (clipped to the image)
    pub width: usize,
    /// Rows to decode (clipped to the image)
    pub height: usize,
    /// Bytes between the starts of two stored rows
    pub row_stride: usize,
    pub bits_per_sample: u32,
}

impl RectInfo {
    /// Bytes a stored block must hold: `row_stride × height`
    pub fn byte_len(&self) -> TiffResult<usize> {
        self.row_stride.checked_mul(self.height).ok_or_else(|| {
            TiffError::InvalidEntry(format!(
                "block of {} rows of {} bytes is too large",
                self.height, self.row_stride
            ))
        })
    }
}

/// A block placed in the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Column of the block's first pixel
    pub x: usize,
    /// Row of the block's first pixel
    pub y: usize,
    /// Plane index; always 0 for contiguous samples
    pub plane: usize,
    pub info: RectInfo,
}

/// Block grid of one directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectLayout {
    pub image_width: usize,
    pub image_height: usize,
    pub block_width: usize,
    pub block_height: usize,
    /// Samples stored per pixel inside one block
    pub samples_per_pixel: usize,
    pub planes: usize,
    pub bits_per_sample: u32,
}

impl RectLayout {
    /// Derives the grid from a directory's tags
    ///
    /// # Arguments
    /// * `ifd` - Directory describing the image
    /// * `organization` - Strip or tile organization of its data
    /// * `bits_per_sample` - Stored width of every sample
    pub fn from_ifd(ifd: &IFD, organization: Organization, bits_per_sample: u32) -> TiffResult<Self> {
        let (image_width, image_height) = ifd.get_dimensions()?;
        let samples = ifd.get_samples_per_pixel()?;

        let (samples_per_pixel, planes) = match ifd.get_int_or(tags::PLANAR_CONFIGURATION, planar_config::CHUNKY as i64)? {
            _ if samples == 1 => (1, 1),
            p if p == planar_config::CHUNKY as i64 => (samples, 1),
            p if p == planar_config::PLANAR as i64 => (1, samples),
            p => {
                return Err(TiffError::FormatNotSupported(format!(
                    "planar configuration {} in IFD #{}",
                    p, ifd.number
                )))
            }
        };

        let (block_width, block_height) = match organization {
            Organization::Strips => (image_width, strip_reader::rows_per_strip(ifd)?),
            Organization::Tiles => tile_reader::tile_dimensions(ifd)?,
        };

        let layout = RectLayout {
            image_width,
            image_height,
            block_width,
            block_height,
            samples_per_pixel,
            planes,
            bits_per_sample,
        };
        debug!("IFD #{} layout: {:?}", ifd.number, layout);
        Ok(layout)
    }

    /// Blocks per row of the grid
    pub fn across(&self) -> usize {
        if self.block_width == 0 {
            return 0;
        }
        self.image_width.div_ceil(self.block_width)
    }

    /// Blocks per column of the grid
    pub fn down(&self) -> usize {
        if self.block_height == 0 {
            return 0;
        }
        self.image_height.div_ceil(self.block_height)
    }

    /// Number of chunks the data must hold
    ///
    /// Saturates instead of overflowing; no chunk list can match a
    /// saturated count.
    pub fn chunk_count(&self) -> usize {
        self.across().saturating_mul(self.down()).saturating_mul(self.planes)
    }

    /// Bytes per stored row of a block; rows start on byte boundaries
    pub fn row_stride(&self) -> usize {
        let bits = (self.block_width as u128) * (self.samples_per_pixel as u128) * (self.bits_per_sample as u128);
        usize::try_from(bits.div_ceil(8)).unwrap_or(usize::MAX)
    }

    /// Verifies the chunk count against the grid
    pub fn check(&self, data: &ImageData) -> TiffResult<()> {
        if data.chunks.len() != self.chunk_count() {
            return Err(TiffError::UnsupportedLayout(format!(
                "expected {} chunks ({} x {} x {} planes), found {}",
                self.chunk_count(),
                self.across(),
                self.down(),
                self.planes,
                data.chunks.len()
            )));
        }
        Ok(())
    }

    /// Blocks in storage order: planes outermost, then rows, then columns
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        let (across, down) = (self.across(), self.down());
        (0..self.planes).flat_map(move |plane| {
            (0..down).flat_map(move |ty| (0..across).map(move |tx| self.rect(tx, ty, plane)))
        })
    }

    fn rect(&self, tx: usize, ty: usize, plane: usize) -> Rect {
        let x = tx * self.block_width;
        let y = ty * self.block_height;
        Rect {
            x,
            y,
            plane,
            info: RectInfo {
                width: self.block_width.min(self.image_width - x),
                height: self.block_height.min(self.image_height - y),
                row_stride: self.row_stride(),
                bits_per_sample: self.bits_per_sample,
            },
        }
    }
}
