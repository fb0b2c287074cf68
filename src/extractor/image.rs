//! Decoded image container

use crate::tiff::errors::{TiffError, TiffResult};

use super::unpack::SampleWord;

/// A decoded raster
///
/// Samples are stored interleaved in host byte order, each `bit_depth` bits
/// wide. Strides are in bytes, so the sample at `(row, col, chan)` starts
/// at `row * row_stride + col * col_stride + chan * chan_stride`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub row_stride: usize,
    pub col_stride: usize,
    pub chan_stride: usize,
    /// Bits per channel sample: 8, 16 or 32
    pub bit_depth: u32,
    data: Vec<u8>,
}

impl Image {
    /// Allocates a zeroed interleaved image with samples of type `T`
    ///
    /// Fails with `InvalidEntry` when the buffer size overflows `usize`.
    pub fn new<T: SampleWord>(width: usize, height: usize, channels: usize) -> TiffResult<Self> {
        let chan_stride = T::BYTES;
        let too_large = || {
            TiffError::InvalidEntry(format!(
                "{}x{} image with {} channels of {} bits is too large",
                width,
                height,
                channels,
                T::BITS
            ))
        };
        let col_stride = chan_stride.checked_mul(channels).ok_or_else(too_large)?;
        let row_stride = col_stride.checked_mul(width).ok_or_else(too_large)?;
        let size = row_stride.checked_mul(height).ok_or_else(too_large)?;
        Ok(Image {
            width,
            height,
            channels,
            row_stride,
            col_stride,
            chan_stride,
            bit_depth: T::BITS,
            data: vec![0; size],
        })
    }

    /// Byte offset of a sample
    pub fn offset(&self, row: usize, col: usize, chan: usize) -> usize {
        row * self.row_stride + col * self.col_stride + chan * self.chan_stride
    }

    /// One sample, or `None` outside the image or for a mismatched type
    pub fn sample<T: SampleWord>(&self, row: usize, col: usize, chan: usize) -> Option<T> {
        if T::BITS != self.bit_depth || row >= self.height || col >= self.width || chan >= self.channels {
            return None;
        }
        let offset = self.offset(row, col, chan);
        self.data.get(offset..offset + T::BYTES).map(T::read_ne)
    }

    /// All samples in row-major, channel-interleaved order
    pub fn samples<T: SampleWord>(&self) -> Vec<T> {
        if T::BITS != self.bit_depth {
            return Vec::new();
        }
        self.data.chunks_exact(T::BYTES).map(T::read_ne).collect()
    }

    pub(crate) fn put<T: SampleWord>(&mut self, row: usize, col: usize, chan: usize, value: T) {
        let offset = self.offset(row, col, chan);
        value.write_ne(&mut self.data[offset..offset + T::BYTES]);
    }

    /// Inverts every bit of the buffer
    pub(crate) fn invert(&mut self) {
        self.data.iter_mut().for_each(|b| *b = !*b);
    }

    /// Size of the pixel buffer in bytes
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Raw pixel buffer
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Takes ownership of the pixel buffer
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
