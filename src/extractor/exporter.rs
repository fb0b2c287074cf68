//! Exporter strategy trait and the decode loop shared by all exporters
//!
//! An exporter is parametrized by a destination sample type `Dst` (the
//! width of the decoded samples) and a source word type `Src` (the unit raw
//! bits are read in). A variant accepts a sample depth `b` when `Dst` is
//! the narrowest destination holding it and `Src` can read it: either `b`
//! equals the word width or bytes are unpacked bit by bit.

use log::debug;

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{fill_order, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::header::Header;
use crate::tiff::ifd::IFD;

use super::image::Image;
use super::rect::RectLayout;
use super::unpack::{self, SampleWord};
use super::{ImageData, Organization};

/// Strategy for turning a directory's raw data into an [`Image`]
pub trait Exporter {
    /// Short name of the variant, used in log output
    fn name(&self) -> String;

    /// Whether the directory's photometric interpretation, sample count
    /// and depth fall within this variant
    ///
    /// Malformed tags are reported as errors rather than as `false`.
    fn supports(&self, ifd: &IFD) -> TiffResult<bool>;

    /// Decodes the image
    ///
    /// Fails with `FormatNotSupported` when the directory is outside this
    /// variant; other errors mean the data itself is unusable.
    fn export(&self, header: &Header, ifd: &IFD, data: &ImageData) -> TiffResult<Image>;
}

/// Whether `bits`-wide samples belong to the `<Dst, Src>` variant
pub(crate) fn accepts_depth<Dst: SampleWord, Src: SampleWord>(bits: u32) -> bool {
    let fits_dst = if Dst::BITS == 8 {
        (1..=8).contains(&bits)
    } else {
        bits > Dst::BITS / 2 && bits <= Dst::BITS
    };
    let readable = bits == Src::BITS || (Src::BITS == 8 && bits != 16 && bits != 32);
    fits_dst && readable
}

pub(crate) fn check_depth<Dst: SampleWord, Src: SampleWord>(bits: u32) -> TiffResult<()> {
    if accepts_depth::<Dst, Src>(bits) {
        Ok(())
    } else {
        Err(TiffError::FormatNotSupported(format!(
            "{}-bit samples in u{} words decoded to u{}",
            bits,
            Src::BITS,
            Dst::BITS
        )))
    }
}

/// The single bit depth shared by all `samples` channels
///
/// `BitsPerSample` may list one value or one per sample; it defaults to 1.
pub(crate) fn uniform_bits(ifd: &IFD, samples: usize) -> TiffResult<u32> {
    let bits = ifd.get_int_vec_or(tags::BITS_PER_SAMPLE, &[1])?;
    let first = bits.first().copied().unwrap_or(1);

    if (bits.len() != 1 && bits.len() != samples) || bits.iter().any(|&b| b != first) {
        return Err(TiffError::FormatNotSupported(format!(
            "BitsPerSample {:?} for {} samples in IFD #{}",
            bits, samples, ifd.number
        )));
    }
    if !(1..=32).contains(&first) {
        return Err(TiffError::FormatNotSupported(format!("{}-bit samples", first)));
    }
    Ok(first as u32)
}

/// Turns a directory check into a `supports` answer
///
/// `FormatNotSupported` means "not this variant"; every other error is
/// passed on.
pub(crate) fn applies<T>(check: TiffResult<T>) -> TiffResult<bool> {
    match check {
        Ok(_) => Ok(true),
        Err(e) if e.is_format_not_supported() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Photometric interpretation code, or `None` when absent
pub(crate) fn photometric(ifd: &IFD) -> TiffResult<Option<i64>> {
    if !ifd.has_tag(tags::PHOTOMETRIC_INTERPRETATION) {
        return Ok(None);
    }
    ifd.get_int(tags::PHOTOMETRIC_INTERPRETATION).map(Some)
}

/// Requires MSB-first bit order
pub(crate) fn check_fill_order(ifd: &IFD) -> TiffResult<()> {
    match ifd.get_int_or(tags::FILL_ORDER, fill_order::MSB_TO_LSB as i64)? {
        f if f == fill_order::MSB_TO_LSB as i64 => Ok(()),
        f => Err(TiffError::FormatNotSupported(format!("fill order {} in IFD #{}", f, ifd.number))),
    }
}

/// Linear rescale from `[0, 2^bits - 1]` to the full range of `Dst`
pub(crate) fn rescale<Dst: SampleWord>(value: u32, bits: u32) -> Dst {
    let max_src = (1u64 << bits) - 1;
    Dst::from_u32((value as u64 * Dst::max_value() / max_src) as u32)
}

/// Validated, decompressed blocks of one directory
///
/// Building a source checks the organization, the chunk count and the size
/// of every block, so exporters can size their output afterwards knowing
/// the data covers it.
pub(crate) struct SampleSource {
    layout: RectLayout,
    blocks: Vec<Vec<u8>>,
    order: ByteOrder,
    ifd_number: usize,
}

impl SampleSource {
    pub(crate) fn new(header: &Header, ifd: &IFD, data: &ImageData, bits: u32) -> TiffResult<Self> {
        let handler: Box<dyn CompressionHandler> = CompressionFactory::for_ifd(ifd)?;
        let organization = Organization::of(ifd)?;
        if organization != data.organization {
            return Err(TiffError::UnsupportedLayout(format!(
                "IFD #{} describes {:?} but data holds {:?}",
                ifd.number, organization, data.organization
            )));
        }

        let layout = RectLayout::from_ifd(ifd, organization, bits)?;
        layout.check(data)?;

        let blocks = layout
            .rects()
            .zip(&data.chunks)
            .map(|(rect, chunk)| {
                let block = handler.decompress(chunk)?;
                let needed = rect.info.byte_len()?;
                if block.len() < needed {
                    return Err(TiffError::TruncatedData { expected: needed, actual: block.len() });
                }
                Ok(block)
            })
            .collect::<TiffResult<Vec<_>>>()?;

        Ok(SampleSource { layout, blocks, order: header.byte_order(), ifd_number: ifd.number })
    }

    /// Unpacks every sample with `Src` words
    ///
    /// `sink` receives `(row, col, channel, value)` in image coordinates,
    /// where `channel` is the sample index for contiguous data and the
    /// plane index for separate planes.
    pub(crate) fn for_each_sample<Src, F>(&self, mut sink: F) -> TiffResult<()>
    where
        Src: SampleWord,
        F: FnMut(usize, usize, usize, u32),
    {
        let spp = self.layout.samples_per_pixel;
        for (rect, block) in self.layout.rects().zip(&self.blocks) {
            unpack::unpack_rect::<Src, _>(block, &rect.info, spp, self.order, |row, col, sample, value| {
                sink(rect.y + row, rect.x + col, rect.plane + sample, value)
            })?;
        }

        debug!("Unpacked {} blocks of IFD #{}", self.blocks.len(), self.ifd_number);
        Ok(())
    }
}
