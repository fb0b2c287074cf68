//! Grayscale exporter

use log::debug;
use std::marker::PhantomData;

use crate::tiff::constants::photometric;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::header::Header;
use crate::tiff::ifd::IFD;

use super::exporter::{self, Exporter, SampleSource};
use super::image::Image;
use super::unpack::SampleWord;
use super::ImageData;

/// Decodes single-sample WhiteIsZero and BlackIsZero images
///
/// Samples are rescaled to the full range of `Dst`. WhiteIsZero images are
/// inverted once decoding is complete, so 0 is always black in the output.
pub struct GrayExporter<Dst, Src> {
    _types: PhantomData<(Dst, Src)>,
}

impl<Dst: SampleWord, Src: SampleWord> GrayExporter<Dst, Src> {
    pub fn new() -> Self {
        GrayExporter { _types: PhantomData }
    }

    /// Validates the directory, returning its photometric code and depth
    fn check(&self, ifd: &IFD) -> TiffResult<(i64, u32)> {
        let interpretation = match exporter::photometric(ifd)? {
            Some(p) if p == photometric::WHITE_IS_ZERO as i64 || p == photometric::BLACK_IS_ZERO as i64 => p,
            other => {
                return Err(TiffError::FormatNotSupported(format!(
                    "photometric interpretation {:?} is not grayscale",
                    other
                )))
            }
        };
        let samples = ifd.get_samples_per_pixel()?;
        if samples != 1 {
            return Err(TiffError::FormatNotSupported(format!("grayscale with {} samples per pixel", samples)));
        }
        let bits = exporter::uniform_bits(ifd, samples)?;
        exporter::check_depth::<Dst, Src>(bits)?;
        Ok((interpretation, bits))
    }
}

impl<Dst: SampleWord, Src: SampleWord> Default for GrayExporter<Dst, Src> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Dst: SampleWord, Src: SampleWord> Exporter for GrayExporter<Dst, Src> {
    fn name(&self) -> String {
        format!("gray<u{},u{}>", Dst::BITS, Src::BITS)
    }

    fn supports(&self, ifd: &IFD) -> TiffResult<bool> {
        exporter::applies(self.check(ifd))
    }

    fn export(&self, header: &Header, ifd: &IFD, data: &ImageData) -> TiffResult<Image> {
        let (interpretation, bits) = self.check(ifd)?;
        exporter::check_fill_order(ifd)?;

        let source = SampleSource::new(header, ifd, data, bits)?;
        let (width, height) = ifd.get_dimensions()?;
        let mut image = Image::new::<Dst>(width, height, 1)?;

        source.for_each_sample::<Src, _>(|row, col, _, value| {
            image.put(row, col, 0, exporter::rescale::<Dst>(value, bits))
        })?;

        if interpretation == photometric::WHITE_IS_ZERO as i64 {
            image.invert();
        }

        debug!("{} decoded {}x{} {}-bit image", self.name(), width, height, bits);
        Ok(image)
    }
}
