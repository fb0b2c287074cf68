//! RGB exporter

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

/// Decodes RGB images with contiguous or separate planes
///
/// Samples beyond the third (alpha and other extra samples) are read and
/// dropped.
pub struct RgbExporter<Dst, Src> {
    _types: PhantomData<(Dst, Src)>,
}

impl<Dst: SampleWord, Src: SampleWord> RgbExporter<Dst, Src> {
    pub fn new() -> Self {
        RgbExporter { _types: PhantomData }
    }

    fn check(&self, ifd: &IFD) -> TiffResult<u32> {
        if exporter::photometric(ifd)? != Some(photometric::RGB as i64) {
            return Err(TiffError::FormatNotSupported("not an RGB image".to_string()));
        }
        let samples = ifd.get_samples_per_pixel()?;
        if samples < 3 {
            return Err(TiffError::FormatNotSupported(format!("RGB with {} samples per pixel", samples)));
        }
        let bits = exporter::uniform_bits(ifd, samples)?;
        exporter::check_depth::<Dst, Src>(bits)?;
        Ok(bits)
    }
}

impl<Dst: SampleWord, Src: SampleWord> Default for RgbExporter<Dst, Src> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Dst: SampleWord, Src: SampleWord> Exporter for RgbExporter<Dst, Src> {
    fn name(&self) -> String {
        format!("rgb<u{},u{}>", Dst::BITS, Src::BITS)
    }

    fn supports(&self, ifd: &IFD) -> TiffResult<bool> {
        exporter::applies(self.check(ifd))
    }

    fn export(&self, header: &Header, ifd: &IFD, data: &ImageData) -> TiffResult<Image> {
        let bits = self.check(ifd)?;

        let source = SampleSource::new(header, ifd, data, bits)?;
        let (width, height) = ifd.get_dimensions()?;
        let mut image = Image::new::<Dst>(width, height, 3)?;

        source.for_each_sample::<Src, _>(|row, col, channel, value| {
            if channel < 3 {
                image.put(row, col, channel, exporter::rescale::<Dst>(value, bits));
            }
        })?;

        debug!("{} decoded {}x{} {}-bit image", self.name(), width, height, bits);
        Ok(image)
    }
}
