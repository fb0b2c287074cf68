//! Palette-color exporter

use log::debug;
use std::marker::PhantomData;

use crate::tiff::constants::{photometric, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::header::Header;
use crate::tiff::ifd::IFD;

use super::exporter::{self, Exporter, SampleSource};
use super::image::Image;
use super::unpack::SampleWord;
use super::ImageData;

/// Decodes palette-color images into three-channel RGB
///
/// The `ColorMap` holds all red values, then all green, then all blue, one
/// 16-bit value per palette index each. Outputs keep the top `Dst` bits.
pub struct PaletteExporter<Dst, Src> {
    _types: PhantomData<(Dst, Src)>,
}

impl<Dst: SampleWord, Src: SampleWord> PaletteExporter<Dst, Src> {
    pub fn new() -> Self {
        PaletteExporter { _types: PhantomData }
    }

    fn check(&self, ifd: &IFD) -> TiffResult<u32> {
        if exporter::photometric(ifd)? != Some(photometric::PALETTE as i64) {
            return Err(TiffError::FormatNotSupported("not a palette-color image".to_string()));
        }
        if Dst::BITS > 16 {
            return Err(TiffError::FormatNotSupported(format!("palette output of {} bits", Dst::BITS)));
        }
        let samples = ifd.get_samples_per_pixel()?;
        if samples != 1 {
            return Err(TiffError::FormatNotSupported(format!("palette with {} samples per pixel", samples)));
        }
        let bits = exporter::uniform_bits(ifd, samples)?;
        exporter::check_depth::<Dst, Src>(bits)?;
        Ok(bits)
    }

    /// Color map values, checked to cover every index
    fn color_map(ifd: &IFD, colors: usize) -> TiffResult<Vec<u16>> {
        let values = ifd.get_int_vec(tags::COLOR_MAP)?;
        if values.len() < 3 * colors {
            return Err(TiffError::InvalidEntry(format!(
                "ColorMap has {} entries, {} colors need {}",
                values.len(),
                colors,
                3 * colors
            )));
        }
        values
            .into_iter()
            .map(|v| u16::try_from(v).map_err(|_| TiffError::InvalidEntry(format!("ColorMap value {}", v))))
            .collect()
    }
}

impl<Dst: SampleWord, Src: SampleWord> Default for PaletteExporter<Dst, Src> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Dst: SampleWord, Src: SampleWord> Exporter for PaletteExporter<Dst, Src> {
    fn name(&self) -> String {
        format!("palette<u{},u{}>", Dst::BITS, Src::BITS)
    }

    fn supports(&self, ifd: &IFD) -> TiffResult<bool> {
        exporter::applies(self.check(ifd))
    }

    fn export(&self, header: &Header, ifd: &IFD, data: &ImageData) -> TiffResult<Image> {
        let bits = self.check(ifd)?;
        exporter::check_fill_order(ifd)?;

        let colors = 1usize << bits;
        let color_map = Self::color_map(ifd, colors)?;
        let shift = 16 - Dst::BITS;

        let source = SampleSource::new(header, ifd, data, bits)?;
        let (width, height) = ifd.get_dimensions()?;
        let mut image = Image::new::<Dst>(width, height, 3)?;

        source.for_each_sample::<Src, _>(|row, col, _, index| {
            for channel in 0..3 {
                let value = color_map[channel * colors + index as usize] >> shift;
                image.put(row, col, channel, Dst::from_u32(value as u32));
            }
        })?;

        debug!("{} decoded {}x{} image with {} colors", self.name(), width, height, colors);
        Ok(image)
    }
}
