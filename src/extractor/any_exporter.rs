//! Format dispatcher
//!
//! Tries an ordered list of exporter variants and keeps the first that
//! decodes the directory. Within each photometric family the variants run
//! from the narrowest destination type upwards.

use log::{debug, info, trace};

use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::header::Header;
use crate::tiff::ifd::IFD;

use super::exporter::Exporter;
use super::gray_exporter::GrayExporter;
use super::image::Image;
use super::palette_exporter::PaletteExporter;
use super::rgb_exporter::RgbExporter;
use super::ImageData;

/// Exporter that picks the first matching variant
///
/// A `FormatNotSupported` failure only moves on to the next variant; any
/// other error ends the export.
pub struct AnyExporter {
    candidates: Vec<Box<dyn Exporter>>,
}

impl AnyExporter {
    /// Dispatcher over every built-in variant
    pub fn new() -> Self {
        let candidates: Vec<Box<dyn Exporter>> = vec![
            Box::new(GrayExporter::<u8, u8>::new()),
            Box::new(GrayExporter::<u16, u8>::new()),
            Box::new(GrayExporter::<u16, u16>::new()),
            Box::new(GrayExporter::<u32, u8>::new()),
            Box::new(GrayExporter::<u32, u32>::new()),
            Box::new(PaletteExporter::<u8, u8>::new()),
            Box::new(PaletteExporter::<u16, u8>::new()),
            Box::new(PaletteExporter::<u16, u16>::new()),
            Box::new(RgbExporter::<u8, u8>::new()),
            Box::new(RgbExporter::<u16, u8>::new()),
            Box::new(RgbExporter::<u16, u16>::new()),
            Box::new(RgbExporter::<u32, u8>::new()),
            Box::new(RgbExporter::<u32, u32>::new()),
        ];
        AnyExporter { candidates }
    }

    /// Dispatcher over a custom list, tried in order
    pub fn with_candidates(candidates: Vec<Box<dyn Exporter>>) -> Self {
        AnyExporter { candidates }
    }

    /// Names of the variants in the order they are tried
    pub fn candidate_names(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.name()).collect()
    }
}

impl Default for AnyExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for AnyExporter {
    fn name(&self) -> String {
        "any".to_string()
    }

    fn supports(&self, ifd: &IFD) -> TiffResult<bool> {
        for candidate in &self.candidates {
            if candidate.supports(ifd)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn export(&self, header: &Header, ifd: &IFD, data: &ImageData) -> TiffResult<Image> {
        for candidate in &self.candidates {
            if !candidate.supports(ifd)? {
                trace!("{} does not apply to IFD #{}", candidate.name(), ifd.number);
                continue;
            }

            match candidate.export(header, ifd, data) {
                Ok(image) if image.data_size() > 0 => {
                    info!("IFD #{} decoded by {}", ifd.number, candidate.name());
                    return Ok(image);
                }
                Ok(_) => debug!("{} produced an empty image for IFD #{}", candidate.name(), ifd.number),
                Err(e) if e.is_format_not_supported() => {
                    debug!("{} rejected IFD #{}: {}", candidate.name(), ifd.number, e)
                }
                Err(e) => return Err(e),
            }
        }

        Err(TiffError::FormatNotSupported(format!(
            "no decoder for IFD #{} (photometric {:?}, bits per sample {:?})",
            ifd.number,
            ifd.get_int(tags::PHOTOMETRIC_INTERPRETATION).ok(),
            ifd.get_int_vec(tags::BITS_PER_SAMPLE).ok()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order() {
        let names = AnyExporter::new().candidate_names();
        assert_eq!(
            &names[..5],
            &["gray<u8,u8>", "gray<u16,u8>", "gray<u16,u16>", "gray<u32,u8>", "gray<u32,u32>"]
        );
        assert_eq!(&names[5..8], &["palette<u8,u8>", "palette<u16,u8>", "palette<u16,u16>"]);
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn test_empty_directory_is_not_supported() {
        let header = Header::new(crate::io::byte_order::ByteOrder::LittleEndian, 8).unwrap();
        let ifd = IFD::new(3, 8);
        let data = ImageData { organization: super::super::Organization::Strips, chunks: Vec::new() };
        let err = AnyExporter::new().export(&header, &ifd, &data).unwrap_err();
        assert!(err.is_format_not_supported());
        assert!(err.to_string().contains("IFD #3"));
    }
}
