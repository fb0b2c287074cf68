//! High-level decoding interface

use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::extractor::{AnyExporter, Exporter, Image, Organization};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::{load, LoadOptions, TiffReader};
use crate::utils::tag_utils;

/// Structural summary of one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdSummary {
    pub number: usize,
    pub offset: u64,
    pub entry_count: usize,
    pub dimensions: Option<(usize, usize)>,
    pub samples_per_pixel: usize,
    pub bits_per_sample: Vec<i64>,
    pub compression: &'static str,
    pub photometric: Option<&'static str>,
    pub organization: Option<Organization>,
}

impl IfdSummary {
    fn of(ifd: &IFD) -> TiffResult<Self> {
        Ok(IfdSummary {
            number: ifd.number,
            offset: ifd.offset,
            entry_count: ifd.entry_count(),
            dimensions: ifd.get_dimensions().ok(),
            samples_per_pixel: ifd.get_samples_per_pixel()?,
            bits_per_sample: ifd.get_int_vec_or(tags::BITS_PER_SAMPLE, &[1])?,
            compression: tag_utils::get_compression_name(
                ifd.get_int_or(tags::COMPRESSION, compression::NONE as i64)?,
            ),
            photometric: ifd
                .get_int(tags::PHOTOMETRIC_INTERPRETATION)
                .ok()
                .map(tag_utils::get_photometric_name),
            organization: Organization::of(ifd).ok(),
        })
    }
}

/// Main interface to the tiffkit library
#[derive(Default)]
pub struct TiffKit {
    exporter: AnyExporter,
}

impl TiffKit {
    /// Create a new TiffKit instance using every built-in decoder
    pub fn new() -> Self {
        TiffKit { exporter: AnyExporter::new() }
    }

    /// Decode one directory of a TIFF file
    ///
    /// # Arguments
    /// * `input_path` - Path to the TIFF file
    /// * `ifd_index` - Index of the directory to decode
    ///
    /// # Returns
    /// The decoded image or an error
    pub fn decode_file<P: AsRef<Path>>(&self, input_path: P, ifd_index: usize) -> TiffResult<Image> {
        let input_path = input_path.as_ref();
        info!("Decoding IFD #{} of {}", ifd_index, input_path.display());
        let mut reader = BufReader::new(File::open(input_path)?);
        self.decode_reader(&mut reader, ifd_index)
    }

    /// Decode one directory of a TIFF stream
    pub fn decode_reader<R: SeekableReader>(&self, reader: &mut R, ifd_index: usize) -> TiffResult<Image> {
        let mut decoded = None;
        load(
            reader,
            |header, ifd, data| {
                decoded = Some(self.exporter.export(header, ifd, &data)?);
                Ok(())
            },
            &LoadOptions::single(ifd_index),
        )?;
        decoded.ok_or_else(|| TiffError::GenericError(format!("IFD #{} produced no image", ifd_index)))
    }

    /// Summarize the directory chain of a TIFF file without decoding pixels
    pub fn inspect<P: AsRef<Path>>(&self, input_path: P) -> TiffResult<Vec<IfdSummary>> {
        let file = TiffReader::open(input_path)?;
        file.ifds.iter().map(IfdSummary::of).collect()
    }
}
