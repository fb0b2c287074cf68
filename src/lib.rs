//! Read-only TIFF decoder
//!
//! Parses the TIFF container (header, directory chain, field values) and
//! reconstructs pixel buffers from uncompressed strips or tiles of any
//! sample depth from 1 to 32 bits.

pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod extractor;
pub mod api;

pub use crate::api::TiffKit;

pub use tiff::{load, load_file, LoadOptions, TiffError, TiffReader, TiffResult};
pub use extractor::{AnyExporter, Exporter, Image, ImageData};

pub const MAJOR_VERSION: u32 = 0;
pub const MINOR_VERSION: u32 = 1;
pub const PATCH_VERSION: u32 = 0;

/// Library version as `MAJOR.MINOR.PATCH`
pub fn version() -> String {
    format!("{}.{}.{}", MAJOR_VERSION, MINOR_VERSION, PATCH_VERSION)
}
