//! TIFF file format parsing module
//!
//! This module provides structures and functions for reading classic TIFF
//! files: the header, the directory chain and the field values.

pub mod errors;
pub mod ifd;
pub mod types;
pub mod header;
pub mod reader;
pub mod writer;
pub mod constants;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use header::Header;
pub use ifd::{IFD, IFDEntry, ValueStorage};
pub use reader::{load, load_file, LoadOptions, TiffReader};
pub use types::{FieldType, FieldValues, Rational, SRational, TiffFile};
pub use writer::TiffWriter;
