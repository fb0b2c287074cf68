//! Factory for creating compression handlers

use log::debug;

use crate::tiff::constants::{compression, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::utils::tag_utils;
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for the given compression code
    ///
    /// Only uncompressed data is decoded; every other code is reported as
    /// `FormatNotSupported`.
    pub fn create_handler(code: i64) -> TiffResult<Box<dyn CompressionHandler>> {
        match code {
            c if c == compression::NONE as i64 => Ok(Box::new(UncompressedHandler)),
            _ => Err(TiffError::FormatNotSupported(format!(
                "compression {} ({})",
                code,
                tag_utils::get_compression_name(code)
            ))),
        }
    }

    /// Handler for the `Compression` tag of a directory (default 1)
    pub fn for_ifd(ifd: &IFD) -> TiffResult<Box<dyn CompressionHandler>> {
        let code = ifd.get_int_or(tags::COMPRESSION, compression::NONE as i64)?;
        let handler = Self::create_handler(code)?;
        debug!("IFD #{} uses {} compression", ifd.number, handler.name());
        Ok(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::ifd::IFDEntry;

    #[test]
    fn test_uncompressed_passes_data_through() {
        let handler = CompressionFactory::create_handler(1).unwrap();
        assert_eq!(handler.code(), 1);
        assert_eq!(handler.decompress(&[1, 2, 3]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_other_codes_are_not_supported() {
        for code in [2, 5, 7, 8, 32773] {
            let err = CompressionFactory::create_handler(code).err().unwrap();
            assert!(err.is_format_not_supported(), "code {}", code);
        }
    }

    #[test]
    fn test_missing_compression_tag_defaults_to_none() {
        let ifd = IFD::new(0, 8);
        assert_eq!(CompressionFactory::for_ifd(&ifd).unwrap().code(), 1);

        let mut ifd = IFD::new(0, 8);
        ifd.add_entry(IFDEntry::shorts(tags::COMPRESSION, &[5]).unwrap());
        assert!(CompressionFactory::for_ifd(&ifd).is_err());
    }
}
