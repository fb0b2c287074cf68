//! TIFF tag utilities
//!
//! Human-readable names for tags and enumerated tag values, used in log
//! output and error messages.

use crate::tiff::constants::{compression, photometric, tags};

/// Get the name of a TIFF tag
///
/// Returns a human-readable name for a tag based on its numeric ID.
/// If the tag is not recognized, returns "Unknown".
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::NEW_SUBFILE_TYPE => "NewSubfileType",
        tags::SUBFILE_TYPE => "SubfileType",
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::THRESHOLDING => "Thresholding",
        tags::FILL_ORDER => "FillOrder",
        tags::DOCUMENT_NAME => "DocumentName",
        tags::IMAGE_DESCRIPTION => "ImageDescription",
        tags::MAKE => "Make",
        tags::MODEL => "Model",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::ORIENTATION => "Orientation",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::MIN_SAMPLE_VALUE => "MinSampleValue",
        tags::MAX_SAMPLE_VALUE => "MaxSampleValue",
        tags::X_RESOLUTION => "XResolution",
        tags::Y_RESOLUTION => "YResolution",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::PAGE_NAME => "PageName",
        tags::RESOLUTION_UNIT => "ResolutionUnit",
        tags::SOFTWARE => "Software",
        tags::DATE_TIME => "DateTime",
        tags::ARTIST => "Artist",
        tags::COLOR_MAP => "ColorMap",
        tags::HALFTONE_HINTS => "HalftoneHints",
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_LENGTH => "TileLength",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::TILE_BYTE_COUNTS => "TileByteCounts",
        tags::SAMPLE_FORMAT => "SampleFormat",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
pub fn get_compression_name(compression_code: i64) -> &'static str {
    match u16::try_from(compression_code) {
        Ok(compression::NONE) => "None",
        Ok(compression::CCITT_RLE) => "CCITT RLE",
        Ok(compression::CCITT_FAX3) => "CCITT Group 3 Fax",
        Ok(compression::CCITT_FAX4) => "CCITT Group 4 Fax",
        Ok(compression::LZW) => "LZW",
        Ok(compression::JPEG_OLD) => "Old JPEG",
        Ok(compression::JPEG) => "JPEG",
        Ok(compression::DEFLATE) => "Adobe Deflate",
        Ok(compression::PACKBITS) => "PackBits",
        _ => "Unknown",
    }
}

/// Get the name of a photometric interpretation method
pub fn get_photometric_name(photometric_code: i64) -> &'static str {
    match u16::try_from(photometric_code) {
        Ok(photometric::WHITE_IS_ZERO) => "WhiteIsZero",
        Ok(photometric::BLACK_IS_ZERO) => "BlackIsZero",
        Ok(photometric::RGB) => "RGB",
        Ok(photometric::PALETTE) => "Palette",
        Ok(photometric::TRANSPARENCY_MASK) => "TransparencyMask",
        Ok(photometric::SEPARATED) => "Separated",
        Ok(photometric::YCBCR) => "YCbCr",
        Ok(photometric::CIELAB) => "CIELAB",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_names() {
        assert_eq!(get_tag_name(0x0111), "StripOffsets");
        assert_eq!(get_tag_name(0x0145), "TileByteCounts");
        assert_eq!(get_tag_name(0xFFFF), "Unknown");
        assert_eq!(get_compression_name(5), "LZW");
        assert_eq!(get_compression_name(-1), "Unknown");
        assert_eq!(get_photometric_name(3), "Palette");
    }
}
