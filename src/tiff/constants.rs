//! TIFF format constants
//!
//! This module defines constants used throughout the TIFF processing code,
//! making the code more readable and maintainable by replacing magic numbers
//! with descriptive names.

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// "II" byte order marker for little-endian
    pub const LITTLE_ENDIAN_MARKER: [u8; 2] = [0x49, 0x49];

    /// "MM" byte order marker for big-endian
    pub const BIG_ENDIAN_MARKER: [u8; 2] = [0x4D, 0x4D];

    /// Size of the file header, and the smallest legal directory offset
    pub const HEADER_SIZE: u32 = 8;

    /// Size of one directory entry on disk
    pub const ENTRY_SIZE: u32 = 12;

    /// Bytes available for an inline value in a directory entry
    pub const INLINE_VALUE_SIZE: usize = 4;
}

/// Field type codes of TIFF 6.0
pub mod field_types {
    pub const BYTE: u16 = 1;       // 8-bit unsigned integer
    pub const ASCII: u16 = 2;      // 8-bit byte containing ASCII character
    pub const SHORT: u16 = 3;      // 16-bit unsigned integer
    pub const LONG: u16 = 4;       // 32-bit unsigned integer
    pub const RATIONAL: u16 = 5;   // Two LONGs: numerator and denominator
    pub const SBYTE: u16 = 6;      // 8-bit signed integer
    pub const UNDEFINED: u16 = 7;  // 8-bit byte with unspecified format
    pub const SSHORT: u16 = 8;     // 16-bit signed integer
    pub const SLONG: u16 = 9;      // 32-bit signed integer
    pub const SRATIONAL: u16 = 10; // Two SLONGs: numerator and denominator
    pub const FLOAT: u16 = 11;     // Single precision IEEE floating point
    pub const DOUBLE: u16 = 12;    // Double precision IEEE floating point
}

/// Standard TIFF tags
pub mod tags {
    pub const NEW_SUBFILE_TYPE: u16 = 254;         // Subfile data descriptor
    pub const SUBFILE_TYPE: u16 = 255;             // Old-style subfile data descriptor
    pub const IMAGE_WIDTH: u16 = 256;              // Width of the image in pixels
    pub const IMAGE_LENGTH: u16 = 257;             // Height of the image in pixels
    pub const BITS_PER_SAMPLE: u16 = 258;          // Bits per component
    pub const COMPRESSION: u16 = 259;              // Compression scheme
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 262; // Color space of image data
    pub const THRESHOLDING: u16 = 263;             // Bilevel conversion technique
    pub const FILL_ORDER: u16 = 266;               // Logical order of bits within a byte
    pub const DOCUMENT_NAME: u16 = 269;            // Name of the scanned document
    pub const IMAGE_DESCRIPTION: u16 = 270;        // Free-form description
    pub const MAKE: u16 = 271;                     // Scanner manufacturer
    pub const MODEL: u16 = 272;                    // Scanner model
    pub const STRIP_OFFSETS: u16 = 273;            // Offsets to the data strips
    pub const ORIENTATION: u16 = 274;              // Image orientation
    pub const SAMPLES_PER_PIXEL: u16 = 277;        // Number of components per pixel
    pub const ROWS_PER_STRIP: u16 = 278;           // Rows per strip of data
    pub const STRIP_BYTE_COUNTS: u16 = 279;        // Bytes counts for strips
    pub const MIN_SAMPLE_VALUE: u16 = 280;         // Minimum component value
    pub const MAX_SAMPLE_VALUE: u16 = 281;         // Maximum component value
    pub const X_RESOLUTION: u16 = 282;             // Horizontal resolution
    pub const Y_RESOLUTION: u16 = 283;             // Vertical resolution
    pub const PLANAR_CONFIGURATION: u16 = 284;     // How components are stored
    pub const PAGE_NAME: u16 = 285;                // Name of the page
    pub const RESOLUTION_UNIT: u16 = 296;          // Unit of measurement for resolution
    pub const SOFTWARE: u16 = 305;                 // Software used to create the image
    pub const DATE_TIME: u16 = 306;                // Date and time of image creation
    pub const ARTIST: u16 = 315;                   // Person who created the image
    pub const COLOR_MAP: u16 = 320;                // Colormap for palette color images
    pub const HALFTONE_HINTS: u16 = 321;           // Halftone range hints
    pub const TILE_WIDTH: u16 = 322;               // Width of a tile
    pub const TILE_LENGTH: u16 = 323;              // Length of a tile
    pub const TILE_OFFSETS: u16 = 324;             // Offsets to the data tiles
    pub const TILE_BYTE_COUNTS: u16 = 325;         // Byte counts for tiles
    pub const SAMPLE_FORMAT: u16 = 339;            // Interpretation of sample data
}

/// Compression types
pub mod compression {
    pub const NONE: u16 = 1;              // No compression
    pub const CCITT_RLE: u16 = 2;         // CCITT modified Huffman RLE
    pub const CCITT_FAX3: u16 = 3;        // CCITT Group 3 fax
    pub const CCITT_FAX4: u16 = 4;        // CCITT Group 4 fax
    pub const LZW: u16 = 5;               // LZW compression
    pub const JPEG_OLD: u16 = 6;          // Old JPEG (deprecated)
    pub const JPEG: u16 = 7;              // JPEG compression
    pub const DEFLATE: u16 = 8;           // Adobe Deflate (zlib)
    pub const PACKBITS: u16 = 32773;      // PackBits compression
}

/// Photometric interpretation values
pub mod photometric {
    pub const WHITE_IS_ZERO: u16 = 0;     // Minimum value is white
    pub const BLACK_IS_ZERO: u16 = 1;     // Minimum value is black
    pub const RGB: u16 = 2;               // RGB color model
    pub const PALETTE: u16 = 3;           // Palette color (color map indexed)
    pub const TRANSPARENCY_MASK: u16 = 4; // Transparency mask
    pub const SEPARATED: u16 = 5;         // Usually CMYK
    pub const YCBCR: u16 = 6;             // YCbCr color model
    pub const CIELAB: u16 = 8;            // CIE L*a*b color model
}

/// Planar configuration values
pub mod planar_config {
    pub const CHUNKY: u16 = 1;            // Components stored interleaved (RGBRGBRGB)
    pub const PLANAR: u16 = 2;            // Components stored separately (RRR...GGG...BBB)
}

/// Fill order values
pub mod fill_order {
    pub const MSB_TO_LSB: u16 = 1;        // Most significant bit to least
    pub const LSB_TO_MSB: u16 = 2;        // Least significant bit to most
}
