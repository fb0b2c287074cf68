//! Custom error types for TIFF processing

use std::fmt;
use std::io;

/// TIFF-specific error types
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// Bad byte order marker, magic number or first directory offset
    MalformedHeader(String),
    /// Directory entries are not in strictly ascending tag order
    UnsortedDirectory { previous: u16, current: u16 },
    /// Required tag absent and no default applies
    MissingTag(u16),
    /// Field type code outside the twelve TIFF 6.0 types
    UnknownFieldType(u16),
    /// Structurally invalid directory entry
    InvalidEntry(String),
    /// Neither strip nor tile organization, or inconsistent chunk tables
    UnsupportedLayout(String),
    /// Recognized but unhandled combination of image parameters
    FormatNotSupported(String),
    /// A chunk holds fewer bytes than its geometry requires
    TruncatedData { expected: usize, actual: usize },
    /// Requested directory index does not exist
    IndexOutOfBounds { index: usize, count: usize },
    /// Generic error with message
    GenericError(String),
}

impl TiffError {
    /// Whether this error only means "this decoder variant does not apply"
    pub fn is_format_not_supported(&self) -> bool {
        matches!(self, TiffError::FormatNotSupported(_))
    }
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::MalformedHeader(msg) => write!(f, "Malformed TIFF header: {}", msg),
            TiffError::UnsortedDirectory { previous, current } => write!(
                f,
                "Directory entries must be sorted by tag in ascending order: tag {} follows tag {}",
                current, previous
            ),
            TiffError::MissingTag(tag) => write!(f, "Tag not found: {}", tag),
            TiffError::UnknownFieldType(ft) => write!(f, "Unknown field type: {}", ft),
            TiffError::InvalidEntry(msg) => write!(f, "Invalid directory entry: {}", msg),
            TiffError::UnsupportedLayout(msg) => write!(f, "Unsupported image layout: {}", msg),
            TiffError::FormatNotSupported(msg) => write!(f, "Format not supported: {}", msg),
            TiffError::TruncatedData { expected, actual } => write!(
                f,
                "Not enough pixel data: expected {} bytes, found {}",
                expected, actual
            ),
            TiffError::IndexOutOfBounds { index, count } => write!(
                f,
                "Requested IFD index {} is out of bounds ({} directories)",
                index, count
            ),
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TiffError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}
