//! Image File Directory (IFD) structures and methods
//!
//! This module implements the core TIFF IFD (Image File Directory) structures
//! that store metadata about images in a TIFF file. IFDs are organized as
//! collections of tag entries, with each tag describing an aspect of the image.

use std::collections::BTreeMap;
use std::io::SeekFrom;

use log::{debug, info, trace};

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::{self, SeekableReader};
use crate::tiff::constants::{header, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::types::{FieldType, FieldValue, FieldValues, Rational};
use crate::utils::tag_utils;

/// Where an entry's value was found on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueStorage {
    /// Left-justified in the entry's own 4-byte value field
    Inline,
    /// At the given file offset
    Indirect(u32),
    /// Built in memory, too large for the inline slot and not yet written
    Unplaced,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// The value bytes are owned by the entry and already converted to host
/// byte order, element by element according to the field type.
#[derive(Debug, Clone, PartialEq)]
pub struct IFDEntry {
    tag: u16,
    field_type: FieldType,
    count: u32,
    values: Vec<u8>,
    storage: ValueStorage,
}

impl IFDEntry {
    /// Creates an entry from host-order value bytes
    ///
    /// `values` must hold exactly `count` values of `field_type`.
    pub fn new(tag: u16, field_type: FieldType, values: Vec<u8>) -> TiffResult<Self> {
        let width = field_type.byte_width();
        if values.is_empty() || values.len() % width != 0 {
            return Err(TiffError::InvalidEntry(format!(
                "tag {}: {} bytes is not a whole number of {} values",
                tag,
                values.len(),
                field_type
            )));
        }
        let count = u32::try_from(values.len() / width)
            .map_err(|_| TiffError::InvalidEntry(format!("tag {}: too many values", tag)))?;
        let storage = if values.len() <= header::INLINE_VALUE_SIZE {
            ValueStorage::Inline
        } else {
            ValueStorage::Unplaced
        };

        let entry = IFDEntry { tag, field_type, count, values, storage };
        entry.check_ascii()?;
        Ok(entry)
    }

    /// Entry holding SHORT values
    pub fn shorts(tag: u16, values: &[u16]) -> TiffResult<Self> {
        Self::new(tag, FieldType::Short, values.iter().flat_map(|v| v.to_ne_bytes()).collect())
    }

    /// Entry holding LONG values
    pub fn longs(tag: u16, values: &[u32]) -> TiffResult<Self> {
        Self::new(tag, FieldType::Long, values.iter().flat_map(|v| v.to_ne_bytes()).collect())
    }

    /// Entry holding BYTE values
    pub fn bytes(tag: u16, values: &[u8]) -> TiffResult<Self> {
        Self::new(tag, FieldType::Byte, values.to_vec())
    }

    /// Entry holding RATIONAL values
    pub fn rationals(tag: u16, values: &[Rational]) -> TiffResult<Self> {
        let bytes = values
            .iter()
            .flat_map(|r| {
                let mut raw = [0u8; 8];
                raw[..4].copy_from_slice(&r.numerator.to_ne_bytes());
                raw[4..].copy_from_slice(&r.denominator.to_ne_bytes());
                raw
            })
            .collect();
        Self::new(tag, FieldType::Rational, bytes)
    }

    /// Entry holding an ASCII string; the terminating NUL is appended
    pub fn ascii(tag: u16, text: &str) -> TiffResult<Self> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        Self::new(tag, FieldType::Ascii, bytes)
    }

    /// Reads one 12-byte entry from the current stream position
    ///
    /// Values larger than four bytes are fetched from their offset with a
    /// positioned read; the stream is left just past the entry either way.
    pub fn read<R: SeekableReader>(reader: &mut R, handler: &dyn ByteOrderHandler) -> TiffResult<Self> {
        let tag = handler.read_u16(reader)?;
        let field_type = FieldType::from_code(handler.read_u16(reader)?)?;
        let count = handler.read_u32(reader)?;

        if count == 0 {
            return Err(TiffError::InvalidEntry(format!("tag {} has a zero count", tag)));
        }
        let value_size = (count as usize)
            .checked_mul(field_type.byte_width())
            .ok_or_else(|| TiffError::InvalidEntry(format!("tag {}: count {} overflows", tag, count)))?;

        let mut slot = [0u8; header::INLINE_VALUE_SIZE];
        reader.read_exact(&mut slot)?;

        let (storage, mut values) = if value_size <= header::INLINE_VALUE_SIZE {
            (ValueStorage::Inline, slot[..value_size].to_vec())
        } else {
            let offset = handler.read_u32(&mut &slot[..])?;
            if offset < header::HEADER_SIZE || offset % 2 != 0 {
                return Err(TiffError::InvalidEntry(format!(
                    "tag {}: invalid value offset {}",
                    tag, offset
                )));
            }
            let file_size = seekable::stream_len(reader)?;
            let available = file_size.saturating_sub(offset as u64);
            if (value_size as u64) > available {
                return Err(TiffError::TruncatedData {
                    expected: value_size,
                    actual: available as usize,
                });
            }
            (ValueStorage::Indirect(offset), seekable::read_vec_at(reader, offset as u64, value_size)?)
        };

        // Swap as an array of the declared type: an inline slot may hold
        // several narrower values that each swap on their own.
        field_type.normalize(&mut values, handler.byte_order());

        let entry = IFDEntry { tag, field_type, count, values, storage };
        entry.check_ascii()?;

        trace!("Read entry {}", entry.description());
        Ok(entry)
    }

    fn check_ascii(&self) -> TiffResult<()> {
        if self.field_type == FieldType::Ascii && self.values.last() != Some(&0) {
            return Err(TiffError::InvalidEntry(format!(
                "ASCII value of tag {} must end with a NUL byte",
                self.tag
            )));
        }
        Ok(())
    }

    pub fn tag(&self) -> u16 {
        self.tag
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Number of values (not bytes)
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Raw value bytes in host byte order
    pub fn raw_values(&self) -> &[u8] {
        &self.values
    }

    /// Total size of the values in bytes
    pub fn byte_len(&self) -> usize {
        self.values.len()
    }

    pub fn storage(&self) -> ValueStorage {
        self.storage
    }

    /// Typed view of the values
    pub fn values(&self) -> FieldValues {
        self.field_type.decode(&self.values)
    }

    /// Values of a given native type; fails if the widths disagree
    pub fn values_as<T: FieldValue>(&self) -> TiffResult<Vec<T>> {
        if T::WIDTH != self.field_type.byte_width() {
            return Err(TiffError::InvalidEntry(format!(
                "tag {}: {} values are not {} bytes wide",
                self.tag, self.field_type, T::WIDTH
            )));
        }
        Ok(self.values.chunks_exact(T::WIDTH).map(T::from_ne_slice).collect())
    }

    /// Text of an ASCII entry, without the terminating NUL
    pub fn as_str(&self) -> Option<String> {
        match self.values() {
            FieldValues::Ascii(text) => Some(text),
            _ => None,
        }
    }

    /// All values coerced to integers
    ///
    /// Rationals are integer-divided and floating point values truncated.
    pub fn to_int_vec(&self) -> TiffResult<Vec<i64>> {
        self.field_type.to_int_vec(&self.values)
    }

    /// Returns a human-readable description of this entry, for logging
    pub fn description(&self) -> String {
        format!(
            "Tag: {} ({}), Type: {}, Count: {}, Storage: {:?}",
            self.tag,
            tag_utils::get_tag_name(self.tag),
            self.field_type,
            self.count,
            self.storage
        )
    }
}

/// Represents an Image File Directory (IFD) in a TIFF file
///
/// Entries are keyed uniquely by tag. The chained offset of the following
/// directory is kept alongside (0 ends the chain).
#[derive(Debug, Clone, PartialEq)]
pub struct IFD {
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    entries: BTreeMap<u16, IFDEntry>,
    next_ifd_offset: u32,
}

impl IFD {
    /// Creates a new, empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        IFD {
            number,
            offset,
            entries: BTreeMap::new(),
            next_ifd_offset: 0,
        }
    }

    /// Reads the directory at `offset`
    ///
    /// Tags must appear in strictly ascending order; a repeat or decrease
    /// fails the whole read.
    pub fn read<R: SeekableReader>(
        reader: &mut R,
        handler: &dyn ByteOrderHandler,
        number: usize,
        offset: u64,
    ) -> TiffResult<Self> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = handler.read_u16(reader)?;
        debug!("IFD #{} at offset {}: {} entries", number, offset, entry_count);

        let mut ifd = IFD::new(number, offset);
        let mut previous: Option<u16> = None;

        for _ in 0..entry_count {
            let entry = IFDEntry::read(reader, handler)?;
            if let Some(previous) = previous {
                if entry.tag() <= previous {
                    return Err(TiffError::UnsortedDirectory { previous, current: entry.tag() });
                }
            }
            previous = Some(entry.tag());
            ifd.entries.insert(entry.tag(), entry);
        }

        ifd.next_ifd_offset = handler.read_u32(reader)?;
        info!("Read IFD #{} with {} entries, next IFD at {}", number, ifd.entries.len(), ifd.next_ifd_offset);
        Ok(ifd)
    }

    /// Adds an entry, replacing any entry with the same tag
    pub fn add_entry(&mut self, entry: IFDEntry) {
        self.entries.insert(entry.tag(), entry);
    }

    /// Entries in ascending tag order
    pub fn entries(&self) -> impl Iterator<Item = &IFDEntry> {
        self.entries.values()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Offset of the next directory in the chain, 0 if this is the last one
    pub fn next_ifd_offset(&self) -> u32 {
        self.next_ifd_offset
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        let entry = self.entries.get(&tag);
        if entry.is_none() {
            trace!("Tag {} ({}) not found in IFD #{}", tag, tag_utils::get_tag_name(tag), self.number);
        }
        entry
    }

    /// Gets an IFD entry by tag, failing with `MissingTag` if absent
    pub fn require_entry(&self, tag: u16) -> TiffResult<&IFDEntry> {
        self.get_entry(tag).ok_or(TiffError::MissingTag(tag))
    }

    /// All values of a tag as integers
    pub fn get_int_vec(&self, tag: u16) -> TiffResult<Vec<i64>> {
        self.require_entry(tag)?.to_int_vec()
    }

    /// All values of a tag as integers, or `default` if the tag is absent
    pub fn get_int_vec_or(&self, tag: u16, default: &[i64]) -> TiffResult<Vec<i64>> {
        match self.get_entry(tag) {
            Some(entry) => entry.to_int_vec(),
            None => Ok(default.to_vec()),
        }
    }

    /// The single value of a tag as an integer
    pub fn get_int(&self, tag: u16) -> TiffResult<i64> {
        Self::single(tag, self.get_int_vec(tag)?)
    }

    /// The single value of a tag as an integer, or `default` if absent
    pub fn get_int_or(&self, tag: u16, default: i64) -> TiffResult<i64> {
        Self::single(tag, self.get_int_vec_or(tag, &[default])?)
    }

    fn single(tag: u16, values: Vec<i64>) -> TiffResult<i64> {
        match values.as_slice() {
            [value] => Ok(*value),
            _ => Err(TiffError::InvalidEntry(format!(
                "expected a single value for tag {} ({}), found {}",
                tag,
                tag_utils::get_tag_name(tag),
                values.len()
            ))),
        }
    }

    /// Gets the dimensions of the image described by this IFD
    pub fn get_dimensions(&self) -> TiffResult<(usize, usize)> {
        let width = Self::to_usize(tags::IMAGE_WIDTH, self.get_int(tags::IMAGE_WIDTH)?)?;
        let height = Self::to_usize(tags::IMAGE_LENGTH, self.get_int(tags::IMAGE_LENGTH)?)?;
        Ok((width, height))
    }

    /// Returns number of samples per pixel (default 1 if not specified)
    pub fn get_samples_per_pixel(&self) -> TiffResult<usize> {
        let samples = self.get_int_or(tags::SAMPLES_PER_PIXEL, 1)?;
        Self::to_usize(tags::SAMPLES_PER_PIXEL, samples)
    }

    /// Converts a tag value to a size, rejecting negative values
    pub(crate) fn to_usize(tag: u16, value: i64) -> TiffResult<usize> {
        usize::try_from(value).map_err(|_| {
            TiffError::InvalidEntry(format!(
                "tag {} ({}) has invalid value {}",
                tag,
                tag_utils::get_tag_name(tag),
                value
            ))
        })
    }
}
