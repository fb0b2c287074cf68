//! TIFF file reader implementation
//!
//! Reads the header and walks the directory chain. The `load` entry points
//! additionally resolve each selected directory's strip or tile data and hand
//! header, directory and raw chunks to a caller-supplied callback.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::Path;

use crate::extractor::{self, ImageData};
use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::header::Header;
use crate::tiff::ifd::IFD;
use crate::tiff::types::TiffFile;

/// Options controlling which directories `load` processes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Process only the directory with this index; all of them if `None`
    pub ifd_index: Option<usize>,
}

impl LoadOptions {
    /// Options selecting a single directory
    pub fn single(ifd_index: usize) -> Self {
        LoadOptions { ifd_index: Some(ifd_index) }
    }
}

/// Reader for TIFF files
pub struct TiffReader;

impl TiffReader {
    /// Opens and parses a TIFF file from the given path
    ///
    /// # Arguments
    /// * `path` - Path to the TIFF file to read
    ///
    /// # Returns
    /// The parsed header and directory chain
    pub fn open<P: AsRef<Path>>(path: P) -> TiffResult<TiffFile> {
        let path = path.as_ref();
        info!("Reading TIFF file: {}", path.display());
        let mut reader = BufReader::new(File::open(path)?);
        Self::read(&mut reader)
    }

    /// Reads the header and every directory of the chain
    ///
    /// Any structural error aborts the whole read; there is no partial
    /// result.
    pub fn read<R: SeekableReader>(reader: &mut R) -> TiffResult<TiffFile> {
        reader.seek(SeekFrom::Start(0))?;
        let header = Header::read(reader)?;
        let handler = header.byte_order().create_handler();

        let mut ifds = Vec::new();
        let mut visited = HashSet::new();
        let mut offset = header.first_ifd_offset();

        while offset != 0 {
            if !visited.insert(offset) {
                warn!("IFD chain loops back to offset {}, stopping", offset);
                break;
            }
            let ifd = IFD::read(reader, handler.as_ref(), ifds.len(), offset as u64)?;
            offset = ifd.next_ifd_offset();
            ifds.push(ifd);
        }

        info!("Read {} IFDs from TIFF file", ifds.len());
        Ok(TiffFile { header, ifds })
    }
}

/// Loads a TIFF stream, invoking `callback` for each selected directory
///
/// The callback receives the header, the directory and the raw strip or
/// tile chunks of that directory. All directories are parsed before the
/// first callback runs, so a structural error anywhere in the chain means
/// the callback is never invoked.
///
/// # Arguments
/// * `reader` - Seekable stream positioned anywhere
/// * `callback` - Consumer of each directory's data
/// * `options` - Directory selection
pub fn load<R, F>(reader: &mut R, mut callback: F, options: &LoadOptions) -> TiffResult<()>
where
    R: SeekableReader,
    F: FnMut(&Header, &IFD, ImageData) -> TiffResult<()>,
{
    let file = TiffReader::read(reader)?;

    let selected: Vec<&IFD> = match options.ifd_index {
        Some(index) => {
            let ifd = file.ifds.get(index).ok_or(TiffError::IndexOutOfBounds {
                index,
                count: file.ifd_count(),
            })?;
            vec![ifd]
        }
        None => file.ifds.iter().collect(),
    };

    for ifd in selected {
        debug!("Loading image data of IFD #{}", ifd.number);
        let data = extractor::read_image_data(reader, ifd)?;
        callback(&file.header, ifd, data)?;
    }
    Ok(())
}

/// Opens `path` and runs [`load`] over it
pub fn load_file<P, F>(path: P, callback: F, options: &LoadOptions) -> TiffResult<()>
where
    P: AsRef<Path>,
    F: FnMut(&Header, &IFD, ImageData) -> TiffResult<()>,
{
    let path = path.as_ref();
    info!("Loading TIFF file: {}", path.display());
    let mut reader = BufReader::with_capacity(1024 * 1024, File::open(path)?);
    load(&mut reader, callback, options)
}
