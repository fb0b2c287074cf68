//! Seekable reader/writer traits and positioned I/O helpers
//!
//! TIFF values and image data are addressed by absolute file offsets, so
//! most reads happen "somewhere else" in the file while a directory is being
//! walked. The helpers here perform such reads and writes and put the stream
//! back where the caller left it.

use std::io::{self, Read, Seek, SeekFrom, Write};

/// Trait for readers that can both read and seek
///
/// This trait combines the Read and Seek traits for use with
/// various readers throughout the crate.
pub trait SeekableReader: Read + Seek {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek> SeekableReader for T {}

/// Trait for writers that can both write and seek
pub trait SeekableWriter: Write + Seek {}

impl<T: Write + Seek> SeekableWriter for T {}

/// Restores a stream position when dropped
///
/// Errors while restoring are ignored in `Drop`; callers that need to observe
/// them use [`SeekGuard::restore`].
struct SeekGuard<'a, S: Seek + ?Sized> {
    stream: &'a mut S,
    saved: u64,
    restored: bool,
}

impl<'a, S: Seek + ?Sized> SeekGuard<'a, S> {
    fn new(stream: &'a mut S) -> io::Result<Self> {
        let saved = stream.stream_position()?;
        Ok(SeekGuard { stream, saved, restored: false })
    }

    fn restore(mut self) -> io::Result<()> {
        self.restored = true;
        self.stream.seek(SeekFrom::Start(self.saved))?;
        Ok(())
    }
}

impl<S: Seek + ?Sized> Drop for SeekGuard<'_, S> {
    fn drop(&mut self) {
        if !self.restored {
            let _ = self.stream.seek(SeekFrom::Start(self.saved));
        }
    }
}

/// Reads exactly `buffer.len()` bytes starting at `offset`
///
/// The stream position is restored afterwards, whether or not the read
/// succeeded.
pub fn read_at<R: SeekableReader + ?Sized>(reader: &mut R, offset: u64, buffer: &mut [u8]) -> io::Result<()> {
    let guard = SeekGuard::new(reader)?;
    guard.stream.seek(SeekFrom::Start(offset))?;
    guard.stream.read_exact(buffer)?;
    guard.restore()
}

/// Reads `len` bytes starting at `offset` into a fresh buffer
pub fn read_vec_at<R: SeekableReader + ?Sized>(reader: &mut R, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    let mut buffer = vec![0u8; len];
    read_at(reader, offset, &mut buffer)?;
    Ok(buffer)
}

/// Writes `buffer` starting at `offset`
///
/// If `offset` lies beyond the current end of the stream, the gap is filled
/// with zero bytes first. The stream position is restored afterwards.
pub fn write_at<W: SeekableWriter + ?Sized>(writer: &mut W, offset: u64, buffer: &[u8]) -> io::Result<()> {
    let guard = SeekGuard::new(writer)?;
    let end = guard.stream.seek(SeekFrom::End(0))?;
    if end < offset {
        let padding = vec![0u8; (offset - end) as usize];
        guard.stream.write_all(&padding)?;
    }
    guard.stream.seek(SeekFrom::Start(offset))?;
    guard.stream.write_all(buffer)?;
    guard.restore()
}

/// Returns the total length of the stream without moving its position
pub fn stream_len<S: Seek + ?Sized>(stream: &mut S) -> io::Result<u64> {
    let guard = SeekGuard::new(stream)?;
    let len = guard.stream.seek(SeekFrom::End(0))?;
    guard.restore()?;
    Ok(len)
}
