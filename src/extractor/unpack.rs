//! Sample unpacking
//!
//! Samples are packed MSB-first into source words of 8, 16 or 32 bits,
//! and every stored row starts on a byte boundary. When the sample width
//! equals the word width each word is one sample. Otherwise a
//! [`BitAccumulator`] draws samples bit by bit from the high end of the
//! current word and is reset at the start of every row, so padding bits at
//! the end of a row never leak into the next one.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian, NativeEndian};
use std::fmt;

use crate::io::byte_order::ByteOrder;
use crate::tiff::errors::{TiffError, TiffResult};

use super::rect::RectInfo;

/// Unsigned integer type usable as a source word or destination sample
pub trait SampleWord: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const BITS: u32;
    const BYTES: usize;

    /// Reads one word stored in `order` from the start of `bytes`
    fn read(bytes: &[u8], order: ByteOrder) -> u32;

    /// Reads one host-order value from the start of `bytes`
    fn read_ne(bytes: &[u8]) -> Self;

    /// Writes the value in host order to the start of `bytes`
    fn write_ne(self, bytes: &mut [u8]);

    /// Truncating conversion from a 32-bit value
    fn from_u32(value: u32) -> Self;

    fn to_u32(self) -> u32;

    /// Largest representable value
    fn max_value() -> u64 {
        (1u64 << Self::BITS) - 1
    }
}

impl SampleWord for u8 {
    const BITS: u32 = 8;
    const BYTES: usize = 1;

    fn read(bytes: &[u8], _order: ByteOrder) -> u32 {
        bytes[0] as u32
    }

    fn read_ne(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn write_ne(self, bytes: &mut [u8]) {
        bytes[0] = self;
    }

    fn from_u32(value: u32) -> Self {
        value as u8
    }

    fn to_u32(self) -> u32 {
        self as u32
    }
}

macro_rules! impl_sample_word {
    ($t:ty, $read:ident, $write:ident) => {
        impl SampleWord for $t {
            const BITS: u32 = <$t>::BITS;
            const BYTES: usize = std::mem::size_of::<$t>();

            fn read(bytes: &[u8], order: ByteOrder) -> u32 {
                match order {
                    ByteOrder::LittleEndian => LittleEndian::$read(bytes) as u32,
                    ByteOrder::BigEndian => BigEndian::$read(bytes) as u32,
                }
            }

            fn read_ne(bytes: &[u8]) -> Self {
                NativeEndian::$read(bytes)
            }

            fn write_ne(self, bytes: &mut [u8]) {
                NativeEndian::$write(bytes, self)
            }

            fn from_u32(value: u32) -> Self {
                value as $t
            }

            fn to_u32(self) -> u32 {
                self as u32
            }
        }
    };
}

impl_sample_word!(u16, read_u16, write_u16);
impl_sample_word!(u32, read_u32, write_u32);

/// Bits of the current source word not yet consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitAccumulator {
    word: u64,
    bits_available: u32,
}

impl BitAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops any unconsumed bits
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn bits_available(&self) -> u32 {
        self.bits_available
    }

    /// Draws a `bits`-wide sample, refilling from `words` as needed
    ///
    /// A sample may straddle source words; its high bits come from the
    /// earlier word.
    pub fn draw<S: SampleWord>(&mut self, bits: u32, words: &mut WordCursor<'_, S>) -> TiffResult<u32> {
        let mut value: u64 = 0;
        let mut remaining = bits;

        while remaining > 0 {
            if self.bits_available == 0 {
                self.word = words.next_word()? as u64;
                self.bits_available = S::BITS;
            }
            let take = remaining.min(self.bits_available);
            let shift = self.bits_available - take;
            let mask = (1u64 << take) - 1;

            value = (value << take) | ((self.word >> shift) & mask);
            self.bits_available -= take;
            remaining -= take;
        }

        Ok(value as u32)
    }
}

/// Sequential reader of source words within one stored row
pub struct WordCursor<'a, S: SampleWord> {
    bytes: &'a [u8],
    position: usize,
    order: ByteOrder,
    _word: std::marker::PhantomData<S>,
}

impl<'a, S: SampleWord> WordCursor<'a, S> {
    pub fn new(bytes: &'a [u8], order: ByteOrder) -> Self {
        WordCursor { bytes, position: 0, order, _word: std::marker::PhantomData }
    }

    fn next_word(&mut self) -> TiffResult<u32> {
        let end = self.position + S::BYTES;
        let word = self.bytes.get(self.position..end).ok_or(TiffError::TruncatedData {
            expected: end,
            actual: self.bytes.len(),
        })?;
        self.position = end;
        Ok(S::read(word, self.order))
    }
}

/// Unpacks every sample of one block
///
/// `sink` receives `(row, column, sample, value)` for each pixel inside the
/// clipped block, where `sample` indexes the samples stored per pixel.
/// Stored pixels beyond the clipped width are skipped.
pub fn unpack_rect<S, F>(
    chunk: &[u8],
    info: &RectInfo,
    samples_per_pixel: usize,
    order: ByteOrder,
    sink: F,
) -> TiffResult<()>
where
    S: SampleWord,
    F: FnMut(usize, usize, usize, u32),
{
    let needed = info.byte_len()?;
    if chunk.len() < needed {
        return Err(TiffError::TruncatedData { expected: needed, actual: chunk.len() });
    }

    if info.bits_per_sample == S::BITS {
        unpack_aligned::<S, F>(chunk, info, samples_per_pixel, order, sink);
        Ok(())
    } else {
        unpack_packed::<S, F>(chunk, info, samples_per_pixel, order, sink)
    }
}

/// Word-per-sample path; `chunk` must hold `row_stride × height` bytes
pub(crate) fn unpack_aligned<S, F>(chunk: &[u8], info: &RectInfo, samples_per_pixel: usize, order: ByteOrder, mut sink: F)
where
    S: SampleWord,
    F: FnMut(usize, usize, usize, u32),
{
    for row in 0..info.height {
        let row_bytes = &chunk[row * info.row_stride..];
        for col in 0..info.width {
            for sample in 0..samples_per_pixel {
                let start = (col * samples_per_pixel + sample) * S::BYTES;
                sink(row, col, sample, S::read(&row_bytes[start..], order));
            }
        }
    }
}

/// Bit-accumulator path, resetting at every row
pub(crate) fn unpack_packed<S, F>(
    chunk: &[u8],
    info: &RectInfo,
    samples_per_pixel: usize,
    order: ByteOrder,
    mut sink: F,
) -> TiffResult<()>
where
    S: SampleWord,
    F: FnMut(usize, usize, usize, u32),
{
    let mut accumulator = BitAccumulator::new();

    for row in 0..info.height {
        let start = row * info.row_stride;
        let mut words = WordCursor::<S>::new(&chunk[start..start + info.row_stride], order);
        accumulator.reset();

        for col in 0..info.width {
            for sample in 0..samples_per_pixel {
                let value = accumulator.draw(info.bits_per_sample, &mut words)?;
                sink(row, col, sample, value);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(width: usize, height: usize, row_stride: usize, bits: u32) -> RectInfo {
        RectInfo { width, height, row_stride, bits_per_sample: bits }
    }

    fn collect_packed<S: SampleWord>(chunk: &[u8], info: &RectInfo, spp: usize, order: ByteOrder) -> Vec<u32> {
        let mut values = Vec::new();
        unpack_packed::<S, _>(chunk, info, spp, order, |_, _, _, v| values.push(v)).unwrap();
        values
    }

    fn collect_aligned<S: SampleWord>(chunk: &[u8], info: &RectInfo, spp: usize, order: ByteOrder) -> Vec<u32> {
        let mut values = Vec::new();
        unpack_aligned::<S, _>(chunk, info, spp, order, |_, _, _, v| values.push(v));
        values
    }

    #[test]
    fn test_one_bit_samples_msb_first() {
        let values = collect_packed::<u8>(&[0b1010_0000], &info(3, 1, 1, 1), 1, ByteOrder::BigEndian);
        assert_eq!(values, vec![1, 0, 1]);
    }

    #[test]
    fn test_accumulator_resets_at_row_boundary() {
        // Three 4-bit samples per row: the low nibble of each row's second
        // byte is padding and must not start the next row.
        let chunk = [0x12, 0x3F, 0x45, 0x6F];
        let values = collect_packed::<u8>(&chunk, &info(3, 2, 2, 4), 1, ByteOrder::LittleEndian);
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_samples_straddle_words() {
        // 12-bit samples 0xABC, 0xDEF packed into three bytes
        let values = collect_packed::<u8>(&[0xAB, 0xCD, 0xEF], &info(2, 1, 3, 12), 1, ByteOrder::BigEndian);
        assert_eq!(values, vec![0xABC, 0xDEF]);
    }

    #[test]
    fn test_fast_path_matches_slow_path() {
        let chunk: Vec<u8> = (0u8..24).map(|b| b.wrapping_mul(37)).collect();

        for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            let rect = info(3, 2, 12, 16);
            let aligned = collect_aligned::<u16>(&chunk, &rect, 2, order);
            let packed = collect_packed::<u16>(&chunk, &rect, 2, order);
            assert_eq!(aligned, packed);

            let direct: Vec<u32> = chunk
                .chunks_exact(2)
                .map(|b| match order {
                    ByteOrder::LittleEndian => u16::from_le_bytes([b[0], b[1]]) as u32,
                    ByteOrder::BigEndian => u16::from_be_bytes([b[0], b[1]]) as u32,
                })
                .collect();
            assert_eq!(aligned, direct);

            let rect = info(3, 2, 12, 32);
            assert_eq!(collect_aligned::<u32>(&chunk, &rect, 1, order), collect_packed::<u32>(&chunk, &rect, 1, order));

            let rect = info(6, 2, 12, 8);
            assert_eq!(collect_aligned::<u8>(&chunk, &rect, 2, order), chunk.iter().map(|&b| b as u32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_clipped_width_skips_stored_padding() {
        let chunk = [1, 2, 3, 4, 5, 6];
        let mut seen = Vec::new();
        unpack_rect::<u8, _>(&chunk, &info(2, 2, 3, 8), 1, ByteOrder::BigEndian, |r, c, _, v| seen.push((r, c, v)))
            .unwrap();
        assert_eq!(seen, vec![(0, 0, 1), (0, 1, 2), (1, 0, 4), (1, 1, 5)]);
    }

    #[test]
    fn test_short_chunk_is_truncated() {
        let result = unpack_rect::<u8, _>(&[0; 3], &info(2, 2, 2, 8), 1, ByteOrder::BigEndian, |_, _, _, _| {});
        assert!(matches!(result, Err(TiffError::TruncatedData { expected: 4, actual: 3 })));
    }
}
