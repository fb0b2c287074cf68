//! Tests for the pixel decode engine and the exporters

use std::io::Cursor;

use crate::extractor::{AnyExporter, Exporter, GrayExporter, Image, PaletteExporter, RgbExporter};
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{photometric, planar_config, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFDEntry;
use crate::tiff::reader::{load, LoadOptions};

use super::test_utils::{gray_entries, image_entries, pack_samples, u16_bytes, write_image};

fn decode_with(cursor: &mut Cursor<Vec<u8>>, exporter: &dyn Exporter) -> TiffResult<Image> {
    let mut decoded = None;
    load(
        cursor,
        |header, ifd, data| {
            decoded = Some(exporter.export(header, ifd, &data)?);
            Ok(())
        },
        &LoadOptions::single(0),
    )?;
    Ok(decoded.expect("callback ran"))
}

fn decode(cursor: &mut Cursor<Vec<u8>>) -> TiffResult<Image> {
    decode_with(cursor, &AnyExporter::new())
}

fn with_photometric(mut entries: Vec<IFDEntry>, interpretation: u16) -> Vec<IFDEntry> {
    entries.retain(|e| e.tag() != tags::PHOTOMETRIC_INTERPRETATION);
    entries.push(IFDEntry::shorts(tags::PHOTOMETRIC_INTERPRETATION, &[interpretation]).unwrap());
    entries
}

#[test]
fn test_two_by_two_gray() {
    let pixels = vec![10u8, 20, 30, 40];
    let mut cursor = write_image(ByteOrder::LittleEndian, gray_entries(2, 2, 8), &[pixels.clone()], false);
    let image = decode(&mut cursor).unwrap();

    assert_eq!((image.width, image.height, image.channels, image.bit_depth), (2, 2, 1, 8));
    assert_eq!(image.into_data(), pixels);
}

#[test]
fn test_white_is_zero_inverts_black_is_zero() {
    for bits in [1u32, 2, 4, 8, 12, 16, 24] {
        let (width, height) = (5u32, 3u32);
        let max = (1u64 << bits) - 1;
        let samples: Vec<u32> = (0..width * height).map(|i| ((i as u64 * 7919) % (max + 1)) as u32).collect();

        let strip = if bits == 16 {
            u16_bytes(&samples.iter().map(|&s| s as u16).collect::<Vec<_>>(), ByteOrder::BigEndian)
        } else {
            pack_samples(&samples, bits, width as usize)
        };

        let entries = gray_entries(width, height, bits as u16);
        let black = decode(&mut write_image(ByteOrder::BigEndian, entries.clone(), &[strip.clone()], false)).unwrap();
        let white = decode(&mut write_image(
            ByteOrder::BigEndian,
            with_photometric(entries, photometric::WHITE_IS_ZERO),
            &[strip],
            false,
        ))
        .unwrap();

        assert_eq!(black.data_size(), white.data_size());
        for (b, w) in black.data().iter().zip(white.data()) {
            assert_eq!(*w, !*b, "{} bits", bits);
        }
    }
}

#[test]
fn test_gray_depths_pick_destination_width() {
    // 12-bit samples land in 16-bit output
    let samples = [0u32, 0xFFF, 0x800, 1];
    let strip = pack_samples(&samples, 12, 2);
    let image = decode(&mut write_image(ByteOrder::LittleEndian, gray_entries(2, 2, 12), &[strip], false)).unwrap();
    assert_eq!(image.bit_depth, 16);
    assert_eq!(image.samples::<u16>(), vec![0, 0xFFFF, 0x8007, 16]);

    // 16-bit samples pass through in either byte order
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let values = [0x0102u16, 0xFFFE, 0x8000, 7];
        let strip = u16_bytes(&values, order);
        let image = decode(&mut write_image(order, gray_entries(2, 2, 16), &[strip], false)).unwrap();
        assert_eq!(image.samples::<u16>(), values.to_vec());
    }

    // 24-bit samples land in 32-bit output
    let strip = pack_samples(&[0xFFFFFF, 0], 24, 2);
    let image = decode(&mut write_image(ByteOrder::LittleEndian, gray_entries(2, 1, 24), &[strip], false)).unwrap();
    assert_eq!(image.bit_depth, 32);
    assert_eq!(image.samples::<u32>(), vec![u32::MAX, 0]);

    // 1-bit samples stretch to the full byte range
    let strip = pack_samples(&[1, 0, 1], 1, 3);
    let image = decode(&mut write_image(ByteOrder::LittleEndian, gray_entries(3, 1, 1), &[strip], false)).unwrap();
    assert_eq!(image.into_data(), vec![255, 0, 255]);
}

#[test]
fn test_palette_four_bit() {
    let color_map: Vec<u16> = (0..48u16).map(|i| i * 1000 + 255).collect();
    let indices: Vec<u32> = vec![0, 5, 15, 3, 9, 1];
    let strip = pack_samples(&indices, 4, 3);

    let mut entries = image_entries(3, 2, &[4], photometric::PALETTE);
    entries.push(IFDEntry::shorts(tags::COLOR_MAP, &color_map).unwrap());
    let mut cursor = write_image(ByteOrder::BigEndian, entries, &[strip], false);
    let image = decode(&mut cursor).unwrap();

    assert_eq!((image.channels, image.bit_depth), (3, 8));
    for (pixel, &index) in indices.iter().enumerate() {
        let (row, col) = (pixel / 3, pixel % 3);
        for channel in 0..3 {
            let expected = (color_map[channel * 16 + index as usize] >> 8) as u8;
            assert_eq!(image.sample::<u8>(row, col, channel), Some(expected));
        }
    }
}

#[test]
fn test_palette_needs_full_color_map() {
    let mut entries = image_entries(1, 1, &[4], photometric::PALETTE);
    entries.push(IFDEntry::shorts(tags::COLOR_MAP, &[0; 47]).unwrap());
    let mut cursor = write_image(ByteOrder::LittleEndian, entries, &[vec![0]], false);
    assert!(matches!(decode(&mut cursor), Err(TiffError::InvalidEntry(_))));
}

#[test]
fn test_tiled_equals_striped() {
    let (width, height) = (5usize, 3usize);
    let pixels: Vec<u8> = (0..(width * height) as u8).map(|v| v * 11).collect();

    let mut striped_entries = gray_entries(width as u32, height as u32, 8);
    striped_entries.push(IFDEntry::shorts(tags::ROWS_PER_STRIP, &[2]).unwrap());
    let strips = vec![pixels[..2 * width].to_vec(), pixels[2 * width..].to_vec()];
    let striped = decode(&mut write_image(ByteOrder::LittleEndian, striped_entries, &strips, false)).unwrap();

    // 4x2 tiles; edge tiles are stored full size with zero padding
    let (tile_w, tile_h) = (4usize, 2usize);
    let mut tiles = Vec::new();
    for ty in 0..2 {
        for tx in 0..2 {
            let mut tile = vec![0u8; tile_w * tile_h];
            for r in 0..tile_h {
                for c in 0..tile_w {
                    let (y, x) = (ty * tile_h + r, tx * tile_w + c);
                    if y < height && x < width {
                        tile[r * tile_w + c] = pixels[y * width + x];
                    }
                }
            }
            tiles.push(tile);
        }
    }
    let mut tiled_entries = gray_entries(width as u32, height as u32, 8);
    tiled_entries.push(IFDEntry::shorts(tags::TILE_WIDTH, &[tile_w as u16]).unwrap());
    tiled_entries.push(IFDEntry::shorts(tags::TILE_LENGTH, &[tile_h as u16]).unwrap());
    let tiled = decode(&mut write_image(ByteOrder::LittleEndian, tiled_entries, &tiles, true)).unwrap();

    assert_eq!(tiled, striped);
    assert_eq!(striped.into_data(), pixels);
}

#[test]
fn test_rgb_planar_equals_contiguous_and_drops_alpha() {
    let (width, height) = (3usize, 2usize);
    let rgba: Vec<u8> = (0..(width * height * 4) as u8).collect();

    let contiguous = decode(&mut write_image(
        ByteOrder::LittleEndian,
        image_entries(width as u32, height as u32, &[8, 8, 8, 8], photometric::RGB),
        &[rgba.clone()],
        false,
    ))
    .unwrap();

    let planes: Vec<Vec<u8>> = (0..4).map(|c| rgba.iter().skip(c).step_by(4).copied().collect()).collect();
    let mut entries = image_entries(width as u32, height as u32, &[8, 8, 8, 8], photometric::RGB);
    entries.push(IFDEntry::shorts(tags::PLANAR_CONFIGURATION, &[planar_config::PLANAR]).unwrap());
    let planar = decode(&mut write_image(ByteOrder::LittleEndian, entries, &planes, false)).unwrap();

    assert_eq!(planar, contiguous);
    assert_eq!(contiguous.channels, 3);
    let expected: Vec<u8> = rgba.chunks(4).flat_map(|p| p[..3].to_vec()).collect();
    assert_eq!(contiguous.into_data(), expected);
}

#[test]
fn test_rgb_sixteen_bit_big_endian() {
    let values = [0x1234u16, 0x5678, 0x9ABC];
    let strip = u16_bytes(&values, ByteOrder::BigEndian);
    let image = decode(&mut write_image(
        ByteOrder::BigEndian,
        image_entries(1, 1, &[16, 16, 16], photometric::RGB),
        &[strip],
        false,
    ))
    .unwrap();
    assert_eq!(image.samples::<u16>(), values.to_vec());
}

#[test]
fn test_compressed_data_is_not_supported() {
    let mut entries = gray_entries(2, 2, 8);
    entries.retain(|e| e.tag() != tags::COMPRESSION);
    entries.push(IFDEntry::shorts(tags::COMPRESSION, &[5]).unwrap());

    let err = decode(&mut write_image(ByteOrder::LittleEndian, entries.clone(), &[vec![0; 4]], false)).unwrap_err();
    assert!(err.is_format_not_supported());
    assert!(err.to_string().contains("IFD #0"));

    let exporter = GrayExporter::<u8, u8>::new();
    let err = decode_with(&mut write_image(ByteOrder::LittleEndian, entries, &[vec![0; 4]], false), &exporter)
        .unwrap_err();
    assert!(err.to_string().contains("LZW"));
}

#[test]
fn test_lsb_fill_order_is_not_supported() {
    let mut entries = gray_entries(2, 2, 8);
    entries.push(IFDEntry::shorts(tags::FILL_ORDER, &[2]).unwrap());
    let err = decode(&mut write_image(ByteOrder::LittleEndian, entries, &[vec![0; 4]], false)).unwrap_err();
    assert!(err.is_format_not_supported());
}

#[test]
fn test_unknown_photometric_is_not_supported() {
    let entries = image_entries(1, 1, &[8, 8, 8, 8], photometric::SEPARATED);
    let err = decode(&mut write_image(ByteOrder::LittleEndian, entries, &[vec![0; 4]], false)).unwrap_err();
    assert!(err.is_format_not_supported());
}

#[test]
fn test_wrong_variant_rejects_directly() {
    let mut cursor = write_image(ByteOrder::LittleEndian, gray_entries(2, 2, 8), &[vec![0; 4]], false);
    assert!(decode_with(&mut cursor, &RgbExporter::<u8, u8>::new()).unwrap_err().is_format_not_supported());

    let mut cursor = write_image(ByteOrder::LittleEndian, gray_entries(2, 2, 8), &[vec![0; 4]], false);
    assert!(decode_with(&mut cursor, &GrayExporter::<u16, u8>::new()).unwrap_err().is_format_not_supported());

    let mut cursor = write_image(ByteOrder::LittleEndian, gray_entries(2, 2, 8), &[vec![0; 4]], false);
    assert!(decode_with(&mut cursor, &PaletteExporter::<u8, u8>::new()).unwrap_err().is_format_not_supported());
}

#[test]
fn test_short_strip_is_fatal() {
    let err = decode(&mut write_image(ByteOrder::LittleEndian, gray_entries(2, 2, 8), &[vec![0; 3]], false))
        .unwrap_err();
    assert!(matches!(err, TiffError::TruncatedData { expected: 4, actual: 3 }));
}

#[test]
fn test_wrong_strip_count_is_fatal() {
    let mut entries = gray_entries(2, 4, 8);
    entries.push(IFDEntry::shorts(tags::ROWS_PER_STRIP, &[2]).unwrap());
    let err = decode(&mut write_image(ByteOrder::LittleEndian, entries, &[vec![0; 8]], false)).unwrap_err();
    assert!(matches!(err, TiffError::UnsupportedLayout(_)));
}

#[test]
fn test_rows_per_strip_larger_than_height_is_clamped() {
    let mut entries = gray_entries(2, 2, 8);
    entries.push(IFDEntry::longs(tags::ROWS_PER_STRIP, &[u32::MAX]).unwrap());
    let image = decode(&mut write_image(ByteOrder::LittleEndian, entries, &[vec![1, 2, 3, 4]], false)).unwrap();
    assert_eq!(image.into_data(), vec![1, 2, 3, 4]);
}

#[test]
fn test_huge_dimensions_fail_before_allocating() {
    let entries = image_entries(u32::MAX, u32::MAX, &[8, 8, 8], photometric::RGB);
    let err = decode(&mut write_image(ByteOrder::LittleEndian, entries, &[vec![0; 3]], false)).unwrap_err();
    assert!(matches!(err, TiffError::InvalidEntry(_)), "{:?}", err);

    let entries = gray_entries(100_000, 100_000, 8);
    let err = decode(&mut write_image(ByteOrder::LittleEndian, entries, &[vec![0; 4]], false)).unwrap_err();
    assert!(matches!(err, TiffError::TruncatedData { expected: 10_000_000_000, actual: 4 }), "{:?}", err);
}

#[test]
fn test_dispatcher_keeps_malformed_tag_errors() {
    let mut entries = gray_entries(2, 2, 8);
    entries.retain(|e| e.tag() != tags::SAMPLES_PER_PIXEL);
    entries.push(IFDEntry::shorts(tags::SAMPLES_PER_PIXEL, &[1, 1]).unwrap());
    let err = decode(&mut write_image(ByteOrder::LittleEndian, entries, &[vec![0; 4]], false)).unwrap_err();
    assert!(matches!(err, TiffError::InvalidEntry(_)), "{:?}", err);

    let mut entries = gray_entries(2, 2, 8);
    entries.retain(|e| e.tag() != tags::PHOTOMETRIC_INTERPRETATION);
    entries.push(IFDEntry::shorts(tags::PHOTOMETRIC_INTERPRETATION, &[1, 1]).unwrap());
    let err = decode(&mut write_image(ByteOrder::LittleEndian, entries, &[vec![0; 4]], false)).unwrap_err();
    assert!(matches!(err, TiffError::InvalidEntry(_)), "{:?}", err);
}
