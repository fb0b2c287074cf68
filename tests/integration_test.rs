//! End-to-end tests through the public API

use std::io::Cursor;

use tiffkit::extractor::{AnyExporter, Exporter, Image};
use tiffkit::tiff::constants::{photometric, tags};
use tiffkit::tiff::{load, ByteOrder, IFDEntry, LoadOptions, TiffError, TiffWriter};
use tiffkit::TiffKit;

fn gray_2x2(order: ByteOrder, pixels: &[u8]) -> Cursor<Vec<u8>> {
    let mut writer = TiffWriter::new(Cursor::new(Vec::new()), order).unwrap();
    let offset = writer.write_data(pixels).unwrap();
    writer
        .write_ifd(&[
            IFDEntry::shorts(tags::IMAGE_WIDTH, &[2]).unwrap(),
            IFDEntry::shorts(tags::IMAGE_LENGTH, &[2]).unwrap(),
            IFDEntry::shorts(tags::BITS_PER_SAMPLE, &[8]).unwrap(),
            IFDEntry::shorts(tags::COMPRESSION, &[1]).unwrap(),
            IFDEntry::shorts(tags::PHOTOMETRIC_INTERPRETATION, &[photometric::BLACK_IS_ZERO]).unwrap(),
            IFDEntry::longs(tags::STRIP_OFFSETS, &[offset]).unwrap(),
            IFDEntry::shorts(tags::ROWS_PER_STRIP, &[2]).unwrap(),
            IFDEntry::longs(tags::STRIP_BYTE_COUNTS, &[pixels.len() as u32]).unwrap(),
        ])
        .unwrap();
    writer.finish().unwrap()
}

fn decode_all(cursor: &mut Cursor<Vec<u8>>) -> Result<Vec<Image>, TiffError> {
    let exporter = AnyExporter::new();
    let mut images = Vec::new();
    load(
        cursor,
        |header, ifd, data| {
            images.push(exporter.export(header, ifd, &data)?);
            Ok(())
        },
        &LoadOptions::default(),
    )?;
    Ok(images)
}

#[test]
fn test_minimal_gray_image_in_both_byte_orders() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let images = decode_all(&mut gray_2x2(order, &[0, 64, 128, 255])).unwrap();
        assert_eq!(images.len(), 1);

        let image = &images[0];
        assert_eq!((image.width, image.height, image.channels, image.bit_depth), (2, 2, 1, 8));
        assert_eq!(image.data(), &[0, 64, 128, 255]);
        assert_eq!(image.sample::<u8>(1, 0, 0), Some(128));
    }
}

#[test]
fn test_out_of_order_tags_fail_the_load() {
    let mut writer = TiffWriter::new(Cursor::new(Vec::new()), ByteOrder::LittleEndian).unwrap();
    let offset = writer.write_data(&[1, 2, 3, 4]).unwrap();
    writer
        .write_ifd(&[
            IFDEntry::shorts(tags::IMAGE_WIDTH, &[2]).unwrap(),
            IFDEntry::shorts(tags::IMAGE_LENGTH, &[2]).unwrap(),
            IFDEntry::longs(tags::STRIP_OFFSETS, &[offset]).unwrap(),
            IFDEntry::shorts(tags::BITS_PER_SAMPLE, &[8]).unwrap(),
            IFDEntry::shorts(tags::PHOTOMETRIC_INTERPRETATION, &[1]).unwrap(),
            IFDEntry::longs(tags::STRIP_BYTE_COUNTS, &[4]).unwrap(),
        ])
        .unwrap();

    let result = decode_all(&mut writer.finish().unwrap());
    assert!(matches!(
        result,
        Err(TiffError::UnsortedDirectory { previous: 273, current: 258 })
    ));
}

#[test]
fn test_facade_decodes_and_inspects_files() {
    let path = std::env::temp_dir().join(format!("tiffkit-integration-{}.tif", std::process::id()));
    std::fs::write(&path, gray_2x2(ByteOrder::BigEndian, &[9, 8, 7, 6]).into_inner()).unwrap();

    let kit = TiffKit::new();
    let image = kit.decode_file(&path, 0).unwrap();
    assert_eq!(image.into_data(), vec![9, 8, 7, 6]);

    let summary = kit.inspect(&path).unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].dimensions, Some((2, 2)));
    assert_eq!(summary[0].entry_count, 8);
    assert_eq!(summary[0].compression, "None");
    assert_eq!(summary[0].photometric, Some("BlackIsZero"));

    assert!(matches!(
        kit.decode_file(&path, 1),
        Err(TiffError::IndexOutOfBounds { index: 1, count: 1 })
    ));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_version() {
    assert_eq!(tiffkit::version(), env!("CARGO_PKG_VERSION"));
}
