extern crate icopack;

use icopack::{
    DirectoryLayout, IcoEncoder, IcoError, IconSize, ImageRasterizer,
    Rasterizer, Surface,
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::io;

//===========================================================================//

// The full eight-byte PNG file signature.
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Returns a different-length fake "PNG" for every size (the real signature,
/// then filler bytes equal to the size), so that offset arithmetic is
/// exercised with payloads of uneven length.
struct FakeRasterizer;

impl Rasterizer for FakeRasterizer {
    type Source = ();

    fn rasterize(&self, _: &(), size: IconSize) -> io::Result<Surface> {
        Surface::transparent(size.pixels(), size.pixels())
    }

    fn encode_png(&self, surface: &Surface) -> io::Result<Vec<u8>> {
        let len = 10 + (surface.width() as usize) * 3;
        let mut data = PNG_SIGNATURE.to_vec();
        data.resize(len, surface.width() as u8);
        Ok(data)
    }
}

/// Fails for one particular size.
struct FailingRasterizer {
    fail_at: u32,
}

impl Rasterizer for FailingRasterizer {
    type Source = ();

    fn rasterize(&self, _: &(), size: IconSize) -> io::Result<Surface> {
        if size.pixels() == self.fail_at {
            return Err(io::Error::new(io::ErrorKind::Other, "out of memory"));
        }
        Surface::transparent(size.pixels(), size.pixels())
    }
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7) as u8, (y * 5) as u8, ((x + y) * 3) as u8, 255])
    }))
}

//===========================================================================//

#[test]
fn single_size_layout() {
    let source = gradient(50, 40);
    let rasterizer = ImageRasterizer::default();
    let png16 = rasterizer
        .encode_png(
            &rasterizer.rasterize(&source, IconSize::new(16).unwrap()).unwrap(),
        )
        .unwrap();
    let ico = IcoEncoder::new(rasterizer).encode(&source, &[16]).unwrap();
    let data = ico.as_bytes();
    assert_eq!(data.len(), 22 + png16.len());
    assert_eq!(&data[0..6], &[0, 0, 1, 0, 1, 0]);
    assert_eq!(data[6], 16);
    assert_eq!(data[7], 16);
    assert_eq!(&data[22..], png16.as_slice());
}

#[test]
fn three_sizes_with_256() {
    let ico =
        IcoEncoder::new(FakeRasterizer).encode(&(), &[16, 32, 256]).unwrap();
    let data = ico.as_bytes();
    assert_eq!(read_u16(data, 4), 3);
    let third = 6 + 16 * 2;
    assert_eq!(data[third], 0);
    assert_eq!(data[third + 1], 0);
    let offsets: Vec<u32> =
        (0..3).map(|i| read_u32(data, 6 + 16 * i + 12)).collect();
    assert!(offsets[0] < offsets[1] && offsets[1] < offsets[2]);
}

#[test]
fn offsets_are_contiguous_in_both_layouts() {
    let sizes = [48, 16, 256, 32, 16];
    for &(layout, len_at, offset_at) in &[
        (DirectoryLayout::Canonical, 8, 12),
        (DirectoryLayout::Legacy, 6, 10),
    ] {
        let ico = IcoEncoder::new(FakeRasterizer)
            .with_layout(layout)
            .encode(&(), &sizes)
            .unwrap();
        let data = ico.as_bytes();
        let count = sizes.len();
        assert_eq!(read_u16(data, 4) as usize, count);
        let mut expected_offset = (6 + 16 * count) as u32;
        let mut total = expected_offset as usize;
        for (index, &size) in sizes.iter().enumerate() {
            let entry = 6 + 16 * index;
            let len = read_u32(data, entry + len_at);
            let offset = read_u32(data, entry + offset_at);
            assert_eq!(offset, expected_offset, "entry {}", index);
            assert_eq!(len as usize, 10 + 3 * size as usize);
            assert_eq!(read_u16(data, entry + 4), 1); // planes
            let payload = &data[offset as usize..(offset + len) as usize];
            assert!(payload.starts_with(PNG_SIGNATURE));
            assert!(payload[8..].iter().all(|&byte| byte == size as u8));
            expected_offset += len;
            total += len as usize;
        }
        assert_eq!(data.len(), total);
    }
}

#[test]
fn opaque_source_payload_matches_declared_bpp() {
    let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        20,
        20,
        Rgba([30, 60, 90, 255]),
    ));
    let ico = IcoEncoder::new(ImageRasterizer::default())
        .encode(&source, &[16])
        .unwrap();
    let data = ico.as_bytes();
    assert_eq!(read_u16(data, 12), 32);
    let png = &data[22..];
    assert_eq!(png[24], 8); // bit depth
    assert_eq!(png[25], 6); // color type: RGBA
}

#[test]
fn non_png_payload_is_an_encoding_error() {
    struct RawBytesRasterizer;

    impl Rasterizer for RawBytesRasterizer {
        type Source = ();

        fn rasterize(&self, _: &(), size: IconSize) -> io::Result<Surface> {
            Surface::transparent(size.pixels(), size.pixels())
        }

        fn encode_png(&self, surface: &Surface) -> io::Result<Vec<u8>> {
            Ok(surface.rgba_data().to_vec())
        }
    }

    match IcoEncoder::new(RawBytesRasterizer).encode(&(), &[16]) {
        Err(IcoError::Encoding { size, .. }) => assert_eq!(size, 16),
        other => panic!("Expected Encoding error, got {:?}", other),
    }
}

#[test]
fn canonical_entry_declares_32_bpp() {
    let ico = IcoEncoder::new(FakeRasterizer).encode(&(), &[24]).unwrap();
    let data = ico.as_bytes();
    assert_eq!(&data[6..12], &[24, 24, 0, 0, 1, 0]);
    assert_eq!(read_u16(data, 12), 32);
}

#[test]
fn empty_sizes_are_invalid_input() {
    match IcoEncoder::new(FakeRasterizer).encode(&(), &[]) {
        Err(IcoError::InvalidInput(_)) => {}
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn zero_and_257_are_invalid_input() {
    for &bad in &[0, 257] {
        let encoder = IcoEncoder::new(FailingRasterizer { fail_at: bad });
        match encoder.encode(&(), &[16, bad]) {
            Err(IcoError::InvalidInput(_)) => {}
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }
}

#[test]
fn rasterizer_failure_aborts_encode() {
    let encoder = IcoEncoder::new(FailingRasterizer { fail_at: 32 });
    match encoder.encode(&(), &[16, 32, 64]) {
        Err(IcoError::Encoding { size, source }) => {
            assert_eq!(size, 32);
            assert_eq!(source.to_string(), "out of memory");
        }
        other => panic!("Expected Encoding error, got {:?}", other),
    }
}

#[test]
fn parallel_matches_sequential() {
    let source = gradient(64, 64);
    let encoder = IcoEncoder::new(ImageRasterizer::default());
    let sizes = [256, 16, 48, 32, 16, 64];
    let sequential = encoder.encode(&source, &sizes).unwrap();
    let parallel = encoder.encode_parallel(&source, &sizes).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn parallel_failure_aborts_encode() {
    let encoder = IcoEncoder::new(FailingRasterizer { fail_at: 64 });
    match encoder.encode_parallel(&(), &[16, 32, 64, 128]) {
        Err(IcoError::Encoding { size, .. }) => assert_eq!(size, 64),
        other => panic!("Expected Encoding error, got {:?}", other),
    }
}

//===========================================================================//
