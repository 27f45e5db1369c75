// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use image::{DynamicImage, ImageFormat, RgbImage};
use mime::IMAGE_JPEG;

use super::*;

fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let picture = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut data = std::io::Cursor::new(Vec::new());
    picture.write_to(&mut data, ImageFormat::Png).unwrap();
    data.into_inner()
}

fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let picture = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut data = std::io::Cursor::new(Vec::new());
    picture.write_to(&mut data, ImageFormat::Jpeg).unwrap();
    data.into_inner()
}

/// Splice a fake Exif APP1 segment right after the SOI marker,
/// imitating what cameras embed.
fn with_exif_segment(jpeg: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xff, 0xd8], "SOI marker");
    let payload = b"Exif\0\0fake-gps-and-device-tags";
    let segment_len = u16::try_from(payload.len() + 2).unwrap();
    let mut spliced = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    spliced.extend_from_slice(&jpeg[..2]);
    spliced.extend_from_slice(&[0xff, 0xe1]);
    spliced.extend_from_slice(&segment_len.to_be_bytes());
    spliced.extend_from_slice(payload);
    spliced.extend_from_slice(&jpeg[2..]);
    spliced
}

fn contains_exif_marker(data: &[u8]) -> bool {
    data.windows(4).any(|window| window == b"Exif")
}

#[test]
fn downscale_oversized_to_max_edge() {
    let input = encode_png(4000, 3000);
    let prepared = prepare_image(&input, "holiday.png", "image/png").unwrap();
    assert_eq!(prepared.width, MAX_EDGE_DIMENSION);
    assert_eq!(prepared.height, 1920);
    assert_eq!(prepared.media_type, IMAGE_JPEG);
}

#[test]
fn downscale_portrait_orientation() {
    let input = encode_png(1000, 3000);
    let prepared = prepare_image(&input, "tower.png", "image/png").unwrap();
    assert_eq!(prepared.height, MAX_EDGE_DIMENSION);
    assert!(prepared.width < MAX_EDGE_DIMENSION);
}

#[test]
fn never_upscale() {
    let input = encode_png(640, 480);
    let prepared = prepare_image(&input, "small.png", "image/png").unwrap();
    assert_eq!((prepared.width, prepared.height), (640, 480));
}

#[test]
fn keep_exact_max_edge_unchanged() {
    let input = encode_png(MAX_EDGE_DIMENSION, 16);
    let prepared = prepare_image(&input, "wide.png", "image/png").unwrap();
    assert_eq!((prepared.width, prepared.height), (MAX_EDGE_DIMENSION, 16));
}

#[test]
fn strip_embedded_metadata() {
    let input = with_exif_segment(&encode_jpeg(320, 240));
    assert!(contains_exif_marker(&input));
    let prepared = prepare_image(&input, "tagged.jpg", "image/jpeg").unwrap();
    assert!(!contains_exif_marker(&prepared.data));
}

#[test]
fn output_decodes_as_jpeg() {
    let input = encode_png(100, 60);
    let prepared = prepare_image(&input, "tiny.png", "image/png").unwrap();
    let decoded = image::load_from_memory(&prepared.data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (100, 60));
}

#[test]
fn colliding_original_names_produce_distinct_outputs() {
    let input = encode_png(8, 8);
    let first = prepare_image(&input, "photo.png", "image/png").unwrap();
    let second = prepare_image(&input, "photo.png", "image/png").unwrap();
    assert_ne!(first.file_name, second.file_name);
    assert!(first.file_name.ends_with(".jpg"));
}

#[test]
fn reject_disallowed_extension() {
    let input = encode_png(8, 8);
    let err = prepare_image(&input, "document.pdf", "application/pdf").unwrap_err();
    assert!(matches!(err, Error::UnsupportedMediaType { .. }));
}

#[test]
fn reject_missing_extension() {
    assert!(!is_allowed_upload("noextension", "image/png"));
    assert!(!is_allowed_upload("", "image/png"));
    assert!(!is_allowed_upload("trailingdot.", "image/png"));
}

#[test]
fn reject_mismatched_media_type() {
    assert!(!is_allowed_upload("photo.png", "image/gif"));
}

#[test]
fn accept_generic_media_type_with_allowed_extension() {
    assert!(is_allowed_upload("photo.jpg", "application/octet-stream"));
    assert!(is_allowed_upload("photo.jpg", ""));
    // Parameters after the essence are ignored
    assert!(is_allowed_upload("photo.jpg", "image/jpeg; charset=binary"));
    // Non-standard but common spelling
    assert!(is_allowed_upload("photo.jpg", "image/jpg"));
}

#[test]
fn reject_corrupt_image_data() {
    let err = prepare_image(b"not an image", "photo.png", "image/png").unwrap_err();
    assert!(matches!(err, Error::Image(_)));
}
