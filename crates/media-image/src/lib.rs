// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Image preparation pipeline.
//!
//! Transforms an uploaded binary before it is sent to the remote
//! media store: validates the declared type against an allow-list,
//! bounds the dimensions, re-encodes at a fixed quality, and strips
//! all embedded descriptive metadata. Pure and free of I/O, therefore
//! trivially retryable and testable in isolation.

use image::{DynamicImage, ImageError, codecs::jpeg::JpegEncoder, imageops::FilterType};
use mime::{IMAGE_JPEG, Mime};
use rand::RngCore as _;
use thiserror::Error;

use lumina_core::util::random::adhoc_rng;

/// Upper bound for the longer edge of a prepared image.
///
/// Larger inputs are downscaled so that their longer edge lands
/// exactly on this bound. Smaller inputs are never upscaled.
pub const MAX_EDGE_DIMENSION: u32 = 2560;

/// Fixed re-encoding quality, bounding the payload size.
pub const ENCODE_QUALITY: u8 = 85;

/// Accepted file name extensions, lower-case.
pub const ALLOWED_EXTENSIONS: &[&str] = &["gif", "jpeg", "jpg", "png", "webp"];

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported media type \"{declared_media_type}\" for file \"{file_name}\"")]
    UnsupportedMediaType {
        file_name: String,
        declared_media_type: String,
    },

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Declared media types that clients send when they don't know
/// better, e.g. mobile browsers. Accepted as long as the file name
/// extension is allowed.
const GENERIC_MEDIA_TYPES: &[&str] = &["", "application/octet-stream", "application/unknown"];

fn allowed_media_types_for_extension(extension: &str) -> Option<&'static [&'static str]> {
    let allowed: &[&str] = match extension {
        "png" => &["image/png"],
        // "image/jpg" and "image/pjpeg" are non-standard but common
        "jpg" | "jpeg" => &["image/jpeg", "image/jpg", "image/pjpeg"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        _ => return None,
    };
    Some(allowed)
}

fn file_name_extension(file_name: &str) -> Option<String> {
    let (_, extension) = file_name.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Check a file name and its declared media type against the
/// allow-list.
///
/// The extension is the primary check. The declared media type only
/// needs to match when the client actually provided a specific one;
/// generic or empty declarations are accepted because clients can lie
/// about the type anyway and the subsequent decoding attempt is the
/// authoritative validation.
#[must_use]
pub fn is_allowed_upload(file_name: &str, declared_media_type: &str) -> bool {
    let Some(extension) = file_name_extension(file_name) else {
        return false;
    };
    let Some(allowed) = allowed_media_types_for_extension(&extension) else {
        return false;
    };
    let essence = declared_media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if GENERIC_MEDIA_TYPES.contains(&essence.as_str()) {
        return true;
    }
    allowed.contains(&essence.as_str())
}

/// The outcome of a successful preparation.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Deterministically generated file name, unique even for
    /// colliding original file names.
    pub file_name: String,

    /// Always JPEG after re-encoding.
    pub media_type: Mime,

    pub width: u32,
    pub height: u32,

    pub data: Vec<u8>,
}

fn generated_file_name() -> String {
    let unix_seconds = jiff::Timestamp::now().as_second();
    let mut suffix = [0u8; 3];
    adhoc_rng().fill_bytes(&mut suffix);
    format!(
        "{unix_seconds}-{:02x}{:02x}{:02x}.jpg",
        suffix[0], suffix[1], suffix[2]
    )
}

fn exceeds_max_edge(picture: &DynamicImage) -> bool {
    picture.width().max(picture.height()) > MAX_EDGE_DIMENSION
}

/// Prepare an uploaded binary for submission to the remote store.
///
/// Decoding and re-encoding implicitly strips all embedded
/// descriptive metadata (orientation, location, and device tags):
/// only pixel data survives the round trip.
pub fn prepare_image(
    data: &[u8],
    original_file_name: &str,
    declared_media_type: &str,
) -> Result<PreparedImage> {
    if !is_allowed_upload(original_file_name, declared_media_type) {
        return Err(Error::UnsupportedMediaType {
            file_name: original_file_name.to_owned(),
            declared_media_type: declared_media_type.to_owned(),
        });
    }
    let picture = image::load_from_memory(data)?;
    let picture = if exceeds_max_edge(&picture) {
        log::debug!(
            "Downscaling {width}x{height} to fit within \
             {MAX_EDGE_DIMENSION}x{MAX_EDGE_DIMENSION}",
            width = picture.width(),
            height = picture.height(),
        );
        picture.resize(
            MAX_EDGE_DIMENSION,
            MAX_EDGE_DIMENSION,
            FilterType::Lanczos3,
        )
    } else {
        picture
    };
    let width = picture.width();
    let height = picture.height();
    // JPEG has no alpha channel, re-encode from RGB pixels.
    let rgb_picture = picture.into_rgb8();
    let mut data = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut data, ENCODE_QUALITY);
    rgb_picture.write_with_encoder(encoder)?;
    Ok(PreparedImage {
        file_name: generated_file_name(),
        media_type: IMAGE_JPEG,
        width,
        height,
        data,
    })
}

#[cfg(test)]
mod tests;
