// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use mime::Mime;
use semval::prelude::*;
use url::Url;

use crate::Visibility;

/// Identifier of an object in the remote media store's namespace.
///
/// Assigned by the remote store on upload and unique per asset. This
/// is the join key for recovering delivery URLs when the cached URLs
/// become stale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemoteMediaId(i64);

impl RemoteMediaId {
    #[must_use]
    pub const fn new(inner: i64) -> Self {
        Self(inner)
    }

    #[must_use]
    pub const fn to_inner(self) -> i64 {
        let Self(inner) = self;
        inner
    }
}

impl From<i64> for RemoteMediaId {
    fn from(from: i64) -> Self {
        Self::new(from)
    }
}

impl From<RemoteMediaId> for i64 {
    fn from(from: RemoteMediaId) -> Self {
        from.to_inner()
    }
}

impl std::fmt::Display for RemoteMediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self(inner) = self;
        inner.fmt(f)
    }
}

/// Download URLs at the resolutions generated by the remote store.
///
/// All three URLs are supplied by the remote store at upload time.
/// The binary content behind them is owned exclusively by the remote
/// store; the local cache only mirrors the URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryUrls {
    pub thumbnail: Url,
    pub medium: Url,
    pub full: Url,
}

/// A single image resource of the gallery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub remote_id: RemoteMediaId,

    pub title: String,

    /// The file name under which the processed image was submitted to
    /// the remote store.
    pub file_name: String,

    pub media_type: Mime,

    pub delivery: DeliveryUrls,

    pub visibility: Visibility,
}

#[derive(Copy, Clone, Debug)]
pub enum AssetInvalidity {
    TitleEmpty,
    FileNameEmpty,
}

impl Validate for Asset {
    type Invalidity = AssetInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        let Self {
            remote_id: _,
            title,
            file_name,
            media_type: _,
            delivery: _,
            visibility: _,
        } = self;
        ValidationContext::new()
            .invalidate_if(title.trim().is_empty(), Self::Invalidity::TitleEmpty)
            .invalidate_if(file_name.trim().is_empty(), Self::Invalidity::FileNameEmpty)
            .into()
    }
}
