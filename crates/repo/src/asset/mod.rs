// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    Visibility,
    asset::{Asset, DeliveryUrls, RemoteMediaId},
    util::clock::UtcDateTimeMs,
};

use crate::{album::RecordId as AlbumId, prelude::*};

record_id_newtype!(RecordId);

pub type RecordHeader = crate::RecordHeader<RecordId>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRecord {
    pub header: RecordHeader,
    pub ownership: Ownership,
    pub album_id: Option<AlbumId>,
    pub asset: Asset,
}

/// Search/browse filter, combined conjunctively with the caller scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetFilter {
    /// Restrict to a single album.
    pub album_id: Option<AlbumId>,

    /// Free-text term matched against title and file name.
    ///
    /// Matching is a plain case-insensitive substring match; the
    /// backend is responsible for escaping its pattern syntax.
    pub search_terms: Option<String>,
}

pub trait AssetRepo {
    fn insert_asset(
        &mut self,
        created_at: UtcDateTimeMs,
        ownership: Ownership,
        album_id: Option<AlbumId>,
        created_asset: &Asset,
    ) -> RepoResult<RecordId>;

    fn load_asset(&mut self, id: RecordId) -> RepoResult<AssetRecord>;

    fn load_asset_by_remote_id(&mut self, remote_id: RemoteMediaId) -> RepoResult<AssetRecord>;

    /// Newest-first listing.
    ///
    /// The caller scope becomes part of the query predicate. Rows
    /// outside the scope are not merely skipped, they are invisible
    /// to pagination.
    fn list_assets(
        &mut self,
        scope: CallerScope,
        filter: &AssetFilter,
        pagination: &Pagination,
    ) -> RepoResult<Vec<AssetRecord>>;

    /// Scoped single-row update.
    ///
    /// Returns [`RepoError::NotFound`] both for an absent id and for
    /// a row outside the caller scope: callers must not be able to
    /// distinguish the two through the error shape.
    fn update_asset_visibility(
        &mut self,
        updated_at: UtcDateTimeMs,
        scope: CallerScope,
        id: RecordId,
        visibility: Visibility,
    ) -> RepoResult<()>;

    /// Scoped batch reparent. Returns the number of moved rows;
    /// out-of-scope and absent ids are silently skipped.
    fn move_assets_to_album(
        &mut self,
        updated_at: UtcDateTimeMs,
        scope: CallerScope,
        ids: &[RecordId],
        album_id: Option<AlbumId>,
    ) -> RepoResult<usize>;

    /// Scoped batch removal of local rows.
    ///
    /// Returns the `(id, remote_id)` pairs of the rows that were
    /// actually purged so that the caller can run the remote cleanup
    /// afterwards. Out-of-scope and absent ids are skipped.
    fn purge_assets(
        &mut self,
        scope: CallerScope,
        ids: &[RecordId],
    ) -> RepoResult<Vec<(RecordId, RemoteMediaId)>>;

    /// Repair path: overwrite the cached delivery URLs after
    /// re-fetching the descriptor from the remote store.
    fn update_asset_delivery_urls(
        &mut self,
        updated_at: UtcDateTimeMs,
        id: RecordId,
        delivery: &DeliveryUrls,
    ) -> RepoResult<()>;
}
