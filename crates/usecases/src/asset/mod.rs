// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    Visibility,
    asset::{Asset, RemoteMediaId},
    util::clock::UtcDateTimeMs,
};
use lumina_repo::{
    album::{AlbumRepo, RecordId as AlbumId},
    asset::{AssetFilter, AssetRecord, AssetRepo, RecordId},
    prelude::*,
};

use crate::{
    Result,
    access::{ensure_album_in_scope, ensure_authenticated},
    validate_input,
};

/// Result window size of a gallery page.
pub const DEFAULT_PAGE_LIMIT: PaginationLimit = 20;

/// Free-text search terms are clamped to this length.
pub const SEARCH_TERMS_MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPage {
    pub records: Vec<AssetRecord>,
    pub has_more: bool,
}

fn sanitize_search_terms(search_terms: Option<String>) -> Option<String> {
    let search_terms = search_terms?;
    let mut trimmed = search_terms.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() > SEARCH_TERMS_MAX_LEN {
        let mut cut = SEARCH_TERMS_MAX_LEN;
        while !trimmed.is_char_boundary(cut) {
            cut -= 1;
        }
        trimmed = &trimmed[..cut];
    }
    Some(trimmed.to_owned())
}

/// List a page of assets visible to the caller.
///
/// Fetches one row beyond the requested limit to decide whether more
/// pages follow, without a second counting query.
pub fn list_assets<Repo>(
    repo: &mut Repo,
    scope: CallerScope,
    album_id: Option<AlbumId>,
    search_terms: Option<String>,
    pagination: &Pagination,
) -> Result<AssetPage>
where
    Repo: AssetRepo,
{
    let filter = AssetFilter {
        album_id,
        search_terms: sanitize_search_terms(search_terms),
    };
    let limit = pagination.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let probe_pagination = Pagination {
        limit: Some(limit + 1),
        offset: pagination.offset,
    };
    let mut records = repo.list_assets(scope, &filter, &probe_pagination)?;
    let has_more = records.len() as PaginationLimit > limit;
    if has_more {
        records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    Ok(AssetPage { records, has_more })
}

/// Store the local row of a successfully uploaded asset.
///
/// The remote commit has already happened; this is the final,
/// local-commit step of the upload saga.
pub fn store_created_asset<Repo>(
    repo: &mut Repo,
    created_at: UtcDateTimeMs,
    ownership: Ownership,
    album_id: Option<AlbumId>,
    created_asset: &Asset,
) -> Result<RecordId>
where
    Repo: AssetRepo,
{
    validate_input(created_asset)?;
    let id = repo.insert_asset(created_at, ownership, album_id, created_asset)?;
    Ok(id)
}

/// Remove local rows, returning the remote ids for cleanup.
///
/// Local removal takes priority over remote cleanup: the caller's
/// intent to get rid of the items must not be blocked by a remote
/// store that is down.
pub fn purge_assets<Repo>(
    repo: &mut Repo,
    scope: CallerScope,
    ids: &[RecordId],
) -> Result<Vec<(RecordId, RemoteMediaId)>>
where
    Repo: AssetRepo,
{
    ensure_authenticated(scope)?;
    let purged = repo.purge_assets(scope, ids)?;
    Ok(purged)
}

/// Move assets into an album, or out of any album.
pub fn move_assets<Repo>(
    repo: &mut Repo,
    updated_at: UtcDateTimeMs,
    scope: CallerScope,
    ids: &[RecordId],
    album_id: Option<AlbumId>,
) -> Result<usize>
where
    Repo: AssetRepo + AlbumRepo,
{
    ensure_authenticated(scope)?;
    if let Some(album_id) = album_id {
        let album = repo.load_album(album_id)?;
        ensure_album_in_scope(scope, &album)?;
    }
    let moved = repo.move_assets_to_album(updated_at, scope, ids, album_id)?;
    Ok(moved)
}

pub fn set_asset_visibility<Repo>(
    repo: &mut Repo,
    updated_at: UtcDateTimeMs,
    scope: CallerScope,
    id: RecordId,
    visibility: Visibility,
) -> Result<()>
where
    Repo: AssetRepo,
{
    ensure_authenticated(scope)?;
    repo.update_asset_visibility(updated_at, scope, id, visibility)?;
    Ok(())
}

/// Overwrite stale cached delivery URLs from a fresh remote
/// descriptor.
///
/// The remote id is the join key between both stores and must match.
pub fn repair_asset_delivery_urls<Repo>(
    repo: &mut Repo,
    updated_at: UtcDateTimeMs,
    id: RecordId,
    remote_id: RemoteMediaId,
    delivery: &lumina_core::asset::DeliveryUrls,
) -> Result<()>
where
    Repo: AssetRepo,
{
    let record = repo.load_asset(id)?;
    if record.asset.remote_id != remote_id {
        return Err(RepoError::Conflict.into());
    }
    repo.update_asset_delivery_urls(updated_at, id, delivery)?;
    Ok(())
}
