// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{album::Album, util::clock::UtcDateTimeMs};
use lumina_repo::{
    album::{AlbumRecord, AlbumRepo, RecordId},
    prelude::*,
};

use crate::{
    Result,
    access::{ensure_album_in_scope, ensure_authenticated},
    validate_input,
};

/// Create an album, optionally below an existing parent.
///
/// The parent must resolve within the caller scope; cross-tenant
/// parent ids are indistinguishable from absent ones.
pub fn create_album<Repo>(
    repo: &mut Repo,
    created_at: UtcDateTimeMs,
    scope: CallerScope,
    ownership: Ownership,
    parent_id: Option<RecordId>,
    created_album: &Album,
) -> Result<RecordId>
where
    Repo: AlbumRepo,
{
    ensure_authenticated(scope)?;
    validate_input(created_album)?;
    if let Some(parent_id) = parent_id {
        let parent = repo.load_album(parent_id)?;
        ensure_album_in_scope(scope, &parent)?;
    }
    let id = repo.insert_album(created_at, ownership, parent_id, created_album)?;
    Ok(id)
}

/// Flat listing with parent pointers.
///
/// Assembling the tree and ordering siblings is a read-side concern
/// of the client.
pub fn list_albums<Repo>(repo: &mut Repo, scope: CallerScope) -> Result<Vec<AlbumRecord>>
where
    Repo: AlbumRepo,
{
    let records = repo.list_albums(scope)?;
    Ok(records)
}

/// Rename/describe an album or toggle its visibility.
pub fn update_album<Repo>(
    repo: &mut Repo,
    updated_at: UtcDateTimeMs,
    scope: CallerScope,
    id: RecordId,
    updated_album: &Album,
) -> Result<()>
where
    Repo: AlbumRepo,
{
    validate_input(updated_album)?;
    let record = repo.load_album(id)?;
    ensure_album_in_scope(scope, &record)?;
    repo.update_album(updated_at, id, updated_album)?;
    Ok(())
}

/// Move an album below a new parent, or to the root.
///
/// The cycle check runs inside the repository transaction, so no
/// concurrent reparent can corrupt the forest between check and
/// commit.
pub fn reparent_album<Repo>(
    repo: &mut Repo,
    updated_at: UtcDateTimeMs,
    scope: CallerScope,
    id: RecordId,
    new_parent_id: Option<RecordId>,
) -> Result<()>
where
    Repo: AlbumRepo,
{
    let record = repo.load_album(id)?;
    ensure_album_in_scope(scope, &record)?;
    if let Some(new_parent_id) = new_parent_id {
        let new_parent = repo.load_album(new_parent_id)?;
        ensure_album_in_scope(scope, &new_parent)?;
    }
    repo.reparent_album(updated_at, id, new_parent_id)?;
    Ok(())
}

/// Delete an album.
///
/// Its assets are detached and its child albums re-parented, never
/// deleted.
pub fn delete_album<Repo>(
    repo: &mut Repo,
    updated_at: UtcDateTimeMs,
    scope: CallerScope,
    id: RecordId,
) -> Result<()>
where
    Repo: AlbumRepo,
{
    let record = repo.load_album(id)?;
    ensure_album_in_scope(scope, &record)?;
    repo.delete_album(updated_at, id)?;
    Ok(())
}
