// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{album::Album, util::clock::UtcDateTimeMs};

use crate::prelude::*;

record_id_newtype!(RecordId);

pub type RecordHeader = crate::RecordHeader<RecordId>;

/// A stored album row: the album itself plus its position in the
/// forest and its ownership.
///
/// Clients assemble the tree from the flat list of records by
/// following the parent pointers; ordering among siblings is a
/// read-side concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumRecord {
    pub header: RecordHeader,
    pub ownership: Ownership,
    pub parent_id: Option<RecordId>,
    pub album: Album,
}

pub trait AlbumRepo {
    fn insert_album(
        &mut self,
        created_at: UtcDateTimeMs,
        ownership: Ownership,
        parent_id: Option<RecordId>,
        created_album: &Album,
    ) -> RepoResult<RecordId>;

    fn load_album(&mut self, id: RecordId) -> RepoResult<AlbumRecord>;

    /// Flat list with parent pointers, restricted by the caller scope.
    fn list_albums(&mut self, scope: CallerScope) -> RepoResult<Vec<AlbumRecord>>;

    /// Update name, description, and visibility.
    fn update_album(
        &mut self,
        updated_at: UtcDateTimeMs,
        id: RecordId,
        updated_album: &Album,
    ) -> RepoResult<()>;

    /// Move the album below a new parent, or to the root.
    ///
    /// Fails with [`RepoError::Cycle`] when the new parent chain
    /// contains the album itself. The ancestor walk and the write
    /// must happen within a single transaction so that no concurrent
    /// reparent can slip a cycle in between check and commit.
    fn reparent_album(
        &mut self,
        updated_at: UtcDateTimeMs,
        id: RecordId,
        new_parent_id: Option<RecordId>,
    ) -> RepoResult<()>;

    /// Delete the album row.
    ///
    /// Child assets are detached (not deleted) and child albums are
    /// re-parented to the deleted album's parent, all within a single
    /// transaction.
    fn delete_album(&mut self, updated_at: UtcDateTimeMs, id: RecordId) -> RepoResult<()>;
}
