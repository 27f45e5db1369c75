// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{Visibility, album::Album, util::clock::UtcDateTimeMs};
use lumina_repo::album::{AlbumRecord, AlbumRepo, RecordId};

use crate::{
    db::{
        album::{models::*, schema::*},
        asset::schema::*,
    },
    prelude::*,
};

/// Walk upward from `start_id` to the root.
///
/// Returns `RepoError::Cycle` when `moved_id` is encountered on the
/// way. Must run inside the same transaction as the subsequent write.
fn check_no_cycle(
    connection: &mut DbConnection,
    moved_id: RecordId,
    start_id: Option<RecordId>,
) -> RepoResult<()> {
    let mut cursor = start_id;
    while let Some(ancestor_id) = cursor {
        if ancestor_id == moved_id {
            return Err(RepoError::Cycle);
        }
        cursor = album::table
            .filter(album::row_id.eq(ancestor_id.to_inner()))
            .select(album::parent_id)
            .first::<Option<RowId>>(connection)
            .map_err(repo_error)?
            .map(RecordId::new);
    }
    Ok(())
}

impl AlbumRepo for Connection<'_> {
    fn insert_album(
        &mut self,
        created_at: UtcDateTimeMs,
        ownership: Ownership,
        parent_id: Option<RecordId>,
        created_album: &Album,
    ) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(created_at, ownership, parent_id, created_album);
        diesel::insert_into(album::table)
            .values(&insertable)
            .returning(album::row_id)
            .get_result::<RowId>(self.as_mut())
            .map_err(repo_error)
            .map(Into::into)
    }

    fn load_album(&mut self, id: RecordId) -> RepoResult<AlbumRecord> {
        album::table
            .filter(album::row_id.eq(id.to_inner()))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(TryInto::try_into)
    }

    fn list_albums(&mut self, scope: CallerScope) -> RepoResult<Vec<AlbumRecord>> {
        let mut target = album::table.order_by(album::name.asc()).into_boxed();
        match scope {
            CallerScope::Anonymous => {
                target =
                    target.filter(album::visibility.eq(visibility_to_sql(Visibility::Public)));
            }
            CallerScope::Member { tenant_id, .. } => {
                target = target.filter(album::tenant_id.eq(tenant_id.to_inner()));
            }
            CallerScope::Admin => (),
        }
        target
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    fn update_album(
        &mut self,
        updated_at: UtcDateTimeMs,
        id: RecordId,
        updated_album: &Album,
    ) -> RepoResult<()> {
        let updatable = UpdatableRecord::bind(updated_at, updated_album);
        let target = album::table.filter(album::row_id.eq(id.to_inner()));
        let rows_affected = diesel::update(target)
            .set(&updatable)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn reparent_album(
        &mut self,
        updated_at: UtcDateTimeMs,
        id: RecordId,
        new_parent_id: Option<RecordId>,
    ) -> RepoResult<()> {
        self.as_mut()
            .transaction::<_, RepoTransactionError, _>(|connection| {
                // The moved album must exist before anything else is
                // decided, otherwise a reparent of an absent album to
                // itself would be reported as a cycle.
                album::table
                    .filter(album::row_id.eq(id.to_inner()))
                    .select(album::row_id)
                    .first::<RowId>(connection)
                    .map_err(repo_error)?;
                check_no_cycle(connection, id, new_parent_id)?;
                let target = album::table.filter(album::row_id.eq(id.to_inner()));
                let rows_affected = diesel::update(target)
                    .set((
                        album::parent_id.eq(new_parent_id.map(RecordId::to_inner)),
                        album::row_updated_ms.eq(timestamp_to_sql(updated_at)),
                    ))
                    .execute(connection)
                    .map_err(repo_error)?;
                debug_assert_eq!(1, rows_affected);
                Ok(())
            })
            .map_err(DieselTransactionError::into_inner)
    }

    fn delete_album(&mut self, updated_at: UtcDateTimeMs, id: RecordId) -> RepoResult<()> {
        self.as_mut()
            .transaction::<_, RepoTransactionError, _>(|connection| {
                let parent_id = album::table
                    .filter(album::row_id.eq(id.to_inner()))
                    .select(album::parent_id)
                    .first::<Option<RowId>>(connection)
                    .map_err(repo_error)?;
                // Re-parent child albums to the deleted album's parent
                let child_albums = album::table.filter(album::parent_id.eq(id.to_inner()));
                diesel::update(child_albums)
                    .set((
                        album::parent_id.eq(parent_id),
                        album::row_updated_ms.eq(timestamp_to_sql(updated_at)),
                    ))
                    .execute(connection)
                    .map_err(repo_error)?;
                // Detach (not delete) the album's assets
                let child_assets = asset::table.filter(asset::album_id.eq(id.to_inner()));
                diesel::update(child_assets)
                    .set((
                        asset::album_id.eq(None::<RowId>),
                        asset::row_updated_ms.eq(timestamp_to_sql(updated_at)),
                    ))
                    .execute(connection)
                    .map_err(repo_error)?;
                let rows_affected =
                    diesel::delete(album::table.filter(album::row_id.eq(id.to_inner())))
                        .execute(connection)
                        .map_err(repo_error)?;
                debug_assert_eq!(1, rows_affected);
                Ok(())
            })
            .map_err(DieselTransactionError::into_inner)
    }
}

#[cfg(test)]
mod tests;
