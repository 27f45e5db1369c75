// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    Visibility,
    asset::{Asset, DeliveryUrls, RemoteMediaId},
    util::clock::UtcDateTimeMs,
};
use lumina_repo::{
    album::RecordId as AlbumId,
    asset::{AssetFilter, AssetRecord, AssetRepo, RecordId},
};

use crate::{
    db::asset::{models::*, schema::*},
    prelude::*,
};

impl AssetRepo for Connection<'_> {
    fn insert_asset(
        &mut self,
        created_at: UtcDateTimeMs,
        ownership: Ownership,
        album_id: Option<AlbumId>,
        created_asset: &Asset,
    ) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(created_at, ownership, album_id, created_asset);
        diesel::insert_into(asset::table)
            .values(&insertable)
            .returning(asset::row_id)
            .get_result::<RowId>(self.as_mut())
            .map_err(repo_error)
            .map(Into::into)
    }

    fn load_asset(&mut self, id: RecordId) -> RepoResult<AssetRecord> {
        asset::table
            .filter(asset::row_id.eq(id.to_inner()))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(TryInto::try_into)
    }

    fn load_asset_by_remote_id(&mut self, remote_id: RemoteMediaId) -> RepoResult<AssetRecord> {
        asset::table
            .filter(asset::remote_id.eq(remote_id.to_inner()))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(TryInto::try_into)
    }

    fn list_assets(
        &mut self,
        scope: CallerScope,
        filter: &AssetFilter,
        pagination: &Pagination,
    ) -> RepoResult<Vec<AssetRecord>> {
        let mut target = asset::table
            .order_by(asset::row_created_ms.desc())
            .then_order_by(asset::row_id.desc())
            .into_boxed();
        match scope {
            CallerScope::Anonymous => {
                target =
                    target.filter(asset::visibility.eq(visibility_to_sql(Visibility::Public)));
            }
            CallerScope::Member { tenant_id, .. } => {
                target = target.filter(asset::tenant_id.eq(tenant_id.to_inner()));
            }
            CallerScope::Admin => (),
        }
        let AssetFilter {
            album_id,
            search_terms,
        } = filter;
        if let Some(album_id) = album_id {
            target = target.filter(asset::album_id.eq(album_id.to_inner()));
        }
        if let Some(search_terms) = search_terms {
            let like_expr = escape_like_contains(search_terms);
            target = target.filter(
                asset::title
                    .like(like_expr.clone())
                    .escape(LIKE_ESCAPE_CHARACTER)
                    .or(asset::file_name
                        .like(like_expr)
                        .escape(LIKE_ESCAPE_CHARACTER)),
            );
        }
        let target = apply_pagination(target, pagination);
        target
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    fn update_asset_visibility(
        &mut self,
        updated_at: UtcDateTimeMs,
        scope: CallerScope,
        id: RecordId,
        visibility: Visibility,
    ) -> RepoResult<()> {
        let changeset = (
            asset::visibility.eq(visibility_to_sql(visibility)),
            asset::row_updated_ms.eq(timestamp_to_sql(updated_at)),
        );
        // The scope is part of the UPDATE statement itself. A row
        // outside the scope counts as absent, indistinguishable from
        // a genuinely missing id.
        let rows_affected = match scope {
            CallerScope::Anonymous => 0,
            CallerScope::Member { tenant_id, .. } => {
                let target = asset::table
                    .filter(asset::row_id.eq(id.to_inner()))
                    .filter(asset::tenant_id.eq(tenant_id.to_inner()));
                diesel::update(target)
                    .set(changeset)
                    .execute(self.as_mut())
                    .map_err(repo_error)?
            }
            CallerScope::Admin => {
                let target = asset::table.filter(asset::row_id.eq(id.to_inner()));
                diesel::update(target)
                    .set(changeset)
                    .execute(self.as_mut())
                    .map_err(repo_error)?
            }
        };
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn move_assets_to_album(
        &mut self,
        updated_at: UtcDateTimeMs,
        scope: CallerScope,
        ids: &[RecordId],
        album_id: Option<AlbumId>,
    ) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let row_ids: Vec<_> = ids.iter().copied().map(RecordId::to_inner).collect();
        let changeset = (
            asset::album_id.eq(album_id.map(AlbumId::to_inner)),
            asset::row_updated_ms.eq(timestamp_to_sql(updated_at)),
        );
        let rows_affected = match scope {
            CallerScope::Anonymous => 0,
            CallerScope::Member { tenant_id, .. } => {
                let target = asset::table
                    .filter(asset::row_id.eq_any(row_ids))
                    .filter(asset::tenant_id.eq(tenant_id.to_inner()));
                diesel::update(target)
                    .set(changeset)
                    .execute(self.as_mut())
                    .map_err(repo_error)?
            }
            CallerScope::Admin => {
                let target = asset::table.filter(asset::row_id.eq_any(row_ids));
                diesel::update(target)
                    .set(changeset)
                    .execute(self.as_mut())
                    .map_err(repo_error)?
            }
        };
        Ok(rows_affected)
    }

    fn purge_assets(
        &mut self,
        scope: CallerScope,
        ids: &[RecordId],
    ) -> RepoResult<Vec<(RecordId, RemoteMediaId)>> {
        if ids.is_empty() || matches!(scope, CallerScope::Anonymous) {
            return Ok(Vec::new());
        }
        let row_ids: Vec<_> = ids.iter().copied().map(RecordId::to_inner).collect();
        self.as_mut()
            .transaction::<_, RepoTransactionError, _>(|connection| {
                let mut target = asset::table
                    .select((asset::row_id, asset::remote_id))
                    .filter(asset::row_id.eq_any(row_ids))
                    .into_boxed();
                if let CallerScope::Member { tenant_id, .. } = scope {
                    target = target.filter(asset::tenant_id.eq(tenant_id.to_inner()));
                }
                let purgeable = target
                    .load::<(RowId, i64)>(connection)
                    .map_err(repo_error)?;
                if purgeable.is_empty() {
                    return Ok(Vec::new());
                }
                let purged_row_ids: Vec<_> = purgeable.iter().map(|(row_id, _)| *row_id).collect();
                let rows_affected =
                    diesel::delete(asset::table.filter(asset::row_id.eq_any(purged_row_ids)))
                        .execute(connection)
                        .map_err(repo_error)?;
                debug_assert_eq!(purgeable.len(), rows_affected);
                Ok(purgeable
                    .into_iter()
                    .map(|(row_id, remote_id)| {
                        (RecordId::new(row_id), RemoteMediaId::new(remote_id))
                    })
                    .collect())
            })
            .map_err(DieselTransactionError::into_inner)
    }

    fn update_asset_delivery_urls(
        &mut self,
        updated_at: UtcDateTimeMs,
        id: RecordId,
        delivery: &DeliveryUrls,
    ) -> RepoResult<()> {
        let target = asset::table.filter(asset::row_id.eq(id.to_inner()));
        let rows_affected = diesel::update(target)
            .set((
                asset::url_thumbnail.eq(delivery.thumbnail.as_str()),
                asset::url_medium.eq(delivery.medium.as_str()),
                asset::url_full.eq(delivery.full.as_str()),
                asset::row_updated_ms.eq(timestamp_to_sql(updated_at)),
            ))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
