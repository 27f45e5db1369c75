// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{user::User, util::clock::UtcDateTimeMs};
use lumina_repo::{
    tenant::RecordId as TenantId,
    user::{RecordId, UserRecord, UserRepo},
};

use crate::{
    db::user::{models::*, schema::*},
    prelude::*,
};

impl UserRepo for Connection<'_> {
    fn insert_user(
        &mut self,
        created_at: UtcDateTimeMs,
        tenant_id: TenantId,
        created_user: &User,
    ) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(created_at, tenant_id, created_user);
        diesel::insert_into(app_user::table)
            .values(&insertable)
            .returning(app_user::row_id)
            .get_result::<RowId>(self.as_mut())
            .map_err(repo_error)
            .map(Into::into)
    }

    fn load_user(&mut self, id: RecordId) -> RepoResult<UserRecord> {
        app_user::table
            .filter(app_user::row_id.eq(id.to_inner()))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(TryInto::try_into)
    }

    fn load_user_by_username(&mut self, username: &str) -> RepoResult<UserRecord> {
        app_user::table
            .filter(app_user::username.eq(username))
            .filter(app_user::active.eq(true))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(TryInto::try_into)
    }

    fn load_user_by_email(&mut self, email: &str) -> RepoResult<UserRecord> {
        app_user::table
            .filter(app_user::email.eq(email))
            .filter(app_user::active.eq(true))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(TryInto::try_into)
    }

    fn list_users(&mut self, tenant_id: Option<TenantId>) -> RepoResult<Vec<UserRecord>> {
        let mut target = app_user::table
            .filter(app_user::active.eq(true))
            .order_by(app_user::username.asc())
            .into_boxed();
        if let Some(tenant_id) = tenant_id {
            target = target.filter(app_user::tenant_id.eq(tenant_id.to_inner()));
        }
        target
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    fn deactivate_user(&mut self, updated_at: UtcDateTimeMs, id: RecordId) -> RepoResult<()> {
        let target = app_user::table.filter(app_user::row_id.eq(id.to_inner()));
        let rows_affected = diesel::update(target)
            .set((
                app_user::active.eq(false),
                app_user::row_updated_ms.eq(timestamp_to_sql(updated_at)),
            ))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn update_user_password_hash(
        &mut self,
        updated_at: UtcDateTimeMs,
        id: RecordId,
        password_hash: &str,
    ) -> RepoResult<()> {
        let target = app_user::table.filter(app_user::row_id.eq(id.to_inner()));
        let rows_affected = diesel::update(target)
            .set((
                app_user::password_hash.eq(password_hash),
                app_user::row_updated_ms.eq(timestamp_to_sql(updated_at)),
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
