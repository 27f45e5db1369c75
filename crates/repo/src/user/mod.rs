// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{user::User, util::clock::UtcDateTimeMs};

use crate::{prelude::*, tenant::RecordId as TenantId};

record_id_newtype!(RecordId);

pub type RecordHeader = crate::RecordHeader<RecordId>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub header: RecordHeader,
    pub tenant_id: TenantId,
    pub user: User,
}

pub trait UserRepo {
    fn insert_user(
        &mut self,
        created_at: UtcDateTimeMs,
        tenant_id: TenantId,
        created_user: &User,
    ) -> RepoResult<RecordId>;

    fn load_user(&mut self, id: RecordId) -> RepoResult<UserRecord>;

    /// Resolve an active user by name.
    ///
    /// Deactivated users do not resolve, i.e. their credentials and
    /// tokens stop working without their rows disappearing.
    fn load_user_by_username(&mut self, username: &str) -> RepoResult<UserRecord>;

    fn load_user_by_email(&mut self, email: &str) -> RepoResult<UserRecord>;

    fn list_users(&mut self, tenant_id: Option<TenantId>) -> RepoResult<Vec<UserRecord>>;

    /// Soft-delete: clear the active flag, keep the row.
    fn deactivate_user(&mut self, updated_at: UtcDateTimeMs, id: RecordId) -> RepoResult<()>;

    fn update_user_password_hash(
        &mut self,
        updated_at: UtcDateTimeMs,
        id: RecordId,
        password_hash: &str,
    ) -> RepoResult<()>;
}
