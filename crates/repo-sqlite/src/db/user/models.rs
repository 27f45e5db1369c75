// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    user::User,
    util::clock::{TimestampMillis, UtcDateTimeMs},
};
use lumina_repo::{tenant::RecordId as TenantId, user::UserRecord};

use super::schema::app_user;
use crate::prelude::*;

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = app_user, primary_key(row_id))]
pub(crate) struct QueryableRecord {
    pub(crate) row_id: RowId,
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) tenant_id: RowId,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) role: i16,
    pub(crate) active: bool,
}

impl TryFrom<QueryableRecord> for UserRecord {
    type Error = RepoError;

    fn try_from(from: QueryableRecord) -> RepoResult<Self> {
        let QueryableRecord {
            row_id,
            row_created_ms,
            row_updated_ms,
            tenant_id,
            username,
            email,
            password_hash,
            role,
            active,
        } = from;
        let header = record_header_from_sql(row_id, row_created_ms, row_updated_ms);
        let user = User {
            username,
            email,
            password_hash,
            role: role_from_sql(role)?,
            active,
        };
        Ok(Self {
            header,
            tenant_id: TenantId::new(tenant_id),
            user,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = app_user)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) tenant_id: RowId,
    pub(crate) username: &'a str,
    pub(crate) email: &'a str,
    pub(crate) password_hash: &'a str,
    pub(crate) role: i16,
    pub(crate) active: bool,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(
        created_at: UtcDateTimeMs,
        tenant_id: TenantId,
        created_user: &'a User,
    ) -> Self {
        let row_created_updated_ms = timestamp_to_sql(created_at);
        let User {
            username,
            email,
            password_hash,
            role,
            active,
        } = created_user;
        Self {
            row_created_ms: row_created_updated_ms,
            row_updated_ms: row_created_updated_ms,
            tenant_id: tenant_id.to_inner(),
            username,
            email,
            password_hash,
            role: role_to_sql(*role),
            active: *active,
        }
    }
}
