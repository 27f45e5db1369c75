// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::dsl::count_star;

use lumina_core::{tenant::Tenant, util::clock::UtcDateTimeMs};
use lumina_repo::tenant::{RecordHeader, RecordId, TenantRepo};

use crate::{
    db::tenant::{models::*, schema::*},
    prelude::*,
};

impl TenantRepo for Connection<'_> {
    fn insert_tenant(
        &mut self,
        created_at: UtcDateTimeMs,
        created_tenant: &Tenant,
    ) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(created_at, created_tenant);
        diesel::insert_into(tenant::table)
            .values(&insertable)
            .returning(tenant::row_id)
            .get_result::<RowId>(self.as_mut())
            .map_err(repo_error)
            .map(Into::into)
    }

    fn load_tenant(&mut self, id: RecordId) -> RepoResult<(RecordHeader, Tenant)> {
        tenant::table
            .filter(tenant::row_id.eq(id.to_inner()))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .map(Into::into)
    }

    fn load_tenant_by_slug(&mut self, slug: &str) -> RepoResult<(RecordHeader, Tenant)> {
        tenant::table
            .filter(tenant::slug.eq(slug))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .map(Into::into)
    }

    fn count_tenants(&mut self) -> RepoResult<u64> {
        tenant::table
            .select(count_star())
            .first::<i64>(self.as_mut())
            .map_err(repo_error)
            .map(|count| count.unsigned_abs())
    }
}
