// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{tenant::Tenant, util::clock::UtcDateTimeMs};

use crate::prelude::*;

record_id_newtype!(RecordId);

pub type RecordHeader = crate::RecordHeader<RecordId>;

pub trait TenantRepo {
    fn insert_tenant(
        &mut self,
        created_at: UtcDateTimeMs,
        created_tenant: &Tenant,
    ) -> RepoResult<RecordId>;

    fn load_tenant(&mut self, id: RecordId) -> RepoResult<(RecordHeader, Tenant)>;

    fn load_tenant_by_slug(&mut self, slug: &str) -> RepoResult<(RecordHeader, Tenant)>;

    /// Number of provisioned tenants.
    ///
    /// Zero only before first-startup provisioning has run.
    fn count_tenants(&mut self) -> RepoResult<u64>;
}
