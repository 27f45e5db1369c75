// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    tenant::Tenant,
    util::clock::{TimestampMillis, UtcDateTimeMs},
};
use lumina_repo::tenant::RecordHeader;

use super::schema::tenant;
use crate::prelude::*;

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = tenant, primary_key(row_id))]
pub(crate) struct QueryableRecord {
    pub(crate) row_id: RowId,
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) name: String,
    pub(crate) slug: String,
}

impl From<QueryableRecord> for (RecordHeader, Tenant) {
    fn from(from: QueryableRecord) -> Self {
        let QueryableRecord {
            row_id,
            row_created_ms,
            row_updated_ms,
            name,
            slug,
        } = from;
        let header = record_header_from_sql(row_id, row_created_ms, row_updated_ms);
        let tenant = Tenant { name, slug };
        (header, tenant)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tenant)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) name: &'a str,
    pub(crate) slug: &'a str,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(created_at: UtcDateTimeMs, created_tenant: &'a Tenant) -> Self {
        let row_created_updated_ms = timestamp_to_sql(created_at);
        let Tenant { name, slug } = created_tenant;
        Self {
            row_created_ms: row_created_updated_ms,
            row_updated_ms: row_created_updated_ms,
            name,
            slug,
        }
    }
}
