// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    album::Album,
    util::clock::{TimestampMillis, UtcDateTimeMs},
};
use lumina_repo::{
    album::{AlbumRecord, RecordId},
    tenant::RecordId as TenantId,
    user::RecordId as UserId,
};

use super::schema::album;
use crate::prelude::*;

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = album, primary_key(row_id))]
pub(crate) struct QueryableRecord {
    pub(crate) row_id: RowId,
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) tenant_id: RowId,
    pub(crate) owner_id: RowId,
    pub(crate) parent_id: Option<RowId>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) visibility: i16,
}

impl TryFrom<QueryableRecord> for AlbumRecord {
    type Error = RepoError;

    fn try_from(from: QueryableRecord) -> RepoResult<Self> {
        let QueryableRecord {
            row_id,
            row_created_ms,
            row_updated_ms,
            tenant_id,
            owner_id,
            parent_id,
            name,
            description,
            visibility,
        } = from;
        let header = record_header_from_sql(row_id, row_created_ms, row_updated_ms);
        let album = Album {
            name,
            description,
            visibility: visibility_from_sql(visibility)?,
        };
        Ok(Self {
            header,
            ownership: Ownership {
                tenant_id: TenantId::new(tenant_id),
                owner_id: UserId::new(owner_id),
            },
            parent_id: parent_id.map(RecordId::new),
            album,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = album)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) tenant_id: RowId,
    pub(crate) owner_id: RowId,
    pub(crate) parent_id: Option<RowId>,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) visibility: i16,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(
        created_at: UtcDateTimeMs,
        ownership: Ownership,
        parent_id: Option<RecordId>,
        created_album: &'a Album,
    ) -> Self {
        let row_created_updated_ms = timestamp_to_sql(created_at);
        let Album {
            name,
            description,
            visibility,
        } = created_album;
        Self {
            row_created_ms: row_created_updated_ms,
            row_updated_ms: row_created_updated_ms,
            tenant_id: ownership.tenant_id.to_inner(),
            owner_id: ownership.owner_id.to_inner(),
            parent_id: parent_id.map(RecordId::to_inner),
            name,
            description: description.as_deref(),
            visibility: visibility_to_sql(*visibility),
        }
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = album, treat_none_as_null = true)]
pub(crate) struct UpdatableRecord<'a> {
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) visibility: i16,
}

impl<'a> UpdatableRecord<'a> {
    pub(crate) fn bind(updated_at: UtcDateTimeMs, updated_album: &'a Album) -> Self {
        let Album {
            name,
            description,
            visibility,
        } = updated_album;
        Self {
            row_updated_ms: timestamp_to_sql(updated_at),
            name,
            description: description.as_deref(),
            visibility: visibility_to_sql(*visibility),
        }
    }
}
