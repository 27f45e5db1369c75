// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use mime::Mime;
use url::Url;

use lumina_core::{
    asset::{Asset, DeliveryUrls, RemoteMediaId},
    util::clock::{TimestampMillis, UtcDateTimeMs},
};
use lumina_repo::{
    album::RecordId as AlbumId, asset::AssetRecord, tenant::RecordId as TenantId,
    user::RecordId as UserId,
};

use super::schema::asset;
use crate::prelude::*;

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = asset, primary_key(row_id))]
pub(crate) struct QueryableRecord {
    pub(crate) row_id: RowId,
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) remote_id: i64,
    pub(crate) title: String,
    pub(crate) file_name: String,
    pub(crate) media_type: String,
    pub(crate) url_thumbnail: String,
    pub(crate) url_medium: String,
    pub(crate) url_full: String,
    pub(crate) tenant_id: RowId,
    pub(crate) owner_id: RowId,
    pub(crate) album_id: Option<RowId>,
    pub(crate) visibility: i16,
}

fn parse_url(url: &str) -> RepoResult<Url> {
    url.parse()
        .map_err(|err| anyhow::anyhow!("invalid URL \"{url}\": {err}").into())
}

impl TryFrom<QueryableRecord> for AssetRecord {
    type Error = RepoError;

    fn try_from(from: QueryableRecord) -> RepoResult<Self> {
        let QueryableRecord {
            row_id,
            row_created_ms,
            row_updated_ms,
            remote_id,
            title,
            file_name,
            media_type,
            url_thumbnail,
            url_medium,
            url_full,
            tenant_id,
            owner_id,
            album_id,
            visibility,
        } = from;
        let header = record_header_from_sql(row_id, row_created_ms, row_updated_ms);
        let media_type = media_type
            .parse::<Mime>()
            .map_err(|err| anyhow::anyhow!("invalid media type \"{media_type}\": {err}"))?;
        let asset = Asset {
            remote_id: RemoteMediaId::new(remote_id),
            title,
            file_name,
            media_type,
            delivery: DeliveryUrls {
                thumbnail: parse_url(&url_thumbnail)?,
                medium: parse_url(&url_medium)?,
                full: parse_url(&url_full)?,
            },
            visibility: visibility_from_sql(visibility)?,
        };
        Ok(Self {
            header,
            ownership: Ownership {
                tenant_id: TenantId::new(tenant_id),
                owner_id: UserId::new(owner_id),
            },
            album_id: album_id.map(AlbumId::new),
            asset,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = asset)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) remote_id: i64,
    pub(crate) title: &'a str,
    pub(crate) file_name: &'a str,
    pub(crate) media_type: String,
    pub(crate) url_thumbnail: &'a str,
    pub(crate) url_medium: &'a str,
    pub(crate) url_full: &'a str,
    pub(crate) tenant_id: RowId,
    pub(crate) owner_id: RowId,
    pub(crate) album_id: Option<RowId>,
    pub(crate) visibility: i16,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(
        created_at: UtcDateTimeMs,
        ownership: Ownership,
        album_id: Option<AlbumId>,
        created_asset: &'a Asset,
    ) -> Self {
        let row_created_updated_ms = timestamp_to_sql(created_at);
        let Asset {
            remote_id,
            title,
            file_name,
            media_type,
            delivery,
            visibility,
        } = created_asset;
        Self {
            row_created_ms: row_created_updated_ms,
            row_updated_ms: row_created_updated_ms,
            remote_id: remote_id.to_inner(),
            title,
            file_name,
            media_type: media_type.to_string(),
            url_thumbnail: delivery.thumbnail.as_str(),
            url_medium: delivery.medium.as_str(),
            url_full: delivery.full.as_str(),
            tenant_id: ownership.tenant_id.to_inner(),
            owner_id: ownership.owner_id.to_inner(),
            album_id: album_id.map(AlbumId::to_inner),
            visibility: visibility_to_sql(*visibility),
        }
    }
}
