// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    token::{ApiToken, TokenCredentials},
    util::clock::{TimestampMillis, UtcDateTimeMs},
};
use lumina_repo::{token::ApiTokenRecord, user::RecordId as UserId};

use super::schema::api_token;
use crate::prelude::*;

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = api_token, primary_key(row_id))]
pub(crate) struct QueryableRecord {
    pub(crate) row_id: RowId,
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) user_id: RowId,
    pub(crate) selector: String,
    pub(crate) salt: String,
    pub(crate) verifier: String,
    pub(crate) label: Option<String>,
    pub(crate) expires_at_ms: Option<TimestampMillis>,
    pub(crate) last_used_ms: Option<TimestampMillis>,
}

impl From<QueryableRecord> for (ApiTokenRecord, TokenCredentials) {
    fn from(from: QueryableRecord) -> Self {
        let QueryableRecord {
            row_id,
            row_created_ms,
            row_updated_ms,
            user_id,
            selector,
            salt,
            verifier,
            label,
            expires_at_ms,
            last_used_ms,
        } = from;
        let header = record_header_from_sql(row_id, row_created_ms, row_updated_ms);
        let record = ApiTokenRecord {
            header,
            user_id: UserId::new(user_id),
            token: ApiToken {
                label,
                expires_at: expires_at_ms.map(timestamp_from_sql),
            },
            last_used_at: last_used_ms.map(timestamp_from_sql),
        };
        let credentials = TokenCredentials {
            selector,
            salt,
            verifier,
        };
        (record, credentials)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = api_token)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) user_id: RowId,
    pub(crate) selector: &'a str,
    pub(crate) salt: &'a str,
    pub(crate) verifier: &'a str,
    pub(crate) label: Option<&'a str>,
    pub(crate) expires_at_ms: Option<TimestampMillis>,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(
        created_at: UtcDateTimeMs,
        user_id: UserId,
        credentials: &'a TokenCredentials,
        created_token: &'a ApiToken,
    ) -> Self {
        let row_created_updated_ms = timestamp_to_sql(created_at);
        let TokenCredentials {
            selector,
            salt,
            verifier,
        } = credentials;
        let ApiToken { label, expires_at } = created_token;
        Self {
            row_created_ms: row_created_updated_ms,
            row_updated_ms: row_created_updated_ms,
            user_id: user_id.to_inner(),
            selector,
            salt,
            verifier,
            label: label.as_deref(),
            expires_at_ms: expires_at.map(timestamp_to_sql),
        }
    }
}
