// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    token::{ApiToken, TokenCredentials},
    util::clock::UtcDateTimeMs,
};

use crate::{prelude::*, user::RecordId as UserId};

record_id_newtype!(RecordId);

pub type RecordHeader = crate::RecordHeader<RecordId>;

/// A stored token row without any secret material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiTokenRecord {
    pub header: RecordHeader,
    pub user_id: UserId,
    pub token: ApiToken,
    pub last_used_at: Option<UtcDateTimeMs>,
}

pub trait TokenRepo {
    fn insert_token(
        &mut self,
        created_at: UtcDateTimeMs,
        user_id: UserId,
        credentials: &TokenCredentials,
        created_token: &ApiToken,
    ) -> RepoResult<RecordId>;

    /// Lookup for authentication: the stored credentials are needed
    /// to verify the presented secret.
    fn load_token_by_selector(
        &mut self,
        selector: &str,
    ) -> RepoResult<(ApiTokenRecord, TokenCredentials)>;

    /// Tokens of one user, for display. No secret material.
    fn list_tokens(&mut self, user_id: UserId) -> RepoResult<Vec<ApiTokenRecord>>;

    /// Delete a token row, scoped to its owner.
    fn revoke_token(&mut self, id: RecordId, user_id: UserId) -> RepoResult<()>;

    /// Record a successful authentication with this token.
    fn touch_token(&mut self, used_at: UtcDateTimeMs, id: RecordId) -> RepoResult<()>;
}
