// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    token::{ApiToken, TokenCredentials},
    util::clock::UtcDateTimeMs,
};
use lumina_repo::{
    token::{ApiTokenRecord, RecordId, TokenRepo},
    user::RecordId as UserId,
};

use crate::{
    db::api_token::{models::*, schema::*},
    prelude::*,
};

impl TokenRepo for Connection<'_> {
    fn insert_token(
        &mut self,
        created_at: UtcDateTimeMs,
        user_id: UserId,
        credentials: &TokenCredentials,
        created_token: &ApiToken,
    ) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(created_at, user_id, credentials, created_token);
        diesel::insert_into(api_token::table)
            .values(&insertable)
            .returning(api_token::row_id)
            .get_result::<RowId>(self.as_mut())
            .map_err(repo_error)
            .map(Into::into)
    }

    fn load_token_by_selector(
        &mut self,
        selector: &str,
    ) -> RepoResult<(ApiTokenRecord, TokenCredentials)> {
        api_token::table
            .filter(api_token::selector.eq(selector))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .map(Into::into)
    }

    fn list_tokens(&mut self, user_id: UserId) -> RepoResult<Vec<ApiTokenRecord>> {
        api_token::table
            .filter(api_token::user_id.eq(user_id.to_inner()))
            .order_by(api_token::row_created_ms.desc())
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .map(|records| {
                records
                    .into_iter()
                    .map(|record| {
                        let (record, _credentials): (ApiTokenRecord, TokenCredentials) =
                            record.into();
                        record
                    })
                    .collect()
            })
    }

    fn revoke_token(&mut self, id: RecordId, user_id: UserId) -> RepoResult<()> {
        // Scoped to the owner: someone else's token id counts as absent
        let target = api_token::table
            .filter(api_token::row_id.eq(id.to_inner()))
            .filter(api_token::user_id.eq(user_id.to_inner()));
        let rows_affected = diesel::delete(target)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn touch_token(&mut self, used_at: UtcDateTimeMs, id: RecordId) -> RepoResult<()> {
        let target = api_token::table.filter(api_token::row_id.eq(id.to_inner()));
        let rows_affected = diesel::update(target)
            .set(api_token::last_used_ms.eq(Some(timestamp_to_sql(used_at))))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
