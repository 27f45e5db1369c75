// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::time::Duration;

use lumina_core::{
    token::{ApiToken, GeneratedToken, generate_token, parse_raw_token, verify_secret},
    util::clock::UtcDateTimeMs,
};
use lumina_repo::{
    prelude::*,
    token::{ApiTokenRecord, RecordId, TokenRepo},
    user::{RecordId as UserId, UserRecord, UserRepo},
};

use crate::{Result, validate_input};

/// A freshly minted token.
///
/// The raw value is handed out exactly once and cannot be recovered
/// from the metadata store afterwards.
#[derive(Debug)]
pub struct MintedToken {
    pub id: RecordId,
    pub raw: String,
}

pub fn mint_token<Repo>(
    repo: &mut Repo,
    created_at: UtcDateTimeMs,
    user_id: UserId,
    label: Option<String>,
    expires_in: Option<Duration>,
) -> Result<MintedToken>
where
    Repo: TokenRepo,
{
    let expires_at = expires_in.map(|expires_in| {
        let millis = i64::try_from(expires_in.as_millis()).unwrap_or(i64::MAX);
        UtcDateTimeMs::from_unix_timestamp_millis(
            created_at.unix_timestamp_millis().saturating_add(millis),
        )
    });
    let token = ApiToken { label, expires_at };
    validate_input(&token)?;
    let GeneratedToken { raw, credentials } = generate_token();
    let id = repo.insert_token(created_at, user_id, &credentials, &token)?;
    Ok(MintedToken { id, raw })
}

/// Authenticate a presented raw token.
///
/// Returns the owning user on success. Malformed tokens, unknown
/// selectors, failed verification, expired tokens, and deactivated
/// owners are all reported uniformly as `NotFound` so that probing
/// reveals nothing about which part failed.
pub fn authenticate_token<Repo>(
    repo: &mut Repo,
    now: UtcDateTimeMs,
    raw: &str,
) -> Result<UserRecord>
where
    Repo: TokenRepo + UserRepo,
{
    let Some((selector, secret)) = parse_raw_token(raw) else {
        return Err(RepoError::NotFound.into());
    };
    let (record, credentials) = repo.load_token_by_selector(selector)?;
    if !verify_secret(&credentials, secret) {
        return Err(RepoError::NotFound.into());
    }
    if record.token.is_expired_at(now) {
        log::debug!("Rejecting expired token {selector}");
        return Err(RepoError::NotFound.into());
    }
    let user = repo.load_user(record.user_id)?;
    if !user.user.active {
        return Err(RepoError::NotFound.into());
    }
    repo.touch_token(now, record.header.id)?;
    Ok(user)
}

pub fn list_tokens<Repo>(repo: &mut Repo, user_id: UserId) -> Result<Vec<ApiTokenRecord>>
where
    Repo: TokenRepo,
{
    let records = repo.list_tokens(user_id)?;
    Ok(records)
}

/// Revoke one of the caller's own tokens.
pub fn revoke_token<Repo>(repo: &mut Repo, id: RecordId, user_id: UserId) -> Result<()>
where
    Repo: TokenRepo,
{
    repo.revoke_token(id, user_id)?;
    Ok(())
}
