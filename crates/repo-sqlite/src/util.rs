// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    Visibility,
    user::Role,
    util::clock::{TimestampMillis, UtcDateTimeMs},
};

use crate::prelude::*;

pub(crate) fn timestamp_to_sql(timestamp: UtcDateTimeMs) -> TimestampMillis {
    timestamp.unix_timestamp_millis()
}

pub(crate) fn timestamp_from_sql(millis: TimestampMillis) -> UtcDateTimeMs {
    UtcDateTimeMs::from_unix_timestamp_millis(millis)
}

pub(crate) fn record_header_from_sql<Id>(
    row_id: RowId,
    row_created_ms: TimestampMillis,
    row_updated_ms: TimestampMillis,
) -> RecordHeader<Id>
where
    Id: From<RowId>,
{
    RecordHeader {
        id: row_id.into(),
        created_at: timestamp_from_sql(row_created_ms),
        updated_at: timestamp_from_sql(row_updated_ms),
    }
}

pub(crate) const fn visibility_to_sql(visibility: Visibility) -> i16 {
    match visibility {
        Visibility::Public => 0,
        Visibility::Private => 1,
    }
}

pub(crate) fn visibility_from_sql(value: i16) -> RepoResult<Visibility> {
    match value {
        0 => Ok(Visibility::Public),
        1 => Ok(Visibility::Private),
        _ => Err(anyhow::anyhow!("invalid visibility value: {value}").into()),
    }
}

pub(crate) const fn role_to_sql(role: Role) -> i16 {
    match role {
        Role::Member => 0,
        Role::Admin => 1,
    }
}

pub(crate) fn role_from_sql(value: i16) -> RepoResult<Role> {
    match value {
        0 => Ok(Role::Member),
        1 => Ok(Role::Admin),
        _ => Err(anyhow::anyhow!("invalid role value: {value}").into()),
    }
}

pub(crate) fn apply_pagination<S>(source: S, pagination: &Pagination) -> S
where
    S: diesel::query_dsl::methods::LimitDsl<Output = S>
        + diesel::query_dsl::methods::OffsetDsl<Output = S>,
{
    if !pagination.is_paginated() {
        return source;
    }
    // SQLite: OFFSET can only be used in conjunction with LIMIT
    let limit = i64::try_from(pagination.mandatory_limit()).unwrap_or(i64::MAX);
    let mut target = source.limit(limit);
    if let Some(offset) = pagination.offset {
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        target = target.offset(offset);
    }
    target
}

pub(crate) const LIKE_ESCAPE_CHARACTER: char = '\\';

const LIKE_WILDCARD_CHARACTER: char = '%';
const LIKE_PLACEHOLDER_CHARACTER: char = '_';

const LIKE_ESCAPE_CHARACTER_REPLACEMENT: &str = "\\\\";
const LIKE_WILDCARD_CHARACTER_REPLACEMENT: &str = "\\%";
const LIKE_PLACEHOLDER_CHARACTER_REPLACEMENT: &str = "\\_";

fn escape_like_matches(arg: &str) -> String {
    // The order of replacements matters!
    arg.replace(LIKE_ESCAPE_CHARACTER, LIKE_ESCAPE_CHARACTER_REPLACEMENT)
        .replace(LIKE_WILDCARD_CHARACTER, LIKE_WILDCARD_CHARACTER_REPLACEMENT)
        .replace(
            LIKE_PLACEHOLDER_CHARACTER,
            LIKE_PLACEHOLDER_CHARACTER_REPLACEMENT,
        )
}

pub(crate) fn escape_like_contains(arg: &str) -> String {
    format!(
        "{LIKE_WILDCARD_CHARACTER}{}{LIKE_WILDCARD_CHARACTER}",
        escape_like_matches(arg),
    )
}
