// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Mapping of authenticated users to query scopes and the access
//! checks shared by the mutating use cases.

use lumina_repo::{album::AlbumRecord, prelude::*, user::UserRecord};

use crate::{Error, Result};

/// Derive the query scope of an authenticated user.
///
/// Anonymous callers never reach this function; their scope is
/// [`CallerScope::Anonymous`] by construction.
#[must_use]
pub fn caller_scope(user: &UserRecord) -> CallerScope {
    if user.user.role.is_admin() {
        CallerScope::Admin
    } else {
        CallerScope::Member {
            tenant_id: user.tenant_id,
            user_id: user.header.id,
        }
    }
}

/// Mutations require an authenticated caller.
pub(crate) fn ensure_authenticated(scope: CallerScope) -> Result<()> {
    if matches!(scope, CallerScope::Anonymous) {
        return Err(Error::Forbidden);
    }
    Ok(())
}

/// Check that an album is mutable (and referencable as a move or
/// reparent target) within the caller scope.
///
/// Cross-tenant ids surface as `NotFound` rather than `Forbidden` so
/// that members cannot probe for the existence of other tenants'
/// albums.
pub(crate) fn ensure_album_in_scope(scope: CallerScope, record: &AlbumRecord) -> Result<()> {
    match scope {
        CallerScope::Anonymous => Err(Error::Forbidden),
        CallerScope::Member { tenant_id, .. } => {
            if record.ownership.tenant_id == tenant_id {
                Ok(())
            } else {
                Err(RepoError::NotFound.into())
            }
        }
        CallerScope::Admin => Ok(()),
    }
}
