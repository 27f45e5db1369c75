// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{user::User, util::clock::UtcDateTimeMs};
use lumina_repo::{
    prelude::*,
    tenant::RecordId as TenantId,
    user::{RecordId, UserRecord, UserRepo},
};

use crate::{Error, Result, validate_input};

fn ensure_admin(scope: CallerScope) -> Result<()> {
    if !scope.is_admin() {
        return Err(Error::Forbidden);
    }
    Ok(())
}

/// Admin operation: create a user account.
pub fn create_user<Repo>(
    repo: &mut Repo,
    created_at: UtcDateTimeMs,
    scope: CallerScope,
    tenant_id: TenantId,
    created_user: &User,
) -> Result<RecordId>
where
    Repo: UserRepo,
{
    ensure_admin(scope)?;
    validate_input(created_user)?;
    let id = repo.insert_user(created_at, tenant_id, created_user)?;
    Ok(id)
}

/// Admin operation: list accounts, optionally per tenant.
pub fn list_users<Repo>(
    repo: &mut Repo,
    scope: CallerScope,
    tenant_id: Option<TenantId>,
) -> Result<Vec<UserRecord>>
where
    Repo: UserRepo,
{
    ensure_admin(scope)?;
    let records = repo.list_users(tenant_id)?;
    Ok(records)
}

/// Admin operation: deactivate an account.
///
/// A soft state transition: the row is kept so that historical
/// assets retain an attributable owner, but credentials and tokens
/// stop resolving. Admins cannot deactivate themselves.
pub fn deactivate_user<Repo>(
    repo: &mut Repo,
    updated_at: UtcDateTimeMs,
    scope: CallerScope,
    acting_user_id: RecordId,
    id: RecordId,
) -> Result<()>
where
    Repo: UserRepo,
{
    ensure_admin(scope)?;
    if acting_user_id == id {
        return Err(crate::InputError(anyhow::anyhow!(
            "cannot deactivate the own account"
        ))
        .into());
    }
    repo.deactivate_user(updated_at, id)?;
    Ok(())
}

/// Replace the password hash of an account.
///
/// Permitted for admins and for the account owner. The hash itself
/// is opaque; hashing happens at the authentication boundary.
pub fn update_password_hash<Repo>(
    repo: &mut Repo,
    updated_at: UtcDateTimeMs,
    scope: CallerScope,
    acting_user_id: RecordId,
    id: RecordId,
    password_hash: &str,
) -> Result<()>
where
    Repo: UserRepo,
{
    if !scope.is_admin() && acting_user_id != id {
        return Err(Error::Forbidden);
    }
    repo.update_user_password_hash(updated_at, id, password_hash)?;
    Ok(())
}
