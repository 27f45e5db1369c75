// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{
    tenant::{DEFAULT_TENANT_NAME, DEFAULT_TENANT_SLUG, Tenant},
    user::{Role, User},
    util::clock::UtcDateTimeMs,
};
use lumina_repo::{
    prelude::*,
    tenant::{RecordId as TenantId, TenantRepo},
    user::{RecordId as UserId, UserRepo},
};

use crate::{Result, validate_input};

/// Credentials of the admin account provisioned on first startup.
#[derive(Debug, Clone)]
pub struct InitialAdmin {
    pub username: String,
    pub email: String,
    /// Opaque, pre-hashed password.
    pub password_hash: String,
}

/// Outcome of first-startup provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningOutcome {
    pub tenant_id: TenantId,
    pub created_tenant: bool,
    pub admin_user_id: Option<UserId>,
}

/// Provision the default tenant and an initial admin account.
///
/// Idempotent: an existing default tenant is reused and no second
/// admin is created when an active one already exists.
pub fn provision_default_tenant<Repo>(
    repo: &mut Repo,
    now: UtcDateTimeMs,
    initial_admin: Option<&InitialAdmin>,
) -> Result<ProvisioningOutcome>
where
    Repo: TenantRepo + UserRepo,
{
    let existing = repo.load_tenant_by_slug(DEFAULT_TENANT_SLUG).optional()?;
    let (tenant_id, created_tenant) = if let Some((header, _)) = existing {
        (header.id, false)
    } else {
        let tenant = Tenant {
            name: DEFAULT_TENANT_NAME.to_owned(),
            slug: DEFAULT_TENANT_SLUG.to_owned(),
        };
        validate_input(&tenant)?;
        let tenant_id = repo.insert_tenant(now, &tenant)?;
        log::info!("Provisioned default tenant");
        (tenant_id, true)
    };
    let mut admin_user_id = None;
    if let Some(initial_admin) = initial_admin {
        let has_active_admin = repo
            .list_users(None)?
            .iter()
            .any(|record| record.user.role.is_admin());
        if !has_active_admin {
            let InitialAdmin {
                username,
                email,
                password_hash,
            } = initial_admin;
            let user = User {
                username: username.clone(),
                email: email.clone(),
                password_hash: password_hash.clone(),
                role: Role::Admin,
                active: true,
            };
            validate_input(&user)?;
            let user_id = repo.insert_user(now, tenant_id, &user)?;
            log::info!("Provisioned initial admin user \"{username}\"");
            admin_user_id = Some(user_id);
        }
    }
    Ok(ProvisioningOutcome {
        tenant_id,
        created_tenant,
        admin_user_id,
    })
}
