// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;

/// Role of a user within the system.
///
/// Admins see all assets and albums system-wide regardless of tenant,
/// members only their own tenant's data. Consumed by the access filter
/// when building query predicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Role {
    #[default]
    Member,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A user account.
///
/// The password hash is opaque to this crate. Hashing and verification
/// happen at the authentication boundary, which is not part of the
/// engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,

    /// Deactivation is a soft state transition. Rows of deactivated
    /// users are kept so that historical assets retain an attributable
    /// owner.
    pub active: bool,
}

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;

fn is_valid_username_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

fn is_plausible_email(email: &str) -> bool {
    // Deliverability cannot be decided syntactically. Only reject
    // obvious garbage before it reaches the unique column.
    email.len() <= 254
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.ends_with('.')
        })
}

#[derive(Copy, Clone, Debug)]
pub enum UserInvalidity {
    UsernameLength,
    UsernameInvalidChar,
    EmailInvalid,
    PasswordHashEmpty,
}

impl Validate for User {
    type Invalidity = UserInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        let Self {
            username,
            email,
            password_hash,
            role: _,
            active: _,
        } = self;
        ValidationContext::new()
            .invalidate_if(
                username.len() < USERNAME_MIN_LEN || username.len() > USERNAME_MAX_LEN,
                Self::Invalidity::UsernameLength,
            )
            .invalidate_if(
                !username.chars().all(is_valid_username_char),
                Self::Invalidity::UsernameInvalidChar,
            )
            .invalidate_if(!is_plausible_email(email), Self::Invalidity::EmailInvalid)
            .invalidate_if(
                password_hash.is_empty(),
                Self::Invalidity::PasswordHashEmpty,
            )
            .into()
    }
}
