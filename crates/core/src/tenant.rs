// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;

/// An isolation boundary.
///
/// Users and (transitively) assets and albums belong to exactly one
/// tenant. Tenants are provisioned up front and never physically
/// deleted during normal operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tenant {
    pub name: String,

    /// Stable, URL-safe identifier, unique across all tenants.
    pub slug: String,
}

/// Name of the tenant that is provisioned on first startup.
pub const DEFAULT_TENANT_NAME: &str = "Default";

/// Slug of the tenant that is provisioned on first startup.
pub const DEFAULT_TENANT_SLUG: &str = "default";

fn is_valid_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

#[derive(Copy, Clone, Debug)]
pub enum TenantInvalidity {
    NameEmpty,
    SlugEmpty,
    SlugInvalidChar,
}

impl Validate for Tenant {
    type Invalidity = TenantInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        let Self { name, slug } = self;
        ValidationContext::new()
            .invalidate_if(name.trim().is_empty(), Self::Invalidity::NameEmpty)
            .invalidate_if(slug.is_empty(), Self::Invalidity::SlugEmpty)
            .invalidate_if(
                !slug.chars().all(is_valid_slug_char),
                Self::Invalidity::SlugInvalidChar,
            )
            .into()
    }
}
