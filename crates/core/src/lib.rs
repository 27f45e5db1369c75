// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Domain model of the gallery engine.
//!
//! Plain value types without any I/O. Persistent identifiers and
//! ownership relations between entities are a concern of the
//! repository layer, not of this crate.

pub mod album;
pub mod asset;
pub mod tenant;
pub mod token;
pub mod user;
pub mod util;

pub mod prelude {
    pub use crate::{
        Visibility,
        album::Album,
        asset::{Asset, DeliveryUrls, RemoteMediaId},
        tenant::Tenant,
        token::ApiToken,
        user::{Role, User},
        util::clock::UtcDateTimeMs,
    };
}

/// Whether an item is browsable without authentication.
///
/// Tenant members always see their own tenant's hidden items,
/// regardless of this flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}
