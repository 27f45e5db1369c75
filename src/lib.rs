// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Facade that re-exports the workspace crates, selected by features.

pub use lumina_core as core;

#[cfg(feature = "backend-embedded")]
pub use lumina_backend_embedded as backend_embedded;

#[cfg(feature = "media-image")]
pub use lumina_media_image as media_image;

#[cfg(feature = "remote-media")]
pub use lumina_remote_media as remote_media;

#[cfg(feature = "repo")]
pub use lumina_repo as repo;

#[cfg(feature = "sqlite")]
pub use lumina_repo_sqlite as repo_sqlite;

#[cfg(feature = "sqlite")]
pub use lumina_storage_sqlite as storage_sqlite;

#[cfg(feature = "usecases")]
pub use lumina_usecases as usecases;

pub mod prelude {
    pub use semval::prelude::*;

    pub use crate::core::prelude::*;
}
