// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::util::clock::UtcDateTimeMs;
use lumina_repo::{album::RecordId as AlbumId, asset::RecordId as AssetId, prelude::*};
use lumina_repo_sqlite::prelude::Connection;
use lumina_storage_sqlite::connection::gatekeeper::Gatekeeper;
use lumina_usecases as uc;

use crate::{Error, Result};

/// The move saga: reparent assets into an album, or out of any album.
///
/// Purely local and atomic via the metadata store transaction; no
/// remote call is involved.
pub async fn move_assets(
    db: &Gatekeeper,
    scope: CallerScope,
    ids: Vec<AssetId>,
    album_id: Option<AlbumId>,
) -> Result<usize> {
    db.spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
        let mut repo = Connection::new(&mut pooled_connection);
        uc::asset::move_assets(&mut repo, UtcDateTimeMs::now(), scope, &ids, album_id)
    })
    .await
    .map_err(Error::Storage)
    .and_then(|inner| inner.map_err(Error::UseCase))
}
