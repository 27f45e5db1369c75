// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::{Visibility, util::clock::UtcDateTimeMs};
use lumina_repo::{asset::RecordId as AssetId, prelude::*};
use lumina_repo_sqlite::prelude::Connection;
use lumina_storage_sqlite::connection::gatekeeper::Gatekeeper;
use lumina_usecases as uc;

use crate::{Error, Result};

/// The visibility-toggle saga: purely local, authorization-checked.
pub async fn set_asset_visibility(
    db: &Gatekeeper,
    scope: CallerScope,
    id: AssetId,
    visibility: Visibility,
) -> Result<()> {
    db.spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
        let mut repo = Connection::new(&mut pooled_connection);
        uc::asset::set_asset_visibility(&mut repo, UtcDateTimeMs::now(), scope, id, visibility)
    })
    .await
    .map_err(Error::Storage)
    .and_then(|inner| inner.map_err(Error::UseCase))
}
