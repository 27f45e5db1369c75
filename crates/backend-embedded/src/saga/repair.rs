// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use lumina_core::util::clock::UtcDateTimeMs;
use lumina_repo::{
    asset::{AssetRepo as _, RecordId as AssetId},
    prelude::*,
};
use lumina_repo_sqlite::prelude::Connection;
use lumina_storage_sqlite::connection::gatekeeper::Gatekeeper;
use lumina_usecases as uc;

use crate::{Error, Result, remote::RemoteMediaStore};

/// Repair the cached delivery URLs of a single asset.
///
/// Re-fetches the descriptor from the remote store, keyed by the
/// asset's remote id, and overwrites the cached URLs. Not a hot path;
/// only invoked on demand when cached URLs have become stale.
pub async fn repair_asset_delivery_urls<Remote>(
    db: &Gatekeeper,
    remote: &Remote,
    id: AssetId,
) -> Result<()>
where
    Remote: RemoteMediaStore,
{
    let remote_id = db
        .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
            let mut repo = Connection::new(&mut pooled_connection);
            repo.load_asset(id).map(|record| record.asset.remote_id)
        })
        .await
        .map_err(Error::Storage)
        .and_then(|inner| inner.map_err(Error::from))?;

    let descriptor = remote.fetch_media_descriptor(remote_id).await?;

    db.spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
        let mut repo = Connection::new(&mut pooled_connection);
        uc::asset::repair_asset_delivery_urls(
            &mut repo,
            UtcDateTimeMs::now(),
            id,
            descriptor.remote_id,
            &descriptor.delivery,
        )
    })
    .await
    .map_err(Error::Storage)
    .and_then(|inner| inner.map_err(Error::UseCase))
}
