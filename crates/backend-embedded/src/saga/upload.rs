// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use bytes::Bytes;

use lumina_core::{Visibility, asset::Asset, util::clock::UtcDateTimeMs};
use lumina_media_image::prepare_image;
use lumina_repo::{
    album::RecordId as AlbumId,
    asset::{AssetRecord, AssetRepo as _},
    prelude::*,
};
use lumina_repo_sqlite::prelude::Connection;
use lumina_storage_sqlite::connection::gatekeeper::Gatekeeper;
use lumina_usecases as uc;

use crate::{Error, Result, engine::CancellationFlag, remote::RemoteMediaStore};

/// One file to be uploaded, as received from the caller.
#[derive(Debug)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub original_file_name: String,
    pub declared_media_type: String,
    pub ownership: Ownership,
    pub album_id: Option<AlbumId>,
}

/// The upload saga: received → prepared → remote-committed →
/// local-committed.
///
/// - A preparation failure aborts with no remote or local side
///   effect.
/// - A remote failure aborts before any local write.
/// - A local-commit failure after the remote commit schedules a
///   compensating delete against the remote store instead of leaving
///   an untracked remote object behind.
///
/// Cancellation is honored before the remote commit only; afterwards
/// the saga completes normally and the item appears in the gallery.
pub async fn upload_asset<Remote>(
    db: &Gatekeeper,
    remote: &Remote,
    request: UploadRequest,
    cancellation: &CancellationFlag,
) -> Result<AssetRecord>
where
    Remote: RemoteMediaStore,
{
    let UploadRequest {
        data,
        original_file_name,
        declared_media_type,
        ownership,
        album_id,
    } = request;

    // Step 1: prepare. CPU-bound, keep it off the async executor.
    let title = original_file_name.clone();
    let prepared = tokio::task::spawn_blocking(move || {
        prepare_image(&data, &original_file_name, &declared_media_type)
    })
    .await??;

    if cancellation.is_cancelled() {
        log::debug!("Upload of \"{title}\" cancelled before the remote commit");
        return Err(Error::Aborted);
    }

    // Step 2: remote commit.
    let file_name = prepared.file_name.clone();
    let media_type = prepared.media_type.clone();
    let descriptor = remote
        .upload_media(Bytes::from(prepared.data), &file_name, &media_type)
        .await?;

    // Step 3: local commit. No cancellation beyond this point: the
    // remote object already exists.
    let created_asset = Asset {
        remote_id: descriptor.remote_id,
        title,
        file_name,
        media_type,
        delivery: descriptor.delivery,
        visibility: Visibility::Public,
    };
    let remote_id = created_asset.remote_id;
    let local_commit = db
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let mut repo = Connection::new(&mut pooled_connection);
            let id = uc::asset::store_created_asset(
                &mut repo,
                UtcDateTimeMs::now(),
                ownership,
                album_id,
                &created_asset,
            )?;
            repo.load_asset(id).map_err(uc::Error::Repository)
        })
        .await
        .map_err(Error::Storage)
        .and_then(|inner| inner.map_err(Error::UseCase));

    match local_commit {
        Ok(record) => Ok(record),
        Err(err) => {
            // The one legitimate case of an asset existing remotely
            // but not locally. Close it instead of leaving it open.
            log::error!(
                "Local commit of remote object {remote_id} failed ({err}), \
                 scheduling a reconciling delete"
            );
            if let Err(cleanup_err) = remote.delete_media(remote_id).await {
                log::error!("Reconciling delete of remote object {remote_id} failed: {cleanup_err}");
            }
            Err(err)
        }
    }
}
