// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use lumina_repo::{asset::RecordId as AssetId, prelude::*};
use lumina_repo_sqlite::prelude::Connection;
use lumina_storage_sqlite::connection::gatekeeper::Gatekeeper;
use lumina_usecases as uc;

use crate::{Error, Result, remote::RemoteMediaStore};

/// Per-item outcome of the remote cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCleanup {
    Succeeded,
    Failed,
}

/// Aggregate outcome of a delete saga.
///
/// Local removal is unconditional: the caller's intent to remove an
/// item from the gallery takes priority. Remote cleanup failures are
/// surfaced for operator awareness, they never block the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub local_deleted: usize,
    pub remote_cleaned: usize,
    pub items: Vec<(AssetId, RemoteCleanup)>,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            local_deleted,
            remote_cleaned,
            items: _,
        } = self;
        write!(
            f,
            "Deleted {local_deleted} local rows. \
             Remote cleanup: {remote_cleaned}/{local_deleted} successful."
        )
    }
}

/// The delete saga over a set of ids.
///
/// Removes the local rows first (scoped to the caller), then attempts
/// the remote cleanup per item. The aggregate outcome is assembled
/// only after all items have resolved; a single failing item never
/// blocks the rest of the batch.
pub async fn delete_assets<Remote>(
    db: &Gatekeeper,
    remote: &Remote,
    scope: CallerScope,
    ids: Vec<AssetId>,
) -> Result<Outcome>
where
    Remote: RemoteMediaStore,
{
    let purged = db
        .spawn_blocking_write_task(move |mut pooled_connection, abort_flag| {
            if abort_flag.load(std::sync::atomic::Ordering::Acquire) {
                return Err(RepoError::Aborted.into());
            }
            let mut repo = Connection::new(&mut pooled_connection);
            uc::asset::purge_assets(&mut repo, scope, &ids)
        })
        .await
        .map_err(Error::Storage)
        .and_then(|inner| inner.map_err(Error::UseCase))?;

    let mut items = Vec::with_capacity(purged.len());
    let mut remote_cleaned = 0;
    for (id, remote_id) in &purged {
        match remote.delete_media(*remote_id).await {
            Ok(_) => {
                remote_cleaned += 1;
                items.push((*id, RemoteCleanup::Succeeded));
            }
            Err(err) => {
                log::warn!("Remote cleanup of object {remote_id} failed: {err}");
                items.push((*id, RemoteCleanup::Failed));
            }
        }
    }
    let outcome = Outcome {
        local_deleted: purged.len(),
        remote_cleaned,
        items,
    };
    log::info!("{outcome}");
    Ok(outcome)
}
