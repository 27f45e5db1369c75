// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Process-wide engine state.
//!
//! The gatekeeper, the remote media client, and the saga runner are
//! constructed once at startup and shut down gracefully together. No
//! ambient global access: everything reaches them through a handle to
//! this environment.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use lumina_core::{Visibility, util::clock::UtcDateTimeMs};
use lumina_remote_media::{Config as RemoteMediaConfig, RemoteMediaClient};
use lumina_repo::{
    album::{AlbumRecord, RecordId as AlbumId},
    asset::{AssetRecord, RecordId as AssetId},
    prelude::*,
    user::UserRecord,
};
use lumina_repo_sqlite::prelude::Connection;
use lumina_storage_sqlite::connection::gatekeeper::Gatekeeper;
use lumina_usecases as uc;
use lumina_usecases::tenant::{InitialAdmin, ProvisioningOutcome};

use crate::{
    Error, Result,
    engine::{Config as EngineConfig, SagaRunner, TaskHandle, WaitOutcome},
    saga,
    saga::{delete::Outcome as DeleteOutcome, upload::UploadRequest},
    storage::{DatabaseConfig, commission_database},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub remote_media: RemoteMediaConfig,
    pub engine: EngineConfig,
}

/// The commissioned engine.
#[allow(missing_debug_implementations)]
pub struct Environment {
    db_gatekeeper: Arc<Gatekeeper>,
    remote_media_client: Arc<RemoteMediaClient>,
    saga_runner: Arc<SagaRunner>,
}

impl Environment {
    /// Construct and wire all shared state.
    pub fn commission(config: &Config) -> anyhow::Result<Self> {
        let db_gatekeeper = Arc::new(commission_database(&config.database)?);
        let remote_media_client = Arc::new(RemoteMediaClient::new(config.remote_media.clone())?);
        let saga_runner = Arc::new(SagaRunner::new(config.engine));
        Ok(Self {
            db_gatekeeper,
            remote_media_client,
            saga_runner,
        })
    }

    /// Graceful shutdown: no new sagas are accepted, in-flight sagas
    /// are allowed to finish, then the database is decommissioned.
    pub async fn decommission(&self) {
        log::info!("Draining saga runner");
        self.saga_runner.drain().await;
        log::info!("Decommissioning database");
        self.db_gatekeeper.decommission();
    }

    #[must_use]
    pub fn db_gatekeeper(&self) -> &Arc<Gatekeeper> {
        &self.db_gatekeeper
    }

    #[must_use]
    pub fn remote_media_client(&self) -> &Arc<RemoteMediaClient> {
        &self.remote_media_client
    }

    #[must_use]
    pub fn saga_runner(&self) -> &Arc<SagaRunner> {
        &self.saga_runner
    }

    /// First-startup provisioning of the default tenant and an
    /// initial admin account.
    pub async fn provision(
        &self,
        initial_admin: Option<InitialAdmin>,
    ) -> Result<ProvisioningOutcome> {
        self.db_gatekeeper
            .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
                let mut repo = Connection::new(&mut pooled_connection);
                uc::tenant::provision_default_tenant(
                    &mut repo,
                    UtcDateTimeMs::now(),
                    initial_admin.as_ref(),
                )
            })
            .await
            .map_err(Error::Storage)
            .and_then(|inner| inner.map_err(Error::UseCase))
    }

    /// Enqueue an upload saga and return its handle immediately.
    ///
    /// The handle may be awaited with a timeout for interactive
    /// single-file flows, falling back to background completion.
    pub fn submit_upload(&self, request: UploadRequest) -> Result<TaskHandle<AssetRecord>> {
        let db = Arc::clone(&self.db_gatekeeper);
        let remote = Arc::clone(&self.remote_media_client);
        // The asset does not exist yet, so there is nothing to lock
        self.saga_runner.submit(Vec::new(), move |cancellation| {
            async move { saga::upload::upload_asset(&db, &*remote, request, &cancellation).await }
        })
    }

    /// Upload a single file interactively.
    ///
    /// Awaits the saga up to `timeout` and falls back to background
    /// completion beyond that.
    pub async fn upload_interactive(
        &self,
        request: UploadRequest,
        timeout: Duration,
    ) -> Result<WaitOutcome<AssetRecord>> {
        let handle = self.submit_upload(request)?;
        Ok(handle.outcome_with_timeout(timeout).await)
    }

    /// Delete a batch of assets and await the aggregate outcome.
    ///
    /// The saga is a barrier over its item set; the per-item remote
    /// outcomes are reported, never raised.
    pub async fn delete_assets(
        &self,
        scope: CallerScope,
        ids: Vec<AssetId>,
    ) -> Result<DeleteOutcome> {
        let db = Arc::clone(&self.db_gatekeeper);
        let remote = Arc::clone(&self.remote_media_client);
        let handle = self.saga_runner.submit(ids.clone(), move |_cancellation| {
            async move { saga::delete::delete_assets(&db, &*remote, scope, ids).await }
        })?;
        handle.outcome().await
    }

    /// Move a batch of assets into an album, or out of any album.
    pub async fn move_assets(
        &self,
        scope: CallerScope,
        ids: Vec<AssetId>,
        album_id: Option<AlbumId>,
    ) -> Result<usize> {
        let db = Arc::clone(&self.db_gatekeeper);
        let handle = self.saga_runner.submit(ids.clone(), move |_cancellation| {
            async move { saga::relocate::move_assets(&db, scope, ids, album_id).await }
        })?;
        handle.outcome().await
    }

    /// Toggle the visibility of a single asset.
    pub async fn set_asset_visibility(
        &self,
        scope: CallerScope,
        id: AssetId,
        visibility: Visibility,
    ) -> Result<()> {
        let db = Arc::clone(&self.db_gatekeeper);
        let handle = self.saga_runner.submit(vec![id], move |_cancellation| {
            async move { saga::visibility::set_asset_visibility(&db, scope, id, visibility).await }
        })?;
        handle.outcome().await
    }

    /// Repair the cached delivery URLs of a single asset.
    pub async fn repair_asset_delivery_urls(&self, id: AssetId) -> Result<()> {
        let db = Arc::clone(&self.db_gatekeeper);
        let remote = Arc::clone(&self.remote_media_client);
        let handle = self.saga_runner.submit(vec![id], move |_cancellation| {
            async move { saga::repair::repair_asset_delivery_urls(&db, &*remote, id).await }
        })?;
        handle.outcome().await
    }

    /// List a page of assets visible to the caller.
    pub async fn list_assets(
        &self,
        scope: CallerScope,
        album_id: Option<AlbumId>,
        search_terms: Option<String>,
        pagination: Pagination,
    ) -> Result<uc::asset::AssetPage> {
        self.db_gatekeeper
            .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
                let mut repo = Connection::new(&mut pooled_connection);
                uc::asset::list_assets(&mut repo, scope, album_id, search_terms, &pagination)
            })
            .await
            .map_err(Error::Storage)
            .and_then(|inner| inner.map_err(Error::UseCase))
    }

    /// Flat album listing with parent pointers.
    pub async fn list_albums(&self, scope: CallerScope) -> Result<Vec<AlbumRecord>> {
        self.db_gatekeeper
            .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
                let mut repo = Connection::new(&mut pooled_connection);
                uc::album::list_albums(&mut repo, scope)
            })
            .await
            .map_err(Error::Storage)
            .and_then(|inner| inner.map_err(Error::UseCase))
    }

    /// Create an album, optionally below an existing parent.
    pub async fn create_album(
        &self,
        scope: CallerScope,
        ownership: Ownership,
        parent_id: Option<AlbumId>,
        created_album: lumina_core::album::Album,
    ) -> Result<AlbumId> {
        self.db_gatekeeper
            .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
                let mut repo = Connection::new(&mut pooled_connection);
                uc::album::create_album(
                    &mut repo,
                    UtcDateTimeMs::now(),
                    scope,
                    ownership,
                    parent_id,
                    &created_album,
                )
            })
            .await
            .map_err(Error::Storage)
            .and_then(|inner| inner.map_err(Error::UseCase))
    }

    /// Rename/describe an album or toggle its visibility.
    pub async fn update_album(
        &self,
        scope: CallerScope,
        id: AlbumId,
        updated_album: lumina_core::album::Album,
    ) -> Result<()> {
        self.db_gatekeeper
            .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
                let mut repo = Connection::new(&mut pooled_connection);
                uc::album::update_album(
                    &mut repo,
                    UtcDateTimeMs::now(),
                    scope,
                    id,
                    &updated_album,
                )
            })
            .await
            .map_err(Error::Storage)
            .and_then(|inner| inner.map_err(Error::UseCase))
    }

    /// Move an album below a new parent, or to the root.
    pub async fn reparent_album(
        &self,
        scope: CallerScope,
        id: AlbumId,
        new_parent_id: Option<AlbumId>,
    ) -> Result<()> {
        self.db_gatekeeper
            .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
                let mut repo = Connection::new(&mut pooled_connection);
                uc::album::reparent_album(
                    &mut repo,
                    UtcDateTimeMs::now(),
                    scope,
                    id,
                    new_parent_id,
                )
            })
            .await
            .map_err(Error::Storage)
            .and_then(|inner| inner.map_err(Error::UseCase))
    }

    /// Delete an album, detaching its assets and re-parenting its
    /// child albums.
    pub async fn delete_album(&self, scope: CallerScope, id: AlbumId) -> Result<()> {
        self.db_gatekeeper
            .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
                let mut repo = Connection::new(&mut pooled_connection);
                uc::album::delete_album(&mut repo, UtcDateTimeMs::now(), scope, id)
            })
            .await
            .map_err(Error::Storage)
            .and_then(|inner| inner.map_err(Error::UseCase))
    }

    /// Authenticate a presented raw API token.
    pub async fn authenticate_token(&self, raw: String) -> Result<UserRecord> {
        self.db_gatekeeper
            .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
                // A write task: successful authentication touches the
                // token's last-used timestamp.
                let mut repo = Connection::new(&mut pooled_connection);
                uc::token::authenticate_token(&mut repo, UtcDateTimeMs::now(), &raw)
            })
            .await
            .map_err(Error::Storage)
            .and_then(|inner| inner.map_err(Error::UseCase))
    }
}
