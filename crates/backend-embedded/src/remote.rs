// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The remote-store contract as the sagas consume it.
//!
//! This is deliberately not a pluggable storage abstraction: it is
//! the exact contract the synchronization pattern requires of the one
//! remote store (upload yields a descriptor, delete is idempotent,
//! the descriptor can be re-fetched for URL repair), expressed as a
//! trait so that saga tests can substitute a scripted store.

use bytes::Bytes;
use mime::Mime;

use lumina_core::asset::RemoteMediaId;
use lumina_remote_media::{
    DeleteOutcome, RemoteDescriptor, RemoteMediaClient, Result as RemoteResult,
};

pub trait RemoteMediaStore: Send + Sync {
    fn upload_media(
        &self,
        data: Bytes,
        file_name: &str,
        media_type: &Mime,
    ) -> impl Future<Output = RemoteResult<RemoteDescriptor>> + Send;

    fn delete_media(
        &self,
        remote_id: RemoteMediaId,
    ) -> impl Future<Output = RemoteResult<DeleteOutcome>> + Send;

    fn fetch_media_descriptor(
        &self,
        remote_id: RemoteMediaId,
    ) -> impl Future<Output = RemoteResult<RemoteDescriptor>> + Send;
}

impl RemoteMediaStore for RemoteMediaClient {
    async fn upload_media(
        &self,
        data: Bytes,
        file_name: &str,
        media_type: &Mime,
    ) -> RemoteResult<RemoteDescriptor> {
        self.upload(data, file_name, media_type).await
    }

    async fn delete_media(&self, remote_id: RemoteMediaId) -> RemoteResult<DeleteOutcome> {
        self.delete(remote_id).await
    }

    async fn fetch_media_descriptor(
        &self,
        remote_id: RemoteMediaId,
    ) -> RemoteResult<RemoteDescriptor> {
        self.fetch_descriptor(remote_id).await
    }
}
