// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Asynchronous engine on top of the synchronous use cases.
//!
//! Owns the process-wide singletons (database gatekeeper, remote
//! media client, bounded saga runner) as one explicitly constructed
//! [`environment::Environment`] with a graceful shutdown sequence.

use thiserror::Error;

use lumina_repo::prelude::RepoError;

pub mod engine;
pub mod environment;
pub mod remote;
pub mod saga;
pub mod storage;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Media(#[from] lumina_media_image::Error),

    #[error(transparent)]
    Remote(#[from] lumina_remote_media::Error),

    #[error(transparent)]
    Storage(#[from] lumina_storage_sqlite::Error),

    #[error(transparent)]
    UseCase(#[from] lumina_usecases::Error),

    /// The operation was cancelled before its remote-commit step, or
    /// the engine is shutting down and does not accept new work.
    #[error("aborted")]
    Aborted,

    #[error(transparent)]
    TaskScheduling(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepoError> for Error {
    fn from(err: RepoError) -> Self {
        Self::UseCase(err.into())
    }
}

impl From<lumina_usecases::InputError> for Error {
    fn from(err: lumina_usecases::InputError) -> Self {
        Self::UseCase(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
