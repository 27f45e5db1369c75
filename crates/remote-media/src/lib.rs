// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Adapter for the remote media store.
//!
//! Wraps the authenticated HTTP contract behind a pooled, keep-alive
//! client: upload returns a resource descriptor, delete returns an
//! idempotent outcome, downloads can be proxied for hosts belonging
//! to the configured store. Transient failures are retried internally
//! with exponential backoff; only terminal outcomes surface.

use std::{num::NonZeroU32, time::Duration};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use lumina_core::asset::{DeliveryUrls, RemoteMediaId};

mod client;
pub use client::RemoteMediaClient;

#[derive(Error, Debug)]
pub enum Error {
    /// The remote store rejected the request and retrying would not
    /// help: authentication or validation failures, or a response
    /// that does not match the contract.
    #[error("remote store rejected the request ({status:?}): {message}")]
    Rejected {
        status: Option<StatusCode>,
        message: String,
    },

    /// All retry attempts have been exhausted.
    #[error("remote store unavailable after {attempts} attempt(s): {message}")]
    Unavailable { attempts: u32, message: String },

    /// The URL does not belong to the configured remote store and
    /// must not be fetched on behalf of a client.
    #[error("host of {url} is not covered by the remote store")]
    ForeignHost { url: Url },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Descriptor of an uploaded object, assigned by the remote store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteDescriptor {
    pub remote_id: RemoteMediaId,
    pub delivery: DeliveryUrls,
}

/// Terminal outcome of a remote delete.
///
/// An object that is already gone is an acceptable terminal state:
/// deletes are idempotent and a repeated delete must not be treated
/// as a hard failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyGone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The media endpoint of the remote store, e.g.
    /// `https://example.org/wp-json/wp/v2/media`.
    pub endpoint_url: Url,

    /// HTTP Basic credentials.
    pub username: String,
    pub password: String,

    /// Per-request timeout, covering the whole body transfer.
    pub request_timeout: Duration,

    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one.
    pub max_attempts: NonZeroU32,

    /// Delay before the first retry; doubled for each subsequent
    /// retry up to [`Self::max_delay`].
    pub base_delay: Duration,

    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: const { NonZeroU32::new(3).unwrap() },
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
        }
    }
}

#[cfg(test)]
mod tests;
