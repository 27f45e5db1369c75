// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::num::NonZeroU32;

use diesel::{Connection as _, r2d2};
use serde::{Deserialize, Serialize};

use crate::Result;

pub mod gatekeeper;

pub type ConnectionManager = r2d2::ConnectionManager<diesel::SqliteConnection>;

pub type ConnectionPool = r2d2::Pool<ConnectionManager>;

pub type PooledConnection = r2d2::PooledConnection<ConnectionManager>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Connection string, i.e. a file path or `:memory:`.
    pub storage: String,

    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// The maximum pool size defines the maximum number of concurrent
    /// readers. Writers always require exclusive access, see
    /// [`gatekeeper::Gatekeeper`].
    pub max_size: NonZeroU32,

    pub gatekeeper: gatekeeper::Config,
}

pub fn create_connection_pool(connection: &str, max_size: NonZeroU32) -> Result<ConnectionPool> {
    // Establish a test connection before creating the connection pool
    // to fail early. For an inaccessible file r2d2 would do multiple
    // retries and log errors instead of failing immediately.
    // The test connection is dropped immediately without using it.
    // Missing files have been created when reaching this point.
    drop(diesel::SqliteConnection::establish(connection)?);
    let manager = ConnectionManager::new(connection);
    let pool = ConnectionPool::builder()
        .max_size(max_size.get())
        .build(manager)?;
    Ok(pool)
}

pub fn get_pooled_connection(pool: &ConnectionPool) -> Result<PooledConnection> {
    pool.get().map_err(Into::into)
}
