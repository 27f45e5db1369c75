// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};

use lumina_storage_sqlite::connection::{
    Config as ConnectionConfig, create_connection_pool, gatekeeper::Gatekeeper,
    get_pooled_connection,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection: ConnectionConfig,
    pub migrate_schema: bool,
}

pub fn commission_database(config: &DatabaseConfig) -> anyhow::Result<Gatekeeper> {
    // The maximum size of the pool defines the maximum number of
    // allowed readers while writers require exclusive access.
    log::info!(
        "Creating SQLite connection pool of max. size {max_size}",
        max_size = config.connection.pool.max_size
    );
    let connection_pool =
        create_connection_pool(&config.connection.storage, config.connection.pool.max_size)?;

    log::info!("Initializing database");
    lumina_repo_sqlite::initialize_database(&mut *get_pooled_connection(&connection_pool)?)?;

    if config.migrate_schema {
        log::info!("Migrating database schema");
        lumina_repo_sqlite::run_migrations(&mut *get_pooled_connection(&connection_pool)?)
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    }

    let gatekeeper = Gatekeeper::new(connection_pool, config.connection.pool.gatekeeper);

    Ok(gatekeeper)
}
