// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    num::NonZeroU64,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::{sync::RwLock, task::spawn_blocking, time::sleep};

use super::{ConnectionPool, PooledConnection, get_pooled_connection};
use crate::{Error, Result};

/// Manage database connections for asynchronous tasks
///
/// Only a single writer is allowed to access the `SQLite` database at
/// any given time. Serializing write tasks here prevents both
/// synchronous locking when obtaining a connection and busy/locked
/// errors when concurrently executing write operations on a shared
/// `SQLite` database instance. Callers never have to deal with write
/// contention themselves.
#[allow(missing_debug_implementations)]
pub struct Gatekeeper {
    connection_pool: Arc<RwLock<ConnectionPool>>,
    acquire_read_timeout: Duration,
    acquire_write_timeout: Duration,
    pending_tasks_state: Arc<PendingTasksState>,
    abort_current_task_flag: Arc<AtomicBool>,
    decommissioned: AtomicBool,
}

#[derive(Debug, Default)]
struct PendingTasksState {
    read_count: AtomicUsize,
    write_count: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskMode {
    Read,
    Write,
}

struct PendingTaskScope {
    shared_state: Arc<PendingTasksState>,
    mode: TaskMode,
}

impl PendingTaskScope {
    #[must_use]
    fn new(shared_state: Arc<PendingTasksState>, mode: TaskMode) -> Self {
        match mode {
            TaskMode::Read => {
                let pending_before = shared_state.read_count.fetch_add(1, Ordering::Relaxed);
                log::debug!("Starting read task: {} pending", pending_before + 1);
            }
            TaskMode::Write => {
                let pending_before = shared_state.write_count.fetch_add(1, Ordering::Relaxed);
                log::debug!("Starting write task: {} pending", pending_before + 1);
            }
        }
        Self { shared_state, mode }
    }
}

impl Drop for PendingTaskScope {
    fn drop(&mut self) {
        match self.mode {
            TaskMode::Read => {
                let pending_before = self.shared_state.read_count.fetch_sub(1, Ordering::Relaxed);
                debug_assert!(pending_before > 0);
                log::debug!("Finished read task: {} pending", pending_before - 1);
            }
            TaskMode::Write => {
                let pending_before = self
                    .shared_state
                    .write_count
                    .fetch_sub(1, Ordering::Relaxed);
                debug_assert!(pending_before > 0);
                log::debug!("Finished write task: {} pending", pending_before - 1);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTasks {
    pub read: usize,
    pub write: usize,
}

impl Gatekeeper {
    #[must_use]
    pub fn new(connection_pool: ConnectionPool, config: Config) -> Self {
        let Config {
            acquire_read_timeout_millis,
            acquire_write_timeout_millis,
        } = config;
        let acquire_read_timeout = Duration::from_millis(acquire_read_timeout_millis.get());
        let acquire_write_timeout = Duration::from_millis(acquire_write_timeout_millis.get());
        Self {
            connection_pool: Arc::new(RwLock::new(connection_pool)),
            acquire_read_timeout,
            acquire_write_timeout,
            pending_tasks_state: Default::default(),
            abort_current_task_flag: Default::default(),
            decommissioned: AtomicBool::new(false),
        }
    }

    /// Reject all future tasks.
    ///
    /// Pending tasks are still allowed to finish. Part of the graceful
    /// shutdown sequence.
    pub fn decommission(&self) {
        self.decommissioned.store(true, Ordering::Release);
    }

    fn check_not_decommissioned(&self) -> Result<()> {
        if self.decommissioned.load(Ordering::Acquire) {
            return Err(Error::TaskTimeout {
                reason: "connection pool has been decommissioned".to_string(),
            });
        }
        Ok(())
    }

    pub async fn spawn_blocking_read_task<H, R>(&self, connection_handler: H) -> Result<R>
    where
        H: FnOnce(PooledConnection, Arc<AtomicBool>) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.check_not_decommissioned()?;
        let _pending_task_scope =
            PendingTaskScope::new(Arc::clone(&self.pending_tasks_state), TaskMode::Read);
        let timeout = sleep(self.acquire_read_timeout);
        tokio::pin!(timeout);
        let abort_current_task_flag = Arc::clone(&self.abort_current_task_flag);
        tokio::select! {
            () = &mut timeout => Err(Error::TaskTimeout { reason: "database is locked".to_string() }),
            guard = self.connection_pool.read() => {
                self.check_not_decommissioned()?;
                let connection = get_pooled_connection(&guard)?;
                self.check_not_decommissioned()?;
                // Every task gets the chance to run when ready
                abort_current_task_flag.store(false, Ordering::Release);
                spawn_blocking(move || connection_handler(connection, abort_current_task_flag)).await
                    .map_err(Error::TaskScheduling)
            },
        }
    }

    pub async fn spawn_blocking_write_task<H, R>(&self, connection_handler: H) -> Result<R>
    where
        H: FnOnce(PooledConnection, Arc<AtomicBool>) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.check_not_decommissioned()?;
        let _pending_task_scope =
            PendingTaskScope::new(Arc::clone(&self.pending_tasks_state), TaskMode::Write);
        let timeout = sleep(self.acquire_write_timeout);
        tokio::pin!(timeout);
        let abort_current_task_flag = Arc::clone(&self.abort_current_task_flag);
        tokio::select! {
            () = &mut timeout => Err(Error::TaskTimeout { reason: "database is locked".to_string() }),
            guard = self.connection_pool.write() => {
                self.check_not_decommissioned()?;
                let connection = get_pooled_connection(&guard)?;
                self.check_not_decommissioned()?;
                // Every task gets the chance to run when ready
                abort_current_task_flag.store(false, Ordering::Release);
                spawn_blocking(move || connection_handler(connection, abort_current_task_flag)).await
                    .map_err(Error::TaskScheduling)
            },
        }
    }

    #[must_use]
    pub fn pending_tasks(&self) -> PendingTasks {
        PendingTasks {
            read: self.pending_tasks_state.read_count.load(Ordering::Relaxed),
            write: self.pending_tasks_state.write_count.load(Ordering::Relaxed),
        }
    }

    /// Request the currently running task to abort at the next
    /// checkpoint it observes the flag.
    pub fn abort_current_task(&self) {
        self.abort_current_task_flag.store(true, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub acquire_read_timeout_millis: NonZeroU64,
    pub acquire_write_timeout_millis: NonZeroU64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            acquire_read_timeout_millis: const { NonZeroU64::new(10_000).unwrap() },
            acquire_write_timeout_millis: const { NonZeroU64::new(30_000).unwrap() },
        }
    }
}
