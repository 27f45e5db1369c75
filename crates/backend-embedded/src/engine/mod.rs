// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Bounded execution of sagas off the request-handling path.
//!
//! The pool bound caps the outbound concurrency against the remote
//! store, which may itself rate-limit. Submissions beyond the bound
//! queue instead of spawning unbounded work. Sagas touching the same
//! asset are serialized through a per-asset lock so that a concurrent
//! move and delete cannot race.

use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::{
        Arc, Mutex, PoisonError, Weak,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::{
    sync::{Notify, Semaphore},
    task::JoinHandle,
};

use lumina_repo::asset::RecordId as AssetId;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of sagas running concurrently.
    pub worker_limit: NonZeroUsize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_limit: const { NonZeroUsize::new(4).unwrap() },
        }
    }
}

/// Cooperative cancellation of a submitted saga.
///
/// Cancellation is only honored up to the remote-commit step: once
/// the remote object exists the saga finishes normally regardless of
/// this flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn cancel(&self) {
        let Self(flag) = self;
        flag.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        let Self(flag) = self;
        flag.load(Ordering::Acquire)
    }
}

/// Handle of a submitted saga.
///
/// Await [`Self::outcome`] for synchronous completion or
/// [`Self::outcome_with_timeout`] to fall back to background
/// completion when the saga takes too long. Dropping the handle
/// detaches the saga, it keeps running.
#[derive(Debug)]
pub struct TaskHandle<T> {
    join: JoinHandle<Result<T>>,
    cancellation: CancellationFlag,
}

/// Outcome of awaiting a saga with a timeout.
#[derive(Debug)]
pub enum WaitOutcome<T> {
    Completed(Result<T>),

    /// The timeout elapsed. The saga keeps running in the background
    /// and the returned handle can still be awaited.
    StillRunning(TaskHandle<T>),
}

impl<T> TaskHandle<T> {
    #[must_use]
    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }

    pub async fn outcome(self) -> Result<T> {
        let Self { join, .. } = self;
        join.await.map_err(Error::TaskScheduling)?
    }

    pub async fn outcome_with_timeout(mut self, timeout: Duration) -> WaitOutcome<T> {
        match tokio::time::timeout(timeout, &mut self.join).await {
            Ok(joined) => WaitOutcome::Completed(
                joined
                    .map_err(Error::TaskScheduling)
                    .and_then(std::convert::identity),
            ),
            Err(_elapsed) => WaitOutcome::StillRunning(self),
        }
    }
}

/// The saga runner.
#[derive(Debug)]
pub struct SagaRunner {
    semaphore: Arc<Semaphore>,
    asset_locks: Mutex<HashMap<AssetId, Weak<tokio::sync::Mutex<()>>>>,
    accepting: AtomicBool,
    running_count: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl SagaRunner {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.worker_limit.get())),
            asset_locks: Mutex::new(HashMap::new()),
            accepting: AtomicBool::new(true),
            running_count: Arc::new(AtomicUsize::new(0)),
            drained: Arc::new(Notify::new()),
        }
    }

    /// Number of sagas that are currently submitted and not yet
    /// finished, including queued ones.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.running_count.load(Ordering::Acquire)
    }

    fn asset_lock(&self, asset_id: AssetId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .asset_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Drop entries of sagas that have finished meanwhile
        locks.retain(|_, weak| weak.strong_count() > 0);
        if let Some(existing) = locks.get(&asset_id).and_then(Weak::upgrade) {
            return existing;
        }
        let lock = Arc::new(tokio::sync::Mutex::new(()));
        locks.insert(asset_id, Arc::downgrade(&lock));
        lock
    }

    /// Submit a saga for execution.
    ///
    /// `asset_ids` are the assets the saga touches; sagas sharing an
    /// asset are serialized in submission order of lock acquisition.
    /// Fails with [`Error::Aborted`] after shutdown has begun.
    pub fn submit<MakeSaga, Saga, T>(
        &self,
        asset_ids: Vec<AssetId>,
        make_saga: MakeSaga,
    ) -> Result<TaskHandle<T>>
    where
        MakeSaga: FnOnce(CancellationFlag) -> Saga,
        Saga: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        if !self.accepting.load(Ordering::Acquire) {
            return Err(Error::Aborted);
        }
        let cancellation = CancellationFlag::default();
        let saga = make_saga(cancellation.clone());
        // Deterministic lock order prevents deadlocks between sagas
        // over intersecting asset sets
        let mut asset_ids = asset_ids;
        asset_ids.sort_unstable();
        asset_ids.dedup();
        let locks: Vec<_> = asset_ids
            .into_iter()
            .map(|asset_id| self.asset_lock(asset_id))
            .collect();
        let semaphore = Arc::clone(&self.semaphore);
        let running_count = Arc::clone(&self.running_count);
        let drained = Arc::clone(&self.drained);
        running_count.fetch_add(1, Ordering::AcqRel);
        let join = tokio::spawn(async move {
            // The semaphore is never closed
            let _permit = semaphore.acquire_owned().await.ok();
            let mut guards = Vec::with_capacity(locks.len());
            for lock in &locks {
                guards.push(lock.lock().await);
            }
            let outcome = saga.await;
            drop(guards);
            if running_count.fetch_sub(1, Ordering::AcqRel) == 1 {
                drained.notify_waiters();
            }
            outcome
        });
        Ok(TaskHandle { join, cancellation })
    }

    /// Graceful shutdown: refuse new sagas, wait for in-flight ones.
    pub async fn drain(&self) {
        self.accepting.store(false, Ordering::Release);
        loop {
            // Register as waiter before re-checking the count, so a
            // saga finishing in between cannot slip its notification
            // past us
            let mut notified = std::pin::pin!(self.drained.notified());
            notified.as_mut().enable();
            if self.running_count() == 0 {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests;
