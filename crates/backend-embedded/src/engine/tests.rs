// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    num::NonZeroUsize,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use lumina_repo::asset::RecordId as AssetId;

use super::*;

fn runner_with_limit(worker_limit: usize) -> SagaRunner {
    SagaRunner::new(Config {
        worker_limit: NonZeroUsize::new(worker_limit).unwrap(),
    })
}

#[tokio::test]
async fn bound_concurrently_running_sagas() {
    let runner = runner_with_limit(2);
    let running = Arc::new(AtomicUsize::new(0));
    let observed_max = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let running = Arc::clone(&running);
        let observed_max = Arc::clone(&observed_max);
        let handle = runner
            .submit(Vec::new(), move |_cancellation| async move {
                let now_running = running.fetch_add(1, Ordering::AcqRel) + 1;
                observed_max.fetch_max(now_running, Ordering::AcqRel);
                tokio::time::sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::AcqRel);
                Ok(())
            })
            .unwrap();
        handles.push(handle);
    }
    for handle in handles {
        handle.outcome().await.unwrap();
    }
    assert!(observed_max.load(Ordering::Acquire) <= 2);
}

#[tokio::test]
async fn serialize_sagas_touching_the_same_asset() {
    let runner = runner_with_limit(4);
    let events = Arc::new(Mutex::new(Vec::new()));
    let asset_id = AssetId::new(1);

    let mut handles = Vec::new();
    for saga_index in 0..3 {
        let events = Arc::clone(&events);
        let handle = runner
            .submit(vec![asset_id], move |_cancellation| async move {
                events.lock().unwrap().push((saga_index, "start"));
                tokio::time::sleep(Duration::from_millis(10)).await;
                events.lock().unwrap().push((saga_index, "end"));
                Ok(())
            })
            .unwrap();
        handles.push(handle);
    }
    for handle in handles {
        handle.outcome().await.unwrap();
    }

    // Exactly one saga at a time: every "start" is followed by the
    // matching "end" before the next saga starts.
    let events = events.lock().unwrap();
    assert_eq!(6, events.len());
    for pair in events.chunks(2) {
        assert_eq!(pair[0].0, pair[1].0);
        assert_eq!("start", pair[0].1);
        assert_eq!("end", pair[1].1);
    }
}

#[tokio::test]
async fn run_sagas_on_distinct_assets_concurrently() {
    let runner = runner_with_limit(4);
    let running = Arc::new(AtomicUsize::new(0));
    let observed_max = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for asset_number in 1..=4 {
        let running = Arc::clone(&running);
        let observed_max = Arc::clone(&observed_max);
        let handle = runner
            .submit(vec![AssetId::new(asset_number)], move |_cancellation| {
                async move {
                    let now_running = running.fetch_add(1, Ordering::AcqRel) + 1;
                    observed_max.fetch_max(now_running, Ordering::AcqRel);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::AcqRel);
                    Ok(())
                }
            })
            .unwrap();
        handles.push(handle);
    }
    for handle in handles {
        handle.outcome().await.unwrap();
    }
    assert!(observed_max.load(Ordering::Acquire) > 1);
}

#[tokio::test]
async fn fall_back_to_background_completion_on_timeout() {
    let runner = runner_with_limit(1);
    let handle = runner
        .submit(Vec::new(), |_cancellation| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(42)
        })
        .unwrap();

    let wait_outcome = handle
        .outcome_with_timeout(Duration::from_millis(5))
        .await;
    let WaitOutcome::StillRunning(handle) = wait_outcome else {
        panic!("saga should still be running");
    };
    // The saga keeps running and can still be awaited
    assert_eq!(42, handle.outcome().await.unwrap());
}

#[tokio::test]
async fn refuse_new_sagas_after_drain() {
    let runner = runner_with_limit(1);
    let handle = runner
        .submit(Vec::new(), |_cancellation| async { Ok(()) })
        .unwrap();
    handle.outcome().await.unwrap();

    runner.drain().await;
    assert_eq!(0, runner.running_count());
    assert!(matches!(
        runner.submit(Vec::new(), |_cancellation| async { Ok(()) }),
        Err(Error::Aborted)
    ));
}

#[tokio::test]
async fn drain_waits_for_in_flight_sagas() {
    let runner = runner_with_limit(1);
    let finished = Arc::new(AtomicUsize::new(0));
    let finished_in_saga = Arc::clone(&finished);
    let _handle = runner
        .submit(Vec::new(), move |_cancellation| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            finished_in_saga.fetch_add(1, Ordering::AcqRel);
            Ok(())
        })
        .unwrap();

    runner.drain().await;
    assert_eq!(1, finished.load(Ordering::Acquire));
}

#[tokio::test]
async fn cancellation_flag_is_visible_inside_the_saga() {
    let runner = runner_with_limit(1);
    let handle = runner
        .submit(Vec::new(), |cancellation| async move {
            // Simulates a saga checkpoint before the remote commit
            tokio::time::sleep(Duration::from_millis(20)).await;
            if cancellation.is_cancelled() {
                return Err(Error::Aborted);
            }
            Ok(())
        })
        .unwrap();
    handle.cancellation().cancel();
    assert!(matches!(handle.outcome().await, Err(Error::Aborted)));
}
