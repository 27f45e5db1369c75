// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Short-lived, sequenced operations spanning the local cache and the
//! remote store, with compensating actions on partial failure.
//!
//! Each saga is a plain async function over the database gatekeeper
//! and the remote-store contract. Scheduling, bounding, and per-asset
//! serialization are the saga runner's concern.

pub mod delete;
pub mod relocate;
pub mod repair;
pub mod upload;
pub mod visibility;
