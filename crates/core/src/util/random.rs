// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Stateless random generator for simple, noncritical use cases.

pub type AdhocRng = rand::rngs::ThreadRng;

#[must_use]
pub fn adhoc_rng() -> AdhocRng {
    rand::rng()
}
