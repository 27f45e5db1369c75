// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

pub(crate) mod album;
pub(crate) mod api_token;
pub(crate) mod asset;
pub(crate) mod tenant;
pub(crate) mod user;
