// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    api_token (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        user_id -> BigInt,
        selector -> Text,
        salt -> Text,
        verifier -> Text,
        label -> Nullable<Text>,
        expires_at_ms -> Nullable<BigInt>,
        last_used_ms -> Nullable<BigInt>,
    }
}
