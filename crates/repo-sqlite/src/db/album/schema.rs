// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    album (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        tenant_id -> BigInt,
        owner_id -> BigInt,
        parent_id -> Nullable<BigInt>,
        name -> Text,
        description -> Nullable<Text>,
        visibility -> SmallInt,
    }
}
