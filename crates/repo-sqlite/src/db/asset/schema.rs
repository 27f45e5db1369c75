// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    asset (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        remote_id -> BigInt,
        title -> Text,
        file_name -> Text,
        media_type -> Text,
        url_thumbnail -> Text,
        url_medium -> Text,
        url_full -> Text,
        tenant_id -> BigInt,
        owner_id -> BigInt,
        album_id -> Nullable<BigInt>,
        visibility -> SmallInt,
    }
}
