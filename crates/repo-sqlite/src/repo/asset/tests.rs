// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use test_log::test;

use lumina_core::{
    Visibility,
    asset::{Asset, DeliveryUrls, RemoteMediaId},
    user::Role,
    util::clock::UtcDateTimeMs,
};
use lumina_repo::{
    asset::{AssetFilter, AssetRepo as _, RecordId},
    prelude::*,
};

use crate::{
    DbConnection,
    prelude::tests::{TestResult, establish_connection},
    repo::tests::{member_scope, provision_tenant_with_user},
};

struct Fixture {
    db: DbConnection,
}

impl Fixture {
    fn new() -> TestResult<Self> {
        let db = establish_connection()?;
        Ok(Self { db })
    }
}

fn sample_asset(remote_id: i64, title: &str, visibility: Visibility) -> Asset {
    let url = |suffix: &str| {
        format!("https://media.example.org/uploads/{remote_id}-{suffix}.jpg")
            .parse()
            .unwrap()
    };
    Asset {
        remote_id: RemoteMediaId::new(remote_id),
        title: title.to_owned(),
        file_name: format!("{remote_id}.jpg"),
        media_type: mime::IMAGE_JPEG,
        delivery: DeliveryUrls {
            thumbnail: url("thumb"),
            medium: url("medium"),
            full: url("full"),
        },
        visibility,
    }
}

#[test]
fn insert_and_load_asset() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let ownership = Ownership {
        tenant_id,
        owner_id: user_id,
    };

    let asset = sample_asset(4711, "Sunset", Visibility::Private);
    let id = db.insert_asset(UtcDateTimeMs::now(), ownership, None, &asset)?;
    let record = db.load_asset(id)?;
    assert_eq!(asset, record.asset);
    assert_eq!(ownership, record.ownership);
    assert_eq!(None, record.album_id);

    let by_remote_id = db.load_asset_by_remote_id(RemoteMediaId::new(4711))?;
    assert_eq!(record, by_remote_id);
    Ok(())
}

#[test]
fn insert_duplicate_remote_id_fails_with_conflict() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let ownership = Ownership {
        tenant_id,
        owner_id: user_id,
    };

    db.insert_asset(
        UtcDateTimeMs::now(),
        ownership,
        None,
        &sample_asset(4711, "First", Visibility::Public),
    )?;
    assert!(matches!(
        db.insert_asset(
            UtcDateTimeMs::now(),
            ownership,
            None,
            &sample_asset(4711, "Second", Visibility::Public),
        ),
        Err(RepoError::Conflict)
    ));
    Ok(())
}

#[test]
fn list_assets_anonymous_sees_only_public_rows() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let ownership = Ownership {
        tenant_id,
        owner_id: user_id,
    };

    // Hidden and public rows interleaved within the same result window
    for remote_id in 1..=6 {
        let visibility = if remote_id % 2 == 0 {
            Visibility::Public
        } else {
            Visibility::Private
        };
        db.insert_asset(
            UtcDateTimeMs::now(),
            ownership,
            None,
            &sample_asset(remote_id, "Mixed", visibility),
        )?;
    }

    let listed = db.list_assets(
        CallerScope::Anonymous,
        &AssetFilter::default(),
        &Pagination {
            limit: Some(10),
            offset: None,
        },
    )?;
    assert_eq!(3, listed.len());
    assert!(
        listed
            .iter()
            .all(|record| record.asset.visibility.is_public())
    );
    Ok(())
}

#[test]
fn list_assets_member_sees_own_tenant_any_visibility() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_one, alice) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let (tenant_two, bob) = provision_tenant_with_user(&mut db, "two", "bob", Role::Member)?;

    db.insert_asset(
        UtcDateTimeMs::now(),
        Ownership {
            tenant_id: tenant_one,
            owner_id: alice,
        },
        None,
        &sample_asset(1, "Own hidden", Visibility::Private),
    )?;
    db.insert_asset(
        UtcDateTimeMs::now(),
        Ownership {
            tenant_id: tenant_two,
            owner_id: bob,
        },
        None,
        &sample_asset(2, "Foreign public", Visibility::Public),
    )?;

    let listed = db.list_assets(
        member_scope(tenant_one, alice),
        &AssetFilter::default(),
        &Pagination::default(),
    )?;
    assert_eq!(1, listed.len());
    assert_eq!("Own hidden", listed[0].asset.title);

    let admin_listed = db.list_assets(
        CallerScope::Admin,
        &AssetFilter::default(),
        &Pagination::default(),
    )?;
    assert_eq!(2, admin_listed.len());
    Ok(())
}

#[test]
fn list_assets_search_escapes_pattern_syntax() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let ownership = Ownership {
        tenant_id,
        owner_id: user_id,
    };

    db.insert_asset(
        UtcDateTimeMs::now(),
        ownership,
        None,
        &sample_asset(1, "Sale 100% off", Visibility::Public),
    )?;
    db.insert_asset(
        UtcDateTimeMs::now(),
        ownership,
        None,
        &sample_asset(2, "Sale poster", Visibility::Public),
    )?;

    let filter = AssetFilter {
        album_id: None,
        search_terms: Some("100%".to_owned()),
    };
    let listed = db.list_assets(CallerScope::Admin, &filter, &Pagination::default())?;
    assert_eq!(1, listed.len());
    assert_eq!("Sale 100% off", listed[0].asset.title);

    // Matches the file name as well
    let filter = AssetFilter {
        album_id: None,
        search_terms: Some("2.jpg".to_owned()),
    };
    let listed = db.list_assets(CallerScope::Admin, &filter, &Pagination::default())?;
    assert_eq!(1, listed.len());
    Ok(())
}

#[test]
fn list_assets_paginated_newest_first() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let ownership = Ownership {
        tenant_id,
        owner_id: user_id,
    };
    for remote_id in 1..=5 {
        db.insert_asset(
            UtcDateTimeMs::now(),
            ownership,
            None,
            &sample_asset(remote_id, "Numbered", Visibility::Public),
        )?;
    }

    let first_page = db.list_assets(
        CallerScope::Admin,
        &AssetFilter::default(),
        &Pagination {
            limit: Some(2),
            offset: None,
        },
    )?;
    let second_page = db.list_assets(
        CallerScope::Admin,
        &AssetFilter::default(),
        &Pagination {
            limit: Some(2),
            offset: Some(2),
        },
    )?;
    assert_eq!(2, first_page.len());
    assert_eq!(2, second_page.len());
    // Newest first, no overlap between pages
    assert_eq!(5, first_page[0].asset.remote_id.to_inner());
    assert_eq!(4, first_page[1].asset.remote_id.to_inner());
    assert_eq!(3, second_page[0].asset.remote_id.to_inner());
    Ok(())
}

#[test]
fn update_visibility_is_scoped() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_one, alice) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let (tenant_two, bob) = provision_tenant_with_user(&mut db, "two", "bob", Role::Member)?;
    let id = db.insert_asset(
        UtcDateTimeMs::now(),
        Ownership {
            tenant_id: tenant_one,
            owner_id: alice,
        },
        None,
        &sample_asset(1, "Asset", Visibility::Public),
    )?;

    // A member of another tenant cannot distinguish the foreign row
    // from an absent one
    assert!(matches!(
        db.update_asset_visibility(
            UtcDateTimeMs::now(),
            member_scope(tenant_two, bob),
            id,
            Visibility::Private,
        ),
        Err(RepoError::NotFound)
    ));
    assert!(db.load_asset(id)?.asset.visibility.is_public());

    db.update_asset_visibility(
        UtcDateTimeMs::now(),
        member_scope(tenant_one, alice),
        id,
        Visibility::Private,
    )?;
    assert!(!db.load_asset(id)?.asset.visibility.is_public());

    db.update_asset_visibility(
        UtcDateTimeMs::now(),
        CallerScope::Admin,
        id,
        Visibility::Public,
    )?;
    assert!(db.load_asset(id)?.asset.visibility.is_public());
    Ok(())
}

#[test]
fn move_assets_to_album_skips_foreign_rows() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_one, alice) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let (tenant_two, bob) = provision_tenant_with_user(&mut db, "two", "bob", Role::Member)?;
    let own_ownership = Ownership {
        tenant_id: tenant_one,
        owner_id: alice,
    };

    let album_id = {
        use lumina_core::album::Album;
        use lumina_repo::album::AlbumRepo as _;
        db.insert_album(
            UtcDateTimeMs::now(),
            own_ownership,
            None,
            &Album {
                name: "Target".to_owned(),
                description: None,
                visibility: Visibility::Public,
            },
        )?
    };
    let own_asset = db.insert_asset(
        UtcDateTimeMs::now(),
        own_ownership,
        None,
        &sample_asset(1, "Own", Visibility::Public),
    )?;
    let foreign_asset = db.insert_asset(
        UtcDateTimeMs::now(),
        Ownership {
            tenant_id: tenant_two,
            owner_id: bob,
        },
        None,
        &sample_asset(2, "Foreign", Visibility::Public),
    )?;

    let moved = db.move_assets_to_album(
        UtcDateTimeMs::now(),
        member_scope(tenant_one, alice),
        &[own_asset, foreign_asset, RecordId::new(4711)],
        Some(album_id),
    )?;
    assert_eq!(1, moved);
    assert_eq!(Some(album_id), db.load_asset(own_asset)?.album_id);
    assert_eq!(None, db.load_asset(foreign_asset)?.album_id);
    Ok(())
}

#[test]
fn purge_assets_returns_remote_ids_of_purged_rows() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_one, alice) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let (tenant_two, bob) = provision_tenant_with_user(&mut db, "two", "bob", Role::Member)?;
    let own_ownership = Ownership {
        tenant_id: tenant_one,
        owner_id: alice,
    };

    let own_asset = db.insert_asset(
        UtcDateTimeMs::now(),
        own_ownership,
        None,
        &sample_asset(10, "Own", Visibility::Public),
    )?;
    let foreign_asset = db.insert_asset(
        UtcDateTimeMs::now(),
        Ownership {
            tenant_id: tenant_two,
            owner_id: bob,
        },
        None,
        &sample_asset(20, "Foreign", Visibility::Public),
    )?;

    let purged = db.purge_assets(
        member_scope(tenant_one, alice),
        &[own_asset, foreign_asset],
    )?;
    assert_eq!(vec![(own_asset, RemoteMediaId::new(10))], purged);
    assert!(matches!(db.load_asset(own_asset), Err(RepoError::NotFound)));
    // The foreign row is untouched
    assert!(db.load_asset(foreign_asset).is_ok());
    Ok(())
}

#[test]
fn update_delivery_urls() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let id = db.insert_asset(
        UtcDateTimeMs::now(),
        Ownership {
            tenant_id,
            owner_id: user_id,
        },
        None,
        &sample_asset(1, "Asset", Visibility::Public),
    )?;

    let repaired = DeliveryUrls {
        thumbnail: "https://media.example.org/fresh/thumb.jpg".parse()?,
        medium: "https://media.example.org/fresh/medium.jpg".parse()?,
        full: "https://media.example.org/fresh/full.jpg".parse()?,
    };
    db.update_asset_delivery_urls(UtcDateTimeMs::now(), id, &repaired)?;
    assert_eq!(repaired, db.load_asset(id)?.asset.delivery);
    Ok(())
}
