// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use test_log::test;

use lumina_core::{
    Visibility,
    album::Album,
    asset::{Asset, DeliveryUrls, RemoteMediaId},
    user::Role,
    util::clock::UtcDateTimeMs,
};
use lumina_repo::{
    album::{AlbumRepo as _, RecordId},
    asset::AssetRepo as _,
    prelude::*,
};

use crate::{
    DbConnection,
    prelude::tests::{TestResult, establish_connection},
    repo::tests::provision_tenant_with_user,
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

fn sample_album(name: &str, visibility: Visibility) -> Album {
    Album {
        name: name.to_owned(),
        description: None,
        visibility,
    }
}

fn sample_asset(remote_id: i64) -> Asset {
    let url = |suffix: &str| {
        format!("https://media.example.org/uploads/{remote_id}-{suffix}.jpg")
            .parse()
            .unwrap()
    };
    Asset {
        remote_id: RemoteMediaId::new(remote_id),
        title: format!("Asset {remote_id}"),
        file_name: format!("{remote_id}.jpg"),
        media_type: mime::IMAGE_JPEG,
        delivery: DeliveryUrls {
            thumbnail: url("thumb"),
            medium: url("medium"),
            full: url("full"),
        },
        visibility: Visibility::Public,
    }
}

#[test]
fn insert_and_load_album() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let ownership = Ownership {
        tenant_id,
        owner_id: user_id,
    };

    let album = sample_album("Holidays", Visibility::Private);
    let id = db.insert_album(UtcDateTimeMs::now(), ownership, None, &album)?;
    let record = db.load_album(id)?;
    assert_eq!(album, record.album);
    assert_eq!(ownership, record.ownership);
    assert_eq!(None, record.parent_id);
    Ok(())
}

fn create_album_chain(
    db: &mut crate::prelude::Connection<'_>,
    ownership: Ownership,
) -> RepoResult<(RecordId, RecordId, RecordId)> {
    let root = db.insert_album(
        UtcDateTimeMs::now(),
        ownership,
        None,
        &sample_album("root", Visibility::Public),
    )?;
    let child = db.insert_album(
        UtcDateTimeMs::now(),
        ownership,
        Some(root),
        &sample_album("child", Visibility::Public),
    )?;
    let grandchild = db.insert_album(
        UtcDateTimeMs::now(),
        ownership,
        Some(child),
        &sample_album("grandchild", Visibility::Public),
    )?;
    Ok((root, child, grandchild))
}

#[test]
fn reparent_album_below_own_grandchild_fails_with_cycle() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let ownership = Ownership {
        tenant_id,
        owner_id: user_id,
    };
    let (root, child, grandchild) = create_album_chain(&mut db, ownership)?;

    assert!(matches!(
        db.reparent_album(UtcDateTimeMs::now(), root, Some(grandchild)),
        Err(RepoError::Cycle)
    ));

    // The tree is unchanged
    assert_eq!(None, db.load_album(root)?.parent_id);
    assert_eq!(Some(root), db.load_album(child)?.parent_id);
    assert_eq!(Some(child), db.load_album(grandchild)?.parent_id);
    Ok(())
}

#[test]
fn reparent_album_below_itself_fails_with_cycle() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let ownership = Ownership {
        tenant_id,
        owner_id: user_id,
    };
    let (root, ..) = create_album_chain(&mut db, ownership)?;

    assert!(matches!(
        db.reparent_album(UtcDateTimeMs::now(), root, Some(root)),
        Err(RepoError::Cycle)
    ));
    Ok(())
}

#[test]
fn reparent_album_to_sibling_and_back_to_root() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let ownership = Ownership {
        tenant_id,
        owner_id: user_id,
    };
    let (root, child, grandchild) = create_album_chain(&mut db, ownership)?;

    db.reparent_album(UtcDateTimeMs::now(), grandchild, Some(root))?;
    assert_eq!(Some(root), db.load_album(grandchild)?.parent_id);

    db.reparent_album(UtcDateTimeMs::now(), child, None)?;
    assert_eq!(None, db.load_album(child)?.parent_id);
    Ok(())
}

#[test]
fn reparent_absent_album_fails_with_not_found() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);

    assert!(matches!(
        db.reparent_album(UtcDateTimeMs::now(), RecordId::new(4711), None),
        Err(RepoError::NotFound)
    ));
    Ok(())
}

#[test]
fn delete_album_detaches_assets_and_reparents_children() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_id, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let ownership = Ownership {
        tenant_id,
        owner_id: user_id,
    };
    let (root, child, grandchild) = create_album_chain(&mut db, ownership)?;
    let asset_id = db.insert_asset(
        UtcDateTimeMs::now(),
        ownership,
        Some(child),
        &sample_asset(1),
    )?;

    db.delete_album(UtcDateTimeMs::now(), child)?;

    assert!(matches!(db.load_album(child), Err(RepoError::NotFound)));
    // The grandchild moved up to the deleted album's parent
    assert_eq!(Some(root), db.load_album(grandchild)?.parent_id);
    // The asset was detached, not deleted
    assert_eq!(None, db.load_asset(asset_id)?.album_id);
    Ok(())
}

#[test]
fn list_albums_scoped() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (tenant_one, alice) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let (tenant_two, bob) = provision_tenant_with_user(&mut db, "two", "bob", Role::Member)?;

    db.insert_album(
        UtcDateTimeMs::now(),
        Ownership {
            tenant_id: tenant_one,
            owner_id: alice,
        },
        None,
        &sample_album("public one", Visibility::Public),
    )?;
    db.insert_album(
        UtcDateTimeMs::now(),
        Ownership {
            tenant_id: tenant_one,
            owner_id: alice,
        },
        None,
        &sample_album("hidden one", Visibility::Private),
    )?;
    db.insert_album(
        UtcDateTimeMs::now(),
        Ownership {
            tenant_id: tenant_two,
            owner_id: bob,
        },
        None,
        &sample_album("public two", Visibility::Public),
    )?;

    let anonymous = db.list_albums(CallerScope::Anonymous)?;
    assert_eq!(2, anonymous.len());
    assert!(
        anonymous
            .iter()
            .all(|record| record.album.visibility.is_public())
    );

    let member = db.list_albums(CallerScope::Member {
        tenant_id: tenant_one,
        user_id: alice,
    })?;
    assert_eq!(2, member.len());
    assert!(
        member
            .iter()
            .all(|record| record.ownership.tenant_id == tenant_one)
    );

    let admin = db.list_albums(CallerScope::Admin)?;
    assert_eq!(3, admin.len());
    Ok(())
}
