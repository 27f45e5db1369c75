// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use test_log::test;

use lumina_core::{
    token::{ApiToken, GeneratedToken, generate_token, parse_raw_token, verify_secret},
    user::Role,
    util::clock::UtcDateTimeMs,
};
use lumina_repo::{prelude::*, token::TokenRepo as _};

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

#[test]
fn insert_and_authenticate_token() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (_, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;

    let GeneratedToken { raw, credentials } = generate_token();
    let token = ApiToken {
        label: Some("CLI".to_owned()),
        expires_at: None,
    };
    let id = db.insert_token(UtcDateTimeMs::now(), user_id, &credentials, &token)?;

    let (selector, secret) = parse_raw_token(&raw).unwrap();
    let (record, stored_credentials) = db.load_token_by_selector(selector)?;
    assert_eq!(id, record.header.id);
    assert_eq!(user_id, record.user_id);
    assert_eq!(token, record.token);
    assert_eq!(None, record.last_used_at);
    assert!(verify_secret(&stored_credentials, secret));
    Ok(())
}

#[test]
fn insert_duplicate_selector_fails_with_conflict() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (_, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;

    let GeneratedToken { credentials, .. } = generate_token();
    let token = ApiToken {
        label: None,
        expires_at: None,
    };
    db.insert_token(UtcDateTimeMs::now(), user_id, &credentials, &token)?;
    assert!(matches!(
        db.insert_token(UtcDateTimeMs::now(), user_id, &credentials, &token),
        Err(RepoError::Conflict)
    ));
    Ok(())
}

#[test]
fn touch_token_records_last_use() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (_, user_id) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;

    let GeneratedToken { raw, credentials } = generate_token();
    let token = ApiToken {
        label: None,
        expires_at: None,
    };
    let id = db.insert_token(UtcDateTimeMs::now(), user_id, &credentials, &token)?;

    let used_at = UtcDateTimeMs::now();
    db.touch_token(used_at, id)?;
    let (selector, _) = parse_raw_token(&raw).unwrap();
    let (record, _) = db.load_token_by_selector(selector)?;
    assert_eq!(Some(used_at), record.last_used_at);
    Ok(())
}

#[test]
fn revoke_token_is_scoped_to_its_owner() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::prelude::Connection::new(&mut fixture.db);
    let (_, alice) = provision_tenant_with_user(&mut db, "one", "alice", Role::Member)?;
    let (_, bob) = provision_tenant_with_user(&mut db, "two", "bob", Role::Member)?;

    let GeneratedToken { credentials, .. } = generate_token();
    let token = ApiToken {
        label: None,
        expires_at: None,
    };
    let id = db.insert_token(UtcDateTimeMs::now(), alice, &credentials, &token)?;

    assert!(matches!(
        db.revoke_token(id, bob),
        Err(RepoError::NotFound)
    ));
    db.revoke_token(id, alice)?;
    assert!(db.list_tokens(alice)?.is_empty());
    Ok(())
}
