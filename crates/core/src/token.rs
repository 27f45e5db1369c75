// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! API tokens for non-interactive authentication.
//!
//! The raw token value is generated once and handed back to the
//! caller. Only a selector and a salted hash of the secret part are
//! ever persisted, so a leaked token table does not leak usable
//! credentials.

use data_encoding::HEXLOWER;
use rand::RngCore as _;
use semval::prelude::*;

use crate::util::{clock::UtcDateTimeMs, random::adhoc_rng};

/// Descriptive metadata of an issued token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiToken {
    /// Human-readable label, e.g. the name of the consuming device.
    pub label: Option<String>,

    /// Tokens without an expiry stay valid until revoked.
    pub expires_at: Option<UtcDateTimeMs>,
}

impl ApiToken {
    #[must_use]
    pub fn is_expired_at(&self, now: UtcDateTimeMs) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[derive(Copy, Clone, Debug)]
pub enum ApiTokenInvalidity {
    LabelEmpty,
}

impl Validate for ApiToken {
    type Invalidity = ApiTokenInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        let Self {
            label,
            expires_at: _,
        } = self;
        ValidationContext::new()
            .invalidate_if(
                label.as_deref().is_some_and(|label| label.trim().is_empty()),
                Self::Invalidity::LabelEmpty,
            )
            .into()
    }
}

const SELECTOR_LEN: usize = 6;
const SECRET_LEN: usize = 24;
const SALT_LEN: usize = 16;

/// Separator between selector and secret in the raw token value.
const RAW_TOKEN_SEPARATOR: char = '.';

/// Persisted credentials of a token: everything except the secret.
///
/// The selector allows an indexed lookup of the row, the salted
/// verifier hash authenticates the secret part without storing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenCredentials {
    pub selector: String,
    pub salt: String,
    pub verifier: String,
}

/// A freshly generated raw token together with its storable credentials.
#[derive(Debug)]
pub struct GeneratedToken {
    /// `<selector>.<secret>`, shown to the caller exactly once.
    pub raw: String,
    pub credentials: TokenCredentials,
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    adhoc_rng().fill_bytes(&mut bytes);
    HEXLOWER.encode(&bytes)
}

fn hash_secret(salt: &str, secret: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Generate a new raw token and the credentials to persist for it.
#[must_use]
pub fn generate_token() -> GeneratedToken {
    let selector = random_hex(SELECTOR_LEN);
    let secret = random_hex(SECRET_LEN);
    let salt = random_hex(SALT_LEN);
    let verifier = hash_secret(&salt, &secret);
    let raw = format!("{selector}{RAW_TOKEN_SEPARATOR}{secret}");
    GeneratedToken {
        raw,
        credentials: TokenCredentials {
            selector,
            salt,
            verifier,
        },
    }
}

/// Split a presented raw token into selector and secret.
#[must_use]
pub fn parse_raw_token(raw: &str) -> Option<(&str, &str)> {
    let (selector, secret) = raw.split_once(RAW_TOKEN_SEPARATOR)?;
    if selector.is_empty() || secret.is_empty() {
        return None;
    }
    Some((selector, secret))
}

/// Verify a presented secret against persisted credentials.
#[must_use]
pub fn verify_secret(credentials: &TokenCredentials, secret: &str) -> bool {
    // Re-parse through blake3 to get a constant-time comparison of the
    // two digests instead of a string comparison.
    let expected = blake3::Hash::from_hex(&credentials.verifier);
    let Ok(expected) = expected else {
        return false;
    };
    let mut hasher = blake3::Hasher::new();
    hasher.update(credentials.salt.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.finalize() == expected
}
