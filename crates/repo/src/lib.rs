// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Repository traits of the metadata store.
//!
//! One trait per entity, implemented by the storage backend. All
//! operations are synchronous; asynchronous scheduling and the
//! serialization of writers happen a layer below, in the storage
//! crate's gatekeeper.

use lumina_core::util::clock::UtcDateTimeMs;

#[macro_use]
mod macros;

pub mod album;
pub mod asset;
pub mod tenant;
pub mod token;
pub mod user;

pub type RecordId = i64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordHeader<Id> {
    pub id: Id,
    pub created_at: UtcDateTimeMs,
    pub updated_at: UtcDateTimeMs,
}

/// Tenant and owning user of a stored asset or album.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ownership {
    pub tenant_id: tenant::RecordId,
    pub owner_id: user::RecordId,
}

/// Visibility predicate to apply when querying on behalf of a caller.
///
/// The predicate must be applied at the query layer, never by
/// filtering rows post-hoc in memory: pagination counts and timing
/// must not leak the existence of rows the caller may not observe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallerScope {
    /// Only publicly visible items.
    Anonymous,

    /// Everything belonging to the caller's tenant, any visibility.
    Member {
        tenant_id: tenant::RecordId,
        user_id: user::RecordId,
    },

    /// Unrestricted, across all tenants.
    Admin,
}

impl CallerScope {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub const fn tenant_id(&self) -> Option<tenant::RecordId> {
        match self {
            Self::Member { tenant_id, .. } => Some(*tenant_id),
            Self::Anonymous | Self::Admin => None,
        }
    }
}

pub mod prelude {
    use thiserror::Error;

    pub use crate::{CallerScope, Ownership, RecordHeader};

    pub type PaginationOffset = u64;

    pub type PaginationLimit = u64;

    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct Pagination {
        pub limit: Option<PaginationLimit>,
        pub offset: Option<PaginationOffset>,
    }

    impl Pagination {
        #[must_use]
        pub const fn new() -> Self {
            Self {
                limit: None,
                offset: None,
            }
        }

        #[must_use]
        pub const fn has_offset(&self) -> bool {
            self.offset.is_some()
        }

        #[must_use]
        pub const fn is_limited(&self) -> bool {
            self.limit.is_some()
        }

        #[must_use]
        pub const fn is_paginated(&self) -> bool {
            self.has_offset() || self.is_limited()
        }

        /// Mandatory offset
        ///
        /// Returns the offset if specified or 0 otherwise.
        #[must_use]
        pub fn mandatory_offset(&self) -> PaginationOffset {
            self.offset.unwrap_or(0)
        }

        /// Mandatory limit
        ///
        /// Returns the limit if specified or the maximum value otherwise.
        #[must_use]
        pub fn mandatory_limit(&self) -> PaginationLimit {
            self.limit.unwrap_or(PaginationLimit::MAX)
        }
    }

    #[derive(Error, Debug)]
    pub enum RepoError {
        #[error("not found")]
        NotFound,

        #[error("conflict")]
        Conflict,

        /// An album reparent operation would have made the album its
        /// own ancestor. Detected inside the write transaction, which
        /// is rolled back.
        #[error("cycle")]
        Cycle,

        #[error("aborted")]
        Aborted,

        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }

    pub type RepoResult<T> = Result<T, RepoError>;

    pub trait OptionalRepoResult<T> {
        fn optional(self) -> RepoResult<Option<T>>;
    }

    impl<T> OptionalRepoResult<T> for Result<T, RepoError> {
        fn optional(self) -> RepoResult<Option<T>> {
            self.map_or_else(
                |err| {
                    if matches!(err, RepoError::NotFound) {
                        Ok(None)
                    } else {
                        Err(err)
                    }
                },
                |val| Ok(Some(val)),
            )
        }
    }
}
