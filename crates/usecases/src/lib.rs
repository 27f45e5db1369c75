// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Use cases on top of the repository traits.
//!
//! Synchronous functions, generic over the repositories they touch.
//! Input validation and access decisions happen here; asynchronous
//! scheduling and remote-store calls happen a layer above.

use std::result::Result as StdResult;

use thiserror::Error;

use lumina_repo::prelude::*;

pub mod access;
pub mod album;
pub mod asset;
pub mod tenant;
pub mod token;
pub mod user;

#[derive(Error, Debug)]
#[error(transparent)]
pub struct InputError(#[from] pub anyhow::Error);

pub type InputResult<T> = StdResult<T, InputError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    /// The caller could name the affected entity but lacks the
    /// rights to perform the operation on it.
    ///
    /// Where the existence of another tenant's data must not leak,
    /// [`RepoError::NotFound`] is reported instead.
    #[error("forbidden")]
    Forbidden,

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = StdResult<T, Error>;

pub(crate) fn validate_input<T>(input: &T) -> InputResult<()>
where
    T: semval::Validate,
    <T as semval::Validate>::Invalidity: std::fmt::Debug,
{
    if let Err(err) = input.validate() {
        return Err(anyhow::anyhow!("invalid input: {err:?}").into());
    }
    Ok(())
}
