// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;

use crate::Visibility;

/// A node in the album forest.
///
/// The parent reference that forms the hierarchy is stored by the
/// repository layer as a parent pointer per row. The invariant that
/// the parent graph stays acyclic is enforced there, on every
/// reparent, inside the write transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub description: Option<String>,
    pub visibility: Visibility,
}

#[derive(Copy, Clone, Debug)]
pub enum AlbumInvalidity {
    NameEmpty,
    DescriptionEmpty,
}

impl Validate for Album {
    type Invalidity = AlbumInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        let Self {
            name,
            description,
            visibility: _,
        } = self;
        ValidationContext::new()
            .invalidate_if(name.trim().is_empty(), Self::Invalidity::NameEmpty)
            .invalidate_if(
                description
                    .as_deref()
                    .is_some_and(|description| description.trim().is_empty()),
                Self::Invalidity::DescriptionEmpty,
            )
            .into()
    }
}
