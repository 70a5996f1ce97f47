// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyErrorKind {
    Validation,
    NotFound,
    Conflict,
    Integrity,
    Storage,
}

#[derive(Debug, Clone)]
pub struct TaxonomyError {
    kind: TaxonomyErrorKind,
    field: Option<&'static str>,
    message: String,
}

impl TaxonomyError {
    pub fn new(kind: TaxonomyErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            message: message.into(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: TaxonomyErrorKind::Validation,
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(TaxonomyErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(TaxonomyErrorKind::Conflict, message)
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::new(TaxonomyErrorKind::Integrity, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(TaxonomyErrorKind::Storage, message)
    }

    pub fn kind(&self) -> TaxonomyErrorKind {
        self.kind
    }

    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TaxonomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(
                f,
                "{:?} error on field '{}': {}",
                self.kind, field, self.message
            ),
            None => write!(f, "{:?} error: {}", self.kind, self.message),
        }
    }
}

impl Error for TaxonomyError {}

pub type TaxonomyResult<T> = Result<T, TaxonomyError>;
