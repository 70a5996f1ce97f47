// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod associations;
pub mod cascade;
pub mod errors;
pub mod importer;
pub mod revisions;
pub mod slug;
pub mod store;

pub use associations::TagDelta;
pub use cascade::DeleteOutcome;
pub use errors::{TaxonomyError, TaxonomyErrorKind, TaxonomyResult};
pub use importer::{ImportFile, ImportSummary};
pub use store::{GuidelineDetail, GuidelineFilter, GuidelineUpdate, TaxonomyStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const MAX_NAME_CHARS: usize = 256;
pub const MAX_TITLE_CHARS: usize = 256;
pub const MAX_DESCRIPTION_CHARS: usize = 2048;
pub const MAX_URL_CHARS: usize = 2048;
pub const MAX_CONTENT_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GuidelineId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReferenceId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RevisionId(pub Uuid);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_id!(CategoryId);
impl_id!(GuidelineId);
impl_id!(TagId);
impl_id!(ReferenceId);
impl_id!(RevisionId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidelineRecord {
    pub id: GuidelineId,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub category_id: CategoryId,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: TagId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub id: ReferenceId,
    pub guideline_id: GuidelineId,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub position: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionRecord {
    pub id: RevisionId,
    pub guideline_id: GuidelineId,
    pub sequence: u64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the explicit Guideline↔Tag join set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuidelineTagLink {
    pub guideline_id: GuidelineId,
    pub tag_id: TagId,
}

#[derive(Debug, Clone)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
}

#[derive(Debug, Clone)]
pub struct GuidelineDraft {
    pub title: String,
    pub content: String,
    pub category_id: CategoryId,
    pub tag_ids: Vec<TagId>,
    pub references: Vec<ReferenceDraft>,
    /// Pre-resolved slug, used by the importer. When absent the slug is
    /// derived from the title and resolved against all stored guidelines.
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GuidelinePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Option<Vec<TagId>>,
    pub references: Option<Vec<ReferenceDraft>>,
    /// When set, the update fails with a conflict unless the stored version
    /// matches. When unset the last write wins.
    pub expected_version: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDraft {
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TagDraft {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
}

impl CategoryDraft {
    pub fn validate(&self) -> TaxonomyResult<()> {
        validate_name(&self.name)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

impl CategoryPatch {
    pub fn validate(&self) -> TaxonomyResult<()> {
        if self.name.is_none() && self.description.is_none() && !self.clear_description {
            return Err(TaxonomyError::validation(
                "patch",
                "Category change requires a name or description",
            ));
        }
        if self.clear_description && self.description.is_some() {
            return Err(TaxonomyError::validation(
                "description",
                "Cannot clear and set the description in one change",
            ));
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

impl GuidelineDraft {
    pub fn validate(&self) -> TaxonomyResult<()> {
        validate_title(&self.title)?;
        validate_content(&self.content)?;
        for reference in &self.references {
            reference.validate()?;
        }
        if let Some(slug) = &self.slug {
            validate_explicit_slug(slug)?;
        }
        Ok(())
    }
}

impl GuidelinePatch {
    pub fn validate(&self) -> TaxonomyResult<()> {
        if self.title.is_none()
            && self.content.is_none()
            && self.category_id.is_none()
            && self.tag_ids.is_none()
            && self.references.is_none()
        {
            return Err(TaxonomyError::validation(
                "patch",
                "Guideline change requires a title, content, category, tags, or references",
            ));
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(content) = &self.content {
            validate_content(content)?;
        }
        if let Some(references) = &self.references {
            for reference in references {
                reference.validate()?;
            }
        }
        Ok(())
    }
}

impl ReferenceDraft {
    pub fn validate(&self) -> TaxonomyResult<()> {
        validate_title(&self.title)?;
        if let Some(url) = &self.url {
            validate_url(url)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

impl TagDraft {
    pub fn validate(&self) -> TaxonomyResult<()> {
        validate_name(&self.name)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

impl TagPatch {
    pub fn validate(&self) -> TaxonomyResult<()> {
        if self.name.is_none() && self.description.is_none() && !self.clear_description {
            return Err(TaxonomyError::validation(
                "patch",
                "Tag change requires a name or description",
            ));
        }
        if self.clear_description && self.description.is_some() {
            return Err(TaxonomyError::validation(
                "description",
                "Cannot clear and set the description in one change",
            ));
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_name(name: &str) -> TaxonomyResult<()> {
    if name.trim().is_empty() {
        return Err(TaxonomyError::validation("name", "Name is required"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(TaxonomyError::validation(
            "name",
            format!("Name must be at most {} characters", MAX_NAME_CHARS),
        ));
    }
    Ok(())
}

pub(crate) fn validate_title(title: &str) -> TaxonomyResult<()> {
    if title.trim().is_empty() {
        return Err(TaxonomyError::validation("title", "Title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(TaxonomyError::validation(
            "title",
            format!("Title must be at most {} characters", MAX_TITLE_CHARS),
        ));
    }
    Ok(())
}

pub(crate) fn validate_description(description: &str) -> TaxonomyResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(TaxonomyError::validation(
            "description",
            format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_CHARS
            ),
        ));
    }
    Ok(())
}

pub(crate) fn validate_url(url: &str) -> TaxonomyResult<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(TaxonomyError::validation(
            "url",
            "Reference URL must start with http:// or https://",
        ));
    }
    if url.chars().count() > MAX_URL_CHARS {
        return Err(TaxonomyError::validation(
            "url",
            format!("Reference URL must be at most {} characters", MAX_URL_CHARS),
        ));
    }
    Ok(())
}

pub(crate) fn validate_content(content: &str) -> TaxonomyResult<()> {
    if content.trim().is_empty() {
        return Err(TaxonomyError::validation("content", "Content is required"));
    }
    if content.len() > MAX_CONTENT_BYTES {
        return Err(TaxonomyError::validation(
            "content",
            format!("Content must be at most {} bytes", MAX_CONTENT_BYTES),
        ));
    }
    Ok(())
}

pub(crate) fn validate_explicit_slug(slug: &str) -> TaxonomyResult<()> {
    if slug.is_empty() {
        return Err(TaxonomyError::validation("slug", "Slug must not be empty"));
    }
    if slug::slugify(slug) != slug {
        return Err(TaxonomyError::validation(
            "slug",
            "Slug must be lowercase, hyphenated, and URL-safe",
        ));
    }
    Ok(())
}
