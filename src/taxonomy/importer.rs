// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::errors::{TaxonomyError, TaxonomyResult};
use super::slug::{SlugScope, slugify};
use super::store::{TaxonomyState, TaxonomyStore};
use super::{
    CategoryId, CategoryRecord, GuidelineId, GuidelineRecord, GuidelineTagLink, ReferenceId,
    ReferenceRecord, TagId, TagRecord, validate_content, validate_description, validate_name,
    validate_title, validate_url,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportFile {
    #[serde(default)]
    pub categories: Vec<ImportCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub guidelines: Vec<ImportGuideline>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportGuideline {
    pub title: String,
    pub content: String,
    /// Tag names, resolved against stored tags and created on first use.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub references: Vec<ImportReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportReference {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories: usize,
    pub guidelines: usize,
    pub tags_created: usize,
    pub tags_linked: usize,
    pub references: usize,
}

pub fn load_import_file(path: &Path) -> TaxonomyResult<ImportFile> {
    let raw = fs::read_to_string(path).map_err(|err| {
        TaxonomyError::storage(format!(
            "Failed to read import file {}: {}",
            path.display(),
            err
        ))
    })?;
    serde_yaml::from_str(&raw).map_err(|err| {
        TaxonomyError::validation("file", format!("Failed to parse import file: {}", err))
    })
}

impl ImportFile {
    fn entry_count(&self) -> usize {
        let mut entries = self.categories.len();
        for category in &self.categories {
            entries += category.guidelines.len();
            for guideline in &category.guidelines {
                entries += guideline.tags.len() + guideline.references.len();
            }
        }
        entries
    }
}

impl TaxonomyStore {
    /// Import a batch of categories with nested guidelines in one
    /// transaction: a failure on any entry rolls the whole batch back.
    ///
    /// Slug scopes are seeded from the stored slugs and shared across the
    /// batch, so repeated titles number from -2 upward in submission order
    /// regardless of which category they sit in.
    pub fn import_batch(
        &self,
        batch: &ImportFile,
        max_entries: usize,
    ) -> TaxonomyResult<ImportSummary> {
        let entries = batch.entry_count();
        if entries > max_entries {
            return Err(TaxonomyError::validation(
                "file",
                format!(
                    "Import holds {} entries, more than the configured limit of {}",
                    entries, max_entries
                ),
            ));
        }

        let summary = self.mutate(|state| {
            let mut summary = ImportSummary::default();
            let now = Utc::now();
            let mut category_scope =
                SlugScope::seeded(state.categories.values().map(|c| c.slug.clone()));
            let mut guideline_scope =
                SlugScope::seeded(state.guidelines.values().map(|g| g.slug.clone()));
            let mut tag_scope = SlugScope::seeded(state.tags.values().map(|t| t.slug.clone()));

            for category in &batch.categories {
                let category_id = import_category(state, category, &mut category_scope, now)?;
                summary.categories += 1;

                for guideline in &category.guidelines {
                    let guideline_id = import_guideline(
                        state,
                        category_id,
                        guideline,
                        &mut guideline_scope,
                        now,
                    )?;
                    summary.guidelines += 1;

                    let mut linked: BTreeSet<TagId> = BTreeSet::new();
                    for tag_name in &guideline.tags {
                        let (tag_id, created) =
                            resolve_tag(state, tag_name, &mut tag_scope, now)?;
                        if created {
                            summary.tags_created += 1;
                        }
                        if linked.insert(tag_id) {
                            state.guideline_tags.insert(GuidelineTagLink {
                                guideline_id,
                                tag_id,
                            });
                            summary.tags_linked += 1;
                        }
                    }

                    for (position, reference) in guideline.references.iter().enumerate() {
                        import_reference(state, guideline_id, reference, position as u32, now)?;
                        summary.references += 1;
                    }
                }
            }
            Ok(summary)
        })?;

        info!(
            "Imported {} categories, {} guidelines, {} references; created {} tags, linked {}",
            summary.categories,
            summary.guidelines,
            summary.references,
            summary.tags_created,
            summary.tags_linked
        );
        Ok(summary)
    }
}

fn import_category(
    state: &mut TaxonomyState,
    category: &ImportCategory,
    scope: &mut SlugScope,
    now: chrono::DateTime<Utc>,
) -> TaxonomyResult<CategoryId> {
    validate_name(&category.name)?;
    if let Some(description) = &category.description {
        validate_description(description)?;
    }
    let base = slugify(&category.name);
    if base.is_empty() {
        return Err(TaxonomyError::validation(
            "name",
            "Category name must contain at least one letter or digit",
        ));
    }
    let slug = scope.claim(&base);
    if state.categories.values().any(|c| c.slug == slug) {
        return Err(TaxonomyError::conflict(format!(
            "Category slug '{}' already exists",
            slug
        )));
    }
    let record = CategoryRecord {
        id: CategoryId::generate(),
        name: category.name.clone(),
        slug,
        description: category.description.clone(),
        created_at: now,
        updated_at: now,
    };
    let id = record.id;
    state.categories.insert(id, record);
    Ok(id)
}

fn import_guideline(
    state: &mut TaxonomyState,
    category_id: CategoryId,
    guideline: &ImportGuideline,
    scope: &mut SlugScope,
    now: chrono::DateTime<Utc>,
) -> TaxonomyResult<GuidelineId> {
    validate_title(&guideline.title)?;
    validate_content(&guideline.content)?;
    let base = slugify(&guideline.title);
    if base.is_empty() {
        return Err(TaxonomyError::validation(
            "title",
            "Guideline title must contain at least one letter or digit",
        ));
    }
    let slug = scope.claim(&base);
    if state.guidelines.values().any(|g| g.slug == slug) {
        return Err(TaxonomyError::conflict(format!(
            "Guideline slug '{}' already exists",
            slug
        )));
    }
    let record = GuidelineRecord {
        id: GuidelineId::generate(),
        title: guideline.title.clone(),
        content: guideline.content.clone(),
        slug,
        category_id,
        version: 1,
        created_at: now,
        updated_at: now,
    };
    let id = record.id;
    state.guidelines.insert(id, record);
    Ok(id)
}

fn resolve_tag(
    state: &mut TaxonomyState,
    name: &str,
    scope: &mut SlugScope,
    now: chrono::DateTime<Utc>,
) -> TaxonomyResult<(TagId, bool)> {
    let name = name.trim();
    validate_name(name)?;
    if let Some(existing) = state.tags.values().find(|t| t.name == name) {
        return Ok((existing.id, false));
    }
    let base = slugify(name);
    if base.is_empty() {
        return Err(TaxonomyError::validation(
            "name",
            "Tag name must contain at least one letter or digit",
        ));
    }
    let slug = scope.claim(&base);
    if state.tags.values().any(|t| t.slug == slug) {
        return Err(TaxonomyError::conflict(format!(
            "Tag slug '{}' already exists",
            slug
        )));
    }
    let record = TagRecord {
        id: TagId::generate(),
        name: name.to_string(),
        slug,
        description: None,
        created_at: now,
        updated_at: now,
    };
    let id = record.id;
    state.tags.insert(id, record);
    Ok((id, true))
}

fn import_reference(
    state: &mut TaxonomyState,
    guideline_id: GuidelineId,
    reference: &ImportReference,
    position: u32,
    now: chrono::DateTime<Utc>,
) -> TaxonomyResult<()> {
    validate_title(&reference.title)?;
    if let Some(url) = &reference.url {
        validate_url(url)?;
    }
    if let Some(description) = &reference.description {
        validate_description(description)?;
    }
    let record = ReferenceRecord {
        id: ReferenceId::generate(),
        guideline_id,
        title: reference.title.clone(),
        url: reference.url.clone(),
        description: reference.description.clone(),
        position,
        created_at: now,
        updated_at: now,
    };
    state.references.insert(record.id, record);
    Ok(())
}
