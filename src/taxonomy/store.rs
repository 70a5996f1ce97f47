// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::security;
use crate::yaml_store;

use super::associations::{self, TagDelta};
use super::cascade::{self, DeleteOutcome};
use super::errors::{TaxonomyError, TaxonomyResult};
use super::revisions;
use super::slug::{SlugScope, slugify};
use super::{
    CategoryDraft, CategoryId, CategoryPatch, CategoryRecord, GuidelineDraft, GuidelineId,
    GuidelinePatch, GuidelineRecord, GuidelineTagLink, ReferenceDraft, ReferenceId,
    ReferenceRecord, RevisionId, RevisionRecord, TagDraft, TagId, TagPatch, TagRecord,
};

const STATE_FILE_NAME: &str = "taxonomy.yaml";

/// Every collection lives in one document so a multi-entity transaction
/// commits with a single atomic replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TaxonomyState {
    #[serde(default)]
    pub(crate) categories: BTreeMap<CategoryId, CategoryRecord>,
    #[serde(default)]
    pub(crate) guidelines: BTreeMap<GuidelineId, GuidelineRecord>,
    #[serde(default)]
    pub(crate) tags: BTreeMap<TagId, TagRecord>,
    #[serde(default)]
    pub(crate) references: BTreeMap<ReferenceId, ReferenceRecord>,
    #[serde(default)]
    pub(crate) revisions: BTreeMap<RevisionId, RevisionRecord>,
    #[serde(default)]
    pub(crate) guideline_tags: BTreeSet<GuidelineTagLink>,
}

/// A guideline together with its category, tags, and references.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidelineDetail {
    pub guideline: GuidelineRecord,
    pub category: CategoryRecord,
    pub tags: Vec<TagRecord>,
    pub references: Vec<ReferenceRecord>,
}

/// Everything one guideline update produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidelineUpdate {
    pub guideline: GuidelineRecord,
    pub revision: Option<RevisionRecord>,
    pub tag_delta: TagDelta,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GuidelineFilter {
    pub category_id: Option<CategoryId>,
    pub tag_id: Option<TagId>,
}

#[derive(Debug)]
pub struct TaxonomyStore {
    state_file: PathBuf,
    state: RwLock<TaxonomyState>,
}

impl TaxonomyStore {
    pub fn open(state_sys_dir: &Path) -> TaxonomyResult<Self> {
        let state_file = security::resolve_state_file(STATE_FILE_NAME, state_sys_dir)
            .map_err(|err| TaxonomyError::storage(format!("Invalid taxonomy state path: {}", err)))?;
        let state = Self::load_from_disk(&state_file)?;
        Ok(Self {
            state_file,
            state: RwLock::new(state),
        })
    }

    fn load_from_disk(state_file: &Path) -> TaxonomyResult<TaxonomyState> {
        let raw: Option<TaxonomyState> = yaml_store::read_document(state_file, "taxonomy state")
            .map_err(|err| TaxonomyError::storage(err.to_string()))?;
        match raw {
            Some(state) => normalize(state),
            None => Ok(TaxonomyState::default()),
        }
    }

    fn read<T>(&self, op: impl FnOnce(&TaxonomyState) -> T) -> TaxonomyResult<T> {
        let guard = self
            .state
            .read()
            .map_err(|_| TaxonomyError::storage("Taxonomy store lock poisoned"))?;
        Ok(op(&guard))
    }

    /// Run one transaction. The mutation works on a scratch copy; only a
    /// fully successful run is persisted and swapped in, and a no-op run is
    /// not written at all. The write lock is held end to end so concurrent
    /// writers serialize against the committed state.
    pub(crate) fn mutate<T>(
        &self,
        op: impl FnOnce(&mut TaxonomyState) -> TaxonomyResult<T>,
    ) -> TaxonomyResult<T> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| TaxonomyError::storage("Taxonomy store lock poisoned"))?;
        let mut scratch = guard.clone();
        let outcome = op(&mut scratch)?;
        if scratch != *guard {
            yaml_store::write_document(&self.state_file, "taxonomy state", &scratch)
                .map_err(|err| TaxonomyError::storage(err.to_string()))?;
            *guard = scratch;
        }
        Ok(outcome)
    }

    // --- categories ---

    pub fn create_category(&self, draft: CategoryDraft) -> TaxonomyResult<CategoryRecord> {
        draft.validate()?;
        self.mutate(move |state| {
            let base = slugify(&draft.name);
            if base.is_empty() {
                return Err(TaxonomyError::validation(
                    "name",
                    "Category name must contain at least one letter or digit",
                ));
            }
            let mut scope = SlugScope::seeded(state.categories.values().map(|c| c.slug.clone()));
            let slug = scope.claim(&base);
            if state.categories.values().any(|c| c.slug == slug) {
                return Err(TaxonomyError::conflict(format!(
                    "Category slug '{}' already exists",
                    slug
                )));
            }
            let now = Utc::now();
            let record = CategoryRecord {
                id: CategoryId::generate(),
                name: draft.name,
                slug,
                description: draft.description,
                created_at: now,
                updated_at: now,
            };
            state.categories.insert(record.id, record.clone());
            Ok(record)
        })
    }

    pub fn get_category(&self, id: CategoryId) -> TaxonomyResult<CategoryRecord> {
        self.read(|state| state.categories.get(&id).cloned())?
            .ok_or_else(|| TaxonomyError::not_found(format!("Category {} not found", id)))
    }

    pub fn category_by_slug(&self, slug: &str) -> TaxonomyResult<CategoryRecord> {
        self.read(|state| {
            state
                .categories
                .values()
                .find(|record| record.slug == slug)
                .cloned()
        })?
        .ok_or_else(|| TaxonomyError::not_found(format!("Category '{}' not found", slug)))
    }

    pub fn list_categories(&self) -> TaxonomyResult<Vec<CategoryRecord>> {
        self.read(|state| {
            let mut categories: Vec<CategoryRecord> =
                state.categories.values().cloned().collect();
            categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug)));
            categories
        })
    }

    /// Names and descriptions can change; the slug was assigned at creation
    /// and survives renames.
    pub fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> TaxonomyResult<CategoryRecord> {
        patch.validate()?;
        self.mutate(move |state| {
            let record = state
                .categories
                .get_mut(&id)
                .ok_or_else(|| TaxonomyError::not_found(format!("Category {} not found", id)))?;
            let mut changed = false;
            if let Some(name) = patch.name
                && name != record.name
            {
                record.name = name;
                changed = true;
            }
            if patch.clear_description && record.description.is_some() {
                record.description = None;
                changed = true;
            }
            if let Some(description) = patch.description
                && record.description.as_deref() != Some(description.as_str())
            {
                record.description = Some(description);
                changed = true;
            }
            if changed {
                record.updated_at = Utc::now();
            }
            Ok(record.clone())
        })
    }

    pub fn delete_category(&self, id: CategoryId) -> TaxonomyResult<DeleteOutcome> {
        let outcome = self.mutate(move |state| {
            if !state.categories.contains_key(&id) {
                return Err(TaxonomyError::not_found(format!(
                    "Category {} not found",
                    id
                )));
            }
            Ok(cascade::delete_category_tree(state, id))
        })?;
        info!(
            "Deleted category {} ({} guidelines, {} references, {} revisions, {} tag links)",
            id, outcome.guidelines, outcome.references, outcome.revisions, outcome.associations
        );
        Ok(outcome)
    }

    // --- guidelines ---

    pub fn create_guideline(&self, draft: GuidelineDraft) -> TaxonomyResult<GuidelineRecord> {
        draft.validate()?;
        self.mutate(move |state| {
            if !state.categories.contains_key(&draft.category_id) {
                return Err(TaxonomyError::not_found(format!(
                    "Category {} not found",
                    draft.category_id
                )));
            }
            let mut desired: BTreeSet<TagId> = BTreeSet::new();
            for tag_id in &draft.tag_ids {
                if !state.tags.contains_key(tag_id) {
                    return Err(TaxonomyError::not_found(format!("Tag {} not found", tag_id)));
                }
                desired.insert(*tag_id);
            }

            let slug = match &draft.slug {
                Some(explicit) => {
                    if state.guidelines.values().any(|g| g.slug == *explicit) {
                        return Err(TaxonomyError::conflict(format!(
                            "Guideline slug '{}' already exists",
                            explicit
                        )));
                    }
                    explicit.clone()
                }
                None => {
                    let base = slugify(&draft.title);
                    if base.is_empty() {
                        return Err(TaxonomyError::validation(
                            "title",
                            "Guideline title must contain at least one letter or digit",
                        ));
                    }
                    let mut scope =
                        SlugScope::seeded(state.guidelines.values().map(|g| g.slug.clone()));
                    let slug = scope.claim(&base);
                    // the stored set stays the final authority
                    if state.guidelines.values().any(|g| g.slug == slug) {
                        return Err(TaxonomyError::conflict(format!(
                            "Guideline slug '{}' already exists",
                            slug
                        )));
                    }
                    slug
                }
            };

            let now = Utc::now();
            let record = GuidelineRecord {
                id: GuidelineId::generate(),
                title: draft.title,
                content: draft.content,
                slug,
                category_id: draft.category_id,
                version: 1,
                created_at: now,
                updated_at: now,
            };
            state.guidelines.insert(record.id, record.clone());
            for tag_id in desired {
                state.guideline_tags.insert(GuidelineTagLink {
                    guideline_id: record.id,
                    tag_id,
                });
            }
            replace_references(state, record.id, draft.references, now);
            Ok(record)
        })
    }

    pub fn get_guideline(&self, id: GuidelineId) -> TaxonomyResult<GuidelineRecord> {
        self.read(|state| state.guidelines.get(&id).cloned())?
            .ok_or_else(|| TaxonomyError::not_found(format!("Guideline {} not found", id)))
    }

    pub fn guideline_by_slug(&self, slug: &str) -> TaxonomyResult<GuidelineRecord> {
        self.read(|state| {
            state
                .guidelines
                .values()
                .find(|record| record.slug == slug)
                .cloned()
        })?
        .ok_or_else(|| TaxonomyError::not_found(format!("Guideline '{}' not found", slug)))
    }

    pub fn guideline_detail(&self, id: GuidelineId) -> TaxonomyResult<GuidelineDetail> {
        self.read(|state| {
            let guideline = state
                .guidelines
                .get(&id)
                .cloned()
                .ok_or_else(|| TaxonomyError::not_found(format!("Guideline {} not found", id)))?;
            let category = state
                .categories
                .get(&guideline.category_id)
                .cloned()
                .ok_or_else(|| {
                    TaxonomyError::storage(format!(
                        "Guideline {} references missing category {}",
                        id, guideline.category_id
                    ))
                })?;
            let mut tags: Vec<TagRecord> = state
                .guideline_tags
                .iter()
                .filter(|link| link.guideline_id == id)
                .filter_map(|link| state.tags.get(&link.tag_id).cloned())
                .collect();
            tags.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(GuidelineDetail {
                guideline,
                category,
                tags,
                references: references_of(state, id),
            })
        })?
    }

    pub fn list_guidelines(&self, filter: GuidelineFilter) -> TaxonomyResult<Vec<GuidelineRecord>> {
        self.read(|state| {
            let mut guidelines: Vec<GuidelineRecord> = state
                .guidelines
                .values()
                .filter(|record| match filter.category_id {
                    Some(category_id) => record.category_id == category_id,
                    None => true,
                })
                .filter(|record| match filter.tag_id {
                    Some(tag_id) => state.guideline_tags.contains(&GuidelineTagLink {
                        guideline_id: record.id,
                        tag_id,
                    }),
                    None => true,
                })
                .cloned()
                .collect();
            guidelines.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.slug.cmp(&b.slug)));
            guidelines
        })
    }

    /// Apply a patch. A content change snapshots the superseded content into
    /// the revision log before the new value lands; tag changes go through
    /// the reconcile delta; a references patch replaces the set. The version
    /// counter only moves when something actually changed.
    pub fn update_guideline(
        &self,
        id: GuidelineId,
        patch: GuidelinePatch,
    ) -> TaxonomyResult<GuidelineUpdate> {
        patch.validate()?;
        self.mutate(move |state| {
            let current = state
                .guidelines
                .get(&id)
                .cloned()
                .ok_or_else(|| TaxonomyError::not_found(format!("Guideline {} not found", id)))?;
            if let Some(expected) = patch.expected_version
                && expected != current.version
            {
                return Err(TaxonomyError::conflict(format!(
                    "Guideline {} is at version {}, expected {}",
                    id, current.version, expected
                )));
            }
            if let Some(category_id) = patch.category_id
                && !state.categories.contains_key(&category_id)
            {
                return Err(TaxonomyError::integrity(format!(
                    "Cannot assign guideline {} to missing category {}",
                    id, category_id
                )));
            }
            let desired = match &patch.tag_ids {
                Some(tag_ids) => {
                    let mut desired: BTreeSet<TagId> = BTreeSet::new();
                    for tag_id in tag_ids {
                        if !state.tags.contains_key(tag_id) {
                            return Err(TaxonomyError::not_found(format!(
                                "Tag {} not found",
                                tag_id
                            )));
                        }
                        desired.insert(*tag_id);
                    }
                    Some(desired)
                }
                None => None,
            };

            let now = Utc::now();
            let mut record = current;
            let mut changed = false;
            let mut revision = None;

            if let Some(title) = patch.title
                && title != record.title
            {
                record.title = title;
                changed = true;
            }
            if let Some(content) = patch.content
                && content != record.content
            {
                // the revision records what is being superseded
                revision = Some(revisions::append(state, id, record.content.clone(), now));
                record.content = content;
                changed = true;
            }
            if let Some(category_id) = patch.category_id
                && category_id != record.category_id
            {
                record.category_id = category_id;
                changed = true;
            }
            let tag_delta = match desired {
                Some(desired) => associations::reconcile(state, id, &desired),
                None => TagDelta::default(),
            };
            if !tag_delta.is_empty() {
                changed = true;
            }
            if let Some(reference_drafts) = patch.references {
                let existing: Vec<ReferenceDraft> = references_of(state, id)
                    .into_iter()
                    .map(|record| ReferenceDraft {
                        title: record.title,
                        url: record.url,
                        description: record.description,
                    })
                    .collect();
                if existing != reference_drafts {
                    state.references.retain(|_, record| record.guideline_id != id);
                    replace_references(state, id, reference_drafts, now);
                    changed = true;
                }
            }

            if changed {
                record.version += 1;
                record.updated_at = now;
                state.guidelines.insert(id, record.clone());
            }
            Ok(GuidelineUpdate {
                guideline: record,
                revision,
                tag_delta,
            })
        })
    }

    /// Move the guideline's tag set to exactly `desired_tag_ids`.
    pub fn reconcile_tags(
        &self,
        id: GuidelineId,
        desired_tag_ids: &[TagId],
    ) -> TaxonomyResult<TagDelta> {
        let desired_tag_ids = desired_tag_ids.to_vec();
        self.mutate(move |state| {
            if !state.guidelines.contains_key(&id) {
                return Err(TaxonomyError::not_found(format!(
                    "Guideline {} not found",
                    id
                )));
            }
            let mut desired: BTreeSet<TagId> = BTreeSet::new();
            for tag_id in &desired_tag_ids {
                if !state.tags.contains_key(tag_id) {
                    return Err(TaxonomyError::not_found(format!("Tag {} not found", tag_id)));
                }
                desired.insert(*tag_id);
            }
            Ok(associations::reconcile(state, id, &desired))
        })
    }

    pub fn delete_guideline(&self, id: GuidelineId) -> TaxonomyResult<DeleteOutcome> {
        let outcome = self.mutate(move |state| {
            if !state.guidelines.contains_key(&id) {
                return Err(TaxonomyError::not_found(format!(
                    "Guideline {} not found",
                    id
                )));
            }
            Ok(cascade::delete_guideline_tree(state, id))
        })?;
        info!(
            "Deleted guideline {} ({} references, {} revisions, {} tag links)",
            id, outcome.references, outcome.revisions, outcome.associations
        );
        Ok(outcome)
    }

    // --- tags ---

    pub fn create_tag(&self, draft: TagDraft) -> TaxonomyResult<TagRecord> {
        draft.validate()?;
        self.mutate(move |state| {
            if state.tags.values().any(|t| t.name == draft.name) {
                return Err(TaxonomyError::conflict(format!(
                    "Tag name '{}' already exists",
                    draft.name
                )));
            }
            let base = slugify(&draft.name);
            if base.is_empty() {
                return Err(TaxonomyError::validation(
                    "name",
                    "Tag name must contain at least one letter or digit",
                ));
            }
            let mut scope = SlugScope::seeded(state.tags.values().map(|t| t.slug.clone()));
            let slug = scope.claim(&base);
            if state.tags.values().any(|t| t.slug == slug) {
                return Err(TaxonomyError::conflict(format!(
                    "Tag slug '{}' already exists",
                    slug
                )));
            }
            let now = Utc::now();
            let record = TagRecord {
                id: TagId::generate(),
                name: draft.name,
                slug,
                description: draft.description,
                created_at: now,
                updated_at: now,
            };
            state.tags.insert(record.id, record.clone());
            Ok(record)
        })
    }

    pub fn get_tag(&self, id: TagId) -> TaxonomyResult<TagRecord> {
        self.read(|state| state.tags.get(&id).cloned())?
            .ok_or_else(|| TaxonomyError::not_found(format!("Tag {} not found", id)))
    }

    pub fn tag_by_slug(&self, slug: &str) -> TaxonomyResult<TagRecord> {
        self.read(|state| {
            state
                .tags
                .values()
                .find(|record| record.slug == slug)
                .cloned()
        })?
        .ok_or_else(|| TaxonomyError::not_found(format!("Tag '{}' not found", slug)))
    }

    pub fn list_tags(&self) -> TaxonomyResult<Vec<TagRecord>> {
        self.read(|state| {
            let mut tags: Vec<TagRecord> = state.tags.values().cloned().collect();
            tags.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug)));
            tags
        })
    }

    pub fn update_tag(&self, id: TagId, patch: TagPatch) -> TaxonomyResult<TagRecord> {
        patch.validate()?;
        self.mutate(move |state| {
            if !state.tags.contains_key(&id) {
                return Err(TaxonomyError::not_found(format!("Tag {} not found", id)));
            }
            if let Some(name) = &patch.name
                && state.tags.values().any(|t| t.id != id && t.name == *name)
            {
                return Err(TaxonomyError::conflict(format!(
                    "Tag name '{}' already exists",
                    name
                )));
            }
            let record = state
                .tags
                .get_mut(&id)
                .ok_or_else(|| TaxonomyError::not_found(format!("Tag {} not found", id)))?;
            let mut changed = false;
            if let Some(name) = patch.name
                && name != record.name
            {
                record.name = name;
                changed = true;
            }
            if patch.clear_description && record.description.is_some() {
                record.description = None;
                changed = true;
            }
            if let Some(description) = patch.description
                && record.description.as_deref() != Some(description.as_str())
            {
                record.description = Some(description);
                changed = true;
            }
            if changed {
                record.updated_at = Utc::now();
            }
            Ok(record.clone())
        })
    }

    pub fn delete_tag(&self, id: TagId) -> TaxonomyResult<DeleteOutcome> {
        let outcome = self.mutate(move |state| {
            if state.tags.remove(&id).is_none() {
                return Err(TaxonomyError::not_found(format!("Tag {} not found", id)));
            }
            Ok(DeleteOutcome {
                associations: cascade::detach_tag(state, id),
                ..DeleteOutcome::default()
            })
        })?;
        info!("Deleted tag {} ({} tag links)", id, outcome.associations);
        Ok(outcome)
    }

    // --- revisions and references ---

    pub fn list_revisions(&self, guideline_id: GuidelineId) -> TaxonomyResult<Vec<RevisionRecord>> {
        self.read(|state| {
            if !state.guidelines.contains_key(&guideline_id) {
                return Err(TaxonomyError::not_found(format!(
                    "Guideline {} not found",
                    guideline_id
                )));
            }
            Ok(revisions::list(state, guideline_id))
        })?
    }

    pub fn list_references(
        &self,
        guideline_id: GuidelineId,
    ) -> TaxonomyResult<Vec<ReferenceRecord>> {
        self.read(|state| {
            if !state.guidelines.contains_key(&guideline_id) {
                return Err(TaxonomyError::not_found(format!(
                    "Guideline {} not found",
                    guideline_id
                )));
            }
            Ok(references_of(state, guideline_id))
        })?
    }
}

fn references_of(state: &TaxonomyState, guideline_id: GuidelineId) -> Vec<ReferenceRecord> {
    let mut references: Vec<ReferenceRecord> = state
        .references
        .values()
        .filter(|record| record.guideline_id == guideline_id)
        .cloned()
        .collect();
    references.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
    references
}

fn replace_references(
    state: &mut TaxonomyState,
    guideline_id: GuidelineId,
    drafts: Vec<ReferenceDraft>,
    now: DateTime<Utc>,
) {
    for (position, draft) in drafts.into_iter().enumerate() {
        let record = ReferenceRecord {
            id: ReferenceId::generate(),
            guideline_id,
            title: draft.title,
            url: draft.url,
            description: draft.description,
            position: position as u32,
            created_at: now,
            updated_at: now,
        };
        state.references.insert(record.id, record);
    }
}

/// Reject a state document whose keys, foreign keys, or unique columns do
/// not line up. A file that fails here was edited or corrupted outside the
/// store.
fn normalize(state: TaxonomyState) -> TaxonomyResult<TaxonomyState> {
    for (id, record) in &state.categories {
        if *id != record.id {
            return Err(TaxonomyError::storage(format!(
                "Category key {} does not match record id {}",
                id, record.id
            )));
        }
    }
    for (id, record) in &state.guidelines {
        if *id != record.id {
            return Err(TaxonomyError::storage(format!(
                "Guideline key {} does not match record id {}",
                id, record.id
            )));
        }
        if !state.categories.contains_key(&record.category_id) {
            return Err(TaxonomyError::storage(format!(
                "Guideline {} references missing category {}",
                id, record.category_id
            )));
        }
    }
    for (id, record) in &state.tags {
        if *id != record.id {
            return Err(TaxonomyError::storage(format!(
                "Tag key {} does not match record id {}",
                id, record.id
            )));
        }
    }
    for (id, record) in &state.references {
        if *id != record.id {
            return Err(TaxonomyError::storage(format!(
                "Reference key {} does not match record id {}",
                id, record.id
            )));
        }
        if !state.guidelines.contains_key(&record.guideline_id) {
            return Err(TaxonomyError::storage(format!(
                "Reference {} references missing guideline {}",
                id, record.guideline_id
            )));
        }
    }
    for (id, record) in &state.revisions {
        if *id != record.id {
            return Err(TaxonomyError::storage(format!(
                "Revision key {} does not match record id {}",
                id, record.id
            )));
        }
        if !state.guidelines.contains_key(&record.guideline_id) {
            return Err(TaxonomyError::storage(format!(
                "Revision {} references missing guideline {}",
                id, record.guideline_id
            )));
        }
    }
    for link in &state.guideline_tags {
        if !state.guidelines.contains_key(&link.guideline_id)
            || !state.tags.contains_key(&link.tag_id)
        {
            return Err(TaxonomyError::storage(format!(
                "Tag link {} -> {} references a missing row",
                link.guideline_id, link.tag_id
            )));
        }
    }

    let mut category_slugs = BTreeSet::new();
    for record in state.categories.values() {
        if !category_slugs.insert(record.slug.as_str()) {
            return Err(TaxonomyError::storage(format!(
                "Duplicate category slug '{}'",
                record.slug
            )));
        }
    }
    let mut guideline_slugs = BTreeSet::new();
    for record in state.guidelines.values() {
        if !guideline_slugs.insert(record.slug.as_str()) {
            return Err(TaxonomyError::storage(format!(
                "Duplicate guideline slug '{}'",
                record.slug
            )));
        }
    }
    let mut tag_names = BTreeSet::new();
    let mut tag_slugs = BTreeSet::new();
    for record in state.tags.values() {
        if !tag_names.insert(record.name.as_str()) {
            return Err(TaxonomyError::storage(format!(
                "Duplicate tag name '{}'",
                record.name
            )));
        }
        if !tag_slugs.insert(record.slug.as_str()) {
            return Err(TaxonomyError::storage(format!(
                "Duplicate tag slug '{}'",
                record.slug
            )));
        }
    }

    Ok(state)
}
