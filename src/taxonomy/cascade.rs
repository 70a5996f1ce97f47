// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::store::TaxonomyState;
use super::{CategoryId, GuidelineId, TagId};

/// Counts of the rows a delete actually removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub guidelines: usize,
    pub references: usize,
    pub revisions: usize,
    pub associations: usize,
}

impl DeleteOutcome {
    fn absorb(&mut self, other: DeleteOutcome) {
        self.guidelines += other.guidelines;
        self.references += other.references;
        self.revisions += other.revisions;
        self.associations += other.associations;
    }
}

/// Remove one guideline and everything it owns. Children go first:
/// references and revisions, then the tag links, then the guideline row.
/// Tags themselves are never touched.
pub(crate) fn delete_guideline_tree(
    state: &mut TaxonomyState,
    guideline_id: GuidelineId,
) -> DeleteOutcome {
    let mut outcome = DeleteOutcome::default();

    let before = state.references.len();
    state
        .references
        .retain(|_, record| record.guideline_id != guideline_id);
    outcome.references = before - state.references.len();

    let before = state.revisions.len();
    state
        .revisions
        .retain(|_, record| record.guideline_id != guideline_id);
    outcome.revisions = before - state.revisions.len();

    let before = state.guideline_tags.len();
    state
        .guideline_tags
        .retain(|link| link.guideline_id != guideline_id);
    outcome.associations = before - state.guideline_tags.len();

    if state.guidelines.remove(&guideline_id).is_some() {
        outcome.guidelines = 1;
    }
    outcome
}

/// Remove a category, cascading through each of its guidelines before the
/// category row itself goes away.
pub(crate) fn delete_category_tree(
    state: &mut TaxonomyState,
    category_id: CategoryId,
) -> DeleteOutcome {
    let owned: Vec<GuidelineId> = state
        .guidelines
        .iter()
        .filter(|(_, record)| record.category_id == category_id)
        .map(|(id, _)| *id)
        .collect();

    let mut outcome = DeleteOutcome::default();
    for guideline_id in owned {
        outcome.absorb(delete_guideline_tree(state, guideline_id));
    }
    state.categories.remove(&category_id);
    outcome
}

/// Deleting a tag only severs its links; guidelines, references, and
/// revisions stay untouched.
pub(crate) fn detach_tag(state: &mut TaxonomyState, tag_id: TagId) -> usize {
    let before = state.guideline_tags.len();
    state.guideline_tags.retain(|link| link.tag_id != tag_id);
    before - state.guideline_tags.len()
}
