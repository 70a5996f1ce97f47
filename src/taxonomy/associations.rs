// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::collections::BTreeSet;

use super::store::TaxonomyState;
use super::{GuidelineId, GuidelineTagLink, TagId};

/// The links that actually changed during one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    pub connected: Vec<TagId>,
    pub disconnected: Vec<TagId>,
}

impl TagDelta {
    pub fn is_empty(&self) -> bool {
        self.connected.is_empty() && self.disconnected.is_empty()
    }
}

pub(crate) fn current_tags(state: &TaxonomyState, guideline_id: GuidelineId) -> BTreeSet<TagId> {
    state
        .guideline_tags
        .iter()
        .filter(|link| link.guideline_id == guideline_id)
        .map(|link| link.tag_id)
        .collect()
}

/// Move the guideline's tag set to `desired`, touching only the links that
/// differ from the current set. The result depends on `desired` alone, never
/// on the order earlier reconciles ran in.
pub(crate) fn reconcile(
    state: &mut TaxonomyState,
    guideline_id: GuidelineId,
    desired: &BTreeSet<TagId>,
) -> TagDelta {
    let current = current_tags(state, guideline_id);
    let connected: Vec<TagId> = desired.difference(&current).copied().collect();
    let disconnected: Vec<TagId> = current.difference(desired).copied().collect();

    for tag_id in &connected {
        state.guideline_tags.insert(GuidelineTagLink {
            guideline_id,
            tag_id: *tag_id,
        });
    }
    for tag_id in &disconnected {
        state.guideline_tags.remove(&GuidelineTagLink {
            guideline_id,
            tag_id: *tag_id,
        });
    }

    TagDelta {
        connected,
        disconnected,
    }
}
