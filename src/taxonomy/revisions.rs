// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};

use super::store::TaxonomyState;
use super::{GuidelineId, RevisionId, RevisionRecord};

/// Append a snapshot of the content a guideline update is superseding.
/// Sequence numbers are per guideline and strictly increasing; rows are
/// never edited afterwards.
pub(crate) fn append(
    state: &mut TaxonomyState,
    guideline_id: GuidelineId,
    prior_content: String,
    now: DateTime<Utc>,
) -> RevisionRecord {
    let sequence = state
        .revisions
        .values()
        .filter(|record| record.guideline_id == guideline_id)
        .map(|record| record.sequence)
        .max()
        .unwrap_or(0)
        + 1;
    let record = RevisionRecord {
        id: RevisionId::generate(),
        guideline_id,
        sequence,
        content: prior_content,
        created_at: now,
    };
    state.revisions.insert(record.id, record.clone());
    record
}

/// Revisions of one guideline, newest first.
pub(crate) fn list(state: &TaxonomyState, guideline_id: GuidelineId) -> Vec<RevisionRecord> {
    let mut revisions: Vec<RevisionRecord> = state
        .revisions
        .values()
        .filter(|record| record.guideline_id == guideline_id)
        .cloned()
        .collect();
    revisions.sort_by(|a, b| b.sequence.cmp(&a.sequence));
    revisions
}
