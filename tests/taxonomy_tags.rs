// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use common::TestHarness;
use std::fs;
use vademecum::taxonomy::{TagDraft, TagId, TagPatch, TaxonomyErrorKind};

#[test]
fn tag_slugs_follow_the_shared_numbering() {
    let harness = TestHarness::new("tags-slugs");
    let first = harness.tag("Flu Care!");
    let second = harness.tag("flu care");

    assert_eq!(first.slug, "flu-care");
    assert_eq!(second.slug, "flu-care-2");
}

#[test]
fn duplicate_tag_names_conflict() {
    let harness = TestHarness::new("tags-duplicate-name");
    harness.tag("pediatric");
    let err = harness
        .store
        .create_tag(TagDraft {
            name: "pediatric".to_string(),
            description: None,
        })
        .unwrap_err();
    assert_eq!(err.kind(), TaxonomyErrorKind::Conflict);
    assert_eq!(harness.store.list_tags().expect("list tags").len(), 1);
}

#[test]
fn rename_keeps_the_slug_and_rejects_collisions() {
    let harness = TestHarness::new("tags-rename");
    let chronic = harness.tag("chronic");
    harness.tag("acute");

    let renamed = harness
        .store
        .update_tag(
            chronic.id,
            TagPatch {
                name: Some("long-term".to_string()),
                ..TagPatch::default()
            },
        )
        .expect("rename tag");
    assert_eq!(renamed.name, "long-term");
    assert_eq!(renamed.slug, "chronic");

    let err = harness
        .store
        .update_tag(
            chronic.id,
            TagPatch {
                name: Some("acute".to_string()),
                ..TagPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), TaxonomyErrorKind::Conflict);
}

#[test]
fn reconcile_applies_the_minimal_delta() {
    let harness = TestHarness::new("tags-reconcile-delta");
    let category = harness.category("Cardiology");
    let guideline = harness.guideline(&category, "Heart Failure");
    let a = harness.tag("adult");
    let b = harness.tag("chronic");
    let c = harness.tag("urgent");

    let first = harness
        .store
        .reconcile_tags(guideline.id, &[a.id, b.id])
        .expect("first reconcile");
    assert_eq!(first.connected.len(), 2);
    assert!(first.disconnected.is_empty());

    let second = harness
        .store
        .reconcile_tags(guideline.id, &[b.id, c.id])
        .expect("second reconcile");
    assert_eq!(second.connected, vec![c.id]);
    assert_eq!(second.disconnected, vec![a.id]);

    let detail = harness
        .store
        .guideline_detail(guideline.id)
        .expect("detail");
    let mut tag_ids: Vec<TagId> = detail.tags.iter().map(|tag| tag.id).collect();
    tag_ids.sort();
    let mut expected = vec![b.id, c.id];
    expected.sort();
    assert_eq!(tag_ids, expected);
}

#[test]
fn repeated_reconcile_writes_nothing() {
    let harness = TestHarness::new("tags-reconcile-idempotent");
    let category = harness.category("Cardiology");
    let guideline = harness.guideline(&category, "Hypertension");
    let a = harness.tag("adult");
    let b = harness.tag("chronic");

    harness
        .store
        .reconcile_tags(guideline.id, &[a.id, b.id])
        .expect("first reconcile");

    let state_file = harness.fixture.state_sys_dir().join("taxonomy.yaml");
    let before = fs::read(&state_file).expect("state file after first reconcile");

    let delta = harness
        .store
        .reconcile_tags(guideline.id, &[b.id, a.id])
        .expect("second reconcile");
    assert!(delta.is_empty());

    let after = fs::read(&state_file).expect("state file after second reconcile");
    assert_eq!(before, after, "an empty delta must not rewrite the state");
}

#[test]
fn reconcile_with_an_unknown_tag_changes_nothing() {
    let harness = TestHarness::new("tags-reconcile-unknown");
    let category = harness.category("Cardiology");
    let guideline = harness.guideline(&category, "Myocarditis");
    let known = harness.tag("rare");

    let err = harness
        .store
        .reconcile_tags(guideline.id, &[known.id, TagId::generate()])
        .unwrap_err();
    assert_eq!(err.kind(), TaxonomyErrorKind::NotFound);

    let detail = harness
        .store
        .guideline_detail(guideline.id)
        .expect("detail");
    assert!(detail.tags.is_empty());
}

#[test]
fn deleting_a_tag_only_severs_links() {
    let harness = TestHarness::new("tags-delete");
    let category = harness.category("Neurology");
    let guideline = harness.guideline(&category, "Migraine");
    let tag = harness.tag("outpatient");
    harness
        .store
        .reconcile_tags(guideline.id, &[tag.id])
        .expect("link tag");

    let outcome = harness.store.delete_tag(tag.id).expect("delete tag");
    assert_eq!(outcome.associations, 1);
    assert_eq!(outcome.guidelines, 0);

    let detail = harness
        .store
        .guideline_detail(guideline.id)
        .expect("guideline still present");
    assert!(detail.tags.is_empty());
    assert_eq!(
        harness.store.get_tag(tag.id).unwrap_err().kind(),
        TaxonomyErrorKind::NotFound
    );
}
