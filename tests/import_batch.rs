// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use common::TestHarness;
use vademecum::taxonomy::importer::{
    ImportCategory, ImportFile, ImportGuideline, ImportReference,
};
use vademecum::taxonomy::store::GuidelineFilter;
use vademecum::taxonomy::TaxonomyErrorKind;

const MAX_ENTRIES: usize = 10_000;

fn guideline(title: &str) -> ImportGuideline {
    ImportGuideline {
        title: title.to_string(),
        content: format!("<p>Management of {}.</p>", title),
        tags: Vec::new(),
        references: Vec::new(),
    }
}

fn category(name: &str, guidelines: Vec<ImportGuideline>) -> ImportCategory {
    ImportCategory {
        name: name.to_string(),
        description: None,
        guidelines,
    }
}

#[test]
fn repeated_titles_number_from_two() {
    let harness = TestHarness::new("import-numbering");
    let batch = ImportFile {
        categories: vec![category(
            "Respiratory",
            vec![guideline("Asthma"), guideline("Asthma"), guideline("Asthma")],
        )],
    };

    harness
        .store
        .import_batch(&batch, MAX_ENTRIES)
        .expect("import");

    for slug in ["asthma", "asthma-2", "asthma-3"] {
        harness
            .store
            .guideline_by_slug(slug)
            .unwrap_or_else(|_| panic!("expected slug {}", slug));
    }
}

#[test]
fn titles_that_slugify_alike_share_the_numbering() {
    let harness = TestHarness::new("import-slug-merge");
    let batch = ImportFile {
        categories: vec![category(
            "Infectious Diseases",
            vec![guideline("Flu Care!"), guideline("flu care")],
        )],
    };

    harness
        .store
        .import_batch(&batch, MAX_ENTRIES)
        .expect("import");

    assert_eq!(
        harness
            .store
            .guideline_by_slug("flu-care")
            .expect("first slug")
            .title,
        "Flu Care!"
    );
    assert_eq!(
        harness
            .store
            .guideline_by_slug("flu-care-2")
            .expect("second slug")
            .title,
        "flu care"
    );
}

#[test]
fn guideline_slugs_are_scoped_across_categories() {
    // the scope is global: the same title in two categories must not
    // collide at the uniqueness check
    let harness = TestHarness::new("import-global-scope");
    let batch = ImportFile {
        categories: vec![
            category("Cardiology", vec![guideline("Overview")]),
            category("Neurology", vec![guideline("Overview")]),
        ],
    };

    harness
        .store
        .import_batch(&batch, MAX_ENTRIES)
        .expect("import");

    let first = harness.store.guideline_by_slug("overview").expect("first");
    let second = harness
        .store
        .guideline_by_slug("overview-2")
        .expect("second");
    assert_ne!(first.category_id, second.category_id);
}

#[test]
fn import_seeds_scopes_from_stored_slugs() {
    let harness = TestHarness::new("import-seeded");
    let existing = harness.category("Respiratory");
    harness.guideline(&existing, "Asthma");

    let batch = ImportFile {
        categories: vec![category("Pediatrics", vec![guideline("Asthma")])],
    };
    harness
        .store
        .import_batch(&batch, MAX_ENTRIES)
        .expect("import");

    let imported = harness
        .store
        .guideline_by_slug("asthma-2")
        .expect("suffixed against the stored slug");
    assert_eq!(imported.title, "Asthma");
}

#[test]
fn tags_are_created_once_and_reused() {
    let harness = TestHarness::new("import-tags");
    let preexisting = harness.tag("adult");

    let mut first = guideline("Hypertension");
    first.tags = vec!["adult".to_string(), "chronic".to_string()];
    let mut second = guideline("Hyperlipidaemia");
    second.tags = vec!["chronic".to_string(), "chronic".to_string()];

    let batch = ImportFile {
        categories: vec![category("Cardiology", vec![first, second])],
    };
    let summary = harness
        .store
        .import_batch(&batch, MAX_ENTRIES)
        .expect("import");

    assert_eq!(summary.tags_created, 1, "only 'chronic' is new");
    assert_eq!(summary.tags_linked, 3, "duplicate names link once");
    assert_eq!(harness.store.list_tags().expect("list tags").len(), 2);

    let linked = harness
        .store
        .list_guidelines(GuidelineFilter {
            category_id: None,
            tag_id: Some(preexisting.id),
        })
        .expect("list by preexisting tag");
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].title, "Hypertension");
}

#[test]
fn references_are_imported_in_order() {
    let harness = TestHarness::new("import-references");
    let mut entry = guideline("Pneumonia");
    entry.references = vec![
        ImportReference {
            title: "CURB-65 derivation".to_string(),
            url: Some("https://thorax.example.org/curb65".to_string()),
            description: None,
        },
        ImportReference {
            title: "Local antibiotic policy".to_string(),
            url: None,
            description: Some("Intranet copy".to_string()),
        },
    ];
    let batch = ImportFile {
        categories: vec![category("Respiratory", vec![entry])],
    };

    let summary = harness
        .store
        .import_batch(&batch, MAX_ENTRIES)
        .expect("import");
    assert_eq!(summary.references, 2);

    let imported = harness
        .store
        .guideline_by_slug("pneumonia")
        .expect("guideline");
    let references = harness
        .store
        .list_references(imported.id)
        .expect("references");
    let titles: Vec<&str> = references
        .iter()
        .map(|reference| reference.title.as_str())
        .collect();
    assert_eq!(titles, vec!["CURB-65 derivation", "Local antibiotic policy"]);
}

#[test]
fn summary_counts_the_whole_batch() {
    let harness = TestHarness::new("import-summary");
    let mut tagged = guideline("Sepsis");
    tagged.tags = vec!["urgent".to_string()];
    let batch = ImportFile {
        categories: vec![
            category("Emergency Medicine", vec![tagged, guideline("Shock")]),
            category("Empty Shelf", Vec::new()),
        ],
    };

    let summary = harness
        .store
        .import_batch(&batch, MAX_ENTRIES)
        .expect("import");
    assert_eq!(summary.categories, 2);
    assert_eq!(summary.guidelines, 2);
    assert_eq!(summary.tags_created, 1);
    assert_eq!(summary.tags_linked, 1);
    assert_eq!(summary.references, 0);
}

#[test]
fn a_failing_entry_rolls_the_whole_batch_back() {
    let harness = TestHarness::new("import-rollback");
    let batch = ImportFile {
        categories: vec![
            category("Valid", vec![guideline("Kept Nowhere")]),
            category("Broken", vec![guideline("   ")]),
        ],
    };

    let err = harness
        .store
        .import_batch(&batch, MAX_ENTRIES)
        .unwrap_err();
    assert_eq!(err.kind(), TaxonomyErrorKind::Validation);

    assert!(harness
        .store
        .list_categories()
        .expect("list categories")
        .is_empty());
    assert!(harness
        .store
        .list_guidelines(GuidelineFilter::default())
        .expect("list guidelines")
        .is_empty());

    let reopened = harness.reopen();
    assert!(reopened
        .list_categories()
        .expect("list after reopen")
        .is_empty());
}

#[test]
fn oversized_batches_are_rejected_up_front() {
    let harness = TestHarness::new("import-limit");
    let batch = ImportFile {
        categories: vec![category(
            "Cardiology",
            vec![guideline("One"), guideline("Two")],
        )],
    };

    let err = harness.store.import_batch(&batch, 2).unwrap_err();
    assert_eq!(err.kind(), TaxonomyErrorKind::Validation);
    assert!(harness
        .store
        .list_categories()
        .expect("list categories")
        .is_empty());
}

#[test]
fn imported_state_survives_a_reopen() {
    let harness = TestHarness::new("import-reopen");
    let batch = ImportFile {
        categories: vec![category("Respiratory", vec![guideline("Asthma")])],
    };
    harness
        .store
        .import_batch(&batch, MAX_ENTRIES)
        .expect("import");

    let reopened = harness.reopen();
    let loaded = reopened.guideline_by_slug("asthma").expect("loaded");
    assert_eq!(loaded.title, "Asthma");
    assert_eq!(reopened.list_categories().expect("categories").len(), 1);
}
