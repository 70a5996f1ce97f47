// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use vademecum::taxonomy::store::TaxonomyStore;
use vademecum::taxonomy::{
    CategoryDraft, CategoryRecord, GuidelineDraft, GuidelineRecord, ReferenceDraft, TagDraft,
    TagRecord,
};
use vademecum::util::test_fixtures::TestFixtureRoot;

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub store: TaxonomyStore,
}

impl TestHarness {
    pub fn new(prefix: &str) -> Self {
        let fixture = TestFixtureRoot::new_unique(prefix).expect("create fixture root");
        fixture.init_runtime_layout().expect("init runtime layout");
        let store = TaxonomyStore::open(&fixture.state_sys_dir()).expect("open taxonomy store");
        Self { fixture, store }
    }

    /// A second store over the same state directory, as a fresh process
    /// would see it.
    pub fn reopen(&self) -> TaxonomyStore {
        TaxonomyStore::open(&self.fixture.state_sys_dir()).expect("reopen taxonomy store")
    }

    pub fn category(&self, name: &str) -> CategoryRecord {
        self.store
            .create_category(CategoryDraft {
                name: name.to_string(),
                description: None,
            })
            .expect("create category")
    }

    pub fn tag(&self, name: &str) -> TagRecord {
        self.store
            .create_tag(TagDraft {
                name: name.to_string(),
                description: None,
            })
            .expect("create tag")
    }

    pub fn guideline(&self, category: &CategoryRecord, title: &str) -> GuidelineRecord {
        self.store
            .create_guideline(guideline_draft(category, title))
            .expect("create guideline")
    }
}

pub fn guideline_draft(category: &CategoryRecord, title: &str) -> GuidelineDraft {
    GuidelineDraft {
        title: title.to_string(),
        content: format!("<p>Management of {}.</p>", title),
        category_id: category.id,
        tag_ids: Vec::new(),
        references: Vec::new(),
        slug: None,
    }
}

pub fn reference_draft(title: &str, url: Option<&str>) -> ReferenceDraft {
    ReferenceDraft {
        title: title.to_string(),
        url: url.map(|url| url.to_string()),
        description: None,
    }
}
