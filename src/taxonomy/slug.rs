// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::collections::{BTreeMap, BTreeSet};

/// Derive a URL-safe slug from a human-readable title.
///
/// Lowercases the input, keeps ASCII alphanumerics, underscores, and hyphens,
/// drops everything else, and collapses runs of whitespace and hyphens into a
/// single hyphen with no leading or trailing separator. Idempotent: feeding a
/// slug back in returns it unchanged.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;
    for ch in text.chars() {
        let lc = ch.to_ascii_lowercase();
        if lc.is_ascii_alphanumeric() || lc == '_' {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(lc);
        } else if lc.is_whitespace() || lc == '-' {
            pending_separator = true;
        }
        // any other character is dropped outright
    }
    out
}

/// Tracks the slugs handed out (or already persisted) within one uniqueness
/// scope and resolves collisions by numeric suffix.
///
/// The first claim of a base returns it unsuffixed; the second claim of the
/// same base returns `{base}-2`, the third `{base}-3`, and so on. Candidates
/// colliding with pre-seeded slugs are skipped by bumping the counter
/// further.
#[derive(Debug, Default)]
pub struct SlugScope {
    counters: BTreeMap<String, u64>,
    taken: BTreeSet<String>,
}

impl SlugScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded<I>(existing: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            counters: BTreeMap::new(),
            taken: existing.into_iter().collect(),
        }
    }

    pub fn claim(&mut self, base: &str) -> String {
        loop {
            let counter = self.counters.entry(base.to_string()).or_insert(0);
            *counter += 1;
            let candidate = if *counter == 1 {
                base.to_string()
            } else {
                format!("{}-{}", base, *counter)
            };
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
