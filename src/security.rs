// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::path::{Path, PathBuf};

/// Resolve a state file name against its directory, rejecting anything that
/// could land outside it.
pub fn resolve_state_file(filename: &str, state_dir: &Path) -> Result<PathBuf, String> {
    if filename.is_empty() {
        return Err("Empty state file name not allowed".to_string());
    }
    if filename.contains("..") || Path::new(filename).is_absolute() {
        return Err(
            "Invalid state file name: path traversal or absolute paths detected".to_string(),
        );
    }

    let target = state_dir.join(filename);
    match target.strip_prefix(state_dir) {
        Ok(_) => Ok(target),
        Err(_) => Err("State file path escapes the state directory".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_plain_file_names() {
        let resolved = resolve_state_file("taxonomy.yaml", Path::new("/state/sys")).unwrap();
        assert_eq!(resolved, PathBuf::from("/state/sys/taxonomy.yaml"));
    }

    #[test]
    fn rejects_traversal_and_absolute_names() {
        assert!(resolve_state_file("../taxonomy.yaml", Path::new("/state/sys")).is_err());
        assert!(resolve_state_file("/etc/passwd", Path::new("/state/sys")).is_err());
        assert!(resolve_state_file("", Path::new("/state/sys")).is_err());
    }
}
