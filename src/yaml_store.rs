// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_TEMP_ATTEMPTS: u32 = 100;

#[derive(Debug)]
pub struct YamlStoreError {
    message: String,
}

impl YamlStoreError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for YamlStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for YamlStoreError {}

/// Read a YAML document, treating a missing or blank file as absent.
pub fn read_document<T: DeserializeOwned>(
    path: &Path,
    label: &str,
) -> Result<Option<T>, YamlStoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|err| YamlStoreError::new(format!("Failed to read {} file: {}", label, err)))?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    let decoded = serde_yaml::from_str(&content)
        .map_err(|err| YamlStoreError::new(format!("Failed to parse {} file: {}", label, err)))?;
    Ok(Some(decoded))
}

/// Replace a YAML document atomically: serialize into a temp file beside the
/// target, sync it, then rename over the original. Readers never observe a
/// torn document, and a failure at any step leaves the old document in
/// place.
pub fn write_document<T: Serialize>(
    path: &Path,
    label: &str,
    value: &T,
) -> Result<(), YamlStoreError> {
    let content = serde_yaml::to_string(value)
        .map_err(|err| YamlStoreError::new(format!("Failed to serialize {}: {}", label, err)))?;
    let parent = path
        .parent()
        .ok_or_else(|| YamlStoreError::new(format!("{} file path has no parent directory", label)))?;
    fs::create_dir_all(parent).map_err(|err| {
        YamlStoreError::new(format!("Failed to create {} directory: {}", label, err))
    })?;

    let (mut file, temp_path) = open_temp_file(parent, path, label)?;
    if let Err(err) = file
        .write_all(content.as_bytes())
        .and_then(|_| file.sync_all())
    {
        let _ = fs::remove_file(&temp_path);
        return Err(YamlStoreError::new(format!(
            "Failed to write {} temp file: {}",
            label, err
        )));
    }
    drop(file);

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(YamlStoreError::new(format!(
            "Failed to replace {} file: {}",
            label, err
        )));
    }

    #[cfg(unix)]
    if let Err(err) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
        log::warn!("{} directory sync failed: {}", label, err);
    }

    Ok(())
}

fn open_temp_file(
    parent: &Path,
    path: &Path,
    label: &str,
) -> Result<(fs::File, PathBuf), YamlStoreError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| YamlStoreError::new(format!("{} file path has no valid file name", label)))?;
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let temp_path = parent.join(format!(
            ".{}.tmp.{}.{}",
            file_name,
            std::process::id(),
            attempt
        ));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((file, temp_path)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(YamlStoreError::new(format!(
                    "Failed to create temp {} file: {}",
                    label, err
                )));
            }
        }
    }
    Err(YamlStoreError::new(format!(
        "Failed to create temp {} file after multiple attempts",
        label
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::collections::BTreeMap;

    #[test]
    fn missing_and_blank_files_read_as_absent() {
        let fixture = TestFixtureRoot::new_unique("yaml-store-absent").expect("fixture root");
        let path = fixture.path().join("absent.yaml");
        let decoded: Option<BTreeMap<String, String>> =
            read_document(&path, "test").expect("read missing");
        assert!(decoded.is_none());

        fs::write(&path, "   \n").expect("write blank");
        let decoded: Option<BTreeMap<String, String>> =
            read_document(&path, "test").expect("read blank");
        assert!(decoded.is_none());
    }

    #[test]
    fn write_then_read_round_trips_and_leaves_no_temp_files() {
        let fixture = TestFixtureRoot::new_unique("yaml-store-roundtrip").expect("fixture root");
        let path = fixture.path().join("doc.yaml");
        let mut value = BTreeMap::new();
        value.insert("alpha".to_string(), "1".to_string());

        write_document(&path, "test", &value).expect("write");
        let decoded: Option<BTreeMap<String, String>> =
            read_document(&path, "test").expect("read");
        assert_eq!(decoded, Some(value));

        let leftovers: Vec<_> = fs::read_dir(fixture.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }
}
