//! Persistence of generated repository maps.
//!
//! The map file is the model plus the metadata that describes the snapshot
//! it was taken from, so a saved map is self-describing for the staleness
//! gate. The encoding is JSON but nothing outside this module assumes that;
//! the only contract is round-trip fidelity of the entity graph.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::StoreError;
use crate::model::{RepoMetadata, RepoModel};

/// A persisted repository map: model plus provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMapFile {
    pub metadata: RepoMetadata,
    pub model: RepoModel,
}

/// Load a persisted map; `Ok(None)` when no file exists yet.
pub fn load(path: &Path) -> Result<Option<RepoMapFile>, StoreError> {
    if !path.exists() {
        tracing::debug!("No persisted map at {:?}", path);
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| StoreError::LoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let map: RepoMapFile = serde_json::from_str(&content).map_err(|e| StoreError::ParseFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    tracing::info!("Loaded persisted map covering {} files", map.model.files.len());
    Ok(Some(map))
}

/// Save a map, creating parent directories as needed.
pub fn save(path: &Path, map: &RepoMapFile) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| StoreError::SaveFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    }

    let content = serde_json::to_string_pretty(map).map_err(|e| StoreError::SaveFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    fs::write(path, content).map_err(|e| StoreError::SaveFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    tracing::debug!("Saved map to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::language::Language;
    use crate::model::{CallSite, Definition, DefinitionKind, FileAnalysis};
    use tempfile::tempdir;

    fn sample_map() -> RepoMapFile {
        let mut model = RepoModel::default();
        model.files.insert(
            "a.py".to_string(),
            FileAnalysis {
                language: Language::Python,
                definitions: vec![Definition {
                    name: "f".to_string(),
                    class_name: None,
                    kind: DefinitionKind::Function,
                    file_path: "a.py".to_string(),
                    start_line: 1,
                    end_line: 2,
                    calls: vec![CallSite {
                        callee: "g".to_string(),
                        line: 2,
                    }],
                }],
            },
        );
        RepoMapFile {
            metadata: RepoMetadata::new("/repo", Some("main".to_string()), Some("abc123".to_string())),
            model,
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repomap.json");

        let map = sample_map();
        save(&path, &map).unwrap();

        let loaded = load(&path).unwrap().expect("map should exist");
        assert_eq!(loaded, map);
    }

    #[test]
    fn test_load_absent_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/repomap.json");
        save(&path, &sample_map()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_corrupted_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repomap.json");
        std::fs::write(&path, "not json at all").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, StoreError::ParseFailed { .. }));
    }
}
