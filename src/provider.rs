//! Repository content acquisition.
//!
//! The extraction core consumes content through the [`ContentProvider`]
//! contract and treats the fetch as atomic: it happens strictly before the
//! pipeline starts, is never retried by the core, and any retry or fallback
//! policy belongs to the provider. Resources are scoped to the call; no
//! process-wide content cache exists.

use git2::Repository;
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FetchError;
use crate::model::SourceFile;

/// Result of acquiring repository content
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// All readable source files, paths repo-relative
    pub files: Vec<SourceFile>,
    /// Content fingerprint (commit id); `None` when unavailable
    pub fingerprint: Option<String>,
}

/// Contract for acquiring a repository snapshot.
pub trait ContentProvider {
    /// Fetch the file set and content fingerprint for the snapshot.
    fn fetch(&self) -> Result<FetchResult, FetchError>;

    /// Fingerprint only, without reading file content. `Ok(None)` means
    /// retrieval is not possible (the staleness gate then fails open).
    fn fingerprint(&self) -> Result<Option<String>, FetchError>;
}

/// Provider over an already-local checkout.
///
/// Walks the working tree gitignore-aware, skips binaries and oversized
/// files, and fingerprints the snapshot with the commit id of HEAD or a
/// named ref.
pub struct LocalProvider {
    root: PathBuf,
    ref_name: Option<String>,
    max_file_size: usize,
}

impl LocalProvider {
    pub fn new(root: impl AsRef<Path>, max_file_size: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ref_name: None,
            max_file_size,
        }
    }

    /// Fingerprint a named ref instead of HEAD
    pub fn with_ref(mut self, ref_name: Option<String>) -> Self {
        self.ref_name = ref_name;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn walk_files(&self) -> Result<Vec<SourceFile>, FetchError> {
        let mut files = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(true)
            .hidden(false)
            .git_ignore(true)
            .git_exclude(true)
            .require_git(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if path.is_dir() {
                continue;
            }
            if path.components().any(|c| c.as_os_str() == ".git") {
                continue;
            }

            if let Ok(metadata) = fs::metadata(path)
                && metadata.len() > self.max_file_size as u64
            {
                tracing::debug!("Skipping large file: {:?}", path);
                continue;
            }

            // Non-UTF-8 content is binary as far as extraction is concerned
            let content = match fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::debug!("Skipping unreadable file {:?}: {}", path, e);
                    continue;
                }
            };

            let relative = path
                .strip_prefix(&self.root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            files.push(SourceFile::new(relative, content));
        }

        tracing::info!("Collected {} files from {:?}", files.len(), self.root);
        Ok(files)
    }

    fn resolve_fingerprint(&self) -> Result<Option<String>, FetchError> {
        let repo = match Repository::discover(&self.root) {
            Ok(repo) => repo,
            Err(e) => {
                tracing::warn!("Not a git repository ({}); no fingerprint", e);
                return Ok(None);
            }
        };

        match &self.ref_name {
            Some(ref_name) => {
                let object = repo.revparse_single(ref_name).map_err(|e| {
                    if e.code() == git2::ErrorCode::NotFound {
                        FetchError::RefNotFound(ref_name.clone())
                    } else {
                        FetchError::FetchFailure(e.to_string())
                    }
                })?;
                let commit = object
                    .peel_to_commit()
                    .map_err(|e| FetchError::FetchFailure(e.to_string()))?;
                Ok(Some(commit.id().to_string()))
            }
            None => match repo.head() {
                Ok(head) => Ok(head.target().map(|oid| oid.to_string())),
                Err(e) => {
                    tracing::warn!("Failed to resolve HEAD ({}); no fingerprint", e);
                    Ok(None)
                }
            },
        }
    }
}

impl ContentProvider for LocalProvider {
    fn fetch(&self) -> Result<FetchResult, FetchError> {
        if !self.root.is_dir() {
            return Err(FetchError::RootNotFound(self.root.display().to_string()));
        }

        let fingerprint = self.fingerprint()?;
        let files = self.walk_files()?;
        Ok(FetchResult { files, fingerprint })
    }

    fn fingerprint(&self) -> Result<Option<String>, FetchError> {
        self.resolve_fingerprint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fetch_collects_relative_paths() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("main.py"), "def f():\n    pass\n").unwrap();
        fs::write(dir.path().join("pkg/util.py"), "def g():\n    pass\n").unwrap();

        let provider = LocalProvider::new(dir.path(), 1_048_576);
        let result = provider.fetch().unwrap();

        let mut paths: Vec<_> = result.files.iter().map(|f| f.path.as_str()).collect();
        paths.sort_unstable();
        assert_eq!(paths, vec!["main.py", "pkg/util.py"]);
    }

    #[test]
    fn test_fetch_skips_oversized_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("big.py"), "x = 1\n".repeat(1000)).unwrap();
        fs::write(dir.path().join("small.py"), "x = 1\n").unwrap();

        let provider = LocalProvider::new(dir.path(), 100);
        let result = provider.fetch().unwrap();
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, "small.py");
    }

    #[test]
    fn test_fetch_missing_root_fails() {
        let provider = LocalProvider::new("/definitely/not/here", 1024);
        let err = provider.fetch().unwrap_err();
        assert!(matches!(err, FetchError::RootNotFound(_)));
    }

    #[test]
    fn test_non_git_directory_has_no_fingerprint() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();

        let provider = LocalProvider::new(dir.path(), 1024);
        let result = provider.fetch().unwrap();
        assert!(result.fingerprint.is_none());
    }

    #[test]
    fn test_git_repository_fingerprint_and_ref() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.py"), "def f():\n    pass\n").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("a.py")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        let commit_id = repo
            .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
        drop(tree);
        drop(repo);

        let provider = LocalProvider::new(dir.path(), 1_048_576);
        let result = provider.fetch().unwrap();
        assert_eq!(result.fingerprint.as_deref(), Some(commit_id.to_string().as_str()));

        // A bogus ref is a hard error, not a silent miss
        let provider = LocalProvider::new(dir.path(), 1_048_576)
            .with_ref(Some("no-such-ref".to_string()));
        let err = provider.fingerprint().unwrap_err();
        assert!(matches!(err, FetchError::RefNotFound(_)));
    }
}
