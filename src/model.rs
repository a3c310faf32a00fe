//! Entity model for repository structure maps.
//!
//! Heterogeneous per-language syntax trees are normalized into this model:
//! - `Definition`: a function, method, or class with its line range
//! - `CallSite`: a call expression's bare callee name and location
//! - `RepoModel`: the full per-file map of a repository snapshot
//! - `RepoMetadata`: identity, ref, and content fingerprint of that snapshot

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::extract::language::Language;

/// One source file read from the repository, immutable once constructed.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Repo-relative path
    pub path: String,
    /// Detected language, `None` when the extension is not recognized
    pub language: Option<Language>,
    /// Raw file content
    pub content: String,
}

impl SourceFile {
    /// Build a source file, detecting the language from the path extension.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let language = Language::from_path(&path);
        Self {
            path,
            language,
            content: content.into(),
        }
    }

    /// Number of lines in the file (a trailing newline does not add a line)
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Kind of extracted definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// A standalone function
    Function,
    /// A method belonging to a class-like container
    Method,
    /// A class, struct, trait, interface, or similar container
    Class,
    /// Synthetic per-file scope holding module-level call sites
    ModuleScope,
}

impl DefinitionKind {
    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::ModuleScope => "module scope",
        }
    }

    /// Whether a call site may resolve to this kind of definition
    pub fn is_callable(&self) -> bool {
        !matches!(self, Self::ModuleScope)
    }
}

/// A call expression recorded inside a definition.
///
/// The callee name is the bare identifier as written at the call site;
/// member and static qualifiers are stripped by the language adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Bare callee name, not yet resolved
    pub callee: String,
    /// Line of the call expression (1-based)
    pub line: usize,
}

/// A function, method, or class extracted from a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Symbol name as written at the definition site
    pub name: String,
    /// Enclosing class name for methods and nested definitions
    pub class_name: Option<String>,
    /// Kind of definition
    pub kind: DefinitionKind,
    /// Repo-relative path of the owning file
    pub file_path: String,
    /// First line of the definition (1-based, inclusive)
    pub start_line: usize,
    /// Last line of the definition (1-based, inclusive)
    pub end_line: usize,
    /// Outgoing calls in source order
    pub calls: Vec<CallSite>,
}

impl Definition {
    /// Qualified name, `Class.name` when enclosed in a class
    pub fn qualified_name(&self) -> String {
        match &self.class_name {
            Some(class) => format!("{}.{}", class, self.name),
            None => self.name.clone(),
        }
    }

    /// Whether the given 1-based line falls within this definition's range
    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    /// Size of the line range, used to pick the innermost of nested matches
    pub fn span(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// This definition's lines sliced out of its file's content.
    ///
    /// The model stores only line ranges; callers that still hold the file
    /// content use this to recover the definition's text.
    pub fn source_text(&self, content: &str) -> String {
        content
            .lines()
            .skip(self.start_line.saturating_sub(1))
            .take(self.span())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Extraction result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// Detected language of the file
    pub language: Language,
    /// Definitions in source order, module scope last if present
    pub definitions: Vec<Definition>,
}

/// The normalized structural map of a repository snapshot.
///
/// Keyed by repo-relative path. A `BTreeMap` keeps iteration deterministic,
/// so the merged model is independent of worker completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoModel {
    /// Per-file analysis results
    pub files: BTreeMap<String, FileAnalysis>,
}

impl RepoModel {
    /// Total number of definitions across all files
    pub fn definition_count(&self) -> usize {
        self.files.values().map(|f| f.definitions.len()).sum()
    }

    /// Iterate all definitions in deterministic (path, source) order
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.files.values().flat_map(|f| f.definitions.iter())
    }

    /// Find the innermost definition containing the given file/line location.
    ///
    /// When several definitions nest around the line, the one with the
    /// smallest line span wins.
    pub fn definition_at(&self, file: &str, line: usize) -> Option<&Definition> {
        let analysis = self.files.get(file)?;
        analysis
            .definitions
            .iter()
            .filter(|d| d.contains_line(line))
            .min_by_key(|d| d.span())
    }
}

/// Metadata recorded alongside a generated `RepoModel`.
///
/// Compared (never mutated) by the staleness gate on the next invocation and
/// superseded wholesale when the model is regenerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    /// Repository identity: local root path or remote URL
    pub repository: String,
    /// Ref the snapshot was taken at, if known
    pub ref_name: Option<String>,
    /// Content fingerprint (latest commit id); `None` when unavailable
    pub fingerprint: Option<String>,
    /// Generation timestamp (Unix epoch seconds)
    pub generated_at: i64,
}

impl RepoMetadata {
    /// Create metadata for a freshly generated model
    pub fn new(
        repository: impl Into<String>,
        ref_name: Option<String>,
        fingerprint: Option<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            ref_name,
            fingerprint,
            generated_at: Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, start: usize, end: usize) -> Definition {
        Definition {
            name: name.to_string(),
            class_name: None,
            kind: DefinitionKind::Function,
            file_path: "a.py".to_string(),
            start_line: start,
            end_line: end,
            calls: vec![],
        }
    }

    #[test]
    fn test_qualified_name() {
        let mut d = def("run", 1, 3);
        assert_eq!(d.qualified_name(), "run");
        d.class_name = Some("Worker".to_string());
        assert_eq!(d.qualified_name(), "Worker.run");
    }

    #[test]
    fn test_contains_line_inclusive() {
        let d = def("f", 5, 9);
        assert!(d.contains_line(5));
        assert!(d.contains_line(9));
        assert!(!d.contains_line(4));
        assert!(!d.contains_line(10));
    }

    #[test]
    fn test_definition_at_prefers_innermost() {
        let mut model = RepoModel::default();
        model.files.insert(
            "a.py".to_string(),
            FileAnalysis {
                language: Language::Python,
                definitions: vec![def("outer", 1, 20), def("inner", 5, 8)],
            },
        );

        let found = model.definition_at("a.py", 6).unwrap();
        assert_eq!(found.name, "inner");

        let found = model.definition_at("a.py", 15).unwrap();
        assert_eq!(found.name, "outer");

        assert!(model.definition_at("a.py", 25).is_none());
        assert!(model.definition_at("missing.py", 6).is_none());
    }

    #[test]
    fn test_source_text_slices_definition_lines() {
        let content = "import os\n\ndef f():\n    return 1\n\ndef g():\n    pass\n";
        let d = def("f", 3, 4);
        assert_eq!(d.source_text(content), "def f():\n    return 1");

        // Range clamped to the file still yields whatever lines exist
        let d = def("g", 6, 40);
        assert_eq!(d.source_text(content), "def g():\n    pass");
    }

    #[test]
    fn test_source_file_line_count() {
        let f = SourceFile::new("a.py", "one\ntwo\nthree\n");
        assert_eq!(f.line_count(), 3);
        assert_eq!(f.language, Some(Language::Python));

        let unknown = SourceFile::new("notes.xyz", "data");
        assert_eq!(unknown.language, None);
    }

    #[test]
    fn test_model_serialization_round_trip() {
        let mut model = RepoModel::default();
        let mut d = def("f", 1, 3);
        d.calls.push(CallSite {
            callee: "g".to_string(),
            line: 2,
        });
        model.files.insert(
            "a.py".to_string(),
            FileAnalysis {
                language: Language::Python,
                definitions: vec![d],
            },
        );

        let json = serde_json::to_string(&model).unwrap();
        let back: RepoModel = serde_json::from_str(&json).unwrap();
        assert_eq!(model, back);
    }
}
