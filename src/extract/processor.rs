//! Per-file extraction: parse, apply the language adapter, normalize.
//!
//! This is the isolation unit of the pipeline. Nothing here errors past the
//! function boundary; every failure mode comes back as a `FileOutcome` value
//! so the batch can continue with the remaining files.

use tree_sitter::Parser;

use super::adapter;
use super::normalizer;
use crate::error::FileFailure;
use crate::model::{FileAnalysis, SourceFile};

/// Result of processing one source file
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// Extraction succeeded
    Parsed {
        path: String,
        analysis: FileAnalysis,
    },
    /// The file was skipped; the batch continues
    Skipped(FileFailure),
}

/// Process a single source file into normalized definitions.
pub fn process_file(file: &SourceFile) -> FileOutcome {
    let Some(language) = file.language else {
        tracing::debug!("Skipping unsupported file: {}", file.path);
        return FileOutcome::Skipped(FileFailure::unsupported(&file.path));
    };

    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&language.grammar()) {
        return FileOutcome::Skipped(FileFailure::parse_failure(
            &file.path,
            format!("failed to load {} grammar: {}", language.display_name(), e),
        ));
    }

    let Some(tree) = parser.parse(&file.content, None) else {
        return FileOutcome::Skipped(FileFailure::parse_failure(
            &file.path,
            "parser produced no tree",
        ));
    };

    let root = tree.root_node();
    if root.has_error() {
        tracing::debug!("Syntax errors in {}, skipping", file.path);
        return FileOutcome::Skipped(FileFailure::parse_failure(
            &file.path,
            "syntax errors in parse tree",
        ));
    }

    let raw = adapter::collect_matches(language, root, &file.content);
    let definitions = normalizer::normalize(raw, &file.path, file.line_count());

    FileOutcome::Parsed {
        path: file.path.clone(),
        analysis: FileAnalysis {
            language,
            definitions,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::model::DefinitionKind;

    #[test]
    fn test_process_python_file() {
        let file = SourceFile::new("a.py", "def f():\n    g()\n\ndef g():\n    pass\n");
        let FileOutcome::Parsed { path, analysis } = process_file(&file) else {
            panic!("expected parsed outcome");
        };
        assert_eq!(path, "a.py");
        assert_eq!(analysis.definitions.len(), 2);

        let f = &analysis.definitions[0];
        assert_eq!(f.name, "f");
        assert_eq!(f.kind, DefinitionKind::Function);
        assert_eq!(f.calls.len(), 1);
        assert_eq!(f.calls[0].callee, "g");
        assert_eq!(f.calls[0].line, 2);
    }

    #[test]
    fn test_unsupported_language_is_skipped() {
        let file = SourceFile::new("data.xyz", "whatever");
        let FileOutcome::Skipped(failure) = process_file(&file) else {
            panic!("expected skipped outcome");
        };
        assert_eq!(failure.kind, FailureKind::UnsupportedLanguage);
        assert_eq!(failure.path, "data.xyz");
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let file = SourceFile::new("broken.py", "def broken(:\n    ???\n");
        let FileOutcome::Skipped(failure) = process_file(&file) else {
            panic!("expected skipped outcome");
        };
        assert!(matches!(failure.kind, FailureKind::ParseFailure(_)));
    }

    #[test]
    fn test_line_ranges_are_one_based_inclusive() {
        let file = SourceFile::new("a.py", "def f():\n    pass\n");
        let FileOutcome::Parsed { analysis, .. } = process_file(&file) else {
            panic!("expected parsed outcome");
        };
        let f = &analysis.definitions[0];
        assert_eq!(f.start_line, 1);
        assert_eq!(f.end_line, 2);
    }
}
