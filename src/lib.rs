//! # repomap - Cross-Language Repository Structure Maps
//!
//! Builds a normalized structural map of a source repository (functions,
//! classes, and call relationships across 12 languages via tree-sitter) and
//! answers "what calls what" queries, including reconstructing an ordered
//! call stack from a file/line location.
//!
//! ## Overview
//!
//! Files are parsed in parallel; each language has a fixed structural
//! pattern set that extracts definition boundaries and call expressions,
//! which are normalized into a language-agnostic [`model::RepoModel`]. A
//! symbol index built over that model resolves bare callee names to
//! candidate definitions across files, and the resolver expands outgoing
//! calls breadth-first into a depth- and cycle-bounded stack. A persisted
//! map carries a commit-id fingerprint so unchanged repositories skip
//! re-extraction entirely.
//!
//! ## Architecture
//!
//! ```text
//! ContentProvider ──> [file set] ──> extraction pipeline (rayon workers)
//!                                          │ per-file: parse → adapter → normalize
//!                                          ▼
//!                                     RepoModel ──> SymbolIndex ──> CallStack
//!                                          │
//!                                     store (JSON) <── staleness gate
//! ```
//!
//! ## Precision
//!
//! Cross-file call resolution matches bare names without scope or import
//! awareness: a call `run()` resolves to every `run` in the repository, and
//! all candidates are kept as sibling branches. Calls are never resolved
//! across language boundaries.
//!
//! ## Usage Example
//!
//! ```no_run
//! use repomap::extract::pipeline::{self, PipelineOptions};
//! use repomap::provider::{ContentProvider, LocalProvider};
//! use repomap::resolver;
//! use tokio_util::sync::CancellationToken;
//!
//! fn main() -> anyhow::Result<()> {
//!     let provider = LocalProvider::new("/path/to/repo", 1_048_576);
//!     let fetched = provider.fetch()?;
//!
//!     let outcome = pipeline::generate(
//!         &fetched.files,
//!         &PipelineOptions::default(),
//!         &CancellationToken::new(),
//!     )?;
//!
//!     let stack = resolver::resolve_call_stack(&outcome.model, "src/main.py", 42, 5)?;
//!     println!("{} frames", stack.entries.len());
//!     Ok(())
//! }
//! ```

/// Configuration loading with TOML support
pub mod config;

/// Error types and per-file failure values
pub mod error;

/// Parsing, language adapters, normalization, and the parallel pipeline
pub mod extract;

/// Symbol index mapping callable names to candidate definitions
pub mod index;

/// Language-agnostic entity model
pub mod model;

/// Repository content acquisition
pub mod provider;

/// Call stack reconstruction
pub mod resolver;

/// Staleness gate over persisted maps
pub mod staleness;

/// Persistence of generated maps
pub mod store;
