//! Structural extraction: parse source files and normalize them into the
//! entity model.
//!
//! The flow for one file is adapter → normalizer inside the file processor;
//! the pipeline fans a file set out over a worker pool and merges the
//! per-file results into a [`crate::model::RepoModel`].

/// Per-language structural pattern sets
pub mod adapter;

/// Language detection and grammar selection
pub mod language;

/// Raw match → entity model normalization
pub mod normalizer;

/// Parallel processing pipeline
pub mod pipeline;

/// Single-file processing (isolation unit)
pub mod processor;
