//! Call stack reconstruction.
//!
//! Starting from a (file, line) location, locates the innermost enclosing
//! definition and expands its outgoing calls breadth-first through the
//! symbol index. Expansion is bounded by a maximum depth and a per-path
//! cycle guard; unresolved and ambiguous callees are surfaced structurally
//! instead of being dropped or collapsed. Resolution stays within the
//! root's language, so the whole stack is single-language by construction.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::ResolveError;
use crate::index::SymbolIndex;
use crate::model::{CallSite, Definition, DefinitionKind, RepoModel};

/// Why expansion stopped (or didn't) at an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Definition found; children follow if it makes calls
    Resolved,
    /// Definition already on the current path; not re-expanded
    Cyclic,
    /// Callee name matched no definition in the analyzed set
    /// (standard library or external dependency)
    Unresolved,
    /// Definition found but the depth bound stopped expansion
    DepthLimited,
}

/// Location of a resolved definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionSite {
    pub file_path: String,
    pub class_name: Option<String>,
    pub kind: DefinitionKind,
    pub start_line: usize,
    pub end_line: usize,
}

impl DefinitionSite {
    fn from_definition(def: &Definition) -> Self {
        Self {
            file_path: def.file_path.clone(),
            class_name: def.class_name.clone(),
            kind: def.kind,
            start_line: def.start_line,
            end_line: def.end_line,
        }
    }
}

/// One frame of the expanded call stack.
///
/// Entries are stored root-first; `parent` and `depth` preserve the tree so
/// callers can reconstruct branches, including ambiguous sibling candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStackEntry {
    /// Callable name (bare callee name for unresolved leaves)
    pub name: String,
    /// Where the definition lives; `None` for unresolved externals
    pub definition: Option<DefinitionSite>,
    /// The call site that led here; `None` for the root
    pub call_site: Option<CallSite>,
    /// Distance from the root
    pub depth: usize,
    /// Index of the parent entry; `None` for the root
    pub parent: Option<usize>,
    pub status: EntryStatus,
}

/// A fully expanded call stack, root first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CallStack {
    pub entries: Vec<CallStackEntry>,
}

impl CallStack {
    /// The root entry
    pub fn root(&self) -> Option<&CallStackEntry> {
        self.entries.first()
    }

    /// Indices of the direct children of an entry
    pub fn children_of(&self, index: usize) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.parent == Some(index))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Identity used by the cycle guard: same file, name, and line range
type DefKey = (String, String, usize, usize);

fn key_of(def: &Definition) -> DefKey {
    (
        def.file_path.clone(),
        def.name.clone(),
        def.start_line,
        def.end_line,
    )
}

/// Resolve the call stack starting at `file:line`, up to `max_depth` levels.
///
/// Builds a fresh symbol index over the model; use
/// [`resolve_call_stack_with_index`] to reuse one across invocations.
pub fn resolve_call_stack(
    model: &RepoModel,
    file: &str,
    line: usize,
    max_depth: usize,
) -> Result<CallStack, ResolveError> {
    let index = SymbolIndex::build(model);
    resolve_call_stack_with_index(model, &index, file, line, max_depth)
}

/// Resolve a call stack through a prebuilt index.
///
/// Safe to call concurrently over the same model and index; both are
/// read-only here.
pub fn resolve_call_stack_with_index(
    model: &RepoModel,
    index: &SymbolIndex<'_>,
    file: &str,
    line: usize,
    max_depth: usize,
) -> Result<CallStack, ResolveError> {
    let not_found = || ResolveError::NoEnclosingDefinition {
        file: file.to_string(),
        line,
    };
    let language = model.files.get(file).ok_or_else(not_found)?.language;
    let root = model.definition_at(file, line).ok_or_else(not_found)?;

    let mut stack = CallStack::default();
    stack.entries.push(CallStackEntry {
        name: root.name.clone(),
        definition: Some(DefinitionSite::from_definition(root)),
        call_site: None,
        depth: 0,
        parent: None,
        status: EntryStatus::Resolved,
    });

    // Work list of frontier frames: entry index, definition to expand, and
    // the path of definition keys from the root down to it.
    let mut frontier: VecDeque<(usize, &Definition, Vec<DefKey>)> = VecDeque::new();
    frontier.push_back((0, root, vec![key_of(root)]));

    while let Some((entry_idx, def, path)) = frontier.pop_front() {
        let depth = stack.entries[entry_idx].depth;

        if depth >= max_depth {
            if !def.calls.is_empty() {
                stack.entries[entry_idx].status = EntryStatus::DepthLimited;
            }
            continue;
        }

        for call in &def.calls {
            let candidates = index.resolve(language, &call.callee);

            if candidates.is_empty() {
                stack.entries.push(CallStackEntry {
                    name: call.callee.clone(),
                    definition: None,
                    call_site: Some(call.clone()),
                    depth: depth + 1,
                    parent: Some(entry_idx),
                    status: EntryStatus::Unresolved,
                });
                continue;
            }

            // Ambiguity is surfaced structurally: every candidate becomes a
            // sibling branch, none is preferred.
            for candidate in candidates {
                let key = key_of(candidate);
                let child_idx = stack.entries.len();

                if path.contains(&key) {
                    stack.entries.push(CallStackEntry {
                        name: candidate.name.clone(),
                        definition: Some(DefinitionSite::from_definition(candidate)),
                        call_site: Some(call.clone()),
                        depth: depth + 1,
                        parent: Some(entry_idx),
                        status: EntryStatus::Cyclic,
                    });
                    continue;
                }

                stack.entries.push(CallStackEntry {
                    name: candidate.name.clone(),
                    definition: Some(DefinitionSite::from_definition(candidate)),
                    call_site: Some(call.clone()),
                    depth: depth + 1,
                    parent: Some(entry_idx),
                    status: EntryStatus::Resolved,
                });

                let mut child_path = path.clone();
                child_path.push(key);
                frontier.push_back((child_idx, candidate, child_path));
            }
        }
    }

    Ok(stack)
}
