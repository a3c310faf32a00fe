//! Normalization of raw per-language matches into the entity model.
//!
//! Pure function from one file's raw matches to an ordered list of
//! `Definition`s with call sites attached to their innermost enclosing
//! definition. Calls outside every definition land in a synthetic module
//! scope for the file.

use super::adapter::RawMatches;
use crate::model::{CallSite, Definition, DefinitionKind};

/// Name used for the synthetic module-scope definition of a file
pub const MODULE_SCOPE_NAME: &str = "<module>";

/// Convert raw matches into ordered definitions with attached call sites.
///
/// Line ranges are clamped to the file's line count. When a call line falls
/// within several nested definitions, the one with the smallest line span
/// wins. Module-level calls are attached to a synthetic `ModuleScope`
/// definition spanning the whole file, created only when needed.
pub fn normalize(raw: RawMatches, file_path: &str, line_count: usize) -> Vec<Definition> {
    let max_line = line_count.max(1);

    let mut definitions: Vec<Definition> = raw
        .definitions
        .into_iter()
        .map(|d| Definition {
            name: d.name,
            class_name: d.class_name,
            kind: d.kind,
            file_path: file_path.to_string(),
            start_line: d.start_line.clamp(1, max_line),
            end_line: d.end_line.clamp(1, max_line),
            calls: Vec::new(),
        })
        .collect();

    definitions.sort_by_key(|d| (d.start_line, std::cmp::Reverse(d.end_line)));

    let mut module_calls = Vec::new();
    for call in raw.calls {
        let target = definitions
            .iter_mut()
            .filter(|d| d.contains_line(call.line))
            .min_by_key(|d| d.span());

        let site = CallSite {
            callee: call.callee,
            line: call.line,
        };
        match target {
            Some(def) => def.calls.push(site),
            None => module_calls.push(site),
        }
    }

    if !module_calls.is_empty() {
        module_calls.sort_by_key(|c| c.line);
        definitions.push(Definition {
            name: MODULE_SCOPE_NAME.to_string(),
            class_name: None,
            kind: DefinitionKind::ModuleScope,
            file_path: file_path.to_string(),
            start_line: 1,
            end_line: max_line,
            calls: module_calls,
        });
    }

    definitions
}
