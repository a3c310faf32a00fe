/// Call stack resolution over real parsed fixtures, from source text to
/// expanded stack.
use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use repomap::extract::normalizer::MODULE_SCOPE_NAME;
use repomap::extract::pipeline::{self, PipelineOptions};
use repomap::model::RepoModel;
use repomap::provider::{ContentProvider, LocalProvider};
use repomap::resolver::{self, EntryStatus};

fn model_from(dir: &Path) -> RepoModel {
    let provider = LocalProvider::new(dir, 1_048_576);
    let fetched = provider.fetch().expect("fetch should succeed");
    let outcome = pipeline::generate(
        &fetched.files,
        &PipelineOptions::default(),
        &CancellationToken::new(),
    )
    .expect("pipeline should run");
    assert!(outcome.failures.is_empty(), "fixtures must parse cleanly");
    outcome.model
}

#[test]
fn test_linear_chain_across_files() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("app.py"),
        "def handle(request):\n    payload = parse(request)\n    return payload\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("codec.py"),
        "def parse(request):\n    return decode(request.body)\n",
    )
    .unwrap();

    let model = model_from(dir.path());
    let stack = resolver::resolve_call_stack(&model, "app.py", 2, 5).unwrap();

    // handle -> parse -> decode(unresolved external)
    assert_eq!(stack.entries.len(), 3);
    assert_eq!(stack.root().unwrap().name, "handle");

    let parse = &stack.entries[1];
    assert_eq!(parse.name, "parse");
    assert_eq!(parse.status, EntryStatus::Resolved);
    assert_eq!(parse.definition.as_ref().unwrap().file_path, "codec.py");

    let decode = &stack.entries[2];
    assert_eq!(decode.name, "decode");
    assert_eq!(decode.status, EntryStatus::Unresolved);
    assert!(decode.definition.is_none());
}

#[test]
fn test_ambiguous_method_keeps_both_candidates() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("exporters.py"),
        concat!(
            "class CsvExporter:\n",
            "    def export(self, rows):\n",
            "        return len(rows)\n",
            "\n",
            "class JsonExporter:\n",
            "    def export(self, rows):\n",
            "        return rows\n",
        ),
    )
    .unwrap();
    fs::write(
        dir.path().join("run.py"),
        "def run_export(exporter, rows):\n    exporter.export(rows)\n",
    )
    .unwrap();

    let model = model_from(dir.path());
    let stack = resolver::resolve_call_stack(&model, "run.py", 1, 3).unwrap();

    let children = stack.children_of(0);
    assert_eq!(children.len(), 2, "both export candidates become branches");

    let mut classes: Vec<String> = children
        .iter()
        .filter_map(|&i| stack.entries[i].definition.as_ref())
        .filter_map(|d| d.class_name.clone())
        .collect();
    classes.sort_unstable();
    assert_eq!(classes, vec!["CsvExporter", "JsonExporter"]);
}

#[test]
fn test_recursive_fixture_terminates() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("tree.py"),
        "def walk(node):\n    for child in node.children:\n        walk(child)\n",
    )
    .unwrap();

    let model = model_from(dir.path());
    let stack = resolver::resolve_call_stack(&model, "tree.py", 1, 10).unwrap();

    // walk -> walk(cyclic), nothing further
    assert_eq!(stack.entries.len(), 2);
    assert_eq!(stack.entries[1].status, EntryStatus::Cyclic);
    assert_eq!(stack.entries[1].name, "walk");
}

#[test]
fn test_module_level_line_roots_at_module_scope() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("script.py"),
        "def setup():\n    pass\n\nsetup()\n",
    )
    .unwrap();

    let model = model_from(dir.path());
    let stack = resolver::resolve_call_stack(&model, "script.py", 4, 3).unwrap();

    assert_eq!(stack.root().unwrap().name, MODULE_SCOPE_NAME);
    let children = stack.children_of(0);
    assert_eq!(children.len(), 1);
    assert_eq!(stack.entries[children[0]].name, "setup");
    assert_eq!(stack.entries[children[0]].status, EntryStatus::Resolved);
}

#[test]
fn test_function_content_at_line() {
    let dir = TempDir::new().unwrap();
    let source = "import os\n\ndef handle(request):\n    payload = parse(request)\n    return payload\n\ndef parse(request):\n    return request\n";
    fs::write(dir.path().join("app.py"), source).unwrap();

    let model = model_from(dir.path());

    // A line inside `handle` yields that whole definition's text
    let def = model.definition_at("app.py", 4).expect("line 4 is inside handle");
    assert_eq!(def.name, "handle");
    assert_eq!(
        def.source_text(source),
        "def handle(request):\n    payload = parse(request)\n    return payload"
    );

    // A line outside every definition yields nothing to print
    assert!(model.definition_at("app.py", 1).is_none());
}

#[test]
fn test_rust_fixture_resolves_scoped_calls() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("main.rs"),
        "fn main() {\n    engine::start();\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("engine.rs"),
        "pub fn start() {\n    warm_up();\n}\n\nfn warm_up() {}\n",
    )
    .unwrap();

    let model = model_from(dir.path());
    let stack = resolver::resolve_call_stack(&model, "main.rs", 1, 5).unwrap();

    // Scoped path collapses to the bare name before lookup
    assert_eq!(stack.entries.len(), 3);
    assert_eq!(stack.entries[1].name, "start");
    assert_eq!(stack.entries[1].definition.as_ref().unwrap().file_path, "engine.rs");
    assert_eq!(stack.entries[2].name, "warm_up");
}

#[test]
fn test_calls_never_cross_languages() {
    // A JS call to a name that only exists as a Python definition is an
    // unresolved leaf, not a cross-language match.
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ui.js"), "function boot() {\n  render();\n}\n").unwrap();
    fs::write(dir.path().join("srv.py"), "def render():\n    pass\n").unwrap();

    let model = model_from(dir.path());
    let stack = resolver::resolve_call_stack(&model, "ui.js", 1, 3).unwrap();
    assert_eq!(stack.entries.len(), 2);
    assert_eq!(stack.entries[1].name, "render");
    assert_eq!(stack.entries[1].status, EntryStatus::Unresolved);
    assert!(stack.entries[1].definition.is_none());
}
