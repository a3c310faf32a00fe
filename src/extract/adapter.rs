//! Per-language structural pattern sets.
//!
//! Each supported language gets its own fixed set of patterns for
//! function/method boundaries, class-like containers, and call expressions.
//! The walker applies the pattern set selected by the language tag and emits
//! raw matches; languages do not share pattern logic, so a grammar change in
//! one language never bleeds into another.
//!
//! Adapters are responsible for producing the *bare* callee name: member,
//! static, and namespace qualifiers are stripped here so the symbol index
//! only ever sees plain identifiers.

use tree_sitter::Node;

use super::language::Language;
use crate::model::DefinitionKind;

/// A raw definition boundary before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDefinition {
    pub name: String,
    pub kind: DefinitionKind,
    pub class_name: Option<String>,
    pub start_line: usize,
    pub end_line: usize,
}

/// A raw call expression before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCall {
    pub callee: String,
    pub line: usize,
}

/// All raw matches emitted for one parsed file
#[derive(Debug, Clone, Default)]
pub struct RawMatches {
    pub definitions: Vec<RawDefinition>,
    pub calls: Vec<RawCall>,
}

/// Apply the language's pattern set to a parsed tree and collect raw matches.
pub fn collect_matches(language: Language, root: Node, source: &str) -> RawMatches {
    let mut walker = Walker {
        language,
        source,
        matches: RawMatches::default(),
    };
    walker.visit(root, None);
    walker.matches
}

struct Walker<'a> {
    language: Language,
    source: &'a str,
    matches: RawMatches,
}

impl Walker<'_> {
    fn visit(&mut self, node: Node, class_name: Option<&str>) {
        if let Some((name, is_container)) = self.match_definition(node) {
            let start_line = node.start_position().row + 1;
            let end_line = node.end_position().row + 1;

            let kind = if is_container {
                DefinitionKind::Class
            } else if class_name.is_some() || self.is_method_node(node.kind()) {
                DefinitionKind::Method
            } else {
                DefinitionKind::Function
            };

            self.matches.definitions.push(RawDefinition {
                name: name.clone(),
                kind,
                class_name: class_name.map(String::from),
                start_line,
                end_line,
            });

            // Members of a container carry its name as their class context;
            // nested functions keep the context of the enclosing method.
            let inner_class = if is_container {
                Some(name.as_str())
            } else {
                class_name
            };
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                self.visit(child, inner_class);
            }
            return;
        }

        if let Some(callee) = self.match_call(node) {
            self.matches.calls.push(RawCall {
                callee,
                line: node.start_position().row + 1,
            });
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, class_name);
        }
    }

    /// Match a definition boundary. Returns the symbol name and whether the
    /// node is a class-like container.
    fn match_definition(&self, node: Node) -> Option<(String, bool)> {
        let kind = node.kind();
        match self.language {
            Language::Rust => match kind {
                "function_item" => Some((self.field_text(node, "name")?, false)),
                "impl_item" => Some((self.field_text(node, "type")?, true)),
                "trait_item" | "struct_item" | "enum_item" => {
                    Some((self.field_text(node, "name")?, true))
                }
                _ => None,
            },
            Language::Python => match kind {
                "function_definition" => Some((self.field_text(node, "name")?, false)),
                "class_definition" => Some((self.field_text(node, "name")?, true)),
                _ => None,
            },
            Language::JavaScript | Language::TypeScript => match kind {
                "function_declaration" | "method_definition" => {
                    Some((self.field_text(node, "name")?, false))
                }
                // Anonymous function expressions are named by the variable
                // they are bound to, when there is one.
                "function_expression" | "arrow_function" => {
                    let parent = node.parent()?;
                    if parent.kind() == "variable_declarator" {
                        Some((self.field_text(parent, "name")?, false))
                    } else {
                        None
                    }
                }
                "class_declaration" | "interface_declaration" => {
                    Some((self.field_text(node, "name")?, true))
                }
                _ => None,
            },
            Language::Go => match kind {
                "function_declaration" => Some((self.field_text(node, "name")?, false)),
                "method_declaration" => Some((self.field_text(node, "name")?, false)),
                _ => None,
            },
            Language::Java => match kind {
                "method_declaration" | "constructor_declaration" => {
                    Some((self.field_text(node, "name")?, false))
                }
                "class_declaration" | "interface_declaration" | "enum_declaration" => {
                    Some((self.field_text(node, "name")?, true))
                }
                _ => None,
            },
            Language::Swift => match kind {
                "function_declaration" => Some((
                    self.field_text(node, "name")
                        .or_else(|| self.first_child_text(node, "simple_identifier"))?,
                    false,
                )),
                "class_declaration" | "protocol_declaration" => Some((
                    self.field_text(node, "name")
                        .or_else(|| self.first_child_text(node, "type_identifier"))?,
                    true,
                )),
                _ => None,
            },
            Language::C => match kind {
                "function_definition" => {
                    let declarator = node.child_by_field_name("declarator")?;
                    Some((self.innermost_identifier(declarator)?, false))
                }
                "struct_specifier" | "enum_specifier" => {
                    // Forward declarations have no body and are not definitions
                    node.child_by_field_name("body")?;
                    Some((self.field_text(node, "name")?, true))
                }
                _ => None,
            },
            Language::Cpp => match kind {
                "function_definition" => {
                    let declarator = node.child_by_field_name("declarator")?;
                    Some((self.innermost_identifier(declarator)?, false))
                }
                "class_specifier" | "struct_specifier" => {
                    node.child_by_field_name("body")?;
                    Some((self.field_text(node, "name")?, true))
                }
                _ => None,
            },
            Language::CSharp => match kind {
                "method_declaration" | "constructor_declaration" | "local_function_statement" => {
                    Some((self.field_text(node, "name")?, false))
                }
                "class_declaration" | "struct_declaration" | "interface_declaration" => {
                    Some((self.field_text(node, "name")?, true))
                }
                _ => None,
            },
            Language::Ruby => match kind {
                "method" | "singleton_method" => Some((self.field_text(node, "name")?, false)),
                "class" | "module" => Some((self.field_text(node, "name")?, true)),
                _ => None,
            },
            Language::Php => match kind {
                "function_definition" | "method_declaration" => {
                    Some((self.field_text(node, "name")?, false))
                }
                "class_declaration" | "interface_declaration" | "trait_declaration" => {
                    Some((self.field_text(node, "name")?, true))
                }
                _ => None,
            },
        }
    }

    /// Whether this node kind is a method even without class context
    /// (object literals, mixins)
    fn is_method_node(&self, kind: &str) -> bool {
        matches!(
            kind,
            "method_definition"
                | "method_declaration"
                | "constructor_declaration"
                | "method"
                | "singleton_method"
        )
    }

    /// Match a call expression and extract the bare callee name.
    fn match_call(&self, node: Node) -> Option<String> {
        let kind = node.kind();
        let raw = match self.language {
            Language::Rust => {
                if kind != "call_expression" {
                    return None;
                }
                let callee = node.child_by_field_name("function")?;
                self.rust_callee(callee)?
            }
            Language::Python => {
                if kind != "call" {
                    return None;
                }
                let callee = node.child_by_field_name("function")?;
                match callee.kind() {
                    "identifier" => self.text(callee),
                    "attribute" => self.field_text(callee, "attribute")?,
                    _ => return None,
                }
            }
            Language::JavaScript | Language::TypeScript => {
                if kind != "call_expression" {
                    return None;
                }
                let callee = node.child_by_field_name("function")?;
                match callee.kind() {
                    "identifier" => self.text(callee),
                    "member_expression" => self.field_text(callee, "property")?,
                    _ => return None,
                }
            }
            Language::Go => {
                if kind != "call_expression" {
                    return None;
                }
                let callee = node.child_by_field_name("function")?;
                match callee.kind() {
                    "identifier" => self.text(callee),
                    "selector_expression" => self.field_text(callee, "field")?,
                    _ => return None,
                }
            }
            Language::Java => {
                if kind != "method_invocation" {
                    return None;
                }
                self.field_text(node, "name")?
            }
            Language::Swift => {
                if kind != "call_expression" {
                    return None;
                }
                let callee = node.child(0)?;
                match callee.kind() {
                    "simple_identifier" => self.text(callee),
                    "navigation_expression" => self.last_descendant_text(callee, "simple_identifier")?,
                    _ => return None,
                }
            }
            Language::C => {
                if kind != "call_expression" {
                    return None;
                }
                let callee = node.child_by_field_name("function")?;
                match callee.kind() {
                    "identifier" => self.text(callee),
                    "field_expression" => self.field_text(callee, "field")?,
                    _ => return None,
                }
            }
            Language::Cpp => {
                if kind != "call_expression" {
                    return None;
                }
                let callee = node.child_by_field_name("function")?;
                match callee.kind() {
                    "identifier" => self.text(callee),
                    "field_expression" => self.field_text(callee, "field")?,
                    "qualified_identifier" => self.field_text(callee, "name")?,
                    _ => return None,
                }
            }
            Language::CSharp => {
                if kind != "invocation_expression" {
                    return None;
                }
                let callee = node.child_by_field_name("function")?;
                match callee.kind() {
                    "identifier" => self.text(callee),
                    "member_access_expression" => self.field_text(callee, "name")?,
                    _ => return None,
                }
            }
            Language::Ruby => {
                // Only `call` nodes are matched. A paren-less bare
                // invocation (`enqueue` with no receiver or arguments)
                // parses as a plain `identifier`, indistinguishable from a
                // local variable read, and is not recorded.
                if kind != "call" {
                    return None;
                }
                let method = node.child_by_field_name("method")?;
                self.text(method)
            }
            Language::Php => match kind {
                "function_call_expression" => {
                    let callee = node.child_by_field_name("function")?;
                    self.text(callee)
                }
                "member_call_expression" | "scoped_call_expression" => {
                    self.field_text(node, "name")?
                }
                _ => return None,
            },
        };

        bare_name(&raw)
    }

    /// Callee name for Rust call expressions, drilling through paths,
    /// generics, and method receivers.
    fn rust_callee(&self, callee: Node) -> Option<String> {
        match callee.kind() {
            "identifier" => Some(self.text(callee)),
            "scoped_identifier" => self.field_text(callee, "name"),
            "field_expression" => self.field_text(callee, "field"),
            "generic_function" => {
                let inner = callee.child_by_field_name("function")?;
                self.rust_callee(inner)
            }
            _ => None,
        }
    }

    fn text(&self, node: Node) -> String {
        let start = node.start_byte();
        let end = node.end_byte().min(self.source.len());
        self.source[start..end].to_string()
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        let child = node.child_by_field_name(field)?;
        let text = self.text(child);
        if text.trim().is_empty() { None } else { Some(text) }
    }

    fn first_child_text(&self, node: Node, kind: &str) -> Option<String> {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).find(|c| c.kind() == kind)?;
        Some(self.text(found))
    }

    /// Last descendant of the given kind, depth-first (rightmost segment of a
    /// navigation chain).
    fn last_descendant_text(&self, node: Node, kind: &str) -> Option<String> {
        let mut result = None;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if current.kind() == kind {
                result = Some(self.text(current));
            }
            let mut cursor = current.walk();
            for child in current.children(&mut cursor) {
                stack.push(child);
            }
        }
        result
    }

    /// Innermost identifier of a C/C++ declarator chain
    fn innermost_identifier(&self, node: Node) -> Option<String> {
        if matches!(node.kind(), "identifier" | "field_identifier") {
            return Some(self.text(node));
        }
        if node.kind() == "qualified_identifier"
            && let Some(name) = node.child_by_field_name("name")
        {
            return self.innermost_identifier(name);
        }
        if let Some(declarator) = node.child_by_field_name("declarator") {
            return self.innermost_identifier(declarator);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(id) = self.innermost_identifier(child) {
                return Some(id);
            }
        }
        None
    }
}

/// Strip residual qualifiers so the index sees a plain identifier.
fn bare_name(raw: &str) -> Option<String> {
    let name = raw.rsplit("::").next().unwrap_or(raw);
    let name = name.rsplit(['.', '\\']).next().unwrap_or(name).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
