//! Import rewriting for the transformed file.
//!
//! Removes every import whose path contains the aws-lambda-go marker and
//! makes sure the five support modules the adapter may reference are
//! imported: `context` and `net/http` always, `io` / `encoding/json` /
//! `log` depending on the signature flags. Existing imports keep their
//! aliases; nothing is ever imported twice.

use crate::parsing::{Edit, ParsedFile};
use tree_sitter::Node;

use super::signature::SignatureModel;

const LAMBDA_IMPORT_MARKER: &str = "aws-lambda-go";

/// An import spec already present in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub alias: Option<String>,
    pub path: String,
}

impl ImportSpec {
    /// The identifier this import is referenced by: the explicit alias if
    /// one is given, the last path segment otherwise.
    pub fn package_name(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// Aliases the synthesizer needs for the dispatch method. `encoding/json`
/// and `log` are referenced by their default names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAliases {
    pub context: String,
    pub http: String,
    pub io: String,
}

/// One support module: its path, default alias, whether the signature
/// requires it, and what the file currently provides.
#[derive(Debug, Clone)]
struct ImportEntry {
    path: &'static str,
    alias: String,
    present: bool,
    required: bool,
}

fn build_import_set(existing: &[ImportSpec], signature: &SignatureModel) -> Vec<ImportEntry> {
    let requirements: [(&'static str, &'static str, bool); 5] = [
        ("context", "context", true),
        ("net/http", "http", true),
        ("io", "io", signature.has_input),
        ("encoding/json", "json", signature.has_output),
        ("log", "log", signature.has_error),
    ];
    requirements
        .into_iter()
        .map(|(path, default_alias, required)| {
            let found = existing.iter().find(|spec| spec.path == path);
            ImportEntry {
                path,
                alias: found
                    .and_then(|spec| spec.alias.clone())
                    .unwrap_or_else(|| default_alias.to_string()),
                present: found.is_some(),
                required,
            }
        })
        .collect()
}

/// Every import spec in the file, in declaration order.
pub(crate) fn collect_imports(file: &ParsedFile) -> Vec<ImportSpec> {
    import_declarations(file)
        .into_iter()
        .flat_map(spec_nodes)
        .filter_map(|spec| spec_info(file, spec))
        .collect()
}

/// Rewrites the file's imports, pushing the necessary edits, and returns
/// the aliases the synthesizer should reference.
pub fn rewrite_imports(
    file: &ParsedFile,
    signature: &SignatureModel,
    edits: &mut Vec<Edit>,
) -> ResolvedAliases {
    let existing = collect_imports(file);
    let import_set = build_import_set(&existing, signature);

    let missing: Vec<String> = import_set
        .iter()
        .filter(|entry| entry.required && !entry.present)
        .map(|entry| format!("\"{}\"", entry.path))
        .collect();

    let declarations = import_declarations(file);
    for (index, decl) in declarations.iter().enumerate() {
        let specs = spec_nodes(*decl);
        let kept: Vec<String> = specs
            .iter()
            .filter(|spec| {
                spec_info(file, **spec)
                    .is_none_or(|info| !info.path.contains(LAMBDA_IMPORT_MARKER))
            })
            .map(|spec| file.node_text(*spec).to_string())
            .collect();
        let removed_any = kept.len() != specs.len();

        if index == 0 {
            // The first block absorbs the missing imports.
            let mut block = kept;
            block.extend(missing.iter().cloned());
            if block.is_empty() {
                edits.push(delete_decl(file, *decl));
            } else if removed_any || !missing.is_empty() {
                edits.push(Edit {
                    range: decl.byte_range(),
                    replacement: render_import_block(&block),
                });
            }
        } else if removed_any {
            if kept.is_empty() {
                edits.push(delete_decl(file, *decl));
            } else {
                edits.push(Edit {
                    range: decl.byte_range(),
                    replacement: render_import_block(&kept),
                });
            }
        }
    }

    if declarations.is_empty() && !missing.is_empty() {
        let insert_at = file
            .top_level_decls()
            .iter()
            .find(|node| node.kind() == "package_clause")
            .map(|node| node.end_byte());
        let (range, replacement) = match insert_at {
            Some(at) => (at..at, format!("\n\n{}", render_import_block(&missing))),
            None => (0..0, format!("{}\n\n", render_import_block(&missing))),
        };
        edits.push(Edit { range, replacement });
    }

    let alias_for = |path: &str| -> String {
        import_set
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| entry.alias.clone())
            .unwrap_or_else(|| path.to_string())
    };
    ResolvedAliases {
        context: alias_for("context"),
        http: alias_for("net/http"),
        io: alias_for("io"),
    }
}

fn import_declarations(file: &ParsedFile) -> Vec<Node<'_>> {
    file.top_level_decls()
        .into_iter()
        .filter(|node| node.kind() == "import_declaration")
        .collect()
}

fn spec_nodes(decl: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => out.push(child),
            "import_spec_list" => {
                let mut inner = child.walk();
                out.extend(
                    child
                        .named_children(&mut inner)
                        .filter(|node| node.kind() == "import_spec"),
                );
            }
            _ => {}
        }
    }
    out
}

fn spec_info(file: &ParsedFile, spec: Node<'_>) -> Option<ImportSpec> {
    let path_node = spec.child_by_field_name("path")?;
    let path = file
        .node_text(path_node)
        .trim_matches(|c| c == '"' || c == '`')
        .to_string();
    let alias = spec
        .child_by_field_name("name")
        .map(|node| file.node_text(node).to_string());
    Some(ImportSpec { alias, path })
}

fn render_import_block(specs: &[String]) -> String {
    if let [only] = specs {
        return format!("import {only}");
    }
    let mut out = String::from("import (\n");
    for spec in specs {
        out.push('\t');
        out.push_str(spec);
        out.push('\n');
    }
    out.push(')');
    out
}

/// Deletion range for a whole import declaration, extended over trailing
/// newlines so removing the block does not leave a gap of blank lines.
fn delete_decl(file: &ParsedFile, decl: Node<'_>) -> Edit {
    let source = file.source().as_bytes();
    let mut range = decl.byte_range();
    let mut consumed = 0;
    while consumed < 2 && range.end < source.len() && source[range.end] == b'\n' {
        range.end += 1;
        consumed += 1;
    }
    Edit {
        range,
        replacement: String::new(),
    }
}
