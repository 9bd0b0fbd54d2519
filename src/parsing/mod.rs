//! Go source parsing and printing.
//!
//! `ParsedFile` pairs a file's source text with its tree-sitter CST and is
//! the single long-lived mutable object of a transform run. All analysis is
//! read-only against the tree; mutation happens once, at the end, when the
//! collected byte-range edits are spliced into the text. Comments, blank
//! lines, and declaration order outside the edited ranges survive byte for
//! byte, which also makes the output deterministic.

use crate::errors::TransformError;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// A single replacement of a byte range with new text.
#[derive(Debug, Clone)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

/// One parsed Go source file.
pub struct ParsedFile {
    path: PathBuf,
    source: String,
    tree: Tree,
}

impl ParsedFile {
    pub fn parse(path: PathBuf, source: String) -> Result<Self, TransformError> {
        let tree = parse_go(&source).map_err(|message| TransformError::Parse {
            path: path.clone(),
            message,
        })?;
        Ok(Self { path, source, tree })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn node_text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Top-level declarations (and the package clause) in source order.
    pub fn top_level_decls(&self) -> Vec<Node<'_>> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .filter(|node| node.kind() != "comment")
            .collect()
    }

    /// Finds a top-level function declaration by name.
    pub fn function_decl(&self, name: &str) -> Option<Node<'_>> {
        self.top_level_decls().into_iter().find(|node| {
            node.kind() == "function_declaration"
                && node
                    .child_by_field_name("name")
                    .map(|ident| self.node_text(ident))
                    == Some(name)
        })
    }

    /// Applies the collected edits in one pass and re-parses the result.
    ///
    /// Edits must be in-bounds and non-overlapping; violating either is an
    /// internal sequencing bug and fails loudly rather than corrupting the
    /// output. The re-parse doubles as a consistency check on the
    /// synthesized code.
    pub fn splice(&mut self, mut edits: Vec<Edit>) -> Result<(), TransformError> {
        edits.sort_by_key(|edit| edit.range.start);

        let mut output = String::with_capacity(self.source.len());
        let mut last = 0usize;
        for edit in &edits {
            if edit.range.start < last
                || edit.range.end < edit.range.start
                || edit.range.end > self.source.len()
            {
                return Err(TransformError::Print(format!(
                    "edit {}..{} overlaps a previous edit or escapes the source ({} bytes)",
                    edit.range.start,
                    edit.range.end,
                    self.source.len()
                )));
            }
            output.push_str(&self.source[last..edit.range.start]);
            output.push_str(&edit.replacement);
            last = edit.range.end;
        }
        output.push_str(&self.source[last..]);

        let tree = parse_go(&output)
            .map_err(|message| TransformError::Print(format!("spliced output: {message}")))?;
        self.source = output;
        self.tree = tree;
        Ok(())
    }
}

fn parse_go(source: &str) -> Result<Tree, String> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| format!("failed to load Go grammar: {e}"))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| "parser produced no tree".to_string())?;
    if tree.root_node().has_error() {
        return Err("source contains Go syntax errors".to_string());
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParsedFile {
        ParsedFile::parse(PathBuf::from("main.go"), source.to_string()).unwrap()
    }

    #[test]
    fn parses_a_well_formed_file() {
        let file = parse(indoc! {r#"
            package main

            func main() {}
        "#});
        assert_eq!(file.root().kind(), "source_file");
        assert!(file.function_decl("main").is_some());
        assert!(file.function_decl("missing").is_none());
    }

    #[test]
    fn rejects_syntax_errors() {
        let result = ParsedFile::parse(
            PathBuf::from("broken.go"),
            "package main\n\nfunc main( {".to_string(),
        );
        assert!(matches!(result, Err(TransformError::Parse { .. })));
    }

    #[test]
    fn splice_replaces_ranges_and_keeps_the_rest() {
        let mut file = parse("package main\n\nfunc main() {}\n");
        let decl = file.function_decl("main").unwrap();
        let range = decl.byte_range();
        file.splice(vec![Edit {
            range,
            replacement: "func other() {}".to_string(),
        }])
        .unwrap();
        assert_eq!(file.source(), "package main\n\nfunc other() {}\n");
        assert!(file.function_decl("other").is_some());
    }

    #[test]
    fn splice_rejects_overlapping_edits() {
        let mut file = parse("package main\n\nfunc main() {}\n");
        let result = file.splice(vec![
            Edit {
                range: 0..20,
                replacement: String::new(),
            },
            Edit {
                range: 10..25,
                replacement: String::new(),
            },
        ]);
        assert!(matches!(result, Err(TransformError::Print(_))));
    }

    #[test]
    fn splice_rejects_invalid_go_output() {
        let mut file = parse("package main\n\nfunc main() {}\n");
        let result = file.splice(vec![Edit {
            range: 14..28,
            replacement: "func broken( {".to_string(),
        }]);
        assert!(matches!(result, Err(TransformError::Print(_))));
    }
}
