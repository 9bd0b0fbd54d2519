//! Locates the Lambda entry point inside a parsed file.
//!
//! The entry point is the `lambda.Start(handler)` call inside `func main`.
//! The handler argument must be a bare identifier or a `pkg.Identifier`
//! selector; anything more exotic (literals, inline closures, nested
//! selectors) is rejected rather than guessed at.

use crate::errors::TransformError;
use crate::parsing::ParsedFile;
use tree_sitter::Node;

const ENTRY_FUNCTION: &str = "main";
const START_PACKAGE: &str = "lambda";
const START_FUNCTION: &str = "Start";

/// A reference to the handler passed to `lambda.Start`.
///
/// `qualified_name` carries the package prefix (`pkg.Func`) when the
/// handler is imported, and equals `simple_name` otherwise. Both fields are
/// non-empty once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerReference {
    pub simple_name: String,
    pub qualified_name: String,
}

/// Finds the `func main` declaration.
pub fn find_entry_function(file: &ParsedFile) -> Result<Node<'_>, TransformError> {
    file.function_decl(ENTRY_FUNCTION)
        .ok_or(TransformError::EntryNotFound)
}

/// Finds the single `lambda.Start(...)` call in the entry function and
/// extracts the handler reference from its argument.
pub fn find_start_call(
    file: &ParsedFile,
    entry: Node<'_>,
) -> Result<HandlerReference, TransformError> {
    let body = entry
        .child_by_field_name("body")
        .ok_or(TransformError::StartCallNotFound)?;

    let mut calls = Vec::new();
    collect_start_calls(file, body, &mut calls);

    match calls.as_slice() {
        [] => Err(TransformError::StartCallNotFound),
        [call] => handler_reference(file, *call),
        many => Err(TransformError::AmbiguousStartCall(many.len())),
    }
}

fn collect_start_calls<'a>(file: &ParsedFile, node: Node<'a>, out: &mut Vec<Node<'a>>) {
    if node.kind() == "call_expression" && is_start_callee(file, node) {
        out.push(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_start_calls(file, child, out);
    }
}

fn is_start_callee(file: &ParsedFile, call: Node<'_>) -> bool {
    let Some(callee) = call.child_by_field_name("function") else {
        return false;
    };
    if callee.kind() != "selector_expression" {
        return false;
    }
    let operand = callee.child_by_field_name("operand");
    let field = callee.child_by_field_name("field");
    match (operand, field) {
        (Some(operand), Some(field)) => {
            operand.kind() == "identifier"
                && file.node_text(operand) == START_PACKAGE
                && file.node_text(field) == START_FUNCTION
        }
        _ => false,
    }
}

fn handler_reference(
    file: &ParsedFile,
    call: Node<'_>,
) -> Result<HandlerReference, TransformError> {
    let argument = call.child_by_field_name("arguments").and_then(|args| {
        let mut cursor = args.walk();
        let argument = args
            .named_children(&mut cursor)
            .find(|node| node.kind() != "comment");
        argument
    });
    let Some(argument) = argument else {
        return Err(TransformError::UnsupportedHandlerExpression(
            "<no argument>".to_string(),
        ));
    };

    match argument.kind() {
        "identifier" => {
            let name = file.node_text(argument).to_string();
            Ok(HandlerReference {
                simple_name: name.clone(),
                qualified_name: name,
            })
        }
        "selector_expression" => {
            let operand = argument.child_by_field_name("operand");
            let field = argument.child_by_field_name("field");
            match (operand, field) {
                (Some(operand), Some(field)) if operand.kind() == "identifier" => {
                    let package = file.node_text(operand);
                    let name = file.node_text(field);
                    Ok(HandlerReference {
                        simple_name: name.to_string(),
                        qualified_name: format!("{package}.{name}"),
                    })
                }
                _ => Err(TransformError::UnsupportedHandlerExpression(
                    file.node_text(argument).to_string(),
                )),
            }
        }
        _ => Err(TransformError::UnsupportedHandlerExpression(
            file.node_text(argument).to_string(),
        )),
    }
}
