//! Handler signature classification.
//!
//! AWS Lambda accepts exactly nine handler shapes, the cross product of
//! optional `context.Context` / input parameters and `error` /
//! `(output, error)` results (with the bare `func()` form as the only
//! result-less shape). Classification reduces a declaration to four flags
//! and rejects everything outside the nine shapes.
//!
//! Two strategies implement the same contract: [`AstResolver`] searches the
//! already-parsed file, and the package resolver
//! ([`super::package_loader::PackageResolver`]) loads the surrounding
//! compilation unit. Both funnel into [`classify_declaration`], so the same
//! declaration always yields the same model.

use crate::errors::TransformError;
use crate::parsing::ParsedFile;
use tree_sitter::Node;

use super::locator::HandlerReference;
use super::package_loader::PackageResolver;

const CONTEXT_PACKAGE: &str = "context";
const CONTEXT_TYPE: &str = "Context";
const ERROR_TYPE: &str = "error";

/// The handler's calling convention, as four independent flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignatureModel {
    pub has_context: bool,
    pub has_input: bool,
    pub has_output: bool,
    pub has_error: bool,
}

impl SignatureModel {
    /// Whether the flag combination is one of the nine supported shapes.
    ///
    /// Output implies error, and any parameter implies error; the only
    /// shape without an error result is the bare `func()`.
    pub fn is_valid(&self) -> bool {
        if self.has_output && !self.has_error {
            return false;
        }
        if (self.has_context || self.has_input) && !self.has_error {
            return false;
        }
        true
    }
}

/// Which strategy resolved the handler signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Declaration found in the input file itself.
    Ast,
    /// Declaration found by loading the surrounding package or an import.
    Package,
}

/// A strategy for resolving a handler reference to its signature.
pub trait SignatureResolver {
    fn resolve(
        &self,
        file: &ParsedFile,
        handler: &HandlerReference,
    ) -> Result<SignatureModel, TransformError>;
}

/// Resolves the handler by scanning the input file's own declarations.
pub struct AstResolver;

impl SignatureResolver for AstResolver {
    fn resolve(
        &self,
        file: &ParsedFile,
        handler: &HandlerReference,
    ) -> Result<SignatureModel, TransformError> {
        match file.function_decl(&handler.simple_name) {
            Some(decl) => classify_declaration(file, decl).map_err(|reason| {
                TransformError::SignatureAnalysis {
                    name: handler.simple_name.clone(),
                    reason,
                }
            }),
            None => Err(TransformError::HandlerNotFound(handler.simple_name.clone())),
        }
    }
}

/// Try the AST strategy first; fall back to whole-package resolution only
/// when the handler is not declared in the file. A classification failure
/// is terminal either way, since both strategies would see the same
/// declaration.
pub fn resolve_signature(
    file: &ParsedFile,
    handler: &HandlerReference,
) -> Result<(SignatureModel, ResolutionStrategy), TransformError> {
    match AstResolver.resolve(file, handler) {
        Ok(model) => Ok((model, ResolutionStrategy::Ast)),
        Err(TransformError::HandlerNotFound(_)) => {
            log::info!(
                "handler `{}` not declared in {}, loading the surrounding package",
                handler.qualified_name,
                file.path().display()
            );
            PackageResolver
                .resolve(file, handler)
                .map(|model| (model, ResolutionStrategy::Package))
        }
        Err(err) => Err(err),
    }
}

/// Classifies a `function_declaration` node into a [`SignatureModel`].
///
/// Shared by both resolution strategies. Returns a human-readable reason on
/// rejection; callers wrap it into `SignatureAnalysis`.
pub(crate) fn classify_declaration(
    file: &ParsedFile,
    decl: Node<'_>,
) -> Result<SignatureModel, String> {
    let mut model = SignatureModel::default();

    let params = parameter_types(decl.child_by_field_name("parameters"));
    match params.as_slice() {
        [] => {}
        [first] => {
            if is_context_type(file, *first) {
                model.has_context = true;
            } else {
                model.has_input = true;
            }
        }
        [first, _] => {
            if is_context_type(file, *first) {
                model.has_context = true;
                model.has_input = true;
            } else {
                return Err(format!(
                    "two parameters but the first is `{}`, not context.Context",
                    file.node_text(*first)
                ));
            }
        }
        more => return Err(format!("unsupported parameter count {}", more.len())),
    }

    let results = match decl.child_by_field_name("result") {
        None => Vec::new(),
        Some(res) if res.kind() == "parameter_list" => parameter_types(Some(res)),
        Some(res) => vec![res],
    };
    match results.as_slice() {
        [] => {}
        [only] => {
            if only.kind() == "type_identifier" && file.node_text(*only) == ERROR_TYPE {
                model.has_error = true;
            } else {
                return Err(format!(
                    "single result of type `{}` is not `error`",
                    file.node_text(*only)
                ));
            }
        }
        [_, _] => {
            model.has_output = true;
            model.has_error = true;
        }
        more => return Err(format!("unsupported result count {}", more.len())),
    }

    if !model.is_valid() {
        return Err("signature is not one of the supported Lambda handler shapes".to_string());
    }
    Ok(model)
}

/// Flattens a `parameter_list` into one type node per declared parameter,
/// expanding grouped names (`a, b string` counts as two).
fn parameter_types(list: Option<Node<'_>>) -> Vec<Node<'_>> {
    let Some(list) = list else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        if !matches!(
            decl.kind(),
            "parameter_declaration" | "variadic_parameter_declaration"
        ) {
            continue;
        }
        let Some(ty) = decl.child_by_field_name("type") else {
            continue;
        };
        let mut names = decl.walk();
        let name_count = decl.children_by_field_name("name", &mut names).count();
        for _ in 0..name_count.max(1) {
            out.push(ty);
        }
    }
    out
}

fn is_context_type(file: &ParsedFile, ty: Node<'_>) -> bool {
    ty.kind() == "qualified_type"
        && ty
            .child_by_field_name("package")
            .map(|node| file.node_text(node))
            == Some(CONTEXT_PACKAGE)
        && ty.child_by_field_name("name").map(|node| file.node_text(node)) == Some(CONTEXT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn classify(signature: &str) -> Result<SignatureModel, String> {
        let source = format!("package main\n\nfunc handle{signature} {{\n}}\n");
        let file = ParsedFile::parse(PathBuf::from("main.go"), source).unwrap();
        let decl = file.function_decl("handle").expect("declaration parses");
        classify_declaration(&file, decl)
    }

    fn model(ctx: bool, input: bool, output: bool, error: bool) -> SignatureModel {
        SignatureModel {
            has_context: ctx,
            has_input: input,
            has_output: output,
            has_error: error,
        }
    }

    #[test]
    fn classifies_all_nine_canonical_shapes() {
        let cases = [
            ("()", model(false, false, false, false)),
            ("() error", model(false, false, false, true)),
            ("() ([]byte, error)", model(false, false, true, true)),
            ("(event []byte) error", model(false, true, false, true)),
            ("(event []byte) ([]byte, error)", model(false, true, true, true)),
            ("(ctx context.Context) error", model(true, false, false, true)),
            (
                "(ctx context.Context) ([]byte, error)",
                model(true, false, true, true),
            ),
            (
                "(ctx context.Context, event []byte) error",
                model(true, true, false, true),
            ),
            (
                "(ctx context.Context, event []byte) ([]byte, error)",
                model(true, true, true, true),
            ),
        ];
        for (signature, expected) in cases {
            assert_eq!(classify(signature).unwrap(), expected, "shape {signature}");
        }
    }

    #[test]
    fn second_result_type_is_not_checked() {
        // Any two-result signature is treated as (output, error).
        let got = classify("() (int, string)").unwrap();
        assert_eq!(got, model(false, false, true, true));
    }

    #[test]
    fn rejects_single_non_error_result() {
        assert!(classify("() string").is_err());
    }

    #[test]
    fn rejects_three_parameters() {
        assert!(classify("(a int, b int, c int)").is_err());
    }

    #[test]
    fn rejects_two_parameters_without_leading_context() {
        assert!(classify("(a []byte, b []byte) error").is_err());
    }

    #[test]
    fn rejects_parameters_without_an_error_result() {
        assert!(classify("(event []byte)").is_err());
        assert!(classify("(ctx context.Context)").is_err());
    }

    #[test]
    fn grouped_parameter_names_count_individually() {
        // (a, b []byte) declares two parameters sharing one type.
        assert!(classify("(a, b []byte) error").is_err());
    }

    #[test]
    fn rejects_three_results() {
        assert!(classify("() (int, int, error)").is_err());
    }

    #[test]
    fn named_single_error_result_is_error_only() {
        let got = classify("() (err error)").unwrap();
        assert_eq!(got, model(false, false, false, true));
    }

    #[test]
    fn ast_resolver_reports_missing_handlers() {
        let file = ParsedFile::parse(
            PathBuf::from("main.go"),
            indoc! {r#"
                package main

                func main() {
                    lambda.Start(handleRequest)
                }
            "#}
            .to_string(),
        )
        .unwrap();
        let handler = HandlerReference {
            simple_name: "handleRequest".to_string(),
            qualified_name: "handleRequest".to_string(),
        };
        assert!(matches!(
            AstResolver.resolve(&file, &handler),
            Err(TransformError::HandlerNotFound(_))
        ));
    }

    #[test]
    fn validity_covers_exactly_nine_combinations() {
        let mut valid = 0;
        for bits in 0..16u8 {
            let model = SignatureModel {
                has_context: bits & 1 != 0,
                has_input: bits & 2 != 0,
                has_output: bits & 4 != 0,
                has_error: bits & 8 != 0,
            };
            if model.is_valid() {
                valid += 1;
            }
        }
        assert_eq!(valid, 9);
    }
}
