//! Builds the adapter declarations that replace `func main`.
//!
//! The output shape is fixed: an empty `Handler` struct, a `New`
//! constructor, and a `Handle(ctx, w, r)` method that forwards to the
//! migrated handler. The method body varies only with the handler's
//! signature flags; parameter types use the resolved import aliases so the
//! generated code still compiles in files that alias `context` or
//! `net/http`.

use super::{AdapterDeclarationSet, GoDecl, GoExpr, GoField, GoStmt, GoType};
use crate::engine::imports::ResolvedAliases;
use crate::engine::locator::HandlerReference;
use crate::engine::signature::SignatureModel;

const ADAPTER_TYPE: &str = "Handler";
const CONSTRUCTOR_NAME: &str = "New";
const DISPATCH_METHOD: &str = "Handle";

pub fn synthesize(
    handler: &HandlerReference,
    signature: &SignatureModel,
    aliases: &ResolvedAliases,
) -> AdapterDeclarationSet {
    AdapterDeclarationSet {
        decls: [
            adapter_type(),
            constructor(),
            dispatch_method(handler, signature, aliases),
        ],
    }
}

fn adapter_type() -> GoDecl {
    GoDecl::TypeDef {
        name: ADAPTER_TYPE.to_string(),
        ty: GoType::EmptyStruct,
    }
}

fn constructor() -> GoDecl {
    GoDecl::Func {
        receiver: None,
        name: CONSTRUCTOR_NAME.to_string(),
        params: vec![],
        results: vec![GoType::Pointer(Box::new(GoType::Named(
            ADAPTER_TYPE.to_string(),
        )))],
        body: vec![GoStmt::Return(vec![GoExpr::AddressOf(Box::new(
            GoExpr::CompositeLit(GoType::Named(ADAPTER_TYPE.to_string())),
        ))])],
    }
}

fn dispatch_method(
    handler: &HandlerReference,
    signature: &SignatureModel,
    aliases: &ResolvedAliases,
) -> GoDecl {
    let mut body = Vec::new();

    if signature.has_input {
        // body, _ := io.ReadAll(r.Body)
        // The read error is intentionally discarded in the generated code.
        body.push(GoStmt::Define {
            names: vec!["body".to_string(), "_".to_string()],
            value: GoExpr::Call {
                func: Box::new(selector(&aliases.io, "ReadAll")),
                args: vec![selector("r", "Body")],
            },
        });
    }

    let mut args = Vec::new();
    if signature.has_context {
        args.push(GoExpr::Ident("ctx".to_string()));
    }
    if signature.has_input {
        args.push(GoExpr::Ident("body".to_string()));
    }
    let call = GoExpr::Call {
        func: Box::new(handler_expr(handler)),
        args,
    };

    body.push(match (signature.has_output, signature.has_error) {
        (true, true) => GoStmt::Define {
            names: vec!["result".to_string(), "err".to_string()],
            value: call,
        },
        (false, true) => GoStmt::Define {
            names: vec!["err".to_string()],
            value: call,
        },
        (true, false) => GoStmt::Define {
            names: vec!["result".to_string()],
            value: call,
        },
        (false, false) => GoStmt::Expr(call),
    });

    if signature.has_error {
        body.push(error_guard());
    }
    if signature.has_output {
        body.push(encode_output());
    }

    GoDecl::Func {
        receiver: Some(GoField {
            name: Some("h".to_string()),
            ty: GoType::Pointer(Box::new(GoType::Named(ADAPTER_TYPE.to_string()))),
        }),
        name: DISPATCH_METHOD.to_string(),
        params: vec![
            GoField {
                name: Some("ctx".to_string()),
                ty: GoType::Qualified {
                    package: aliases.context.clone(),
                    name: "Context".to_string(),
                },
            },
            GoField {
                name: Some("w".to_string()),
                ty: GoType::Qualified {
                    package: aliases.http.clone(),
                    name: "ResponseWriter".to_string(),
                },
            },
            GoField {
                name: Some("r".to_string()),
                ty: GoType::Pointer(Box::new(GoType::Qualified {
                    package: aliases.http.clone(),
                    name: "Request".to_string(),
                })),
            },
        ],
        results: vec![],
        body,
    }
}

/// The callee expression: qualified when the handler came from another
/// package, a bare identifier otherwise.
fn handler_expr(handler: &HandlerReference) -> GoExpr {
    match handler.qualified_name.split_once('.') {
        Some((package, name)) => selector(package, name),
        None => GoExpr::Ident(handler.qualified_name.clone()),
    }
}

fn error_guard() -> GoStmt {
    GoStmt::If {
        cond: GoExpr::Binary {
            lhs: Box::new(GoExpr::Ident("err".to_string())),
            op: "!=",
            rhs: Box::new(GoExpr::Ident("nil".to_string())),
        },
        body: vec![
            GoStmt::Expr(GoExpr::Call {
                func: Box::new(selector("log", "Printf")),
                args: vec![
                    GoExpr::StringLit("Handler error: %v".to_string()),
                    GoExpr::Ident("err".to_string()),
                ],
            }),
            GoStmt::Expr(GoExpr::Call {
                func: Box::new(selector("w", "WriteHeader")),
                args: vec![GoExpr::IntLit(500)],
            }),
            GoStmt::Return(vec![]),
        ],
    }
}

fn encode_output() -> GoStmt {
    // json.NewEncoder(w).Encode(result)
    GoStmt::Expr(GoExpr::Call {
        func: Box::new(GoExpr::Selector {
            operand: Box::new(GoExpr::Call {
                func: Box::new(selector("json", "NewEncoder")),
                args: vec![GoExpr::Ident("w".to_string())],
            }),
            field: "Encode".to_string(),
        }),
        args: vec![GoExpr::Ident("result".to_string())],
    })
}

fn selector(operand: &str, field: &str) -> GoExpr {
    GoExpr::Selector {
        operand: Box::new(GoExpr::Ident(operand.to_string())),
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn aliases() -> ResolvedAliases {
        ResolvedAliases {
            context: "context".to_string(),
            http: "http".to_string(),
            io: "io".to_string(),
        }
    }

    fn reference(name: &str) -> HandlerReference {
        let simple = name.split('.').next_back().unwrap_or(name).to_string();
        HandlerReference {
            simple_name: simple,
            qualified_name: name.to_string(),
        }
    }

    fn signature(ctx: bool, input: bool, output: bool, error: bool) -> SignatureModel {
        SignatureModel {
            has_context: ctx,
            has_input: input,
            has_output: output,
            has_error: error,
        }
    }

    #[test]
    fn full_shape_binds_everything_in_order() {
        let set = synthesize(
            &reference("handleRequest"),
            &signature(true, true, true, true),
            &aliases(),
        );
        let rendered = set.render();
        assert!(rendered.contains("body, _ := io.ReadAll(r.Body)"));
        assert!(rendered.contains("result, err := handleRequest(ctx, body)"));
        assert!(rendered.contains("log.Printf(\"Handler error: %v\", err)"));
        assert!(rendered.contains("w.WriteHeader(500)"));
        assert!(rendered.contains("json.NewEncoder(w).Encode(result)"));
    }

    #[test]
    fn bare_shape_is_a_statement_only_call() {
        let set = synthesize(
            &reference("doWork"),
            &signature(false, false, false, false),
            &aliases(),
        );
        let rendered = set.render();
        assert!(rendered.contains("\tdoWork()\n"));
        assert!(!rendered.contains(":="));
        assert!(!rendered.contains("err"));
        assert!(!rendered.contains("json."));
        assert!(!rendered.contains("io.ReadAll"));
    }

    #[test]
    fn error_only_shape_binds_a_single_value() {
        let set = synthesize(
            &reference("handle"),
            &signature(false, true, false, true),
            &aliases(),
        );
        let rendered = set.render();
        assert!(rendered.contains("err := handle(body)"));
        assert!(rendered.contains("if err != nil {"));
        assert!(!rendered.contains("result"));
    }

    #[test]
    fn qualified_handlers_keep_their_package_prefix() {
        let set = synthesize(
            &reference("handler.HandleRequest"),
            &signature(true, false, false, true),
            &aliases(),
        );
        let rendered = set.render();
        assert!(rendered.contains("err := handler.HandleRequest(ctx)"));
    }

    #[test]
    fn method_signature_uses_resolved_aliases() {
        let aliased = ResolvedAliases {
            context: "gocontext".to_string(),
            http: "nethttp".to_string(),
            io: "stdio".to_string(),
        };
        let set = synthesize(
            &reference("handle"),
            &signature(true, true, false, true),
            &aliased,
        );
        let rendered = set.render();
        assert!(rendered.contains(
            "func (h *Handler) Handle(ctx gocontext.Context, w nethttp.ResponseWriter, r *nethttp.Request) {"
        ));
        assert!(rendered.contains("body, _ := stdio.ReadAll(r.Body)"));
    }

    #[test]
    fn declaration_set_renders_all_three_declarations() {
        let set = synthesize(
            &reference("handle"),
            &signature(false, false, false, true),
            &aliases(),
        );
        let rendered = set.render();
        let expected_prefix = "type Handler struct{}\n\nfunc New() *Handler {\n\treturn &Handler{}\n}\n\nfunc (h *Handler) Handle(ctx context.Context, w http.ResponseWriter, r *http.Request) {";
        assert_eq!(&rendered[..expected_prefix.len()], expected_prefix);
    }
}
