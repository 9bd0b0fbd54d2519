//! A minimal Go declaration tree for synthesized code.
//!
//! The adapter is modeled as data (declarations, statements, expressions)
//! and rendered by the printer below, rather than assembled from string
//! templates. Rendering follows gofmt conventions: tab indentation, one
//! blank line between declarations.

pub mod adapter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoType {
    Named(String),
    Qualified { package: String, name: String },
    Pointer(Box<GoType>),
    EmptyStruct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoExpr {
    Ident(String),
    Selector { operand: Box<GoExpr>, field: String },
    Call { func: Box<GoExpr>, args: Vec<GoExpr> },
    AddressOf(Box<GoExpr>),
    CompositeLit(GoType),
    StringLit(String),
    IntLit(i64),
    Binary { lhs: Box<GoExpr>, op: &'static str, rhs: Box<GoExpr> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoStmt {
    /// A short variable declaration, `names... := value`.
    Define { names: Vec<String>, value: GoExpr },
    Expr(GoExpr),
    If { cond: GoExpr, body: Vec<GoStmt> },
    Return(Vec<GoExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoField {
    pub name: Option<String>,
    pub ty: GoType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoDecl {
    TypeDef {
        name: String,
        ty: GoType,
    },
    Func {
        receiver: Option<GoField>,
        name: String,
        params: Vec<GoField>,
        results: Vec<GoType>,
        body: Vec<GoStmt>,
    },
}

/// The three synthesized declarations: adapter type, constructor, dispatch
/// method. Produced once and spliced into the file in place of `func main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterDeclarationSet {
    pub decls: [GoDecl; 3],
}

impl AdapterDeclarationSet {
    pub fn render(&self) -> String {
        self.decls
            .iter()
            .map(GoDecl::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl GoType {
    fn render(&self) -> String {
        match self {
            GoType::Named(name) => name.clone(),
            GoType::Qualified { package, name } => format!("{package}.{name}"),
            GoType::Pointer(inner) => format!("*{}", inner.render()),
            GoType::EmptyStruct => "struct{}".to_string(),
        }
    }
}

impl GoExpr {
    fn render(&self) -> String {
        match self {
            GoExpr::Ident(name) => name.clone(),
            GoExpr::Selector { operand, field } => format!("{}.{field}", operand.render()),
            GoExpr::Call { func, args } => {
                let args = args
                    .iter()
                    .map(GoExpr::render)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({args})", func.render())
            }
            GoExpr::AddressOf(inner) => format!("&{}", inner.render()),
            GoExpr::CompositeLit(ty) => format!("{}{{}}", ty.render()),
            GoExpr::StringLit(value) => {
                format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
            }
            GoExpr::IntLit(value) => value.to_string(),
            GoExpr::Binary { lhs, op, rhs } => {
                format!("{} {op} {}", lhs.render(), rhs.render())
            }
        }
    }
}

impl GoStmt {
    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "\t".repeat(depth);
        match self {
            GoStmt::Define { names, value } => {
                out.push_str(&indent);
                out.push_str(&names.join(", "));
                out.push_str(" := ");
                out.push_str(&value.render());
                out.push('\n');
            }
            GoStmt::Expr(expr) => {
                out.push_str(&indent);
                out.push_str(&expr.render());
                out.push('\n');
            }
            GoStmt::If { cond, body } => {
                out.push_str(&indent);
                out.push_str("if ");
                out.push_str(&cond.render());
                out.push_str(" {\n");
                for stmt in body {
                    stmt.render_into(out, depth + 1);
                }
                out.push_str(&indent);
                out.push_str("}\n");
            }
            GoStmt::Return(values) => {
                out.push_str(&indent);
                out.push_str("return");
                if !values.is_empty() {
                    out.push(' ');
                    out.push_str(
                        &values
                            .iter()
                            .map(GoExpr::render)
                            .collect::<Vec<_>>()
                            .join(", "),
                    );
                }
                out.push('\n');
            }
        }
    }
}

impl GoField {
    fn render(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} {}", self.ty.render()),
            None => self.ty.render(),
        }
    }
}

impl GoDecl {
    pub fn render(&self) -> String {
        match self {
            GoDecl::TypeDef { name, ty } => format!("type {name} {}", ty.render()),
            GoDecl::Func {
                receiver,
                name,
                params,
                results,
                body,
            } => {
                let mut out = String::from("func ");
                if let Some(recv) = receiver {
                    out.push('(');
                    out.push_str(&recv.render());
                    out.push_str(") ");
                }
                out.push_str(name);
                out.push('(');
                out.push_str(
                    &params
                        .iter()
                        .map(GoField::render)
                        .collect::<Vec<_>>()
                        .join(", "),
                );
                out.push(')');
                match results.len() {
                    0 => {}
                    1 => {
                        out.push(' ');
                        out.push_str(&results[0].render());
                    }
                    _ => {
                        out.push_str(" (");
                        out.push_str(
                            &results
                                .iter()
                                .map(GoType::render)
                                .collect::<Vec<_>>()
                                .join(", "),
                        );
                        out.push(')');
                    }
                }
                out.push_str(" {\n");
                for stmt in body {
                    stmt.render_into(&mut out, 1);
                }
                out.push('}');
                out
            }
        }
    }
}
