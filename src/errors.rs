//! Error types for the Lambda-to-Knative transformation.
//!
//! Every failure is terminal for the run: the tool is a one-shot batch
//! transform, so there is no retry path. Each variant carries enough
//! context (symbol name, stage) for the CLI to render a useful message.
//! Non-fatal package-load diagnostics are logged with `log::warn!` by the
//! package resolver instead of surfacing here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// The input (or a spliced result) is not syntactically valid Go.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// No `func main` declaration in the file.
    #[error("main function not found")]
    EntryNotFound,

    /// `main` exists but contains no `lambda.Start(...)` call.
    #[error("lambda.Start() call not found in main function")]
    StartCallNotFound,

    /// More than one `lambda.Start(...)` call in `main`.
    #[error("found {0} lambda.Start() calls in main function, expected exactly one")]
    AmbiguousStartCall(usize),

    /// The `lambda.Start` argument is not a bare identifier or a
    /// `pkg.Identifier` selector.
    #[error("unsupported handler expression `{0}` in lambda.Start() call")]
    UnsupportedHandlerExpression(String),

    /// The handler declaration was found but its parameter or result list
    /// does not match any of the nine supported Lambda shapes.
    #[error("failed to analyze signature of handler `{name}`: {reason}")]
    SignatureAnalysis { name: String, reason: String },

    /// The handler could not be resolved in the file, its package, or its
    /// imports.
    #[error("handler function `{0}` not found in package or imports")]
    HandlerNotFound(String),

    /// Splicing the synthesized declarations produced an inconsistent file.
    #[error("failed to print transformed source: {0}")]
    Print(String),
}
