//! The transformation engine.
//!
//! One call to [`transform`] rewrites a parsed Lambda entry-point file into
//! its Knative equivalent: locate the `lambda.Start` call, classify the
//! handler's signature, rewrite the imports, and splice the synthesized
//! adapter declarations over `func main`. All analysis runs read-only
//! first; the collected edits are applied in a single pass at the end, so
//! a failing run leaves the input untouched.

pub mod imports;
pub mod locator;
pub mod package_loader;
pub mod signature;

use crate::codegen::adapter;
use crate::errors::TransformError;
use crate::parsing::{Edit, ParsedFile};

use locator::HandlerReference;
pub use signature::ResolutionStrategy;
use signature::SignatureModel;

/// What a successful run did, for caller-side messaging.
#[derive(Debug, Clone)]
pub struct TransformReport {
    pub handler: HandlerReference,
    pub signature: SignatureModel,
    pub strategy: ResolutionStrategy,
}

/// Transforms the file in place. Called exactly once per run.
pub fn transform(file: &mut ParsedFile) -> Result<TransformReport, TransformError> {
    let (report, edits) = plan(file)?;
    file.splice(edits)?;
    Ok(report)
}

/// The read-only half of the transform: everything up to, but not
/// including, mutation of the file.
fn plan(file: &ParsedFile) -> Result<(TransformReport, Vec<Edit>), TransformError> {
    let entry = locator::find_entry_function(file)?;
    let entry_range = entry.byte_range();
    let handler = locator::find_start_call(file, entry)?;
    log::debug!("found Lambda handler `{}`", handler.qualified_name);

    let (model, strategy) = signature::resolve_signature(file, &handler)?;

    let mut edits = Vec::new();
    let aliases = imports::rewrite_imports(file, &model, &mut edits);

    let decls = adapter::synthesize(&handler, &model, &aliases);
    edits.push(Edit {
        range: entry_range,
        replacement: decls.render(),
    });

    let report = TransformReport {
        handler,
        signature: model,
        strategy,
    };
    Ok((report, edits))
}
