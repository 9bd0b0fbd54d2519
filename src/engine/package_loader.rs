//! Whole-package signature resolution.
//!
//! Used when the handler is not declared in the input file itself: either
//! it lives in another file of the same package, or it is referenced
//! through an import (`pkg.Handle`). Imported packages are resolved
//! against the enclosing Go module: walk up to `go.mod`, read the module
//! path, and map the import path to a directory inside the module.
//!
//! Loading is best-effort. Unreadable or unparsable files in the package
//! are reported as warnings and skipped; the run only fails if the handler
//! itself never resolves.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::TransformError;
use crate::parsing::ParsedFile;

use super::imports::collect_imports;
use super::locator::HandlerReference;
use super::signature::{classify_declaration, SignatureModel, SignatureResolver};

/// Resolves the handler by parsing the files of its package.
pub struct PackageResolver;

impl SignatureResolver for PackageResolver {
    fn resolve(
        &self,
        file: &ParsedFile,
        handler: &HandlerReference,
    ) -> Result<SignatureModel, TransformError> {
        let dir = match handler.qualified_name.split_once('.') {
            Some((package, _)) => import_directory(file, package)
                .ok_or_else(|| TransformError::HandlerNotFound(handler.qualified_name.clone()))?,
            None => containing_directory(file.path()),
        };
        scan_package(&dir, file, handler)
    }
}

fn containing_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Maps an imported package name back to the directory that declares it.
fn import_directory(file: &ParsedFile, package: &str) -> Option<PathBuf> {
    let import_path = collect_imports(file)
        .into_iter()
        .find(|spec| spec.package_name() == package)
        .map(|spec| spec.path)?;

    let (module_root, module_path) = enclosing_module(&containing_directory(file.path()))?;
    if import_path == module_path {
        return Some(module_root);
    }
    let rest = import_path.strip_prefix(&format!("{module_path}/"))?;
    Some(module_root.join(rest))
}

/// Walks up from `start` to the nearest `go.mod` and returns the module
/// root directory and the declared module path.
fn enclosing_module(start: &Path) -> Option<(PathBuf, String)> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join("go.mod");
        if candidate.is_file() {
            let content = match fs::read_to_string(&candidate) {
                Ok(content) => content,
                Err(err) => {
                    log::warn!("cannot read {}: {err}", candidate.display());
                    return None;
                }
            };
            return match module_path(&content) {
                Some(module) => Some((dir, module)),
                None => {
                    log::warn!("{} has no module directive", candidate.display());
                    None
                }
            };
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn module_path(gomod: &str) -> Option<String> {
    gomod.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module ")?;
        Some(rest.trim().trim_matches('"').to_string())
    })
}

fn scan_package(
    dir: &Path,
    input: &ParsedFile,
    handler: &HandlerReference,
) -> Result<SignatureModel, TransformError> {
    for entry in WalkDir::new(dir).max_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable entry under {}: {err}", dir.display());
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_go_source(path) || path == input.path() {
            continue;
        }
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                log::warn!("skipping unreadable file {}: {err}", path.display());
                continue;
            }
        };
        let parsed = match ParsedFile::parse(path.to_path_buf(), source) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("skipping file with diagnostics: {err}");
                continue;
            }
        };
        if let Some(decl) = parsed.function_decl(&handler.simple_name) {
            return classify_declaration(&parsed, decl).map_err(|reason| {
                TransformError::SignatureAnalysis {
                    name: handler.qualified_name.clone(),
                    reason,
                }
            });
        }
    }
    Err(TransformError::HandlerNotFound(
        handler.qualified_name.clone(),
    ))
}

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}
