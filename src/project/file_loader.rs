//! Document discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::context::ComposeContext;
use crate::error::ComposeError;
use crate::syntax::Document;

/// Documents directly inside `dir` (not recursive), sorted by path.
pub fn collect_document_paths(
    dir: &Path,
    ctx: &ComposeContext,
) -> Result<Vec<PathBuf>, ComposeError> {
    let entries = fs::read_dir(dir).map_err(|e| ComposeError::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ComposeError::io(dir, e))?.path();
        if path.is_file() && ctx.config.is_document(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Every folder below `root` (inclusive) that holds documents or an index
/// cache, sorted by path. Unreadable entries are skipped.
pub fn collect_repository_folders(root: &Path, ctx: &ComposeContext) -> Vec<PathBuf> {
    let mut folders: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let path = entry.path();
            ctx.config.is_document(path)
                || path.file_name().and_then(|n| n.to_str())
                    == Some(ctx.config.index_file_name.as_str())
        })
        .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
        .collect();
    folders.sort();
    folders.dedup();
    folders
}

/// Read and parse one document, recording `file_name` on its elements.
pub fn load_and_parse(
    path: &Path,
    file_name: &str,
    ctx: &ComposeContext,
) -> Result<Document, ComposeError> {
    let source = fs::read_to_string(path).map_err(|e| ComposeError::io(path, e))?;
    ctx.parse(&source, file_name)
        .map_err(|e| ComposeError::parse(path.display().to_string(), e))
}

/// Parse every document below `dir` into one aggregate.
///
/// Elements are named after their file's path relative to `dir`. The first
/// parse failure aborts loading.
pub fn load_directory(dir: &Path, ctx: &ComposeContext) -> Result<Document, ComposeError> {
    if !dir.is_dir() {
        return Err(ComposeError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
        ));
    }

    let mut aggregate = Document::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            ComposeError::io(path, std::io::Error::other(e.to_string()))
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !ctx.config.is_document(path) {
            continue;
        }
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let file_name = relative.to_string_lossy().replace('\\', "/");
        tracing::debug!("Loading document {}", path.display());
        aggregate.absorb(load_and_parse(path, &file_name, ctx)?);
    }
    Ok(aggregate)
}
