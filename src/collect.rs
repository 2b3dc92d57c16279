//! Gather post documents from a directory tree.

use anyhow::{Context, Result};
use ink_parse::{ErrorKind, PostSet, RawDocument, SkippedDocument};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::InkConfig;

/// Documents read from a posts directory, plus the files that could not be.
#[derive(Debug, Default)]
pub struct Collected {
    pub documents: Vec<RawDocument>,
    pub unreadable: Vec<SkippedDocument>,
}

/// Read every document under `dir`, in file-name order.
///
/// Identifiers are paths relative to `dir`. Files that cannot be read as
/// UTF-8 are returned in `unreadable`; a missing directory is an error.
pub fn collect_documents(dir: &Path, config: &InkConfig) -> Result<Collected> {
    if !dir.is_dir() {
        anyhow::bail!("Posts directory '{}' does not exist", dir.display());
    }

    let mut collected = Collected::default();

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() || !config.is_document(entry.path()) {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        match std::fs::read_to_string(entry.path()) {
            Ok(source) => collected.documents.push(RawDocument::new(rel, source)),
            Err(e) => {
                tracing::warn!(document = %rel, "skipping unreadable document: {e}");
                collected.unreadable.push(SkippedDocument {
                    id: rel,
                    kind: ErrorKind::Unreadable,
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        count = collected.documents.len(),
        unreadable = collected.unreadable.len(),
        dir = %dir.display(),
        "collected documents"
    );
    Ok(collected)
}

/// Collect and build the posts under `dir`. Unreadable files are reported
/// in `skipped` next to the documents that failed to parse.
pub fn load_posts(dir: &Path, config: &InkConfig) -> Result<PostSet> {
    let Collected {
        documents,
        unreadable,
    } = collect_documents(dir, config)?;
    let mut set = ink_parse::build_posts(documents, &config.assemble_options());
    set.skipped.extend(unreadable);
    Ok(set)
}
