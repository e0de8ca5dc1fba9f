//! Catalog and query layer for a tree of AI tool system prompts.
//!
//! A prompt tree is a directory whose children are tool directories holding
//! `.txt`/`.md` prompt files, possibly nested. `ingest` turns that tree into a
//! sorted [`Catalog`] of [`Tool`]s and [`Prompt`]s, and [`PromptDirectory`]
//! answers the five read operations presentation code relies on: list tools,
//! list categories, get a tool, get a prompt, and search. Scanning is
//! best-effort; anything skipped shows up as a [`ScanDiagnostic`] rather than
//! an error.

use anyhow::{Context, Result};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod catalog;
pub mod config;
pub mod export;
pub mod ingest;
pub mod query;
pub mod runtime;
mod schema_loader;

pub use catalog::{
    CachePolicy, Catalog, CatalogIndex, CatalogRepository, CatalogStats, Category, DiagnosticKind,
    Prompt, PromptId, ScanDiagnostic, Tool, ToolId, categorize, slugify,
};
pub use config::{ConfigOverrides, DirectoryConfig};
pub use export::{CatalogExport, ExportSchema, export_catalog};
pub use ingest::{DEFAULT_EXCLUDED_DIRS, ScanOptions, scan_dir, scan_root};
pub use query::{PromptDirectory, search_catalog};

/// Verifies that a root hint names an existing directory.
fn root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.trim().is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.is_dir() {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

/// Locate the prompt tree to scan.
///
/// Search order: `PROMPT_DIRECTORY_ROOT` (taken as-is, so a missing directory
/// surfaces as a `root_unreadable` diagnostic instead of a silent fallback),
/// the build-time `PROMPT_DIRECTORY_ROOT_HINT` when it still exists, then the
/// parent of the working directory, since the app conventionally lives one
/// level inside the prompt tree.
pub fn find_prompts_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var(config::ROOT_ENV) {
        if !env_root.trim().is_empty() {
            return Ok(PathBuf::from(env_root));
        }
    }

    if let Some(hint) = option_env!("PROMPT_DIRECTORY_ROOT_HINT") {
        if let Some(root) = root_from_hint(hint) {
            return Ok(root);
        }
    }

    let cwd = env::current_dir().context("Unable to read the current directory")?;
    Ok(parent_or_self(&cwd))
}

fn parent_or_self(dir: &Path) -> PathBuf {
    dir.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.to_path_buf())
}

/// Split comma-delimited configuration lists into trimmed tokens. Spaces
/// inside a token are kept, since tool directory names contain them.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
