//! Read-only query surface over a prompt root.
//!
//! Every call asks the repository for a snapshot; under the default
//! `CachePolicy::Rescan` that means a full scan per call, so results always
//! reflect the tree as it is on disk. Returned values are owned copies and
//! never alias catalog state shared between calls.

use crate::catalog::{
    CachePolicy, Catalog, CatalogIndex, CatalogRepository, CatalogStats, Category, Prompt,
    PromptId, Tool, ToolId,
};
use crate::config::DirectoryConfig;
use crate::ingest::ScanOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Query entry point for one prompt root.
pub struct PromptDirectory {
    repository: CatalogRepository,
}

impl PromptDirectory {
    /// Rescan-per-call directory with default exclusions.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_options(root, ScanOptions::default(), CachePolicy::Rescan)
    }

    pub fn with_options(root: impl Into<PathBuf>, options: ScanOptions, policy: CachePolicy) -> Self {
        Self {
            repository: CatalogRepository::new(root, options, policy),
        }
    }

    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self::with_options(config.root.clone(), config.scan_options(), config.cache)
    }

    pub fn root(&self) -> &Path {
        self.repository.root()
    }

    /// All tools with at least one prompt, sorted by name.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.snapshot().catalog().tools.clone()
    }

    /// Categories observed on current tools, sorted by label.
    pub fn list_categories(&self) -> Vec<Category> {
        self.snapshot().catalog().categories()
    }

    pub fn get_tool(&self, tool_id: &str) -> Option<Tool> {
        self.snapshot()
            .tool(&ToolId(tool_id.to_string()))
            .cloned()
    }

    pub fn get_prompt(&self, tool_id: &str, prompt_id: &str) -> Option<Prompt> {
        self.snapshot()
            .prompt(
                &ToolId(tool_id.to_string()),
                &PromptId(prompt_id.to_string()),
            )
            .cloned()
    }

    /// Case-insensitive substring search over prompt name, tool, and content.
    ///
    /// Results keep catalog order (tool order, then discovery order). An empty
    /// query matches every prompt; callers that do not want that should not
    /// issue one.
    pub fn search(&self, query: &str) -> Vec<Prompt> {
        let snapshot = self.snapshot();
        search_catalog(snapshot.catalog(), query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn tools_by_category(&self, category: Category) -> Vec<Tool> {
        self.snapshot()
            .catalog()
            .tools
            .iter()
            .filter(|tool| tool.category() == category)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        self.snapshot().catalog().stats()
    }

    /// Full scan result, diagnostics included.
    pub fn catalog(&self) -> Catalog {
        self.snapshot().catalog().clone()
    }

    /// Forget any cached snapshot. A no-op under `CachePolicy::Rescan`.
    pub fn invalidate(&self) {
        self.repository.invalidate();
    }

    fn snapshot(&self) -> Arc<CatalogIndex> {
        self.repository.snapshot()
    }
}

/// Borrowing variant of [`PromptDirectory::search`] for callers already
/// holding a catalog.
pub fn search_catalog<'a>(catalog: &'a Catalog, query: &str) -> Vec<&'a Prompt> {
    let needle = query.to_lowercase();
    catalog
        .prompts()
        .filter(|prompt| {
            prompt.name.to_lowercase().contains(&needle)
                || prompt.tool.to_lowercase().contains(&needle)
                || prompt.content.to_lowercase().contains(&needle)
        })
        .collect()
}
