//! Id-keyed view over a single catalog snapshot.
//!
//! Lookups follow first-wins semantics: when two tools (or two prompts within
//! a tool) slugify to the same id, the one earlier in catalog order answers.
//! Ingestion records a diagnostic for every such collision.

use crate::catalog::{Catalog, Prompt, PromptId, Tool, ToolId};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

#[derive(Debug, Clone)]
/// Catalog plus a derived tool-id index.
pub struct CatalogIndex {
    catalog: Catalog,
    by_id: BTreeMap<ToolId, usize>,
}

impl CatalogIndex {
    pub fn new(catalog: Catalog) -> Self {
        let mut by_id = BTreeMap::new();
        for (position, tool) in catalog.tools.iter().enumerate() {
            if let Entry::Vacant(slot) = by_id.entry(tool.id().clone()) {
                slot.insert(position);
            }
        }
        Self { catalog, by_id }
    }

    /// Resolve a tool by id; `None` is an expected outcome, not an error.
    pub fn tool(&self, id: &ToolId) -> Option<&Tool> {
        self.by_id
            .get(id)
            .and_then(|position| self.catalog.tools.get(*position))
    }

    /// Resolve a prompt inside the tool that owns `tool_id`.
    pub fn prompt(&self, tool_id: &ToolId, prompt_id: &PromptId) -> Option<&Prompt> {
        self.tool(tool_id)?.prompt(prompt_id)
    }

    /// Distinct tool ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &ToolId> {
        self.by_id.keys()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}

impl From<Catalog> for CatalogIndex {
    fn from(catalog: Catalog) -> Self {
        Self::new(catalog)
    }
}
