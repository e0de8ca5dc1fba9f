//! In-memory catalog entities produced by one ingestion pass.
//!
//! `Tool` keeps its prompt list private so the cached `prompt_count` can never
//! drift from the list it summarises. Everything here serializes with the
//! field names presentation code expects (`promptCount`, category labels).

use crate::catalog::identity::{Category, PromptId, ToolId};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One prompt file, scoped to the tool directory it was found under.
pub struct Prompt {
    pub id: PromptId,
    pub name: String,
    pub filename: String,
    pub content: String,
    /// Tool display name; nested directories append `/<dir>`.
    pub tool: String,
    pub category: Category,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub path: PathBuf,
}

impl Prompt {
    /// Id of the top-level tool that owns this prompt, even for prompts found
    /// in nested directories (`tool` is then `Tool/sub/dir`).
    pub fn tool_id(&self) -> ToolId {
        let top_level = self.tool.split('/').next().unwrap_or(&self.tool);
        ToolId::from_name(top_level)
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// First `max_chars` characters with line breaks flattened to spaces.
    pub fn preview(&self, max_chars: usize) -> String {
        self.content
            .chars()
            .take(max_chars)
            .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// A top-level directory under the scan root and the prompts found inside it.
pub struct Tool {
    id: ToolId,
    name: String,
    category: Category,
    prompts: Vec<Prompt>,
    prompt_count: usize,
}

impl Tool {
    /// Build a tool from a non-empty prompt list.
    ///
    /// Returns `None` for an empty list: tools without prompts are never part
    /// of a catalog.
    pub fn new(name: impl Into<String>, category: Category, prompts: Vec<Prompt>) -> Option<Self> {
        if prompts.is_empty() {
            return None;
        }
        let name = name.into();
        Some(Self {
            id: ToolId::from_name(&name),
            prompt_count: prompts.len(),
            name,
            category,
            prompts,
        })
    }

    pub fn id(&self) -> &ToolId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn prompt_count(&self) -> usize {
        self.prompt_count
    }

    /// First prompt with the given id, in discovery order.
    pub fn prompt(&self, id: &PromptId) -> Option<&Prompt> {
        self.prompts.iter().find(|prompt| &prompt.id == id)
    }

    pub fn into_prompts(self) -> Vec<Prompt> {
        self.prompts
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Why part of the tree did not make it into the catalog (or made it in with
/// an ambiguous id).
pub enum DiagnosticKind {
    RootUnreadable,
    DirUnreadable,
    EntryUnreadable,
    FileUnreadable,
    InvalidUtf8,
    SymlinkCycle,
    DuplicateToolId,
    DuplicatePromptId,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::RootUnreadable => "root_unreadable",
            DiagnosticKind::DirUnreadable => "dir_unreadable",
            DiagnosticKind::EntryUnreadable => "entry_unreadable",
            DiagnosticKind::FileUnreadable => "file_unreadable",
            DiagnosticKind::InvalidUtf8 => "invalid_utf8",
            DiagnosticKind::SymlinkCycle => "symlink_cycle",
            DiagnosticKind::DuplicateToolId => "duplicate_tool_id",
            DiagnosticKind::DuplicatePromptId => "duplicate_prompt_id",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Non-fatal scan event. Recorded alongside the catalog instead of aborting.
pub struct ScanDiagnostic {
    pub kind: DiagnosticKind,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub path: PathBuf,
    pub message: String,
}

impl ScanDiagnostic {
    pub fn new(kind: DiagnosticKind, path: &Path, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Paths serialize lossily: a root (or a reported entry) that is not UTF-8
/// must not make the whole document unserializable.
pub(crate) fn serialize_path_lossy<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

impl fmt::Display for ScanDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.kind.as_str(),
            self.path.display(),
            self.message
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
/// Result of one ingestion pass: sorted tools plus everything that was skipped.
pub struct Catalog {
    #[serde(serialize_with = "serialize_path_lossy")]
    pub root: PathBuf,
    pub tools: Vec<Tool>,
    pub diagnostics: Vec<ScanDiagnostic>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Headline counters for a catalog.
pub struct CatalogStats {
    pub tools: usize,
    pub prompts: usize,
    pub categories: usize,
}

impl Catalog {
    /// Every prompt in catalog order: tool sort order, then discovery order.
    pub fn prompts(&self) -> impl Iterator<Item = &Prompt> {
        self.tools.iter().flat_map(|tool| tool.prompts().iter())
    }

    /// Distinct categories present, sorted by label.
    pub fn categories(&self) -> Vec<Category> {
        let labels: BTreeSet<&'static str> = self
            .tools
            .iter()
            .map(|tool| tool.category().as_str())
            .collect();
        labels.into_iter().filter_map(Category::parse).collect()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            tools: self.tools.len(),
            prompts: self.tools.iter().map(Tool::prompt_count).sum(),
            categories: self.categories().len(),
        }
    }
}
