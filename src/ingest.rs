//! Directory-to-catalog ingestion.
//!
//! The walk is best-effort: unreadable directories, entries, and files shrink
//! the catalog and leave a `ScanDiagnostic` behind, but nothing here returns an
//! error. Traversal uses an explicit stack of pending directory listings so
//! adversarially deep trees cannot exhaust the call stack, while keeping the
//! pre-order, name-prefix-joining semantics of a recursive walk.

use crate::catalog::{
    Catalog, Category, DiagnosticKind, Prompt, PromptId, ScanDiagnostic, Tool, ToolId, categorize,
};
use icu_collator::{Collator, CollatorOptions};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory names skipped at every depth unless overridden.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] =
    &[".git", ".github", "assets", "node_modules", "prompt-directory"];

const PROMPT_EXTENSIONS: &[&str] = &[".txt", ".md"];
const README_FILENAME: &str = "readme.md";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Knobs for a scan. The default matches the stock prompt tree layout.
pub struct ScanOptions {
    pub excluded: BTreeSet<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            excluded: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl ScanOptions {
    /// Default exclusions plus `extra`.
    pub fn with_extra_exclusions<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        options.excluded.extend(extra.into_iter().map(Into::into));
        options
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }
}

/// Scan `root` into a sorted catalog.
///
/// Each non-excluded child directory becomes a tool candidate; candidates
/// without prompts are dropped. A missing or unreadable root produces an
/// empty catalog with a `RootUnreadable` diagnostic.
pub fn scan_root(root: &Path, options: &ScanOptions) -> Catalog {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    let mut diagnostics = Vec::new();

    let entries = match list_dir(&root, &mut diagnostics, DiagnosticKind::RootUnreadable) {
        Some(entries) => entries,
        None => {
            return Catalog {
                root,
                tools: Vec::new(),
                diagnostics,
            };
        }
    };

    let mut tools = Vec::new();
    for (name, path) in entries {
        let Some(name) = utf8_name(name, &path, &mut diagnostics) else {
            continue;
        };
        if options.is_excluded(&name) {
            continue;
        }
        if !is_dir(&path) {
            continue;
        }

        let category = categorize(&name);
        let prompts = scan_dir(&path, &name, category, options, &mut diagnostics);
        debug!(
            tool = %name,
            category = category.as_str(),
            prompts = prompts.len(),
            "scanned tool directory"
        );
        if let Some(tool) = Tool::new(name, category, prompts) {
            tools.push(tool);
        }
    }

    let order = NameOrder::new();
    tools.sort_by(|a, b| order.compare(a.name(), b.name()));
    record_duplicate_ids(&tools, &mut diagnostics);

    Catalog {
        root,
        tools,
        diagnostics,
    }
}

struct Frame {
    tool_name: String,
    // Reversed so `pop` yields entries in enumeration order.
    pending: Vec<(OsString, PathBuf)>,
}

/// Collect every prompt below `dir`, naming nested sets `tool/sub/dir`.
///
/// Entries are visited in filesystem enumeration order; a subdirectory's
/// prompts are spliced in at the position the subdirectory was enumerated.
pub fn scan_dir(
    dir: &Path,
    tool_name: &str,
    category: Category,
    options: &ScanOptions,
    diagnostics: &mut Vec<ScanDiagnostic>,
) -> Vec<Prompt> {
    let mut prompts = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    // Canonical paths of directories currently on the stack; a symlink back
    // into one of them would otherwise loop forever.
    let mut active: Vec<Option<PathBuf>> = Vec::new();

    if let Some(frame) = open_frame(dir, tool_name.to_string(), diagnostics) {
        stack.push(frame);
        active.push(fs::canonicalize(dir).ok());
    }

    while let Some(frame) = stack.last_mut() {
        let Some((raw_name, path)) = frame.pending.pop() else {
            stack.pop();
            active.pop();
            continue;
        };
        let Some(name) = utf8_name(raw_name, &path, diagnostics) else {
            continue;
        };

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                push_diagnostic(
                    diagnostics,
                    ScanDiagnostic::new(DiagnosticKind::EntryUnreadable, &path, err.to_string()),
                );
                continue;
            }
        };

        if metadata.is_file() {
            if !is_prompt_file(&name) {
                continue;
            }
            if let Some(prompt) = read_prompt(&path, &name, &frame.tool_name, category, diagnostics)
            {
                prompts.push(prompt);
            }
        } else if metadata.is_dir() && !options.is_excluded(&name) {
            let canonical = fs::canonicalize(&path).ok();
            if canonical.is_some() && active.contains(&canonical) {
                push_diagnostic(
                    diagnostics,
                    ScanDiagnostic::new(
                        DiagnosticKind::SymlinkCycle,
                        &path,
                        "directory resolves to one of its ancestors",
                    ),
                );
                continue;
            }
            let nested_name = format!("{}/{}", frame.tool_name, name);
            if let Some(child) = open_frame(&path, nested_name, diagnostics) {
                stack.push(child);
                active.push(canonical);
            }
        }
    }

    prompts
}

/// Tool name ordering: root-locale collation, then raw bytes so the order is
/// total and stable across runs. `kiro` sorts before `Kiro`.
pub struct NameOrder {
    collator: Option<Collator>,
}

impl NameOrder {
    pub fn new() -> Self {
        let collator = match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(err) => {
                warn!(error = ?err, "root collation unavailable; using case-folded order");
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let collated = match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => folded_compare(a, b),
        };
        collated.then_with(|| a.cmp(b))
    }
}

impl Default for NameOrder {
    fn default() -> Self {
        Self::new()
    }
}

// Case-folded primary key; on a tie the lowercase spelling sorts first.
fn folded_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn is_prompt_file(name: &str) -> bool {
    PROMPT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        && !name.eq_ignore_ascii_case(README_FILENAME)
}

fn strip_prompt_extension(name: &str) -> &str {
    PROMPT_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

fn read_prompt(
    path: &Path,
    filename: &str,
    tool_name: &str,
    category: Category,
    diagnostics: &mut Vec<ScanDiagnostic>,
) -> Option<Prompt> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            let kind = if err.kind() == io::ErrorKind::InvalidData {
                DiagnosticKind::InvalidUtf8
            } else {
                DiagnosticKind::FileUnreadable
            };
            push_diagnostic(diagnostics, ScanDiagnostic::new(kind, path, err.to_string()));
            return None;
        }
    };

    let name = strip_prompt_extension(filename).to_string();
    Some(Prompt {
        id: PromptId::from_parts(tool_name, &name),
        name,
        filename: filename.to_string(),
        content,
        tool: tool_name.to_string(),
        category,
        path: path.to_path_buf(),
    })
}

fn open_frame(
    dir: &Path,
    tool_name: String,
    diagnostics: &mut Vec<ScanDiagnostic>,
) -> Option<Frame> {
    let mut pending = list_dir(dir, diagnostics, DiagnosticKind::DirUnreadable)?;
    pending.reverse();
    Some(Frame { tool_name, pending })
}

fn list_dir(
    dir: &Path,
    diagnostics: &mut Vec<ScanDiagnostic>,
    failure: DiagnosticKind,
) -> Option<Vec<(OsString, PathBuf)>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            push_diagnostic(diagnostics, ScanDiagnostic::new(failure, dir, err.to_string()));
            return None;
        }
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        match entry {
            Ok(entry) => entries.push((entry.file_name(), entry.path())),
            Err(err) => push_diagnostic(
                diagnostics,
                ScanDiagnostic::new(DiagnosticKind::EntryUnreadable, dir, err.to_string()),
            ),
        }
    }
    Some(entries)
}

fn utf8_name(
    name: OsString,
    path: &Path,
    diagnostics: &mut Vec<ScanDiagnostic>,
) -> Option<String> {
    match name.into_string() {
        Ok(name) => Some(name),
        Err(_) => {
            push_diagnostic(
                diagnostics,
                ScanDiagnostic::new(
                    DiagnosticKind::EntryUnreadable,
                    path,
                    "file name is not valid UTF-8",
                ),
            );
            None
        }
    }
}

fn is_dir(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}

fn record_duplicate_ids(tools: &[Tool], diagnostics: &mut Vec<ScanDiagnostic>) {
    let mut tool_owners: BTreeMap<&ToolId, &str> = BTreeMap::new();
    for tool in tools {
        if let Some(first) = tool_owners.insert(tool.id(), tool.name()) {
            push_diagnostic(
                diagnostics,
                ScanDiagnostic::new(
                    DiagnosticKind::DuplicateToolId,
                    Path::new(tool.name()),
                    format!(
                        "tool id '{}' already used by '{}'; lookups resolve to the first",
                        tool.id(),
                        first
                    ),
                ),
            );
        }

        let mut prompt_ids: BTreeSet<&PromptId> = BTreeSet::new();
        for prompt in tool.prompts() {
            if !prompt_ids.insert(&prompt.id) {
                push_diagnostic(
                    diagnostics,
                    ScanDiagnostic::new(
                        DiagnosticKind::DuplicatePromptId,
                        &prompt.path,
                        format!(
                            "prompt id '{}' repeats within '{}'; lookups resolve to the first",
                            prompt.id,
                            tool.name()
                        ),
                    ),
                );
            }
        }
    }
}

fn push_diagnostic(diagnostics: &mut Vec<ScanDiagnostic>, diagnostic: ScanDiagnostic) {
    match diagnostic.kind {
        DiagnosticKind::DuplicateToolId | DiagnosticKind::DuplicatePromptId => {
            debug!(%diagnostic, "ambiguous catalog id")
        }
        _ => warn!(%diagnostic, "skipping part of the prompt tree"),
    }
    diagnostics.push(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn prompt_file_filter_is_case_sensitive_on_extension() {
        assert!(is_prompt_file("agent.txt"));
        assert!(is_prompt_file("agent.md"));
        assert!(!is_prompt_file("agent.TXT"));
        assert!(!is_prompt_file("agent.json"));
        assert!(!is_prompt_file("README.md"));
        assert!(!is_prompt_file("readme.md"));
        assert!(is_prompt_file("readme.txt"));
    }

    #[test]
    fn strip_prompt_extension_removes_only_known_suffix() {
        assert_eq!(strip_prompt_extension("Agent Prompt.txt"), "Agent Prompt");
        assert_eq!(strip_prompt_extension("notes.v2.md"), "notes.v2");
        assert_eq!(strip_prompt_extension("tools.json"), "tools.json");
    }

    #[test]
    fn name_order_follows_root_collation() {
        let order = NameOrder::new();
        let mut names = vec!["windsurf", "kiro", "Kiro", "_drafts", "1password", "Ämp", "Bolt"];
        names.sort_by(|a, b| order.compare(a, b));
        assert_eq!(
            names,
            vec!["_drafts", "1password", "Ämp", "Bolt", "kiro", "Kiro", "windsurf"]
        );
        assert_eq!(order.compare("kiro", "Kiro"), Ordering::Less);
        assert_eq!(order.compare("Kiro", "Kiro"), Ordering::Equal);
    }

    #[test]
    fn folded_order_puts_lowercase_first_on_ties() {
        let mut names = vec!["windsurf", "Kiro", "Amp", "kiro", "bolt"];
        names.sort_by(|a, b| folded_compare(a, b));
        assert_eq!(names, vec!["Amp", "bolt", "kiro", "Kiro", "windsurf"]);
    }

    #[test]
    fn scan_dir_joins_nested_tool_names() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Cursor Prompts/Agent Tools/v1/tools.md", b"tool list");
        let mut diagnostics = Vec::new();

        let prompts = scan_dir(
            &temp.path().join("Cursor Prompts"),
            "Cursor Prompts",
            Category::CodeEditors,
            &ScanOptions::default(),
            &mut diagnostics,
        );

        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].tool, "Cursor Prompts/Agent Tools/v1");
        assert_eq!(prompts[0].id.as_str(), "cursor-prompts-agent-tools-v1-tools");
        assert_eq!(prompts[0].category, Category::CodeEditors);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn scan_dir_skips_excluded_nested_dirs() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Bolt/prompt.txt", b"kept");
        write(temp.path(), "Bolt/node_modules/pkg/readme.txt", b"dropped");
        write(temp.path(), "Bolt/assets/banner.md", b"dropped");
        let mut diagnostics = Vec::new();

        let prompts = scan_dir(
            &temp.path().join("Bolt"),
            "Bolt",
            Category::OpenSource,
            &ScanOptions::default(),
            &mut diagnostics,
        );

        let names: Vec<_> = prompts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["prompt"]);
    }

    #[test]
    fn invalid_utf8_file_is_reported_not_fatal() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Lumo/good.txt", b"fine");
        write(temp.path(), "Lumo/bad.txt", &[0xff, 0xfe, 0xfd]);

        let catalog = scan_root(temp.path(), &ScanOptions::default());

        assert_eq!(catalog.tools.len(), 1);
        assert_eq!(catalog.tools[0].prompt_count(), 1);
        assert_eq!(catalog.tools[0].prompts()[0].name, "good");
        assert_eq!(catalog.diagnostics.len(), 1);
        assert_eq!(catalog.diagnostics[0].kind, DiagnosticKind::InvalidUtf8);
        assert!(catalog.diagnostics[0].path.ends_with("Lumo/bad.txt"));
    }

    #[test]
    fn missing_root_yields_empty_catalog_with_diagnostic() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let catalog = scan_root(&missing, &ScanOptions::default());

        assert!(catalog.tools.is_empty());
        assert_eq!(catalog.diagnostics.len(), 1);
        assert_eq!(catalog.diagnostics[0].kind, DiagnosticKind::RootUnreadable);
    }

    #[test]
    fn root_level_files_are_not_tools() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "LICENSE.md", b"license");
        write(temp.path(), "Poke/system.txt", b"poke");

        let catalog = scan_root(temp.path(), &ScanOptions::default());

        assert_eq!(catalog.tools.len(), 1);
        assert_eq!(catalog.tools[0].name(), "Poke");
    }

    #[test]
    fn extra_exclusions_extend_defaults() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Drafts/wip.md", b"draft");
        write(temp.path(), "Kiro/spec.md", b"spec");

        let options = ScanOptions::with_extra_exclusions(["Drafts"]);
        assert!(options.is_excluded(".git"));
        let catalog = scan_root(temp.path(), &options);

        let names: Vec<_> = catalog.tools.iter().map(Tool::name).collect();
        assert_eq!(names, vec!["Kiro"]);
    }

    #[test]
    fn duplicate_prompt_ids_are_kept_and_reported() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Trae/Agent Prompt.txt", b"one");
        write(temp.path(), "Trae/agent-prompt.md", b"two");

        let catalog = scan_root(temp.path(), &ScanOptions::default());

        assert_eq!(catalog.tools[0].prompt_count(), 2);
        let duplicates: Vec<_> = catalog
            .diagnostics
            .iter()
            .filter(|diag| diag.kind == DiagnosticKind::DuplicatePromptId)
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert!(duplicates[0].message.contains("trae-agent-prompt"));
    }

    #[test]
    fn duplicate_tool_ids_are_reported() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Same Dev/a.txt", b"one");
        write(temp.path(), "same-dev/b.txt", b"two");

        let catalog = scan_root(temp.path(), &ScanOptions::default());

        assert_eq!(catalog.tools.len(), 2);
        assert!(
            catalog
                .diagnostics
                .iter()
                .any(|diag| diag.kind == DiagnosticKind::DuplicateToolId)
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycles_terminate() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        write(temp.path(), "Warp.dev/prompt.md", b"warp");
        symlink(
            temp.path().join("Warp.dev"),
            temp.path().join("Warp.dev/loop"),
        )
        .unwrap();

        let catalog = scan_root(temp.path(), &ScanOptions::default());

        assert_eq!(catalog.tools.len(), 1);
        assert_eq!(catalog.tools[0].prompt_count(), 1);
        assert!(
            catalog
                .diagnostics
                .iter()
                .any(|diag| diag.kind == DiagnosticKind::SymlinkCycle)
        );
    }

    #[test]
    fn deep_trees_do_not_recurse() {
        let temp = TempDir::new().unwrap();
        let mut relative = PathBuf::from("Deep");
        for depth in 0..200 {
            relative.push(format!("d{depth}"));
        }
        relative.push("leaf.txt");
        write(temp.path(), relative.to_str().unwrap(), b"leaf");

        let catalog = scan_root(temp.path(), &ScanOptions::default());

        assert_eq!(catalog.tools.len(), 1);
        let prompt = &catalog.tools[0].prompts()[0];
        assert!(prompt.tool.starts_with("Deep/d0/d1/"));
        assert!(prompt.tool.ends_with("/d199"));
    }
}
