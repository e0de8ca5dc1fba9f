use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Temporary prompt tree; dropped with the test.
pub struct PromptTree {
    dir: TempDir,
}

impl PromptTree {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("failed to allocate prompt tree")?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn mkdir(&self, relative: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(&path).with_context(|| format!("failed to create {}", path.display()))?;
        Ok(path)
    }
}

/// Small tree covering every category path the scanner distinguishes.
pub fn sample_tree() -> Result<PromptTree> {
    let tree = PromptTree::new()?;
    tree.write("Cursor Prompts/Agent Prompt.txt", "You are a coding agent.")?;
    tree.write("Cursor Prompts/Agent Tools v1.0.md", "Tools: edit_file, run_terminal.")?;
    tree.write("Cursor Prompts/README.md", "not a prompt")?;
    tree.write("Claude Code/claude-code-system-prompt.txt", "You are Claude Code.")?;
    tree.write("Kiro/Spec_Prompt.txt", "Write a spec before coding.")?;
    tree.write("Lovable/v2/Agent Prompt.md", "Build web apps quickly.")?;
    tree.write("Mystery Tool/prompt.txt", "Unclassified helper.")?;
    tree.write("Only Readme/readme.md", "docs only")?;
    tree.write("node_modules/pkg/prompt.txt", "should never be scanned")?;
    tree.write(".git/HEAD.txt", "ref: refs/heads/main")?;
    tree.write("prompt-directory/src/notes.txt", "the app itself")?;
    tree.mkdir("Empty Tool")?;
    tree.write("LICENSE.txt", "top-level files are not tools")?;
    Ok(tree)
}

pub fn bin_path(name: &str) -> PathBuf {
    match name {
        "prompt-directory" => PathBuf::from(env!("CARGO_BIN_EXE_prompt-directory")),
        "catalog-export" => PathBuf::from(env!("CARGO_BIN_EXE_catalog-export")),
        other => panic!("unknown binary {other}"),
    }
}

/// Command for `name` with the ambient configuration cleared.
pub fn bin_command(name: &str) -> Command {
    let mut cmd = Command::new(bin_path(name));
    for var in [
        "PROMPT_DIRECTORY_ROOT",
        "PROMPT_DIRECTORY_EXCLUDE",
        "PROMPT_DIRECTORY_CACHE",
        "PROMPT_DIRECTORY_JSON",
        "PROMPT_DIRECTORY_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}
