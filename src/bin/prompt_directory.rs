//! Command-line browser for a prompt tree.
//!
//! Each invocation runs one query against a fresh scan and prints either a
//! plain-text view or JSON (`--json`, or `PROMPT_DIRECTORY_JSON=1`). Result
//! truncation for search and previews happens here; the library always
//! returns everything.

use anyhow::{Context, Result, anyhow, bail};
use prompt_directory::runtime::{env_flag, init_logging};
use prompt_directory::{
    CatalogStats, Category, ConfigOverrides, DirectoryConfig, Prompt, PromptDirectory,
    ScanDiagnostic, Tool,
};
use serde::Serialize;
use std::env;
use std::ffi::OsString;
use std::fmt::{self, Write as _};
use std::path::PathBuf;

const DEFAULT_SEARCH_LIMIT: usize = 30;
const PREVIEW_CHARS: usize = 200;
const JSON_ENV: &str = "PROMPT_DIRECTORY_JSON";

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse(env::args_os())?;
    let config = DirectoryConfig::load(cli.overrides.clone())?;
    let directory = PromptDirectory::from_config(&config);

    let mut output = String::new();
    execute(&cli, &directory, &mut output)?;
    print!("{output}");
    Ok(())
}

fn execute(cli: &Cli, directory: &PromptDirectory, out: &mut String) -> Result<()> {
    match &cli.command {
        Command::Tools { category } => {
            let tools = match category {
                Some(category) => directory.tools_by_category(*category),
                None => directory.list_tools(),
            };
            if cli.json {
                let summaries: Vec<_> = tools.iter().map(ToolSummary::from).collect();
                write_json(out, &summaries)?;
            } else {
                render_tools(&tools, out)?;
            }
        }
        Command::Categories => {
            let categories = directory.list_categories();
            if cli.json {
                write_json(out, &categories)?;
            } else {
                for category in categories {
                    writeln!(out, "{category}")?;
                }
            }
        }
        Command::Tool { tool_id } => {
            let tool = directory
                .get_tool(tool_id)
                .ok_or_else(|| anyhow!("tool not found: {tool_id}"))?;
            if cli.json {
                write_json(out, &tool)?;
            } else {
                render_tool(&tool, out)?;
            }
        }
        Command::Prompt { tool_id, prompt_id } => {
            let prompt = directory
                .get_prompt(tool_id, prompt_id)
                .ok_or_else(|| anyhow!("prompt not found: {tool_id}/{prompt_id}"))?;
            if cli.json {
                write_json(out, &prompt)?;
            } else {
                render_prompt(&prompt, out)?;
            }
        }
        Command::Search { query, limit } => {
            let results = directory.search(query);
            if cli.json {
                write_json(
                    out,
                    &SearchPage {
                        query,
                        total: results.len(),
                        results: &results[..results.len().min(*limit)],
                    },
                )?;
            } else {
                render_search(query, &results, *limit, out)?;
            }
        }
        Command::Stats => {
            let stats = directory.stats();
            if cli.json {
                write_json(out, &stats)?;
            } else {
                render_stats(&stats, out)?;
            }
        }
        Command::Diagnostics => {
            let catalog = directory.catalog();
            if cli.json {
                write_json(out, &catalog.diagnostics)?;
            } else {
                render_diagnostics(&catalog.diagnostics, out)?;
            }
        }
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(out: &mut String, value: &T) -> Result<()> {
    out.push_str(&serde_json::to_string_pretty(value).context("serializing output")?);
    out.push('\n');
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSummary<'a> {
    id: &'a str,
    name: &'a str,
    category: Category,
    prompt_count: usize,
}

impl<'a> From<&'a Tool> for ToolSummary<'a> {
    fn from(tool: &'a Tool) -> Self {
        Self {
            id: tool.id().as_str(),
            name: tool.name(),
            category: tool.category(),
            prompt_count: tool.prompt_count(),
        }
    }
}

#[derive(Serialize)]
struct SearchPage<'a> {
    query: &'a str,
    total: usize,
    results: &'a [Prompt],
}

fn render_tools(tools: &[Tool], out: &mut impl fmt::Write) -> fmt::Result {
    let prompts: usize = tools.iter().map(Tool::prompt_count).sum();
    writeln!(out, "{} tools, {} prompts", tools.len(), prompts)?;
    for tool in tools {
        writeln!(
            out,
            "  {:<32} {:<18} {:>4}  {}",
            tool.id(),
            tool.category(),
            tool.prompt_count(),
            tool.name()
        )?;
    }
    Ok(())
}

fn render_tool(tool: &Tool, out: &mut impl fmt::Write) -> fmt::Result {
    writeln!(out, "{}", tool.name())?;
    writeln!(out, "  id:       {}", tool.id())?;
    writeln!(out, "  category: {}", tool.category())?;
    writeln!(out, "  prompts:  {}", plural(tool.prompt_count(), "prompt"))?;
    writeln!(out)?;
    for prompt in tool.prompts() {
        writeln!(
            out,
            "  - {} ({}, {} characters)",
            prompt.id,
            prompt.filename,
            prompt.char_count()
        )?;
    }
    Ok(())
}

fn render_prompt(prompt: &Prompt, out: &mut impl fmt::Write) -> fmt::Result {
    writeln!(out, "{} / {}", prompt.tool, prompt.name)?;
    writeln!(out, "  id:       {}", prompt.id)?;
    writeln!(out, "  file:     {}", prompt.filename)?;
    writeln!(out, "  category: {}", prompt.category)?;
    writeln!(out, "  length:   {} characters", prompt.char_count())?;
    writeln!(out)?;
    out.write_str(&prompt.content)?;
    if !prompt.content.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

fn render_search(
    query: &str,
    results: &[Prompt],
    limit: usize,
    out: &mut impl fmt::Write,
) -> fmt::Result {
    let shown = results.len().min(limit);
    writeln!(
        out,
        "search '{}': {} found, showing {}",
        query,
        results.len(),
        shown
    )?;
    if results.is_empty() {
        writeln!(out, "  no results; try a different search term")?;
        return Ok(());
    }
    for prompt in results.iter().take(limit) {
        writeln!(out, "  {}/{}  {}", prompt.tool_id(), prompt.id, prompt.name)?;
        let preview = prompt.preview(PREVIEW_CHARS);
        let preview = preview.trim();
        if !preview.is_empty() {
            let ellipsis = if prompt.char_count() > PREVIEW_CHARS { "…" } else { "" };
            writeln!(out, "    {preview}{ellipsis}")?;
        }
    }
    Ok(())
}

fn render_stats(stats: &CatalogStats, out: &mut impl fmt::Write) -> fmt::Result {
    writeln!(out, "tools:      {}", stats.tools)?;
    writeln!(out, "prompts:    {}", stats.prompts)?;
    writeln!(out, "categories: {}", stats.categories)
}

fn render_diagnostics(diagnostics: &[ScanDiagnostic], out: &mut impl fmt::Write) -> fmt::Result {
    if diagnostics.is_empty() {
        return writeln!(out, "no diagnostics");
    }
    for diagnostic in diagnostics {
        writeln!(out, "{diagnostic}")?;
    }
    Ok(())
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Tools { category: Option<Category> },
    Categories,
    Tool { tool_id: String },
    Prompt { tool_id: String, prompt_id: String },
    Search { query: String, limit: usize },
    Stats,
    Diagnostics,
}

#[derive(Debug, Clone)]
struct Cli {
    overrides: ConfigOverrides,
    json: bool,
    command: Command,
}

impl Cli {
    fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut args = args.into_iter();
        let _program = args.next();

        let mut overrides = ConfigOverrides::default();
        let mut json = env_flag(JSON_ENV);
        let mut category = None;
        let mut limit = DEFAULT_SEARCH_LIMIT;
        let mut positional: Vec<String> = Vec::new();

        while let Some(arg) = args.next() {
            let arg = arg
                .into_string()
                .map_err(|_| anyhow!("invalid UTF-8 in argument"))?;
            match arg.as_str() {
                "--root" => {
                    overrides.root = Some(PathBuf::from(next_value(&mut args, "--root")?));
                }
                "--exclude" => {
                    let value = next_value(&mut args, "--exclude")?;
                    overrides
                        .extra_excluded
                        .extend(prompt_directory::split_list(&value));
                }
                "--cache" => {
                    let value = next_value(&mut args, "--cache")?;
                    overrides.cache = Some(value.parse()?);
                }
                "--category" => {
                    let value = next_value(&mut args, "--category")?;
                    category = Some(value.parse::<Category>()?);
                }
                "--limit" => {
                    let value = next_value(&mut args, "--limit")?;
                    limit = value
                        .parse()
                        .with_context(|| format!("--limit expects a number, got '{value}'"))?;
                }
                "--json" => json = true,
                "--help" | "-h" => usage(0),
                flag if flag.starts_with("--") => bail!("unknown argument: {flag}"),
                _ => positional.push(arg),
            }
        }

        let command = Self::command_from(positional, category, limit)?;
        Ok(Self {
            overrides,
            json,
            command,
        })
    }

    fn command_from(
        positional: Vec<String>,
        category: Option<Category>,
        limit: usize,
    ) -> Result<Command> {
        let mut words = positional.into_iter();
        let Some(name) = words.next() else {
            usage(1);
        };
        let rest: Vec<String> = words.collect();

        let command = match (name.as_str(), rest.as_slice()) {
            ("tools", []) => Command::Tools { category },
            ("categories", []) => Command::Categories,
            ("tool", [tool_id]) => Command::Tool {
                tool_id: tool_id.clone(),
            },
            ("prompt", [tool_id, prompt_id]) => Command::Prompt {
                tool_id: tool_id.clone(),
                prompt_id: prompt_id.clone(),
            },
            ("search", words) if !words.is_empty() => {
                let query = words.join(" ");
                if query.trim().is_empty() {
                    bail!("search query must not be empty");
                }
                Command::Search { query, limit }
            }
            ("search", []) => bail!("search requires a query"),
            ("stats", []) => Command::Stats,
            ("diagnostics", []) => Command::Diagnostics,
            ("tools" | "categories" | "tool" | "prompt" | "stats" | "diagnostics", _) => {
                bail!("wrong number of arguments for '{name}' (see --help)")
            }
            (other, _) => bail!("unknown command: {other}"),
        };
        Ok(command)
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} requires a value"))?
        .into_string()
        .map_err(|_| anyhow!("{flag} must be valid UTF-8"))
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: prompt-directory [--root PATH] [--exclude NAMES] [--cache POLICY] [--json] <command>\n\nCommands:\n  tools [--category NAME]      List tools (optionally one category).\n  categories                   List categories present in the tree.\n  tool TOOL_ID                 Show a tool and its prompts.\n  prompt TOOL_ID PROMPT_ID     Print one prompt.\n  search QUERY [--limit N]     Case-insensitive search over names, tools, and content (default limit {DEFAULT_SEARCH_LIMIT}).\n  stats                        Tool, prompt, and category counts.\n  diagnostics                  Parts of the tree that were skipped while scanning.\n\nEnvironment:\n  PROMPT_DIRECTORY_ROOT, PROMPT_DIRECTORY_EXCLUDE, PROMPT_DIRECTORY_CACHE,\n  PROMPT_DIRECTORY_JSON, PROMPT_DIRECTORY_LOG"
    );
    std::process::exit(code);
}
