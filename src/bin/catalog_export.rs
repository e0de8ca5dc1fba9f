//! Scans a prompt tree and prints the whole catalog as one JSON document.
//!
//! The document is validated against the export schema before anything is
//! written, so downstream builders never see a shape they were not promised.

use anyhow::{Result, anyhow, bail};
use prompt_directory::runtime::init_logging;
use prompt_directory::{ConfigOverrides, DirectoryConfig, ExportSchema, export_catalog, scan_root};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::info;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse(env::args_os())?;
    let config = DirectoryConfig::load(cli.overrides)?;
    let schema = match &cli.schema {
        Some(path) => ExportSchema::load(path)?,
        None => ExportSchema::bundled()?,
    };

    let catalog = scan_root(&config.root, &config.scan_options());
    let stats = catalog.stats();
    info!(
        root = %catalog.root.display(),
        tools = stats.tools,
        prompts = stats.prompts,
        diagnostics = catalog.diagnostics.len(),
        "exporting catalog"
    );

    let document = export_catalog(&catalog, &schema)?;
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    println!("{rendered}");
    Ok(())
}

#[derive(Debug)]
struct Cli {
    overrides: ConfigOverrides,
    schema: Option<PathBuf>,
    pretty: bool,
}

impl Cli {
    fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut args = args.into_iter();
        let _program = args.next();

        let mut overrides = ConfigOverrides::default();
        let mut schema = None;
        let mut pretty = false;

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
                "--schema" => {
                    schema = Some(PathBuf::from(next_value(&mut args, "--schema")?));
                }
                "--pretty" => pretty = true,
                "--help" | "-h" => usage(0),
                other => bail!("unknown argument: {other}"),
            }
        }

        Ok(Self {
            overrides,
            schema,
            pretty,
        })
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
        "Usage: catalog-export [--root PATH] [--exclude NAMES] [--schema PATH] [--pretty]\n\nPrints the scanned catalog as JSON validated against the export schema\n(bundled copy unless --schema is given)."
    );
    std::process::exit(code);
}
