//! Configuration shared by the library entry points and the binaries.
//!
//! Values come from the environment first and command-line overrides second:
//!
//! - `PROMPT_DIRECTORY_ROOT`: prompt tree to scan.
//! - `PROMPT_DIRECTORY_EXCLUDE`: extra directory names to skip (comma
//!   separated, spaces within a name kept), added to the built-in exclusions.
//! - `PROMPT_DIRECTORY_CACHE`: `rescan` (default) or `root-modified`.

use crate::catalog::CachePolicy;
use crate::find_prompts_root;
use crate::ingest::ScanOptions;
use crate::split_list;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const ROOT_ENV: &str = "PROMPT_DIRECTORY_ROOT";
pub const EXCLUDE_ENV: &str = "PROMPT_DIRECTORY_EXCLUDE";
pub const CACHE_ENV: &str = "PROMPT_DIRECTORY_CACHE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub root: PathBuf,
    pub extra_excluded: Vec<String>,
    pub cache: CachePolicy,
}

#[derive(Clone, Debug, Default)]
/// Command-line values that take precedence over the environment.
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub extra_excluded: Vec<String>,
    pub cache: Option<CachePolicy>,
}

impl DirectoryConfig {
    /// Resolve configuration from the environment plus `overrides`.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let root = match overrides.root {
            Some(root) => root,
            None => find_prompts_root()?,
        };

        let mut extra_excluded = env::var(EXCLUDE_ENV)
            .map(|value| split_list(&value))
            .unwrap_or_default();
        extra_excluded.extend(overrides.extra_excluded);

        let cache = match overrides.cache {
            Some(policy) => policy,
            None => match env::var(CACHE_ENV) {
                Ok(value) => value
                    .parse()
                    .with_context(|| format!("invalid {CACHE_ENV}"))?,
                Err(_) => CachePolicy::default(),
            },
        };

        Ok(Self {
            root,
            extra_excluded,
            cache,
        })
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::with_extra_exclusions(self.extra_excluded.iter().cloned())
    }
}
