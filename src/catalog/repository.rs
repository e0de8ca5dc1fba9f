//! Produces catalog snapshots for a prompt root, optionally reusing the last
//! one.
//!
//! The default policy rescans on every request, which keeps results trivially
//! correct because nothing is ever stale. `RootModified` trades that for speed:
//! the previous snapshot is reused while the root directory's modification
//! time is unchanged. Edits deeper in the tree do not touch the root's mtime,
//! so callers using it must call `invalidate` after out-of-band changes.

use crate::catalog::CatalogIndex;
use crate::ingest::{ScanOptions, scan_root};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CachePolicy {
    #[default]
    Rescan,
    RootModified,
}

impl CachePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::Rescan => "rescan",
            CachePolicy::RootModified => "root-modified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCachePolicy(pub String);

impl fmt::Display for UnknownCachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown cache policy '{}' (expected rescan|off|root-modified|mtime)",
            self.0
        )
    }
}

impl std::error::Error for UnknownCachePolicy {}

impl FromStr for CachePolicy {
    type Err = UnknownCachePolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "rescan" | "off" | "none" | "0" => Ok(CachePolicy::Rescan),
            "root-modified" | "mtime" | "1" => Ok(CachePolicy::RootModified),
            _ => Err(UnknownCachePolicy(value.to_string())),
        }
    }
}

struct CachedCatalog {
    modified: SystemTime,
    index: Arc<CatalogIndex>,
}

/// Scan entry point shared by every query against one root.
pub struct CatalogRepository {
    root: PathBuf,
    options: ScanOptions,
    policy: CachePolicy,
    cached: Mutex<Option<CachedCatalog>>,
}

impl CatalogRepository {
    pub fn new(root: impl Into<PathBuf>, options: ScanOptions, policy: CachePolicy) -> Self {
        Self {
            root: root.into(),
            options,
            policy,
            cached: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Current catalog, scanned fresh unless the cache policy allows reuse.
    pub fn snapshot(&self) -> Arc<CatalogIndex> {
        match self.policy {
            CachePolicy::Rescan => Arc::new(self.scan()),
            CachePolicy::RootModified => self.cached_snapshot(),
        }
    }

    /// Drop any cached snapshot so the next request rescans.
    pub fn invalidate(&self) {
        self.lock_cache().take();
    }

    fn cached_snapshot(&self) -> Arc<CatalogIndex> {
        let Some(modified) = root_modified(&self.root) else {
            // No usable mtime (missing root, unsupported platform): never cache.
            self.invalidate();
            return Arc::new(self.scan());
        };

        let mut cache = self.lock_cache();
        if let Some(cached) = cache.as_ref() {
            if cached.modified == modified {
                debug!(root = %self.root.display(), "reusing cached catalog");
                return Arc::clone(&cached.index);
            }
        }

        let index = Arc::new(self.scan());
        *cache = Some(CachedCatalog {
            modified,
            index: Arc::clone(&index),
        });
        index
    }

    fn scan(&self) -> CatalogIndex {
        CatalogIndex::new(scan_root(&self.root, &self.options))
    }

    fn lock_cache(&self) -> MutexGuard<'_, Option<CachedCatalog>> {
        self.cached.lock().unwrap_or_else(|err| err.into_inner())
    }
}

fn root_modified(root: &Path) -> Option<SystemTime> {
    fs::metadata(root).and_then(|meta| meta.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Cline")).unwrap();
        fs::write(temp.path().join("Cline/system.md"), "version one").unwrap();
        temp
    }

    fn first_content(index: &CatalogIndex) -> String {
        index.catalog().tools[0].prompts()[0].content.clone()
    }

    #[test]
    fn rescan_policy_sees_every_change() {
        let temp = fixture();
        let repo = CatalogRepository::new(temp.path(), ScanOptions::default(), CachePolicy::Rescan);
        assert_eq!(first_content(&repo.snapshot()), "version one");

        fs::write(temp.path().join("Cline/system.md"), "version two").unwrap();
        assert_eq!(first_content(&repo.snapshot()), "version two");
    }

    #[test]
    fn root_modified_policy_reuses_until_invalidated() {
        let temp = fixture();
        let repo = CatalogRepository::new(
            temp.path(),
            ScanOptions::default(),
            CachePolicy::RootModified,
        );
        let first = repo.snapshot();
        assert_eq!(first_content(&first), "version one");

        // Nested edits leave the root mtime alone.
        fs::write(temp.path().join("Cline/system.md"), "version two").unwrap();
        let second = repo.snapshot();
        assert!(Arc::ptr_eq(&first, &second));

        repo.invalidate();
        assert_eq!(first_content(&repo.snapshot()), "version two");
    }

    #[cfg(unix)]
    #[test]
    fn root_modified_policy_rescans_when_root_mtime_moves() {
        let temp = fixture();
        let repo = CatalogRepository::new(
            temp.path(),
            ScanOptions::default(),
            CachePolicy::RootModified,
        );
        let first = repo.snapshot();

        fs::create_dir_all(temp.path().join("Kiro")).unwrap();
        fs::write(temp.path().join("Kiro/spec.md"), "spec").unwrap();
        let root = fs::File::open(temp.path()).unwrap();
        root.set_modified(SystemTime::UNIX_EPOCH).unwrap();

        let second = repo.snapshot();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.catalog().tools.len(), 2);
    }

    #[test]
    fn missing_root_is_never_cached() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("later");
        let repo = CatalogRepository::new(&root, ScanOptions::default(), CachePolicy::RootModified);
        assert!(repo.snapshot().catalog().tools.is_empty());

        fs::create_dir_all(root.join("Poke")).unwrap();
        fs::write(root.join("Poke/agent.txt"), "poke").unwrap();
        assert_eq!(repo.snapshot().catalog().tools.len(), 1);
    }

    #[test]
    fn cache_policy_parses_aliases() {
        assert_eq!("off".parse::<CachePolicy>(), Ok(CachePolicy::Rescan));
        assert_eq!("".parse::<CachePolicy>(), Ok(CachePolicy::Rescan));
        assert_eq!("MTIME".parse::<CachePolicy>(), Ok(CachePolicy::RootModified));
        assert_eq!(
            "root-modified".parse::<CachePolicy>(),
            Ok(CachePolicy::RootModified)
        );
        assert!("sometimes".parse::<CachePolicy>().is_err());
    }
}
