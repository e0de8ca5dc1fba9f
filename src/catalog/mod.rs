//! Prompt catalog types.
//!
//! `identity` owns the naming rules (slugs, categories), `model` the entities
//! a scan produces, `index` the id lookups over one snapshot, and `repository`
//! the policy for when a snapshot gets rebuilt.

pub mod identity;
pub mod index;
pub mod model;
pub mod repository;

pub use identity::{Category, PromptId, ToolId, UnknownCategory, categorize, slugify};
pub use index::CatalogIndex;
pub use model::{Catalog, CatalogStats, DiagnosticKind, Prompt, ScanDiagnostic, Tool};
pub use repository::{CachePolicy, CatalogRepository, UnknownCachePolicy};
