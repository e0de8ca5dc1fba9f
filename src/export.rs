//! Whole-catalog JSON export.
//!
//! The export is the machine-readable hand-off to presentation code that does
//! not link this crate (static-site builders, search indexers). Its shape is
//! pinned by `schema/catalog_export.schema.json`.

use crate::catalog::{Catalog, CatalogStats, Category, ScanDiagnostic, Tool};
use crate::schema_loader::{compile_schema, load_json_schema, validate_instance};
use anyhow::{Context, Result};
use jsonschema::JSONSchema;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const EXPORT_SCHEMA_VERSION: &str = "prompt_catalog_v1";
pub const EXPORT_SCHEMA_RELATIVE_PATH: &str = "schema/catalog_export.schema.json";

const BUNDLED_EXPORT_SCHEMA: &str = include_str!("../schema/catalog_export.schema.json");

#[derive(Debug, Serialize)]
pub struct CatalogExport<'a> {
    pub schema_version: &'static str,
    #[serde(serialize_with = "crate::catalog::model::serialize_path_lossy")]
    pub root: &'a Path,
    pub stats: CatalogStats,
    pub categories: Vec<Category>,
    pub tools: &'a [Tool],
    pub diagnostics: &'a [ScanDiagnostic],
}

impl<'a> CatalogExport<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            root: &catalog.root,
            stats: catalog.stats(),
            categories: catalog.categories(),
            tools: &catalog.tools,
            diagnostics: &catalog.diagnostics,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).context("serializing catalog export")
    }
}

/// Compiled export schema.
pub struct ExportSchema {
    schema_version: String,
    compiled: JSONSchema,
}

impl ExportSchema {
    /// Schema compiled into the binary; always matches this build's export.
    pub fn bundled() -> Result<Self> {
        let value: Value =
            serde_json::from_str(BUNDLED_EXPORT_SCHEMA).context("parsing bundled export schema")?;
        let loaded = compile_schema(&value, Some(EXPORT_SCHEMA_VERSION))
            .context("loading bundled export schema")?;
        Ok(Self {
            schema_version: loaded.schema_version,
            compiled: loaded.compiled,
        })
    }

    /// Load a schema from disk, rejecting versions this build cannot emit.
    pub fn load(path: &Path) -> Result<Self> {
        let loaded = load_json_schema(path, Some(EXPORT_SCHEMA_VERSION))?;
        Ok(Self {
            schema_version: loaded.schema_version,
            compiled: loaded.compiled,
        })
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn validate(&self, document: &Value) -> Result<()> {
        validate_instance(&self.compiled, document)
    }
}

/// Checked-in schema location for source checkouts.
pub fn default_export_schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(EXPORT_SCHEMA_RELATIVE_PATH)
}

/// Serialize `catalog` and validate it against `schema` in one step.
pub fn export_catalog(catalog: &Catalog, schema: &ExportSchema) -> Result<Value> {
    let document = CatalogExport::new(catalog).to_value()?;
    schema
        .validate(&document)
        .with_context(|| format!("catalog export for {}", catalog.root.display()))?;
    Ok(document)
}
