//! JSON Schema loading with `schema_version` enforcement.
//!
//! Schemas pin their document version with a `const` at
//! `/properties/schema_version/const`. Loading extracts that value, checks it
//! against what the caller expects, and compiles a validator.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub(crate) const SCHEMA_VERSION_POINTER: &str = "/properties/schema_version/const";

/// Compiled schema plus the document version it pins.
pub(crate) struct LoadedSchema {
    pub schema_version: String,
    pub compiled: JSONSchema,
}

pub(crate) fn load_json_schema(path: &Path, expected_version: Option<&str>) -> Result<LoadedSchema> {
    let file = File::open(path).with_context(|| format!("opening schema {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing schema {}", path.display()))?;
    compile_schema(&value, expected_version)
        .with_context(|| format!("loading schema {}", path.display()))
}

pub(crate) fn compile_schema(schema: &Value, expected_version: Option<&str>) -> Result<LoadedSchema> {
    let schema_version = extract_schema_version(schema)
        .ok_or_else(|| anyhow!("schema missing schema_version const at {SCHEMA_VERSION_POINTER}"))?;

    if let Some(expected) = expected_version {
        if schema_version != expected {
            bail!("schema_version '{schema_version}' does not match expected '{expected}'");
        }
    }

    let compiled =
        JSONSchema::compile(schema).map_err(|err| anyhow!("compiling schema: {err}"))?;

    Ok(LoadedSchema {
        schema_version,
        compiled,
    })
}

/// Validate `instance`, folding every schema violation into one error.
pub(crate) fn validate_instance(schema: &JSONSchema, instance: &Value) -> Result<()> {
    if let Err(errors) = schema.validate(instance) {
        let details = errors
            .map(|err| format!("{}: {}", err.instance_path, err))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("document failed schema validation:\n{details}");
    }
    Ok(())
}

fn extract_schema_version(schema: &Value) -> Option<String> {
    let version = schema.pointer(SCHEMA_VERSION_POINTER).and_then(Value::as_str)?;
    if !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some(version.to_string())
    } else {
        None
    }
}
