//! Mapping table store: configuration-driven node and parameter lookup
//!
//! Four flat string-to-string tables drive the whole translation:
//!
//! - `node_tag_map`: node type -> target element tag (`"BSDF_DIFFUSE" = "bsdf"`)
//! - `node_map`: node type -> target type attribute (`"BSDF_DIFFUSE" = "diffuse"`)
//! - `parameter_map`: `"NodeType.ParamName"` -> target parameter name
//! - `type_map`: parameter kind -> target parameter tag (`"scalar" = "float"`)
//!
//! Tables are immutable after load. An absent key is not an error: it tells
//! the translator the node or parameter is unsupported and must be skipped
//! with a warning. Load failures (malformed TOML, duplicate keys, missing
//! tables) fail fast before any translation begins.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Stock tables covering the built-in node types, compiled in.
const DEFAULT_TABLES: &str = include_str!("default_tables.toml");

/// On-disk schema of a mapping configuration file.
#[derive(Debug, Deserialize)]
struct RawTables {
    node_tag_map: HashMap<String, String>,
    node_map: HashMap<String, String>,
    parameter_map: HashMap<String, String>,
    type_map: HashMap<String, String>,
}

/// The four lookup tables, immutable after load.
///
/// May be reloaded between exports; never mutated during a pass.
#[derive(Debug, Clone)]
pub struct MappingTables {
    node_tag: HashMap<String, String>,
    node_type: HashMap<String, String>,
    parameter: HashMap<(String, String), String>,
    param_tag: HashMap<String, String>,
}

impl MappingTables {
    /// Parse a mapping configuration from TOML text.
    ///
    /// Duplicate keys are rejected by the TOML parser itself, so a
    /// successful parse guarantees unambiguous tables.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawTables = toml::from_str(text)
            .map_err(|e| Error::Configuration(format!("mapping tables: {e}")))?;

        // parameter_map keys carry a composite "NodeType.ParamName" shape;
        // split them once here so lookups stay allocation-free.
        let mut parameter = HashMap::with_capacity(raw.parameter_map.len());
        for (key, value) in raw.parameter_map {
            let Some((node_type, param_name)) = key.split_once('.') else {
                return Err(Error::Configuration(format!(
                    "parameter_map key '{key}' is not of the form 'NodeType.ParamName'"
                )));
            };
            parameter.insert((node_type.to_string(), param_name.to_string()), value);
        }

        Ok(Self {
            node_tag: raw.node_tag_map,
            node_type: raw.node_map,
            parameter,
            param_tag: raw.type_map,
        })
    }

    /// Load a mapping configuration from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The built-in table set covering the stock node types.
    #[allow(clippy::expect_used)] // The embedded TOML is validated by tests
    pub fn builtin() -> Self {
        Self::from_toml_str(DEFAULT_TABLES).expect("embedded mapping tables are valid")
    }

    /// Target element tag for a node type, if mapped.
    pub fn lookup_tag(&self, node_type: &str) -> Option<&str> {
        self.node_tag.get(node_type).map(String::as_str)
    }

    /// Target type attribute for a node type, if mapped.
    pub fn lookup_type(&self, node_type: &str) -> Option<&str> {
        self.node_type.get(node_type).map(String::as_str)
    }

    /// Target parameter name for a `(node type, parameter name)` pair.
    pub fn lookup_parameter_name(&self, node_type: &str, param_name: &str) -> Option<&str> {
        // HashMap<(String, String), _> cannot be probed with a borrowed
        // pair without allocating; the tables are small enough not to care.
        self.parameter
            .get(&(node_type.to_string(), param_name.to_string()))
            .map(String::as_str)
    }

    /// Target parameter tag for a parameter kind (`"scalar"` -> `"float"`).
    pub fn lookup_parameter_tag(&self, param_kind: &str) -> Option<&str> {
        self.param_tag.get(param_kind).map(String::as_str)
    }
}
