//! Merge schemas
//!
//! A schema file maps file globs to a [`FileSchema`]. Choosing the glob that
//! applies to a given file is left to the caller; this module only parses and
//! validates the declarations.
//!
//! ```json
//! {
//!   "content/**/*.json": { "include": ["$.title", "$.description"] },
//!   "data/redirects.json": {
//!     "composite": {
//!       "$.redirects": {
//!         "type": "array",
//!         "key": "$.language",
//!         "include": [],
//!         "transform": {
//!           "$.source": { "match": "^/{locale}/(.*)$", "replace": "/{locale}/$1" }
//!         }
//!       }
//!     }
//!   }
//! }
//! ```

use crate::error::{Error, Result, NO_SCHEMA_KIND};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Merge declaration for one kind of file
#[derive(Debug, Clone, PartialEq)]
pub enum FileSchema {
    Include(IncludeSchema),
    Composite(CompositeSchema),
}

/// Flat documents whose translatable fields are listed as JSONPaths
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeSchema {
    pub include_paths: Vec<String>,
}

/// Documents holding locale-keyed collections, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSchema {
    pub entries: Vec<(String, CompositeEntry)>,
}

/// Shape of a composite collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Array,
    Object,
}

/// One locale-keyed collection inside a composite document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompositeEntry {
    #[serde(rename = "type")]
    pub kind: CollectionKind,
    /// JSONPath of the locale field inside each array item
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub include: Vec<String>,
    /// Rules keyed by JSONPath relative to an item, in declaration order
    #[serde(default, deserialize_with = "ordered_rules")]
    pub transform: Option<Vec<(String, TransformRule)>>,
}

/// A string rewrite applied to the leaves selected by its path
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransformRule {
    #[serde(rename = "match", default)]
    pub pattern: Option<String>,
    pub replace: Value,
}

fn ordered_rules<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<(String, TransformRule)>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rules: Option<Map<String, Value>> = Option::deserialize(deserializer)?;
    rules
        .map(|map| {
            map.into_iter()
                .map(|(path, rule)| {
                    serde_json::from_value(rule)
                        .map(|rule| (path, rule))
                        .map_err(serde::de::Error::custom)
                })
                .collect::<std::result::Result<Vec<_>, D::Error>>()
        })
        .transpose()
}

impl FileSchema {
    /// Build a file schema from its JSON form.
    ///
    /// `include` takes precedence when both kinds are present.
    pub fn from_value(value: &Value) -> Result<Self> {
        if let Some(include) = value.get("include") {
            let include_paths: Vec<String> = serde_json::from_value(include.clone())
                .map_err(|e| Error::SchemaConfiguration(format!("invalid include list: {e}")))?;
            return Ok(FileSchema::Include(IncludeSchema { include_paths }));
        }

        let Some(composite) = value.get("composite") else {
            return Err(Error::SchemaConfiguration(NO_SCHEMA_KIND.to_string()));
        };
        let map = composite.as_object().ok_or_else(|| {
            Error::SchemaConfiguration("composite property must be an object".to_string())
        })?;

        let mut entries = Vec::with_capacity(map.len());
        for (root_path, raw) in map {
            let entry: CompositeEntry = serde_json::from_value(raw.clone()).map_err(|e| {
                Error::SchemaConfiguration(format!("invalid composite entry '{root_path}': {e}"))
            })?;
            if entry.kind == CollectionKind::Array && entry.key.is_none() {
                return Err(Error::MissingKeyPath {
                    path: root_path.clone(),
                });
            }
            entries.push((root_path.clone(), entry));
        }

        Ok(FileSchema::Composite(CompositeSchema { entries }))
    }

    /// Parse a file schema from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    /// Load a file schema from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&read_file(path.as_ref())?)
    }

    /// Short label for the schema kind
    pub fn kind_label(&self) -> &'static str {
        match self {
            FileSchema::Include(_) => "include",
            FileSchema::Composite(_) => "composite",
        }
    }
}

/// A glob → file schema map, in declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaFile {
    pub files: Vec<(String, FileSchema)>,
}

impl SchemaFile {
    /// Parse a schema map from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        let map = value.as_object().ok_or_else(|| {
            Error::SchemaConfiguration("schema file must map globs to file schemas".to_string())
        })?;

        let files = map
            .iter()
            .map(|(glob, raw)| FileSchema::from_value(raw).map(|schema| (glob.clone(), schema)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { files })
    }

    /// Load a schema map from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&read_file(path.as_ref())?)
    }

    /// Find the schema declared under an exact glob key
    pub fn get(&self, glob: &str) -> Option<&FileSchema> {
        self.files.iter().find(|(g, _)| g == glob).map(|(_, s)| s)
    }

    /// All declared globs
    pub fn globs(&self) -> Vec<&str> {
        self.files.iter().map(|(g, _)| g.as_str()).collect()
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}
