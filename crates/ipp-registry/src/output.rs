//! The resolved model handed to code generators.

use crate::error::{RegistryError, Result, Warning};
use crate::model::TypeDescriptor;
use indexmap::IndexMap;
use serde::Serialize;
use serde_with::skip_serializing_none;
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// An enumeration ready for emission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDefinition {
    /// Emitted name, e.g. `orientation` for `orientation-requested`
    pub name: String,
    /// Registry attribute name
    pub full_name: SmolStr,
    pub values: IndexMap<SmolStr, i64>,
    /// Codes are conventionally written in hexadecimal
    pub hex: bool,
    pub specs: Vec<SmolStr>,
    /// Enumerations that share these values by name
    pub refs: Vec<SmolStr>,
}

/// A keyword ready for emission
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordDefinition {
    pub name: String,
    pub full_name: SmolStr,
    pub values: Vec<SmolStr>,
    /// The attribute also accepts a free-form name
    pub or_name: bool,
    pub keyword_type: Option<SmolStr>,
    pub doc_note: Option<String>,
    pub specs: Vec<SmolStr>,
    pub refs: Vec<SmolStr>,
}

/// A collection with the descriptors of its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionDefinition {
    pub name: SmolStr,
    pub specs: Vec<SmolStr>,
    pub members: Vec<TypeDescriptor>,
}

/// Everything one run resolved, in emission order
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedModel {
    /// Registry revision the model was built from
    pub updated: Option<String>,
    /// Spec id to document URI
    pub specs: IndexMap<SmolStr, String>,
    pub enums: Vec<EnumDefinition>,
    pub keywords: Vec<KeywordDefinition>,
    pub collections: Vec<CollectionDefinition>,
    /// One descriptor per canonical attribute, sorted by name
    pub types: Vec<TypeDescriptor>,
    /// Enumeration name to the sites that use it
    pub enum_usages: BTreeMap<SmolStr, Vec<String>>,
    /// Attributes modeled as key/value blocks
    pub key_values: IndexMap<SmolStr, TypeDescriptor>,
    pub warnings: Vec<Warning>,
}

impl ResolvedModel {
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Descriptor of a canonical attribute
    pub fn get_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn get_enum(&self, full_name: &str) -> Option<&EnumDefinition> {
        self.enums.iter().find(|e| e.full_name == full_name)
    }

    pub fn get_keyword(&self, full_name: &str) -> Option<&KeywordDefinition> {
        self.keywords.iter().find(|k| k.full_name == full_name)
    }

    pub fn get_collection(&self, name: &str) -> Option<&CollectionDefinition> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| RegistryError::Other {
            message: "Failed to serialize resolved model".to_string(),
            source: Some(Box::new(e)),
        })
    }

    /// Write the model as pretty-printed JSON, creating parent directories
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "wrote resolved model");
        Ok(())
    }
}
