use super::{OperationSignature, Reflector, TypeCatalog};
use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Language-neutral description of services, as read from JSON or YAML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Base name for documents built from the manifest's functions
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub classes: BTreeMap<String, Vec<OperationSignature>>,
    #[serde(default)]
    pub functions: Vec<OperationSignature>,
    #[serde(default)]
    pub types: TypeCatalog,
}

/// Reflector over a [`Manifest`]
#[derive(Debug, Clone)]
pub struct ManifestReflector {
    manifest: Manifest,
}

impl ManifestReflector {
    pub fn new(manifest: Manifest) -> Self {
        Self { manifest }
    }

    /// Load a manifest, choosing the format from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading manifest from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);

        let manifest: Manifest = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| Error::Reflection(format!("{}: {}", path.display(), e)))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| Error::Reflection(format!("{}: {}", path.display(), e)))?,
            _ => {
                return Err(Error::Reflection(format!(
                    "Unsupported manifest format: {}",
                    path.display()
                )))
            }
        };

        debug!(
            "Manifest has {} classes, {} functions and {} types",
            manifest.classes.len(),
            manifest.functions.len(),
            manifest.types.len()
        );
        Ok(Self::new(manifest))
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn class_names(&self) -> Vec<&str> {
        self.manifest.classes.keys().map(String::as_str).collect()
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.manifest
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect()
    }
}

impl Reflector for ManifestReflector {
    fn reflect_class(&self, name: &str) -> Result<Vec<OperationSignature>> {
        self.manifest
            .classes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Reflection(format!("Class '{}' is not in the manifest", name)))
    }

    fn reflect_function(&self, name: &str) -> Result<OperationSignature> {
        self.manifest
            .functions
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .ok_or_else(|| {
                Error::Reflection(format!("Function '{}' is not in the manifest", name))
            })
    }

    fn catalog(&self) -> &TypeCatalog {
        &self.manifest.types
    }
}
