//! Reflection of callables into abstract operation signatures.
//!
//! The discovery engine never looks at source code. It consumes
//! [`OperationSignature`]s and a [`TypeCatalog`] produced by a [`Reflector`]:
//!
//! - **Rust source**: See [`source::SourceReflector`]
//! - **Signature manifests** (JSON/YAML): See [`manifest::ManifestReflector`]
//!
//! Type names use the array notation `T[]`, `T[][]`, ... and the sentinel
//! `"void"` for operations without a return value.

pub mod manifest;
pub mod source;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Return type of operations that produce no value
pub const VOID: &str = "void";

/// Trait for turning named classes and functions into operation signatures.
pub trait Reflector {
    /// Signatures of all public operations of a class, in declaration order
    fn reflect_class(&self, name: &str) -> Result<Vec<OperationSignature>>;

    /// Signature of a single free function
    fn reflect_function(&self, name: &str) -> Result<OperationSignature>;

    /// Record and enum definitions referenced by the reflected signatures
    fn catalog(&self) -> &TypeCatalog;
}

/// A reflected callable with its candidate call shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSignature {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prototypes: Vec<Prototype>,
}

/// One concrete parameter list and return type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prototype {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "return_type", alias = "returnType", default = "void_type")]
    pub return_type: String,
}

fn void_type() -> String {
    VOID.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub optional: bool,
}

impl OperationSignature {
    pub fn new(name: &str, description: &str, prototypes: Vec<Prototype>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            prototypes,
        }
    }
}

impl Prototype {
    pub fn new(parameters: Vec<Parameter>, return_type: &str) -> Self {
        Self {
            parameters,
            return_type: return_type.to_string(),
        }
    }

    pub fn is_one_way(&self) -> bool {
        self.return_type == VOID
    }
}

impl Parameter {
    pub fn new(name: &str, type_name: &str, optional: bool) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            optional,
        }
    }
}

/// Build the prototypes of a callable the way overload reflection does:
/// the full parameter list first, then one shorter prototype for each
/// trailing optional parameter that can be omitted.
pub fn expand_prototypes(parameters: Vec<Parameter>, return_type: &str) -> Vec<Prototype> {
    let required = parameters
        .iter()
        .rposition(|p| !p.optional)
        .map(|idx| idx + 1)
        .unwrap_or(0);

    (required..=parameters.len())
        .rev()
        .map(|len| Prototype::new(parameters[..len].to_vec(), return_type))
        .collect()
}

/// Field of a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub optional: bool,
}

/// Definition of a user type the schema may need to describe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDefinition {
    Record { fields: Vec<Field> },
    Enumeration { variants: Vec<String> },
}

/// Known user type definitions, keyed by type name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeCatalog {
    types: BTreeMap<String, TypeDefinition>,
}

impl TypeCatalog {
    pub fn insert(&mut self, name: &str, definition: TypeDefinition) {
        self.types.insert(name.to_string(), definition);
    }

    /// Look up a type by its exact name, then by its last path segment
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name).or_else(|| {
            let short = name.rsplit(['.', '\\', '/', ':']).next()?;
            self.types.get(short)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Add every definition of `other`, keeping existing entries
    pub fn merge(&mut self, other: &TypeCatalog) {
        for (name, definition) in &other.types {
            self.types
                .entry(name.clone())
                .or_insert_with(|| definition.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
