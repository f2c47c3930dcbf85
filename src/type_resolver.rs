use crate::error::{Error, Result};
use crate::reflection::TypeCatalog;
use crate::wsdl::Wsdl;
use log::debug;
use std::fmt;

/// Strategy for mapping non-builtin types into the WSDL schema.
///
/// Implementations emit whatever schema fragments they need into `wsdl` and
/// return the qualified reference (`tns:...`, `xsd:...`) for `ty`. They must
/// consult and update the document's type registry so that a fragment is never
/// emitted twice, and may call back into `resolver` for nested types.
pub trait ComplexTypeStrategy: fmt::Debug {
    /// Short name used in configuration and logs
    fn name(&self) -> &'static str;

    fn add_complex_type(
        &self,
        resolver: &TypeResolver<'_>,
        wsdl: &mut Wsdl,
        ty: &TypeExpr,
    ) -> Result<String>;
}

/// Type resolver - maps source type names to schema type references
pub struct TypeResolver<'a> {
    strategy: &'a dyn ComplexTypeStrategy,
    catalog: &'a TypeCatalog,
}

impl<'a> TypeResolver<'a> {
    pub fn new(strategy: &'a dyn ComplexTypeStrategy, catalog: &'a TypeCatalog) -> Self {
        Self { strategy, catalog }
    }

    /// Record and enum definitions available to strategies
    pub fn catalog(&self) -> &TypeCatalog {
        self.catalog
    }

    /// Resolve a type name to a schema reference, emitting complex types on first use
    pub fn resolve(&self, wsdl: &mut Wsdl, type_name: &str) -> Result<String> {
        debug!("Resolving type: {}", type_name);
        let expr = TypeExpr::parse(type_name)?;

        if expr.depth() == 0 {
            if let Some(builtin) = builtin_xsd_type(expr.singular()) {
                return Ok(builtin.to_string());
            }
        }

        if let Some(cached) = wsdl
            .get_type(type_name)
            .or_else(|| wsdl.get_type(&expr.canonical()))
        {
            debug!("Type {} found in registry", type_name);
            return Ok(cached.to_string());
        }

        let reference = self.strategy.add_complex_type(self, wsdl, &expr)?;
        // Re-resolving the full expression must short-circuit to the same reference
        wsdl.add_type(type_name, &reference);
        Ok(reference)
    }

    /// Source type names registered in the document so far
    pub fn registered_types<'w>(&self, wsdl: &'w Wsdl) -> Vec<&'w str> {
        wsdl.get_types()
    }
}

/// A parsed type expression: a singular type name plus array nesting depth.
///
/// `"Invoice[][]"` parses to singular `Invoice` with depth 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    singular: String,
    depth: usize,
}

impl TypeExpr {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut rest = raw.trim();
        let mut depth = 0;
        while let Some(stripped) = rest.strip_suffix("[]") {
            rest = stripped.trim_end();
            depth += 1;
        }

        if rest.is_empty() {
            return Err(Error::schema(raw, "missing element type"));
        }
        if rest == "void" {
            return Err(Error::schema(raw, "void has no schema representation"));
        }

        let translated = translate_type(rest);
        if !is_xml_name(&translated) {
            return Err(Error::schema(
                raw,
                format!("'{}' is not a valid XML type name", translated),
            ));
        }

        Ok(Self {
            singular: rest.to_string(),
            depth,
        })
    }

    /// The element type with every `[]` removed
    pub fn singular(&self) -> &str {
        &self.singular
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_array(&self) -> bool {
        self.depth > 0
    }

    /// The singular type with `depth` array markers
    pub fn with_depth(&self, depth: usize) -> String {
        format!("{}{}", self.singular, "[]".repeat(depth))
    }

    /// Normalized spelling of the whole expression
    pub fn canonical(&self) -> String {
        self.with_depth(self.depth)
    }
}

/// Normalize a source type name into an XML-safe identifier.
///
/// Leading separators are dropped and `::`, `\` and `/` become `.`.
pub fn translate_type(type_name: &str) -> String {
    let trimmed = type_name
        .trim()
        .trim_start_matches("::")
        .trim_start_matches(['\\', '/']);
    trimmed.replace("::", ".").replace(['\\', '/'], ".")
}

/// Name of the generated array type for `singular` at nesting `level`
pub fn array_type_name(singular: &str, level: usize) -> String {
    format!("{}{}", "ArrayOf".repeat(level), ucfirst(&translate_type(singular)))
}

fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Check that `name` is usable as an unqualified XML element or type name
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Builtin schema type for a singular source type, if there is one
pub fn builtin_xsd_type(type_name: &str) -> Option<&'static str> {
    let xsd = match type_name {
        "String" | "string" | "str" | "char" => "xsd:string",
        "i32" | "int" | "integer" => "xsd:int",
        "i8" => "xsd:byte",
        "i16" => "xsd:short",
        "i64" | "isize" | "long" => "xsd:long",
        "u8" => "xsd:unsignedByte",
        "u16" => "xsd:unsignedShort",
        "u32" => "xsd:unsignedInt",
        "u64" | "usize" => "xsd:unsignedLong",
        "i128" | "u128" => "xsd:integer",
        "f32" | "float" => "xsd:float",
        "f64" | "double" => "xsd:double",
        "bool" | "boolean" => "xsd:boolean",
        "array" => "soap-enc:Array",
        "object" => "xsd:struct",
        "mixed" | "any" => "xsd:anyType",
        _ => return None,
    };
    Some(xsd)
}
