use super::{
    expand_prototypes, Field, OperationSignature, Parameter, Reflector, TypeCatalog,
    TypeDefinition, VOID,
};
use crate::error::{Error, Result};
use crate::scanner::SourceScanner;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use syn::{FnArg, ImplItem, Item, Pat, ReturnType, TraitItem, Type, Visibility};

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl ParsedFile {
    /// Parse in-memory source, attributing it to `path`
    pub fn from_source(path: &Path, content: &str) -> Result<Self> {
        let syntax_tree = syn::parse_file(content).map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Read and parse a single Rust source file
    pub fn parse(path: &Path) -> Result<Self> {
        debug!("Parsing file: {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_source(path, &content)
    }
}

/// Reflects operations out of Rust source code.
///
/// A class is a type name whose operations are the `pub` methods of its
/// inherent `impl` blocks plus the methods of trait impls for it; when no impl
/// exists, the methods of a trait of that name are used instead. Functions are
/// free `fn` items. Doc comments become operation descriptions.
///
/// # Example
///
/// ```no_run
/// use wsdl_from_source::reflection::{source::SourceReflector, Reflector};
/// use std::path::Path;
///
/// let reflector = SourceReflector::from_directory(Path::new("./my-service")).unwrap();
/// let operations = reflector.reflect_class("Calculator").unwrap();
/// println!("Found {} operations", operations.len());
/// ```
pub struct SourceReflector {
    files: Vec<ParsedFile>,
    catalog: TypeCatalog,
}

impl SourceReflector {
    pub fn new(files: Vec<ParsedFile>) -> Self {
        let catalog = build_catalog(&files);
        debug!(
            "Initializing SourceReflector with {} files and {} known types",
            files.len(),
            catalog.len()
        );
        Self { files, catalog }
    }

    /// Scan a project directory and parse every Rust file, skipping files with syntax errors
    pub fn from_directory(root: &Path) -> Result<Self> {
        let scan = SourceScanner::new(root.to_path_buf()).scan()?;
        let mut files = Vec::with_capacity(scan.rust_files.len());
        for path in &scan.rust_files {
            match ParsedFile::parse(path) {
                Ok(parsed) => files.push(parsed),
                Err(e) => warn!("Failed to parse {}: {}", path.display(), e),
            }
        }
        debug!("Parsed {} of {} files", files.len(), scan.rust_files.len());
        Ok(Self::new(files))
    }

    pub fn files(&self) -> &[ParsedFile] {
        &self.files
    }

    fn items(&self) -> Vec<&Item> {
        let mut items = Vec::new();
        for file in &self.files {
            collect_items(&file.syntax_tree.items, &mut items);
        }
        items
    }
}

impl Reflector for SourceReflector {
    fn reflect_class(&self, name: &str) -> Result<Vec<OperationSignature>> {
        debug!("Reflecting class: {}", name);
        let short_name = last_segment(name);
        let items = self.items();

        let mut found = false;
        let mut signatures = Vec::new();
        for item in &items {
            let Item::Impl(item_impl) = item else {
                continue;
            };
            if !type_is_named(&item_impl.self_ty, short_name) {
                continue;
            }
            found = true;
            let is_trait_impl = item_impl.trait_.is_some();
            for impl_item in &item_impl.items {
                if let ImplItem::Fn(method) = impl_item {
                    let public = matches!(method.vis, Visibility::Public(_));
                    if is_trait_impl || public {
                        signatures.push(reflect_signature(
                            &method.sig,
                            &method.attrs,
                            Some(short_name),
                        ));
                    }
                }
            }
        }

        if !found {
            for item in &items {
                if let Item::Trait(item_trait) = item {
                    if item_trait.ident == short_name {
                        found = true;
                        for trait_item in &item_trait.items {
                            if let TraitItem::Fn(method) = trait_item {
                                signatures.push(reflect_signature(
                                    &method.sig,
                                    &method.attrs,
                                    Some(short_name),
                                ));
                            }
                        }
                    }
                }
            }
        }

        if !found {
            return Err(Error::Reflection(format!(
                "Class '{}' could not be found",
                name
            )));
        }
        debug!("Reflected {} operations for {}", signatures.len(), name);
        Ok(signatures)
    }

    fn reflect_function(&self, name: &str) -> Result<OperationSignature> {
        debug!("Reflecting function: {}", name);
        self.items()
            .into_iter()
            .find_map(|item| match item {
                Item::Fn(item_fn) if item_fn.sig.ident == name => {
                    Some(reflect_signature(&item_fn.sig, &item_fn.attrs, None))
                }
                _ => None,
            })
            .ok_or_else(|| Error::Reflection(format!("Function '{}' could not be found", name)))
    }

    fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }
}

/// Flatten items, descending into inline modules
fn collect_items<'a>(items: &'a [Item], out: &mut Vec<&'a Item>) {
    for item in items {
        if let Item::Mod(item_mod) = item {
            if let Some((_, content)) = &item_mod.content {
                collect_items(content, out);
            }
        } else {
            out.push(item);
        }
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

fn type_is_named(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == name)
            .unwrap_or(false),
        _ => false,
    }
}

fn reflect_signature(
    sig: &syn::Signature,
    attrs: &[syn::Attribute],
    self_name: Option<&str>,
) -> OperationSignature {
    let name = sig.ident.to_string();
    debug!("Reflecting signature of {}", name);

    let mut parameters = Vec::new();
    for (index, input) in sig.inputs.iter().enumerate() {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };
        let param_name = match &*pat_type.pat {
            Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
            _ => format!("arg{}", index),
        };
        let (type_name, optional) = map_type(&pat_type.ty, self_name);
        parameters.push(Parameter {
            name: param_name,
            type_name,
            optional,
        });
    }

    let return_type = match &sig.output {
        ReturnType::Default => VOID.to_string(),
        ReturnType::Type(_, ty) => map_type(ty, self_name).0,
    };

    OperationSignature {
        name,
        description: doc_description(attrs),
        prototypes: expand_prototypes(parameters, &return_type),
    }
}

/// First paragraph of the `///` doc comment, joined into one line
fn doc_description(attrs: &[syn::Attribute]) -> String {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let syn::Meta::NameValue(name_value) = &attr.meta {
            if let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) = &name_value.value
            {
                let line = lit.value().trim().to_string();
                if line.is_empty() {
                    if !lines.is_empty() {
                        break;
                    }
                    continue;
                }
                lines.push(line);
            }
        }
    }
    lines.join(" ")
}

/// Map a Rust type to a type name and whether it is optional
fn map_type(ty: &Type, self_name: Option<&str>) -> (String, bool) {
    match ty {
        Type::Reference(reference) => map_type(&reference.elem, self_name),
        Type::Paren(paren) => map_type(&paren.elem, self_name),
        Type::Group(group) => map_type(&group.elem, self_name),
        Type::Slice(slice) => (format!("{}[]", map_type(&slice.elem, self_name).0), false),
        Type::Array(array) => (format!("{}[]", map_type(&array.elem, self_name).0), false),
        Type::Tuple(tuple) if tuple.elems.is_empty() => (VOID.to_string(), false),
        Type::Tuple(_) => ("array".to_string(), false),
        Type::Path(type_path) => map_path(&type_path.path, self_name),
        _ => ("mixed".to_string(), false),
    }
}

fn map_path(path: &syn::Path, self_name: Option<&str>) -> (String, bool) {
    let Some(segment) = path.segments.last() else {
        return ("mixed".to_string(), false);
    };
    let ident = segment.ident.to_string();
    let first_arg = first_type_argument(segment);

    match (ident.as_str(), first_arg) {
        ("Option", Some(inner)) => (map_type(inner, self_name).0, true),
        ("Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet", Some(inner)) => {
            (format!("{}[]", map_type(inner, self_name).0), false)
        }
        ("Box" | "Rc" | "Arc" | "Cow" | "RefCell" | "Cell" | "Result", Some(inner)) => {
            (map_type(inner, self_name).0, false)
        }
        ("HashMap" | "BTreeMap", _) => ("object".to_string(), false),
        ("Self", _) => (self_name.unwrap_or("mixed").to_string(), false),
        _ => {
            let segments: Vec<String> = path
                .segments
                .iter()
                .map(|s| s.ident.to_string())
                .skip_while(|s| s == "crate" || s == "self" || s == "super")
                .collect();
            (segments.join("::"), false)
        }
    }
}

fn first_type_argument(segment: &syn::PathSegment) -> Option<&Type> {
    if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
        args.args.iter().find_map(|arg| match arg {
            syn::GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
    } else {
        None
    }
}

/// Collect record and enum definitions from all files
fn build_catalog(files: &[ParsedFile]) -> TypeCatalog {
    let mut catalog = TypeCatalog::default();
    for file in files {
        let mut items = Vec::new();
        collect_items(&file.syntax_tree.items, &mut items);
        for item in items {
            match item {
                Item::Struct(item_struct) => {
                    let fields = match &item_struct.fields {
                        syn::Fields::Named(named) => named
                            .named
                            .iter()
                            .filter_map(|field| {
                                let attrs = SerdeAttributes::parse(&field.attrs);
                                if attrs.skip {
                                    return None;
                                }
                                let ident = field.ident.as_ref()?.to_string();
                                let (type_name, optional) = map_type(&field.ty, None);
                                Some(Field {
                                    name: attrs.rename.unwrap_or(ident),
                                    type_name,
                                    optional,
                                })
                            })
                            .collect(),
                        syn::Fields::Unit => Vec::new(),
                        syn::Fields::Unnamed(_) => continue,
                    };
                    catalog.insert(
                        &item_struct.ident.to_string(),
                        TypeDefinition::Record { fields },
                    );
                }
                Item::Enum(item_enum) => {
                    let unit_only = item_enum
                        .variants
                        .iter()
                        .all(|v| matches!(v.fields, syn::Fields::Unit));
                    if !unit_only {
                        debug!("Skipping enum {} with data-carrying variants", item_enum.ident);
                        continue;
                    }
                    let variants = item_enum
                        .variants
                        .iter()
                        .map(|v| {
                            SerdeAttributes::parse(&v.attrs)
                                .rename
                                .unwrap_or_else(|| v.ident.to_string())
                        })
                        .collect();
                    catalog.insert(
                        &item_enum.ident.to_string(),
                        TypeDefinition::Enumeration { variants },
                    );
                }
                _ => {}
            }
        }
    }
    catalog
}

/// Serde attributes that change how a field appears on the wire
#[derive(Debug, Default)]
struct SerdeAttributes {
    rename: Option<String>,
    skip: bool,
}

impl SerdeAttributes {
    fn parse(attrs: &[syn::Attribute]) -> Self {
        let mut serde_attrs = SerdeAttributes::default();
        for attr in attrs {
            if !attr.path().is_ident("serde") {
                continue;
            }
            if let Ok(meta_list) = attr.meta.require_list() {
                let tokens_str = meta_list.tokens.to_string();
                if let Some(value) = extract_rename_value(&tokens_str) {
                    serde_attrs.rename = Some(value);
                }
                if tokens_str
                    .split(',')
                    .any(|token| token.trim() == "skip" || token.trim() == "skip_serializing")
                {
                    serde_attrs.skip = true;
                }
            }
        }
        serde_attrs
    }
}

/// Extract the value of `rename = "..."` from serde attribute tokens
fn extract_rename_value(tokens_str: &str) -> Option<String> {
    let rename_pos = tokens_str.find("rename")?;
    let after_rename = &tokens_str[rename_pos..];
    let after_eq = &after_rename[after_rename.find('=')? + 1..];
    let after_start = &after_eq[after_eq.find('"')? + 1..];
    let end_quote = after_start.find('"')?;
    Some(after_start[..end_quote].to_string())
}
