//! WSDL auto-discovery.
//!
//! [`AutoDiscover`] turns reflected operation signatures into a WSDL document.
//! A document is created by the first [`AutoDiscover::set_class`] or
//! [`AutoDiscover::add_function`] call: it gets a `types` section, a port type,
//! a binding and a service named after the class (or the serving script), and
//! then one set of messages, port operation and binding operation per
//! operation.
//!
//! Every registration call stages its work on a copy of the current document
//! and commits it only if all operations were emitted, so a failing call never
//! leaves a half-written document behind.

use crate::config::{
    AutoDiscoverConfig, BindingStyle, BindingStyleUpdate, EndpointUri, OperationBodyStyle, Style,
};
use crate::environment::{CgiContext, RequestContext};
use crate::error::{Error, Result};
use crate::reflection::{OperationSignature, Prototype, Reflector, TypeCatalog};
use crate::serializer::{self, ServedDocument};
use crate::strategy;
use crate::type_resolver::{translate_type, ComplexTypeStrategy, TypeResolver};
use crate::wsdl::{ElementSpec, PartRef, SequenceEntry, Wsdl};
use crate::xml::NodeId;
use log::{debug, info};
use std::path::Path;

/// Fallback document name when neither a class, a configured name nor a script name is known
const DEFAULT_SERVICE_NAME: &str = "Service";

/// Per-document state; cloned to stage a registration call
#[derive(Debug, Clone)]
struct DocumentState {
    wsdl: Wsdl,
    port: NodeId,
    binding: NodeId,
    address: Option<NodeId>,
    service_name: String,
    catalog: TypeCatalog,
    class: Option<String>,
    functions: Vec<String>,
    body_style: OperationBodyStyle,
}

impl DocumentState {
    fn create(
        base: &str,
        uri: &EndpointUri,
        binding_style: &BindingStyle,
        body_style: &OperationBodyStyle,
        catalog: &TypeCatalog,
    ) -> Self {
        info!("Creating WSDL document {} for {}", base, uri);
        let mut wsdl = Wsdl::new(base, uri.as_str());
        // types must precede every other section
        wsdl.add_schema_type_section();

        let port_name = format!("{}Port", base);
        let binding_name = format!("{}Binding", base);
        let service_name = format!("{}Service", base);

        let port = wsdl.add_port_type(&port_name);
        let binding = wsdl.add_binding(&binding_name, &format!("tns:{}", port_name));
        wsdl.add_soap_binding(binding, binding_style.style.as_str(), &binding_style.transport);
        let service = wsdl.add_service(
            &service_name,
            &port_name,
            &format!("tns:{}", binding_name),
            uri.as_str(),
        );

        let dom = wsdl.dom();
        let address = dom
            .children_named(service, "port")
            .next()
            .and_then(|port| dom.children_named(port, "soap:address").next());

        Self {
            wsdl,
            port,
            binding,
            address,
            service_name,
            catalog: catalog.clone(),
            class: None,
            functions: Vec::new(),
            body_style: body_style.clone(),
        }
    }
}

/// Emits the WSDL artifacts of single operations into a staged document
struct OperationEmitter<'a> {
    strategy: &'a dyn ComplexTypeStrategy,
    style: Style,
    uri: &'a EndpointUri,
}

impl OperationEmitter<'_> {
    fn emit(&self, state: &mut DocumentState, signature: &OperationSignature) -> Result<()> {
        let prototype = select_prototype(signature)?;
        let name = translate_type(&signature.name);
        let one_way = prototype.is_one_way();
        debug!(
            "Emitting operation {} ({} parameters, {})",
            name,
            prototype.parameters.len(),
            if one_way { "one-way" } else { "request-response" }
        );

        let resolver = TypeResolver::new(self.strategy, &state.catalog);
        let wsdl = &mut state.wsdl;

        let input = format!("{}In", name);
        let input_parts = match self.style {
            Style::Document => {
                let mut sequence = Vec::with_capacity(prototype.parameters.len());
                for param in &prototype.parameters {
                    sequence.push(SequenceEntry {
                        name: param.name.clone(),
                        type_ref: resolver.resolve(wsdl, &param.type_name)?,
                        nillable: param.optional,
                    });
                }
                let element = wsdl.add_element(&ElementSpec {
                    name: name.clone(),
                    sequence,
                });
                vec![("parameters".to_string(), PartRef::Element(element))]
            }
            Style::Rpc => {
                let mut parts = Vec::with_capacity(prototype.parameters.len());
                for param in &prototype.parameters {
                    let type_ref = resolver.resolve(wsdl, &param.type_name)?;
                    parts.push((param.name.clone(), PartRef::Type(type_ref)));
                }
                parts
            }
        };
        wsdl.add_message(&input, &input_parts);

        let output = if one_way {
            None
        } else {
            let output = format!("{}Out", name);
            let return_ref = resolver.resolve(wsdl, &prototype.return_type)?;
            let output_parts = match self.style {
                Style::Document => {
                    let element = wsdl.add_element(&ElementSpec {
                        name: format!("{}Response", name),
                        sequence: vec![SequenceEntry {
                            name: format!("{}Result", name),
                            type_ref: return_ref,
                            nillable: false,
                        }],
                    });
                    vec![("parameters".to_string(), PartRef::Element(element))]
                }
                Style::Rpc => vec![("return".to_string(), PartRef::Type(return_ref))],
            };
            wsdl.add_message(&output, &output_parts);
            Some(output)
        };

        let port_operation = wsdl.add_port_operation(
            state.port,
            &name,
            &format!("tns:{}", input),
            output.as_ref().map(|o| format!("tns:{}", o)).as_deref(),
        );
        if !signature.description.is_empty() {
            wsdl.add_documentation(port_operation, &signature.description);
        }

        // RPC bodies need a namespace (WS-I BP 1.1 R2717)
        if self.style == Style::Rpc && state.body_style.namespace.is_none() {
            debug!("Defaulting soap:body namespace to {}", self.uri);
            state.body_style.namespace = Some(self.uri.to_string());
        }

        let body = &state.body_style;
        let binding_operation = wsdl.add_binding_operation(
            state.binding,
            &name,
            body,
            if one_way { None } else { Some(body) },
        );
        wsdl.add_soap_operation(binding_operation, &format!("{}#{}", self.uri, name));

        state.functions.push(signature.name.clone());
        Ok(())
    }
}

/// Pick the prototype with the most parameters; the first one wins a tie
pub fn select_prototype(signature: &OperationSignature) -> Result<&Prototype> {
    let mut selected: Option<&Prototype> = None;
    for prototype in &signature.prototypes {
        let better = selected
            .map(|current| prototype.parameters.len() > current.parameters.len())
            .unwrap_or(true);
        if better {
            selected = Some(prototype);
        }
    }
    selected.ok_or_else(|| Error::NoPrototype {
        operation: signature.name.clone(),
    })
}

/// Builds a WSDL document from reflected classes and functions.
///
/// # Example
///
/// ```no_run
/// use wsdl_from_source::discovery::AutoDiscover;
/// use wsdl_from_source::reflection::source::SourceReflector;
/// use std::path::Path;
///
/// let reflector = SourceReflector::from_directory(Path::new("./my-service")).unwrap();
/// let mut discover = AutoDiscover::new();
/// discover.set_uri("http://localhost/soap").unwrap();
/// discover.set_class(&reflector, "Calculator").unwrap();
/// println!("{}", discover.to_xml().unwrap());
/// ```
pub struct AutoDiscover {
    strategy: Box<dyn ComplexTypeStrategy>,
    context: Box<dyn RequestContext>,
    uri: Option<EndpointUri>,
    operation_body_style: OperationBodyStyle,
    binding_style: BindingStyle,
    name: Option<String>,
    document: Option<DocumentState>,
}

impl Default for AutoDiscover {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoDiscover {
    /// Engine with default settings, reading the endpoint from CGI variables
    pub fn new() -> Self {
        Self {
            strategy: Box::new(strategy::DefaultComplexType),
            context: Box::new(CgiContext::from_env()),
            uri: None,
            operation_body_style: OperationBodyStyle::default(),
            binding_style: BindingStyle::default(),
            name: None,
            document: None,
        }
    }

    /// Engine configured from an [`AutoDiscoverConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown strategy name or an
    /// invalid endpoint URI.
    pub fn from_config(config: &AutoDiscoverConfig) -> Result<Self> {
        let mut discover = Self::new();
        discover.set_complex_type_strategy(strategy::from_setting(&config.strategy)?);
        if let Some(uri) = &config.uri {
            discover.set_uri(uri)?;
        }
        discover.set_operation_body_style(config.operation_body_style.clone());
        discover.set_binding_style(&config.binding_style)?;
        discover.name = config.name.clone();
        Ok(discover)
    }

    /// Replace the request context used to default the URI and document name
    pub fn with_context(mut self, context: Box<dyn RequestContext>) -> Self {
        self.context = context;
        self
    }

    /// Base name for documents built from free functions
    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    /// Set the endpoint URI; an existing document moves to the new namespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `uri` is not an absolute URI.
    pub fn set_uri(&mut self, uri: &str) -> Result<()> {
        let uri = EndpointUri::parse(uri)?;
        if let Some(state) = self.document.as_mut() {
            state.wsdl.set_uri(uri.as_str());
            if let Some(address) = state.address {
                state
                    .wsdl
                    .dom_mut()
                    .set_attribute(address, "location", uri.as_str());
            }
        }
        self.uri = Some(uri);
        Ok(())
    }

    /// The endpoint URI, derived from the request context when none was set.
    ///
    /// The detected value is cached, so later context changes are not seen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the context yields no valid URI.
    pub fn get_uri(&mut self) -> Result<EndpointUri> {
        if let Some(uri) = &self.uri {
            return Ok(uri.clone());
        }
        let detected = EndpointUri::parse(&self.context.endpoint_uri())?;
        debug!("Detected endpoint URI {}", detected);
        self.uri = Some(detected.clone());
        Ok(detected)
    }

    /// Strategy used for types resolved after this call
    pub fn set_complex_type_strategy(&mut self, strategy: Box<dyn ComplexTypeStrategy>) {
        debug!("Using complex type strategy {}", strategy.name());
        self.strategy = strategy;
    }

    /// Strategy currently used for new types
    pub fn complex_type_strategy(&self) -> &dyn ComplexTypeStrategy {
        self.strategy.as_ref()
    }

    /// `soap:body` options for operations emitted after this call
    pub fn set_operation_body_style(&mut self, style: OperationBodyStyle) {
        if let Some(state) = self.document.as_mut() {
            state.body_style = style.clone();
        }
        self.operation_body_style = style;
    }

    /// Effective `soap:body` options, including a defaulted RPC namespace
    pub fn operation_body_style(&self) -> &OperationBodyStyle {
        match &self.document {
            Some(state) => &state.body_style,
            None => &self.operation_body_style,
        }
    }

    /// Merge the given binding style keys.
    ///
    /// Once a document exists its `soap:binding` is fixed, so any change is
    /// rejected with [`Error::InconsistentState`].
    pub fn set_binding_style(&mut self, update: &BindingStyleUpdate) -> Result<()> {
        let mut merged = self.binding_style.clone();
        merged.merge(update);
        if merged == self.binding_style {
            return Ok(());
        }
        if let Some(state) = &self.document {
            return Err(Error::InconsistentState(format!(
                "binding style of '{}' cannot change after the document was created",
                state.wsdl.name()
            )));
        }
        self.binding_style = merged;
        Ok(())
    }

    /// Style and transport written to `soap:binding`
    pub fn binding_style(&self) -> &BindingStyle {
        &self.binding_style
    }

    /// Reflect a class and build a new document from its operations.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Reflection`] when the class cannot be found, and with
    /// the errors of [`AutoDiscover::register_class`]. Nothing is kept on failure.
    pub fn set_class(&mut self, reflector: &dyn Reflector, class: &str) -> Result<()> {
        let signatures = reflector.reflect_class(class)?;
        self.register_class(class, &signatures, reflector.catalog())
    }

    /// Build a new document named after `class` from already reflected operations.
    ///
    /// # Arguments
    ///
    /// * `class` - Class name; its translation is the base of the port, binding and service names
    /// * `signatures` - Operations in declaration order
    /// * `catalog` - Record and enum definitions used to resolve complex types
    ///
    /// # Errors
    ///
    /// * [`Error::InconsistentState`] if a document already exists
    /// * [`Error::NoPrototype`] for an operation without prototypes
    /// * [`Error::SchemaGeneration`] for a type the strategy cannot map
    pub fn register_class(
        &mut self,
        class: &str,
        signatures: &[OperationSignature],
        catalog: &TypeCatalog,
    ) -> Result<()> {
        if let Some(state) = &self.document {
            return Err(Error::InconsistentState(format!(
                "document '{}' already exists, reset it before registering class '{}'",
                state.wsdl.name(),
                class
            )));
        }

        let uri = self.get_uri()?;
        let base = translate_type(class);
        let mut state = DocumentState::create(
            &base,
            &uri,
            &self.binding_style,
            &self.operation_body_style,
            catalog,
        );
        state.class = Some(class.to_string());

        self.emit_all(&mut state, &uri, signatures)?;
        info!("Registered class {} with {} operations", class, signatures.len());
        self.commit(state);
        Ok(())
    }

    /// Reflect one free function and add it to the document
    pub fn add_function(&mut self, reflector: &dyn Reflector, function: &str) -> Result<()> {
        self.add_functions(reflector, &[function])
    }

    /// Reflect several free functions and add them to the document in order
    pub fn add_functions(&mut self, reflector: &dyn Reflector, functions: &[&str]) -> Result<()> {
        let signatures = functions
            .iter()
            .map(|f| reflector.reflect_function(f))
            .collect::<Result<Vec<_>>>()?;
        self.register_functions(&signatures, reflector.catalog())
    }

    /// Add already reflected functions, creating the document on first use.
    ///
    /// The document is named after [`AutoDiscover::set_name`], the script name
    /// of the request context, or `Service`, in that order.
    ///
    /// # Errors
    ///
    /// Same as [`AutoDiscover::register_class`], except that an existing
    /// document is extended instead of rejected.
    pub fn register_functions(
        &mut self,
        signatures: &[OperationSignature],
        catalog: &TypeCatalog,
    ) -> Result<()> {
        let uri = self.get_uri()?;
        let mut state = match &self.document {
            Some(existing) => {
                let mut staged = existing.clone();
                staged.catalog.merge(catalog);
                staged
            }
            None => DocumentState::create(
                &self.function_base_name(),
                &uri,
                &self.binding_style,
                &self.operation_body_style,
                catalog,
            ),
        };

        self.emit_all(&mut state, &uri, signatures)?;
        info!("Registered {} functions", signatures.len());
        self.commit(state);
        Ok(())
    }

    fn emit_all(
        &self,
        state: &mut DocumentState,
        uri: &EndpointUri,
        signatures: &[OperationSignature],
    ) -> Result<()> {
        let emitter = OperationEmitter {
            strategy: self.strategy.as_ref(),
            style: self.binding_style.style,
            uri,
        };
        for signature in signatures {
            emitter.emit(state, signature)?;
        }
        Ok(())
    }

    fn commit(&mut self, state: DocumentState) {
        self.operation_body_style = state.body_style.clone();
        self.document = Some(state);
    }

    fn function_base_name(&self) -> String {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => self.context.script_base_name(),
        };
        let name = translate_type(&name);
        if name.is_empty() {
            DEFAULT_SERVICE_NAME.to_string()
        } else {
            name
        }
    }

    /// Discard the current document and the list of discovered operations
    pub fn reset(&mut self) {
        debug!("Discarding WSDL document");
        self.document = None;
    }

    /// Names of all operations added to the current document, in order
    pub fn functions(&self) -> &[String] {
        match &self.document {
            Some(state) => &state.functions,
            None => &[],
        }
    }

    /// Class the current document was built from, if any
    pub fn class(&self) -> Option<&str> {
        self.document.as_ref().and_then(|s| s.class.as_deref())
    }

    /// Name of the `<service>` element of the current document
    pub fn service_name(&self) -> Option<&str> {
        self.document.as_ref().map(|s| s.service_name.as_str())
    }

    /// Resolve a type name against the current document, emitting schema types as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotInitialized`] before a class or function was
    /// registered, and [`Error::SchemaGeneration`] for malformed type names.
    pub fn get_type(&mut self, type_name: &str) -> Result<String> {
        let state = self
            .document
            .as_mut()
            .ok_or(Error::DocumentNotInitialized("resolve types of"))?;
        let resolver = TypeResolver::new(self.strategy.as_ref(), &state.catalog);
        resolver.resolve(&mut state.wsdl, type_name)
    }

    /// Source type names registered in the current document
    pub fn registered_types(&self) -> Result<Vec<&str>> {
        self.wsdl_for("list types of").map(Wsdl::get_types)
    }

    /// The document under construction, if one exists
    pub fn wsdl(&self) -> Option<&Wsdl> {
        self.document.as_ref().map(|s| &s.wsdl)
    }

    fn wsdl_for(&self, action: &'static str) -> Result<&Wsdl> {
        self.wsdl().ok_or(Error::DocumentNotInitialized(action))
    }

    /// Render the current document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotInitialized`] when there is no document yet.
    pub fn to_xml(&self) -> Result<String> {
        serializer::to_xml(self.wsdl_for("serialize")?)
    }

    /// Write the document to `path`, or to stdout without one
    pub fn dump(&self, path: Option<&Path>) -> Result<bool> {
        self.wsdl_for("dump")?.dump(path)
    }

    /// Produce the response that serves the document
    pub fn handle(&self) -> Result<ServedDocument> {
        serializer::serve(self.wsdl_for("serve")?)
    }
}
