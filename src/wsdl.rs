//! WSDL 1.1 document builder.
//!
//! [`Wsdl`] wraps an [`XmlDocument`] rooted at `<definitions>` and exposes the
//! primitives the discovery engine composes: schema types, wrapper elements,
//! messages, port types, bindings and services. It also owns the registry of
//! source type names already mapped to schema types, which keeps every
//! generated complex type unique within one document.

use crate::config::OperationBodyStyle;
use crate::error::Result;
use crate::xml::{NodeId, XmlDocument};
use log::debug;
use std::collections::BTreeSet;
use std::path::Path;

pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";
pub const SOAP_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap/";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const SOAP_ENC_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Reference carried by a message part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartRef {
    /// `type="..."`, used by RPC style parts
    Type(String),
    /// `element="..."`, used by document style wrapper parts
    Element(String),
}

/// Entry of a wrapper element's `xsd:sequence`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntry {
    pub name: String,
    pub type_ref: String,
    pub nillable: bool,
}

/// Top-level schema element wrapping a sequence of typed entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    pub name: String,
    pub sequence: Vec<SequenceEntry>,
}

/// A WSDL document under construction
#[derive(Debug, Clone)]
pub struct Wsdl {
    dom: XmlDocument,
    definitions: NodeId,
    types: Option<NodeId>,
    schema: Option<NodeId>,
    name: String,
    uri: String,
    /// Source type name -> qualified schema reference, in registration order
    registered: Vec<(String, String)>,
    /// Names of the `complexType`/`simpleType` definitions emitted so far
    schema_types: BTreeSet<String>,
}

impl Wsdl {
    /// Create an empty `<definitions>` document
    pub fn new(name: &str, uri: &str) -> Self {
        debug!("Creating WSDL document {} at {}", name, uri);
        let mut dom = XmlDocument::new();
        let definitions = dom.create_element("definitions");
        dom.set_root(definitions);
        dom.set_attribute(definitions, "xmlns", WSDL_NS);
        dom.set_attribute(definitions, "xmlns:tns", uri);
        dom.set_attribute(definitions, "xmlns:soap", SOAP_NS);
        dom.set_attribute(definitions, "xmlns:xsd", XSD_NS);
        dom.set_attribute(definitions, "xmlns:soap-enc", SOAP_ENC_NS);
        dom.set_attribute(definitions, "xmlns:wsdl", WSDL_NS);
        dom.set_attribute(definitions, "name", name);
        dom.set_attribute(definitions, "targetNamespace", uri);

        Self {
            dom,
            definitions,
            types: None,
            schema: None,
            name: name.to_string(),
            uri: uri.to_string(),
            registered: Vec::new(),
            schema_types: BTreeSet::new(),
        }
    }

    /// Value of the `name` attribute of `<definitions>`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target namespace, which is also the `tns` prefix
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Underlying element tree, for inspection
    pub fn dom(&self) -> &XmlDocument {
        &self.dom
    }

    /// Underlying element tree, for strategies emitting schema fragments
    pub fn dom_mut(&mut self) -> &mut XmlDocument {
        &mut self.dom
    }

    /// The root `<definitions>` element
    pub fn definitions(&self) -> NodeId {
        self.definitions
    }

    /// Move the document to a new target namespace
    pub fn set_uri(&mut self, uri: &str) {
        debug!("Changing WSDL target namespace to {}", uri);
        self.uri = uri.to_string();
        self.dom.set_attribute(self.definitions, "xmlns:tns", uri);
        self.dom.set_attribute(self.definitions, "targetNamespace", uri);
        if let Some(schema) = self.schema {
            self.dom.set_attribute(schema, "targetNamespace", uri);
        }
    }

    /// Add the `<types>` section holding the `xsd:schema`.
    ///
    /// WS-I Basic Profile R2023 requires `types` to precede every other section,
    /// so the section is always inserted as the first child of `<definitions>`.
    /// Calling this more than once returns the existing schema.
    pub fn add_schema_type_section(&mut self) -> NodeId {
        if let Some(schema) = self.schema {
            return schema;
        }

        let types = self.dom.create_element("types");
        let schema = self.dom.create_element("xsd:schema");
        self.dom.set_attribute(schema, "targetNamespace", &self.uri);
        self.dom.append_child(types, schema);
        self.dom.insert_child(self.definitions, 0, types);

        self.types = Some(types);
        self.schema = Some(schema);
        schema
    }

    /// The `xsd:schema` node, creating the types section on first use
    pub fn schema(&mut self) -> NodeId {
        self.add_schema_type_section()
    }

    /// Record that `source_type` is represented by `type_ref`
    pub fn add_type(&mut self, source_type: &str, type_ref: &str) {
        if self.get_type(source_type).is_none() {
            debug!("Registering type {} as {}", source_type, type_ref);
            self.registered
                .push((source_type.to_string(), type_ref.to_string()));
        }
    }

    /// Schema reference previously registered for `source_type`
    pub fn get_type(&self, source_type: &str) -> Option<&str> {
        self.registered
            .iter()
            .find(|(source, _)| source == source_type)
            .map(|(_, type_ref)| type_ref.as_str())
    }

    /// All registered source type names, in registration order
    pub fn get_types(&self) -> Vec<&str> {
        self.registered.iter().map(|(source, _)| source.as_str()).collect()
    }

    /// Reserve the schema type name `name` before emitting its definition.
    ///
    /// Different source spellings can translate to the same generated name
    /// (`billing::Invoice` and `billing.Invoice`, or `customer[]` and
    /// `Customer[]`). Returns `false` when a definition with that name was
    /// already emitted, in which case the caller must reuse it.
    pub fn define_schema_type(&mut self, name: &str) -> bool {
        let inserted = self.schema_types.insert(name.to_string());
        if !inserted {
            debug!("Schema type {} already defined, reusing it", name);
        }
        inserted
    }

    /// Whether a schema type definition named `name` was emitted
    pub fn has_schema_type(&self, name: &str) -> bool {
        self.schema_types.contains(name)
    }

    /// Add a wrapper element to the schema, returning `tns:<name>`
    pub fn add_element(&mut self, spec: &ElementSpec) -> String {
        debug!("Adding element {} with {} entries", spec.name, spec.sequence.len());
        let schema = self.schema();

        let element = self.dom.create_element("xsd:element");
        self.dom.set_attribute(element, "name", &spec.name);

        let complex_type = self.dom.create_element("xsd:complexType");
        let sequence = self.dom.create_element("xsd:sequence");
        for entry in &spec.sequence {
            let item = self.dom.create_element("xsd:element");
            self.dom.set_attribute(item, "name", &entry.name);
            self.dom.set_attribute(item, "type", &entry.type_ref);
            if entry.nillable {
                self.dom.set_attribute(item, "nillable", "true");
            }
            self.dom.append_child(sequence, item);
        }
        self.dom.append_child(complex_type, sequence);
        self.dom.append_child(element, complex_type);
        self.dom.append_child(schema, element);

        format!("tns:{}", spec.name)
    }

    /// Add a `<message>` with its parts in the given order
    pub fn add_message(&mut self, name: &str, parts: &[(String, PartRef)]) -> NodeId {
        debug!("Adding message {} with {} parts", name, parts.len());
        let message = self.dom.create_element("message");
        self.dom.set_attribute(message, "name", name);

        for (part_name, reference) in parts {
            let part = self.dom.create_element("part");
            self.dom.set_attribute(part, "name", part_name);
            match reference {
                PartRef::Type(type_ref) => self.dom.set_attribute(part, "type", type_ref),
                PartRef::Element(element) => self.dom.set_attribute(part, "element", element),
            }
            self.dom.append_child(message, part);
        }

        self.dom.append_child(self.definitions, message);
        message
    }

    /// Add an empty `<portType>`; operations are attached with [`Wsdl::add_port_operation`]
    pub fn add_port_type(&mut self, name: &str) -> NodeId {
        let port_type = self.dom.create_element("portType");
        self.dom.set_attribute(port_type, "name", name);
        self.dom.append_child(self.definitions, port_type);
        port_type
    }

    /// Add an operation to a port type; `output` is `None` for one-way operations
    pub fn add_port_operation(
        &mut self,
        port_type: NodeId,
        name: &str,
        input: &str,
        output: Option<&str>,
    ) -> NodeId {
        let operation = self.dom.create_element("operation");
        self.dom.set_attribute(operation, "name", name);

        let input_node = self.dom.create_element("input");
        self.dom.set_attribute(input_node, "message", input);
        self.dom.append_child(operation, input_node);

        if let Some(output) = output {
            let output_node = self.dom.create_element("output");
            self.dom.set_attribute(output_node, "message", output);
            self.dom.append_child(operation, output_node);
        }

        self.dom.append_child(port_type, operation);
        operation
    }

    /// Add a `<binding>` for the port type referenced by `port_type` (`tns:<Name>Port`)
    pub fn add_binding(&mut self, name: &str, port_type: &str) -> NodeId {
        let binding = self.dom.create_element("binding");
        self.dom.set_attribute(binding, "name", name);
        self.dom.set_attribute(binding, "type", port_type);
        self.dom.append_child(self.definitions, binding);
        binding
    }

    /// Add a binding operation with `soap:body` children for input and output
    pub fn add_binding_operation(
        &mut self,
        binding: NodeId,
        name: &str,
        input: &OperationBodyStyle,
        output: Option<&OperationBodyStyle>,
    ) -> NodeId {
        let operation = self.dom.create_element("operation");
        self.dom.set_attribute(operation, "name", name);

        let input_node = self.dom.create_element("input");
        let body = self.soap_body(input);
        self.dom.append_child(input_node, body);
        self.dom.append_child(operation, input_node);

        if let Some(output) = output {
            let output_node = self.dom.create_element("output");
            let body = self.soap_body(output);
            self.dom.append_child(output_node, body);
            self.dom.append_child(operation, output_node);
        }

        self.dom.append_child(binding, operation);
        operation
    }

    fn soap_body(&mut self, style: &OperationBodyStyle) -> NodeId {
        let body = self.dom.create_element("soap:body");
        self.dom.set_attribute(body, "use", style.use_kind.as_str());
        if let Some(encoding_style) = &style.encoding_style {
            self.dom.set_attribute(body, "encodingStyle", encoding_style);
        }
        if let Some(namespace) = &style.namespace {
            self.dom.set_attribute(body, "namespace", namespace);
        }
        body
    }

    /// Insert the `soap:binding` declaration as the first child of `binding`
    pub fn add_soap_binding(&mut self, binding: NodeId, style: &str, transport: &str) -> NodeId {
        let soap_binding = self.dom.create_element("soap:binding");
        self.dom.set_attribute(soap_binding, "style", style);
        self.dom.set_attribute(soap_binding, "transport", transport);
        self.dom.insert_child(binding, 0, soap_binding);
        soap_binding
    }

    /// Attach a `soap:operation` action as the first child of a binding operation
    pub fn add_soap_operation(&mut self, operation: NodeId, soap_action: &str) -> NodeId {
        let soap_operation = self.dom.create_element("soap:operation");
        self.dom.set_attribute(soap_operation, "soapAction", soap_action);
        self.dom.insert_child(operation, 0, soap_operation);
        soap_operation
    }

    /// Add a `<service>` with one port bound to `binding`.
    ///
    /// # Arguments
    ///
    /// * `name` - Service name
    /// * `port_name` - Name of the single `<port>`
    /// * `binding` - Qualified binding reference (`tns:<Name>Binding`)
    /// * `location` - Endpoint written to `soap:address`
    pub fn add_service(
        &mut self,
        name: &str,
        port_name: &str,
        binding: &str,
        location: &str,
    ) -> NodeId {
        let service = self.dom.create_element("service");
        self.dom.set_attribute(service, "name", name);

        let port = self.dom.create_element("port");
        self.dom.set_attribute(port, "name", port_name);
        self.dom.set_attribute(port, "binding", binding);

        let address = self.dom.create_element("soap:address");
        self.dom.set_attribute(address, "location", location);

        self.dom.append_child(port, address);
        self.dom.append_child(service, port);
        self.dom.append_child(self.definitions, service);
        service
    }

    /// Attach `<documentation>` as the first child of `node`
    pub fn add_documentation(&mut self, node: NodeId, text: &str) -> NodeId {
        let documentation = self.dom.create_element("documentation");
        self.dom.set_text(documentation, text);
        self.dom.insert_child(node, 0, documentation);
        documentation
    }

    /// Render the document as indented XML text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::SerializationError`] if the XML writer fails.
    pub fn to_xml(&self) -> Result<String> {
        self.dom.to_string_pretty()
    }

    /// Write the document to `path`, or to stdout when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the file cannot be written.
    pub fn dump(&self, path: Option<&Path>) -> Result<bool> {
        let xml = self.to_xml()?;
        match path {
            Some(path) => {
                debug!("Dumping WSDL to {}", path.display());
                std::fs::write(path, xml)?;
            }
            None => print!("{}", xml),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BodyUse;
    use pretty_assertions::assert_eq;

    const URI: &str = "http://localhost/service.php";

    fn child_names(wsdl: &Wsdl) -> Vec<String> {
        let dom = wsdl.dom();
        dom.children(wsdl.definitions())
            .iter()
            .map(|c| dom.name(*c).to_string())
            .collect()
    }

    #[test]
    fn test_new_document_declares_namespaces() {
        let wsdl = Wsdl::new("Demo", URI);
        let dom = wsdl.dom();
        let root = wsdl.definitions();

        assert_eq!(dom.attribute(root, "name"), Some("Demo"));
        assert_eq!(dom.attribute(root, "targetNamespace"), Some(URI));
        assert_eq!(dom.attribute(root, "xmlns:tns"), Some(URI));
        assert_eq!(dom.attribute(root, "xmlns:xsd"), Some(XSD_NS));
        assert_eq!(dom.attribute(root, "xmlns:soap-enc"), Some(SOAP_ENC_NS));
    }

    #[test]
    fn test_types_section_is_always_first() {
        let mut wsdl = Wsdl::new("Demo", URI);
        wsdl.add_port_type("DemoPort");
        wsdl.add_message("pingIn", &[]);
        wsdl.add_schema_type_section();

        assert_eq!(child_names(&wsdl), vec!["types", "portType", "message"]);
    }

    #[test]
    fn test_schema_type_section_is_idempotent() {
        let mut wsdl = Wsdl::new("Demo", URI);
        let first = wsdl.add_schema_type_section();
        let second = wsdl.add_schema_type_section();

        assert_eq!(first, second);
        assert_eq!(child_names(&wsdl), vec!["types"]);
    }

    #[test]
    fn test_schema_type_names_are_defined_once() {
        let mut wsdl = Wsdl::new("Demo", URI);

        assert!(!wsdl.has_schema_type("ArrayOfCustomer"));
        assert!(wsdl.define_schema_type("ArrayOfCustomer"));
        assert!(!wsdl.define_schema_type("ArrayOfCustomer"));
        assert!(wsdl.has_schema_type("ArrayOfCustomer"));
    }

    #[test]
    fn test_type_registry_keeps_first_reference() {
        let mut wsdl = Wsdl::new("Demo", URI);
        wsdl.add_type("Customer", "tns:Customer");
        wsdl.add_type("Customer", "tns:Other");
        wsdl.add_type("Customer[]", "tns:ArrayOfCustomer");

        assert_eq!(wsdl.get_type("Customer"), Some("tns:Customer"));
        assert_eq!(wsdl.get_types(), vec!["Customer", "Customer[]"]);
        assert!(wsdl.get_type("Invoice").is_none());
    }

    #[test]
    fn test_add_element_with_nillable_entry() {
        let mut wsdl = Wsdl::new("Demo", URI);
        let reference = wsdl.add_element(&ElementSpec {
            name: "find".to_string(),
            sequence: vec![
                SequenceEntry {
                    name: "query".to_string(),
                    type_ref: "xsd:string".to_string(),
                    nillable: false,
                },
                SequenceEntry {
                    name: "limit".to_string(),
                    type_ref: "xsd:int".to_string(),
                    nillable: true,
                },
            ],
        });

        assert_eq!(reference, "tns:find");
        let xml = wsdl.to_xml().unwrap();
        assert!(xml.contains("<xsd:element name=\"find\">"));
        assert!(xml.contains("<xsd:element name=\"query\" type=\"xsd:string\"/>"));
        assert!(xml.contains("<xsd:element name=\"limit\" type=\"xsd:int\" nillable=\"true\"/>"));
    }

    #[test]
    fn test_one_way_port_operation_has_no_output() {
        let mut wsdl = Wsdl::new("Demo", URI);
        let port = wsdl.add_port_type("DemoPort");
        let operation = wsdl.add_port_operation(port, "ping", "tns:pingIn", None);

        let dom = wsdl.dom();
        assert_eq!(dom.children_named(operation, "input").count(), 1);
        assert_eq!(dom.children_named(operation, "output").count(), 0);
    }

    #[test]
    fn test_binding_operation_body_and_action() {
        let mut wsdl = Wsdl::new("Demo", URI);
        let binding = wsdl.add_binding("DemoBinding", "tns:DemoPort");
        wsdl.add_soap_binding(binding, "rpc", "http://schemas.xmlsoap.org/soap/http");
        let style = OperationBodyStyle {
            use_kind: BodyUse::Encoded,
            encoding_style: Some(SOAP_ENC_NS.to_string()),
            namespace: Some(URI.to_string()),
        };
        let operation = wsdl.add_binding_operation(binding, "add", &style, Some(&style));
        wsdl.add_soap_operation(operation, &format!("{}#add", URI));

        let dom = wsdl.dom();
        assert_eq!(dom.name(dom.children(binding)[0]), "soap:binding");
        let first = dom.children(operation)[0];
        assert_eq!(dom.name(first), "soap:operation");
        assert_eq!(
            dom.attribute(first, "soapAction"),
            Some("http://localhost/service.php#add")
        );

        let xml = wsdl.to_xml().unwrap();
        assert!(xml.contains(
            "<soap:body use=\"encoded\" encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\" namespace=\"http://localhost/service.php\"/>"
        ));
    }

    #[test]
    fn test_documentation_is_first_child() {
        let mut wsdl = Wsdl::new("Demo", URI);
        let port = wsdl.add_port_type("DemoPort");
        let operation = wsdl.add_port_operation(port, "add", "tns:addIn", Some("tns:addOut"));
        wsdl.add_documentation(operation, "Adds two numbers");

        let dom = wsdl.dom();
        let first = dom.children(operation)[0];
        assert_eq!(dom.name(first), "documentation");
        assert_eq!(dom.text(first), Some("Adds two numbers"));
    }

    #[test]
    fn test_set_uri_rewrites_namespaces() {
        let mut wsdl = Wsdl::new("Demo", URI);
        let schema = wsdl.add_schema_type_section();
        wsdl.set_uri("https://example.com/soap");

        let dom = wsdl.dom();
        assert_eq!(dom.attribute(wsdl.definitions(), "xmlns:tns"), Some("https://example.com/soap"));
        assert_eq!(dom.attribute(schema, "targetNamespace"), Some("https://example.com/soap"));
        assert_eq!(wsdl.uri(), "https://example.com/soap");
    }

    #[test]
    fn test_dump_writes_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("service.wsdl");
        let mut wsdl = Wsdl::new("Demo", URI);
        wsdl.add_service("DemoService", "DemoPort", "tns:DemoBinding", URI);

        assert!(wsdl.dump(Some(&path)).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<soap:address location=\"http://localhost/service.php\"/>"));
    }
}
