//! XML document model used to assemble WSDL output.
//!
//! Nodes live in an arena owned by [`XmlDocument`] and are addressed by [`NodeId`]
//! handles, so builders can keep references to `portType`, `binding` and schema
//! elements while continuing to append to the tree. Rendering converts the arena
//! into an [`xmltree::Element`] and writes it with the `xmltree` emitter.

use crate::error::{Error, Result};
use xmltree::{Element, EmitterConfig, XMLNode};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Handle to an element inside an [`XmlDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<NodeId>,
    text: Option<String>,
}

/// Arena-backed element tree
#[derive(Debug, Clone, Default)]
pub struct XmlDocument {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        });
        id
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Set an attribute, replacing any previous value for the same name
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let attributes = &mut self.nodes[id.0].attributes;
        if let Some(existing) = attributes.iter_mut().find(|(k, _)| k == name) {
            existing.1 = value.to_string();
        } else {
            attributes.push((name.to_string(), value.to_string()));
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].text = Some(text.to_string());
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Insert a child at `index`, clamped to the current child count
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0]
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].text.as_deref()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Direct children with the given element name, in document order
    pub fn children_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.name(*child) == name)
    }

    /// First direct child with the given element name and `name` attribute
    pub fn find_named_child(&self, id: NodeId, element: &str, name_attr: &str) -> Option<NodeId> {
        self.children_named(id, element)
            .find(|child| self.attribute(*child, "name") == Some(name_attr))
    }

    /// Convert the subtree below `id` into an owned [`Element`]
    pub fn to_element(&self, id: NodeId) -> Element {
        let node = &self.nodes[id.0];
        let mut element = match node.name.split_once(':') {
            Some((prefix, local)) => {
                let mut element = Element::new(local);
                element.prefix = Some(prefix.to_string());
                element
            }
            None => Element::new(&node.name),
        };
        for (key, value) in &node.attributes {
            element.attributes.insert(key.clone(), value.clone());
        }
        if let Some(text) = &node.text {
            element.children.push(XMLNode::Text(text.clone()));
        }
        for child in &node.children {
            element.children.push(XMLNode::Element(self.to_element(*child)));
        }
        element
    }

    /// Serialize the tree below the root, with an XML declaration and two-space indentation
    pub fn to_string_pretty(&self) -> Result<String> {
        let root = self
            .root
            .ok_or_else(|| Error::SerializationError("XML document has no root element".to_string()))?;

        let config = EmitterConfig::new()
            .write_document_declaration(false)
            .perform_indent(true)
            .pad_self_closing(false);
        let mut buffer = Vec::new();
        self.to_element(root).write_with_config(&mut buffer, config)?;

        let body = String::from_utf8(buffer)
            .map_err(|e| Error::SerializationError(format!("Invalid UTF-8 in output: {}", e)))?;
        Ok(format!("{}{}\n", XML_DECLARATION, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_nested_elements() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("definitions");
        doc.set_root(root);
        doc.set_attribute(root, "name", "Demo");
        let child = doc.create_element("message");
        doc.append_child(root, child);

        let xml = doc.to_string_pretty().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<definitions name=\"Demo\">"));
        assert!(xml.contains("\n  <message/>\n"));
        assert!(xml.ends_with("</definitions>\n"));
    }

    #[test]
    fn test_prefixed_names_survive_conversion() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("xsd:schema");
        doc.set_attribute(root, "targetNamespace", "urn:demo");

        let element = doc.to_element(root);
        assert_eq!(element.prefix.as_deref(), Some("xsd"));
        assert_eq!(element.name, "schema");
        assert_eq!(element.attributes.get("targetNamespace").map(String::as_str), Some("urn:demo"));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        assert!(matches!(
            XmlDocument::new().to_string_pretty(),
            Err(Error::SerializationError(_))
        ));
    }

    #[test]
    fn test_escape_text_and_attributes() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("documentation");
        doc.set_root(root);
        doc.set_attribute(root, "title", "a \"b\" & c");
        doc.set_text(root, "x < y");

        let xml = doc.to_string_pretty().unwrap();
        assert!(xml.contains("title=\"a &quot;b&quot; &amp; c\""));
        assert!(xml.contains(">x &lt; y</documentation>"));
    }

    #[test]
    fn test_insert_child_at_front() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("root");
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a);
        doc.insert_child(root, 0, b);

        assert_eq!(doc.children(root), &[b, a]);
    }

    #[test]
    fn test_set_attribute_replaces_value() {
        let mut doc = XmlDocument::new();
        let node = doc.create_element("part");
        doc.set_attribute(node, "type", "xsd:int");
        doc.set_attribute(node, "type", "xsd:string");

        assert_eq!(doc.attribute(node, "type"), Some("xsd:string"));
    }

    #[test]
    fn test_find_named_child() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("definitions");
        for name in ["addIn", "addOut"] {
            let message = doc.create_element("message");
            doc.set_attribute(message, "name", name);
            doc.append_child(root, message);
        }

        let found = doc.find_named_child(root, "message", "addOut").unwrap();
        assert_eq!(doc.attribute(found, "name"), Some("addOut"));
        assert!(doc.find_named_child(root, "message", "pingOut").is_none());
    }
}
