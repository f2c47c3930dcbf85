use super::default::add_named_type;
use crate::error::Result;
use crate::type_resolver::{array_type_name, ComplexTypeStrategy, TypeExpr, TypeResolver};
use crate::wsdl::Wsdl;
use log::debug;

/// Nested arrays as chains of `ArrayOf...` sequence types.
///
/// For `Invoice[][]` this emits `ArrayOfInvoice` (items of `tns:Invoice`) and
/// `ArrayOfArrayOfInvoice` (items of `tns:ArrayOfInvoice`). Each level is
/// registered under its source spelling (`Invoice[]`, `Invoice[][]`) and
/// defined under its generated name, so a shape shared by several operations
/// is emitted once per document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayOfTypeSequence;

impl ComplexTypeStrategy for ArrayOfTypeSequence {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn add_complex_type(
        &self,
        resolver: &TypeResolver<'_>,
        wsdl: &mut Wsdl,
        ty: &TypeExpr,
    ) -> Result<String> {
        if !ty.is_array() {
            return add_named_type(resolver, wsdl, ty.singular());
        }

        let singular = ty.singular();
        // Each level's items are whatever the level below resolved to, which may
        // come from another strategy used earlier in the document
        let mut child_ref = resolver.resolve(wsdl, singular)?;
        for level in 1..=ty.depth() {
            let source_type = ty.with_depth(level);
            if let Some(existing) = wsdl.get_type(&source_type) {
                child_ref = existing.to_string();
                continue;
            }

            let name = array_type_name(singular, level);
            let reference = format!("tns:{}", name);
            if wsdl.define_schema_type(&name) {
                add_sequence_type(wsdl, &name, &child_ref);
            }
            wsdl.add_type(&source_type, &reference);
            child_ref = reference;
        }

        Ok(child_ref)
    }
}

fn add_sequence_type(wsdl: &mut Wsdl, name: &str, child_ref: &str) {
    debug!("Adding sequence type {} of {}", name, child_ref);
    let schema = wsdl.schema();
    let dom = wsdl.dom_mut();

    let complex_type = dom.create_element("xsd:complexType");
    dom.set_attribute(complex_type, "name", name);

    let sequence = dom.create_element("xsd:sequence");
    let element = dom.create_element("xsd:element");
    dom.set_attribute(element, "name", "item");
    dom.set_attribute(element, "type", child_ref);
    dom.set_attribute(element, "minOccurs", "0");
    dom.set_attribute(element, "maxOccurs", "unbounded");
    dom.append_child(sequence, element);

    dom.append_child(complex_type, sequence);
    dom.append_child(schema, complex_type);
}
