use super::default::add_named_type;
use crate::error::{Error, Result};
use crate::type_resolver::{array_type_name, ComplexTypeStrategy, TypeExpr, TypeResolver};
use crate::wsdl::Wsdl;
use log::debug;

/// SOAP-encoded arrays: `ArrayOf<T>` as a restriction of `soap-enc:Array`.
///
/// Only one level of nesting can be expressed this way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayOfTypeComplex;

impl ComplexTypeStrategy for ArrayOfTypeComplex {
    fn name(&self) -> &'static str {
        "complex"
    }

    fn add_complex_type(
        &self,
        resolver: &TypeResolver<'_>,
        wsdl: &mut Wsdl,
        ty: &TypeExpr,
    ) -> Result<String> {
        match ty.depth() {
            0 => add_named_type(resolver, wsdl, ty.singular()),
            1 => {
                let singular = ty.singular();
                let name = array_type_name(singular, 1);
                let reference = format!("tns:{}", name);
                let source_type = ty.canonical();
                if let Some(existing) = wsdl.get_type(&source_type) {
                    return Ok(existing.to_string());
                }

                let item_ref = resolver.resolve(wsdl, singular)?;
                if wsdl.define_schema_type(&name) {
                    add_soap_array_type(wsdl, &name, &item_ref);
                }
                wsdl.add_type(&source_type, &reference);
                Ok(reference)
            }
            _ => Err(Error::schema(
                &ty.canonical(),
                "ArrayOfTypeComplex cannot return nested ArrayOfObject deeper than one level",
            )),
        }
    }
}

fn add_soap_array_type(wsdl: &mut Wsdl, name: &str, item_ref: &str) {
    debug!("Adding SOAP array type {} of {}", name, item_ref);
    let schema = wsdl.schema();
    let dom = wsdl.dom_mut();

    let complex_type = dom.create_element("xsd:complexType");
    dom.set_attribute(complex_type, "name", name);

    let content = dom.create_element("xsd:complexContent");
    let restriction = dom.create_element("xsd:restriction");
    dom.set_attribute(restriction, "base", "soap-enc:Array");

    let attribute = dom.create_element("xsd:attribute");
    dom.set_attribute(attribute, "ref", "soap-enc:arrayType");
    dom.set_attribute(attribute, "wsdl:arrayType", &format!("{}[]", item_ref));

    dom.append_child(restriction, attribute);
    dom.append_child(content, restriction);
    dom.append_child(complex_type, content);
    dom.append_child(schema, complex_type);
}
