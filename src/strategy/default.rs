use crate::error::Result;
use crate::reflection::TypeDefinition;
use crate::type_resolver::{translate_type, ComplexTypeStrategy, TypeExpr, TypeResolver};
use crate::wsdl::Wsdl;
use log::{debug, warn};

/// Records as `xsd:complexType`/`xsd:all`, enums as string restrictions.
///
/// Arrays are not expanded: any `T[]` maps to the flat `soap-enc:Array`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComplexType;

impl ComplexTypeStrategy for DefaultComplexType {
    fn name(&self) -> &'static str {
        "default"
    }

    fn add_complex_type(
        &self,
        resolver: &TypeResolver<'_>,
        wsdl: &mut Wsdl,
        ty: &TypeExpr,
    ) -> Result<String> {
        if ty.is_array() {
            debug!("Mapping array type {} to soap-enc:Array", ty.canonical());
            return Ok("soap-enc:Array".to_string());
        }
        add_named_type(resolver, wsdl, ty.singular())
    }
}

/// Emit the schema fragment for a bare, non-builtin type and return `tns:<Name>`.
///
/// The type is registered before its fields are resolved so that
/// self-referencing records terminate. A spelling that translates to an
/// already defined name only gets registered.
pub(crate) fn add_named_type(
    resolver: &TypeResolver<'_>,
    wsdl: &mut Wsdl,
    type_name: &str,
) -> Result<String> {
    if let Some(existing) = wsdl.get_type(type_name) {
        return Ok(existing.to_string());
    }

    let translated = translate_type(type_name);
    let reference = format!("tns:{}", translated);
    wsdl.add_type(type_name, &reference);
    if !wsdl.define_schema_type(&translated) {
        return Ok(reference);
    }

    match resolver.catalog().get(type_name) {
        Some(TypeDefinition::Record { fields }) => {
            debug!("Adding complex type {} with {} fields", translated, fields.len());
            let mut elements = Vec::with_capacity(fields.len());
            for field in fields {
                let type_ref = resolver.resolve(wsdl, &field.type_name)?;
                elements.push((field.name.as_str(), type_ref, field.optional));
            }

            let dom_schema = wsdl.schema();
            let dom = wsdl.dom_mut();
            let complex_type = dom.create_element("xsd:complexType");
            dom.set_attribute(complex_type, "name", &translated);
            let all = dom.create_element("xsd:all");
            for (name, type_ref, optional) in elements {
                let element = dom.create_element("xsd:element");
                dom.set_attribute(element, "name", name);
                dom.set_attribute(element, "type", &type_ref);
                if optional {
                    dom.set_attribute(element, "nillable", "true");
                }
                dom.append_child(all, element);
            }
            dom.append_child(complex_type, all);
            dom.append_child(dom_schema, complex_type);
        }
        Some(TypeDefinition::Enumeration { variants }) => {
            debug!("Adding enumeration {} with {} values", translated, variants.len());
            let dom_schema = wsdl.schema();
            let dom = wsdl.dom_mut();
            let simple_type = dom.create_element("xsd:simpleType");
            dom.set_attribute(simple_type, "name", &translated);
            let restriction = dom.create_element("xsd:restriction");
            dom.set_attribute(restriction, "base", "xsd:string");
            for variant in variants {
                let enumeration = dom.create_element("xsd:enumeration");
                dom.set_attribute(enumeration, "value", variant);
                dom.append_child(restriction, enumeration);
            }
            dom.append_child(simple_type, restriction);
            dom.append_child(dom_schema, simple_type);
        }
        None => {
            warn!("No definition found for type {}, emitting an empty complex type", type_name);
            let dom_schema = wsdl.schema();
            let dom = wsdl.dom_mut();
            let complex_type = dom.create_element("xsd:complexType");
            dom.set_attribute(complex_type, "name", &translated);
            let all = dom.create_element("xsd:all");
            dom.append_child(complex_type, all);
            dom.append_child(dom_schema, complex_type);
        }
    }

    Ok(reference)
}
