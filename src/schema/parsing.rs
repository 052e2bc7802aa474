//! XSD document parsing
//!
//! Parses one schema source into a [`Schema`]: global element
//! declarations, named simple/complex types and import records. The
//! supported construct subset is sequence-based complex types,
//! restriction-based simple types and attribute declarations.

use crate::documents::{Document, Element};
use crate::error::{Error, ValidationError};
use crate::namespaces::QName;
use crate::schema::builtins::{BuiltinType, XSD_NAMESPACE};
use crate::schema::set::Schema;
use crate::schema::types::{
    AttributeDecl, ComplexTypeDef, ElementDecl, ElementType, Facets, GlobalType, Particle,
    PatternFacet, SimpleTypeDef, TypeRef,
};
use rust_decimal::Decimal;

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const SEQUENCE: &str = "sequence";
    pub const ANNOTATION: &str = "annotation";
    pub const IMPORT: &str = "import";
    pub const RESTRICTION: &str = "restriction";
    // Facets
    pub const ENUMERATION: &str = "enumeration";
    pub const PATTERN: &str = "pattern";
    pub const LENGTH: &str = "length";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const MIN_INCLUSIVE: &str = "minInclusive";
    pub const MAX_INCLUSIVE: &str = "maxInclusive";
    pub const MIN_EXCLUSIVE: &str = "minExclusive";
    pub const MAX_EXCLUSIVE: &str = "maxExclusive";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const USE: &str = "use";
    pub const NAMESPACE: &str = "namespace";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
}

/// Parse one schema source into a Schema
///
/// Any fault (malformed XML, unsupported or ill-formed schema
/// constructs) is reported as a single `ValidationError`; the caller
/// appends it to the batch error collection and moves on.
pub(crate) fn parse_schema(
    bytes: &[u8],
    description: &str,
) -> std::result::Result<Schema, ValidationError> {
    let doc = Document::parse(bytes).map_err(|e| match e {
        Error::Xml(message) => ValidationError::new(message),
        other => ValidationError::new(format!("Failed to read schema source: {}", other)),
    })?;

    let root = doc.root().ok_or_else(|| {
        ValidationError::new(format!("The schema source '{}' is empty.", description))
    })?;

    if !is_xsd(root, xsd_elements::SCHEMA) {
        return Err(ValidationError::new(format!(
            "The root element of '{}' is not 'xs:schema'.",
            description
        )));
    }

    let target_namespace = root
        .get_attribute(xsd_attrs::TARGET_NAMESPACE)
        .map(|s| s.to_string());
    let element_form_qualified = root
        .get_attribute(xsd_attrs::ELEMENT_FORM_DEFAULT)
        .map(|v| v == "qualified")
        .unwrap_or(false);

    let mut schema = Schema {
        target_namespace: target_namespace.clone(),
        element_form_qualified,
        elements: Default::default(),
        types: Default::default(),
        imports: Vec::new(),
        source: description.to_string(),
    };

    for child in &root.children {
        if !is_in_xsd_namespace(child) {
            continue;
        }
        match child.local_name() {
            xsd_elements::ANNOTATION => {}
            xsd_elements::IMPORT => {
                if let Some(ns) = child.get_attribute(xsd_attrs::NAMESPACE) {
                    schema.imports.push(ns.to_string());
                }
            }
            xsd_elements::ELEMENT => {
                let decl = parse_global_element(child, &schema)?;
                schema.elements.insert(decl.name.clone(), decl);
            }
            xsd_elements::COMPLEX_TYPE => {
                let name = required_name(child, xsd_elements::COMPLEX_TYPE)?;
                let def = parse_complex_type(child, &schema)?;
                let qname = QName::new(target_namespace.clone(), name);
                schema.types.insert(qname, GlobalType::Complex(def));
            }
            xsd_elements::SIMPLE_TYPE => {
                let name = required_name(child, xsd_elements::SIMPLE_TYPE)?;
                let def = parse_simple_type(child)?;
                let qname = QName::new(target_namespace.clone(), name);
                schema.types.insert(qname, GlobalType::Simple(def));
            }
            other => {
                return Err(ValidationError::new(format!(
                    "The schema construct 'xs:{}' is not supported.",
                    other
                )));
            }
        }
    }

    Ok(schema)
}

fn is_in_xsd_namespace(elem: &Element) -> bool {
    elem.namespace() == Some(XSD_NAMESPACE)
}

fn is_xsd(elem: &Element, local_name: &str) -> bool {
    is_in_xsd_namespace(elem) && elem.local_name() == local_name
}

fn required_name(
    elem: &Element,
    construct: &str,
) -> std::result::Result<String, ValidationError> {
    elem.get_attribute(xsd_attrs::NAME)
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ValidationError::new(format!(
                "The 'xs:{}' declaration is missing the 'name' attribute.",
                construct
            ))
        })
}

/// Parse a global `xs:element` declaration
fn parse_global_element(
    elem: &Element,
    schema: &Schema,
) -> std::result::Result<ElementDecl, ValidationError> {
    let name = required_name(elem, xsd_elements::ELEMENT)?;
    let qname = QName::new(schema.target_namespace.clone(), name);
    let element_type = parse_element_type(elem, schema)?;
    Ok(ElementDecl {
        name: qname,
        element_type,
    })
}

/// Resolve the type of an element or particle: a `type` attribute, an
/// inline simpleType/complexType child, or anyType when absent
fn parse_element_type(
    elem: &Element,
    schema: &Schema,
) -> std::result::Result<ElementType, ValidationError> {
    if let Some(type_name) = elem.get_attribute(xsd_attrs::TYPE) {
        return Ok(ElementType::Ref(resolve_type_ref(type_name, elem)?));
    }

    for child in &elem.children {
        if is_xsd(child, xsd_elements::COMPLEX_TYPE) {
            let def = parse_complex_type(child, schema)?;
            return Ok(ElementType::Complex(Box::new(def)));
        }
        if is_xsd(child, xsd_elements::SIMPLE_TYPE) {
            let def = parse_simple_type(child)?;
            return Ok(ElementType::Simple(def));
        }
    }

    // No declared type at all: the element admits any content.
    Ok(ElementType::Ref(TypeRef::Builtin(BuiltinType::AnyType)))
}

/// Resolve a QName-valued type attribute against the prefixes in scope
fn resolve_type_ref(
    type_name: &str,
    elem: &Element,
) -> std::result::Result<TypeRef, ValidationError> {
    let qname = elem.namespaces.resolve(type_name).map_err(|_| {
        ValidationError::new(format!(
            "The type reference '{}' uses an undeclared namespace prefix.",
            type_name
        ))
    })?;

    if qname.namespace.as_deref() == Some(XSD_NAMESPACE) {
        return match BuiltinType::by_name(&qname.local_name) {
            Some(builtin) => Ok(TypeRef::Builtin(builtin)),
            None => Err(ValidationError::new(format!(
                "The built-in type 'xs:{}' is not supported.",
                qname.local_name
            ))),
        };
    }

    Ok(TypeRef::Named(qname))
}

/// Parse an `xs:complexType`: one optional sequence plus attributes
fn parse_complex_type(
    elem: &Element,
    schema: &Schema,
) -> std::result::Result<ComplexTypeDef, ValidationError> {
    let mut def = ComplexTypeDef::default();

    for child in &elem.children {
        if !is_in_xsd_namespace(child) {
            continue;
        }
        match child.local_name() {
            xsd_elements::ANNOTATION => {}
            xsd_elements::SEQUENCE => {
                for particle_elem in &child.children {
                    if is_xsd(particle_elem, xsd_elements::ELEMENT) {
                        def.particles.push(parse_particle(particle_elem, schema)?);
                    } else if is_xsd(particle_elem, xsd_elements::ANNOTATION) {
                        continue;
                    } else {
                        return Err(ValidationError::new(format!(
                            "The content particle 'xs:{}' is not supported.",
                            particle_elem.local_name()
                        )));
                    }
                }
            }
            xsd_elements::ATTRIBUTE => {
                def.attributes.push(parse_attribute(child)?);
            }
            other => {
                return Err(ValidationError::new(format!(
                    "The complex type construct 'xs:{}' is not supported.",
                    other
                )));
            }
        }
    }

    Ok(def)
}

/// Parse one `xs:element` particle inside a sequence
fn parse_particle(
    elem: &Element,
    schema: &Schema,
) -> std::result::Result<Particle, ValidationError> {
    let name = required_name(elem, xsd_elements::ELEMENT)?;

    // elementFormDefault decides whether local elements live in the
    // target namespace.
    let namespace = if schema.element_form_qualified {
        schema.target_namespace.clone()
    } else {
        None
    };

    let min_occurs = parse_occurs_attr(elem, xsd_attrs::MIN_OCCURS)?.unwrap_or(1);
    let max_occurs = match elem.get_attribute(xsd_attrs::MAX_OCCURS) {
        Some("unbounded") => None,
        Some(_) => Some(parse_occurs_attr(elem, xsd_attrs::MAX_OCCURS)?.unwrap_or(1)),
        None => Some(1),
    };

    Ok(Particle {
        name: QName::new(namespace, name),
        element_type: parse_element_type(elem, schema)?,
        min_occurs,
        max_occurs,
    })
}

fn parse_occurs_attr(
    elem: &Element,
    attr: &str,
) -> std::result::Result<Option<u32>, ValidationError> {
    match elem.get_attribute(attr) {
        None => Ok(None),
        Some(value) => value.parse::<u32>().map(Some).map_err(|_| {
            ValidationError::new(format!(
                "The '{}' value '{}' is not a valid occurrence bound.",
                attr, value
            ))
        }),
    }
}

/// Parse an `xs:attribute` declaration
fn parse_attribute(elem: &Element) -> std::result::Result<AttributeDecl, ValidationError> {
    let name = required_name(elem, xsd_elements::ATTRIBUTE)?;
    let attr_type = match elem.get_attribute(xsd_attrs::TYPE) {
        Some(type_name) => Some(resolve_type_ref(type_name, elem)?),
        None => None,
    };
    let required = elem.get_attribute(xsd_attrs::USE) == Some("required");
    Ok(AttributeDecl {
        name,
        attr_type,
        required,
    })
}

/// Parse an `xs:simpleType` restriction with its facets
fn parse_simple_type(elem: &Element) -> std::result::Result<SimpleTypeDef, ValidationError> {
    let restriction = elem
        .children
        .iter()
        .find(|c| is_xsd(c, xsd_elements::RESTRICTION))
        .ok_or_else(|| {
            ValidationError::new(
                "The 'xs:simpleType' declaration has no 'xs:restriction' child.".to_string(),
            )
        })?;

    let base_name = restriction.get_attribute(xsd_attrs::BASE).ok_or_else(|| {
        ValidationError::new(
            "The 'xs:restriction' declaration is missing the 'base' attribute.".to_string(),
        )
    })?;
    let base = resolve_type_ref(base_name, restriction)?;

    let mut facets = Facets::default();
    for facet in &restriction.children {
        if !is_in_xsd_namespace(facet) {
            continue;
        }
        let value = facet.get_attribute(xsd_attrs::VALUE).ok_or_else(|| {
            ValidationError::new(format!(
                "The facet 'xs:{}' is missing the 'value' attribute.",
                facet.local_name()
            ))
        })?;
        match facet.local_name() {
            xsd_elements::ENUMERATION => facets.enumeration.push(value.to_string()),
            xsd_elements::PATTERN => {
                facets.pattern = Some(PatternFacet::new(value).map_err(ValidationError::new)?);
            }
            xsd_elements::LENGTH => facets.length = Some(parse_length_facet(facet, value)?),
            xsd_elements::MIN_LENGTH => facets.min_length = Some(parse_length_facet(facet, value)?),
            xsd_elements::MAX_LENGTH => facets.max_length = Some(parse_length_facet(facet, value)?),
            xsd_elements::MIN_INCLUSIVE => {
                facets.min_inclusive = Some(parse_bound_facet(facet, value)?)
            }
            xsd_elements::MAX_INCLUSIVE => {
                facets.max_inclusive = Some(parse_bound_facet(facet, value)?)
            }
            xsd_elements::MIN_EXCLUSIVE => {
                facets.min_exclusive = Some(parse_bound_facet(facet, value)?)
            }
            xsd_elements::MAX_EXCLUSIVE => {
                facets.max_exclusive = Some(parse_bound_facet(facet, value)?)
            }
            xsd_elements::ANNOTATION => {}
            other => {
                return Err(ValidationError::new(format!(
                    "The facet 'xs:{}' is not supported.",
                    other
                )));
            }
        }
    }

    Ok(SimpleTypeDef { base, facets })
}

fn parse_length_facet(
    facet: &Element,
    value: &str,
) -> std::result::Result<usize, ValidationError> {
    value.parse::<usize>().map_err(|_| {
        ValidationError::new(format!(
            "The facet 'xs:{}' value '{}' is not a valid length.",
            facet.local_name(),
            value
        ))
    })
}

fn parse_bound_facet(
    facet: &Element,
    value: &str,
) -> std::result::Result<Decimal, ValidationError> {
    value.parse::<Decimal>().map_err(|_| {
        ValidationError::new(format!(
            "The facet 'xs:{}' value '{}' is not a valid numeric bound.",
            facet.local_name(),
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_SCHEMA: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                   xmlns:tns="urn:test"
                   targetNamespace="urn:test"
                   elementFormDefault="qualified">
          <xs:simpleType name="severityType">
            <xs:restriction base="xs:string">
              <xs:enumeration value="MAJOR"/>
              <xs:enumeration value="MINOR"/>
            </xs:restriction>
          </xs:simpleType>
          <xs:element name="item">
            <xs:complexType>
              <xs:sequence>
                <xs:element name="severity" type="tns:severityType"/>
                <xs:element name="count" type="xs:int" minOccurs="0" maxOccurs="unbounded"/>
              </xs:sequence>
              <xs:attribute name="id" type="xs:string" use="required"/>
            </xs:complexType>
          </xs:element>
        </xs:schema>"#;

    #[test]
    fn test_parse_schema() {
        let schema = parse_schema(SIMPLE_SCHEMA.as_bytes(), "inline schema").unwrap();

        assert_eq!(schema.target_namespace.as_deref(), Some("urn:test"));
        assert!(schema.element_form_qualified);
        assert_eq!(schema.elements.len(), 1);
        assert_eq!(schema.types.len(), 1);

        let item = schema
            .elements
            .get(&QName::namespaced("urn:test", "item"))
            .unwrap();
        let ElementType::Complex(ct) = &item.element_type else {
            panic!("expected inline complex type");
        };
        assert_eq!(ct.particles.len(), 2);
        assert_eq!(ct.particles[0].name, QName::namespaced("urn:test", "severity"));
        assert_eq!(ct.particles[1].min_occurs, 0);
        assert_eq!(ct.particles[1].max_occurs, None);
        assert_eq!(ct.attributes.len(), 1);
        assert!(ct.attributes[0].required);
    }

    #[test]
    fn test_parse_named_simple_type() {
        let schema = parse_schema(SIMPLE_SCHEMA.as_bytes(), "inline schema").unwrap();
        let qname = QName::namespaced("urn:test", "severityType");
        let GlobalType::Simple(st) = schema.types.get(&qname).unwrap() else {
            panic!("expected simple type");
        };
        assert_eq!(st.base, TypeRef::Builtin(BuiltinType::String));
        assert_eq!(st.facets.enumeration, vec!["MAJOR", "MINOR"]);
    }

    #[test]
    fn test_parse_malformed_xml() {
        let err = parse_schema(b"<schema><broken></schema>", "inline schema").unwrap_err();
        assert!(err.message().contains("Error parsing XML"));
    }

    #[test]
    fn test_parse_wrong_root() {
        let err = parse_schema(b"<not-a-schema/>", "inline schema").unwrap_err();
        assert!(err.message().contains("not 'xs:schema'"));
    }

    #[test]
    fn test_parse_missing_name() {
        let xml = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
              <xs:element type="xs:string"/>
            </xs:schema>"#;
        let err = parse_schema(xml.as_bytes(), "inline schema").unwrap_err();
        assert!(err.message().contains("missing the 'name' attribute"));
    }

    #[test]
    fn test_parse_import_record() {
        let xml = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:b">
              <xs:import namespace="urn:a"/>
            </xs:schema>"#;
        let schema = parse_schema(xml.as_bytes(), "inline schema").unwrap();
        assert_eq!(schema.imports, vec!["urn:a"]);
    }
}
