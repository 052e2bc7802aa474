//! Document validation
//!
//! Validates a [`Document`] against a compiled [`SchemaSet`]. The walk
//! never stops at the first problem: every element is checked and every
//! fault is collected into one [`XmlValidationError`], in traversal
//! order. Each call starts from a fresh collection, so validating the
//! same document twice reports the same errors twice.

use crate::documents::{Document, Element};
use crate::error::{ValidationError, XmlValidationError};
use crate::namespaces::QName;
use crate::schema::builtins::BuiltinType;
use crate::schema::set::SchemaSet;
use crate::schema::types::{
    AttributeDecl, ComplexTypeDef, ElementType, GlobalType, SimpleTypeDef, TypeRef,
};
use crate::XSI_NAMESPACE;

/// Severity of a reported validation event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Advisory only, never fails a document
    Warning,
    /// Validation failure
    Error,
}

/// Collects validation events for one pass, keeping only errors
#[derive(Debug, Default)]
struct ErrorSink {
    errors: Vec<ValidationError>,
}

impl ErrorSink {
    fn report(&mut self, severity: Severity, error: ValidationError) {
        if severity == Severity::Error {
            self.errors.push(error);
        }
    }

    fn error(&mut self, message: String) {
        self.report(Severity::Error, ValidationError::new(message));
    }
}

/// A type reference resolved against the set
enum ResolvedType<'a> {
    Builtin(BuiltinType),
    Simple(&'a SimpleTypeDef),
    Complex(&'a ComplexTypeDef),
}

impl SchemaSet {
    /// Validate a document, failing with every error found
    pub fn validate(&self, document: &Document) -> Result<(), XmlValidationError> {
        let errors = self.run_validation(document);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(XmlValidationError::new(errors))
        }
    }

    /// Fallible variant of [`validate`](Self::validate)
    ///
    /// Never panics or returns `Err`: the flag reports validity and the
    /// aggregated error, when present, carries the full collection.
    pub fn try_validate(&self, document: &Document) -> (bool, Option<XmlValidationError>) {
        let errors = self.run_validation(document);
        if errors.is_empty() {
            (true, None)
        } else {
            (false, Some(XmlValidationError::new(errors)))
        }
    }

    /// Whether a document validates, discarding the error detail
    pub fn is_valid(&self, document: &Document) -> bool {
        self.run_validation(document).is_empty()
    }

    /// One full validation pass over the document
    fn run_validation(&self, document: &Document) -> Vec<ValidationError> {
        let mut sink = ErrorSink::default();

        if !self.is_compiled() {
            sink.error("The schema set has not been compiled.".to_string());
            return sink.errors;
        }

        let root = match document.root.as_ref() {
            Some(root) => root,
            None => {
                sink.error("The document has no root element.".to_string());
                return sink.errors;
            }
        };

        match self.lookup_element(&root.qname) {
            Some(decl) => self.validate_element(root, &decl.element_type, &mut sink),
            None => sink.error(format!(
                "The '{}' element is not declared.",
                root.qname.display_name()
            )),
        }

        sink.errors
    }

    /// Resolve an element or attribute type down to its definition
    fn resolve_type<'a>(&'a self, element_type: &'a ElementType) -> Option<ResolvedType<'a>> {
        match element_type {
            ElementType::Ref(type_ref) => self.resolve_type_ref(type_ref),
            ElementType::Simple(st) => Some(ResolvedType::Simple(st)),
            ElementType::Complex(ct) => Some(ResolvedType::Complex(ct)),
        }
    }

    fn resolve_type_ref<'a>(&'a self, type_ref: &'a TypeRef) -> Option<ResolvedType<'a>> {
        match type_ref {
            TypeRef::Builtin(builtin) => Some(ResolvedType::Builtin(*builtin)),
            TypeRef::Named(name) => match self.lookup_type(name)? {
                GlobalType::Simple(st) => Some(ResolvedType::Simple(st)),
                GlobalType::Complex(ct) => Some(ResolvedType::Complex(ct)),
            },
        }
    }

    fn validate_element(&self, elem: &Element, element_type: &ElementType, sink: &mut ErrorSink) {
        let resolved = match self.resolve_type(element_type) {
            Some(resolved) => resolved,
            None => {
                // A compiled set resolves everything; this only fires
                // when validating against a hand-built set.
                if let ElementType::Ref(type_ref) = element_type {
                    sink.error(format!(
                        "Type '{}' is not declared.",
                        type_ref.qualified_name()
                    ));
                }
                return;
            }
        };

        match resolved {
            // The ur-type places no constraint on content or attributes.
            ResolvedType::Builtin(BuiltinType::AnyType) => {}
            ResolvedType::Builtin(builtin) => {
                self.validate_attributes(elem, &[], sink);
                self.check_no_children(elem, sink);
                let value = element_text(elem);
                if let Err(reason) = builtin.check(&value) {
                    sink.error(datatype_message(
                        &elem.qname,
                        &value,
                        &builtin.qualified_name(),
                        &reason,
                    ));
                }
            }
            ResolvedType::Simple(st) => {
                self.validate_attributes(elem, &[], sink);
                self.check_no_children(elem, sink);
                let value = element_text(elem);
                if let Err(reason) = self.check_simple_value(&value, st) {
                    sink.error(datatype_message(
                        &elem.qname,
                        &value,
                        &st.base.qualified_name(),
                        &reason,
                    ));
                }
            }
            ResolvedType::Complex(ct) => {
                self.validate_attributes(elem, &ct.attributes, sink);
                self.validate_sequence(elem, ct, sink);
            }
        }
    }

    /// Simple-content elements must not have element children
    fn check_no_children(&self, elem: &Element, sink: &mut ErrorSink) {
        if !elem.children.is_empty() {
            sink.error(format!(
                "The '{}' element cannot contain child elements because its content is simple.",
                elem.qname.display_name()
            ));
        }
    }

    /// Check a value against a simple type: base first, then facets
    fn check_simple_value(
        &self,
        value: &str,
        st: &SimpleTypeDef,
    ) -> std::result::Result<(), String> {
        match self.resolve_type_ref(&st.base) {
            Some(ResolvedType::Builtin(builtin)) => builtin.check(value)?,
            Some(ResolvedType::Simple(base)) => self.check_simple_value(value, base)?,
            Some(ResolvedType::Complex(_)) => {
                return Err(format!(
                    "The restriction base '{}' is not a simple type.",
                    st.base.qualified_name()
                ));
            }
            None => {
                return Err(format!(
                    "Type '{}' is not declared.",
                    st.base.qualified_name()
                ));
            }
        }
        st.facets.check(value)
    }

    fn validate_attributes(&self, elem: &Element, decls: &[AttributeDecl], sink: &mut ErrorSink) {
        for (qname, value) in &elem.attributes {
            // Instance-control attributes are advisory only.
            let severity = if qname.namespace.as_deref() == Some(XSI_NAMESPACE) {
                Severity::Warning
            } else {
                Severity::Error
            };

            let decl = decls
                .iter()
                .find(|a| qname.namespace.is_none() && a.name == qname.local_name);
            let decl = match decl {
                Some(decl) => decl,
                None => {
                    sink.report(
                        severity,
                        ValidationError::new(format!(
                            "The '{}' attribute is not declared.",
                            qname.display_name()
                        )),
                    );
                    continue;
                }
            };

            if let Some(ref type_ref) = decl.attr_type {
                if let Err(reason) = self.check_attribute_value(value, type_ref) {
                    sink.error(format!(
                        "The '{}' attribute is invalid - The value '{}' is invalid according to its datatype '{}' - {}",
                        decl.name,
                        value,
                        type_ref.qualified_name(),
                        reason
                    ));
                }
            }
        }

        // Declared attributes live in no namespace; a foreign-namespaced
        // attribute with the same local name does not satisfy them.
        for decl in decls {
            let expected = QName::local(decl.name.clone());
            if decl.required && elem.get_attribute_qname(&expected).is_none() {
                sink.error(format!(
                    "The required attribute '{}' is missing on element '{}'.",
                    decl.name,
                    elem.qname.display_name()
                ));
            }
        }
    }

    fn check_attribute_value(
        &self,
        value: &str,
        type_ref: &TypeRef,
    ) -> std::result::Result<(), String> {
        match self.resolve_type_ref(type_ref) {
            Some(ResolvedType::Builtin(builtin)) => builtin.check(value),
            Some(ResolvedType::Simple(st)) => self.check_simple_value(value, st),
            Some(ResolvedType::Complex(_)) => Err(format!(
                "The attribute type '{}' is not a simple type.",
                type_ref.qualified_name()
            )),
            None => Err(format!(
                "Type '{}' is not declared.",
                type_ref.qualified_name()
            )),
        }
    }

    /// Match the element's children against the sequence content model
    ///
    /// A cursor walks the particles; a child that matches none of the
    /// remaining admissible particles is reported and skipped, so later
    /// children still get checked.
    fn validate_sequence(&self, elem: &Element, ct: &ComplexTypeDef, sink: &mut ErrorSink) {
        let mut index = 0usize;
        let mut occurs = 0u32;

        'children: for child in &elem.children {
            loop {
                let particle = match ct.particles.get(index) {
                    Some(particle) => particle,
                    None => {
                        sink.error(unexpected_child_message(elem, child, &ct.particles[index..]));
                        continue 'children;
                    }
                };

                if particle.name == child.qname {
                    if particle.allows(occurs) {
                        occurs += 1;
                        self.validate_element(child, &particle.element_type, sink);
                        continue 'children;
                    }
                    // Occurrence budget spent; try the next particle.
                    index += 1;
                    occurs = 0;
                    continue;
                }

                if occurs >= particle.min_occurs {
                    index += 1;
                    occurs = 0;
                    continue;
                }

                sink.error(unexpected_child_message(elem, child, &ct.particles[index..]));
                continue 'children;
            }
        }

        // Trailing particles with unmet minimums.
        for (offset, particle) in ct.particles[index..].iter().enumerate() {
            let seen = if offset == 0 { occurs } else { 0 };
            if seen < particle.min_occurs {
                sink.error(format!(
                    "The element '{}' in namespace '{}' has incomplete content. List of possible elements expected: '{}'.",
                    elem.local_name(),
                    elem.namespace().unwrap_or(""),
                    particle.name.local_name
                ));
                break;
            }
        }
    }
}

fn element_text(elem: &Element) -> String {
    elem.text.as_deref().unwrap_or("").trim().to_string()
}

fn datatype_message(elem: &QName, value: &str, type_name: &str, reason: &str) -> String {
    format!(
        "The '{}' element is invalid - The value '{}' is invalid according to its datatype '{}' - {}",
        elem.display_name(),
        value,
        type_name,
        reason
    )
}

fn unexpected_child_message(
    parent: &Element,
    child: &Element,
    remaining: &[crate::schema::types::Particle],
) -> String {
    let expected: Vec<String> = remaining
        .iter()
        .map(|p| format!("'{}'", p.name.local_name))
        .collect();
    let mut message = format!(
        "The element '{}' in namespace '{}' has invalid child element '{}' in namespace '{}'.",
        parent.local_name(),
        parent.namespace().unwrap_or(""),
        child.local_name(),
        child.namespace().unwrap_or("")
    );
    if !expected.is_empty() {
        message.push_str(&format!(
            " List of possible elements expected: {}.",
            expected.join(", ")
        ));
    }
    message
}
