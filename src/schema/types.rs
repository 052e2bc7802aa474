//! Schema type model
//!
//! Simple-type restrictions with their facets, complex-type content
//! models (sequence particles plus attribute declarations), and the
//! element declarations that tie them together.

use crate::namespaces::QName;
use crate::schema::builtins::BuiltinType;
use regex::Regex;
use rust_decimal::Decimal;

/// Reference to a type: either a built-in or a named type in the set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Built-in XSD type
    Builtin(BuiltinType),
    /// Named type declared by some schema in the set
    Named(QName),
}

impl TypeRef {
    /// Qualified display name, as used in diagnostics
    pub fn qualified_name(&self) -> String {
        match self {
            Self::Builtin(b) => b.qualified_name(),
            Self::Named(qname) => qname.display_name(),
        }
    }
}

/// Pattern facet backed by a compiled regular expression
#[derive(Debug, Clone)]
pub struct PatternFacet {
    /// Source pattern text
    pub pattern: String,
    regex: Regex,
}

impl PatternFacet {
    /// Compile a pattern facet; XSD patterns anchor implicitly
    pub fn new(pattern: &str) -> std::result::Result<Self, String> {
        let anchored = format!("^(?:{})$", pattern);
        let regex = Regex::new(&anchored)
            .map_err(|e| format!("Invalid pattern '{}': {}", pattern, e))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Whether a value matches the pattern
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Restriction facets of a simple type
#[derive(Debug, Clone, Default)]
pub struct Facets {
    /// Allowed values (empty means unrestricted)
    pub enumeration: Vec<String>,
    /// Pattern restriction
    pub pattern: Option<PatternFacet>,
    /// Exact length
    pub length: Option<usize>,
    /// Minimum length
    pub min_length: Option<usize>,
    /// Maximum length
    pub max_length: Option<usize>,
    /// Inclusive lower bound
    pub min_inclusive: Option<Decimal>,
    /// Inclusive upper bound
    pub max_inclusive: Option<Decimal>,
    /// Exclusive lower bound
    pub min_exclusive: Option<Decimal>,
    /// Exclusive upper bound
    pub max_exclusive: Option<Decimal>,
}

impl Facets {
    /// Check a value against every facet, returning the first failure reason
    pub fn check(&self, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();

        if !self.enumeration.is_empty() && !self.enumeration.iter().any(|v| v == value) {
            return Err(format!(
                "The value '{}' is not one of the enumerated values {:?}.",
                value, self.enumeration
            ));
        }

        if let Some(ref pattern) = self.pattern {
            if !pattern.matches(value) {
                return Err(format!(
                    "The value '{}' does not match the pattern '{}'.",
                    value, pattern.pattern
                ));
            }
        }

        let len = value.chars().count();
        if let Some(expected) = self.length {
            if len != expected {
                return Err(format!(
                    "The value '{}' does not have the required length {}.",
                    value, expected
                ));
            }
        }
        if let Some(min) = self.min_length {
            if len < min {
                return Err(format!(
                    "The value '{}' is shorter than the minimum length {}.",
                    value, min
                ));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(format!(
                    "The value '{}' is longer than the maximum length {}.",
                    value, max
                ));
            }
        }

        if self.has_range_bounds() {
            let number = value.parse::<Decimal>().map_err(|_| {
                format!("The value '{}' is not numeric and cannot satisfy range facets.", value)
            })?;
            if let Some(min) = self.min_inclusive {
                if number < min {
                    return Err(format!("The value '{}' is less than the minimum {}.", value, min));
                }
            }
            if let Some(max) = self.max_inclusive {
                if number > max {
                    return Err(format!("The value '{}' is greater than the maximum {}.", value, max));
                }
            }
            if let Some(min) = self.min_exclusive {
                if number <= min {
                    return Err(format!(
                        "The value '{}' must be greater than the exclusive minimum {}.",
                        value, min
                    ));
                }
            }
            if let Some(max) = self.max_exclusive {
                if number >= max {
                    return Err(format!(
                        "The value '{}' must be less than the exclusive maximum {}.",
                        value, max
                    ));
                }
            }
        }

        Ok(())
    }

    fn has_range_bounds(&self) -> bool {
        self.min_inclusive.is_some()
            || self.max_inclusive.is_some()
            || self.min_exclusive.is_some()
            || self.max_exclusive.is_some()
    }
}

/// A simple type restriction
#[derive(Debug, Clone)]
pub struct SimpleTypeDef {
    /// Base type being restricted
    pub base: TypeRef,
    /// Restriction facets
    pub facets: Facets,
}

/// The type of an element declaration or sequence particle
#[derive(Debug, Clone)]
pub enum ElementType {
    /// Reference to a built-in or named type
    Ref(TypeRef),
    /// Inline (anonymous) simple type
    Simple(SimpleTypeDef),
    /// Inline (anonymous) complex type
    Complex(Box<ComplexTypeDef>),
}

/// An attribute declaration on a complex type
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    /// Attribute local name
    pub name: String,
    /// Value type (None means any simple content)
    pub attr_type: Option<TypeRef>,
    /// Whether use="required"
    pub required: bool,
}

/// One element particle inside a sequence content model
#[derive(Debug, Clone)]
pub struct Particle {
    /// Child element qualified name
    pub name: QName,
    /// Child element type
    pub element_type: ElementType,
    /// Minimum occurrences
    pub min_occurs: u32,
    /// Maximum occurrences (None means unbounded)
    pub max_occurs: Option<u32>,
}

impl Particle {
    /// Whether one more occurrence is still allowed
    pub fn allows(&self, occurs: u32) -> bool {
        match self.max_occurs {
            Some(max) => occurs < max,
            None => true,
        }
    }
}

/// A complex type: sequence content model plus attributes
#[derive(Debug, Clone, Default)]
pub struct ComplexTypeDef {
    /// Ordered sequence particles
    pub particles: Vec<Particle>,
    /// Attribute declarations
    pub attributes: Vec<AttributeDecl>,
}

/// A global element declaration
#[derive(Debug, Clone)]
pub struct ElementDecl {
    /// Qualified element name
    pub name: QName,
    /// Declared type
    pub element_type: ElementType,
}

/// A named global type
#[derive(Debug, Clone)]
pub enum GlobalType {
    /// Named simple type
    Simple(SimpleTypeDef),
    /// Named complex type
    Complex(ComplexTypeDef),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_facet() {
        let facets = Facets {
            enumeration: vec!["MAJOR".to_string(), "MINOR".to_string()],
            ..Facets::default()
        };
        assert!(facets.check("MAJOR").is_ok());
        let reason = facets.check("TRIVIAL").unwrap_err();
        assert!(reason.contains("'TRIVIAL'"));
    }

    #[test]
    fn test_pattern_facet_is_anchored() {
        let facets = Facets {
            pattern: Some(PatternFacet::new(r"[A-Z]{2}\d+").unwrap()),
            ..Facets::default()
        };
        assert!(facets.check("AB123").is_ok());
        // A substring match is not enough.
        assert!(facets.check("xxAB123xx").is_err());
    }

    #[test]
    fn test_length_facets() {
        let facets = Facets {
            min_length: Some(2),
            max_length: Some(4),
            ..Facets::default()
        };
        assert!(facets.check("ab").is_ok());
        assert!(facets.check("a").is_err());
        assert!(facets.check("abcde").is_err());
    }

    #[test]
    fn test_range_facets() {
        let facets = Facets {
            min_inclusive: Some(Decimal::from(0)),
            max_inclusive: Some(Decimal::from(100)),
            ..Facets::default()
        };
        assert!(facets.check("0").is_ok());
        assert!(facets.check("100").is_ok());
        assert!(facets.check("101").is_err());
        assert!(facets.check("-1").is_err());
        assert!(facets.check("abc").is_err());
    }

    #[test]
    fn test_particle_allows() {
        let particle = Particle {
            name: QName::local("issue"),
            element_type: ElementType::Ref(TypeRef::Builtin(
                crate::schema::builtins::BuiltinType::String,
            )),
            min_occurs: 0,
            max_occurs: Some(2),
        };
        assert!(particle.allows(0));
        assert!(particle.allows(1));
        assert!(!particle.allows(2));

        let unbounded = Particle {
            max_occurs: None,
            ..particle
        };
        assert!(unbounded.allows(1000));
    }
}
