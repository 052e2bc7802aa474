//! Schema sets
//!
//! A [`SchemaSet`] aggregates the schemas loaded from a batch of
//! sources and compiles them into a resolvable whole. Loading never
//! stops at the first bad source: every source is parsed, every fault
//! is recorded, and the batch fails with the full collection.

use crate::error::{LoadError, ValidationError};
use crate::loaders::SchemaSource;
use crate::namespaces::QName;
use crate::schema::parsing::parse_schema;
use crate::schema::types::{
    AttributeDecl, ComplexTypeDef, ElementDecl, ElementType, GlobalType, Particle, SimpleTypeDef,
    TypeRef,
};
use indexmap::{IndexMap, IndexSet};

/// One parsed schema source
#[derive(Debug, Clone)]
pub struct Schema {
    /// Target namespace of the schema, if any
    pub target_namespace: Option<String>,
    /// Whether locally declared elements are namespace-qualified
    pub element_form_qualified: bool,
    /// Global element declarations, in declaration order
    pub elements: IndexMap<QName, ElementDecl>,
    /// Named global types, in declaration order
    pub types: IndexMap<QName, GlobalType>,
    /// Namespaces imported by this schema
    pub imports: Vec<String>,
    /// Human-readable description of the source
    pub source: String,
}

/// A compiled collection of schemas
///
/// Built by [`load_schema_set`] or [`try_load_schema_set`]. A set is
/// only usable for validation once compiled; the fallible loader hands
/// back the partially assembled, uncompiled set alongside its errors.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    schemas: Vec<Schema>,
    compiled: bool,
}

impl SchemaSet {
    /// Number of schemas in the set
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the set holds no schemas
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Whether the set has been successfully compiled
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// The schemas in the set, in load order
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// Look up a global element declaration across all schemas
    pub fn lookup_element(&self, name: &QName) -> Option<&ElementDecl> {
        self.schemas.iter().find_map(|s| s.elements.get(name))
    }

    /// Look up a named global type across all schemas
    pub fn lookup_type(&self, name: &QName) -> Option<&GlobalType> {
        self.schemas.iter().find_map(|s| s.types.get(name))
    }

    /// Check that every type reference in the set resolves and that no
    /// global name is declared twice, in declaration order
    fn compile(&mut self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let mut seen_elements: IndexMap<QName, ()> = IndexMap::new();
        let mut seen_types: IndexMap<QName, ()> = IndexMap::new();
        for schema in &self.schemas {
            for name in schema.elements.keys() {
                if seen_elements.insert(name.clone(), ()).is_some() {
                    errors.push(ValidationError::new(format!(
                        "The global element '{}' has already been declared.",
                        name.display_name()
                    )));
                }
            }
            for name in schema.types.keys() {
                if seen_types.insert(name.clone(), ()).is_some() {
                    errors.push(ValidationError::new(format!(
                        "The global type '{}' has already been declared.",
                        name.display_name()
                    )));
                }
            }
        }

        for schema in &self.schemas {
            for decl in schema.elements.values() {
                self.check_element_type(&decl.element_type, &mut errors);
            }
            for global in schema.types.values() {
                match global {
                    GlobalType::Simple(st) => self.check_type_ref(&st.base, &mut errors),
                    GlobalType::Complex(ct) => self.check_complex_type(ct, &mut errors),
                }
            }
        }

        // Restriction bases form chains of named simple types; a cycle
        // would make value checking recurse without bound.
        for schema in &self.schemas {
            for (name, global) in &schema.types {
                if let GlobalType::Simple(st) = global {
                    if self.restriction_base_cycles(name, st) {
                        errors.push(ValidationError::new(format!(
                            "Type '{}' has a circular restriction base.",
                            name.display_name()
                        )));
                    }
                }
            }
        }

        self.compiled = errors.is_empty();
        errors
    }

    /// Whether the restriction base chain starting at a named simple
    /// type returns to a type already on the chain
    fn restriction_base_cycles(&self, start: &QName, st: &SimpleTypeDef) -> bool {
        let mut seen: IndexSet<QName> = IndexSet::new();
        seen.insert(start.clone());
        let mut base = &st.base;
        loop {
            match base {
                TypeRef::Builtin(_) => return false,
                TypeRef::Named(name) => {
                    if !seen.insert(name.clone()) {
                        return true;
                    }
                    match self.lookup_type(name) {
                        Some(GlobalType::Simple(next)) => base = &next.base,
                        _ => return false,
                    }
                }
            }
        }
    }

    fn check_complex_type(&self, ct: &ComplexTypeDef, errors: &mut Vec<ValidationError>) {
        for Particle { element_type, .. } in &ct.particles {
            self.check_element_type(element_type, errors);
        }
        for AttributeDecl { attr_type, .. } in &ct.attributes {
            if let Some(type_ref) = attr_type {
                self.check_type_ref(type_ref, errors);
            }
        }
    }

    fn check_element_type(&self, element_type: &ElementType, errors: &mut Vec<ValidationError>) {
        match element_type {
            ElementType::Ref(type_ref) => self.check_type_ref(type_ref, errors),
            ElementType::Simple(st) => self.check_type_ref(&st.base, errors),
            ElementType::Complex(ct) => self.check_complex_type(ct, errors),
        }
    }

    fn check_type_ref(&self, type_ref: &TypeRef, errors: &mut Vec<ValidationError>) {
        if let TypeRef::Named(name) = type_ref {
            if self.lookup_type(name).is_none() {
                errors.push(ValidationError::new(format!(
                    "Type '{}' is not declared.",
                    name.display_name()
                )));
            }
        }
    }
}

/// Load and compile a schema set from a batch of sources
///
/// Every source is parsed even when earlier ones fail; all loading and
/// compilation faults come back together in one [`LoadError`]. An
/// empty batch yields an empty, compiled set.
pub fn load_schema_set(sources: &[SchemaSource]) -> Result<SchemaSet, LoadError> {
    let (set, errors) = load_into(sources);
    if errors.is_empty() {
        Ok(set)
    } else {
        Err(LoadError::new(errors))
    }
}

/// Fallible variant of [`load_schema_set`]
///
/// Never panics or returns `Err`: the flag reports success, and on
/// failure the partially assembled, uncompiled set is still handed
/// back alongside the aggregated error.
pub fn try_load_schema_set(sources: &[SchemaSource]) -> (bool, SchemaSet, Option<LoadError>) {
    let (set, errors) = load_into(sources);
    if errors.is_empty() {
        (true, set, None)
    } else {
        (false, set, Some(LoadError::new(errors)))
    }
}

/// Shared load routine: parse every source, then compile only when the
/// batch parsed cleanly
fn load_into(sources: &[SchemaSource]) -> (SchemaSet, Vec<ValidationError>) {
    let mut set = SchemaSet::default();
    let mut errors = Vec::new();

    for source in sources {
        let bytes = match source.read() {
            Ok(bytes) => bytes,
            Err(e) => {
                errors.push(ValidationError::new(format!(
                    "Failed to read schema source '{}': {}",
                    source.description(),
                    e
                )));
                continue;
            }
        };
        match parse_schema(&bytes, &source.description()) {
            Ok(schema) => set.schemas.push(schema),
            Err(e) => errors.push(e),
        }
    }

    // Compilation over a partial set would report spurious unresolved
    // references, so it only runs on a cleanly parsed batch.
    if errors.is_empty() {
        errors.extend(set.compile());
    }

    (set, errors)
}
