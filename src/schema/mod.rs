//! Schema model
//!
//! The schema side of the crate: built-in XSD datatypes, the parsed
//! type model, the source parser and the compiled [`SchemaSet`].

pub mod builtins;
mod parsing;
pub mod set;
pub mod types;

pub use builtins::BuiltinType;
pub use set::{load_schema_set, try_load_schema_set, Schema, SchemaSet};
pub use types::{
    AttributeDecl, ComplexTypeDef, ElementDecl, ElementType, Facets, GlobalType, Particle,
    SimpleTypeDef, TypeRef,
};
