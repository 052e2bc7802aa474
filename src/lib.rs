//! # xmlkit
//!
//! XML utilities built around three concerns:
//!
//! - **Schema loading**: assemble and compile an XSD schema set from a
//!   batch of sources, collecting every fault instead of failing fast.
//! - **Validation**: check documents against a compiled set, again
//!   aggregating every error found in one pass.
//! - **Comparison**: structural equality over document trees, with
//!   selective neutralization of volatile nodes.
//!
//! Serialization helpers round the crate out: marshalling serde values
//! to and from XML, and a serialization-based deep clone.
//!
//! ## Example
//!
//! ```rust,no_run
//! use xmlkit::{load_schema_set, Document, SchemaSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sources = [SchemaSource::from_file("report.xsd")];
//! let set = load_schema_set(&sources)?;
//!
//! let doc = Document::from_file("report.xml")?;
//! set.validate(&doc)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compare;
pub mod documents;
pub mod error;
pub mod loaders;
pub mod marshal;
pub mod namespaces;
pub mod schema;
pub mod validation;

pub use compare::{compare, compare_str, EscapeSpec};
pub use documents::{Document, Element};
pub use error::{Error, LoadError, Result, ValidationError, XmlValidationError};
pub use loaders::SchemaSource;
pub use marshal::{
    deep_clone, from_xml, from_xml_bytes, to_xml, to_xml_indented, to_xml_with_config,
    MarshalConfig,
};
pub use namespaces::{NamespaceContext, QName};
pub use schema::{load_schema_set, try_load_schema_set, Schema, SchemaSet};
pub use validation::Severity;

/// Version of the xmlkit library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
