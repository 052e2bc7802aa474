//! Serialization helpers
//!
//! Marshals serde-enabled values to and from XML text and provides a
//! serialization-based deep clone. Faults surface as marshalling
//! errors; absent input is rejected before any parsing starts.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Output options for [`to_xml_with_config`]
///
/// Controls the declared encoding and whether the body is indented.
#[derive(Debug, Clone)]
pub struct MarshalConfig {
    encoding: String,
    indent: bool,
}

impl MarshalConfig {
    /// Default configuration: UTF-8, compact output
    pub fn new() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            indent: false,
        }
    }

    /// Set the encoding named in the XML declaration
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Enable or disable indented output
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a value to compact XML
pub fn to_xml<T: Serialize>(value: &T) -> Result<String> {
    quick_xml::se::to_string(value).map_err(|e| Error::Marshal(e.to_string()))
}

/// Serialize a value to XML with an XML declaration
///
/// Emits `<?xml version="1.0" encoding="..."?>` ahead of the body,
/// indented or compact per the configuration.
pub fn to_xml_with_config<T: Serialize>(value: &T, config: &MarshalConfig) -> Result<String> {
    let body = if config.indent {
        to_xml_indented(value)?
    } else {
        to_xml(value)?
    };
    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"{}\"?>\n{}",
        config.encoding, body
    ))
}

/// Serialize a value to indented XML (two spaces per level)
pub fn to_xml_indented<T: Serialize>(value: &T) -> Result<String> {
    let mut buffer = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
    serializer.indent(' ', 2);
    value
        .serialize(serializer)
        .map_err(|e| Error::Marshal(e.to_string()))?;
    Ok(buffer)
}

/// Deserialize a value from XML text
pub fn from_xml<T: DeserializeOwned>(xml: &str) -> Result<T> {
    if xml.trim().is_empty() {
        return Err(Error::MissingInput("XML input is empty".to_string()));
    }
    quick_xml::de::from_str(xml).map_err(|e| Error::Marshal(e.to_string()))
}

/// Deserialize a value from raw XML bytes
pub fn from_xml_bytes<T: DeserializeOwned>(xml: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(xml)
        .map_err(|e| Error::Marshal(format!("input is not valid UTF-8: {}", e)))?;
    from_xml(text)
}

/// Deep-clone a value through a serialization round trip
///
/// Detaches the clone from anything the original shares, which a
/// derived `Clone` cannot promise for reference-counted fields.
pub fn deep_clone<T: Serialize + DeserializeOwned>(value: &T) -> Result<T> {
    let json = serde_json::to_value(value).map_err(|e| Error::Marshal(e.to_string()))?;
    serde_json::from_value(json).map_err(|e| Error::Marshal(e.to_string()))
}
