//! Schema source loading
//!
//! This module abstracts over where schema documents come from: in-memory
//! text or bytes, files, or arbitrary readers. Sources are read once,
//! inside the load call that consumes them.

use crate::error::{Error, Result};
use std::fs;
use std::io::Read;
use std::path::PathBuf;

/// One XSD schema source
///
/// Callers hand a sequence of these to [`crate::schema::load_schema_set`];
/// the loader does not care whether the bytes originate from files,
/// network buffers or literals.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Inline schema text
    Text(String),
    /// Raw schema bytes
    Bytes(Vec<u8>),
    /// Path to a schema file
    File(PathBuf),
}

impl SchemaSource {
    /// Create a source from a file path
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Create a source by draining a reader
    ///
    /// The stream is consumed eagerly; the returned source owns its bytes.
    pub fn from_reader(mut reader: impl Read) -> std::io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::Bytes(bytes))
    }

    /// Short description of the source, used in diagnostics
    pub fn description(&self) -> String {
        match self {
            Self::Text(_) => "inline schema".to_string(),
            Self::Bytes(_) => "schema bytes".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Read the source into schema bytes
    pub(crate) fn read(&self) -> Result<Vec<u8>> {
        match self {
            Self::Text(text) => Ok(text.as_bytes().to_vec()),
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::File(path) => fs::read(path).map_err(|e| {
                Error::Xml(format!("Failed to read file '{}': {}", path.display(), e))
            }),
        }
    }
}

impl From<&str> for SchemaSource {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for SchemaSource {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for SchemaSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<PathBuf> for SchemaSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}
