//! Error types for xmlkit
//!
//! This module defines all error types used throughout the library.
//! Failures that aggregate several underlying causes (schema-set loading,
//! document validation) carry the full ordered cause list; callers never
//! need to parse message strings to learn the count or nature of errors.

use std::fmt;
use thiserror::Error;

/// Result type alias using the xmlkit Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xmlkit operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required document or object argument was absent
    #[error("missing input: {0}")]
    MissingInput(String),

    /// One or more schema sources failed to parse, or the set failed to compile
    #[error(transparent)]
    Load(#[from] LoadError),

    /// One or more document-vs-schema violations
    #[error(transparent)]
    Validation(#[from] XmlValidationError),

    /// Unexpected fault during document conversion or structural comparison
    #[error("comparison failed: {source}")]
    Compare {
        /// The originating fault
        #[source]
        source: Box<Error>,
    },

    /// Marshal/unmarshal fault from the serde collaborator
    #[error("marshal error: {0}")]
    Marshal(String),

    /// Low-level XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a fault raised while comparing two documents
    pub fn compare(source: Error) -> Self {
        Self::Compare {
            source: Box::new(source),
        }
    }
}

/// A single structured validation error
///
/// Records one violation discovered while parsing a schema, compiling a
/// schema set or validating a document. Ordering is significant: errors
/// are reported in the order they were raised, never sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error message
    message: String,
    /// Position in the source (line, column), when known
    position: Option<(usize, usize)>,
    /// Text of the underlying error, when one exists
    source: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            source: None,
        }
    }

    /// Set the position where the error was raised
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.position = Some((line, column));
        self
    }

    /// Set the underlying error text
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the position (line, column), when known
    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }

    /// Get the underlying error text, when one exists
    pub fn source_text(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some((line, column)) = self.position {
            write!(f, " (line {}, column {})", line, column)?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Aggregate error raised when a schema set fails to load or compile
///
/// Carries the full ordered list of underlying causes: parse errors in
/// input order followed by compile errors in discovery order.
#[derive(Debug, Clone)]
pub struct LoadError {
    errors: Vec<ValidationError>,
}

impl LoadError {
    /// Create a load error from the collected causes
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// The ordered list of underlying causes
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Number of underlying causes
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the cause list is empty
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the error and return the cause list
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Errors ({} errors) were encountered while loading a XML schema set.",
            self.errors.len()
        )
    }
}

impl std::error::Error for LoadError {}

/// Aggregate error raised when a document fails validation
///
/// Carries every violation found in one full document traversal, in
/// traversal order, never just the first.
#[derive(Debug, Clone)]
pub struct XmlValidationError {
    errors: Vec<ValidationError>,
}

impl XmlValidationError {
    /// Create a validation error from the collected violations
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// The ordered list of violations
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Number of violations
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the violation list is empty
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the error and return the violation list
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for XmlValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Errors ({} errors) were encountered while validating a XML document.",
            self.errors.len()
        )
    }
}

impl std::error::Error for XmlValidationError {}
