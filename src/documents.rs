//! XML document handling
//!
//! This module provides the canonical document tree used by validation
//! and structural comparison: elements with resolved qualified names,
//! attributes, ordered children and text content.

use crate::error::{Error, Result};
use crate::namespaces::{NamespaceContext, QName};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

/// XML Element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name, with the namespace resolved from the
    /// prefix declarations in scope
    pub qname: QName,
    /// Element attributes, in document order
    pub attributes: IndexMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace context in effect at this element
    pub namespaces: NamespaceContext,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an attribute value by local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute_qname(&self, qname: &QName) -> Option<&str> {
        self.attributes.get(qname).map(|s| s.as_str())
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Set text content, replacing any existing text
    pub fn set_text(&mut self, text: String) {
        self.text = Some(text);
    }

    /// Append text content, concatenating split text events
    pub fn append_text(&mut self, text: &str) {
        match self.text {
            Some(ref mut existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }
}

/// XML Document representation
#[derive(Debug, Clone)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse an XML document from bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut doc = Document::new();
        let mut element_stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let parent_ctx = element_stack
                        .last()
                        .map(|p| p.namespaces.clone())
                        .unwrap_or_default();
                    let element = parse_element(&e, parent_ctx)?;
                    element_stack.push(element);
                }
                Ok(Event::End(_)) => {
                    if let Some(current) = element_stack.pop() {
                        if let Some(parent) = element_stack.last_mut() {
                            parent.add_child(current);
                        } else {
                            doc.root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let parent_ctx = element_stack
                        .last()
                        .map(|p| p.namespaces.clone())
                        .unwrap_or_default();
                    let element = parse_element(&e, parent_ctx)?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.add_child(element);
                    } else {
                        doc.root = Some(element);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        if !text.trim().is_empty() {
                            current.append_text(&text);
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = String::from_utf8_lossy(&e).into_owned();
                        current.append_text(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Ignore comments, processing instructions, declarations
            }
            buf.clear();
        }

        if !element_stack.is_empty() {
            return Err(Error::Xml(format!(
                "Unexpected end of document inside element '{}'",
                element_stack.last().map(|e| e.local_name()).unwrap_or("")
            )));
        }

        Ok(doc)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Get the root element mutably
    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.root.as_mut()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an Element from a start tag, resolving namespaces against the
/// inherited context plus any xmlns declarations on the tag itself
fn parse_element(start: &BytesStart, mut ctx: NamespaceContext) -> Result<Element> {
    let name_bytes = start.name();
    let name = std::str::from_utf8(name_bytes.as_ref())
        .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
        .to_string();

    // First pass: namespace declarations must be applied before any name
    // on this tag is resolved.
    let mut plain_attrs: Vec<(String, String)> = Vec::new();
    for attr_result in start.attributes() {
        let attr =
            attr_result.map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

        let attr_name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
            .to_string();

        let attr_value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
            .into_owned();

        if attr_name == "xmlns" {
            ctx.set_default_namespace(attr_value);
        } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
            ctx.add_prefix(prefix, attr_value);
        } else {
            plain_attrs.push((attr_name, attr_value));
        }
    }

    let qname = ctx.resolve(&name)?;
    let mut element = Element::new(qname);

    for (attr_name, attr_value) in plain_attrs {
        let attr_qname = ctx.resolve_attribute(&attr_name)?;
        element.attributes.insert(attr_qname, attr_value);
    }

    element.namespaces = ctx;
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let doc = Document::new();
        assert!(doc.root.is_none());
    }

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        assert!(doc.root.is_some());
        let root = doc.root.unwrap();
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name(), "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="value2"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.get_attribute("attr1"), Some("value1"));
        assert_eq!(root.get_attribute("attr2"), Some("value2"));
    }

    #[test]
    fn test_parse_resolves_default_namespace() {
        let xml = r#"<root xmlns="http://example.com"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.namespace(), Some("http://example.com"));
        // Children inherit the default namespace.
        assert_eq!(root.children[0].namespace(), Some("http://example.com"));
    }

    #[test]
    fn test_parse_resolves_prefixes() {
        let xml = r#"<p:root xmlns:p="urn:a"><p:child q="1"/></p:root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.qname, QName::namespaced("urn:a", "root"));
        let child = &root.children[0];
        assert_eq!(child.qname, QName::namespaced("urn:a", "child"));
        // Unprefixed attributes carry no namespace.
        assert_eq!(child.get_attribute_qname(&QName::local("q")), Some("1"));
    }

    #[test]
    fn test_parse_malformed() {
        let xml = r#"<root><child></root>"#;
        assert!(Document::from_string(xml).is_err());
    }

    #[test]
    fn test_parse_truncated() {
        let xml = r#"<root><child>"#;
        assert!(Document::from_string(xml).is_err());
    }

    #[test]
    fn test_find_children() {
        let xml = r#"<root><child1/><child2/><child1/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        let children = root.find_children("child1");
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_text_accumulation() {
        let mut elem = Element::new(QName::local("test"));
        elem.append_text("one");
        elem.append_text(" two");
        assert_eq!(elem.text.as_deref(), Some("one two"));
    }
}
