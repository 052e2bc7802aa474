//! Structural document comparison
//!
//! Compares two document trees for structural equality, optionally
//! neutralizing the text of designated nodes first so that volatile
//! content (timestamps, generated identifiers) does not break the
//! comparison. The inputs are never mutated: both trees are cloned
//! before neutralization.

use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};

/// Nodes whose text content is neutralized before comparison
///
/// Keyed by namespace; the empty string stands for "no namespace".
/// A node matches when its namespace and local name both match an
/// entry.
#[derive(Debug, Clone, Default)]
pub struct EscapeSpec {
    nodes: IndexMap<String, IndexSet<String>>,
}

impl EscapeSpec {
    /// Create an empty escape spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to neutralize, builder style
    pub fn ignore(mut self, namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        self.nodes
            .entry(namespace.into())
            .or_default()
            .insert(local_name.into());
        self
    }

    /// Whether the spec designates no nodes at all
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether an element with this namespace and local name matches
    pub fn contains(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.nodes
            .get(namespace.unwrap_or(""))
            .map(|names| names.contains(local_name))
            .unwrap_or(false)
    }
}

/// Compare two documents structurally
///
/// `escape_spec` designates nodes whose text is blanked in both trees
/// before comparing. Equality covers element names, attributes
/// (order-insensitive), text content and child order. A document with
/// no root element is rejected up front; any fault during the
/// comparison itself comes back wrapped as a comparison error.
pub fn compare(
    expected: &Document,
    actual: &Document,
    escape_spec: Option<&EscapeSpec>,
) -> Result<bool> {
    let expected_root = expected
        .root
        .as_ref()
        .ok_or_else(|| Error::MissingInput("expected document has no root element".to_string()))?;
    let actual_root = actual
        .root
        .as_ref()
        .ok_or_else(|| Error::MissingInput("actual document has no root element".to_string()))?;

    let mut expected_root = expected_root.clone();
    let mut actual_root = actual_root.clone();

    if let Some(spec) = escape_spec {
        if !spec.is_empty() {
            neutralize(&mut expected_root, spec);
            neutralize(&mut actual_root, spec);
        }
    }

    Ok(structural_eq(&expected_root, &actual_root))
}

/// Parse both inputs, then compare
///
/// Parse faults are reported as comparison errors since they arise on
/// behalf of the comparison.
pub fn compare_str(
    expected: &str,
    actual: &str,
    escape_spec: Option<&EscapeSpec>,
) -> Result<bool> {
    let expected = Document::from_string(expected).map_err(Error::compare)?;
    let actual = Document::from_string(actual).map_err(Error::compare)?;
    compare(&expected, &actual, escape_spec)
}

/// Blank the text of every matching node in the tree
fn neutralize(elem: &mut Element, spec: &EscapeSpec) {
    if spec.contains(elem.namespace(), elem.local_name()) {
        elem.text = Some(String::new());
    }
    for child in &mut elem.children {
        neutralize(child, spec);
    }
}

/// Deep structural equality over two element trees
///
/// Text is compared with absent and empty treated alike, so a
/// neutralized node equals a genuinely empty one. Attribute order does
/// not matter; child order does.
fn structural_eq(a: &Element, b: &Element) -> bool {
    if a.qname != b.qname {
        return false;
    }
    if a.attributes != b.attributes {
        return false;
    }
    if a.text.as_deref().unwrap_or("") != b.text.as_deref().unwrap_or("") {
        return false;
    }
    if a.children.len() != b.children.len() {
        return false;
    }
    a.children
        .iter()
        .zip(b.children.iter())
        .all(|(ca, cb)| structural_eq(ca, cb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_documents_compare_equal() {
        let xml = r#"<root a="1"><child>text</child></root>"#;
        assert!(compare_str(xml, xml, None).unwrap());
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let a = r#"<root x="1" y="2"/>"#;
        let b = r#"<root y="2" x="1"/>"#;
        assert!(compare_str(a, b, None).unwrap());
    }

    #[test]
    fn test_child_order_matters() {
        let a = "<root><a/><b/></root>";
        let b = "<root><b/><a/></root>";
        assert!(!compare_str(a, b, None).unwrap());
    }

    #[test]
    fn test_text_difference_detected() {
        let a = "<root><stamp>2024-01-01</stamp></root>";
        let b = "<root><stamp>2024-01-02</stamp></root>";
        assert!(!compare_str(a, b, None).unwrap());
    }

    #[test]
    fn test_escape_spec_neutralizes_text() {
        let a = "<root><stamp>2024-01-01</stamp><data>x</data></root>";
        let b = "<root><stamp>2024-01-02</stamp><data>x</data></root>";
        let spec = EscapeSpec::new().ignore("", "stamp");
        assert!(compare_str(a, b, Some(&spec)).unwrap());
    }

    #[test]
    fn test_escape_spec_is_namespace_aware() {
        let a = r#"<root xmlns:p="urn:x"><p:stamp>1</p:stamp></root>"#;
        let b = r#"<root xmlns:p="urn:x"><p:stamp>2</p:stamp></root>"#;
        // Wrong namespace: the node is not neutralized.
        let miss = EscapeSpec::new().ignore("", "stamp");
        assert!(!compare_str(a, b, Some(&miss)).unwrap());
        let hit = EscapeSpec::new().ignore("urn:x", "stamp");
        assert!(compare_str(a, b, Some(&hit)).unwrap());
    }

    #[test]
    fn test_neutralized_matches_empty() {
        let a = "<root><stamp>2024-01-01</stamp></root>";
        let b = "<root><stamp/></root>";
        let spec = EscapeSpec::new().ignore("", "stamp");
        assert!(compare_str(a, b, Some(&spec)).unwrap());
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let empty = Document::new();
        let other = Document::from_string("<root/>").unwrap();
        let err = compare(&empty, &other, None).unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }

    #[test]
    fn test_parse_fault_wrapped_as_comparison_error() {
        let err = compare_str("<root>", "<root/>", None).unwrap_err();
        assert!(matches!(err, Error::Compare { .. }));
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let doc = Document::from_string("<root><stamp>x</stamp></root>").unwrap();
        let spec = EscapeSpec::new().ignore("", "stamp");
        compare(&doc, &doc, Some(&spec)).unwrap();
        let stamp = &doc.root.as_ref().unwrap().children[0];
        assert_eq!(stamp.text.as_deref(), Some("x"));
    }
}
