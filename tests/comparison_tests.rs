//! Structural comparison tests, including selective neutralization of
//! volatile nodes.

use std::path::PathBuf;

use proptest::prelude::*;
use xmlkit::{compare, compare_str, Document, EscapeSpec, Error};

const REPORT_NS: &str = "urn:example:report:1.0";

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources")
        .join(name)
}

#[test]
fn test_document_equals_itself() {
    let doc = Document::from_file(resource("valid-report.xml")).unwrap();
    assert!(compare(&doc, &doc, None).unwrap());
}

#[test]
fn test_timestamp_difference_breaks_equality() {
    let a = Document::from_file(resource("valid-report.xml")).unwrap();
    let mut b = a.clone();
    let generated_at = &mut b.root_mut().unwrap().children[0];
    assert_eq!(generated_at.local_name(), "generatedAt");
    generated_at.set_text("2030-01-01T00:00:00Z".to_string());

    assert!(!compare(&a, &b, None).unwrap());

    // Neutralizing the timestamp node restores equality.
    let spec = EscapeSpec::new().ignore(REPORT_NS, "generatedAt");
    assert!(compare(&a, &b, Some(&spec)).unwrap());
}

#[test]
fn test_escape_spec_applies_to_both_documents() {
    let a = r#"<log><run>alpha</run><result>ok</result></log>"#;
    let b = r#"<log><run>beta</run><result>ok</result></log>"#;
    let spec = EscapeSpec::new().ignore("", "run");
    assert!(compare_str(a, b, Some(&spec)).unwrap());
    assert!(compare_str(b, a, Some(&spec)).unwrap());
}

#[test]
fn test_empty_escape_spec_behaves_like_none() {
    let a = "<log><run>alpha</run></log>";
    let b = "<log><run>beta</run></log>";
    let spec = EscapeSpec::new();
    assert!(spec.is_empty());
    assert!(!compare_str(a, b, Some(&spec)).unwrap());
}

#[test]
fn test_extra_child_detected() {
    let a = "<log><run>alpha</run></log>";
    let b = "<log><run>alpha</run><run>alpha</run></log>";
    assert!(!compare_str(a, b, None).unwrap());
}

#[test]
fn test_different_namespaces_not_equal() {
    let a = r#"<log xmlns="urn:a"/>"#;
    let b = r#"<log xmlns="urn:b"/>"#;
    assert!(!compare_str(a, b, None).unwrap());
}

#[test]
fn test_rootless_document_rejected_before_comparison() {
    let other = Document::from_string("<root/>").unwrap();
    let err = compare(&Document::new(), &other, None).unwrap_err();
    assert!(matches!(err, Error::MissingInput(_)));
    let err = compare(&other, &Document::new(), None).unwrap_err();
    assert!(matches!(err, Error::MissingInput(_)));
}

#[test]
fn test_malformed_input_surfaces_as_comparison_error() {
    let err = compare_str("<root><open>", "<root/>", None).unwrap_err();
    assert!(matches!(err, Error::Compare { .. }));
    assert!(err.to_string().starts_with("comparison failed:"));
}

proptest! {
    #[test]
    fn prop_comparison_is_reflexive(
        name in "[a-z][a-z0-9]{0,8}",
        text in "[a-zA-Z0-9 ]{0,16}",
        attr in "[a-zA-Z0-9]{0,8}",
    ) {
        let xml = format!("<{name} attr=\"{attr}\"><child>{text}</child></{name}>");
        prop_assert!(compare_str(&xml, &xml, None).unwrap());
    }

    #[test]
    fn prop_neutralized_node_text_never_matters(
        a in "[a-zA-Z0-9]{0,12}",
        b in "[a-zA-Z0-9]{0,12}",
    ) {
        let left = format!("<log><stamp>{a}</stamp></log>");
        let right = format!("<log><stamp>{b}</stamp></log>");
        let spec = EscapeSpec::new().ignore("", "stamp");
        prop_assert!(compare_str(&left, &right, Some(&spec)).unwrap());
    }
}
