//! JSON shape of layout definitions and records as shipped by tooling

use layout_types::{ArrayLength, Layout, LayoutError, Record, Value};

const TRANSFER_JSON: &str = r#"[
    {"name": "tag", "item": {"integer": {"size": 1, "fixed": {"uint": 1}}}},
    {"name": "amount", "item": {"integer": {"size": 8, "endianness": "little"}}},
    {"name": "memo", "item": {"bytes": {"prefixed": {"prefix": {"size": 2}}}}},
    {"name": "legs", "item": {"array": {
        "element": [{"name": "venue", "item": {"bytes": {"fixed": {"size": 4}}}}],
        "length": {"prefixed": {"prefix": {"size": 1}, "unit": "bytes"}}
    }}},
    {"name": "rest", "item": {"bytes": "remainder"}}
]"#;

#[test]
fn test_layout_from_json() {
    let layout: Layout = serde_json::from_str(TRANSFER_JSON).unwrap();
    layout.validate().unwrap();

    let names: Vec<&str> = layout.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["tag", "amount", "memo", "legs", "rest"]);

    let reserialized = serde_json::to_value(&layout).unwrap();
    let back: Layout = serde_json::from_value(reserialized).unwrap();
    assert_eq!(back, layout);
}

#[test]
fn test_json_layout_needs_validation() {
    let json = r#"[{"name": "tag", "item": {"integer": {"size": 2, "fixed": {"int": -1}}}}]"#;
    let layout: Layout = serde_json::from_str(json).unwrap();
    assert!(matches!(
        layout.validate(),
        Err(LayoutError::FixedValueKind { .. })
    ));
}

#[test]
fn test_builder_matches_json() {
    let built = Layout::builder()
        .array(
            "xs",
            Layout::builder().uint("x", 1).build().unwrap(),
            ArrayLength::Fixed(3),
        )
        .build()
        .unwrap();
    let parsed: Layout = serde_json::from_str(
        r#"[{"name": "xs", "item": {"array": {
            "element": [{"name": "x", "item": {"integer": {"size": 1}}}],
            "length": {"fixed": 3}
        }}}]"#,
    )
    .unwrap();
    assert_eq!(built, parsed);
}

#[test]
fn test_record_json_keeps_order() {
    let record: Record = serde_json::from_str(
        r#"{"amount": {"uint": 5}, "memo": {"bytes": [104, 105]}, "legs": {"array": []}}"#,
    )
    .unwrap();
    let names: Vec<&str> = record.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["amount", "memo", "legs"]);
    assert_eq!(record.get("memo"), Some(&Value::Bytes(b"hi".to_vec())));
}
