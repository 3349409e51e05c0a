//! End-to-end tests over the public filter API

use serde_json::{json, Map};
use stacq::filter::{self, Builder, Dialect, Error, Node, SpatialOp};
use stacq::search::{search_body, Filter};

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_stac_search_filter() {
    let doc = json!({
        "op": "and",
        "args": [
            {"op": "=", "args": [{"property": "collection"}, "sentinel-2-l2a"]},
            {"op": "<=", "args": [{"property": "eo:cloud_cover"}, 20]},
            {"op": "t_intersects", "args": [
                {"property": "datetime"},
                {"interval": ["2023-01-01T00:00:00Z", "2023-12-31T23:59:59Z"]}
            ]},
            {"op": "s_intersects", "args": [
                {"property": "geometry"},
                {"type": "Polygon", "coordinates": [[[7.0, 46.0], [8.0, 46.0], [8.0, 47.0], [7.0, 46.0]]]}
            ]}
        ]
    });
    let node = filter::parse_value(&doc).unwrap();
    let Node::And(children) = &node else {
        panic!("Expected And root");
    };
    assert_eq!(children.len(), 4);
    assert_eq!(
        node.properties(),
        vec!["collection", "eo:cloud_cover", "datetime", "geometry"]
    );
    assert_eq!(filter::to_value(&node), doc);
}

#[test]
fn test_parse_bytes() {
    let node = filter::parse(br#"{"op":"isnull","args":[{"property":"end_datetime"}]}"#).unwrap();
    assert_eq!(node, Node::is_null("end_datetime"));
}

#[test]
fn test_parse_errors_are_structured() {
    let cases = [
        ("this is not json", "malformed"),
        (r#"{"op":"not","args":[]}"#, "arity"),
        (r#"{"op":"=","args":[1,2]}"#, "shape"),
        (r#"{"op":"s_within","args":[{"property":"g"},{"coordinates":[1,2]}]}"#, "geometry"),
        (r#"{"op":">","args":[{"property":"t"},{"timestamp":"soon"}]}"#, "time"),
        (r#"{"op":"matches","args":[]}"#, "unsupported"),
    ];
    for (doc, kind) in cases {
        let err = filter::parse_str(doc).unwrap_err();
        let ok = match kind {
            "malformed" => matches!(err, Error::MalformedInput(_)),
            "arity" => matches!(err, Error::InvalidArity { .. }),
            "shape" => matches!(err, Error::InvalidArgumentShape { .. }),
            "geometry" => matches!(err, Error::InvalidGeometry { .. }),
            "time" => matches!(err, Error::InvalidTimeFormat { .. }),
            "unsupported" => matches!(err, Error::UnsupportedOperator(_)),
            _ => false,
        };
        assert!(ok, "{} -> {:?}", doc, err);
    }
}

#[test]
fn test_uppercase_comparison_serializes_lowercase() {
    let node = filter::parse_str(r#"{"op":"BETWEEN","args":[{"property":"gsd"},1,30]}"#).unwrap();
    assert_eq!(
        filter::to_string(&node),
        r#"{"op":"between","args":[{"property":"gsd"},1,30]}"#
    );
}

#[test]
fn test_property_heuristic_on_right_operand() {
    let node = filter::parse_str(
        r#"{"op":"=","args":[{"property":"a"},{"property":"b","extra":true}]}"#,
    )
    .unwrap();
    assert!(node.is_property_comparison());
}

// ============================================================================
// Builder
// ============================================================================

#[test]
fn test_builder_roundtrip() {
    let polygon = Node::geometry("Polygon", json!([[[0, 0], [1, 0], [1, 1], [0, 0]]])).unwrap();
    let node = Builder::new()
        .eq("collection", "landsat-c2-l2")
        .between("eo:cloud_cover", 0, 15.5)
        .s_intersects("geometry", polygon)
        .t_intersects("datetime", Node::interval(None, Some("2024-01-01T00:00:00Z")).unwrap())
        .or([Node::is_null("end_datetime")])
        .build()
        .unwrap()
        .unwrap();

    let reparsed = filter::parse_str(&filter::to_string(&node)).unwrap();
    assert_eq!(reparsed, node);
}

#[test]
fn test_untouched_builder_is_no_filter() {
    assert_eq!(Builder::new().build(), Ok(None));
}

// ============================================================================
// Translation
// ============================================================================

#[test]
fn test_translations_of_same_tree() {
    let node = Node::eq("status", "published");
    assert_eq!(Dialect::OData.translate(&node).unwrap(), "status eq published");
    assert_eq!(Dialect::Sql.translate(&node).unwrap(), "status = 'published'");
}

#[test]
fn test_spatial_odata() {
    let polygon = Node::geometry("Polygon", json!([[[0, 0], [1, 0], [1, 1], [0, 0]]])).unwrap();
    let node = Node::spatial(SpatialOp::Intersects, "geometry", polygon);
    assert_eq!(
        Dialect::OData.translate(&node).unwrap(),
        r#"s_intersects({"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]})"#
    );
}

#[test]
fn test_odata_rejects_between() {
    let err = Dialect::OData.translate(&Node::between("temp", 1, 30)).unwrap_err();
    assert!(matches!(err, Error::UnsupportedNodeType { node: "Between", .. }));
}

// ============================================================================
// Search request boundary
// ============================================================================

#[test]
fn test_built_filter_in_search_body() {
    let node = Builder::new().lt("eo:cloud_cover", 10).build().unwrap().unwrap();
    let mut body = Map::new();
    body.insert("limit".to_string(), json!(50));
    let body = search_body(body, Some(&Filter::from(node)));
    assert_eq!(body["filter-lang"], "cql2-json");
    assert_eq!(
        body["filter"],
        json!({"op": "<", "args": [{"property": "eo:cloud_cover"}, 10]})
    );
    assert_eq!(body["limit"], 50);
}
