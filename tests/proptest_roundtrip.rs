//! Property tests for the build -> serialize -> parse roundtrip
//!
//! Any tree the builder accepts must serialize to a document the parser turns
//! back into the same tree.

use proptest::prelude::*;
use serde_json::json;
use stacq::filter::{self, ArrayOp, Builder, CompareOp, Node, SpatialOp, TemporalOp};

#[derive(Debug, Clone)]
enum Step {
    And(Vec<Node>),
    Or(Vec<Node>),
    Not(Node),
    Push(Node),
}

fn property_name() -> impl Strategy<Value = String> {
    "[a-z][a-z_:]{0,8}"
}

fn literal() -> impl Strategy<Value = Node> {
    prop_oneof![
        any::<i32>().prop_map(Node::from),
        any::<bool>().prop_map(Node::from),
        "[a-zA-Z0-9 %_]{0,10}".prop_map(Node::from),
        (-1000i32..1000).prop_map(|n| Node::from(f64::from(n) + 0.5)),
    ]
}

fn operand() -> impl Strategy<Value = Node> {
    prop_oneof![
        4 => literal(),
        1 => property_name().prop_map(Node::property),
    ]
}

fn timestamp() -> impl Strategy<Value = String> {
    (10u32..40, 1u32..13, 1u32..29, 0u32..24).prop_map(|(y, m, d, h)| {
        format!("20{:02}-{:02}-{:02}T{:02}:30:00Z", y, m, d, h)
    })
}

fn compare_op() -> impl Strategy<Value = CompareOp> {
    prop_oneof![
        Just(CompareOp::Eq),
        Just(CompareOp::Ne),
        Just(CompareOp::Lt),
        Just(CompareOp::Le),
        Just(CompareOp::Gt),
        Just(CompareOp::Ge),
    ]
}

fn spatial_op() -> impl Strategy<Value = SpatialOp> {
    prop_oneof![
        Just(SpatialOp::Intersects),
        Just(SpatialOp::Within),
        Just(SpatialOp::Touches),
        Just(SpatialOp::Disjoint),
    ]
}

fn temporal_op() -> impl Strategy<Value = TemporalOp> {
    prop_oneof![
        Just(TemporalOp::Before),
        Just(TemporalOp::After),
        Just(TemporalOp::During),
        Just(TemporalOp::Intersects),
    ]
}

fn spatial() -> impl Strategy<Value = Node> {
    let point = (-180i32..180, -90i32..90)
        .prop_map(|(x, y)| Node::geometry("Point", json!([x, y])).unwrap());
    let bbox = (-180i32..0, -90i32..0, 1i32..180, 1i32..90).prop_map(|(w, s, e, n)| {
        Node::bbox(vec![w.into(), s.into(), e.into(), n.into()]).unwrap()
    });
    let target = prop_oneof![
        2 => point,
        2 => bbox,
        1 => property_name().prop_map(Node::property),
    ];
    (spatial_op(), property_name(), target).prop_map(|(op, p, t)| Node::spatial(op, p, t))
}

fn temporal() -> impl Strategy<Value = Node> {
    let interval = (timestamp(), prop::option::of(timestamp()))
        .prop_map(|(s, e)| Node::interval(Some(s.as_str()), e.as_deref()).unwrap());
    let day = (2000i32..2040, 1u32..13, 1u32..29).prop_map(|(y, m, d)| {
        Node::date(&format!("{}-{:02}-{:02}", y, m, d)).unwrap()
    });
    let target = prop_oneof![
        2 => interval,
        2 => timestamp().prop_map(|t| Node::timestamp(&t).unwrap()),
        2 => day,
        1 => property_name().prop_map(Node::property),
    ];
    (temporal_op(), property_name(), target).prop_map(|(op, p, t)| Node::temporal(op, p, t))
}

fn leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        (compare_op(), property_name(), operand())
            .prop_map(|(op, p, v)| Node::compare(op, p, v)),
        (property_name(), operand(), operand()).prop_map(|(p, l, u)| Node::between(p, l, u)),
        (property_name(), "[a-z%_]{0,6}").prop_map(|(p, pat)| Node::like(p, pat)),
        (property_name(), prop::collection::vec(operand(), 0..4))
            .prop_map(|(p, vs)| Node::in_values(p, vs)),
        property_name().prop_map(Node::is_null),
        spatial(),
        temporal(),
        (property_name(), prop::collection::vec(literal(), 0..3))
            .prop_map(|(p, vs)| Node::array_comparison(ArrayOp::Overlaps, p, Node::array(vs))),
        property_name().prop_map(|p| Node::function("casei", vec![Node::property(p)])),
    ]
}

fn tree() -> impl Strategy<Value = Node> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Node::And),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Node::Or),
            inner.prop_map(|n| Node::Not(Box::new(n))),
        ]
    })
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        prop::collection::vec(tree(), 0..3).prop_map(Step::And),
        prop::collection::vec(tree(), 0..3).prop_map(Step::Or),
        tree().prop_map(Step::Not),
        tree().prop_map(Step::Push),
    ]
}

fn apply(steps: Vec<Step>) -> Builder {
    steps.into_iter().fold(Builder::new(), |builder, step| match step {
        Step::And(nodes) => builder.and(nodes),
        Step::Or(nodes) => builder.or(nodes),
        Step::Not(node) => builder.not(node),
        Step::Push(node) => builder.push(node),
    })
}

proptest! {
    #[test]
    fn built_trees_survive_roundtrip(steps in prop::collection::vec(step(), 0..5)) {
        let built = apply(steps).build().unwrap();
        if let Some(node) = built {
            let text = filter::to_string(&node);
            let reparsed = filter::parse_str(&text).unwrap();
            prop_assert_eq!(reparsed, node);
        }
    }

    #[test]
    fn builder_never_nests_same_combinator_at_root(
        first in prop::collection::vec(leaf(), 1..4),
        second in prop::collection::vec(leaf(), 1..4),
    ) {
        let expected = first.len() + second.len();
        let node = Builder::new().and(first).and(second).build().unwrap().unwrap();
        let Node::And(children) = node else {
            panic!("Expected And root");
        };
        prop_assert_eq!(children.len(), expected);
    }
}
