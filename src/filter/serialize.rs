//! Canonical CQL2-JSON rendering of a filter tree.
//!
//! Every composite renders as `{"op": <name>, "args": [...]}` with the
//! operator in lower case; leaves use their native JSON shapes.

use chrono::SecondsFormat;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use super::ast::{Interval, Literal, Node};
use super::parser;
use super::validate::OPEN_BOUND;

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

pub fn to_value(node: &Node) -> Value {
    match node {
        Node::Property(name) => json!({ "property": name }),
        Node::Literal(literal) => literal_value(literal),
        Node::Timestamp(ts) => json!({ "timestamp": ts.to_rfc3339_opts(SecondsFormat::AutoSi, true) }),
        Node::Date(date) => json!({ "date": date.format("%Y-%m-%d").to_string() }),
        Node::Interval(interval) => interval_value(interval),
        Node::Geometry(geometry) => json!({
            "type": geometry.kind,
            "coordinates": geometry.coordinates,
        }),
        Node::BoundingBox(extent) => json!({
            "bbox": extent.iter().map(|n| number_value(*n)).collect::<Vec<_>>()
        }),
        Node::Array(items) => Value::Array(items.iter().map(to_value).collect()),
        Node::And(children) => form("and", children.iter()),
        Node::Or(children) => form("or", children.iter()),
        Node::Not(child) => form("not", [child.as_ref()]),
        Node::Comparison { op, left, right } => form(op.as_str(), [left.as_ref(), right.as_ref()]),
        Node::Between {
            subject,
            lower,
            upper,
        } => form("between", [subject.as_ref(), lower.as_ref(), upper.as_ref()]),
        Node::Like { subject, pattern } => json!({
            "op": "like",
            "args": [to_value(subject), pattern],
        }),
        Node::In { subject, values } => json!({
            "op": "in",
            "args": [to_value(subject), values.iter().map(to_value).collect::<Vec<_>>()],
        }),
        Node::IsNull(subject) => form("isnull", [subject.as_ref()]),
        Node::Spatial { op, left, right } => form(op.as_str(), [left.as_ref(), right.as_ref()]),
        Node::Temporal { op, left, right } => form(op.as_str(), [left.as_ref(), right.as_ref()]),
        Node::ArrayComparison { op, left, right } => {
            form(op.as_str(), [left.as_ref(), right.as_ref()])
        }
        Node::Function { name, args } => form(&name.to_lowercase(), args.iter()),
    }
}

pub fn to_string(node: &Node) -> String {
    to_value(node).to_string()
}

pub fn to_string_pretty(node: &Node) -> String {
    serde_json::to_string_pretty(&to_value(node)).unwrap_or_else(|_| to_string(node))
}

fn form<'a>(op: &str, args: impl IntoIterator<Item = &'a Node>) -> Value {
    json!({
        "op": op,
        "args": args.into_iter().map(to_value).collect::<Vec<_>>(),
    })
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Number(n) => number_value(*n),
        Literal::Boolean(b) => Value::Bool(*b),
    }
}

/// Whole numbers are written without a fractional part.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

fn interval_value(interval: &Interval) -> Value {
    let bound = |b: &Option<chrono::DateTime<chrono::FixedOffset>>| match b {
        Some(ts) => Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        None => Value::String(OPEN_BOUND.to_string()),
    };
    json!({ "interval": [bound(&interval.start), bound(&interval.end)] })
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        parser::parse_value(&value).map_err(serde::de::Error::custom)
    }
}
