//! Shape checks shared by the parser, the builder and the leaf constructors.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;

use super::ast::{CompareOp, Literal, Node};
use super::error::{Error, Result};

pub const GEOMETRY_TYPES: &[&str] = &[
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
];

/// Textual marker for an unbounded interval side.
pub const OPEN_BOUND: &str = "..";

pub fn check_property(op: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::shape(op, "property name must not be empty"));
    }
    Ok(())
}

pub fn check_arity(op: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(Error::InvalidArity {
            op: op.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

pub fn parse_timestamp(op: &str, value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|e| Error::InvalidTimeFormat {
        op: op.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

pub fn parse_date(op: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| Error::InvalidTimeFormat {
        op: op.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// One side of an `interval` array: an RFC3339 string, `".."` or `null`.
pub fn parse_bound(op: &str, value: &Value) -> Result<Option<DateTime<FixedOffset>>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s == OPEN_BOUND => Ok(None),
        Value::String(s) => parse_timestamp(op, s).map(Some),
        other => Err(Error::shape(
            op,
            format!("interval bound must be a string or null, found {}", other),
        )),
    }
}

pub fn check_interval(
    op: &str,
    start: &Option<DateTime<FixedOffset>>,
    end: &Option<DateTime<FixedOffset>>,
) -> Result<()> {
    if start.is_none() && end.is_none() {
        return Err(Error::shape(op, "interval must have at least one bound"));
    }
    Ok(())
}

pub fn check_geometry(op: &str, kind: &str, coordinates: &Value) -> Result<()> {
    if !GEOMETRY_TYPES.contains(&kind) {
        return Err(Error::geometry(op, format!("unknown geometry type '{}'", kind)));
    }
    if !is_coordinate_array(coordinates) {
        return Err(Error::geometry(
            op,
            "coordinates must be a nested array of numbers",
        ));
    }
    Ok(())
}

fn is_coordinate_array(value: &Value) -> bool {
    let Some(items) = value.as_array() else {
        return false;
    };
    items.iter().all(Value::is_number) || items.iter().all(is_coordinate_array)
}

pub fn check_bbox(op: &str, extent: &[f64]) -> Result<()> {
    if extent.len() != 4 && extent.len() != 6 {
        return Err(Error::geometry(
            op,
            format!("bbox must have 4 or 6 numbers, found {}", extent.len()),
        ));
    }
    if extent.iter().any(|n| !n.is_finite()) {
        return Err(Error::geometry(op, "bbox values must be finite"));
    }
    Ok(())
}

/// Core operator names reserved by the parser.
const RESERVED_OPERATORS: &[&str] = &["and", "or", "not", "between", "like", "in", "isnull"];
const OPERATOR_PREFIXES: &[&str] = &["s_", "t_", "a_"];

/// A function name must serialize to an `op` the parser reads back as a call.
fn check_function_name(op: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::shape(op, "function name must not be empty"));
    }
    if name.chars().any(char::is_uppercase) {
        return Err(Error::shape(
            name,
            format!("function name '{}' must be lower case", name),
        ));
    }
    let reserved = RESERVED_OPERATORS.contains(&name)
        || CompareOp::from_symbol(name).is_some()
        || OPERATOR_PREFIXES.iter().any(|prefix| name.starts_with(prefix));
    if reserved {
        return Err(Error::shape(
            name,
            format!("function name '{}' is a core operator", name),
        ));
    }
    Ok(())
}

/// Checks a finished tree against the same rules the parser enforces, so
/// anything that passes serializes to a document the parser accepts.
pub fn check_tree(node: &Node) -> Result<()> {
    check_node(node, node.op_name().unwrap_or("filter"))
}

fn check_node(node: &Node, op: &str) -> Result<()> {
    match node {
        Node::Property(name) => check_property(op, name),
        Node::Literal(Literal::Number(n)) if !n.is_finite() => {
            Err(Error::shape(op, "numbers must be finite"))
        }
        Node::Literal(_) | Node::Timestamp(_) | Node::Date(_) => Ok(()),
        Node::Interval(interval) => check_interval(op, &interval.start, &interval.end),
        Node::Geometry(geometry) => check_geometry(op, &geometry.kind, &geometry.coordinates),
        Node::BoundingBox(extent) => check_bbox(op, extent),
        Node::Array(items) => items.iter().try_for_each(|item| check_node(item, op)),
        Node::And(children) | Node::Or(children) => {
            let op = node.op_name().unwrap_or(op);
            children.iter().try_for_each(|child| check_form(child, op))
        }
        Node::Not(child) => check_form(child, "not"),
        Node::Function { name, args } => {
            check_function_name(op, name)?;
            args.iter().try_for_each(|arg| check_node(arg, name))
        }
        Node::Comparison { op, left, right } => {
            check_subject(op.as_str(), left)?;
            check_node(right, op.as_str())
        }
        Node::Between {
            subject,
            lower,
            upper,
        } => {
            check_subject("between", subject)?;
            check_node(lower, "between")?;
            check_node(upper, "between")
        }
        Node::Like { subject, .. } => check_subject("like", subject),
        Node::In { subject, values } => {
            check_subject("in", subject)?;
            values.iter().try_for_each(|value| check_node(value, "in"))
        }
        Node::IsNull(subject) => check_subject("isnull", subject),
        Node::Spatial { op, left, right } => {
            check_subject(op.as_str(), left)?;
            match right.as_ref() {
                Node::Geometry(_) | Node::BoundingBox(_) | Node::Property(_) => {
                    check_node(right, op.as_str())
                }
                other => Err(Error::geometry(
                    op.as_str(),
                    format!("expected a geometry, found {}", other.kind()),
                )),
            }
        }
        Node::Temporal { op, left, right } => {
            check_subject(op.as_str(), left)?;
            match right.as_ref() {
                Node::Interval(_) | Node::Timestamp(_) | Node::Date(_) | Node::Property(_) => {
                    check_node(right, op.as_str())
                }
                other => Err(Error::shape(
                    op.as_str(),
                    format!("expected an interval or instant, found {}", other.kind()),
                )),
            }
        }
        Node::ArrayComparison { op, left, right } => {
            check_subject(op.as_str(), left)?;
            match right.as_ref() {
                Node::Array(_) | Node::Property(_) => check_node(right, op.as_str()),
                other => Err(Error::shape(
                    op.as_str(),
                    format!("expected an array, found {}", other.kind()),
                )),
            }
        }
    }
}

fn check_subject(op: &str, subject: &Node) -> Result<()> {
    match subject {
        Node::Property(name) => check_property(op, name),
        other => Err(Error::shape(
            op,
            format!("first argument must be a property, found {}", other.kind()),
        )),
    }
}

fn check_form(node: &Node, op: &str) -> Result<()> {
    if node.op_name().is_none() {
        return Err(Error::shape(
            op,
            format!("arguments must be operator forms, found {}", node.kind()),
        ));
    }
    check_node(node, op)
}
