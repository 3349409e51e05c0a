use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::ast::{ArrayOp, CompareOp, Geometry, Interval, Node, SpatialOp, TemporalOp, FUNCTIONS};
use super::error::{Error, Result};
use super::validate;

/// Parses a CQL2-JSON document from raw bytes.
pub fn parse(document: &[u8]) -> Result<Node> {
    let value: Value = serde_json::from_slice(document)?;
    parse_value(&value)
}

pub fn parse_str(document: &str) -> Result<Node> {
    parse(document.as_bytes())
}

/// Parses an already decoded JSON value. The root must be an operator form.
pub fn parse_value(value: &Value) -> Result<Node> {
    let node = parse_form(value)?;
    debug!(op = node.op_name().unwrap_or_default(), "parsed filter");
    Ok(node)
}

fn parse_form(value: &Value) -> Result<Node> {
    let op = value
        .get("op")
        .and_then(Value::as_str)
        .ok_or(Error::MissingOperator)?
        .to_lowercase();
    trace!(op = %op, "parsing form");
    let args = args_array(&op, value.get("args"))?;

    match op.as_str() {
        "and" | "or" => {
            let children = args
                .iter()
                .map(|arg| {
                    if !arg.is_object() {
                        return Err(Error::shape(&op, "arguments must be operator forms"));
                    }
                    parse_form(arg)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(if op == "and" {
                Node::And(children)
            } else {
                Node::Or(children)
            })
        }
        "not" => {
            validate::check_arity(&op, args, 1)?;
            Ok(Node::Not(Box::new(parse_form(&args[0])?)))
        }
        "between" => {
            validate::check_arity(&op, args, 3)?;
            Ok(Node::Between {
                subject: Box::new(parse_subject(&op, &args[0])?),
                lower: Box::new(parse_operand(&op, &args[1])?),
                upper: Box::new(parse_operand(&op, &args[2])?),
            })
        }
        "like" => {
            validate::check_arity(&op, args, 2)?;
            let subject = parse_subject(&op, &args[0])?;
            let pattern = args[1]
                .as_str()
                .ok_or_else(|| Error::shape(&op, "pattern must be a string"))?;
            Ok(Node::Like {
                subject: Box::new(subject),
                pattern: pattern.to_string(),
            })
        }
        "in" => {
            validate::check_arity(&op, args, 2)?;
            let subject = parse_subject(&op, &args[0])?;
            let values = args[1]
                .as_array()
                .ok_or_else(|| Error::shape(&op, "values must be an array"))?
                .iter()
                .map(|v| parse_operand(&op, v))
                .collect::<Result<Vec<_>>>()?;
            Ok(Node::In {
                subject: Box::new(subject),
                values,
            })
        }
        "isnull" => {
            validate::check_arity(&op, args, 1)?;
            Ok(Node::IsNull(Box::new(parse_subject(&op, &args[0])?)))
        }
        name => {
            if let Some(cmp) = CompareOp::from_symbol(name) {
                validate::check_arity(&op, args, 2)?;
                return Ok(Node::Comparison {
                    op: cmp,
                    left: Box::new(parse_subject(&op, &args[0])?),
                    right: Box::new(parse_operand(&op, &args[1])?),
                });
            }
            if let Some(spatial) = SpatialOp::from_name(name) {
                validate::check_arity(&op, args, 2)?;
                return Ok(Node::Spatial {
                    op: spatial,
                    left: Box::new(parse_subject(&op, &args[0])?),
                    right: Box::new(parse_spatial_operand(&op, &args[1])?),
                });
            }
            if let Some(temporal) = TemporalOp::from_name(name) {
                validate::check_arity(&op, args, 2)?;
                return Ok(Node::Temporal {
                    op: temporal,
                    left: Box::new(parse_subject(&op, &args[0])?),
                    right: Box::new(parse_temporal_operand(&op, &args[1])?),
                });
            }
            if let Some(array) = ArrayOp::from_name(name) {
                validate::check_arity(&op, args, 2)?;
                return Ok(Node::ArrayComparison {
                    op: array,
                    left: Box::new(parse_subject(&op, &args[0])?),
                    right: Box::new(parse_array_operand(&op, &args[1])?),
                });
            }
            if FUNCTIONS.contains(&name) {
                let args = args
                    .iter()
                    .map(|arg| parse_operand(&op, arg))
                    .collect::<Result<Vec<_>>>()?;
                return Ok(Node::Function {
                    name: op.clone(),
                    args,
                });
            }
            Err(Error::UnsupportedOperator(op.clone()))
        }
    }
}

fn args_array<'a>(op: &str, args: Option<&'a Value>) -> Result<&'a [Value]> {
    match args {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(Error::shape(op, "\"args\" must be an array")),
        None => Err(Error::shape(op, "missing \"args\" array")),
    }
}

fn property_name<'a>(op: &str, value: &'a Value) -> Result<&'a str> {
    let name = value
        .as_str()
        .ok_or_else(|| Error::shape(op, "property name must be a string"))?;
    validate::check_property(op, name)?;
    Ok(name)
}

fn parse_subject(op: &str, value: &Value) -> Result<Node> {
    match value.get("property") {
        Some(name) => Ok(Node::property(property_name(op, name)?)),
        None => Err(Error::shape(
            op,
            "first argument must be a {\"property\": <name>} reference",
        )),
    }
}

fn parse_operand(op: &str, value: &Value) -> Result<Node> {
    match value {
        Value::String(s) => Ok(Node::from(s.as_str())),
        Value::Bool(b) => Ok(Node::from(*b)),
        Value::Number(n) => n
            .as_f64()
            .map(Node::from)
            .ok_or_else(|| Error::shape(op, format!("number {} is out of range", n))),
        Value::Array(items) => items
            .iter()
            .map(|item| parse_operand(op, item))
            .collect::<Result<Vec<_>>>()
            .map(Node::Array),
        Value::Object(map) => parse_object_operand(op, value, map),
        Value::Null => Err(Error::shape(op, "null is not a valid operand")),
    }
}

fn parse_object_operand(op: &str, value: &Value, map: &Map<String, Value>) -> Result<Node> {
    if map.contains_key("op") {
        return parse_form(value);
    }
    if let Some(name) = map.get("property") {
        return Ok(Node::property(property_name(op, name)?));
    }
    if let Some(ts) = map.get("timestamp") {
        let ts = ts
            .as_str()
            .ok_or_else(|| Error::shape(op, "timestamp must be a string"))?;
        return validate::parse_timestamp(op, ts).map(Node::Timestamp);
    }
    if let Some(date) = map.get("date") {
        let date = date
            .as_str()
            .ok_or_else(|| Error::shape(op, "date must be a string"))?;
        return validate::parse_date(op, date).map(Node::Date);
    }
    if let Some(bounds) = map.get("interval") {
        return parse_interval(op, bounds);
    }
    if let Some(extent) = map.get("bbox") {
        return parse_bbox(op, extent);
    }
    if map.contains_key("type") || map.contains_key("coordinates") {
        return parse_geometry(op, map);
    }
    Err(Error::shape(op, "unrecognized operand object"))
}

fn parse_spatial_operand(op: &str, value: &Value) -> Result<Node> {
    let Some(map) = value.as_object() else {
        return Err(Error::geometry(op, "expected a GeoJSON object"));
    };
    if let Some(name) = map.get("property") {
        return Ok(Node::property(property_name(op, name)?));
    }
    if let Some(extent) = map.get("bbox") {
        return parse_bbox(op, extent);
    }
    parse_geometry(op, map)
}

fn parse_temporal_operand(op: &str, value: &Value) -> Result<Node> {
    let temporal = value.as_object().is_some_and(|map| {
        ["interval", "timestamp", "date", "property"]
            .iter()
            .any(|key| map.contains_key(*key))
    });
    if !temporal {
        return Err(Error::shape(
            op,
            "expected an interval, timestamp, date or property",
        ));
    }
    parse_operand(op, value)
}

fn parse_array_operand(op: &str, value: &Value) -> Result<Node> {
    if value.is_array() || value.get("property").is_some() {
        return parse_operand(op, value);
    }
    Err(Error::shape(op, "expected an array or property"))
}

fn parse_interval(op: &str, bounds: &Value) -> Result<Node> {
    let bounds = match bounds.as_array() {
        Some(items) if items.len() == 2 => items,
        _ => return Err(Error::shape(op, "interval must be a 2-element array")),
    };
    let start = validate::parse_bound(op, &bounds[0])?;
    let end = validate::parse_bound(op, &bounds[1])?;
    validate::check_interval(op, &start, &end)?;
    Ok(Node::Interval(Interval { start, end }))
}

fn parse_bbox(op: &str, extent: &Value) -> Result<Node> {
    let extent = extent
        .as_array()
        .ok_or_else(|| Error::geometry(op, "bbox must be an array"))?
        .iter()
        .map(|n| {
            n.as_f64()
                .ok_or_else(|| Error::geometry(op, "bbox must contain only numbers"))
        })
        .collect::<Result<Vec<_>>>()?;
    validate::check_bbox(op, &extent)?;
    Ok(Node::BoundingBox(extent))
}

fn parse_geometry(op: &str, map: &Map<String, Value>) -> Result<Node> {
    let kind = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::geometry(op, "missing \"type\""))?;
    let coordinates = map
        .get("coordinates")
        .ok_or_else(|| Error::geometry(op, "missing \"coordinates\""))?;
    validate::check_geometry(op, kind, coordinates)?;
    Ok(Node::Geometry(Geometry {
        kind: kind.to_string(),
        coordinates: coordinates.clone(),
    }))
}
