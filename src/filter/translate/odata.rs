use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};

use super::{accept, join_group, Visitor};
use crate::filter::ast::{CompareOp, Geometry, Literal, Node, SpatialOp};
use crate::filter::error::Result;
use crate::filter::serialize;

/// OData `$filter`-style output.
///
/// Comparison values are written in their bare textual form; strings are not
/// quoted.
#[derive(Debug, Default, Clone, Copy)]
pub struct ODataTranslator;

fn operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "eq",
        CompareOp::Ne => "ne",
        CompareOp::Lt => "lt",
        CompareOp::Le => "le",
        CompareOp::Gt => "gt",
        CompareOp::Ge => "ge",
    }
}

impl Visitor for ODataTranslator {
    type Output = String;

    fn dialect(&self) -> &'static str {
        "OData"
    }

    fn visit_property(&self, name: &str) -> Result<String> {
        Ok(name.to_string())
    }

    fn visit_literal(&self, literal: &Literal) -> Result<String> {
        Ok(literal.to_string())
    }

    fn visit_timestamp(&self, ts: &DateTime<FixedOffset>) -> Result<String> {
        Ok(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    fn visit_date(&self, date: &NaiveDate) -> Result<String> {
        Ok(date.format("%Y-%m-%d").to_string())
    }

    fn visit_geometry(&self, geometry: &Geometry) -> Result<String> {
        Ok(serialize::to_string(&Node::Geometry(geometry.clone())))
    }

    fn visit_bbox(&self, extent: &[f64]) -> Result<String> {
        Ok(serialize::to_string(&Node::BoundingBox(extent.to_vec())))
    }

    fn visit_and(&self, children: &[Node]) -> Result<String> {
        join_group(self, children, " and ")
    }

    fn visit_or(&self, children: &[Node]) -> Result<String> {
        join_group(self, children, " or ")
    }

    fn visit_not(&self, child: &Node) -> Result<String> {
        Ok(format!("not ({})", accept(child, self)?))
    }

    fn visit_comparison(&self, op: CompareOp, left: &Node, right: &Node) -> Result<String> {
        Ok(format!(
            "{} {} {}",
            accept(left, self)?,
            operator(op),
            accept(right, self)?
        ))
    }

    fn visit_in(&self, subject: &Node, values: &[Node]) -> Result<String> {
        let values = values
            .iter()
            .map(|v| accept(v, self))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{} in ({})", accept(subject, self)?, values.join(", ")))
    }

    fn visit_is_null(&self, subject: &Node) -> Result<String> {
        Ok(format!("{} eq null", accept(subject, self)?))
    }

    /// Renders only the geometry operand: `s_intersects(<geojson>)`.
    fn visit_spatial(&self, op: SpatialOp, _left: &Node, right: &Node) -> Result<String> {
        match right {
            Node::Geometry(_) | Node::BoundingBox(_) => {
                Ok(format!("{}({})", op.as_str(), accept(right, self)?))
            }
            other => self.unsupported(other.kind()),
        }
    }
}
