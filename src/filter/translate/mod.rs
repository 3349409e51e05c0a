//! Dialect translators.
//!
//! A dialect implements [`Visitor`] and overrides the variants it can render;
//! every other variant falls through to [`Error::UnsupportedNodeType`], so a
//! subtree is never silently dropped.

mod odata;
mod sql;

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::debug;

pub use odata::ODataTranslator;
pub use sql::SqlTranslator;

use super::ast::{ArrayOp, CompareOp, Geometry, Interval, Literal, Node, SpatialOp, TemporalOp};
use super::error::{Error, Result};

pub trait Visitor: Sized {
    type Output;

    /// Dialect name used in error messages.
    fn dialect(&self) -> &'static str;

    fn translate(&self, node: &Node) -> Result<Self::Output> {
        let out = accept(node, self)?;
        debug!(dialect = self.dialect(), root = node.kind(), "translated filter");
        Ok(out)
    }

    fn unsupported(&self, node: &'static str) -> Result<Self::Output> {
        Err(Error::UnsupportedNodeType {
            dialect: self.dialect(),
            node,
        })
    }

    fn visit_property(&self, _name: &str) -> Result<Self::Output> {
        self.unsupported("Property")
    }

    fn visit_literal(&self, _literal: &Literal) -> Result<Self::Output> {
        self.unsupported("Literal")
    }

    fn visit_timestamp(&self, _ts: &DateTime<FixedOffset>) -> Result<Self::Output> {
        self.unsupported("Timestamp")
    }

    fn visit_date(&self, _date: &NaiveDate) -> Result<Self::Output> {
        self.unsupported("Date")
    }

    fn visit_interval(&self, _interval: &Interval) -> Result<Self::Output> {
        self.unsupported("Interval")
    }

    fn visit_geometry(&self, _geometry: &Geometry) -> Result<Self::Output> {
        self.unsupported("Geometry")
    }

    fn visit_bbox(&self, _extent: &[f64]) -> Result<Self::Output> {
        self.unsupported("BoundingBox")
    }

    fn visit_array(&self, _items: &[Node]) -> Result<Self::Output> {
        self.unsupported("ArrayLiteral")
    }

    fn visit_and(&self, _children: &[Node]) -> Result<Self::Output> {
        self.unsupported("And")
    }

    fn visit_or(&self, _children: &[Node]) -> Result<Self::Output> {
        self.unsupported("Or")
    }

    fn visit_not(&self, _child: &Node) -> Result<Self::Output> {
        self.unsupported("Not")
    }

    fn visit_comparison(&self, _op: CompareOp, _left: &Node, _right: &Node) -> Result<Self::Output> {
        self.unsupported("Comparison")
    }

    fn visit_between(&self, _subject: &Node, _lower: &Node, _upper: &Node) -> Result<Self::Output> {
        self.unsupported("Between")
    }

    fn visit_like(&self, _subject: &Node, _pattern: &str) -> Result<Self::Output> {
        self.unsupported("Like")
    }

    fn visit_in(&self, _subject: &Node, _values: &[Node]) -> Result<Self::Output> {
        self.unsupported("In")
    }

    fn visit_is_null(&self, _subject: &Node) -> Result<Self::Output> {
        self.unsupported("IsNull")
    }

    fn visit_spatial(&self, _op: SpatialOp, _left: &Node, _right: &Node) -> Result<Self::Output> {
        self.unsupported("SpatialComparison")
    }

    fn visit_temporal(&self, _op: TemporalOp, _left: &Node, _right: &Node) -> Result<Self::Output> {
        self.unsupported("TemporalComparison")
    }

    fn visit_array_comparison(
        &self,
        _op: ArrayOp,
        _left: &Node,
        _right: &Node,
    ) -> Result<Self::Output> {
        self.unsupported("ArrayComparison")
    }

    fn visit_function(&self, _name: &str, _args: &[Node]) -> Result<Self::Output> {
        self.unsupported("FunctionCall")
    }
}

/// Dispatches `node` to the matching visitor method.
pub fn accept<V: Visitor>(node: &Node, visitor: &V) -> Result<V::Output> {
    match node {
        Node::Property(name) => visitor.visit_property(name),
        Node::Literal(literal) => visitor.visit_literal(literal),
        Node::Timestamp(ts) => visitor.visit_timestamp(ts),
        Node::Date(date) => visitor.visit_date(date),
        Node::Interval(interval) => visitor.visit_interval(interval),
        Node::Geometry(geometry) => visitor.visit_geometry(geometry),
        Node::BoundingBox(extent) => visitor.visit_bbox(extent),
        Node::Array(items) => visitor.visit_array(items),
        Node::And(children) => visitor.visit_and(children),
        Node::Or(children) => visitor.visit_or(children),
        Node::Not(child) => visitor.visit_not(child),
        Node::Comparison { op, left, right } => visitor.visit_comparison(*op, left, right),
        Node::Between {
            subject,
            lower,
            upper,
        } => visitor.visit_between(subject, lower, upper),
        Node::Like { subject, pattern } => visitor.visit_like(subject, pattern),
        Node::In { subject, values } => visitor.visit_in(subject, values),
        Node::IsNull(subject) => visitor.visit_is_null(subject),
        Node::Spatial { op, left, right } => visitor.visit_spatial(*op, left, right),
        Node::Temporal { op, left, right } => visitor.visit_temporal(*op, left, right),
        Node::ArrayComparison { op, left, right } => {
            visitor.visit_array_comparison(*op, left, right)
        }
        Node::Function { name, args } => visitor.visit_function(name, args),
    }
}

/// Text dialects selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    OData,
    Sql,
}

impl Dialect {
    pub fn translate(self, node: &Node) -> Result<String> {
        match self {
            Dialect::OData => ODataTranslator.translate(node),
            Dialect::Sql => SqlTranslator.translate(node),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "odata" => Ok(Dialect::OData),
            "sql" => Ok(Dialect::Sql),
            other => Err(format!("unknown dialect '{}'", other)),
        }
    }
}

/// Joins translated children as `(<a> <sep> <b> ...)`.
fn join_group<V: Visitor<Output = String>>(
    visitor: &V,
    children: &[Node],
    separator: &str,
) -> Result<String> {
    let parts = children
        .iter()
        .map(|child| accept(child, visitor))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("({})", parts.join(separator)))
}
