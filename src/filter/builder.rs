use tracing::debug;

use super::ast::{ArrayOp, CompareOp, Node, SpatialOp, TemporalOp};
use super::error::Result;
use super::validate;

/// Fluent construction of filter trees.
///
/// The builder holds a single root. `and`/`or` extend a root of the same
/// combinator in place and wrap any other root; every other call conjoins
/// with whatever is already there, except `not`, which replaces the root.
#[derive(Debug, Default, Clone)]
pub struct Builder {
    root: Option<Node>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.root = Some(match self.root.take() {
            None => Node::And(nodes.into_iter().collect()),
            Some(Node::And(mut children)) => {
                children.extend(nodes);
                Node::And(children)
            }
            Some(other) => {
                let mut children = vec![other];
                children.extend(nodes);
                Node::And(children)
            }
        });
        self
    }

    pub fn or(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.root = Some(match self.root.take() {
            None => Node::Or(nodes.into_iter().collect()),
            Some(Node::Or(mut children)) => {
                children.extend(nodes);
                Node::Or(children)
            }
            Some(other) => {
                let mut children = vec![other];
                children.extend(nodes);
                Node::Or(children)
            }
        });
        self
    }

    pub fn not(mut self, node: Node) -> Self {
        self.root = Some(Node::Not(Box::new(node)));
        self
    }

    /// Adds a node with the default combinator (conjunction).
    pub fn push(self, node: Node) -> Self {
        if self.root.is_none() {
            return Self { root: Some(node) };
        }
        self.and([node])
    }

    pub fn compare(
        self,
        op: CompareOp,
        property: impl Into<String>,
        value: impl Into<Node>,
    ) -> Self {
        self.push(Node::compare(op, property, value))
    }

    pub fn eq(self, property: impl Into<String>, value: impl Into<Node>) -> Self {
        self.compare(CompareOp::Eq, property, value)
    }

    pub fn neq(self, property: impl Into<String>, value: impl Into<Node>) -> Self {
        self.compare(CompareOp::Ne, property, value)
    }

    pub fn lt(self, property: impl Into<String>, value: impl Into<Node>) -> Self {
        self.compare(CompareOp::Lt, property, value)
    }

    pub fn lte(self, property: impl Into<String>, value: impl Into<Node>) -> Self {
        self.compare(CompareOp::Le, property, value)
    }

    pub fn gt(self, property: impl Into<String>, value: impl Into<Node>) -> Self {
        self.compare(CompareOp::Gt, property, value)
    }

    pub fn gte(self, property: impl Into<String>, value: impl Into<Node>) -> Self {
        self.compare(CompareOp::Ge, property, value)
    }

    pub fn between(
        self,
        property: impl Into<String>,
        lower: impl Into<Node>,
        upper: impl Into<Node>,
    ) -> Self {
        self.push(Node::between(property, lower, upper))
    }

    pub fn like(self, property: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.push(Node::like(property, pattern))
    }

    pub fn in_values(
        self,
        property: impl Into<String>,
        values: impl IntoIterator<Item = Node>,
    ) -> Self {
        self.push(Node::in_values(property, values))
    }

    pub fn is_null(self, property: impl Into<String>) -> Self {
        self.push(Node::is_null(property))
    }

    pub fn spatial(self, op: SpatialOp, property: impl Into<String>, geometry: Node) -> Self {
        self.push(Node::spatial(op, property, geometry))
    }

    pub fn s_intersects(self, property: impl Into<String>, geometry: Node) -> Self {
        self.spatial(SpatialOp::Intersects, property, geometry)
    }

    pub fn s_within(self, property: impl Into<String>, geometry: Node) -> Self {
        self.spatial(SpatialOp::Within, property, geometry)
    }

    pub fn s_contains(self, property: impl Into<String>, geometry: Node) -> Self {
        self.spatial(SpatialOp::Contains, property, geometry)
    }

    pub fn s_disjoint(self, property: impl Into<String>, geometry: Node) -> Self {
        self.spatial(SpatialOp::Disjoint, property, geometry)
    }

    pub fn s_equals(self, property: impl Into<String>, geometry: Node) -> Self {
        self.spatial(SpatialOp::Equals, property, geometry)
    }

    pub fn s_touches(self, property: impl Into<String>, geometry: Node) -> Self {
        self.spatial(SpatialOp::Touches, property, geometry)
    }

    pub fn s_overlaps(self, property: impl Into<String>, geometry: Node) -> Self {
        self.spatial(SpatialOp::Overlaps, property, geometry)
    }

    pub fn s_crosses(self, property: impl Into<String>, geometry: Node) -> Self {
        self.spatial(SpatialOp::Crosses, property, geometry)
    }

    pub fn temporal(self, op: TemporalOp, property: impl Into<String>, time: Node) -> Self {
        self.push(Node::temporal(op, property, time))
    }

    pub fn t_intersects(self, property: impl Into<String>, time: Node) -> Self {
        self.temporal(TemporalOp::Intersects, property, time)
    }

    pub fn t_before(self, property: impl Into<String>, time: Node) -> Self {
        self.temporal(TemporalOp::Before, property, time)
    }

    pub fn t_after(self, property: impl Into<String>, time: Node) -> Self {
        self.temporal(TemporalOp::After, property, time)
    }

    pub fn t_during(self, property: impl Into<String>, time: Node) -> Self {
        self.temporal(TemporalOp::During, property, time)
    }

    pub fn t_contains(self, property: impl Into<String>, time: Node) -> Self {
        self.temporal(TemporalOp::Contains, property, time)
    }

    pub fn t_disjoint(self, property: impl Into<String>, time: Node) -> Self {
        self.temporal(TemporalOp::Disjoint, property, time)
    }

    pub fn t_equals(self, property: impl Into<String>, time: Node) -> Self {
        self.temporal(TemporalOp::Equals, property, time)
    }

    pub fn array(self, op: ArrayOp, property: impl Into<String>, values: Node) -> Self {
        self.push(Node::array_comparison(op, property, values))
    }

    pub fn a_contains(self, property: impl Into<String>, values: Node) -> Self {
        self.array(ArrayOp::Contains, property, values)
    }

    pub fn a_overlaps(self, property: impl Into<String>, values: Node) -> Self {
        self.array(ArrayOp::Overlaps, property, values)
    }

    pub fn a_equals(self, property: impl Into<String>, values: Node) -> Self {
        self.array(ArrayOp::Equals, property, values)
    }

    pub fn a_containedby(self, property: impl Into<String>, values: Node) -> Self {
        self.array(ArrayOp::ContainedBy, property, values)
    }

    pub fn function(self, name: impl Into<String>, args: impl IntoIterator<Item = Node>) -> Self {
        self.push(Node::function(name, args))
    }

    /// Finishes the tree. An untouched builder yields `Ok(None)`: no filter.
    pub fn build(self) -> Result<Option<Node>> {
        let Some(root) = self.root else {
            return Ok(None);
        };
        validate::check_tree(&root)?;
        debug!(op = root.op_name().unwrap_or_default(), "built filter");
        Ok(Some(root))
    }
}
