use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;

use super::error::Result;
use super::validate;

/// Functions the parser accepts as `{"op": <name>, "args": [...]}` forms.
pub const FUNCTIONS: &[&str] = &["casei", "accenti"];

/// A filter expression tree.
///
/// Composite variants own their children outright, so a tree is always
/// acyclic and can be shared read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Property(String),
    Literal(Literal),
    Timestamp(DateTime<FixedOffset>),
    Date(NaiveDate),
    Interval(Interval),
    Geometry(Geometry),
    BoundingBox(Vec<f64>),
    Array(Vec<Node>),
    And(Vec<Node>),
    Or(Vec<Node>),
    Not(Box<Node>),
    Comparison {
        op: CompareOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Between {
        subject: Box<Node>,
        lower: Box<Node>,
        upper: Box<Node>,
    },
    Like {
        subject: Box<Node>,
        pattern: String,
    },
    In {
        subject: Box<Node>,
        values: Vec<Node>,
    },
    IsNull(Box<Node>),
    Spatial {
        op: SpatialOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Temporal {
        op: TemporalOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    ArrayComparison {
        op: ArrayOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Function {
        name: String,
        args: Vec<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => f.write_str(s),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// A time range; `None` on either side means unbounded (`".."`).
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
}

impl Interval {
    /// Builds an interval from RFC3339 bounds. At least one bound is required.
    pub fn new(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = start.map(|s| validate::parse_timestamp("interval", s)).transpose()?;
        let end = end.map(|s| validate::parse_timestamp("interval", s)).transpose()?;
        validate::check_interval("interval", &start, &end)?;
        Ok(Self { start, end })
    }
}

/// A GeoJSON geometry. `coordinates` is kept as the nested JSON array it was given as.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub kind: String,
    pub coordinates: Value,
}

impl Geometry {
    pub fn new(kind: impl Into<String>, coordinates: Value) -> Result<Self> {
        let kind = kind.into();
        validate::check_geometry("geometry", &kind, &coordinates)?;
        Ok(Self { kind, coordinates })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => CompareOp::Eq,
            "<>" => CompareOp::Ne,
            "<" => CompareOp::Lt,
            "<=" => CompareOp::Le,
            ">" => CompareOp::Gt,
            ">=" => CompareOp::Ge,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialOp {
    Intersects,
    Equals,
    Disjoint,
    Touches,
    Within,
    Overlaps,
    Crosses,
    Contains,
}

impl SpatialOp {
    pub fn as_str(self) -> &'static str {
        match self {
            SpatialOp::Intersects => "s_intersects",
            SpatialOp::Equals => "s_equals",
            SpatialOp::Disjoint => "s_disjoint",
            SpatialOp::Touches => "s_touches",
            SpatialOp::Within => "s_within",
            SpatialOp::Overlaps => "s_overlaps",
            SpatialOp::Crosses => "s_crosses",
            SpatialOp::Contains => "s_contains",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "s_intersects" => SpatialOp::Intersects,
            "s_equals" => SpatialOp::Equals,
            "s_disjoint" => SpatialOp::Disjoint,
            "s_touches" => SpatialOp::Touches,
            "s_within" => SpatialOp::Within,
            "s_overlaps" => SpatialOp::Overlaps,
            "s_crosses" => SpatialOp::Crosses,
            "s_contains" => SpatialOp::Contains,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalOp {
    After,
    Before,
    Contains,
    Disjoint,
    During,
    Equals,
    Intersects,
}

impl TemporalOp {
    pub fn as_str(self) -> &'static str {
        match self {
            TemporalOp::After => "t_after",
            TemporalOp::Before => "t_before",
            TemporalOp::Contains => "t_contains",
            TemporalOp::Disjoint => "t_disjoint",
            TemporalOp::During => "t_during",
            TemporalOp::Equals => "t_equals",
            TemporalOp::Intersects => "t_intersects",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "t_after" => TemporalOp::After,
            "t_before" => TemporalOp::Before,
            "t_contains" => TemporalOp::Contains,
            "t_disjoint" => TemporalOp::Disjoint,
            "t_during" => TemporalOp::During,
            "t_equals" => TemporalOp::Equals,
            "t_intersects" => TemporalOp::Intersects,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayOp {
    Equals,
    Contains,
    ContainedBy,
    Overlaps,
}

impl ArrayOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ArrayOp::Equals => "a_equals",
            ArrayOp::Contains => "a_contains",
            ArrayOp::ContainedBy => "a_containedby",
            ArrayOp::Overlaps => "a_overlaps",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "a_equals" => ArrayOp::Equals,
            "a_contains" => ArrayOp::Contains,
            "a_containedby" => ArrayOp::ContainedBy,
            "a_overlaps" => ArrayOp::Overlaps,
            _ => return None,
        })
    }
}

impl Node {
    pub fn property(name: impl Into<String>) -> Self {
        Node::Property(name.into())
    }

    pub fn timestamp(value: &str) -> Result<Self> {
        validate::parse_timestamp("timestamp", value).map(Node::Timestamp)
    }

    pub fn date(value: &str) -> Result<Self> {
        validate::parse_date("date", value).map(Node::Date)
    }

    pub fn interval(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Interval::new(start, end).map(Node::Interval)
    }

    pub fn geometry(kind: impl Into<String>, coordinates: Value) -> Result<Self> {
        Geometry::new(kind, coordinates).map(Node::Geometry)
    }

    pub fn bbox(extent: Vec<f64>) -> Result<Self> {
        validate::check_bbox("bbox", &extent)?;
        Ok(Node::BoundingBox(extent))
    }

    pub fn array(elements: impl IntoIterator<Item = Node>) -> Self {
        Node::Array(elements.into_iter().collect())
    }

    /// `property <op> value`; when `value` is itself a property this is a
    /// property-to-property comparison.
    pub fn compare(op: CompareOp, property: impl Into<String>, value: impl Into<Node>) -> Self {
        Node::Comparison {
            op,
            left: Box::new(Node::property(property)),
            right: Box::new(value.into()),
        }
    }

    pub fn eq(property: impl Into<String>, value: impl Into<Node>) -> Self {
        Self::compare(CompareOp::Eq, property, value)
    }

    pub fn neq(property: impl Into<String>, value: impl Into<Node>) -> Self {
        Self::compare(CompareOp::Ne, property, value)
    }

    pub fn lt(property: impl Into<String>, value: impl Into<Node>) -> Self {
        Self::compare(CompareOp::Lt, property, value)
    }

    pub fn lte(property: impl Into<String>, value: impl Into<Node>) -> Self {
        Self::compare(CompareOp::Le, property, value)
    }

    pub fn gt(property: impl Into<String>, value: impl Into<Node>) -> Self {
        Self::compare(CompareOp::Gt, property, value)
    }

    pub fn gte(property: impl Into<String>, value: impl Into<Node>) -> Self {
        Self::compare(CompareOp::Ge, property, value)
    }

    pub fn between(
        property: impl Into<String>,
        lower: impl Into<Node>,
        upper: impl Into<Node>,
    ) -> Self {
        Node::Between {
            subject: Box::new(Node::property(property)),
            lower: Box::new(lower.into()),
            upper: Box::new(upper.into()),
        }
    }

    pub fn like(property: impl Into<String>, pattern: impl Into<String>) -> Self {
        Node::Like {
            subject: Box::new(Node::property(property)),
            pattern: pattern.into(),
        }
    }

    pub fn in_values(property: impl Into<String>, values: impl IntoIterator<Item = Node>) -> Self {
        Node::In {
            subject: Box::new(Node::property(property)),
            values: values.into_iter().collect(),
        }
    }

    pub fn is_null(property: impl Into<String>) -> Self {
        Node::IsNull(Box::new(Node::property(property)))
    }

    pub fn spatial(op: SpatialOp, property: impl Into<String>, geometry: Node) -> Self {
        Node::Spatial {
            op,
            left: Box::new(Node::property(property)),
            right: Box::new(geometry),
        }
    }

    pub fn temporal(op: TemporalOp, property: impl Into<String>, time: Node) -> Self {
        Node::Temporal {
            op,
            left: Box::new(Node::property(property)),
            right: Box::new(time),
        }
    }

    pub fn array_comparison(op: ArrayOp, property: impl Into<String>, values: Node) -> Self {
        Node::ArrayComparison {
            op,
            left: Box::new(Node::property(property)),
            right: Box::new(values),
        }
    }

    pub fn function(name: impl Into<String>, args: impl IntoIterator<Item = Node>) -> Self {
        Node::Function {
            name: name.into().to_lowercase(),
            args: args.into_iter().collect(),
        }
    }

    /// Variant name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Property(_) => "Property",
            Node::Literal(_) => "Literal",
            Node::Timestamp(_) => "Timestamp",
            Node::Date(_) => "Date",
            Node::Interval(_) => "Interval",
            Node::Geometry(_) => "Geometry",
            Node::BoundingBox(_) => "BoundingBox",
            Node::Array(_) => "ArrayLiteral",
            Node::And(_) => "And",
            Node::Or(_) => "Or",
            Node::Not(_) => "Not",
            Node::Comparison { .. } => "Comparison",
            Node::Between { .. } => "Between",
            Node::Like { .. } => "Like",
            Node::In { .. } => "In",
            Node::IsNull(_) => "IsNull",
            Node::Spatial { .. } => "SpatialComparison",
            Node::Temporal { .. } => "TemporalComparison",
            Node::ArrayComparison { .. } => "ArrayComparison",
            Node::Function { .. } => "FunctionCall",
        }
    }

    /// Lower-case operator name for composite nodes, `None` for leaves.
    pub fn op_name(&self) -> Option<&str> {
        Some(match self {
            Node::And(_) => "and",
            Node::Or(_) => "or",
            Node::Not(_) => "not",
            Node::Comparison { op, .. } => op.as_str(),
            Node::Between { .. } => "between",
            Node::Like { .. } => "like",
            Node::In { .. } => "in",
            Node::IsNull(_) => "isnull",
            Node::Spatial { op, .. } => op.as_str(),
            Node::Temporal { op, .. } => op.as_str(),
            Node::ArrayComparison { op, .. } => op.as_str(),
            Node::Function { name, .. } => name,
            _ => return None,
        })
    }

    /// True when both sides of a comparison are property references.
    pub fn is_property_comparison(&self) -> bool {
        matches!(
            self,
            Node::Comparison { left, right, .. }
                if matches!(**left, Node::Property(_)) && matches!(**right, Node::Property(_))
        )
    }

    /// Children in document order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Property(_)
            | Node::Literal(_)
            | Node::Timestamp(_)
            | Node::Date(_)
            | Node::Interval(_)
            | Node::Geometry(_)
            | Node::BoundingBox(_) => Vec::new(),
            Node::Array(items) | Node::And(items) | Node::Or(items) => items.iter().collect(),
            Node::Function { args, .. } => args.iter().collect(),
            Node::Not(child) | Node::IsNull(child) => vec![child.as_ref()],
            Node::Like { subject, .. } => vec![subject.as_ref()],
            Node::In { subject, values } => {
                let mut out = vec![subject.as_ref()];
                out.extend(values.iter());
                out
            }
            Node::Between {
                subject,
                lower,
                upper,
            } => vec![subject.as_ref(), lower.as_ref(), upper.as_ref()],
            Node::Comparison { left, right, .. }
            | Node::Spatial { left, right, .. }
            | Node::Temporal { left, right, .. }
            | Node::ArrayComparison { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }

    /// Every property name referenced in the tree, in document order, duplicates included.
    pub fn properties(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_properties(self, &mut out);
        out
    }
}

fn collect_properties<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    if let Node::Property(name) = node {
        out.push(name);
        return;
    }
    for child in node.children() {
        collect_properties(child, out);
    }
}

impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        Node::Literal(literal)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Literal(Literal::String(s.to_string()))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Literal(Literal::String(s))
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Literal(Literal::Number(n))
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Literal(Literal::Number(n as f64))
    }
}

impl From<i32> for Node {
    fn from(n: i32) -> Self {
        Node::Literal(Literal::Number(f64::from(n)))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Literal(Literal::Boolean(b))
    }
}

impl From<Interval> for Node {
    fn from(interval: Interval) -> Self {
        Node::Interval(interval)
    }
}

impl From<Geometry> for Node {
    fn from(geometry: Geometry) -> Self {
        Node::Geometry(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Number(1.0).to_string(), "1");
        assert_eq!(Literal::Number(2.5).to_string(), "2.5");
        assert_eq!(Literal::String("published".into()).to_string(), "published");
        assert_eq!(Literal::Boolean(true).to_string(), "true");
    }

    #[test]
    fn test_property_comparison_detection() {
        assert!(Node::eq("a", Node::property("b")).is_property_comparison());
        assert!(!Node::eq("a", 1).is_property_comparison());
        assert!(!Node::is_null("a").is_property_comparison());
    }

    #[test]
    fn test_properties_in_document_order() {
        let node = Node::And(vec![
            Node::eq("a", 1),
            Node::Or(vec![Node::like("b", "x%"), Node::eq("a", Node::property("c"))]),
        ]);
        assert_eq!(node.properties(), vec!["a", "b", "a", "c"]);
    }

    #[test]
    fn test_op_names() {
        assert_eq!(Node::neq("a", 1).op_name(), Some("<>"));
        assert_eq!(Node::And(vec![]).op_name(), Some("and"));
        assert_eq!(Node::property("a").op_name(), None);
        assert_eq!(Node::function("casei", vec![]).op_name(), Some("casei"));
    }

    #[test]
    fn test_operator_lookup() {
        assert_eq!(CompareOp::from_symbol(">="), Some(CompareOp::Ge));
        assert_eq!(CompareOp::from_symbol("!="), None);
        assert_eq!(SpatialOp::from_name("s_within"), Some(SpatialOp::Within));
        assert_eq!(TemporalOp::from_name("t_during"), Some(TemporalOp::During));
        assert_eq!(ArrayOp::from_name("a_containedby"), Some(ArrayOp::ContainedBy));
    }

    #[test]
    fn test_interval_requires_a_bound() {
        assert!(Interval::new(None, None).is_err());
        let open = Interval::new(Some("2024-01-01T00:00:00Z"), None).unwrap();
        assert!(open.start.is_some());
        assert!(open.end.is_none());
    }
}
