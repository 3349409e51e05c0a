use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};

use super::{accept, join_group, Visitor};
use crate::filter::ast::{CompareOp, Literal, Node};
use crate::filter::error::Result;

/// SQL `WHERE`-clause output. Every value is single-quoted, whatever its kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlTranslator;

fn quoted(text: impl std::fmt::Display) -> String {
    format!("'{}'", text)
}

impl Visitor for SqlTranslator {
    type Output = String;

    fn dialect(&self) -> &'static str {
        "SQL"
    }

    fn visit_property(&self, name: &str) -> Result<String> {
        Ok(name.to_string())
    }

    fn visit_literal(&self, literal: &Literal) -> Result<String> {
        Ok(quoted(literal))
    }

    fn visit_timestamp(&self, ts: &DateTime<FixedOffset>) -> Result<String> {
        Ok(quoted(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
    }

    fn visit_date(&self, date: &NaiveDate) -> Result<String> {
        Ok(quoted(date.format("%Y-%m-%d")))
    }

    fn visit_and(&self, children: &[Node]) -> Result<String> {
        join_group(self, children, " AND ")
    }

    fn visit_or(&self, children: &[Node]) -> Result<String> {
        join_group(self, children, " OR ")
    }

    fn visit_not(&self, child: &Node) -> Result<String> {
        Ok(format!("NOT ({})", accept(child, self)?))
    }

    fn visit_comparison(&self, op: CompareOp, left: &Node, right: &Node) -> Result<String> {
        Ok(format!(
            "{} {} {}",
            accept(left, self)?,
            op.as_str(),
            accept(right, self)?
        ))
    }

    fn visit_between(&self, subject: &Node, lower: &Node, upper: &Node) -> Result<String> {
        Ok(format!(
            "{} BETWEEN {} AND {}",
            accept(subject, self)?,
            accept(lower, self)?,
            accept(upper, self)?
        ))
    }

    fn visit_like(&self, subject: &Node, pattern: &str) -> Result<String> {
        Ok(format!("{} LIKE {}", accept(subject, self)?, quoted(pattern)))
    }

    fn visit_in(&self, subject: &Node, values: &[Node]) -> Result<String> {
        let values = values
            .iter()
            .map(|v| accept(v, self))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{} IN ({})", accept(subject, self)?, values.join(", ")))
    }

    fn visit_is_null(&self, subject: &Node) -> Result<String> {
        Ok(format!("{} IS NULL", accept(subject, self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ast::SpatialOp;
    use crate::filter::builder::Builder;
    use crate::filter::error::Error;
    use serde_json::json;

    fn translate(node: &Node) -> Result<String> {
        SqlTranslator.translate(node)
    }

    #[test]
    fn test_string_quoted() {
        assert_eq!(translate(&Node::eq("status", "published")).unwrap(), "status = 'published'");
    }

    #[test]
    fn test_numbers_and_booleans_quoted() {
        let node = Builder::new()
            .gte("gsd", 10)
            .neq("public", false)
            .build()
            .unwrap()
            .unwrap();
        assert_eq!(translate(&node).unwrap(), "(gsd >= '10' AND public <> 'false')");
    }

    #[test]
    fn test_property_operand_unquoted() {
        let node = Node::lt("start", Node::property("end"));
        assert_eq!(translate(&node).unwrap(), "start < end");
    }

    #[test]
    fn test_between_like_in() {
        let node = Node::Or(vec![
            Node::between("temp", 1, 30),
            Node::like("id", "S2%"),
            Node::in_values("platform", vec![Node::from("s2a"), Node::from("s2b")]),
        ]);
        assert_eq!(
            translate(&node).unwrap(),
            "(temp BETWEEN '1' AND '30' OR id LIKE 'S2%' OR platform IN ('s2a', 's2b'))"
        );
    }

    #[test]
    fn test_not_is_null() {
        let node = Node::Not(Box::new(Node::is_null("end_datetime")));
        assert_eq!(translate(&node).unwrap(), "NOT (end_datetime IS NULL)");
    }

    #[test]
    fn test_spatial_unsupported() {
        let point = Node::geometry("Point", json!([1.0, 2.0])).unwrap();
        let err = translate(&Node::spatial(SpatialOp::Within, "geometry", point)).unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedNodeType {
                dialect: "SQL",
                node: "SpatialComparison"
            }
        );
    }
}
