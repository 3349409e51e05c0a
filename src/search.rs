//! Placing a filter into a STAC API search request body.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::filter::{self, Node};

/// A search filter together with its `filter-lang` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filter-lang", content = "filter")]
pub enum Filter {
    /// A pre-rendered CQL2 text expression, passed through untouched.
    #[serde(rename = "cql2-text")]
    Cql2Text(String),
    #[serde(rename = "cql2-json")]
    Cql2Json(Node),
}

impl Filter {
    pub fn lang(&self) -> &'static str {
        match self {
            Filter::Cql2Text(_) => "cql2-text",
            Filter::Cql2Json(_) => "cql2-json",
        }
    }

    fn filter_value(&self) -> Value {
        match self {
            Filter::Cql2Text(text) => Value::String(text.clone()),
            Filter::Cql2Json(node) => filter::to_value(node),
        }
    }
}

impl From<Node> for Filter {
    fn from(node: Node) -> Self {
        Filter::Cql2Json(node)
    }
}

/// Adds `filter` and `filter-lang` to an existing request body, replacing any
/// filter already there. `None` removes both keys.
pub fn search_body(mut body: Map<String, Value>, filter: Option<&Filter>) -> Map<String, Value> {
    match filter {
        Some(filter) => {
            body.insert("filter".to_string(), filter.filter_value());
            body.insert("filter-lang".to_string(), Value::String(filter.lang().to_string()));
        }
        None => {
            body.remove("filter");
            body.remove("filter-lang");
        }
    }
    body
}
