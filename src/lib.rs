//! CQL2-JSON filters for STAC API search: parse documents into a typed tree,
//! assemble trees with [`filter::Builder`], serialize them back to canonical
//! JSON, and translate them into OData- or SQL-style text.

pub mod filter;
pub mod search;

pub use filter::{Builder, Error, Node, Result};
pub use search::Filter;
