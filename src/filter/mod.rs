pub mod ast;
pub mod builder;
pub mod error;
pub mod parser;
pub mod serialize;
pub mod translate;
pub mod validate;

pub use ast::{ArrayOp, CompareOp, Geometry, Interval, Literal, Node, SpatialOp, TemporalOp};
pub use builder::Builder;
pub use error::{Error, Result};
pub use parser::{parse, parse_str, parse_value};
pub use serialize::{to_string, to_value};
pub use translate::{Dialect, ODataTranslator, SqlTranslator, Visitor};
