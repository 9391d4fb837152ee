pub mod ast;
pub mod builder;
pub mod cli;
pub mod codec;
pub mod output;
pub mod parser;
pub mod scanner;
pub mod settings;

pub use ast::{AttributeOperator, BoolOp, Expr, Query, Repeats, Token, XmlTag};
pub use builder::{BuilderError, NodeId, QueryBuilder};
pub use output::{render_tree, to_json, to_json_pretty};
pub use parser::{parse, parse_with_default_attribute, ParseError, Parser};
pub use scanner::Scanner;
pub use settings::{BuilderSettings, SettingsError};
