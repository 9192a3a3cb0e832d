pub mod api;
pub mod ast;
pub mod config;
pub mod error;
pub mod eval;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod serialization;
pub mod utils;

pub use api::{parse, parse_json, parse_remote_unsafe, parse_safe, XtJson};
pub use config::{Dialect, ParseOptions, SafetyConfig};
pub use error::{EvaluationError, RemoteFetchError, Result, XtJsonError};
pub use eval::{Evaluator, ExpressionEvaluator};
pub use resolver::{FileFetcher, Fetcher, MemoryFetcher};
pub use serialization::Value;
