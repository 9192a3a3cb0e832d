use miette::Diagnostic;
use thiserror::Error;

/// Result type for every parse entry point.
pub type Result<T> = std::result::Result<T, XtJsonError>;

#[derive(Error, Debug, Diagnostic)]
pub enum XtJsonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] RemoteFetchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("Circular remote reference: {cycle}")]
    #[diagnostic(
        code(resolver::circular_reference),
        help("A remote document references itself, directly or through other documents.")
    )]
    CircularReference { cycle: String },

    #[error("Remote reference `{uri}` exceeds the maximum nesting depth of {limit}")]
    #[diagnostic(
        code(resolver::depth_exceeded),
        help("Flatten the chain of remote references or raise `ParseOptions::max_remote_depth`.")
    )]
    RemoteDepthExceeded { uri: String, limit: usize },

    #[error("Containers are nested more than {limit} levels deep")]
    #[diagnostic(
        code(parser::nesting_too_deep),
        help("Flatten the document or raise `ParseOptions::max_nesting_depth`.")
    )]
    NestingTooDeep { limit: usize },
}

#[derive(Error, Debug, Diagnostic)]
#[error("Failed to fetch remote document `{uri}`")]
#[diagnostic(
    code(resolver::fetch_failed),
    help("Check that the referenced document exists and is reachable.")
)]
pub struct RemoteFetchError {
    pub uri: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl RemoteFetchError {
    pub fn new(
        uri: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            uri: uri.into(),
            source: source.into(),
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
#[error("Failed to evaluate `{expression}`: {message}")]
#[diagnostic(
    code(interpreter::evaluation_failed),
    help("Backtick expressions are evaluated when dynamic evaluation is allowed. Use the safe entry point to keep them as text.")
)]
pub struct EvaluationError {
    pub expression: String,
    pub message: String,
}

impl EvaluationError {
    pub fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }
}
