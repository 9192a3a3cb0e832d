use crate::config::{Dialect, ParseOptions, SafetyConfig};
use crate::error::Result;
use crate::eval::{Evaluator, ExpressionEvaluator, NoEvaluator};
use crate::interpreter::Interpreter;
use crate::lexer::tokenize;
use crate::parser::AstBuilder;
use crate::resolver::{FileFetcher, Fetcher, NoFetcher};
use crate::serialization::{to_native, Value};
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A parser together with the capabilities it may call on.
///
/// A session is immutable and can be shared by any number of concurrent
/// parses; each parse owns its own stack, safety flags and reference chain.
#[derive(Clone)]
pub struct XtJson {
    evaluator: Arc<dyn Evaluator>,
    fetcher: Arc<dyn Fetcher>,
    options: ParseOptions,
}

impl XtJson {
    /// The extended dialect with [`ExpressionEvaluator`] and a [`FileFetcher`]
    /// rooted at the current directory.
    pub fn new() -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            evaluator: Arc::new(ExpressionEvaluator),
            fetcher: Arc::new(FileFetcher::new(base_dir)),
            options: ParseOptions::default(),
        }
    }

    /// Plain JSON: no extensions, nothing to evaluate or fetch.
    pub fn strict() -> Self {
        Self {
            evaluator: Arc::new(NoEvaluator),
            fetcher: Arc::new(NoFetcher),
            options: ParseOptions {
                dialect: Dialect::Json,
                ..ParseOptions::default()
            },
        }
    }

    #[must_use]
    pub fn with_evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    #[must_use]
    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator.as_ref()
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    /// Evaluates expressions and follows remote references in `text`, but
    /// parses every fetched document with both disabled.
    ///
    /// # Errors
    /// Returns an `XtJsonError` if an expression cannot be evaluated or a
    /// remote document cannot be fetched.
    pub async fn parse(&self, text: &str) -> Result<Value> {
        self.parse_with(text, SafetyConfig::DEFAULT).await
    }

    /// Never evaluates or fetches: expressions and references come back as
    /// their text.
    ///
    /// # Errors
    /// Infallible in practice for the built-in capabilities; the signature
    /// matches the other entry points.
    pub async fn parse_safe(&self, text: &str) -> Result<Value> {
        self.parse_with(text, SafetyConfig::SAFE).await
    }

    /// Evaluates and fetches at every level, fetched documents included.
    /// Only use this on fully trusted sources.
    ///
    /// # Errors
    /// See [`XtJson::parse`]; additionally reports reference cycles.
    pub async fn parse_remote_unsafe(&self, text: &str) -> Result<Value> {
        self.parse_with(text, SafetyConfig::REMOTE_UNSAFE).await
    }

    /// Parses with explicit safety flags.
    ///
    /// # Errors
    /// See [`XtJson::parse`].
    pub async fn parse_with(&self, text: &str, safety: SafetyConfig) -> Result<Value> {
        parse_document(self, text.to_string(), safety, Vec::new()).await
    }
}

impl Default for XtJson {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for XtJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XtJson")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Runs the whole pipeline on `text`. Boxed, because remote references make it
/// recursive: the interpreter calls back into here for every fetched document.
pub(crate) fn parse_document(
    session: &XtJson,
    text: String,
    safety: SafetyConfig,
    chain: Vec<String>,
) -> BoxFuture<'_, Result<Value>> {
    async move {
        log::debug!(
            "parsing {} bytes at reference depth {} with {safety:?}",
            text.len(),
            chain.len()
        );
        let tokens = tokenize(&text, session.options.dialect);
        let interpreter = Interpreter::with_chain(session, safety, chain);
        let root = AstBuilder::new(interpreter).build(tokens).await?;
        Ok(root.map_or(Value::Null, to_native))
    }
    .boxed()
}

/// [`XtJson::parse`] with the default session.
///
/// # Errors
/// See [`XtJson::parse`].
pub async fn parse(text: &str) -> Result<Value> {
    XtJson::new().parse(text).await
}

/// [`XtJson::parse_safe`] with the default session.
///
/// # Errors
/// See [`XtJson::parse_safe`].
pub async fn parse_safe(text: &str) -> Result<Value> {
    XtJson::new().parse_safe(text).await
}

/// [`XtJson::parse_remote_unsafe`] with the default session.
///
/// # Errors
/// See [`XtJson::parse_remote_unsafe`].
pub async fn parse_remote_unsafe(text: &str) -> Result<Value> {
    XtJson::new().parse_remote_unsafe(text).await
}

/// Parses plain JSON synchronously.
///
/// # Errors
/// Plain JSON never evaluates or fetches, so this only fails if the
/// pipeline itself does.
pub fn parse_json(text: &str) -> Result<Value> {
    futures::executor::block_on(XtJson::strict().parse_safe(text))
}
