use crate::api::XtJson;
use crate::config::{ParseOptions, SafetyConfig};
use crate::error::Result;
use crate::resolver::Resolver;
use crate::serialization::Value;
use crate::utils::{
    bookmarked_by, coerce_number, decode_escapes, is_remote_reference, strip_quotes, unbookmark,
};

/// Works out what a single literal token means.
pub struct Interpreter<'a> {
    session: &'a XtJson,
    safety: SafetyConfig,
    resolver: Resolver<'a>,
}

impl<'a> Interpreter<'a> {
    pub fn new(session: &'a XtJson, safety: SafetyConfig) -> Self {
        Self::with_chain(session, safety, Vec::new())
    }

    pub(crate) fn with_chain(session: &'a XtJson, safety: SafetyConfig, chain: Vec<String>) -> Self {
        Self {
            session,
            safety,
            resolver: Resolver::new(session, chain),
        }
    }

    pub fn safety(&self) -> SafetyConfig {
        self.safety
    }

    pub fn options(&self) -> &'a ParseOptions {
        self.session.options()
    }

    /// Resolves `token` to a value. The first matching rule wins:
    ///
    /// 1. `null`, `true`, `false`.
    /// 2. Anything containing a backslash is an escaped string.
    /// 3. `` `expr` `` is evaluated, or kept as text when evaluation is off.
    /// 4. `~"uri"` is fetched and parsed, or kept as text when fetching is off.
    /// 5. A quoted string, or a bare literal that is a number if it looks like one.
    pub async fn interpret(&self, token: &str) -> Result<Value> {
        match token {
            "null" => return Ok(Value::Null),
            "true" => return Ok(Value::Boolean(true)),
            "false" => return Ok(Value::Boolean(false)),
            _ => {}
        }

        if token.contains('\\') {
            return Ok(Value::String(decode_escapes(unbookmark(token, 1, 1))));
        }

        if self.session.options().dialect.is_extended() {
            if bookmarked_by(token, '`') {
                return self.evaluate(unbookmark(token, 1, 1));
            }

            if is_remote_reference(token) {
                let uri = unbookmark(token, 2, 1);
                if !self.safety.allows_fetch() {
                    return Ok(Value::String(uri.to_string()));
                }
                return self.resolver.resolve(uri, self.safety).await;
            }
        }

        if token.contains('"') {
            return Ok(Value::String(strip_quotes(token)));
        }
        Ok(coerce_number(token).map_or_else(|| Value::String(token.to_string()), Value::Number))
    }

    fn evaluate(&self, source: &str) -> Result<Value> {
        if !self.safety.allow_dynamic_eval {
            return Ok(Value::String(source.to_string()));
        }
        log::debug!("evaluating `{source}`");
        Ok(self.session.evaluator().evaluate(source)?)
    }
}
