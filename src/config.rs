/// Trust flags for one level of parsing.
///
/// `allow_dynamic_eval` gates the backtick expressions and remote references of
/// the document being parsed. `allow_remote_dynamic_eval` decides how much trust
/// a document fetched through a remote reference receives; see [`SafetyConfig::for_remote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyConfig {
    pub allow_dynamic_eval: bool,
    pub allow_remote_dynamic_eval: bool,
}

impl SafetyConfig {
    /// Expressions and remote references are honoured at the top level, but
    /// anything fetched remotely is parsed fully safe.
    pub const DEFAULT: SafetyConfig = SafetyConfig {
        allow_dynamic_eval: true,
        allow_remote_dynamic_eval: false,
    };

    /// No evaluation and no network access at any level.
    pub const SAFE: SafetyConfig = SafetyConfig {
        allow_dynamic_eval: false,
        allow_remote_dynamic_eval: false,
    };

    /// Every level, including fetched documents, may evaluate and fetch.
    pub const REMOTE_UNSAFE: SafetyConfig = SafetyConfig {
        allow_dynamic_eval: true,
        allow_remote_dynamic_eval: true,
    };

    /// Whether a `~"uri"` reference at this level may hit the fetcher.
    pub fn allows_fetch(&self) -> bool {
        self.allow_dynamic_eval
    }

    /// The configuration a fetched sub-document is parsed with. Both of its
    /// flags come from the caller's remote trust, never from its own trust.
    pub fn for_remote(&self) -> SafetyConfig {
        SafetyConfig {
            allow_dynamic_eval: self.allow_remote_dynamic_eval,
            allow_remote_dynamic_eval: self.allow_remote_dynamic_eval,
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which token rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Comments, `( )` sets, backtick expressions and `~"uri"` references.
    #[default]
    Extended,
    /// Plain JSON. Parentheses, backticks and slashes are ordinary characters.
    Json,
}

impl Dialect {
    pub fn is_extended(self) -> bool {
        matches!(self, Dialect::Extended)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub dialect: Dialect,
    /// How many remote references may be nested inside each other.
    pub max_remote_depth: usize,
    /// How many containers may be open at once within one document.
    pub max_nesting_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Extended,
            max_remote_depth: 16,
            max_nesting_depth: 128,
        }
    }
}
