use crate::config::Dialect;

/// The tokens produced by the lexer.
///
/// Structural delimiters get their own variants. Everything else is a
/// [`Token::Literal`] whose meaning (quoted string, backtick expression, remote
/// reference or bare literal) is decided later from its content.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // == Structure ==
    /// Left Brace: `{`
    LBrace,
    /// Right Brace: `}`
    RBrace,
    /// Left Bracket: `[`
    LBracket,
    /// Right Bracket: `]`
    RBracket,
    /// Left Parenthesis: `(`, opens a set in the extended dialect
    LParen,
    /// Right Parenthesis: `)`
    RParen,
    /// Colon: `:`
    Colon,
    /// Comma: `,`
    Comma,
    /// A backslash outside of any quoted span.
    Backslash,

    // == Trivia, removed by `strip_trivia` ==
    Newline,
    /// `// ...` or `/* ... */`, including the markers.
    Comment(String),

    /// Any other run of characters, quotes included.
    Literal(String),
}

impl Token {
    /// Returns true for tokens the AST builder never sees.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Newline | Token::Comment(_))
    }
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    dialect: Dialect,
    buffer: String,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, dialect: Dialect) -> Self {
        Self {
            chars: input.chars().peekable(),
            dialect,
            buffer: String::new(),
            tokens: Vec::new(),
        }
    }

    /// Scans the whole input, trivia included.
    pub fn lex(mut self) -> Vec<Token> {
        while let Some(c) = self.chars.next() {
            if self.is_quote(c) {
                self.buffer.push(c);
                self.read_quoted(c);
                continue;
            }

            if self.dialect.is_extended() && c == '/' {
                match self.chars.peek() {
                    Some('/') => {
                        self.flush();
                        let comment = self.read_line_comment();
                        self.tokens.push(Token::Comment(comment));
                        continue;
                    }
                    Some('*') => {
                        self.flush();
                        let comment = self.read_block_comment();
                        self.tokens.push(Token::Comment(comment));
                        continue;
                    }
                    _ => {}
                }
            }

            if let Some(delimiter) = self.delimiter(c) {
                self.flush();
                self.tokens.push(delimiter);
            } else if !c.is_whitespace() {
                self.buffer.push(c);
            }
        }
        // An unterminated quoted span ends up here as one literal.
        self.flush();
        self.tokens
    }

    fn is_quote(&self, c: char) -> bool {
        c == '"' || (c == '`' && self.dialect.is_extended())
    }

    fn delimiter(&self, c: char) -> Option<Token> {
        let token = match c {
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '\\' => Token::Backslash,
            '\n' => Token::Newline,
            '(' if self.dialect.is_extended() => Token::LParen,
            ')' if self.dialect.is_extended() => Token::RParen,
            _ => return None,
        };
        Some(token)
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            self.tokens
                .push(Token::Literal(std::mem::take(&mut self.buffer)));
        }
    }

    /// Accumulates verbatim up to and including the closing `quote`.
    /// A backslash escapes the character after it.
    fn read_quoted(&mut self, quote: char) {
        let mut escaped = false;
        for c in self.chars.by_ref() {
            self.buffer.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                return;
            }
        }
    }

    fn read_line_comment(&mut self) -> String {
        let mut comment = String::from("/");
        while let Some(c) = self.chars.peek() {
            if *c == '\n' {
                break;
            }
            comment.push(*c);
            self.chars.next();
        }
        comment
    }

    /// Reads up to the closing `*/`, or to the end of input if there is none.
    fn read_block_comment(&mut self) -> String {
        let mut comment = String::from("/");
        if let Some(star) = self.chars.next() {
            comment.push(star);
        }
        while let Some(c) = self.chars.next() {
            comment.push(c);
            if c == '*' && self.chars.peek() == Some(&'/') {
                comment.push('/');
                self.chars.next();
                break;
            }
        }
        comment
    }
}

/// Removes newlines and comments, keeping the order of everything else.
pub fn strip_trivia(tokens: Vec<Token>) -> Vec<Token> {
    tokens.into_iter().filter(|t| !t.is_trivia()).collect()
}

/// Lexes `text` and strips trivia.
pub fn tokenize(text: &str, dialect: Dialect) -> Vec<Token> {
    let tokens = strip_trivia(Lexer::new(text, dialect).lex());
    log::debug!("tokenized {} bytes into {} tokens", text.len(), tokens.len());
    tokens
}
