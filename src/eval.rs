//! The dynamic evaluation capability behind backtick expressions.
//!
//! The interpreter only ever talks to the [`Evaluator`] trait. The crate ships
//! [`ExpressionEvaluator`], a small side-effect free expression language, so that
//! the default entry points work without a host-provided evaluator.

use crate::error::EvaluationError;
use crate::serialization::{format_number, Value};
use crate::utils::decode_escapes;

/// Turns the text between two backticks into a value.
pub trait Evaluator: Send + Sync {
    /// # Errors
    /// Returns an `EvaluationError` if `source` cannot be evaluated. The error
    /// aborts the whole parse.
    fn evaluate(&self, source: &str) -> Result<Value, EvaluationError>;
}

/// Refuses every expression.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEvaluator;

impl Evaluator for NoEvaluator {
    fn evaluate(&self, source: &str) -> Result<Value, EvaluationError> {
        Err(EvaluationError::new(source, "dynamic evaluation is not available"))
    }
}

/// Arithmetic, comparison, logic and string concatenation over literals.
///
/// ```text
/// Expr    ::= Or [ "?" Expr ":" Expr ]
/// Or      ::= And { "||" And }
/// And     ::= Eq { "&&" Eq }
/// Eq      ::= Cmp { ( "==" | "!=" ) Cmp }
/// Cmp     ::= Add { ( "<" | "<=" | ">" | ">=" ) Add }
/// Add     ::= Mul { ( "+" | "-" ) Mul }
/// Mul     ::= Unary { ( "*" | "/" | "%" ) Unary }
/// Unary   ::= ( "-" | "+" | "!" ) Unary | Primary
/// Primary ::= Number | String | "true" | "false" | "null" | "Infinity" | "NaN"
///           | "(" Expr ")" | "[" [ Expr { "," Expr } ] "]"
/// ```
///
/// Expressions nest at most [`MAX_EXPR_DEPTH`] levels deep.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpressionEvaluator;

impl Evaluator for ExpressionEvaluator {
    fn evaluate(&self, source: &str) -> Result<Value, EvaluationError> {
        let tokens = ExprLexer::new(source)
            .lex()
            .map_err(|message| EvaluationError::new(source, message))?;
        let expr = ExprParser::new(tokens)
            .parse()
            .map_err(|message| EvaluationError::new(source, message))?;
        eval(&expr).map_err(|message| EvaluationError::new(source, message))
    }
}

#[derive(Debug, PartialEq, Clone)]
enum ExprToken {
    Number(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
}

/// How deep parentheses, lists, operator chains and conditionals may nest.
pub const MAX_EXPR_DEPTH: usize = 256;

// Longest operators first so `<=` is not read as `<` `=`.
const OPERATORS: [&str; 21] = [
    "==", "!=", "<=", ">=", "&&", "||", "+", "-", "*", "/", "%", "<", ">", "!", "?", ":", "(",
    ")", "[", "]", ",",
];

struct ExprLexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> ExprLexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn lex(mut self) -> Result<Vec<ExprToken>, String> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.position += c.len_utf8();
            } else if c.is_ascii_digit() || (c == '.' && self.next_is_digit()) {
                tokens.push(self.read_number()?);
            } else if c == '"' || c == '\'' {
                tokens.push(self.read_string(c)?);
            } else if c.is_alphabetic() || c == '_' || c == '$' {
                tokens.push(self.read_identifier());
            } else if let Some(op) = OPERATORS.iter().find(|op| self.rest().starts_with(**op)) {
                self.position += op.len();
                tokens.push(ExprToken::Op(*op));
            } else {
                return Err(format!("unexpected character '{c}'"));
            }
        }
        Ok(tokens)
    }

    fn next_is_digit(&self) -> bool {
        self.rest().chars().nth(1).is_some_and(|c| c.is_ascii_digit())
    }

    fn read_number(&mut self) -> Result<ExprToken, String> {
        let start = self.position;
        let mut has_exponent = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                self.position += 1;
            } else if (c == 'e' || c == 'E') && !has_exponent {
                has_exponent = true;
                self.position += 1;
                if matches!(self.peek(), Some('+' | '-')) {
                    self.position += 1;
                }
            } else {
                break;
            }
        }
        let text = &self.input[start..self.position];
        text.parse::<f64>()
            .map(ExprToken::Number)
            .map_err(|_| format!("invalid number '{text}'"))
    }

    fn read_string(&mut self, quote: char) -> Result<ExprToken, String> {
        self.position += 1;
        let start = self.position;
        let mut escaped = false;
        while let Some(c) = self.peek() {
            self.position += c.len_utf8();
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                let raw = &self.input[start..self.position - 1];
                return Ok(ExprToken::Str(decode_escapes(raw)));
            }
        }
        Err("unterminated string".to_string())
    }

    fn read_identifier(&mut self) -> ExprToken {
        let start = self.position;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.position += c.len_utf8();
            } else {
                break;
            }
        }
        ExprToken::Ident(self.input[start..self.position].to_string())
    }
}

#[derive(Debug, PartialEq, Clone)]
enum Expr {
    Literal(Value),
    List(Vec<Expr>),
    Unary(&'static str, Box<Expr>),
    Binary(&'static str, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

struct ExprParser {
    tokens: Vec<ExprToken>,
    position: usize,
    // Bounds the depth of the tree, and with it every later recursion over it.
    depth: usize,
}

impl ExprParser {
    fn new(tokens: Vec<ExprToken>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> Result<Expr, String> {
        if self.tokens.is_empty() {
            return Err("empty expression".to_string());
        }
        let expr = self.parse_expr()?;
        match self.tokens.get(self.position) {
            None => Ok(expr),
            Some(token) => Err(format!("unexpected {} after expression", describe(token))),
        }
    }

    // === Helpers ===

    fn match_op(&mut self, ops: &[&'static str]) -> Option<&'static str> {
        match self.tokens.get(self.position) {
            Some(ExprToken::Op(op)) if ops.contains(op) => {
                self.position += 1;
                Some(*op)
            }
            _ => None,
        }
    }

    fn expect_op(&mut self, op: &'static str) -> Result<(), String> {
        match self.match_op(&[op]) {
            Some(_) => Ok(()),
            None => match self.tokens.get(self.position) {
                Some(token) => Err(format!("expected '{op}', found {}", describe(token))),
                None => Err(format!("expected '{op}', found end of expression")),
            },
        }
    }

    fn enter(&mut self) -> Result<(), String> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err("expression nested too deeply".to_string());
        }
        self.depth += 1;
        Ok(())
    }

    fn binary_level(
        &mut self,
        ops: &[&'static str],
        next: fn(&mut Self) -> Result<Expr, String>,
    ) -> Result<Expr, String> {
        let mut left = next(self)?;
        let mut chained = 0;
        while let Some(op) = self.match_op(ops) {
            self.enter()?;
            chained += 1;
            let right = next(self)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth -= chained;
        Ok(left)
    }

    // === Grammar ===

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.enter()?;
        let expr = self.parse_conditional()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_conditional(&mut self) -> Result<Expr, String> {
        let condition = self.parse_or()?;
        if self.match_op(&["?"]).is_none() {
            return Ok(condition);
        }
        let then = self.parse_expr()?;
        self.expect_op(":")?;
        let otherwise = self.parse_expr()?;
        Ok(Expr::Conditional(
            Box::new(condition),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        self.binary_level(&["||"], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        self.binary_level(&["&&"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expr, String> {
        self.binary_level(&["==", "!="], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Result<Expr, String> {
        self.binary_level(&["<=", ">=", "<", ">"], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        self.binary_level(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        self.binary_level(&["*", "/", "%"], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        let Some(op) = self.match_op(&["-", "+", "!"]) else {
            return self.parse_primary();
        };
        self.enter()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or_else(|| "unexpected end of expression".to_string())?;
        self.position += 1;

        match token {
            ExprToken::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            ExprToken::Str(s) => Ok(Expr::Literal(Value::String(s))),
            ExprToken::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Literal(Value::Boolean(true))),
                "false" => Ok(Expr::Literal(Value::Boolean(false))),
                "null" => Ok(Expr::Literal(Value::Null)),
                "Infinity" => Ok(Expr::Literal(Value::Number(f64::INFINITY))),
                "NaN" => Ok(Expr::Literal(Value::Number(f64::NAN))),
                _ => Err(format!("unknown identifier '{name}'")),
            },
            ExprToken::Op("(") => {
                let inner = self.parse_expr()?;
                self.expect_op(")")?;
                Ok(inner)
            }
            ExprToken::Op("[") => {
                let mut items = Vec::new();
                if self.match_op(&["]"]).is_some() {
                    return Ok(Expr::List(items));
                }
                loop {
                    items.push(self.parse_expr()?);
                    if self.match_op(&[","]).is_none() {
                        break;
                    }
                }
                self.expect_op("]")?;
                Ok(Expr::List(items))
            }
            other => Err(format!("unexpected {}", describe(&other))),
        }
    }
}

fn describe(token: &ExprToken) -> String {
    match token {
        ExprToken::Number(n) => format!("number {}", format_number(*n)),
        ExprToken::Str(s) => format!("string {s:?}"),
        ExprToken::Ident(name) => format!("identifier '{name}'"),
        ExprToken::Op(op) => format!("'{op}'"),
    }
}

fn eval(expr: &Expr) -> Result<Value, String> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::List(items) => items.iter().map(eval).collect::<Result<_, _>>().map(Value::Array),
        Expr::Conditional(condition, then, otherwise) => {
            if truthy(&eval(condition)?) {
                eval(then)
            } else {
                eval(otherwise)
            }
        }
        Expr::Unary(op, operand) => {
            let value = eval(operand)?;
            match (*op, &value) {
                ("!", _) => Ok(Value::Boolean(!truthy(&value))),
                ("-", Value::Number(n)) => Ok(Value::Number(-n)),
                ("+", Value::Number(n)) => Ok(Value::Number(*n)),
                _ => Err(format!("cannot apply '{op}' to {}", type_name(&value))),
            }
        }
        // Logical operators short-circuit and yield an operand, not a boolean.
        Expr::Binary("&&", left, right) => {
            let left = eval(left)?;
            if truthy(&left) {
                eval(right)
            } else {
                Ok(left)
            }
        }
        Expr::Binary("||", left, right) => {
            let left = eval(left)?;
            if truthy(&left) {
                Ok(left)
            } else {
                eval(right)
            }
        }
        Expr::Binary(op, left, right) => binary(op, eval(left)?, eval(right)?),
    }
}

fn binary(op: &str, left: Value, right: Value) -> Result<Value, String> {
    match (op, &left, &right) {
        ("==", _, _) => Ok(Value::Boolean(left == right)),
        ("!=", _, _) => Ok(Value::Boolean(left != right)),
        ("+", Value::String(_), _) | ("+", _, Value::String(_)) => {
            Ok(Value::String(format!("{}{}", to_text(&left), to_text(&right))))
        }
        (_, Value::Number(a), Value::Number(b)) => {
            let (a, b) = (*a, *b);
            let value = match op {
                "+" => Value::Number(a + b),
                "-" => Value::Number(a - b),
                "*" => Value::Number(a * b),
                "/" => Value::Number(a / b),
                "%" => Value::Number(a % b),
                "<" => Value::Boolean(a < b),
                "<=" => Value::Boolean(a <= b),
                ">" => Value::Boolean(a > b),
                ">=" => Value::Boolean(a >= b),
                _ => return Err(format!("unsupported operator '{op}'")),
            };
            Ok(value)
        }
        ("<" | "<=" | ">" | ">=", Value::String(a), Value::String(b)) => Ok(Value::Boolean(match op {
            "<" => a < b,
            "<=" => a <= b,
            ">" => a > b,
            _ => a >= b,
        })),
        _ => Err(format!(
            "cannot apply '{op}' to {} and {}",
            type_name(&left),
            type_name(&right)
        )),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Set(_) | Value::Object(_) => true,
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(*n),
        Value::Array(items) => items.iter().map(to_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Boolean(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Set(_) => "a set",
        Value::Object(_) => "an object",
    }
}
