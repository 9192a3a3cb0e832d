use crate::ast::{AstNode, ContainerKind};
use crate::error::{Result, XtJsonError};
use crate::interpreter::Interpreter;
use crate::lexer::Token;
use crate::serialization::Value;
use crate::utils::key_text;

/// Folds a token stream into a tree with an explicit stack of open containers.
///
/// The builder is permissive: a closing delimiter that does not match the
/// innermost open container is ignored, and containers left open at the end
/// of input are dropped. Only a failing expression or remote reference, or
/// nesting deeper than `ParseOptions::max_nesting_depth`, makes it return an
/// error.
pub struct AstBuilder<'a> {
    interpreter: Interpreter<'a>,
    stack: Vec<AstNode>,
    root: Option<AstNode>,
    // A scalar read before any container; the result if no container follows.
    bare: Option<Value>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(interpreter: Interpreter<'a>) -> Self {
        Self {
            interpreter,
            stack: Vec::new(),
            root: None,
            bare: None,
        }
    }

    /// Consumes every token in order, suspending on remote references.
    /// Returns `None` for input without any value.
    pub async fn build(mut self, tokens: Vec<Token>) -> Result<Option<AstNode>> {
        for token in tokens {
            log::trace!("processing {token:?} at depth {}", self.stack.len());
            match token {
                Token::Colon | Token::Comma | Token::Backslash => {}
                Token::Newline | Token::Comment(_) => {}
                Token::LBrace => self.open(ContainerKind::Object)?,
                Token::LBracket => self.open(ContainerKind::Array)?,
                Token::LParen => self.open(ContainerKind::Set)?,
                Token::RBrace => self.close(ContainerKind::Object),
                Token::RBracket => self.close(ContainerKind::Array),
                Token::RParen => self.close(ContainerKind::Set),
                // Keys only ever use their text, so they are never evaluated or fetched.
                Token::Literal(text) if self.expects_key() => self.put_key(&text),
                Token::Literal(text) => {
                    let value = self.interpreter.interpret(&text).await?;
                    self.put_scalar(&text, value);
                }
            }
        }
        Ok(self.finish())
    }

    fn expects_key(&self) -> bool {
        matches!(self.stack.last(), Some(AstNode::Object(object)) if object.pending_key.is_none())
    }

    fn put_key(&mut self, text: &str) {
        if let Some(AstNode::Object(object)) = self.stack.last_mut() {
            object.pending_key = Some(key_text(text));
        }
    }

    fn open(&mut self, kind: ContainerKind) -> Result<()> {
        let limit = self.interpreter.options().max_nesting_depth;
        if self.stack.len() >= limit {
            return Err(XtJsonError::NestingTooDeep { limit });
        }
        self.stack.push(AstNode::empty(kind));
        Ok(())
    }

    fn close(&mut self, kind: ContainerKind) {
        if self.stack.last().and_then(AstNode::kind) != Some(kind) {
            log::warn!("ignoring closing delimiter of {kind:?}: it does not match the open container");
            return;
        }
        if let Some(node) = self.stack.pop() {
            self.fold(node);
        }
    }

    fn fold(&mut self, node: AstNode) {
        match self.stack.last_mut() {
            Some(parent) => put_subvalue(parent, node),
            None if self.root.is_none() => self.root = Some(node),
            None => log::warn!("discarding {:?} found after the root container", node.kind()),
        }
    }

    fn put_scalar(&mut self, text: &str, value: Value) {
        match self.stack.last_mut() {
            Some(parent) => put_subvalue(parent, AstNode::Scalar(value)),
            None if self.root.is_none() && self.bare.is_none() => self.bare = Some(value),
            None => log::warn!("discarding value `{text}` outside of the root container"),
        }
    }

    fn finish(self) -> Option<AstNode> {
        if let Some(root) = self.root {
            return Some(root);
        }
        if self.stack.len() > 1 {
            log::warn!(
                "input ended with {} unclosed containers; keeping the outermost",
                self.stack.len()
            );
        }
        match self.stack.into_iter().next() {
            Some(unclosed_root) => Some(unclosed_root),
            None => self.bare.map(AstNode::Scalar),
        }
    }
}

/// Inserts a value into the container `parent`. An object binds it under its
/// pending key; with no pending key there is nowhere to put it, which only
/// happens for a container written in key position.
fn put_subvalue(parent: &mut AstNode, node: AstNode) {
    match parent {
        AstNode::Array(array) => array.edges.push(node),
        AstNode::Set(set) => set.add(node),
        AstNode::Object(object) => match object.pending_key.take() {
            Some(key) => object.bind(key, node),
            None => log::warn!("discarding {:?} in object key position", node.kind()),
        },
        AstNode::Scalar(_) => {}
    }
}
