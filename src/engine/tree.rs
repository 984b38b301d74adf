//! Parse tree types
//!
//! The tree mirrors the grammar's shape: a rule yields its winning
//! production's list, a production yields one entry per part, and so on down
//! to single tokens. [`ParseNode::Token`] is always a raw matched token;
//! everything produced by a nonterminal, a production or a part is a
//! [`ParseNode::List`].

use super::token::Token;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the parse tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseNode {
    /// A token matched by a literal or terminal leaf
    Token(Token),
    /// An ordered group of child results
    List(Vec<ParseNode>),
}

impl ParseNode {
    /// Create a token node
    #[inline]
    pub fn token(token: Token) -> Self {
        ParseNode::Token(token)
    }

    /// Create a list node
    #[inline]
    pub fn list(items: Vec<ParseNode>) -> Self {
        ParseNode::List(items)
    }

    /// Create an empty list node (an absent optional part, or a star part with no repetitions)
    #[inline]
    pub fn empty() -> Self {
        ParseNode::List(Vec::new())
    }

    /// Get as token
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            ParseNode::Token(t) => Some(t),
            ParseNode::List(_) => None,
        }
    }

    /// Get as list
    pub fn as_list(&self) -> Option<&[ParseNode]> {
        match self {
            ParseNode::List(items) => Some(items),
            ParseNode::Token(_) => None,
        }
    }

    /// Consume into list items
    pub fn into_list(self) -> Option<Vec<ParseNode>> {
        match self {
            ParseNode::List(items) => Some(items),
            ParseNode::Token(_) => None,
        }
    }

    /// Check if this is a token
    #[inline]
    pub fn is_token(&self) -> bool {
        matches!(self, ParseNode::Token(_))
    }

    /// Child at `index` if this is a list
    pub fn get(&self, index: usize) -> Option<&ParseNode> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// All tokens under this node, left to right
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        match self {
            ParseNode::Token(t) => out.push(t),
            ParseNode::List(items) => {
                for item in items {
                    item.collect_tokens(out);
                }
            }
        }
    }

    /// Number of tokens under this node
    pub fn token_count(&self) -> usize {
        match self {
            ParseNode::Token(_) => 1,
            ParseNode::List(items) => items.iter().map(ParseNode::token_count).sum(),
        }
    }

    /// Nesting depth (a token has depth 0)
    pub fn depth(&self) -> usize {
        match self {
            ParseNode::Token(_) => 0,
            ParseNode::List(items) => 1 + items.iter().map(ParseNode::depth).max().unwrap_or(0),
        }
    }
}

impl From<Token> for ParseNode {
    fn from(token: Token) -> Self {
        ParseNode::Token(token)
    }
}

impl From<Vec<ParseNode>> for ParseNode {
    fn from(items: Vec<ParseNode>) -> Self {
        ParseNode::List(items)
    }
}

/// Compact bracketed rendering: `[["a", "b"]]`
impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseNode::Token(t) => write!(f, "{:?}", t.value),
            ParseNode::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A successful top-level parse together with how far it got
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// The parse tree
    pub tree: ParseNode,
    /// Index of the first token not consumed
    pub end_pos: usize,
}

impl ParseOutcome {
    /// Whether every one of `total` tokens was consumed
    #[inline]
    pub fn is_complete(&self, total: usize) -> bool {
        self.end_pos == total
    }
}
