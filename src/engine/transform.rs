//! Rule transforms
//!
//! A [`Transforms`] registry maps rule names to functions that rewrite the
//! tree a rule produced. When a parser carries a registry, the transform for a
//! rule runs right after the rule's winning production is chosen, and its
//! output replaces the raw tree everywhere (including in the memo table).
//!
//! # Example
//!
//! ```rust
//! use tokrat::engine::transform::{flatten, Transforms};
//!
//! let transforms = Transforms::new()
//!     .rule("path", |node| Ok(flatten(node)));
//!
//! assert!(transforms.has_rule("path"));
//! ```

use super::error::TransformError;
use super::token::Token;
use super::tree::ParseNode;
use ahash::RandomState;
use hashbrown::HashMap;
use std::fmt;

/// A boxed transform function
pub type TransformFn = Box<dyn Fn(ParseNode) -> Result<ParseNode, TransformError> + Send + Sync>;

/// Registry of per-rule transforms
pub struct Transforms {
    rules: HashMap<String, TransformFn, RandomState>,
}

impl Transforms {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            rules: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Add a transform for a rule, replacing any earlier one
    pub fn rule<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(ParseNode) -> Result<ParseNode, TransformError> + Send + Sync + 'static,
    {
        self.insert(name, f);
        self
    }

    /// Add a transform for a rule (non-consuming version)
    pub fn insert<F>(&mut self, name: &str, f: F)
    where
        F: Fn(ParseNode) -> Result<ParseNode, TransformError> + Send + Sync + 'static,
    {
        self.rules.insert(name.to_string(), Box::new(f));
    }

    /// Whether a transform is registered for `name`
    #[inline]
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Number of registered transforms
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no transforms are registered
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the transform for `rule` on `node`
    ///
    /// Returns the node unchanged when no transform is registered.
    pub fn apply(&self, rule: &str, node: ParseNode) -> Result<ParseNode, TransformError> {
        match self.rules.get(rule) {
            Some(f) => f(node),
            None => Ok(node),
        }
    }
}

impl Default for Transforms {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Transforms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("Transforms").field("rules", &names).finish()
    }
}

/// Collapse a tree into a flat list of its tokens
pub fn flatten(node: ParseNode) -> ParseNode {
    fn walk(node: ParseNode, out: &mut Vec<ParseNode>) {
        match node {
            ParseNode::Token(_) => out.push(node),
            ParseNode::List(items) => {
                for item in items {
                    walk(item, out);
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(node, &mut out);
    ParseNode::List(out)
}

/// Borrow a node as a list of exactly `len` items
pub fn expect_list(node: &ParseNode, len: usize) -> Result<&[ParseNode], TransformError> {
    match node.as_list() {
        Some(items) if items.len() == len => Ok(items),
        _ => Err(TransformError::UnexpectedShape {
            expected: format!("list of {} items", len),
        }),
    }
}

/// Borrow a node as a token
pub fn expect_token(node: &ParseNode) -> Result<&Token, TransformError> {
    node.as_token().ok_or_else(|| TransformError::UnexpectedShape {
        expected: "token".to_string(),
    })
}
