//! Token type consumed by the engine
//!
//! Tokens are produced by an external lexer. The engine never creates or
//! mutates them; it only compares the type tag (for terminal leaves) and the
//! literal value (for literal leaves).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A classified token: a type tag plus the literal text it was lexed from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Lexical category, e.g. `"IDENT"`, `"KEYWORD"`, `"PUNCT"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Literal text of the token
    pub value: String,
}

impl Token {
    /// Create a new token
    #[inline]
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Token type tag
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Token literal value
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Parse a JSON array of `{"type": .., "value": ..}` objects
    pub fn list_from_json(s: &str) -> Result<Vec<Token>, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.value)
    }
}
