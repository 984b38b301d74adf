//! Error types for the matching engine
//!
//! Structural failure ("nothing matched here") is the normal outcome of most
//! matching attempts and is carried internally as `Ok(None)`. Only the
//! top-level entry points turn it into [`ParseError::NoMatch`]. Every other
//! variant describes a broken grammar or an exhausted resource and aborts the
//! parse wherever it is raised.

use std::fmt;

/// Error type for parse operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No production of the start rule matched the token stream
    NoMatch,

    /// A rule name was looked up but is not defined in the grammar
    UnknownRule {
        /// The missing rule name
        name: String,
    },

    /// A rule was re-entered at the same position while it was still being resolved
    LeftRecursion {
        /// The rule that recursed without consuming tokens
        rule: String,
        /// Token index where the cycle was detected
        position: usize,
    },

    /// Nested rule resolutions exceeded the configured limit
    RecursionLimitExceeded {
        /// Depth reached
        depth: usize,
        /// Maximum allowed depth
        max_depth: usize,
    },

    /// The start rule matched but did not consume every token
    Incomplete {
        /// Number of tokens consumed by the match
        consumed: usize,
        /// Total number of tokens
        total: usize,
    },

    /// A registered transform rejected the tree produced for its rule
    Transform {
        /// Rule whose transform failed
        rule: String,
        /// The transform's error
        source: TransformError,
    },
}

impl ParseError {
    /// Whether this is the plain structural failure (as opposed to a grammar or resource error)
    #[inline]
    pub fn is_no_match(&self) -> bool {
        matches!(self, ParseError::NoMatch)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NoMatch => write!(f, "No production matched the input"),
            ParseError::UnknownRule { name } => {
                write!(f, "Unknown rule {:?} referenced in grammar", name)
            }
            ParseError::LeftRecursion { rule, position } => write!(
                f,
                "Left recursion: rule {:?} re-entered at token {} without consuming input",
                rule, position
            ),
            ParseError::RecursionLimitExceeded { depth, max_depth } => write!(
                f,
                "Recursion limit exceeded: depth {} exceeds limit of {}",
                depth, max_depth
            ),
            ParseError::Incomplete { consumed, total } => write!(
                f,
                "Parse incomplete: consumed {} of {} tokens",
                consumed, total
            ),
            ParseError::Transform { rule, source } => {
                write!(f, "Transform for rule {:?} failed: {}", rule, source)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Transform { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised while constructing or loading a grammar
#[derive(Debug)]
pub enum GrammarError {
    /// Two rules share a name
    DuplicateRule {
        /// The repeated name
        name: String,
    },

    /// The grammar JSON could not be read or a part's quantifier was malformed
    Json(serde_json::Error),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::DuplicateRule { name } => write!(f, "Duplicate rule {:?}", name),
            GrammarError::Json(e) => write!(f, "Invalid grammar JSON: {}", e),
        }
    }
}

impl std::error::Error for GrammarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GrammarError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GrammarError {
    fn from(e: serde_json::Error) -> Self {
        GrammarError::Json(e)
    }
}

/// Error returned by a rule transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The tree did not have the shape the transform expected
    UnexpectedShape {
        /// What the transform expected
        expected: String,
    },
    /// Free-form failure
    Custom(String),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::UnexpectedShape { expected } => {
                write!(f, "Unexpected tree shape, expected {}", expected)
            }
            TransformError::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TransformError {}
