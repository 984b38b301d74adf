//! Token-stream parsing engine
//!
//! # Module Organization
//!
//! ## Core Types
//! - [`Token`] - Pre-lexed input token (type tag + literal value)
//! - [`Grammar`] - Rules, productions, parts and leaves
//! - [`Parser`] - Memoized longest-match engine
//! - [`ParseNode`] - Parse tree node
//!
//! ## Grammar Construction
//! - [`grammar_builder`] - Fluent builder DSL
//! - [`grammar_analysis`] - Static warnings (left recursion, unknown rules, ...)
//!
//! ## Caching
//! - [`MemoTable`] - Packrat memo table keyed by rule and position
//!
//! ## Transforms
//! - [`transform`] - Per-rule tree rewriting
//!
//! ## Developer Tools
//! - [`debug`] - Tracing, tree printing, grammar diagrams
//!
//! ## Batch Parsing
//! - [`parallel`] - One parser per input, on rayon when enabled

// ============================================================================
// Module Declarations
// ============================================================================

pub mod cache;
pub mod debug;
pub mod error;
pub mod grammar;
pub mod grammar_analysis;
pub mod grammar_builder;
pub mod parser;
pub mod token;
pub mod transform;
pub mod tree;

// Batch parsing (always available, uses rayon when feature is enabled)
pub mod parallel;

// ============================================================================
// Core Types
// ============================================================================

pub use grammar::{Grammar, Leaf, Part, Production, Quantifier, Rule};
pub use parser::{Match, MatchResult, Parser, ParserConfig, DEFAULT_MAX_RECURSION_DEPTH};
pub use token::Token;
pub use tree::{ParseNode, ParseOutcome};

// ============================================================================
// Error Handling
// ============================================================================

pub use error::{GrammarError, ParseError, TransformError};

// ============================================================================
// Grammar Construction
// ============================================================================

pub use grammar_analysis::{GrammarAnalyzer, GrammarWarning, WarningKind};
pub use grammar_builder::{lit, nt, term, GrammarBuilder, ProductionBuilder, RuleBuilder};

// ============================================================================
// Caching
// ============================================================================

pub use cache::{CacheStats, MemoEntry, MemoKey, MemoTable};

// ============================================================================
// Transforms
// ============================================================================

pub use transform::{expect_list, expect_token, flatten, TransformFn, Transforms};

// ============================================================================
// Developer Tools
// ============================================================================

pub use debug::{GrammarVisualizer, ParseTrace, TraceAction, TraceEntry, TreePrinter};

// ============================================================================
// Batch Parsing
// ============================================================================

pub use parallel::{parse_batch, parse_batch_with_config, ParallelConfig};
