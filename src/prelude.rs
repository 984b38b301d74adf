//! Prelude module for convenient imports
//!
//! ```
//! use tokrat::prelude::*;
//! ```
//!
//! # Re-exported Items
//!
//! ## Core Types
//! - [`Token`] - Input token
//! - [`Grammar`] - Grammar definition
//! - [`Parser`] - Matching engine
//! - [`ParserConfig`] - Engine limits and switches
//! - [`ParseNode`] - Parse tree node
//! - [`ParseOutcome`] - Tree plus end position
//!
//! ## Grammar DSL
//! - [`lit()`], [`term()`], [`nt()`] - Leaf constructors
//! - [`GrammarBuilder`] - Builder for constructing grammars
//!
//! ## Error Handling
//! - [`ParseError`], [`GrammarError`], [`TransformError`]
//!
//! ## Transforms
//! - [`Transforms`] - Per-rule transform registry

// ============================================================================
// Core Types
// ============================================================================

pub use crate::engine::{Grammar, ParseNode, ParseOutcome, Parser, ParserConfig, Token};

// ============================================================================
// Grammar DSL
// ============================================================================

pub use crate::engine::grammar_builder::{lit, nt, term, GrammarBuilder};

// ============================================================================
// Error Handling
// ============================================================================

pub use crate::engine::error::{GrammarError, ParseError, TransformError};

// ============================================================================
// Transforms
// ============================================================================

pub use crate::engine::transform::Transforms;
