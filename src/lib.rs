//! tokrat - Packrat Parsing over Token Streams
//!
//! tokrat matches a pre-lexed token sequence against a context-free grammar
//! and returns a nested parse tree. It does no lexing of its own: tokens
//! arrive as `(type, value)` pairs and grammar leaves match either the value
//! (literals) or the type (terminals).
//!
//! - Memoized recursive matching per `(rule, position)`
//! - Longest match among a rule's productions, earliest declared on ties
//! - Optional and greedy-star parts
//! - Grammars from a builder DSL or JSON
//! - Per-rule transforms applied as rules match
//! - Developer tools (tracing, tree printing, grammar diagrams, warnings)
//!
//! ## Quick Start
//!
//! ```rust
//! use tokrat::prelude::*;
//!
//! // decl ::= "int" <IDENT> ";"
//! let grammar = GrammarBuilder::new()
//!     .rule("decl", |r| r.production(|p| p.lit("int").term("IDENT").lit(";")))
//!     .build()
//!     .unwrap();
//!
//! let tokens = vec![
//!     Token::new("KEYWORD", "int"),
//!     Token::new("IDENT", "x"),
//!     Token::new("PUNCT", ";"),
//! ];
//!
//! let mut parser = Parser::new(&grammar);
//! let tree = parser.parse("decl", &tokens).unwrap();
//! assert_eq!(tree.to_string(), r#"[["int"], ["x"], [";"]]"#);
//! ```
//!
//! ## Loading a Grammar from JSON
//!
//! ```rust
//! use tokrat::prelude::*;
//!
//! let grammar = Grammar::from_json(r#"{
//!     "rules": [
//!         { "name": "greeting", "productions": [
//!             { "parts": [ { "items": [ { "Literal": "hello" } ] } ] }
//!         ] }
//!     ]
//! }"#).unwrap();
//!
//! let tokens = Token::list_from_json(r#"[{"type": "WORD", "value": "hello"}]"#).unwrap();
//! assert!(grammar.parse("greeting", &tokens).is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug logging using the `log` crate
//! - `parallel` - Run [`parse_batch`] on the rayon thread pool

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

// Prelude module for convenient imports
pub mod prelude;

// Parsing engine
pub mod engine;

/// Re-export commonly used types for convenience
pub use engine::{
    // Debug tools
    debug::{GrammarVisualizer, ParseTrace, TreePrinter},
    // Grammar DSL
    grammar_builder::{lit, nt, term, GrammarBuilder},
    // Batch parsing
    parallel::{parse_batch, ParallelConfig},
    // Transforms
    transform::Transforms,
    Grammar,
    GrammarError,
    ParseError,
    ParseNode,
    Parser,
    ParserConfig,
    Token,
};
