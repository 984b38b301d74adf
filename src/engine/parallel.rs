//! Batch parsing of independent token streams
//!
//! A [`Parser`] owns its memo table, so the way to use one grammar from many
//! threads is one parser per input. [`parse_batch`] does exactly that, on the
//! rayon pool when the `parallel` feature is enabled and sequentially
//! otherwise. Results come back in input order either way.
//!
//! ```toml
//! [dependencies]
//! tokrat = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! # Example
//!
//! ```rust
//! use tokrat::engine::grammar_builder::GrammarBuilder;
//! use tokrat::engine::parallel::parse_batch;
//! use tokrat::engine::token::Token;
//!
//! let grammar = GrammarBuilder::new()
//!     .rule("s", |r| r.production(|p| p.lit("hello")))
//!     .build()
//!     .unwrap();
//!
//! let inputs = vec![
//!     vec![Token::new("WORD", "hello")],
//!     vec![Token::new("WORD", "bye")],
//! ];
//! let results = parse_batch(&grammar, "s", &inputs);
//! assert!(results[0].is_ok());
//! assert!(results[1].is_err());
//! ```

use super::error::ParseError;
use super::grammar::Grammar;
use super::parser::{Parser, ParserConfig};
use super::token::Token;
use super::tree::ParseNode;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Configuration for batch parsing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of threads to use (None = rayon's global pool)
    pub num_threads: Option<usize>,
    /// Minimum number of inputs handed to one rayon task
    pub min_chunk_size: usize,
    /// Configuration for every per-input parser
    pub parser: ParserConfig,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            min_chunk_size: 1,
            parser: ParserConfig::default(),
        }
    }
}

impl ParallelConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of threads to use
    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Set the minimum chunk size for parallel processing
    pub fn with_min_chunk_size(mut self, size: usize) -> Self {
        self.min_chunk_size = size;
        self
    }

    /// Set the per-input parser configuration
    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.parser = config;
        self
    }
}

/// Parse every token stream from `start` with default settings
///
/// Equivalent to calling [`Parser::parse`] on each input with a fresh parser.
pub fn parse_batch(
    grammar: &Grammar,
    start: &str,
    inputs: &[Vec<Token>],
) -> Vec<Result<ParseNode, ParseError>> {
    parse_batch_with_config(grammar, start, inputs, &ParallelConfig::new())
}

/// Parse every token stream from `start` with explicit settings
#[cfg(feature = "rayon")]
pub fn parse_batch_with_config(
    grammar: &Grammar,
    start: &str,
    inputs: &[Vec<Token>],
    config: &ParallelConfig,
) -> Vec<Result<ParseNode, ParseError>> {
    let run = || -> Vec<Result<ParseNode, ParseError>> {
        inputs
            .par_iter()
            .with_min_len(config.min_chunk_size.max(1))
            .map(|tokens| parse_one(grammar, start, tokens, config.parser))
            .collect()
    };

    match config.num_threads {
        Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(run),
            Err(_) => run(),
        },
        None => run(),
    }
}

/// Parse every token stream from `start` sequentially (fallback when rayon is not available)
#[cfg(not(feature = "rayon"))]
pub fn parse_batch_with_config(
    grammar: &Grammar,
    start: &str,
    inputs: &[Vec<Token>],
    config: &ParallelConfig,
) -> Vec<Result<ParseNode, ParseError>> {
    inputs
        .iter()
        .map(|tokens| parse_one(grammar, start, tokens, config.parser))
        .collect()
}

#[inline]
fn parse_one(
    grammar: &Grammar,
    start: &str,
    tokens: &[Token],
    config: ParserConfig,
) -> Result<ParseNode, ParseError> {
    Parser::with_config(grammar, config).parse(start, tokens)
}

#[cfg(test)]
mod tests {
    use super::super::grammar_builder::GrammarBuilder;
    use super::*;

    fn word(v: &str) -> Vec<Token> {
        vec![Token::new("WORD", v)]
    }

    #[test]
    fn test_parse_batch_keeps_order() {
        let grammar = GrammarBuilder::new()
            .rule("s", |r| r.production(|p| p.lit("hello")))
            .build()
            .unwrap();

        let inputs = vec![word("hello"), word("nope"), word("hello")];
        let results = parse_batch(&grammar, "s", &inputs);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(ParseError::NoMatch));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_parse_batch_empty() {
        let grammar = GrammarBuilder::new()
            .rule("s", |r| r.production(|p| p.lit("x")))
            .build()
            .unwrap();
        assert!(parse_batch(&grammar, "s", &[]).is_empty());
    }

    #[test]
    fn test_parse_batch_applies_parser_config() {
        let grammar = GrammarBuilder::new()
            .rule("s", |r| r.production(|p| p.nt("t")))
            .rule("t", |r| r.production(|p| p.lit("x")))
            .build()
            .unwrap();

        let config = ParallelConfig::new()
            .with_num_threads(2)
            .with_min_chunk_size(4)
            .with_parser_config(ParserConfig::new().with_max_recursion_depth(1));
        let results = parse_batch_with_config(&grammar, "s", &[word("x")], &config);

        assert_eq!(
            results,
            vec![Err(ParseError::RecursionLimitExceeded {
                depth: 2,
                max_depth: 1
            })]
        );
    }

    #[test]
    fn test_config_builders() {
        let config = ParallelConfig::new().with_num_threads(4).with_min_chunk_size(10);
        assert_eq!(config.num_threads, Some(4));
        assert_eq!(config.min_chunk_size, 10);
        assert_eq!(config.parser, ParserConfig::default());
    }
}
