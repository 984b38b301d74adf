//! Token-stream matching engine
//!
//! [`Parser`] resolves a start rule against a slice of tokens. Resolution is
//! recursive and memoized per `(rule, position)`:
//!
//! - a **leaf** matches one token (literal value or type tag) or delegates to
//!   a rule (nonterminal);
//! - a **part** matches its leaf sequence once, optionally, or greedily zero
//!   or more times, never giving repetitions back;
//! - a **production** matches its parts left to right with no backtracking
//!   into earlier parts;
//! - a **rule** tries every production and keeps the one that ends furthest,
//!   the earliest declared winning ties.
//!
//! Structural failure travels as `Ok(None)`; `Err` is reserved for grammar and
//! resource errors, which abort the whole parse.

use super::{
    cache::{CacheStats, MemoEntry, MemoTable},
    debug::{ParseTrace, TraceAction, TraceEntry},
    error::ParseError,
    grammar::{Grammar, Leaf, Production, Quantifier},
    token::Token,
    transform::Transforms,
    tree::{ParseNode, ParseOutcome},
};

/// Logging macros - no-op when logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macros - use log crate when logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

/// Default maximum nesting of rule resolutions
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1000;

/// Stack to keep free before resolving a rule (2MB)
///
/// Also covers cloning a finished subtree into the memo table, which recurses
/// over the subtree's depth.
const RED_ZONE: usize = 2 * 1024 * 1024;

/// Size of each new stack segment (8MB)
const STACK_PER_RECURSION: usize = 8 * 1024 * 1024;

/// Configuration options for the parser
///
/// # Example
///
/// ```rust
/// use tokrat::engine::parser::ParserConfig;
///
/// let config = ParserConfig::new()
///     .with_max_recursion_depth(200)
///     .with_memoize(false);
/// assert!(config.detect_left_recursion);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting of rule resolutions (0 = unlimited)
    pub max_recursion_depth: usize,

    /// Memoize rule outcomes per `(rule, position)`
    ///
    /// Turning this off never changes results, only running time.
    pub memoize: bool,

    /// Fail with [`ParseError::LeftRecursion`] when a rule is re-entered at
    /// the position it is already being resolved at
    pub detect_left_recursion: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            memoize: true,
            detect_left_recursion: true,
        }
    }
}

impl ParserConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum recursion depth
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Enable or disable memoization
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Enable or disable the left-recursion guard
    pub fn with_detect_left_recursion(mut self, detect: bool) -> Self {
        self.detect_left_recursion = detect;
        self
    }
}

/// A successful match at any grammar level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The matched subtree
    pub node: ParseNode,
    /// Position after the match
    pub end_pos: usize,
}

impl Match {
    #[inline]
    fn new(node: ParseNode, end_pos: usize) -> Self {
        Self { node, end_pos }
    }
}

/// `Ok(None)` is a structural failure; `Err` aborts the parse
pub type MatchResult = Result<Option<Match>, ParseError>;

/// The matching engine
///
/// A parser borrows its grammar and owns a memo table that is cleared at the
/// start of every top-level parse, so one instance can be reused for any
/// number of unrelated token streams. It is not meant to be shared between
/// threads; give each thread its own parser.
pub struct Parser<'g> {
    /// The grammar being matched
    grammar: &'g Grammar,

    /// Per-rule transforms applied after production selection
    transforms: Option<&'g Transforms>,

    /// Limits and switches
    config: ParserConfig,

    /// Packrat memo table
    cache: MemoTable,

    /// Current nesting of rule resolutions
    current_depth: usize,

    /// Trace sink, set only during `parse_with_trace`
    trace: Option<ParseTrace>,
}

impl<'g> Parser<'g> {
    /// Create a parser with default configuration
    #[inline]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, ParserConfig::default())
    }

    /// Create a parser with custom configuration
    #[inline]
    pub fn with_config(grammar: &'g Grammar, config: ParserConfig) -> Self {
        Self {
            grammar,
            transforms: None,
            config,
            cache: MemoTable::default(),
            current_depth: 0,
            trace: None,
        }
    }

    /// Attach per-rule transforms
    #[inline]
    pub fn with_transforms(mut self, transforms: &'g Transforms) -> Self {
        self.transforms = Some(transforms);
        self
    }

    /// The grammar this parser matches against
    #[inline]
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Current configuration
    #[inline]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Replace the configuration (takes effect at the next parse)
    #[inline]
    pub fn set_config(&mut self, config: ParserConfig) {
        self.config = config;
    }

    /// Memo table statistics for the most recent parse
    #[inline]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Parse `tokens` starting from rule `start`
    ///
    /// Trailing tokens the start rule does not consume are ignored; use
    /// [`parse_with_end_pos`](Self::parse_with_end_pos) or
    /// [`parse_complete`](Self::parse_complete) when that matters.
    ///
    /// # Errors
    /// - [`ParseError::NoMatch`] if the start rule does not match at position 0
    /// - [`ParseError::UnknownRule`] if the start rule, or a rule reached while
    ///   matching, is not defined
    /// - [`ParseError::LeftRecursion`], [`ParseError::RecursionLimitExceeded`]
    ///   or [`ParseError::Transform`] as configured
    pub fn parse(&mut self, start: &str, tokens: &[Token]) -> Result<ParseNode, ParseError> {
        self.parse_with_end_pos(start, tokens).map(|outcome| outcome.tree)
    }

    /// Parse and also report where the match ended
    pub fn parse_with_end_pos(
        &mut self,
        start: &str,
        tokens: &[Token],
    ) -> Result<ParseOutcome, ParseError> {
        self.cache.reset_for_input(tokens.len(), self.grammar.rule_count());
        self.current_depth = 0;

        log_debug!(
            "Starting parse: start_rule={}, token_count={}",
            start,
            tokens.len()
        );

        let rule_id = self.lookup(start)?;
        match self.resolve_rule(rule_id, tokens, 0)? {
            Some(m) => {
                log_debug!("Parse successful: consumed {} of {} tokens", m.end_pos, tokens.len());
                Ok(ParseOutcome {
                    tree: m.node,
                    end_pos: m.end_pos,
                })
            }
            None => {
                log_debug!("Parse failed: no production of {} matched", start);
                Err(ParseError::NoMatch)
            }
        }
    }

    /// Parse and require every token to be consumed
    ///
    /// # Errors
    /// Everything [`parse`](Self::parse) returns, plus
    /// [`ParseError::Incomplete`] when tokens remain after the match.
    pub fn parse_complete(
        &mut self,
        start: &str,
        tokens: &[Token],
    ) -> Result<ParseNode, ParseError> {
        let outcome = self.parse_with_end_pos(start, tokens)?;
        if outcome.is_complete(tokens.len()) {
            Ok(outcome.tree)
        } else {
            Err(ParseError::Incomplete {
                consumed: outcome.end_pos,
                total: tokens.len(),
            })
        }
    }

    /// Parse with tracing enabled
    ///
    /// Returns the parse result along with every rule resolution step.
    pub fn parse_with_trace(
        &mut self,
        start: &str,
        tokens: &[Token],
    ) -> (Result<ParseNode, ParseError>, ParseTrace) {
        self.trace = Some(ParseTrace::new());
        let result = self.parse(start, tokens);
        let trace = self.trace.take().unwrap_or_default();
        (result, trace)
    }

    /// Resolve a rule name to its id
    #[inline]
    fn lookup(&self, name: &str) -> Result<usize, ParseError> {
        self.grammar
            .rule_id(name)
            .ok_or_else(|| ParseError::UnknownRule {
                name: name.to_string(),
            })
    }

    /// Enter a rule resolution, checking depth limits
    #[inline]
    fn enter_recursive(&mut self) -> Result<(), ParseError> {
        self.current_depth += 1;
        if self.config.max_recursion_depth > 0
            && self.current_depth > self.config.max_recursion_depth
        {
            return Err(ParseError::RecursionLimitExceeded {
                depth: self.current_depth,
                max_depth: self.config.max_recursion_depth,
            });
        }
        Ok(())
    }

    /// Exit a rule resolution
    #[inline]
    fn exit_recursive(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }

    #[inline]
    fn record(&mut self, rule_id: usize, position: usize, action: TraceAction) {
        let depth = self.current_depth;
        if let Some(trace) = self.trace.as_mut() {
            trace.add(TraceEntry {
                position,
                rule_id,
                action,
                depth,
            });
        }
    }

    /// Match a single leaf at `pos`
    fn match_leaf(&mut self, leaf: &Leaf, tokens: &[Token], pos: usize) -> MatchResult {
        let Some(token) = tokens.get(pos) else {
            return Ok(None);
        };

        match leaf {
            Leaf::Literal(value) => Ok((token.value == *value)
                .then(|| Match::new(ParseNode::Token(token.clone()), pos + 1))),
            Leaf::Terminal(kind) => Ok((token.kind == *kind)
                .then(|| Match::new(ParseNode::Token(token.clone()), pos + 1))),
            Leaf::Nonterminal(name) => {
                let rule_id = self.lookup(name)?;
                self.resolve_rule(rule_id, tokens, pos)
            }
        }
    }

    /// Match every leaf in order, all or nothing
    ///
    /// A sequence is never attempted at end of input, so an empty sequence
    /// fails there instead of matching vacuously.
    fn match_sequence(&mut self, leaves: &[Leaf], tokens: &[Token], pos: usize) -> MatchResult {
        if pos >= tokens.len() {
            return Ok(None);
        }

        let mut current_pos = pos;
        let mut items = Vec::with_capacity(leaves.len());

        for leaf in leaves {
            match self.match_leaf(leaf, tokens, current_pos)? {
                Some(m) => {
                    items.push(m.node);
                    current_pos = m.end_pos;
                }
                None => return Ok(None),
            }
        }

        Ok(Some(Match::new(ParseNode::List(items), current_pos)))
    }

    /// Match a production's parts left to right
    fn match_production(
        &mut self,
        production: &Production,
        tokens: &[Token],
        pos: usize,
    ) -> MatchResult {
        let mut current_pos = pos;
        let mut results = Vec::with_capacity(production.parts.len());

        for part in &production.parts {
            match part.quantifier {
                Quantifier::Once => match self.match_sequence(&part.items, tokens, current_pos)? {
                    Some(m) => {
                        results.push(m.node);
                        current_pos = m.end_pos;
                    }
                    None => return Ok(None),
                },
                Quantifier::Optional => {
                    match self.match_sequence(&part.items, tokens, current_pos)? {
                        Some(m) => {
                            results.push(ParseNode::List(vec![m.node]));
                            current_pos = m.end_pos;
                        }
                        None => results.push(ParseNode::empty()),
                    }
                }
                Quantifier::Star => {
                    let mut repetitions = Vec::new();
                    while let Some(m) = self.match_sequence(&part.items, tokens, current_pos)? {
                        // A repetition that consumes nothing would repeat forever
                        if m.end_pos == current_pos {
                            break;
                        }
                        repetitions.push(m.node);
                        current_pos = m.end_pos;
                    }
                    results.push(ParseNode::List(repetitions));
                }
            }
        }

        Ok(Some(Match::new(ParseNode::List(results), current_pos)))
    }

    /// Resolve a rule at `pos`, consulting and filling the memo table
    fn resolve_rule(&mut self, rule_id: usize, tokens: &[Token], pos: usize) -> MatchResult {
        if matches!(self.cache.peek(rule_id, pos), Some(MemoEntry::InProgress)) {
            self.record(rule_id, pos, TraceAction::LeftRecursion);
            let rule = self.grammar.rules()[rule_id].name.clone();
            log_debug!("Left recursion detected: rule={}, position={}", rule, pos);
            return Err(ParseError::LeftRecursion {
                rule,
                position: pos,
            });
        }

        if let Some(entry) = self.cache.get(rule_id, pos).cloned() {
            self.record(rule_id, pos, TraceAction::CacheHit);
            return Ok(match entry {
                MemoEntry::Matched { node, end_pos } => Some(Match::new(node, end_pos)),
                _ => None,
            });
        }

        stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || {
            self.resolve_uncached(rule_id, tokens, pos)
        })
    }

    /// Resolve a rule with no usable memo entry
    fn resolve_uncached(&mut self, rule_id: usize, tokens: &[Token], pos: usize) -> MatchResult {
        self.record(rule_id, pos, TraceAction::Enter);
        self.enter_recursive()?;
        if self.config.detect_left_recursion {
            self.cache.insert(rule_id, pos, MemoEntry::InProgress);
        }

        let selected = self.select_production(rule_id, tokens, pos);
        self.exit_recursive();

        let outcome = match selected? {
            Some(m) => Some(self.apply_transform(rule_id, m)?),
            None => None,
        };

        if self.config.memoize {
            let entry = match &outcome {
                Some(m) => MemoEntry::Matched {
                    node: m.node.clone(),
                    end_pos: m.end_pos,
                },
                None => MemoEntry::Failed,
            };
            self.cache.insert(rule_id, pos, entry);
        } else if self.config.detect_left_recursion {
            self.cache.remove(rule_id, pos);
        }

        let action = match &outcome {
            Some(m) => TraceAction::Match {
                length: m.end_pos - pos,
            },
            None => TraceAction::Fail,
        };
        self.record(rule_id, pos, action);

        Ok(outcome)
    }

    /// Try every production and keep the longest match
    fn select_production(&mut self, rule_id: usize, tokens: &[Token], pos: usize) -> MatchResult {
        let grammar = self.grammar;
        let rule = &grammar.rules()[rule_id];
        let mut best: Option<Match> = None;

        for production in &rule.productions {
            if let Some(m) = self.match_production(production, tokens, pos)? {
                // Strictly longer only: ties keep the earlier production
                if best.as_ref().map_or(true, |b| m.end_pos > b.end_pos) {
                    best = Some(m);
                }
            }
        }

        Ok(best)
    }

    /// Run the rule's transform, if one is registered
    fn apply_transform(&self, rule_id: usize, m: Match) -> Result<Match, ParseError> {
        let Some(transforms) = self.transforms else {
            return Ok(m);
        };
        let name = &self.grammar.rules()[rule_id].name;
        if !transforms.has_rule(name) {
            return Ok(m);
        }
        let node = transforms
            .apply(name, m.node)
            .map_err(|source| ParseError::Transform {
                rule: name.clone(),
                source,
            })?;
        Ok(Match::new(node, m.end_pos))
    }
}
