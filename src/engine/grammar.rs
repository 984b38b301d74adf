//! Grammar types for tokrat
//!
//! A grammar is an ordered list of rules. Each rule holds ordered productions
//! (alternatives), each production an ordered list of quantified parts, and
//! each part an ordered list of leaf matchers. Declaration order is
//! significant everywhere: it breaks ties during longest-match selection.
//!
//! Grammars are plain data. They are built once (by [`GrammarBuilder`], by
//! [`Grammar::new`], or loaded from JSON) and only read while parsing.
//!
//! [`GrammarBuilder`]: super::grammar_builder::GrammarBuilder

use super::error::{GrammarError, ParseError};
use super::grammar_analysis::{GrammarAnalyzer, GrammarWarning};
use super::parser::Parser;
use super::token::Token;
use super::tree::ParseNode;
use ahash::RandomState;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The smallest matcher in a grammar
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Leaf {
    /// Matches a token whose literal value equals the string
    Literal(String),
    /// Matches a token whose type tag equals the string
    Terminal(String),
    /// Matches whatever the named rule matches at the current position
    Nonterminal(String),
}

impl Leaf {
    /// Name of the referenced rule, if this is a nonterminal
    #[inline]
    pub fn rule_name(&self) -> Option<&str> {
        match self {
            Leaf::Nonterminal(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Literal(value) => write!(f, "{:?}", value),
            Leaf::Terminal(kind) => write!(f, "<{}>", kind),
            Leaf::Nonterminal(name) => write!(f, "{}", name),
        }
    }
}

/// How many times a part's leaf sequence may match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    /// Exactly once
    #[default]
    Once,
    /// Zero or one time; absence never advances the position
    Optional,
    /// Zero or more times, greedily, without giving repetitions back
    Star,
}

/// A quantified group of leaves within a production
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PartDef")]
pub struct Part {
    /// Leaves that must match in order
    pub items: Vec<Leaf>,
    /// Quantifier applied to the whole leaf sequence
    pub quantifier: Quantifier,
}

impl Part {
    /// A part that must match exactly once
    pub fn once(items: Vec<Leaf>) -> Self {
        Self {
            items,
            quantifier: Quantifier::Once,
        }
    }

    /// A part that may be absent
    pub fn optional(items: Vec<Leaf>) -> Self {
        Self {
            items,
            quantifier: Quantifier::Optional,
        }
    }

    /// A part that repeats zero or more times
    pub fn star(items: Vec<Leaf>) -> Self {
        Self {
            items,
            quantifier: Quantifier::Star,
        }
    }

    /// Whether the part may be absent
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.quantifier == Quantifier::Optional
    }

    /// Whether the part repeats
    #[inline]
    pub fn is_star(&self) -> bool {
        self.quantifier == Quantifier::Star
    }
}

/// Wire form of a part: either a `quantifier` or the legacy `optional`/`star` flags
#[derive(Deserialize)]
struct PartDef {
    items: Vec<Leaf>,
    #[serde(default)]
    quantifier: Option<Quantifier>,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    star: bool,
}

impl TryFrom<PartDef> for Part {
    type Error = String;

    fn try_from(def: PartDef) -> Result<Self, Self::Error> {
        let from_flags = match (def.optional, def.star) {
            (true, true) => return Err("part cannot be both optional and star".to_string()),
            (true, false) => Some(Quantifier::Optional),
            (false, true) => Some(Quantifier::Star),
            (false, false) => None,
        };
        let quantifier = match (def.quantifier, from_flags) {
            (Some(q), Some(f)) if q != f => {
                return Err(format!(
                    "part quantifier {:?} contradicts its flags ({:?})",
                    q, f
                ))
            }
            (Some(q), _) => q,
            (None, Some(f)) => f,
            (None, None) => Quantifier::Once,
        };
        Ok(Part {
            items: def.items,
            quantifier,
        })
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grouped = self.items.len() != 1;
        if grouped {
            write!(f, "(")?;
        }
        for (i, leaf) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", leaf)?;
        }
        if grouped {
            write!(f, ")")?;
        }
        match self.quantifier {
            Quantifier::Once => Ok(()),
            Quantifier::Optional => write!(f, "?"),
            Quantifier::Star => write!(f, "*"),
        }
    }
}

/// One alternative for satisfying a rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Production {
    /// Parts that must match in order
    #[serde(alias = "items")]
    pub parts: Vec<Part>,
}

impl Production {
    /// Create a production from its parts
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parts.is_empty() {
            return write!(f, "()");
        }
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// A named set of alternative productions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name, unique within a grammar
    pub name: String,
    /// Alternatives in declaration order
    pub productions: Vec<Production>,
}

impl Rule {
    /// Create a rule
    pub fn new(name: impl Into<String>, productions: Vec<Production>) -> Self {
        Self {
            name: name.into(),
            productions,
        }
    }

    /// Iterate over every nonterminal name this rule references
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.productions
            .iter()
            .flat_map(|p| p.parts.iter())
            .flat_map(|part| part.items.iter())
            .filter_map(Leaf::rule_name)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ::=", self.name)?;
        if self.productions.is_empty() {
            return write!(f, " /* no productions */");
        }
        let pad = " ".repeat(self.name.len() + 1);
        for (i, production) in self.productions.iter().enumerate() {
            if i == 0 {
                write!(f, " {}", production)?;
            } else {
                write!(f, "\n{}| {}", pad, production)?;
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct GrammarDef {
    rules: Vec<Rule>,
}

/// A complete grammar
///
/// Rules are kept in declaration order and indexed by name. A rule's id is its
/// position in [`Grammar::rules`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GrammarDef")]
pub struct Grammar {
    rules: Vec<Rule>,

    #[serde(skip)]
    index: HashMap<String, usize, RandomState>,
}

impl Grammar {
    /// Create a grammar from rules, rejecting duplicate names
    pub fn new(rules: Vec<Rule>) -> Result<Self, GrammarError> {
        let mut index = HashMap::with_capacity_and_hasher(rules.len(), RandomState::new());
        for (id, rule) in rules.iter().enumerate() {
            if index.insert(rule.name.clone(), id).is_some() {
                return Err(GrammarError::DuplicateRule {
                    name: rule.name.clone(),
                });
            }
        }
        Ok(Self { rules, index })
    }

    /// Create a grammar with no rules
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            index: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// All rules in declaration order
    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a rule by name
    #[inline]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rule_id(name).map(|id| &self.rules[id])
    }

    /// Look up a rule's id by name
    #[inline]
    pub fn rule_id(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Get a rule by id
    #[inline]
    pub fn rule_by_id(&self, id: usize) -> Option<&Rule> {
        self.rules.get(id)
    }

    /// Number of rules
    #[inline]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rule names in declaration order
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// Serialize to JSON
    #[inline]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to indented JSON
    #[inline]
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    ///
    /// Expects `{"rules": [{"name": .., "productions": [{"parts": [..]}]}]}`.
    pub fn from_json(s: &str) -> Result<Self, GrammarError> {
        let def: GrammarDef = serde_json::from_str(s)?;
        Self::new(def.rules)
    }

    /// Analyze the grammar for likely authoring mistakes
    ///
    /// # Example
    ///
    /// ```
    /// use tokrat::engine::grammar_builder::{lit, nt, GrammarBuilder};
    ///
    /// let grammar = GrammarBuilder::new()
    ///     .rule("expr", |r| r.production(|p| p.leaf(nt("expr")).leaf(lit("+"))))
    ///     .build()
    ///     .unwrap();
    ///
    /// let warnings = grammar.analyze_warnings();
    /// assert!(!warnings.is_empty());
    /// ```
    pub fn analyze_warnings(&self) -> Vec<GrammarWarning> {
        GrammarAnalyzer::new(self).analyze()
    }

    /// One-shot parse convenience method
    ///
    /// Creates a parser with default configuration and parses `tokens` from
    /// `start`. Trailing tokens are ignored, as with [`Parser::parse`].
    pub fn parse(&self, start: &str, tokens: &[Token]) -> Result<ParseNode, ParseError> {
        Parser::new(self).parse(start, tokens)
    }
}

impl TryFrom<GrammarDef> for Grammar {
    type Error = GrammarError;

    fn try_from(def: GrammarDef) -> Result<Self, Self::Error> {
        Grammar::new(def.rules)
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl Eq for Grammar {}

impl Default for Grammar {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}
