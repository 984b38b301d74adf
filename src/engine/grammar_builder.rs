//! Fluent grammar construction
//!
//! Building [`Rule`]s and [`Production`]s by hand gets verbose quickly. The
//! builder reads closer to the grammar itself:
//!
//! ```rust
//! use tokrat::engine::grammar_builder::{lit, term, GrammarBuilder};
//!
//! // decl ::= type <IDENT> ("=" <NUMBER>)? ";"
//! let grammar = GrammarBuilder::new()
//!     .rule("decl", |r| {
//!         r.production(|p| {
//!             p.nt("type")
//!                 .term("IDENT")
//!                 .opt([lit("="), term("NUMBER")])
//!                 .lit(";")
//!         })
//!     })
//!     .rule("type", |r| r.production(|p| p.lit("int")).production(|p| p.lit("char")))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(grammar.rule_count(), 2);
//! assert!(grammar.rule("decl").is_some());
//! ```

use super::error::GrammarError;
use super::grammar::{Grammar, Leaf, Part, Production, Rule};

/// Leaf matching a token by literal value
#[inline]
pub fn lit(value: impl Into<String>) -> Leaf {
    Leaf::Literal(value.into())
}

/// Leaf matching a token by type tag
#[inline]
pub fn term(kind: impl Into<String>) -> Leaf {
    Leaf::Terminal(kind.into())
}

/// Leaf delegating to a named rule
#[inline]
pub fn nt(name: impl Into<String>) -> Leaf {
    Leaf::Nonterminal(name.into())
}

/// Grammar builder
///
/// Rules keep the order they are added in.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: Vec<Rule>,
}

impl GrammarBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule described by a closure over a [`RuleBuilder`]
    pub fn rule<F>(mut self, name: &str, f: F) -> Self
    where
        F: FnOnce(RuleBuilder) -> RuleBuilder,
    {
        let rule = f(RuleBuilder::new(name)).build();
        self.rules.push(rule);
        self
    }

    /// Add an already constructed rule
    pub fn add_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Number of rules added so far
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Build the grammar
    ///
    /// References to undefined rules are allowed here; they only fail when
    /// reached during a parse. Use [`Grammar::analyze_warnings`] to find them
    /// up front.
    ///
    /// # Errors
    /// [`GrammarError::DuplicateRule`] if a name was added twice.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        Grammar::new(self.rules)
    }
}

/// Builder for one rule's productions
#[derive(Debug)]
pub struct RuleBuilder {
    name: String,
    productions: Vec<Production>,
}

impl RuleBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            productions: Vec::new(),
        }
    }

    /// Add a production; `|p| p` adds the empty production
    pub fn production<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ProductionBuilder) -> ProductionBuilder,
    {
        self.productions.push(f(ProductionBuilder::new()).build());
        self
    }

    fn build(self) -> Rule {
        Rule::new(self.name, self.productions)
    }
}

/// Builder for one production's parts
///
/// `leaf`, `lit`, `term` and `nt` each add a single-leaf part that must match
/// once. `seq`, `opt` and `star` take a whole leaf sequence as one part.
#[derive(Debug, Default)]
pub struct ProductionBuilder {
    parts: Vec<Part>,
}

impl ProductionBuilder {
    /// Create an empty production builder
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Add a mandatory single-leaf part
    pub fn leaf(self, leaf: Leaf) -> Self {
        self.part(Part::once(vec![leaf]))
    }

    /// Add a mandatory literal
    pub fn lit(self, value: &str) -> Self {
        self.leaf(lit(value))
    }

    /// Add a mandatory terminal
    pub fn term(self, kind: &str) -> Self {
        self.leaf(term(kind))
    }

    /// Add a mandatory nonterminal
    pub fn nt(self, name: &str) -> Self {
        self.leaf(nt(name))
    }

    /// Add a mandatory part made of several leaves
    pub fn seq(self, leaves: impl IntoIterator<Item = Leaf>) -> Self {
        self.part(Part::once(leaves.into_iter().collect()))
    }

    /// Add an optional part
    pub fn opt(self, leaves: impl IntoIterator<Item = Leaf>) -> Self {
        self.part(Part::optional(leaves.into_iter().collect()))
    }

    /// Add a repeated part
    pub fn star(self, leaves: impl IntoIterator<Item = Leaf>) -> Self {
        self.part(Part::star(leaves.into_iter().collect()))
    }

    /// Add an arbitrary part
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Finish the production
    pub fn build(self) -> Production {
        Production::new(self.parts)
    }
}
