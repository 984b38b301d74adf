//! Grammar analysis and warnings
//!
//! Static checks for grammars that will misbehave at parse time:
//! - References to rules that do not exist
//! - Left recursion (aborts the parse, see [`ParseError::LeftRecursion`])
//! - Rules with no productions and parts with no leaves
//! - Star parts that can repeat without consuming tokens
//! - Productions that duplicate an earlier one and can never win
//! - Rules unreachable from a start rule
//!
//! # Example
//!
//! ```
//! use tokrat::engine::grammar_analysis::{GrammarAnalyzer, WarningKind};
//! use tokrat::engine::grammar_builder::GrammarBuilder;
//!
//! let grammar = GrammarBuilder::new()
//!     .rule("expr", |r| r.production(|p| p.nt("expr").lit("+").nt("term")))
//!     .rule("term", |r| r.production(|p| p.term("NUMBER")))
//!     .build()
//!     .unwrap();
//!
//! let warnings = GrammarAnalyzer::new(&grammar).analyze();
//! assert!(warnings.iter().any(|w| w.kind == WarningKind::LeftRecursion));
//! ```
//!
//! [`ParseError::LeftRecursion`]: super::error::ParseError::LeftRecursion

use super::grammar::{Grammar, Leaf, Part, Quantifier};
use ahash::RandomState;
use hashbrown::HashSet;
use std::collections::VecDeque;
use std::fmt;

/// Kind of grammar warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A nonterminal names a rule that is not defined
    ///
    /// Parsing fails with `UnknownRule` as soon as the reference is reached.
    UnknownReference,

    /// A rule can reach itself without consuming a token
    ///
    /// Example: `expr ::= expr "+" term`
    LeftRecursion,

    /// A rule with no productions never matches
    EmptyRule,

    /// A part with no leaves matches nothing, and fails at end of input
    EmptyPart,

    /// A star part whose body can match without consuming tokens
    ///
    /// Repetition stops at the first such iteration.
    NullableStar,

    /// A production identical to an earlier one in the same rule
    ///
    /// Ties go to the earlier production, so this one is never selected.
    ShadowedProduction,

    /// A rule that cannot be reached from the start rule
    UnreachableRule,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownReference => write!(f, "unknown reference"),
            Self::LeftRecursion => write!(f, "left recursion"),
            Self::EmptyRule => write!(f, "empty rule"),
            Self::EmptyPart => write!(f, "empty part"),
            Self::NullableStar => write!(f, "nullable star"),
            Self::ShadowedProduction => write!(f, "shadowed production"),
            Self::UnreachableRule => write!(f, "unreachable rule"),
        }
    }
}

/// A grammar warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarWarning {
    /// The kind of warning
    pub kind: WarningKind,
    /// Rule where the warning was detected
    pub rule: String,
    /// Human-readable message
    pub message: String,
    /// Related rules (e.g. the left recursion chain)
    pub related_rules: Vec<String>,
}

impl GrammarWarning {
    /// Create a new warning
    pub fn new(kind: WarningKind, rule: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            rule: rule.to_string(),
            message: message.into(),
            related_rules: Vec::new(),
        }
    }

    /// Add related rules to the warning
    pub fn with_related(mut self, rules: Vec<String>) -> Self {
        self.related_rules = rules;
        self
    }
}

impl fmt::Display for GrammarWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[rule {}] {}: {}", self.rule, self.kind, self.message)?;
        if !self.related_rules.is_empty() {
            write!(f, " (via {})", self.related_rules.join(" -> "))?;
        }
        Ok(())
    }
}

/// Grammar analyzer
pub struct GrammarAnalyzer<'a> {
    grammar: &'a Grammar,
    /// Rules that can match without consuming a token, by rule id
    nullable: Vec<bool>,
}

impl<'a> GrammarAnalyzer<'a> {
    /// Create a new analyzer for the given grammar
    pub fn new(grammar: &'a Grammar) -> Self {
        let mut analyzer = Self {
            grammar,
            nullable: vec![false; grammar.rule_count()],
        };
        analyzer.compute_nullable();
        analyzer
    }

    /// Whether the named rule can match without consuming a token
    ///
    /// The check ignores the end-of-input rule, under which every non-empty
    /// part fails.
    pub fn is_nullable(&self, rule: &str) -> bool {
        self.grammar
            .rule_id(rule)
            .map_or(false, |id| self.nullable[id])
    }

    /// Analyze the grammar and return all warnings
    pub fn analyze(&self) -> Vec<GrammarWarning> {
        let mut warnings = Vec::new();

        self.detect_unknown_references(&mut warnings);
        self.detect_left_recursion(&mut warnings);
        self.detect_empty_rules(&mut warnings);
        self.detect_empty_parts(&mut warnings);
        self.detect_nullable_stars(&mut warnings);
        self.detect_shadowed_productions(&mut warnings);

        warnings
    }

    /// Analyze, additionally reporting rules unreachable from `start`
    pub fn analyze_from(&self, start: &str) -> Vec<GrammarWarning> {
        let mut warnings = self.analyze();
        self.detect_unreachable_rules(start, &mut warnings);
        warnings
    }

    /// Fixed point over "some production has only nullable parts"
    fn compute_nullable(&mut self) {
        let grammar = self.grammar;
        loop {
            let mut changed = false;
            for (id, rule) in grammar.rules().iter().enumerate() {
                if self.nullable[id] {
                    continue;
                }
                if rule
                    .productions
                    .iter()
                    .any(|p| p.parts.iter().all(|part| self.part_nullable(part)))
                {
                    self.nullable[id] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn leaf_nullable(&self, leaf: &Leaf) -> bool {
        match leaf {
            Leaf::Nonterminal(name) => self
                .grammar
                .rule_id(name)
                .map_or(false, |id| self.nullable[id]),
            Leaf::Literal(_) | Leaf::Terminal(_) => false,
        }
    }

    fn part_nullable(&self, part: &Part) -> bool {
        match part.quantifier {
            Quantifier::Optional | Quantifier::Star => true,
            Quantifier::Once => self.body_nullable(part),
        }
    }

    fn body_nullable(&self, part: &Part) -> bool {
        part.items.iter().all(|leaf| self.leaf_nullable(leaf))
    }

    /// Rules that may be resolved at a rule's starting position
    fn left_edges(&self, rule_id: usize) -> Vec<usize> {
        let mut edges = Vec::new();
        let Some(rule) = self.grammar.rule_by_id(rule_id) else {
            return edges;
        };

        for production in &rule.productions {
            for part in &production.parts {
                for leaf in &part.items {
                    if let Some(target) = leaf.rule_name().and_then(|n| self.grammar.rule_id(n)) {
                        if !edges.contains(&target) {
                            edges.push(target);
                        }
                    }
                    if !self.leaf_nullable(leaf) {
                        break;
                    }
                }
                if !self.part_nullable(part) {
                    break;
                }
            }
        }

        edges
    }

    fn detect_unknown_references(&self, warnings: &mut Vec<GrammarWarning>) {
        for rule in self.grammar.rules() {
            let mut seen = HashSet::with_hasher(RandomState::new());
            for name in rule.references() {
                if self.grammar.rule_id(name).is_none() && seen.insert(name) {
                    warnings.push(GrammarWarning::new(
                        WarningKind::UnknownReference,
                        &rule.name,
                        format!("Rule '{}' references undefined rule '{}'", rule.name, name),
                    ));
                }
            }
        }
    }

    /// Detect left recursion (direct and indirect)
    fn detect_left_recursion(&self, warnings: &mut Vec<GrammarWarning>) {
        let edges: Vec<Vec<usize>> = (0..self.grammar.rule_count())
            .map(|id| self.left_edges(id))
            .collect();

        for start in 0..self.grammar.rule_count() {
            let mut visited = HashSet::with_hasher(RandomState::new());
            if let Some(chain) = find_cycle(&edges, start, start, &mut visited) {
                let names: Vec<String> = chain
                    .iter()
                    .filter_map(|&id| self.grammar.rule_by_id(id))
                    .map(|r| r.name.clone())
                    .collect();
                let rule = &self.grammar.rules()[start].name;
                warnings.push(
                    GrammarWarning::new(
                        WarningKind::LeftRecursion,
                        rule,
                        format!(
                            "Rule '{}' is left-recursive (can reach itself without consuming tokens)",
                            rule
                        ),
                    )
                    .with_related(names),
                );
            }
        }
    }

    fn detect_empty_rules(&self, warnings: &mut Vec<GrammarWarning>) {
        for rule in self.grammar.rules() {
            if rule.productions.is_empty() {
                warnings.push(GrammarWarning::new(
                    WarningKind::EmptyRule,
                    &rule.name,
                    format!("Rule '{}' has no productions and never matches", rule.name),
                ));
            }
        }
    }

    fn detect_empty_parts(&self, warnings: &mut Vec<GrammarWarning>) {
        for rule in self.grammar.rules() {
            for (p, production) in rule.productions.iter().enumerate() {
                for (i, part) in production.parts.iter().enumerate() {
                    if part.items.is_empty() {
                        warnings.push(GrammarWarning::new(
                            WarningKind::EmptyPart,
                            &rule.name,
                            format!(
                                "Production {} part {} has no leaves and fails at end of input",
                                p, i
                            ),
                        ));
                    }
                }
            }
        }
    }

    fn detect_nullable_stars(&self, warnings: &mut Vec<GrammarWarning>) {
        for rule in self.grammar.rules() {
            for (p, production) in rule.productions.iter().enumerate() {
                for (i, part) in production.parts.iter().enumerate() {
                    if part.is_star() && !part.items.is_empty() && self.body_nullable(part) {
                        warnings.push(GrammarWarning::new(
                            WarningKind::NullableStar,
                            &rule.name,
                            format!(
                                "Production {} part {} ({}) can repeat without consuming tokens",
                                p, i, part
                            ),
                        ));
                    }
                }
            }
        }
    }

    fn detect_shadowed_productions(&self, warnings: &mut Vec<GrammarWarning>) {
        for rule in self.grammar.rules() {
            for (i, production) in rule.productions.iter().enumerate() {
                if let Some(first) = rule.productions[..i].iter().position(|p| p == production) {
                    warnings.push(GrammarWarning::new(
                        WarningKind::ShadowedProduction,
                        &rule.name,
                        format!(
                            "Production {} duplicates production {} and is never selected",
                            i, first
                        ),
                    ));
                }
            }
        }
    }

    fn detect_unreachable_rules(&self, start: &str, warnings: &mut Vec<GrammarWarning>) {
        let Some(start_id) = self.grammar.rule_id(start) else {
            warnings.push(GrammarWarning::new(
                WarningKind::UnknownReference,
                start,
                format!("Start rule '{}' is not defined", start),
            ));
            return;
        };

        let mut reachable = HashSet::with_hasher(RandomState::new());
        let mut queue = VecDeque::from([start_id]);
        reachable.insert(start_id);

        while let Some(id) = queue.pop_front() {
            for name in self.grammar.rules()[id].references() {
                if let Some(target) = self.grammar.rule_id(name) {
                    if reachable.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }

        for (id, rule) in self.grammar.rules().iter().enumerate() {
            if !reachable.contains(&id) {
                warnings.push(GrammarWarning::new(
                    WarningKind::UnreachableRule,
                    &rule.name,
                    format!("Rule '{}' is not reachable from '{}'", rule.name, start),
                ));
            }
        }
    }
}

/// Depth-first search for a path from `current` back to `target`
fn find_cycle(
    edges: &[Vec<usize>],
    current: usize,
    target: usize,
    visited: &mut HashSet<usize, RandomState>,
) -> Option<Vec<usize>> {
    if !visited.insert(current) {
        return None;
    }
    for &next in &edges[current] {
        if next == target {
            return Some(vec![current, next]);
        }
        if let Some(mut path) = find_cycle(edges, next, target, visited) {
            path.insert(0, current);
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grammar::{Production, Rule};
    use crate::engine::grammar_builder::{lit, nt, GrammarBuilder};

    fn kinds(warnings: &[GrammarWarning]) -> Vec<WarningKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn test_clean_grammar_has_no_warnings() {
        let grammar = GrammarBuilder::new()
            .rule("list", |r| r.production(|p| p.nt("item").star([lit(","), nt("item")])))
            .rule("item", |r| r.production(|p| p.term("IDENT")))
            .build()
            .unwrap();

        assert!(GrammarAnalyzer::new(&grammar).analyze_from("list").is_empty());
    }

    #[test]
    fn test_direct_left_recursion() {
        let grammar = GrammarBuilder::new()
            .rule("expr", |r| {
                r.production(|p| p.nt("expr").lit("+").nt("num"))
                    .production(|p| p.nt("num"))
            })
            .rule("num", |r| r.production(|p| p.term("NUMBER")))
            .build()
            .unwrap();

        let warnings = GrammarAnalyzer::new(&grammar).analyze();
        assert_eq!(kinds(&warnings), vec![WarningKind::LeftRecursion]);
        assert_eq!(warnings[0].rule, "expr");
        assert_eq!(warnings[0].related_rules, vec!["expr", "expr"]);
    }

    #[test]
    fn test_left_recursion_through_nullable_prefix() {
        // a ::= b? a "x"  /  b ::= "y"
        // a ::= eps a     /  eps ::= ()
        let grammar = GrammarBuilder::new()
            .rule("a", |r| r.production(|p| p.opt([nt("b")]).nt("a").lit("x")))
            .rule("b", |r| r.production(|p| p.lit("y")))
            .rule("c", |r| r.production(|p| p.nt("eps").nt("c")))
            .rule("eps", |r| r.production(|p| p))
            .build()
            .unwrap();

        let analyzer = GrammarAnalyzer::new(&grammar);
        assert!(analyzer.is_nullable("eps"));
        assert!(!analyzer.is_nullable("b"));

        let warnings = GrammarAnalyzer::new(&grammar).analyze();
        let recursive: Vec<_> = warnings
            .iter()
            .filter(|w| w.kind == WarningKind::LeftRecursion)
            .map(|w| w.rule.as_str())
            .collect();
        assert_eq!(recursive, vec!["a", "c"]);
    }

    #[test]
    fn test_indirect_left_recursion() {
        let grammar = GrammarBuilder::new()
            .rule("a", |r| r.production(|p| p.nt("b").lit("x")))
            .rule("b", |r| r.production(|p| p.nt("a").lit("y")))
            .build()
            .unwrap();

        let warnings = GrammarAnalyzer::new(&grammar).analyze();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].related_rules, vec!["a", "b", "a"]);
        assert!(warnings[0].to_string().contains("a -> b -> a"));
    }

    #[test]
    fn test_right_recursion_is_fine() {
        let grammar = GrammarBuilder::new()
            .rule("list", |r| {
                r.production(|p| p.lit("x").nt("list")).production(|p| p.lit("x"))
            })
            .build()
            .unwrap();

        assert!(GrammarAnalyzer::new(&grammar).analyze().is_empty());
    }

    #[test]
    fn test_unknown_reference_reported_once() {
        let grammar = GrammarBuilder::new()
            .rule("s", |r| {
                r.production(|p| p.nt("missing").lit("a"))
                    .production(|p| p.nt("missing").lit("b"))
            })
            .build()
            .unwrap();

        let warnings = GrammarAnalyzer::new(&grammar).analyze();
        assert_eq!(kinds(&warnings), vec![WarningKind::UnknownReference]);
        assert!(warnings[0].message.contains("missing"));
    }

    #[test]
    fn test_empty_rule_and_part() {
        let grammar = Grammar::new(vec![
            Rule::new("never", vec![]),
            Rule::new(
                "odd",
                vec![Production::new(vec![Part::once(vec![]), Part::once(vec![lit("a")])])],
            ),
        ])
        .unwrap();

        let warnings = GrammarAnalyzer::new(&grammar).analyze();
        assert_eq!(
            kinds(&warnings),
            vec![WarningKind::EmptyRule, WarningKind::EmptyPart]
        );
        assert_eq!(warnings[1].rule, "odd");
    }

    #[test]
    fn test_nullable_star() {
        let grammar = GrammarBuilder::new()
            .rule("s", |r| r.production(|p| p.star([nt("maybe")]).lit("end")))
            .rule("maybe", |r| r.production(|p| p.opt([lit("x")])))
            .build()
            .unwrap();

        let warnings = GrammarAnalyzer::new(&grammar).analyze();
        assert_eq!(kinds(&warnings), vec![WarningKind::NullableStar]);
        assert_eq!(warnings[0].rule, "s");
    }

    #[test]
    fn test_shadowed_production() {
        let grammar = GrammarBuilder::new()
            .rule("s", |r| {
                r.production(|p| p.lit("a"))
                    .production(|p| p.lit("b"))
                    .production(|p| p.lit("a"))
            })
            .build()
            .unwrap();

        let warnings = GrammarAnalyzer::new(&grammar).analyze();
        assert_eq!(kinds(&warnings), vec![WarningKind::ShadowedProduction]);
        assert!(warnings[0].message.contains("Production 2 duplicates production 0"));
    }

    #[test]
    fn test_unreachable_rules() {
        let grammar = GrammarBuilder::new()
            .rule("s", |r| r.production(|p| p.nt("a")))
            .rule("a", |r| r.production(|p| p.lit("a")))
            .rule("orphan", |r| r.production(|p| p.lit("o")))
            .build()
            .unwrap();

        let analyzer = GrammarAnalyzer::new(&grammar);
        assert!(analyzer.analyze().is_empty());

        let warnings = analyzer.analyze_from("s");
        assert_eq!(kinds(&warnings), vec![WarningKind::UnreachableRule]);
        assert_eq!(warnings[0].rule, "orphan");

        let warnings = analyzer.analyze_from("nope");
        assert_eq!(kinds(&warnings), vec![WarningKind::UnknownReference]);
    }

    #[test]
    fn test_warning_kind_display() {
        assert_eq!(WarningKind::NullableStar.to_string(), "nullable star");
        assert_eq!(WarningKind::UnreachableRule.to_string(), "unreachable rule");
    }
}
