//! Developer tools
//!
//! - Parse tracing (every rule resolution, see [`Parser::parse_with_trace`])
//! - Parse tree pretty printing
//! - Grammar visualization (Mermaid/DOT diagrams of rule references)
//!
//! [`Parser::parse_with_trace`]: super::parser::Parser::parse_with_trace

use super::grammar::Grammar;
use super::tree::ParseNode;
use std::fmt::Write;

/// Parse tree pretty printer
pub struct TreePrinter {
    /// Indentation string
    indent: String,
    /// Maximum depth to print
    max_depth: Option<usize>,
}

impl TreePrinter {
    /// Create a new tree printer
    pub fn new() -> Self {
        Self {
            indent: "  ".to_string(),
            max_depth: None,
        }
    }

    /// Set the indentation string
    pub fn indent(mut self, indent: &str) -> Self {
        self.indent = indent.to_string();
        self
    }

    /// Set the maximum depth to print
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Render a parse tree, one token or bracket per line
    pub fn print(&self, node: &ParseNode) -> String {
        let mut output = String::new();
        self.print_node(node, 0, &mut output);
        output
    }

    fn print_node(&self, node: &ParseNode, depth: usize, output: &mut String) {
        let indent = self.indent.repeat(depth);

        if let Some(max) = self.max_depth {
            if depth > max {
                let _ = writeln!(output, "{}...", indent);
                return;
            }
        }

        match node {
            ParseNode::Token(token) => {
                let _ = writeln!(output, "{}{} {:?}", indent, token.kind, token.value);
            }
            ParseNode::List(items) if items.is_empty() => {
                let _ = writeln!(output, "{}[]", indent);
            }
            ParseNode::List(items) => {
                let _ = writeln!(output, "{}[", indent);
                for item in items {
                    self.print_node(item, depth + 1, output);
                }
                let _ = writeln!(output, "{}]", indent);
            }
        }
    }
}

impl Default for TreePrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Grammar visualizer
///
/// Draws one node per rule and one edge per distinct rule reference.
/// References to undefined rules are drawn as dashed nodes.
pub struct GrammarVisualizer<'a> {
    grammar: &'a Grammar,
    start: Option<&'a str>,
}

impl<'a> GrammarVisualizer<'a> {
    /// Create a new grammar visualizer
    pub fn new(grammar: &'a Grammar) -> Self {
        Self {
            grammar,
            start: None,
        }
    }

    /// Highlight a start rule
    pub fn with_start(mut self, start: &'a str) -> Self {
        self.start = Some(start);
        self
    }

    /// Generate a Mermaid diagram
    pub fn to_mermaid(&self) -> String {
        let mut output = String::new();
        output.push_str("graph TD\n");

        for (i, rule) in self.grammar.rules().iter().enumerate() {
            let _ = writeln!(output, "  r{}[\"{}\"]", i, rule.name);
        }

        for (i, targets) in self.edges().iter().enumerate() {
            for target in targets {
                match target {
                    Target::Rule(j) => {
                        let _ = writeln!(output, "  r{} --> r{}", i, j);
                    }
                    Target::Missing(name) => {
                        let _ = writeln!(output, "  r{} -.-> missing_{}[\"{}?\"]", i, name, name);
                    }
                }
            }
        }

        if let Some(id) = self.start.and_then(|s| self.grammar.rule_id(s)) {
            let _ = writeln!(output, "  style r{} fill:#add8e6", id);
        }

        output
    }

    /// Generate a GraphViz DOT diagram
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph Grammar {\n");
        output.push_str("  rankdir=TB;\n");
        output.push_str("  node [shape=box];\n");

        for (i, rule) in self.grammar.rules().iter().enumerate() {
            let _ = writeln!(
                output,
                "  r{} [label=\"{}\\n{} production(s)\"]",
                i,
                rule.name,
                rule.productions.len()
            );
        }

        for (i, targets) in self.edges().iter().enumerate() {
            for target in targets {
                match target {
                    Target::Rule(j) => {
                        let _ = writeln!(output, "  r{} -> r{}", i, j);
                    }
                    Target::Missing(name) => {
                        let _ = writeln!(
                            output,
                            "  \"missing_{}\" [label=\"{}?\", style=dashed]",
                            name, name
                        );
                        let _ = writeln!(output, "  r{} -> \"missing_{}\" [style=dashed]", i, name);
                    }
                }
            }
        }

        // Mark start
        if let Some(id) = self.start.and_then(|s| self.grammar.rule_id(s)) {
            let _ = writeln!(output, "  r{} [style=filled, fillcolor=lightblue]", id);
        }

        output.push_str("}\n");
        output
    }

    /// Distinct outgoing references per rule, in first-use order
    fn edges(&self) -> Vec<Vec<Target<'a>>> {
        let grammar = self.grammar;
        grammar
            .rules()
            .iter()
            .map(|rule| {
                let mut targets = Vec::new();
                for name in rule.references() {
                    let target = match grammar.rule_id(name) {
                        Some(id) => Target::Rule(id),
                        None => Target::Missing(name),
                    };
                    if !targets.contains(&target) {
                        targets.push(target);
                    }
                }
                targets
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target<'a> {
    Rule(usize),
    Missing(&'a str),
}

/// Debug trace for parsing
#[derive(Debug, Clone, Default)]
pub struct ParseTrace {
    /// Trace entries
    pub entries: Vec<TraceEntry>,
}

/// A single trace entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Token position
    pub position: usize,
    /// Rule being resolved
    pub rule_id: usize,
    /// What happened
    pub action: TraceAction,
    /// Nesting depth of rule resolutions
    pub depth: usize,
}

/// Trace action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceAction {
    /// Started resolving a rule
    Enter,
    /// Successfully matched
    Match {
        /// Number of tokens consumed
        length: usize,
    },
    /// No production matched
    Fail,
    /// Outcome taken from the memo table
    CacheHit,
    /// Re-entered while still being resolved at the same position
    LeftRecursion,
}

impl ParseTrace {
    /// Create a new empty trace
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry
    pub fn add(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the trace is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Format as a readable string, naming rules from `grammar`
    pub fn format(&self, grammar: &Grammar) -> String {
        let mut output = String::new();
        for entry in &self.entries {
            let indent = "  ".repeat(entry.depth);
            let rule = grammar
                .rule_by_id(entry.rule_id)
                .map_or("<unknown>", |r| r.name.as_str());

            let _ = match &entry.action {
                TraceAction::Enter => writeln!(
                    output,
                    "{}-> Enter {} at {}",
                    indent, rule, entry.position
                ),
                TraceAction::Match { length } => {
                    writeln!(output, "{}   {} matched {} token(s)", indent, rule, length)
                }
                TraceAction::Fail => writeln!(output, "{}   {} failed", indent, rule),
                TraceAction::CacheHit => writeln!(
                    output,
                    "{}   {} cached at {}",
                    indent, rule, entry.position
                ),
                TraceAction::LeftRecursion => writeln!(
                    output,
                    "{}   {} re-entered at {}",
                    indent, rule, entry.position
                ),
            };
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grammar_builder::GrammarBuilder;
    use crate::engine::token::Token;

    fn grammar() -> Grammar {
        GrammarBuilder::new()
            .rule("decl", |r| r.production(|p| p.nt("type").term("IDENT").nt("init")))
            .rule("type", |r| r.production(|p| p.lit("int")).production(|p| p.lit("char")))
            .build()
            .unwrap()
    }

    #[test]
    fn test_tree_printer() {
        let tree = ParseNode::list(vec![
            ParseNode::list(vec![ParseNode::token(Token::new("KW", "int"))]),
            ParseNode::empty(),
        ]);

        let out = TreePrinter::new().print(&tree);
        assert_eq!(out, "[\n  [\n    KW \"int\"\n  ]\n  []\n]\n");

        let out = TreePrinter::new().indent(".").max_depth(0).print(&tree);
        assert_eq!(out, "[\n....\n....\n]\n");
    }

    #[test]
    fn test_mermaid() {
        let out = GrammarVisualizer::new(&grammar()).with_start("decl").to_mermaid();
        assert!(out.starts_with("graph TD\n"));
        assert!(out.contains("  r0[\"decl\"]\n"));
        assert!(out.contains("  r0 --> r1\n"));
        assert!(out.contains("  r0 -.-> missing_init[\"init?\"]\n"));
        assert!(out.contains("style r0"));
    }

    #[test]
    fn test_dot() {
        let out = GrammarVisualizer::new(&grammar()).to_dot();
        assert!(out.starts_with("digraph Grammar {\n"));
        assert!(out.contains("  r1 [label=\"type\\n2 production(s)\"]\n"));
        assert!(out.contains("  r0 -> r1\n"));
        assert!(out.contains("style=dashed"));
        assert!(!out.contains("fillcolor"));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_trace_format() {
        let mut trace = ParseTrace::new();
        trace.add(TraceEntry {
            position: 0,
            rule_id: 0,
            action: TraceAction::Enter,
            depth: 0,
        });
        trace.add(TraceEntry {
            position: 0,
            rule_id: 1,
            action: TraceAction::Match { length: 1 },
            depth: 1,
        });
        trace.add(TraceEntry {
            position: 3,
            rule_id: 9,
            action: TraceAction::Fail,
            depth: 0,
        });

        let out = trace.format(&grammar());
        assert_eq!(
            out,
            "-> Enter decl at 0\n     type matched 1 token(s)\n   <unknown> failed\n"
        );
        assert_eq!(trace.len(), 3);
    }

    #[test]
    fn test_trace_format_cache_and_recursion() {
        let mut trace = ParseTrace::new();
        trace.add(TraceEntry {
            position: 2,
            rule_id: 1,
            action: TraceAction::CacheHit,
            depth: 1,
        });
        trace.add(TraceEntry {
            position: 0,
            rule_id: 0,
            action: TraceAction::LeftRecursion,
            depth: 2,
        });

        assert_eq!(
            trace.format(&grammar()),
            "     type cached at 2
       decl re-entered at 0
"
        );
    }
}
