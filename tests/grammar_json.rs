//! Integration tests for JSON grammars and token streams
//!
//! Grammars and tokens usually arrive from an external lexer/grammar loader
//! as JSON; these tests cover loading, round-tripping and parsing them.

use tokrat::engine::{
    debug::GrammarVisualizer, grammar_analysis::WarningKind, Grammar, GrammarError, Leaf,
    ParseError, ParseNode, Quantifier, Token,
};

const DECL_GRAMMAR: &str = r#"{
    "rules": [
        {
            "name": "decl",
            "productions": [
                { "parts": [
                    { "items": [ { "Nonterminal": "type" } ] },
                    { "items": [ { "Terminal": "IDENT" } ] },
                    { "items": [ { "Literal": "=" }, { "Terminal": "NUMBER" } ], "quantifier": "Optional" },
                    { "items": [ { "Literal": ";" } ] }
                ] }
            ]
        },
        {
            "name": "type",
            "productions": [
                { "parts": [ { "items": [ { "Literal": "int" } ] } ] },
                { "parts": [ { "items": [ { "Literal": "char" } ] } ] }
            ]
        }
    ]
}"#;

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_and_parse() {
    let grammar = Grammar::from_json(DECL_GRAMMAR).unwrap();
    assert_eq!(grammar.rule_names().collect::<Vec<_>>(), vec!["decl", "type"]);

    let tokens = Token::list_from_json(
        r#"[
            {"type": "KEYWORD", "value": "int"},
            {"type": "IDENT", "value": "x"},
            {"type": "OP", "value": "="},
            {"type": "NUMBER", "value": "1"},
            {"type": "PUNCT", "value": ";"}
        ]"#,
    )
    .unwrap();

    let tree = grammar.parse("decl", &tokens).unwrap();
    let init = tree.get(2).and_then(ParseNode::as_list).unwrap();
    assert_eq!(init.len(), 1);
    assert_eq!(tree.token_count(), 5);
}

#[test]
fn test_legacy_flags() {
    let grammar = Grammar::from_json(
        r#"{"rules": [{"name": "s", "productions": [{"items": [
            {"items": [{"Literal": "a"}], "star": true},
            {"items": [{"Literal": "b"}], "optional": true},
            {"items": [{"Literal": "c"}], "optional": false, "star": false}
        ]}]}]}"#,
    )
    .unwrap();

    let parts = &grammar.rule("s").unwrap().productions[0].parts;
    let quantifiers: Vec<_> = parts.iter().map(|p| p.quantifier).collect();
    assert_eq!(
        quantifiers,
        vec![Quantifier::Star, Quantifier::Optional, Quantifier::Once]
    );
}

#[test]
fn test_optional_and_star_together_rejected() {
    let result = Grammar::from_json(
        r#"{"rules": [{"name": "s", "productions": [{"parts": [
            {"items": [{"Literal": "a"}], "optional": true, "star": true}
        ]}]}]}"#,
    );
    assert!(matches!(result, Err(GrammarError::Json(_))));
}

#[test]
fn test_duplicate_rule_rejected() {
    let result = Grammar::from_json(
        r#"{"rules": [
            {"name": "s", "productions": []},
            {"name": "s", "productions": []}
        ]}"#,
    );
    assert!(matches!(result, Err(GrammarError::DuplicateRule { name }) if name == "s"));
}

#[test]
fn test_serde_json_direct_deserialization_validates() {
    let result: Result<Grammar, _> = serde_json::from_str(
        r#"{"rules": [{"name": "s", "productions": []}, {"name": "s", "productions": []}]}"#,
    );
    assert!(result.is_err());

    let grammar: Grammar = serde_json::from_str(DECL_GRAMMAR).unwrap();
    assert_eq!(grammar.rule_id("type"), Some(1));
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        Grammar::from_json("{\"rules\": ["),
        Err(GrammarError::Json(_))
    ));
    assert!(Token::list_from_json(r#"[{"type": "X"}]"#).is_err());
}

// ============================================================================
// Round Trips
// ============================================================================

#[test]
fn test_grammar_json_round_trip() {
    let grammar = Grammar::from_json(DECL_GRAMMAR).unwrap();
    let json = grammar.to_json().unwrap();
    let reloaded = Grammar::from_json(&json).unwrap();

    assert_eq!(grammar, reloaded);
    assert_eq!(reloaded.rule_id("decl"), Some(0));
    assert!(grammar.to_json_pretty().unwrap().contains('\n'));
}

#[test]
fn test_parse_tree_serializes() {
    let grammar = Grammar::from_json(DECL_GRAMMAR).unwrap();
    let tokens = vec![
        Token::new("KEYWORD", "char"),
        Token::new("IDENT", "c"),
        Token::new("PUNCT", ";"),
    ];
    let tree = grammar.parse("decl", &tokens).unwrap();

    let json = serde_json::to_string(&tree).unwrap();
    assert!(json.contains(r#"{"Token":{"type":"IDENT","value":"c"}}"#));
    let back: ParseNode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tree);
}

// ============================================================================
// Inspection
// ============================================================================

#[test]
fn test_display_notation() {
    let grammar = Grammar::from_json(DECL_GRAMMAR).unwrap();
    let text = grammar.to_string();

    assert!(text.contains("decl ::= type <IDENT> (\"=\" <NUMBER>)? \";\""));
    assert!(text.contains("type ::= \"int\"\n     | \"char\""));
}

#[test]
fn test_references_and_analysis() {
    let grammar = Grammar::from_json(
        r#"{"rules": [
            {"name": "s", "productions": [{"parts": [{"items": [{"Nonterminal": "t"}]}]}]},
            {"name": "t", "productions": [{"parts": [{"items": [{"Nonterminal": "nowhere"}]}]}]}
        ]}"#,
    )
    .unwrap();

    let refs: Vec<_> = grammar.rule("t").unwrap().references().collect();
    assert_eq!(refs, vec!["nowhere"]);

    let warnings = grammar.analyze_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::UnknownReference);

    let tokens = vec![Token::new("X", "x")];
    assert_eq!(
        grammar.parse("s", &tokens),
        Err(ParseError::UnknownRule {
            name: "nowhere".to_string()
        })
    );

    let dot = GrammarVisualizer::new(&grammar).with_start("s").to_dot();
    assert!(dot.contains("r0 -> r1"));
    assert!(dot.contains("missing_nowhere"));
}

#[test]
fn test_leaf_wire_format() {
    let leaf: Leaf = serde_json::from_str(r#"{"Terminal": "IDENT"}"#).unwrap();
    assert_eq!(leaf, Leaf::Terminal("IDENT".to_string()));
    assert_eq!(
        serde_json::to_string(&Leaf::Nonterminal("expr".to_string())).unwrap(),
        r#"{"Nonterminal":"expr"}"#
    );
}
