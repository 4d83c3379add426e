//! Tests for loading grammars from the definition language

use querygen::{parse, ElementKind, Grammar, GrammarError, Kind};

#[test]
fn test_parse_definitions() {
    let input = r#"
        # terminals
        k_select = keyword('select');
        r_integer = regex("[0-9]+");
        // structure
        START = seq(k_select, list(r_integer, ',', 1, 3));
    "#;

    let file = parse(input).expect("Should parse");
    assert_eq!(file.definitions.len(), 3);
    assert_eq!(file.definitions[2].node.name.node.as_str(), "START");
}

#[test]
fn test_listing() {
    let grammar = Grammar::parse(
        r#"
        r_integer = regex('[-+]?[0-9]+');
        k_limit   = keyword('limit');
        ops       = tokens('+ - * /');
        int_expr  = rule(r_integer, seq('(', this, ')'), seq(this, ops, this));
        limit     = seq(k_limit, int_expr);
        names     = list(r_integer, ',', 1, 3);
        times     = repeat(k_limit, 0, 2);
        maybe     = optional(limit);
        START     = choice(limit, seq(maybe, names, times));
    "#,
    )
    .expect("Should load");

    let listing: Vec<String> = grammar
        .names()
        .map(|(name, id)| format!("{}: {}", name, grammar.get(id).kind()))
        .collect();
    insta::assert_snapshot!(listing.join("\n"), @r###"
    r_integer: Regex
    k_limit: Keyword
    ops: TokenSet
    int_expr: NamedRule
    limit: Sequence
    names: List
    times: Repeat
    maybe: Optional
    START: Choice
    "###);
}

#[test]
fn test_recursive_rule_shape() {
    let grammar = Grammar::parse("e = prio('x', sequence('(', this, ')'));").expect("Should load");
    let e = grammar.lookup("e").expect("Should be named");
    let ElementKind::NamedRule(alternatives) = grammar.get(e).payload() else {
        panic!("Expected a rule");
    };
    assert_eq!(alternatives.len(), 2);
    assert_eq!(grammar.get(alternatives[0]).kind(), Kind::Literal);
    assert_eq!(grammar.get(alternatives[1]).children()[1], e);
}

#[test]
fn test_error_messages() {
    let message = |source: &str| Grammar::parse(source).unwrap_err().to_string();

    insta::assert_snapshot!(message("a = frobnicate('x');"), @"unknown element kind 'frobnicate'");
    insta::assert_snapshot!(message("a = 'x'; a = 'y';"), @"duplicate definition of 'a'");
    insta::assert_snapshot!(
        message("k_limit = keyword('limit'); START = seq(k_limt);"),
        @"undefined element 'k_limt' (did you mean 'k_limit'?)"
    );
    insta::assert_snapshot!(
        message("a = keyword('x', 'y');"),
        @"invalid arguments to keyword: expected exactly one string"
    );
    insta::assert_snapshot!(message("a = seq(this);"), @"'this' is only valid inside rule(...)");
    insta::assert_snapshot!(
        message("a = list('x', ',', 4, 2);"),
        @"invalid bounds on 'a': min 4 exceeds max 2"
    );
}

#[test]
fn test_syntax_error() {
    let err = Grammar::parse("START = seq('a', 'b'").unwrap_err();
    let GrammarError::Syntax(errors) = &err else {
        panic!("Expected syntax errors, got {:?}", err);
    };
    assert!(!errors.is_empty());
}

#[test]
fn test_invalid_input_is_a_syntax_error() {
    for source in [
        "START = seq('a', @ $ 'b');",
        "START = list('a', ',', 0, 99999999999999999999999);",
    ] {
        let err = Grammar::parse(source).unwrap_err();
        assert!(matches!(err, GrammarError::Syntax(_)), "{}: {:?}", source, err);
    }
}

#[test]
fn test_formatted_error_names_file() {
    let source = "START = seq(missing);";
    let err = Grammar::parse(source).unwrap_err();
    let formatted = err.format(source, "queries.qgr");
    assert!(formatted.contains("queries.qgr"));
    assert!(formatted.contains("undefined element 'missing'"));
}

#[test]
fn test_missing_grammar_file() {
    let err = Grammar::from_file(std::path::Path::new("tests/fixtures/does_not_exist.qgr"))
        .unwrap_err();
    assert!(matches!(err, GrammarError::Io(_)));
}
