use super::{Ast, GenOptions, GrammarDef, GrammarKind, LexemeOptions};

#[test]
fn literal_nullability() {
    let mut ast = Ast::new();
    let empty = ast.str("");
    let text = ast.str("a");

    assert!(ast.node(empty).is_nullable());
    assert!(!ast.node(text).is_nullable());
}

#[test]
fn join_is_nullable_iff_every_element_is() {
    let mut ast = Ast::new();
    let both_empty = ast.join(["", ""]).unwrap();
    let one_solid = ast.join(["", "a"]).unwrap();
    let nothing = ast.join(Vec::<GrammarDef>::new()).unwrap();

    assert!(ast.node(both_empty).is_nullable());
    assert!(!ast.node(one_solid).is_nullable());
    assert!(ast.node(nothing).is_nullable());
}

#[test]
fn select_is_nullable_iff_any_alternative_is() {
    let mut ast = Ast::new();
    let with_empty = ast.select(["a", ""]).unwrap();
    let solid = ast.select(["a", "b"]).unwrap();
    let never = ast.select(Vec::<GrammarDef>::new()).unwrap();

    assert!(ast.node(with_empty).is_nullable());
    assert!(!ast.node(solid).is_nullable());
    assert!(!ast.node(never).is_nullable());
}

#[test]
fn opaque_terminals_are_not_nullable() {
    let mut ast = Ast::new();
    let generation = ast.generation(GenOptions::new().regex("a*")).unwrap();
    let lexeme = ast.lexeme("a*").unwrap();
    let empty = ast.str("");
    let nested = ast.nested(empty, None).unwrap();

    assert!(!ast.node(generation).is_nullable());
    assert!(!ast.node(lexeme).is_nullable());
    assert!(!ast.node(nested).is_nullable());
}

#[test]
fn children_and_terminals() {
    let mut ast = Ast::new();
    let a = ast.str("a");
    let b = ast.str("b");
    let choice = ast.select([a, b]).unwrap();
    let nested = ast.nested(choice, None).unwrap();
    let placeholder = ast.nested_placeholder();

    assert!(ast.node(a).children().is_empty());
    assert_eq!(ast.node(choice).children(), &[a, b]);
    assert_eq!(ast.node(nested).children(), &[choice]);
    assert!(ast.node(placeholder).children().is_empty());
    assert!(ast.node(a).is_terminal());
    assert!(ast.node(nested).is_terminal());
    assert!(!ast.node(choice).is_terminal());
}

#[test]
fn pp_sequence_with_inferred_stop() {
    let mut ast = Ast::new();
    let generation = ast.generation(GenOptions::new().name("x")).unwrap();
    let joined = ast.join_pair(generation, ".").unwrap();

    insta::assert_snapshot!(ast.pp(joined), @r#"(gen(regex:/.*/ stop:"." name:"x") + ".")"#);
}

#[test]
fn pp_labels_shared_nodes() {
    let mut ast = Ast::new();
    let a = ast.str("a");
    let choice = ast.select([GrammarDef::from(a), "b".into()]).unwrap();
    let joined = ast.join([choice, choice, a]).unwrap();

    insta::assert_snapshot!(ast.pp(joined), @r#"((#2: #0: "a" | "b") + #2 + #0)"#);
}

#[test]
fn pp_recursive_grammar() {
    let mut ast = Ast::new();
    let item = ast.str("x");
    let repeated = ast.one_or_more(item).unwrap();

    insta::assert_snapshot!(ast.pp(repeated), @r#"(#1: grammar((#0: "x" | (#1 + #0))))"#);
}

#[test]
fn pp_undefined_placeholder() {
    let mut ast = Ast::new();
    let placeholder = ast.nested_placeholder();

    insta::assert_snapshot!(ast.pp(placeholder), @"(grammar(?))");
}

#[test]
fn pp_props() {
    let mut ast = Ast::new();
    let generation = ast
        .generation(
            GenOptions::new()
                .regex("[a-z]+")
                .stop("\n")
                .temperature(0.5)
                .max_tokens(5),
        )
        .unwrap();
    let listed = ast.list_capture(generation, "items").unwrap();

    insta::assert_snapshot!(
        ast.pp(listed),
        @r#"gen(regex:/[a-z]+/ stop:"\n" maxTokens:5 temp:0.5 name:"__LIST_APPEND:items")"#
    );
}

#[test]
fn pp_lexemes() {
    let mut ast = Ast::new();
    let kw = ast.keyword("if").unwrap();
    let num = ast.lexeme("[0-9]+").unwrap();
    let warm = ast
        .lexeme_with(LexemeOptions {
            rx: "[a-z]+".into(),
            contextual: Some(false),
            temperature: Some(0.25),
        })
        .unwrap();
    let line = ast.join([kw, num, warm]).unwrap();

    insta::assert_snapshot!(ast.pp(line), @r#"(keyword("if") + lexeme(/[0-9]+/) + lexeme(/[a-z]+/ temp:0.25))"#);
}

#[test]
fn kind_exposes_payload() {
    let mut ast = Ast::new();
    let text = ast.str("hi");

    assert!(matches!(ast.node(text).kind(), GrammarKind::String(s) if s == "hi"));
    assert_eq!(ast.node(text).as_literal(), Some("hi"));
    assert!(ast.node(text).as_gen().is_none());
}
