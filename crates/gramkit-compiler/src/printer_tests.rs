use crate::ast::{Ast, LexemeOptions, RegexDef};
use crate::printer::{GRAMMAR_PP_LIMIT, GrammarPrinter, RegexPrinter};

#[test]
fn format_appends_to_writer() {
    let mut ast = Ast::new();
    let kw = ast.keyword("if").unwrap();
    let mut out = String::from("rule = ");

    GrammarPrinter::new(&ast, kw).format(&mut out).unwrap();

    insta::assert_snapshot!(out, @r#"rule = keyword("if")"#);
}

#[test]
fn lexeme_with_temperature() {
    let mut ast = Ast::new();
    let ident = ast
        .lexeme_with(LexemeOptions {
            rx: RegexDef::from("[a-z]+"),
            contextual: Some(false),
            temperature: Some(0.5),
        })
        .unwrap();

    insta::assert_snapshot!(GrammarPrinter::new(&ast, ident).dump(), @"lexeme(/[a-z]+/ temp:0.5)");
}

#[test]
fn regex_printer_matches_ast_pp() {
    let mut ast = Ast::new();
    let digit = ast.regex("[0-9]");
    let digits = ast.repeat(digit, 1, None).unwrap();
    let dot = ast.regex_literal(".");
    let number = ast.concat([digits, dot, digits]).unwrap();

    let printed = RegexPrinter::new(&ast).dump(number);

    assert_eq!(printed, ast.pp_regex(number));
    insta::assert_snapshot!(printed, @r#"((/[0-9]/){1,} "." (/[0-9]/){1,})"#);
}

#[test]
fn deep_grammar_pp_is_truncated() {
    let mut ast = Ast::new();
    let x = ast.str("x");
    let mut chain = x;
    for _ in 0..100_000 {
        chain = ast.join_pair(chain, x).unwrap();
    }

    let printed = ast.pp(chain);

    assert!(printed.starts_with("(((("));
    assert!(printed.ends_with("..."));
    assert_eq!(printed.len(), GRAMMAR_PP_LIMIT + 3);
}

#[test]
fn truncation_keeps_whole_characters() {
    let mut ast = Ast::new();
    let text = ast.str("é".repeat(10));

    let printed = GrammarPrinter::new(&ast, text).dump_truncated(4);

    assert_eq!(printed, "\"é...");
}
