use super::{Ast, RegexId, RegexNode};
use crate::Error;

#[test]
fn literal_and_pattern_print_specially() {
    let mut ast = Ast::new();
    let lit = ast.regex_literal("a\"b");
    let pat = ast.regex("[0-9]+");

    insta::assert_snapshot!(ast.pp_regex(lit), @r#""a\"b""#);
    insta::assert_snapshot!(ast.pp_regex(pat), @"/[0-9]+/");
}

#[test]
fn composites_print_structurally() {
    let mut ast = Ast::new();
    let a = ast.regex_literal("a");
    let b = ast.regex("b+");
    let or = ast.or([a, b]).unwrap();
    let rep = ast.repeat(or, 1, None).unwrap();
    let not = ast.not(rep).unwrap();
    let ahead = ast.lookahead(b).unwrap();
    let concat = ast.concat([a, ahead]).unwrap();
    let bounded = ast.repeat(a, 0, Some(3)).unwrap();
    let both = ast.and([a, b]).unwrap();

    insta::assert_snapshot!(ast.pp_regex(not), @r#"~(("a" | /b+/)){1,}"#);
    insta::assert_snapshot!(ast.pp_regex(concat), @r#"("a" lookahead(/b+/))"#);
    insta::assert_snapshot!(ast.pp_regex(bounded), @r#"("a"){0,3}"#);
    insta::assert_snapshot!(ast.pp_regex(both), @r#"("a" & /b+/)"#);
}

#[test]
fn leaf_variants_print() {
    let mut ast = Ast::new();
    let bytes = ast.byte_literal(b"ab\n".to_vec());
    let byte = ast.byte(b'A');
    let set = ast.byte_set([1, 2, 200]);
    let empty = ast.empty_string();
    let none = ast.no_match();

    insta::assert_snapshot!(ast.pp_regex(bytes), @r#"b"ab\n""#);
    insta::assert_snapshot!(ast.pp_regex(byte), @"b'A'");
    insta::assert_snapshot!(ast.pp_regex(set), @"byteset(3)");
    insta::assert_snapshot!(ast.pp_regex(empty), @r#""""#);
    insta::assert_snapshot!(ast.pp_regex(none), @"nomatch");
}

#[test]
fn byte_set_packs_eight_words() {
    let mut ast = Ast::new();
    let set = ast.byte_set([0, 33, 255]);

    assert_eq!(
        ast.regex_node(set),
        &RegexNode::ByteSet(vec![1, 2, 0, 0, 0, 0, 0, 0x8000_0000])
    );
}

#[test]
fn long_rendering_is_truncated() {
    let mut ast = Ast::new();
    let lit = ast.regex_literal("x".repeat(2000));

    let out = ast.pp_regex(lit);

    assert_eq!(out.len(), 1024 + 3);
    assert!(out.starts_with("\"xxx"));
    assert!(out.ends_with("..."));
}

#[test]
fn truncation_respects_char_boundaries() {
    let mut ast = Ast::new();
    let lit = ast.regex_literal("é".repeat(1000));

    let out = ast.pp_regex(lit);

    // The quote takes one byte, so byte 1024 falls inside a character.
    assert_eq!(out.len(), 1023 + 3);
    assert!(out.ends_with("é..."));
}

#[test]
fn cyclic_regex_prints_within_budget() {
    let mut ast = Ast::new();
    let a = ast.regex_literal("a");
    let not = ast.not(a).unwrap();
    ast.regexes[a.index()] = RegexNode::Not(not);

    let out = ast.pp_regex(not);

    assert_eq!(out, format!("{}...", "~".repeat(1024)));
}

#[test]
fn rx_normalizes_source_and_nodes() {
    let mut ast = Ast::new();
    let built = ast.regex_literal("x");

    assert_eq!(ast.rx(built), built);
    let from_source = ast.rx("[a-z]");
    assert_eq!(ast.regex_node(from_source), &RegexNode::Regex("[a-z]".into()));
}

#[test]
fn repeat_rejects_inverted_bounds() {
    let mut ast = Ast::new();
    let a = ast.regex_literal("a");

    let err = ast.repeat(a, 3, Some(1)).unwrap_err();

    assert!(matches!(err, Error::Malformed { what: "repeat", .. }));
    insta::assert_snapshot!(err.to_string(), @"malformed repeat: max 1 is below min 3");
}

#[test]
fn composites_reject_unknown_children() {
    let mut ast = Ast::new();
    let a = ast.regex_literal("a");
    let before = ast.regex_count();

    let err = ast.or([a, RegexId(99)]).unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"malformed or: unknown regex #99");
    assert_eq!(ast.regex_count(), before);
}

#[test]
fn check_regex_reports_cycles() {
    let mut ast = Ast::new();
    let a = ast.regex_literal("a");
    let b = ast.regex_literal("b");
    let concat = ast.concat([a, b]).unwrap();
    assert_eq!(ast.check_regex(concat), Ok(()));

    ast.regexes[b.index()] = RegexNode::Or(vec![concat]);

    assert!(matches!(
        ast.check_regex(concat),
        Err(Error::CircularRegex(_))
    ));
}
