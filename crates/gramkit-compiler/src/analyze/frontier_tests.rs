use indexmap::IndexSet;

use super::{first_frontier, last_frontier};
use crate::ast::{Ast, GenOptions, NodeId};

fn set(ids: &[NodeId]) -> IndexSet<NodeId> {
    ids.iter().copied().collect()
}

#[test]
fn terminal_is_its_own_frontier() {
    let mut ast = Ast::new();
    let a = ast.str("a");

    assert_eq!(first_frontier(&ast, &[a]), set(&[a]));
    assert_eq!(last_frontier(&ast, &[a]), set(&[a]));
}

#[test]
fn choice_unions_alternatives() {
    let mut ast = Ast::new();
    let a = ast.str("a");
    let b = ast.str("b");
    let choice = ast.select([a, b]).unwrap();

    assert_eq!(first_frontier(&ast, &[choice]), set(&[a, b]));
    assert_eq!(last_frontier(&ast, &[choice]), set(&[a, b]));
}

#[test]
fn sequence_stops_at_first_solid_element() {
    let mut ast = Ast::new();
    let empty = ast.str("");
    let a = ast.str("a");
    let b = ast.str("b");
    let joined = ast.join([empty, a, b]).unwrap();

    assert_eq!(first_frontier(&ast, &[joined]), set(&[empty, a]));
    assert_eq!(last_frontier(&ast, &[joined]), set(&[b]));
}

#[test]
fn last_frontier_walks_backwards_past_nullables() {
    let mut ast = Ast::new();
    let a = ast.str("a");
    let maybe = ast.select(["", "b"]).unwrap();
    let joined = ast.join([a, maybe]).unwrap();

    let last = last_frontier(&ast, &[joined]);

    assert_eq!(last.len(), 3);
    assert!(last.contains(&a));
}

#[test]
fn empty_choice_has_no_frontier() {
    let mut ast = Ast::new();
    let never = ast.select(Vec::<NodeId>::new()).unwrap();

    assert!(first_frontier(&ast, &[never]).is_empty());
}

#[test]
fn nested_grammar_is_opaque() {
    let mut ast = Ast::new();
    let generation = ast.generation(GenOptions::new()).unwrap();
    let nested = ast.nested(generation, None).unwrap();

    assert_eq!(first_frontier(&ast, &[nested]), set(&[nested]));
    assert_eq!(last_frontier(&ast, &[nested]), set(&[nested]));
}

#[test]
fn shared_subgraphs_are_reported_once() {
    let mut ast = Ast::new();
    let a = ast.str("a");
    let inner = ast.select([a, a]).unwrap();
    let outer = ast.select([inner, inner, a]).unwrap();

    assert_eq!(first_frontier(&ast, &[outer]), set(&[a]));
}

#[test]
fn frontier_of_a_suffix() {
    let mut ast = Ast::new();
    let maybe = ast.select(["", "x"]).unwrap();
    let y = ast.str("y");
    let z = ast.str("z");

    let first = first_frontier(&ast, &[maybe, y, z]);

    assert!(first.contains(&y));
    assert!(!first.contains(&z));
}

#[test]
fn deep_nullable_chain_does_not_overflow() {
    let mut ast = Ast::new();
    let empty = ast.str("");
    let a = ast.str("a");
    let mut chain = a;
    for _ in 0..100_000 {
        chain = ast.select([empty, chain]).unwrap();
    }

    assert_eq!(first_frontier(&ast, &[chain]), set(&[empty, a]));
}
