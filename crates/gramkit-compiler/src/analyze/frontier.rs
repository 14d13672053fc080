//! First and last frontiers.
//!
//! The first frontier of a node is the set of terminals that can be matched
//! before anything else: a choice contributes every alternative, a sequence
//! its leading elements up to and including the first non-nullable one.
//! The last frontier is the mirror image.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::ast::{Ast, GrammarKind, NodeId};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Terminals that may come first when matching `seq` as a sequence,
/// in discovery order.
pub fn first_frontier(ast: &Ast, seq: &[NodeId]) -> IndexSet<NodeId> {
    Walker::new(ast, Direction::Forward).run(seq)
}

/// Terminals that may come last when matching `seq` as a sequence,
/// in discovery order.
pub fn last_frontier(ast: &Ast, seq: &[NodeId]) -> IndexSet<NodeId> {
    Walker::new(ast, Direction::Backward).run(seq)
}

/// Each node is entered at most once, so shared subgraphs cost nothing extra.
struct Walker<'a> {
    ast: &'a Ast,
    direction: Direction,
    visited: HashSet<NodeId>,
    out: IndexSet<NodeId>,
}

impl<'a> Walker<'a> {
    fn new(ast: &'a Ast, direction: Direction) -> Self {
        Self {
            ast,
            direction,
            visited: HashSet::new(),
            out: IndexSet::new(),
        }
    }

    /// Depth-first with an explicit stack, so long nullable chains cannot
    /// exhaust the call stack. Children are pushed in reverse to keep
    /// discovery order.
    fn run(mut self, seq: &[NodeId]) -> IndexSet<NodeId> {
        let mut stack = Vec::new();
        self.push_seq(seq, &mut stack);
        while let Some(id) = stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            match self.ast.node(id).kind() {
                GrammarKind::Select(among) => stack.extend(among.iter().rev()),
                GrammarKind::Join(sequence) => self.push_seq(sequence, &mut stack),
                GrammarKind::String(_)
                | GrammarKind::Gen(_)
                | GrammarKind::Lexeme(_)
                | GrammarKind::Nested(_) => {
                    self.out.insert(id);
                }
            }
        }
        self.out
    }

    fn push_seq(&self, seq: &[NodeId], stack: &mut Vec<NodeId>) {
        let reached = match self.direction {
            Direction::Forward => self.until_solid(seq.iter()),
            Direction::Backward => self.until_solid(seq.iter().rev()),
        };
        stack.extend(reached.into_iter().rev());
    }

    /// Leading items up to and including the first non-nullable one.
    fn until_solid<'s>(&self, items: impl Iterator<Item = &'s NodeId>) -> Vec<NodeId> {
        let mut reached = Vec::new();
        for &id in items {
            reached.push(id);
            if !self.ast.node(id).is_nullable() {
                break;
            }
        }
        reached
    }
}
