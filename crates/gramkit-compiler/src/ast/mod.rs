//! Grammar and regex AST.
//!
//! Both node kinds live in one [`Ast`] arena and are addressed by integer
//! handles assigned at construction. Children are created before their
//! parents, so the only way to close a loop is a nested grammar whose start
//! node is defined after the fact (see [`Ast::nested_placeholder`]).
//!
//! Nodes are immutable once built, with one exception: [`Ast::join`] may
//! assign an inferred stop to a generation node that has none.

mod build;
mod grammar;
mod regex;

#[cfg(test)]
mod grammar_tests;
#[cfg(test)]
mod regex_tests;

pub use build::{GenOptions, GrammarDef, LexemeOptions, StopDef};
pub use grammar::{Gen, GenStop, GrammarKind, GrammarNode, Lexeme, Nested, Props};
pub use regex::{RegexDef, RegexNode};

use gramkit_core::TopLevelGrammar;

use crate::emit::Serializer;
use crate::printer::{GRAMMAR_PP_LIMIT, GrammarPrinter, RegexPrinter};
use crate::{Error, Result};

/// Handle to a grammar node in an [`Ast`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw index for serialization/debugging.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a regex node in an [`Ast`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct RegexId(u32);

impl RegexId {
    /// Raw index for serialization/debugging.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena holding every regex and grammar node built so far.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    pub(crate) regexes: Vec<RegexNode>,
    pub(crate) nodes: Vec<GrammarNode>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a grammar node.
    ///
    /// # Panics
    /// Panics if the id was not created by this arena.
    #[inline]
    pub fn node(&self, id: NodeId) -> &GrammarNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_node(&self, id: NodeId) -> Option<&GrammarNode> {
        self.nodes.get(id.index())
    }

    /// Resolve a regex node.
    ///
    /// # Panics
    /// Panics if the id was not created by this arena.
    #[inline]
    pub fn regex_node(&self, id: RegexId) -> &RegexNode {
        &self.regexes[id.index()]
    }

    #[inline]
    pub fn get_regex(&self, id: RegexId) -> Option<&RegexNode> {
        self.regexes.get(id.index())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn regex_count(&self) -> usize {
        self.regexes.len()
    }

    /// Pretty-print a grammar node and everything below it, truncated for
    /// diagnostics.
    pub fn pp(&self, id: NodeId) -> String {
        GrammarPrinter::new(self, id).dump_truncated(GRAMMAR_PP_LIMIT)
    }

    /// Pretty-print a regex, truncated for diagnostics.
    pub fn pp_regex(&self, id: RegexId) -> String {
        RegexPrinter::new(self).dump(id)
    }

    /// Compile `root` with the default configuration.
    ///
    /// A nested grammar root becomes grammar 0 as is; any other node is
    /// treated as the start node of an implicit top-level grammar.
    pub fn compile(&self, root: NodeId) -> Result<TopLevelGrammar> {
        Serializer::new(self).compile(root)
    }

    pub(crate) fn push_regex(&mut self, node: RegexNode) -> RegexId {
        let id = RegexId(self.regexes.len() as u32);
        self.regexes.push(node);
        id
    }

    pub(crate) fn push_node(&mut self, node: GrammarNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn ensure_node(&self, what: &'static str, id: NodeId) -> Result<&GrammarNode> {
        self.get_node(id).ok_or_else(|| Error::Malformed {
            what,
            reason: format!("unknown grammar node #{}", id.as_u32()),
        })
    }

    pub(crate) fn ensure_regex(&self, what: &'static str, id: RegexId) -> Result<&RegexNode> {
        self.get_regex(id).ok_or_else(|| Error::Malformed {
            what,
            reason: format!("unknown regex #{}", id.as_u32()),
        })
    }
}
