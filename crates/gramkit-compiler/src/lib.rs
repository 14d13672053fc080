//! Gramkit compiler: grammar builder and serializer for constrained generation.
//!
//! Grammars are built in an [`Ast`] arena and compiled into the
//! [`gramkit_core::TopLevelGrammar`] artifact the engine consumes:
//! - `ast` - regex and grammar nodes, and the combinators that build them
//! - `analyze` - first/last frontiers and stop inference
//! - `emit` - regex hash-consing and multi-grammar serialization
//! - `printer` - pretty-printing for diagnostics

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod ast;
pub mod emit;
pub mod printer;

#[cfg(test)]
mod printer_tests;

pub use ast::{
    Ast, Gen, GenOptions, GenStop, GrammarDef, GrammarKind, GrammarNode, LexemeOptions, NodeId,
    Props, RegexDef, RegexId, RegexNode, StopDef,
};
pub use emit::{CompileConfig, RegexTable, Serializer, SerializerBuilder, StopPolicy};
pub use printer::{GrammarPrinter, RegexPrinter};

/// Errors raised while building or compiling a grammar.
///
/// Node renderings embedded in messages come from [`Ast::pp`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Invalid combinator arguments.
    #[error("malformed {what}: {reason}")]
    Malformed { what: &'static str, reason: String },

    /// A regex reaches itself through its children.
    #[error("circular regex reference: {0}")]
    CircularRegex(String),

    #[error("cannot infer stop: {generation} followed by {follower}")]
    CannotInferStop { generation: String, follower: String },

    #[error("ambiguous stop for {generation}: {first} and {second} start differently")]
    AmbiguousStop {
        generation: String,
        first: String,
        second: String,
    },

    /// The same generation is followed by literals with different leading
    /// characters in different places.
    #[error("conflicting stops for {generation}: {previous} then {current}")]
    ConflictingStop {
        generation: String,
        previous: String,
        current: String,
    },

    /// A generation has no stop under [`StopPolicy::Error`].
    #[error("no stop for {0}")]
    UnresolvedStop(String),

    /// A nested grammar placeholder was never defined.
    #[error("undefined nested grammar {0}")]
    UndefinedGrammar(String),

    #[error("grammar exceeds {0} nodes")]
    NodeLimitExceeded(usize),

    /// Internal invariant violation.
    #[error("unreachable: {0}")]
    Unreachable(&'static str),
}

/// Result type for grammar construction and compilation.
pub type Result<T> = std::result::Result<T, Error>;
