#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Data shared between the gramkit compiler and the generation engine.
//!
//! Two layers:
//! - **Wire layer** (`wire`): the compiled grammar artifact posted to the engine
//! - **Output layer** (`output`): events the engine streams back while generating

pub mod output;
pub mod wire;

pub use output::{
    GenerationOutput, LIST_APPEND_PREFIX, OutCapture, OutFinalText, OutText, OutputError,
    ParserOutput, ParserStats,
};
pub use wire::{
    GrammarId, GrammarWithLexer, NodeGen, NodeGenGrammar, NodeId, NodeJoin, NodeJson, NodeLexeme,
    NodeProps, NodeSelect, NodeString, RegexId, RegexJson, RegexSpec, TopLevelGrammar,
};

#[cfg(test)]
mod wire_tests;
