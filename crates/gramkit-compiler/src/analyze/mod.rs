//! Static analysis over the grammar DAG.
//!
//! - [`frontier`]: which terminals can be matched first or last
//! - [`infer_stop`]: stop inference for generations inside a sequence
//!
//! Nested grammars are opaque here: analysis treats a reference as one
//! non-nullable terminal and never looks at its start node.

pub mod frontier;
mod infer_stop;

#[cfg(test)]
mod frontier_tests;

pub use frontier::{first_frontier, last_frontier};
pub(crate) use infer_stop::{InferredStop, infer_stops};
