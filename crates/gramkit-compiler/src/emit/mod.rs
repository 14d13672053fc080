//! Artifact emission.
//!
//! - [`RegexTable`]: hash-consed regex entries of one grammar
//! - [`Serializer`]: fixpoint compilation of the entry grammar and every
//!   nested grammar it reaches

mod regex_table;
mod serializer;


pub use regex_table::RegexTable;
pub use serializer::{CompileConfig, Serializer, SerializerBuilder, StopPolicy};
