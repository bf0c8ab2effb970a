//! IDE layer tests
//!
//! - Decoder state, snapshots, errors and cancellation
//! - Position queries across files
//! - Semantic tokens

pub mod tests_decoder;
pub mod tests_queries;
pub mod tests_semantic_tokens;
