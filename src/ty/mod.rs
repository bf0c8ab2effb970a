//! Structural types and literal values.
//!
//! A small model of the configuration language's type system: primitives,
//! collections, structural objects and tuples, plus the dynamic pseudo-type
//! standing in for "not known until evaluated".

mod convert;
mod types;
mod value;

#[cfg(test)]
mod tests;

pub use types::{ObjectType, Type};
pub use value::{EvalError, Value};
