//! Syntax tree shared by the native and JSON front ends.
//!
//! - [`ast`] - bodies, blocks, attributes and expressions
//! - [`SyntaxFile`] - a parsed file in either format
//! - [`lower_json`] - JSON to [`Body`] under a schema
//! - static evaluation of expressions via [`Expr::value`]

pub mod ast;
mod eval;
pub mod file;
pub mod json;

pub use ast::{
    Attribute, BinaryOp, Block, Body, BodyItem, Expr, ForExpr, IndexKey, Label, ObjectItem,
    TemplatePart, Traversal, TraversalStep, TraversalStepKind, UnaryOp,
};
pub use file::{FileFormat, SyntaxFile};
pub use json::lower_json;
