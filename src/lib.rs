//! # hclref-base
//!
//! Schema-driven reference analysis for HCL-style configuration: which
//! addresses a document defines, which traversals consume them, and what
//! type each one has.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → Decoder, PathContext snapshots, semantic tokens
//!   ↓
//! hir       → Reference targets, origins, type inference
//!   ↓
//! syntax    → Body/Block/Attribute/Expr trees, JSON lowering
//!   ↓
//! schema    → Body, block and attribute schemas; constraints
//!   ↓
//! ty        → Structural types and literal values
//!   ↓
//! parser    → Logos lexers, recursive-descent native and JSON parsers
//!   ↓
//! base      → Primitives (Address, FileRange, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → ty → schema → syntax → hir → ide)
// ============================================================================

/// Foundation types: addresses, scopes, file ranges
pub mod base;

/// Parser: logos lexers, native and JSON parsers with recovery
pub mod parser;

/// Types: structural types, literal values and conversion rules
pub mod ty;

/// Schemas: what a body may contain and how it becomes addressable
pub mod schema;

/// Syntax: body trees shared by the native and JSON front ends
pub mod syntax;

/// High-level IR: reference targets, origins and type inference
pub mod hir;

/// IDE features: document set, snapshots and position queries
pub mod ide;

// Re-export foundation types
pub use base::{Address, FileRange, Key, ScopeId, Step, TextRange, TextSize};
