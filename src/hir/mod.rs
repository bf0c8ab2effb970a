//! High-level IR (HIR): reference targets, origins and type inference.
//!
//! This module is the reference resolution engine. It walks a parsed body
//! under a schema and produces two data sets: the targets a document
//! defines and the origins that consume them.
//!
//! ## Key Types
//!
//! - [`Target`], [`Targets`]: addressed, optionally typed definitions
//! - [`Origin`], [`Origins`]: traversals referring to targets
//! - [`TypedExpr`]: an expression viewed through its constraint
//! - [`TargetContext`]: the target a nested expression would become
//!
//! ## Collection
//!
//! ```text
//! Body + BodySchema
//!     │
//!     ├──► collect_reference_targets   ← attributes, blocks, implied bodies
//!     │        │
//!     │        ▼
//!     │    TypedExpr::reference_targets(ctx)
//!     │
//!     └──► collect_reference_origins   ← every traversal under a Reference
//!              │
//!              ▼
//!          TypedExpr::reference_origins(allow_self)
//!
//! Targets::match_origin / Origins::targeting   ← composes the two
//! ```
//!
//! Both collectors are pure functions of their input. Ordering is source
//! order for targets and (file, offset) for origins.

mod body;
mod context;
mod expr;
mod infer;
mod origins;
mod query;
mod reference;
mod targets;
mod typeexpr;

use thiserror::Error;

pub use context::TargetContext;
pub use expr::TypedExpr;
pub use infer::{body_to_data_type, wrap_block_type};
pub use origins::{collect_reference_origins, reference_origin_at_pos};
pub use query::type_at_pos;
pub use reference::{DeepIter, Origin, OriginConstraint, Origins, Target, Targets};
pub use targets::collect_reference_targets;
pub use typeexpr::{TypeExprError, type_from_expr};

/// A collection was abandoned because its cancellation token fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;
