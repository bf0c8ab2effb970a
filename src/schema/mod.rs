//! Declarative schemas describing what a body may contain.
//!
//! A schema is built once by the host and then only read:
//! - [`Constraint`] - what an expression may be
//! - [`BodySchema`], [`AttributeSchema`], [`BlockSchema`] - body structure
//! - [`AttributeAddrSchema`], [`BlockAddrSchema`] - how nodes become targets
//! - [`Targetable`] - targets declared without any syntax behind them

mod body;
mod constraint;

pub use body::{
    AddrStep, AttributeAddrSchema, AttributeDependent, AttributeSchema, BlockAddrSchema,
    BlockAsTypeOf, BlockSchema, BlockType, BodySchema, DependencyKeys, LabelDependent,
    LabelSchema, Targetable,
};
pub use constraint::{Constraint, ObjectAttribute, ObjectConstraint, Reference, ReferenceAddrSchema};
