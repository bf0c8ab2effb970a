//! Expressions viewed through the constraint they are matched against.
//!
//! [`TypedExpr`] pairs an expression with its [`Constraint`] and answers three
//! questions about it: its type, the targets it defines and the origins it
//! contains. Behavior is selected by a single `match` on the constraint, so
//! every constraint variant is handled in exactly one place per capability:
//!
//! | Variant                   | Module       |
//! |---------------------------|--------------|
//! | LiteralType, LiteralValue | `literal`    |
//! | Reference                 | `reference`  |
//! | OneOf                     | `one_of`     |
//! | List, Set, Tuple          | `collection` |
//! | Map, Object               | `object`     |
//! | Keyword, TypeDeclaration  | inline       |

mod collection;
mod literal;
mod object;
mod one_of;
mod reference;

use crate::base::{FileRange, TextRange};
use crate::hir::context::TargetContext;
use crate::hir::reference::{Origins, Targets};
use crate::hir::typeexpr::type_from_expr;
use crate::schema::Constraint;
use crate::syntax::Expr;
use crate::ty::Type;

/// An expression matched against a constraint.
#[derive(Debug, Clone, Copy)]
pub struct TypedExpr<'a> {
    file: &'a str,
    expr: &'a Expr,
    constraint: &'a Constraint,
}

impl<'a> TypedExpr<'a> {
    pub fn new(file: &'a str, expr: &'a Expr, constraint: &'a Constraint) -> Self {
        Self {
            file,
            expr,
            constraint,
        }
    }

    pub fn expr(&self) -> &'a Expr {
        self.expr
    }

    pub fn constraint(&self) -> &'a Constraint {
        self.constraint
    }

    /// Same file, different expression and constraint.
    fn with<'b>(&self, expr: &'b Expr, constraint: &'b Constraint) -> TypedExpr<'b>
    where
        'a: 'b,
    {
        TypedExpr {
            file: self.file,
            expr,
            constraint,
        }
    }

    fn file_range(&self, range: TextRange) -> FileRange {
        FileRange::new(self.file, range)
    }

    /// Best-effort type of the expression, falling back to the constraint's
    /// own type.
    pub fn infer_type(&self) -> Type {
        match self.constraint {
            Constraint::LiteralType(ty) => self.literal_type_type(ty),
            Constraint::LiteralValue(value) => value.ty(),
            Constraint::Reference(reference) => {
                reference.of_type.clone().unwrap_or(Type::Dynamic)
            }
            Constraint::OneOf(alternatives) => self.one_of_type(alternatives),
            Constraint::List(_) | Constraint::Set(_) | Constraint::Tuple(_) => {
                self.collection_type()
            }
            Constraint::Map(_) | Constraint::Object(_) => self.object_type(),
            Constraint::Keyword(_) | Constraint::TypeDeclaration => Type::Dynamic,
        }
    }

    /// Whether the expression has the shape the constraint asks for.
    pub fn accepts(&self) -> bool {
        match self.constraint {
            Constraint::LiteralType(ty) => self.literal_type_accepts(ty),
            Constraint::LiteralValue(value) => self.expr.value().as_ref() == Ok(value),
            Constraint::Keyword(keyword) => self.expr.as_keyword() == Some(keyword.as_str()),
            Constraint::Reference(_) => self.expr.as_traversal().and_then(|t| t.address()).is_some(),
            Constraint::TypeDeclaration => type_from_expr(self.expr).is_ok(),
            Constraint::OneOf(alternatives) => {
                alternatives.iter().any(|alt| self.with(self.expr, alt).accepts())
            }
            Constraint::List(_) | Constraint::Set(_) | Constraint::Tuple(_) => {
                self.is_collection()
            }
            Constraint::Map(_) | Constraint::Object(_) => self.is_object(),
        }
    }

    /// Targets defined by the expression.
    ///
    /// With a context, the result describes the node the context addresses
    /// (usually a single target with nested ones). Without one, only
    /// targets the expression addresses on its own are returned, flat.
    pub fn reference_targets(&self, ctx: Option<&TargetContext>) -> Targets {
        match self.constraint {
            Constraint::LiteralType(ty) => self.literal_type_targets(ty, ctx),
            Constraint::LiteralValue(value) => self.literal_value_targets(value, ctx),
            Constraint::Reference(reference) => self.reference_targets_of(reference, ctx),
            Constraint::OneOf(alternatives) => self.one_of_targets(alternatives, ctx),
            Constraint::List(elem) | Constraint::Set(elem) => {
                self.collection_targets(ctx, move |_| Some(&**elem))
            }
            Constraint::Tuple(elems) => self.collection_targets(ctx, move |i| elems.get(i)),
            Constraint::Map(elem) => self.map_targets(elem, ctx),
            Constraint::Object(obj) => self.object_targets(obj, ctx),
            Constraint::Keyword(_) | Constraint::TypeDeclaration => Targets::default(),
        }
    }

    /// Origins found in the expression.
    ///
    /// `self.*` traversals are skipped unless `allow_self` is set.
    pub fn reference_origins(&self, allow_self: bool) -> Origins {
        match self.constraint {
            Constraint::Reference(reference) => self.traversal_origins(reference, allow_self),
            Constraint::OneOf(alternatives) => self.one_of_origins(alternatives, allow_self),
            Constraint::List(elem) | Constraint::Set(elem) => {
                self.collection_origins(allow_self, move |_| Some(&**elem))
            }
            Constraint::Tuple(elems) => self.collection_origins(allow_self, move |i| elems.get(i)),
            Constraint::Map(elem) => self.map_origins(elem, allow_self),
            Constraint::Object(obj) => self.object_origins(obj, allow_self),
            Constraint::LiteralType(_)
            | Constraint::LiteralValue(_)
            | Constraint::Keyword(_)
            | Constraint::TypeDeclaration => Origins::default(),
        }
    }

    /// A single target for the whole node, with no nested ones.
    fn leaf_target(ctx: Option<&TargetContext>, ty: Type) -> Targets {
        ctx.map(|ctx| ctx.target(ty, Targets::default()))
            .into_iter()
            .collect()
    }
}

/// Type of an expression known without evaluating any variables.
///
/// Templates are strings even when they interpolate something.
fn static_type(expr: &Expr) -> Option<Type> {
    match expr {
        Expr::Template { .. } => Some(Type::String),
        Expr::Parens { inner, .. } => static_type(inner),
        _ => expr.value().ok().map(|value| value.ty()),
    }
}
